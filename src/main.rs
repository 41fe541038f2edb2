#![allow(non_snake_case)]

use dioxus::prelude::*;

// Modules
mod components;
mod context;
mod hooks;
mod stores;
mod utils;

use components::ProfileView;
use context::AppContext;

fn main() {
    // Initialize panic hook for better error messages in browser console
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    }

    log::info!("Starting profile skeleton demo");

    // Launch the Dioxus web app
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    // One context per mounted app; dropped together with it
    let ctx = use_context_provider(AppContext::with_stub);
    use_drop(move || ctx.dispose());

    rsx! {
        main {
            class: "min-h-screen bg-background text-foreground",
            div {
                class: "mx-auto max-w-xl px-4 py-12",
                header {
                    class: "mb-8 space-y-3 text-center",
                    p {
                        class: "text-sm uppercase tracking-[0.3em] text-muted-foreground",
                        "Async UI Demo"
                    }
                    h1 {
                        class: "text-3xl font-bold tracking-tight sm:text-4xl",
                        "Skeleton Loading with Smooth Reveal"
                    }
                    p {
                        class: "mx-auto max-w-2xl text-sm text-muted-foreground sm:text-base",
                        "This minimal example showcases how to combine TanStack Query, a shadcn-inspired skeleton, and Framer Motion transitions to build a polished async user experience."
                    }
                }
                ProfileView {}
            }
        }
    }
}
