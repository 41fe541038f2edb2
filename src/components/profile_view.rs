use dioxus::prelude::*;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::components::icons::{AlertTriangleIcon, RefreshIcon};
use crate::components::profile_card::{ProfileCard, ProfileCardSkeleton};
use crate::hooks::use_profile;
use crate::stores::errors::FetchError;
use crate::stores::profiles::Profile;
use crate::stores::query_cache::QueryState;
use crate::utils::time::{self, Instant};
use crate::utils::transition::{PhaseKind, Phased, Presence, TransitionConfig};

/// Animation tick while a swap is running (~60fps)
const FRAME_MS: u64 = 16;

/// What the profile view is showing
#[derive(Clone, Debug, PartialEq)]
pub enum ViewPhase {
    Loading,
    Loaded(Profile),
    Errored(FetchError),
}

impl ViewPhase {
    pub fn from_state(state: &QueryState<Profile>) -> Self {
        if let Some(profile) = state.data() {
            ViewPhase::Loaded(profile.clone())
        } else if let Some(err) = state.error() {
            ViewPhase::Errored(err.clone())
        } else {
            ViewPhase::Loading
        }
    }
}

impl Phased for ViewPhase {
    fn phase_kind(&self) -> PhaseKind {
        match self {
            ViewPhase::Loading => PhaseKind::Loading,
            ViewPhase::Loaded(_) => PhaseKind::Loaded,
            ViewPhase::Errored(_) => PhaseKind::Errored,
        }
    }
}

/// Fetches the profile and cross-fades from skeleton to card
#[component]
pub fn ProfileView() -> Element {
    let query = use_profile();
    let state = query.state;
    let origin = use_hook(Instant::now);
    let wake = use_hook(|| Rc::new(Notify::new()));

    let mut presence = use_signal(|| {
        Presence::new(
            ViewPhase::from_state(&state.peek()),
            TransitionConfig::default(),
            Duration::ZERO,
        )
    });
    let mut now = use_signal(|| Duration::ZERO);

    // Feed query updates into the presence scheduler
    let wake_ticker = wake.clone();
    use_effect(move || {
        let phase = ViewPhase::from_state(&state.read());
        let at = origin.elapsed();
        if presence.write().show(phase, at) {
            now.set(at);
            wake_ticker.notify_one();
        }
    });

    // Advance the clock while something is moving, park between swaps
    use_future(move || {
        let wake = wake.clone();
        async move {
            loop {
                let last = *now.peek();
                if presence.peek().is_animating(last) {
                    time::sleep(Duration::from_millis(FRAME_MS)).await;
                    now.set(origin.elapsed());
                } else {
                    wake.notified().await;
                }
            }
        }
    });

    let layers: Vec<(u64, String, ViewPhase)> = presence
        .read()
        .frame(now())
        .into_iter()
        .map(|layer| (layer.id, layer.motion.style(), layer.phase.clone()))
        .collect();

    rsx! {
        div {
            class: "relative",
            for (id, style, phase) in layers {
                div {
                    key: "{id}",
                    style: "{style}",
                    {render_phase(phase, query.refetch)}
                }
            }
        }
    }
}

/// Pure mapping from phase to markup
fn render_phase(phase: ViewPhase, on_retry: EventHandler<()>) -> Element {
    match phase {
        ViewPhase::Loading => rsx! { ProfileCardSkeleton {} },
        ViewPhase::Loaded(profile) => rsx! { ProfileCard { profile } },
        ViewPhase::Errored(error) => rsx! { ProfileError { error, on_retry } },
    }
}

#[component]
pub fn ProfileError(error: FetchError, on_retry: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "rounded-xl border border-red-500/50 bg-red-500/10 p-6 text-center",
            role: "alert",

            AlertTriangleIcon { class: "w-8 h-8 mx-auto text-red-500" }
            p {
                class: "mt-3 font-semibold",
                "Couldn't load this profile"
            }
            p {
                class: "mt-1 text-sm text-muted-foreground",
                "{error}"
            }
            button {
                r#type: "button",
                class: "mt-4 inline-flex items-center gap-2 px-4 py-2 rounded-lg bg-accent hover:bg-accent/80 text-sm font-medium transition",
                onclick: move |_| on_retry.call(()),
                RefreshIcon { class: "w-4 h-4" }
                "Try again"
            }
        }
    }
}
