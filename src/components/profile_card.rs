use dioxus::prelude::*;

use crate::components::icons::MailIcon;
use crate::components::skeleton::{Dimension, Skeleton, SkeletonShape};
use crate::stores::profiles::Profile;

#[component]
pub fn ProfileCard(profile: Profile) -> Element {
    let initials = profile.initials();

    rsx! {
        article {
            class: "rounded-xl border border-border bg-card p-6 shadow-sm",

            // Header: avatar + name/title
            div {
                class: "flex items-center gap-4",
                div {
                    class: "w-16 h-16 flex-shrink-0 rounded-full bg-blue-500 text-white flex items-center justify-center text-xl font-semibold",
                    aria_hidden: "true",
                    "{initials}"
                }
                div {
                    class: "min-w-0",
                    h2 {
                        class: "text-xl font-bold truncate",
                        "{profile.name}"
                    }
                    p {
                        class: "text-sm text-muted-foreground",
                        "{profile.title}"
                    }
                }
            }

            p {
                class: "mt-6 text-sm leading-relaxed",
                "{profile.bio}"
            }

            // Contact row
            div {
                class: "mt-6 flex items-center justify-between gap-4",
                div {
                    class: "min-w-0 text-sm",
                    p {
                        class: "font-medium",
                        "Contact"
                    }
                    div {
                        class: "flex items-center gap-2 text-muted-foreground",
                        MailIcon { class: "w-4 h-4 flex-shrink-0" }
                        span {
                            class: "truncate",
                            "{profile.email}"
                        }
                    }
                }
                // Demonstration only, no action wired
                button {
                    r#type: "button",
                    class: "px-4 py-2 rounded-full bg-blue-500 hover:bg-blue-600 text-white text-xs font-semibold transition",
                    "Send Message"
                }
            }
        }
    }
}

/// Skeleton that matches the ProfileCard layout
#[component]
pub fn ProfileCardSkeleton() -> Element {
    rsx! {
        div {
            class: "rounded-xl border border-border bg-card p-6 shadow-sm",
            role: "status",
            aria_live: "polite",
            aria_busy: "true",

            // Screen reader announcement
            span {
                class: "sr-only",
                "Loading profile..."
            }

            div {
                class: "flex items-center gap-4",
                Skeleton { shape: SkeletonShape::circle(64) }
                div {
                    class: "flex-1 space-y-2",
                    // Name
                    Skeleton { shape: SkeletonShape::bar(Dimension::Px(160), 20) }
                    // Title
                    Skeleton { shape: SkeletonShape::bar(Dimension::Px(120), 16) }
                }
            }

            // Bio lines
            div {
                class: "mt-6 space-y-2",
                Skeleton { shape: SkeletonShape::bar(Dimension::Percent(100), 14) }
                Skeleton { shape: SkeletonShape::bar(Dimension::Percent(100), 14) }
                Skeleton { shape: SkeletonShape::bar(Dimension::Percent(75), 14) }
            }

            // Email + button
            div {
                class: "mt-6 flex items-center justify-between",
                Skeleton { shape: SkeletonShape::bar(Dimension::Px(180), 16) }
                Skeleton { shape: SkeletonShape::bar(Dimension::Px(96), 36) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_shows_profile_fields() {
        let html = dioxus_ssr::render_element(rsx! {
            ProfileCard { profile: Profile::demo() }
        });

        assert!(html.contains("AJ"));
        assert!(html.contains("Alex Johnson"));
        assert!(html.contains("Senior Product Designer"));
        assert!(html.contains("alex.johnson@example.com"));
        assert!(html.contains(&Profile::demo().bio));
        assert!(html.contains("Contact"));
        assert!(html.contains("Send Message"));
    }

    #[test]
    fn test_skeleton_has_no_profile_data() {
        let html = dioxus_ssr::render_element(rsx! {
            ProfileCardSkeleton {}
        });

        assert!(html.contains("animate-pulse"));
        assert!(html.contains("Loading profile..."));
        assert!(!html.contains("Alex Johnson"));
        assert_eq!(html.matches("animate-pulse").count(), 8);
    }
}
