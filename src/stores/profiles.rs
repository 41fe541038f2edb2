use serde::{Deserialize, Serialize};

/// Query key under which the demo profile is cached
pub const PROFILE_QUERY_KEY: &str = "user-profile";

/// A user profile as returned by the profile source
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub title: String,
    pub bio: String,
}

impl Profile {
    /// The record served by the stub source
    pub fn demo() -> Self {
        Self {
            id: 1,
            name: "Alex Johnson".to_string(),
            email: "alex.johnson@example.com".to_string(),
            title: "Senior Product Designer".to_string(),
            bio: "Designs delightful user experiences and mentors cross-functional teams \
                  to build accessible products."
                .to_string(),
        }
    }

    /// Avatar initials: the first character of every whitespace-separated
    /// word of the name, joined in order
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect()
    }
}
