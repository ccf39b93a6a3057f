//! `[build.friends]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build.friends]
//! prefix = "friends/"    # Routes under this prefix get avatar/banner processing
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FriendsConfig {
    /// Route prefix of the friends page. Empty disables the transform.
    pub prefix: String,
}

impl Default for FriendsConfig {
    fn default() -> Self {
        Self {
            prefix: "friends/".into(),
        }
    }
}

impl FriendsConfig {
    /// Check whether a route lies in the friends namespace.
    pub fn contains(&self, path: &str) -> bool {
        !self.prefix.is_empty() && path.starts_with(&self.prefix)
    }
}
