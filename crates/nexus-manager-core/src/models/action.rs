//! Provisioning action types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two operations the service performs against Nexus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Delete,
}

impl Action {
    /// Returns the action as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Delete => "delete",
        }
    }

    /// Returns the past tense used in response messages.
    pub fn past_tense(&self) -> &'static str {
        match self {
            Action::Create => "created",
            Action::Delete => "deleted",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
