use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do with a response whose load has since been superseded by a
/// newer load of the same slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleResponses {
    /// Drop it; the most recently issued load decides the slice.
    #[default]
    Discard,
    /// Apply it; whichever load resolves last decides the slice.
    Apply,
}

impl FromStr for StaleResponses {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discard" => Ok(StaleResponses::Discard),
            "apply" => Ok(StaleResponses::Apply),
            other => Err(format!(
                "invalid stale response policy '{}': use discard or apply",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub stale_responses: StaleResponses,
}

impl StoreConfig {
    #[must_use]
    pub fn with_stale_responses(mut self, policy: StaleResponses) -> Self {
        self.stale_responses = policy;
        self
    }
}
