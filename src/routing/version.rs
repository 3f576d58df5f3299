//! API version range declarations.
//!
//! A [`VersionRange`] is attached to a handler or a handler group to state
//! which API versions it serves. It carries no behavior beyond resolving its
//! open-ended sentinel.

use serde::{Deserialize, Serialize};

/// Lowest API version a range may start at.
pub const MIN_API_VERSION: u32 = 1;

/// Highest API version currently served.
pub const MAX_API_VERSION: u32 = 3;

/// Path prefix that precedes the version number (`/v2/...`).
pub const VERSION_PREFIX: &str = "/v";

/// Inclusive range of API versions.
///
/// `until == 0` means open-ended: the range extends to the configured
/// maximum API version at expansion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionRange {
    /// Version in which the endpoint was introduced.
    pub from: u32,
    /// Last version (inclusive) in which the endpoint is available.
    pub until: u32,
}

impl Default for VersionRange {
    fn default() -> Self {
        Self {
            from: MIN_API_VERSION,
            until: 0,
        }
    }
}

impl VersionRange {
    pub const fn new(from: u32, until: u32) -> Self {
        Self { from, until }
    }

    /// Served from `from` up to the latest version.
    pub const fn since(from: u32) -> Self {
        Self { from, until: 0 }
    }

    /// Served from the first version up to `until`.
    pub const fn until(until: u32) -> Self {
        Self {
            from: MIN_API_VERSION,
            until,
        }
    }

    /// Served by exactly one version.
    pub const fn only(version: u32) -> Self {
        Self {
            from: version,
            until: version,
        }
    }

    pub const fn is_open_ended(&self) -> bool {
        self.until == 0
    }

    /// Upper bound after applying the open-ended sentinel.
    pub const fn effective_until(&self, max: u32) -> u32 {
        if self.is_open_ended() {
            max
        } else {
            self.until
        }
    }
}

impl std::fmt::Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_open_ended() {
            write!(f, "v{}+", self.from)
        } else {
            write!(f, "v{}..=v{}", self.from, self.until)
        }
    }
}
