//! Container configuration.
//!
//! [`ContainerOptions`] controls the two policy decisions the engine leaves
//! open: what happens when an owner-relative dependency cannot find its
//! member, and how deep nested resolution may go. With the `config` feature
//! the options can be loaded from JSON.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::internal::MAX_DEPTH;

/// Resolution policy knobs.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Container, ContainerOptions};
///
/// let options = ContainerOptions::default().strict_owners(true).max_depth(64);
/// let container = Container::builder().options(options).build();
/// assert!(container.options().strict_owners);
/// assert_eq!(container.options().max_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Raise `DiError::InvalidOwner` instead of resolving to no value when a
    /// property/method owner is not an object or lacks the member.
    pub strict_owners: bool,
    /// Maximum number of nested resolutions before `DiError::DepthExceeded`.
    pub max_depth: usize,
}

impl ContainerOptions {
    /// Sets [`strict_owners`](Self::strict_owners).
    pub fn strict_owners(mut self, strict: bool) -> Self {
        self.strict_owners = strict;
        self
    }

    /// Sets [`max_depth`](Self::max_depth).
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Parses options from JSON; missing fields take their defaults.
    ///
    /// ```rust
    /// use ferrous_injector::ContainerOptions;
    ///
    /// let options = ContainerOptions::from_json_str(r#"{ "strict_owners": true }"#).unwrap();
    /// assert!(options.strict_owners);
    /// assert_eq!(options.max_depth, ContainerOptions::default().max_depth);
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> crate::DiResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::DiError::Config(format!("invalid container options: {}", e)))
    }

    /// Serializes options to JSON.
    #[cfg(feature = "config")]
    pub fn to_json_string(&self) -> crate::DiResult<String> {
        serde_json::to_string(self)
            .map_err(|e| crate::DiError::Config(format!("cannot serialize options: {}", e)))
    }
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            strict_owners: false,
            max_depth: MAX_DEPTH,
        }
    }
}
