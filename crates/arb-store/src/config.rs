//! Store limits.

use arb_core::ConfigError;

/// Configuration for an [`ArbStore`](crate::ArbStore).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound on simultaneously live handles. `None` is unbounded.
    /// Allocations beyond the bound fail with `HandleAllocationFailed`.
    pub max_live_handles: Option<usize>,
}

impl StoreConfig {
    /// No limit on live handles.
    pub const fn unbounded() -> Self {
        Self {
            max_live_handles: None,
        }
    }

    /// Cap the number of live handles.
    pub fn with_max_live_handles(mut self, max: usize) -> Self {
        self.max_live_handles = Some(max);
        self
    }

    /// Reject limits that would refuse every allocation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_live_handles == Some(0) {
            return Err(ConfigError::ZeroHandleLimit);
        }
        Ok(())
    }
}
