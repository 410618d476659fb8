//! Transport configuration for `to_raw`/`from_raw`.

use crate::error::ConfigError;

/// Default size of the first buffer offered to a `get_*` bridge call.
pub const DEFAULT_PROBE_CAPACITY: usize = 256;

/// Settings for moving values across a [`HandleBridge`](crate::HandleBridge).
///
/// # Examples
///
/// ```
/// use arb_core::TransportConfig;
///
/// let config = TransportConfig::default().with_probe_capacity(64);
/// assert!(config.validate().is_ok());
/// assert!(TransportConfig::default().with_probe_capacity(0).validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    /// Size of the probe buffer used for the first read of each metadata
    /// blob and argument. Larger items cost a second, exactly-sized read.
    pub probe_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            probe_capacity: DEFAULT_PROBE_CAPACITY,
        }
    }
}

impl TransportConfig {
    /// Set the probe buffer size.
    pub fn with_probe_capacity(mut self, probe_capacity: usize) -> Self {
        self.probe_capacity = probe_capacity;
        self
    }

    /// Check the configuration for values that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_capacity == 0 {
            return Err(ConfigError::ZeroProbeCapacity);
        }
        Ok(())
    }
}
