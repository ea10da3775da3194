//! Segment stream configuration.

use crate::error::{Error, Result};

/// Default retained window: 10 MiB.
pub const DEFAULT_BUFFER_CAPACITY: usize = 10 * 1024 * 1024;

/// Construction-time options for a [`crate::SegmentStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct StreamConfig {
    /// Size of the retained window in bytes. Must be positive.
    pub buffer_capacity: usize,
    /// Hold each Cluster back until the next Timecode gives its duration.
    pub compute_durations: bool,
    /// Zero the Timecode payload inside emitted Cluster bytes.
    pub redact_timecodes: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            compute_durations: false,
            redact_timecodes: false,
        }
    }
}

impl StreamConfig {
    /// Set the buffer capacity.
    pub fn buffer_capacity(mut self, bytes: usize) -> Self {
        self.buffer_capacity = bytes;
        self
    }

    /// Enable or disable duration lookahead.
    pub fn compute_durations(mut self, enabled: bool) -> Self {
        self.compute_durations = enabled;
        self
    }

    /// Enable or disable timecode redaction.
    pub fn redact_timecodes(mut self, enabled: bool) -> Self {
        self.redact_timecodes = enabled;
        self
    }

    /// Set the capacity from a signed value as read from untyped input,
    /// rejecting non-positive values instead of clamping them.
    pub fn try_buffer_capacity(self, bytes: i64) -> Result<Self> {
        let capacity = usize::try_from(bytes)
            .ok()
            .filter(|&c| c > 0)
            .ok_or_else(|| {
                Error::invalid_config(format!(
                    "buffer capacity must be a positive integer, got {bytes}"
                ))
            })?;
        Ok(self.buffer_capacity(capacity))
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(Error::invalid_config(
                "buffer capacity must be a positive integer, got 0",
            ));
        }
        Ok(())
    }
}
