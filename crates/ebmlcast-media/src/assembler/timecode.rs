//! Two-slot history of recent Cluster timecodes.

use std::ops::Range;

/// A decoded Timecode and where its payload sits in the stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimecodeEntry {
    pub value: u64,
    /// Absolute range of the Timecode element's payload.
    pub range: Range<u64>,
}

/// Sliding window over the last two Timecodes. Both slots start at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimecodeHistory {
    older: TimecodeEntry,
    newest: TimecodeEntry,
}

impl TimecodeHistory {
    /// Record a new Timecode, evicting the older slot.
    pub fn push(&mut self, entry: TimecodeEntry) {
        self.older = std::mem::replace(&mut self.newest, entry);
    }

    pub fn newest(&self) -> &TimecodeEntry {
        &self.newest
    }

    pub fn older(&self) -> &TimecodeEntry {
        &self.older
    }

    /// Duration reported for the held-back Cluster: older minus newest.
    pub fn lookahead_duration(&self) -> i64 {
        (self.older.value as i64).wrapping_sub(self.newest.value as i64)
    }
}
