//! Per-step diagnostics.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Snapshot of one engine step.
///
/// `time` is the simulated time at the start of the step; the step
/// advanced the clock by `dt`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepTrace {
    /// 1-based step number.
    pub step: usize,
    /// Simulated time at the start of the step.
    pub time: f64,
    /// Step length.
    pub dt: f64,
    /// Discrete contact area, coverage-weighted.
    pub contact_area: f64,
    /// Number of cells in the contact footprint.
    pub contact_cells: usize,
    /// Largest pressure sample in the step.
    pub peak_pressure: f64,
    /// Volume removed by this step.
    pub volume_removed: f64,
    /// Total volume removed up to and including this step.
    pub cumulative_volume: f64,
}

/// Bounded buffer of recent step traces.
///
/// Holds at most `capacity` entries; pushing past capacity drops the
/// oldest entry and counts the drop. A capacity of zero records nothing.
#[derive(Debug, Clone)]
pub struct TraceBuffer {
    capacity: usize,
    entries: VecDeque<StepTrace>,
    dropped: usize,
}

impl TraceBuffer {
    /// Empty buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
            dropped: 0,
        }
    }

    /// Maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries dropped since construction or the last drain.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<&StepTrace> {
        self.entries.back()
    }

    /// Retained entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &StepTrace> {
        self.entries.iter()
    }

    /// Appends a trace, dropping the oldest entry when full.
    pub fn push(&mut self, trace: StepTrace) {
        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(trace);
    }

    /// Removes and returns all retained entries, oldest first, and
    /// resets the drop counter.
    pub fn drain(&mut self) -> Vec<StepTrace> {
        self.dropped = 0;
        self.entries.drain(..).collect()
    }
}
