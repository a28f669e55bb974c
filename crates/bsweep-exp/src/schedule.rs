use crate::config::RepeatPolicy;

/// Computes how many trials each primary point runs.
///
/// The scheduler is consulted once per primary size, before any of its trials
/// or secondary values, so every secondary value of a size shares its count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatScheduler {
    floor: u32,
    decrement: u32,
}

impl RepeatScheduler {
    /// Builds a scheduler from the configured policy.
    pub fn new(policy: &RepeatPolicy) -> Self {
        Self {
            floor: policy.floor.max(1),
            decrement: policy.decrement,
        }
    }

    /// Count for the next primary point given the previous one.
    ///
    /// Counts above the floor shrink by the decrement and are clamped to the
    /// floor; counts at or below the floor are returned unchanged.
    pub fn next_repeat_count(&self, previous: u32) -> u32 {
        if previous > self.floor {
            previous.saturating_sub(self.decrement).max(self.floor)
        } else {
            previous
        }
    }
}

/// Iterator over the counts of successive primary points, starting from the
/// policy's initial count.
#[derive(Debug, Clone)]
pub struct RepeatCounts {
    scheduler: RepeatScheduler,
    current: u32,
}

impl RepeatCounts {
    /// Starts a schedule at `policy.initial`.
    pub fn new(policy: &RepeatPolicy) -> Self {
        Self {
            scheduler: RepeatScheduler::new(policy),
            current: policy.initial,
        }
    }
}

impl Iterator for RepeatCounts {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        self.current = self.scheduler.next_repeat_count(self.current);
        Some(self.current)
    }
}
