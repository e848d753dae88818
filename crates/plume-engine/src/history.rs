//! Bounded, time-grouped undo history.
//!
//! Snapshot stacks with a fixed maximum depth. Edits recorded within a
//! short window of the previous one join its group instead of opening a
//! new undo step, so rapid keystrokes collapse into one entry. Time is
//! injected through `record_at`, which keeps the grouping rule testable
//! without sleeping.

use std::time::Duration;

use web_time::Instant;

/// History bounds: maximum depth and the grouping window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of undo steps retained; the oldest is evicted.
    pub depth: usize,
    /// Edits within this window of the previous edit join its undo group.
    pub group_within: Duration,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            depth: 100,
            group_within: Duration::from_millis(500),
        }
    }
}

/// Undo/redo stacks over cloneable document snapshots.
///
/// Each undo entry is the document state before the first edit of its
/// group. Undo and redo at the boundary return None; callers treat that
/// as a no-op, never an error.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    last_record: Option<Instant>,
    config: HistoryConfig,
}

impl<T: Clone> History<T> {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            last_record: None,
            config,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Record the state before an edit, using the current time for
    /// grouping.
    pub fn record(&mut self, before: T) {
        self.record_at(before, Instant::now());
    }

    /// Record the state before an edit at an explicit time.
    ///
    /// A new edit always clears the redo stack. If the edit falls within
    /// the grouping window of the previous one, the open group already
    /// holds the state before its first edit and nothing is pushed.
    pub fn record_at(&mut self, before: T, now: Instant) {
        self.redo_stack.clear();

        let grouped = self
            .last_record
            .is_some_and(|prev| now.saturating_duration_since(prev) <= self.config.group_within);
        self.last_record = Some(now);

        if grouped && !self.undo_stack.is_empty() {
            return;
        }

        self.undo_stack.push(before);
        while self.undo_stack.len() > self.config.depth {
            self.undo_stack.remove(0);
        }
    }

    /// Step back one group, exchanging the caller's current state.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let state = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        // The next edit after an undo always opens a fresh group.
        self.last_record = None;
        Some(state)
    }

    /// Step forward one group, exchanging the caller's current state.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let state = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        self.last_record = None;
        Some(state)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.last_record = None;
    }
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(depth: usize, group_ms: u64) -> HistoryConfig {
        HistoryConfig {
            depth,
            group_within: Duration::from_millis(group_ms),
        }
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut history: History<i32> = History::new(config(10, 0));
        let t = Instant::now();

        history.record_at(0, t);
        history.record_at(1, t + Duration::from_secs(1));

        assert_eq!(history.undo(2), Some(1));
        assert_eq!(history.undo(1), Some(0));
        assert_eq!(history.undo(0), None);

        assert_eq!(history.redo(0), Some(1));
        assert_eq!(history.redo(1), Some(2));
        assert_eq!(history.redo(2), None);
    }

    #[test]
    fn test_rapid_edits_group_into_one_step() {
        let mut history: History<i32> = History::new(config(10, 500));
        let t = Instant::now();

        // Three keystrokes 100ms apart: one undo step.
        history.record_at(0, t);
        history.record_at(1, t + Duration::from_millis(100));
        history.record_at(2, t + Duration::from_millis(200));

        assert_eq!(history.undo(3), Some(0));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_pause_opens_new_group() {
        let mut history: History<i32> = History::new(config(10, 500));
        let t = Instant::now();

        history.record_at(0, t);
        history.record_at(1, t + Duration::from_secs(2));

        assert_eq!(history.undo(2), Some(1));
        assert_eq!(history.undo(1), Some(0));
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history: History<i32> = History::new(config(10, 0));
        let t = Instant::now();

        history.record_at(0, t);
        assert_eq!(history.undo(1), Some(0));
        assert!(history.can_redo());

        history.record_at(0, t + Duration::from_secs(1));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_depth_evicts_oldest() {
        let mut history: History<i32> = History::new(config(3, 0));
        let t = Instant::now();

        for i in 0..4 {
            history.record_at(i, t + Duration::from_secs(i as u64));
        }

        assert_eq!(history.undo(4), Some(3));
        assert_eq!(history.undo(3), Some(2));
        assert_eq!(history.undo(2), Some(1));
        // The first entry was evicted.
        assert_eq!(history.undo(1), None);
    }

    #[test]
    fn test_edit_after_undo_starts_fresh_group() {
        let mut history: History<i32> = History::new(config(10, 500));
        let t = Instant::now();

        history.record_at(0, t);
        assert_eq!(history.undo(1), Some(0));

        // Immediately after the undo, within the grouping window, but the
        // undo reset grouping so this must become its own step.
        history.record_at(0, t + Duration::from_millis(100));
        assert_eq!(history.undo(5), Some(0));
    }
}
