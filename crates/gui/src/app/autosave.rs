//! Autosave scheduling
//!
//! The design is written once it has been quiet for a moment and no drag
//! is in progress, so pointer moves never hit the disk.

use std::time::{Duration, Instant};

/// Quiet period before a changed design is written
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(1500);

pub struct AutosaveTimer {
    saved_revision: u64,
    seen_revision: u64,
    changed_at: Instant,
}

impl AutosaveTimer {
    pub fn new(revision: u64) -> Self {
        Self {
            saved_revision: revision,
            seen_revision: revision,
            changed_at: Instant::now(),
        }
    }

    /// True when the design at `revision` should be written now
    pub fn poll(&mut self, revision: u64, dragging: bool, now: Instant) -> bool {
        if revision == self.saved_revision {
            self.seen_revision = revision;
            return false;
        }
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.changed_at = now;
        }
        !dragging && now.duration_since(self.changed_at) >= AUTOSAVE_DELAY
    }

    pub fn mark_saved(&mut self, revision: u64) {
        self.saved_revision = revision;
        self.seen_revision = revision;
    }

    /// Unsaved changes exist
    pub fn is_dirty(&self) -> bool {
        self.seen_revision != self.saved_revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_never_saves() {
        let start = Instant::now();
        let mut timer = AutosaveTimer::new(3);
        assert!(!timer.poll(3, false, start + AUTOSAVE_DELAY * 4));
        assert!(!timer.is_dirty());
    }

    #[test]
    fn test_waits_for_quiet_period() {
        let start = Instant::now();
        let mut timer = AutosaveTimer::new(0);
        assert!(!timer.poll(1, false, start));
        assert!(timer.is_dirty());
        assert!(!timer.poll(1, false, start + AUTOSAVE_DELAY / 2));
        assert!(timer.poll(1, false, start + AUTOSAVE_DELAY));
        timer.mark_saved(1);
        assert!(!timer.poll(1, false, start + AUTOSAVE_DELAY * 2));
    }

    #[test]
    fn test_drag_frames_do_not_save() {
        let start = Instant::now();
        let step = Duration::from_millis(16);
        let mut timer = AutosaveTimer::new(0);
        // One revision per frame for a long drag
        for frame in 1..=200u32 {
            assert!(!timer.poll(u64::from(frame), true, start + step * frame));
        }
        let released = start + step * 200;
        assert!(!timer.poll(200, false, released));
        assert!(timer.poll(200, false, released + AUTOSAVE_DELAY));
    }

    #[test]
    fn test_new_change_restarts_wait() {
        let start = Instant::now();
        let mut timer = AutosaveTimer::new(0);
        timer.poll(1, false, start);
        assert!(!timer.poll(2, false, start + AUTOSAVE_DELAY));
        assert!(timer.poll(2, false, start + AUTOSAVE_DELAY * 2));
    }
}
