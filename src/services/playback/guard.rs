use std::time::{Duration, Instant};

use super::types::TrackKey;

/// Debounce guard against duplicate auto-advance triggers.
///
/// End-of-track signals can arrive from several paths at once (embedded
/// state events, remote polls, the fallback timer, preview ended events).
/// The guard admits at most one advance per track identity per debounce
/// window; it is reset whenever the active track identity changes.
#[derive(Debug)]
pub struct AdvanceGuard {
    window: Duration,
    last_key: Option<TrackKey>,
    last_fired: Option<Instant>,
}

impl AdvanceGuard {
    /// Creates a guard with the given debounce window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_key: None,
            last_fired: None,
        }
    }

    /// Attempts to fire an advance for the given track identity.
    ///
    /// Returns true (and records the trigger) unless the same identity
    /// already fired within the debounce window.
    pub fn try_fire(&mut self, key: Option<&TrackKey>, now: Instant) -> bool {
        if self.last_key.as_ref() == key {
            if let Some(fired) = self.last_fired {
                if now.saturating_duration_since(fired) < self.window {
                    return false;
                }
            }
        }

        self.last_key = key.cloned();
        self.last_fired = Some(now);
        true
    }

    /// Resets the guard for a new active track identity.
    ///
    /// The next signal for this identity fires immediately.
    pub fn reset(&mut self, key: Option<TrackKey>) {
        self.last_key = key;
        self.last_fired = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key(s: &str) -> TrackKey {
        TrackKey::Catalog(s.to_string())
    }

    #[test]
    fn second_signal_within_window_is_suppressed() {
        let mut guard = AdvanceGuard::new(Duration::from_millis(1000));
        let t0 = Instant::now();

        assert!(guard.try_fire(Some(&key("a")), t0));
        assert!(!guard.try_fire(Some(&key("a")), t0 + Duration::from_millis(500)));
        assert!(guard.try_fire(Some(&key("a")), t0 + Duration::from_millis(1500)));
    }

    #[test]
    fn different_identity_fires_immediately() {
        let mut guard = AdvanceGuard::new(Duration::from_millis(1000));
        let t0 = Instant::now();

        assert!(guard.try_fire(Some(&key("a")), t0));
        assert!(guard.try_fire(Some(&key("b")), t0 + Duration::from_millis(100)));
    }

    #[test]
    fn unknown_identities_also_debounce() {
        let mut guard = AdvanceGuard::new(Duration::from_millis(1000));
        let t0 = Instant::now();

        assert!(guard.try_fire(None, t0));
        assert!(!guard.try_fire(None, t0 + Duration::from_millis(200)));
    }

    #[test]
    fn reset_allows_immediate_refire() {
        let mut guard = AdvanceGuard::new(Duration::from_millis(1000));
        let t0 = Instant::now();

        assert!(guard.try_fire(Some(&key("a")), t0));
        guard.reset(Some(key("a")));
        assert!(guard.try_fire(Some(&key("a")), t0 + Duration::from_millis(10)));
    }
}
