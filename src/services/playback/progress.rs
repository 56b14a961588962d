use std::time::{Duration, Instant};

/// Interpolation anchor for elapsed-time display between transport updates.
///
/// Transports report progress only at discrete events or polls; the displayed
/// elapsed time in between is extrapolated from the last reported position
/// and the wall clock, clamped to the track length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressBaseline {
    /// Position reported by the transport.
    pub base: Duration,

    /// Track length at capture time.
    pub total: Duration,

    /// When the report was received.
    pub captured_at: Instant,
}

impl ProgressBaseline {
    /// Captures a fresh baseline.
    pub fn capture(base: Duration, total: Duration, captured_at: Instant) -> Self {
        Self {
            base,
            total,
            captured_at,
        }
    }

    /// The extrapolated elapsed time at `now`, clamped to the track length.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        let advanced = self
            .base
            .saturating_add(now.saturating_duration_since(self.captured_at));
        advanced.min(self.total)
    }

    /// Remaining time at `now`; zero at or past the end.
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.total.saturating_sub(self.elapsed_at(now))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn extrapolates_from_capture_time() {
        let t0 = Instant::now();
        let baseline = ProgressBaseline::capture(
            Duration::from_millis(5000),
            Duration::from_millis(10_000),
            t0,
        );

        assert_eq!(
            baseline.elapsed_at(t0 + Duration::from_millis(2000)),
            Duration::from_millis(7000)
        );
    }

    #[test]
    fn clamps_to_track_length() {
        let t0 = Instant::now();
        let baseline = ProgressBaseline::capture(
            Duration::from_millis(5000),
            Duration::from_millis(10_000),
            t0,
        );

        assert_eq!(
            baseline.elapsed_at(t0 + Duration::from_secs(60)),
            Duration::from_millis(10_000)
        );
        assert_eq!(baseline.remaining_at(t0 + Duration::from_secs(60)), Duration::ZERO);
    }

    #[test]
    fn remaining_counts_down() {
        let t0 = Instant::now();
        let baseline = ProgressBaseline::capture(
            Duration::from_millis(179_300),
            Duration::from_millis(180_000),
            t0,
        );

        assert_eq!(baseline.remaining_at(t0), Duration::from_millis(700));
    }
}
