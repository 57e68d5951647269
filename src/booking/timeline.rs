use std::time::Duration;

use super::session::Phase;

/// One scheduled phase advance, offset from the confirmation instant.
#[derive(Debug, Clone, Copy)]
pub struct TimelineStep {
    pub at: Duration,
    pub phase: Phase,
}

/// The scripted trip progression: en route 2 seconds after confirmation,
/// arrived 12 seconds after confirmation. Both offsets are measured from
/// the same instant, and the second is strictly later than the first, so
/// `EnRoute` is always observed before `Arrived`.
pub fn ride_timeline() -> Vec<TimelineStep> {
    vec![
        TimelineStep {
            at: Duration::from_secs(2),
            phase: Phase::EnRoute,
        },
        TimelineStep {
            at: Duration::from_secs(12),
            phase: Phase::Arrived,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_offsets_strictly_increase() {
        let timeline = ride_timeline();
        assert_eq!(timeline.len(), 2);
        assert!(timeline[0].at < timeline[1].at);
        assert_eq!(timeline[0].phase, Phase::EnRoute);
        assert_eq!(timeline[1].phase, Phase::Arrived);
    }
}
