use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Cycle timestamps that advance with the monotonic clock.
///
/// The wall clock is read once, when the clock is created. Later readings add the monotonic
/// time elapsed since then, so a wall-clock step (NTP correction, manual change) does not age
/// every tracked connection at once.
#[derive(Debug, Clone, Copy)]
pub struct CycleClock {
    wall_anchor: DateTime<Utc>,
    monotonic_anchor: Instant,
}

impl CycleClock {
    pub fn start() -> Self {
        Self::anchored_at(Utc::now())
    }

    pub fn anchored_at(wall_anchor: DateTime<Utc>) -> Self {
        Self {
            wall_anchor,
            monotonic_anchor: Instant::now(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.monotonic_anchor.elapsed())
            .unwrap_or(chrono::Duration::MAX);
        self.wall_anchor
            .checked_add_signed(elapsed)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
