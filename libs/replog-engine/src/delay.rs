use std::time::Duration;

use rand::Rng;

/// Simulated replication latency applied after an append is stored.
///
/// Implementations must be cheap: `next_delay` is called once per request,
/// outside the store lock.
pub trait IngestDelay: Send + Sync + std::fmt::Debug {
    fn next_delay(&self) -> Duration;
}

/// Respond immediately. Used by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl IngestDelay for NoDelay {
    fn next_delay(&self) -> Duration {
        Duration::ZERO
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl IngestDelay for FixedDelay {
    fn next_delay(&self) -> Duration {
        self.0
    }
}

/// Uniform delay in `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    /// `None` when `min > max`.
    pub fn new(min: Duration, max: Duration) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }
}

impl IngestDelay for RandomDelay {
    fn next_delay(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}
