//! Request pacing between Clockify API calls.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

/// Enforces a minimum interval between consecutive API requests. Clockify
/// throttles bursts well below its documented rate limit, so every client
/// call waits its turn here first.
#[derive(Clone, Debug)]
pub struct RequestPacer {
    interval: Duration,
    previous: Arc<Mutex<Option<Instant>>>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            previous: Arc::new(Mutex::new(None)),
        }
    }

    /// Sleeps out whatever remains of the interval since the previous call,
    /// then records this call. Returns the time actually slept.
    pub async fn await_turn(&self) -> Duration {
        let mut previous = self.previous.lock().await;
        let mut slept = Duration::ZERO;
        if let Some(last) = *previous {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                slept = self.interval - elapsed;
                sleep(slept).await;
            }
        }
        *previous = Some(Instant::now());
        slept
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::RequestPacer;
    use std::time::Duration;

    #[tokio::test]
    async fn first_turn_does_not_sleep() {
        let pacer = RequestPacer::new(Duration::from_millis(50));
        assert_eq!(pacer.await_turn().await, Duration::ZERO);
    }

    #[tokio::test]
    async fn second_turn_waits_out_the_interval() {
        let pacer = RequestPacer::new(Duration::from_millis(40));
        pacer.await_turn().await;

        let start = std::time::Instant::now();
        let slept = pacer.await_turn().await;

        assert!(slept > Duration::ZERO);
        assert!(start.elapsed() >= Duration::from_millis(35));
    }
}
