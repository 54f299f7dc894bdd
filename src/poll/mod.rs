use std::future::Future;
use std::time::Duration;
use tokio::{signal, time};
use tracing::info;

/// Fixed-interval driver. Each tick awaits the callback before the next tick
/// fires; missed ticks are delayed rather than bursted.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    max_iterations: Option<u64>,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self { interval, max_iterations: None }
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Runs until Ctrl-C or the iteration limit. Returns the number of ticks.
    pub async fn run<F, Fut>(&self, mut tick: F) -> u64
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        let mut count = 0u64;
        let mut ctrl_c = Box::pin(signal::ctrl_c());

        loop {
            if self.max_iterations.is_some_and(|max| count >= max) {
                break;
            }
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!(iterations = count, "polling interrupted");
                    break;
                }
                _ = interval.tick() => {
                    tick(count).await;
                    count += 1;
                }
            }
        }
        count
    }
}
