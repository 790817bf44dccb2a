//! Fixed-interval background task with broadcast cancellation.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Default period between background refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Runs `tick` every `period` until stopped or until `tick` returns `false`.
///
/// The first tick fires one full period after [`Poller::spawn`]. Ticks must
/// not block: long work is expected to be spawned from inside `tick`, so
/// stopping the poller never cancels it.
pub struct Poller {
    shutdown: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Start the loop on the current tokio runtime.
    pub fn spawn<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (shutdown, mut shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        debug!("poller received shutdown");
                        break;
                    }
                    _ = interval.tick() => {
                        if !tick() {
                            debug!("poller tick asked to stop");
                            break;
                        }
                    }
                }
            }
        });
        info!(period_secs = period.as_secs_f64(), "poller started");
        Self { shutdown, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop scheduling further ticks.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        info!("poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn first_tick_after_one_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let _poller = Poller::spawn(Duration::from_secs(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        time::sleep(Duration::from_secs(9)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let poller = Poller::spawn(Duration::from_secs(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        time::sleep(Duration::from_secs(11)).await;
        poller.stop();
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_returning_false_ends_loop() {
        let poller = Poller::spawn(Duration::from_secs(1), || false);
        time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(!poller.is_running());
    }
}
