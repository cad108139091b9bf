//! Toggle-driven repeating notes refresh.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Fixed polling period.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub type TickFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
pub type TickFn = Arc<dyn Fn() -> TickFuture + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingState {
    Idle,
    Polling,
}

/// Owns at most one polling task; the task is aborted when polling is turned
/// off or the controller is dropped.
pub struct PollingController {
    period: Duration,
    tick: TickFn,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PollingController {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PollingController")
            .field("period", &self.period)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl PollingController {
    /// Must be created inside a tokio runtime before polling is started.
    pub fn new(period: Duration, tick: TickFn) -> Self {
        Self {
            period,
            tick,
            task: None,
        }
    }

    pub const fn state(&self) -> PollingState {
        if self.task.is_some() {
            PollingState::Polling
        } else {
            PollingState::Idle
        }
    }

    pub fn toggle(&mut self) -> PollingState {
        match self.state() {
            PollingState::Idle => self.start(),
            PollingState::Polling => self.stop(),
        }
        self.state()
    }

    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        let period = self.period;
        let tick = Arc::clone(&self.tick);
        tracing::debug!(period_ms = period.as_millis(), "Polling started");
        // First refresh fires one full period after start, like setInterval.
        let first_tick = Instant::now() + period;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tick().await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Polling stopped");
        }
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::advance;

    use super::*;

    fn counting_controller(period: Duration) -> (PollingController, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let tick_count = Arc::clone(&count);
        let tick: TickFn = Arc::new(move || -> TickFuture {
            let tick_count = Arc::clone(&tick_count);
            Box::pin(async move {
                tick_count.fetch_add(1, Ordering::SeqCst);
            })
        });
        (PollingController::new(period, tick), count)
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_flips_between_states() {
        let (mut controller, _count) = counting_controller(POLL_INTERVAL);
        assert_eq!(controller.state(), PollingState::Idle);
        assert_eq!(controller.toggle(), PollingState::Polling);
        assert_eq!(controller.toggle(), PollingState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_ticks_at_fixed_cadence() {
        let (mut controller, count) = counting_controller(POLL_INTERVAL);
        controller.start();
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        advance(POLL_INTERVAL).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        for _ in 0..2 {
            advance(POLL_INTERVAL).await;
            settle().await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn toggling_off_within_one_interval_cancels_the_timer() {
        let (mut controller, count) = counting_controller(POLL_INTERVAL);
        controller.toggle();
        settle().await;
        advance(Duration::from_secs(2)).await;
        controller.toggle();

        advance(POLL_INTERVAL * 4).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(controller.state(), PollingState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_controller_cancels_the_timer() {
        let (mut controller, count) = counting_controller(POLL_INTERVAL);
        controller.start();
        settle().await;
        drop(controller);

        advance(POLL_INTERVAL * 3).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_keeps_a_single_timer() {
        let (mut controller, count) = counting_controller(POLL_INTERVAL);
        controller.start();
        controller.start();
        settle().await;

        advance(POLL_INTERVAL).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
