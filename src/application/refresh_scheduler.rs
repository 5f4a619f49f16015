// Refresh scheduler - One repeating timer per widget
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

struct ArmedTimer {
    period: Duration,
    handle: JoinHandle<()>,
}

/// Owns at most one repeating timer. Re-arming always cancels the previous
/// timer first, and dropping the scheduler cancels whatever is armed.
#[derive(Default)]
pub struct RefreshScheduler {
    active: Option<ArmedTimer>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current timer. `None` (or a zero period) leaves the
    /// scheduler disarmed. The first tick fires one full period after arming;
    /// each tick spawns `tick()` without waiting for earlier ones to finish.
    pub fn rearm<F, Fut>(&mut self, period: Option<Duration>, tick: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let Some(period) = period.filter(|p| !p.is_zero()) else {
            tracing::debug!("Auto refresh disabled");
            return;
        };

        let start = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tokio::spawn(tick());
            }
        });

        tracing::debug!("Auto refresh armed every {:?}", period);
        self.active = Some(ArmedTimer { period, handle });
    }

    pub fn cancel(&mut self) {
        if let Some(timer) = self.active.take() {
            timer.handle.abort();
        }
    }

    pub fn period(&self) -> Option<Duration> {
        self.active.as_ref().map(|t| t.period)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_tick(counter: &Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<()> + Send + 'static {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_rearm_leaves_one_timer_with_latest_period() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();

        for ms in [10, 20, 30, 40, 50] {
            scheduler.rearm(Some(Duration::from_millis(ms)), counting_tick(&counter));
        }

        assert_eq!(scheduler.period(), Some(Duration::from_millis(50)));

        tokio::time::sleep(Duration::from_millis(175)).await;
        // Only the 50ms timer fires: at 50, 100 and 150ms
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_disarms() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();

        scheduler.rearm(Some(Duration::from_millis(10)), counting_tick(&counter));
        scheduler.rearm(Some(Duration::ZERO), counting_tick(&counter));
        assert_eq!(scheduler.period(), None);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let mut scheduler = RefreshScheduler::new();
            scheduler.rearm(Some(Duration::from_millis(10)), counting_tick(&counter));
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        let fired = counter.load(Ordering::SeqCst);
        assert_eq!(fired, 2);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), fired);
    }
}
