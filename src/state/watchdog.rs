//! Reusable inactivity timer: warns once ahead of the deadline, then expires.

use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, sleep_until},
};

/// Background timer that fires `on_warning` `warning_lead` before `timeout` of
/// inactivity, then `on_expire` once the full timeout elapses.
///
/// Every [`touch`](Self::touch) restarts the idle period and re-arms the warning.
/// The callbacks run on the watchdog task and must not block. Dropping the
/// watchdog cancels it.
pub struct IdleWatchdog {
    activity: watch::Sender<Instant>,
    task: JoinHandle<()>,
}

impl IdleWatchdog {
    /// Start watching. A lead of zero (or one not shorter than the timeout)
    /// disables the warning.
    pub fn spawn<W, E>(timeout: Duration, warning_lead: Duration, on_warning: W, on_expire: E) -> Self
    where
        W: Fn(Duration) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let (activity, mut last_seen) = watch::channel(Instant::now());
        let warns = !warning_lead.is_zero() && warning_lead < timeout;

        let task = tokio::spawn(async move {
            let mut warned = false;
            loop {
                let deadline = *last_seen.borrow_and_update() + timeout;
                let wake_at = if warns && !warned {
                    deadline - warning_lead
                } else {
                    deadline
                };

                tokio::select! {
                    changed = last_seen.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        warned = false;
                    }
                    _ = sleep_until(wake_at) => {
                        if wake_at == deadline {
                            on_expire();
                            return;
                        }
                        warned = true;
                        on_warning(warning_lead);
                    }
                }
            }
        });

        Self { activity, task }
    }

    /// Record activity, pushing the deadline back by a full timeout.
    pub fn touch(&self) {
        let _ = self.activity.send(Instant::now());
    }

    /// Whether the watchdog already expired (or was cancelled).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for IdleWatchdog {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use tokio::time::advance;

    use super::*;

    struct Counters {
        warnings: Arc<AtomicUsize>,
        expiries: Arc<AtomicUsize>,
    }

    fn watch(timeout: u64, lead: u64) -> (IdleWatchdog, Counters) {
        let warnings = Arc::new(AtomicUsize::new(0));
        let expiries = Arc::new(AtomicUsize::new(0));
        let (w, e) = (warnings.clone(), expiries.clone());
        let dog = IdleWatchdog::spawn(
            Duration::from_secs(timeout),
            Duration::from_secs(lead),
            move |_| {
                w.fetch_add(1, Ordering::SeqCst);
            },
            move || {
                e.fetch_add(1, Ordering::SeqCst);
            },
        );
        (dog, Counters { warnings, expiries })
    }

    async fn settle(secs: u64) {
        advance(Duration::from_secs(secs)).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn warns_once_then_expires() {
        let (dog, counters) = watch(10, 3);
        tokio::task::yield_now().await;

        settle(6).await;
        assert_eq!(counters.warnings.load(Ordering::SeqCst), 0);

        settle(2).await;
        assert_eq!(counters.warnings.load(Ordering::SeqCst), 1);
        assert_eq!(counters.expiries.load(Ordering::SeqCst), 0);

        settle(3).await;
        assert_eq!(counters.warnings.load(Ordering::SeqCst), 1);
        assert_eq!(counters.expiries.load(Ordering::SeqCst), 1);
        assert!(dog.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn touch_postpones_expiry_and_rearms_warning() {
        let (dog, counters) = watch(10, 3);
        tokio::task::yield_now().await;

        settle(8).await;
        assert_eq!(counters.warnings.load(Ordering::SeqCst), 1);

        dog.touch();
        tokio::task::yield_now().await;
        settle(5).await;
        assert_eq!(counters.expiries.load(Ordering::SeqCst), 0);

        settle(3).await;
        assert_eq!(counters.warnings.load(Ordering::SeqCst), 2);

        settle(3).await;
        assert_eq!(counters.expiries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_cancels() {
        let (dog, counters) = watch(5, 1);
        tokio::task::yield_now().await;
        drop(dog);

        settle(30).await;
        assert_eq!(counters.warnings.load(Ordering::SeqCst), 0);
        assert_eq!(counters.expiries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_lead_skips_the_warning() {
        let (_dog, counters) = watch(5, 0);
        tokio::task::yield_now().await;

        settle(6).await;
        assert_eq!(counters.warnings.load(Ordering::SeqCst), 0);
        assert_eq!(counters.expiries.load(Ordering::SeqCst), 1);
    }
}
