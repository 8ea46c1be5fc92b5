//! Suspendable periodic lease renewal.
//!
//! At most one renewal task is armed per scheduler. Arming a new task always
//! cancels the previous one, and a task that decides the lease is gone
//! disarms itself so a later `start` begins from a clean slot.

use std::future::Future;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use weighbridge_domain::HeartbeatPhase;

struct ArmedTask {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct SchedulerShared {
    paused: AtomicBool,
    generation: AtomicU64,
    armed: Mutex<Option<ArmedTask>>,
}

impl SchedulerShared {
    fn armed(&self) -> MutexGuard<'_, Option<ArmedTask>> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn disarm_if_current(&self, generation: u64) {
        let mut armed = self.armed();
        if armed
            .as_ref()
            .is_some_and(|task| task.generation == generation)
        {
            armed.take();
        }
    }
}

/// Periodic timer driving lease renewals, in the Idle, Running or Paused phase.
pub struct HeartbeatScheduler {
    interval: Duration,
    shared: Arc<SchedulerShared>,
}

impl HeartbeatScheduler {
    /// Creates an idle scheduler ticking at the given period.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            shared: Arc::new(SchedulerShared::default()),
        }
    }

    /// Returns the renewal period.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arms the periodic task, cancelling any task armed before.
    ///
    /// The first tick fires one interval after arming. Ticks are skipped while
    /// the scheduler is paused; a tick returning `Break` stops the task.
    pub fn start<F, Fut>(&self, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let mut armed = self.shared.armed();
        if let Some(previous) = armed.take() {
            previous.handle.abort();
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let shared = Arc::clone(&self.shared);
        let period = self.interval;
        let first_tick = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if shared.paused.load(Ordering::SeqCst) {
                    continue;
                }

                if tick().await.is_break() {
                    shared.disarm_if_current(generation);
                    break;
                }
            }
        });

        *armed = Some(ArmedTask { generation, handle });
    }

    /// Cancels the armed task, if any. Safe to call in every phase.
    pub fn stop(&self) {
        if let Some(task) = self.shared.armed().take() {
            task.handle.abort();
        }
    }

    /// Suspends renewal and cancels the armed task without releasing anything.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
        self.stop();
    }

    /// Clears the paused flag; the caller decides whether to arm again.
    pub fn unpause(&self) {
        self.shared.paused.store(false, Ordering::SeqCst);
    }

    /// Returns true while renewal is suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// Returns true while a periodic task is armed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared
            .armed()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> HeartbeatPhase {
        if self.is_paused() {
            HeartbeatPhase::Paused
        } else if self.is_running() {
            HeartbeatPhase::Running
        } else {
            HeartbeatPhase::Idle
        }
    }
}

impl Drop for HeartbeatScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use weighbridge_domain::HeartbeatPhase;

    use super::HeartbeatScheduler;

    const PERIOD: Duration = Duration::from_secs(15);

    fn counting_tick(
        counter: &Arc<AtomicUsize>,
        stop_after: usize,
    ) -> impl FnMut() -> std::future::Ready<ControlFlow<()>> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            let seen = counter.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if seen >= stop_after {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_interval() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let scheduler = HeartbeatScheduler::new(PERIOD);
        scheduler.start(counting_tick(&ticks, usize::MAX));

        tokio::time::sleep(PERIOD - Duration::from_millis(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.phase(), HeartbeatPhase::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_replaces_the_previous_task() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let scheduler = HeartbeatScheduler::new(PERIOD);

        scheduler.start(counting_tick(&first, usize::MAX));
        scheduler.start(counting_tick(&second, usize::MAX));
        tokio::time::sleep(PERIOD * 3 + Duration::from_millis(1)).await;

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn break_disarms_the_task() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let scheduler = HeartbeatScheduler::new(PERIOD);
        scheduler.start(counting_tick(&ticks, 2));

        tokio::time::sleep(PERIOD * 5 + Duration::from_millis(1)).await;

        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.phase(), HeartbeatPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_and_pause_are_idempotent() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let scheduler = HeartbeatScheduler::new(PERIOD);

        scheduler.stop();
        scheduler.pause();
        scheduler.pause();
        assert_eq!(scheduler.phase(), HeartbeatPhase::Paused);

        scheduler.unpause();
        scheduler.start(counting_tick(&ticks, usize::MAX));
        scheduler.stop();
        scheduler.stop();
        tokio::time::sleep(PERIOD * 4).await;

        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.phase(), HeartbeatPhase::Idle);
    }
}
