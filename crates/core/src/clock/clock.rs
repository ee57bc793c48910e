use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Repeating task on a Tokio runtime, modelled on a platform interval timer:
/// the first tick fires one full period after spawning.
pub struct PeriodicClock;

impl PeriodicClock {
    pub fn spawn<F>(runtime: &Handle, period: Duration, mut on_tick: F) -> ClockHandle
    where
        F: FnMut() + Send + 'static,
    {
        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            // A late tick pushes the schedule back instead of bursting to catch up
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                on_tick();
            }
        });

        ClockHandle {
            task: Some(task),
            period,
        }
    }
}

/// Owner of a running [`PeriodicClock`]. Dropping it cancels the clock.
pub struct ClockHandle {
    task: Option<JoinHandle<()>>,
    period: Duration,
}

impl ClockHandle {
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Abort the clock task. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for ClockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockHandle")
            .field("period", &self.period)
            .field("active", &self.is_active())
            .finish()
    }
}
