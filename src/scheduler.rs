//! Background refresh scheduling.
//!
//! Two flavours:
//!
//! - [`spawn_refresh_loop`] runs a refresh cycle on a fixed interval.
//! - [`DailySchedule`] runs a job once a day at a wall-clock time and can be
//!   cancelled or moved to another time.
//!
//! Jobs run on tokio's blocking pool and are awaited before the next wait
//! starts, so two runs of the same schedule never overlap. Cancelling only
//! affects the wait; a job that already started runs to completion.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::updater::Updater;

/// Run `updater.update(false)` every `interval`, starting one interval from
/// now. Failed cycles are logged; the loop keeps going.
pub fn spawn_refresh_loop(updater: Arc<Updater>, interval: Duration) -> JoinHandle<()> {
    log::info!(
        "updater configured to refresh content every {} seconds",
        interval.as_secs()
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let updater = Arc::clone(&updater);
            match tokio::task::spawn_blocking(move || updater.update(false)).await {
                Ok(Ok(delta)) => log::debug!(
                    "refresh finished: {} topics, {} articles changed",
                    delta.topic_count(),
                    delta.article_count()
                ),
                Ok(Err(e)) => log::error!("error when updating content: {}", e),
                Err(e) => log::error!("refresh cycle panicked: {}", e),
            }
        }
    })
}

/// Next time `at` occurs strictly after `now`.
pub fn next_run(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

type Job = Arc<dyn Fn() + Send + Sync>;

/// A job that fires every day at a local wall-clock time.
pub struct DailySchedule {
    job: Job,
    state: Mutex<ScheduleState>,
}

struct ScheduleState {
    at: NaiveTime,
    pending: Option<JoinHandle<()>>,
}

impl DailySchedule {
    /// Schedule `job` daily at `at`. Must be called within a tokio runtime.
    pub fn start(at: NaiveTime, job: impl Fn() + Send + Sync + 'static) -> Self {
        let schedule = Self {
            job: Arc::new(job),
            state: Mutex::new(ScheduleState { at, pending: None }),
        };
        schedule.reschedule(at);
        schedule
    }

    /// Cancel the pending run and schedule the job at `at` instead.
    pub fn reschedule(&self, at: NaiveTime) {
        log::info!("rescheduling daily job for {}", at);
        let mut state = self.lock_state();
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        state.at = at;
        state.pending = Some(tokio::spawn(run_daily(at, Arc::clone(&self.job))));
    }

    /// Cancel the pending run. The job will not fire again.
    pub fn shutdown(&self) {
        if let Some(pending) = self.lock_state().pending.take() {
            pending.abort();
        }
    }

    /// Time of day the job is scheduled for.
    pub fn at(&self) -> NaiveTime {
        self.lock_state().at
    }

    pub fn is_active(&self) -> bool {
        self.lock_state()
            .pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn lock_state(&self) -> MutexGuard<'_, ScheduleState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for DailySchedule {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_daily(at: NaiveTime, job: Job) {
    loop {
        let now = Local::now().naive_local();
        let next = next_run(now, at);
        log::info!("task scheduled for {}", next);
        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        let job = Arc::clone(&job);
        if let Err(e) = tokio::task::spawn_blocking(move || job()).await {
            log::error!("scheduled job panicked: {}", e);
        }
    }
}
