//! Background task that delivers medication reminders
//!
//! One task owns the timing: it sleeps until the earliest armed reminder
//! deadline, sweeps the whole list every sweep interval, and wakes early
//! when reminders change.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use health_pulse_domain::services::{Clock, ReminderScheduler};

use crate::context::AppContext;

/// Start the driver for the context's scheduler
pub fn spawn_reminder_driver(context: &AppContext, sweep_interval: Duration) -> JoinHandle<()> {
    tokio::spawn(run_reminder_driver(
        context.scheduler.clone(),
        context.reminders_changed.clone(),
        context.clock.clone(),
        sweep_interval,
    ))
}

pub async fn run_reminder_driver(
    scheduler: Arc<Mutex<ReminderScheduler>>,
    changed: Arc<Notify>,
    clock: Arc<dyn Clock>,
    sweep_interval: Duration,
) {
    info!("Reminder driver started, sweeping every {}s", sweep_interval.as_secs());

    let mut sweep = time::interval(sweep_interval);
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let next_deadline = scheduler.lock().await.next_timer_deadline();
        let wait = next_deadline.map(|deadline| (deadline - clock.now()).to_std().unwrap_or(Duration::ZERO));

        tokio::select! {
            _ = sweep.tick() => {
                let fired = scheduler.lock().await.sweep();
                if fired > 0 {
                    debug!("Sweep raised {} reminder(s)", fired);
                }
            }
            _ = sleep_or_forever(wait) => {
                let fired = scheduler.lock().await.fire_expired_timers();
                debug!("Timers raised {} reminder(s)", fired);
            }
            _ = changed.notified() => {
                debug!("Reminders changed, re-arming");
            }
        }
    }
}

async fn sleep_or_forever(wait: Option<Duration>) {
    match wait {
        Some(wait) => time::sleep(wait).await,
        None => std::future::pending().await,
    }
}
