//! Medication reminder scheduling
//!
//! The scheduler owns the reminder list, keeps it in the local key-value
//! store, and raises notifications when doses come due. Due doses are found
//! two ways: a one-shot timer armed at each reminder's `next_dose`, and a
//! periodic sweep over the whole list. The sweep is the backstop for timers
//! lost to suspension.
//!
//! The sweep skips reminders already notified for their current dose; armed
//! timers do not check, so a dose the sweep caught first can be announced a
//! second time when its timer fires. That duplicate is accepted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use validator::Validate;

use health_pulse_data::repository::KeyValueStore;

use crate::entities::medication::{Medication, Reminder, ReminderState};
use crate::services::clock::Clock;
use crate::services::notifications::{NotificationOptions, Notifier, Permission};
use crate::services::records::validation_message;
use crate::services::schedule::{calculate_next_dose, describe_schedule, format_dose_time, next_dose_after};

/// Key the reminder list is stored under
pub const REMINDER_STORAGE_KEY: &str = "medicationReminders";

/// How often the sweep runs
pub const SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(60);

/// Title used for every reminder notification
pub const NOTIFICATION_TITLE: &str = "Medication Reminder";

/// Scheduler errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// No reminder with this id
    #[error("Reminder not found: {0}")]
    ReminderNotFound(String),

    /// Medication details failed validation
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Owns the reminder list and its timers
pub struct ReminderScheduler {
    reminders: Vec<Reminder>,
    /// One-shot timers: reminder id -> deadline
    timers: HashMap<String, NaiveDateTime>,
    last_id: i64,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("reminders", &self.reminders.len())
            .field("armed_timers", &self.timers.len())
            .finish()
    }
}

impl ReminderScheduler {
    /// Create an empty scheduler. Call [`load`](Self::load) to restore a
    /// previously stored list.
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reminders: Vec::new(),
            timers: HashMap::new(),
            last_id: 0,
            store,
            notifier,
            clock,
        }
    }

    /// Restore the stored reminder list and arm a timer for each entry
    ///
    /// Missing, unreadable or corrupt storage leaves the scheduler empty.
    /// Returns the number of reminders loaded.
    pub fn load(&mut self) -> usize {
        let raw = match self.store.get(REMINDER_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored reminders");
                return 0;
            }
            Err(e) => {
                warn!("Reminder storage unavailable, starting with an empty list: {}", e);
                return 0;
            }
        };

        let reminders: Vec<Reminder> = match serde_json::from_str(&raw) {
            Ok(reminders) => reminders,
            Err(e) => {
                error!("Stored reminder list is corrupt, ignoring it: {}", e);
                return 0;
            }
        };

        self.timers.clear();
        for reminder in &reminders {
            self.timers.insert(reminder.id.clone(), reminder.next_dose);
            if let Ok(id) = reminder.id.parse::<i64>() {
                self.last_id = self.last_id.max(id);
            }
        }
        self.reminders = reminders;

        info!("Loaded {} reminders", self.reminders.len());
        self.reminders.len()
    }

    /// All reminders, in creation order
    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    /// Look up a reminder by id
    pub fn get(&self, id: &str) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    /// Ask the platform for notification permission
    pub fn request_permission(&self) -> Permission {
        let permission = self.notifier.request_permission();
        info!("Notification permission: {:?}", permission);
        permission
    }

    /// Add a reminder for a medication
    ///
    /// The id is the creation time in milliseconds, bumped past the last
    /// issued id so ids stay unique and increasing within one list.
    pub fn add_reminder(&mut self, medication: Medication) -> Result<Reminder, SchedulerError> {
        medication
            .validate()
            .map_err(|e| SchedulerError::ValidationError(validation_message(&e)))?;

        let now = self.clock.now();
        let id = now.and_utc().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;

        let reminder = Reminder {
            id: id.to_string(),
            next_dose: calculate_next_dose(&medication, now),
            name: medication.name,
            dosage: medication.dosage,
            frequency: medication.frequency,
            time: medication.time,
            last_taken: None,
            state: ReminderState::Scheduled,
        };

        info!(
            reminder_id = %reminder.id,
            "Added reminder for {} ({}), next dose {}",
            reminder.name,
            describe_schedule(&reminder.medication()),
            reminder.next_dose
        );

        self.reminders.push(reminder.clone());
        self.persist();
        self.arm_timer(&reminder.id, reminder.next_dose);
        Ok(reminder)
    }

    /// Record a dose as taken and schedule the next one
    ///
    /// The next dose is computed from the reminder's own schedule, starting
    /// from the later of now and the current `next_dose`, so taking a dose
    /// early consumes that dose instead of leaving it pending.
    pub fn mark_as_taken(&mut self, id: &str) -> Result<Reminder, SchedulerError> {
        let now = self.clock.now();
        let reminder = self
            .reminders
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| SchedulerError::ReminderNotFound(id.to_string()))?;

        let reference = now.max(reminder.next_dose);
        reminder.last_taken = Some(now);
        reminder.next_dose = next_dose_after(&reminder.medication(), reference);
        reminder.state = ReminderState::Scheduled;
        let updated = reminder.clone();

        info!(reminder_id = %id, "Dose taken, next dose {}", updated.next_dose);

        self.persist();
        self.arm_timer(&updated.id, updated.next_dose);
        Ok(updated)
    }

    /// Fire every armed timer whose deadline has passed
    ///
    /// Timers are one-shot: a fired timer stays disarmed until the reminder
    /// is rescheduled. Returns the number of notifications raised.
    pub fn fire_expired_timers(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<String> = self
            .timers
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();

        let mut fired = 0;
        for id in expired {
            self.timers.remove(&id);
            if let Some(reminder) = self.reminders.iter_mut().find(|r| r.id == id) {
                debug!(reminder_id = %id, "Reminder timer fired");
                notify_due(self.notifier.as_ref(), reminder);
                reminder.state = ReminderState::Notified;
                fired += 1;
            }
        }

        if fired > 0 {
            self.persist();
        }
        fired
    }

    /// Notify every due reminder not yet notified for its current dose
    ///
    /// Returns the number of notifications raised.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;

        for reminder in self.reminders.iter_mut() {
            if reminder.state == ReminderState::Scheduled && reminder.is_due(now) {
                debug!(reminder_id = %reminder.id, "Sweep found due reminder");
                notify_due(self.notifier.as_ref(), reminder);
                reminder.state = ReminderState::Notified;
                fired += 1;
            }
        }

        if fired > 0 {
            self.persist();
        }
        fired
    }

    /// Earliest armed timer deadline, if any
    pub fn next_timer_deadline(&self) -> Option<NaiveDateTime> {
        self.timers.values().min().copied()
    }

    /// Number of armed timers
    pub fn armed_timers(&self) -> usize {
        self.timers.len()
    }

    /// Arm (or re-arm) the one-shot timer for a reminder
    fn arm_timer(&mut self, id: &str, deadline: NaiveDateTime) {
        debug!(reminder_id = %id, "Timer armed for {}", deadline);
        self.timers.insert(id.to_string(), deadline);
    }

    /// Write the whole list to the key-value store
    ///
    /// Failures are logged; the in-memory list stays authoritative.
    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.reminders) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("Failed to serialize reminders: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(REMINDER_STORAGE_KEY, &serialized) {
            warn!("Failed to persist reminders, keeping them in memory: {}", e);
        }
    }
}

fn notify_due(notifier: &dyn Notifier, reminder: &Reminder) {
    if notifier.permission() != Permission::Granted {
        info!(
            reminder_id = %reminder.id,
            "Notification permission not granted, skipping reminder for {}", reminder.name
        );
        return;
    }

    notifier.show(
        NOTIFICATION_TITLE,
        NotificationOptions {
            body: format!(
                "Time to take {} ({}), due {}",
                reminder.name,
                reminder.dosage,
                format_dose_time(reminder.next_dose)
            ),
            tag: Some(format!("reminder-{}", reminder.id)),
            reminder_id: Some(reminder.id.clone()),
            require_interaction: true,
        },
    );
}
