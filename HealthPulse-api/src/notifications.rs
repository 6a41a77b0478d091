//! Server-side notifier: keeps shown notifications in an inbox clients poll

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use health_pulse_domain::services::{NotificationOptions, Notifier, Permission};

/// Notifications kept before the oldest are dropped
pub const INBOX_CAPACITY: usize = 100;

/// A notification as it was shown
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShownNotification {
    pub title: String,
    pub options: NotificationOptions,
    pub shown_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct InboxNotifier {
    permission: Mutex<Permission>,
    inbox: Mutex<VecDeque<ShownNotification>>,
}

impl InboxNotifier {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission: Mutex::new(permission),
            inbox: Mutex::new(VecDeque::new()),
        }
    }

    /// Shown notifications, newest first
    pub fn recent(&self) -> Vec<ShownNotification> {
        let inbox = self.inbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inbox.iter().rev().cloned().collect()
    }
}

impl Notifier for InboxNotifier {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Asking grants permission unless the user already denied it
    fn request_permission(&self) -> Permission {
        let mut permission = self.permission.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *permission == Permission::Default {
            *permission = Permission::Granted;
        }
        *permission
    }

    fn show(&self, title: &str, options: NotificationOptions) {
        info!(tag = ?options.tag, "Notification: {} - {}", title, options.body);

        let mut inbox = self.inbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if inbox.len() == INBOX_CAPACITY {
            inbox.pop_front();
        }
        inbox.push_back(ShownNotification {
            title: title.to_string(),
            options,
            shown_at: Utc::now(),
        });
    }
}
