use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Notification permission as reported by the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// The user has not been asked yet
    #[default]
    Default,
}

impl Permission {
    /// Parse `granted` / `denied` / `default`
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "granted" => Some(Permission::Granted),
            "denied" => Some(Permission::Denied),
            "default" => Some(Permission::Default),
            _ => None,
        }
    }
}

/// Display options for a notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub body: String,
    /// Replaces an earlier notification with the same tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Reminder the notification belongs to, for click handling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_id: Option<String>,
    #[serde(default)]
    pub require_interaction: bool,
}

/// Platform notification API
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Current permission
    fn permission(&self) -> Permission;

    /// Ask the user for permission
    fn request_permission(&self) -> Permission;

    /// Display a notification; fire-and-forget
    fn show(&self, title: &str, options: NotificationOptions);
}
