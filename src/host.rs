use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Base CSS class hosts conventionally give to block wrappers.
pub const DEFAULT_BLOCK_STYLE: &str = "cdx-block";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStyle {
    Success,
    Error,
}

impl fmt::Display for NotificationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationStyle::Success => f.write_str("success"),
            NotificationStyle::Error => f.write_str("error"),
        }
    }
}

/// A user-visible toast, as accepted by the host notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub style: NotificationStyle,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            style: NotificationStyle::Error,
        }
    }
}

/// The slice of the host editor API a block consumes.
pub trait HostApi: Send + Sync {
    /// Localizes a message key. Hosts without i18n return the key.
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }

    fn notify(&self, notification: Notification);

    fn block_style(&self) -> &str {
        DEFAULT_BLOCK_STYLE
    }
}

/// Host stand-in for headless use: notifications go to the log.
#[derive(Debug, Clone, Default)]
pub struct TracingHost;

impl HostApi for TracingHost {
    fn notify(&self, notification: Notification) {
        match notification.style {
            NotificationStyle::Error => {
                warn!(message = %notification.message, "Block notification");
            }
            NotificationStyle::Success => {
                info!(message = %notification.message, "Block notification");
            }
        }
    }
}
