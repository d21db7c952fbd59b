/// In-process alert bus, the client-side analog of the dashboard toast tray.
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub const FORBIDDEN_ALERT_TITLE: &str = "Access denied";
pub const FORBIDDEN_ALERT_MESSAGE: &str = "You do not have permission to perform this action";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Error,
    Warning,
    Info,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Success => "success",
            AlertKind::Error => "error",
            AlertKind::Warning => "warning",
            AlertKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(kind: AlertKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert::new(AlertKind::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert::new(AlertKind::Error, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert::new(AlertKind::Warning, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert::new(AlertKind::Info, title, message)
    }

    /// The fixed alert published when the backend answers 403.
    pub fn forbidden() -> Self {
        Alert::warning(FORBIDDEN_ALERT_TITLE, FORBIDDEN_ALERT_MESSAGE)
    }
}

/// Broadcast fan-out for alerts. Publishing never fails; with no subscribers
/// the alert is dropped.
#[derive(Debug, Clone)]
pub struct AlertBus {
    tx: broadcast::Sender<Alert>,
}

impl AlertBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        AlertBus { tx }
    }

    pub fn publish(&self, alert: Alert) {
        let _ = self.tx.send(alert);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Alert> {
        self.tx.subscribe()
    }
}

impl Default for AlertBus {
    fn default() -> Self {
        AlertBus::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_alert() {
        let alert = Alert::forbidden();
        assert_eq!(alert.kind, AlertKind::Warning);
        assert_eq!(alert.title, FORBIDDEN_ALERT_TITLE);
    }

    #[test]
    fn test_alert_serialization() {
        let alert = Alert::success("Saved", "Club updated");
        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains("\"success\""));

        let back: Alert = serde_json::from_str(&json).unwrap();
        assert_eq!(back, alert);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = AlertBus::new();
        bus.publish(Alert::info("Heads up", "No listeners yet"));
    }

    #[test]
    fn test_subscriber_receives_alert() {
        let bus = AlertBus::new();
        let mut rx = bus.subscribe();
        bus.publish(Alert::error("Failed", "Could not reach the server"));

        let received = tokio_test::block_on(rx.recv()).unwrap();
        assert_eq!(received.kind, AlertKind::Error);
        assert_eq!(received.title, "Failed");
    }
}
