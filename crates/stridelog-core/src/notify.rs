use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub scheduled_for: DateTime<Utc>,
}

/// Boundary to the platform's local-notification facility. Scheduling
/// semantics beyond this contract live with the platform adapter.
pub trait Notifier: Send + Sync {
    fn schedule(&self, request: NotificationRequest);
    fn cancel_all(&self);
}

/// Default sink that only logs. Useful on platforms without notification
/// support and in tests.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn schedule(&self, request: NotificationRequest) {
        tracing::info!(
            title = %request.title,
            scheduled_for = %request.scheduled_for,
            "notification scheduled"
        );
    }

    fn cancel_all(&self) {
        tracing::info!("all notifications cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_notifier_works_as_a_trait_object() {
        let notifier: Box<dyn Notifier> = Box::new(LogNotifier);
        notifier.schedule(NotificationRequest {
            title: "Habit reminder".into(),
            body: "Time to read".into(),
            scheduled_for: Utc::now(),
        });
        notifier.cancel_all();
    }
}
