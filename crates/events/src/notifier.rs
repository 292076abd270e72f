//! [`EventNotifier`]: the `Notifier` used in production.
//!
//! Every notification becomes a `project.completed` event on the bus
//! sourced from the project (and so, via
//! [`NotificationPersistence`](crate::NotificationPersistence), a row in
//! `notifications` linked to it). When email is configured the same title and
//! content are mailed out; a failed send makes `notify` return `false`.

use std::sync::Arc;

use async_trait::async_trait;
use helios_core::store::Notifier;
use helios_core::types::DbId;

use crate::bus::{EventBus, PlatformEvent, PROJECT_COMPLETED};
use crate::delivery::email::EmailDelivery;

pub struct EventNotifier {
    bus: Arc<EventBus>,
    email: Option<EmailDelivery>,
}

impl EventNotifier {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus, email: None }
    }

    pub fn with_email(mut self, email: EmailDelivery) -> Self {
        self.email = Some(email);
        self
    }
}

#[async_trait]
impl Notifier for EventNotifier {
    async fn notify(&self, project_id: DbId, title: &str, content: &str) -> bool {
        let event = PlatformEvent::new(PROJECT_COMPLETED)
            .with_source("project", project_id)
            .with_message(title, content)
            .with_payload(serde_json::json!({ "project_id": project_id }));
        let receivers = self.bus.publish(event);
        tracing::debug!(receivers, project_id, "Completion event published");

        match &self.email {
            Some(email) => match email.send(title, content).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        project_id,
                        "Failed to send notification email"
                    );
                    false
                }
            },
            None => true,
        }
    }
}
