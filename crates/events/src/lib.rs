//! Helios event bus and notification infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope.
//! - [`NotificationPersistence`]: background service that records every
//!   event in a [`NotificationLog`].
//! - [`delivery`]: external delivery channels (email).
//! - [`EventNotifier`]: the core `Notifier` seam wired to the bus and email.

pub mod bus;
pub mod delivery;
pub mod log;
pub mod notifier;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use log::{InMemoryNotificationLog, NotificationLog, PgNotificationLog};
pub use notifier::EventNotifier;
pub use persistence::NotificationPersistence;
