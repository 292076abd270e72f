use std::sync::Arc;

use helios_core::metrics::MetricsAggregator;
use helios_core::prediction::CompletionPredictor;
use helios_core::progress::ProgressTracker;
use helios_core::store::{Notifier, Stores};
use helios_events::NotificationLog;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database pool, absent when running on in-memory stores.
    pub pool: Option<helios_db::DbPool>,
    pub config: Arc<ServerConfig>,
    pub stores: Stores,
    pub tracker: Arc<ProgressTracker>,
    pub metrics: Arc<MetricsAggregator>,
    pub predictor: Arc<CompletionPredictor>,
    pub notifications: Arc<dyn NotificationLog>,
}

impl AppState {
    /// Wire the engines over `stores`.
    pub fn new(
        config: ServerConfig,
        stores: Stores,
        notifier: Arc<dyn Notifier>,
        notifications: Arc<dyn NotificationLog>,
    ) -> Self {
        let tracker =
            ProgressTracker::new(stores.clone(), notifier).with_weighting(config.progress_weighting);
        Self {
            pool: None,
            tracker: Arc::new(tracker),
            metrics: Arc::new(MetricsAggregator::new(stores.clone())),
            predictor: Arc::new(CompletionPredictor::new(stores.clone())),
            config: Arc::new(config),
            stores,
            notifications,
        }
    }

    /// Attach the database pool used by the health check.
    pub fn with_pool(mut self, pool: helios_db::DbPool) -> Self {
        self.pool = Some(pool);
        self
    }
}
