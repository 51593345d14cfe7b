//! Periodic full refresh of the service registry
//!
//! Runs once at startup, then every [`REFRESH_INTERVAL`]. A trigger that
//! arrives while a refresh is still running is skipped rather than queued.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use super::{CommandError, ServiceRegistry, Systemctl};
use crate::units::parse_service_list;

/// Default interval between full refreshes
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Result of a refresh trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Registry replaced with this many entries
    Replaced(usize),
    /// Another refresh was in flight
    Skipped,
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("List command failed: {0}")]
    Command(#[from] CommandError),
}

/// Keeps the registry in step with the OS service set
#[derive(Debug)]
pub struct RegistryRefresher {
    registry: Arc<ServiceRegistry>,
    systemctl: Arc<Systemctl>,
    interval: Duration,
    in_flight: Mutex<()>,
}

impl RegistryRefresher {
    pub fn new(registry: Arc<ServiceRegistry>, systemctl: Arc<Systemctl>) -> Self {
        Self {
            registry,
            systemctl,
            interval: REFRESH_INTERVAL,
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Enumerate services and replace the registry contents
    ///
    /// On failure the registry keeps its previous contents.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            log::debug!("Refresh already in flight, skipping");
            return Ok(RefreshOutcome::Skipped);
        };

        let output = self.systemctl.list_units().await?;
        let entries = parse_service_list(&output);
        let count = entries.len();
        self.registry.replace_all(entries).await;

        log::debug!("Registry refreshed: {} services", count);
        Ok(RefreshOutcome::Replaced(count))
    }

    /// Refresh now and then on every interval tick, forever
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // First tick completes immediately
            interval.tick().await;
            if let Err(e) = self.refresh().await {
                log::warn!("Service refresh failed: {}", e);
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current runtime
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
