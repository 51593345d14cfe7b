//! Service registry and the tasks that keep it current
//!
//! The registry is refreshed wholesale by [`RegistryRefresher`] and entry by
//! entry by [`StatusProber`]. Control commands go through [`Systemctl`].

mod probe;
mod process;
mod refresh;

pub use probe::{ProbeOutcome, StatusProber};
pub use process::{CommandError, ControlVerb, Systemctl};
pub use refresh::{RefreshError, RefreshOutcome, RegistryRefresher, REFRESH_INTERVAL};

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::units::{normalize_name, ServiceEntry};

/// Ordered catalog with a lookup index by normalized name
#[derive(Debug, Default)]
struct Catalog {
    entries: Vec<ServiceEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    fn from_entries(entries: Vec<ServiceEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.upsert(entry);
        }
        catalog
    }

    fn upsert(&mut self, entry: ServiceEntry) {
        let key = entry.key();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }
}

/// In-memory set of known services
///
/// Readers never observe a partially replaced catalog: `replace_all` swaps
/// the whole catalog under the write lock and `replace_one` swaps a single
/// entry. Between writers the last one to complete wins.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    catalog: RwLock<Catalog>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every entry, keeping the given order
    pub async fn replace_all(&self, entries: Vec<ServiceEntry>) {
        let catalog = Catalog::from_entries(entries);
        *self.catalog.write().await = catalog;
    }

    /// Replace the entry with the same normalized name, or append it
    pub async fn replace_one(&self, entry: ServiceEntry) {
        self.catalog.write().await.upsert(entry);
    }

    /// Case-insensitive lookup
    pub async fn find(&self, name: &str) -> Option<ServiceEntry> {
        let catalog = self.catalog.read().await;
        catalog
            .index
            .get(&normalize_name(name))
            .map(|&pos| catalog.entries[pos].clone())
    }

    /// Point-in-time copy of all entries in listing order
    pub async fn snapshot(&self) -> Vec<ServiceEntry> {
        self.catalog.read().await.entries.clone()
    }

    pub async fn len(&self) -> usize {
        self.catalog.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
