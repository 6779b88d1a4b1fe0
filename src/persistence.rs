//! Snapshot persistence
//!
//! Periodically rewrites the whole ledger to a single JSON document,
//! replacing the previous snapshot in full. Serialization happens
//! under the store's read lock, so a concurrent mutation can never
//! tear the emitted document. Write failures are logged and the next
//! tick retries with the then-current state.

use {
    crate::store::Store,
    std::{fs, path::Path, sync::Arc, time::Duration},
    tokio::{
        sync::{watch, RwLock},
        time::interval,
    },
};

pub struct PersistenceConfig {
    pub file_path: String,
    pub autosave_interval: Duration,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            file_path: "db.json".to_string(),
            autosave_interval: Duration::from_millis(5000),
        }
    }
}

/// Write the full store to `file_path`, replacing any prior snapshot.
pub fn save_snapshot(store: &Store, file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(store)?;
    fs::write(file_path, json)?;

    log::debug!("auto-saved {} assets to {}", store.len(), file_path);
    Ok(())
}

/// Load the store from `file_path`, or return the empty default when
/// no snapshot exists yet.
pub fn load_snapshot(file_path: &str) -> Result<Store, Box<dyn std::error::Error>> {
    if !Path::new(file_path).exists() {
        log::info!("no existing snapshot at {}, starting empty", file_path);
        return Ok(Store::default());
    }

    let json = fs::read_to_string(file_path)?;
    let store: Store = serde_json::from_str(&json)?;

    log::info!("loaded {} assets from {}", store.len(), file_path);
    Ok(store)
}

/// Background task that snapshots the store on a fixed cadence.
///
/// Runs until `shutdown` fires, then flushes one final snapshot so a
/// graceful exit never loses the in-memory ledger.
pub async fn persistence_task(
    store: Arc<RwLock<Store>>,
    config: PersistenceConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut timer = interval(config.autosave_interval);

    loop {
        tokio::select! {
            _ = timer.tick() => {
                let store = store.read().await;
                if let Err(e) = save_snapshot(&store, &config.file_path) {
                    log::warn!("failed to save snapshot: {}", e);
                }
            }
            _ = shutdown.changed() => break,
        }
    }

    let store = store.read().await;
    match save_snapshot(&store, &config.file_path) {
        Ok(()) => log::info!("final snapshot flushed to {}", config.file_path),
        Err(e) => log::error!("final snapshot failed: {}", e),
    }
}
