//! Token registry
//!
//! Deduplicates assets by address and lazily attaches metadata from
//! the external directory. `register` is idempotent: once a token
//! carries metadata it never hits the directory again, and a failed
//! lookup leaves a bare record behind so the next event for the same
//! address retries opportunistically. There is no background retry
//! loop.

use {
    crate::store::{Store, TokenInfo},
    async_trait::async_trait,
    std::sync::Arc,
    tokio::sync::RwLock,
};

/// External metadata directory: resolves an asset address to its
/// human-readable name and symbol. No latency or availability
/// guarantees; failures are expected and recovered by the caller.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch(
        &self,
        address: &str,
    ) -> Result<TokenInfo, Box<dyn std::error::Error + Send + Sync>>;
}

pub struct Registry {
    store: Arc<RwLock<Store>>,
    metadata: Arc<dyn MetadataSource>,
}

impl Registry {
    pub fn new(store: Arc<RwLock<Store>>, metadata: Arc<dyn MetadataSource>) -> Self {
        Self { store, metadata }
    }

    /// Resolve metadata for `address` if the ledger does not carry it
    /// yet. Returns `None` when the record is already enriched or when
    /// the lookup fails (the failure is swallowed and retried on the
    /// next call for this address).
    ///
    /// Does not mutate the store: the caller applies the result with
    /// `upsert`, so it can batch the attach with other mutations under
    /// a single write-lock acquisition.
    pub async fn resolve(&self, address: &str) -> Option<TokenInfo> {
        {
            let store = self.store.read().await;
            if store.find(address).is_some_and(|t| t.info.is_some()) {
                return None;
            }
        }

        match self.metadata.fetch(address).await {
            Ok(info) => {
                log::info!("token info: {} ({}) @ {}", info.name, info.symbol, address);
                Some(info)
            }
            Err(e) => {
                log::warn!("could not fetch token info for {}: {}", address, e);
                None
            }
        }
    }

    /// Ensure a token record exists for `address`, fetching metadata if
    /// it is still missing. The store mutation is a single write-lock
    /// acquisition, and all mutation runs through the one dispatcher
    /// task, so the resolve above cannot interleave with another
    /// registration for the same address.
    pub async fn register(&self, address: &str) {
        let info = self.resolve(address).await;
        self.store.write().await.upsert(address, info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Directory stub that counts lookups and can be flipped between
    /// failing and succeeding.
    struct ScriptedDirectory {
        calls: AtomicUsize,
        fail: std::sync::atomic::AtomicBool,
    }

    impl ScriptedDirectory {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: std::sync::atomic::AtomicBool::new(fail),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetadataSource for ScriptedDirectory {
        async fn fetch(
            &self,
            address: &str,
        ) -> Result<TokenInfo, Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err("directory unavailable".into());
            }
            Ok(TokenInfo {
                name: format!("Token {address}"),
                symbol: "TOK".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn failed_lookups_dedup_to_one_bare_asset() {
        let store = Arc::new(RwLock::new(Store::default()));
        let directory = Arc::new(ScriptedDirectory::new(true));
        let registry = Registry::new(store.clone(), directory.clone());

        registry.register("mintA").await;
        registry.register("mintA").await;

        let store = store.read().await;
        assert_eq!(store.len(), 1);
        assert!(store.find("mintA").unwrap().info.is_none());
        // Each failed registration retried the lookup.
        assert_eq!(directory.calls(), 2);
    }

    #[tokio::test]
    async fn successful_enrichment_happens_once() {
        let store = Arc::new(RwLock::new(Store::default()));
        let directory = Arc::new(ScriptedDirectory::new(false));
        let registry = Registry::new(store.clone(), directory.clone());

        registry.register("mintA").await;
        registry.register("mintA").await;
        registry.register("mintA").await;

        let store = store.read().await;
        assert_eq!(store.len(), 1);
        assert!(store.find("mintA").unwrap().info.is_some());
        assert_eq!(directory.calls(), 1);
    }

    #[tokio::test]
    async fn retry_attaches_info_to_existing_record() {
        let store = Arc::new(RwLock::new(Store::default()));
        let directory = Arc::new(ScriptedDirectory::new(true));
        let registry = Registry::new(store.clone(), directory.clone());

        registry.register("mintA").await;
        assert!(store.read().await.find("mintA").unwrap().info.is_none());

        // Directory recovers; the next event for this address enriches
        // the record that is already there.
        directory.fail.store(false, Ordering::SeqCst);
        registry.register("mintA").await;

        let store = store.read().await;
        assert_eq!(store.len(), 1);
        let info = store.find("mintA").unwrap().info.as_ref().unwrap();
        assert_eq!(info.symbol, "TOK");
        assert_eq!(directory.calls(), 2);
    }
}
