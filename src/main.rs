use {
    curvetrace::{
        config::Config,
        dispatcher::{self, LedgerMessage},
        events::CurveEvent,
        metadata::HttpMetadataSource,
        persistence::{self, PersistenceConfig},
        registry::Registry,
    },
    std::{sync::Arc, time::Duration},
    tokio::{
        io::{AsyncBufReadExt, BufReader},
        sync::{mpsc, watch, RwLock},
    },
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();

    log::info!("starting curvetrace");
    log::info!(
        "   snapshot: {} (every {}ms)",
        config.snapshot_path,
        config.autosave_interval_ms
    );
    log::info!("   metadata directory: {}", config.metadata_url);

    // Load-or-default; a corrupt snapshot is a hard error rather than
    // something the next autosave silently overwrites.
    let store = Arc::new(RwLock::new(persistence::load_snapshot(&config.snapshot_path)?));

    let metadata = Arc::new(HttpMetadataSource::new(&config.metadata_url)?);
    let registry = Registry::new(store.clone(), metadata);

    let (tx, rx) = mpsc::channel::<LedgerMessage>(config.channel_buffer);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let dispatcher_handle = tokio::spawn(dispatcher::dispatcher_task(rx, registry, store.clone()));

    let persistence_handle = tokio::spawn(persistence::persistence_task(
        store.clone(),
        PersistenceConfig {
            file_path: config.snapshot_path.clone(),
            autosave_interval: Duration::from_millis(config.autosave_interval_ms),
        },
        shutdown_rx,
    ));

    // The demultiplexed event feed arrives as JSON lines on stdin; the
    // subscription plumbing that produces it lives outside this crate.
    let ingest_tx = tx.clone();
    let ingest_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<CurveEvent>(line) {
                        Ok(event) => {
                            if ingest_tx.send(LedgerMessage::Event(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => log::warn!("skipping malformed event: {}", e),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::error!("event feed read error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => log::info!("received ctrl-c, shutting down"),
        _ = ingest_handle => log::info!("event feed closed, shutting down"),
    }

    // Drain everything already queued, then flush a final snapshot.
    let _ = tx.send(LedgerMessage::Shutdown).await;
    drop(tx);
    let _ = dispatcher_handle.await;
    let _ = shutdown_tx.send(true);
    let _ = persistence_handle.await;

    Ok(())
}
