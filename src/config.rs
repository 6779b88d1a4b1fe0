use std::env;

/// Configuration loaded from environment variables
pub struct Config {
    pub snapshot_path: String,
    pub autosave_interval_ms: u64,
    pub metadata_url: String,
    pub channel_buffer: usize,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `METADATA_URL` (required) - metadata directory base URL
    /// - `SNAPSHOT_PATH` (default: db.json)
    /// - `AUTOSAVE_INTERVAL_MS` (default: 5000)
    /// - `CHANNEL_BUFFER` (default: 1000)
    pub fn from_env() -> Self {
        let metadata_url =
            env::var("METADATA_URL").expect("METADATA_URL must be set in .env file");

        let snapshot_path =
            env::var("SNAPSHOT_PATH").unwrap_or_else(|_| "db.json".to_string());

        let autosave_interval_ms = env::var("AUTOSAVE_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5_000);

        let channel_buffer = env::var("CHANNEL_BUFFER")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1_000);

        Self {
            snapshot_path,
            autosave_interval_ms,
            metadata_url,
            channel_buffer,
        }
    }
}
