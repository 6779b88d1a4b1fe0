//! HTTP metadata directory client
//!
//! Production `MetadataSource` backed by an HTTP directory service:
//! `GET {base_url}/{address}` returning `{"name": ..., "symbol": ...}`.
//! Failures here are routine (unknown mint, timeout, 5xx) and the
//! registry recovers from all of them, so errors stay boxed.

use {
    crate::{registry::MetadataSource, store::TokenInfo},
    async_trait::async_trait,
    std::time::Duration,
};

pub struct HttpMetadataSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMetadataSource {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataSource {
    async fn fetch(
        &self,
        address: &str,
    ) -> Result<TokenInfo, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/{}", self.base_url, address);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(format!("metadata directory error: {}", response.status()).into());
        }

        let info: TokenInfo = response.json().await?;
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let source = HttpMetadataSource::new("http://localhost:9999/meta/").unwrap();
        assert_eq!(source.base_url, "http://localhost:9999/meta");
    }

    #[tokio::test]
    async fn unreachable_directory_reports_an_error() {
        // Port 1 on loopback refuses immediately.
        let source = HttpMetadataSource::new("http://127.0.0.1:1/meta").unwrap();
        let result = source.fetch("mintA").await;
        assert!(result.is_err());
    }
}
