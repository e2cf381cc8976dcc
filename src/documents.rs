//! Retrieval of the JSON documents the landing page is built from
//!
//! Two sources exist, mirroring how the documents are deployed:
//! - `HttpDocumentSource`: fetched relative to a base URL (static file server)
//! - `FileDocumentSource`: read from a local directory

use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::call::CallGuard;
use crate::error::FetchError;

pub const CONFIG_DOCUMENT: &str = "config.json";
pub const SERVICES_DOCUMENT: &str = "services.json";

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the raw bytes of a named document
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetch a document and decode it as JSON, bounded by `guard`
pub async fn fetch_json<T: DeserializeOwned>(
    source: &dyn DocumentSource,
    name: &str,
    guard: &CallGuard,
) -> Result<T, FetchError> {
    let bytes = guard.run(source.fetch(name)).await?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode {
        document: name.to_string(),
        message: e.to_string(),
    })
}

pub struct HttpDocumentSource {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpDocumentSource {
    pub fn new(base_url: &str, client: reqwest::Client) -> Result<Self, url::ParseError> {
        // Url::join drops the last path segment unless the base ends with '/'
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };
        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        let url = self
            .base_url
            .join(name)
            .map_err(|e| FetchError::Transport {
                document: name.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(document = name, url = %url, "Fetching document");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                document: name.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                document: name.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            document: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(body.to_vec())
    }
}

pub struct FileDocumentSource {
    dir: PathBuf,
}

impl FileDocumentSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DocumentSource for FileDocumentSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.dir.join(name);
        tracing::debug!(document = name, path = %path.display(), "Reading document");

        tokio::fs::read(&path).await.map_err(|source| FetchError::Io {
            document: name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn guard() -> CallGuard {
        CallGuard::new(Duration::from_secs(5), CancellationToken::new())
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/site", addr)
    }

    #[tokio::test]
    async fn test_http_source_fetches_relative_to_base() {
        let router = Router::new().route(
            "/site/config.json",
            get(|| async { r#"{"url":"http://auth.localhost","anonKey":"k"}"# }),
        );
        let base = serve(router).await;
        let source = HttpDocumentSource::new(&base, reqwest::Client::new()).unwrap();

        let value: serde_json::Value = fetch_json(&source, CONFIG_DOCUMENT, &guard())
            .await
            .unwrap();
        assert_eq!(value["anonKey"], "k");
    }

    #[tokio::test]
    async fn test_http_source_reports_non_success_status() {
        let router = Router::new().route(
            "/site/services.json",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = serve(router).await;
        let source = HttpDocumentSource::new(&base, reqwest::Client::new()).unwrap();

        let err = source.fetch(SERVICES_DOCUMENT).await.unwrap_err();
        match err {
            FetchError::Status {
                document, status, ..
            } => {
                assert_eq!(document, SERVICES_DOCUMENT);
                assert_eq!(status, 503);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_source_reads_and_decodes() {
        let dir = std::env::temp_dir().join(format!("landing-docs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SERVICES_DOCUMENT), r#"[{"title":"A","url":"http://a"}]"#)
            .unwrap();

        let source = FileDocumentSource::new(&dir);
        let value: serde_json::Value = fetch_json(&source, SERVICES_DOCUMENT, &guard())
            .await
            .unwrap();
        assert_eq!(value[0]["title"], "A");

        let missing = source.fetch("absent.json").await.unwrap_err();
        assert!(matches!(missing, FetchError::Io { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_fetch_json_reports_decode_errors() {
        let dir = std::env::temp_dir().join(format!("landing-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_DOCUMENT), "not json").unwrap();

        let source = FileDocumentSource::new(&dir);
        let err = fetch_json::<serde_json::Value>(&source, CONFIG_DOCUMENT, &guard())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }
}
