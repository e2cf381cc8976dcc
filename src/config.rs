use std::env;
use std::time::Duration;

use crate::auth::redirect::{RedirectSettings, DEFAULT_RESET_PASSWORD_PATH, SUCCESS_BANNER_DURATION};

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

/// Where `config.json` and `services.json` are read from
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentsLocation {
    /// Fetched over HTTP relative to LANDING_DOCUMENTS_URL
    Url(String),
    /// Read from the directory in LANDING_DOCUMENTS_DIR
    Dir(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    // Environment configuration
    pub environment: Environment,

    // Server configuration
    pub server_host: String,
    pub server_port: u16,

    // Browser-visible base URL of the landing page
    pub public_url: String,

    pub documents: DocumentsLocation,

    // HTTP client timeout configuration (in seconds)
    pub http_connect_timeout_secs: u64,
    pub http_request_timeout_secs: u64,

    // Upper bound for any single document fetch or identity call (in seconds)
    pub external_call_timeout_secs: u64,

    // Where a verified recovery link sends the user
    pub reset_password_path: String,
}

impl Config {
    /// Load configuration from environment variables using std::env::var
    pub fn load() -> anyhow::Result<Self> {
        let environment = match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        let public_url = env::var("LANDING_PUBLIC_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", server_port));
        url::Url::parse(&public_url)
            .map_err(|e| anyhow::anyhow!("LANDING_PUBLIC_URL is not a valid URL: {}", e))?;

        // Documents location (primary: URL, fallback: directory)
        let documents = if let Some(url) = env::var("LANDING_DOCUMENTS_URL")
            .ok()
            .filter(|s| !s.is_empty())
        {
            DocumentsLocation::Url(url)
        } else if let Some(dir) = env::var("LANDING_DOCUMENTS_DIR")
            .ok()
            .filter(|s| !s.is_empty())
        {
            DocumentsLocation::Dir(dir)
        } else {
            return Err(anyhow::anyhow!(
                "Either LANDING_DOCUMENTS_URL or LANDING_DOCUMENTS_DIR environment variable is required"
            ));
        };

        let http_connect_timeout_secs = env::var("HTTP_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let http_request_timeout_secs = env::var("HTTP_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let external_call_timeout_secs = env::var("EXTERNAL_CALL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(15);

        let reset_password_path = env::var("RESET_PASSWORD_PATH")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_RESET_PASSWORD_PATH.to_string());

        Ok(Config {
            environment,
            server_host,
            server_port,
            public_url,
            documents,
            http_connect_timeout_secs,
            http_request_timeout_secs,
            external_call_timeout_secs,
            reset_password_path,
        })
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn external_call_timeout(&self) -> Duration {
        Duration::from_secs(self.external_call_timeout_secs)
    }

    pub fn redirect_settings(&self) -> RedirectSettings {
        RedirectSettings {
            reset_password_path: self.reset_password_path.clone(),
            success_banner: SUCCESS_BANNER_DURATION,
        }
    }

    /// Absolute page URL for a request path-and-query, always on the public origin
    pub fn page_url(&self, path_and_query: &str) -> Result<url::Url, url::ParseError> {
        let mut url = url::Url::parse(&self.public_url)?;
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };
        url.set_path(path);
        url.set_query(query);
        Ok(url)
    }

    /// Get bind address for server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
