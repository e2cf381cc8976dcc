//! Identity endpoint configuration (`config.json`)

use crate::call::CallGuard;
use crate::documents::{fetch_json, DocumentSource, CONFIG_DOCUMENT};
use crate::error::{StartupError, ValidationError};

/// Validated identity endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub endpoint_url: String,
    pub public_key: String,
}

impl IdentityConfig {
    /// Validate a decoded `config.json` document
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        let Some(object) = value.as_object() else {
            return Err(ValidationError::NotAnObject {
                document: CONFIG_DOCUMENT.to_string(),
            });
        };

        Ok(Self {
            endpoint_url: required_string(object, "url")?,
            public_key: required_string(object, "anonKey")?,
        })
    }
}

fn required_string(
    object: &serde_json::Map<String, serde_json::Value>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match object.get(field) {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        None | Some(serde_json::Value::Null) | Some(serde_json::Value::String(_)) => {
            Err(ValidationError::MissingField {
                document: CONFIG_DOCUMENT.to_string(),
                field,
            })
        }
        Some(_) => Err(ValidationError::NotAString {
            document: CONFIG_DOCUMENT.to_string(),
            field,
        }),
    }
}

/// Load and validate the identity configuration. Single attempt, no retry.
pub async fn load_config(
    source: &dyn DocumentSource,
    guard: &CallGuard,
) -> Result<IdentityConfig, StartupError> {
    let value: serde_json::Value = fetch_json(source, CONFIG_DOCUMENT, guard).await?;
    let config = IdentityConfig::from_value(value)?;

    // Never log the key itself
    tracing::info!(
        endpoint_url = %config.endpoint_url,
        public_key_len = config.public_key.len(),
        "Identity configuration loaded"
    );

    Ok(config)
}
