//! GoTrue (Supabase Auth) implementation of the identity client
//!
//! ## Endpoints used
//!
//! - `POST /auth/v1/verify`: one-time token (invite / recovery) exchange
//! - `GET /auth/v1/user`: user lookup for an externally supplied access token
//! - `POST /auth/v1/token?grant_type=refresh_token`: session refresh
//!
//! Every request carries the public key in the `apikey` header. The session is
//! held in memory for the lifetime of the client and published through a
//! `watch` channel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::watch;
use url::Url;

use super::identity::{
    AuthChangeEvent, AuthStateChange, IdentityClient, IdentityProvider, OneTimeTokenPurpose,
    Session, User,
};
use super::identity_config::IdentityConfig;
use super::jwt::access_token_expiry;
use crate::error::{AuthVerificationError, ClientError};

/// Token grant returned by `/verify` and `/token`
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self, now: i64) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.and_then(|secs| now.checked_add(secs)))
            .or_else(|| access_token_expiry(&self.access_token));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// GoTrue error payloads differ between endpoints and versions
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .or(self.error)
            .filter(|m| !m.is_empty())
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

async fn rejection(response: reqwest::Response) -> AuthVerificationError {
    let status = response.status();
    let body: ErrorBody = response.json().await.unwrap_or_default();
    let message = body.into_message().unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });
    AuthVerificationError::Rejected {
        status: status.as_u16(),
        message,
    }
}

pub struct GoTrueClient {
    /// `{endpoint}/auth/v1/`
    auth_url: Url,
    public_key: String,
    http: reqwest::Client,
    state: watch::Sender<AuthStateChange>,
}

impl GoTrueClient {
    pub fn new(config: &IdentityConfig, http: reqwest::Client) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidEndpoint {
            url: config.endpoint_url.clone(),
            reason,
        };

        let endpoint = Url::parse(config.endpoint_url.trim_end_matches('/'))
            .map_err(|e| invalid(e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme `{}`", endpoint.scheme())));
        }
        let auth_url = Url::parse(&format!("{}/auth/v1/", endpoint.as_str().trim_end_matches('/')))
            .map_err(|e| invalid(e.to_string()))?;

        let (state, _) = watch::channel(AuthStateChange::initial());

        Ok(Self {
            auth_url,
            public_key: config.public_key.clone(),
            http,
            state,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthVerificationError> {
        self.auth_url
            .join(path)
            .map_err(|e| AuthVerificationError::InvalidResponse(e.to_string()))
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.public_key)
            .bearer_auth(&self.public_key)
    }

    fn current_session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    fn publish(&self, event: AuthChangeEvent, session: Option<Session>) {
        tracing::debug!(event = ?event, has_session = session.is_some(), "Auth state changed");
        self.state.send_replace(AuthStateChange { event, session });
    }

    async fn grant(&self, response: reqwest::Response) -> Result<Session, AuthVerificationError> {
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        let grant: TokenResponse = response.json().await?;
        Ok(grant.into_session(now()))
    }

    /// Exchange a refresh token for a new session and publish it
    pub async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<Session, AuthVerificationError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let session = self.grant(response).await?;

        tracing::info!(user_id = %session.user.id, "Session refreshed");
        self.publish(AuthChangeEvent::TokenRefreshed, Some(session.clone()));
        Ok(session)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<User, AuthVerificationError> {
        let response = self
            .http
            .get(self.endpoint("user")?)
            .header("apikey", &self.public_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl IdentityClient for GoTrueClient {
    fn on_auth_state_change(&self) -> watch::Receiver<AuthStateChange> {
        self.state.subscribe()
    }

    async fn get_session(&self) -> Result<Option<Session>, AuthVerificationError> {
        let Some(session) = self.current_session() else {
            return Ok(None);
        };
        if !session.is_expired_at(now()) {
            return Ok(Some(session));
        }

        match self.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(e) => {
                tracing::warn!(error = %e, "Stored session expired and could not be refreshed");
                self.publish(AuthChangeEvent::SignedOut, None);
                Err(e)
            }
        }
    }

    async fn verify_one_time_token(
        &self,
        token_hash: &str,
        purpose: OneTimeTokenPurpose,
    ) -> Result<Session, AuthVerificationError> {
        tracing::info!(
            purpose = %purpose,
            token_len = token_hash.len(),
            "Verifying one-time token"
        );

        let response = self
            .request(reqwest::Method::POST, self.endpoint("verify")?)
            .json(&serde_json::json!({ "type": purpose, "token_hash": token_hash }))
            .send()
            .await?;
        let session = self.grant(response).await?;

        let event = match purpose {
            OneTimeTokenPurpose::Invite => AuthChangeEvent::SignedIn,
            OneTimeTokenPurpose::Recovery => AuthChangeEvent::PasswordRecovery,
        };
        self.publish(event, Some(session.clone()));
        Ok(session)
    }

    async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Session, AuthVerificationError> {
        let expires_at = access_token_expiry(access_token);
        let expired = expires_at.is_some_and(|exp| exp <= now());

        let session = if expired {
            tracing::info!("Supplied access token expired; refreshing");
            self.refresh_session(refresh_token).await?
        } else {
            let user = self.fetch_user(access_token).await?;
            let session = Session {
                access_token: access_token.to_string(),
                refresh_token: refresh_token.to_string(),
                expires_at,
                user,
            };
            self.publish(AuthChangeEvent::SignedIn, Some(session.clone()));
            session
        };

        tracing::info!(user_id = %session.user.id, "Session established");
        Ok(session)
    }
}

/// Creates `GoTrueClient`s sharing one HTTP connection pool
#[derive(Clone)]
pub struct GoTrueProvider {
    http: reqwest::Client,
}

impl GoTrueProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl IdentityProvider for GoTrueProvider {
    fn create_client(
        &self,
        config: &IdentityConfig,
    ) -> Result<Arc<dyn IdentityClient>, ClientError> {
        Ok(Arc::new(GoTrueClient::new(config, self.http.clone())?))
    }
}
