//! Identity client capability interface
//!
//! The identity provider is an external collaborator. The landing flow only
//! needs four capabilities from it, expressed by `IdentityClient`; clients are
//! built per page load through an `IdentityProvider`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::identity_config::IdentityConfig;
use crate::error::{AuthVerificationError, ClientError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authenticated user context held by the identity client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) after which the access token is no longer valid
    pub expires_at: Option<i64>,
    pub user: User,
}

impl Session {
    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref().filter(|e| !e.is_empty())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// Kind of single-use credential carried by an emailed link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OneTimeTokenPurpose {
    Invite,
    Recovery,
}

impl OneTimeTokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OneTimeTokenPurpose::Invite => "invite",
            OneTimeTokenPurpose::Recovery => "recovery",
        }
    }
}

impl fmt::Display for OneTimeTokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPurpose(pub String);

impl FromStr for OneTimeTokenPurpose {
    type Err = UnknownPurpose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invite" => Ok(OneTimeTokenPurpose::Invite),
            "recovery" => Ok(OneTimeTokenPurpose::Recovery),
            other => Err(UnknownPurpose(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    PasswordRecovery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStateChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

impl AuthStateChange {
    pub fn initial() -> Self {
        Self {
            event: AuthChangeEvent::InitialSession,
            session: None,
        }
    }
}

#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Latest auth state, updated on every sign-in, refresh, or sign-out
    fn on_auth_state_change(&self) -> watch::Receiver<AuthStateChange>;

    async fn get_session(&self) -> Result<Option<Session>, AuthVerificationError>;

    async fn verify_one_time_token(
        &self,
        token_hash: &str,
        purpose: OneTimeTokenPurpose,
    ) -> Result<Session, AuthVerificationError>;

    async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Session, AuthVerificationError>;
}

/// Builds identity clients bound to a configuration
pub trait IdentityProvider: Send + Sync {
    fn create_client(
        &self,
        config: &IdentityConfig,
    ) -> Result<Arc<dyn IdentityClient>, ClientError>;
}
