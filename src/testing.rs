//! In-memory fakes shared by unit tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::auth::identity::{
    AuthChangeEvent, AuthStateChange, IdentityClient, IdentityProvider, OneTimeTokenPurpose,
    Session, User,
};
use crate::auth::identity_config::IdentityConfig;
use crate::call::CallGuard;
use crate::config::{Config, DocumentsLocation, Environment};
use crate::documents::DocumentSource;
use crate::error::{AuthVerificationError, ClientError, FetchError};
use crate::page::Page;

pub fn guard() -> CallGuard {
    CallGuard::new(Duration::from_secs(5), CancellationToken::new())
}

pub fn config() -> Config {
    Config {
        environment: Environment::Development,
        server_host: "127.0.0.1".to_string(),
        server_port: 3000,
        public_url: "http://landing.localhost".to_string(),
        documents: DocumentsLocation::Dir("static".to_string()),
        http_connect_timeout_secs: 10,
        http_request_timeout_secs: 30,
        external_call_timeout_secs: 5,
        reset_password_path: "/reset-password".to_string(),
    }
}

pub fn session(email: &str) -> Session {
    Session {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: None,
        user: User {
            id: "u1".to_string(),
            email: Some(email.to_string()),
        },
    }
}

enum Document {
    Body(String),
    Status(u16),
}

/// Document source backed by a map; unknown names answer 404
#[derive(Default)]
pub struct StaticDocuments {
    documents: HashMap<String, Document>,
}

impl StaticDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, body: &str) -> Self {
        self.documents
            .insert(name.to_string(), Document::Body(body.to_string()));
        self
    }

    pub fn with_status(mut self, name: &str, status: u16) -> Self {
        self.documents
            .insert(name.to_string(), Document::Status(status));
        self
    }
}

#[async_trait]
impl DocumentSource for StaticDocuments {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        match self.documents.get(name) {
            Some(Document::Body(body)) => Ok(body.clone().into_bytes()),
            Some(Document::Status(status)) => Err(FetchError::Status {
                document: name.to_string(),
                status: *status,
                reason: "Fake".to_string(),
            }),
            None => Err(FetchError::Status {
                document: name.to_string(),
                status: 404,
                reason: "Not Found".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCall {
    Verify(String, OneTimeTokenPurpose),
    SetSession(String, String),
    GetSession,
}

fn rejected(message: &str) -> AuthVerificationError {
    AuthVerificationError::Rejected {
        status: 400,
        message: message.to_string(),
    }
}

/// Identity client that records calls and answers from canned outcomes
pub struct FakeIdentityClient {
    state: watch::Sender<AuthStateChange>,
    calls: Mutex<Vec<IdentityCall>>,
    verify_error: Option<String>,
    set_session_error: Option<String>,
    get_session_error: Option<String>,
    observed: Option<Page>,
    processing_during_verify: Mutex<Option<bool>>,
}

impl FakeIdentityClient {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthStateChange::initial());
        Self {
            state,
            calls: Mutex::new(Vec::new()),
            verify_error: None,
            set_session_error: None,
            get_session_error: None,
            observed: None,
            processing_during_verify: Mutex::new(None),
        }
    }

    pub fn signed_in(self, email: &str) -> Self {
        self.state.send_replace(AuthStateChange {
            event: AuthChangeEvent::InitialSession,
            session: Some(session(email)),
        });
        self
    }

    pub fn failing_verify(mut self, message: &str) -> Self {
        self.verify_error = Some(message.to_string());
        self
    }

    pub fn failing_set_session(mut self, message: &str) -> Self {
        self.set_session_error = Some(message.to_string());
        self
    }

    pub fn failing_get_session(mut self, message: &str) -> Self {
        self.get_session_error = Some(message.to_string());
        self
    }

    /// Record the page's processing indicator at the moment verification is called
    pub fn observing(mut self, page: &Page) -> Self {
        self.observed = Some(page.clone());
        self
    }

    pub fn calls(&self) -> Vec<IdentityCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn processing_during_verify(&self) -> Option<bool> {
        *self.processing_during_verify.lock().unwrap()
    }

    pub fn last_event(&self) -> Option<AuthChangeEvent> {
        Some(self.state.borrow().event)
    }

    /// Simulate the provider pushing a change (e.g. sign-out in another tab)
    pub fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        self.state.send_replace(AuthStateChange { event, session });
    }

    fn record(&self, call: IdentityCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IdentityClient for FakeIdentityClient {
    fn on_auth_state_change(&self) -> watch::Receiver<AuthStateChange> {
        self.state.subscribe()
    }

    async fn get_session(&self) -> Result<Option<Session>, AuthVerificationError> {
        self.record(IdentityCall::GetSession);
        if let Some(message) = &self.get_session_error {
            return Err(rejected(message));
        }
        Ok(self.state.borrow().session.clone())
    }

    async fn verify_one_time_token(
        &self,
        token_hash: &str,
        purpose: OneTimeTokenPurpose,
    ) -> Result<Session, AuthVerificationError> {
        self.record(IdentityCall::Verify(token_hash.to_string(), purpose));
        if let Some(page) = &self.observed {
            *self.processing_during_verify.lock().unwrap() = Some(page.snapshot().auth_processing);
        }
        if let Some(message) = &self.verify_error {
            return Err(rejected(message));
        }

        let session = session("invitee@example.com");
        let event = match purpose {
            OneTimeTokenPurpose::Invite => AuthChangeEvent::SignedIn,
            OneTimeTokenPurpose::Recovery => AuthChangeEvent::PasswordRecovery,
        };
        self.emit(event, Some(session.clone()));
        Ok(session)
    }

    async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Session, AuthVerificationError> {
        self.record(IdentityCall::SetSession(
            access_token.to_string(),
            refresh_token.to_string(),
        ));
        if let Some(message) = &self.set_session_error {
            return Err(rejected(message));
        }

        let session = session("eve@example.com");
        self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }
}

/// Provider handing out one shared fake client, or failing construction
pub struct FakeProvider {
    pub client: Arc<FakeIdentityClient>,
    pub fail: bool,
}

impl IdentityProvider for FakeProvider {
    fn create_client(
        &self,
        config: &IdentityConfig,
    ) -> Result<Arc<dyn IdentityClient>, ClientError> {
        if self.fail {
            return Err(ClientError::InvalidEndpoint {
                url: config.endpoint_url.clone(),
                reason: "rejected by test".to_string(),
            });
        }
        Ok(self.client.clone())
    }
}
