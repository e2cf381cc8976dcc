//! Page-load orchestration
//!
//! One run per page load, strictly in order:
//!
//! 1. `config.json` is loaded and validated
//! 2. the identity client is built from it
//! 3. last-update date and session display are set up
//! 4. auth redirect parameters are handled
//! 5. the service directory is rendered
//!
//! Steps 1 and 2 are the only fatal ones: their failure replaces the whole page
//! body with an error display.

use std::sync::Arc;

use askama::Template;

use crate::auth::{
    handle_auth_redirect, load_config, AuthSubscription, IdentityClient, IdentityProvider,
    RedirectSettings, SessionDisplay,
};
use crate::call::CallGuard;
use crate::documents::DocumentSource;
use crate::error::StartupError;
use crate::page::Page;
use crate::sanitize::sanitize;
use crate::services::load_services;
use crate::web::templates::FatalTemplate;

pub const STARTUP_FAILED: &str = "Application startup failed";

/// State that lives as long as the page: the client and its auth subscription
pub struct LandingSession {
    pub client: Arc<dyn IdentityClient>,
    pub subscription: AuthSubscription,
}

pub struct Landing {
    documents: Arc<dyn DocumentSource>,
    identity: Arc<dyn IdentityProvider>,
    redirect: RedirectSettings,
}

impl Landing {
    pub fn new(
        documents: Arc<dyn DocumentSource>,
        identity: Arc<dyn IdentityProvider>,
        redirect: RedirectSettings,
    ) -> Self {
        Self {
            documents,
            identity,
            redirect,
        }
    }

    pub fn documents(&self) -> &dyn DocumentSource {
        self.documents.as_ref()
    }

    /// Run the landing flow against `page`.
    ///
    /// Returns `None` when startup failed and the fatal display was rendered.
    pub async fn run(&self, page: &Page, guard: &CallGuard) -> Option<LandingSession> {
        match self.start(page, guard).await {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::error!(event = "startup_failed", error = %e, "{}", STARTUP_FAILED);
                show_fatal(page, STARTUP_FAILED, &e.to_string());
                None
            }
        }
    }

    async fn start(&self, page: &Page, guard: &CallGuard) -> Result<LandingSession, StartupError> {
        let config = load_config(self.documents.as_ref(), guard).await?;
        let client = self.identity.create_client(&config)?;
        tracing::debug!(endpoint_url = %config.endpoint_url, "Identity client created");

        page.set_last_update(chrono::Local::now().format("%-m/%-d/%Y").to_string());
        let subscription = SessionDisplay::subscribe(client.as_ref(), page.clone());

        handle_auth_redirect(client.as_ref(), page, guard, &self.redirect).await;
        load_services(self.documents.as_ref(), page, guard).await;

        Ok(LandingSession {
            client,
            subscription,
        })
    }
}

/// Replace the whole page body with an error display
pub fn show_fatal(page: &Page, context: &str, message: &str) {
    let template = FatalTemplate { context, message };
    let html = template.render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Fatal error template failed to render");
        format!("<h1>{}</h1><p>{}</p>", sanitize(context), sanitize(message))
    });
    page.replace_body(html);
}
