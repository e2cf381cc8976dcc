//! Handling of auth redirects arriving in the page URL
//!
//! Two independent branches, both of which may run for one page load:
//!
//! - **One-time token** (`?token=..&type=..`): invite or recovery links sent by
//!   email. Failures raise a blocking alert.
//! - **Session tokens** (`#access_token=..&refresh_token=..`): a session handed
//!   over in the fragment. Failures are only logged.
//!
//! Afterwards the current session, if any, is shown in the user info region.

use std::time::Duration;

use url::Url;

use super::helpers::{form_value, strip_one_time_token_params, strip_session_params};
use super::identity::{IdentityClient, OneTimeTokenPurpose};
use crate::call::CallGuard;
use crate::page::Page;

/// How long the success indicator stays visible
pub const SUCCESS_BANNER_DURATION: Duration = Duration::from_secs(3);

pub const DEFAULT_RESET_PASSWORD_PATH: &str = "/reset-password";

/// Auth parameters carried by the page URL; empty values count as absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRedirectParams {
    pub token: Option<String>,
    pub token_type: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl AuthRedirectParams {
    pub fn from_url(url: &Url) -> Self {
        let query = url.query().unwrap_or_default();
        let fragment = url.fragment().unwrap_or_default();

        Self {
            token: form_value(query, "token"),
            token_type: form_value(query, "type"),
            access_token: form_value(fragment, "access_token"),
            refresh_token: form_value(fragment, "refresh_token"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedirectSettings {
    /// Where a successful recovery verification navigates to
    pub reset_password_path: String,
    pub success_banner: Duration,
}

impl Default for RedirectSettings {
    fn default() -> Self {
        Self {
            reset_password_path: DEFAULT_RESET_PASSWORD_PATH.to_string(),
            success_banner: SUCCESS_BANNER_DURATION,
        }
    }
}

/// Process auth parameters in the page URL, then show the current session
pub async fn handle_auth_redirect(
    client: &dyn IdentityClient,
    page: &Page,
    guard: &CallGuard,
    settings: &RedirectSettings,
) {
    let params = AuthRedirectParams::from_url(&page.location());

    tracing::debug!(
        has_token = params.token.is_some(),
        token_type = ?params.token_type,
        has_access_token = params.access_token.is_some(),
        has_refresh_token = params.refresh_token.is_some(),
        "Inspecting auth redirect parameters"
    );

    if let (Some(token), Some(token_type)) = (&params.token, &params.token_type) {
        verify_one_time_token(client, page, guard, settings, token, token_type).await;
    }

    if let (Some(access_token), Some(refresh_token)) = (&params.access_token, &params.refresh_token)
    {
        establish_session(client, page, guard, settings, access_token, refresh_token).await;
    }

    match guard.run(client.get_session()).await {
        Ok(Some(session)) => {
            if let Some(email) = session.email() {
                page.show_signed_in(email);
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(event = "session_check_failed", error = %e, "Session check error");
        }
    }
}

async fn verify_one_time_token(
    client: &dyn IdentityClient,
    page: &Page,
    guard: &CallGuard,
    settings: &RedirectSettings,
    token: &str,
    token_type: &str,
) {
    let purpose = match token_type.parse::<OneTimeTokenPurpose>() {
        Ok(purpose) => purpose,
        Err(unknown) => {
            tracing::warn!(
                event = "unsupported_token_type",
                token_type = %unknown.0,
                "Ignoring one-time token with unsupported type"
            );
            return;
        }
    };

    page.set_auth_processing(true);

    match guard.run(client.verify_one_time_token(token, purpose)).await {
        Ok(_) => {
            page.set_auth_processing(false);
            match purpose {
                OneTimeTokenPurpose::Invite => {
                    tracing::info!(event = "invite_verified", "Invite accepted");
                    page.replace_url(strip_one_time_token_params(&page.location()));
                    page.flash_success(settings.success_banner);
                }
                OneTimeTokenPurpose::Recovery => {
                    tracing::info!(
                        event = "recovery_verified",
                        redirect_to = %settings.reset_password_path,
                        "Recovery token accepted"
                    );
                    page.navigate(&settings.reset_password_path);
                }
            }
        }
        Err(e) => {
            tracing::error!(
                event = "token_verification_failed",
                purpose = %purpose,
                error = %e,
                "Auth verification error"
            );
            page.set_auth_processing(false);
            page.alert(format!("Authentication failed: {}", e));
        }
    }
}

async fn establish_session(
    client: &dyn IdentityClient,
    page: &Page,
    guard: &CallGuard,
    settings: &RedirectSettings,
    access_token: &str,
    refresh_token: &str,
) {
    match guard.run(client.set_session(access_token, refresh_token)).await {
        Ok(_) => {
            tracing::info!(event = "session_established", "Session set from redirect");
            page.replace_url(strip_session_params(&page.location()));
            page.flash_success(settings.success_banner);
        }
        Err(e) => {
            // No alert here, unlike one-time tokens
            tracing::error!(event = "session_establish_failed", error = %e, "Session error");
        }
    }
}
