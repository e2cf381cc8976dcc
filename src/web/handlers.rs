use super::templates::LandingTemplate;
use crate::{
    auth::{load_config, strip_one_time_token_params},
    page::{Page, PageSnapshot},
    AppState,
};
use askama::Template;
use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

/// Liveness probe - always returns OK if the process is running
pub async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe - checks if the page could start right now
///
/// Returns 200 OK if `config.json` can be fetched and validated,
/// 503 Service Unavailable otherwise.
pub async fn readyz_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let guard = state.call_guard();
    match load_config(state.landing.documents(), &guard).await {
        Ok(_) => (StatusCode::OK, "ready".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e))
        }
    }
}

/// One page load: run the landing flow against the requested URL and render the result
pub async fn landing_handler(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let location = match state.config.page_url(path_and_query) {
        Ok(location) => location,
        Err(e) => {
            tracing::warn!(path = %path_and_query, error = %e, "Rejected page URL");
            return (StatusCode::BAD_REQUEST, "Invalid page URL").into_response();
        }
    };

    let snapshot = run_page_load(&state, location).await;
    render_landing(LandingTemplate::new(snapshot))
}

/// Session tokens the landing page found in its URL fragment
#[derive(Debug, Deserialize)]
pub struct SessionForm {
    pub access_token: String,
    pub refresh_token: String,
    /// Path and query of the page the fragment was found on
    #[serde(default)]
    pub page: String,
}

/// Page load for a session handed over in the URL fragment.
///
/// Browsers never send the fragment, so the landing page posts it here. The
/// flow runs against the page URL with the fragment restored.
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SessionForm>,
) -> Response {
    let path_and_query = if form.page.starts_with('/') {
        form.page.as_str()
    } else {
        "/"
    };
    let location = match state.config.page_url(path_and_query) {
        // One-time tokens were already handled when the page itself loaded
        Ok(location) => strip_one_time_token_params(&location),
        Err(e) => {
            tracing::warn!(path = %path_and_query, error = %e, "Rejected page URL");
            return (StatusCode::BAD_REQUEST, "Invalid page URL").into_response();
        }
    };
    let location = with_session_fragment(location, &form);

    let mut snapshot = run_page_load(&state, location).await;
    // The address bar shows /session now; always put the page URL back
    snapshot.url_replaced = true;
    render_landing(LandingTemplate::new(snapshot).without_session_forwarding())
}

fn with_session_fragment(mut location: Url, form: &SessionForm) -> Url {
    let fragment = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("access_token", &form.access_token)
        .append_pair("refresh_token", &form.refresh_token)
        .finish();
    location.set_fragment(Some(&fragment));
    location
}

async fn run_page_load(state: &AppState, location: Url) -> PageSnapshot {
    let page = Page::new(location);
    let guard = state.call_guard();
    let session = state.landing.run(&page, &guard).await;
    let snapshot = page.snapshot();
    // The rendered response is the last thing this page load observes
    drop(session);
    snapshot
}

fn render_landing(template: LandingTemplate) -> Response {
    if template.page.navigated {
        tracing::info!(target_url = %template.page.location, "Redirecting page load");
        return Redirect::to(template.page.location.as_str()).into_response();
    }

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Landing template failed to render");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}
