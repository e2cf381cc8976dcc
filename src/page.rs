//! Server-side render target for one page load
//!
//! `Page` holds the regions the landing flow writes into (user info, service
//! grid, auth indicators, alerts) plus the page location. It is cheap to clone
//! and shared between the flow and the tasks it spawns (session display,
//! success-banner timer). `snapshot()` captures the state for rendering.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use url::Url;

/// Captured page state at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub location: Url,
    /// History entry was rewritten in place (no navigation)
    pub url_replaced: bool,
    /// The flow asked for a navigation to `location`
    pub navigated: bool,
    pub last_update: String,
    /// Plain text of the user info region; escaped when rendered
    pub user_info: String,
    /// Rendered markup for the service grid
    pub services_grid: String,
    pub auth_processing: bool,
    pub auth_success: bool,
    pub success_dismiss_after: Option<Duration>,
    pub alerts: Vec<String>,
    /// Replacement for the whole body (fatal error display)
    pub body: Option<String>,
}

struct PageState {
    snapshot: PageSnapshot,
    success_generation: u64,
}

#[derive(Clone)]
pub struct Page {
    state: Arc<Mutex<PageState>>,
}

impl Page {
    pub fn new(location: Url) -> Self {
        Self {
            state: Arc::new(Mutex::new(PageState {
                snapshot: PageSnapshot {
                    location,
                    url_replaced: false,
                    navigated: false,
                    last_update: String::new(),
                    user_info: String::new(),
                    services_grid: String::new(),
                    auth_processing: false,
                    auth_success: false,
                    success_dismiss_after: None,
                    alerts: Vec::new(),
                    body: None,
                },
                success_generation: 0,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut PageState) -> R) -> R {
        // Every update is a plain field write, so a poisoned lock still holds usable state
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.with(|s| s.snapshot.clone())
    }

    pub fn location(&self) -> Url {
        self.with(|s| s.snapshot.location.clone())
    }

    /// Rewrite the current history entry without navigating
    pub fn replace_url(&self, url: Url) {
        self.with(|s| {
            s.snapshot.location = url;
            s.snapshot.url_replaced = true;
        });
    }

    /// Navigate to `target`, resolved against the current location
    pub fn navigate(&self, target: &str) {
        self.with(|s| match s.snapshot.location.join(target) {
            Ok(url) => {
                s.snapshot.location = url;
                s.snapshot.navigated = true;
            }
            Err(e) => {
                tracing::error!(navigation_target = target, error = %e, "Invalid navigation target");
            }
        });
    }

    pub fn set_last_update(&self, date: String) {
        self.with(|s| s.snapshot.last_update = date);
    }

    pub fn show_signed_in(&self, email: &str) {
        let text = format!("Signed in as: {}", email);
        self.with(|s| s.snapshot.user_info = text);
    }

    pub fn clear_user_info(&self) {
        self.with(|s| s.snapshot.user_info.clear());
    }

    /// Replace the whole service grid content in one step
    pub fn replace_services_grid(&self, html: String) {
        self.with(|s| s.snapshot.services_grid = html);
    }

    pub fn set_auth_processing(&self, visible: bool) {
        self.with(|s| s.snapshot.auth_processing = visible);
    }

    /// Show the success indicator, hiding it again once `duration` has passed.
    ///
    /// A later call restarts the window; an earlier timer never hides a newer banner.
    pub fn flash_success(&self, duration: Duration) {
        let generation = self.with(|s| {
            s.success_generation += 1;
            s.snapshot.auth_success = true;
            s.snapshot.success_dismiss_after = Some(duration);
            s.success_generation
        });

        let page = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            page.with(|s| {
                if s.success_generation == generation {
                    s.snapshot.auth_success = false;
                    s.snapshot.success_dismiss_after = None;
                }
            });
        });
    }

    /// Blocking notification the user has to acknowledge
    pub fn alert(&self, message: String) {
        self.with(|s| s.snapshot.alerts.push(message));
    }

    /// Replace the entire page body (fatal path)
    pub fn replace_body(&self, html: String) {
        self.with(|s| s.snapshot.body = Some(html));
    }
}
