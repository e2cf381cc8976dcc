//! Service portal landing page
//!
//! Renders the portal's service directory, handles invite/recovery/session
//! redirects from the identity provider, and shows who is signed in.

#![deny(dead_code)]

pub mod auth;
pub mod call;
pub mod config;
pub mod documents;
pub mod error;
pub mod landing;
pub mod page;
pub mod sanitize;
pub mod services;
pub mod web;

#[cfg(test)]
mod testing;

use call::CallGuard;
use config::Config;
use landing::Landing;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct AppState {
    pub config: Arc<Config>,
    pub landing: Arc<Landing>,
    /// Cancelled on shutdown; every external call runs under a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Guard for the external calls of one request
    pub fn call_guard(&self) -> CallGuard {
        CallGuard::new(
            self.config.external_call_timeout(),
            self.shutdown.child_token(),
        )
    }
}
