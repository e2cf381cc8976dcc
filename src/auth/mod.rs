//! Authentication module
//!
//! This module connects the landing page to the external identity provider.
//!
//! ## Structure
//!
//! - `identity_config`: loading and validating `config.json`
//! - `identity`: the identity client capability interface and session types
//! - `gotrue`: GoTrue (Supabase Auth) client over HTTP
//! - `jwt`: unverified access-token claim reads
//! - `helpers`: Pure helper functions (URL parameter parsing/cleanup, HTTP clients)
//! - `redirect`: handling of invite/recovery/session redirects in the page URL
//! - `session_display`: signed-in identity display
//!
//! ## Redirect Flow
//!
//! 1. User follows an emailed link → page loads with `?token=..&type=invite|recovery`
//! 2. Token is verified with the provider → banner shown, or navigation to password reset
//! 3. Provider redirects with `#access_token=..&refresh_token=..` → session established
//! 4. Current session (if any) is shown as "Signed in as: ..."

pub mod gotrue;
pub mod helpers;
pub mod identity;
pub mod identity_config;
pub mod jwt;
pub mod redirect;
pub mod session_display;

pub use gotrue::{GoTrueClient, GoTrueProvider};
pub use helpers::{create_http_client, strip_one_time_token_params, strip_session_params};
pub use identity::{
    AuthChangeEvent, AuthStateChange, IdentityClient, IdentityProvider, OneTimeTokenPurpose,
    Session, User,
};
pub use identity_config::{load_config, IdentityConfig};
pub use redirect::{handle_auth_redirect, AuthRedirectParams, RedirectSettings};
pub use session_display::{AuthSubscription, SessionDisplay};
