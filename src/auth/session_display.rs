//! Signed-in identity display driven by auth state changes.

use tokio::task::JoinHandle;

use super::identity::{AuthStateChange, IdentityClient};
use crate::page::Page;

/// Live subscription to auth state changes; stops when dropped
pub struct AuthSubscription {
    task: JoinHandle<()>,
}

impl AuthSubscription {
    /// Stop rendering auth state changes. Dropping the subscription does the same.
    pub fn unsubscribe(self) {}

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct SessionDisplay;

impl SessionDisplay {
    /// Render the current auth state into `page`, then keep it in sync until the
    /// returned subscription is dropped.
    pub fn subscribe(client: &dyn IdentityClient, page: Page) -> AuthSubscription {
        let mut changes = client.on_auth_state_change();
        render(&page, &changes.borrow_and_update());

        let task = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let change = changes.borrow_and_update().clone();
                tracing::debug!(event = ?change.event, "Auth state change received");
                render(&page, &change);
            }
        });

        AuthSubscription { task }
    }
}

fn render(page: &Page, change: &AuthStateChange) {
    match change.session.as_ref() {
        Some(session) => match session.email() {
            Some(email) => page.show_signed_in(email),
            None => page.clear_user_info(),
        },
        None => page.clear_user_info(),
    }
}
