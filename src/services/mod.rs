//! Service directory: `services.json` → service grid
//!
//! Failures here never reach the caller. A missing or broken document renders
//! a placeholder, and invalid entries are skipped with a warning.

pub mod models;

pub use models::{InvalidEntry, ServiceCard, ServiceDescriptor};

use askama::Template;

use crate::call::CallGuard;
use crate::documents::{fetch_json, DocumentSource, SERVICES_DOCUMENT};
use crate::page::Page;
use crate::web::templates::ServiceGridTemplate;

pub const UNAVAILABLE_MESSAGE: &str = "Unable to load services. Please try again later.";
pub const EMPTY_MESSAGE: &str = "No services configured";

/// What the service grid shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceGrid {
    /// The document could not be fetched or decoded
    Unavailable,
    /// The document is not a list, or an empty one
    Empty,
    /// Valid entries in source order, followed by the "Add New Service" card
    Cards(Vec<ServiceCard>),
}

impl ServiceGrid {
    /// Build the grid from a decoded `services.json` document
    pub fn from_value(value: serde_json::Value) -> Self {
        let entries = match value {
            serde_json::Value::Array(entries) if !entries.is_empty() => entries,
            _ => return ServiceGrid::Empty,
        };

        let total = entries.len();
        let cards: Vec<ServiceCard> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match ServiceDescriptor::from_value(entry) {
                Ok(descriptor) => Some(ServiceCard::from(&descriptor)),
                Err(reason) => {
                    tracing::warn!(index = index, reason = %reason, "Invalid service configuration");
                    None
                }
            })
            .collect();

        tracing::debug!(
            total_entries = total,
            rendered_cards = cards.len(),
            "Service list parsed"
        );

        ServiceGrid::Cards(cards)
    }

    pub fn render(&self) -> Result<String, askama::Error> {
        let template = match self {
            ServiceGrid::Unavailable => ServiceGridTemplate {
                message: Some(UNAVAILABLE_MESSAGE),
                cards: &[],
            },
            ServiceGrid::Empty => ServiceGridTemplate {
                message: Some(EMPTY_MESSAGE),
                cards: &[],
            },
            ServiceGrid::Cards(cards) => ServiceGridTemplate {
                message: None,
                cards,
            },
        };
        template.render()
    }
}

/// Fetch the service list and replace the page's service grid with it
pub async fn load_services(source: &dyn DocumentSource, page: &Page, guard: &CallGuard) {
    let grid = match fetch_json::<serde_json::Value>(source, SERVICES_DOCUMENT, guard).await {
        Ok(value) => ServiceGrid::from_value(value),
        Err(e) => {
            tracing::error!(event = "services_load_failed", error = %e, "Service loading error");
            ServiceGrid::Unavailable
        }
    };

    let html = grid.render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Service grid template error");
        format!(r#"<p class="services-message">{}</p>"#, UNAVAILABLE_MESSAGE)
    });
    page.replace_services_grid(html);
}
