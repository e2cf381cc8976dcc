use crate::page::PageSnapshot;
use crate::services::ServiceCard;
use askama::Template;

#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    pub page: PageSnapshot,
    /// Cleaned page URL as a JavaScript string literal
    pub replaced_url_js: String,
    /// Blocking alerts as JavaScript string literals
    pub alerts_js: Vec<String>,
    /// Hand session tokens found in the URL fragment to `POST /session`
    pub forward_session: bool,
}

impl LandingTemplate {
    pub fn new(page: PageSnapshot) -> Self {
        let replaced_url_js = js_string_literal(page.location.as_str());
        let alerts_js = page.alerts.iter().map(|a| js_string_literal(a)).collect();
        Self {
            page,
            replaced_url_js,
            alerts_js,
            forward_session: true,
        }
    }

    /// Page rendered in answer to a forwarded session; never forwards again
    pub fn without_session_forwarding(mut self) -> Self {
        self.forward_session = false;
        self
    }
}

/// Quote `value` for an inline script without letting it close the script element
fn js_string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

#[derive(Template)]
#[template(path = "services_grid.html")]
pub struct ServiceGridTemplate<'a> {
    pub message: Option<&'static str>,
    pub cards: &'a [ServiceCard],
}

#[derive(Template)]
#[template(path = "fatal.html")]
pub struct FatalTemplate<'a> {
    pub context: &'a str,
    pub message: &'a str,
}
