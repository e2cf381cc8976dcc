use serde::Deserialize;

/// One entry of `services.json` as it appears on the wire
#[derive(Debug, Deserialize)]
struct RawServiceEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "class")]
    css_class: Option<String>,
}

/// Why a service entry was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidEntry {
    Malformed(String),
    MissingTitle,
    MissingUrl,
}

impl std::fmt::Display for InvalidEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidEntry::Malformed(reason) => write!(f, "malformed entry: {}", reason),
            InvalidEntry::MissingTitle => f.write_str("missing title"),
            InvalidEntry::MissingUrl => f.write_str("missing url"),
        }
    }
}

/// A validated service link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub css_class: Option<String>,
}

impl ServiceDescriptor {
    pub fn from_value(value: serde_json::Value) -> Result<Self, InvalidEntry> {
        if !value.is_object() {
            return Err(InvalidEntry::Malformed("not a JSON object".to_string()));
        }
        let raw: RawServiceEntry =
            serde_json::from_value(value).map_err(|e| InvalidEntry::Malformed(e.to_string()))?;

        let title = raw
            .title
            .filter(|t| !t.is_empty())
            .ok_or(InvalidEntry::MissingTitle)?;
        let url = raw
            .url
            .filter(|u| !u.is_empty())
            .ok_or(InvalidEntry::MissingUrl)?;

        Ok(Self {
            title,
            url,
            icon: raw.icon,
            description: raw.description,
            css_class: raw.css_class,
        })
    }

    /// Label shown on the link: first word of the title
    pub fn link_label(&self) -> &str {
        self.title.split_whitespace().next().unwrap_or(&self.title)
    }
}

/// Service card for UI rendering; the grid template escapes every field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCard {
    pub title: String,
    pub url: String,
    pub icon: String,
    pub description: String,
    pub css_class: String,
    pub link_label: String,
}

impl From<&ServiceDescriptor> for ServiceCard {
    fn from(descriptor: &ServiceDescriptor) -> Self {
        let optional = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            title: descriptor.title.clone(),
            url: descriptor.url.clone(),
            icon: optional(&descriptor.icon),
            description: optional(&descriptor.description),
            css_class: descriptor
                .css_class
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_string(),
            link_label: descriptor.link_label().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_requires_title_and_url() {
        assert_eq!(
            ServiceDescriptor::from_value(json!({ "title": "BadEntry" })),
            Err(InvalidEntry::MissingUrl)
        );
        assert_eq!(
            ServiceDescriptor::from_value(json!({ "url": "http://x" })),
            Err(InvalidEntry::MissingTitle)
        );
        assert_eq!(
            ServiceDescriptor::from_value(json!({ "title": "", "url": "http://x" })),
            Err(InvalidEntry::MissingTitle)
        );
    }

    #[test]
    fn test_from_value_rejects_malformed_entries() {
        assert!(matches!(
            ServiceDescriptor::from_value(json!("Grafana")),
            Err(InvalidEntry::Malformed(_))
        ));
        assert!(matches!(
            ServiceDescriptor::from_value(json!({ "title": 5, "url": "http://x" })),
            Err(InvalidEntry::Malformed(_))
        ));
    }

    #[test]
    fn test_link_label_is_first_word() {
        let descriptor = ServiceDescriptor::from_value(json!({
            "title": "Grafana  Dashboards",
            "url": "http://x"
        }))
        .unwrap();
        assert_eq!(descriptor.link_label(), "Grafana");
    }

    #[test]
    fn test_card_keeps_raw_text_for_the_template() {
        let descriptor = ServiceDescriptor::from_value(json!({
            "title": "<b>Evil</b> Corp",
            "url": "http://x/?a=1&b=2",
            "description": "Tom & Jerry",
            "class": " featured "
        }))
        .unwrap();
        let card = ServiceCard::from(&descriptor);

        // Escaping happens once, when the grid is rendered
        assert_eq!(card.title, "<b>Evil</b> Corp");
        assert_eq!(card.url, "http://x/?a=1&b=2");
        assert_eq!(card.description, "Tom & Jerry");
        assert_eq!(card.css_class, "featured");
        assert_eq!(card.link_label, "<b>Evil</b>");
    }

    #[test]
    fn test_card_defaults_missing_optionals_to_empty() {
        let descriptor =
            ServiceDescriptor::from_value(json!({ "title": "Grafana", "url": "http://x" })).unwrap();
        let card = ServiceCard::from(&descriptor);
        assert_eq!(card.icon, "");
        assert_eq!(card.description, "");
        assert_eq!(card.css_class, "");
    }
}
