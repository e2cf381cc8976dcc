//! HTML escaping for text interpolated into markup built outside a template.
//!
//! Templates escape on their own; this uses the same askama HTML escaper.

/// Escape markup-significant characters so `text` can be embedded in HTML
/// element content or a quoted attribute value.
pub fn sanitize(text: &str) -> String {
    askama::filters::escape(text, askama::filters::Html)
        .map(|escaped| escaped.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reverse both named and numeric character references
    fn unescape(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find('&') {
            out.push_str(&rest[..start]);
            let end = rest[start..].find(';').expect("unterminated entity") + start;
            let entity = &rest[start + 1..end];
            let ch = match entity {
                "amp" => '&',
                "lt" => '<',
                "gt" => '>',
                "quot" => '"',
                "apos" => '\'',
                numeric => {
                    let code = numeric.strip_prefix('#').expect("unknown entity");
                    char::from_u32(code.parse().expect("decimal entity")).unwrap()
                }
            };
            out.push(ch);
            rest = &rest[end + 1..];
        }
        out.push_str(rest);
        out
    }

    #[test]
    fn test_sanitize_escapes_markup() {
        let out = sanitize(r#"<a href="x">Tom & 'Jerry'</a>"#);
        assert!(!out.contains('<'));
        assert!(out.contains("Tom "));
        assert_eq!(unescape(&out), r#"<a href="x">Tom & 'Jerry'</a>"#);
    }

    #[test]
    fn test_sanitize_leaves_plain_text_alone() {
        assert_eq!(sanitize("Grafana 📊 dashboards"), "Grafana 📊 dashboards");
        assert_eq!(sanitize("eve@example.com"), "eve@example.com");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_sanitize_output_has_no_raw_markup_and_round_trips() {
        let inputs = [
            "<script>alert('x')</script>",
            "a && b || c > d",
            "\"quoted\" 'single'",
            "&amp; already escaped",
            "mixed <b>bold</b> & \"more\"",
        ];

        for input in inputs {
            let out = sanitize(input);
            assert!(!out.contains('<'), "{out}");
            assert!(!out.contains('>'), "{out}");
            assert!(!out.contains('"'), "{out}");
            assert!(!out.contains('\''), "{out}");
            assert_eq!(unescape(&out), input);
        }
    }
}
