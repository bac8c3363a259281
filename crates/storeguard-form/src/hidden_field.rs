//! Hidden form field carrying the CSRF token.

/// Form field name the server reads the token from.
pub const CSRF_FIELD_NAME: &str = "csrfToken";

/// Render the hidden token input.
///
/// Without a token (or with an empty one) nothing is rendered, so a form never posts an
/// empty `csrfToken`.
pub fn render_hidden_field(token: Option<&str>) -> String {
    match token.filter(|t| !t.is_empty()) {
        Some(token) => format!(
            r#"<input type="hidden" name="{}" value="{}" readonly>"#,
            CSRF_FIELD_NAME,
            escape_attribute(token)
        ),
        None => String::new(),
    }
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
