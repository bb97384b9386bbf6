// Hidden form field rendering

use crate::token::MaskedToken;

/// Escape text for use inside a double-quoted HTML attribute.
pub fn encode_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<input type="hidden" name="FIELD" value="TOKEN">`
pub fn hidden_input(field_name: &str, token: &MaskedToken) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}">"#,
        encode_attribute(field_name),
        encode_attribute(token.as_str())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_attribute() {
        assert_eq!(encode_attribute("plain_-token"), "plain_-token");
        assert_eq!(
            encode_attribute(r#"a"b'c&d<e>"#),
            "a&quot;b&#x27;c&amp;d&lt;e&gt;"
        );
    }

    #[test]
    fn test_hidden_input_shape() {
        let token = MaskedToken::parse(&"A".repeat(64)).unwrap();
        assert_eq!(
            hidden_input("csrftoken", &token),
            format!(r#"<input type="hidden" name="csrftoken" value="{}">"#, "A".repeat(64))
        );
    }

    #[test]
    fn test_hidden_input_escapes_field_name() {
        let token = MaskedToken::parse(&"z".repeat(64)).unwrap();
        let html = hidden_input(r#"x"><script>"#, &token);
        assert!(!html.contains("<script>"));
        assert!(html.contains("x&quot;&gt;&lt;script&gt;"));
    }
}
