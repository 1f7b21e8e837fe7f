//! Rich text envelope helpers
//!
//! Descriptions and rich-text attribute values travel as a structured
//! editor envelope (JSON with a `blocks` array). Authored values that
//! already look structured pass through verbatim; plain text is wrapped in
//! a minimal one-block envelope.

use serde_json::json;

/// Wrap raw text in the structured rich-text envelope, or pass it through
/// verbatim when it already looks like one (`{ ... }`).
pub fn wrap_rich_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return trimmed.to_string();
    }
    json!({
        "blocks": [
            {
                "type": "paragraph",
                "data": { "text": raw }
            }
        ],
        "version": "2.24.3"
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_wrapped() {
        let wrapped = wrap_rich_text("A fine product");
        let parsed: serde_json::Value = serde_json::from_str(&wrapped).unwrap();
        assert_eq!(parsed["blocks"][0]["type"], "paragraph");
        assert_eq!(parsed["blocks"][0]["data"]["text"], "A fine product");
    }

    #[test]
    fn test_structured_payload_passes_through() {
        let raw = r#"{"blocks": [{"type": "header", "data": {"text": "Hi"}}]}"#;
        assert_eq!(wrap_rich_text(raw), raw);
    }

    #[test]
    fn test_structured_payload_is_trimmed() {
        let raw = "  {\"blocks\": []}  ";
        assert_eq!(wrap_rich_text(raw), "{\"blocks\": []}");
    }
}
