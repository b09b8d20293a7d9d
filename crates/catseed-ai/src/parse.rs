//! Pulling a JSON payload out of a model reply.

use serde::de::DeserializeOwned;

use crate::error::AiError;

/// Returns the JSON text inside a model reply.
///
/// Replies are asked to be raw JSON but sometimes arrive wrapped in a
/// markdown fence (```` ```json ```` or a bare ```` ``` ````). When a fenced
/// block whose body is a JSON object is present its body is returned;
/// otherwise the whole reply, trimmed.
#[must_use]
pub fn extract_json(text: &str) -> &str {
    fenced_body(text).unwrap_or_else(|| text.trim())
}

fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    let after_tag = after_fence.strip_prefix("json").unwrap_or(after_fence);
    let close = after_tag.find("```")?;
    let body = after_tag[..close].trim();
    (body.starts_with('{') && body.ends_with('}')).then_some(body)
}

/// Extracts the JSON in `text` and deserializes it into `T`.
///
/// # Errors
///
/// Returns [`AiError::MalformedResponse`] carrying the parser message and
/// the head of the raw reply when the text is not valid JSON for `T`.
pub fn parse_payload<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    serde_json::from_str(extract_json(text)).map_err(|e| AiError::malformed(e.to_string(), text))
}

#[cfg(test)]
mod tests {
    use catseed_core::{OptionSuggestions, VariantOptions};

    use super::*;

    #[test]
    fn raw_json_is_returned_trimmed() {
        assert_eq!(extract_json("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn json_fence_body_is_extracted() {
        let reply = "Here you go:\n```json\n{\"options\": []}\n```\nThanks";
        assert_eq!(extract_json(reply), "{\"options\": []}");
    }

    #[test]
    fn bare_fence_body_is_extracted() {
        let reply = "```\n{\"suggested_option_codes\": [\"color\"]}\n```";
        assert_eq!(
            extract_json(reply),
            "{\"suggested_option_codes\": [\"color\"]}"
        );
    }

    #[test]
    fn fence_without_object_falls_back_to_whole_text() {
        let reply = "```\nnot json\n```";
        assert_eq!(extract_json(reply), reply);
    }

    #[test]
    fn parse_payload_reads_variant_options() {
        let reply = r#"```json
{"options": [{"code": "size", "name": "Size", "values": ["S", "M"]}]}
```"#;
        let parsed: VariantOptions = parse_payload(reply).unwrap();
        assert_eq!(parsed.options.len(), 1);
        assert_eq!(parsed.options[0].code, "size");
        assert_eq!(parsed.options[0].values, vec!["S", "M"]);
    }

    #[test]
    fn parse_payload_reads_option_suggestions() {
        let parsed: OptionSuggestions =
            parse_payload(r#"{"suggested_option_codes": ["color", "size"]}"#).unwrap();
        assert_eq!(parsed.suggested_option_codes, vec!["color", "size"]);
    }

    #[test]
    fn parse_payload_rejects_prose() {
        let err = parse_payload::<VariantOptions>("I cannot help with that.").unwrap_err();
        match err {
            AiError::MalformedResponse { raw, .. } => {
                assert_eq!(raw, "I cannot help with that.");
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }
}
