use thiserror::Error;

/// Longest slice of a model reply kept in [`AiError::MalformedResponse`].
pub const RAW_PREVIEW_CHARS: usize = 500;

/// Errors returned by the chat-completions client.
#[derive(Debug, Error)]
pub enum AiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The completion carried no message content.
    #[error("model returned an empty completion")]
    EmptyResponse,

    /// The completion envelope could not be deserialized.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The model's reply was not the JSON payload that was asked for.
    #[error("failed to parse model reply as JSON: {reason}; reply: {raw}")]
    MalformedResponse { reason: String, raw: String },

    /// The client was configured with an unusable base URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl AiError {
    /// Build a [`AiError::MalformedResponse`], keeping at most
    /// [`RAW_PREVIEW_CHARS`] characters of the reply.
    #[must_use]
    pub fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        AiError::MalformedResponse {
            reason: reason.into(),
            raw: raw.chars().take(RAW_PREVIEW_CHARS).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_truncates_raw_reply() {
        let raw = "x".repeat(RAW_PREVIEW_CHARS + 50);
        match AiError::malformed("bad", &raw) {
            AiError::MalformedResponse { raw, reason } => {
                assert_eq!(raw.chars().count(), RAW_PREVIEW_CHARS);
                assert_eq!(reason, "bad");
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn malformed_display_includes_reply() {
        let err = AiError::malformed("expected value", "Sure! Here you go");
        assert!(err.to_string().contains("Sure! Here you go"));
    }
}
