// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Interrupted by user")]
    Interrupted,
}

impl Error {
    /// Returns a concise message suitable for display inside a chat entry.
    /// For API errors this is the backend-supplied detail without the
    /// status prefix; transport and decode failures fall back to a generic
    /// message so raw reqwest/serde text never reaches the transcript.
    pub(crate) fn tui_message(&self) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            Error::Http(_) => "Could not reach Gita Bot. Check your connection.".to_string(),
            Error::Json(_) => "Received an unreadable response from Gita Bot.".to_string(),
            other => other.to_string(),
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_keeps_detail() {
        let err = Error::Api {
            status: 503,
            message: "Model overloaded".into(),
        };
        assert_eq!(err.tui_message(), "Model overloaded");
        assert_eq!(err.to_string(), "API error: 503 - Model overloaded");
    }

    #[test]
    fn decode_error_is_masked_for_display() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{nope")
            .unwrap_err()
            .into();
        assert!(err.tui_message().contains("unreadable"));
    }
}
