//! Summarization failure taxonomy and message classification.
//!
//! Every failure in the pipeline is a member of the closed [`SummaryError`]
//! set. Extractors construct variants directly at the point of detection;
//! raw provider-error strings are mapped through [`classify_message`],
//! which is a pure function and independently testable without network
//! access.

use thiserror::Error;

/// Errors that can occur anywhere in the summarization pipeline.
///
/// The set is closed: callers can exhaustively match on it, and each
/// variant exposes a stable machine-readable [`kind`](Self::kind) for
/// logging and persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummaryError {
    /// A network operation failed (timeout, DNS, connection refusal, or a
    /// non-success HTTP status from an upstream page fetch).
    #[error("no internet connection")]
    NoInternet,

    /// The input looked like a link but could not be interpreted as one.
    #[error("the provided link is invalid")]
    InvalidLink,

    /// The video exists but exposes no usable transcript or subtitles.
    #[error("no transcript or subtitles found for this video")]
    NoTranscript {
        /// Upstream reason when one was reported (e.g. a playability status).
        reason: Option<String>,
    },

    /// No usable text could be extracted from the source.
    #[error("could not extract any content")]
    NoContent,

    /// The content is too short to be worth summarizing.
    #[error("the content is too short to summarize")]
    TooShort,

    /// The article is behind a paywall.
    #[error("content is behind a paywall")]
    Paywall,

    /// The content exceeds what the provider will accept.
    #[error("the content is too long to process")]
    TooLong,

    /// The configured API key was rejected by the provider.
    #[error("the API key is incorrect or invalid")]
    IncorrectKey,

    /// The provider reported a rate limit.
    #[error("API rate limit exceeded")]
    RateLimit,

    /// No API key is configured for the active provider.
    #[error("API key is not set")]
    NoKey,

    /// BiliBili extraction requires a logged-in session token.
    #[error("BiliBili login required")]
    BiliBiliLoginRequired,

    /// Anything that did not match a known category; the original message
    /// is preserved verbatim.
    #[error("{0}")]
    Unknown(String),
}

impl SummaryError {
    /// Creates a `NoTranscript` error without an upstream reason.
    #[must_use]
    pub fn no_transcript() -> Self {
        Self::NoTranscript { reason: None }
    }

    /// Creates a `NoTranscript` error carrying the upstream reason.
    #[must_use]
    pub fn no_transcript_because(reason: impl Into<String>) -> Self {
        Self::NoTranscript {
            reason: Some(reason.into()),
        }
    }

    /// Stable machine-readable identifier for this error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoInternet => "no_internet",
            Self::InvalidLink => "invalid_link",
            Self::NoTranscript { .. } => "no_transcript",
            Self::NoContent => "no_content",
            Self::TooShort => "too_short",
            Self::Paywall => "paywall",
            Self::TooLong => "too_long",
            Self::IncorrectKey => "incorrect_key",
            Self::RateLimit => "rate_limit",
            Self::NoKey => "no_key",
            Self::BiliBiliLoginRequired => "bilibili_login_required",
            Self::Unknown(_) => "unknown",
        }
    }

    /// User-facing message for this error, suitable for direct display.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoInternet => "No internet connection.".to_string(),
            Self::InvalidLink => "The provided link is invalid.".to_string(),
            Self::NoTranscript { .. } => {
                "No transcript or subtitles found for this video.".to_string()
            }
            Self::NoContent => "Could not extract any content.".to_string(),
            Self::TooShort => "The content is too short to summarize.".to_string(),
            Self::Paywall => "Content is behind a paywall.".to_string(),
            Self::TooLong => "The content is too long to process.".to_string(),
            Self::IncorrectKey => "The API key is incorrect or invalid.".to_string(),
            Self::RateLimit => "API rate limit exceeded. Please try again later.".to_string(),
            Self::NoKey => "API key is not set.".to_string(),
            Self::BiliBiliLoginRequired => {
                "BiliBili login required. Please log in via settings.".to_string()
            }
            Self::Unknown(message) => message.clone(),
        }
    }
}

/// Classifies a raw provider-error or extractor message into a
/// [`SummaryError`].
///
/// Rules are case-insensitive substring matches evaluated in priority
/// order; the first match wins. Unmatched messages become
/// [`SummaryError::Unknown`] with the original message preserved verbatim.
#[must_use]
pub fn classify_message(message: &str) -> SummaryError {
    let lowered = message.to_lowercase();
    let contains_any =
        |needles: &[&str]| needles.iter().any(|needle| lowered.contains(needle));

    if contains_any(&["paywall"]) {
        SummaryError::Paywall
    } else if contains_any(&["bilibili login", "login required"]) {
        SummaryError::BiliBiliLoginRequired
    } else if contains_any(&["could not extract video id", "invalid link"]) {
        SummaryError::InvalidLink
    } else if contains_any(&["could not get transcript", "no transcript"]) {
        SummaryError::no_transcript()
    } else if contains_any(&[
        "could not extract text from url",
        "extracted text from file is empty",
        "no content",
    ]) {
        SummaryError::NoContent
    } else if contains_any(&["unsupported file type"]) {
        SummaryError::InvalidLink
    } else if contains_any(&["api key"]) {
        SummaryError::IncorrectKey
    } else if contains_any(&["rate limit"]) {
        SummaryError::RateLimit
    } else if contains_any(&["reduce the length", "too long"]) {
        SummaryError::TooLong
    } else {
        SummaryError::Unknown(message.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_paywall() {
        assert_eq!(
            classify_message("Error: Paywall detected."),
            SummaryError::Paywall
        );
    }

    #[test]
    fn test_classify_bilibili_login() {
        assert_eq!(
            classify_message("BiliBili login required. Please log in via settings."),
            SummaryError::BiliBiliLoginRequired
        );
        assert_eq!(
            classify_message("Login required to view captions"),
            SummaryError::BiliBiliLoginRequired
        );
    }

    #[test]
    fn test_classify_invalid_link() {
        assert_eq!(
            classify_message("Could not extract video ID from URL: abc"),
            SummaryError::InvalidLink
        );
        assert_eq!(
            classify_message("Unsupported file type for URI: content://x"),
            SummaryError::InvalidLink
        );
    }

    #[test]
    fn test_classify_transcript_and_content() {
        assert_eq!(
            classify_message("Could not get transcript."),
            SummaryError::no_transcript()
        );
        assert_eq!(
            classify_message("Could not extract text from URL."),
            SummaryError::NoContent
        );
        assert_eq!(
            classify_message("Extracted text from file is empty."),
            SummaryError::NoContent
        );
    }

    #[test]
    fn test_classify_provider_errors() {
        assert_eq!(
            classify_message("Error: Invalid API key provided"),
            SummaryError::IncorrectKey
        );
        assert_eq!(
            classify_message("Rate limit exceeded, try later"),
            SummaryError::RateLimit
        );
        assert_eq!(
            classify_message("Please reduce the length of the messages"),
            SummaryError::TooLong
        );
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify_message("RATE LIMIT"), SummaryError::RateLimit);
        assert_eq!(classify_message("PayWall hit"), SummaryError::Paywall);
    }

    #[test]
    fn test_classify_priority_order_first_match_wins() {
        // "paywall" outranks the later "api key" rule even when both match.
        assert_eq!(
            classify_message("paywall blocked request despite api key"),
            SummaryError::Paywall
        );
    }

    #[test]
    fn test_classify_unknown_preserves_message_verbatim() {
        let message = "totally novel message";
        match classify_message(message) {
            SummaryError::Unknown(preserved) => assert_eq!(preserved, message),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_is_idempotent() {
        let messages = [
            "Rate limit exceeded, try later",
            "totally novel message",
            "Could not get transcript.",
        ];
        for message in messages {
            assert_eq!(classify_message(message), classify_message(message));
        }
    }

    #[test]
    fn test_kind_is_stable() {
        assert_eq!(SummaryError::NoInternet.kind(), "no_internet");
        assert_eq!(SummaryError::no_transcript().kind(), "no_transcript");
        assert_eq!(
            SummaryError::Unknown("whatever".to_string()).kind(),
            "unknown"
        );
    }

    #[test]
    fn test_user_message_unknown_passthrough() {
        let err = SummaryError::Unknown("backend exploded".to_string());
        assert_eq!(err.user_message(), "backend exploded");
    }

    #[test]
    fn test_no_transcript_reason_carried() {
        let err = SummaryError::no_transcript_because("LOGIN_REQUIRED");
        match err {
            SummaryError::NoTranscript { reason } => {
                assert_eq!(reason.as_deref(), Some("LOGIN_REQUIRED"));
            }
            other => panic!("expected NoTranscript, got {other:?}"),
        }
    }
}
