//! Source classification for raw user input.
//!
//! The classifier inspects the raw input string (plus an optional document
//! hint from the platform file picker) and produces a tagged
//! [`ContentSource`] for the orchestrator to dispatch on. Host matching is
//! always done on the parsed URL host, never by substring search on the
//! raw string, so hosts that merely embed a brand name
//! (`notyoutube.com.evil.test`) do not match.

use std::borrow::Cow;
use std::fmt;

use url::Url;

/// Which video site a [`ContentSource::Video`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSite {
    YouTube,
    BiliBili,
}

impl fmt::Display for VideoSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YouTube => write!(f, "YouTube"),
            Self::BiliBili => write!(f, "BiliBili"),
        }
    }
}

/// A document reference supplied by the caller alongside the raw input
/// (e.g. from a file picker). Presence of a hint always wins over the text
/// input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHint {
    /// Display filename, when the platform exposes one.
    pub filename: Option<String>,
    /// Opaque URI understood by the injected text-extraction service.
    pub uri: String,
}

/// Classified summarization input. Created once per request, immutable,
/// consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// A video URL on a recognized transcript-bearing site.
    Video { url: String, site: VideoSite },
    /// Any other `http(s)` URL.
    Article { url: String },
    /// A document reference to hand to the text-extraction service.
    Document {
        filename: Option<String>,
        uri: String,
    },
    /// Pasted plain text.
    Text { content: String },
    /// Blank input.
    None,
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video { site, .. } => write!(f, "{site} video"),
            Self::Article { .. } => write!(f, "article"),
            Self::Document { .. } => write!(f, "document"),
            Self::Text { .. } => write!(f, "text"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Classifies raw user input into a [`ContentSource`].
///
/// Rules, in order: a document hint always wins; an `http(s)`-prefixed
/// input is a video when its host belongs to a recognized video site and
/// an article otherwise; any other non-blank input is pasted text.
#[must_use]
pub fn classify(raw_input: &str, document_hint: Option<DocumentHint>) -> ContentSource {
    if let Some(hint) = document_hint {
        return ContentSource::Document {
            filename: hint.filename,
            uri: hint.uri,
        };
    }

    let trimmed = raw_input.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        let url = trimmed.to_string();
        if is_youtube_link(trimmed) {
            return ContentSource::Video {
                url,
                site: VideoSite::YouTube,
            };
        }
        if is_bilibili_link(trimmed) {
            return ContentSource::Video {
                url,
                site: VideoSite::BiliBili,
            };
        }
        return ContentSource::Article { url };
    }

    if trimmed.is_empty() {
        ContentSource::None
    } else {
        ContentSource::Text {
            content: trimmed.to_string(),
        }
    }
}

/// Prefixes `https://` when the input has no explicit scheme, so bare
/// hosts and scheme-less links still parse.
#[must_use]
pub fn ensure_scheme(input: &str) -> Cow<'_, str> {
    let lowered = input.trim_start().to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("https://{input}"))
    }
}

/// Returns the lower-cased host of `input`, defaulting the scheme first.
#[must_use]
pub fn parsed_host(input: &str) -> Option<String> {
    let url = Url::parse(ensure_scheme(input.trim()).as_ref()).ok()?;
    url.host_str().map(str::to_ascii_lowercase)
}

fn host_matches_site(host: &str, apexes: &[&str]) -> bool {
    apexes.iter().any(|apex| {
        host == *apex || host.strip_suffix(apex).is_some_and(|rest| rest.ends_with('.'))
    })
}

/// Returns true when the parsed host is `youtu.be`, `youtube.com`, or any
/// subdomain of `youtube.com`.
#[must_use]
pub fn is_youtube_link(input: &str) -> bool {
    parsed_host(input)
        .is_some_and(|host| host_matches_site(&host, &["youtu.be", "youtube.com"]))
}

/// Returns true when the parsed host is `b23.tv`, `bilibili.com`, or any
/// subdomain of `bilibili.com`.
#[must_use]
pub fn is_bilibili_link(input: &str) -> bool {
    parsed_host(input).is_some_and(|host| host_matches_site(&host, &["b23.tv", "bilibili.com"]))
}
