//! Content extraction pipeline for classified sources.
//!
//! Each source kind has a dedicated extractor that turns a URL or document
//! reference into a normalized [`ExtractedContent`]. Extractors share a
//! single HTTP client built by [`build_extractor_http_client`] and uphold
//! one invariant: they either return fully populated content with
//! non-blank text, or fail with a member of the
//! [`SummaryError`](crate::error::SummaryError) taxonomy — never a
//! successful result with blank text.

mod article;
mod bilibili;
mod document;
mod http_client;
mod youtube;

pub use article::ArticleExtractor;
pub use bilibili::{BiliBiliExtractor, SessionProvider, SessionToken};
pub use document::{DocumentExtractor, TextExtractionError, TextExtractionService};
pub use http_client::{DESKTOP_USER_AGENT, build_extractor_http_client};
pub use youtube::{CaptionTrack, TrackName, YouTubeExtractor, extract_video_id};

/// Normalized content produced by an extractor.
///
/// Transient: consumed immediately by the prompt builder and orchestrator,
/// never retained by extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: String,
    pub author: String,
    pub text: String,
}

impl ExtractedContent {
    /// Creates extracted content from its parts.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            text: text.into(),
        }
    }
}
