//! Summarization orchestrator.
//!
//! A stateless pipeline per request: classify the input, extract
//! normalized content, build the provider prompt, call the LLM adapter,
//! classify its response, and wrap the result. No step is retried; the
//! first failure is terminal for the request and surfaces to the caller
//! as a typed [`SummaryError`]. Persistence and UI subscription are the
//! caller's responsibility — the orchestrator only consumes an explicit
//! [`SummarySettings`] snapshot and returns a value.

use std::future::Future;
use std::sync::Arc;

use reqwest::cookie::Jar;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::{SummaryError, classify_message};
use crate::extract::{
    ArticleExtractor, BiliBiliExtractor, DocumentExtractor, ExtractedContent, SessionProvider,
    TextExtractionService, YouTubeExtractor, build_extractor_http_client,
};
use crate::prompt::{ContentKind, SummaryLength, build_prompt};
use crate::provider::{AIProvider, GenerationRequest, LlmAdapter};
use crate::source::{ContentSource, DocumentHint, VideoSite, classify, parsed_host};

/// Pasted text and extracted documents below this many characters are
/// rejected as too short to summarize.
const MIN_SUMMARIZABLE_CHARS: usize = 100;

/// Read-only settings snapshot for one summarization request, taken from
/// the external settings store.
#[derive(Debug, Clone)]
pub struct SummarySettings {
    pub provider: AIProvider,
    pub api_key: Option<String>,
    /// Custom endpoint, honored only for base-URL-customizable providers.
    pub base_url: Option<String>,
    /// Summarize in the content's own language instead of
    /// `display_language`.
    pub use_original_language: bool,
    /// The app's configured display language, as an English language name.
    pub display_language: String,
    pub summary_length: SummaryLength,
}

/// Terminal artifact of a successful summarization, handed to the
/// caller's history/UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub source_link: Option<String>,
    pub is_youtube_link: bool,
    pub is_bilibili_link: bool,
    pub length: SummaryLength,
}

/// The summarization pipeline over its injected collaborators.
pub struct Summarizer {
    youtube: YouTubeExtractor,
    bilibili: BiliBiliExtractor,
    article: ArticleExtractor,
    document: DocumentExtractor,
    llm: Arc<dyn LlmAdapter>,
}

impl Summarizer {
    /// Creates a summarizer against the production endpoints, sharing one
    /// HTTP client (with a cookie jar for short-link redirect handling)
    /// across all extractors.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::NoInternet`] when the HTTP client cannot be
    /// constructed.
    pub fn new(
        llm: Arc<dyn LlmAdapter>,
        text_extraction: Arc<dyn TextExtractionService>,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, SummaryError> {
        let client = build_extractor_http_client(Some(Arc::new(Jar::default())))?;
        Ok(Self {
            youtube: YouTubeExtractor::new(client.clone()),
            bilibili: BiliBiliExtractor::new(client.clone(), session),
            article: ArticleExtractor::new(client),
            document: DocumentExtractor::new(text_extraction),
            llm,
        })
    }

    /// Assembles a summarizer from pre-built extractors; used by tests to
    /// point extractors at mock servers.
    #[must_use]
    pub fn from_parts(
        youtube: YouTubeExtractor,
        bilibili: BiliBiliExtractor,
        article: ArticleExtractor,
        document: DocumentExtractor,
        llm: Arc<dyn LlmAdapter>,
    ) -> Self {
        Self {
            youtube,
            bilibili,
            article,
            document,
            llm,
        }
    }

    /// Runs the full pipeline for one request.
    ///
    /// # Errors
    ///
    /// Any member of the [`SummaryError`] taxonomy; extractor errors
    /// propagate unchanged, provider errors arrive classified.
    #[tracing::instrument(
        skip(self, raw_input, document_hint, settings),
        fields(provider = %settings.provider, length = %settings.summary_length)
    )]
    pub async fn summarize(
        &self,
        raw_input: &str,
        document_hint: Option<DocumentHint>,
        settings: &SummarySettings,
    ) -> Result<SummaryResult, SummaryError> {
        let source = classify(raw_input, document_hint);
        debug!(source = %source, "classified input");
        if source == ContentSource::None {
            return Err(SummaryError::NoContent);
        }

        if let ContentSource::Video { url, .. } | ContentSource::Article { url } = &source
            && parsed_host(url).is_none()
        {
            return Err(SummaryError::InvalidLink);
        }

        let provider = settings.provider;
        if !provider.is_enabled() {
            return Err(SummaryError::Unknown(format!(
                "{} support is disabled.",
                provider.display_name()
            )));
        }
        let api_key = settings.api_key.as_deref().unwrap_or("").trim();
        if provider.requires_api_key() && api_key.is_empty() {
            return Err(SummaryError::NoKey);
        }

        let (content, kind, source_link) = self.extract(&source).await?;
        let (is_youtube_link, is_bilibili_link) = match &source {
            ContentSource::Video { site, .. } => (
                *site == VideoSite::YouTube,
                *site == VideoSite::BiliBili,
            ),
            _ => (false, false),
        };

        if matches!(kind, ContentKind::Text | ContentKind::Document)
            && content.text.chars().count() < MIN_SUMMARIZABLE_CHARS
        {
            return Err(SummaryError::TooShort);
        }

        let language = if settings.use_original_language {
            "the same language as the content".to_string()
        } else {
            settings.display_language.clone()
        };

        let title_for_prompt = matches!(kind, ContentKind::VideoTranscript | ContentKind::Article)
            .then_some(content.title.as_str());
        let system_prompt = build_prompt(
            provider,
            kind,
            title_for_prompt,
            settings.summary_length,
            &language,
        );

        let request = GenerationRequest {
            provider,
            api_key,
            base_url: settings
                .base_url
                .as_deref()
                .filter(|_| provider.is_base_url_customizable()),
            system_prompt: &system_prompt,
            text: &content.text,
            max_tokens: settings.summary_length.max_tokens(),
        };
        let response = self.llm.generate(request).await;

        let summary = response.trim();
        if summary.is_empty() || summary.to_ascii_lowercase().starts_with("error:") {
            let classified = classify_message(summary);
            warn!(kind = classified.kind(), "provider returned an error response");
            return Err(classified);
        }

        info!(chars = summary.chars().count(), "summarization complete");
        Ok(SummaryResult {
            title: content.title,
            author: content.author,
            summary: summary.to_string(),
            source_link,
            is_youtube_link,
            is_bilibili_link,
            length: settings.summary_length,
        })
    }

    async fn extract(
        &self,
        source: &ContentSource,
    ) -> Result<(ExtractedContent, ContentKind, Option<String>), SummaryError> {
        match source {
            ContentSource::Video {
                url,
                site: VideoSite::YouTube,
            } => {
                let content = self.youtube.extract(url).await?;
                Ok((content, ContentKind::VideoTranscript, Some(url.clone())))
            }
            ContentSource::Video {
                url,
                site: VideoSite::BiliBili,
            } => {
                let content = self.bilibili.extract(url).await?;
                Ok((content, ContentKind::VideoTranscript, Some(url.clone())))
            }
            ContentSource::Article { url } => {
                let content = self.article.extract(url).await?;
                Ok((content, ContentKind::Article, Some(url.clone())))
            }
            ContentSource::Document { filename, uri } => {
                let content = self.document.extract(filename.as_deref(), uri).await?;
                Ok((content, ContentKind::Document, None))
            }
            ContentSource::Text { content } => Ok((
                ExtractedContent::new("Text Input", "Unknown", content.clone()),
                ContentKind::Text,
                None,
            )),
            // Rejected before dispatch.
            ContentSource::None => Err(SummaryError::NoContent),
        }
    }
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer").finish_non_exhaustive()
    }
}

/// Holds at most one in-flight summarization task for a logical "current
/// result" slot, aborting the previous pipeline (and its in-flight HTTP
/// calls) whenever a new one starts.
#[derive(Debug, Default)]
pub struct SummarySlot {
    in_flight: Option<AbortHandle>,
}

impl SummarySlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `pipeline` as the slot's current task, aborting whichever
    /// task occupied the slot before.
    pub fn begin<F>(&mut self, pipeline: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        if let Some(previous) = self.in_flight.take() {
            debug!("aborting superseded summarization task");
            previous.abort();
        }
        let handle = tokio::spawn(pipeline);
        self.in_flight = Some(handle.abort_handle());
        handle
    }

    /// Aborts the current task, if any, leaving the slot empty.
    pub fn cancel(&mut self) {
        if let Some(current) = self.in_flight.take() {
            current.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::extract::{SessionToken, TextExtractionError};
    use async_trait::async_trait;
    use std::time::Duration;

    struct CannedAdapter {
        response: String,
    }

    #[async_trait]
    impl LlmAdapter for CannedAdapter {
        async fn generate(&self, _request: GenerationRequest<'_>) -> String {
            self.response.clone()
        }
    }

    struct NoDocuments;

    #[async_trait]
    impl TextExtractionService for NoDocuments {
        async fn extract(&self, _uri: &str) -> Result<String, TextExtractionError> {
            Err(TextExtractionError::Failed("no backend".to_string()))
        }
    }

    struct NoSession;

    impl SessionProvider for NoSession {
        fn current_session_token(&self) -> Option<SessionToken> {
            None
        }
    }

    fn summarizer(response: &str) -> Summarizer {
        Summarizer::new(
            Arc::new(CannedAdapter {
                response: response.to_string(),
            }),
            Arc::new(NoDocuments),
            Arc::new(NoSession),
        )
        .unwrap()
    }

    fn settings() -> SummarySettings {
        SummarySettings {
            provider: AIProvider::OpenAi,
            api_key: Some("sk-test".to_string()),
            base_url: None,
            use_original_language: false,
            display_language: "English".to_string(),
            summary_length: SummaryLength::Medium,
        }
    }

    fn long_text() -> String {
        "word ".repeat(40)
    }

    #[tokio::test]
    async fn test_blank_input_is_no_content() {
        let result = summarizer("ok").summarize("   ", None, &settings()).await;
        assert_eq!(result, Err(SummaryError::NoContent));
    }

    #[tokio::test]
    async fn test_url_without_host_is_invalid_link() {
        let result = summarizer("ok")
            .summarize("https://", None, &settings())
            .await;
        assert_eq!(result, Err(SummaryError::InvalidLink));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_no_key() {
        let mut settings = settings();
        settings.api_key = None;
        let result = summarizer("ok")
            .summarize(&long_text(), None, &settings)
            .await;
        assert_eq!(result, Err(SummaryError::NoKey));

        settings.api_key = Some("   ".to_string());
        let result = summarizer("ok")
            .summarize(&long_text(), None, &settings)
            .await;
        assert_eq!(result, Err(SummaryError::NoKey));
    }

    #[tokio::test]
    async fn test_disabled_provider_is_rejected() {
        let mut settings = settings();
        settings.provider = AIProvider::Groq;
        let result = summarizer("ok")
            .summarize(&long_text(), None, &settings)
            .await;
        match result {
            Err(SummaryError::Unknown(message)) => assert!(message.contains("Groq")),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_short_text_is_too_short() {
        let result = summarizer("ok")
            .summarize("brief note", None, &settings())
            .await;
        assert_eq!(result, Err(SummaryError::TooShort));
    }

    #[tokio::test]
    async fn test_text_input_happy_path() {
        let result = summarizer("  A tidy summary.  ")
            .summarize(&long_text(), None, &settings())
            .await
            .unwrap();
        assert_eq!(result.title, "Text Input");
        assert_eq!(result.author, "Unknown");
        assert_eq!(result.summary, "A tidy summary.");
        assert_eq!(result.source_link, None);
        assert!(!result.is_youtube_link);
        assert!(!result.is_bilibili_link);
        assert_eq!(result.length, SummaryLength::Medium);
    }

    #[tokio::test]
    async fn test_provider_error_response_is_classified() {
        let result = summarizer("Error: Rate limit exceeded, try later")
            .summarize(&long_text(), None, &settings())
            .await;
        assert_eq!(result, Err(SummaryError::RateLimit));
    }

    #[tokio::test]
    async fn test_unmatched_provider_error_preserves_message() {
        let result = summarizer("Error: something very strange")
            .summarize(&long_text(), None, &settings())
            .await;
        match result {
            Err(SummaryError::Unknown(message)) => {
                assert_eq!(message, "Error: something very strange");
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bilibili_without_session_needs_login() {
        let result = summarizer("ok")
            .summarize(
                "https://www.bilibili.com/video/BV1xx411c7mD",
                None,
                &settings(),
            )
            .await;
        assert_eq!(result, Err(SummaryError::BiliBiliLoginRequired));
    }

    #[tokio::test]
    async fn test_document_hint_routes_to_document_extractor() {
        let hint = DocumentHint {
            filename: Some("notes.pdf".to_string()),
            uri: "content://docs/notes.pdf".to_string(),
        };
        let result = summarizer("ok")
            .summarize("ignored text", Some(hint), &settings())
            .await;
        // The NoDocuments fake always fails, mapped to NoContent.
        assert_eq!(result, Err(SummaryError::NoContent));
    }

    #[tokio::test]
    async fn test_summary_slot_aborts_previous_task() {
        let mut slot = SummarySlot::new();
        let first = slot.begin(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            1
        });
        let second = slot.begin(async { 2 });

        let first_result = first.await;
        assert!(first_result.unwrap_err().is_cancelled());
        assert_eq!(second.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_summary_slot_cancel() {
        let mut slot = SummarySlot::new();
        let task = slot.begin(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        slot.cancel();
        assert!(task.await.unwrap_err().is_cancelled());
    }
}
