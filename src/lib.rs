//! Summarize Core Library
//!
//! This library turns arbitrary user input — a URL, pasted text, or a
//! document reference — into normalized content plus an AI-generated
//! summary. The hard part is the content-resolution pipeline: each source
//! has a different, undocumented, failure-prone wire protocol, and every
//! failure is classified into one stable taxonomy.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`source`] - Input classification (URL vs. text vs. document)
//! - [`extract`] - Per-source extractors (YouTube, BiliBili, articles,
//!   documents) over a shared HTTP client
//! - [`prompt`] - Provider-specific summarization prompt construction
//! - [`provider`] - Provider catalogue and the narrow LLM adapter seam
//! - [`orchestrator`] - The sequential per-request pipeline
//! - [`error`] - The shared failure taxonomy and message classifier

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod source;

// Re-export commonly used types
pub use error::{SummaryError, classify_message};
pub use extract::{
    ArticleExtractor, BiliBiliExtractor, DocumentExtractor, ExtractedContent, SessionProvider,
    SessionToken, TextExtractionError, TextExtractionService, YouTubeExtractor, extract_video_id,
};
pub use orchestrator::{Summarizer, SummaryResult, SummarySettings, SummarySlot};
pub use prompt::{ContentKind, SummaryLength, build_prompt};
pub use provider::{AIProvider, GenerationRequest, LlmAdapter};
pub use source::{
    ContentSource, DocumentHint, VideoSite, classify, is_bilibili_link, is_youtube_link,
};
