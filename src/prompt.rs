//! Prompt construction for the summarization call.
//!
//! [`build_prompt`] is a pure function over the active provider, the kind
//! of content being summarized, an optional title, the requested length,
//! and the target language. Two template families exist: one phrased for
//! OpenAI-compatible models and one for the Gemini/Groq family. Both
//! encode the same length contract but are tuned separately; the
//! duplication is intentional and must not be collapsed.

use std::fmt;

use crate::provider::AIProvider;

/// Requested summary length, ordinal from shortest to longest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    /// Response token budget used when calling the provider.
    #[must_use]
    pub fn max_tokens(self) -> u32 {
        match self {
            Self::Short => 400,
            Self::Medium => 600,
            Self::Long => 800,
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Medium => write!(f, "medium"),
            Self::Long => write!(f, "long"),
        }
    }
}

/// What kind of content the extracted text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    VideoTranscript,
    Article,
    Text,
    Document,
}

impl ContentKind {
    fn noun(self) -> &'static str {
        match self {
            Self::VideoTranscript => "transcript",
            Self::Article => "article",
            Self::Text => "text",
            Self::Document => "document",
        }
    }

    /// Subject phrase for the OpenAI-style family, e.g. "a transcript of
    /// the video titled 'X'".
    fn provided_subject(self, title: Option<&str>) -> String {
        let titled = title_phrase(title);
        match self {
            Self::VideoTranscript => format!("a transcript of the video{titled}"),
            Self::Article => format!("the article{titled}"),
            Self::Text => "a text".to_string(),
            Self::Document => "a document".to_string(),
        }
    }

    /// Subject phrase for the Gemini-style family, e.g. "the video
    /// transcript titled 'X'".
    fn direct_subject(self, title: Option<&str>) -> String {
        let titled = title_phrase(title);
        match self {
            Self::VideoTranscript => format!("the video transcript{titled}"),
            Self::Article => format!("the article{titled}"),
            Self::Text => "this text".to_string(),
            Self::Document => "this document".to_string(),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VideoTranscript => write!(f, "video transcript"),
            Self::Article => write!(f, "article"),
            Self::Text => write!(f, "text"),
            Self::Document => write!(f, "document"),
        }
    }
}

fn title_phrase(title: Option<&str>) -> String {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!(" titled '{t}'"))
        .unwrap_or_default()
}

/// Builds the system prompt for a summarization request.
///
/// `language` is either a display-language name or the literal
/// "the same language as the content" sentence fragment; both read
/// naturally in the templates.
#[must_use]
pub fn build_prompt(
    provider: AIProvider,
    kind: ContentKind,
    title: Option<&str>,
    length: SummaryLength,
    language: &str,
) -> String {
    match provider {
        AIProvider::OpenAi | AIProvider::Claude => openai_style_prompt(kind, title, length, language),
        AIProvider::Gemini | AIProvider::Groq => gemini_style_prompt(kind, title, length, language),
    }
}

fn openai_style_prompt(
    kind: ContentKind,
    title: Option<&str>,
    length: SummaryLength,
    language: &str,
) -> String {
    let subject = kind.provided_subject(title);
    let noun = kind.noun();
    match length {
        SummaryLength::Short => format!(
            "You will be provided with {subject}, and your task is to generate a very \
             short, concise summary with a maximum of 20 words of the {noun} in \
             {language} using only 3 bullet points."
        ),
        SummaryLength::Medium => format!(
            "You will be provided with {subject}, and your task is to generate a very \
             short, concise summary with a maximum of 60 words of the {noun} in \
             {language}. If it includes a conclusion or key takeaway, make sure to \
             include that in the end."
        ),
        SummaryLength::Long => format!(
            "You will be provided with {subject}, and your task is to generate a \
             summary of the {noun} in {language}. If it includes a conclusion or key \
             takeaway, make sure to include that in the end."
        ),
    }
}

fn gemini_style_prompt(
    kind: ContentKind,
    title: Option<&str>,
    length: SummaryLength,
    language: &str,
) -> String {
    let subject = kind.direct_subject(title);
    match length {
        SummaryLength::Short => format!(
            "Act as an expert content summarizer. Extract exactly 3 key points from \
             {subject}. Format as 3 bullet points only, each starting with a dash, \
             each containing 3-5 words maximum, and not forming complete sentences. \
             Do not include any introductory text, conclusion, or explanations. No \
             markdown formatting. Deliver only the 3 bullet points in {language}."
        ),
        SummaryLength::Medium => format!(
            "Act as a professional summarizer. Condense {subject} into a single \
             paragraph of exactly 70 words. Include the main point and any conclusion \
             if relevant. Do not use any headings, introductions, or metacommentary. \
             No markdown formatting or special characters. Deliver only the 70-word \
             summary in {language}."
        ),
        SummaryLength::Long => match kind {
            ContentKind::VideoTranscript => format!(
                "Act as a content analysis specialist. Create a detailed summary of \
                 {subject} using exactly 130 words. Cover the main topic, key points, \
                 and any conclusions in a cohesive narrative. Do not include any \
                 headings, introductions, or phrases like 'In summary' or 'In \
                 conclusion'. No markdown formatting. Deliver only the 130-word \
                 summary in {language}."
            ),
            _ => format!(
                "Act as a content analysis specialist. Create a comprehensive summary \
                 of {subject} that captures its essential information, arguments, and \
                 conclusions. Do not include any headings, introductions, or phrases \
                 like 'In summary' or 'In conclusion'. No markdown formatting. Deliver \
                 only the summary in {language}."
            ),
        },
    }
}
