//! AI provider catalogue and the narrow LLM adapter seam.
//!
//! Concrete provider SDKs are external collaborators. The core only needs
//! "send system prompt plus text, get back a string" — success is the
//! summary, failure is a string beginning with `Error: ` that the
//! orchestrator routes through the message classifier.

use std::fmt;

use async_trait::async_trait;

use crate::prompt::SummaryLength;

/// Supported LLM providers. Loaded from persisted settings by the caller;
/// read-only to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AIProvider {
    OpenAi,
    Gemini,
    Claude,
    Groq,
}

impl AIProvider {
    /// Every provider, in display order.
    pub const ALL: [Self; 4] = [Self::OpenAi, Self::Gemini, Self::Claude, Self::Groq];

    /// Human-readable provider name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Gemini",
            Self::Claude => "Claude",
            Self::Groq => "Groq",
        }
    }

    /// Whether requests require an API key. True for every current
    /// provider; kept per-provider so a keyless backend can be added
    /// without touching callers.
    #[must_use]
    pub fn requires_api_key(self) -> bool {
        match self {
            Self::OpenAi | Self::Gemini | Self::Claude | Self::Groq => true,
        }
    }

    /// Whether the user may point the provider at a custom base URL
    /// (OpenAI-compatible gateways).
    #[must_use]
    pub fn is_base_url_customizable(self) -> bool {
        matches!(self, Self::OpenAi)
    }

    /// Whether the provider is currently selectable. Groq ships in the
    /// catalogue but stays disabled.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Groq)
    }

    /// Model used when the user has not picked one.
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-2.5-flash",
            Self::Claude => "claude-3-5-sonnet-latest",
            Self::Groq => "llama-3.1-8b-instant",
        }
    }

    /// Models offered for this provider, default first.
    #[must_use]
    pub fn model_catalogue(self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["gpt-4o-mini", "gpt-4o", "gpt-3.5-turbo"],
            Self::Gemini => &["gemini-2.5-flash", "gemini-2.0-flash"],
            Self::Claude => &["claude-3-5-sonnet-latest", "claude-3-5-haiku-latest"],
            Self::Groq => &["llama-3.1-8b-instant"],
        }
    }
}

impl fmt::Display for AIProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One summarization call to a provider.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub provider: AIProvider,
    pub api_key: &'a str,
    /// Custom endpoint, honored only for base-URL-customizable providers.
    pub base_url: Option<&'a str>,
    pub system_prompt: &'a str,
    pub text: &'a str,
    /// Response budget derived from the requested summary length.
    pub max_tokens: u32,
}

impl GenerationRequest<'_> {
    /// Response budget for a given summary length.
    #[must_use]
    pub fn max_tokens_for(length: SummaryLength) -> u32 {
        length.max_tokens()
    }
}

/// Narrow seam over concrete provider SDKs.
///
/// The returned string is either the summary or begins with a
/// recognizable `Error: ` prefix; the orchestrator classifies it. Keeping
/// the contract stringly here mirrors what every SDK actually hands back
/// and keeps the adapter trivially fakeable in tests.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_metadata() {
        assert_eq!(AIProvider::OpenAi.display_name(), "OpenAI");
        assert!(AIProvider::OpenAi.is_base_url_customizable());
        assert!(!AIProvider::Gemini.is_base_url_customizable());
        assert!(!AIProvider::Claude.is_base_url_customizable());
        for provider in AIProvider::ALL {
            assert!(provider.requires_api_key());
        }
    }

    #[test]
    fn test_groq_is_disabled() {
        assert!(!AIProvider::Groq.is_enabled());
        assert!(AIProvider::OpenAi.is_enabled());
        assert!(AIProvider::Gemini.is_enabled());
        assert!(AIProvider::Claude.is_enabled());
    }

    #[test]
    fn test_default_model_is_in_catalogue() {
        for provider in AIProvider::ALL {
            assert!(
                provider
                    .model_catalogue()
                    .contains(&provider.default_model()),
                "default model missing from catalogue for {provider}"
            );
        }
    }

    #[test]
    fn test_max_tokens_for_length() {
        assert_eq!(GenerationRequest::max_tokens_for(SummaryLength::Short), 400);
        assert_eq!(GenerationRequest::max_tokens_for(SummaryLength::Long), 800);
    }
}
