//! Document extraction seam.
//!
//! OCR/PDF/DOCX rendering is a platform capability, not something this
//! crate reimplements. The orchestrator talks to an injected
//! [`TextExtractionService`] and maps its failures into the shared error
//! taxonomy.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::error::SummaryError;

use super::ExtractedContent;

/// Failure modes reported by a platform text-extraction backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TextExtractionError {
    /// The file format is not one the backend can read.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Any other backend failure, with the backend's message.
    #[error("{0}")]
    Failed(String),
}

/// Extracts plain text from a document URI (PDF, DOCX, image OCR, ...).
///
/// Implementations live outside the core; tests use in-memory fakes.
#[async_trait]
pub trait TextExtractionService: Send + Sync {
    async fn extract(&self, uri: &str) -> Result<String, TextExtractionError>;
}

/// Adapts an injected [`TextExtractionService`] to the extractor contract.
pub struct DocumentExtractor {
    service: Arc<dyn TextExtractionService>,
}

impl DocumentExtractor {
    /// Creates an extractor over the injected backend.
    #[must_use]
    pub fn new(service: Arc<dyn TextExtractionService>) -> Self {
        Self { service }
    }

    /// Extracts document content; the filename becomes the title.
    ///
    /// # Errors
    ///
    /// - [`SummaryError::InvalidLink`] for unsupported file types.
    /// - [`SummaryError::NoContent`] for any other backend failure or
    ///   blank extracted text.
    #[tracing::instrument(skip(self), fields(uri = %uri))]
    pub async fn extract(
        &self,
        filename: Option<&str>,
        uri: &str,
    ) -> Result<ExtractedContent, SummaryError> {
        let text = match self.service.extract(uri).await {
            Ok(text) => text,
            Err(TextExtractionError::UnsupportedFileType(detail)) => {
                warn!(detail = %detail, "unsupported document type");
                return Err(SummaryError::InvalidLink);
            }
            Err(TextExtractionError::Failed(message)) => {
                warn!(message = %message, "document extraction failed");
                return Err(SummaryError::NoContent);
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(SummaryError::NoContent);
        }

        let title = filename
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("Document");
        Ok(ExtractedContent::new(title, "File System", text))
    }
}

impl std::fmt::Debug for DocumentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentExtractor").finish_non_exhaustive()
    }
}
