//! # contract: shared data model and the provider interface
//!
//! This module defines the data types that flow through the pipeline
//! (options, upload items, per-item outcomes, batch results), the
//! provider-agnostic error taxonomy, and the [`TranslationProvider`] trait
//! that wraps the remote translation service.
//!
//! ## Interface & Extensibility
//! - Implement [`TranslationProvider`] to add a new backend (API client,
//!   test double, fixture replay). All methods are async and return
//!   [`ProviderError`] values carrying one [`ErrorKind`].
//! - Provider-native failures (HTTP statuses, transport errors) must be
//!   mapped to an [`ErrorKind`] inside the implementation; nothing above
//!   the provider boundary inspects provider-native error representations.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so consumers can generate
//!   deterministic mocks for unit/integration tests (exported behind the
//!   `test-export-mocks` feature).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::staging::StagedFile;

/// Tone option applied to document and text translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Default,
    More,
    Less,
}

impl Formality {
    /// Wire value for the provider request, `None` when the provider
    /// default should apply.
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            Formality::Default => None,
            Formality::More => Some("more"),
            Formality::Less => Some("less"),
        }
    }
}

impl From<&str> for Formality {
    fn from(s: &str) -> Self {
        match s {
            "default" | "" => Formality::Default,
            "more" => Formality::More,
            "less" => Formality::Less,
            other => {
                tracing::warn!(formality = other, "Unknown formality, defaulting");
                Formality::Default
            }
        }
    }
}

/// Options shared read-only across every item in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationOptions {
    /// Provider language code, e.g. `DE` or `EN-US`.
    pub target_lang: String,
    /// Source language code; `None` lets the provider detect it.
    pub source_lang: Option<String>,
    pub formality: Formality,
}

impl TranslationOptions {
    pub fn new(target_lang: impl Into<String>) -> Self {
        Self {
            target_lang: target_lang.into(),
            source_lang: None,
            formality: Formality::Default,
        }
    }
}

/// One uploaded file as submitted by the caller. Consumed (staged) exactly
/// once by the item translator.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub original_filename: String,
    pub raw_content: Vec<u8>,
}

impl UploadItem {
    pub fn new(original_filename: impl Into<String>, raw_content: Vec<u8>) -> Self {
        Self {
            original_filename: original_filename.into(),
            raw_content,
        }
    }

    /// Lowercased extension after the final dot, empty when there is none.
    pub fn extension(&self) -> String {
        extension_of(&self.original_filename)
    }
}

/// Lowercased extension of a filename, empty when there is no dot.
pub fn extension_of(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Provider-agnostic failure classification used throughout the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing credentials.
    Unauthorized,
    /// The provider account ran out of translation quota.
    QuotaExceeded,
    /// Network failure, timeout, or a 5xx from the provider.
    ProviderUnavailable,
    /// The caller's input was rejected (unsupported type, empty text, ...).
    InvalidInput,
    /// Local storage failed (staging or output persistence).
    IoFailure,
    /// The provider accepted the document but could not convert it.
    DocumentTranslationFailed,
    /// Catch-all for unexpected failures inside item processing.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::QuotaExceeded => "quota_exceeded",
            ErrorKind::ProviderUnavailable => "provider_unavailable",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::IoFailure => "io_failure",
            ErrorKind::DocumentTranslationFailed => "document_translation_failed",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Classified provider/pipeline error: one [`ErrorKind`] plus the message
/// worth surfacing to the caller.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ProviderError {}

/// A supported language as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

/// Source and target language sets reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Languages {
    pub source_languages: Vec<Language>,
    pub target_languages: Vec<Language>,
}

/// Result of a text translation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextTranslation {
    pub translated_text: String,
    pub detected_source_lang: Option<String>,
}

/// Per-item result of a translation attempt. Exactly one is produced for
/// every item the orchestrator attempts.
#[derive(Debug, Clone, Serialize)]
pub enum TranslationOutcome {
    Success {
        original_filename: String,
        translated_filename: String,
        download_reference: String,
    },
    Failure {
        original_filename: String,
        kind: ErrorKind,
        message: String,
    },
}

impl TranslationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TranslationOutcome::Success { .. })
    }

    pub fn original_filename(&self) -> &str {
        match self {
            TranslationOutcome::Success {
                original_filename, ..
            } => original_filename,
            TranslationOutcome::Failure {
                original_filename, ..
            } => original_filename,
        }
    }
}

/// Aggregate batch report: outcomes in submission order plus counts derived
/// by a pure fold over them.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub outcomes: Vec<TranslationOutcome>,
    pub successful_count: usize,
    pub failed_count: usize,
}

impl BatchResult {
    pub fn from_outcomes(outcomes: Vec<TranslationOutcome>) -> Self {
        let successful_count = outcomes.iter().filter(|o| o.is_success()).count();
        let failed_count = outcomes.len() - successful_count;
        Self {
            outcomes,
            successful_count,
            failed_count,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_count == 0
    }
}

/// Trait wrapping the remote translation service.
///
/// Implementors own all network I/O and must be safe for concurrent
/// invocation; no other component performs provider calls. Every method
/// carries the client's configured timeout.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// List the source and target languages the provider supports.
    async fn list_languages(&self) -> Result<Languages, ProviderError>;

    /// Translate a plain-text snippet.
    async fn translate_text(
        &self,
        text: &str,
        options: &TranslationOptions,
    ) -> Result<TextTranslation, ProviderError>;

    /// Translate one staged document, returning the translated bytes.
    async fn translate_document(
        &self,
        staged: &StagedFile,
        options: &TranslationOptions,
    ) -> Result<Vec<u8>, ProviderError>;
}
