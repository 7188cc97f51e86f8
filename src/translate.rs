//! Item translator: one upload item in, one outcome out.
//!
//! Nothing escapes this component as an error: every path through
//! [`ItemTranslator::translate_document`] terminates in a
//! [`TranslationOutcome`] value, and the staged file is released on every
//! one of those paths. The single-document and text entry points of the
//! service reuse this component directly, without the batch wrapper.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::contract::{
    ErrorKind, ProviderError, TextTranslation, TranslationOptions, TranslationOutcome,
    TranslationProvider, UploadItem,
};
use crate::output::{sanitize_filename, translated_filename, OutputStore};
use crate::staging::StagingStore;

pub struct ItemTranslator {
    provider: Arc<dyn TranslationProvider>,
    staging: StagingStore,
    output: OutputStore,
    allowed_extensions: HashSet<String>,
    max_upload_bytes: usize,
}

impl ItemTranslator {
    pub fn new(
        provider: Arc<dyn TranslationProvider>,
        staging: StagingStore,
        output: OutputStore,
        allowed_extensions: HashSet<String>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            provider,
            staging,
            output,
            allowed_extensions,
            max_upload_bytes,
        }
    }

    pub fn output(&self) -> &OutputStore {
        &self.output
    }

    /// Translate one document to one outcome. Infallible by contract:
    /// failures are classified and returned as `Failure` outcomes.
    pub async fn translate_document(
        &self,
        item: &UploadItem,
        options: &TranslationOptions,
    ) -> TranslationOutcome {
        let extension = item.extension();
        if extension.is_empty() || !self.allowed_extensions.contains(&extension) {
            warn!(filename = %item.original_filename, "[ITEM] Rejected unsupported file type");
            return failure(
                &item.original_filename,
                ErrorKind::InvalidInput,
                "Invalid file type. Supported formats: PDF, DOCX, PPTX, XLSX, TXT, HTML",
            );
        }
        if item.raw_content.len() > self.max_upload_bytes {
            warn!(
                filename = %item.original_filename,
                size = item.raw_content.len(),
                "[ITEM] Rejected oversized upload"
            );
            return failure(
                &item.original_filename,
                ErrorKind::InvalidInput,
                "File is too large",
            );
        }

        let filename = sanitize_filename(&item.original_filename);
        info!(filename = %filename, target = %options.target_lang, "[ITEM] Document translation started");

        let mut staged = match self.staging.stage(&item.raw_content, &extension) {
            Ok(staged) => staged,
            Err(e) => {
                error!(error = ?e, filename = %filename, "[ITEM] Failed to stage upload");
                return failure(&item.original_filename, ErrorKind::IoFailure, e.to_string());
            }
        };

        let outcome = match self.provider.translate_document(&staged, options).await {
            Ok(translated) => {
                let output_name = translated_filename(&filename, &options.target_lang);
                match self.output.put(&output_name, &translated) {
                    Ok(stored) => {
                        info!(filename = %filename, translated = %stored, "[ITEM] Document translation completed");
                        TranslationOutcome::Success {
                            original_filename: filename.clone(),
                            download_reference: format!("/download/{stored}"),
                            translated_filename: stored,
                        }
                    }
                    Err(e) => {
                        error!(error = ?e, filename = %filename, "[ITEM] Failed to persist translated document");
                        failure(&item.original_filename, ErrorKind::IoFailure, e.to_string())
                    }
                }
            }
            Err(e) => {
                error!(filename = %filename, kind = %e.kind, message = %e.message, "[ITEM] Provider failed");
                failure(&item.original_filename, e.kind, e.message)
            }
        };

        // Scoped-resource discipline: the staged input is released on every
        // exit path, success or failure, exactly once.
        staged.release();
        outcome
    }

    /// Text translation path. Empty text is rejected before any provider
    /// call is made.
    pub async fn translate_text(
        &self,
        text: &str,
        options: &TranslationOptions,
    ) -> Result<TextTranslation, ProviderError> {
        if text.is_empty() {
            warn!("[ITEM] Rejected empty text translation request");
            return Err(ProviderError::new(
                ErrorKind::InvalidInput,
                "No text provided",
            ));
        }
        info!(chars = text.len(), target = %options.target_lang, "[ITEM] Text translation started");
        self.provider.translate_text(text, options).await
    }
}

fn failure(
    original_filename: &str,
    kind: ErrorKind,
    message: impl Into<String>,
) -> TranslationOutcome {
    TranslationOutcome::Failure {
        original_filename: original_filename.to_string(),
        kind,
        message: message.into(),
    }
}
