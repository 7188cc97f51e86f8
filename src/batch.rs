//! Batch orchestrator: per-item isolation, ordered aggregation.
//!
//! The orchestrator's contract, not an incidental loop property: every
//! item is processed behind its own isolation boundary (a spawned task),
//! so one item's failure — including a crash-class failure inside provider
//! communication — never aborts the remaining items. A fault escaping an
//! item is converted into a `Failure` outcome with kind `Internal` and the
//! batch always completes.
//!
//! Items may be processed by a bounded worker pool; outcomes are always
//! returned in submission order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::contract::{BatchResult, ErrorKind, TranslationOptions, TranslationOutcome, UploadItem};
use crate::translate::ItemTranslator;

/// Cooperative cancellation flag shared between the caller and a running
/// batch. In-flight items run to completion; no new item starts once the
/// token is cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

pub struct BatchTranslator {
    translator: Arc<ItemTranslator>,
    workers: usize,
}

impl BatchTranslator {
    /// `workers` bounds concurrent item processing; 1 means strictly
    /// sequential.
    pub fn new(translator: Arc<ItemTranslator>, workers: usize) -> Self {
        Self {
            translator,
            workers: workers.max(1),
        }
    }

    /// The per-item translator, for the single-document and text paths
    /// that bypass the batch wrapper.
    pub fn item(&self) -> &ItemTranslator {
        &self.translator
    }

    /// Process every item and aggregate the outcomes in submission order.
    ///
    /// Items with an empty filename are skipped silently (an empty slot in
    /// a multi-select upload, not a failure). Items never started because
    /// `cancel` fired produce no outcome.
    pub async fn run_batch(
        &self,
        items: Vec<UploadItem>,
        options: TranslationOptions,
        cancel: &CancelToken,
    ) -> BatchResult {
        let submitted = items.len();
        info!(
            items = submitted,
            target = %options.target_lang,
            workers = self.workers,
            "[BATCH] Batch translation started"
        );

        let options = Arc::new(options);
        let outcomes: Vec<TranslationOutcome> = stream::iter(
            items
                .into_iter()
                .filter(|item| !item.original_filename.is_empty()),
        )
        .map(|item| {
            let translator = Arc::clone(&self.translator);
            let options = Arc::clone(&options);
            let cancel = cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    warn!(filename = %item.original_filename, "[BATCH] Skipping item: batch cancelled");
                    return None;
                }
                let filename = item.original_filename.clone();
                // The spawned task is the isolation boundary: a panic in
                // item processing surfaces as a JoinError, never as a
                // batch abort.
                let handle = tokio::spawn(async move {
                    translator.translate_document(&item, &options).await
                });
                match handle.await {
                    Ok(outcome) => Some(outcome),
                    Err(e) => {
                        tracing::error!(filename = %filename, error = ?e, "[BATCH] Item task failed");
                        Some(TranslationOutcome::Failure {
                            original_filename: filename,
                            kind: ErrorKind::Internal,
                            message: format!("item processing aborted unexpectedly: {e}"),
                        })
                    }
                }
            }
        })
        .buffered(self.workers)
        .filter_map(|outcome| async move { outcome })
        .collect()
        .await;

        let result = BatchResult::from_outcomes(outcomes);
        info!(
            submitted = submitted,
            successful = result.successful_count,
            failed = result.failed_count,
            "[BATCH] Batch translation completed"
        );
        result
    }
}
