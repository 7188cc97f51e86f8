//! Orchestrator behavior against a mocked provider: ordering, fault
//! isolation, resource release, deterministic naming.

use std::fs;
use std::sync::Arc;

use tempfile::{tempdir, TempDir};

use docuglot::batch::{BatchTranslator, CancelToken};
use docuglot::config::default_allowed_extensions;
use docuglot::contract::{
    ErrorKind, MockTranslationProvider, TranslationOptions, TranslationOutcome, UploadItem,
};
use docuglot::output::OutputStore;
use docuglot::staging::StagingStore;
use docuglot::translate::ItemTranslator;

struct Fixture {
    batch: BatchTranslator,
    staging_dir: TempDir,
    output_dir: TempDir,
}

fn fixture(provider: MockTranslationProvider, workers: usize) -> Fixture {
    let staging_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    let staging = StagingStore::new(staging_dir.path()).unwrap();
    let output = OutputStore::new(output_dir.path()).unwrap();
    let translator = Arc::new(ItemTranslator::new(
        Arc::new(provider),
        staging,
        output,
        default_allowed_extensions(),
        16 * 1024 * 1024,
    ));
    Fixture {
        batch: BatchTranslator::new(translator, workers),
        staging_dir,
        output_dir,
    }
}

fn staged_file_count(fixture: &Fixture) -> usize {
    fs::read_dir(fixture.staging_dir.path()).unwrap().count()
}

fn succeeding_provider() -> MockTranslationProvider {
    let mut provider = MockTranslationProvider::new();
    provider
        .expect_translate_document()
        .returning(|_, _| Ok(b"translated".to_vec()));
    provider
}

#[tokio::test]
async fn all_valid_items_succeed_in_submission_order() {
    let fixture = fixture(succeeding_provider(), 1);
    let items = vec![
        UploadItem::new("a.pdf", b"one".to_vec()),
        UploadItem::new("b.docx", b"two".to_vec()),
        UploadItem::new("c.txt", b"three".to_vec()),
    ];

    let result = fixture
        .batch
        .run_batch(items, TranslationOptions::new("DE"), &CancelToken::new())
        .await;

    assert_eq!(result.successful_count, 3);
    assert_eq!(result.failed_count, 0);
    assert!(result.all_succeeded());
    let names: Vec<&str> = result
        .outcomes
        .iter()
        .map(|o| o.original_filename())
        .collect();
    assert_eq!(names, ["a.pdf", "b.docx", "c.txt"]);
}

#[tokio::test]
async fn unsupported_extension_fails_only_that_item() {
    let mut provider = MockTranslationProvider::new();
    // Only the valid item may reach the provider.
    provider
        .expect_translate_document()
        .times(1)
        .returning(|_, _| Ok(b"translated".to_vec()));
    let fixture = fixture(provider, 1);

    let items = vec![
        UploadItem::new("a.pdf", b"ok".to_vec()),
        UploadItem::new("virus.exe", b"nope".to_vec()),
    ];
    let result = fixture
        .batch
        .run_batch(items, TranslationOptions::new("DE"), &CancelToken::new())
        .await;

    assert_eq!(result.successful_count, 1);
    assert_eq!(result.failed_count, 1);
    match &result.outcomes[1] {
        TranslationOutcome::Failure { kind, .. } => assert_eq!(*kind, ErrorKind::InvalidInput),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_filenames_are_skipped_not_failed() {
    let fixture = fixture(succeeding_provider(), 1);
    let items = vec![
        UploadItem::new("a.pdf", b"one".to_vec()),
        UploadItem::new("", b"ignored".to_vec()),
        UploadItem::new("b.xlsx", b"two".to_vec()),
    ];

    let result = fixture
        .batch
        .run_batch(items, TranslationOptions::new("DE"), &CancelToken::new())
        .await;

    assert_eq!(result.outcomes.len(), 2);
    assert_eq!(result.successful_count, 2);
    assert_eq!(result.failed_count, 0);
}

#[tokio::test]
async fn provider_failure_is_isolated_and_kind_preserved() {
    let mut provider = MockTranslationProvider::new();
    provider.expect_translate_document().returning(|staged, _| {
        let content = fs::read(staged.path()).unwrap();
        if content == b"boom" {
            Err(docuglot::contract::ProviderError::new(
                ErrorKind::QuotaExceeded,
                "quota exhausted",
            ))
        } else {
            Ok(b"translated".to_vec())
        }
    });
    let fixture = fixture(provider, 1);

    let items = vec![
        UploadItem::new("a.pdf", b"fine".to_vec()),
        UploadItem::new("b.pdf", b"boom".to_vec()),
        UploadItem::new("c.pdf", b"fine".to_vec()),
    ];
    let result = fixture
        .batch
        .run_batch(items, TranslationOptions::new("DE"), &CancelToken::new())
        .await;

    assert_eq!(result.successful_count, 2);
    assert_eq!(result.failed_count, 1);
    match &result.outcomes[1] {
        TranslationOutcome::Failure { kind, message, .. } => {
            assert_eq!(*kind, ErrorKind::QuotaExceeded);
            assert_eq!(message, "quota exhausted");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn staged_files_are_released_after_success_and_failure_batches() {
    // All-success run.
    let fixture_ok = fixture(succeeding_provider(), 1);
    let items = vec![
        UploadItem::new("a.pdf", b"one".to_vec()),
        UploadItem::new("b.pdf", b"two".to_vec()),
    ];
    fixture_ok
        .batch
        .run_batch(items, TranslationOptions::new("DE"), &CancelToken::new())
        .await;
    assert_eq!(staged_file_count(&fixture_ok), 0);

    // All-failure run.
    let mut provider = MockTranslationProvider::new();
    provider.expect_translate_document().returning(|_, _| {
        Err(docuglot::contract::ProviderError::new(
            ErrorKind::ProviderUnavailable,
            "connection timed out",
        ))
    });
    let fixture_err = fixture(provider, 1);
    let items = vec![
        UploadItem::new("a.pdf", b"one".to_vec()),
        UploadItem::new("b.pdf", b"two".to_vec()),
    ];
    let result = fixture_err
        .batch
        .run_batch(items, TranslationOptions::new("DE"), &CancelToken::new())
        .await;
    assert_eq!(result.failed_count, 2);
    assert_eq!(staged_file_count(&fixture_err), 0);
}

#[tokio::test]
async fn provider_timeout_maps_to_provider_unavailable_and_releases_staging() {
    let mut provider = MockTranslationProvider::new();
    provider.expect_translate_document().returning(|_, _| {
        Err(docuglot::contract::ProviderError::new(
            ErrorKind::ProviderUnavailable,
            "document translation timed out",
        ))
    });
    let fixture = fixture(provider, 1);

    let items = vec![UploadItem::new("c.docx", b"slow".to_vec())];
    let result = fixture
        .batch
        .run_batch(items, TranslationOptions::new("DE"), &CancelToken::new())
        .await;

    match &result.outcomes[0] {
        TranslationOutcome::Failure { kind, .. } => {
            assert_eq!(*kind, ErrorKind::ProviderUnavailable)
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(staged_file_count(&fixture), 0);
}

#[tokio::test]
async fn deterministic_naming_and_stored_artifact() {
    let fixture = fixture(succeeding_provider(), 1);
    let items = vec![UploadItem::new("report.pdf", b"body".to_vec())];

    let result = fixture
        .batch
        .run_batch(items, TranslationOptions::new("DE"), &CancelToken::new())
        .await;

    match &result.outcomes[0] {
        TranslationOutcome::Success {
            translated_filename,
            download_reference,
            ..
        } => {
            assert_eq!(translated_filename, "report_DE.pdf");
            assert_eq!(download_reference, "/download/report_DE.pdf");
        }
        other => panic!("expected success, got {other:?}"),
    }
    let output = fixture.batch.item().output();
    assert!(output.exists("report_DE.pdf"));
    assert_eq!(output.get("report_DE.pdf").unwrap(), b"translated");
    assert!(fixture.output_dir.path().join("report_DE.pdf").is_file());
}

#[tokio::test]
async fn duplicate_names_overwrite_deterministically() {
    let mut provider = MockTranslationProvider::new();
    provider
        .expect_translate_document()
        .returning(|staged, _| Ok(fs::read(staged.path()).unwrap()));
    let fixture = fixture(provider, 1);

    let items = vec![
        UploadItem::new("a.pdf", b"first".to_vec()),
        UploadItem::new("a.pdf", b"second".to_vec()),
    ];
    let result = fixture
        .batch
        .run_batch(items, TranslationOptions::new("DE"), &CancelToken::new())
        .await;

    assert_eq!(result.successful_count, 2);
    // Sequential processing: the later item wins the shared output key.
    assert_eq!(
        fixture.batch.item().output().get("a_DE.pdf").unwrap(),
        b"second"
    );
}

/// Provider double that crashes on marked content, simulating a bug in
/// provider communication rather than an expected failure kind.
struct CrashingProvider;

#[async_trait::async_trait]
impl docuglot::contract::TranslationProvider for CrashingProvider {
    async fn list_languages(&self) -> Result<docuglot::contract::Languages, docuglot::contract::ProviderError> {
        unimplemented!()
    }

    async fn translate_text(
        &self,
        _text: &str,
        _options: &TranslationOptions,
    ) -> Result<docuglot::contract::TextTranslation, docuglot::contract::ProviderError> {
        unimplemented!()
    }

    async fn translate_document(
        &self,
        staged: &docuglot::staging::StagedFile,
        _options: &TranslationOptions,
    ) -> Result<Vec<u8>, docuglot::contract::ProviderError> {
        let content = fs::read(staged.path()).unwrap();
        if content == b"crash" {
            panic!("provider client bug");
        }
        Ok(b"translated".to_vec())
    }
}

#[tokio::test]
async fn panic_inside_item_processing_becomes_internal_failure() {
    let staging_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    let translator = Arc::new(ItemTranslator::new(
        Arc::new(CrashingProvider),
        StagingStore::new(staging_dir.path()).unwrap(),
        OutputStore::new(output_dir.path()).unwrap(),
        default_allowed_extensions(),
        16 * 1024 * 1024,
    ));
    let batch = BatchTranslator::new(translator, 1);

    let items = vec![
        UploadItem::new("a.pdf", b"fine".to_vec()),
        UploadItem::new("b.pdf", b"crash".to_vec()),
        UploadItem::new("c.pdf", b"fine".to_vec()),
    ];
    let result = batch
        .run_batch(items, TranslationOptions::new("DE"), &CancelToken::new())
        .await;

    assert_eq!(result.successful_count, 2);
    match &result.outcomes[1] {
        TranslationOutcome::Failure { kind, .. } => assert_eq!(*kind, ErrorKind::Internal),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_batch_starts_no_items() {
    let mut provider = MockTranslationProvider::new();
    provider.expect_translate_document().times(0);
    let fixture = fixture(provider, 1);

    let cancel = CancelToken::new();
    cancel.cancel();
    let items = vec![
        UploadItem::new("a.pdf", b"one".to_vec()),
        UploadItem::new("b.pdf", b"two".to_vec()),
    ];
    let result = fixture
        .batch
        .run_batch(items, TranslationOptions::new("DE"), &cancel)
        .await;

    assert!(result.outcomes.is_empty());
    assert_eq!(staged_file_count(&fixture), 0);
}

#[tokio::test]
async fn worker_pool_preserves_submission_order() {
    let fixture = fixture(succeeding_provider(), 4);
    let items: Vec<UploadItem> = (0..8)
        .map(|i| UploadItem::new(format!("doc{i}.pdf"), vec![i as u8]))
        .collect();

    let result = fixture
        .batch
        .run_batch(items, TranslationOptions::new("FR"), &CancelToken::new())
        .await;

    assert_eq!(result.successful_count, 8);
    let names: Vec<String> = result
        .outcomes
        .iter()
        .map(|o| o.original_filename().to_string())
        .collect();
    let expected: Vec<String> = (0..8).map(|i| format!("doc{i}.pdf")).collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn oversized_item_is_rejected_before_staging() {
    let mut provider = MockTranslationProvider::new();
    provider.expect_translate_document().times(0);

    let staging_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    let translator = Arc::new(ItemTranslator::new(
        Arc::new(provider),
        StagingStore::new(staging_dir.path()).unwrap(),
        OutputStore::new(output_dir.path()).unwrap(),
        default_allowed_extensions(),
        8, // tiny per-item cap
    ));
    let batch = BatchTranslator::new(translator, 1);

    let items = vec![UploadItem::new("big.pdf", vec![0u8; 64])];
    let result = batch
        .run_batch(items, TranslationOptions::new("DE"), &CancelToken::new())
        .await;

    match &result.outcomes[0] {
        TranslationOutcome::Failure { kind, .. } => assert_eq!(*kind, ErrorKind::InvalidInput),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(fs::read_dir(staging_dir.path()).unwrap().count(), 0);
}
