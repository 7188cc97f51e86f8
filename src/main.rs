mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use docuglot::batch::{BatchTranslator, CancelToken};
use docuglot::contract::{
    Formality, TranslationOptions, TranslationOutcome, TranslationProvider, UploadItem,
};
use docuglot::deepl::DeepLProvider;
use docuglot::load_config::load_config;
use docuglot::output::OutputStore;
use docuglot::staging::StagingStore;
use docuglot::translate::ItemTranslator;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let app = load_config(&cli.config)?;
    if !app.core.credentials_configured() {
        anyhow::bail!("DeepL API key not configured");
    }

    let provider: Arc<dyn TranslationProvider> = Arc::new(DeepLProvider::new(&app.core)?);

    match cli.command {
        Commands::Documents {
            files,
            target_lang,
            source_lang,
            formality,
        } => {
            if files.is_empty() {
                anyhow::bail!("No files provided");
            }
            let options = TranslationOptions {
                target_lang,
                source_lang,
                formality: Formality::from(formality.as_str()),
            };

            let staging = StagingStore::new_temp().context("Failed to create staging store")?;
            let output =
                OutputStore::new(&app.output_dir).context("Failed to create output store")?;
            let translator = Arc::new(ItemTranslator::new(
                provider,
                staging,
                output,
                app.core.allowed_extensions.clone(),
                app.core.max_upload_bytes,
            ));
            let batch = BatchTranslator::new(translator, app.core.workers);

            let mut items = Vec::with_capacity(files.len());
            for file in &files {
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let content = std::fs::read(file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                items.push(UploadItem::new(name, content));
            }

            let result = batch.run_batch(items, options, &CancelToken::new()).await;
            for outcome in &result.outcomes {
                match outcome {
                    TranslationOutcome::Success {
                        original_filename,
                        translated_filename,
                        ..
                    } => println!("ok   {original_filename} -> {translated_filename}"),
                    TranslationOutcome::Failure {
                        original_filename,
                        kind,
                        message,
                    } => println!("fail {original_filename}: {kind}: {message}"),
                }
            }
            println!(
                "Translated {} of {} files",
                result.successful_count,
                result.successful_count + result.failed_count
            );
            if !result.all_succeeded() {
                std::process::exit(1);
            }
        }
        Commands::Text {
            text,
            target_lang,
            source_lang,
            formality,
        } => {
            let options = TranslationOptions {
                target_lang,
                source_lang,
                formality: Formality::from(formality.as_str()),
            };
            let staging = StagingStore::new_temp().context("Failed to create staging store")?;
            let output =
                OutputStore::new(&app.output_dir).context("Failed to create output store")?;
            let translator = ItemTranslator::new(
                provider,
                staging,
                output,
                app.core.allowed_extensions.clone(),
                app.core.max_upload_bytes,
            );
            match translator.translate_text(&text, &options).await {
                Ok(result) => {
                    if let Some(lang) = &result.detected_source_lang {
                        eprintln!("detected source language: {lang}");
                    }
                    println!("{}", result.translated_text);
                }
                Err(e) => {
                    eprintln!("[ERROR] Text translation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Languages => match provider.list_languages().await {
            Ok(languages) => {
                println!("Source languages:");
                for lang in &languages.source_languages {
                    println!("  {}  {}", lang.code, lang.name);
                }
                println!("Target languages:");
                for lang in &languages.target_languages {
                    println!("  {}  {}", lang.code, lang.name);
                }
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load languages: {e}");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
