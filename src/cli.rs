use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI for docuglot: translate documents and text through DeepL.
#[derive(Parser)]
#[clap(
    name = "docuglot",
    version,
    about = "Batch document and text translation backed by the DeepL API"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[clap(long, global = true, default_value = "docuglot.yaml")]
    pub config: PathBuf,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate one or more documents as a batch
    Documents {
        /// Files to translate
        files: Vec<PathBuf>,
        /// Target language code, e.g. DE or EN-US
        #[clap(long)]
        target_lang: String,
        /// Source language code; omit to let the provider detect it
        #[clap(long)]
        source_lang: Option<String>,
        /// Formality: default, more, or less
        #[clap(long, default_value = "default")]
        formality: String,
    },
    /// Translate a text snippet
    Text {
        text: String,
        #[clap(long)]
        target_lang: String,
        #[clap(long)]
        source_lang: Option<String>,
        #[clap(long, default_value = "default")]
        formality: String,
    },
    /// List supported source and target languages
    Languages,
}
