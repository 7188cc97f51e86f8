use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{error, info};

use crate::config::{default_allowed_extensions, CoreConfig};

/// Static application configuration: the validated core config plus where
/// translated artifacts are persisted.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub output_dir: PathBuf,
}

#[derive(Deserialize)]
struct StaticConfig {
    output_dir: PathBuf,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    workers: Option<usize>,
    #[serde(default)]
    max_upload_mb: Option<usize>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    document_timeout_secs: Option<u64>,
    #[serde(default)]
    extensions: Option<Vec<String>>,
}

/// Loads a static YAML config file (no secrets) and injects the provider
/// API key from the environment. Returns a fully merged [`AppConfig`] or
/// an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read config file {path_ref:?}"))?;

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let api_key = match std::env::var("DEEPL_API_KEY") {
        Ok(key) if !key.is_empty() => {
            info!("DEEPL_API_KEY found in env");
            key
        }
        _ => {
            error!("DEEPL_API_KEY environment variable not set");
            anyhow::bail!("DEEPL_API_KEY environment variable not set");
        }
    };

    let defaults = CoreConfig::default();
    let allowed_extensions: HashSet<String> = match static_conf.extensions {
        Some(exts) => exts.into_iter().map(|e| e.to_ascii_lowercase()).collect(),
        None => default_allowed_extensions(),
    };

    let core = CoreConfig {
        api_key,
        api_url: static_conf.api_url.unwrap_or(defaults.api_url),
        allowed_extensions,
        max_upload_bytes: static_conf
            .max_upload_mb
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.max_upload_bytes),
        workers: static_conf.workers.unwrap_or(defaults.workers),
        request_timeout: static_conf
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout),
        document_timeout: static_conf
            .document_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.document_timeout),
    };
    core.trace_loaded();

    info!(
        output_dir = %static_conf.output_dir.display(),
        "Config loaded and merged successfully"
    );

    Ok(AppConfig {
        core,
        output_dir: static_conf.output_dir,
    })
}
