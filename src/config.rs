use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info};

/// Document types the provider's document endpoint accepts.
pub fn default_allowed_extensions() -> HashSet<String> {
    ["pdf", "docx", "pptx", "xlsx", "txt", "html"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Validated core configuration, passed by value into the pipeline at
/// construction time. Never read from process-wide state.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Provider API key; empty means credentials are not configured.
    pub api_key: String,
    /// Provider base URL, e.g. `https://api-free.deepl.com`.
    pub api_url: String,
    pub allowed_extensions: HashSet<String>,
    /// Per-item upload cap in bytes.
    pub max_upload_bytes: usize,
    /// Worker pool size for batch processing; 1 = sequential.
    pub workers: usize,
    /// Timeout applied to every single provider HTTP call.
    pub request_timeout: Duration,
    /// Overall deadline for one document translation (upload + polling +
    /// download).
    pub document_timeout: Duration,
}

impl CoreConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Whether provider credentials are present; backs the health probe of
    /// the inbound layer.
    pub fn credentials_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn trace_loaded(&self) {
        info!(
            api_url = %self.api_url,
            extensions = self.allowed_extensions.len(),
            workers = self.workers,
            max_upload_bytes = self.max_upload_bytes,
            credentials_configured = self.credentials_configured(),
            "Loaded CoreConfig"
        );
        debug!(allowed = ?self.allowed_extensions, "Allowed extensions (full debug)");
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api-free.deepl.com".to_string(),
            allowed_extensions: default_allowed_extensions(),
            max_upload_bytes: 16 * 1024 * 1024,
            workers: 1,
            request_timeout: Duration::from_secs(30),
            document_timeout: Duration::from_secs(300),
        }
    }
}
