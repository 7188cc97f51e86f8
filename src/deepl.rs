//! DeepL implementation of [`TranslationProvider`].
//!
//! All provider-native failure shapes (HTTP statuses, transport errors,
//! document status `"error"`) are mapped to the fixed [`ErrorKind`]
//! taxonomy here, once, at this boundary. Components above it never see a
//! `reqwest` error or a status code.
//!
//! The document flow follows the DeepL v2 REST API: upload the file,
//! poll the document status until `done` or `error`, then download the
//! result. Every HTTP call carries the configured request timeout and the
//! whole document flow observes an overall deadline.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::config::CoreConfig;
use crate::contract::{
    ErrorKind, Language, Languages, ProviderError, TextTranslation, TranslationOptions,
    TranslationProvider,
};
use crate::staging::StagedFile;

const DOCUMENT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct DeepLProvider {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    document_timeout: Duration,
}

impl DeepLProvider {
    pub fn new(config: &CoreConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                ProviderError::new(ErrorKind::Internal, format!("failed to build http client: {e}"))
            })?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            document_timeout: config.document_timeout,
        })
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }

    async fn get_languages(&self, kind: &str) -> Result<Vec<Language>, ProviderError> {
        let url = format!("{}/v2/languages?type={}", self.api_url, kind);
        let response = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let langs: Vec<WireLanguage> = response.json().await.map_err(transport_error)?;
        Ok(langs
            .into_iter()
            .map(|l| Language {
                code: l.language,
                name: l.name,
            })
            .collect())
    }
}

#[async_trait]
impl TranslationProvider for DeepLProvider {
    async fn list_languages(&self) -> Result<Languages, ProviderError> {
        let source_languages = self.get_languages("source").await?;
        let target_languages = self.get_languages("target").await?;
        info!(
            source = source_languages.len(),
            target = target_languages.len(),
            "Loaded provider language lists"
        );
        Ok(Languages {
            source_languages,
            target_languages,
        })
    }

    async fn translate_text(
        &self,
        text: &str,
        options: &TranslationOptions,
    ) -> Result<TextTranslation, ProviderError> {
        let url = format!("{}/v2/translate", self.api_url);
        let mut body = serde_json::json!({
            "text": [text],
            "target_lang": options.target_lang,
        });
        if let Some(source) = &options.source_lang {
            body["source_lang"] = serde_json::Value::String(source.clone());
        }
        if let Some(formality) = options.formality.as_param() {
            body["formality"] = serde_json::Value::String(formality.to_string());
        }

        debug!(chars = text.len(), target = %options.target_lang, "Sending text translation request");
        let response = self
            .http
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let parsed: WireTranslateResponse = response.json().await.map_err(transport_error)?;
        let first = parsed.translations.into_iter().next().ok_or_else(|| {
            ProviderError::new(
                ErrorKind::ProviderUnavailable,
                "provider returned no translations",
            )
        })?;
        Ok(TextTranslation {
            translated_text: first.text,
            detected_source_lang: first.detected_source_language,
        })
    }

    async fn translate_document(
        &self,
        staged: &StagedFile,
        options: &TranslationOptions,
    ) -> Result<Vec<u8>, ProviderError> {
        let deadline = Instant::now() + self.document_timeout;

        // Upload.
        let bytes = std::fs::read(staged.path()).map_err(|e| {
            ProviderError::new(ErrorKind::IoFailure, format!("failed to read staged file: {e}"))
        })?;
        let file_name = format!("document.{}", staged.extension());
        let mut form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name))
            .text("target_lang", options.target_lang.clone());
        if let Some(source) = &options.source_lang {
            form = form.text("source_lang", source.clone());
        }
        if let Some(formality) = options.formality.as_param() {
            form = form.text("formality", formality);
        }

        let response = self
            .http
            .post(format!("{}/v2/document", self.api_url))
            .header("Authorization", self.auth_header())
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let handle: WireDocumentHandle = response.json().await.map_err(transport_error)?;
        debug!(document_id = %handle.document_id, "Document accepted by provider");

        // Poll until done, error, or deadline.
        loop {
            if Instant::now() >= deadline {
                error!(document_id = %handle.document_id, "Document translation deadline exceeded");
                return Err(ProviderError::new(
                    ErrorKind::ProviderUnavailable,
                    "document translation timed out",
                ));
            }
            let response = self
                .http
                .post(format!("{}/v2/document/{}", self.api_url, handle.document_id))
                .header("Authorization", self.auth_header())
                .json(&serde_json::json!({ "document_key": handle.document_key }))
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_status(response).await?;
            let status: WireDocumentStatus = response.json().await.map_err(transport_error)?;
            match status.status.as_str() {
                "done" => break,
                "error" => {
                    let message = status
                        .error_message
                        .unwrap_or_else(|| "document translation failed".to_string());
                    error!(document_id = %handle.document_id, message = %message, "Provider-side document conversion failed");
                    return Err(ProviderError::new(
                        ErrorKind::DocumentTranslationFailed,
                        message,
                    ));
                }
                other => {
                    debug!(document_id = %handle.document_id, status = other, "Document still processing");
                    tokio::time::sleep(DOCUMENT_POLL_INTERVAL).await;
                }
            }
        }

        // Download the result.
        let response = self
            .http
            .post(format!(
                "{}/v2/document/{}/result",
                self.api_url, handle.document_id
            ))
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "document_key": handle.document_key }))
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let output = response.bytes().await.map_err(transport_error)?;
        info!(document_id = %handle.document_id, size = output.len(), "Downloaded translated document");
        Ok(output.to_vec())
    }
}

#[derive(Deserialize)]
struct WireLanguage {
    language: String,
    name: String,
}

#[derive(Deserialize)]
struct WireTranslateResponse {
    translations: Vec<WireTranslation>,
}

#[derive(Deserialize)]
struct WireTranslation {
    text: String,
    detected_source_language: Option<String>,
}

#[derive(Deserialize)]
struct WireDocumentHandle {
    document_id: String,
    document_key: String,
}

#[derive(Deserialize)]
struct WireDocumentStatus {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

/// Classify an HTTP status from the provider. Executed once, here; the
/// orchestrator never sees a status code.
fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status.as_u16() {
        401 | 403 => ErrorKind::Unauthorized,
        456 => ErrorKind::QuotaExceeded,
        400 | 413 | 415 => ErrorKind::InvalidInput,
        429 => ErrorKind::ProviderUnavailable,
        s if s >= 500 => ErrorKind::ProviderUnavailable,
        _ => ErrorKind::ProviderUnavailable,
    }
}

/// Map transport-level failures; timeouts and connection errors are
/// retryable provider unavailability.
fn transport_error(e: reqwest::Error) -> ProviderError {
    ProviderError::new(ErrorKind::ProviderUnavailable, e.to_string())
}

/// Turn a non-success response into a classified error, extracting the
/// provider's `message` field when present.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| format!("provider returned status {status}"));
    error!(status = %status, message = %message, "Provider request failed");
    Err(ProviderError::new(kind_for_status(status), message))
}
