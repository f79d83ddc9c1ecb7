//! Backend client: the single point of entry for all Career Coach API calls.
//!
//! Three endpoints: `GET /health`, `POST /upload-cv`, `POST /analyze`.
//! Non-2xx responses become `CoachError::Http` carrying the backend `detail`
//! when the body has one, otherwise a localized fallback. No retries.
use std::time::Duration;

use reqwest::{multipart, Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::CoachError;
use crate::messages::Messages;
use crate::models::analysis::{AnalysisRequest, AnalysisResult, HealthStatus, UploadResponse};
use crate::upload::UploadedFile;

/// FastAPI-style error body: `detail` is either a string or a list of
/// validation errors carrying a `msg`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Value,
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    messages: &'static Messages,
}

impl BackendClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        messages: &'static Messages,
    ) -> Result<Self, CoachError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            messages,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /health. Errors carry the status code only; the body is ignored.
    pub async fn health(&self) -> Result<HealthStatus, CoachError> {
        let url = format!("{}/health", self.base_url);
        debug!("GET {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Health check returned {status}");
            return Err(CoachError::http(
                Some(status.as_u16()),
                self.messages
                    .health_http_error
                    .replace("{status}", &status.as_u16().to_string()),
            ));
        }

        self.decode(response).await
    }

    /// POST /upload-cv with the file under the multipart field `file`.
    /// Returns the text the backend extracted from it.
    pub async fn upload_cv(&self, file: &UploadedFile) -> Result<String, CoachError> {
        let url = format!("{}/upload-cv", self.base_url);
        debug!("POST {url} ({}, {} bytes)", file.name, file.size);

        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(file.mime_type())?;
        let form = multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        let response = self
            .check_status(response, self.messages.upload_failed)
            .await?;
        let body: UploadResponse = self.decode(response).await?;

        debug!("Backend extracted {} characters", body.text.chars().count());
        Ok(body.text)
    }

    /// POST /analyze with `cv_text`, `job_description` and `api_key` form fields.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, CoachError> {
        let url = format!("{}/analyze", self.base_url);
        debug!(
            "POST {url} (cv: {} chars, job description: {} chars)",
            request.cv_text.chars().count(),
            request.job_description.chars().count()
        );

        let form = multipart::Form::new()
            .text("cv_text", request.cv_text.clone())
            .text("job_description", request.job_description.clone())
            .text("api_key", request.api_key.clone());

        let response = self.client.post(&url).multipart(form).send().await?;
        let response = self
            .check_status(response, self.messages.analysis_failed)
            .await?;
        let result: AnalysisResult = self.decode(response).await?;

        debug!("Analysis succeeded: match_percentage={}", result.match_percentage);
        Ok(result)
    }

    /// Passes 2xx responses through; anything else becomes an HTTP error with
    /// the backend detail or `fallback`.
    async fn check_status(
        &self,
        response: Response,
        fallback: &str,
    ) -> Result<Response, CoachError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Backend returned {status}: {body}");
        let message = extract_detail(&body).unwrap_or_else(|| fallback.to_string());
        Err(CoachError::http(Some(status.as_u16()), message))
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, CoachError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to decode backend response: {e}");
            CoachError::http(Some(status), self.messages.invalid_response)
        })
    }
}

/// Pulls a displayable message out of an error body, if it has one.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed.detail {
        Value::String(s) => s,
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                other => other.get("msg").and_then(|m| m.as_str()).map(String::from),
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };
    Some(message).filter(|m| !m.trim().is_empty())
}
