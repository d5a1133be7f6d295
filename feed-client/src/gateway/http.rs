//! HTTP gateway backed by reqwest.

use super::ReportsGateway;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde_json::{json, Value};

use feed_types::{NewComment, NewFlag, PhotoUpload, ReactionKind, ReportDraft, ReportId};

use crate::config::{ApiConfig, ConfigError};
use crate::error::GatewayError;

/// Longest error body carried in [`GatewayError::RemoteRejected`].
const MAX_ERROR_BODY: usize = 512;

/// Content type for a photo whose declared type does not parse.
const FALLBACK_PHOTO_TYPE: &str = "application/octet-stream";

/// Gateway to the remote reports service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base: Url,
    http: Client,
}

impl HttpGateway {
    /// Create a gateway from the API settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot address sub-paths or the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        let base = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: config.base_url.clone(),
                reason: "cannot be a base".into(),
            });
        }

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self { base, http })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build an endpoint URL from path segments. Segments are
    /// percent-encoded, so report ids can hold any character.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url, page: u32, limit: u32) -> Result<Value, GatewayError> {
        tracing::debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;
        decode(response).await
    }

    async fn post_json(&self, url: Url, body: &Value) -> Result<Value, GatewayError> {
        tracing::debug!("POST {}", url);
        let response = self.http.post(url).json(body).send().await?;
        decode(response).await
    }
}

/// Turn a response into a JSON payload.
///
/// Non-2xx becomes `RemoteRejected`, an empty body becomes `Value::Null`,
/// and a body that is not JSON becomes `MalformedResponse`.
async fn decode(response: Response) -> Result<Value, GatewayError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(GatewayError::RemoteRejected {
            status: status.as_u16(),
            message: truncate(&body, MAX_ERROR_BODY),
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Multipart form for a report submission.
///
/// A photo whose declared type is not a valid MIME type is still sent, as
/// `application/octet-stream`.
fn report_form(draft: &ReportDraft) -> Form {
    let mut form = Form::new()
        .text("firstName", draft.first_name.clone())
        .text("lastName", draft.last_name.clone())
        .text("phoneNumber", draft.phone_number.clone())
        .text("petStatus", draft.pet_status.as_str().to_string())
        .text("location", draft.location.clone());

    if let Some(description) = &draft.description {
        form = form.text("description", description.clone());
    }

    if let Some(photo) = &draft.photo {
        form = form.part("photo", photo_part(photo));
    }

    form
}

fn photo_part(photo: &PhotoUpload) -> Part {
    let part = |mime: &str| {
        Part::bytes(photo.bytes.clone())
            .file_name(photo.file_name.clone())
            .mime_str(mime)
    };
    match part(&photo.content_type) {
        Ok(part) => part,
        Err(e) => {
            tracing::debug!(
                "Photo {} has unusable type {:?}: {}",
                photo.file_name,
                photo.content_type,
                e
            );
            part(FALLBACK_PHOTO_TYPE).unwrap_or_else(|_| {
                Part::bytes(photo.bytes.clone()).file_name(photo.file_name.clone())
            })
        }
    }
}

#[async_trait]
impl ReportsGateway for HttpGateway {
    async fn list_reports(&self, page: u32, limit: u32) -> Result<Value, GatewayError> {
        self.get(self.endpoint(&["reports"]), page, limit).await
    }

    async fn list_comments(
        &self,
        report_id: &ReportId,
        page: u32,
        limit: u32,
    ) -> Result<Value, GatewayError> {
        let url = self.endpoint(&["reports", report_id.as_str(), "comments"]);
        self.get(url, page, limit).await
    }

    async fn create_report(&self, draft: &ReportDraft) -> Result<Value, GatewayError> {
        let url = self.endpoint(&["reports"]);
        tracing::debug!("POST {} (multipart)", url);
        let response = self
            .http
            .post(url)
            .multipart(report_form(draft))
            .send()
            .await?;
        decode(response).await
    }

    async fn create_comment(
        &self,
        report_id: &ReportId,
        comment: &NewComment,
    ) -> Result<Value, GatewayError> {
        let url = self.endpoint(&["reports", report_id.as_str(), "comments"]);
        let body = json!({ "name": comment.name, "text": comment.text });
        self.post_json(url, &body).await
    }

    async fn toggle_reaction(
        &self,
        report_id: &ReportId,
        kind: ReactionKind,
    ) -> Result<Value, GatewayError> {
        let url = self.endpoint(&["reports", report_id.as_str(), "reactions"]);
        self.post_json(url, &json!({ "reaction": kind.as_str() }))
            .await
    }

    async fn flag_report(
        &self,
        report_id: &ReportId,
        flag: &NewFlag,
    ) -> Result<Value, GatewayError> {
        let url = self.endpoint(&["reports", report_id.as_str(), "flag"]);
        let body = serde_json::to_value(flag)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        self.post_json(url, &body).await
    }
}
