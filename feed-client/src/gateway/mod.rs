//! Remote reports service abstraction.
//!
//! The gateway speaks to the remote service and hands back the raw JSON
//! body untouched. Response shapes vary between service versions, so
//! interpretation is left to `feed-core` (normalization and patch
//! reduction).
//!
//! # Design
//!
//! - `Ok(Value)` means the service answered 2xx. An empty body is `Value::Null`.
//! - `Err(GatewayError)` means the call failed (network, timeout, non-2xx)
//!   and the caller should fall back to the local store.
//!
//! # Example
//!
//! ```ignore
//! let gateway = MockGateway::new();
//! gateway.queue_response(json!({"items": []}));
//! let payload = gateway.list_reports(1, 10).await?;
//! ```

mod http;
mod mock;

pub use http::HttpGateway;
pub use mock::{GatewayRequest, MockGateway};

use async_trait::async_trait;
use serde_json::Value;

use feed_types::{NewComment, NewFlag, ReactionKind, ReportDraft, ReportId};

use crate::error::GatewayError;

/// The remote reports service.
///
/// Implementations handle the underlying transport (HTTP, mock, etc).
#[async_trait]
pub trait ReportsGateway: Send + Sync {
    /// `GET` one page of reports.
    async fn list_reports(&self, page: u32, limit: u32) -> Result<Value, GatewayError>;

    /// `GET` one page of comments for a report.
    async fn list_comments(
        &self,
        report_id: &ReportId,
        page: u32,
        limit: u32,
    ) -> Result<Value, GatewayError>;

    /// `POST` a new report (multipart, with the optional photo file).
    async fn create_report(&self, draft: &ReportDraft) -> Result<Value, GatewayError>;

    /// `POST` a comment on a report.
    async fn create_comment(
        &self,
        report_id: &ReportId,
        comment: &NewComment,
    ) -> Result<Value, GatewayError>;

    /// `POST` a reaction toggle for the current viewer.
    async fn toggle_reaction(
        &self,
        report_id: &ReportId,
        kind: ReactionKind,
    ) -> Result<Value, GatewayError>;

    /// `POST` a moderation flag.
    async fn flag_report(&self, report_id: &ReportId, flag: &NewFlag)
        -> Result<Value, GatewayError>;
}
