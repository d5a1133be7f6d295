//! Mock gateway for testing.
//!
//! Allows queueing responses, forcing failures, and capturing requests for
//! verification.

use super::ReportsGateway;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use feed_types::{NewComment, NewFlag, ReactionKind, ReportDraft, ReportId};

use crate::error::GatewayError;

/// A request captured by [`MockGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayRequest {
    /// `list_reports`
    ListReports {
        /// Requested page.
        page: u32,
        /// Requested page size.
        limit: u32,
    },
    /// `list_comments`
    ListComments {
        /// Target report.
        report_id: ReportId,
        /// Requested page.
        page: u32,
        /// Requested page size.
        limit: u32,
    },
    /// `create_report`
    CreateReport(ReportDraft),
    /// `create_comment`
    CreateComment {
        /// Target report.
        report_id: ReportId,
        /// Comment body.
        comment: NewComment,
    },
    /// `toggle_reaction`
    ToggleReaction {
        /// Target report.
        report_id: ReportId,
        /// Requested kind.
        kind: ReactionKind,
    },
    /// `flag_report`
    FlagReport {
        /// Target report.
        report_id: ReportId,
        /// Flag body.
        flag: NewFlag,
    },
}

/// Mock gateway for testing.
///
/// Responses are served in FIFO order regardless of which method is
/// called. An empty queue answers `Value::Null` (a 2xx with no body).
#[derive(Debug, Default)]
pub struct MockGateway {
    inner: Arc<Mutex<MockGatewayInner>>,
}

#[derive(Debug, Default)]
struct MockGatewayInner {
    offline: bool,
    requests: Vec<GatewayRequest>,
    responses: VecDeque<Value>,
    fail_next: Option<GatewayError>,
}

impl MockGateway {
    /// Create a new mock gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a payload to be returned by the next successful call.
    pub fn queue_response(&self, payload: Value) {
        let mut inner = self.inner.lock().unwrap();
        inner.responses.push_back(payload);
    }

    /// Cause the next call to fail with the given error.
    pub fn fail_next(&self, error: GatewayError) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next = Some(error);
    }

    /// Cause the next call to be answered with a non-2xx status.
    pub fn reject_next(&self, status: u16, message: &str) {
        self.fail_next(GatewayError::RemoteRejected {
            status,
            message: message.to_string(),
        });
    }

    /// Fail every call with `NetworkUnavailable` until switched back.
    pub fn set_offline(&self, offline: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.offline = offline;
    }

    /// Get all requests that were made.
    pub fn requests(&self) -> Vec<GatewayRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.clone()
    }

    /// Get the last request that was made.
    pub fn last_request(&self) -> Option<GatewayRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.last().cloned()
    }

    /// Clear all state (requests, queue, failures).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockGatewayInner::default();
    }

    fn answer(&self, request: GatewayRequest) -> Result<Value, GatewayError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request);

        if inner.offline {
            return Err(GatewayError::NetworkUnavailable("offline".into()));
        }
        // Check for forced failure
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }

        Ok(inner.responses.pop_front().unwrap_or(Value::Null))
    }
}

impl Clone for MockGateway {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl ReportsGateway for MockGateway {
    async fn list_reports(&self, page: u32, limit: u32) -> Result<Value, GatewayError> {
        self.answer(GatewayRequest::ListReports { page, limit })
    }

    async fn list_comments(
        &self,
        report_id: &ReportId,
        page: u32,
        limit: u32,
    ) -> Result<Value, GatewayError> {
        self.answer(GatewayRequest::ListComments {
            report_id: report_id.clone(),
            page,
            limit,
        })
    }

    async fn create_report(&self, draft: &ReportDraft) -> Result<Value, GatewayError> {
        self.answer(GatewayRequest::CreateReport(draft.clone()))
    }

    async fn create_comment(
        &self,
        report_id: &ReportId,
        comment: &NewComment,
    ) -> Result<Value, GatewayError> {
        self.answer(GatewayRequest::CreateComment {
            report_id: report_id.clone(),
            comment: comment.clone(),
        })
    }

    async fn toggle_reaction(
        &self,
        report_id: &ReportId,
        kind: ReactionKind,
    ) -> Result<Value, GatewayError> {
        self.answer(GatewayRequest::ToggleReaction {
            report_id: report_id.clone(),
            kind,
        })
    }

    async fn flag_report(
        &self,
        report_id: &ReportId,
        flag: &NewFlag,
    ) -> Result<Value, GatewayError> {
        self.answer(GatewayRequest::FlagReport {
            report_id: report_id.clone(),
            flag: flag.clone(),
        })
    }
}
