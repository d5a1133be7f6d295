//! Error types for feed-client.

use feed_types::{ReportId, UnknownReaction};
use thiserror::Error;

/// Why a remote call did not produce a usable answer.
///
/// Every variant triggers the local fallback: absorbed on reads, surfaced
/// as [`SyncOutcome::SavedLocally`](crate::SyncOutcome::SavedLocally) on writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request could not be sent or timed out.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The service answered with a non-2xx status.
    #[error("remote rejected request (HTTP {status}): {message}")]
    RemoteRejected {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        message: String,
    },

    /// A 2xx answer that is not JSON or lacks the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => GatewayError::RemoteRejected {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None if e.is_decode() => GatewayError::MalformedResponse(e.to_string()),
            None => GatewayError::NetworkUnavailable(e.to_string()),
        }
    }
}

/// Durable storage failures. These have no further fallback.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {key}: {source}")]
    Io {
        /// Record key.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reports could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persisted record is not a valid report array.
    #[error("stored record {key} is corrupt: {reason}")]
    Corrupt {
        /// Record key.
        key: String,
        /// Parse error.
        reason: String,
    },

    /// Writing would exceed the storage quota.
    #[error("storage quota exceeded: {size} bytes (limit: {limit} bytes)")]
    QuotaExceeded {
        /// Bytes the write would occupy.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Hard failures of feed operations.
///
/// `NotFound` and `InvalidReaction` are ordinary, matchable results; only
/// `Storage` means the device could not persist anything.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The addressed report is not in the target store.
    #[error("report not found: {report_id}")]
    NotFound {
        /// The missing id.
        report_id: ReportId,
    },

    /// The reaction kind is not one of the five recognized kinds.
    #[error("invalid reaction: {0}")]
    InvalidReaction(String),

    /// Durable storage failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl From<UnknownReaction> for FeedError {
    fn from(e: UnknownReaction) -> Self {
        FeedError::InvalidReaction(e.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = GatewayError::RemoteRejected {
            status: 422,
            message: "location is required".into(),
        };
        assert_eq!(
            err.to_string(),
            "remote rejected request (HTTP 422): location is required"
        );

        let err = FeedError::NotFound {
            report_id: ReportId::new("r9"),
        };
        assert_eq!(err.to_string(), "report not found: r9");
    }

    #[test]
    fn unknown_reaction_converts() {
        let err: FeedError = UnknownReaction("wave".into()).into();
        assert!(matches!(err, FeedError::InvalidReaction(k) if k == "wave"));
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GatewayError>();
        assert_send_sync::<StorageError>();
        assert_send_sync::<FeedError>();
    }
}
