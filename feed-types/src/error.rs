//! Error types for the feed data model.

use thiserror::Error;

/// A reaction kind outside the recognized set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reaction kind: {0}")]
pub struct UnknownReaction(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = UnknownReaction("wave".into());
        assert_eq!(err.to_string(), "unknown reaction kind: wave");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<UnknownReaction>();
    }
}
