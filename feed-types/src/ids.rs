//! Identity types for the report feed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix carried by ids minted on this device.
const LOCAL_PREFIX: &str = "local-";

/// Generate a fresh random identifier (UUID v4, hyphenated).
///
/// Used for comments and flags created on this device.
pub fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// An opaque, unique report identifier.
///
/// Remote ids are taken verbatim from the service. Ids minted by the local
/// store carry a `local-` prefix so they never collide with the remote id
/// space. The two spaces are never reconciled.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a new identifier for a report created on this device.
    pub fn local() -> Self {
        Self(format!("{LOCAL_PREFIX}{}", fresh_id()))
    }

    /// True if this id was minted by the local store.
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_PREFIX)
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReportId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ReportId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ReportId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReportId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_ids_are_unique() {
        let a = ReportId::local();
        let b = ReportId::local();
        assert_ne!(a, b);
    }

    #[test]
    fn local_ids_are_marked() {
        assert!(ReportId::local().is_local());
        assert!(!ReportId::new("65a1f0c2e4").is_local());
    }

    #[test]
    fn fresh_id_is_uuid_v4() {
        let id = fresh_id();
        let parsed = uuid::Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ReportId::new("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
        let back: ReportId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_is_verbatim() {
        assert_eq!(ReportId::new("r-1").to_string(), "r-1");
    }
}
