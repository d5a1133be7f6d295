//! The canonical report schema and the inputs that create or mutate it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::ReportId;
use crate::reaction::{ReactionCounts, ReactionKind};

/// Whether the pet in a report is missing or has been found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    /// The owner is looking for the pet.
    #[default]
    Lost,
    /// Someone found a pet and is looking for the owner.
    Found,
}

impl PetStatus {
    /// Lenient parse: case-insensitive, `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lost" => Some(Self::Lost),
            "found" => Some(Self::Found),
            _ => None,
        }
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lost => "lost",
            Self::Found => "found",
        }
    }
}

/// A lost/found pet post plus its engagement data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Unique id within the loaded session.
    pub id: ReportId,
    /// Lost or found.
    #[serde(default)]
    pub pet_status: PetStatus,
    /// Reporter's first name.
    #[serde(default)]
    pub first_name: String,
    /// Where the pet was lost or found.
    #[serde(default)]
    pub location: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Absolute URL, inline `data:` URL, or none.
    #[serde(default)]
    pub photo_url: Option<String>,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Tally per reaction kind.
    #[serde(default)]
    pub reactions: ReactionCounts,
    /// The current viewer's active reaction, if any.
    #[serde(default)]
    pub my_reaction: Option<ReactionKind>,
    /// Loaded comments, ascending by `created_at`, unique by id.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Total comments on the report; never below `comments.len()`.
    #[serde(default)]
    pub comments_count: u32,
    /// Moderation flags raised against this report.
    #[serde(default)]
    pub flags: Vec<Flag>,
}

impl Report {
    /// Build a fresh report from a submission: zero reactions, no viewer
    /// reaction, no comments, no flags.
    pub fn from_draft(
        id: ReportId,
        draft: &ReportDraft,
        photo_url: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            pet_status: draft.pet_status,
            first_name: draft.first_name.clone(),
            location: draft.location.clone(),
            description: draft.description.clone().unwrap_or_default(),
            photo_url,
            created_at,
            reactions: ReactionCounts::zero(),
            my_reaction: None,
            comments: Vec::new(),
            comments_count: 0,
            flags: Vec::new(),
        }
    }
}

/// A comment on a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique id within the report.
    pub id: String,
    /// Display name of the commenter, if given.
    #[serde(default)]
    pub name: Option<String>,
    /// Comment body.
    pub text: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

/// A moderation flag raised by a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    /// Unique id within the report.
    pub id: String,
    /// Short reason code (e.g. "spam").
    pub reason: String,
    /// Free-form details.
    #[serde(default)]
    pub details: String,
    /// When the flag was raised.
    pub created_at: DateTime<Utc>,
}

/// An image attached to a new report.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Original file name.
    pub file_name: String,
    /// MIME type as reported by the picker (e.g. `image/jpeg`).
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &format!("[{} bytes]", self.bytes.len()))
            .finish()
    }
}

/// A report submission, as entered by the reporter.
///
/// `last_name` and `phone_number` go to the remote service only; they are
/// not part of the public report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    /// Reporter's first name.
    pub first_name: String,
    /// Reporter's last name.
    pub last_name: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Lost or found.
    pub pet_status: PetStatus,
    /// Where the pet was lost or found.
    pub location: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional photo.
    pub photo: Option<PhotoUpload>,
}

/// Body of a new comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    /// Display name; omitted for anonymous comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Comment body.
    pub text: String,
}

/// Body of a new moderation flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFlag {
    /// Short reason code.
    pub reason: String,
    /// Free-form details.
    #[serde(default)]
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ReportDraft {
        ReportDraft {
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            phone_number: "555-0100".into(),
            pet_status: PetStatus::Found,
            location: "Parque Central".into(),
            description: None,
            photo: None,
        }
    }

    #[test]
    fn pet_status_parse_is_lenient() {
        assert_eq!(PetStatus::parse("FOUND"), Some(PetStatus::Found));
        assert_eq!(PetStatus::parse(" lost "), Some(PetStatus::Lost));
        assert_eq!(PetStatus::parse("missing"), None);
        assert_eq!(PetStatus::default(), PetStatus::Lost);
    }

    #[test]
    fn from_draft_has_zero_engagement() {
        let report = Report::from_draft(ReportId::new("r1"), &draft(), None, Utc::now());
        assert_eq!(report.reactions, ReactionCounts::zero());
        assert!(report.my_reaction.is_none());
        assert!(report.comments.is_empty());
        assert_eq!(report.comments_count, 0);
        assert!(report.flags.is_empty());
        assert_eq!(report.description, "");
    }

    #[test]
    fn report_uses_camel_case_fields() {
        let report = Report::from_draft(ReportId::new("r1"), &draft(), None, Utc::now());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["petStatus"], "found");
        assert_eq!(json["firstName"], "Ana");
        assert!(json["myReaction"].is_null());
        assert_eq!(json["commentsCount"], 0);
    }

    #[test]
    fn photo_upload_debug_hides_bytes() {
        let photo = PhotoUpload {
            file_name: "rex.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        };
        let debug = format!("{:?}", photo);
        assert!(debug.contains("[3 bytes]"), "got: {}", debug);
    }

    #[test]
    fn anonymous_comment_omits_name() {
        let body = NewComment {
            name: None,
            text: "I saw him near the bakery".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("name").is_none());
    }
}
