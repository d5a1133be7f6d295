//! Report normalization.
//!
//! The remote service has shipped several record shapes over time
//! (`_id` vs `id`, snake_case vs camelCase, reactions as an object or as a
//! list). Every recognized alias reduces to the canonical [`Report`];
//! anything unrecognized reduces to a default instead of failing. The only
//! hard requirement is an id: a record without one is rejected with `None`.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use feed_types::{
    Comment, FeedPage, FeedSource, Flag, PetStatus, ReactionCounts, ReactionKind, Report,
    ReportDraft, ReportId,
};

pub(crate) const ID: &[&str] = &["id", "_id", "reportId"];
pub(crate) const PET_STATUS: &[&str] = &["petStatus", "pet_status", "status"];
const FIRST_NAME: &[&str] = &["firstName", "first_name", "name"];
const LOCATION: &[&str] = &["location", "lastSeenLocation", "last_seen_location"];
const DESCRIPTION: &[&str] = &["description", "details"];
const PHOTO_URL: &[&str] = &["photoUrl", "photo_url", "photo", "imageUrl", "image"];
const CREATED_AT: &[&str] = &["createdAt", "created_at", "date"];
pub(crate) const REACTIONS: &[&str] = &["reactions", "reactionCounts"];
pub(crate) const MY_REACTION: &[&str] = &["myReaction", "my_reaction", "userReaction"];
const COMMENTS: &[&str] = &["comments"];
pub(crate) const COMMENTS_COUNT: &[&str] = &["commentsCount", "comments_count", "commentCount"];
const FLAGS: &[&str] = &["flags"];

const COMMENT_NAME: &[&str] = &["name", "author", "authorName"];
const COMMENT_TEXT: &[&str] = &["text", "body", "content"];
const FLAG_REASON: &[&str] = &["reason"];
const FLAG_DETAILS: &[&str] = &["details", "description"];

const FEED_ITEMS: &[&str] = &["items", "reports", "data", "results"];
const COMMENT_ITEMS: &[&str] = &["comments", "items", "data", "results"];
const NEXT_PAGE: &[&str] = &["nextPage", "next_page"];
const HAS_MORE: &[&str] = &["hasMore", "has_more"];
const TOTAL: &[&str] = &["total", "count"];

/// Convert one raw record into a canonical report.
///
/// Returns `None` for non-objects and for records without an id.
/// `asset_base` resolves relative photo paths.
pub fn normalize(raw: &Value, asset_base: &str) -> Option<Report> {
    let obj = raw.as_object()?;
    let id = identifier(obj)?;

    let comments: Vec<Comment> = field(obj, COMMENTS)
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(normalize_comment).collect())
        .unwrap_or_default();
    let held = u32::try_from(comments.len()).unwrap_or(u32::MAX);
    let comments_count = field(obj, COMMENTS_COUNT)
        .and_then(count)
        .map_or(held, |n| n.max(held));

    Some(Report {
        id: ReportId::new(id),
        pet_status: text(obj, PET_STATUS)
            .and_then(|s| PetStatus::parse(&s))
            .unwrap_or_default(),
        first_name: text(obj, FIRST_NAME).unwrap_or_default(),
        location: text(obj, LOCATION).unwrap_or_default(),
        description: text(obj, DESCRIPTION).unwrap_or_default(),
        photo_url: text(obj, PHOTO_URL).and_then(|p| resolve_photo_url(&p, asset_base)),
        created_at: field(obj, CREATED_AT).and_then(timestamp).unwrap_or_default(),
        reactions: field(obj, REACTIONS).map(reaction_counts).unwrap_or_default(),
        my_reaction: field(obj, MY_REACTION).and_then(reaction_kind),
        comments,
        comments_count,
        flags: field(obj, FLAGS)
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(normalize_flag).collect())
            .unwrap_or_default(),
    })
}

/// Convert one raw comment. `None` without an id.
pub fn normalize_comment(raw: &Value) -> Option<Comment> {
    let obj = raw.as_object()?;
    Some(Comment {
        id: identifier(obj)?,
        name: text(obj, COMMENT_NAME).filter(|n| !n.trim().is_empty()),
        text: text(obj, COMMENT_TEXT).unwrap_or_default(),
        created_at: field(obj, CREATED_AT).and_then(timestamp).unwrap_or_default(),
    })
}

/// Convert one raw flag. `None` without an id.
pub fn normalize_flag(raw: &Value) -> Option<Flag> {
    let obj = raw.as_object()?;
    Some(Flag {
        id: identifier(obj)?,
        reason: text(obj, FLAG_REASON).unwrap_or_default(),
        details: text(obj, FLAG_DETAILS).unwrap_or_default(),
        created_at: field(obj, CREATED_AT).and_then(timestamp).unwrap_or_default(),
    })
}

/// Resolve a photo reference.
///
/// Absolute `http(s)` URLs and inline `data:` URLs pass through verbatim;
/// any other non-empty value is a path under `asset_base`.
pub fn resolve_photo_url(value: &str, asset_base: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let lower = value.to_ascii_lowercase();
    if ["http://", "https://", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return Some(value.to_string());
    }
    Some(format!(
        "{}/{}",
        asset_base.trim_end_matches('/'),
        value.trim_start_matches('/')
    ))
}

/// Normalize a feed listing response.
///
/// A well-formed response is a bare array or an object exposing the items
/// under one of the accepted aliases (one nested `data` envelope is
/// searched). Returns `None` for anything else so the caller can fall back.
/// Records without an id are dropped.
pub fn normalize_page(
    payload: &Value,
    page: u32,
    limit: u32,
    asset_base: &str,
) -> Option<FeedPage> {
    let (raw_items, envelope) = find_items(payload, FEED_ITEMS, 1)?;
    let items: Vec<Report> = raw_items
        .iter()
        .filter_map(|raw| normalize(raw, asset_base))
        .collect();

    Some(FeedPage {
        items,
        next_page: next_page(envelope, raw_items.len(), page, limit),
        total: envelope.and_then(|obj| field(obj, TOTAL)).and_then(count_u64),
        source: FeedSource::Remote,
    })
}

/// One page of comments from the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentPage {
    /// Comments in this page (any order; merge sorts them).
    pub comments: Vec<Comment>,
    /// Next page, if any.
    pub next_page: Option<u32>,
    /// Total comments on the report, when reported.
    pub total: Option<u64>,
}

/// Normalize a comment listing response. Same envelope rules as
/// [`normalize_page`].
pub fn normalize_comment_page(payload: &Value, page: u32, limit: u32) -> Option<CommentPage> {
    let (raw_items, envelope) = find_items(payload, COMMENT_ITEMS, 1)?;
    Some(CommentPage {
        comments: raw_items.iter().filter_map(normalize_comment).collect(),
        next_page: next_page(envelope, raw_items.len(), page, limit),
        total: envelope.and_then(|obj| field(obj, TOTAL)).and_then(count_u64),
    })
}

/// Build the report for an accepted submission.
///
/// The service may answer with the full record (bare, or under `report` or
/// `data`) or with little more than the new id. Whatever the answer leaves
/// out is filled from the draft, and a missing timestamp becomes `now`.
/// Returns `None` when the answer carries no id.
pub fn normalize_created(
    payload: &Value,
    draft: &ReportDraft,
    now: DateTime<Utc>,
    asset_base: &str,
) -> Option<Report> {
    let server = ["report", "data"]
        .iter()
        .filter_map(|key| payload.get(*key))
        .find(|value| value.is_object())
        .unwrap_or(payload);
    let obj = server.as_object()?;
    let mut report = normalize(server, asset_base)?;

    if text(obj, PET_STATUS).and_then(|s| PetStatus::parse(&s)).is_none() {
        report.pet_status = draft.pet_status;
    }
    if report.first_name.is_empty() {
        report.first_name = draft.first_name.clone();
    }
    if report.location.is_empty() {
        report.location = draft.location.clone();
    }
    if report.description.is_empty() {
        report.description = draft.description.clone().unwrap_or_default();
    }
    if field(obj, CREATED_AT).and_then(timestamp).is_none() {
        report.created_at = now;
    }
    Some(report)
}

// ===========================================
// Field Reducers
// ===========================================

/// First non-null value among `aliases`.
pub(crate) fn field<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

/// True if any alias key is present, even with a null value.
pub(crate) fn has_key(obj: &Map<String, Value>, aliases: &[&str]) -> bool {
    aliases.iter().any(|key| obj.contains_key(*key))
}

fn text(obj: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    match field(obj, aliases)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn identifier(obj: &Map<String, Value>) -> Option<String> {
    text(obj, ID).filter(|id| !id.trim().is_empty())
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

fn count_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|v| v.max(0) as u64))
            .or_else(|| n.as_f64().map(|v| v.max(0.0) as u64)),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|v| v.max(0) as u64),
        _ => None,
    }
}

/// Non-negative count, clamped into `u32`.
pub(crate) fn count(value: &Value) -> Option<u32> {
    count_u64(value).map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}

pub(crate) fn reaction_kind(value: &Value) -> Option<ReactionKind> {
    value.as_str().and_then(|s| s.parse().ok())
}

/// Reaction tallies from either `{"like": 2, ...}` or
/// `[{"kind": "like", "count": 2}, ...]`. Unknown kinds are ignored.
pub(crate) fn reaction_counts(value: &Value) -> ReactionCounts {
    let mut counts = ReactionCounts::zero();
    match value {
        Value::Object(map) => {
            for kind in ReactionKind::ALL {
                if let Some(n) = map.get(kind.as_str()).and_then(count) {
                    counts.set(kind, n);
                }
            }
        }
        Value::Array(entries) => {
            for entry in entries.iter().filter_map(Value::as_object) {
                let kind = field(entry, &["kind", "type", "reaction"]).and_then(reaction_kind);
                let n = field(entry, &["count", "total"]).and_then(count);
                if let (Some(kind), Some(n)) = (kind, n) {
                    counts.set(kind, n);
                }
            }
        }
        _ => {}
    }
    counts
}

fn find_items<'a>(
    payload: &'a Value,
    aliases: &[&str],
    depth: u8,
) -> Option<(&'a Vec<Value>, Option<&'a Map<String, Value>>)> {
    match payload {
        Value::Array(items) => Some((items, None)),
        Value::Object(obj) => {
            for key in aliases {
                match obj.get(*key) {
                    Some(Value::Array(items)) => return Some((items, Some(obj))),
                    Some(nested) if *key == "data" && depth > 0 && nested.is_object() => {
                        if let Some(found) = find_items(nested, aliases, depth - 1) {
                            return Some(found);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        _ => None,
    }
}

fn next_page(
    envelope: Option<&Map<String, Value>>,
    received: usize,
    page: u32,
    limit: u32,
) -> Option<u32> {
    let following = page.max(1).saturating_add(1);
    if let Some(obj) = envelope {
        if has_key(obj, NEXT_PAGE) {
            return match field(obj, NEXT_PAGE) {
                Some(Value::Bool(true)) => Some(following),
                Some(value) => count(value).filter(|n| *n > 0),
                None => None,
            };
        }
        if let Some(Value::Bool(more)) = field(obj, HAS_MORE) {
            return more.then_some(following);
        }
    }
    (limit > 0 && received >= limit as usize).then_some(following)
}
