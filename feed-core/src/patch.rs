//! Mutation response reduction.
//!
//! A successful reaction/comment/flag call may answer with the full updated
//! report, with only the created comment or flag, with only the new counts,
//! or with nothing useful at all. [`ReportPatch::from_response`] reduces
//! every one of those shapes to one patch, and [`ReportPatch::apply`] folds
//! it into the in-memory report, so the caller sees the same report no
//! matter which shape came back.

use serde_json::{Map, Value};

use feed_types::{Comment, Flag, PetStatus, ReactionCounts, ReactionKind, Report};

use crate::comments::{merge_comments, reconcile_count};
use crate::normalize::{
    count, field, has_key, identifier, normalize, normalize_comment, normalize_flag,
    reaction_counts, reaction_kind, COMMENTS_COUNT, MY_REACTION, PET_STATUS, REACTIONS,
};

/// Keys that only a report record carries.
const REPORT_ONLY: &[&str] = &[
    "petStatus",
    "pet_status",
    "firstName",
    "first_name",
    "location",
    "photoUrl",
    "photo_url",
];

/// Changes to fold into a report after a successful mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPatch {
    /// The full updated report, when the response carried one.
    ///
    /// Only its content, comments and flags are folded in. Status, tallies
    /// and the viewer reaction travel in their own fields, set only when the
    /// response actually named them.
    pub report: Option<Report>,
    /// Updated lost/found status.
    pub pet_status: Option<PetStatus>,
    /// Updated tallies.
    pub reactions: Option<ReactionCounts>,
    /// Updated viewer reaction. `Some(None)` clears it.
    pub my_reaction: Option<Option<ReactionKind>>,
    /// A newly created comment.
    pub comment: Option<Comment>,
    /// Updated comment total.
    pub comments_count: Option<u32>,
    /// A newly created flag.
    pub flag: Option<Flag>,
}

impl ReportPatch {
    /// Reduce a success payload to a patch. Unrecognized payloads (including
    /// `null`, arrays, and `{"ok": true}`) yield an empty patch.
    pub fn from_response(payload: &Value, asset_base: &str) -> Self {
        let Some(obj) = payload.as_object() else {
            return Self::default();
        };
        if let Some(inner) = obj.get("data").filter(|v| v.is_object()) {
            let unwrapped = Self::from_response(inner, asset_base);
            if !unwrapped.is_empty() {
                return unwrapped;
            }
        }

        let report_obj = match obj.get("report") {
            Some(raw) => raw.as_object(),
            None if looks_like_report(obj) => Some(obj),
            None => None,
        };
        let report = match obj.get("report") {
            Some(raw) => normalize(raw, asset_base),
            None if report_obj.is_some() => normalize(payload, asset_base),
            None => None,
        };
        // Top-level keys first, then the same keys inside the report
        let named = |aliases: &[&str]| {
            if has_key(obj, aliases) {
                Some(obj)
            } else {
                report_obj
                    .filter(|_| report.is_some())
                    .filter(|r| has_key(r, aliases))
            }
        };
        let comment = match obj.get("comment") {
            Some(raw) => normalize_comment(raw),
            None if report.is_none() && obj.contains_key("text") => normalize_comment(payload),
            None => None,
        };

        Self {
            pet_status: named(PET_STATUS)
                .and_then(|o| field(o, PET_STATUS))
                .and_then(Value::as_str)
                .and_then(PetStatus::parse),
            reactions: named(REACTIONS)
                .and_then(|o| field(o, REACTIONS))
                .map(reaction_counts),
            my_reaction: named(MY_REACTION).map(|o| field(o, MY_REACTION).and_then(reaction_kind)),
            report,
            comment,
            comments_count: field(obj, COMMENTS_COUNT).and_then(count),
            flag: obj.get("flag").and_then(normalize_flag),
        }
    }

    /// True if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True if the patch already accounts for a created comment.
    pub fn carries_comment(&self) -> bool {
        self.comment.is_some() || self.report.is_some()
    }

    /// True if the patch already accounts for a created flag.
    pub fn carries_flag(&self) -> bool {
        self.flag.is_some() || self.report.is_some()
    }

    /// Fold the patch into `report`.
    ///
    /// Comments are merged, never replaced, and `comments_count` never
    /// decreases. Content fields from a full report only overwrite when
    /// non-empty, and status, tallies and the viewer reaction only change
    /// when the response named them, so a sparse server copy cannot blank
    /// the report.
    pub fn apply(&self, report: &mut Report) {
        if let Some(full) = &self.report {
            if !full.first_name.is_empty() {
                report.first_name = full.first_name.clone();
            }
            if !full.location.is_empty() {
                report.location = full.location.clone();
            }
            if !full.description.is_empty() {
                report.description = full.description.clone();
            }
            if full.photo_url.is_some() {
                report.photo_url = full.photo_url.clone();
            }

            let merged = merge_comments(&report.comments, &full.comments);
            report.comments_count = reconcile_count(
                report.comments_count,
                merged.len(),
                Some(u64::from(full.comments_count)),
            );
            report.comments = merged;
            report.flags = merge_flags(&report.flags, &full.flags);
        }

        if let Some(status) = self.pet_status {
            report.pet_status = status;
        }
        if let Some(reactions) = self.reactions {
            report.reactions = reactions;
        }
        if let Some(mine) = self.my_reaction {
            report.my_reaction = mine;
        }

        if let Some(comment) = &self.comment {
            let before = report.comments.len();
            report.comments = merge_comments(&report.comments, std::slice::from_ref(comment));
            let added = u32::try_from(report.comments.len() - before).unwrap_or(u32::MAX);
            report.comments_count = report.comments_count.saturating_add(added);
        }
        report.comments_count = reconcile_count(
            report.comments_count,
            report.comments.len(),
            self.comments_count.map(u64::from),
        );

        if let Some(flag) = &self.flag {
            report.flags = merge_flags(&report.flags, std::slice::from_ref(flag));
        }
    }
}

fn looks_like_report(obj: &Map<String, Value>) -> bool {
    identifier(obj).is_some() && REPORT_ONLY.iter().any(|key| obj.contains_key(*key))
}

/// Union of two flag lists by id (incoming wins), ascending by `created_at`.
pub fn merge_flags(current: &[Flag], incoming: &[Flag]) -> Vec<Flag> {
    let mut merged = current.to_vec();
    for flag in incoming {
        match merged.iter_mut().find(|f| f.id == flag.id) {
            Some(existing) => *existing = flag.clone(),
            None => merged.push(flag.clone()),
        }
    }
    merged.sort_by_key(|f| f.created_at);
    merged
}
