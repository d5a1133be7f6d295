//! Reaction kinds and their per-report tallies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownReaction;

/// One of the five reactions a viewer can leave on a report.
///
/// A viewer holds at most one active reaction per report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    /// Generic approval.
    Like,
    /// Sympathy.
    Heart,
    /// Offer to help search.
    Help,
    /// Viewer believes they have seen the pet.
    Seen,
    /// Viewer has already helped.
    Helped,
}

impl ReactionKind {
    /// Every recognized kind, in wire order.
    pub const ALL: [ReactionKind; 5] = [
        ReactionKind::Like,
        ReactionKind::Heart,
        ReactionKind::Help,
        ReactionKind::Seen,
        ReactionKind::Helped,
    ];

    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Heart => "heart",
            ReactionKind::Help => "help",
            ReactionKind::Seen => "seen",
            ReactionKind::Helped => "helped",
        }
    }
}

impl FromStr for ReactionKind {
    type Err = UnknownReaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownReaction(s.to_string()))
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-negative count per reaction kind.
///
/// Counts are unsigned and every decrement saturates, so a tally can never
/// go below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionCounts {
    /// Count of `like`.
    pub like: u32,
    /// Count of `heart`.
    pub heart: u32,
    /// Count of `help`.
    pub help: u32,
    /// Count of `seen`.
    pub seen: u32,
    /// Count of `helped`.
    pub helped: u32,
}

impl ReactionCounts {
    /// All five kinds at zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Count for one kind.
    pub fn get(&self, kind: ReactionKind) -> u32 {
        match kind {
            ReactionKind::Like => self.like,
            ReactionKind::Heart => self.heart,
            ReactionKind::Help => self.help,
            ReactionKind::Seen => self.seen,
            ReactionKind::Helped => self.helped,
        }
    }

    /// Set the count for one kind.
    pub fn set(&mut self, kind: ReactionKind, count: u32) {
        *self.slot(kind) = count;
    }

    /// Add one to a kind.
    pub fn increment(&mut self, kind: ReactionKind) {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(1);
    }

    /// Remove one from a kind, floored at zero.
    pub fn decrement(&mut self, kind: ReactionKind) {
        let slot = self.slot(kind);
        *slot = slot.saturating_sub(1);
    }

    /// Sum over all kinds.
    pub fn total(&self) -> u64 {
        ReactionKind::ALL
            .iter()
            .map(|kind| u64::from(self.get(*kind)))
            .sum()
    }

    fn slot(&mut self, kind: ReactionKind) -> &mut u32 {
        match kind {
            ReactionKind::Like => &mut self.like,
            ReactionKind::Heart => &mut self.heart,
            ReactionKind::Help => &mut self.help,
            ReactionKind::Seen => &mut self.seen,
            ReactionKind::Helped => &mut self.helped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind() {
        for kind in ReactionKind::ALL {
            assert_eq!(kind.as_str().parse::<ReactionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(" Heart ".parse::<ReactionKind>().unwrap(), ReactionKind::Heart);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "wave".parse::<ReactionKind>().unwrap_err();
        assert_eq!(err, UnknownReaction("wave".into()));
    }

    #[test]
    fn decrement_floors_at_zero() {
        let mut counts = ReactionCounts::zero();
        counts.decrement(ReactionKind::Seen);
        assert_eq!(counts.get(ReactionKind::Seen), 0);
    }

    #[test]
    fn increment_touches_only_one_kind() {
        let mut counts = ReactionCounts::zero();
        counts.increment(ReactionKind::Help);
        counts.increment(ReactionKind::Help);
        assert_eq!(counts.get(ReactionKind::Help), 2);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn missing_kinds_deserialize_as_zero() {
        let counts: ReactionCounts = serde_json::from_str(r#"{"heart":3}"#).unwrap();
        assert_eq!(counts.heart, 3);
        assert_eq!(counts.like, 0);
        assert_eq!(counts.helped, 0);
    }

    #[test]
    fn serializes_lowercase_kind() {
        assert_eq!(
            serde_json::to_string(&ReactionKind::Helped).unwrap(),
            "\"helped\""
        );
    }
}
