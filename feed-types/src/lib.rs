//! # feed-types
//!
//! Data model for the lost/found pet report feed.
//!
//! This crate provides the foundational types used across all petfeed crates:
//! - [`ReportId`] - Opaque report identity
//! - [`Report`], [`Comment`], [`Flag`] - The canonical report schema
//! - [`ReactionKind`], [`ReactionCounts`] - Per-viewer reactions and their tallies
//! - [`FeedPage`] - One page of the feed and where it came from
//! - [`ReportDraft`], [`NewComment`], [`NewFlag`] - Mutation inputs
//!
//! Serde field names are camelCase. That is the shape persisted by the
//! local store and the shape the remote service speaks natively.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod page;
mod reaction;
mod report;

pub use error::UnknownReaction;
pub use ids::{fresh_id, ReportId};
pub use page::{FeedPage, FeedSource};
pub use reaction::{ReactionCounts, ReactionKind};
pub use report::{
    Comment, Flag, NewComment, NewFlag, PetStatus, PhotoUpload, Report, ReportDraft,
};
