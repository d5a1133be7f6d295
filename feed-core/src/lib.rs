//! # feed-core
//!
//! Pure logic for the pet report feed (no I/O, instant tests).
//!
//! This crate implements the transformations and state transitions behind
//! the feed without any network or disk I/O:
//! - [`normalize`](normalize::normalize) - heterogeneous raw record to canonical [`Report`](feed_types::Report)
//! - [`reaction`] - at most one active reaction per viewer per report
//! - [`comments`] - deduplicating, chronologically ordered comment merge
//! - [`paginate`](paginate::paginate) - offset pagination over a local collection
//! - [`patch`] - reduce any mutation response shape to one [`ReportPatch`]
//! - [`feed`] - the in-memory feed session with a stale-response guard
//!
//! ## Design Philosophy
//!
//! Everything here is a function of its inputs. `feed-client` performs the
//! actual I/O and feeds the results through these modules, so the remote
//! path and the local fallback path share exactly the same logic.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod comments;
pub mod feed;
pub mod normalize;
pub mod paginate;
pub mod patch;
pub mod reaction;

pub use comments::{merge_comments, reconcile_count};
pub use feed::{FeedState, PageMode, RequestTicket};
pub use normalize::{
    normalize, normalize_comment, normalize_comment_page, normalize_created, normalize_flag,
    normalize_page, resolve_photo_url, CommentPage,
};
pub use paginate::{paginate, Paginated};
pub use patch::{merge_flags, ReportPatch};
pub use reaction::{toggle_reaction, ReactionState};
