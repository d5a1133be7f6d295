//! Comment page merging.
//!
//! Comment pages may overlap (a page re-fetched after a new comment shifted
//! the offsets, or the same page loaded twice). Merging is idempotent:
//! merging a page that is already loaded changes nothing.

use std::collections::HashMap;

use feed_types::Comment;

/// Union of `current` and `incoming`, unique by id, ascending by `created_at`.
///
/// When both sides hold the same id, the incoming copy wins (it is the
/// fresher one) but keeps its position among equal timestamps.
pub fn merge_comments(current: &[Comment], incoming: &[Comment]) -> Vec<Comment> {
    let mut merged: Vec<Comment> = Vec::with_capacity(current.len() + incoming.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(merged.capacity());

    for comment in current.iter().chain(incoming) {
        match index.get(comment.id.as_str()) {
            Some(&at) => merged[at] = comment.clone(),
            None => {
                index.insert(comment.id.as_str(), merged.len());
                merged.push(comment.clone());
            }
        }
    }

    // Stable: equal timestamps keep first-seen order.
    merged.sort_by_key(|c| c.created_at);
    merged
}

/// Comment total after a merge.
///
/// Never below the previous total, the remote-reported total, or the number
/// of comments actually held.
pub fn reconcile_count(previous: u32, merged_len: usize, remote_total: Option<u64>) -> u32 {
    let held = u32::try_from(merged_len).unwrap_or(u32::MAX);
    let remote = remote_total
        .map(|t| u32::try_from(t).unwrap_or(u32::MAX))
        .unwrap_or(0);
    previous.max(held).max(remote)
}
