//! Offset pagination over an in-memory collection.
//!
//! Pages are 1-based. Page 0 is read as page 1 and a zero limit as 1, so a
//! malformed request still returns something sensible instead of an empty
//! page that claims more pages exist.

/// One slice of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<T> {
    /// Items on the requested page.
    pub items: Vec<T>,
    /// `page + 1`, or `None` once the slice reaches the end.
    pub next_page: Option<u32>,
    /// Size of the whole collection.
    pub total: u64,
}

/// Slice `items` for `page` of size `limit`.
pub fn paginate<T: Clone>(items: &[T], page: u32, limit: u32) -> Paginated<T> {
    let page = page.max(1);
    let limit = limit.max(1) as usize;
    let offset = (page as usize - 1).saturating_mul(limit);
    let start = offset.min(items.len());
    let end = offset.saturating_add(limit).min(items.len());

    Paginated {
        items: items[start..end].to_vec(),
        next_page: (end < items.len()).then(|| page.saturating_add(1)),
        total: items.len() as u64,
    }
}
