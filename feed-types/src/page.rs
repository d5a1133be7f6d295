//! Feed pages.

use serde::{Deserialize, Serialize};

use crate::report::Report;

/// Which store answered a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    /// The remote reports service.
    Remote,
    /// The local fallback store.
    Local,
}

/// One page of reports, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    /// Reports on this page.
    pub items: Vec<Report>,
    /// Next page number to request, or `None` at the end.
    pub next_page: Option<u32>,
    /// Total number of reports, when the source reports it.
    pub total: Option<u64>,
    /// Which store produced this page.
    pub source: FeedSource,
}

impl FeedPage {
    /// True if there is nothing after this page.
    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }
}
