//! In-memory feed session.
//!
//! Holds the reports a viewer has loaded, in display order, and guards the
//! two races the I/O layer cannot rule out on its own:
//!
//! - **Stale pages**: feed requests can complete out of order. Each request
//!   takes a [`RequestTicket`]; only the newest ticket's page is accepted.
//! - **Lost updates**: a reaction toggle is computed from the client's
//!   current copy, so two toggles in flight for the same report would race
//!   the server's counters. [`FeedState::begin_mutation`] refuses a second
//!   mutation until the first one ends.

use std::collections::HashSet;

use feed_types::{FeedPage, FeedSource, Report, ReportId};

/// Generation number handed out per feed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    /// Numeric generation of this ticket.
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// How an accepted page combines with what is already loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Start over (first page, pull-to-refresh).
    Replace,
    /// Add below the loaded reports ("load more").
    Append,
}

/// The loaded feed plus request/mutation bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    reports: Vec<Report>,
    next_page: Option<u32>,
    source: Option<FeedSource>,
    generation: u64,
    in_flight: HashSet<ReportId>,
}

impl FeedState {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a feed request. Any earlier ticket becomes stale.
    pub fn begin_request(&mut self) -> RequestTicket {
        self.generation = self.generation.saturating_add(1);
        RequestTicket(self.generation)
    }

    /// True if `ticket` belongs to the most recent request.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Accept a page if its ticket is still current.
    ///
    /// Returns `false` (and changes nothing) for a stale page. Ids stay
    /// unique: a report already loaded is replaced in place rather than
    /// listed twice.
    pub fn accept_page(&mut self, ticket: RequestTicket, page: FeedPage, mode: PageMode) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        if mode == PageMode::Replace {
            self.reports.clear();
        }
        for report in page.items {
            self.upsert(report);
        }
        self.next_page = page.next_page;
        self.source = Some(page.source);
        true
    }

    /// Loaded reports in display order.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Look up a loaded report.
    pub fn get(&self, id: &ReportId) -> Option<&Report> {
        self.reports.iter().find(|r| &r.id == id)
    }

    /// Next page to request, `None` when the feed is exhausted.
    pub fn next_page(&self) -> Option<u32> {
        self.next_page
    }

    /// Store that answered the last accepted page.
    pub fn source(&self) -> Option<FeedSource> {
        self.source
    }

    /// Replace a loaded report in place. Returns `false` if it is not loaded.
    pub fn replace(&mut self, report: Report) -> bool {
        match self.reports.iter_mut().find(|r| r.id == report.id) {
            Some(slot) => {
                *slot = report;
                true
            }
            None => false,
        }
    }

    /// Put a newly submitted report at the top of the feed.
    pub fn prepend(&mut self, report: Report) {
        self.reports.retain(|r| r.id != report.id);
        self.reports.insert(0, report);
    }

    /// Claim the right to mutate a report. `false` if a mutation is already
    /// in flight for it.
    pub fn begin_mutation(&mut self, id: &ReportId) -> bool {
        self.in_flight.insert(id.clone())
    }

    /// Release the claim taken by [`begin_mutation`](Self::begin_mutation).
    pub fn end_mutation(&mut self, id: &ReportId) {
        self.in_flight.remove(id);
    }

    /// True while a mutation is in flight for `id`.
    pub fn is_mutating(&self, id: &ReportId) -> bool {
        self.in_flight.contains(id)
    }

    fn upsert(&mut self, report: Report) {
        if !self.replace(report.clone()) {
            self.reports.push(report);
        }
    }
}
