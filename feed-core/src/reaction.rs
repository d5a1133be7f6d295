//! Reaction state machine.
//!
//! Per (report, viewer) the state is either no reaction or exactly one
//! [`ReactionKind`]. A toggle moves the state and adjusts the tallies in a
//! single step:
//!
//! | current   | requested `k` | new state | tallies                       |
//! |-----------|---------------|-----------|-------------------------------|
//! | `k`       | `k`           | none      | `k - 1`                       |
//! | none      | `k`           | `k`       | `k + 1`                       |
//! | `j != k`  | `k`           | `k`       | `j - 1`, `k + 1`              |
//!
//! Decrements saturate at zero.

use feed_types::{ReactionCounts, ReactionKind, Report};

/// The viewer's reaction together with the report's tallies.
///
/// Transitions consume the old value and return the new one, so there is no
/// window where the tallies and the viewer state disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReactionState {
    /// Tally per kind.
    pub counts: ReactionCounts,
    /// The viewer's active reaction.
    pub mine: Option<ReactionKind>,
}

impl ReactionState {
    /// Capture the reaction state of a report.
    pub fn of(report: &Report) -> Self {
        Self {
            counts: report.reactions,
            mine: report.my_reaction,
        }
    }

    /// Apply a toggle of `requested` and return the resulting state.
    pub fn on_toggle(self, requested: ReactionKind) -> Self {
        let mut counts = self.counts;
        let mine = match self.mine {
            Some(current) if current == requested => {
                counts.decrement(requested);
                None
            }
            Some(current) => {
                counts.decrement(current);
                counts.increment(requested);
                Some(requested)
            }
            None => {
                counts.increment(requested);
                Some(requested)
            }
        };
        Self { counts, mine }
    }
}

/// Toggle `requested` on a report in place.
pub fn toggle_reaction(report: &mut Report, requested: ReactionKind) {
    let next = ReactionState::of(report).on_toggle(requested);
    report.reactions = next.counts;
    report.my_reaction = next.mine;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use feed_types::ReportId;

    fn report() -> Report {
        Report {
            id: ReportId::new("r1"),
            pet_status: Default::default(),
            first_name: "Ana".into(),
            location: "Plaza".into(),
            description: String::new(),
            photo_url: None,
            created_at: Utc::now(),
            reactions: ReactionCounts::zero(),
            my_reaction: None,
            comments: Vec::new(),
            comments_count: 0,
            flags: Vec::new(),
        }
    }

    // ===========================================
    // Transition Table
    // ===========================================

    #[test]
    fn none_to_kind_increments() {
        let state = ReactionState::default().on_toggle(ReactionKind::Like);
        assert_eq!(state.mine, Some(ReactionKind::Like));
        assert_eq!(state.counts.like, 1);
    }

    #[test]
    fn same_kind_clears_and_decrements() {
        let state = ReactionState::default()
            .on_toggle(ReactionKind::Seen)
            .on_toggle(ReactionKind::Seen);
        assert_eq!(state.mine, None);
        assert_eq!(state.counts.seen, 0);
    }

    #[test]
    fn switching_kind_moves_the_count() {
        let mut r = report();
        r.reactions.like = 4;
        r.reactions.heart = 2;

        toggle_reaction(&mut r, ReactionKind::Like);
        toggle_reaction(&mut r, ReactionKind::Heart);

        assert_eq!(r.my_reaction, Some(ReactionKind::Heart));
        assert_eq!(r.reactions.like, 4);
        assert_eq!(r.reactions.heart, 3);
    }

    #[test]
    fn clearing_a_zero_tally_stays_at_zero() {
        // Viewer state says "help" but the server-side tally is already 0.
        let state = ReactionState {
            counts: ReactionCounts::zero(),
            mine: Some(ReactionKind::Help),
        };
        let next = state.on_toggle(ReactionKind::Help);
        assert_eq!(next.counts.help, 0);
        assert_eq!(next.mine, None);

        let switched = state.on_toggle(ReactionKind::Like);
        assert_eq!(switched.counts.help, 0);
        assert_eq!(switched.counts.like, 1);
    }

    // ===========================================
    // Parity Properties
    // ===========================================

    #[test]
    fn odd_toggles_end_active_even_toggles_end_cleared() {
        for kind in ReactionKind::ALL {
            for n in 1..=7u32 {
                let mut r = report();
                r.reactions.set(kind, 10);
                for _ in 0..n {
                    toggle_reaction(&mut r, kind);
                }
                if n % 2 == 1 {
                    assert_eq!(r.my_reaction, Some(kind));
                    assert_eq!(r.reactions.get(kind), 11);
                } else {
                    assert_eq!(r.my_reaction, None);
                    assert_eq!(r.reactions.get(kind), 10);
                }
            }
        }
    }

    #[test]
    fn at_most_one_active_reaction() {
        let mut r = report();
        let sequence = [
            ReactionKind::Like,
            ReactionKind::Heart,
            ReactionKind::Heart,
            ReactionKind::Helped,
            ReactionKind::Seen,
            ReactionKind::Help,
            ReactionKind::Like,
        ];
        for kind in sequence {
            toggle_reaction(&mut r, kind);
            let expected_total = u64::from(r.my_reaction.is_some());
            assert_eq!(r.reactions.total(), expected_total);
        }
    }
}
