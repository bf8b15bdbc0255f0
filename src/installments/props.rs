//! Property-based tests for installment state derivation.
//!
//! - back-filled start months land on the requested installment
//! - derivation is deterministic and ignores stored state
//! - status moves pending -> active -> completed as time advances
//! - projections respect the horizon and never run past completion

use proptest::prelude::*;

use super::{InstallmentPosition, InstallmentRecord, InstallmentState, InstallmentTerms};
use crate::month::YearMonth;
use crate::types::InstallmentStatus;

/// months between 2000-01 and 2049-12
fn any_month() -> impl Strategy<Value = YearMonth> {
    (2000i32..2050, 1u32..=12).prop_map(|(year, month)| {
        YearMonth::new(year, month).unwrap()
    })
}

/// valid (start_installment, total_installments) pairs
fn installment_bounds() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=48).prop_flat_map(|total| (1u32..=total, Just(total)))
}

fn any_terms() -> impl Strategy<Value = InstallmentTerms> {
    (any_month(), installment_bounds()).prop_map(|(month, (start, total))| {
        InstallmentTerms::new(month, start, total).unwrap()
    })
}

#[derive(Debug, Clone, PartialEq)]
struct Tracked {
    terms: InstallmentTerms,
    position: Option<InstallmentPosition>,
}

impl InstallmentRecord for Tracked {
    fn terms(&self) -> &InstallmentTerms {
        &self.terms
    }

    fn apply_position(&mut self, position: InstallmentPosition) {
        self.position = Some(position);
    }
}

fn rank(status: InstallmentStatus) -> u8 {
    match status {
        InstallmentStatus::Pending => 0,
        InstallmentStatus::Active => 1,
        InstallmentStatus::Completed => 2,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// back-filling then deriving yields the installment that was asked for
    #[test]
    fn prop_backfill_round_trip(
        now in any_month(),
        (current, total) in installment_bounds(),
    ) {
        let start = InstallmentState::backfill_start_month(current, total, now).unwrap();
        let position = InstallmentState::current_state(start, 1, total, now).unwrap();

        prop_assert_eq!(position.current_installment, current);
        prop_assert_eq!(position.status, InstallmentStatus::Active);
    }

    /// the current installment always stays within the terms
    #[test]
    fn prop_current_installment_in_bounds(terms in any_terms(), now in any_month()) {
        let position = terms.position_at(now);

        prop_assert!(position.current_installment >= terms.start_installment());
        prop_assert!(position.current_installment <= terms.total_installments());
    }

    /// status never goes backwards as the month advances
    #[test]
    fn prop_status_is_monotonic(terms in any_terms(), now in any_month(), step in 1i64..60) {
        let earlier = terms.position_at(now);
        let later = terms.position_at(now.add_months(step));

        prop_assert!(rank(later.status) >= rank(earlier.status));
        prop_assert!(later.current_installment >= earlier.current_installment);
    }

    /// completion happens exactly after the final month
    #[test]
    fn prop_completed_after_final_month(terms in any_terms()) {
        let last = terms.position_at(terms.final_month());
        let after = terms.position_at(terms.final_month().next());

        prop_assert_eq!(last.status, InstallmentStatus::Active);
        prop_assert_eq!(last.current_installment, terms.total_installments());
        prop_assert_eq!(after.status, InstallmentStatus::Completed);
    }

    /// rolling over an already rolled-over batch changes nothing
    #[test]
    fn prop_rollover_is_idempotent(
        batch in prop::collection::vec(any_terms(), 0..20),
        now in any_month(),
    ) {
        let records: Vec<_> = batch
            .into_iter()
            .map(|terms| Tracked { terms, position: None })
            .collect();
        let count = records.len();

        let first = InstallmentState::rollover(records, now);
        let second = InstallmentState::rollover(first.clone().into_all(), now);

        prop_assert_eq!(first.len(), count);
        prop_assert_eq!(first, second);
    }

    /// projections are bounded by the horizon and end at the first completed month
    #[test]
    fn prop_projection_bounds(terms in any_terms(), now in any_month(), horizon in 0u32..36) {
        let projection = terms.project(now, horizon);

        prop_assert!(projection.len() <= horizon as usize);

        let completed: Vec<_> = projection
            .iter()
            .filter(|p| p.status == InstallmentStatus::Completed)
            .collect();
        prop_assert!(completed.len() <= 1);
        if completed.len() == 1 {
            prop_assert_eq!(projection.last().map(|p| p.status), Some(InstallmentStatus::Completed));
        }

        for (offset, entry) in projection.iter().enumerate() {
            prop_assert_eq!(entry.month, now.add_months(offset as i64));
        }
    }
}
