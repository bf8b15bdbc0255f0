use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{Result, TrackerError};
use crate::installments::{InstallmentPosition, InstallmentRecord, InstallmentState, InstallmentTerms};
use crate::month::YearMonth;
use crate::types::{InstallmentStatus, PurchaseId};

pub const DEFAULT_CATEGORY: &str = "General";

/// a tracked installment purchase
///
/// `current_installment` and `status` are derived from `terms`. They are
/// private and only written through [`InstallmentRecord::apply_position`].
/// A deserialized snapshot may carry stale or inconsistent values; readers
/// here clamp them to the terms and [`Purchase::refresh`] recomputes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub description: String,
    pub card: String,
    pub category: String,
    pub notes: Option<String>,
    pub installment_amount: Money,
    pub total_amount: Money,
    pub terms: InstallmentTerms,
    current_installment: u32,
    status: InstallmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    /// create a purchase from a draft, resolving its anchor against `now`
    pub fn open(draft: PurchaseDraft, now: YearMonth, timestamp: DateTime<Utc>) -> Result<Self> {
        let terms = draft.anchor.resolve(now)?;

        if !draft.total_amount.is_positive() {
            return Err(TrackerError::InvalidAmount {
                input: draft.total_amount.to_string(),
            });
        }

        let installment_amount = draft.total_amount.split(terms.total_installments());
        if !installment_amount.is_positive() {
            return Err(TrackerError::InvalidAmount {
                input: installment_amount.to_string(),
            });
        }

        let position = InstallmentState::derive(&terms, now);

        Ok(Self {
            id: Uuid::new_v4(),
            description: draft.description,
            card: draft.card,
            category: draft.category,
            notes: draft.notes,
            installment_amount,
            total_amount: draft.total_amount,
            terms,
            current_installment: position.current_installment,
            status: position.status,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    pub fn position(&self) -> InstallmentPosition {
        InstallmentPosition {
            current_installment: self.current_installment,
            status: self.status,
        }
    }

    pub fn current_installment(&self) -> u32 {
        self.current_installment
    }

    pub fn status(&self) -> InstallmentStatus {
        self.status
    }

    pub fn total_installments(&self) -> u32 {
        self.terms.total_installments()
    }

    /// "current/total", e.g. "7/10"
    pub fn installment_label(&self) -> String {
        self.position().label(self.total_installments())
    }

    /// recompute derived fields for `now`; returns the previous position
    pub fn refresh(&mut self, now: YearMonth) -> InstallmentPosition {
        let previous = self.position();
        self.apply_position(self.terms.position_at(now));
        previous
    }

    /// installments not yet paid, counting the current one
    ///
    /// The stored installment is clamped to the terms first.
    pub fn remaining_installments(&self) -> u32 {
        let total = self.total_installments();
        let start = self.terms.start_installment();

        match self.status {
            InstallmentStatus::Completed => 0,
            InstallmentStatus::Pending => total - start + 1,
            InstallmentStatus::Active => total - self.current_installment.clamp(start, total) + 1,
        }
    }

    pub fn remaining_amount(&self) -> Money {
        self.installment_amount.times(self.remaining_installments())
    }

    pub fn is_on_card(&self, card: &str) -> bool {
        self.card.eq_ignore_ascii_case(card.trim())
    }
}

impl InstallmentRecord for Purchase {
    fn terms(&self) -> &InstallmentTerms {
        &self.terms
    }

    fn apply_position(&mut self, position: InstallmentPosition) {
        self.current_installment = position.current_installment;
        self.status = position.status;
    }
}

/// how a new purchase is placed on the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentAnchor {
    /// "this month I am paying installment `current` of `total`"
    CurrentInstallment { current: u32, total: u32 },
    /// explicit start month and installment
    StartMonth { terms: InstallmentTerms },
}

impl InstallmentAnchor {
    /// terms for a purchase registered during `now`
    ///
    /// A back-filled purchase is anchored on installment 1 of the computed
    /// start month.
    pub fn resolve(&self, now: YearMonth) -> Result<InstallmentTerms> {
        match *self {
            InstallmentAnchor::CurrentInstallment { current, total } => {
                let start_month = InstallmentState::backfill_start_month(current, total, now)?;
                InstallmentTerms::new(start_month, 1, total)
            }
            InstallmentAnchor::StartMonth { terms } => Ok(terms),
        }
    }

    pub fn total_installments(&self) -> u32 {
        match self {
            InstallmentAnchor::CurrentInstallment { total, .. } => *total,
            InstallmentAnchor::StartMonth { terms } => terms.total_installments(),
        }
    }
}

/// user-supplied fields of a purchase that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDraft {
    pub description: String,
    pub card: String,
    pub category: String,
    pub notes: Option<String>,
    pub total_amount: Money,
    pub anchor: InstallmentAnchor,
}

impl PurchaseDraft {
    pub fn builder() -> PurchaseDraftBuilder {
        PurchaseDraftBuilder::new()
    }
}

/// builder for purchase drafts
#[derive(Debug, Clone, Default)]
pub struct PurchaseDraftBuilder {
    description: Option<String>,
    card: Option<String>,
    category: Option<String>,
    notes: Option<String>,
    total_amount: Option<Money>,
    installment_amount: Option<Money>,
    anchor: Option<InstallmentAnchor>,
}

impl PurchaseDraftBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn card(mut self, card: impl Into<String>) -> Self {
        self.card = Some(card.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn total_amount(mut self, amount: Money) -> Self {
        self.total_amount = Some(amount);
        self
    }

    /// per-installment value; the total becomes value x installments
    pub fn installment_amount(mut self, amount: Money) -> Self {
        self.installment_amount = Some(amount);
        self
    }

    /// currently on installment `current` of `total`
    pub fn current_installment(mut self, current: u32, total: u32) -> Self {
        self.anchor = Some(InstallmentAnchor::CurrentInstallment { current, total });
        self
    }

    pub fn terms(mut self, terms: InstallmentTerms) -> Self {
        self.anchor = Some(InstallmentAnchor::StartMonth { terms });
        self
    }

    pub fn build(self) -> Result<PurchaseDraft> {
        let description = required_text(self.description, "description")?;
        let card = required_text(self.card, "card")?;

        let anchor = self.anchor.ok_or(TrackerError::InvalidInput {
            message: "installments are required".to_string(),
        })?;

        let total_amount = match (self.total_amount, self.installment_amount) {
            (Some(total), _) => total,
            (None, Some(each)) => each.times(anchor.total_installments()),
            (None, None) => {
                return Err(TrackerError::InvalidInput {
                    message: "amount is required".to_string(),
                })
            }
        };

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Ok(PurchaseDraft {
            description,
            card,
            category,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            total_amount,
            anchor,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TrackerError::InvalidInput {
            message: format!("{} is required", field),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_builder_defaults_and_trimming() {
        let draft = PurchaseDraft::builder()
            .description("  Headphones ")
            .card(" Nubank")
            .total_amount(Money::from_major(619))
            .current_installment(6, 10)
            .build()
            .unwrap();

        assert_eq!(draft.description, "Headphones");
        assert_eq!(draft.card, "Nubank");
        assert_eq!(draft.category, DEFAULT_CATEGORY);
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn test_builder_requires_fields() {
        let err = PurchaseDraft::builder()
            .card("Nubank")
            .total_amount(Money::from_major(10))
            .current_installment(1, 2)
            .build()
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput { message } if message.contains("description")));

        let err = PurchaseDraft::builder()
            .description("Desk")
            .card("Nubank")
            .current_installment(1, 2)
            .build()
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput { .. }));
    }

    #[test]
    fn test_builder_installment_amount_sets_total() {
        let draft = PurchaseDraft::builder()
            .description("Phone")
            .card("Inter")
            .installment_amount(Money::from_decimal(dec!(161.90)))
            .current_installment(12, 14)
            .build()
            .unwrap();

        assert_eq!(draft.total_amount, Money::from_decimal(dec!(2266.60)));
    }

    #[test]
    fn test_open_backfills_start_month() {
        let draft = PurchaseDraft::builder()
            .description("Headphones")
            .card("Nubank")
            .total_amount(Money::from_major(619))
            .current_installment(6, 10)
            .build()
            .unwrap();

        let purchase = Purchase::open(draft, ym(2024, 6), timestamp()).unwrap();

        assert_eq!(purchase.terms.start_month(), ym(2024, 1));
        assert_eq!(purchase.terms.start_installment(), 1);
        assert_eq!(purchase.current_installment, 6);
        assert_eq!(purchase.status, InstallmentStatus::Active);
        assert_eq!(purchase.installment_amount, Money::from_decimal(dec!(61.90)));
        assert_eq!(purchase.installment_label(), "6/10");
        assert_eq!(purchase.created_at, purchase.updated_at);
    }

    #[test]
    fn test_open_with_explicit_future_terms_is_pending() {
        let draft = PurchaseDraft::builder()
            .description("Course")
            .card("Itau")
            .total_amount(Money::from_major(1200))
            .terms(InstallmentTerms::parse("2024-09", 1, 12).unwrap())
            .build()
            .unwrap();

        let purchase = Purchase::open(draft, ym(2024, 6), timestamp()).unwrap();
        assert_eq!(purchase.status, InstallmentStatus::Pending);
        assert_eq!(purchase.remaining_installments(), 12);
        assert_eq!(purchase.remaining_amount(), Money::from_major(1200));
    }

    #[test]
    fn test_open_rejects_non_positive_amount() {
        let draft = PurchaseDraft::builder()
            .description("Refund")
            .card("Nubank")
            .total_amount(Money::from_major(-50))
            .current_installment(1, 1)
            .build()
            .unwrap();

        let err = Purchase::open(draft, ym(2024, 6), timestamp()).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidAmount { .. }));
    }

    #[test]
    fn test_open_rejects_bad_bounds() {
        let draft = PurchaseDraft::builder()
            .description("TV")
            .card("Nubank")
            .total_amount(Money::from_major(3000))
            .current_installment(11, 10)
            .build()
            .unwrap();

        let err = Purchase::open(draft, ym(2024, 6), timestamp()).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInstallmentBounds { .. }));
    }

    #[test]
    fn test_refresh_and_remaining() {
        let draft = PurchaseDraft::builder()
            .description("Bike")
            .card("Nubank")
            .total_amount(Money::from_major(1000))
            .current_installment(9, 10)
            .build()
            .unwrap();
        let mut purchase = Purchase::open(draft, ym(2024, 6), timestamp()).unwrap();
        assert_eq!(purchase.remaining_installments(), 2);
        assert_eq!(purchase.remaining_amount(), Money::from_major(200));

        let previous = purchase.refresh(ym(2024, 8));
        assert_eq!(previous.current_installment, 9);
        assert_eq!(purchase.status, InstallmentStatus::Completed);
        assert_eq!(purchase.current_installment, 10);
        assert_eq!(purchase.remaining_installments(), 0);
        assert!(purchase.remaining_amount().is_zero());
    }

    #[test]
    fn test_inconsistent_snapshot_is_clamped() {
        let draft = PurchaseDraft::builder()
            .description("Bike")
            .card("Nubank")
            .total_amount(Money::from_major(1000))
            .current_installment(9, 10)
            .build()
            .unwrap();
        let purchase = Purchase::open(draft, ym(2024, 6), timestamp()).unwrap();

        let mut snapshot = serde_json::to_value(&purchase).unwrap();
        snapshot["current_installment"] = serde_json::json!(12);
        let mut stored: Purchase = serde_json::from_value(snapshot).unwrap();

        assert_eq!(stored.current_installment(), 12);
        assert_eq!(stored.remaining_installments(), 1);
        assert_eq!(stored.remaining_amount(), Money::from_major(100));

        stored.refresh(ym(2024, 6));
        assert_eq!(stored.current_installment(), 9);
        assert_eq!(stored.remaining_installments(), 2);
    }

    #[test]
    fn test_card_match_is_case_insensitive() {
        let draft = PurchaseDraft::builder()
            .description("Lamp")
            .card("Nubank")
            .total_amount(Money::from_major(90))
            .current_installment(1, 3)
            .build()
            .unwrap();
        let purchase = Purchase::open(draft, ym(2024, 6), timestamp()).unwrap();

        assert!(purchase.is_on_card("nubank"));
        assert!(purchase.is_on_card(" NUBANK "));
        assert!(!purchase.is_on_card("Inter"));
    }
}
