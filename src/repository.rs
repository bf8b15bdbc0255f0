use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{Result, TrackerError};
use crate::installments::{InstallmentPosition, InstallmentRecord};
use crate::purchase::Purchase;
use crate::types::{Income, InstallmentStatus, PurchaseId, StatusFilter};

/// selects stored purchases; the default is active purchases on every card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseFilter {
    pub card: Option<String>,
    pub status: StatusFilter,
}

impl PurchaseFilter {
    /// every purchase regardless of status or card
    pub fn all() -> Self {
        Self {
            card: None,
            status: StatusFilter::All,
        }
    }

    pub fn with_status(status: InstallmentStatus) -> Self {
        Self {
            card: None,
            status: StatusFilter::Only(status),
        }
    }

    pub fn on_card(mut self, card: impl Into<String>) -> Self {
        self.card = Some(card.into());
        self
    }

    pub fn matches(&self, purchase: &Purchase) -> bool {
        let card_matches = match &self.card {
            Some(card) => purchase.is_on_card(card),
            None => true,
        };
        card_matches && self.status.matches(purchase.status())
    }
}

/// fields that may be written back to a stored purchase
///
/// Installment terms are fixed at registration and cannot be changed here.
/// The derived position can only come from [`PurchaseUpdate::derived_from`],
/// so callers cannot set an installment number or status by hand:
///
/// ```compile_fail
/// use installment_tracker_rs::{InstallmentStatus, PurchaseUpdate};
///
/// let update = PurchaseUpdate {
///     status: Some(InstallmentStatus::Pending),
///     ..PurchaseUpdate::default()
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseUpdate {
    pub description: Option<String>,
    pub card: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub installment_amount: Option<Money>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    position: Option<InstallmentPosition>,
}

impl PurchaseUpdate {
    /// the derived fields of a recomputed purchase plus a timestamp
    pub fn derived_from(purchase: &Purchase, updated_at: DateTime<Utc>) -> Self {
        Self {
            updated_at: Some(updated_at),
            position: Some(purchase.position()),
            ..Self::default()
        }
    }

    /// derived position this update carries, if any
    pub fn position(&self) -> Option<InstallmentPosition> {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// write the present fields onto `purchase`
    pub fn apply_to(self, purchase: &mut Purchase) {
        if let Some(description) = self.description {
            purchase.description = description;
        }
        if let Some(card) = self.card {
            purchase.card = card;
        }
        if let Some(category) = self.category {
            purchase.category = category;
        }
        if let Some(notes) = self.notes {
            purchase.notes = Some(notes);
        }
        if let Some(amount) = self.installment_amount {
            purchase.installment_amount = amount;
        }
        if let Some(position) = self.position {
            purchase.apply_position(position);
        }
        if let Some(updated_at) = self.updated_at {
            purchase.updated_at = updated_at;
        }
    }
}

/// storage of purchases
pub trait PurchaseRepository {
    /// matching purchases in insertion order
    fn list(&self, filter: &PurchaseFilter) -> Vec<Purchase>;

    fn get(&self, id: PurchaseId) -> Result<Purchase>;

    fn append(&mut self, purchase: Purchase) -> Result<Purchase>;

    fn update(&mut self, id: PurchaseId, update: PurchaseUpdate) -> Result<Purchase>;

    fn remove(&mut self, id: PurchaseId) -> Result<Purchase>;
}

/// storage of incomes
pub trait IncomeRepository {
    fn append_income(&mut self, income: Income) -> Result<Income>;

    fn list_incomes(&self) -> Vec<Income>;
}

/// in-memory store preserving insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    purchases: Vec<Purchase>,
    incomes: Vec<Income>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn purchase_count(&self) -> usize {
        self.purchases.len()
    }

    fn position(&self, id: PurchaseId) -> Result<usize> {
        self.purchases
            .iter()
            .position(|p| p.id == id)
            .ok_or(TrackerError::PurchaseNotFound { id })
    }
}

impl PurchaseRepository for InMemoryStore {
    fn list(&self, filter: &PurchaseFilter) -> Vec<Purchase> {
        self.purchases
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    fn get(&self, id: PurchaseId) -> Result<Purchase> {
        let index = self.position(id)?;
        Ok(self.purchases[index].clone())
    }

    fn append(&mut self, purchase: Purchase) -> Result<Purchase> {
        if self.purchases.iter().any(|p| p.id == purchase.id) {
            return Err(TrackerError::InvalidInput {
                message: format!("purchase {} already stored", purchase.id),
            });
        }
        self.purchases.push(purchase.clone());
        Ok(purchase)
    }

    fn update(&mut self, id: PurchaseId, update: PurchaseUpdate) -> Result<Purchase> {
        let index = self.position(id)?;
        let stored = &mut self.purchases[index];
        update.apply_to(stored);
        Ok(stored.clone())
    }

    fn remove(&mut self, id: PurchaseId) -> Result<Purchase> {
        let index = self.position(id)?;
        Ok(self.purchases.remove(index))
    }
}

impl IncomeRepository for InMemoryStore {
    fn append_income(&mut self, income: Income) -> Result<Income> {
        self.incomes.push(income.clone());
        Ok(income)
    }

    fn list_incomes(&self) -> Vec<Income> {
        self.incomes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::month::YearMonth;
    use crate::purchase::PurchaseDraft;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn purchase(description: &str, card: &str, current: u32, total: u32) -> Purchase {
        let draft = PurchaseDraft::builder()
            .description(description)
            .card(card)
            .total_amount(Money::from_major(100))
            .current_installment(current, total)
            .build()
            .unwrap();
        let now = YearMonth::new(2024, 6).unwrap();
        Purchase::open(draft, now, Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn test_default_filter_lists_active_only() {
        let mut store = InMemoryStore::new();
        let active = store.append(purchase("Desk", "Nubank", 2, 5)).unwrap();
        let mut finished = purchase("Chair", "Nubank", 1, 1);
        finished.refresh(YearMonth::new(2024, 8).unwrap());
        store.append(finished).unwrap();

        let listed = store.list(&PurchaseFilter::default());
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);

        assert_eq!(store.list(&PurchaseFilter::all()).len(), 2);
        assert_eq!(store.list(&PurchaseFilter::with_status(InstallmentStatus::Completed)).len(), 1);
    }

    #[test]
    fn test_card_filter_is_case_insensitive() {
        let mut store = InMemoryStore::new();
        store.append(purchase("Desk", "Nubank", 2, 5)).unwrap();
        store.append(purchase("Lamp", "Inter", 1, 3)).unwrap();

        let listed = store.list(&PurchaseFilter::default().on_card("NUBANK"));
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].description, "Desk");
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut store = InMemoryStore::new();
        for name in ["a", "b", "c"] {
            store.append(purchase(name, "Nubank", 1, 3)).unwrap();
        }
        let names: Vec<_> = store
            .list(&PurchaseFilter::all())
            .into_iter()
            .map(|p| p.description)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut store = InMemoryStore::new();
        let stored = store.append(purchase("Desk", "Nubank", 2, 5)).unwrap();

        let updated = store
            .update(
                stored.id,
                PurchaseUpdate {
                    notes: Some("office".to_string()),
                    ..PurchaseUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.notes.as_deref(), Some("office"));
        assert_eq!(updated.position(), stored.position());
        assert_eq!(updated.description, "Desk");
        assert_eq!(updated.terms, stored.terms);
        assert_eq!(store.get(stored.id).unwrap(), updated);
    }

    #[test]
    fn test_derived_fields_only_change_through_recomputation() {
        let mut store = InMemoryStore::new();
        let stored = store.append(purchase("Bike", "Nubank", 9, 10)).unwrap();

        // derived keys in a serialized update are ignored
        let update: PurchaseUpdate = serde_json::from_str(
            r#"{"description":"Road bike","current_installment":3,"status":"pending"}"#,
        )
        .unwrap();
        assert_eq!(update.position(), None);

        let edited = store.update(stored.id, update).unwrap();
        assert_eq!(edited.description, "Road bike");
        assert_eq!(edited.current_installment(), 9);
        assert_eq!(edited.status(), InstallmentStatus::Active);

        let mut later = edited.clone();
        later.refresh(YearMonth::new(2024, 7).unwrap());
        let stamp = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();

        let rolled = store
            .update(stored.id, PurchaseUpdate::derived_from(&later, stamp))
            .unwrap();
        assert_eq!(rolled.current_installment(), 10);
        assert_eq!(rolled.status(), InstallmentStatus::Active);
        assert_eq!(rolled.updated_at, stamp);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let mut store = InMemoryStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(store.get(id), Err(TrackerError::PurchaseNotFound { .. })));
        assert!(matches!(
            store.update(id, PurchaseUpdate::default()),
            Err(TrackerError::PurchaseNotFound { .. })
        ));
        assert!(matches!(store.remove(id), Err(TrackerError::PurchaseNotFound { .. })));
    }

    #[test]
    fn test_duplicate_append_is_rejected() {
        let mut store = InMemoryStore::new();
        let stored = store.append(purchase("Desk", "Nubank", 2, 5)).unwrap();
        assert!(store.append(stored).is_err());
        assert_eq!(store.purchase_count(), 1);
    }

    #[test]
    fn test_remove_returns_record() {
        let mut store = InMemoryStore::new();
        let stored = store.append(purchase("Desk", "Nubank", 2, 5)).unwrap();
        let removed = store.remove(stored.id).unwrap();
        assert_eq!(removed.id, stored.id);
        assert_eq!(store.purchase_count(), 0);
    }
}
