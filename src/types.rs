use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a purchase
pub type PurchaseId = Uuid;

/// unique identifier for an income entry
pub type IncomeId = Uuid;

/// identifier of the user driving a dialog (chat id)
pub type UserId = i64;

/// lifecycle of a purchase relative to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// start month has not arrived yet
    Pending,
    /// some installment is due this month
    Active,
    /// every installment has been paid
    Completed,
}

impl InstallmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstallmentStatus::Completed)
    }
}

/// status selector used when listing purchases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    Only(InstallmentStatus),
    All,
}

impl StatusFilter {
    pub fn matches(&self, status: InstallmentStatus) -> bool {
        match self {
            StatusFilter::Only(wanted) => *wanted == status,
            StatusFilter::All => true,
        }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::Only(InstallmentStatus::Active)
    }
}

/// kind of income
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IncomeKind {
    #[default]
    Salary,
    Freelance,
    Other(String),
}

/// income received in a given month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: IncomeId,
    pub description: String,
    pub amount: Money,
    pub kind: IncomeKind,
    pub received_at: DateTime<Utc>,
}

/// user-supplied fields of an income that has not been recorded yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeDraft {
    pub description: String,
    pub amount: Money,
    pub kind: IncomeKind,
}
