pub mod clock;
pub mod state;

#[cfg(test)]
mod props;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackerError};
use crate::month::YearMonth;
use crate::types::InstallmentStatus;

pub use clock::InstallmentClock;
pub use state::{InstallmentRecord, InstallmentState, RolloverOutcome};

/// temporal anchor of a purchase
///
/// `start_installment` was the current installment during `start_month`.
/// Both installment numbers are validated on construction, so every
/// computation downstream can assume `1 <= start_installment <= total_installments`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TermsRecord", into = "TermsRecord")]
pub struct InstallmentTerms {
    start_month: YearMonth,
    start_installment: u32,
    total_installments: u32,
}

impl InstallmentTerms {
    pub fn new(start_month: YearMonth, start_installment: u32, total_installments: u32) -> Result<Self> {
        if total_installments == 0
            || start_installment == 0
            || start_installment > total_installments
        {
            return Err(TrackerError::InvalidInstallmentBounds {
                start_installment,
                total_installments,
            });
        }

        Ok(Self {
            start_month,
            start_installment,
            total_installments,
        })
    }

    /// parse the start month from its text form, then validate bounds
    pub fn parse(start_month: &str, start_installment: u32, total_installments: u32) -> Result<Self> {
        Self::new(YearMonth::parse(start_month)?, start_installment, total_installments)
    }

    pub fn start_month(&self) -> YearMonth {
        self.start_month
    }

    pub fn start_installment(&self) -> u32 {
        self.start_installment
    }

    pub fn total_installments(&self) -> u32 {
        self.total_installments
    }

    /// derived position as of `now`
    pub fn position_at(&self, now: YearMonth) -> InstallmentPosition {
        InstallmentState::derive(self, now)
    }

    /// month in which the last installment falls
    pub fn final_month(&self) -> YearMonth {
        self.start_month
            .add_months((self.total_installments - self.start_installment) as i64)
    }

    /// projection of the next `horizon_months` months starting at `now`
    pub fn project(&self, now: YearMonth, horizon_months: u32) -> Vec<ProjectedInstallment> {
        InstallmentState::project(self, now, horizon_months)
    }
}

#[derive(Serialize, Deserialize)]
struct TermsRecord {
    start_month: YearMonth,
    start_installment: u32,
    total_installments: u32,
}

impl TryFrom<TermsRecord> for InstallmentTerms {
    type Error = TrackerError;

    fn try_from(record: TermsRecord) -> Result<Self> {
        InstallmentTerms::new(record.start_month, record.start_installment, record.total_installments)
    }
}

impl From<InstallmentTerms> for TermsRecord {
    fn from(terms: InstallmentTerms) -> Self {
        TermsRecord {
            start_month: terms.start_month,
            start_installment: terms.start_installment,
            total_installments: terms.total_installments,
        }
    }
}

/// current installment number and lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPosition {
    pub current_installment: u32,
    pub status: InstallmentStatus,
}

impl InstallmentPosition {
    /// "current/total", e.g. "12/14"
    pub fn label(&self, total_installments: u32) -> String {
        format!("{}/{}", self.current_installment, total_installments)
    }
}

/// one month of a forward projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedInstallment {
    pub month: YearMonth,
    pub installment: u32,
    pub status: InstallmentStatus,
}
