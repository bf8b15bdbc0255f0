use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackerError};
use crate::installments::{InstallmentClock, InstallmentPosition, InstallmentTerms, ProjectedInstallment};
use crate::month::YearMonth;
use crate::types::InstallmentStatus;

/// a stored record whose derived installment fields can be recomputed
pub trait InstallmentRecord {
    fn terms(&self) -> &InstallmentTerms;

    fn apply_position(&mut self, position: InstallmentPosition);
}

/// result of a batch rollover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloverOutcome<R> {
    /// records still pending or active
    pub updated: Vec<R>,
    /// records whose last installment has passed
    pub completed: Vec<R>,
}

impl<R> RolloverOutcome<R> {
    pub fn len(&self) -> usize {
        self.updated.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.completed.is_empty()
    }

    /// both buckets, updated first
    pub fn into_all(self) -> Vec<R> {
        let mut all = self.updated;
        all.extend(self.completed);
        all
    }
}

/// lifecycle classification built on [`InstallmentClock`]
pub struct InstallmentState;

impl InstallmentState {
    /// current installment and status for raw terms, validating bounds first
    pub fn current_state(
        start_month: YearMonth,
        start_installment: u32,
        total_installments: u32,
        now: YearMonth,
    ) -> Result<InstallmentPosition> {
        let terms = InstallmentTerms::new(start_month, start_installment, total_installments)?;
        Ok(Self::derive(&terms, now))
    }

    /// current installment and status for validated terms
    ///
    /// Completion is tested before pending: a purchase whose whole schedule
    /// lies in the past is always completed.
    pub fn derive(terms: &InstallmentTerms, now: YearMonth) -> InstallmentPosition {
        let elapsed = InstallmentClock::months_elapsed(terms.start_month(), now);
        let raw = terms.start_installment() as i64 + elapsed;

        if raw > terms.total_installments() as i64 {
            InstallmentPosition {
                current_installment: terms.total_installments(),
                status: InstallmentStatus::Completed,
            }
        } else if raw < terms.start_installment() as i64 {
            InstallmentPosition {
                current_installment: terms.start_installment(),
                status: InstallmentStatus::Pending,
            }
        } else {
            // start_installment <= raw <= total, fits in u32
            InstallmentPosition {
                current_installment: raw as u32,
                status: InstallmentStatus::Active,
            }
        }
    }

    /// month in which installment 1 fell, given that `current_installment`
    /// is current in `now`
    ///
    /// An installment of 0 means the purchase has not started yet and is
    /// treated as 1. A purchase created from the result is anchored at
    /// installment 1.
    pub fn backfill_start_month(
        current_installment: u32,
        total_installments: u32,
        now: YearMonth,
    ) -> Result<YearMonth> {
        let current = current_installment.max(1);
        if total_installments == 0 || current > total_installments {
            return Err(TrackerError::InvalidInstallmentBounds {
                start_installment: current_installment,
                total_installments,
            });
        }

        Ok(InstallmentClock::months_ago(now, current - 1))
    }

    /// month-by-month projection starting at `now` for a purchase observed
    /// on `current_installment` this month
    ///
    /// The anchor is recentred on `(max(start_month, now), current_installment)`
    /// so a purchase that has not started keeps reporting its first
    /// installment until its start month.
    pub fn project_future(
        start_month: YearMonth,
        current_installment: u32,
        total_installments: u32,
        now: YearMonth,
        horizon_months: u32,
    ) -> Result<Vec<ProjectedInstallment>> {
        let anchor = start_month.max(now);
        let terms = InstallmentTerms::new(anchor, current_installment, total_installments)?;
        Ok(Self::project(&terms, now, horizon_months))
    }

    /// projection on a purchase's own anchor; stops after the first
    /// completed month
    pub fn project(terms: &InstallmentTerms, now: YearMonth, horizon_months: u32) -> Vec<ProjectedInstallment> {
        let mut projection = Vec::new();

        for offset in 0..horizon_months {
            let month = now.add_months(offset as i64);
            let position = Self::derive(terms, month);

            projection.push(ProjectedInstallment {
                month,
                installment: position.current_installment,
                status: position.status,
            });

            if position.status == InstallmentStatus::Completed {
                break;
            }
        }

        projection
    }

    /// recompute every record and split finished ones from the rest
    ///
    /// Prior derived fields are ignored, so the operation is idempotent for a
    /// fixed `now`. Input order is kept within each bucket.
    pub fn rollover<R, I>(records: I, now: YearMonth) -> RolloverOutcome<R>
    where
        R: InstallmentRecord,
        I: IntoIterator<Item = R>,
    {
        let mut outcome = RolloverOutcome {
            updated: Vec::new(),
            completed: Vec::new(),
        };

        for mut record in records {
            let position = Self::derive(record.terms(), now);
            record.apply_position(position);

            if position.status == InstallmentStatus::Completed {
                outcome.completed.push(record);
            } else {
                outcome.updated.push(record);
            }
        }

        outcome
    }
}
