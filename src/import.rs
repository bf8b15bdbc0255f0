use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{Result, TrackerError};
use crate::purchase::{PurchaseDraft, PurchaseDraftBuilder};
use crate::types::PurchaseId;

/// one parsed line of a bulk import
///
/// Format: `DESCRIPTION | INSTALLMENT_VALUE | CURRENT/TOTAL | CARD`, e.g.
/// `Headphones | 61,90 | 6/10 | Nubank`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportLine {
    pub description: String,
    pub installment_amount: Money,
    pub current_installment: u32,
    pub total_installments: u32,
    pub card: String,
}

impl ImportLine {
    pub fn parse(line: &str, line_number: usize) -> Result<Self> {
        let invalid = |reason: &str| TrackerError::InvalidImportLine {
            line_number,
            reason: reason.to_string(),
        };

        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(invalid("expected 4 fields separated by '|'"));
        }

        let description = fields[0];
        if description.is_empty() {
            return Err(invalid("description is empty"));
        }

        let installment_amount = Money::parse_user(fields[1])
            .map_err(|_| invalid("installment value is not a number"))?;
        if !installment_amount.is_positive() {
            return Err(invalid("installment value must be positive"));
        }

        let (current, total) = fields[2]
            .split_once('/')
            .ok_or_else(|| invalid("installments must look like CURRENT/TOTAL"))?;
        let current_installment: u32 = current
            .trim()
            .parse()
            .map_err(|_| invalid("current installment is not a number"))?;
        let total_installments: u32 = total
            .trim()
            .parse()
            .map_err(|_| invalid("total installments is not a number"))?;
        if total_installments == 0 || current_installment > total_installments {
            return Err(invalid("current installment exceeds total"));
        }

        let card = fields[3];
        if card.is_empty() {
            return Err(invalid("card is empty"));
        }

        Ok(Self {
            description: description.to_string(),
            installment_amount,
            current_installment,
            total_installments,
            card: card.to_string(),
        })
    }

    /// draft back-filled from the current installment
    pub fn into_draft(self) -> Result<PurchaseDraft> {
        PurchaseDraftBuilder::new()
            .description(self.description)
            .card(self.card)
            .installment_amount(self.installment_amount)
            .current_installment(self.current_installment, self.total_installments)
            .build()
    }
}

/// non-blank lines with their 1-based line numbers
pub fn import_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// a line that could not be imported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

/// outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: Vec<PurchaseId>,
    pub failures: Vec<ImportFailure>,
    /// non-blank lines seen
    pub total: usize,
}

impl ImportReport {
    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
