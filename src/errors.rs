use thiserror::Error;

use crate::types::{PurchaseId, UserId};

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("invalid month format: {input:?} (expected YYYY-MM)")]
    InvalidMonthFormat {
        input: String,
    },

    #[error("invalid installment bounds: installment {start_installment} of {total_installments}")]
    InvalidInstallmentBounds {
        start_installment: u32,
        total_installments: u32,
    },

    #[error("invalid amount: {input:?}")]
    InvalidAmount {
        input: String,
    },

    #[error("invalid import line {line_number}: {reason}")]
    InvalidImportLine {
        line_number: usize,
        reason: String,
    },

    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    #[error("purchase not found: {id}")]
    PurchaseNotFound {
        id: PurchaseId,
    },

    #[error("no active session for user {user}")]
    NoActiveSession {
        user: UserId,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
