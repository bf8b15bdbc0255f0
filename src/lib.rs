pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod import;
pub mod installments;
pub mod month;
pub mod purchase;
pub mod report;
pub mod repository;
pub mod session;
pub mod tracker;
pub mod types;
pub mod view;

// re-export key types
pub use config::TrackerConfig;
pub use decimal::Money;
pub use errors::{Result, TrackerError};
pub use events::{Event, EventStore};
pub use import::{ImportFailure, ImportLine, ImportReport};
pub use installments::{
    InstallmentClock, InstallmentPosition, InstallmentRecord, InstallmentState, InstallmentTerms,
    ProjectedInstallment, RolloverOutcome,
};
pub use month::YearMonth;
pub use purchase::{InstallmentAnchor, Purchase, PurchaseDraft, PurchaseDraftBuilder};
pub use report::{CardStatement, CardTotal, MonthlySummary, Statement, StatementLine};
pub use repository::{
    InMemoryStore, IncomeRepository, PurchaseFilter, PurchaseRepository, PurchaseUpdate,
};
pub use session::{Draft, Flow, Prompt, SessionStep, SessionStore};
pub use tracker::{InstallmentTracker, RolloverReport};
pub use types::{
    Income, IncomeDraft, IncomeId, IncomeKind, InstallmentStatus, PurchaseId, StatusFilter, UserId,
};
pub use view::{format_installment, PurchaseListView, PurchaseView};

// re-export external dependencies that users will need
pub use chrono;
pub use chrono_tz;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
