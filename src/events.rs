use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::month::YearMonth;
use crate::types::{IncomeId, InstallmentStatus, PurchaseId};

/// all events that can be emitted by the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // purchase lifecycle events
    PurchaseRegistered {
        purchase_id: PurchaseId,
        description: String,
        card: String,
        total_amount: Money,
        installment: u32,
        total_installments: u32,
        status: InstallmentStatus,
        timestamp: DateTime<Utc>,
    },
    PurchaseRemoved {
        purchase_id: PurchaseId,
        description: String,
        timestamp: DateTime<Utc>,
    },

    // rollover events
    InstallmentAdvanced {
        purchase_id: PurchaseId,
        from_installment: u32,
        to_installment: u32,
        month: YearMonth,
    },
    StatusChanged {
        purchase_id: PurchaseId,
        old_status: InstallmentStatus,
        new_status: InstallmentStatus,
        month: YearMonth,
    },
    PurchaseCompleted {
        purchase_id: PurchaseId,
        description: String,
        month: YearMonth,
    },
    RolloverApplied {
        month: YearMonth,
        updated: usize,
        completed: usize,
        timestamp: DateTime<Utc>,
    },

    // income events
    IncomeRecorded {
        income_id: IncomeId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// drain everything emitted so far
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
