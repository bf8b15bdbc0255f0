use std::collections::HashMap;

use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TrackerConfig;
use crate::errors::{Result, TrackerError};
use crate::events::{Event, EventStore};
use crate::import::{import_lines, ImportFailure, ImportLine, ImportReport};
use crate::installments::{InstallmentPosition, InstallmentState, ProjectedInstallment};
use crate::month::YearMonth;
use crate::purchase::{Purchase, PurchaseDraft};
use crate::report::{MonthlySummary, Statement};
use crate::repository::{IncomeRepository, PurchaseFilter, PurchaseRepository, PurchaseUpdate};
use crate::types::{Income, IncomeDraft, InstallmentStatus, PurchaseId};

/// what a rollover run changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloverReport {
    pub month: YearMonth,
    /// purchases still pending or active after the run
    pub updated: usize,
    /// purchases completed after the run
    pub completed: usize,
    /// purchases whose installment number moved
    pub advanced: Vec<PurchaseId>,
    /// purchases that became completed during this run
    pub newly_completed: Vec<PurchaseId>,
    /// purchases the store refused to write; they keep their previous state
    pub failed: Vec<PurchaseId>,
}

impl RolloverReport {
    pub fn changed(&self) -> bool {
        !self.advanced.is_empty() || !self.newly_completed.is_empty()
    }

    /// every recomputed record was written back
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// installment tracking service over a store
///
/// Every write takes `&mut self`; one tracker is the single writer of its
/// store.
pub struct InstallmentTracker<S> {
    store: S,
    config: TrackerConfig,
    events: EventStore,
    last_rollover: Option<YearMonth>,
}

impl<S> InstallmentTracker<S>
where
    S: PurchaseRepository + IncomeRepository,
{
    pub fn new(store: S, config: TrackerConfig) -> Self {
        Self {
            store,
            config,
            events: EventStore::new(),
            last_rollover: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    pub fn last_rollover(&self) -> Option<YearMonth> {
        self.last_rollover
    }

    /// drain emitted events
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// store a new purchase anchored on the current month
    pub fn register(&mut self, draft: PurchaseDraft, time: &SafeTimeProvider) -> Result<Purchase> {
        let now = self.config.current_month(time);
        let purchase = Purchase::open(draft, now, time.now())?;
        let stored = self.store.append(purchase)?;

        tracing::info!(
            purchase_id = %stored.id,
            card = %stored.card,
            installment = %stored.installment_label(),
            status = ?stored.status(),
            "Registered purchase"
        );

        self.events.emit(Event::PurchaseRegistered {
            purchase_id: stored.id,
            description: stored.description.clone(),
            card: stored.card.clone(),
            total_amount: stored.total_amount,
            installment: stored.current_installment(),
            total_installments: stored.total_installments(),
            status: stored.status(),
            timestamp: stored.created_at,
        });

        Ok(stored)
    }

    /// register every valid `DESCRIPTION | VALUE | CURRENT/TOTAL | CARD` line
    ///
    /// Bad lines are reported and do not stop the import.
    pub fn import(&mut self, text: &str, time: &SafeTimeProvider) -> ImportReport {
        let mut report = ImportReport::default();

        for (line_number, line) in import_lines(text) {
            report.total += 1;

            let registered = ImportLine::parse(line, line_number)
                .and_then(ImportLine::into_draft)
                .and_then(|draft| self.register(draft, time));

            match registered {
                Ok(purchase) => report.imported.push(purchase.id),
                Err(err) => {
                    let reason = match err {
                        TrackerError::InvalidImportLine { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    tracing::warn!(line_number, reason = %reason, "Skipped import line");
                    report.failures.push(ImportFailure {
                        line_number,
                        line: line.to_string(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            imported = report.imported.len(),
            failed = report.failures.len(),
            total = report.total,
            "Import finished"
        );

        report
    }

    /// purchases with derived fields recomputed for the current month
    ///
    /// The recomputed values are not written back.
    pub fn list(&self, filter: &PurchaseFilter, time: &SafeTimeProvider) -> Vec<Purchase> {
        let now = self.config.current_month(time);
        let candidates = PurchaseFilter {
            card: filter.card.clone(),
            ..PurchaseFilter::all()
        };

        self.store
            .list(&candidates)
            .into_iter()
            .map(|mut purchase| {
                purchase.refresh(now);
                purchase
            })
            .filter(|purchase| filter.status.matches(purchase.status()))
            .collect()
    }

    pub fn get(&self, id: PurchaseId, time: &SafeTimeProvider) -> Result<Purchase> {
        let mut purchase = self.store.get(id)?;
        purchase.refresh(self.config.current_month(time));
        Ok(purchase)
    }

    /// installments charged in `month`, per card
    pub fn statement(&self, month: YearMonth) -> Statement {
        let purchases = self.store.list(&PurchaseFilter::all());
        Statement::build(month, &purchases)
    }

    pub fn current_statement(&self, time: &SafeTimeProvider) -> Statement {
        self.statement(self.config.current_month(time))
    }

    pub fn next_statement(&self, time: &SafeTimeProvider) -> Statement {
        self.statement(self.config.current_month(time).next())
    }

    /// this month's income against this month's installments
    pub fn summary(&self, time: &SafeTimeProvider) -> MonthlySummary {
        let month = self.config.current_month(time);
        let purchases = self.store.list(&PurchaseFilter::all());
        let incomes = self.store.list_incomes();
        MonthlySummary::build(month, &purchases, &incomes, self.config.timezone)
    }

    /// sorted card names with an active purchase this month
    pub fn cards(&self, time: &SafeTimeProvider) -> Vec<String> {
        let mut cards: Vec<String> = self
            .list(&PurchaseFilter::default(), time)
            .into_iter()
            .map(|p| p.card)
            .collect();

        cards.sort_by_key(|card| card.to_lowercase());
        cards.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        cards
    }

    /// month-by-month projection for one purchase, starting this month
    pub fn upcoming(
        &self,
        id: PurchaseId,
        time: &SafeTimeProvider,
        horizon_months: Option<u32>,
    ) -> Result<Vec<ProjectedInstallment>> {
        let purchase = self.store.get(id)?;
        let now = self.config.current_month(time);
        let horizon = horizon_months.unwrap_or(self.config.projection_months);
        Ok(purchase.terms.project(now, horizon))
    }

    /// recompute every stored purchase for the current month and write the
    /// result back
    ///
    /// `updated_at` is stamped on every record, changed or not. A record the
    /// store fails to write is skipped and listed in
    /// [`RolloverReport::failed`]; the rest are still written. The month is
    /// only marked as rolled over when nothing failed, so the next run retries
    /// and recomputation of the written records is a no-op.
    pub fn run_rollover(&mut self, time: &SafeTimeProvider) -> Result<RolloverReport> {
        let month = self.config.current_month(time);
        let stamp = time.now();

        let stored = self.store.list(&PurchaseFilter::all());
        let previous: HashMap<PurchaseId, InstallmentPosition> =
            stored.iter().map(|p| (p.id, p.position())).collect();

        let outcome = InstallmentState::rollover(stored, month);

        let mut report = RolloverReport {
            month,
            updated: outcome.updated.len(),
            completed: outcome.completed.len(),
            advanced: Vec::new(),
            newly_completed: Vec::new(),
            failed: Vec::new(),
        };

        for purchase in outcome.into_all() {
            if let Err(err) = self
                .store
                .update(purchase.id, PurchaseUpdate::derived_from(&purchase, stamp))
            {
                tracing::warn!(purchase_id = %purchase.id, error = %err, "Rollover write failed");
                report.failed.push(purchase.id);
                continue;
            }

            let Some(before) = previous.get(&purchase.id).copied() else {
                continue;
            };
            let after = purchase.position();
            if before == after {
                continue;
            }

            tracing::debug!(
                purchase_id = %purchase.id,
                from = %before.label(purchase.total_installments()),
                to = %after.label(purchase.total_installments()),
                status = ?after.status,
                "Purchase rolled over"
            );

            if before.current_installment != after.current_installment {
                report.advanced.push(purchase.id);
                self.events.emit(Event::InstallmentAdvanced {
                    purchase_id: purchase.id,
                    from_installment: before.current_installment,
                    to_installment: after.current_installment,
                    month,
                });
            }

            if before.status != after.status {
                self.events.emit(Event::StatusChanged {
                    purchase_id: purchase.id,
                    old_status: before.status,
                    new_status: after.status,
                    month,
                });

                if after.status == InstallmentStatus::Completed {
                    report.newly_completed.push(purchase.id);
                    self.events.emit(Event::PurchaseCompleted {
                        purchase_id: purchase.id,
                        description: purchase.description.clone(),
                        month,
                    });
                }
            }
        }

        if report.is_complete() {
            self.last_rollover = Some(month);
        }
        self.events.emit(Event::RolloverApplied {
            month,
            updated: report.updated,
            completed: report.completed,
            timestamp: stamp,
        });

        tracing::info!(
            month = %month,
            updated = report.updated,
            completed = report.completed,
            advanced = report.advanced.len(),
            newly_completed = report.newly_completed.len(),
            failed = report.failed.len(),
            "Rollover applied"
        );

        Ok(report)
    }

    /// local day has reached `rollover_day` and this month has not rolled over yet
    pub fn rollover_due(&self, time: &SafeTimeProvider) -> bool {
        let month = self.config.current_month(time);
        let already_ran = self.last_rollover.map_or(false, |last| last >= month);
        !already_ran && self.config.local_day(time) >= self.config.rollover_day
    }

    pub fn run_rollover_if_due(&mut self, time: &SafeTimeProvider) -> Result<Option<RolloverReport>> {
        if !self.rollover_due(time) {
            tracing::debug!(last_rollover = ?self.last_rollover, "Rollover not due");
            return Ok(None);
        }
        self.run_rollover(time).map(Some)
    }

    pub fn record_income(&mut self, draft: IncomeDraft, time: &SafeTimeProvider) -> Result<Income> {
        let description = draft.description.trim().to_string();
        if description.is_empty() {
            return Err(TrackerError::InvalidInput {
                message: "description is required".to_string(),
            });
        }
        if !draft.amount.is_positive() {
            return Err(TrackerError::InvalidAmount {
                input: draft.amount.to_string(),
            });
        }

        let income = self.store.append_income(Income {
            id: Uuid::new_v4(),
            description,
            amount: draft.amount,
            kind: draft.kind,
            received_at: time.now(),
        })?;

        tracing::info!(income_id = %income.id, amount = %income.amount, "Recorded income");

        self.events.emit(Event::IncomeRecorded {
            income_id: income.id,
            amount: income.amount,
            timestamp: income.received_at,
        });

        Ok(income)
    }

    pub fn remove(&mut self, id: PurchaseId, time: &SafeTimeProvider) -> Result<Purchase> {
        let removed = self.store.remove(id)?;

        tracing::info!(purchase_id = %removed.id, "Removed purchase");

        self.events.emit(Event::PurchaseRemoved {
            purchase_id: removed.id,
            description: removed.description.clone(),
            timestamp: time.now(),
        });

        Ok(removed)
    }
}
