use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::month::YearMonth;
use crate::purchase::Purchase;
use crate::types::{Income, InstallmentStatus, PurchaseId};

/// one installment charged in a statement month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub purchase_id: PurchaseId,
    pub description: String,
    /// "n/t"
    pub label: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardStatement {
    pub card: String,
    pub lines: Vec<StatementLine>,
    pub subtotal: Money,
}

/// installments charged in a month, grouped per card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub month: YearMonth,
    pub cards: Vec<CardStatement>,
    pub total: Money,
}

impl Statement {
    /// active installments of `purchases` as of `month`
    ///
    /// Cards appear in the order their first purchase appears. Stored
    /// derived fields are ignored.
    pub fn build<'a>(month: YearMonth, purchases: impl IntoIterator<Item = &'a Purchase>) -> Self {
        let mut cards: Vec<CardStatement> = Vec::new();

        for purchase in purchases {
            let position = purchase.terms.position_at(month);
            if position.status != InstallmentStatus::Active {
                continue;
            }

            let line = StatementLine {
                purchase_id: purchase.id,
                description: purchase.description.clone(),
                label: position.label(purchase.total_installments()),
                amount: purchase.installment_amount,
            };

            match cards.iter_mut().find(|c| purchase.is_on_card(&c.card)) {
                Some(card) => {
                    card.subtotal += line.amount;
                    card.lines.push(line);
                }
                None => cards.push(CardStatement {
                    card: purchase.card.clone(),
                    subtotal: line.amount,
                    lines: vec![line],
                }),
            }
        }

        let total = cards.iter().map(|c| c.subtotal).sum();
        Self { month, cards, total }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.cards.iter().map(|c| c.lines.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTotal {
    pub card: String,
    pub amount: Money,
}

/// income against installment expenses for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: YearMonth,
    pub income: Money,
    pub expenses: Money,
    /// income minus expenses, may be negative
    pub balance: Money,
    pub by_card: Vec<CardTotal>,
    pub active_purchases: usize,
}

impl MonthlySummary {
    /// incomes are counted when received within `month` in `timezone`
    pub fn build<'a>(
        month: YearMonth,
        purchases: impl IntoIterator<Item = &'a Purchase>,
        incomes: &[Income],
        timezone: Tz,
    ) -> Self {
        let statement = Statement::build(month, purchases);

        let income: Money = incomes
            .iter()
            .filter(|i| YearMonth::from(i.received_at.with_timezone(&timezone)) == month)
            .map(|i| i.amount)
            .sum();

        let by_card = statement
            .cards
            .iter()
            .map(|c| CardTotal {
                card: c.card.clone(),
                amount: c.subtotal,
            })
            .collect();

        Self {
            month,
            income,
            expenses: statement.total,
            balance: income - statement.total,
            by_card,
            active_purchases: statement.line_count(),
        }
    }
}
