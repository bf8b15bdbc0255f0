use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{Result, TrackerError};
use crate::purchase::{PurchaseDraft, PurchaseDraftBuilder};
use crate::types::{IncomeDraft, IncomeKind, UserId};

/// guided dialogs a user can open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    Purchase,
    Income,
}

/// what the user is asked next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prompt {
    PurchaseDescription,
    PurchaseTotalAmount,
    CurrentInstallment,
    TotalInstallments,
    Card,
    IncomeDescription,
    IncomeAmount,
}

impl Prompt {
    pub fn text(&self) -> &'static str {
        match self {
            Prompt::PurchaseDescription => "What did you buy?",
            Prompt::PurchaseTotalAmount => "What is the TOTAL amount of the purchase? (e.g. 619.00)",
            Prompt::CurrentInstallment => "Which installment are you paying this month? (1 for a new purchase)",
            Prompt::TotalInstallments => "How many installments in total? (e.g. 10, 12)",
            Prompt::Card => "Which card? (e.g. Nubank, Inter)",
            Prompt::IncomeDescription => "Describe the income (e.g. Salary)",
            Prompt::IncomeAmount => "How much was received?",
        }
    }
}

/// finished dialog output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Draft {
    Purchase(PurchaseDraft),
    Income(IncomeDraft),
}

/// result of feeding one message to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionStep {
    Prompt(Prompt),
    Completed(Draft),
}

/// per-user dialog state; each variant carries what was collected so far
#[derive(Debug, Clone, PartialEq)]
enum Dialog {
    PurchaseDescription,
    PurchaseTotalAmount {
        description: String,
    },
    CurrentInstallment {
        description: String,
        total_amount: Money,
    },
    TotalInstallments {
        description: String,
        total_amount: Money,
        current: u32,
    },
    Card {
        description: String,
        total_amount: Money,
        current: u32,
        total: u32,
    },
    IncomeDescription,
    IncomeAmount {
        description: String,
    },
}

enum Transition {
    Next(Dialog),
    Done(Draft),
}

impl Dialog {
    fn start(flow: Flow) -> Self {
        match flow {
            Flow::Purchase => Dialog::PurchaseDescription,
            Flow::Income => Dialog::IncomeDescription,
        }
    }

    fn prompt(&self) -> Prompt {
        match self {
            Dialog::PurchaseDescription => Prompt::PurchaseDescription,
            Dialog::PurchaseTotalAmount { .. } => Prompt::PurchaseTotalAmount,
            Dialog::CurrentInstallment { .. } => Prompt::CurrentInstallment,
            Dialog::TotalInstallments { .. } => Prompt::TotalInstallments,
            Dialog::Card { .. } => Prompt::Card,
            Dialog::IncomeDescription => Prompt::IncomeDescription,
            Dialog::IncomeAmount { .. } => Prompt::IncomeAmount,
        }
    }

    /// next state for `input`; the current state is left untouched on error
    fn advance(&self, input: &str) -> Result<Transition> {
        let input = input.trim();

        let next = match self {
            Dialog::PurchaseDescription => Dialog::PurchaseTotalAmount {
                description: non_empty(input, "description")?,
            },
            Dialog::PurchaseTotalAmount { description } => Dialog::CurrentInstallment {
                description: description.clone(),
                total_amount: positive_amount(input)?,
            },
            Dialog::CurrentInstallment { description, total_amount } => Dialog::TotalInstallments {
                description: description.clone(),
                total_amount: *total_amount,
                current: whole_number(input, "current installment")?,
            },
            Dialog::TotalInstallments { description, total_amount, current } => {
                let total = whole_number(input, "total installments")?;
                if total == 0 || *current > total {
                    return Err(TrackerError::InvalidInput {
                        message: format!("installment {} cannot be part of {} installments", current, total),
                    });
                }
                Dialog::Card {
                    description: description.clone(),
                    total_amount: *total_amount,
                    current: *current,
                    total,
                }
            }
            Dialog::Card { description, total_amount, current, total } => {
                let draft = PurchaseDraftBuilder::new()
                    .description(description.clone())
                    .card(non_empty(input, "card")?)
                    .total_amount(*total_amount)
                    .current_installment(*current, *total)
                    .build()?;
                return Ok(Transition::Done(Draft::Purchase(draft)));
            }
            Dialog::IncomeDescription => Dialog::IncomeAmount {
                description: non_empty(input, "description")?,
            },
            Dialog::IncomeAmount { description } => {
                return Ok(Transition::Done(Draft::Income(IncomeDraft {
                    description: description.clone(),
                    amount: positive_amount(input)?,
                    kind: IncomeKind::default(),
                })));
            }
        };

        Ok(Transition::Next(next))
    }
}

fn non_empty(input: &str, field: &str) -> Result<String> {
    if input.is_empty() {
        return Err(TrackerError::InvalidInput {
            message: format!("{} must not be empty", field),
        });
    }
    Ok(input.to_string())
}

fn positive_amount(input: &str) -> Result<Money> {
    let amount = Money::parse_user(input)?;
    if !amount.is_positive() {
        return Err(TrackerError::InvalidAmount {
            input: input.to_string(),
        });
    }
    Ok(amount)
}

fn whole_number(input: &str, field: &str) -> Result<u32> {
    input.parse().map_err(|_| TrackerError::InvalidInput {
        message: format!("{} must be a whole number, got {:?}", field, input),
    })
}

/// open dialogs keyed by user
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<UserId, Dialog>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// open `flow` for `user`, replacing any dialog already open
    pub fn start(&mut self, user: UserId, flow: Flow) -> Prompt {
        let dialog = Dialog::start(flow);
        let prompt = dialog.prompt();
        if self.sessions.insert(user, dialog).is_some() {
            tracing::debug!(user, ?flow, "Replaced open session");
        }
        prompt
    }

    /// feed one message; invalid input keeps the dialog where it was
    pub fn feed(&mut self, user: UserId, input: &str) -> Result<SessionStep> {
        let dialog = self
            .sessions
            .get(&user)
            .ok_or(TrackerError::NoActiveSession { user })?;

        match dialog.advance(input)? {
            Transition::Next(next) => {
                let prompt = next.prompt();
                self.sessions.insert(user, next);
                Ok(SessionStep::Prompt(prompt))
            }
            Transition::Done(draft) => {
                self.sessions.remove(&user);
                Ok(SessionStep::Completed(draft))
            }
        }
    }

    /// prompt the user is currently answering
    pub fn pending_prompt(&self, user: UserId) -> Option<Prompt> {
        self.sessions.get(&user).map(Dialog::prompt)
    }

    /// drop the dialog; returns whether one was open
    pub fn cancel(&mut self, user: UserId) -> bool {
        self.sessions.remove(&user).is_some()
    }

    pub fn is_active(&self, user: UserId) -> bool {
        self.sessions.contains_key(&user)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}
