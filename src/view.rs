/// serialization views for purchases and reports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::month::YearMonth;
use crate::purchase::Purchase;
use crate::report::{MonthlySummary, Statement};
use crate::types::{InstallmentStatus, PurchaseId};

/// "current/total", e.g. "12/14"
pub fn format_installment(current: u32, total: u32) -> String {
    format!("{}/{}", current, total)
}

/// serializable view of a purchase
#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseView {
    pub id: PurchaseId,
    pub description: String,
    pub card: String,
    pub category: String,
    pub notes: Option<String>,
    pub installment_amount: Money,
    pub total_amount: Money,
    pub installment_label: String,
    pub status: InstallmentStatus,
    pub start_month: YearMonth,
    pub final_month: YearMonth,
    pub remaining_amount: Money,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseView {
    pub fn from_purchase(purchase: &Purchase) -> Self {
        PurchaseView {
            id: purchase.id,
            description: purchase.description.clone(),
            card: purchase.card.clone(),
            category: purchase.category.clone(),
            notes: purchase.notes.clone(),
            installment_amount: purchase.installment_amount,
            total_amount: purchase.total_amount,
            installment_label: format_installment(purchase.current_installment(), purchase.total_installments()),
            status: purchase.status(),
            start_month: purchase.terms.start_month(),
            final_month: purchase.terms.final_month(),
            remaining_amount: purchase.remaining_amount(),
            updated_at: purchase.updated_at,
        }
    }

    /// one-line text rendering, e.g. "Headphones 7/10 R$ 61.90 (Nubank)"
    pub fn to_line(&self, currency_symbol: &str) -> String {
        format!(
            "{} {} {} ({})",
            self.description,
            self.installment_label,
            self.installment_amount.format_with(currency_symbol),
            self.card
        )
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// listing of purchases
#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseListView {
    pub purchases: Vec<PurchaseView>,
    pub monthly_total: Money,
}

impl PurchaseListView {
    pub fn from_purchases(purchases: &[Purchase]) -> Self {
        let monthly_total = purchases
            .iter()
            .filter(|p| p.status() == InstallmentStatus::Active)
            .map(|p| p.installment_amount)
            .sum();

        PurchaseListView {
            purchases: purchases.iter().map(PurchaseView::from_purchase).collect(),
            monthly_total,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// text rendering of a statement, one card block after another
pub fn render_statement(statement: &Statement, currency_symbol: &str) -> String {
    let mut out = format!("Statement {}\n", statement.month);

    for card in &statement.cards {
        out.push_str(&format!("\n{}\n", card.card));
        for line in &card.lines {
            out.push_str(&format!(
                "  {} {} {}\n",
                line.description,
                line.label,
                line.amount.format_with(currency_symbol)
            ));
        }
        out.push_str(&format!("  subtotal {}\n", card.subtotal.format_with(currency_symbol)));
    }

    out.push_str(&format!("\ntotal {}\n", statement.total.format_with(currency_symbol)));
    out
}

/// text rendering of a monthly summary
pub fn render_summary(summary: &MonthlySummary, currency_symbol: &str) -> String {
    let mut out = format!(
        "Summary {}\nincome {}\nexpenses {}\nbalance {}\n",
        summary.month,
        summary.income.format_with(currency_symbol),
        summary.expenses.format_with(currency_symbol),
        summary.balance.format_with(currency_symbol)
    );

    for card in &summary.by_card {
        out.push_str(&format!("  {} {}\n", card.card, card.amount.format_with(currency_symbol)));
    }
    out
}

pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purchase::PurchaseDraft;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn headphones() -> Purchase {
        let draft = PurchaseDraft::builder()
            .description("Headphones")
            .card("Nubank")
            .installment_amount(Money::from_decimal(dec!(61.90)))
            .current_installment(7, 10)
            .build()
            .unwrap();
        Purchase::open(
            draft,
            YearMonth::new(2024, 6).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_format_installment() {
        assert_eq!(format_installment(12, 14), "12/14");
        assert_eq!(format_installment(1, 1), "1/1");
    }

    #[test]
    fn test_purchase_view() {
        let view = PurchaseView::from_purchase(&headphones());

        assert_eq!(view.installment_label, "7/10");
        assert_eq!(view.start_month.to_string(), "2023-12");
        assert_eq!(view.final_month.to_string(), "2024-09");
        assert_eq!(view.remaining_amount, Money::from_decimal(dec!(247.60)));
        assert_eq!(view.to_line("R$"), "Headphones 7/10 R$ 61.90 (Nubank)");
    }

    #[test]
    fn test_json_uses_text_months_and_snake_case_status() {
        let json = PurchaseView::from_purchase(&headphones()).to_json_pretty().unwrap();

        assert!(json.contains("\"status\": \"active\""));
        assert!(json.contains("\"start_month\": \"2023-12\""));
        assert!(json.contains("\"installment_label\": \"7/10\""));
    }

    #[test]
    fn test_list_view_totals_active_only() {
        let active = headphones();
        let mut finished = headphones();
        finished.refresh(YearMonth::new(2025, 1).unwrap());

        let list = PurchaseListView::from_purchases(&[active, finished]);
        assert_eq!(list.purchases.len(), 2);
        assert_eq!(list.monthly_total, Money::from_decimal(dec!(61.90)));
    }

    #[test]
    fn test_view_of_inconsistent_snapshot() {
        let mut snapshot = serde_json::to_value(headphones()).unwrap();
        snapshot["current_installment"] = serde_json::json!(12);
        let stored: Purchase = serde_json::from_value(snapshot).unwrap();

        let view = PurchaseView::from_purchase(&stored);
        assert_eq!(view.installment_label, "12/10");
        assert_eq!(view.remaining_amount, Money::from_decimal(dec!(61.90)));
    }

    #[test]
    fn test_render_statement() {
        let purchases = vec![headphones()];
        let statement = Statement::build(YearMonth::new(2024, 6).unwrap(), &purchases);
        let text = render_statement(&statement, "R$");

        assert!(text.starts_with("Statement 2024-06\n"));
        assert!(text.contains("  Headphones 7/10 R$ 61.90\n"));
        assert!(text.ends_with("total R$ 61.90\n"));
    }
}
