use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{
    FinancialRecord, InvoiceDraft, InvoiceRecord, LineItem, OrderItem, OrderStatus, RecordKind,
    Stored,
};
use crate::service::totals::{self, BalanceState, InvoiceTotals};
use crate::service::urgency;

/// 收支看板
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub total_income: BigDecimal,
    pub total_expenses: BigDecimal,
    pub net_profit: BigDecimal,
    /// 所有发票未收余额之和 (多付按 0 计)
    pub pending_payments: BigDecimal,
}

impl FinancialSummary {
    pub fn compute(records: &[Stored<FinancialRecord>], invoices: &[Stored<InvoiceRecord>]) -> Self {
        let sum_of = |kind: RecordKind| {
            records
                .iter()
                .filter(|r| r.data.kind == kind)
                .fold(BigDecimal::zero(), |sum, r| sum + &r.data.amount)
        };
        let total_income = sum_of(RecordKind::Income);
        let total_expenses = sum_of(RecordKind::Expense);

        Self {
            net_profit: &total_income - &total_expenses,
            total_income,
            total_expenses,
            pending_payments: totals::pending_payments(invoices.iter().map(|i| &i.data)),
        }
    }
}

/// 订单看板计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub overdue: usize,
    pub delivered: usize,
}

impl OrderSummary {
    pub fn compute(orders: &[Stored<OrderItem>], today: NaiveDate) -> Self {
        let count = |status: OrderStatus| orders.iter().filter(|o| o.data.status == status).count();
        Self {
            total: orders.len(),
            pending: count(OrderStatus::Pending),
            in_progress: count(OrderStatus::InProgress),
            overdue: orders.iter().filter(|o| urgency::is_overdue(&o.data, today)).count(),
            delivered: count(OrderStatus::Delivered),
        }
    }
}

/// 发票列表行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceListRow {
    pub id: i64,
    pub invoice_number: String,
    pub client_name: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub totals: InvoiceTotals,
    pub balance_state: BalanceState,
}

impl InvoiceListRow {
    pub fn from_stored(invoice: &Stored<InvoiceRecord>) -> Self {
        let totals = InvoiceTotals::for_record(&invoice.data);
        Self {
            id: invoice.id,
            invoice_number: invoice.data.invoice_number.clone(),
            client_name: invoice.data.client_name.clone(),
            date: invoice.data.date,
            due_date: invoice.data.due_date,
            balance_state: totals.balance_state(),
            totals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewLine {
    pub name: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
}

impl From<&LineItem> for PreviewLine {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity.clone(),
            unit_price: item.unit_price.clone(),
            line_total: item.line_total(),
        }
    }
}

/// 单张发票预览 (也是 PDF 导出的内容)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePreview {
    pub draft: InvoiceDraft,
    pub lines: Vec<PreviewLine>,
    pub totals: InvoiceTotals,
    pub balance_state: BalanceState,
    pub export_filename: String,
}

impl InvoicePreview {
    pub fn new(draft: &InvoiceDraft) -> Self {
        let totals = InvoiceTotals::compute(
            &draft.items,
            &draft.discount,
            &draft.tax_rate,
            &draft.received_amount,
        );
        Self {
            lines: draft.items.iter().map(PreviewLine::from).collect(),
            balance_state: totals.balance_state(),
            totals,
            export_filename: export_filename(&draft.invoice_number),
            draft: draft.clone(),
        }
    }
}

pub fn export_filename(invoice_number: &str) -> String {
    format!("FLC_Invoice_{}.pdf", invoice_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientInfo, Priority, UserId};
    use chrono::{Duration, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn stored<T>(id: i64, data: T) -> Stored<T> {
        Stored {
            id,
            owner_id: UserId::new("user-1"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            data,
        }
    }

    fn draft(received: &str) -> InvoiceDraft {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        InvoiceDraft {
            id: None,
            invoice_number: "INV-20261019-0815".to_string(),
            date: day,
            due_date: day + Duration::days(14),
            client: ClientInfo {
                name: "Ify".to_string(),
                ..Default::default()
            },
            items: vec![LineItem {
                id: "item_a".to_string(),
                name: "Lace skirt".to_string(),
                quantity: dec("4"),
                unit_price: dec("250"),
            }],
            tax_rate: dec("7.5"),
            discount: dec("10"),
            received_amount: dec(received),
            notes: String::new(),
        }
    }

    #[test]
    fn list_preview_and_dashboard_agree_on_money() {
        let overpaid = draft("1000");
        let owing = draft("767.5");
        let invoices = vec![stored(1, overpaid.to_record()), stored(2, owing.to_record())];

        let preview = InvoicePreview::new(&overpaid);
        let row = InvoiceListRow::from_stored(&invoices[0]);
        assert_eq!(preview.totals, row.totals);
        assert_eq!(row.totals.balance_due, dec("-32.5"));
        assert_eq!(row.balance_state, BalanceState::Overpaid);
        assert_eq!(preview.lines[0].line_total, dec("1000"));
        assert_eq!(preview.export_filename, "FLC_Invoice_INV-20261019-0815.pdf");

        let summary = FinancialSummary::compute(&[], &invoices);
        assert_eq!(summary.pending_payments, dec("200"));
    }

    #[test]
    fn order_summary_counts_statuses_and_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let order = |status, due: NaiveDate| OrderItem {
            client_name: "Client".to_string(),
            phone: None,
            item_description: "Senator wear".to_string(),
            due_date: due,
            priority: Priority::Medium,
            status,
            notes: None,
            invoice_id: None,
        };
        let yesterday = today - Duration::days(1);
        let orders = vec![
            stored(1, order(OrderStatus::Pending, yesterday)),
            stored(2, order(OrderStatus::InProgress, today)),
            stored(3, order(OrderStatus::Delivered, yesterday)),
            stored(4, order(OrderStatus::Completed, yesterday)),
        ];

        let summary = OrderSummary::compute(&orders, today);
        assert_eq!(
            summary,
            OrderSummary {
                total: 4,
                pending: 1,
                in_progress: 1,
                overdue: 1,
                delivered: 1,
            }
        );
    }
}
