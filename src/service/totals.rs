use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;

use crate::models::{InvoiceRecord, LineItem};

fn hundred() -> BigDecimal {
    BigDecimal::from(100)
}

/// 小计 = Σ 数量 × 单价
pub fn subtotal(items: &[LineItem]) -> BigDecimal {
    items
        .iter()
        .fold(BigDecimal::zero(), |sum, item| sum + item.line_total())
}

pub fn discount_amount(subtotal: &BigDecimal, discount_percent: &BigDecimal) -> BigDecimal {
    subtotal * discount_percent / hundred()
}

/// 税额按折后金额计算, 不能用原始小计
pub fn tax_amount(subtotal: &BigDecimal, discount_amount: &BigDecimal, tax_rate: &BigDecimal) -> BigDecimal {
    (subtotal - discount_amount) * tax_rate / hundred()
}

pub fn total(subtotal: &BigDecimal, discount_amount: &BigDecimal, tax_amount: &BigDecimal) -> BigDecimal {
    subtotal - discount_amount + tax_amount
}

/// 未收余额, 多付时为负, 不截断
pub fn balance_due(total: &BigDecimal, received_amount: &BigDecimal) -> BigDecimal {
    total - received_amount
}

/// 余额状态 (负余额单独展示)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceState {
    Outstanding,
    Settled,
    Overpaid,
}

/// 单张发票的金额计算结果
///
/// 列表、预览和看板都从这里取数, 保证同样的输入得到同样的金额。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: BigDecimal,
    pub discount_amount: BigDecimal,
    pub tax_amount: BigDecimal,
    pub total: BigDecimal,
    pub received_amount: BigDecimal,
    pub balance_due: BigDecimal,
}

impl InvoiceTotals {
    /// 按 小计 -> 折扣 -> 税 -> 合计 -> 余额 的顺序计算
    pub fn compute(
        items: &[LineItem],
        discount_percent: &BigDecimal,
        tax_rate: &BigDecimal,
        received_amount: &BigDecimal,
    ) -> Self {
        let subtotal = subtotal(items);
        let discount_amount = discount_amount(&subtotal, discount_percent);
        let tax_amount = tax_amount(&subtotal, &discount_amount, tax_rate);
        let total = total(&subtotal, &discount_amount, &tax_amount);
        let balance_due = balance_due(&total, received_amount);

        Self {
            subtotal,
            discount_amount,
            tax_amount,
            total,
            received_amount: received_amount.clone(),
            balance_due,
        }
    }

    pub fn for_record(record: &InvoiceRecord) -> Self {
        Self::compute(&record.items, &record.discount, &record.tax_rate, &record.received_amount)
    }

    pub fn balance_state(&self) -> BalanceState {
        let zero = BigDecimal::zero();
        if self.balance_due > zero {
            BalanceState::Outstanding
        } else if self.balance_due < zero {
            BalanceState::Overpaid
        } else {
            BalanceState::Settled
        }
    }

    /// 计入待收款的金额: 多付按 0 计
    pub fn outstanding(&self) -> BigDecimal {
        if self.balance_due > BigDecimal::zero() {
            self.balance_due.clone()
        } else {
            BigDecimal::zero()
        }
    }
}

/// 待收款汇总: 每张发票的负余额先截为 0 再求和, 多付不能抵消其他欠款
pub fn pending_payments<'a>(invoices: impl IntoIterator<Item = &'a InvoiceRecord>) -> BigDecimal {
    invoices
        .into_iter()
        .map(|invoice| InvoiceTotals::for_record(invoice).outstanding())
        .fold(BigDecimal::zero(), |sum, owed| sum + owed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn item(quantity: &str, unit_price: &str) -> LineItem {
        LineItem {
            id: format!("item_{}_{}", quantity, unit_price),
            name: "Kaftan".to_string(),
            quantity: dec(quantity),
            unit_price: dec(unit_price),
        }
    }

    fn invoice(items: Vec<LineItem>, discount: &str, tax_rate: &str, received: &str) -> InvoiceRecord {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        InvoiceRecord {
            invoice_number: "INV-20261019-0001".to_string(),
            date: day,
            due_date: day,
            client_name: "Client".to_string(),
            client_address: String::new(),
            client_email: String::new(),
            items,
            tax_rate: dec(tax_rate),
            discount: dec(discount),
            received_amount: dec(received),
            notes: String::new(),
        }
    }

    #[test]
    fn empty_invoice_has_zero_subtotal() {
        assert_eq!(subtotal(&[]), BigDecimal::zero());
        let totals = InvoiceTotals::compute(&[], &dec("10"), &dec("7.5"), &BigDecimal::zero());
        assert!(totals.total.is_zero());
        assert_eq!(totals.balance_state(), BalanceState::Settled);
    }

    #[test]
    fn tax_is_charged_on_the_discounted_amount() {
        let items = vec![item("2", "300"), item("4", "100")];
        let totals = InvoiceTotals::compute(&items, &dec("10"), &dec("7.5"), &dec("1000"));

        assert_eq!(totals.subtotal, dec("1000"));
        assert_eq!(totals.discount_amount, dec("100"));
        assert_eq!(totals.tax_amount, dec("67.5"));
        assert_eq!(totals.total, dec("967.5"));
        assert_eq!(totals.balance_due, dec("-32.5"));
        assert_eq!(totals.balance_state(), BalanceState::Overpaid);
        assert!(totals.outstanding().is_zero());
    }

    #[test]
    fn taxing_the_raw_subtotal_would_give_a_different_total() {
        let sub = dec("1000");
        let discount = discount_amount(&sub, &dec("10"));
        let wrong_tax = tax_amount(&sub, &BigDecimal::zero(), &dec("7.5"));
        let right_tax = tax_amount(&sub, &discount, &dec("7.5"));
        assert_eq!(wrong_tax, dec("75"));
        assert_ne!(total(&sub, &discount, &wrong_tax), total(&sub, &discount, &right_tax));
    }

    #[test]
    fn pending_payments_ignore_overpayments() {
        let overpaid = invoice(vec![item("1", "1000")], "10", "7.5", "1000");
        let owing = invoice(vec![item("1", "200")], "0", "0", "0");

        assert_eq!(InvoiceTotals::for_record(&overpaid).balance_due, dec("-32.5"));
        assert_eq!(pending_payments([&overpaid, &owing]), dec("200"));
    }

    #[test]
    fn balance_due_is_not_clamped() {
        assert_eq!(balance_due(&dec("967.5"), &dec("1000")), dec("-32.5"));
        assert_eq!(balance_due(&dec("967.5"), &dec("900")), dec("67.5"));
    }

    proptest! {
        #[test]
        fn subtotal_is_the_sum_of_line_totals(
            lines in prop::collection::vec((0u32..500, 0u32..1_000_000), 0..20)
        ) {
            let items: Vec<LineItem> = lines
                .iter()
                .map(|(q, cents)| LineItem {
                    id: String::new(),
                    name: String::new(),
                    quantity: BigDecimal::from(*q),
                    unit_price: BigDecimal::from(*cents) / BigDecimal::from(100),
                })
                .collect();
            let expected = lines
                .iter()
                .fold(BigDecimal::zero(), |sum, (q, cents)| {
                    sum + BigDecimal::from(u64::from(*q) * u64::from(*cents)) / BigDecimal::from(100)
                });
            prop_assert_eq!(subtotal(&items), expected);
        }

        #[test]
        fn total_equals_discounted_base_plus_tax(
            sub_cents in 0u64..100_000_000,
            discount in 0u32..=100,
            tax in 0u32..=30,
        ) {
            let sub = BigDecimal::from(sub_cents) / BigDecimal::from(100);
            let discount_amt = discount_amount(&sub, &BigDecimal::from(discount));
            let tax_amt = tax_amount(&sub, &discount_amt, &BigDecimal::from(tax));
            let base = &sub - &discount_amt;
            prop_assert_eq!(&tax_amt, &(&base * BigDecimal::from(tax) / BigDecimal::from(100)));
            prop_assert_eq!(total(&sub, &discount_amt, &tax_amt), base + tax_amt);
        }
    }
}
