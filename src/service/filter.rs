//! 列表的客户端过滤: 对已取回的完整列表做纯投影, 不依赖存储。

use serde::de::value::StringDeserializer;
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer};

use crate::models::{
    ClientMeasurements, FinancialRecord, InvoiceRecord, OrderItem, OrderStatus, RecordKind, Stored,
};

/// 状态筛选, 默认全部 (`ALL`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() || raw.eq_ignore_ascii_case("ALL") {
            return Ok(StatusFilter::All);
        }
        let status: StringDeserializer<D::Error> = raw.into_deserializer();
        OrderStatus::deserialize(status).map(StatusFilter::Only)
    }
}

impl StatusFilter {
    pub fn matches(self, status: OrderStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

/// 不区分大小写的包含匹配; 空关键字匹配一切
struct SearchTerm(String);

impl SearchTerm {
    fn new(term: &str) -> Self {
        Self(term.trim().to_lowercase())
    }

    fn hits(&self, field: &str) -> bool {
        self.0.is_empty() || field.to_lowercase().contains(&self.0)
    }

    fn hits_opt(&self, field: Option<&str>) -> bool {
        self.0.is_empty() || field.is_some_and(|f| self.hits(f))
    }
}

pub fn filter_orders<'a>(
    orders: &'a [Stored<OrderItem>],
    search: &str,
    status: StatusFilter,
) -> Vec<&'a Stored<OrderItem>> {
    let term = SearchTerm::new(search);
    orders
        .iter()
        .filter(|o| {
            term.hits(&o.data.client_name)
                || term.hits(&o.data.item_description)
                || term.hits_opt(o.data.phone.as_deref())
        })
        .filter(|o| status.matches(o.data.status))
        .collect()
}

pub fn filter_measurements<'a>(
    profiles: &'a [Stored<ClientMeasurements>],
    search: &str,
) -> Vec<&'a Stored<ClientMeasurements>> {
    let term = SearchTerm::new(search);
    profiles
        .iter()
        .filter(|m| term.hits(&m.data.client_name) || term.hits(&m.data.phone))
        .collect()
}

pub fn filter_invoices<'a>(
    invoices: &'a [Stored<InvoiceRecord>],
    search: &str,
) -> Vec<&'a Stored<InvoiceRecord>> {
    let term = SearchTerm::new(search);
    invoices
        .iter()
        .filter(|i| term.hits(&i.data.client_name) || term.hits(&i.data.invoice_number))
        .collect()
}

pub fn filter_financial<'a>(
    records: &'a [Stored<FinancialRecord>],
    kind: Option<RecordKind>,
) -> Vec<&'a Stored<FinancialRecord>> {
    records
        .iter()
        .filter(|r| kind.map_or(true, |k| r.data.kind == k))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, UserId};
    use chrono::{NaiveDate, Utc};

    fn stored<T>(id: i64, data: T) -> Stored<T> {
        Stored {
            id,
            owner_id: UserId::new("user-1"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            data,
        }
    }

    fn order(id: i64, client: &str, phone: Option<&str>, status: OrderStatus) -> Stored<OrderItem> {
        stored(
            id,
            OrderItem {
                client_name: client.to_string(),
                phone: phone.map(str::to_string),
                item_description: "Wedding gown".to_string(),
                due_date: NaiveDate::from_ymd_opt(2026, 10, 30).unwrap(),
                priority: Priority::High,
                status,
                notes: None,
                invoice_id: None,
            },
        )
    }

    fn ids<T>(rows: Vec<&Stored<T>>) -> Vec<i64> {
        rows.into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn orders_match_name_item_or_phone_case_insensitively() {
        let orders = vec![
            order(1, "Bisi Adeyemi", Some("0803 111 2222"), OrderStatus::Pending),
            order(2, "Chioma Eze", None, OrderStatus::InProgress),
            order(3, "Kemi Bello", Some("0705 999 0000"), OrderStatus::Delivered),
        ];

        assert_eq!(ids(filter_orders(&orders, "bisi", StatusFilter::All)), vec![1]);
        assert_eq!(ids(filter_orders(&orders, "0705", StatusFilter::All)), vec![3]);
        assert_eq!(ids(filter_orders(&orders, "GOWN", StatusFilter::All)), vec![1, 2, 3]);
        assert_eq!(ids(filter_orders(&orders, "", StatusFilter::All)), vec![1, 2, 3]);
        assert_eq!(
            ids(filter_orders(&orders, "", StatusFilter::Only(OrderStatus::InProgress))),
            vec![2]
        );
        assert!(filter_orders(&orders, "bisi", StatusFilter::Only(OrderStatus::Delivered)).is_empty());
    }

    #[test]
    fn status_filter_reads_wire_names() {
        let filter: StatusFilter = serde_json::from_str("\"IN_PROGRESS\"").unwrap();
        assert_eq!(filter, StatusFilter::Only(OrderStatus::InProgress));
        let all: StatusFilter = serde_json::from_str("\"ALL\"").unwrap();
        assert_eq!(all, StatusFilter::All);
        assert!(serde_json::from_str::<StatusFilter>("\"LOST\"").is_err());
    }

    #[test]
    fn financial_records_filter_by_kind() {
        let record = |kind| FinancialRecord {
            kind,
            amount: 5000.into(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            category: "Fabric".to_string(),
            invoice_id: None,
        };
        let records = vec![
            stored(1, record(RecordKind::Income)),
            stored(2, record(RecordKind::Expense)),
        ];
        assert_eq!(ids(filter_financial(&records, Some(RecordKind::Expense))), vec![2]);
        assert_eq!(ids(filter_financial(&records, None)), vec![1, 2]);
    }

    #[test]
    fn measurements_match_client_or_phone() {
        let profile = |name: &str, phone: &str| ClientMeasurements {
            client_name: name.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        };
        let profiles = vec![stored(1, profile("Amaka", "0812")), stored(2, profile("Zainab", "0909"))];
        assert_eq!(ids(filter_measurements(&profiles, "zain")), vec![2]);
        assert_eq!(ids(filter_measurements(&profiles, "0812")), vec![1]);
    }
}
