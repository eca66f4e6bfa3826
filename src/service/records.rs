use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::{Collection, OrderBy, RecordStore, StoreError};
use crate::error::AppError;
use crate::models::{
    ClientMeasurements, FinancialRecord, InvoiceRecord, OrderItem, OrderStatus, Stored,
};
use crate::service::session::{Confirmation, Session};
use crate::service::summary::{FinancialSummary, OrderSummary};

/// 可存储的记录类型: 所属集合与默认排序
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// 日志/提示中的名称
    const LABEL: &'static str;

    fn default_order() -> OrderBy;
}

impl Resource for InvoiceRecord {
    const COLLECTION: Collection = Collection::Invoices;
    const LABEL: &'static str = "invoice";

    fn default_order() -> OrderBy {
        OrderBy::desc("created_at")
    }
}

impl Resource for FinancialRecord {
    const COLLECTION: Collection = Collection::FinancialRecords;
    const LABEL: &'static str = "financial record";

    fn default_order() -> OrderBy {
        OrderBy::desc("date")
    }
}

impl Resource for ClientMeasurements {
    const COLLECTION: Collection = Collection::Measurements;
    const LABEL: &'static str = "measurement record";

    fn default_order() -> OrderBy {
        OrderBy::desc("created_at")
    }
}

impl Resource for OrderItem {
    const COLLECTION: Collection = Collection::Todos;
    const LABEL: &'static str = "order";

    fn default_order() -> OrderBy {
        OrderBy::asc("due_date")
    }
}

/// 记录读写服务
///
/// 所有写操作先校验会话, 再访问存储; 存储错误记录日志后原样返回, 不重试。
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list<R: Resource>(&self, session: &Session) -> Result<Vec<Stored<R>>, AppError> {
        let owner = session.require_user()?;
        let rows = self
            .store
            .select_all(R::COLLECTION, owner, &R::default_order())
            .await
            .map_err(|e| failed("loading", R::LABEL, e))?;

        rows.into_iter()
            .map(|row| row.decode::<R>().map_err(|e| failed("decoding", R::LABEL, e)))
            .collect()
    }

    pub async fn create<R: Resource>(&self, session: &Session, record: &R) -> Result<Stored<R>, AppError> {
        let owner = session.require_user()?;
        let data = serde_json::to_value(record).map_err(|e| failed("encoding", R::LABEL, e.into()))?;
        let row = self
            .store
            .insert(R::COLLECTION, owner, data)
            .await
            .map_err(|e| failed("saving", R::LABEL, e))?;

        tracing::info!("{} {} created by {}", R::LABEL, row.id, owner);
        row.decode().map_err(|e| failed("decoding", R::LABEL, e))
    }

    /// 整条记录覆盖更新
    pub async fn update<R: Resource>(
        &self,
        session: &Session,
        id: i64,
        record: &R,
    ) -> Result<Stored<R>, AppError> {
        let owner = session.require_user()?;
        let data = serde_json::to_value(record).map_err(|e| failed("encoding", R::LABEL, e.into()))?;
        let row = self
            .store
            .replace(R::COLLECTION, owner, id, data)
            .await
            .map_err(|e| failed("updating", R::LABEL, e))?;

        tracing::info!("{} {} updated", R::LABEL, id);
        row.decode().map_err(|e| failed("decoding", R::LABEL, e))
    }

    /// 只改订单状态 (部分更新)
    pub async fn update_order_status(
        &self,
        session: &Session,
        id: i64,
        status: OrderStatus,
    ) -> Result<Stored<OrderItem>, AppError> {
        let owner = session.require_user()?;
        let row = self
            .store
            .update(Collection::Todos, owner, id, json!({ "status": status }))
            .await
            .map_err(|e| failed("updating status of", OrderItem::LABEL, e))?;

        tracing::info!("order {} marked as {}", id, status.label());
        row.decode().map_err(|e| failed("decoding", OrderItem::LABEL, e))
    }

    /// 删除; 未确认时不访问存储
    pub async fn delete<R: Resource>(
        &self,
        session: &Session,
        id: i64,
        confirmation: Confirmation,
    ) -> Result<(), AppError> {
        let owner = session.require_user()?;
        if confirmation != Confirmation::Confirmed {
            return Err(AppError::ConfirmationRequired);
        }

        self.store
            .delete(R::COLLECTION, owner, id)
            .await
            .map_err(|e| failed("deleting", R::LABEL, e))?;

        tracing::info!("{} {} deleted", R::LABEL, id);
        Ok(())
    }

    /// 收支看板: 并发取收支记录和发票
    pub async fn financial_summary(&self, session: &Session) -> Result<FinancialSummary, AppError> {
        let (records, invoices) = futures::try_join!(
            self.list::<FinancialRecord>(session),
            self.list::<InvoiceRecord>(session),
        )?;
        Ok(FinancialSummary::compute(&records, &invoices))
    }

    pub async fn order_summary(&self, session: &Session, today: NaiveDate) -> Result<OrderSummary, AppError> {
        let orders = self.list::<OrderItem>(session).await?;
        Ok(OrderSummary::compute(&orders, today))
    }
}

fn failed(action: &str, label: &str, error: StoreError) -> AppError {
    tracing::error!("Error {} {}: {}", action, label, error);
    AppError::Store(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{Priority, RecordKind, UserId};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn setup() -> (Arc<MemoryStore>, RecordService, Session) {
        let store = Arc::new(MemoryStore::new());
        let service = RecordService::new(store.clone());
        (store, service, Session::signed_in(UserId::new("seamstress-1")))
    }

    fn order(due: &str) -> OrderItem {
        OrderItem {
            client_name: "Halima".to_string(),
            phone: Some("0801".to_string()),
            item_description: "Iro and buba".to_string(),
            due_date: NaiveDate::from_str(due).unwrap(),
            priority: Priority::Low,
            status: OrderStatus::Pending,
            notes: None,
            invoice_id: None,
        }
    }

    #[tokio::test]
    async fn writes_without_a_user_never_reach_the_store() {
        let (store, service, _) = setup();
        let anonymous = Session::anonymous();

        let err = service.create(&anonymous, &order("2026-10-20")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        let err = service
            .update_order_status(&anonymous, 1, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        let err = service
            .delete::<OrderItem>(&anonymous, 1, Confirmation::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn unconfirmed_delete_keeps_the_record() {
        let (store, service, session) = setup();
        let saved = service.create(&session, &order("2026-10-20")).await.unwrap();
        let calls = store.calls();

        let err = service
            .delete::<OrderItem>(&session, saved.id, Confirmation::Declined)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConfirmationRequired));
        assert_eq!(store.calls(), calls);

        service
            .delete::<OrderItem>(&session, saved.id, Confirmation::Confirmed)
            .await
            .unwrap();
        assert!(service.list::<OrderItem>(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn orders_list_by_due_date_and_status_updates_partially() {
        let (_, service, session) = setup();
        service.create(&session, &order("2026-10-25")).await.unwrap();
        let early = service.create(&session, &order("2026-10-21")).await.unwrap();

        let listed = service.list::<OrderItem>(&session).await.unwrap();
        assert_eq!(listed[0].id, early.id);

        let updated = service
            .update_order_status(&session, early.id, OrderStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(updated.data.status, OrderStatus::InProgress);
        assert_eq!(updated.data.client_name, "Halima");
    }

    #[tokio::test]
    async fn full_update_clears_optional_fields() {
        let (_, service, session) = setup();
        let mut edited = order("2026-10-22");
        edited.notes = Some("old note".to_string());
        let saved = service.create(&session, &edited).await.unwrap();

        edited.phone = None;
        edited.notes = None;
        let updated = service.update(&session, saved.id, &edited).await.unwrap();
        assert_eq!(updated.data, edited);

        let listed = service.list::<OrderItem>(&session).await.unwrap();
        assert_eq!(listed[0].data, edited);
    }

    #[tokio::test]
    async fn undecodable_rows_are_server_faults() {
        let (store, service, session) = setup();
        store
            .insert(Collection::Todos, session.user().unwrap(), json!({"client_name": 42}))
            .await
            .unwrap();

        let err = service.list::<OrderItem>(&session).await.unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Corrupt(_))));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn store_failures_surface_as_errors() {
        let (store, service, session) = setup();
        store.set_failing(true);
        let err = service.list::<InvoiceRecord>(&session).await.unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn financial_summary_nets_income_against_expenses() {
        let (_, service, session) = setup();
        let record = |kind, amount: &str| FinancialRecord {
            kind,
            amount: BigDecimal::from_str(amount).unwrap(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            category: "Sales".to_string(),
            invoice_id: None,
        };
        service.create(&session, &record(RecordKind::Income, "1500")).await.unwrap();
        service.create(&session, &record(RecordKind::Expense, "400.50")).await.unwrap();

        let summary = service.financial_summary(&session).await.unwrap();
        assert_eq!(summary.total_income, BigDecimal::from(1500));
        assert_eq!(summary.net_profit, BigDecimal::from_str("1099.50").unwrap());
        assert_eq!(summary.pending_payments, BigDecimal::from(0));
    }
}
