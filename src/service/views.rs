//! 每个视图一个状态容器: 离开视图时 `reset`, 不跨视图缓存。
//!
//! 写操作成功后重新拉取列表; 任何失败都不改动内存中的列表。

use chrono::NaiveDate;
use indexmap::IndexSet;

use crate::config::{InvoiceConfig, NotificationConfig};
use crate::error::AppError;
use crate::models::{InvoiceDraft, InvoiceRecord, LineItem, OrderItem, OrderStatus, Stored};
use crate::service::invoice_number;
use crate::service::records::{RecordService, Resource};
use crate::service::session::{Confirmation, Session};
use crate::service::summary::{InvoiceListRow, InvoicePreview, OrderSummary};
use crate::service::totals::InvoiceTotals;
use crate::service::urgency::{self, Notification};

/// 列表视图状态
#[derive(Debug)]
pub struct ListView<R> {
    items: Vec<Stored<R>>,
    loading: bool,
}

impl<R> Default for ListView<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
        }
    }
}

impl<R: Resource> ListView<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Stored<R>] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub async fn refresh(&mut self, service: &RecordService, session: &Session) -> Result<(), AppError> {
        self.loading = true;
        let fetched = service.list::<R>(session).await;
        self.loading = false;
        self.items = fetched?;
        Ok(())
    }

    pub async fn create(
        &mut self,
        service: &RecordService,
        session: &Session,
        record: &R,
    ) -> Result<Stored<R>, AppError> {
        let saved = service.create(session, record).await?;
        self.reload(service, session).await;
        Ok(saved)
    }

    pub async fn update(
        &mut self,
        service: &RecordService,
        session: &Session,
        id: i64,
        record: &R,
    ) -> Result<Stored<R>, AppError> {
        let saved = service.update(session, id, record).await?;
        self.reload(service, session).await;
        Ok(saved)
    }

    pub async fn delete(
        &mut self,
        service: &RecordService,
        session: &Session,
        id: i64,
        confirmation: Confirmation,
    ) -> Result<(), AppError> {
        service.delete::<R>(session, id, confirmation).await?;
        self.reload(service, session).await;
        Ok(())
    }

    /// 写成功后的刷新, 失败只记日志 (写操作本身已成功)
    async fn reload(&mut self, service: &RecordService, session: &Session) {
        if let Err(e) = self.refresh(service, session).await {
            tracing::warn!("Refresh after {} write failed: {}", R::LABEL, e);
        }
    }
}

impl ListView<InvoiceRecord> {
    pub fn rows(&self) -> Vec<InvoiceListRow> {
        self.items.iter().map(InvoiceListRow::from_stored).collect()
    }
}

/// 发票编辑视图: 持有当前草稿
#[derive(Debug)]
pub struct InvoiceEditor {
    draft: InvoiceDraft,
    defaults: InvoiceConfig,
}

impl InvoiceEditor {
    pub fn new(defaults: InvoiceConfig, today: NaiveDate) -> Self {
        let draft = InvoiceDraft::new(invoice_number::generate(today), today, &defaults);
        Self { draft, defaults }
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut InvoiceDraft {
        &mut self.draft
    }

    /// 新建发票 (需要登录)
    pub fn new_invoice(&mut self, session: &Session, today: NaiveDate) -> Result<(), AppError> {
        session.require_user()?;
        self.draft = InvoiceDraft::new(invoice_number::generate(today), today, &self.defaults);
        Ok(())
    }

    pub fn edit(&mut self, invoice: &Stored<InvoiceRecord>) {
        self.draft = InvoiceDraft::from_stored(invoice);
    }

    pub fn regenerate_number(&mut self, today: NaiveDate) {
        self.draft.invoice_number = invoice_number::generate(today);
    }

    pub fn add_item(&mut self) -> String {
        self.draft.add_item().id.clone()
    }

    pub fn update_item(&mut self, item: LineItem) -> bool {
        self.draft.update_item(item)
    }

    pub fn remove_item(&mut self, id: &str) -> bool {
        self.draft.remove_item(id)
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::compute(
            &self.draft.items,
            &self.draft.discount,
            &self.draft.tax_rate,
            &self.draft.received_amount,
        )
    }

    pub fn preview(&self) -> InvoicePreview {
        InvoicePreview::new(&self.draft)
    }

    /// 保存: 新草稿插入, 已有 id 的覆盖更新; 成功后草稿换成存储返回的版本
    pub async fn save(
        &mut self,
        service: &RecordService,
        session: &Session,
        list: &mut ListView<InvoiceRecord>,
    ) -> Result<Stored<InvoiceRecord>, AppError> {
        let record = self.draft.to_record();
        let saved = match self.draft.id {
            Some(id) => list.update(service, session, id, &record).await?,
            None => list.create(service, session, &record).await?,
        };
        self.draft = InvoiceDraft::from_stored(&saved);
        Ok(saved)
    }
}

/// 订单看板: 订单列表 + 本次会话内忽略的提醒 (不持久化)
#[derive(Debug)]
pub struct OrderBoard {
    orders: ListView<OrderItem>,
    dismissed: IndexSet<i64>,
    window_days: i64,
}

impl OrderBoard {
    pub fn new(notifications: &NotificationConfig) -> Self {
        Self {
            orders: ListView::new(),
            dismissed: IndexSet::new(),
            window_days: notifications.window_days,
        }
    }

    pub fn orders(&self) -> &ListView<OrderItem> {
        &self.orders
    }

    pub fn orders_mut(&mut self) -> &mut ListView<OrderItem> {
        &mut self.orders
    }

    pub fn is_dismissed(&self, order_id: i64) -> bool {
        self.dismissed.contains(&order_id)
    }

    pub fn reset(&mut self) {
        self.orders.reset();
        self.dismissed.clear();
    }

    pub async fn refresh(&mut self, service: &RecordService, session: &Session) -> Result<(), AppError> {
        self.orders.refresh(service, session).await
    }

    pub fn dismiss(&mut self, order_id: i64) {
        self.dismissed.insert(order_id);
    }

    /// 改状态; 进入终态时清除该订单的忽略标记
    pub async fn set_status(
        &mut self,
        service: &RecordService,
        session: &Session,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Stored<OrderItem>, AppError> {
        let updated = service.update_order_status(session, order_id, status).await?;
        if status.is_terminal() {
            self.dismissed.shift_remove(&order_id);
        }
        self.orders.reload(service, session).await;
        Ok(updated)
    }

    pub async fn mark_completed(
        &mut self,
        service: &RecordService,
        session: &Session,
        order_id: i64,
    ) -> Result<Stored<OrderItem>, AppError> {
        self.set_status(service, session, order_id, OrderStatus::Completed).await
    }

    pub fn notifications(&self, today: NaiveDate) -> Vec<Notification> {
        urgency::urgent_orders(self.orders.items(), today, self.window_days, &self.dismissed)
    }

    pub fn summary(&self, today: NaiveDate) -> OrderSummary {
        OrderSummary::compute(self.orders.items(), today)
    }
}
