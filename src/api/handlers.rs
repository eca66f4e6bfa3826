use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::api::auth::CurrentSession;
use crate::api::AppState;
use crate::db::{Collection, StoreError};
use crate::error::AppError;
use crate::models::{
    ClientMeasurements, FinancialRecord, InvoiceDraft, InvoiceRecord, OrderItem, OrderStatus,
    RecordKind, Stored,
};
use crate::service::filter::{self, StatusFilter};
use crate::service::{
    export, invoice_number, urgency, FinancialSummary, InvoiceListRow, InvoicePreview,
    Notification, OrderSummary, Resource,
};

/// 列表搜索参数
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: StatusFilter,
}

#[derive(Debug, Default, Deserialize)]
pub struct FinancialQuery {
    #[serde(rename = "type")]
    pub kind: Option<RecordKind>,
}

/// 删除确认: `?confirm=true`
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// 以哪天为"今天"计算到期 (默认本地日期)
#[derive(Debug, Default, Deserialize)]
pub struct TodayQuery {
    pub today: Option<NaiveDate>,
}

impl TodayQuery {
    fn resolve(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// 提醒栏响应
#[derive(Debug, Serialize)]
pub struct NotificationBanner {
    pub heading: String,
    pub notifications: Vec<Notification>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

// ---------- 通用记录接口 ----------

pub async fn create_record<R: Resource>(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(record): Json<R>,
) -> Result<(StatusCode, Json<Stored<R>>), AppError> {
    let saved = state.records.create(&session, &record).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn update_record<R: Resource>(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
    Json(record): Json<R>,
) -> Result<Json<Stored<R>>, AppError> {
    let saved = state.records.update(&session, id, &record).await?;
    Ok(Json(saved))
}

pub async fn delete_record<R: Resource>(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, AppError> {
    state
        .records
        .delete::<R>(&session, id, query.confirm.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------- 发票 ----------

pub async fn list_invoices(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<InvoiceListRow>>, AppError> {
    let invoices = state.records.list::<InvoiceRecord>(&session).await?;
    let rows = filter::filter_invoices(&invoices, &query.search)
        .into_iter()
        .map(InvoiceListRow::from_stored)
        .collect();
    Ok(Json(rows))
}

/// 新发票草稿 (编号、日期、税率按配置预填)
pub async fn new_invoice(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<TodayQuery>,
) -> Result<Json<InvoiceDraft>, AppError> {
    session.require_user()?;
    let today = query.resolve();
    Ok(Json(InvoiceDraft::new(
        invoice_number::generate(today),
        today,
        &state.config.invoice,
    )))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(draft): Json<InvoiceDraft>,
) -> Result<(StatusCode, Json<InvoiceDraft>), AppError> {
    let saved = state.records.create(&session, &draft.to_record()).await?;
    Ok((StatusCode::CREATED, Json(InvoiceDraft::from_stored(&saved))))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
    Json(draft): Json<InvoiceDraft>,
) -> Result<Json<InvoiceDraft>, AppError> {
    let saved = state.records.update(&session, id, &draft.to_record()).await?;
    Ok(Json(InvoiceDraft::from_stored(&saved)))
}

pub async fn invoice_preview(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
) -> Result<Json<InvoicePreview>, AppError> {
    let invoices = state.records.list::<InvoiceRecord>(&session).await?;
    let invoice = invoices
        .iter()
        .find(|i| i.id == id)
        .ok_or(StoreError::NotFound {
            collection: Collection::Invoices,
            id,
        })?;
    Ok(Json(InvoicePreview::new(&InvoiceDraft::from_stored(invoice))))
}

/// 发票台账 CSV
pub async fn export_invoices(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let invoices = state.records.list::<InvoiceRecord>(&session).await?;
    let mut body = Vec::new();
    export::write_invoice_ledger(&invoices, &mut body)?;
    tracing::info!("Exported {} invoices", invoices.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"invoices.csv\""),
        ],
        body,
    )
        .into_response())
}

// ---------- 收支 ----------

pub async fn list_financial_records(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<FinancialQuery>,
) -> Result<Json<Vec<Stored<FinancialRecord>>>, AppError> {
    let records = state.records.list::<FinancialRecord>(&session).await?;
    let filtered = filter::filter_financial(&records, query.kind)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(filtered))
}

pub async fn financial_dashboard(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<FinancialSummary>, AppError> {
    Ok(Json(state.records.financial_summary(&session).await?))
}

// ---------- 量体 ----------

pub async fn list_measurements(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Stored<ClientMeasurements>>>, AppError> {
    let profiles = state.records.list::<ClientMeasurements>(&session).await?;
    let filtered = filter::filter_measurements(&profiles, &query.search)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(filtered))
}

// ---------- 订单 ----------

pub async fn list_orders(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<Stored<OrderItem>>>, AppError> {
    let orders = state.records.list::<OrderItem>(&session).await?;
    let filtered = filter::filter_orders(&orders, &query.search, query.status)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(filtered))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Stored<OrderItem>>, AppError> {
    let saved = state
        .records
        .update_order_status(&session, id, update.status)
        .await?;
    Ok(Json(saved))
}

/// 紧急订单提醒 (忽略状态只存在于客户端, 这里不处理)
pub async fn order_notifications(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<TodayQuery>,
) -> Result<Json<NotificationBanner>, AppError> {
    let orders = state.records.list::<OrderItem>(&session).await?;
    let notifications = urgency::urgent_orders(
        &orders,
        query.resolve(),
        state.config.notifications.window_days,
        &Default::default(),
    );
    Ok(Json(NotificationBanner {
        heading: urgency::banner_heading(notifications.len()),
        notifications,
    }))
}

pub async fn order_dashboard(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<TodayQuery>,
) -> Result<Json<OrderSummary>, AppError> {
    Ok(Json(state.records.order_summary(&session, query.resolve()).await?))
}
