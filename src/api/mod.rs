pub mod auth;
pub mod handlers;

use axum::{
    routing::{get, patch, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::models::{ClientMeasurements, FinancialRecord, InvoiceRecord, OrderItem};
use crate::service::RecordService;

pub use auth::{CurrentSession, USER_HEADER};
pub use handlers::health_check;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub records: RecordService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(records: RecordService, config: AppConfig) -> Self {
        Self {
            records,
            config: Arc::new(config),
        }
    }
}

/// 构建全部路由
pub fn router(state: AppState) -> Router {
    let invoices = Router::new()
        .route("/", get(handlers::list_invoices).post(handlers::create_invoice))
        .route("/new", get(handlers::new_invoice))
        .route("/export.csv", get(handlers::export_invoices))
        .route(
            "/:id",
            put(handlers::update_invoice).delete(handlers::delete_record::<InvoiceRecord>),
        )
        .route("/:id/preview", get(handlers::invoice_preview));

    let financial = Router::new()
        .route(
            "/",
            get(handlers::list_financial_records).post(handlers::create_record::<FinancialRecord>),
        )
        .route(
            "/:id",
            put(handlers::update_record::<FinancialRecord>)
                .delete(handlers::delete_record::<FinancialRecord>),
        );

    let measurements = Router::new()
        .route(
            "/",
            get(handlers::list_measurements).post(handlers::create_record::<ClientMeasurements>),
        )
        .route(
            "/:id",
            put(handlers::update_record::<ClientMeasurements>)
                .delete(handlers::delete_record::<ClientMeasurements>),
        );

    let orders = Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_record::<OrderItem>))
        .route("/notifications", get(handlers::order_notifications))
        .route(
            "/:id",
            put(handlers::update_record::<OrderItem>).delete(handlers::delete_record::<OrderItem>),
        )
        .route("/:id/status", patch(handlers::update_order_status));

    let dashboard = Router::new()
        .route("/financial", get(handlers::financial_dashboard))
        .route("/orders", get(handlers::order_dashboard));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/invoices", invoices)
        .nest("/api/financial-records", financial)
        .nest("/api/measurements", measurements)
        .nest("/api/orders", orders)
        .nest("/api/dashboard", dashboard)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
