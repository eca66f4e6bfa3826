use couture_desk::{open_store, router, AppConfig, AppState, RecordService};
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });
    info!(
        "Starting server on {}:{} (tax rate {}%, due in {} days, reminder window {} days)",
        config.server.host,
        config.server.port,
        config.invoice.default_tax_rate,
        config.invoice.due_in_days,
        config.notifications.window_days
    );

    // 打开存储
    let store = open_store(&config.database).await?;
    info!("Record store ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = router(AppState::new(RecordService::new(store), config));

    // 启动服务器
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET/POST /api/invoices          - invoices (+ /new, /export.csv, /:id/preview)");
    info!("  GET/POST /api/financial-records - income and expenses (?type=INCOME|EXPENSE)");
    info!("  GET/POST /api/measurements      - client measurement profiles");
    info!("  GET/POST /api/orders            - order board (+ /:id/status, /notifications)");
    info!("  GET      /api/dashboard/*       - financial and order summaries");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
