use bigdecimal::BigDecimal;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub invoice: InvoiceConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://...` 或 `memory://` (进程内存储, 开发用)
    pub url: String,
    pub max_connections: u32,
}

/// 新建发票草稿的默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceConfig {
    pub default_tax_rate: BigDecimal,
    pub due_in_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// 到期前多少天进入提醒栏
    pub window_days: i64,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            default_tax_rate: BigDecimal::from(75) / BigDecimal::from(10),
            due_in_days: 14,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { window_days: 3 }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/couture_desk".to_string()),
                max_connections: 10,
            },
            invoice: InvoiceConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 < couture.toml (可选) < COUTURE__* 环境变量 < DATABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", i64::from(defaults.database.max_connections))?
            .set_default("invoice.default_tax_rate", defaults.invoice.default_tax_rate.to_string())?
            .set_default("invoice.due_in_days", defaults.invoice.due_in_days)?
            .set_default("notifications.window_days", defaults.notifications.window_days)?
            .add_source(File::with_name("couture").required(false))
            .add_source(Environment::with_prefix("COUTURE").separator("__"))
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()
    }
}
