pub mod memory;
pub mod pool;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use pool::create_pool;
pub use postgres::{ensure_schema, PgRecordStore};
pub use store::{Collection, OrderBy, RecordStore, SortDirection, StoreError, StoredRow};

use std::sync::Arc;

use crate::config::DatabaseConfig;

pub const MEMORY_URL: &str = "memory://";

/// 按数据库地址打开存储: `memory://` 使用进程内存储, 其余走 Postgres
pub async fn open_store(database: &DatabaseConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    if database.url.starts_with(MEMORY_URL) {
        tracing::warn!("Using in-memory store, records are lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = create_pool(database).await?;
    ensure_schema(&pool).await?;
    tracing::info!("Database pool created, schema ready");
    Ok(Arc::new(PgRecordStore::new(pool)))
}
