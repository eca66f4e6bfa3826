pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use api::{router, AppState};
pub use config::AppConfig;
pub use db::{create_pool, open_store, MemoryStore, RecordStore};
pub use error::AppError;
pub use service::RecordService;
