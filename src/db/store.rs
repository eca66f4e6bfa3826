use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::models::{Stored, UserId};

/// 存储集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Invoices,
    FinancialRecords,
    Measurements,
    Todos,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Invoices => "invoices",
            Collection::FinancialRecords => "financial_records",
            Collection::Measurements => "measurements",
            Collection::Todos => "todos",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// 排序字段: `created_at` / `updated_at` / `id` 取服务端字段, 其余取记录正文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

/// 存储原始行
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: i64,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Value,
}

impl StoredRow {
    pub fn decode<T: DeserializeOwned>(self) -> Result<Stored<T>, StoreError> {
        Ok(Stored {
            id: self.id,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            data: serde_json::from_value(self.data).map_err(StoreError::Corrupt)?,
        })
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{collection} record {id} not found")]
    NotFound { collection: Collection, id: i64 },

    #[error("update patch must be a JSON object")]
    InvalidPatch,

    #[error("record payload is not valid: {0}")]
    Payload(#[from] serde_json::Error),

    /// 已存储的数据无法解码为记录类型
    #[error("stored record is corrupt: {0}")]
    Corrupt(serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// 远端数据存储 (所有操作按归属用户隔离)
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 插入完整记录 (不含服务端字段), 返回落库后的行
    async fn insert(
        &self,
        collection: Collection,
        owner: &UserId,
        data: Value,
    ) -> Result<StoredRow, StoreError>;

    /// 按 id 整条替换记录正文
    async fn replace(
        &self,
        collection: Collection,
        owner: &UserId,
        id: i64,
        data: Value,
    ) -> Result<StoredRow, StoreError>;

    /// 按 id 更新, `patch` 的顶层字段浅合并进记录
    async fn update(
        &self,
        collection: Collection,
        owner: &UserId,
        id: i64,
        patch: Value,
    ) -> Result<StoredRow, StoreError>;

    async fn delete(&self, collection: Collection, owner: &UserId, id: i64) -> Result<(), StoreError>;

    async fn select_all(
        &self,
        collection: Collection,
        owner: &UserId,
        order_by: &OrderBy,
    ) -> Result<Vec<StoredRow>, StoreError>;
}
