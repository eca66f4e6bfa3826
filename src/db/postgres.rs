use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::time::{Duration, Instant};

use crate::db::store::{Collection, OrderBy, RecordStore, SortDirection, StoreError, StoredRow};
use crate::models::UserId;

/// 写操作超时
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// records 表行
#[derive(Debug, FromRow)]
pub struct RecordRow {
    pub id: i64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Json<Value>,
}

impl From<RecordRow> for StoredRow {
    fn from(row: RecordRow) -> Self {
        StoredRow {
            id: row.id,
            owner_id: UserId::new(row.owner_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
            data: row.data.0,
        }
    }
}

/// 建表 (启动时执行, 幂等)
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            id          BIGSERIAL PRIMARY KEY,
            collection  TEXT NOT NULL,
            owner_id    TEXT NOT NULL,
            data        JSONB NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS records_owner_collection_idx
            ON records (owner_id, collection)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// 插入记录
pub async fn insert_record(
    pool: &PgPool,
    collection: Collection,
    owner: &UserId,
    data: Value,
) -> Result<RecordRow, StoreError> {
    let start_time = Instant::now();
    let query = sqlx::query_as::<_, RecordRow>(
        r#"
        INSERT INTO records (collection, owner_id, data)
        VALUES ($1, $2, $3)
        RETURNING id, owner_id, created_at, updated_at, data
        "#,
    )
    .bind(collection.as_str())
    .bind(owner.as_str())
    .bind(Json(data));

    match tokio::time::timeout(WRITE_TIMEOUT, query.fetch_one(pool)).await {
        Ok(Ok(row)) => {
            tracing::debug!("INSERT {} id={} 耗时: {:?}", collection, row.id, start_time.elapsed());
            Ok(row)
        }
        Ok(Err(e)) => {
            tracing::error!("INSERT {} 失败, 耗时: {:?}, 错误: {:?}", collection, start_time.elapsed(), e);
            Err(e.into())
        }
        Err(_) => {
            tracing::error!("INSERT {} 超时 (>{:?})", collection, WRITE_TIMEOUT);
            Err(StoreError::Unavailable(format!("insert into {} timed out", collection)))
        }
    }
}

/// 整条替换记录正文
pub async fn replace_record(
    pool: &PgPool,
    collection: Collection,
    owner: &UserId,
    id: i64,
    data: Value,
) -> Result<Option<RecordRow>, sqlx::Error> {
    sqlx::query_as::<_, RecordRow>(
        r#"
        UPDATE records
        SET data = $1, updated_at = now()
        WHERE id = $2 AND collection = $3 AND owner_id = $4
        RETURNING id, owner_id, created_at, updated_at, data
        "#,
    )
    .bind(Json(data))
    .bind(id)
    .bind(collection.as_str())
    .bind(owner.as_str())
    .fetch_optional(pool)
    .await
}

/// 浅合并更新 (jsonb ||)
pub async fn update_record(
    pool: &PgPool,
    collection: Collection,
    owner: &UserId,
    id: i64,
    patch: Value,
) -> Result<Option<RecordRow>, sqlx::Error> {
    sqlx::query_as::<_, RecordRow>(
        r#"
        UPDATE records
        SET data = data || $1, updated_at = now()
        WHERE id = $2 AND collection = $3 AND owner_id = $4
        RETURNING id, owner_id, created_at, updated_at, data
        "#,
    )
    .bind(Json(patch))
    .bind(id)
    .bind(collection.as_str())
    .bind(owner.as_str())
    .fetch_optional(pool)
    .await
}

/// 删除记录, 返回影响行数
pub async fn delete_record(
    pool: &PgPool,
    collection: Collection,
    owner: &UserId,
    id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM records
        WHERE id = $1 AND collection = $2 AND owner_id = $3
        "#,
    )
    .bind(id)
    .bind(collection.as_str())
    .bind(owner.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// 查询集合全部记录 (只下推排序, 过滤在内存中做)
pub async fn list_records(
    pool: &PgPool,
    collection: Collection,
    owner: &UserId,
    order_by: &OrderBy,
) -> Result<Vec<RecordRow>, sqlx::Error> {
    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT id, owner_id, created_at, updated_at, data FROM records WHERE collection = ",
    );
    query_builder.push_bind(collection.as_str());
    query_builder.push(" AND owner_id = ");
    query_builder.push_bind(owner.as_str());

    match order_by.field.as_str() {
        "id" => query_builder.push(" ORDER BY id"),
        "created_at" => query_builder.push(" ORDER BY created_at"),
        "updated_at" => query_builder.push(" ORDER BY updated_at"),
        field => query_builder.push(" ORDER BY data -> ").push_bind(field.to_string()),
    };
    query_builder.push(match order_by.direction {
        SortDirection::Ascending => " ASC, id ASC",
        SortDirection::Descending => " DESC, id DESC",
    });

    query_builder.build_query_as::<RecordRow>().fetch_all(pool).await
}

/// Postgres 存储实现
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(
        &self,
        collection: Collection,
        owner: &UserId,
        data: Value,
    ) -> Result<StoredRow, StoreError> {
        insert_record(&self.pool, collection, owner, data).await.map(Into::into)
    }

    async fn update(
        &self,
        collection: Collection,
        owner: &UserId,
        id: i64,
        patch: Value,
    ) -> Result<StoredRow, StoreError> {
        update_record(&self.pool, collection, owner, id, patch)
            .await?
            .map(Into::into)
            .ok_or(StoreError::NotFound { collection, id })
    }

    async fn replace(
        &self,
        collection: Collection,
        owner: &UserId,
        id: i64,
        data: Value,
    ) -> Result<StoredRow, StoreError> {
        replace_record(&self.pool, collection, owner, id, data)
            .await?
            .map(Into::into)
            .ok_or(StoreError::NotFound { collection, id })
    }

    async fn delete(&self, collection: Collection, owner: &UserId, id: i64) -> Result<(), StoreError> {
        match delete_record(&self.pool, collection, owner, id).await? {
            0 => Err(StoreError::NotFound { collection, id }),
            _ => Ok(()),
        }
    }

    async fn select_all(
        &self,
        collection: Collection,
        owner: &UserId,
        order_by: &OrderBy,
    ) -> Result<Vec<StoredRow>, StoreError> {
        let rows = list_records(&self.pool, collection, owner, order_by).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
