use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering as AtomicOrdering};

use crate::db::store::{Collection, OrderBy, RecordStore, SortDirection, StoreError, StoredRow};
use crate::models::UserId;

/// 进程内存储 (开发/测试)
///
/// 行为与 Postgres 实现一致: 按用户隔离, 浅合并更新, 只支持排序。
/// `set_failing(true)` 之后所有调用都返回 `StoreError::Unavailable`。
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: DashMap<Collection, Vec<StoredRow>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    /// 累计调用次数 (含失败调用)
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn enter(&self, op: &str, collection: Collection) -> Result<(), StoreError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{} on {} rejected", op, collection)));
        }
        Ok(())
    }
}

fn sort_key(row: &StoredRow, field: &str) -> Value {
    match field {
        "id" => Value::from(row.id),
        "created_at" => Value::from(row.created_at.to_rfc3339()),
        "updated_at" => Value::from(row.updated_at.to_rfc3339()),
        _ => row.data.get(field).cloned().unwrap_or(Value::Null),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// 与 jsonb 排序一致: 先按类型, 再按值
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(
        &self,
        collection: Collection,
        owner: &UserId,
        data: Value,
    ) -> Result<StoredRow, StoreError> {
        self.enter("insert", collection)?;
        let now = Utc::now();
        let row = StoredRow {
            id: self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1,
            owner_id: owner.clone(),
            created_at: now,
            updated_at: now,
            data,
        };
        self.rows.entry(collection).or_default().push(row.clone());
        Ok(row)
    }

    async fn replace(
        &self,
        collection: Collection,
        owner: &UserId,
        id: i64,
        data: Value,
    ) -> Result<StoredRow, StoreError> {
        self.enter("replace", collection)?;
        let mut rows = self.rows.entry(collection).or_default();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id && &r.owner_id == owner)
            .ok_or(StoreError::NotFound { collection, id })?;

        row.data = data;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn update(
        &self,
        collection: Collection,
        owner: &UserId,
        id: i64,
        patch: Value,
    ) -> Result<StoredRow, StoreError> {
        self.enter("update", collection)?;
        let Value::Object(fields) = patch else {
            return Err(StoreError::InvalidPatch);
        };

        let mut rows = self.rows.entry(collection).or_default();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id && &r.owner_id == owner)
            .ok_or(StoreError::NotFound { collection, id })?;

        match &mut row.data {
            Value::Object(data) => data.extend(fields),
            other => *other = Value::Object(fields),
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, collection: Collection, owner: &UserId, id: i64) -> Result<(), StoreError> {
        self.enter("delete", collection)?;
        let mut rows = self.rows.entry(collection).or_default();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && &r.owner_id == owner));
        if rows.len() == before {
            return Err(StoreError::NotFound { collection, id });
        }
        Ok(())
    }

    async fn select_all(
        &self,
        collection: Collection,
        owner: &UserId,
        order_by: &OrderBy,
    ) -> Result<Vec<StoredRow>, StoreError> {
        self.enter("select", collection)?;
        let mut rows: Vec<StoredRow> = self
            .rows
            .get(&collection)
            .map(|rows| rows.iter().filter(|r| &r.owner_id == owner).cloned().collect())
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            let ord = compare_values(&sort_key(a, &order_by.field), &sort_key(b, &order_by.field))
                .then_with(|| a.id.cmp(&b.id));
            match order_by.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn owner() -> UserId {
        UserId::new("user-1")
    }

    #[tokio::test]
    async fn rows_are_scoped_to_their_owner() {
        let store = MemoryStore::new();
        store.insert(Collection::Todos, &owner(), json!({"n": 1})).await.unwrap();
        store
            .insert(Collection::Todos, &UserId::new("user-2"), json!({"n": 2}))
            .await
            .unwrap();

        let rows = store
            .select_all(Collection::Todos, &owner(), &OrderBy::asc("id"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].data["n"], 1);

        let err = store.delete(Collection::Todos, &owner(), 2).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 2, .. }));
    }

    #[tokio::test]
    async fn update_merges_top_level_fields() {
        let store = MemoryStore::new();
        let row = store
            .insert(Collection::Todos, &owner(), json!({"status": "PENDING", "client_name": "Ngozi"}))
            .await
            .unwrap();

        let updated = store
            .update(Collection::Todos, &owner(), row.id, json!({"status": "DELIVERED"}))
            .await
            .unwrap();
        assert_eq!(updated.data, json!({"status": "DELIVERED", "client_name": "Ngozi"}));

        let err = store
            .update(Collection::Todos, &owner(), row.id, json!(["not", "an", "object"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPatch));
    }

    #[tokio::test]
    async fn replace_drops_fields_missing_from_the_new_body() {
        let store = MemoryStore::new();
        let row = store
            .insert(Collection::Todos, &owner(), json!({"client_name": "Ngozi", "notes": "old note"}))
            .await
            .unwrap();

        let replaced = store
            .replace(Collection::Todos, &owner(), row.id, json!({"client_name": "Ngozi"}))
            .await
            .unwrap();
        assert_eq!(replaced.data, json!({"client_name": "Ngozi"}));

        let err = store
            .replace(Collection::Todos, &UserId::new("user-2"), row.id, json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn select_orders_by_record_field() {
        let store = MemoryStore::new();
        for date in ["2026-10-21", "2026-10-19", "2026-10-20"] {
            store
                .insert(Collection::Todos, &owner(), json!({"due_date": date}))
                .await
                .unwrap();
        }

        let asc = store
            .select_all(Collection::Todos, &owner(), &OrderBy::asc("due_date"))
            .await
            .unwrap();
        let dates: Vec<_> = asc.iter().map(|r| r.data["due_date"].as_str().unwrap()).collect();
        assert_eq!(dates, ["2026-10-19", "2026-10-20", "2026-10-21"]);

        let desc = store
            .select_all(Collection::Todos, &owner(), &OrderBy::desc("id"))
            .await
            .unwrap();
        assert_eq!(desc[0].id, 3);
    }

    #[tokio::test]
    async fn failing_store_still_counts_calls() {
        let store = MemoryStore::new();
        store.set_failing(true);
        let err = store
            .select_all(Collection::Invoices, &owner(), &OrderBy::desc("created_at"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.calls(), 1);
    }
}
