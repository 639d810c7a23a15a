//! Typed collection handles over the schemaless document table.
//!
//! Mirrors the remote-document-store contract the frontend was written
//! against: server-assigned ids and timestamps, partial-field updates that
//! report before/after state, hard deletes that return the removed record,
//! and a change feed that republishes the full newest-first collection after
//! every mutation.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use tokio::sync::watch;

use crate::errors::AppError;

/// A record type stored in a named collection.
///
/// Creation timestamps are RFC 3339 strings assigned by the store; the
/// timestamp field name is per-type because go-live sessions stamp
/// `startTime` instead of `createdAt`.
pub trait Document:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    const COLLECTION: &'static str;
    const TIMESTAMP_FIELD: &'static str = "createdAt";

    fn id(&self) -> &str;
}

/// Before/after snapshot returned by [`Collection::update`] for the caller's
/// audit trail. Not persisted anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Updated<T> {
    pub before: T,
    pub after: T,
}

/// Handle to one collection. Clones share the same change feed, so construct
/// collections once (via [`super::Store::new`]) per process.
#[derive(Clone)]
pub struct Collection<T: Document> {
    pool: SqlitePool,
    feed: Arc<watch::Sender<Vec<T>>>,
}

impl<T: Document> Collection<T> {
    pub fn new(pool: SqlitePool) -> Self {
        let (feed, _) = watch::channel(Vec::new());
        Self {
            pool,
            feed: Arc::new(feed),
        }
    }

    /// Insert a record. The store assigns the id and creation timestamp,
    /// overwriting anything the caller supplied, and returns the stored record.
    pub async fn add(&self, record: T) -> Result<T, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let mut body = serde_json::to_value(&record)?;
        let fields = body
            .as_object_mut()
            .ok_or_else(|| AppError::Validation("Record must be a JSON object".to_string()))?;
        fields.insert("id".to_string(), json!(id));
        fields.insert(T::TIMESTAMP_FIELD.to_string(), json!(now));

        sqlx::query(
            "INSERT INTO documents (collection, id, body, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(T::COLLECTION)
        .bind(&id)
        .bind(body.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let stored: T = serde_json::from_value(body)?;
        self.publish().await?;
        Ok(stored)
    }

    /// List the full collection, newest first.
    pub async fn list(&self) -> Result<Vec<T>, AppError> {
        let rows = sqlx::query(
            "SELECT body FROM documents WHERE collection = ? ORDER BY created_at DESC, id",
        )
        .bind(T::COLLECTION)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let body: String = row.get("body");
                serde_json::from_str(&body).map_err(AppError::from)
            })
            .collect()
    }

    /// Get a record by id.
    pub async fn get(&self, id: &str) -> Result<Option<T>, AppError> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = ? AND id = ?")
            .bind(T::COLLECTION)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.get("body");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    /// Merge top-level fields of `patch` into the stored record and stamp
    /// `updatedAt`. The id and creation-timestamp fields cannot be patched.
    /// Returns the prior and new record states.
    pub async fn update(&self, id: &str, patch: Value) -> Result<Updated<T>, AppError> {
        let patch = match patch {
            Value::Object(map) => map,
            _ => {
                return Err(AppError::Validation(
                    "Update payload must be a JSON object".to_string(),
                ))
            }
        };

        let row = sqlx::query("SELECT body FROM documents WHERE collection = ? AND id = ?")
            .bind(T::COLLECTION)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("{} {} not found", T::COLLECTION, id))
            })?;

        let body: String = row.get("body");
        let mut body: Value = serde_json::from_str(&body)?;
        let before: T = serde_json::from_value(body.clone())?;

        let fields = body
            .as_object_mut()
            .ok_or_else(|| AppError::Internal("Stored record is not a JSON object".to_string()))?;
        for (key, value) in patch {
            if key == "id" || key == T::TIMESTAMP_FIELD {
                continue;
            }
            fields.insert(key, value);
        }
        fields.insert("updatedAt".to_string(), json!(Utc::now().to_rfc3339()));

        let after: T = serde_json::from_value(body.clone())?;

        sqlx::query("UPDATE documents SET body = ? WHERE collection = ? AND id = ?")
            .bind(body.to_string())
            .bind(T::COLLECTION)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.publish().await?;
        Ok(Updated { before, after })
    }

    /// Hard-delete a record, returning its prior state, or `None` when the
    /// record was already absent (deleting a missing record is not an error).
    pub async fn delete(&self, id: &str) -> Result<Option<T>, AppError> {
        let prior = self.get(id).await?;
        if prior.is_some() {
            sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
                .bind(T::COLLECTION)
                .bind(id)
                .execute(&self.pool)
                .await?;
            self.publish().await?;
        }
        Ok(prior)
    }

    /// Subscribe to the change feed. The receiver yields the full newest-first
    /// collection after every mutation; dropping it unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.feed.subscribe()
    }

    async fn publish(&self) -> Result<(), AppError> {
        let snapshot = self.list().await?;
        self.feed.send_replace(snapshot);
        Ok(())
    }
}
