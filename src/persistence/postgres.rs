//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use sqlx::postgres::PgPoolOptions;

use super::models::StoredDocument;
use crate::config::StorefrontConfig;
use crate::domain::DepotEvent;
use crate::error::DepotError;
use crate::store::DocKey;

fn db_error(e: impl std::fmt::Display) -> DepotError {
    DepotError::PersistenceError(e.to_string())
}

async fn upsert_document(
    conn: &mut PgConnection,
    key: &DocKey,
    body: &serde_json::Value,
) -> Result<(), DepotError> {
    sqlx::query(
        "INSERT INTO documents (collection, doc_id, body, updated_at) VALUES ($1, $2, $3, now()) \
         ON CONFLICT (collection, doc_id) DO UPDATE SET body = EXCLUDED.body, updated_at = now()",
    )
    .bind(key.collection())
    .bind(key.doc_id())
    .bind(body)
    .execute(conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`DepotError::PersistenceError`] if the database is
    /// unreachable.
    pub async fn connect(config: &StorefrontConfig) -> Result<Self, DepotError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(db_error)?;
        Ok(Self::new(pool))
    }

    /// Applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`DepotError::PersistenceError`] if a migration fails.
    pub async fn ensure_schema(&self) -> Result<(), DepotError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(db_error)
    }

    /// Writes one committed change in a single database transaction: the
    /// event log row plus the current content of every document the commit
    /// touched. `None` deletes the row.
    ///
    /// # Errors
    ///
    /// Returns a [`DepotError::PersistenceError`] on database failure.
    /// Nothing is written in that case.
    pub async fn write_commit(
        &self,
        event: &DepotEvent,
        documents: &[(DocKey, Option<serde_json::Value>)],
    ) -> Result<(), DepotError> {
        let payload = serde_json::to_value(event).map_err(db_error)?;
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            "INSERT INTO ledger_events (event_type, user_id, payload) VALUES ($1, $2, $3)",
        )
        .bind(event.event_type_str())
        .bind(event.user_id().map(ToString::to_string))
        .bind(payload)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        for (key, body) in documents {
            match body {
                Some(body) => upsert_document(&mut tx, key, body).await?,
                None => {
                    sqlx::query("DELETE FROM documents WHERE collection = $1 AND doc_id = $2")
                        .bind(key.collection())
                        .bind(key.doc_id())
                        .execute(&mut *tx)
                        .await
                        .map_err(db_error)?;
                }
            }
        }

        tx.commit().await.map_err(db_error)
    }

    /// Replaces the whole document table with `documents` in one
    /// transaction. Returns the number of documents written.
    ///
    /// # Errors
    ///
    /// Returns a [`DepotError::PersistenceError`] on database failure.
    /// The previous content is kept in that case.
    pub async fn replace_documents(
        &self,
        documents: &[(DocKey, serde_json::Value)],
    ) -> Result<usize, DepotError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        sqlx::query("DELETE FROM documents")
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        for (key, body) in documents {
            upsert_document(&mut tx, key, body).await?;
        }
        tx.commit().await.map_err(db_error)?;
        Ok(documents.len())
    }

    /// Loads every mirrored document.
    ///
    /// # Errors
    ///
    /// Returns a [`DepotError::PersistenceError`] on database failure.
    pub async fn load_documents(&self) -> Result<Vec<StoredDocument>, DepotError> {
        let rows = sqlx::query_as::<_, (String, String, serde_json::Value, DateTime<Utc>)>(
            "SELECT collection, doc_id, body, updated_at FROM documents ORDER BY collection, doc_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|(collection, doc_id, body, updated_at)| StoredDocument {
                collection,
                doc_id,
                body,
                updated_at,
            })
            .collect())
    }
}
