//! SQLite capability store.
//!
//! A single table, `capabilities`, keyed by an auto-incrementing id and
//! indexed by module, function and keywords. Embeddings are stored as
//! little-endian `f32` blobs and stay NULL until the first vector search.
//!
//! The catalog is the only shared mutable resource in the pipeline. It is
//! owned explicitly and handed out as `Arc<CapabilityCatalog>`; the pool
//! serializes writers (WAL + busy timeout), and every embedding backfill is a
//! single-row UPDATE so readers never observe a half-written vector.

use crate::context::render_context;
use crate::seed::default_capabilities;
use crate::vector;
use chrono::Utc;
use genie_core::error::CatalogError;
use genie_core::{CapabilityDoc, Provider};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default result count of a keyword search.
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;

/// Number of docs rendered into a retrieval context.
pub const CONTEXT_LIMIT: i64 = 5;

const SELECT_COLUMNS: &str = "id, module, function, description, signature, parameters, \
                              return_spec, example, keywords, embedding, created_at";

/// The capability catalog.
pub struct CapabilityCatalog {
    pool: SqlitePool,
    embedder: Option<Arc<dyn Provider>>,
}

impl CapabilityCatalog {
    /// Open (or create) the catalog at `path`.
    ///
    /// Pass `":memory:"` for an ephemeral in-process catalog (useful for tests).
    /// Failure here is fatal to catalog construction.
    pub async fn open(path: &str) -> Result<Self, CatalogError> {
        let in_memory = path == ":memory:" || path.starts_with("sqlite::memory:");
        let options = if in_memory || path.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(path)
                .map_err(|e| CatalogError::Storage(format!("Invalid SQLite path: {e}")))?
        } else {
            SqliteConnectOptions::new().filename(path)
        };
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let mut pool_options = SqlitePoolOptions::new().max_connections(4);
        if in_memory {
            // Every connection would open its own empty database
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| CatalogError::Storage(format!("Failed to open SQLite: {e}")))?;

        let catalog = Self {
            pool,
            embedder: None,
        };
        catalog.run_migrations().await?;
        info!("Capability catalog opened at {path}");
        Ok(catalog)
    }

    /// Attach the provider used for embeddings.
    pub fn with_embedder(mut self, embedder: Arc<dyn Provider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn set_embedder(&mut self, embedder: Option<Arc<dyn Provider>>) {
        self.embedder = embedder;
    }

    async fn run_migrations(&self) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS capabilities (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                module      TEXT NOT NULL,
                function    TEXT NOT NULL,
                description TEXT,
                signature   TEXT,
                parameters  TEXT,
                return_spec TEXT,
                example     TEXT,
                keywords    TEXT,
                embedding   BLOB,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CatalogError::MigrationFailed(format!("capabilities table: {e}")))?;

        for (name, column) in [
            ("idx_capabilities_module", "module"),
            ("idx_capabilities_function", "function"),
            ("idx_capabilities_keywords", "keywords"),
        ] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {name} ON capabilities({column})"
            ))
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogError::MigrationFailed(format!("{name}: {e}")))?;
        }

        debug!("Catalog migrations complete");
        Ok(())
    }

    /// Parse a `CapabilityDoc` from a row.
    fn row_to_doc(row: &sqlx::sqlite::SqliteRow) -> Result<CapabilityDoc, CatalogError> {
        fn text(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<String, CatalogError> {
            let value: Option<String> = row
                .try_get(column)
                .map_err(|e| CatalogError::QueryFailed(format!("{column} column: {e}")))?;
            Ok(value.unwrap_or_default())
        }

        let id: i64 = row
            .try_get("id")
            .map_err(|e| CatalogError::QueryFailed(format!("id column: {e}")))?;
        let blob: Option<Vec<u8>> = row
            .try_get("embedding")
            .map_err(|e| CatalogError::QueryFailed(format!("embedding column: {e}")))?;
        let created_at = text(row, "created_at")?;

        Ok(CapabilityDoc {
            id,
            module: text(row, "module")?,
            function: text(row, "function")?,
            description: text(row, "description")?,
            signature: text(row, "signature")?,
            parameters: text(row, "parameters")?,
            return_spec: text(row, "return_spec")?,
            example: text(row, "example")?,
            keywords: text(row, "keywords")?,
            embedding: blob.as_deref().and_then(Self::blob_to_embedding),
            created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .ok(),
        })
    }

    /// Decode rows, skipping (and logging) any that fail to parse.
    fn decode_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Vec<CapabilityDoc> {
        rows.iter()
            .filter_map(|row| match Self::row_to_doc(row) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable capability row");
                    None
                }
            })
            .collect()
    }

    /// Serialize an embedding vector to bytes.
    fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize an embedding blob; empty or ragged blobs read as absent.
    fn blob_to_embedding(blob: &[u8]) -> Option<Vec<f32>> {
        if blob.is_empty() || blob.len() % 4 != 0 {
            return None;
        }
        Some(
            blob.chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        )
    }

    /// Escape LIKE wildcards so the query is matched literally.
    ///
    /// Folds ASCII only, the same way SQLite's `LOWER()` does.
    fn like_pattern(query: &str) -> String {
        let escaped = query
            .to_ascii_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    }

    // ── Curation ──

    /// Insert a descriptor and return its id.
    pub async fn add(&self, doc: &CapabilityDoc) -> Result<i64, CatalogError> {
        let embedding_blob: Option<Vec<u8>> =
            doc.embedding.as_deref().map(Self::embedding_to_blob);

        let result = sqlx::query(
            r#"
            INSERT INTO capabilities
                (module, function, description, signature, parameters, return_spec, example, keywords, embedding, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&doc.module)
        .bind(&doc.function)
        .bind(&doc.description)
        .bind(&doc.signature)
        .bind(&doc.parameters)
        .bind(&doc.return_spec)
        .bind(&doc.example)
        .bind(&doc.keywords)
        .bind(embedding_blob.as_deref())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            CatalogError::Storage(format!("INSERT {} failed: {e}", doc.qualified_name()))
        })?;

        let id = result.last_insert_rowid();
        debug!(id, capability = %doc.qualified_name(), "Stored capability");
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> Result<Option<CapabilityDoc>, CatalogError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM capabilities WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::QueryFailed(format!("GET by ID: {e}")))?;

        match row {
            Some(ref r) => Ok(Some(Self::row_to_doc(r)?)),
            None => Ok(None),
        }
    }

    pub async fn count(&self) -> Result<usize, CatalogError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM capabilities")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CatalogError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| CatalogError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }

    /// Number of descriptors still waiting for an embedding.
    pub async fn pending_embeddings(&self) -> Result<usize, CatalogError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS cnt FROM capabilities WHERE embedding IS NULL OR length(embedding) = 0",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CatalogError::QueryFailed(format!("pending COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| CatalogError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }

    /// Load the default catalog unless it is already present.
    ///
    /// Returns the number of descriptors inserted (0 when skipped).
    pub async fn seed_defaults(&self) -> Result<usize, CatalogError> {
        if !self.search("click", 1).await?.is_empty() {
            debug!("Default catalog already present, skipping seed");
            return Ok(0);
        }

        let docs = default_capabilities();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CatalogError::Storage(format!("BEGIN failed: {e}")))?;

        let now = Utc::now().to_rfc3339();
        for doc in &docs {
            sqlx::query(
                r#"
                INSERT INTO capabilities
                    (module, function, description, signature, parameters, return_spec, example, keywords, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&doc.module)
            .bind(&doc.function)
            .bind(&doc.description)
            .bind(&doc.signature)
            .bind(&doc.parameters)
            .bind(&doc.return_spec)
            .bind(&doc.example)
            .bind(&doc.keywords)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                CatalogError::Storage(format!("Seeding {} failed: {e}", doc.qualified_name()))
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| CatalogError::Storage(format!("COMMIT failed: {e}")))?;

        info!(count = docs.len(), "Default capability catalog seeded");
        Ok(docs.len())
    }

    // ── Retrieval ──

    /// Case-insensitive substring search with fixed field priority.
    ///
    /// Function-name matches rank first, then description, keywords, and
    /// module-only matches; ties keep storage order. `limit <= 0` means 10.
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<CapabilityDoc>, CatalogError> {
        let limit = if limit <= 0 { DEFAULT_SEARCH_LIMIT } else { limit };
        let pattern = Self::like_pattern(query);

        let sql = format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM capabilities
            WHERE LOWER(function) LIKE ?1 ESCAPE '\'
               OR LOWER(description) LIKE ?1 ESCAPE '\'
               OR LOWER(keywords) LIKE ?1 ESCAPE '\'
               OR LOWER(module) LIKE ?1 ESCAPE '\'
            ORDER BY
                CASE
                    WHEN LOWER(function) LIKE ?1 ESCAPE '\' THEN 1
                    WHEN LOWER(description) LIKE ?1 ESCAPE '\' THEN 2
                    WHEN LOWER(keywords) LIKE ?1 ESCAPE '\' THEN 3
                    ELSE 4
                END,
                id
            LIMIT ?2
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::QueryFailed(format!("Keyword search: {e}")))?;

        let docs = Self::decode_rows(&rows);
        debug!(query, hits = docs.len(), "Keyword search");
        Ok(docs)
    }

    /// All descriptors of one module, in storage order.
    pub async fn by_module(&self, module: &str) -> Result<Vec<CapabilityDoc>, CatalogError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM capabilities WHERE module = ?1 ORDER BY id"
        ))
        .bind(module)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::QueryFailed(format!("Module lookup: {e}")))?;

        Ok(Self::decode_rows(&rows))
    }

    /// Compute embeddings for every descriptor that lacks one.
    ///
    /// Rows are processed sequentially; the first provider error stops the
    /// backfill and is returned, leaving already-written vectors in place.
    /// Returns the number of embeddings written.
    pub async fn ensure_embeddings(&self) -> Result<usize, CatalogError> {
        let embedder = self.embedder.as_ref().ok_or_else(|| {
            CatalogError::EmbeddingFailed("no embedding provider configured".into())
        })?;

        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM capabilities \
             WHERE embedding IS NULL OR length(embedding) = 0 ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::QueryFailed(format!("Pending embeddings: {e}")))?;

        let pending = Self::decode_rows(&rows);
        if pending.is_empty() {
            return Ok(0);
        }
        info!(pending = pending.len(), provider = embedder.name(), "Backfilling embeddings");

        let mut written = 0;
        for doc in &pending {
            let vector = embedder.embed(&doc.embedding_text()).await.map_err(|e| {
                CatalogError::EmbeddingFailed(format!("{}: {e}", doc.qualified_name()))
            })?;
            if vector.is_empty() {
                return Err(CatalogError::EmbeddingFailed(format!(
                    "{}: provider returned an empty vector",
                    doc.qualified_name()
                )));
            }

            sqlx::query("UPDATE capabilities SET embedding = ?1 WHERE id = ?2")
                .bind(Self::embedding_to_blob(&vector))
                .bind(doc.id)
                .execute(&self.pool)
                .await
                .map_err(|e| CatalogError::Storage(format!("Saving embedding: {e}")))?;

            written += 1;
            debug!(id = doc.id, dims = vector.len(), "Embedding stored");
        }

        Ok(written)
    }

    /// Rank stored descriptors by cosine similarity to the query.
    ///
    /// Without an embedding provider this degrades to keyword `search`.
    /// `limit <= 0` (or past the end) returns every embedded descriptor.
    pub async fn search_with_embeddings(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<CapabilityDoc>, CatalogError> {
        let Some(embedder) = self.embedder.as_ref() else {
            debug!("No embedding provider, using keyword search");
            return self.search(query, limit).await;
        };

        let query_vector = embedder
            .embed(query)
            .await
            .map_err(|e| CatalogError::EmbeddingFailed(format!("query: {e}")))?;

        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM capabilities \
             WHERE embedding IS NOT NULL AND length(embedding) > 0 ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::QueryFailed(format!("Vector scan: {e}")))?;

        let docs = Self::decode_rows(&rows);
        let ranked = vector::rank_by_similarity(docs, &query_vector, limit);
        debug!(query, hits = ranked.len(), "Vector search");
        Ok(ranked)
    }

    /// Build the retrieval-augmentation text for a request (top 5 docs).
    pub async fn get_context(&self, query: &str) -> Result<String, CatalogError> {
        let docs = if self.embedder.is_some() {
            self.ensure_embeddings().await?;
            self.search_with_embeddings(query, CONTEXT_LIMIT).await?
        } else {
            self.search(query, CONTEXT_LIMIT).await?
        };

        Ok(render_context(&docs))
    }

    /// Close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
