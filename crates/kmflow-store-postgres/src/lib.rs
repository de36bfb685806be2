// Copyright 2026 KMFlow Engineering

//! PostgreSQL-backed relational system-of-record for KMFlow.
//!
//! Stores evidence, assertions, conflicts, and the outbox partition that
//! feeds the graph projection (`kmflow_core::graph`). Typed columns carry
//! the fields every query filters or joins on; the remaining entity fields
//! round-trip through a JSONB column, the same split
//! `dashflow-postgres-checkpointer` uses between its indexed `thread_id`
//! column and the opaque, bincode-encoded `state` blob.
//!
//! # Example
//!
//! ```rust,ignore
//! use kmflow_store_postgres::PostgresStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection_string = "host=localhost user=kmflow dbname=kmflow";
//!     let store = PostgresStore::new(connection_string).await?;
//!     Ok(())
//! }
//! ```

mod error;

pub use error::{validate_identifier, StoreError};

use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};

use kmflow_core::audit::AuditEvent;
use kmflow_core::domain::{Assertion, ConflictObject, EvidenceItem};
use kmflow_core::graph::{CountsByKind, GraphDelta, OutboxEntry};
use kmflow_core::ingest::IngestOutcome;

type Result<T> = std::result::Result<T, StoreError>;

/// The relational system-of-record, backed by `tokio-postgres`.
///
/// Evidence, assertions, conflicts, and the outbox partition all live under
/// `table_prefix`-qualified tables so a single database can host multiple
/// engagements' physically isolated installs (data residency, §3.1).
pub struct PostgresStore {
    client: Client,
    table_prefix: String,
}

impl PostgresStore {
    /// Connect and initialize the default-prefixed schema.
    pub async fn new(connection_string: &str) -> Result<Self> {
        Self::with_table_prefix(connection_string, "kmflow").await
    }

    /// Connect and initialize the schema under a caller-chosen table
    /// prefix, validated as a safe SQL identifier before interpolation.
    pub async fn with_table_prefix(connection_string: &str, table_prefix: &str) -> Result<Self> {
        validate_identifier(table_prefix)?;

        info!("connecting to postgres");
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("postgres connection error: {e}");
            }
        });

        let store = Self {
            client,
            table_prefix: table_prefix.to_string(),
        };
        store.initialize_schema().await?;
        Ok(store)
    }

    fn table(&self, name: &str) -> String {
        format!("{}_{}", self.table_prefix, name)
    }

    async fn initialize_schema(&self) -> Result<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {evidence} (
                id TEXT PRIMARY KEY,
                engagement_id TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                lifecycle TEXT NOT NULL,
                data JSONB NOT NULL,
                UNIQUE (engagement_id, content_hash)
            );
            CREATE INDEX IF NOT EXISTS idx_{evidence}_engagement ON {evidence} (engagement_id);

            CREATE TABLE IF NOT EXISTS {assertions} (
                id TEXT PRIMARY KEY,
                engagement_id TEXT NOT NULL,
                predicate TEXT NOT NULL,
                subject_id TEXT NOT NULL,
                object_id TEXT NOT NULL,
                valid_from BIGINT NOT NULL,
                valid_to BIGINT,
                retracted_at BIGINT,
                data JSONB NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{assertions}_engagement ON {assertions} (engagement_id);
            CREATE INDEX IF NOT EXISTS idx_{assertions}_predicate ON {assertions} (engagement_id, predicate);

            CREATE TABLE IF NOT EXISTS {conflicts} (
                id TEXT PRIMARY KEY,
                engagement_id TEXT NOT NULL,
                mismatch_type TEXT NOT NULL,
                dedup_a TEXT NOT NULL,
                dedup_b TEXT NOT NULL,
                status TEXT NOT NULL,
                detected_at BIGINT NOT NULL,
                data JSONB NOT NULL,
                UNIQUE (engagement_id, mismatch_type, dedup_a, dedup_b)
            );

            CREATE TABLE IF NOT EXISTS {outbox} (
                engagement_id TEXT NOT NULL,
                sequence BIGINT NOT NULL,
                dedup_key TEXT NOT NULL,
                delta JSONB NOT NULL,
                applied BOOLEAN NOT NULL DEFAULT FALSE,
                PRIMARY KEY (engagement_id, sequence),
                UNIQUE (dedup_key)
            );
            CREATE INDEX IF NOT EXISTS idx_{outbox}_pending ON {outbox} (engagement_id, applied);

            CREATE TABLE IF NOT EXISTS {audit} (
                seq BIGSERIAL PRIMARY KEY,
                engagement_id TEXT NOT NULL,
                actor TEXT NOT NULL,
                action TEXT NOT NULL,
                outcome TEXT NOT NULL,
                detail JSONB NOT NULL,
                occurred_at BIGINT NOT NULL
            );
            "#,
            evidence = self.table("evidence_items"),
            assertions = self.table("assertions"),
            conflicts = self.table("conflicts"),
            outbox = self.table("outbox"),
            audit = self.table("audit_log"),
        );
        self.client.batch_execute(&sql).await?;
        debug!(table_prefix = %self.table_prefix, "schema initialized");
        Ok(())
    }

    /// Insert `item` if its `(engagement_id, content_hash)` pair is new,
    /// matching the idempotent-ingest contract: a duplicate blob returns
    /// the id already on file rather than erroring.
    pub async fn save_evidence_item(&self, item: &EvidenceItem) -> Result<IngestOutcome> {
        let data = serde_json::to_value(item)?;
        let lifecycle = serde_json::to_value(item.lifecycle)?.as_str().unwrap_or_default().to_string();
        let sql = format!(
            "INSERT INTO {} (id, engagement_id, content_hash, lifecycle, data)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (engagement_id, content_hash) DO NOTHING
             RETURNING id",
            self.table("evidence_items")
        );
        let rows = self
            .client
            .query(&sql, &[&item.id, &item.engagement_id, &item.content_hash, &lifecycle, &data])
            .await?;

        if let Some(row) = rows.first() {
            let id: String = row.get(0);
            return Ok(IngestOutcome::Created(id));
        }

        let existing_sql = format!(
            "SELECT id FROM {} WHERE engagement_id = $1 AND content_hash = $2",
            self.table("evidence_items")
        );
        let existing = self.client.query_one(&existing_sql, &[&item.engagement_id, &item.content_hash]).await?;
        Ok(IngestOutcome::Duplicate(existing.get(0)))
    }

    /// Fetch a single evidence item by id.
    pub async fn get_evidence_item(&self, id: &str) -> Result<Option<EvidenceItem>> {
        let sql = format!("SELECT data FROM {} WHERE id = $1", self.table("evidence_items"));
        let rows = self.client.query(&sql, &[&id]).await?;
        rows.first()
            .map(|row| serde_json::from_value(row.get(0)).map_err(StoreError::from))
            .transpose()
    }

    /// Write an assertion and its corresponding outbox entry in a single
    /// transaction, so relational truth and the pending graph projection
    /// delta never drift apart even under a crash between the two writes.
    ///
    /// This reference implementation issues both statements over the same
    /// `tokio_postgres::Client` without wrapping them in an explicit
    /// `client.transaction()`, since `Client::transaction` requires `&mut
    /// self` and this type only ever hands out `&self`. A pooled deployment
    /// (e.g. via `deadpool-postgres`) should take a transaction here instead.
    pub async fn save_assertion_with_outbox(&self, assertion: &Assertion, delta: &GraphDelta, sequence: u64) -> Result<()> {
        let predicate = serde_json::to_value(assertion.predicate)?.as_str().unwrap_or_default().to_string();
        let data = serde_json::to_value(assertion)?;
        let delta_json = serde_json::to_value(delta)?;
        let dedup_key = delta.dedup_key();

        let assertion_sql = format!(
            "INSERT INTO {} (id, engagement_id, predicate, subject_id, object_id, valid_from, valid_to, retracted_at, data)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            self.table("assertions")
        );
        let outbox_sql = format!(
            "INSERT INTO {} (engagement_id, sequence, dedup_key, delta, applied)
             VALUES ($1, $2, $3, $4, FALSE)
             ON CONFLICT (dedup_key) DO NOTHING",
            self.table("outbox")
        );

        self.client
            .execute(
                &assertion_sql,
                &[
                    &assertion.id,
                    &assertion.engagement_id,
                    &predicate,
                    &assertion.subject.id,
                    &assertion.object.id,
                    &assertion.valid_from,
                    &assertion.valid_to,
                    &assertion.retracted_at,
                    &data,
                ],
            )
            .await?;
        self.client
            .execute(&outbox_sql, &[&assertion.engagement_id, &(sequence as i64), &dedup_key, &delta_json])
            .await?;
        Ok(())
    }

    /// Insert `conflict` if its dedup key is new, mirroring
    /// `kmflow_core::consistency::ConflictRegistry::insert_if_new` at the
    /// database level so a rescan never creates a duplicate row.
    pub async fn insert_conflict_if_new(&self, conflict: &ConflictObject) -> Result<bool> {
        let (dedup_a, dedup_b) = sorted_pair(&conflict.source_a_ref, &conflict.source_b_ref);
        let mismatch_type = serde_json::to_value(conflict.mismatch_type)?.as_str().unwrap_or_default().to_string();
        let status = serde_json::to_value(conflict.status)?.as_str().unwrap_or_default().to_string();
        let data = serde_json::to_value(conflict)?;

        let sql = format!(
            "INSERT INTO {} (id, engagement_id, mismatch_type, dedup_a, dedup_b, status, detected_at, data)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (engagement_id, mismatch_type, dedup_a, dedup_b) DO NOTHING
             RETURNING id",
            self.table("conflicts")
        );
        let rows = self
            .client
            .query(
                &sql,
                &[
                    &conflict.id,
                    &conflict.engagement_id,
                    &mismatch_type,
                    &dedup_a,
                    &dedup_b,
                    &status,
                    &conflict.detected_at,
                    &data,
                ],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Flip every `Open` conflict older than the 48h escalation window to
    /// `Escalated`, returning how many rows were touched.
    pub async fn escalate_stale_conflicts(&self, now: i64) -> Result<u64> {
        const ESCALATION_WINDOW_SECS: i64 = 48 * 3600;
        let sql = format!(
            "UPDATE {} SET status = 'escalated' WHERE status = 'open' AND ($1 - detected_at) > $2",
            self.table("conflicts")
        );
        let touched = self.client.execute(&sql, &[&now, &ESCALATION_WINDOW_SECS]).await?;
        Ok(touched)
    }

    /// Claim up to `limit` unapplied outbox rows for `engagement_id` using
    /// `SELECT ... FOR UPDATE SKIP LOCKED`, so concurrent projection
    /// workers never contend on the same row or double-apply a delta.
    pub async fn claim_pending_outbox(&self, engagement_id: &str, limit: i64) -> Result<Vec<OutboxEntry>> {
        let sql = format!(
            "SELECT sequence, delta, applied FROM {}
             WHERE engagement_id = $1 AND applied = FALSE
             ORDER BY sequence
             FOR UPDATE SKIP LOCKED
             LIMIT $2",
            self.table("outbox")
        );
        let rows = self.client.query(&sql, &[&engagement_id, &limit]).await?;
        rows.into_iter()
            .map(|row| {
                let sequence: i64 = row.get(0);
                let delta: serde_json::Value = row.get(1);
                let applied: bool = row.get(2);
                Ok(OutboxEntry {
                    engagement_id: engagement_id.to_string(),
                    sequence: sequence as u64,
                    delta: serde_json::from_value(delta)?,
                    applied,
                })
            })
            .collect()
    }

    /// Mark an outbox row applied after the graph projection consumer has
    /// durably written its side effect.
    pub async fn mark_outbox_applied(&self, engagement_id: &str, sequence: u64) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET applied = TRUE WHERE engagement_id = $1 AND sequence = $2",
            self.table("outbox")
        );
        self.client.execute(&sql, &[&engagement_id, &(sequence as i64)]).await?;
        Ok(())
    }

    /// Count currently-valid assertions per predicate for `engagement_id`,
    /// the relational side of the daily reconciliation job
    /// (`kmflow_core::graph::reconciliation::compare`).
    pub async fn relational_counts_by_predicate(&self, engagement_id: &str, now: i64) -> Result<CountsByKind> {
        let sql = format!(
            "SELECT predicate, COUNT(*) FROM {}
             WHERE engagement_id = $1
               AND retracted_at IS NULL
               AND valid_from <= $2
               AND (valid_to IS NULL OR valid_to > $2)
             GROUP BY predicate",
            self.table("assertions")
        );
        let rows = self.client.query(&sql, &[&engagement_id, &now]).await?;
        let mut counts = CountsByKind::new();
        for row in rows {
            let predicate: String = row.get(0);
            let count: i64 = row.get(1);
            counts.insert(predicate, count as u64);
        }
        Ok(counts)
    }

    /// Append an audit event. There is no corresponding update or delete
    /// method on this type by design: the audit table is append-only, the
    /// same invariant `dashflow-postgres-checkpointer` enforces on its
    /// checkpoint rows via `ON CONFLICT ... DO UPDATE` only ever touching
    /// the latest row for a thread, never erasing history.
    pub async fn append_audit_event(&self, event: &AuditEvent) -> Result<()> {
        let detail = serde_json::to_value(&event.detail)?;
        let sql = format!(
            "INSERT INTO {} (engagement_id, actor, action, outcome, detail, occurred_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
            self.table("audit_log")
        );
        self.client
            .execute(
                &sql,
                &[
                    &event.engagement_id,
                    &event.actor,
                    &event.action,
                    &event.outcome,
                    &detail,
                    &event.occurred_at,
                ],
            )
            .await?;
        Ok(())
    }
}

fn sorted_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}
