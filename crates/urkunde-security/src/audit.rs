// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Audit trail — append-only SQLite log of every pipeline stage a document
// passes through.
//
// Schema:
//   audit_log(
//     id            INTEGER PRIMARY KEY AUTOINCREMENT,
//     timestamp     TEXT    NOT NULL,   -- RFC 3339
//     document_id   TEXT    NOT NULL,
//     stage         TEXT    NOT NULL,   -- extract, embed, translate, verify, score, batch_failure
//     token_prefix  TEXT,               -- marker token prefix, when the stage issued or checked one
//     success       INTEGER NOT NULL,   -- 0 = failure, 1 = success
//     details       TEXT                -- optional free-form context
//   )

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use urkunde_core::error::UrkundeError;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS audit_log (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp     TEXT    NOT NULL,
    document_id   TEXT    NOT NULL,
    stage         TEXT    NOT NULL,
    token_prefix  TEXT,
    success       INTEGER NOT NULL,
    details       TEXT
);
CREATE INDEX IF NOT EXISTS audit_log_document ON audit_log (document_id);";

const SELECT_COLUMNS: &str = "SELECT id, timestamp, document_id, stage, token_prefix, success, details
     FROM audit_log";

// ---------------------------------------------------------------------------
// Local error helpers
// ---------------------------------------------------------------------------

/// Convert a `rusqlite::Error` into a `UrkundeError::Database`.
fn db_err(e: rusqlite::Error) -> UrkundeError {
    UrkundeError::Database(e.to_string())
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Pipeline stage an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStage {
    Extract,
    Embed,
    Translate,
    Verify,
    Score,
    BatchFailure,
}

impl AuditStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Embed => "embed",
            Self::Translate => "translate",
            Self::Verify => "verify",
            Self::Score => "score",
            Self::BatchFailure => "batch_failure",
        }
    }
}

/// A single entry in the audit trail, used for queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub document_id: String,
    pub stage: String,
    pub token_prefix: Option<String>,
    pub success: bool,
    pub details: Option<String>,
}

impl AuditEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            document_id: row.get(2)?,
            stage: row.get(3)?,
            token_prefix: row.get(4)?,
            success: row.get::<_, i32>(5)? != 0,
            details: row.get(6)?,
        })
    }
}

/// Append-only audit trail backed by a SQLite database.
///
/// `rusqlite::Connection` is `Send` but not `Sync`; share it between tasks
/// behind a `Mutex`.
pub struct AuditTrail {
    conn: Connection,
}

impl AuditTrail {
    /// Open (or create) the audit database at `path`.
    ///
    /// WAL mode is enabled so reports can be read while a batch is writing.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, UrkundeError> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("audit trail opened");
        Ok(Self { conn })
    }

    /// Open an in-memory audit database (useful for tests).
    pub fn open_in_memory() -> Result<Self, UrkundeError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("in-memory audit trail opened");
        Ok(Self { conn })
    }

    /// Append one entry.
    #[instrument(skip(self, details), fields(stage = stage.as_str()))]
    pub fn record(
        &self,
        document_id: &str,
        stage: AuditStage,
        token_prefix: Option<&str>,
        success: bool,
        details: Option<&str>,
    ) -> Result<(), UrkundeError> {
        let timestamp = Utc::now().to_rfc3339();
        let success_int: i32 = if success { 1 } else { 0 };

        self.conn
            .execute(
                "INSERT INTO audit_log (timestamp, document_id, stage, token_prefix, success, details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    timestamp,
                    document_id,
                    stage.as_str(),
                    token_prefix,
                    success_int,
                    details
                ],
            )
            .map_err(db_err)?;

        debug!("audit entry recorded");
        Ok(())
    }

    /// All entries for one document, in the order they were written.
    pub fn entries_for_document(
        &self,
        document_id: &str,
    ) -> Result<Vec<AuditEntry>, UrkundeError> {
        self.query(
            &format!("{SELECT_COLUMNS} WHERE document_id = ?1 ORDER BY id ASC"),
            params![document_id],
        )
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent_entries(&self, limit: u32) -> Result<Vec<AuditEntry>, UrkundeError> {
        self.query(
            &format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT ?1"),
            params![limit],
        )
    }

    /// Entries recorded with `success = 0`, oldest first.
    pub fn failures(&self) -> Result<Vec<AuditEntry>, UrkundeError> {
        self.query(
            &format!("{SELECT_COLUMNS} WHERE success = 0 ORDER BY id ASC"),
            [],
        )
    }

    /// Total number of entries.
    pub fn count(&self) -> Result<u64, UrkundeError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
            .map_err(db_err)
    }

    fn query(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<AuditEntry>, UrkundeError> {
        let mut stmt = self.conn.prepare(sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params, AuditEntry::from_row)
            .map_err(db_err)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(db_err)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trail() -> AuditTrail {
        AuditTrail::open_in_memory().expect("open in-memory audit trail")
    }

    #[test]
    fn record_and_count() {
        let trail = make_trail();
        assert_eq!(trail.count().unwrap(), 0);

        trail
            .record("doc_1", AuditStage::Extract, None, true, Some("text_layer"))
            .unwrap();
        trail
            .record("doc_1", AuditStage::Embed, Some("1a2b3c4d"), true, None)
            .unwrap();

        assert_eq!(trail.count().unwrap(), 2);
    }

    #[test]
    fn entries_for_document_in_write_order() {
        let trail = make_trail();
        trail.record("aaa", AuditStage::Extract, None, true, None).unwrap();
        trail.record("bbb", AuditStage::Extract, None, true, None).unwrap();
        trail
            .record("aaa", AuditStage::Verify, Some("deadbeef"), false, Some("token not found"))
            .unwrap();

        let entries = trail.entries_for_document("aaa").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stage, "extract");
        assert!(entries[0].success);
        assert_eq!(entries[1].stage, "verify");
        assert_eq!(entries[1].token_prefix.as_deref(), Some("deadbeef"));
        assert!(!entries[1].success);
    }

    #[test]
    fn recent_entries_ordering() {
        let trail = make_trail();
        for i in 0..5 {
            trail
                .record(&format!("doc_{i}"), AuditStage::Score, None, true, None)
                .unwrap();
        }

        let recent = trail.recent_entries(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert!(recent[0].id > recent[1].id);
        assert!(recent[1].id > recent[2].id);
    }

    #[test]
    fn failures_only_lists_unsuccessful_entries() {
        let trail = make_trail();
        trail.record("ok", AuditStage::Score, None, true, None).unwrap();
        trail
            .record("scan.pdf", AuditStage::BatchFailure, None, false, Some("is a directory"))
            .unwrap();

        let failures = trail.failures().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].stage, "batch_failure");
        assert_eq!(failures[0].details.as_deref(), Some("is a directory"));
    }
}
