//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL batch
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 2;

/// Initialize or migrate the database schema to [`CURRENT_VERSION`].
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    migrate_to(conn, CURRENT_VERSION)
}

/// Migrate the schema up to `target`.
pub fn migrate_to(conn: &mut Connection, target: u32) -> Result<()> {
    if target > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "target version {} is newer than supported version {}",
            target, CURRENT_VERSION
        )));
    }

    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current = schema_version(conn)?;
    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < target {
        let tx = conn.transaction()?;

        for version in (current + 1)..=target {
            tracing::debug!(version, "applying schema migration");
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, crate::now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// The highest applied migration version, 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        2 => apply_v2(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: conversations, notifications and receipts.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Conversation threads (owned upstream)
        CREATE TABLE conversations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL
        );

        -- Notifications and messages (owned upstream)
        CREATE TABLE notifications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,               -- 'notification' | 'message'
            conversation_id INTEGER,          -- set only for messages
            subject TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL
        );

        -- Per-recipient delivery state
        CREATE TABLE receipts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            notification_id INTEGER NOT NULL,
            receiver_kind INTEGER NOT NULL,   -- registered base kind
            receiver_id INTEGER NOT NULL,
            mailbox_type TEXT NOT NULL,       -- inbox | sentbox | archive | archived
            is_read INTEGER NOT NULL DEFAULT 0,
            trashed INTEGER NOT NULL DEFAULT 0,
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE INDEX idx_notifications_conversation ON notifications(conversation_id);
        CREATE INDEX idx_receipts_receiver ON receipts(receiver_kind, receiver_id);
        CREATE INDEX idx_receipts_notification ON receipts(notification_id);
        CREATE INDEX idx_receipts_mailbox_type ON receipts(mailbox_type);
        CREATE INDEX idx_receipts_flags ON receipts(trashed, deleted, is_read);
        "#,
    )?;

    Ok(())
}

/// Migration v2: pinned receipts.
fn apply_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        ALTER TABLE receipts ADD COLUMN is_pinned INTEGER NOT NULL DEFAULT 0;
        CREATE INDEX idx_receipts_pinned ON receipts(is_pinned);
        "#,
    )?;

    Ok(())
}
