//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};

use mailroom_core::{
    validate_new_receipts, Conversation, ConversationId, MailboxType, NewNotification,
    NewReceipt, Notification, NotificationId, NotificationKind, NotificationVariant, Receipt,
    ReceiptFilter, ReceiptId, ReceiptUpdate, Receiver, ReceiverKind,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::now_millis;
use crate::query::{self, RECEIPTS_FROM, RECEIPT_COLUMNS};
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    /// Wrap an existing connection, migrating it to the current schema.
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// The applied schema version.
    pub async fn schema_version(&self) -> Result<u32> {
        self.run(|conn| migration::schema_version(conn)).await
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

// Helper to convert a row selected with RECEIPT_COLUMNS to a Receipt
pub(crate) fn row_to_receipt(row: &rusqlite::Row<'_>) -> rusqlite::Result<Receipt> {
    let mailbox_type: String = row.get(4)?;
    let mailbox_type = mailbox_type
        .parse::<MailboxType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Receipt {
        id: ReceiptId::new(row.get(0)?),
        notification_id: NotificationId::new(row.get(1)?),
        receiver: Receiver::new(ReceiverKind(row.get(2)?), row.get(3)?),
        mailbox_type,
        is_read: row.get(5)?,
        is_pinned: row.get(6)?,
        trashed: row.get(7)?,
        deleted: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

// Helper to convert a notifications row to a Notification
fn row_to_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<Notification> {
    let kind: String = row.get("kind")?;
    let kind = kind
        .parse::<NotificationKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let conversation_id: Option<i64> = row.get("conversation_id")?;
    let variant = NotificationVariant::from_parts(kind, conversation_id.map(ConversationId::new))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Integer, Box::new(e)))?;

    Ok(Notification {
        id: NotificationId::new(row.get("id")?),
        subject: row.get("subject")?,
        body: row.get("body")?,
        variant,
        created_at: row.get("created_at")?,
    })
}

fn select_receipts(conn: &Connection, filter: &ReceiptFilter) -> Result<Vec<Receipt>> {
    let clause = query::where_clause(filter);
    let sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY r.id",
        RECEIPT_COLUMNS, RECEIPTS_FROM, clause.sql
    );
    let mut stmt = conn.prepare(&sql)?;
    let receipts = stmt
        .query_map(params_from_iter(clause.params.iter()), row_to_receipt)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(receipts)
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_conversation(&self, subject: &str) -> Result<Conversation> {
        let subject = subject.to_string();

        self.run(move |conn| {
            let now = now_millis();
            conn.execute(
                "INSERT INTO conversations (subject, created_at) VALUES (?1, ?2)",
                params![&subject, now],
            )?;
            Ok(Conversation {
                id: ConversationId::new(conn.last_insert_rowid()),
                subject,
                created_at: now,
            })
        })
        .await
    }

    async fn get_conversation(&self, id: ConversationId) -> Result<Option<Conversation>> {
        self.run(move |conn| {
            conn.query_row(
                "SELECT id, subject, created_at FROM conversations WHERE id = ?1",
                params![id.get()],
                |row| {
                    Ok(Conversation {
                        id: ConversationId::new(row.get(0)?),
                        subject: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification> {
        let notification = notification.clone();

        self.run(move |conn| {
            let now = now_millis();
            conn.execute(
                "INSERT INTO notifications (kind, conversation_id, subject, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    notification.variant.kind().as_str(),
                    notification.variant.conversation_id().map(ConversationId::get),
                    &notification.subject,
                    &notification.body,
                    now,
                ],
            )?;
            Ok(Notification {
                id: NotificationId::new(conn.last_insert_rowid()),
                subject: notification.subject,
                body: notification.body,
                variant: notification.variant,
                created_at: now,
            })
        })
        .await
    }

    async fn get_notification(&self, id: NotificationId) -> Result<Option<Notification>> {
        self.run(move |conn| {
            conn.query_row(
                "SELECT id, kind, conversation_id, subject, body, created_at
                 FROM notifications WHERE id = ?1",
                params![id.get()],
                row_to_notification,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn insert_receipts(&self, receipts: &[NewReceipt]) -> Result<Vec<Receipt>> {
        validate_new_receipts(receipts)?;
        let receipts = receipts.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let now = now_millis();
            let mut stored = Vec::with_capacity(receipts.len());

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO receipts (
                        notification_id, receiver_kind, receiver_id, mailbox_type,
                        is_read, is_pinned, trashed, deleted, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                )?;

                for new in receipts {
                    let Some(receiver) = new.receiver else {
                        return Err(mailroom_core::ValidationError::MissingReceiver.into());
                    };
                    stmt.execute(params![
                        new.notification_id.get(),
                        receiver.kind.code(),
                        receiver.id,
                        new.mailbox_type.as_str(),
                        new.is_read,
                        new.is_pinned,
                        new.trashed,
                        new.deleted,
                        now,
                    ])?;
                    let id = ReceiptId::new(tx.last_insert_rowid());
                    stored.push(new.into_receipt(id, now)?);
                }
            }

            tx.commit()?;
            tracing::debug!(count = stored.len(), "inserted receipts");
            Ok(stored)
        })
        .await
    }

    async fn get_receipt(&self, id: ReceiptId) -> Result<Option<Receipt>> {
        self.run(move |conn| {
            let sql = format!("SELECT {} FROM receipts r WHERE r.id = ?1", RECEIPT_COLUMNS);
            conn.query_row(&sql, params![id.get()], row_to_receipt)
                .optional()
                .map_err(StoreError::from)
        })
        .await
    }

    async fn find_receipts(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>> {
        let filter = filter.clone();
        self.run(move |conn| select_receipts(conn, &filter)).await
    }

    async fn count_receipts(&self, filter: &ReceiptFilter) -> Result<usize> {
        let clause = query::where_clause(filter);

        self.run(move |conn| {
            let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", RECEIPTS_FROM, clause.sql);
            let count: i64 =
                conn.query_row(&sql, params_from_iter(clause.params.iter()), |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    async fn update_receipts(
        &self,
        filter: &ReceiptFilter,
        update: &ReceiptUpdate,
        now: i64,
    ) -> Result<Vec<ReceiptId>> {
        if update.is_empty() {
            return Ok(Vec::new());
        }
        let condition = query::where_clause(filter);
        let assignments = query::set_clause(update, now);

        self.run(move |conn| {
            // IMMEDIATE takes the write lock up front, so the id set we select
            // is exactly the set the UPDATE touches.
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let ids: Vec<ReceiptId> = {
                let sql = format!(
                    "SELECT r.id FROM {} WHERE {} ORDER BY r.id",
                    RECEIPTS_FROM, condition.sql
                );
                let mut stmt = tx.prepare(&sql)?;
                let ids = stmt
                    .query_map(params_from_iter(condition.params.iter()), |row| {
                        row.get::<_, i64>(0).map(ReceiptId::new)
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                ids
            };

            if ids.is_empty() {
                tx.commit()?;
                return Ok(ids);
            }

            let sql = format!(
                "UPDATE receipts SET {} WHERE id IN (SELECT r.id FROM {} WHERE {})",
                assignments.sql, RECEIPTS_FROM, condition.sql
            );
            let params = assignments.params.iter().chain(condition.params.iter());
            let changed = tx.execute(&sql, params_from_iter(params))?;

            if changed != ids.len() {
                return Err(StoreError::Inconsistent(format!(
                    "selected {} receipts but updated {}",
                    ids.len(),
                    changed
                )));
            }

            tx.commit()?;
            tracing::debug!(count = ids.len(), "updated receipts");
            Ok(ids)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailroom_core::{ReceiptBuilder, Transition, ValidationError};

    use crate::traits::StoreExt;

    const USER: ReceiverKind = ReceiverKind(1);

    fn user(id: i64) -> Receiver {
        Receiver::new(USER, id)
    }

    async fn message_for(store: &SqliteStore, subject: &str) -> (Conversation, Notification) {
        let conversation = store.insert_conversation(subject).await.unwrap();
        let message = store
            .insert_notification(&NewNotification::message(conversation.id, subject, "body"))
            .await
            .unwrap();
        (conversation, message)
    }

    #[tokio::test]
    async fn test_insert_and_get_receipt() {
        let store = SqliteStore::open_memory().unwrap();
        let (_, message) = message_for(&store, "hi").await;

        let new = ReceiptBuilder::new(message.id).receiver(user(7)).build().unwrap();
        let stored = store.insert_receipt(&new).await.unwrap();

        let retrieved = store.get_receipt(stored.id).await.unwrap().unwrap();
        assert_eq!(retrieved, stored);
        assert_eq!(retrieved.mailbox_type, MailboxType::Inbox);
        assert!(retrieved.is_unread());
    }

    #[tokio::test]
    async fn test_insert_without_receiver_writes_nothing() {
        let store = SqliteStore::open_memory().unwrap();
        let good = ReceiptBuilder::new(NotificationId::new(1))
            .receiver(user(1))
            .build_unchecked();
        let bad = ReceiptBuilder::new(NotificationId::new(1)).build_unchecked();

        let err = store.insert_receipts(&[good, bad]).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::MissingReceiver)
        ));
        assert_eq!(store.count_receipts(&ReceiptFilter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_notification_round_trip() {
        let store = SqliteStore::open_memory().unwrap();
        let (conversation, message) = message_for(&store, "hi").await;
        let plain = store
            .insert_notification(&NewNotification::plain("system", "maintenance"))
            .await
            .unwrap();

        let got = store.get_notification(message.id).await.unwrap().unwrap();
        assert_eq!(got.conversation_id(), Some(conversation.id));
        let got = store.get_notification(plain.id).await.unwrap().unwrap();
        assert!(!got.is_message());
        assert!(store
            .get_notification(NotificationId::new(999))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_kind_and_conversation_filters() {
        let store = SqliteStore::open_memory().unwrap();
        let (conversation, message) = message_for(&store, "hi").await;
        let plain = store
            .insert_notification(&NewNotification::plain("system", "maintenance"))
            .await
            .unwrap();

        let receipts = store
            .insert_receipts(&[
                ReceiptBuilder::new(message.id).receiver(user(1)).build().unwrap(),
                ReceiptBuilder::new(plain.id).receiver(user(1)).build().unwrap(),
                // Dangling notification reference matches neither kind
                ReceiptBuilder::new(NotificationId::new(999))
                    .receiver(user(1))
                    .build()
                    .unwrap(),
            ])
            .await
            .unwrap();

        let messages = store
            .find_receipts(&ReceiptFilter::all().messages_receipts())
            .await
            .unwrap();
        assert_eq!(messages, vec![receipts[0].clone()]);

        let notifications = store
            .find_receipts(&ReceiptFilter::all().notifications_receipts())
            .await
            .unwrap();
        assert_eq!(notifications, vec![receipts[1].clone()]);

        let in_conversation = store
            .count_receipts(&ReceiptFilter::all().conversation(conversation.id))
            .await
            .unwrap();
        assert_eq!(in_conversation, 1);
    }

    #[tokio::test]
    async fn test_bulk_update_touches_only_matches() {
        let store = SqliteStore::open_memory().unwrap();
        let (_, message) = message_for(&store, "hi").await;
        let news: Vec<_> = (1..=4)
            .map(|i| ReceiptBuilder::new(message.id).receiver(user(i)).build().unwrap())
            .collect();
        let receipts = store.insert_receipts(&news).await.unwrap();

        let filter = ReceiptFilter::ids([receipts[0].id, receipts[2].id]);
        let updated = store
            .transition(&filter, Transition::MoveToTrash, 5000)
            .await
            .unwrap();
        assert_eq!(updated, vec![receipts[0].id, receipts[2].id]);

        let trashed = store
            .find_receipts(&ReceiptFilter::all().trashed(true))
            .await
            .unwrap();
        assert_eq!(trashed.len(), 2);
        assert!(trashed.iter().all(|r| r.updated_at == 5000));

        let untouched = store.get_receipt(receipts[1].id).await.unwrap().unwrap();
        assert_eq!(untouched, receipts[1]);
    }

    #[tokio::test]
    async fn test_bulk_update_empty_match_is_noop() {
        let store = SqliteStore::open_memory().unwrap();
        let updated = store
            .transition(&ReceiptFilter::all().recipient(user(42)), Transition::MarkAsRead, 1)
            .await
            .unwrap();
        assert!(updated.is_empty());
    }

    #[tokio::test]
    async fn test_update_by_filter_on_joined_column() {
        let store = SqliteStore::open_memory().unwrap();
        let (conversation, message) = message_for(&store, "hi").await;
        let (_, other) = message_for(&store, "other").await;
        store
            .insert_receipts(&[
                ReceiptBuilder::new(message.id).receiver(user(1)).build().unwrap(),
                ReceiptBuilder::new(other.id).receiver(user(1)).build().unwrap(),
            ])
            .await
            .unwrap();

        let updated = store
            .transition(
                &ReceiptFilter::all().conversation(conversation.id),
                Transition::MoveToArchive,
                10,
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(
            store
                .count_receipts(&ReceiptFilter::all().archive())
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_large_id_set() {
        let store = SqliteStore::open_memory().unwrap();
        let new: Vec<_> = (0..10)
            .map(|_| {
                ReceiptBuilder::new(NotificationId::new(1))
                    .receiver(user(7))
                    .build_unchecked()
            })
            .collect();
        store.insert_receipts(&new).await.unwrap();

        let filter = ReceiptFilter::ids((1..=40_000).map(ReceiptId::new));
        assert_eq!(store.count_receipts(&filter).await.unwrap(), 10);
        let updated = store
            .transition(&filter, Transition::MarkAsRead, 1)
            .await
            .unwrap();
        assert_eq!(updated.len(), 10);
        assert_eq!(
            store.count_receipts(&ReceiptFilter::all().unread()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mailroom.db");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            let new = ReceiptBuilder::new(NotificationId::new(1))
                .receiver(user(7))
                .pinned(true)
                .build()
                .unwrap();
            store.insert_receipt(&new).await.unwrap().id
        };

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.schema_version().await.unwrap(), migration::CURRENT_VERSION);
        let receipt = store.get_receipt(id).await.unwrap().unwrap();
        assert!(receipt.is_pinned);
    }
}
