//! Translation of receipt filters and updates into SQL.

use rusqlite::types::Value;

use mailroom_core::{Predicate, ReceiptFilter, ReceiptUpdate};

/// Receipts joined with their (possibly missing) notification.
pub(crate) const RECEIPTS_FROM: &str =
    "receipts r LEFT JOIN notifications n ON n.id = r.notification_id";

/// Columns read by [`crate::sqlite::row_to_receipt`].
pub(crate) const RECEIPT_COLUMNS: &str = "r.id, r.notification_id, r.receiver_kind, \
     r.receiver_id, r.mailbox_type, r.is_read, r.is_pinned, r.trashed, r.deleted, \
     r.created_at, r.updated_at";

/// A SQL fragment with its positional parameters.
#[derive(Debug, Default)]
pub(crate) struct Fragment {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Build the WHERE condition for a filter. The empty filter is `1`.
pub(crate) fn where_clause(filter: &ReceiptFilter) -> Fragment {
    let mut clauses = Vec::with_capacity(filter.predicates().len());
    let mut params = Vec::new();

    for predicate in filter.predicates() {
        let clause = match predicate {
            Predicate::Ids(ids) => {
                if ids.is_empty() {
                    "0".to_string()
                } else {
                    params.push(Value::Text(id_array(ids.iter().map(|id| id.get()))));
                    "r.id IN (SELECT value FROM json_each(?))".to_string()
                }
            }
            Predicate::Recipient(receiver) => {
                params.push(Value::Integer(i64::from(receiver.kind.code())));
                params.push(Value::Integer(receiver.id));
                "(r.receiver_kind = ? AND r.receiver_id = ?)".to_string()
            }
            Predicate::NotificationKind(kind) => {
                params.push(Value::Text(kind.as_str().to_string()));
                "n.kind = ?".to_string()
            }
            Predicate::Notification(id) => {
                params.push(Value::Integer(id.get()));
                "r.notification_id = ?".to_string()
            }
            Predicate::Conversation(id) => {
                params.push(Value::Integer(id.get()));
                "(n.kind = 'message' AND n.conversation_id = ?)".to_string()
            }
            Predicate::Folder(folder) => {
                params.push(Value::Text(folder.as_str().to_string()));
                "r.mailbox_type = ?".to_string()
            }
            Predicate::Trashed(flag) => flag_clause("r.trashed", *flag, &mut params),
            Predicate::Deleted(flag) => flag_clause("r.deleted", *flag, &mut params),
            Predicate::Read(flag) => flag_clause("r.is_read", *flag, &mut params),
            Predicate::Pinned(flag) => flag_clause("r.is_pinned", *flag, &mut params),
        };
        clauses.push(clause);
    }

    let sql = if clauses.is_empty() {
        "1".to_string()
    } else {
        clauses.join(" AND ")
    };

    Fragment { sql, params }
}

/// Encode ids as one JSON array so the whole set binds to a single
/// parameter, whatever its size.
fn id_array(ids: impl Iterator<Item = i64>) -> String {
    let ids: Vec<String> = ids.map(|id| id.to_string()).collect();
    format!("[{}]", ids.join(","))
}

fn flag_clause(column: &str, flag: bool, params: &mut Vec<Value>) -> String {
    params.push(Value::Integer(i64::from(flag)));
    format!("{} = ?", column)
}

/// Build the SET list for an update, always stamping `updated_at`.
pub(crate) fn set_clause(update: &ReceiptUpdate, now: i64) -> Fragment {
    let mut assignments = Vec::new();
    let mut params = Vec::new();

    if let Some(mailbox_type) = update.mailbox_type {
        assignments.push("mailbox_type = ?");
        params.push(Value::Text(mailbox_type.as_str().to_string()));
    }
    for (column, value) in [
        ("is_read = ?", update.is_read),
        ("is_pinned = ?", update.is_pinned),
        ("trashed = ?", update.trashed),
        ("deleted = ?", update.deleted),
    ] {
        if let Some(flag) = value {
            assignments.push(column);
            params.push(Value::Integer(i64::from(flag)));
        }
    }
    assignments.push("updated_at = ?");
    params.push(Value::Integer(now));

    Fragment {
        sql: assignments.join(", "),
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailroom_core::{MailboxType, Receiver, ReceiverKind, ReceiptId, Transition};

    #[test]
    fn test_empty_filter() {
        let fragment = where_clause(&ReceiptFilter::all());
        assert_eq!(fragment.sql, "1");
        assert!(fragment.params.is_empty());
    }

    #[test]
    fn test_combined_filter() {
        let filter = ReceiptFilter::all()
            .recipient(Receiver::new(ReceiverKind(2), 7))
            .folder(MailboxType::Inbox)
            .unread();
        let fragment = where_clause(&filter);
        assert_eq!(
            fragment.sql,
            "(r.receiver_kind = ? AND r.receiver_id = ?) AND r.mailbox_type = ? AND r.is_read = ?"
        );
        assert_eq!(
            fragment.params,
            vec![
                Value::Integer(2),
                Value::Integer(7),
                Value::Text("inbox".into()),
                Value::Integer(0),
            ]
        );
    }

    #[test]
    fn test_empty_id_set_matches_nothing() {
        let fragment = where_clause(&ReceiptFilter::ids([]));
        assert_eq!(fragment.sql, "0");

        let fragment = where_clause(&ReceiptFilter::ids([ReceiptId::new(1), ReceiptId::new(2)]));
        assert_eq!(fragment.sql, "r.id IN (SELECT value FROM json_each(?))");
        assert_eq!(fragment.params, vec![Value::Text("[1,2]".into())]);
    }

    #[test]
    fn test_large_id_set_binds_one_parameter() {
        let fragment = where_clause(&ReceiptFilter::ids((1..=40_000).map(ReceiptId::new)));
        assert_eq!(fragment.params.len(), 1);
    }

    #[test]
    fn test_move_sets_folder_and_clears_trash() {
        let fragment = set_clause(&Transition::MoveToArchive.update(), 99);
        assert_eq!(fragment.sql, "mailbox_type = ?, trashed = ?, updated_at = ?");
        assert_eq!(
            fragment.params,
            vec![
                Value::Text("archive".into()),
                Value::Integer(0),
                Value::Integer(99),
            ]
        );
    }
}
