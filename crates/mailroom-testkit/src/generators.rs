//! Proptest generators for property-based testing.

use proptest::prelude::*;

use mailroom_core::{
    MailboxType, NewReceipt, NotificationId, Predicate, Receipt, ReceiptBuilder, ReceiptFilter,
    ReceiptId, Receiver, ReceiverKind, Transition,
};

/// Generate a MailboxType.
pub fn mailbox_type() -> impl Strategy<Value = MailboxType> {
    prop_oneof![
        Just(MailboxType::Inbox),
        Just(MailboxType::Sentbox),
        Just(MailboxType::Archive),
        Just(MailboxType::Archived),
    ]
}

/// Generate any Transition.
pub fn transition() -> impl Strategy<Value = Transition> {
    proptest::sample::select(Transition::ALL.to_vec())
}

/// Generate a receiver from a small pool, so filters hit some receipts.
pub fn receiver() -> impl Strategy<Value = Receiver> {
    (1u16..=2, 1i64..=3).prop_map(|(kind, id)| Receiver::new(ReceiverKind(kind), id))
}

/// Generate a predicate over receipt columns only.
pub fn column_predicate() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        receiver().prop_map(Predicate::Recipient),
        mailbox_type().prop_map(Predicate::Folder),
        any::<bool>().prop_map(Predicate::Trashed),
        any::<bool>().prop_map(Predicate::Deleted),
        any::<bool>().prop_map(Predicate::Read),
        any::<bool>().prop_map(Predicate::Pinned),
        (1i64..=3).prop_map(|id| Predicate::Notification(NotificationId::new(id))),
    ]
}

/// Generate a conjunction of up to `max` column predicates.
pub fn column_filter(max: usize) -> impl Strategy<Value = ReceiptFilter> {
    prop::collection::vec(column_predicate(), 0..=max)
        .prop_map(|predicates| predicates.into_iter().fold(ReceiptFilter::all(), ReceiptFilter::with))
}

/// The mutable state of one receipt.
#[derive(Debug, Clone)]
pub struct ReceiptState {
    pub notification_id: NotificationId,
    pub receiver: Receiver,
    pub mailbox_type: MailboxType,
    pub is_read: bool,
    pub is_pinned: bool,
    pub trashed: bool,
    pub deleted: bool,
}

impl ReceiptState {
    pub fn new_receipt(&self) -> NewReceipt {
        ReceiptBuilder::new(self.notification_id)
            .receiver(self.receiver)
            .mailbox(self.mailbox_type)
            .read(self.is_read)
            .pinned(self.is_pinned)
            .trashed(self.trashed)
            .deleted(self.deleted)
            .build_unchecked()
    }

    /// Materialize as a stored receipt with the given id, stamped at zero.
    pub fn receipt(&self, id: i64) -> Receipt {
        Receipt {
            id: ReceiptId::new(id),
            notification_id: self.notification_id,
            receiver: self.receiver,
            mailbox_type: self.mailbox_type,
            is_read: self.is_read,
            is_pinned: self.is_pinned,
            trashed: self.trashed,
            deleted: self.deleted,
            created_at: 0,
            updated_at: 0,
        }
    }
}

impl Arbitrary for ReceiptState {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            1i64..=3, // notification id
            receiver(),
            mailbox_type(),
            any::<[bool; 4]>(),
        )
            .prop_map(|(notification, receiver, mailbox_type, flags)| ReceiptState {
                notification_id: NotificationId::new(notification),
                receiver,
                mailbox_type,
                is_read: flags[0],
                is_pinned: flags[1],
                trashed: flags[2],
                deleted: flags[3],
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailroom_core::NewNotification;
    use mailroom_store::{MemoryStore, SqliteStore, Store};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    /// Seed three notifications so ids 1..=3 resolve, then insert `states`.
    async fn seed<S: Store>(store: &S, states: &[ReceiptState]) -> Vec<Receipt> {
        for i in 1..=3 {
            store
                .insert_notification(&NewNotification::plain(format!("n{i}"), "body"))
                .await
                .unwrap();
        }
        let new: Vec<NewReceipt> = states.iter().map(ReceiptState::new_receipt).collect();
        store.insert_receipts(&new).await.unwrap()
    }

    /// Apply `transition` to `filter` and check exactly the matching receipts changed.
    async fn check_bulk<S: Store>(
        store: &S,
        states: &[ReceiptState],
        filter: &ReceiptFilter,
        transition: Transition,
    ) -> Result<Vec<ReceiptId>, TestCaseError> {
        let before = seed(store, states).await;
        let expected: Vec<ReceiptId> = before
            .iter()
            .filter(|r| filter.matches(r, None))
            .map(|r| r.id)
            .collect();

        let updated = store
            .update_receipts(filter, &transition.update(), 1)
            .await
            .unwrap();
        prop_assert_eq!(&updated, &expected);

        let after = store.find_receipts(&ReceiptFilter::all()).await.unwrap();
        prop_assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(&after) {
            if expected.contains(&old.id) {
                let mut want = old.clone();
                transition.update().apply_to(&mut want, 1);
                prop_assert_eq!(new, &want);
            } else {
                prop_assert_eq!(new, old);
            }
        }
        Ok(updated)
    }

    proptest! {
        #[test]
        fn test_transition_is_idempotent(state: ReceiptState, t in transition()) {
            let mut once = state.receipt(1);
            t.update().apply_to(&mut once, 5);
            let mut twice = once.clone();
            t.update().apply_to(&mut twice, 5);

            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_inverse_restores_flags(state: ReceiptState, t in transition()) {
            let Some(inverse) = t.inverse() else {
                return Ok(());
            };
            prop_assert_eq!(inverse.inverse(), Some(t));

            // Starting from the state the inverse produces, the pair is a no-op.
            let mut start = state.receipt(1);
            inverse.update().apply_to(&mut start, 0);
            let mut round = start.clone();
            t.update().apply_to(&mut round, 0);
            inverse.update().apply_to(&mut round, 0);

            prop_assert_eq!(round, start);
        }

        #[test]
        fn test_folder_move_leaves_trash(state: ReceiptState, folder in mailbox_type()) {
            let mut receipt = state.receipt(1);
            mailroom_core::ReceiptUpdate::move_to(folder).apply_to(&mut receipt, 0);

            prop_assert_eq!(receipt.mailbox_type, folder);
            prop_assert!(!receipt.trashed);
            prop_assert_eq!(receipt.deleted, state.deleted);
            prop_assert_eq!(receipt.is_read, state.is_read);
        }

        #[test]
        fn test_trash_never_includes_deleted(state: ReceiptState, receiver in receiver()) {
            let receipt = state.receipt(1);
            let filter = ReceiptFilter::all().recipient(receiver).trash();

            if filter.matches(&receipt, None) {
                prop_assert!(receipt.trashed);
                prop_assert!(!receipt.deleted);
                prop_assert!(receipt.is_in_trash());
            }
        }

        #[test]
        fn test_bulk_update_touches_exactly_matches(
            states in prop::collection::vec(any::<ReceiptState>(), 0..16),
            filter in column_filter(3),
            t in transition(),
        ) {
            let rt = runtime();
            let memory = rt.block_on(check_bulk(&MemoryStore::new(), &states, &filter, t))?;
            let sqlite = SqliteStore::open_memory().unwrap();
            let sql = rt.block_on(check_bulk(&sqlite, &states, &filter, t))?;

            prop_assert_eq!(memory, sql);
        }
    }
}
