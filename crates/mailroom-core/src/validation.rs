//! Receipt validation: checks applied before a receipt is persisted.

use crate::error::ValidationError;
use crate::receipt::NewReceipt;

/// Validate a receipt before creation.
///
/// The receiver is the only mandatory relation. A notification id that does
/// not resolve to a stored notification is tolerated here.
pub fn validate_new_receipt(receipt: &NewReceipt) -> Result<(), ValidationError> {
    if receipt.receiver.is_none() {
        return Err(ValidationError::MissingReceiver);
    }
    Ok(())
}

/// Validate a batch, failing on the first invalid receipt.
pub fn validate_new_receipts(receipts: &[NewReceipt]) -> Result<(), ValidationError> {
    receipts.iter().try_for_each(validate_new_receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::ReceiptBuilder;
    use crate::receiver::{Receiver, ReceiverKind};
    use crate::types::NotificationId;

    #[test]
    fn test_batch_fails_on_any_missing_receiver() {
        let ok = ReceiptBuilder::new(NotificationId::new(1))
            .receiver(Receiver::new(ReceiverKind(1), 1))
            .build_unchecked();
        let bad = ReceiptBuilder::new(NotificationId::new(1)).build_unchecked();

        assert!(validate_new_receipts(&[ok.clone()]).is_ok());
        assert_eq!(
            validate_new_receipts(&[ok, bad]),
            Err(ValidationError::MissingReceiver)
        );
    }
}
