use super::Error;

/// Error when commit or rollback is called outside a live transaction.
#[derive(Debug)]
pub(super) struct NoValidTransactionError;

impl std::error::Error for NoValidTransactionError {}

impl core::fmt::Display for NoValidTransactionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("no valid transaction")
    }
}

impl Error {
    pub fn no_valid_transaction() -> Error {
        Error::from(super::ErrorKind::NoValidTransaction(NoValidTransactionError))
    }

    pub fn is_no_valid_transaction(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::NoValidTransaction(_)))
    }
}
