use super::Error;

/// Error when the connection resource cannot open a transaction.
#[derive(Debug)]
pub(super) struct CantStartTransactionError;

impl std::error::Error for CantStartTransactionError {}

impl core::fmt::Display for CantStartTransactionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("can't start transaction")
    }
}

impl Error {
    pub fn cant_start_transaction() -> Error {
        Error::from(super::ErrorKind::CantStartTransaction(
            CantStartTransactionError,
        ))
    }

    pub fn is_cant_start_transaction(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::CantStartTransaction(_)))
    }
}
