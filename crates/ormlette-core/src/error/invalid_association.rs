use super::Error;

/// Error when an association cannot be resolved for a record.
///
/// Raised when the owner has no primary key, the named column does not
/// exist, or the column is not a relationship.
#[derive(Debug)]
pub(super) struct InvalidAssociationError {
    message: Box<str>,
}

impl std::error::Error for InvalidAssociationError {}

impl core::fmt::Display for InvalidAssociationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error {
    pub fn invalid_association(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidAssociation(
            InvalidAssociationError {
                message: message.into().into_boxed_str(),
            },
        ))
    }

    pub fn is_invalid_association(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidAssociation(_)))
    }
}
