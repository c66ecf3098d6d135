use super::Error;

/// Error when a raw criteria fragment cannot be assembled into a statement.
#[derive(Debug)]
pub(super) struct InvalidCriteriaError {
    message: Box<str>,
}

impl std::error::Error for InvalidCriteriaError {}

impl core::fmt::Display for InvalidCriteriaError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid criteria fragment: {}", self.message)
    }
}

impl Error {
    pub fn invalid_criteria(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidCriteria(InvalidCriteriaError {
            message: message.into().into_boxed_str(),
        }))
    }

    pub fn is_invalid_criteria(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidCriteria(_)))
    }
}
