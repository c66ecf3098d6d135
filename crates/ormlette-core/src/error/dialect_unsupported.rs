use super::Error;

/// Error when a dialect is unknown or cannot express an operation.
#[derive(Debug)]
pub(super) struct DialectUnsupportedError {
    dialect: Box<str>,
    operation: Option<Box<str>>,
}

impl std::error::Error for DialectUnsupportedError {}

impl core::fmt::Display for DialectUnsupportedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match &self.operation {
            Some(operation) => write!(f, "dialect `{}` does not support {}", self.dialect, operation),
            None => write!(f, "unsupported dialect `{}`", self.dialect),
        }
    }
}

impl Error {
    /// The dialect name is not one of the registered dialects.
    pub fn unknown_dialect(dialect: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::DialectUnsupported(
            DialectUnsupportedError {
                dialect: dialect.into().into_boxed_str(),
                operation: None,
            },
        ))
    }

    /// The dialect cannot express `operation`.
    pub fn dialect_unsupported(dialect: &str, operation: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::DialectUnsupported(
            DialectUnsupportedError {
                dialect: dialect.into(),
                operation: Some(operation.into().into_boxed_str()),
            },
        ))
    }

    pub fn is_dialect_unsupported(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::DialectUnsupported(_)))
    }
}
