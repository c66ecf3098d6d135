use super::Error;

/// Error when a callback chain is edited against an anchor that does not
/// exist, or a step name is registered twice.
#[derive(Debug)]
pub(super) struct InvalidCallbackError {
    message: Box<str>,
}

impl std::error::Error for InvalidCallbackError {}

impl core::fmt::Display for InvalidCallbackError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid callback: {}", self.message)
    }
}

impl Error {
    pub fn invalid_callback(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidCallback(InvalidCallbackError {
            message: message.into().into_boxed_str(),
        }))
    }

    pub fn is_invalid_callback(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidCallback(_)))
    }
}
