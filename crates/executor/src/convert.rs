//! Lossless conversion from engine errors to command errors.

use mirage_core::{Error as EngineError, ErrorCode};

use crate::Error;

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        let code = err.code();
        match (code, err) {
            (_, EngineError::EntityAlreadyExists { key }) => Error::AlreadyExists { key },
            (_, EngineError::EntityNotFound { key }) => Error::NotFound { key },
            (ErrorCode::Aborted, err) => Error::Aborted {
                reason: err.to_string(),
            },
            (_, err) => Error::InvalidArgument {
                reason: err.to_string(),
            },
        }
    }
}

/// Map an engine result into a command result.
pub(crate) fn convert_result<T>(result: mirage_core::Result<T>) -> crate::Result<T> {
    result.map_err(Into::into)
}
