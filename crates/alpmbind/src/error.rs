//! Error codes and result types.

use std::ffi::{c_int, NulError};
use std::fmt;

use alpmbind_sys as sys;
use thiserror::Error;

use crate::types::QuestionType;

/// Result type for binding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A native error number as recorded on a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(c_int);

impl ErrorCode {
    /// No error.
    pub const OK: Self = Self(sys::ALPM_ERR_OK);
    /// Out of memory.
    pub const MEMORY: Self = Self(sys::ALPM_ERR_MEMORY);
    /// A directory could not be found or read.
    pub const NOT_A_DIR: Self = Self(sys::ALPM_ERR_NOT_A_DIR);
    /// A wrong or null argument was passed.
    pub const WRONG_ARGS: Self = Self(sys::ALPM_ERR_WRONG_ARGS);
    /// The database is already registered.
    pub const DB_NOT_NULL: Self = Self(sys::ALPM_ERR_DB_NOT_NULL);
    /// The database could not be found.
    pub const DB_NOT_FOUND: Self = Self(sys::ALPM_ERR_DB_NOT_FOUND);
    /// A server URL was rejected.
    pub const SERVER_BAD_URL: Self = Self(sys::ALPM_ERR_SERVER_BAD_URL);
    /// The package could not be found.
    pub const PKG_NOT_FOUND: Self = Self(sys::ALPM_ERR_PKG_NOT_FOUND);

    /// Wraps a raw error number.
    pub const fn from_raw(code: c_int) -> Self {
        Self(code)
    }

    /// Returns the raw error number.
    pub const fn as_raw(self) -> c_int {
        self.0
    }

    /// Returns true if the code means success.
    pub fn is_ok(self) -> bool {
        self == Self::OK
    }

    /// Returns the native description of this code.
    pub fn message(self) -> String {
        // Safety: alpm_strerror returns a static string for every input.
        unsafe { crate::marshal::from_cstr(sys::alpm_strerror(self.0)) }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors surfaced by the binding.
#[derive(Debug, Error)]
pub enum Error {
    /// A native operation failed; carries the handle's last error.
    #[error("alpm error {code}: {message}")]
    Alpm {
        /// Native error number.
        code: ErrorCode,
        /// Native description.
        message: String,
    },

    /// A question was narrowed to a variant it is not.
    #[error("wrong question type: expected {expected}, got {actual}")]
    WrongQuestionType {
        /// The requested variant.
        expected: QuestionType,
        /// The question's discriminant.
        actual: QuestionType,
    },

    /// A host string cannot cross the boundary.
    #[error("string contains an interior NUL byte: {0}")]
    InteriorNul(#[from] NulError),

    /// A native enumeration value the binding does not know.
    #[error("unknown {kind} value: {value}")]
    UnknownValue {
        /// Name of the enumeration.
        kind: &'static str,
        /// The raw value.
        value: c_int,
    },
}

impl Error {
    /// Builds an error from a native error number.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::Alpm {
            code,
            message: code.message(),
        }
    }

    /// Creates an unknown enumeration value error.
    pub(crate) fn unknown_value(kind: &'static str, value: c_int) -> Self {
        Self::UnknownValue { kind, value }
    }

    /// Returns the native error number, if this error came from the library.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Alpm { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Reads the last error recorded on `handle`.
///
/// # Safety
///
/// `handle` must be a live handle.
pub(crate) unsafe fn last_error(handle: *mut sys::alpm_handle_t) -> Error {
    let code = ErrorCode::from_raw(sys::alpm_errno(handle));
    tracing::debug!(code = code.as_raw(), "native operation failed");
    Error::from_code(code)
}

/// Turns a native `0 on success` status into a result.
///
/// # Safety
///
/// `handle` must be a live handle.
pub(crate) unsafe fn check(handle: *mut sys::alpm_handle_t, status: c_int) -> Result<()> {
    if status == 0 {
        Ok(())
    } else {
        Err(last_error(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trip() {
        let code = ErrorCode::from_raw(sys::ALPM_ERR_PKG_NOT_FOUND);
        assert_eq!(code, ErrorCode::PKG_NOT_FOUND);
        assert_eq!(code.as_raw(), sys::ALPM_ERR_PKG_NOT_FOUND);
        assert!(!code.is_ok());
        assert!(ErrorCode::OK.is_ok());
    }

    #[test]
    fn native_message() {
        let err = Error::from_code(ErrorCode::PKG_NOT_FOUND);
        assert_eq!(err.code(), Some(ErrorCode::PKG_NOT_FOUND));
        let text = err.to_string();
        assert!(text.starts_with("alpm error 32: "), "{text}");
        assert!(text.len() > "alpm error 32: ".len());
    }

    #[test]
    fn wrong_question_type_message() {
        let err = Error::WrongQuestionType {
            expected: QuestionType::InstallIgnorePkg,
            actual: QuestionType::SelectProvider,
        };
        assert_eq!(err.code(), None);
        assert!(err.to_string().starts_with("wrong question type"));
    }

    #[test]
    fn interior_nul() {
        let err: Error = std::ffi::CString::new("a\0b").unwrap_err().into();
        assert!(matches!(err, Error::InteriorNul(_)));
    }
}
