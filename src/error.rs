//! Error types for the dialog binding layer.

use thiserror::Error;

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced across the scripting-host boundary.
///
/// `BadArgument` reaches the script as a `TypeError`; the rest as plain
/// errors. User cancellation is not an error — it is the `cancelled`
/// event.
#[derive(Error, Debug)]
pub enum Error {
    /// Argument count, type, or value failed validation. The call had no
    /// effect.
    #[error("Bad argument")]
    BadArgument {
        /// Which check failed; logged, never shown to the script.
        detail: String,
    },

    /// The window argument did not unwrap to a live host window.
    #[error("Invalid window")]
    InvalidWindow,

    /// Call on a corrupted or disposed bridge object.
    #[error("{0}")]
    InvalidState(String),
}

impl Error {
    /// Create a bad-argument error.
    pub fn bad_argument(detail: impl Into<String>) -> Self {
        Self::BadArgument {
            detail: detail.into(),
        }
    }

    /// Create an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Whether this error maps to a script-side `TypeError`.
    #[must_use]
    pub const fn is_type_error(&self) -> bool {
        matches!(self, Self::BadArgument { .. })
    }
}
