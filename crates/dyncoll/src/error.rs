//! Collection Error Handling
//!
//! Every fallible operation returns [`CollectionError`]. The binding layer
//! turns it into a host exception carrying the `Display` message.
//!
//! # Usage
//!
//! Callbacks report their own failures through [`CollectionError::callback`]
//! and propagate collection errors with `?`:
//! ```ignore
//! seq.each(|value, _| {
//!     if value.is_undefined() {
//!         return Err(CollectionError::callback("undefined element"));
//!     }
//!     other.add(&[value.clone()])?;
//!     Ok(ControlFlow::Continue(()))
//! })?;
//! ```

use std::error::Error;
use std::fmt;

/// Error raised by collection operations
#[derive(Debug)]
pub enum CollectionError {
    /// Wrong arity or argument type (missing values, non-index arguments, bad seeds for bulk adds)
    Argument(String),
    /// Unsupported seed, or a seed containing unsupported element kinds
    Construction(String),
    /// Index beyond the valid range for a positional write
    Index { index: usize, size: usize },
    /// Structural mutation attempted while the same instance is being enumerated
    IterationInProgress { operation: &'static str },
    /// Failure raised by a user callback, propagated unchanged
    Callback(Box<dyn Error + Send + Sync>),
    /// JSON rendering failure from the stringification hook
    Format(serde_json::Error),
}

impl CollectionError {
    /// Wrap a callback failure
    pub fn callback(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        CollectionError::Callback(err.into())
    }

    pub(crate) fn missing_arguments(signature: &str) -> Self {
        CollectionError::Argument(format!("{} takes at least one argument.", signature))
    }
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::Argument(msg) => write!(f, "{}", msg),
            CollectionError::Construction(msg) => write!(f, "{}", msg),
            CollectionError::Index { index, size } => {
                write!(f, "Index {} is greater than size of this collection ({}).", index, size)
            }
            CollectionError::IterationInProgress { operation } => {
                write!(
                    f,
                    "{}() cannot be called while the collection is being iterated.",
                    operation
                )
            }
            CollectionError::Callback(e) => write!(f, "{}", e),
            CollectionError::Format(e) => write!(f, "Format error: {}", e),
        }
    }
}

impl Error for CollectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CollectionError::Callback(e) => Some(e.as_ref()),
            CollectionError::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CollectionError {
    fn from(e: serde_json::Error) -> Self {
        CollectionError::Format(e)
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CollectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_message_names_operation() {
        let err = CollectionError::IterationInProgress { operation: "removeAt" };
        assert_eq!(
            err.to_string(),
            "removeAt() cannot be called while the collection is being iterated."
        );
    }

    #[test]
    fn test_callback_error_is_verbatim() {
        let err = CollectionError::callback("boom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.source().map(|e| e.to_string()), Some("boom".to_string()));
    }

    #[test]
    fn test_index_error_message() {
        let err = CollectionError::Index { index: 7, size: 3 };
        assert!(err.to_string().contains("Index 7"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_missing_arguments_message() {
        let err = CollectionError::missing_arguments("add(value, ...)");
        assert_eq!(err.to_string(), "add(value, ...) takes at least one argument.");
    }
}
