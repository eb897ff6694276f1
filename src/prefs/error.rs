use thiserror::Error;

/// Errors raised by preference stores.
#[derive(Error, Debug)]
pub enum PrefsError {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Keys must be non-empty and reasonably short
    #[error("Invalid preference key: {0:?}")]
    InvalidKey(String),

    /// A writer panicked while holding the store lock
    #[error("Preference store lock poisoned")]
    Poisoned,
}
