//! Shared primitives used across Inkwell crates.

use core::fmt;

/// Result alias used across the workspace.
pub type EditorResult<T> = Result<T, EditorError>;

/// Error carried across crate boundaries.
///
/// `code` is a stable dotted identifier (`dom.stale_handle`,
/// `load.unsupported_media_type`, ...) that callers match on; `message` is for
/// humans and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorError {
    pub code: &'static str,
    pub message: String,
}

impl EditorError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for EditorError {}
