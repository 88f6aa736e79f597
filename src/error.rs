//! Shared error conventions.
//!
//! Every module owns its own `thiserror` enum. `ErrorCode` gives each variant
//! a grepable code plus a retryable flag so the HTTP layer and the CLI
//! report failures the same way.

/// Grepable error code and retryable flag for structured error reporting.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
