//! Framework error type.
//!
//! Sub-crates define their own error enums and keep `DkError` as one variant
//! where configuration problems can surface.

use thiserror::Error;

/// The top-level error type for `dk-core`.
#[derive(Debug, Error)]
pub enum DkError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `dk-core`.
pub type DkResult<T> = Result<T, DkError>;
