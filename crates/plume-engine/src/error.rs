//! Error types for the engine layer.

use thiserror::Error;

/// Errors from parsing color values.
///
/// This is the only fallible parse in the engine layer; every other edge
/// case degrades to a no-op rather than an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ColorError {
    /// Not a `#RRGGBB` string.
    #[error("color must be a #RRGGBB hex string, got {0:?}")]
    Format(String),

    /// Right shape, but a non-hex digit inside.
    #[error("invalid hex digit in color {0:?}")]
    HexDigit(String),
}
