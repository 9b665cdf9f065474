//! Typed input errors shared by the calculators, the puzzle and the proposal form.
//!
//! Command handlers wrap these in `anyhow` at the CLI boundary.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be greater than 0, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be in {range}, got {value}")]
    OutOfRange {
        field: &'static str,
        range: &'static str,
        value: f64,
    },

    #[error("word must contain at least {min} letters")]
    WordTooShort { min: usize },

    #[error("tile {index} does not exist")]
    NoSuchTile { index: usize },

    #[error("tile {index} is already used")]
    TileUsed { index: usize },

    #[error("unknown {kind} '{value}'")]
    Unknown { kind: &'static str, value: String },
}

/// Reject NaN and infinities.
pub fn finite(field: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NotFinite { field, value })
    }
}

/// Finite and strictly positive.
pub fn positive(field: &'static str, value: f64) -> Result<f64, InputError> {
    let value = finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(InputError::NotPositive { field, value })
    }
}

/// Trimmed text that must not be empty.
pub fn required(field: &'static str, value: &str) -> Result<String, InputError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(InputError::Empty { field })
    } else {
        Ok(trimmed.to_string())
    }
}
