//! Error types for formula evaluation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a formula cell has no value.
///
/// Positions in `Compile` and `Runtime` messages are already relative to the
/// author's formula text (`"line:col: message"`).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum FormulaError {
    #[error("{0}")]
    Compile(String),

    #[error("{0}")]
    Runtime(String),

    #[error("Formula timed out")]
    Timeout,
}

impl FormulaError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FormulaError::Timeout)
    }
}

pub type Result<T> = std::result::Result<T, FormulaError>;
