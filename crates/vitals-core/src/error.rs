// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Error type shared by every pipeline stage.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VitalsError {
    /// Malformed configuration or mismatched shapes, reported before any work runs.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A statistic could not be computed from the supplied values.
    #[error("numerical issue: {0}")]
    NumericalIssue(String),
    /// An internal consistency check failed; the run must stop.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl VitalsError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Stable machine-readable code for the error class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NumericalIssue(_) => "numerical_issue",
            Self::InvariantViolation(_) => "invariant_violation",
        }
    }
}
