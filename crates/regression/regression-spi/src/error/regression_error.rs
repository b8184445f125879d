//! Engine error taxonomy.

use std::fmt;

use estimator_spi::EstimatorError;
use thiserror::Error;

use super::ValidationError;

/// Category of a fatal, non-recoverable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalKind {
    /// A branch the engine's own logic rules out was reached
    Unreachable,
    Unimplemented,
    Todo,
    /// The model selector is not in the catalogue
    UnknownSelector,
}

impl fmt::Display for FatalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FatalKind::Unreachable => "unreachable",
            FatalKind::Unimplemented => "unimplemented",
            FatalKind::Todo => "todo",
            FatalKind::UnknownSelector => "unknown selector",
        };
        f.write_str(label)
    }
}

/// Errors produced by the evaluation engine.
#[derive(Error, Debug)]
pub enum RegressionError {
    /// Input rejected before evaluation.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A single candidate failed to fit or predict. Absorbed by the
    /// multi-candidate harness.
    #[error("Model '{model}' failed: {source}")]
    Candidate {
        model: String,
        #[source]
        source: EstimatorError,
    },

    /// Every candidate in the roster failed.
    #[error("No candidate model could be evaluated")]
    NoViableCandidate,

    /// Contract violation; never caught by calling code.
    #[error("Fatal ({kind}): {message}")]
    Fatal { kind: FatalKind, message: String },

    /// The worker pool dropped a job before it produced a result.
    #[error("Worker pool error: {0}")]
    Worker(String),
}

impl RegressionError {
    pub fn candidate(model: impl Into<String>, source: EstimatorError) -> Self {
        Self::Candidate {
            model: model.into(),
            source,
        }
    }

    pub fn fatal(kind: FatalKind, message: impl Into<String>) -> Self {
        Self::Fatal {
            kind,
            message: message.into(),
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::fatal(FatalKind::Unreachable, message)
    }

    pub fn unknown_selector(selector: &str) -> Self {
        Self::fatal(
            FatalKind::UnknownSelector,
            format!("no model named '{selector}'"),
        )
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// Only candidate-level failures may be absorbed by the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Candidate { .. })
    }
}
