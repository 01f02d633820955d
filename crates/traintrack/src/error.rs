//! Error type shared by the word codec, graph surgery, and the engine.
//!
//! Categories
//! - Structural: malformed text, discontinuous images, fixed word not preserved.
//! - Invariant: a surgery precondition was violated (programmer error).
//! - Numerical: non-finite eigen data.
//!
//! A reducible transition matrix is not an error; the engine reports it as
//! `train::Outcome::Reducible`.

use thiserror::Error;

/// Coarse category of a [`GraphError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    Invariant,
    Numerical,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("parse error (line {line}): {msg}")]
    Parse { line: usize, msg: String },

    #[error("{0}")]
    Structural(String),

    #[error("{op}: {reason}")]
    Invariant { op: &'static str, reason: String },

    #[error("non-finite value in {0}")]
    Numerical(String),
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::Parse { .. } | GraphError::Structural(_) => ErrorKind::Structural,
            GraphError::Invariant { .. } => ErrorKind::Invariant,
            GraphError::Numerical(_) => ErrorKind::Numerical,
        }
    }

    pub(crate) fn invariant(op: &'static str, reason: impl Into<String>) -> Self {
        GraphError::Invariant {
            op,
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(line: usize, msg: impl Into<String>) -> Self {
        GraphError::Parse {
            line,
            msg: msg.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
