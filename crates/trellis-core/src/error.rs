//! Failures raised by the structural mutation primitives of `DocumentTree`.

use crate::id::Symbol;
use thiserror::Error;

/// Why a structural primitive refused to run. The tree is left untouched
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("property `{property}` on `{type_name}` expects {expected}")]
    PropertyTypeMismatch {
        type_name: Symbol,
        property: Symbol,
        expected: &'static str,
    },

    #[error("`{type_name}` has no property `{property}`")]
    UnknownProperty { type_name: Symbol, property: Symbol },

    #[error("unknown component type `{0}`")]
    UnknownType(Symbol),

    #[error("node is not part of this document")]
    MissingNode,
}

impl TreeError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TreeError::InvalidTarget(msg.into())
    }
}
