use thiserror::Error;

use crate::editing::NodeId;

/// Failures the formatting engine reports to its caller.
///
/// Collapsed selections and "already in that state" toggles are not errors; they come
/// back as an unchanged [`Patch`](crate::editing::Patch).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A position names a node that is not part of the document, or an offset that is
    /// out of bounds for its node. The input document is left untouched.
    #[error("invalid selection: {reason}")]
    InvalidSelection { reason: String },

    /// A mutation produced (or would produce) a tree that breaks a document invariant.
    #[error("structural violation: {0}")]
    StructuralViolation(String),
}

impl FormatError {
    pub(crate) fn invalid_selection(reason: impl Into<String>) -> Self {
        Self::InvalidSelection {
            reason: reason.into(),
        }
    }

    pub(crate) fn violation(message: impl Into<String>) -> Self {
        Self::StructuralViolation(message.into())
    }

    pub(crate) fn unknown_node(node: NodeId) -> Self {
        Self::invalid_selection(format!("node {node} is not part of this document"))
    }

    /// True for the condition a host should log and recover from.
    pub fn is_invalid_selection(&self) -> bool {
        matches!(self, Self::InvalidSelection { .. })
    }
}
