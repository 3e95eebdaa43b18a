//! Error types for Horizon Accordion documents.

/// A specialized Result type for document operations.
pub type DomResult<T> = std::result::Result<T, DomError>;

/// Errors that can occur while manipulating a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The node ID is invalid or the node has been destroyed.
    #[error("Invalid or destroyed node")]
    InvalidNode,

    /// The requested insertion would produce an invalid tree.
    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    /// The operation is not allowed in the node's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A reference node is not where the operation expected it to be.
    #[error("Node not found among the parent's children")]
    NotFound,

    /// A custom element with this tag has already been defined.
    #[error("Custom element '{0}' is already defined")]
    AlreadyDefined(String),

    /// The tag is not a valid custom element name.
    #[error("'{0}' is not a valid custom element name")]
    InvalidElementName(String),

    /// The node does not carry the expected element state.
    #[error("Node is not a {expected} element")]
    TypeMismatch {
        /// The type name that was expected.
        expected: &'static str,
    },
}

impl DomError {
    /// Create a hierarchy request error.
    pub fn hierarchy(message: impl Into<String>) -> Self {
        Self::HierarchyRequest(message.into())
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a type mismatch error for element state of type `T`.
    pub fn type_mismatch<T: ?Sized>() -> Self {
        let full = std::any::type_name::<T>();
        Self::TypeMismatch {
            expected: full.rsplit("::").next().unwrap_or(full),
        }
    }

    /// Whether this error is an invalid-state condition.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Panel;

    #[test]
    fn test_type_mismatch_uses_short_name() {
        let err = DomError::type_mismatch::<Panel>();
        assert_eq!(err, DomError::TypeMismatch { expected: "Panel" });
        assert_eq!(err.to_string(), "Node is not a Panel element");
    }

    #[test]
    fn test_invalid_state_display() {
        let err = DomError::invalid_state("node is detached");
        assert!(err.is_invalid_state());
        assert_eq!(err.to_string(), "Invalid state: node is detached");
        assert!(!DomError::InvalidNode.is_invalid_state());
    }
}
