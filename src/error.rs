//! Error types for the configuration-driven container.

use thiserror::Error;

/// Coarse error categories.
///
/// Every [`DiError`] variant belongs to exactly one category. Callers that
/// only care about *where* a failure came from (a file, a definition, a
/// reference, a cycle, a constructor) can match on [`DiError::kind`] instead
/// of on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File missing, unreadable, unsupported or malformed
    Load,
    /// Malformed `services`/`parameters` section or service definition
    Definition,
    /// Missing service/parameter, bad tag collection, parameter cycle or
    /// substitution limit
    Reference,
    /// A service depends on itself, directly or transitively
    ConstructionCycle,
    /// A constructor, factory or setter failed
    Construction,
}

/// Container errors
///
/// Represents the conditions that can abort a build or a lazy service
/// access. None of them are recoverable inside the container: a failed
/// build returns no container, and a failed access leaves the key unbuilt.
///
/// # Examples
///
/// ```rust
/// use ferrous_syringe::{DiError, ErrorKind};
///
/// let err = DiError::Circular(vec!["a".into(), "b".into(), "a".into()]);
/// assert_eq!(err.to_string(), "Circular dependency: a -> b -> a");
/// assert_eq!(err.kind(), ErrorKind::ConstructionCycle);
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Config file could not be located, loaded or parsed
    #[error("Load error: {0}")]
    Load(String),
    /// Invalid service or parameter definition
    #[error("Invalid definition: {0}")]
    Definition(String),
    /// Reference to a missing service/parameter or an invalid tag collection
    #[error("Reference error: {0}")]
    Reference(String),
    /// A parameter expands back into itself
    #[error("Circular reference found for the key '{0}'")]
    CircularReference(String),
    /// Parameter substitution did not settle within the iteration cap
    #[error("Could not resolve parameter '{0}'. The maximum recursion limit was exceeded")]
    ResolutionLimit(String),
    /// Circular dependency between services (includes the key path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Maximum construction nesting depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// A stub service was accessed or injected
    #[error("Service '{0}' is a stub service and cannot be accessed or injected")]
    Stub(String),
    /// A constructor, factory method or setter returned an error
    #[error("Could not construct '{service}': {reason}")]
    Construction { service: String, reason: String },
    /// A typed argument accessor was used on an incompatible argument
    #[error("Invalid argument #{index}: {reason}")]
    InvalidArgument { index: usize, reason: String },
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(String),
}

impl DiError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiError::Load(_) => ErrorKind::Load,
            DiError::Definition(_) => ErrorKind::Definition,
            DiError::Reference(_)
            | DiError::CircularReference(_)
            | DiError::ResolutionLimit(_)
            | DiError::Stub(_) => ErrorKind::Reference,
            DiError::Circular(_) | DiError::DepthExceeded(_) => ErrorKind::ConstructionCycle,
            DiError::Construction { .. }
            | DiError::InvalidArgument { .. }
            | DiError::TypeMismatch(_) => ErrorKind::Construction,
        }
    }

    /// Shorthand for a [`DiError::Construction`] raised from user code.
    pub fn construction(service: impl Into<String>, reason: impl Into<String>) -> Self {
        DiError::Construction {
            service: service.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for container operations
pub type DiResult<T> = Result<T, DiError>;
