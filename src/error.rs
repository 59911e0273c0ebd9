//! Error types for the dependency injection container.

use std::fmt;

/// Dependency injection errors
///
/// Represents the various error conditions that can occur while declaring
/// dependencies, resolving them, or exporting the container's structure.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Container, DiError, Resolver};
///
/// let container = Container::new();
/// match container.get_required("missing") {
///     Err(DiError::NotFound(name)) => assert_eq!(name, "missing"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_injector::DiError;
///
/// let circular = DiError::Circular(vec!["a".into(), "b".into(), "a".into()]);
/// assert_eq!(
///     circular.to_string(),
///     "Circular dependency detected while resolving \"a, b, a\""
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// No dependency is registered under this name
    NotFound(String),
    /// The dependency is registered but resolved to no value
    Undefined(String),
    /// The resolved value is not of the requested type
    TypeMismatch {
        /// Dependency name
        name: String,
        /// Requested type name
        expected: &'static str,
    },
    /// Circular dependency detected (chain in encounter order, closing name last)
    Circular(Vec<String>),
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
    /// The name was already registered
    AlreadyRegistered(String),
    /// A strategy was already chosen for this descriptor
    StrategyAlreadySet(String),
    /// Arguments or context were already attached
    AlreadyConfigured {
        /// Dependency name
        name: String,
        /// Which option was supplied twice ("args" or "context")
        option: &'static str,
    },
    /// The dependency was resolved and can no longer be configured
    Sealed(String),
    /// The owner of a property/method dependency did not yield the member
    InvalidOwner {
        /// Dependency name (also the member name)
        name: String,
        /// Why the owner was rejected
        reason: String,
    },
    /// A positional argument was missing or of the wrong type
    Argument {
        /// Argument position
        index: usize,
        /// What went wrong
        reason: String,
    },
    /// A factory, constructor or method reported a failure
    Factory(String),
    /// Container options could not be parsed or serialized
    Config(String),
    /// Graph export failed
    Export(String),
}

impl DiError {
    /// Convenience constructor for failures raised by user callables.
    pub fn factory(message: impl Into<String>) -> Self {
        DiError::Factory(message.into())
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotFound(name) => write!(f, "Dependency not found: {}", name),
            DiError::Undefined(name) => write!(f, "Dependency resolved to no value: {}", name),
            DiError::TypeMismatch { name, expected } => {
                write!(f, "Type mismatch for {}: expected {}", name, expected)
            }
            DiError::Circular(path) => {
                write!(f, "Circular dependency detected while resolving \"{}\"", path.join(", "))
            }
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
            DiError::AlreadyRegistered(name) => write!(f, "Dependency already registered: {}", name),
            DiError::StrategyAlreadySet(name) => {
                write!(f, "Resolution strategy already chosen for: {}", name)
            }
            DiError::AlreadyConfigured { name, option } => {
                write!(f, "Option '{}' already set for: {}", option, name)
            }
            DiError::Sealed(name) => write!(f, "Dependency already resolved: {}", name),
            DiError::InvalidOwner { name, reason } => {
                write!(f, "Invalid owner for {}: {}", name, reason)
            }
            DiError::Argument { index, reason } => write!(f, "Argument {}: {}", index, reason),
            DiError::Factory(msg) => write!(f, "Factory error: {}", msg),
            DiError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DiError::Export(msg) => write!(f, "Export error: {}", msg),
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout the crate.
///
/// ```rust
/// use ferrous_injector::{DiResult, DiError};
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::NotFound("some_dependency".into()))
/// }
///
/// assert!(failing_operation().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
