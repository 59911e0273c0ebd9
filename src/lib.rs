//! # ferrous-injector
//!
//! Lazy, name-keyed dependency injection with memoized resolution.
//!
//! ## Features
//!
//! - **Lazy**: nothing is constructed until it is first read
//! - **Memoized**: every dependency resolves at most once per container
//! - **Name-keyed**: dependencies refer to each other by string name
//! - **Circular dependency detection**: cycles fail with the full chain instead of recursing
//! - **Owner-relative members**: expose a field or bound method of another dependency
//! - **Staged builders**: illegal configuration sequences do not compile
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_injector::{Container, Resolver, Value};
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: std::sync::Arc<Database>,
//! }
//!
//! # fn main() -> ferrous_injector::DiResult<()> {
//! let container = Container::new();
//! container.register("url")?.as_constant("postgres://localhost")?;
//! container
//!     .register("db")?
//!     .using_constructor(|call| {
//!         let url = call.arg::<&'static str>(0)?;
//!         Ok(Value::new(Database { url: url.to_string() }))
//!     })?
//!     .with_args(["url"])?;
//! container
//!     .register("users")?
//!     .using_factory(|call| Ok(Value::new(UserService { db: call.arg::<Database>(0)? })))?
//!     .with_args(["db"])?;
//!
//! let users = container.get_as::<UserService>("users")?;
//! assert_eq!(users.db.url, "postgres://localhost");
//!
//! // Resolved once: later reads return the same instance.
//! let again = container.get_as::<UserService>("users")?;
//! assert!(std::sync::Arc::ptr_eq(&users, &again));
//! # Ok(())
//! # }
//! ```
//!
//! ## Resolution Strategies
//!
//! - **Constant**: a fixed value
//! - **Factory**: a callable receiving resolved arguments and a context
//! - **Constructor**: like a factory, but never receives a context
//! - **Property**: the member of an owner that shares the dependency's name
//! - **Method**: a method of an owner, bound to a context or the owner itself
//!
//! ## Circular Dependencies
//!
//! ```rust
//! use ferrous_injector::{args, Container, DiError};
//!
//! # fn main() -> ferrous_injector::DiResult<()> {
//! let container = Container::new();
//! container.register("a")?.using_factory(|_| Ok(1u8.into()))?.with_args(args!["b"])?;
//! container.register("b")?.using_factory(|_| Ok(2u8.into()))?.with_args(args!["a"])?;
//!
//! match container.get("a") {
//!     Err(DiError::Circular(chain)) => assert_eq!(chain, ["a", "b", "a"]),
//!     other => panic!("expected a cycle, got {:?}", other),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! [`Container`] is single-threaded. [`SyncContainer`] serializes access for
//! hosts that share one registry between threads.

// Module declarations
pub mod builder;
pub mod config;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod graph_export;
pub mod observer;
pub mod sync;
pub mod traits;
pub mod value;

// Internal modules
mod internal;
mod registration;

// Re-export core types
pub use builder::{
    ArgsSet, ConstructorBuilder, ContextSet, DescriptorBuilder, FactoryBuilder, MethodBuilder, NoArgs,
    NoContext, Registrar,
};
pub use config::ContainerOptions;
pub use container::{Container, ContainerBuilder, Dependencies};
pub use descriptors::{DependencyInfo, Descriptor, MemberKind, StrategyKind};
pub use error::{DiError, DiResult};
pub use graph_export::{
    exports, DefaultGraphExporter, DependencyGraph, DependencyType, ExportFormat, ExportOptions,
    GraphBuilder, GraphEdge, GraphExporter, GraphMetadata, GraphNode,
};
pub use observer::{LoggingObserver, ResolutionObserver};
pub use sync::SyncContainer;
pub use traits::{Resolver, ResolverCore};
pub use value::{BoundMethod, Invocation, Member, Method, Object, Record, Value};

/// Builds a `Vec<Value>` from heterogeneous argument expressions.
///
/// ```rust
/// use ferrous_injector::{args, Value};
///
/// let list: Vec<Value> = args!["db", 3u16, true];
/// assert_eq!(list[0].as_name(), Some("db"));
/// assert_eq!(*list[1].downcast::<u16>().unwrap(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),+]
    };
}
