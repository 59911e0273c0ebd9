//! Resolver traits for name-based lookup.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::value::Value;

/// Core resolver trait for object-safe, name-based resolution.
///
/// Implemented by [`Container`](crate::Container) and
/// [`SyncContainer`](crate::SyncContainer). Most users call the typed helpers
/// of [`Resolver`], which every `ResolverCore` gets for free.
pub trait ResolverCore {
    /// Resolves `name`, soft-missing unknown names.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(value))` - The resolved (possibly cached) value
    /// * `Ok(None)` - `name` is unknown, or resolved to no value
    /// * `Err(DiError)` - Resolution failed (circular, factory error, ...)
    fn resolve_name(&self, name: &str) -> DiResult<Option<Value>>;

    /// Returns `true` if `name` is registered.
    fn contains_name(&self, name: &str) -> bool;
}

/// High-level resolver interface with strict and typed lookups.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{Container, DiError, Resolver};
///
/// # fn main() -> ferrous_injector::DiResult<()> {
/// let container = Container::new();
/// container.register("name")?.as_constant("ferrous")?;
/// container.register("nothing")?;
///
/// assert_eq!(*container.get_as::<&'static str>("name")?, "ferrous");
/// assert!(matches!(container.get_required("missing"), Err(DiError::NotFound(_))));
/// assert!(matches!(container.get_required("nothing"), Err(DiError::Undefined(_))));
/// assert!(matches!(container.get_as::<u32>("name"), Err(DiError::TypeMismatch { .. })));
/// # Ok(())
/// # }
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves `name`, failing with [`DiError::NotFound`] for unknown names
    /// and [`DiError::Undefined`] for dependencies that resolved to nothing.
    fn get_required(&self, name: &str) -> DiResult<Value> {
        match self.resolve_name(name)? {
            Some(value) => Ok(value),
            None if self.contains_name(name) => Err(DiError::Undefined(name.to_string())),
            None => Err(DiError::NotFound(name.to_string())),
        }
    }

    /// Resolves `name` and downcasts it to `T`.
    fn get_as<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        self.get_required(name)?.downcast_named::<T>(name)
    }

    /// Soft-miss variant of [`get_as`](Self::get_as): `Ok(None)` when the
    /// name is unknown or resolved to nothing.
    fn get_optional_as<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Option<Arc<T>>> {
        match self.resolve_name(name)? {
            Some(value) => value.downcast_named::<T>(name).map(Some),
            None => Ok(None),
        }
    }

    /// Resolves a method dependency and calls it with `args`.
    ///
    /// Bound methods are called on their receiver; unbound methods (a
    /// property resolved without any context) are called with
    /// [`Value::undefined`] as receiver.
    fn call_method(&self, name: &str, args: &[Value]) -> DiResult<Value> {
        let value = self.get_required(name)?;
        if let Some(bound) = value.as_bound_method() {
            return bound.call(args);
        }
        if let Some(method) = value.as_method() {
            return method.call(&Value::undefined(), args);
        }
        Err(DiError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<crate::value::BoundMethod>(),
        })
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
