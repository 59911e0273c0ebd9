//! Dynamic values flowing through the container.
//!
//! Every dependency resolves to a [`Value`]: a cheaply clonable, type-erased
//! `Arc<dyn Any + Send + Sync>`. Values that behave like objects (they expose
//! named fields and methods to `as_property_of` / `as_method_of`
//! dependencies) are wrapped with [`Value::object`].

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased, reference-counted dependency value.
///
/// Cloning a `Value` clones the `Arc`, never the payload, so every lookup of a
/// resolved dependency observes the same instance.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::Value;
///
/// let value = Value::new(42u32);
/// let copy = value.clone();
///
/// assert_eq!(*value.downcast::<u32>().unwrap(), 42);
/// assert!(value.ptr_eq(&copy));
/// assert!(value.downcast::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct Value {
    inner: AnyArc,
}

/// Payload of [`Value::undefined`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Undefined;

/// Payload of [`Value::object`]: both views share one allocation.
struct ObjectRef {
    object: Arc<dyn Object>,
    any: AnyArc,
}

impl Value {
    /// Wraps an owned value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self { inner: Arc::new(value) }
    }

    /// Wraps an already shared value without re-allocating.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self { inner: value }
    }

    /// Wraps a value that exposes named members to owner-relative dependencies.
    pub fn object<O: Object>(object: O) -> Self {
        let shared = Arc::new(object);
        Self::new(ObjectRef {
            object: shared.clone(),
            any: shared,
        })
    }

    /// The "no value" placeholder substituted for arguments whose dependency
    /// resolved to nothing.
    pub fn undefined() -> Self {
        Self::new(Undefined)
    }

    /// Returns `true` for [`Value::undefined`].
    pub fn is_undefined(&self) -> bool {
        self.is::<Undefined>()
    }

    /// Returns `true` if the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).is::<T>()
    }

    /// Returns the payload as `Arc<T>`, or `None` if it is another type.
    ///
    /// Objects created with [`Value::object`] are unwrapped transparently.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        if let Some(object) = (*self.inner).downcast_ref::<ObjectRef>() {
            return object.any.clone().downcast::<T>().ok();
        }
        self.inner.clone().downcast::<T>().ok()
    }

    /// Borrows the payload as `&T`, or `None` if it is another type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        if let Some(object) = (*self.inner).downcast_ref::<ObjectRef>() {
            return (*object.any).downcast_ref::<T>();
        }
        (*self.inner).downcast_ref::<T>()
    }

    /// Like [`downcast`](Self::downcast) but reports a [`DiError::TypeMismatch`]
    /// naming the dependency on failure.
    pub fn downcast_named<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        self.downcast::<T>().ok_or_else(|| DiError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Returns the string payload if this value could name a dependency.
    ///
    /// Both `String` and `&'static str` payloads qualify.
    pub fn as_name(&self) -> Option<&str> {
        if let Some(s) = (*self.inner).downcast_ref::<String>() {
            return Some(s.as_str());
        }
        (*self.inner).downcast_ref::<&'static str>().copied()
    }

    /// Returns the object view if this value was created with [`Value::object`].
    pub fn as_object(&self) -> Option<&dyn Object> {
        (*self.inner)
            .downcast_ref::<ObjectRef>()
            .map(|object| object.object.as_ref())
    }

    /// Returns the method if this value holds one bound to a receiver.
    pub fn as_bound_method(&self) -> Option<&BoundMethod> {
        (*self.inner).downcast_ref::<BoundMethod>()
    }

    /// Returns the method if this value holds an unbound one.
    pub fn as_method(&self) -> Option<&Method> {
        (*self.inner).downcast_ref::<Method>()
    }

    /// Returns `true` if both values share the same allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.as_name() {
            f.debug_tuple("Value").field(&name).finish()
        } else if self.is_undefined() {
            f.write_str("Value(undefined)")
        } else if self.as_object().is_some() {
            f.write_str("Value(<object>)")
        } else if self.as_bound_method().is_some() || self.as_method().is_some() {
            f.write_str("Value(<method>)")
        } else {
            f.write_str("Value(<opaque>)")
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::new(value)
                }
            }
        )*
    };
}

impl_from_for_value!(
    &'static str, String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
    usize, f32, f64, Method, BoundMethod,
);

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::object(record)
    }
}

impl<T: Any + Send + Sync> From<Arc<T>> for Value {
    fn from(value: Arc<T>) -> Self {
        Value::from_arc(value)
    }
}

/// A value exposing named members to `as_property_of` / `as_method_of`
/// dependencies.
///
/// The container only ever asks for the member whose name equals the
/// dependency's own name.
///
/// ```rust
/// use ferrous_injector::{Member, Object, Value};
///
/// struct Settings {
///     port: u16,
/// }
///
/// impl Object for Settings {
///     fn member(&self, name: &str) -> Option<Member> {
///         match name {
///             "port" => Some(Member::Field(Value::new(self.port))),
///             _ => None,
///         }
///     }
/// }
///
/// let settings = Value::object(Settings { port: 8080 });
/// assert!(settings.as_object().unwrap().member("port").is_some());
/// assert_eq!(settings.downcast::<Settings>().unwrap().port, 8080);
/// ```
pub trait Object: Any + Send + Sync {
    /// Looks up a member by name.
    fn member(&self, name: &str) -> Option<Member>;
}

/// A named member of an [`Object`].
#[derive(Clone, Debug)]
pub enum Member {
    /// Plain data, exposed verbatim.
    Field(Value),
    /// Callable member; bound to a receiver when resolved as a method.
    Method(Method),
}

type MethodFn = dyn Fn(&Value, &[Value]) -> DiResult<Value> + Send + Sync;

/// An unbound callable taking an explicit receiver.
#[derive(Clone)]
pub struct Method {
    f: Arc<MethodFn>,
}

impl Method {
    /// Creates a method from a closure receiving `(receiver, args)`.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> DiResult<Value> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Calls the method with an explicit receiver.
    pub fn call(&self, receiver: &Value, args: &[Value]) -> DiResult<Value> {
        (self.f)(receiver, args)
    }

    /// Fixes the receiver, producing a [`BoundMethod`].
    pub fn bind(&self, receiver: Value) -> BoundMethod {
        BoundMethod {
            method: self.clone(),
            receiver,
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").finish_non_exhaustive()
    }
}

/// A method with its receiver fixed.
#[derive(Clone)]
pub struct BoundMethod {
    method: Method,
    receiver: Value,
}

impl BoundMethod {
    /// Calls the method on its bound receiver.
    pub fn call(&self, args: &[Value]) -> DiResult<Value> {
        self.method.call(&self.receiver, args)
    }

    /// The receiver this method is bound to.
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}

/// Map-backed [`Object`] for ad hoc owners.
///
/// ```rust
/// use ferrous_injector::{Record, Value};
///
/// let owner = Value::object(
///     Record::new()
///         .field("name", "world")
///         .method("greet", |this, _args| {
///             let name = this.as_object().and_then(|o| o.member("name"));
///             Ok(Value::new(format!("hello {:?}", name.is_some())))
///         }),
/// );
/// assert!(owner.as_object().unwrap().member("greet").is_some());
/// ```
#[derive(Clone, Default)]
pub struct Record {
    members: HashMap<String, Member>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a data member.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), Member::Field(value.into()));
        self
    }

    /// Adds a callable member.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> DiResult<Value> + Send + Sync + 'static,
    {
        self.members.insert(name.into(), Member::Method(Method::new(f)));
        self
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the record has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Object for Record {
    fn member(&self, name: &str) -> Option<Member> {
        self.members.get(name).cloned()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.members.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Record").field("members", &names).finish()
    }
}

/// Arguments and receiver handed to factories and constructors.
///
/// Arguments arrive already resolved: every argument that named a registered
/// dependency has been replaced by that dependency's value.
pub struct Invocation<'a> {
    receiver: Option<&'a Value>,
    args: &'a [Value],
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(receiver: Option<&'a Value>, args: &'a [Value]) -> Self {
        Self { receiver, args }
    }

    /// The call context: the descriptor's own context, else the container
    /// default. Always `None` for constructors.
    pub fn receiver(&self) -> Option<&'a Value> {
        self.receiver
    }

    /// All resolved arguments, in declaration order.
    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// The argument at `index`.
    pub fn arg_value(&self, index: usize) -> DiResult<&'a Value> {
        self.args.get(index).ok_or_else(|| DiError::Argument {
            index,
            reason: format!("missing (only {} supplied)", self.args.len()),
        })
    }

    /// The argument at `index`, downcast to `T`.
    pub fn arg<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
        self.arg_value(index)?
            .downcast::<T>()
            .ok_or_else(|| DiError::Argument {
                index,
                reason: format!("expected {}", type_name::<T>()),
            })
    }
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("receiver", &self.receiver)
            .field("args", &self.args)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_come_from_string_payloads_only() {
        assert_eq!(Value::from("db").as_name(), Some("db"));
        assert_eq!(Value::from(String::from("cache")).as_name(), Some("cache"));
        assert_eq!(Value::from(7i32).as_name(), None);
    }

    #[test]
    fn object_values_downcast_to_their_concrete_type() {
        let value = Value::object(Record::new().field("x", 1i32));
        let record = value.downcast::<Record>().unwrap();
        assert_eq!(record.len(), 1);
        assert!(value.downcast_ref::<Record>().is_some());
        assert!(value.as_object().is_some());
    }

    #[test]
    fn bound_method_keeps_receiver() {
        let receiver = Value::new(10i32);
        let method = Method::new(|this, args| {
            let base = this.downcast::<i32>().unwrap();
            let extra = args[0].downcast::<i32>().unwrap();
            Ok(Value::new(*base + *extra))
        });
        let bound = method.bind(receiver.clone());

        assert!(bound.receiver().ptr_eq(&receiver));
        let result = bound.call(&[Value::new(5i32)]).unwrap();
        assert_eq!(*result.downcast::<i32>().unwrap(), 15);
    }

    #[test]
    fn invocation_reports_bad_arguments() {
        let args = [Value::new(1u8)];
        let call = Invocation::new(None, &args);

        assert!(call.arg::<u8>(0).is_ok());
        assert!(matches!(call.arg::<u16>(0), Err(DiError::Argument { index: 0, .. })));
        assert!(matches!(call.arg_value(3), Err(DiError::Argument { index: 3, .. })));
    }

    #[test]
    fn undefined_is_distinguishable() {
        assert!(Value::undefined().is_undefined());
        assert!(!Value::new(()).is_undefined());
    }
}
