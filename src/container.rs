//! The container: registry, lazy resolution and memoization.
//!
//! Dependencies are declared with [`Container::register`] and resolved the
//! first time they are read. Resolution recursively resolves any argument that
//! names another dependency and any owner reference, detects cycles through a
//! per-container resolving-set, and caches the value so later reads are a
//! single lookup.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::builder::{DescriptorBuilder, Registrar};
use crate::config::ContainerOptions;
use crate::descriptors::{DependencyInfo, Descriptor, MemberKind, Strategy};
use crate::error::{DiError, DiResult};
use crate::internal::ResolvingSet;
use crate::observer::{Observers, ResolutionObserver};
use crate::registration::{Registry, Slot};
use crate::traits::ResolverCore;
use crate::value::{Invocation, Member, Value};

/// Lazy, name-keyed dependency container.
///
/// A container is single-threaded: resolution runs synchronously on the
/// calling thread and the container is `Send` but not `Sync`. Wrap it in a
/// [`SyncContainer`](crate::SyncContainer) to share it between threads.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{Container, Resolver, Value};
///
/// # fn main() -> ferrous_injector::DiResult<()> {
/// let container = Container::new();
/// container.register("a")?.as_constant(1i32)?;
/// container
///     .register("b")?
///     .using_factory(|call| Ok(Value::new(*call.arg::<i32>(0)? + 1)))?
///     .with_args(["a"])?;
///
/// assert_eq!(*container.get_as::<i32>("b")?, 2);
/// # Ok(())
/// # }
/// ```
pub struct Container {
    registry: RefCell<Registry>,
    resolving: ResolvingSet,
    default_context: Option<Value>,
    options: ContainerOptions,
    observers: Observers,
}

impl Container {
    /// Creates an empty container with default options and no default context.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a container.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Creates a container and runs `registration` once against it.
    ///
    /// ```
    /// use ferrous_injector::{Container, Resolver};
    ///
    /// # fn main() -> ferrous_injector::DiResult<()> {
    /// let container = Container::with_registration(|r| {
    ///     r.register("host")?.as_constant("localhost")?;
    ///     r.register("port")?.as_constant(5432u16)?;
    ///     Ok(())
    /// })?;
    /// assert_eq!(*container.get_as::<u16>("port")?, 5432);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_registration<F>(registration: F) -> DiResult<Self>
    where
        F: FnOnce(&Registrar<'_>) -> DiResult<()>,
    {
        Self::builder().build_with(registration)
    }

    /// Declares a new dependency and returns its builder.
    ///
    /// The slot exists as soon as this returns: a dependency that never gets
    /// a strategy resolves to no value. Names are unique; registering a name
    /// twice fails with [`DiError::AlreadyRegistered`] and leaves the
    /// original registration untouched.
    pub fn register(&self, name: impl Into<String>) -> DiResult<DescriptorBuilder<'_>> {
        let name = name.into();
        self.registry
            .borrow_mut()
            .insert(Descriptor::new(name.clone()))?;
        debug!(dependency = %name, "registered");
        Ok(DescriptorBuilder::new(self, name))
    }

    /// Adds an observer after construction.
    pub fn add_observer(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.add(observer);
    }

    /// Reads a dependency, resolving it on first access.
    ///
    /// Unknown names are a soft miss: `Ok(None)`, and no slot is created.
    /// A registered dependency that resolved to nothing also yields
    /// `Ok(None)`; use [`Resolver::get_required`](crate::Resolver::get_required)
    /// to tell the two apart.
    ///
    /// Only successful resolutions are cached. If a factory fails, the error
    /// is returned and the next `get` tries again from scratch.
    pub fn get(&self, name: &str) -> DiResult<Option<Value>> {
        let descriptor = {
            let registry = self.registry.borrow();
            match registry.get(name) {
                None => {
                    trace!(dependency = name, "unknown dependency");
                    return Ok(None);
                }
                Some(Slot::Resolved { value, .. }) => {
                    trace!(dependency = name, "cache hit");
                    return Ok(value.clone());
                }
                // Cloned so no registry borrow is held while user code runs
                Some(Slot::Pending(descriptor)) => descriptor.clone(),
            }
        };

        let value = self.resolve(&descriptor)?;
        self.registry.borrow_mut().seal(name, value)
    }

    /// Replaces every argument that names a registered dependency with that
    /// dependency's value; everything else passes through unchanged.
    ///
    /// A referenced dependency that resolved to nothing is substituted with
    /// [`Value::undefined`].
    pub fn resolve_args(&self, args: &[Value]) -> DiResult<Vec<Value>> {
        args.iter().map(|arg| self.resolve_arg(arg)).collect()
    }

    fn resolve_arg(&self, arg: &Value) -> DiResult<Value> {
        match arg.as_name() {
            Some(name) if self.is_registered(name) => {
                trace!(dependency = name, "substituting argument");
                Ok(self.get(name)?.unwrap_or_else(Value::undefined))
            }
            _ => Ok(arg.clone()),
        }
    }

    fn resolve(&self, descriptor: &Descriptor) -> DiResult<Option<Value>> {
        let name = descriptor.name();
        let _guard = self
            .resolving
            .enter(name, self.options.max_depth)
            .map_err(|err| {
                warn!(dependency = name, error = %err, "resolution aborted");
                err
            })?;

        trace!(
            dependency = name,
            strategy = %descriptor.strategy_kind(),
            depth = self.resolving.depth(),
            "resolving"
        );

        if !self.observers.has_observers() {
            return self.invoke(descriptor);
        }

        self.observers.resolving(name);
        let started = Instant::now();
        let result = self.invoke(descriptor);
        match &result {
            Ok(_) => self.observers.resolved(name, started.elapsed()),
            Err(err) => self.observers.failed(name, err),
        }
        result
    }

    fn invoke(&self, descriptor: &Descriptor) -> DiResult<Option<Value>> {
        let value = match descriptor.strategy() {
            Strategy::Unconfigured => None,
            Strategy::Constant(value) => Some(value.clone()),
            Strategy::Factory(factory) => {
                let args = self.resolve_args(descriptor.args().unwrap_or_default())?;
                let receiver = descriptor.context().or(self.default_context.as_ref());
                Some(factory(&Invocation::new(receiver, &args))?)
            }
            Strategy::Constructor(ctor) => {
                let args = self.resolve_args(descriptor.args().unwrap_or_default())?;
                Some(ctor(&Invocation::new(None, &args))?)
            }
            Strategy::MemberOf { owner, kind } => self.resolve_member(descriptor, owner, *kind)?,
        };

        debug!(dependency = descriptor.name(), defined = value.is_some(), "resolved");
        Ok(value)
    }

    fn resolve_member(
        &self,
        descriptor: &Descriptor,
        owner: &Value,
        kind: MemberKind,
    ) -> DiResult<Option<Value>> {
        let name = descriptor.name();
        let owner = self.resolve_arg(owner)?;

        let member = match owner.as_object() {
            Some(object) => object.member(name),
            None => return self.owner_miss(name, "owner is not an object"),
        };
        let member = match member {
            Some(member) => member,
            None => return self.owner_miss(name, "owner has no such member"),
        };

        let value = match member {
            Member::Field(value) => value,
            Member::Method(method) => {
                let receiver = descriptor
                    .context()
                    .or(self.default_context.as_ref())
                    .cloned();
                match (receiver, kind) {
                    (Some(receiver), _) => Value::new(method.bind(receiver)),
                    (None, MemberKind::Method) => Value::new(method.bind(owner.clone())),
                    (None, MemberKind::Property) => Value::new(method),
                }
            }
        };
        Ok(Some(value))
    }

    fn owner_miss(&self, name: &str, reason: &str) -> DiResult<Option<Value>> {
        if self.options.strict_owners {
            return Err(DiError::InvalidOwner {
                name: name.to_string(),
                reason: reason.to_string(),
            });
        }
        warn!(dependency = name, reason, "owner did not provide member; resolving to no value");
        Ok(None)
    }

    pub(crate) fn configure<F>(&self, name: &str, f: F) -> DiResult<()>
    where
        F: FnOnce(&mut Descriptor) -> DiResult<()>,
    {
        let mut registry = self.registry.borrow_mut();
        match registry.get_mut(name) {
            Some(Slot::Pending(descriptor)) => f(descriptor),
            Some(Slot::Resolved { .. }) => Err(DiError::Sealed(name.to_string())),
            None => Err(DiError::NotFound(name.to_string())),
        }
    }

    /// Returns `true` if `name` was registered, resolved or not.
    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.borrow().contains(name)
    }

    /// Returns `true` if `name` has been resolved and cached.
    pub fn is_resolved(&self, name: &str) -> bool {
        self.registry
            .borrow()
            .get(name)
            .map_or(false, Slot::is_resolved)
    }

    /// Returns `true` while `name` is being resolved.
    pub fn is_resolving(&self, name: &str) -> bool {
        self.resolving.is_resolving(name)
    }

    /// Number of resolved dependencies (pending ones are not counted).
    pub fn len(&self) -> usize {
        self.registry.borrow().resolved_len()
    }

    /// Returns `true` if nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of registered dependencies, resolved or not.
    pub fn registered_len(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Snapshot of the resolved dependencies, in registration order.
    ///
    /// Pending dependencies are hidden until their first read.
    ///
    /// ```
    /// use ferrous_injector::Container;
    ///
    /// # fn main() -> ferrous_injector::DiResult<()> {
    /// let container = Container::new();
    /// container.register("a")?.as_constant(1i32)?;
    /// container.register("b")?.as_constant(2i32)?;
    /// assert!(container.dependencies().is_empty());
    ///
    /// container.get("b")?;
    /// let deps = container.dependencies();
    /// assert_eq!(deps.len(), 1);
    /// assert_eq!(deps.names().collect::<Vec<_>>(), ["b"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn dependencies(&self) -> Dependencies {
        let entries = self
            .registry
            .borrow()
            .iter()
            .filter_map(|(name, slot)| match slot {
                Slot::Resolved { value, .. } => Some((name.to_string(), value.clone())),
                Slot::Pending(_) => None,
            })
            .collect();
        Dependencies { entries }
    }

    /// Introspection records for every registered dependency, in
    /// registration order.
    pub fn describe(&self) -> Vec<DependencyInfo> {
        self.registry
            .borrow()
            .iter()
            .map(|(_, slot)| slot.info())
            .collect()
    }

    /// The receiver used when a descriptor has no context of its own.
    pub fn default_context(&self) -> Option<&Value> {
        self.default_context.as_ref()
    }

    /// Resolution policy in effect.
    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.registered_len())
            .field("resolved", &self.len())
            .field("default_context", &self.default_context)
            .field("options", &self.options)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ResolverCore for Container {
    fn resolve_name(&self, name: &str) -> DiResult<Option<Value>> {
        self.get(name)
    }

    fn contains_name(&self, name: &str) -> bool {
        self.is_registered(name)
    }
}

/// Builder for [`Container`]: default context, options and observers.
///
/// ```
/// use ferrous_injector::{Container, Resolver, Value};
///
/// # fn main() -> ferrous_injector::DiResult<()> {
/// let container = Container::builder()
///     .default_context("request-42")
///     .build();
/// container.register("who")?.using_factory(|call| {
///     let ctx = call.receiver().and_then(|r| r.as_name()).unwrap_or("none");
///     Ok(Value::new(ctx.to_string()))
/// })?;
/// assert_eq!(*container.get_as::<String>("who")?, "request-42");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    default_context: Option<Value>,
    options: ContainerOptions,
    observers: Observers,
}

impl ContainerBuilder {
    /// Creates a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the receiver used by factories and method binding when a
    /// descriptor has no context of its own.
    pub fn default_context(mut self, context: impl Into<Value>) -> Self {
        self.default_context = Some(context.into());
        self
    }

    /// Replaces the resolution options.
    pub fn options(mut self, options: ContainerOptions) -> Self {
        self.options = options;
        self
    }

    /// Makes owner misses an error instead of resolving to no value.
    pub fn strict_owners(mut self, strict: bool) -> Self {
        self.options.strict_owners = strict;
        self
    }

    /// Limits nested resolution depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Adds a resolution observer.
    pub fn observer(mut self, observer: Arc<dyn ResolutionObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    /// Builds an empty container.
    pub fn build(self) -> Container {
        Container {
            registry: RefCell::new(Registry::new()),
            resolving: ResolvingSet::default(),
            default_context: self.default_context,
            options: self.options,
            observers: self.observers,
        }
    }

    /// Builds a container and runs `registration` once against it.
    pub fn build_with<F>(self, registration: F) -> DiResult<Container>
    where
        F: FnOnce(&Registrar<'_>) -> DiResult<()>,
    {
        let container = self.build();
        registration(&Registrar::new(&container))?;
        Ok(container)
    }
}

/// Snapshot of resolved dependencies, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    entries: Vec<(String, Option<Value>)>,
}

impl Dependencies {
    /// Number of resolved dependencies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been resolved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolved names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns `true` if `name` is resolved.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// The cached value for `name`; `None` if unresolved or resolved to nothing.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, value)| value.as_ref())
    }

    /// `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }
}
