//! Staged descriptor builders.
//!
//! `Container::register` hands out a [`DescriptorBuilder`]. Choosing a
//! strategy consumes it and returns a narrower builder exposing only the
//! options that strategy accepts, so illegal call sequences do not compile:
//!
//! ```text
//! DescriptorBuilder ─┬─ as_constant ─────────────────────────────── done
//!                    ├─ as_property_of ──────────────────────────── done
//!                    ├─ as_method_of ──── MethodBuilder ─ with_context ─ done
//!                    ├─ using_constructor ─ ConstructorBuilder ─ with_args ─ done
//!                    └─ using_factory ─── FactoryBuilder<NoArgs, NoContext>
//!                                           ├─ with_args    → <ArgsSet, _>
//!                                           └─ with_context → <_, ContextSet>
//! ```
//!
//! ```compile_fail
//! use ferrous_injector::{Container, Value};
//!
//! let container = Container::new();
//! let factory = container
//!     .register("f").unwrap()
//!     .using_factory(|_| Ok(Value::new(1u8))).unwrap()
//!     .with_args(["a"]).unwrap();
//! factory.with_args(["b"]); // args can only be attached once
//! ```
//!
//! Every step writes through to the descriptor stored in the container, so a
//! half-finished chain still leaves a usable registration behind.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use crate::container::Container;
use crate::descriptors::{MemberKind, Strategy};
use crate::error::DiResult;
use crate::value::{Invocation, Value};

/// Typestate: arguments not attached yet.
#[derive(Debug)]
pub struct NoArgs;
/// Typestate: arguments attached.
#[derive(Debug)]
pub struct ArgsSet;
/// Typestate: context not attached yet.
#[derive(Debug)]
pub struct NoContext;
/// Typestate: context attached.
#[derive(Debug)]
pub struct ContextSet;

/// Unconfigured descriptor: pick exactly one strategy.
#[must_use = "a registered dependency without a strategy resolves to no value"]
pub struct DescriptorBuilder<'c> {
    container: &'c Container,
    name: String,
}

impl<'c> DescriptorBuilder<'c> {
    pub(crate) fn new(container: &'c Container, name: String) -> Self {
        Self { container, name }
    }

    /// The dependency name being configured.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves to `value`.
    pub fn as_constant(self, value: impl Into<Value>) -> DiResult<()> {
        self.select(Strategy::Constant(value.into()))
    }

    /// Resolves to the member of `owner` that shares this dependency's name.
    ///
    /// `owner` may name another dependency or be a value itself. Callable
    /// members are bound only if the container has a default context.
    pub fn as_property_of(self, owner: impl Into<Value>) -> DiResult<()> {
        self.select(Strategy::MemberOf {
            owner: owner.into(),
            kind: MemberKind::Property,
        })
    }

    /// Resolves to the method of `owner` that shares this dependency's name,
    /// bound to the explicit context, the default context, or the owner.
    pub fn as_method_of(self, owner: impl Into<Value>) -> DiResult<MethodBuilder<'c>> {
        self.select(Strategy::MemberOf {
            owner: owner.into(),
            kind: MemberKind::Method,
        })?;
        Ok(MethodBuilder {
            container: self.container,
            name: self.name,
        })
    }

    /// Resolves by calling `ctor` with the resolved arguments and no receiver.
    pub fn using_constructor<F>(self, ctor: F) -> DiResult<ConstructorBuilder<'c>>
    where
        F: Fn(&Invocation<'_>) -> DiResult<Value> + Send + Sync + 'static,
    {
        self.select(Strategy::Constructor(Arc::new(ctor)))?;
        Ok(ConstructorBuilder {
            container: self.container,
            name: self.name,
        })
    }

    /// Resolves by calling `factory` with the resolved arguments and the
    /// explicit or default context as receiver.
    pub fn using_factory<F>(self, factory: F) -> DiResult<FactoryBuilder<'c, NoArgs, NoContext>>
    where
        F: Fn(&Invocation<'_>) -> DiResult<Value> + Send + Sync + 'static,
    {
        self.select(Strategy::Factory(Arc::new(factory)))?;
        Ok(FactoryBuilder {
            container: self.container,
            name: self.name,
            _state: PhantomData,
        })
    }

    fn select(&self, strategy: Strategy) -> DiResult<()> {
        self.container.configure(&self.name, |descriptor| {
            descriptor.set_strategy(strategy)?;
            trace!(dependency = %descriptor.name(), strategy = %descriptor.strategy_kind(), "strategy selected");
            Ok(())
        })
    }
}

/// Factory descriptor; `with_args` and `with_context` are each available once.
pub struct FactoryBuilder<'c, A = NoArgs, C = NoContext> {
    container: &'c Container,
    name: String,
    _state: PhantomData<(A, C)>,
}

impl<'c, A, C> FactoryBuilder<'c, A, C> {
    /// The dependency name being configured.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<'c, C> FactoryBuilder<'c, NoArgs, C> {
    /// Attaches the ordered argument list. String arguments naming a
    /// registered dependency are replaced by its value at resolution time.
    pub fn with_args<I>(self, args: I) -> DiResult<FactoryBuilder<'c, ArgsSet, C>>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let args: Vec<Value> = args.into_iter().map(Into::into).collect();
        self.container
            .configure(&self.name, |descriptor| descriptor.set_args(args))?;
        Ok(FactoryBuilder {
            container: self.container,
            name: self.name,
            _state: PhantomData,
        })
    }
}

impl<'c, A> FactoryBuilder<'c, A, NoContext> {
    /// Attaches the receiver passed to the factory instead of the container
    /// default.
    pub fn with_context(self, context: impl Into<Value>) -> DiResult<FactoryBuilder<'c, A, ContextSet>> {
        let context = context.into();
        self.container
            .configure(&self.name, |descriptor| descriptor.set_context(context))?;
        Ok(FactoryBuilder {
            container: self.container,
            name: self.name,
            _state: PhantomData,
        })
    }
}

/// Constructor descriptor; only `with_args` remains.
pub struct ConstructorBuilder<'c> {
    container: &'c Container,
    name: String,
}

impl ConstructorBuilder<'_> {
    /// Attaches the ordered argument list.
    pub fn with_args<I>(self, args: I) -> DiResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let args: Vec<Value> = args.into_iter().map(Into::into).collect();
        self.container
            .configure(&self.name, |descriptor| descriptor.set_args(args))
    }
}

/// Method descriptor; only `with_context` remains.
pub struct MethodBuilder<'c> {
    container: &'c Container,
    name: String,
}

impl MethodBuilder<'_> {
    /// Binds the method to `context` instead of the default context or owner.
    pub fn with_context(self, context: impl Into<Value>) -> DiResult<()> {
        let context = context.into();
        self.container
            .configure(&self.name, |descriptor| descriptor.set_context(context))
    }
}

/// Registration handle passed to `Container::with_registration`.
pub struct Registrar<'c> {
    container: &'c Container,
}

impl<'c> Registrar<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        Self { container }
    }

    /// Same as `Container::register`.
    pub fn register(&self, name: impl Into<String>) -> DiResult<DescriptorBuilder<'c>> {
        self.container.register(name)
    }
}
