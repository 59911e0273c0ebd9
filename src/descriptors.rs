//! Dependency descriptors and introspection records.

use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::value::{Invocation, Value};

/// Boxed factory or constructor callable.
pub(crate) type FactoryFn = Arc<dyn Fn(&Invocation<'_>) -> DiResult<Value> + Send + Sync>;

/// Whether an owner-relative dependency reads a method or a plain property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// `as_method_of`: callable members are always bound to a receiver.
    Method,
    /// `as_property_of`: members are bound only when a default context exists.
    Property,
}

/// The mechanism by which a descriptor produces its value.
#[derive(Clone)]
pub(crate) enum Strategy {
    Unconfigured,
    Constant(Value),
    Factory(FactoryFn),
    Constructor(FactoryFn),
    MemberOf { owner: Value, kind: MemberKind },
}

/// Strategy summary used for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Registered but no strategy chosen; resolves to no value.
    Unconfigured,
    /// Precomputed value.
    Constant,
    /// Callable invoked with a receiver and resolved arguments.
    Factory,
    /// Callable invoked with resolved arguments only.
    Constructor,
    /// Bound method of another dependency.
    Method,
    /// Property of another dependency.
    Property,
}

impl StrategyKind {
    /// Lowercase label used in logs and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Unconfigured => "unconfigured",
            StrategyKind::Constant => "constant",
            StrategyKind::Factory => "factory",
            StrategyKind::Constructor => "constructor",
            StrategyKind::Method => "method",
            StrategyKind::Property => "property",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared-but-possibly-unresolved record for one dependency name.
///
/// Descriptors are created by `Container::register` and configured in place
/// by the staged builders. Once the dependency resolves, the container drops
/// the descriptor and keeps only the value plus a [`DependencyInfo`] summary.
#[derive(Clone)]
pub struct Descriptor {
    name: String,
    strategy: Strategy,
    args: Option<Vec<Value>>,
    context: Option<Value>,
}

impl Descriptor {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategy: Strategy::Unconfigured,
            args: None,
            context: None,
        }
    }

    /// Dependency name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Which strategy was chosen.
    pub fn strategy_kind(&self) -> StrategyKind {
        match &self.strategy {
            Strategy::Unconfigured => StrategyKind::Unconfigured,
            Strategy::Constant(_) => StrategyKind::Constant,
            Strategy::Factory(_) => StrategyKind::Factory,
            Strategy::Constructor(_) => StrategyKind::Constructor,
            Strategy::MemberOf { kind: MemberKind::Method, .. } => StrategyKind::Method,
            Strategy::MemberOf { kind: MemberKind::Property, .. } => StrategyKind::Property,
        }
    }

    /// Raw (unresolved) arguments, if any were attached.
    pub fn args(&self) -> Option<&[Value]> {
        self.args.as_deref()
    }

    /// Call/bind context, if one was attached.
    pub fn context(&self) -> Option<&Value> {
        self.context.as_ref()
    }

    pub(crate) fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Fixes the strategy. A strategy can be chosen exactly once.
    pub(crate) fn set_strategy(&mut self, strategy: Strategy) -> DiResult<()> {
        if !matches!(self.strategy, Strategy::Unconfigured) {
            return Err(DiError::StrategyAlreadySet(self.name.clone()));
        }
        self.strategy = strategy;
        Ok(())
    }

    pub(crate) fn set_args(&mut self, args: Vec<Value>) -> DiResult<()> {
        if self.args.is_some() {
            return Err(DiError::AlreadyConfigured {
                name: self.name.clone(),
                option: "args",
            });
        }
        self.args = Some(args);
        Ok(())
    }

    pub(crate) fn set_context(&mut self, context: Value) -> DiResult<()> {
        if self.context.is_some() {
            return Err(DiError::AlreadyConfigured {
                name: self.name.clone(),
                option: "context",
            });
        }
        self.context = Some(context);
        Ok(())
    }

    /// Summarizes this descriptor without retaining callables or values.
    pub(crate) fn info(&self) -> DependencyInfo {
        let owner = match &self.strategy {
            Strategy::MemberOf { owner, .. } => owner.as_name().map(str::to_string),
            _ => None,
        };
        let arguments = self
            .args
            .iter()
            .flatten()
            .filter_map(|arg| arg.as_name().map(str::to_string))
            .collect();

        DependencyInfo {
            name: self.name.clone(),
            strategy: self.strategy_kind(),
            arguments,
            owner,
            has_context: self.context.is_some(),
            resolved: false,
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("strategy", &self.strategy_kind())
            .field("args", &self.args)
            .field("context", &self.context)
            .finish()
    }
}

/// Introspection record for one registered dependency.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Container, StrategyKind, Value};
///
/// # fn main() -> ferrous_injector::DiResult<()> {
/// let container = Container::new();
/// container.register("port")?.as_constant(8080u16)?;
/// container
///     .register("url")?
///     .using_factory(|call| {
///         let port = call.arg::<u16>(0)?;
///         Ok(Value::new(format!("http://localhost:{}", port)))
///     })?
///     .with_args(["port"])?;
///
/// let infos = container.describe();
/// let url = infos.iter().find(|i| i.name == "url").unwrap();
/// assert_eq!(url.strategy, StrategyKind::Factory);
/// assert_eq!(url.arguments, vec!["port".to_string()]);
/// assert!(!url.resolved);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyInfo {
    /// Dependency name
    pub name: String,
    /// Chosen strategy
    pub strategy: StrategyKind,
    /// String arguments (candidate dependency references), in order
    pub arguments: Vec<String>,
    /// Owner name for property/method dependencies given by name
    pub owner: Option<String>,
    /// Whether an explicit context was attached
    pub has_context: bool,
    /// Whether the value has been resolved and cached
    pub resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> Strategy {
        Strategy::Factory(Arc::new(|_call: &Invocation<'_>| Ok::<_, DiError>(Value::new(1u8))))
    }

    #[test]
    fn strategy_can_be_chosen_once() {
        let mut descriptor = Descriptor::new("x");
        descriptor.set_strategy(Strategy::Constant(Value::new(5i32))).unwrap();

        let err = descriptor.set_strategy(factory()).unwrap_err();
        assert_eq!(err, DiError::StrategyAlreadySet("x".into()));
        assert_eq!(descriptor.strategy_kind(), StrategyKind::Constant);
    }

    #[test]
    fn args_and_context_are_one_shot() {
        let mut descriptor = Descriptor::new("f");
        descriptor.set_strategy(factory()).unwrap();
        descriptor.set_args(vec![Value::from("a")]).unwrap();
        descriptor.set_context(Value::new(())).unwrap();

        assert!(matches!(
            descriptor.set_args(vec![]),
            Err(DiError::AlreadyConfigured { option: "args", .. })
        ));
        assert!(matches!(
            descriptor.set_context(Value::new(())),
            Err(DiError::AlreadyConfigured { option: "context", .. })
        ));
    }

    #[test]
    fn info_lists_string_arguments_and_owner() {
        let mut descriptor = Descriptor::new("greet");
        descriptor
            .set_strategy(Strategy::MemberOf {
                owner: Value::from("owner"),
                kind: MemberKind::Method,
            })
            .unwrap();
        descriptor.set_context(Value::new(0u8)).unwrap();

        let info = descriptor.info();
        assert_eq!(info.strategy, StrategyKind::Method);
        assert_eq!(info.owner.as_deref(), Some("owner"));
        assert!(info.arguments.is_empty());
        assert!(info.has_context);
    }
}
