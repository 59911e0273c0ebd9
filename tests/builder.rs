use ferrous_injector::{Container, DiError, Resolver, StrategyKind, Value};

fn one(_: &ferrous_injector::Invocation<'_>) -> ferrous_injector::DiResult<Value> {
    Ok(Value::new(1u8))
}

#[test]
fn test_duplicate_registration_keeps_original() {
    let container = Container::new();
    container.register("x").unwrap().as_constant(1u8).unwrap();

    assert!(matches!(container.register("x"), Err(DiError::AlreadyRegistered(name)) if name == "x"));
    assert_eq!(*container.get_as::<u8>("x").unwrap(), 1);
    assert_eq!(container.registered_len(), 1);
}

#[test]
fn test_unconfigured_dependency_resolves_to_nothing() {
    let container = Container::new();
    let builder = container.register("later").unwrap();
    assert_eq!(builder.name(), "later");
    drop(builder);

    assert!(container.get("later").unwrap().is_none());
    assert!(container.is_resolved("later"));
    assert!(container.dependencies().contains("later"));
    assert!(container.dependencies().get("later").is_none());
}

#[test]
fn test_factory_args_then_context() {
    let container = Container::new();
    container.register("n").unwrap().as_constant(4u32).unwrap();
    container
        .register("f")
        .unwrap()
        .using_factory(|call| {
            let n = call.arg::<u32>(0)?;
            let ctx = call.receiver().and_then(Value::as_name).unwrap_or("");
            Ok(Value::new(format!("{}{}", ctx, n)))
        })
        .unwrap()
        .with_args(["n"])
        .unwrap()
        .with_context("ctx:")
        .unwrap();

    assert_eq!(*container.get_as::<String>("f").unwrap(), "ctx:4");
}

#[test]
fn test_factory_context_then_args() {
    let container = Container::new();
    container.register("n").unwrap().as_constant(4u32).unwrap();
    container
        .register("f")
        .unwrap()
        .using_factory(|call| {
            let n = call.arg::<u32>(0)?;
            let ctx = call.receiver().and_then(Value::as_name).unwrap_or("");
            Ok(Value::new(format!("{}{}", ctx, n)))
        })
        .unwrap()
        .with_context("ctx:")
        .unwrap()
        .with_args(["n"])
        .unwrap();

    assert_eq!(*container.get_as::<String>("f").unwrap(), "ctx:4");
}

#[test]
fn test_configuration_after_resolution_is_sealed() {
    let container = Container::new();
    let factory = container.register("f").unwrap().using_factory(one).unwrap();

    assert!(container.get("f").unwrap().is_some());
    assert!(matches!(factory.with_args(["late"]), Err(DiError::Sealed(name)) if name == "f"));
}

#[test]
fn test_half_finished_chain_is_usable() {
    let container = Container::new();
    let _factory = container.register("f").unwrap().using_factory(one).unwrap();

    assert_eq!(*container.get_as::<u8>("f").unwrap(), 1);
    let infos = container.describe();
    let info = &infos[0];
    assert_eq!(info.strategy, StrategyKind::Factory);
    assert!(info.arguments.is_empty());
    assert!(info.resolved);
}

#[test]
fn test_strategy_kinds_are_recorded() {
    let container = Container::new();
    container.register("c").unwrap().as_constant(0u8).unwrap();
    container.register("f").unwrap().using_factory(one).unwrap();
    container.register("k").unwrap().using_constructor(one).unwrap();
    container.register("p").unwrap().as_property_of("c").unwrap();
    container.register("m").unwrap().as_method_of("c").unwrap();
    let _ = container.register("u").unwrap();

    let kinds: Vec<StrategyKind> = container.describe().iter().map(|i| i.strategy).collect();
    assert_eq!(
        kinds,
        [
            StrategyKind::Constant,
            StrategyKind::Factory,
            StrategyKind::Constructor,
            StrategyKind::Property,
            StrategyKind::Method,
            StrategyKind::Unconfigured,
        ]
    );
}

#[test]
fn test_constructor_args() {
    let container = Container::new();
    container.register("w").unwrap().as_constant(3usize).unwrap();
    container.register("h").unwrap().as_constant(5usize).unwrap();
    container
        .register("area")
        .unwrap()
        .using_constructor(|call| Ok(Value::new(*call.arg::<usize>(0)? * *call.arg::<usize>(1)?)))
        .unwrap()
        .with_args(["w", "h"])
        .unwrap();

    assert_eq!(*container.get_as::<usize>("area").unwrap(), 15);
}

#[test]
fn test_argument_errors_surface_from_factory() {
    let container = Container::new();
    container
        .register("needs_two")
        .unwrap()
        .using_factory(|call| Ok(call.arg_value(1)?.clone()))
        .unwrap()
        .with_args(["only-one"])
        .unwrap();

    assert!(matches!(
        container.get("needs_two"),
        Err(DiError::Argument { index: 1, .. })
    ));
}
