use ferrous_injector::{Container, Resolver, StrategyKind, Value};

fn sample() -> Container {
    let container = Container::new();
    container.register("first").unwrap().as_constant(1u8).unwrap();
    container.register("second").unwrap().as_constant(2u8).unwrap();
    container
        .register("third")
        .unwrap()
        .using_factory(|call| Ok(Value::new(*call.arg::<u8>(0)? + *call.arg::<u8>(1)?)))
        .unwrap()
        .with_args(["first", "second"])
        .unwrap();
    container
}

#[test]
fn test_pending_dependencies_are_hidden() {
    let container = sample();

    assert_eq!(container.len(), 0);
    assert!(container.is_empty());
    assert!(container.dependencies().is_empty());
    assert_eq!(container.registered_len(), 3);
}

#[test]
fn test_dependencies_follow_registration_order() {
    let container = sample();
    container.get("second").unwrap();
    container.get("first").unwrap();

    let deps = container.dependencies();
    assert_eq!(deps.names().collect::<Vec<_>>(), ["first", "second"]);
    assert!(!deps.contains("third"));
}

#[test]
fn test_transitive_resolution_is_counted() {
    let container = sample();
    assert_eq!(*container.get_as::<u8>("third").unwrap(), 3);

    assert_eq!(container.len(), 3);
    let deps = container.dependencies();
    let values: Vec<u8> = deps
        .iter()
        .map(|(_, value)| *value.unwrap().downcast::<u8>().unwrap())
        .collect();
    assert_eq!(values, [1, 2, 3]);
}

#[test]
fn test_snapshot_values_are_the_cached_instances() {
    let container = sample();
    let third = container.get_required("third").unwrap();

    let deps = container.dependencies();
    assert!(deps.get("third").unwrap().ptr_eq(&third));
}

#[test]
fn test_snapshot_does_not_follow_later_resolutions() {
    let container = sample();
    container.get("first").unwrap();
    let before = container.dependencies();

    container.get("third").unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(container.dependencies().len(), 3);
}

#[test]
fn test_describe_reports_pending_and_resolved() {
    let container = sample();
    container.get("first").unwrap();

    let infos = container.describe();
    assert_eq!(infos.len(), 3);

    assert_eq!(infos[0].name, "first");
    assert_eq!(infos[0].strategy, StrategyKind::Constant);
    assert!(infos[0].resolved);

    assert_eq!(infos[2].name, "third");
    assert_eq!(infos[2].arguments, ["first", "second"]);
    assert!(!infos[2].resolved);

    container.get("third").unwrap();
    let infos = container.describe();
    assert!(infos[2].resolved);
    assert_eq!(infos[2].strategy, StrategyKind::Factory);
    assert_eq!(infos[2].arguments, ["first", "second"]);
}

#[test]
fn test_is_resolving_only_during_resolution() {
    let container = Container::new();
    container.register("x").unwrap().as_constant(0u8).unwrap();

    assert!(!container.is_resolving("x"));
    container.get("x").unwrap();
    assert!(!container.is_resolving("x"));
}

#[test]
fn test_debug_output_mentions_counts() {
    let container = sample();
    container.get("first").unwrap();

    let debug = format!("{:?}", container);
    assert!(debug.contains("registered: 3"));
    assert!(debug.contains("resolved: 1"));
}
