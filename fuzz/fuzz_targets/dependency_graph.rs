#![no_main]

use libfuzzer_sys::fuzz_target;
use ferrous_injector::{Container, DiError, Value};

// Each byte pair is an edge `from -> to` between up to 16 named nodes.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let nodes = (data[0] % 16) as usize + 1;
    let mut edges = vec![Vec::new(); nodes];
    for pair in data[1..].chunks_exact(2) {
        let from = pair[0] as usize % nodes;
        let to = pair[1] as usize % (nodes + 1); // `nodes` is an unregistered name
        edges[from].push(format!("n{}", to));
    }

    let container = Container::new();
    for (i, deps) in edges.into_iter().enumerate() {
        let _ = container
            .register(format!("n{}", i))
            .and_then(|d| d.using_factory(|call| Ok(Value::new(call.args().len()))))
            .and_then(|f| f.with_args(deps));
    }

    for i in 0..nodes {
        let name = format!("n{}", i);
        match container.get(&name) {
            Ok(value) => assert!(value.is_some()),
            Err(DiError::Circular(path)) => assert!(path.len() >= 2),
            Err(other) => panic!("unexpected error: {}", other),
        }
        assert!(!container.is_resolving(&name));
    }
});
