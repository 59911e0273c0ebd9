#![no_main]

use libfuzzer_sys::fuzz_target;
use ferrous_injector::{Container, Record, Value};

// Interprets bytes as a sequence of registration and lookup operations.
// No sequence may panic; errors are fine.
fuzz_target!(|data: &[u8]| {
    let container = Container::builder()
        .strict_owners(data.first().map_or(false, |b| b & 1 == 1))
        .build();

    for op in data.chunks_exact(2) {
        let name = format!("d{}", op[1] % 8);
        let other = format!("d{}", op[1] / 8 % 8);
        let _ = match op[0] % 6 {
            0 => container
                .register(name)
                .and_then(|d| d.as_constant(op[1])),
            1 => container
                .register(name)
                .and_then(|d| d.as_constant(Record::new().field(other, op[0]))),
            2 => container.register(name).and_then(|d| d.as_property_of(other)),
            3 => container
                .register(name)
                .and_then(|d| d.as_method_of(other))
                .map(|_| ()),
            4 => container
                .register(name)
                .and_then(|d| d.using_factory(|call| Ok(Value::new(call.args().len()))))
                .and_then(|f| f.with_args([other]))
                .map(|_| ()),
            _ => container.get(&name).map(|_| ()),
        };
    }

    let _ = container.dependencies();
    let _ = container.describe();
});
