use criterion::{Criterion, criterion_group, criterion_main};
use octofhir_cascade::constraints::{not_blank, not_null, positive, size};
use octofhir_cascade::*;
use std::hint::black_box;

fn property(name: &str, declared: &str) -> PropertyDeclaration {
    PropertyDeclaration::parse(name, declared).unwrap()
}

fn declarations() -> Vec<BeanDeclaration> {
    vec![
        BeanDeclaration::new("Order")
            .property(property("id", "String").constraint(not_blank()))
            .property(property("customer", "Customer").cascade())
            .property(
                property("lines", "List<OrderLine>")
                    .constraint(size(1, 10_000))
                    .type_argument(TypeArgumentDeclaration::new(0).cascade()),
            )
            .property(
                property("notes", "Map<String, Optional<String>>").type_argument(
                    TypeArgumentDeclaration::new(1)
                        .type_argument(TypeArgumentDeclaration::new(0).constraint(not_blank())),
                ),
            ),
        BeanDeclaration::new("Customer").property(property("name", "String").constraint(not_null())),
        BeanDeclaration::new("OrderLine")
            .property(property("sku", "String").constraint(not_blank()))
            .property(property("quantity", "Integer").constraint(positive()))
            .property(property("order", "Order").cascade()),
    ]
}

fn create_factory(config: ValidatorConfig) -> ValidatorFactory {
    ValidatorFactory::builder()
        .beans(declarations())
        .config(config)
        .build()
        .unwrap()
}

/// An order with `lines` lines, each pointing back to the order.
fn create_large_graph(lines: usize) -> (ObjectGraph, ObjectId) {
    let mut graph = ObjectGraph::new();
    let customer = graph.bean("Customer", [("name", "Ada")]);
    let order = graph.bean("Order", [("id", Value::from("order-1")), ("customer", Value::from(customer))]);

    let line_ids: Vec<ObjectId> = (0..lines)
        .map(|i| {
            graph.bean(
                "OrderLine",
                [
                    ("sku", Value::from(format!("sku-{i}"))),
                    ("quantity", Value::from((i % 7) as i64)),
                    ("order", Value::from(order)),
                ],
            )
        })
        .collect();
    let line_list = graph.sequence("ArrayList", line_ids);

    let notes: Vec<(String, ObjectId)> = (0..lines / 10)
        .map(|i| (format!("note-{i}"), graph.optional(if i % 3 == 0 { " " } else { "ok" })))
        .collect();
    let notes = graph.mapping("HashMap", notes);

    graph.set_field(order, "lines", line_list).unwrap();
    graph.set_field(order, "notes", notes).unwrap();
    (graph, order)
}

fn bench_factory_build(c: &mut Criterion) {
    c.bench_function("factory_build", |b| {
        b.iter(|| black_box(create_factory(ValidatorConfig::default())))
    });
}

fn bench_cascade_validation(c: &mut Criterion) {
    let factory = create_factory(ValidatorConfig::default());
    let validator = factory.validator();
    let (graph, order) = create_large_graph(1_000);

    c.bench_function("cascade_validation_1000_lines", |b| {
        b.iter(|| black_box(validator.validate(&graph, order, &[])).unwrap())
    });
}

fn bench_fail_fast_validation(c: &mut Criterion) {
    let factory = create_factory(ValidatorConfig::default().with_fail_fast(true));
    let validator = factory.validator();
    let (graph, order) = create_large_graph(1_000);

    c.bench_function("fail_fast_validation_1000_lines", |b| {
        b.iter(|| black_box(validator.validate(&graph, order, &[])).unwrap())
    });
}

criterion_group!(
    benches,
    bench_factory_build,
    bench_cascade_validation,
    bench_fail_fast_validation
);
criterion_main!(benches);
