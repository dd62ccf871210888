use octofhir_cascade::constraints::{not_blank, not_null, positive, size};
use octofhir_cascade::metadata::{BeanDeclaration, PropertyDeclaration, TypeArgumentDeclaration};
use octofhir_cascade::*;

#[allow(dead_code)]
pub fn property(name: &str, declared_type: &str) -> PropertyDeclaration {
    PropertyDeclaration::parse(name, declared_type).unwrap()
}

#[allow(dead_code)]
pub fn build_factory(beans: Vec<BeanDeclaration>) -> ValidatorFactory {
    ValidatorFactory::builder().beans(beans).build().unwrap()
}

#[allow(dead_code)]
pub fn build_factory_with_config(
    beans: Vec<BeanDeclaration>,
    config: ValidatorConfig,
) -> ValidatorFactory {
    ValidatorFactory::builder()
        .beans(beans)
        .config(config)
        .build()
        .unwrap()
}

/// Rendered property paths of every violation, in report order.
#[allow(dead_code)]
pub fn paths(result: &ValidationResult) -> Vec<String> {
    result
        .iter()
        .map(|violation| violation.property_path.to_string())
        .collect()
}

/// `Order { id, customer, lines: List<OrderLine> }` with cascading into
/// the customer and every line.
#[allow(dead_code)]
pub fn order_declarations() -> Vec<BeanDeclaration> {
    vec![
        BeanDeclaration::new("Order")
            .property(property("id", "String").constraint(not_blank()))
            .property(property("customer", "Customer").cascade())
            .property(
                property("lines", "List<OrderLine>")
                    .constraint(size(1, 100))
                    .type_argument(TypeArgumentDeclaration::new(0).cascade()),
            ),
        BeanDeclaration::new("Customer")
            .property(property("name", "String").constraint(not_null())),
        BeanDeclaration::new("OrderLine")
            .property(property("sku", "String").constraint(not_blank()))
            .property(property("quantity", "Integer").constraint(positive())),
    ]
}

/// Builds a valid order with the given line quantities.
#[allow(dead_code)]
pub fn order_graph(quantities: &[i64]) -> (ObjectGraph, ObjectId) {
    let mut graph = ObjectGraph::new();
    let customer = graph.bean("Customer", [("name", "Ada")]);
    let lines: Vec<ObjectId> = quantities
        .iter()
        .enumerate()
        .map(|(index, quantity)| {
            graph.bean(
                "OrderLine",
                [
                    ("sku", Value::from(format!("sku-{index}"))),
                    ("quantity", Value::from(*quantity)),
                ],
            )
        })
        .collect();
    let lines = graph.sequence("ArrayList", lines);
    let order = graph.bean(
        "Order",
        [
            ("id", Value::from("order-1")),
            ("customer", Value::from(customer)),
            ("lines", Value::from(lines)),
        ],
    );
    (graph, order)
}
