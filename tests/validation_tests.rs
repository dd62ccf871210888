mod common;

use common::*;
use octofhir_cascade::constraints::{
    ConstraintValidator, ConstraintValidatorContext, not_blank, not_null, positive, size,
};
use octofhir_cascade::extraction::{ExtractedTypeParameter, ExtractedValue, FnValueExtractor};
use octofhir_cascade::metadata::{ConstraintDeclaration, ConstraintDescriptor};
use octofhir_cascade::types::{Object, ObjectData, TypeDescriptor};
use octofhir_cascade::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_valid_order_has_no_violations() {
    let factory = build_factory(order_declarations());
    let (graph, order) = order_graph(&[1, 2, 3]);

    let result = factory.validator().validate(&graph, order, &[]).unwrap();
    assert!(result.is_valid(), "unexpected violations: {result:?}");
}

#[test]
fn test_cascades_into_list_elements() {
    let factory = build_factory(order_declarations());
    let (graph, order) = order_graph(&[1, 0, 4, -2]);

    let result = factory.validator().validate(&graph, order, &[]).unwrap();
    assert_eq!(
        paths(&result),
        vec!["lines[1].quantity", "lines[3].quantity"]
    );
    let violation = &result.violations[0];
    assert_eq!(violation.constraint_kind, "Positive");
    assert_eq!(violation.message, "must be greater than 0");
    assert_eq!(violation.invalid_value, Value::Integer(0));
    assert_eq!(violation.root_type, TypeName::new("Order"));
    assert!(violation.group.is_default());
    assert!(violation.leaf_bean.is_some());
}

#[test]
fn test_list_of_optional_container_element_constraint() {
    let factory = build_factory(vec![BeanDeclaration::new("Holder").property(
        property("values", "List<Optional<String>>").type_argument(
            TypeArgumentDeclaration::new(0)
                .type_argument(TypeArgumentDeclaration::new(0).constraint(size(1, 10))),
        ),
    )]);

    let mut graph = ObjectGraph::new();
    let empty = graph.optional("");
    let filled = graph.optional("abc");
    let absent = graph.optional(Value::Null);
    let values = graph.sequence("ArrayList", [empty, filled, absent]);
    let holder = graph.bean("Holder", [("values", values)]);

    let result = factory.validator().validate(&graph, holder, &[]).unwrap();
    assert_eq!(paths(&result), vec!["values[0]"]);
    assert_eq!(result.violations[0].message, "size must be between 1 and 10");
    assert_eq!(result.violations[0].invalid_value, Value::from(""));
}

#[test]
fn test_null_cascaded_property_is_skipped() {
    let factory = build_factory(order_declarations());
    let mut graph = ObjectGraph::new();
    let lines = graph.sequence("ArrayList", Vec::<Value>::from([Value::Null]));
    let order = graph.bean(
        "Order",
        [
            ("id", Value::from("order-1")),
            ("customer", Value::Null),
            ("lines", Value::from(lines)),
        ],
    );

    let result = factory.validator().validate(&graph, order, &[]).unwrap();
    assert!(result.is_valid(), "unexpected violations: {result:?}");
}

#[test]
fn test_null_values_never_reach_value_extractors() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let factory = ValidatorFactory::builder()
        .register_type(TypeDescriptor::new("Box").with_type_parameters(["T"]))
        .value_extractor(ValueExtractorDescriptor::new(
            "Box",
            ExtractedTypeParameter::Index(0),
            FnValueExtractor::new(move |container: &Object| {
                counter.fetch_add(1, Ordering::SeqCst);
                box_contents(container)
            }),
        ))
        .bean(BeanDeclaration::new("Holder").property(
            property("boxed", "Box<Box<Item>>").type_argument(
                TypeArgumentDeclaration::new(0)
                    .type_argument(TypeArgumentDeclaration::new(0).cascade()),
            ),
        ))
        .bean(
            BeanDeclaration::new("Item")
                .property(property("quantity", "Integer").constraint(positive())),
        )
        .build()
        .unwrap();

    let mut graph = ObjectGraph::new();
    let null_container = graph.bean("Holder", [("boxed", Value::Null)]);
    let outer = graph.insert(Object::new("Box", ObjectData::Optional(Value::Null)));
    let null_element = graph.bean("Holder", [("boxed", outer)]);

    let validator = factory.validator();
    assert!(validator.validate(&graph, null_container, &[]).unwrap().is_valid());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // Only the outer box is opened; its null content is not.
    assert!(validator.validate(&graph, null_element, &[]).unwrap().is_valid());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_group_conversion_applies_to_cascaded_bean() {
    let factory = build_factory(vec![
        BeanDeclaration::new("Order").property(
            property("customer", "Customer")
                .cascade()
                .convert_group("Checkout", "Billing"),
        ),
        BeanDeclaration::new("Customer")
            .property(property("name", "String").constraint(not_null().groups(["Billing"])))
            .property(property("email", "String").constraint(not_null().groups(["Checkout"]))),
    ]);

    let mut graph = ObjectGraph::new();
    let customer = graph.bean("Customer", Vec::<(&str, Value)>::new());
    let order = graph.bean("Order", [("customer", customer)]);

    let result = factory
        .validator()
        .validate(&graph, order, &[Group::new("Checkout")])
        .unwrap();
    assert_eq!(paths(&result), vec!["customer.name"]);
    assert_eq!(result.violations[0].group, Group::new("Billing"));
}

#[test]
fn test_group_conversion_on_container_element() {
    let factory = build_factory(vec![
        BeanDeclaration::new("Team").property(
            property("members", "List<Person>").type_argument(
                TypeArgumentDeclaration::new(0)
                    .cascade()
                    .convert_group("Registration", "Contact"),
            ),
        ),
        BeanDeclaration::new("Person")
            .property(property("phone", "String").constraint(not_blank().groups(["Contact"]))),
    ]);

    let mut graph = ObjectGraph::new();
    let alice = graph.bean("Person", [("phone", "555-0100")]);
    let bob = graph.bean("Person", [("phone", " ")]);
    let members = graph.sequence("ArrayList", [alice, bob]);
    let team = graph.bean("Team", [("members", members)]);

    let validator = factory.validator();
    let result = validator
        .validate(&graph, team, &[Group::new("Registration")])
        .unwrap();
    assert_eq!(paths(&result), vec!["members[1].phone"]);

    let result = validator.validate(&graph, team, &[]).unwrap();
    assert!(result.is_valid());
}

#[test]
fn test_cycle_terminates() {
    let factory = build_factory(vec![
        BeanDeclaration::new("Node")
            .property(property("name", "String").constraint(not_null()))
            .property(property("next", "Node").cascade()),
    ]);

    let mut graph = ObjectGraph::new();
    let a = graph.bean("Node", Vec::<(&str, Value)>::new());
    let b = graph.bean("Node", [("next", a)]);
    graph.set_field(a, "next", b).unwrap();

    let result = factory.validator().validate(&graph, a, &[]).unwrap();
    assert_eq!(paths(&result), vec!["name", "next.name"]);
}

#[test]
fn test_self_reference_revisited_under_converted_group() {
    let factory = build_factory(vec![
        BeanDeclaration::new("Node")
            .property(property("name", "String").constraint(not_null().groups(["A", "B"])))
            .property(property("next", "Node").cascade().convert_group("A", "B")),
    ]);

    let mut graph = ObjectGraph::new();
    let node = graph.bean("Node", Vec::<(&str, Value)>::new());
    graph.set_field(node, "next", node).unwrap();

    let result = factory
        .validator()
        .validate(&graph, node, &[Group::new("A")])
        .unwrap();
    assert_eq!(paths(&result), vec!["name", "next.name"]);
    assert_eq!(result.violations[0].group, Group::new("A"));
    assert_eq!(result.violations[1].group, Group::new("B"));
}

#[test]
fn test_shared_object_validated_on_each_path() {
    let factory = build_factory(vec![
        BeanDeclaration::new("Pair")
            .property(property("left", "Customer").cascade())
            .property(property("right", "Customer").cascade()),
        BeanDeclaration::new("Customer")
            .property(property("name", "String").constraint(not_null())),
    ]);

    let mut graph = ObjectGraph::new();
    let shared = graph.bean("Customer", Vec::<(&str, Value)>::new());
    let pair = graph.bean("Pair", [("left", shared), ("right", shared)]);

    let result = factory.validator().validate(&graph, pair, &[]).unwrap();
    assert_eq!(paths(&result), vec!["left.name", "right.name"]);
}

#[test]
fn test_constraint_fires_once_for_several_matching_groups() {
    let factory = build_factory(vec![BeanDeclaration::new("Customer").property(
        property("name", "String").constraint(not_null().groups(["A", "B"])),
    )]);
    let mut graph = ObjectGraph::new();
    let customer = graph.bean("Customer", Vec::<(&str, Value)>::new());

    let result = factory
        .validator()
        .validate(&graph, customer, &[Group::new("B"), Group::new("A")])
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.violations[0].group, Group::new("A"));
}

#[test]
fn test_groups_not_requested_are_ignored() {
    let factory = build_factory(vec![BeanDeclaration::new("Customer").property(
        property("name", "String").constraint(not_null().groups(["Strict"])),
    )]);
    let mut graph = ObjectGraph::new();
    let customer = graph.bean("Customer", Vec::<(&str, Value)>::new());

    let validator = factory.validator();
    assert!(validator.validate(&graph, customer, &[]).unwrap().is_valid());
    assert_eq!(
        validator
            .validate(&graph, customer, &[Group::new("Strict")])
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_fail_fast_stops_after_first_violation() {
    let factory = build_factory_with_config(
        order_declarations(),
        ValidatorConfig::default().with_fail_fast(true),
    );
    let (graph, order) = order_graph(&[0, 0, 0]);

    let result = factory.validator().validate(&graph, order, &[]).unwrap();
    assert_eq!(paths(&result), vec!["lines[0].quantity"]);
}

#[test]
fn test_map_keys_and_values() {
    let factory = build_factory(vec![
        BeanDeclaration::new("Inventory").property(
            property("stock", "Map<String, Item>")
                .type_argument(TypeArgumentDeclaration::new(0).constraint(size(3, 10)))
                .type_argument(TypeArgumentDeclaration::new(1).cascade()),
        ),
        BeanDeclaration::new("Item")
            .property(property("quantity", "Integer").constraint(positive())),
    ]);

    let mut graph = ObjectGraph::new();
    let good = graph.bean("Item", [("quantity", 5)]);
    let bad = graph.bean("Item", [("quantity", 0)]);
    let stock = graph.mapping("HashMap", [("ab", good), ("sku-2", bad)]);
    let inventory = graph.bean("Inventory", [("stock", stock)]);

    let result = factory.validator().validate(&graph, inventory, &[]).unwrap();
    assert_eq!(paths(&result), vec!["stock[ab]", "stock[sku-2].quantity"]);
    assert_eq!(result.violations[0].constraint_kind, "Size");
    assert_eq!(result.violations[1].constraint_kind, "Positive");
}

#[test]
fn test_array_elements_cascade() {
    let factory = build_factory(vec![
        BeanDeclaration::new("Shipment")
            .property(property("items", "Item[]").type_argument(TypeArgumentDeclaration::new(0).cascade())),
        BeanDeclaration::new("Item")
            .property(property("quantity", "Integer").constraint(positive())),
    ]);

    let mut graph = ObjectGraph::new();
    let item = graph.bean("Item", [("quantity", -1)]);
    let items = graph.array([item]);
    let shipment = graph.bean("Shipment", [("items", items)]);

    let result = factory.validator().validate(&graph, shipment, &[]).unwrap();
    assert_eq!(paths(&result), vec!["items[0].quantity"]);
}

#[test]
fn test_set_elements_have_no_index() {
    let factory = build_factory(vec![BeanDeclaration::new("Tagged").property(
        property("tags", "Set<String>")
            .type_argument(TypeArgumentDeclaration::new(0).constraint(not_blank())),
    )]);

    let mut graph = ObjectGraph::new();
    let tags = graph.sequence("HashSet", ["rust", ""]);
    let tagged = graph.bean("Tagged", [("tags", tags)]);

    let result = factory.validator().validate(&graph, tagged, &[]).unwrap();
    assert_eq!(paths(&result), vec!["tags[]"]);
}

fn box_contents(container: &Object) -> Vec<ExtractedValue<'_>> {
    match container.data() {
        ObjectData::Optional(value) => vec![ExtractedValue::unwrapped("<box content>", value)],
        _ => Vec::new(),
    }
}

#[test]
fn test_custom_value_extractor() {
    let factory = ValidatorFactory::builder()
        .register_type(TypeDescriptor::new("Box").with_type_parameters(["T"]))
        .value_extractor(ValueExtractorDescriptor::new(
            "Box",
            ExtractedTypeParameter::Index(0),
            FnValueExtractor::new(box_contents),
        ))
        .bean(
            BeanDeclaration::new("Holder").property(
                property("boxed", "Box<Item>")
                    .type_argument(TypeArgumentDeclaration::new(0).cascade()),
            ),
        )
        .bean(
            BeanDeclaration::new("Item")
                .property(property("quantity", "Integer").constraint(positive())),
        )
        .build()
        .unwrap();

    let mut graph = ObjectGraph::new();
    let item = graph.bean("Item", [("quantity", 0)]);
    let boxed = graph.insert(Object::new("Box", ObjectData::Optional(Value::from(item))));
    let holder = graph.bean("Holder", [("boxed", boxed)]);

    let result = factory.validator().validate(&graph, holder, &[]).unwrap();
    assert_eq!(paths(&result), vec!["boxed.quantity"]);
}

#[test]
fn test_missing_extractor_for_cascaded_generic_fails_build() {
    let error = ValidatorFactory::builder()
        .bean(BeanDeclaration::new("Holder").property(
            property("boxed", "Box<Item>").type_argument(TypeArgumentDeclaration::new(0).cascade()),
        ))
        .build()
        .unwrap_err();
    assert!(matches!(error, ValidatorError::NoValueExtractorFound { .. }));
    assert!(error.is_configuration_error());
}

#[test]
fn test_invalid_group_conversion_fails_build() {
    let error = ValidatorFactory::builder()
        .bean(
            BeanDeclaration::new("Order")
                .property(property("customer", "Customer").cascade().convert_group("A", "A")),
        )
        .build()
        .unwrap_err();
    assert!(matches!(error, ValidatorError::InvalidGroupConversion { .. }));
}

#[test]
fn test_runtime_subtype_uses_its_own_metadata() {
    let factory = ValidatorFactory::builder()
        .register_type(TypeDescriptor::new("PremiumCustomer").extends("Customer", Vec::new()))
        .beans(order_declarations())
        .bean(
            BeanDeclaration::new("PremiumCustomer")
                .property(property("tier", "String").constraint(not_blank())),
        )
        .build()
        .unwrap();

    let mut graph = ObjectGraph::new();
    let customer = graph.bean("PremiumCustomer", [("tier", "")]);
    let lines = graph.sequence("ArrayList", Vec::<Value>::new());
    let order = graph.bean(
        "Order",
        [
            ("id", Value::from("order-1")),
            ("customer", Value::from(customer)),
            ("lines", Value::from(lines)),
        ],
    );

    let result = factory.validator().validate(&graph, order, &[]).unwrap();
    assert_eq!(
        paths(&result),
        vec!["customer.tier", "customer.name", "lines"]
    );
}

#[test]
fn test_max_cascade_depth() {
    let declarations = vec![
        BeanDeclaration::new("Node").property(property("next", "Node").cascade()),
    ];
    let config = ValidatorConfig::default().with_max_cascade_depth(3);

    let mut graph = ObjectGraph::new();
    let mut next = Value::Null;
    let mut chain = Vec::new();
    for _ in 0..5 {
        let node = graph.bean("Node", [("next", next.clone())]);
        next = Value::from(node);
        chain.push(node);
    }

    let factory = build_factory_with_config(declarations, config);
    let validator = factory.validator();
    assert!(validator.validate(&graph, chain[2], &[]).unwrap().is_valid());

    let error = validator.validate(&graph, chain[4], &[]).unwrap_err();
    assert!(matches!(
        error,
        ValidatorError::CascadeDepthExceeded { depth: 3, .. }
    ));
}

#[test]
fn test_ring_as_long_as_depth_limit_is_cut_by_cycle_detection() {
    let declarations = vec![
        BeanDeclaration::new("Node")
            .property(property("name", "String").constraint(not_null()))
            .property(property("next", "Node").cascade()),
    ];

    for limit in [2usize, 3] {
        let mut graph = ObjectGraph::new();
        let nodes: Vec<ObjectId> = (0..limit)
            .map(|_| graph.bean("Node", Vec::<(&str, Value)>::new()))
            .collect();
        for (index, node) in nodes.iter().enumerate() {
            graph
                .set_field(*node, "next", nodes[(index + 1) % limit])
                .unwrap();
        }

        let factory = build_factory_with_config(
            declarations.clone(),
            ValidatorConfig::default().with_max_cascade_depth(limit),
        );
        let result = factory.validator().validate(&graph, nodes[0], &[]).unwrap();
        assert_eq!(result.len(), limit);
    }
}

#[test]
fn test_depth_limit_still_applies_past_a_revisited_bean() {
    let declarations = vec![
        BeanDeclaration::new("Node")
            .property(property("back", "Node").cascade())
            .property(property("next", "Node").cascade()),
    ];
    let config = ValidatorConfig::default().with_max_cascade_depth(2);

    // b.back = a is cut at the limit; a -> b -> c goes one level too deep.
    let mut graph = ObjectGraph::new();
    let c = graph.bean("Node", Vec::<(&str, Value)>::new());
    let b = graph.bean("Node", [("next", c)]);
    let a = graph.bean("Node", [("next", b)]);
    graph.set_field(b, "back", a).unwrap();

    let factory = build_factory_with_config(declarations, config);
    let error = factory.validator().validate(&graph, a, &[]).unwrap_err();
    match error {
        ValidatorError::CascadeDepthExceeded { depth, path } => {
            assert_eq!(depth, 2);
            assert_eq!(path, "next.next");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[derive(Default)]
struct Exploding;

impl ConstraintValidator for Exploding {
    fn is_valid(
        &self,
        _value: &Value,
        _context: &mut ConstraintValidatorContext<'_>,
    ) -> std::result::Result<bool, BoxError> {
        Err("validator blew up".into())
    }
}

#[test]
fn test_validator_error_aborts_validation() {
    let factory = build_factory(vec![BeanDeclaration::new("Customer").property(
        property("name", "String").constraint(ConstraintDeclaration::new(
            ConstraintDescriptor::new("Exploding", "never reported"),
            Exploding::default,
        )),
    )]);
    let mut graph = ObjectGraph::new();
    let customer = graph.bean("Customer", [("name", "Ada")]);

    let error = factory
        .validator()
        .validate(&graph, customer, &[])
        .unwrap_err();
    match error {
        ValidatorError::UnexpectedValidation {
            constraint, path, ..
        } => {
            assert_eq!(constraint, "Exploding");
            assert_eq!(path, "name");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Class-level check that two fields of an account hold the same text.
#[derive(Default)]
struct PasswordsMatch;

impl ConstraintValidator for PasswordsMatch {
    fn is_valid(
        &self,
        value: &Value,
        context: &mut ConstraintValidatorContext<'_>,
    ) -> std::result::Result<bool, BoxError> {
        let Some(account) = context.resolve(value)? else {
            return Ok(true);
        };
        if account.field("password") == account.field("confirmation") {
            return Ok(true);
        }
        context.disable_default_constraint_violation();
        context.build_constraint_violation_with_template("passwords do not match");
        Ok(false)
    }
}

#[test]
fn test_class_level_constraint_with_custom_message() {
    let factory = build_factory(vec![BeanDeclaration::new("Account").constraint(
        ConstraintDeclaration::new(
            ConstraintDescriptor::new("PasswordsMatch", "invalid account"),
            PasswordsMatch::default,
        ),
    )]);

    let mut graph = ObjectGraph::new();
    let account = graph.bean("Account", [("password", "a"), ("confirmation", "b")]);

    let result = factory.validator().validate(&graph, account, &[]).unwrap();
    assert_eq!(result.len(), 1);
    let violation = &result.violations[0];
    assert!(violation.property_path.is_root());
    assert_eq!(violation.message, "passwords do not match");
    assert_eq!(violation.to_string(), "Account: passwords do not match");
    assert_eq!(violation.leaf_bean, Some(account));
}

#[test]
fn test_validate_property() {
    let factory = build_factory(order_declarations());
    let mut graph = ObjectGraph::new();
    let customer = graph.bean("Customer", Vec::<(&str, Value)>::new());
    let order = graph.bean("Order", [("customer", customer)]);

    let validator = factory.validator();
    let result = validator
        .validate_property(&graph, order, "customer", &[])
        .unwrap();
    assert_eq!(paths(&result), vec!["customer.name"]);

    let error = validator
        .validate_property(&graph, order, "shipping", &[])
        .unwrap_err();
    assert!(matches!(error, ValidatorError::UnknownProperty { .. }));
}

#[test]
fn test_validate_value() {
    let factory = build_factory(order_declarations());
    let validator = factory.validator();
    let order = TypeName::new("Order");

    let result = validator
        .validate_value(&order, "id", &Value::from("  "), &[])
        .unwrap();
    assert_eq!(paths(&result), vec!["id"]);
    assert_eq!(result.violations[0].leaf_bean, None);

    assert!(
        validator
            .validate_value(&order, "id", &Value::from("order-7"), &[])
            .unwrap()
            .is_valid()
    );
}

#[test]
fn test_non_bean_root_is_rejected() {
    let factory = build_factory(order_declarations());
    let mut graph = ObjectGraph::new();
    let list = graph.sequence("ArrayList", [1, 2]);

    let error = factory.validator().validate(&graph, list, &[]).unwrap_err();
    assert!(matches!(error, ValidatorError::Config { .. }));
}

#[test]
fn test_violations_serialize_to_json() {
    let factory = build_factory(order_declarations());
    let (graph, order) = order_graph(&[0]);

    let result = factory.validator().validate(&graph, order, &[]).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["violations"][0]["constraint_kind"], "Positive");
    assert_eq!(json["violations"][0]["root_type"], "Order");
}
