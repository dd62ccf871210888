//! # OctoFHIR Cascade
//!
//! A constraint validation engine for dynamic object graphs. Constraints are
//! declared per bean type, property and type argument; the engine walks the
//! graph, cascades into nested beans and container elements, and reports
//! every violation with the property path that leads to it.
//!
//! ## Features
//!
//! - **Cascading**: follows properties and container elements such as
//!   `Map<String, List<Order>>`, choosing value extractors by runtime type
//! - **Validation groups**: with group conversion at cascade points
//! - **Cycle safe**: an object is never re-entered under a group it is
//!   already being validated under
//! - **Concurrent**: metadata is built once and shared lock-free
//!
//! ## Quick Start
//!
//! ```rust
//! use octofhir_cascade::constraints::{not_null, size};
//! use octofhir_cascade::metadata::{BeanDeclaration, PropertyDeclaration, TypeArgumentDeclaration};
//! use octofhir_cascade::types::ObjectGraph;
//! use octofhir_cascade::ValidatorFactory;
//!
//! # fn main() -> octofhir_cascade::Result<()> {
//! let factory = ValidatorFactory::builder()
//!     .bean(
//!         BeanDeclaration::new("Order")
//!             .property(PropertyDeclaration::parse("id", "String")?.constraint(not_null()))
//!             .property(
//!                 PropertyDeclaration::parse("tags", "List<String>")?
//!                     .type_argument(TypeArgumentDeclaration::new(0).constraint(size(1, 10))),
//!             ),
//!     )
//!     .build()?;
//!
//! let mut graph = ObjectGraph::new();
//! let tags = graph.sequence("ArrayList", ["ok", ""]);
//! let order = graph.bean("Order", [("tags", tags)]);
//!
//! let result = factory.validator().validate(&graph, order, &[])?;
//! assert_eq!(result.len(), 2);
//! assert_eq!(result.at_path("tags[1]").len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod constraints;
pub mod core;
pub mod error;
pub mod extraction;
pub mod metadata;
pub mod types;
pub mod validation;

pub use crate::core::ValidatorConfig;
pub use error::Result;
pub use error::{BoxError, ValidatorError};
pub use extraction::{ValueExtractor, ValueExtractorDescriptor, ValueExtractorRegistry};
pub use metadata::{
    BeanDeclaration, BeanMetaDataManager, CascadingMetaData, GroupConversionHelper,
    PropertyDeclaration, TypeArgumentDeclaration,
};
pub use types::{Group, ObjectGraph, ObjectId, TypeHierarchy, TypeName, Value};
pub use validation::{
    ConstraintViolation, ValidationResult, Validator, ValidatorFactory, ValidatorFactoryBuilder,
};
