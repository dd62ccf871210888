//! Immutable validation metadata built once per bean type.

pub mod bean;
pub mod cascading;
pub mod cascading_type_parameter;
pub mod constraint;
pub mod group_conversion;
pub mod manager;

pub use bean::{
    BeanDeclaration, BeanMetaData, PropertyDeclaration, PropertyMetaData, TypeArgumentDeclaration,
};
pub use cascading::CascadingMetaData;
pub use cascading_type_parameter::CascadingTypeParameter;
pub use constraint::{
    ConstraintDeclaration, ConstraintDescriptor, ConstraintLocation, ConstraintValidatorFactory,
    ExtractionStep, MetaConstraint, ValueExtractionPath,
};
pub use group_conversion::{GroupConversion, GroupConversionHelper};
pub use manager::BeanMetaDataManager;
