//! Resolved declarations handed to the engine, and the bean metadata built
//! from them.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::error::Result;
use crate::metadata::{CascadingMetaData, ConstraintDeclaration, GroupConversion, MetaConstraint};
use crate::types::{GenericType, TypeName};

/// Declaration attached to one type argument of a property's declared type.
#[derive(Debug, Clone)]
pub struct TypeArgumentDeclaration {
    index: usize,
    cascading: bool,
    group_conversions: Vec<GroupConversion>,
    constraints: Vec<ConstraintDeclaration>,
    type_arguments: Vec<TypeArgumentDeclaration>,
}

impl TypeArgumentDeclaration {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            cascading: false,
            group_conversions: Vec::new(),
            constraints: Vec::new(),
            type_arguments: Vec::new(),
        }
    }

    pub fn cascade(mut self) -> Self {
        self.cascading = true;
        self
    }

    pub fn convert_group(mut self, from: &str, to: &str) -> Self {
        self.group_conversions.push(GroupConversion::new(from, to));
        self
    }

    pub fn constraint(mut self, constraint: ConstraintDeclaration) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Declaration for a type argument of this type argument.
    pub fn type_argument(mut self, declaration: TypeArgumentDeclaration) -> Self {
        self.type_arguments.push(declaration);
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_cascading(&self) -> bool {
        self.cascading
    }

    pub fn group_conversions(&self) -> &[GroupConversion] {
        &self.group_conversions
    }

    pub fn constraints(&self) -> &[ConstraintDeclaration] {
        &self.constraints
    }

    pub fn type_arguments(&self) -> &[TypeArgumentDeclaration] {
        &self.type_arguments
    }

    pub(crate) fn is_marked_for_cascading(&self) -> bool {
        self.cascading || self.type_arguments.iter().any(Self::is_marked_for_cascading)
    }
}

#[derive(Debug, Clone)]
pub struct PropertyDeclaration {
    name: String,
    declared_type: GenericType,
    cascading: bool,
    group_conversions: Vec<GroupConversion>,
    constraints: Vec<ConstraintDeclaration>,
    type_arguments: Vec<TypeArgumentDeclaration>,
}

impl PropertyDeclaration {
    pub fn new(name: impl Into<String>, declared_type: GenericType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            cascading: false,
            group_conversions: Vec::new(),
            constraints: Vec::new(),
            type_arguments: Vec::new(),
        }
    }

    /// Property whose type is given in textual form, e.g. `List<Item>`.
    pub fn parse(name: impl Into<String>, declared_type: &str) -> Result<Self> {
        Ok(Self::new(name, GenericType::parse(declared_type)?))
    }

    /// Marks the property value itself for cascaded validation.
    pub fn cascade(mut self) -> Self {
        self.cascading = true;
        self
    }

    pub fn convert_group(mut self, from: &str, to: &str) -> Self {
        self.group_conversions.push(GroupConversion::new(from, to));
        self
    }

    pub fn constraint(mut self, constraint: ConstraintDeclaration) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn type_argument(mut self, declaration: TypeArgumentDeclaration) -> Self {
        self.type_arguments.push(declaration);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &GenericType {
        &self.declared_type
    }

    pub fn is_cascading(&self) -> bool {
        self.cascading
    }

    pub fn group_conversions(&self) -> &[GroupConversion] {
        &self.group_conversions
    }

    pub fn constraints(&self) -> &[ConstraintDeclaration] {
        &self.constraints
    }

    pub fn type_arguments(&self) -> &[TypeArgumentDeclaration] {
        &self.type_arguments
    }

    pub(crate) fn is_marked_for_cascading(&self) -> bool {
        self.cascading
            || self
                .type_arguments
                .iter()
                .any(TypeArgumentDeclaration::is_marked_for_cascading)
    }
}

/// Constraints and cascading declarations of one bean type.
#[derive(Debug, Clone)]
pub struct BeanDeclaration {
    type_name: TypeName,
    constraints: Vec<ConstraintDeclaration>,
    properties: Vec<PropertyDeclaration>,
}

impl BeanDeclaration {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            constraints: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Adds a class-level constraint, validated against the bean object.
    pub fn constraint(mut self, constraint: ConstraintDeclaration) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn property(mut self, property: PropertyDeclaration) -> Self {
        self.properties.push(property);
        self
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn constraints(&self) -> &[ConstraintDeclaration] {
        &self.constraints
    }

    pub fn properties(&self) -> &[PropertyDeclaration] {
        &self.properties
    }
}

#[derive(Debug)]
pub struct PropertyMetaData {
    name: String,
    declared_type: GenericType,
    constraints: Vec<MetaConstraint>,
    cascading: Arc<CascadingMetaData>,
}

impl PropertyMetaData {
    pub(crate) fn new(
        name: String,
        declared_type: GenericType,
        constraints: Vec<MetaConstraint>,
        cascading: Arc<CascadingMetaData>,
    ) -> Self {
        Self {
            name,
            declared_type,
            constraints,
            cascading,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &GenericType {
        &self.declared_type
    }

    /// Constraints on the property value and on its container elements.
    pub fn constraints(&self) -> &[MetaConstraint] {
        &self.constraints
    }

    pub fn cascading_metadata(&self) -> &Arc<CascadingMetaData> {
        &self.cascading
    }

    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty()
            || self
                .cascading
                .is_marked_for_cascading_on_element_or_container_elements()
    }
}

/// Aggregated metadata of a bean type, including what it inherits from its
/// supertypes.
#[derive(Debug)]
pub struct BeanMetaData {
    type_name: TypeName,
    class_constraints: Vec<MetaConstraint>,
    properties: IndexMap<String, PropertyMetaData>,
}

impl BeanMetaData {
    pub(crate) fn new(
        type_name: TypeName,
        class_constraints: Vec<MetaConstraint>,
        properties: IndexMap<String, PropertyMetaData>,
    ) -> Self {
        Self {
            type_name,
            class_constraints,
            properties,
        }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn class_constraints(&self) -> &[MetaConstraint] {
        &self.class_constraints
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMetaData> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyMetaData> {
        self.properties.values()
    }

    pub fn is_constrained(&self) -> bool {
        !self.class_constraints.is_empty()
            || self.properties.values().any(PropertyMetaData::is_constrained)
    }
}
