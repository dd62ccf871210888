use std::collections::HashSet;

use crate::error::{Result, ValidatorError};
use crate::metadata::GroupConversion;
use crate::types::{GenericType, TypeName, TypeParameter};

/// Raw cascading declaration for one generic position, before extractor
/// resolution.
///
/// The tree mirrors the generic shape of the declared type: an annotated
/// `Map<String, List<Item>>` has two children, the second of which has one.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadingTypeParameter {
    enclosing_type: Option<GenericType>,
    type_parameter: TypeParameter,
    declared_container_class: Option<TypeName>,
    declared_type_parameter: TypeParameter,
    cascading: bool,
    container_element_types: Vec<CascadingTypeParameter>,
    group_conversions: Vec<GroupConversion>,
    marked_for_cascading_on_element_or_container_elements: bool,
    has_group_conversions_on_element_or_container_elements: bool,
}

impl CascadingTypeParameter {
    /// Declaration for the annotated element itself.
    pub fn annotated_object(
        declared_type: GenericType,
        cascading: bool,
        container_element_types: Vec<CascadingTypeParameter>,
        group_conversions: Vec<GroupConversion>,
    ) -> Self {
        Self::build(
            Some(declared_type),
            TypeParameter::AnnotatedObject,
            None,
            cascading,
            container_element_types,
            group_conversions,
        )
    }

    /// Non-cascading declaration for an element of a non-generic type.
    pub fn non_cascading(declared_type: GenericType) -> Self {
        Self::annotated_object(declared_type, false, Vec::new(), Vec::new())
    }

    /// Declaration for `type_parameter` of `enclosing_type`, e.g. `E` of
    /// `List<Item>`.
    pub fn type_argument(
        enclosing_type: GenericType,
        type_parameter: TypeParameter,
        cascading: bool,
        container_element_types: Vec<CascadingTypeParameter>,
        group_conversions: Vec<GroupConversion>,
    ) -> Self {
        let declared_container_class = Some(enclosing_type.raw_type());
        Self::build(
            Some(enclosing_type),
            type_parameter,
            declared_container_class,
            cascading,
            container_element_types,
            group_conversions,
        )
    }

    fn build(
        enclosing_type: Option<GenericType>,
        type_parameter: TypeParameter,
        declared_container_class: Option<TypeName>,
        cascading: bool,
        container_element_types: Vec<CascadingTypeParameter>,
        group_conversions: Vec<GroupConversion>,
    ) -> Self {
        let marked_for_cascading_on_element_or_container_elements = cascading
            || container_element_types
                .iter()
                .any(|child| child.marked_for_cascading_on_element_or_container_elements);
        let has_group_conversions_on_element_or_container_elements = !group_conversions
            .is_empty()
            || container_element_types
                .iter()
                .any(|child| child.has_group_conversions_on_element_or_container_elements);

        Self {
            enclosing_type,
            declared_type_parameter: type_parameter.clone(),
            type_parameter,
            declared_container_class,
            cascading,
            container_element_types,
            group_conversions,
            marked_for_cascading_on_element_or_container_elements,
            has_group_conversions_on_element_or_container_elements,
        }
    }

    pub fn enclosing_type(&self) -> Option<&GenericType> {
        self.enclosing_type.as_ref()
    }

    pub fn type_parameter(&self) -> &TypeParameter {
        &self.type_parameter
    }

    pub fn declared_container_class(&self) -> Option<&TypeName> {
        self.declared_container_class.as_ref()
    }

    pub fn declared_type_parameter(&self) -> &TypeParameter {
        &self.declared_type_parameter
    }

    pub fn is_cascading(&self) -> bool {
        self.cascading
    }

    pub fn container_element_types(&self) -> &[CascadingTypeParameter] {
        &self.container_element_types
    }

    pub fn group_conversions(&self) -> &[GroupConversion] {
        &self.group_conversions
    }

    pub fn is_marked_for_cascading_on_element_or_container_elements(&self) -> bool {
        self.marked_for_cascading_on_element_or_container_elements
    }

    pub fn has_group_conversions_on_element_or_container_elements(&self) -> bool {
        self.has_group_conversions_on_element_or_container_elements
    }

    /// Rejects group conversions that cannot be honored, for this position
    /// and all nested ones. `context` names the declaring element in errors.
    pub fn validate_group_conversions(&self, context: &str) -> Result<()> {
        if !self.group_conversions.is_empty() && !self.cascading {
            return Err(ValidatorError::invalid_group_conversion(
                context,
                format!(
                    "group conversions are declared on {} which is not marked for cascaded validation",
                    self.type_parameter
                ),
            ));
        }

        let mut sources = HashSet::with_capacity(self.group_conversions.len());
        for conversion in &self.group_conversions {
            if conversion.from.is_default() {
                return Err(ValidatorError::invalid_group_conversion(
                    context,
                    format!("the Default group cannot be converted ({conversion})"),
                ));
            }
            if conversion.from == conversion.to {
                return Err(ValidatorError::invalid_group_conversion(
                    context,
                    format!("group {} is converted to itself", conversion.from),
                ));
            }
            if !sources.insert(&conversion.from) {
                return Err(ValidatorError::invalid_group_conversion(
                    context,
                    format!("group {} is converted more than once", conversion.from),
                ));
            }
        }

        self.container_element_types
            .iter()
            .try_for_each(|child| child.validate_group_conversions(context))
    }
}
