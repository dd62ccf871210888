//! Cascading metadata: which positions of a declared element are validated
//! recursively, under which group conversions, and through which extractors.

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, ValidatorError};
use crate::extraction::{ValueExtractorDescriptor, ValueExtractorRegistry};
use crate::metadata::{CascadingTypeParameter, GroupConversion, GroupConversionHelper};
use crate::types::{GenericType, Group, TypeName, TypeParameter};

static NON_CASCADING_NON_CONTAINER: Lazy<Arc<CascadingMetaData>> =
    Lazy::new(|| Arc::new(CascadingMetaData::leaf(false)));

static CASCADING_NON_CONTAINER: Lazy<Arc<CascadingMetaData>> =
    Lazy::new(|| Arc::new(CascadingMetaData::leaf(true)));

/// Immutable cascading metadata for one generic position of a declared
/// element, mirroring the element's generic type shape.
pub struct CascadingMetaData {
    enclosing_type: Option<GenericType>,
    type_parameter: TypeParameter,
    declared_container_class: Option<TypeName>,
    declared_type_parameter: TypeParameter,
    container_element_types_cascading_metadata: Vec<Arc<CascadingMetaData>>,
    cascading: bool,
    group_conversion_helper: GroupConversionHelper,
    marked_for_cascading_on_element_or_container_elements: bool,
    has_group_conversions_on_element_or_container_elements: bool,
    value_extractor_candidates: Vec<Arc<ValueExtractorDescriptor>>,
}

impl CascadingMetaData {
    /// Builds the metadata tree for `parameter`.
    ///
    /// Group conversions are checked first; `context` names the declaring
    /// element in errors. Non-generic positions without group conversions
    /// share one of two process-wide instances.
    pub fn of(
        registry: &ValueExtractorRegistry,
        parameter: &CascadingTypeParameter,
        context: &str,
    ) -> Result<Arc<Self>> {
        parameter.validate_group_conversions(context)?;

        if parameter.container_element_types().is_empty()
            && parameter.group_conversions().is_empty()
        {
            return Ok(if parameter.is_cascading() {
                Self::cascading_leaf()
            } else {
                Self::non_cascading_leaf()
            });
        }

        Self::build(registry, parameter).map(Arc::new)
    }

    /// Shared instance for a non-cascaded, non-generic element.
    pub fn non_cascading_leaf() -> Arc<Self> {
        Arc::clone(&NON_CASCADING_NON_CONTAINER)
    }

    /// Shared instance for a cascaded, non-generic element.
    pub fn cascading_leaf() -> Arc<Self> {
        Arc::clone(&CASCADING_NON_CONTAINER)
    }

    fn leaf(cascading: bool) -> Self {
        Self {
            enclosing_type: None,
            type_parameter: TypeParameter::AnnotatedObject,
            declared_container_class: None,
            declared_type_parameter: TypeParameter::AnnotatedObject,
            container_element_types_cascading_metadata: Vec::new(),
            cascading,
            group_conversion_helper: GroupConversionHelper::empty(),
            marked_for_cascading_on_element_or_container_elements: cascading,
            has_group_conversions_on_element_or_container_elements: false,
            value_extractor_candidates: Vec::new(),
        }
    }

    fn build(registry: &ValueExtractorRegistry, parameter: &CascadingTypeParameter) -> Result<Self> {
        let children = parameter
            .container_element_types()
            .iter()
            .map(|child| Self::build(registry, child).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        let marked = parameter.is_marked_for_cascading_on_element_or_container_elements();
        let value_extractor_candidates =
            if parameter.type_parameter().is_annotated_object() || !marked {
                Vec::new()
            } else {
                let candidates = parameter
                    .enclosing_type()
                    .map(|enclosing| {
                        registry.candidates_for_cascaded_validation(
                            enclosing,
                            parameter.type_parameter(),
                        )
                    })
                    .unwrap_or_default();
                if candidates.is_empty() {
                    return Err(ValidatorError::no_value_extractor_found(
                        parameter
                            .declared_container_class()
                            .map(TypeName::to_string)
                            .unwrap_or_default(),
                        parameter.declared_type_parameter().to_string(),
                    ));
                }
                candidates
            };

        Ok(Self {
            enclosing_type: parameter.enclosing_type().cloned(),
            type_parameter: parameter.type_parameter().clone(),
            declared_container_class: parameter.declared_container_class().cloned(),
            declared_type_parameter: parameter.declared_type_parameter().clone(),
            container_element_types_cascading_metadata: children,
            cascading: parameter.is_cascading(),
            group_conversion_helper: GroupConversionHelper::of(parameter.group_conversions())?,
            marked_for_cascading_on_element_or_container_elements: marked,
            has_group_conversions_on_element_or_container_elements: parameter
                .has_group_conversions_on_element_or_container_elements(),
            value_extractor_candidates,
        })
    }

    pub fn enclosing_type(&self) -> Option<&GenericType> {
        self.enclosing_type.as_ref()
    }

    pub fn type_parameter(&self) -> &TypeParameter {
        &self.type_parameter
    }

    /// Container type as written at the declaration site, used for path nodes.
    pub fn declared_container_class(&self) -> Option<&TypeName> {
        self.declared_container_class.as_ref()
    }

    pub fn declared_type_parameter(&self) -> &TypeParameter {
        &self.declared_type_parameter
    }

    pub fn is_cascading(&self) -> bool {
        self.cascading
    }

    pub fn is_marked_for_cascading_on_element_or_container_elements(&self) -> bool {
        self.marked_for_cascading_on_element_or_container_elements
    }

    pub fn has_group_conversions_on_element_or_container_elements(&self) -> bool {
        self.has_group_conversions_on_element_or_container_elements
    }

    pub fn container_element_types_cascading_metadata(&self) -> &[Arc<CascadingMetaData>] {
        &self.container_element_types_cascading_metadata
    }

    pub fn convert_group(&self, group: &Group) -> Group {
        self.group_conversion_helper.convert_group(group)
    }

    pub fn convert_groups(&self, groups: &[Group]) -> Vec<Group> {
        self.group_conversion_helper.convert_groups(groups)
    }

    pub fn group_conversion_descriptors(&self) -> Vec<GroupConversion> {
        self.group_conversion_helper.as_descriptors()
    }

    /// Extractors statically compatible with this position. The one used for
    /// a given container instance is picked at validation time.
    pub fn value_extractor_candidates(&self) -> &[Arc<ValueExtractorDescriptor>] {
        &self.value_extractor_candidates
    }
}

impl fmt::Debug for CascadingMetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CascadingMetaData")
            .field(
                "enclosing_type",
                &self.enclosing_type.as_ref().map(ToString::to_string),
            )
            .field("type_parameter", &self.type_parameter.to_string())
            .field("cascading", &self.cascading)
            .field("group_conversions", &self.group_conversion_helper)
            .field(
                "container_element_types_cascading_metadata",
                &self.container_element_types_cascading_metadata,
            )
            .finish()
    }
}
