//! Registry resolving which value extractors apply to a generic position.
//!
//! Resolution happens in two stages. At metadata-build time the registry
//! computes the candidates that are statically compatible with a declared
//! container type and type parameter. At validation time those candidates are
//! narrowed against the runtime type of the container instance and the
//! maximally specific one is picked.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::error::{Result, ValidatorError};
use crate::extraction::{
    ArrayElementExtractor, ExtractedTypeParameter, IterableValueExtractor, ListValueExtractor,
    MapKeyExtractor, MapValueExtractor, OptionalValueExtractor, ValueExtractorDescriptor,
    ValueExtractorKey,
};
use crate::types::{GenericType, TypeHierarchy, TypeName, TypeParameter};

#[derive(Debug, Clone)]
pub struct ValueExtractorRegistry {
    hierarchy: Arc<TypeHierarchy>,
    descriptors: IndexMap<ValueExtractorKey, Arc<ValueExtractorDescriptor>>,
}

impl ValueExtractorRegistry {
    /// Registry without any extractors.
    pub fn new(hierarchy: Arc<TypeHierarchy>) -> Self {
        Self {
            hierarchy,
            descriptors: IndexMap::new(),
        }
    }

    /// Registry with extractors for the built-in container family.
    pub fn with_default_extractors(hierarchy: Arc<TypeHierarchy>) -> Self {
        let mut registry = Self::new(hierarchy);
        registry.register(ValueExtractorDescriptor::new(
            "Iterable",
            ExtractedTypeParameter::Index(0),
            IterableValueExtractor,
        ));
        registry.register(ValueExtractorDescriptor::new(
            "List",
            ExtractedTypeParameter::Index(0),
            ListValueExtractor,
        ));
        registry.register(ValueExtractorDescriptor::new(
            "Map",
            ExtractedTypeParameter::Index(0),
            MapKeyExtractor,
        ));
        registry.register(ValueExtractorDescriptor::new(
            "Map",
            ExtractedTypeParameter::Index(1),
            MapValueExtractor,
        ));
        registry.register(ValueExtractorDescriptor::new(
            "Optional",
            ExtractedTypeParameter::Index(0),
            OptionalValueExtractor,
        ));
        registry.register(ValueExtractorDescriptor::new(
            TypeName::array(),
            ExtractedTypeParameter::ArrayElement,
            ArrayElementExtractor,
        ));
        registry
    }

    /// Adds an extractor, replacing any previous one for the same container
    /// type and type parameter.
    pub fn register(&mut self, descriptor: ValueExtractorDescriptor) {
        let key = descriptor.key().clone();
        if self.descriptors.contains_key(&key) {
            tracing::debug!(
                "Replacing value extractor for {}{}",
                key.container_type,
                key.extracted_type_parameter
            );
        }
        self.descriptors.insert(key, Arc::new(descriptor));
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, key: &ValueExtractorKey) -> Option<&Arc<ValueExtractorDescriptor>> {
        self.descriptors.get(key)
    }

    /// Extractors that may apply to `type_parameter` of `enclosing_type`:
    /// those declared on the erased enclosing type or one of its supertypes,
    /// plus those declared on subtypes a runtime instance could have.
    pub fn candidates_for_cascaded_validation(
        &self,
        enclosing_type: &GenericType,
        type_parameter: &TypeParameter,
    ) -> Vec<Arc<ValueExtractorDescriptor>> {
        let declared = enclosing_type.raw_type();
        self.descriptors
            .values()
            .filter(|descriptor| self.is_compatible(descriptor, &declared, type_parameter))
            .cloned()
            .collect()
    }

    /// Extractors able to unwrap the declared type as a whole: non-generic
    /// extractors on the type (or a supertype), or extractors of its single
    /// type parameter.
    pub fn candidates_for_unwrapping(
        &self,
        declared_type: &GenericType,
    ) -> Vec<Arc<ValueExtractorDescriptor>> {
        let declared = declared_type.raw_type();
        let single_parameter = (declared_type.type_arguments().len() == 1).then(|| {
            if declared_type.is_array() {
                TypeParameter::ArrayElement
            } else {
                TypeParameter::declared(declared.clone(), 0, "T")
            }
        });

        self.descriptors
            .values()
            .filter(|descriptor| match descriptor.extracted_type_parameter() {
                ExtractedTypeParameter::NonGeneric => {
                    self.hierarchy.is_assignable(&declared, descriptor.container_type())
                }
                _ => single_parameter
                    .as_ref()
                    .is_some_and(|parameter| self.is_compatible(descriptor, &declared, parameter)),
            })
            .cloned()
            .collect()
    }

    fn is_compatible(
        &self,
        descriptor: &ValueExtractorDescriptor,
        declared: &TypeName,
        type_parameter: &TypeParameter,
    ) -> bool {
        let container = descriptor.container_type();
        match (type_parameter, descriptor.extracted_type_parameter()) {
            (TypeParameter::ArrayElement, ExtractedTypeParameter::ArrayElement) => {
                declared.is_array() && container.is_array()
            }
            (TypeParameter::Declared { index, .. }, ExtractedTypeParameter::Index(extracted)) => {
                if self.hierarchy.is_assignable(declared, container) {
                    self.hierarchy.bind_type_parameter(declared, *index, container)
                        == Some(extracted)
                } else if self.hierarchy.is_assignable(container, declared) {
                    self.hierarchy.bind_type_parameter(container, extracted, declared)
                        == Some(*index)
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Narrows statically compatible `candidates` to the one to use for a
    /// container whose runtime type is `runtime_type`.
    ///
    /// Returns `Ok(None)` when no candidate fits the runtime type, and an
    /// error when several equally specific candidates remain.
    pub fn select_for_runtime_type(
        &self,
        candidates: &[Arc<ValueExtractorDescriptor>],
        runtime_type: &TypeName,
    ) -> Result<Option<Arc<ValueExtractorDescriptor>>> {
        let compatible: Vec<&Arc<ValueExtractorDescriptor>> = candidates
            .iter()
            .filter(|descriptor| {
                self.hierarchy
                    .is_assignable(runtime_type, descriptor.container_type())
            })
            .collect();

        match compatible.as_slice() {
            [] => {
                tracing::trace!("No value extractor compatible with runtime type {}", runtime_type);
                return Ok(None);
            }
            [single] => return Ok(Some(Arc::clone(single))),
            _ => {}
        }

        let most_specific: Vec<&Arc<ValueExtractorDescriptor>> = compatible
            .iter()
            .copied()
            .filter(|candidate| {
                !compatible.iter().any(|other| {
                    other.container_type() != candidate.container_type()
                        && self
                            .hierarchy
                            .is_assignable(other.container_type(), candidate.container_type())
                })
            })
            .collect();

        match most_specific.as_slice() {
            [single] => Ok(Some(Arc::clone(single))),
            _ => Err(ValidatorError::ambiguous_value_extractor(
                runtime_type.as_str(),
                most_specific
                    .iter()
                    .map(|descriptor| descriptor.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }
}
