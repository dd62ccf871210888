use std::fmt;
use std::sync::Arc;

use crate::extraction::ValueExtractor;
use crate::types::TypeName;

/// Which part of a container a value extractor reaches into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractedTypeParameter {
    /// The type parameter with this index on the extractor's container type.
    Index(usize),
    /// The component of an array.
    ArrayElement,
    /// The container as a whole, for non-generic wrappers.
    NonGeneric,
}

impl fmt::Display for ExtractedTypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::ArrayElement => f.write_str("<array element>"),
            Self::NonGeneric => f.write_str("<non generic>"),
        }
    }
}

/// Registration key: at most one extractor per container type and parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueExtractorKey {
    pub container_type: TypeName,
    pub extracted_type_parameter: ExtractedTypeParameter,
}

pub struct ValueExtractorDescriptor {
    key: ValueExtractorKey,
    extractor: Arc<dyn ValueExtractor>,
}

impl ValueExtractorDescriptor {
    pub fn new(
        container_type: impl Into<TypeName>,
        extracted_type_parameter: ExtractedTypeParameter,
        extractor: impl ValueExtractor + 'static,
    ) -> Self {
        Self::from_arc(container_type, extracted_type_parameter, Arc::new(extractor))
    }

    pub fn from_arc(
        container_type: impl Into<TypeName>,
        extracted_type_parameter: ExtractedTypeParameter,
        extractor: Arc<dyn ValueExtractor>,
    ) -> Self {
        Self {
            key: ValueExtractorKey {
                container_type: container_type.into(),
                extracted_type_parameter,
            },
            extractor,
        }
    }

    pub fn key(&self) -> &ValueExtractorKey {
        &self.key
    }

    pub fn container_type(&self) -> &TypeName {
        &self.key.container_type
    }

    pub fn extracted_type_parameter(&self) -> ExtractedTypeParameter {
        self.key.extracted_type_parameter
    }

    pub fn extractor(&self) -> &dyn ValueExtractor {
        self.extractor.as_ref()
    }
}

impl fmt::Debug for ValueExtractorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueExtractorDescriptor")
            .field("container_type", &self.key.container_type)
            .field("extracted_type_parameter", &self.key.extracted_type_parameter)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ValueExtractorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.key.container_type, self.key.extracted_type_parameter
        )
    }
}
