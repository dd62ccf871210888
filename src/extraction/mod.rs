pub mod descriptor;
pub mod extractors;
pub mod registry;

pub use descriptor::{ExtractedTypeParameter, ValueExtractorDescriptor, ValueExtractorKey};
pub use extractors::{
    ArrayElementExtractor, ExtractedValue, ExtractedValues, FnValueExtractor,
    IterableValueExtractor, ListValueExtractor, MapKeyExtractor, MapValueExtractor,
    OptionalValueExtractor, ValueExtractor,
};
pub use registry::ValueExtractorRegistry;
