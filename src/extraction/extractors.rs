//! Value extractors: strategies for reaching the elements held by a container.

use std::borrow::Cow;
use std::fmt;

use crate::types::{ElementAccess, Object, ObjectData, Value};

/// One element produced by a [`ValueExtractor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedValue<'g> {
    /// Name of the container element node, e.g. `<list element>`.
    pub name: Cow<'static, str>,
    pub access: ElementAccess,
    pub value: &'g Value,
}

impl<'g> ExtractedValue<'g> {
    pub fn indexed(name: &'static str, index: usize, value: &'g Value) -> Self {
        Self {
            name: Cow::Borrowed(name),
            access: ElementAccess::Indexed(index),
            value,
        }
    }

    pub fn keyed(name: &'static str, key: &Value, value: &'g Value) -> Self {
        Self {
            name: Cow::Borrowed(name),
            access: ElementAccess::Keyed(key.clone()),
            value,
        }
    }

    pub fn iterable(name: &'static str, value: &'g Value) -> Self {
        Self {
            name: Cow::Borrowed(name),
            access: ElementAccess::Iterable,
            value,
        }
    }

    pub fn unwrapped(name: impl Into<Cow<'static, str>>, value: &'g Value) -> Self {
        Self {
            name: name.into(),
            access: ElementAccess::Unwrapped,
            value,
        }
    }
}

/// Lazy sequence of extracted elements borrowed from the validated graph.
pub type ExtractedValues<'g> = Box<dyn Iterator<Item = ExtractedValue<'g>> + 'g>;

/// Produces the logical elements of a container object.
///
/// Implementations receive the container as it is stored in the graph and
/// must tolerate payloads they do not understand by yielding nothing.
pub trait ValueExtractor: Send + Sync {
    fn extract<'g>(&self, container: &'g Object) -> ExtractedValues<'g>;
}

fn nothing<'g>() -> ExtractedValues<'g> {
    Box::new(std::iter::empty())
}

/// Indexed elements of lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListValueExtractor;

impl ValueExtractor for ListValueExtractor {
    fn extract<'g>(&self, container: &'g Object) -> ExtractedValues<'g> {
        match container.data() {
            ObjectData::Sequence(values) => Box::new(
                values
                    .iter()
                    .enumerate()
                    .map(|(index, value)| ExtractedValue::indexed("<list element>", index, value)),
            ),
            _ => nothing(),
        }
    }
}

/// Unordered elements of any iterable.
#[derive(Debug, Default, Clone, Copy)]
pub struct IterableValueExtractor;

impl ValueExtractor for IterableValueExtractor {
    fn extract<'g>(&self, container: &'g Object) -> ExtractedValues<'g> {
        match container.data() {
            ObjectData::Sequence(values) | ObjectData::Array(values) => Box::new(
                values
                    .iter()
                    .map(|value| ExtractedValue::iterable("<iterable element>", value)),
            ),
            _ => nothing(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MapValueExtractor;

impl ValueExtractor for MapValueExtractor {
    fn extract<'g>(&self, container: &'g Object) -> ExtractedValues<'g> {
        match container.data() {
            ObjectData::Mapping(entries) => Box::new(
                entries
                    .iter()
                    .map(|(key, value)| ExtractedValue::keyed("<map value>", key, value)),
            ),
            _ => nothing(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MapKeyExtractor;

impl ValueExtractor for MapKeyExtractor {
    fn extract<'g>(&self, container: &'g Object) -> ExtractedValues<'g> {
        match container.data() {
            ObjectData::Mapping(entries) => Box::new(
                entries
                    .iter()
                    .map(|(key, _)| ExtractedValue::keyed("<map key>", key, key)),
            ),
            _ => nothing(),
        }
    }
}

/// The wrapped value of an optional; an empty optional yields `Value::Null`,
/// which the engine treats as valid for cascading.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptionalValueExtractor;

impl ValueExtractor for OptionalValueExtractor {
    fn extract<'g>(&self, container: &'g Object) -> ExtractedValues<'g> {
        match container.data() {
            ObjectData::Optional(value) => Box::new(std::iter::once(ExtractedValue::unwrapped(
                "<optional element>",
                value,
            ))),
            _ => nothing(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArrayElementExtractor;

impl ValueExtractor for ArrayElementExtractor {
    fn extract<'g>(&self, container: &'g Object) -> ExtractedValues<'g> {
        match container.data() {
            ObjectData::Array(values) => Box::new(
                values
                    .iter()
                    .enumerate()
                    .map(|(index, value)| ExtractedValue::indexed("<array element>", index, value)),
            ),
            _ => nothing(),
        }
    }
}

/// Adapts a closure into a [`ValueExtractor`], for custom container types.
pub struct FnValueExtractor<F> {
    extract: F,
}

impl<F> FnValueExtractor<F>
where
    F: for<'g> Fn(&'g Object) -> Vec<ExtractedValue<'g>> + Send + Sync,
{
    pub fn new(extract: F) -> Self {
        Self { extract }
    }
}

impl<F> ValueExtractor for FnValueExtractor<F>
where
    F: for<'g> Fn(&'g Object) -> Vec<ExtractedValue<'g>> + Send + Sync,
{
    fn extract<'g>(&self, container: &'g Object) -> ExtractedValues<'g> {
        Box::new((self.extract)(container).into_iter())
    }
}

impl<F> fmt::Debug for FnValueExtractor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValueExtractor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectGraph;

    #[test]
    fn test_list_extractor_indexes_elements() {
        let mut graph = ObjectGraph::new();
        let list = graph.sequence("List", ["a", "b"]);
        let object = graph.object(list).unwrap();

        let extracted: Vec<_> = ListValueExtractor.extract(object).collect();
        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[1].access, ElementAccess::Indexed(1));
        assert_eq!(extracted[1].value, &Value::from("b"));
        assert_eq!(extracted[1].name, "<list element>");
    }

    #[test]
    fn test_map_extractors() {
        let mut graph = ObjectGraph::new();
        let map = graph.mapping("Map", [("k1", 1), ("k2", 2)]);
        let object = graph.object(map).unwrap();

        let values: Vec<_> = MapValueExtractor.extract(object).collect();
        assert_eq!(values[0].access, ElementAccess::Keyed(Value::from("k1")));
        assert_eq!(values[0].value, &Value::from(1));

        let keys: Vec<_> = MapKeyExtractor.extract(object).collect();
        assert_eq!(keys[1].value, &Value::from("k2"));
    }

    #[test]
    fn test_mismatched_payload_yields_nothing() {
        let mut graph = ObjectGraph::new();
        let bean = graph.bean("Item", [("name", "x")]);
        let object = graph.object(bean).unwrap();
        assert_eq!(ListValueExtractor.extract(object).count(), 0);
        assert_eq!(OptionalValueExtractor.extract(object).count(), 0);
    }

    #[test]
    fn test_fn_extractor() {
        let mut graph = ObjectGraph::new();
        let pair = graph.bean("Pair", [("left", "l"), ("right", "r")]);
        let object = graph.object(pair).unwrap();

        let extractor = FnValueExtractor::new(|container: &Object| {
            container
                .field("left")
                .map(|value| ExtractedValue::unwrapped("<left>", value))
                .into_iter()
                .collect()
        });
        let extracted: Vec<_> = extractor.extract(object).collect();
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].value, &Value::from("l"));
    }
}
