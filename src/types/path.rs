use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{TypeName, Value};

/// How a container element was reached from its container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementAccess {
    /// Positional access into a list or array.
    Indexed(usize),
    /// Access through a mapping key.
    Keyed(Value),
    /// Member of an unordered iterable.
    Iterable,
    /// The value held by an optional-like wrapper.
    Unwrapped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathNode {
    Property {
        name: String,
    },
    ContainerElement {
        /// Node name such as `<list element>` or `<map value>`.
        name: String,
        container: TypeName,
        type_argument_index: Option<usize>,
        access: ElementAccess,
    },
    /// Entry into a cascaded bean.
    Bean,
}

impl PathNode {
    pub fn property(name: impl Into<String>) -> Self {
        Self::Property { name: name.into() }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Property { name } | Self::ContainerElement { name, .. } => Some(name),
            Self::Bean => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::ContainerElement {
                access: ElementAccess::Indexed(index),
                ..
            } => Some(*index),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&Value> {
        match self {
            Self::ContainerElement {
                access: ElementAccess::Keyed(key),
                ..
            } => Some(key),
            _ => None,
        }
    }
}

/// Navigation steps from the validation root to a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPath {
    nodes: Vec<PathNode>,
}

impl PropertyPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: PathNode) {
        self.nodes.push(node);
    }

    pub fn pop(&mut self) -> Option<PathNode> {
        self.nodes.pop()
    }

    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    pub fn leaf(&self) -> Option<&PathNode> {
        self.nodes.last()
    }

    pub fn is_root(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Names of the property nodes, in order.
    pub fn property_names(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                PathNode::Property { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote_property = false;
        for node in &self.nodes {
            match node {
                PathNode::Property { name } => {
                    if wrote_property {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                    wrote_property = true;
                }
                PathNode::ContainerElement { access, .. } => match access {
                    ElementAccess::Indexed(index) => write!(f, "[{index}]")?,
                    ElementAccess::Keyed(key) => write!(f, "[{key}]")?,
                    ElementAccess::Iterable => f.write_str("[]")?,
                    ElementAccess::Unwrapped => {}
                },
                PathNode::Bean => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(access: ElementAccess) -> PathNode {
        PathNode::ContainerElement {
            name: "<list element>".to_string(),
            container: TypeName::new("List"),
            type_argument_index: Some(0),
            access,
        }
    }

    #[test]
    fn test_display() {
        let mut path = PropertyPath::root();
        path.push(PathNode::property("orders"));
        path.push(element(ElementAccess::Indexed(2)));
        path.push(PathNode::Bean);
        path.push(PathNode::property("lines"));
        path.push(element(ElementAccess::Keyed(Value::from("sku-1"))));
        path.push(element(ElementAccess::Unwrapped));
        assert_eq!(path.to_string(), "orders[2].lines[sku-1]");
        assert_eq!(path.property_names(), vec!["orders", "lines"]);
    }

    #[test]
    fn test_push_pop() {
        let mut path = PropertyPath::root();
        assert!(path.is_root());
        path.push(PathNode::property("a"));
        path.push(element(ElementAccess::Indexed(0)));
        assert_eq!(path.leaf().and_then(PathNode::index), Some(0));
        path.pop();
        assert_eq!(path.to_string(), "a");
    }
}
