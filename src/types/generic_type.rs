//! Generic type expressions.
//!
//! The engine has no runtime reflection to lean on, so declared types are
//! carried as explicit expressions: a raw type name plus its type arguments
//! (`Map<String, List<Optional<Item>>>`), or an array of a component type
//! (`Item[]`).

use crate::error::{Result, ValidatorError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const ARRAY_TYPE_NAME: &str = "[]";

/// Interned raw type name, e.g. `List` or `Order`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(Arc<str>);

impl TypeName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Raw name shared by every array type.
    pub fn array() -> Self {
        Self::new(ARRAY_TYPE_NAME)
    }

    pub fn is_array(&self) -> bool {
        &*self.0 == ARRAY_TYPE_NAME
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A (possibly parameterized) type as written at a declaration site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenericType {
    Class {
        raw: TypeName,
        arguments: Vec<GenericType>,
    },
    Array(Box<GenericType>),
}

impl GenericType {
    pub fn class(raw: impl Into<TypeName>) -> Self {
        Self::Class {
            raw: raw.into(),
            arguments: Vec::new(),
        }
    }

    pub fn parameterized(raw: impl Into<TypeName>, arguments: Vec<GenericType>) -> Self {
        Self::Class {
            raw: raw.into(),
            arguments,
        }
    }

    pub fn array_of(component: GenericType) -> Self {
        Self::Array(Box::new(component))
    }

    /// Parses the textual form, e.g. `Map<String, List<Item>>` or `Item[][]`.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = TypeParser::new(input);
        let parsed = parser.parse_type()?;
        parser.skip_whitespace();
        if !parser.is_at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(parsed)
    }

    /// The type with its type arguments erased.
    pub fn raw_type(&self) -> TypeName {
        match self {
            Self::Class { raw, .. } => raw.clone(),
            Self::Array(_) => TypeName::array(),
        }
    }

    /// Type arguments in declaration order; an array exposes its component
    /// type as its single argument.
    pub fn type_arguments(&self) -> &[GenericType] {
        match self {
            Self::Class { arguments, .. } => arguments,
            Self::Array(component) => std::slice::from_ref(component.as_ref()),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn is_parameterized(&self) -> bool {
        !self.type_arguments().is_empty()
    }

    /// Type argument reached by following `indices` from this type.
    pub fn type_argument_at(&self, indices: &[usize]) -> Option<&GenericType> {
        indices
            .iter()
            .try_fold(self, |current, &index| current.type_arguments().get(index))
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { raw, arguments } => {
                write!(f, "{raw}")?;
                if !arguments.is_empty() {
                    f.write_str("<")?;
                    for (i, argument) in arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{argument}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Array(component) => write!(f, "{component}[]"),
        }
    }
}

/// Identifies the generic slot a piece of cascading metadata describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeParameter {
    /// The annotated element itself rather than one of its type arguments.
    AnnotatedObject,
    /// The component of an array.
    ArrayElement,
    /// The `index`-th type parameter declared by `owner`.
    Declared {
        owner: TypeName,
        index: usize,
        name: String,
    },
}

impl TypeParameter {
    pub fn declared(owner: impl Into<TypeName>, index: usize, name: impl Into<String>) -> Self {
        Self::Declared {
            owner: owner.into(),
            index,
            name: name.into(),
        }
    }

    pub fn is_annotated_object(&self) -> bool {
        matches!(self, Self::AnnotatedObject)
    }

    pub fn is_array_element(&self) -> bool {
        matches!(self, Self::ArrayElement)
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Declared { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for TypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnnotatedObject => f.write_str("<annotated object>"),
            Self::ArrayElement => f.write_str("<array element>"),
            Self::Declared { name, .. } => f.write_str(name),
        }
    }
}

struct TypeParser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> TypeParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn parse_type(&mut self) -> Result<GenericType> {
        self.skip_whitespace();
        let raw = self.parse_identifier()?;
        self.skip_whitespace();

        let mut arguments = Vec::new();
        if self.consume('<') {
            loop {
                arguments.push(self.parse_type()?);
                self.skip_whitespace();
                if self.consume(',') {
                    continue;
                }
                if self.consume('>') {
                    break;
                }
                return Err(self.error("expected ',' or '>'"));
            }
        }

        let mut parsed = GenericType::Class {
            raw: TypeName::new(raw),
            arguments,
        };
        loop {
            self.skip_whitespace();
            if !self.input[self.position..].starts_with(ARRAY_TYPE_NAME) {
                break;
            }
            self.position += ARRAY_TYPE_NAME.len();
            parsed = GenericType::array_of(parsed);
        }
        Ok(parsed)
    }

    fn parse_identifier(&mut self) -> Result<&'a str> {
        let start = self.position;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | ':') {
                self.position += c.len_utf8();
            } else {
                break;
            }
        }
        if start == self.position {
            return Err(self.error("expected a type name"));
        }
        let input = self.input;
        Ok(&input[start..self.position])
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn consume(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.position += c.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn error(&self, message: &str) -> ValidatorError {
        ValidatorError::type_parse(self.input, format!("{message} at offset {}", self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_generic() {
        let parsed = GenericType::parse("Map<String, List<Optional<Item>>>").unwrap();
        assert_eq!(parsed.raw_type(), TypeName::new("Map"));
        assert_eq!(parsed.type_arguments().len(), 2);
        assert_eq!(
            parsed.type_argument_at(&[1, 0, 0]),
            Some(&GenericType::class("Item"))
        );
        assert_eq!(parsed.to_string(), "Map<String, List<Optional<Item>>>");
    }

    #[test]
    fn test_parse_arrays() {
        let parsed = GenericType::parse("List<Item>[]").unwrap();
        assert!(parsed.is_array());
        assert_eq!(parsed.raw_type(), TypeName::array());
        assert_eq!(parsed.type_arguments()[0].raw_type(), TypeName::new("List"));
        assert_eq!(parsed.to_string(), "List<Item>[]");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            GenericType::parse("List<Item"),
            Err(ValidatorError::TypeParse { .. })
        ));
        assert!(GenericType::parse("").is_err());
        assert!(GenericType::parse("List<Item> trailing").is_err());
    }

    #[test]
    fn test_type_parameter_display() {
        assert_eq!(TypeParameter::AnnotatedObject.to_string(), "<annotated object>");
        assert_eq!(TypeParameter::ArrayElement.to_string(), "<array element>");
        assert_eq!(TypeParameter::declared("Map", 1, "V").to_string(), "V");
        assert_eq!(TypeParameter::declared("Map", 1, "V").index(), Some(1));
    }
}
