//! Arena-backed object graph the validator walks.
//!
//! Objects live in an [`ObjectGraph`] and refer to each other through
//! [`ObjectId`]s, so self-referential graphs need no shared ownership and the
//! arena index doubles as object identity.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ValidatorError};
use crate::types::TypeName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Ref(ObjectId),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            Self::Ref(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(timestamp) => Some(*timestamp),
            _ => None,
        }
    }

    /// Numeric view of integers and decimals.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
            Self::Ref(_) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Timestamp(value) => write!(f, "{}", value.to_rfc3339()),
            Self::Ref(id) => write!(f, "{id}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::Ref(id)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Payload of a graph object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectData {
    /// A bean with named properties.
    Bean(IndexMap<String, Value>),
    /// Lists, sets and other iterables.
    Sequence(Vec<Value>),
    Array(Vec<Value>),
    /// Key/value entries in insertion order.
    Mapping(Vec<(Value, Value)>),
    /// An optional-like single value container; `Value::Null` when empty.
    Optional(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    type_name: TypeName,
    data: ObjectData,
}

impl Object {
    pub fn new(type_name: impl Into<TypeName>, data: ObjectData) -> Self {
        Self {
            type_name: type_name.into(),
            data,
        }
    }

    /// Runtime type of this object.
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn data(&self) -> &ObjectData {
        &self.data
    }

    pub fn is_bean(&self) -> bool {
        matches!(self.data, ObjectData::Bean(_))
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match &self.data {
            ObjectData::Bean(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Element count for containers, property count for beans.
    pub fn len(&self) -> usize {
        match &self.data {
            ObjectData::Bean(fields) => fields.len(),
            ObjectData::Sequence(values) | ObjectData::Array(values) => values.len(),
            ObjectData::Mapping(entries) => entries.len(),
            ObjectData::Optional(value) => usize::from(!value.is_null()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectGraph {
    objects: Vec<Object>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: Object) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn bean<I, K, V>(&mut self, type_name: impl Into<TypeName>, fields: I) -> ObjectId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let fields = fields
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        self.insert(Object::new(type_name, ObjectData::Bean(fields)))
    }

    pub fn sequence<I, V>(&mut self, type_name: impl Into<TypeName>, values: I) -> ObjectId
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(Object::new(type_name, ObjectData::Sequence(values)))
    }

    pub fn array<I, V>(&mut self, values: I) -> ObjectId
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(Object::new(TypeName::array(), ObjectData::Array(values)))
    }

    pub fn mapping<I, K, V>(&mut self, type_name: impl Into<TypeName>, entries: I) -> ObjectId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.insert(Object::new(type_name, ObjectData::Mapping(entries)))
    }

    pub fn optional(&mut self, value: impl Into<Value>) -> ObjectId {
        self.insert(Object::new("Optional", ObjectData::Optional(value.into())))
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0)
    }

    /// Like [`ObjectGraph::get`] but reports dangling references.
    pub fn object(&self, id: ObjectId) -> Result<&Object> {
        self.get(id)
            .ok_or(ValidatorError::UnknownObject { id: id.index() })
    }

    /// Object a value refers to, if it is a reference.
    pub fn resolve(&self, value: &Value) -> Result<Option<&Object>> {
        match value.as_object_id() {
            Some(id) => self.object(id).map(Some),
            None => Ok(None),
        }
    }

    /// Sets a bean property after construction, which is how cycles are wired.
    pub fn set_field(
        &mut self,
        id: ObjectId,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<()> {
        let object = self
            .objects
            .get_mut(id.0)
            .ok_or(ValidatorError::UnknownObject { id: id.index() })?;
        match &mut object.data {
            ObjectData::Bean(fields) => {
                fields.insert(name.into(), value.into());
                Ok(())
            }
            _ => Err(ValidatorError::config_error(format!(
                "object {id} of type {} is not a bean",
                object.type_name
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
