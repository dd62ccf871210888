use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::constraints::ConstraintValidator;
use crate::error::{Result, ValidatorError};
use crate::extraction::ValueExtractorDescriptor;
use crate::types::{Group, TypeName};

static MESSAGE_PARAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_.]+)\}").expect("message parameter pattern is valid"));

/// Static description of a declared constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDescriptor {
    kind: String,
    groups: Vec<Group>,
    message_template: String,
    #[serde(default)]
    attributes: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    unwrapping: bool,
}

impl ConstraintDescriptor {
    pub fn new(kind: impl Into<String>, message_template: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            groups: vec![Group::default_group()],
            message_template: message_template.into(),
            attributes: IndexMap::new(),
            unwrapping: false,
        }
    }

    /// Replaces the groups; an empty set means the `Default` group.
    pub fn with_groups<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<Group>,
    {
        let mut normalized: Vec<Group> = Vec::new();
        for group in groups.into_iter().map(Into::into) {
            if !normalized.contains(&group) {
                normalized.push(group);
            }
        }
        if normalized.is_empty() {
            normalized.push(Group::default_group());
        }
        self.groups = normalized;
        self
    }

    pub fn with_message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_unwrapping(mut self, unwrapping: bool) -> Self {
        self.unwrapping = unwrapping;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn message_template(&self) -> &str {
        &self.message_template
    }

    pub fn attributes(&self) -> &IndexMap<String, serde_json::Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }

    pub fn attribute_i64(&self, name: &str) -> Option<i64> {
        self.attribute(name).and_then(serde_json::Value::as_i64)
    }

    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(serde_json::Value::as_str)
    }

    /// Whether the constraint applies to the value held by the annotated
    /// container rather than to the container itself.
    pub fn is_unwrapping(&self) -> bool {
        self.unwrapping
    }

    /// First of the active `groups` this constraint belongs to.
    pub fn first_matching_group<'g>(&self, groups: &'g [Group]) -> Option<&'g Group> {
        groups.iter().find(|group| self.groups.contains(group))
    }

    /// Substitutes `{attribute}` placeholders with attribute values.
    /// Unknown placeholders are left untouched.
    pub fn interpolate(&self, template: &str) -> String {
        MESSAGE_PARAMETER
            .replace_all(template, |captures: &regex::Captures<'_>| {
                match self.attributes.get(&captures[1]) {
                    Some(serde_json::Value::String(text)) => text.clone(),
                    Some(value) => value.to_string(),
                    None => captures[0].to_string(),
                }
            })
            .into_owned()
    }
}

pub type ConstraintValidatorFactory = Arc<dyn Fn() -> Box<dyn ConstraintValidator> + Send + Sync>;

/// A constraint as declared on a bean, property or type argument: its
/// descriptor plus a factory for the validator that checks it.
#[derive(Clone)]
pub struct ConstraintDeclaration {
    descriptor: ConstraintDescriptor,
    validator_factory: ConstraintValidatorFactory,
}

impl ConstraintDeclaration {
    pub fn new<F, V>(descriptor: ConstraintDescriptor, validator_factory: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: ConstraintValidator + 'static,
    {
        Self {
            descriptor,
            validator_factory: Arc::new(move || Box::new(validator_factory())),
        }
    }

    pub fn groups<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<Group>,
    {
        self.descriptor = self.descriptor.with_groups(groups);
        self
    }

    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.descriptor = self.descriptor.with_message_template(template);
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.descriptor = self.descriptor.with_attribute(name, value);
        self
    }

    /// Applies the constraint to the value wrapped by the annotated element,
    /// e.g. the content of an `Optional<String>` property.
    pub fn unwrapped(mut self) -> Self {
        self.descriptor = self.descriptor.with_unwrapping(true);
        self
    }

    pub fn descriptor(&self) -> &ConstraintDescriptor {
        &self.descriptor
    }

    pub(crate) fn instantiate(&self) -> Box<dyn ConstraintValidator> {
        (self.validator_factory)()
    }
}

impl fmt::Debug for ConstraintDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintDeclaration")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Where a constraint was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintLocation {
    Bean { bean_type: TypeName },
    Property { bean_type: TypeName, property: String },
}

impl fmt::Display for ConstraintLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bean { bean_type } => write!(f, "{bean_type}"),
            Self::Property {
                bean_type,
                property,
            } => write!(f, "{bean_type}.{property}"),
        }
    }
}

/// One hop from a container into its elements.
#[derive(Debug, Clone)]
pub struct ExtractionStep {
    /// Container type as declared, used for path nodes.
    pub container: TypeName,
    pub type_argument_index: Option<usize>,
    pub candidates: Vec<Arc<ValueExtractorDescriptor>>,
}

/// Hops leading from a declared element to the values a container-element
/// constraint applies to. Empty for constraints on the element itself.
#[derive(Debug, Clone, Default)]
pub struct ValueExtractionPath {
    steps: Vec<ExtractionStep>,
}

impl ValueExtractionPath {
    pub fn new(steps: Vec<ExtractionStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[ExtractionStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A declared constraint bound to its initialized validator.
pub struct MetaConstraint {
    descriptor: ConstraintDescriptor,
    validator: Box<dyn ConstraintValidator>,
    location: ConstraintLocation,
    extraction_path: ValueExtractionPath,
}

impl MetaConstraint {
    /// Instantiates and initializes the validator of `declaration`.
    pub fn new(
        declaration: &ConstraintDeclaration,
        location: ConstraintLocation,
        extraction_path: ValueExtractionPath,
    ) -> Result<Self> {
        let mut validator = declaration.instantiate();
        validator
            .initialize(declaration.descriptor())
            .map_err(|source| {
                ValidatorError::config_error(format!(
                    "cannot initialize {} constraint on {}: {}",
                    declaration.descriptor().kind(),
                    location,
                    source
                ))
            })?;

        Ok(Self {
            descriptor: declaration.descriptor().clone(),
            validator,
            location,
            extraction_path,
        })
    }

    pub fn descriptor(&self) -> &ConstraintDescriptor {
        &self.descriptor
    }

    pub fn validator(&self) -> &dyn ConstraintValidator {
        self.validator.as_ref()
    }

    pub fn location(&self) -> &ConstraintLocation {
        &self.location
    }

    pub fn extraction_path(&self) -> &ValueExtractionPath {
        &self.extraction_path
    }

    pub fn is_container_element_constraint(&self) -> bool {
        !self.extraction_path.is_empty()
    }
}

impl fmt::Debug for MetaConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaConstraint")
            .field("kind", &self.descriptor.kind)
            .field("location", &self.location)
            .field("extraction_steps", &self.extraction_path.steps.len())
            .finish_non_exhaustive()
    }
}
