//! Constraint validators: the leaf checks the engine runs against values.
//!
//! Every built-in validator except [`NotNullValidator`], [`NotEmptyValidator`]
//! and [`NotBlankValidator`] treats `null` as valid.

pub mod null;
pub mod number;
pub mod pattern;
pub mod size;
pub mod time;

pub use null::{NotBlankValidator, NotEmptyValidator, NotNullValidator};
pub use number::{MaxValidator, MinValidator, PositiveValidator};
pub use pattern::PatternValidator;
pub use size::SizeValidator;
pub use time::{ClockProvider, FixedClock, FutureValidator, PastValidator, SystemClock};

use crate::error::BoxError;
use crate::metadata::{ConstraintDeclaration, ConstraintDescriptor};
use crate::types::{Object, ObjectGraph, Value};

/// Checks one constraint. Instances are created and initialized once per
/// declared constraint and then shared across validation calls.
pub trait ConstraintValidator: Send + Sync {
    /// Reads the constraint's attributes before first use.
    fn initialize(&mut self, _descriptor: &ConstraintDescriptor) -> Result<(), BoxError> {
        Ok(())
    }

    /// Whether `value` satisfies the constraint. An error aborts the whole
    /// validation call.
    fn is_valid(
        &self,
        value: &Value,
        context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, BoxError>;
}

/// Per-evaluation context handed to [`ConstraintValidator::is_valid`].
pub struct ConstraintValidatorContext<'a> {
    graph: Option<&'a ObjectGraph>,
    clock: &'a dyn ClockProvider,
    default_message_template: &'a str,
    default_violation_disabled: bool,
    message_templates: Vec<String>,
}

impl<'a> ConstraintValidatorContext<'a> {
    pub fn new(
        graph: Option<&'a ObjectGraph>,
        clock: &'a dyn ClockProvider,
        default_message_template: &'a str,
    ) -> Self {
        Self {
            graph,
            clock,
            default_message_template,
            default_violation_disabled: false,
            message_templates: Vec::new(),
        }
    }

    /// The graph being validated; absent when validating a detached value.
    pub fn graph(&self) -> Option<&'a ObjectGraph> {
        self.graph
    }

    /// Object a reference value points to.
    pub fn resolve(&self, value: &Value) -> Result<Option<&'a Object>, BoxError> {
        match (value.as_object_id(), self.graph) {
            (None, _) => Ok(None),
            (Some(_), Some(graph)) => Ok(graph.resolve(value)?),
            (Some(id), None) => Err(format!("cannot resolve {id} outside of an object graph").into()),
        }
    }

    pub fn clock(&self) -> &dyn ClockProvider {
        self.clock
    }

    pub fn default_message_template(&self) -> &str {
        self.default_message_template
    }

    /// Suppresses the violation built from the constraint's own message.
    pub fn disable_default_constraint_violation(&mut self) {
        self.default_violation_disabled = true;
    }

    /// Adds a violation with a custom message template.
    pub fn build_constraint_violation_with_template(&mut self, template: impl Into<String>) {
        self.message_templates.push(template.into());
    }

    /// Message templates of the violations to report for a failed check.
    pub(crate) fn into_message_templates(self) -> Vec<String> {
        let mut templates = Vec::with_capacity(self.message_templates.len() + 1);
        if !self.default_violation_disabled {
            templates.push(self.default_message_template.to_string());
        }
        templates.extend(self.message_templates);
        templates
    }
}

/// A built-in validator received a value kind it does not support.
#[derive(Debug, thiserror::Error)]
#[error("{constraint} does not support values of kind {kind}")]
pub struct UnsupportedValueType {
    pub constraint: &'static str,
    pub kind: &'static str,
}

impl UnsupportedValueType {
    pub fn boxed(constraint: &'static str, value: &Value) -> BoxError {
        Box::new(Self {
            constraint,
            kind: value.kind_name(),
        })
    }
}

pub fn not_null() -> ConstraintDeclaration {
    ConstraintDeclaration::new(
        ConstraintDescriptor::new("NotNull", "must not be null"),
        NotNullValidator::default,
    )
}

pub fn not_empty() -> ConstraintDeclaration {
    ConstraintDeclaration::new(
        ConstraintDescriptor::new("NotEmpty", "must not be empty"),
        NotEmptyValidator::default,
    )
}

pub fn not_blank() -> ConstraintDeclaration {
    ConstraintDeclaration::new(
        ConstraintDescriptor::new("NotBlank", "must not be blank"),
        NotBlankValidator::default,
    )
}

pub fn size(min: usize, max: usize) -> ConstraintDeclaration {
    ConstraintDeclaration::new(
        ConstraintDescriptor::new("Size", "size must be between {min} and {max}")
            .with_attribute("min", min)
            .with_attribute("max", max),
        SizeValidator::default,
    )
}

pub fn min(value: i64) -> ConstraintDeclaration {
    ConstraintDeclaration::new(
        ConstraintDescriptor::new("Min", "must be greater than or equal to {value}")
            .with_attribute("value", value),
        MinValidator::default,
    )
}

pub fn max(value: i64) -> ConstraintDeclaration {
    ConstraintDeclaration::new(
        ConstraintDescriptor::new("Max", "must be less than or equal to {value}")
            .with_attribute("value", value),
        MaxValidator::default,
    )
}

pub fn positive() -> ConstraintDeclaration {
    ConstraintDeclaration::new(
        ConstraintDescriptor::new("Positive", "must be greater than 0"),
        PositiveValidator::strict,
    )
}

pub fn positive_or_zero() -> ConstraintDeclaration {
    ConstraintDeclaration::new(
        ConstraintDescriptor::new("PositiveOrZero", "must be greater than or equal to 0"),
        PositiveValidator::or_zero,
    )
}

pub fn pattern(regexp: &str) -> ConstraintDeclaration {
    ConstraintDeclaration::new(
        ConstraintDescriptor::new("Pattern", "must match \"{regexp}\"")
            .with_attribute("regexp", regexp),
        PatternValidator::default,
    )
}

pub fn future() -> ConstraintDeclaration {
    ConstraintDeclaration::new(
        ConstraintDescriptor::new("Future", "must be a future date"),
        FutureValidator::default,
    )
}

pub fn past() -> ConstraintDeclaration {
    ConstraintDeclaration::new(
        ConstraintDescriptor::new("Past", "must be a past date"),
        PastValidator::default,
    )
}
