use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Group, ObjectId, PropertyPath, TypeName, Value};

/// A constraint that failed for one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Message with `{attribute}` placeholders substituted.
    pub message: String,
    pub message_template: String,
    pub property_path: PropertyPath,
    pub invalid_value: Value,
    /// Active group that selected the constraint.
    pub group: Group,
    pub constraint_kind: String,
    pub root_type: TypeName,
    /// Bean that holds the invalid value, when validating a graph.
    pub leaf_bean: Option<ObjectId>,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.property_path.is_root() {
            write!(f, "{}: {}", self.root_type, self.message)
        } else {
            write!(f, "{}: {}", self.property_path, self.message)
        }
    }
}

/// Outcome of a validation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub violations: Vec<ConstraintViolation>,
}

impl ValidationResult {
    pub fn from_violations(violations: Vec<ConstraintViolation>) -> Self {
        Self { violations }
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConstraintViolation> {
        self.violations.iter()
    }

    /// Violations whose rendered property path equals `path`.
    pub fn at_path(&self, path: &str) -> Vec<&ConstraintViolation> {
        self.violations
            .iter()
            .filter(|violation| violation.property_path.to_string() == path)
            .collect()
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.violations.extend(other.violations);
    }

    pub fn into_violations(self) -> Vec<ConstraintViolation> {
        self.violations
    }
}

impl IntoIterator for ValidationResult {
    type Item = ConstraintViolation;
    type IntoIter = std::vec::IntoIter<ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = &'a ConstraintViolation;
    type IntoIter = std::slice::Iter<'a, ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
