use crate::constraints::{ConstraintValidator, ConstraintValidatorContext, UnsupportedValueType};
use crate::error::BoxError;
use crate::metadata::ConstraintDescriptor;
use crate::types::Value;

/// Character count of text, or element count of a container, within
/// `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct SizeValidator {
    min: usize,
    max: usize,
}

impl Default for SizeValidator {
    fn default() -> Self {
        Self {
            min: 0,
            max: i32::MAX as usize,
        }
    }
}

impl ConstraintValidator for SizeValidator {
    fn initialize(&mut self, descriptor: &ConstraintDescriptor) -> Result<(), BoxError> {
        let bound = |name: &str, default: usize| -> Result<usize, BoxError> {
            match descriptor.attribute_i64(name) {
                Some(value) => usize::try_from(value)
                    .map_err(|_| format!("{name} must not be negative, got {value}").into()),
                None => Ok(default),
            }
        };
        self.min = bound("min", self.min)?;
        self.max = bound("max", self.max)?;
        if self.max < self.min {
            return Err(format!("max {} is lower than min {}", self.max, self.min).into());
        }
        Ok(())
    }

    fn is_valid(
        &self,
        value: &Value,
        context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, BoxError> {
        let length = match value {
            Value::Null => return Ok(true),
            Value::Text(text) => text.chars().count(),
            Value::Ref(_) => match context.resolve(value)? {
                Some(object) if !object.is_bean() => object.len(),
                _ => return Err(UnsupportedValueType::boxed("Size", value)),
            },
            _ => return Err(UnsupportedValueType::boxed("Size", value)),
        };
        Ok((self.min..=self.max).contains(&length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::test_support::{check, check_in};
    use crate::constraints::{self, SystemClock};
    use crate::types::ObjectGraph;

    #[test]
    fn test_text_length() {
        let size = constraints::size(2, 3);
        assert!(check(&size, &Value::Null));
        assert!(!check(&size, &Value::from("a")));
        assert!(check(&size, &Value::from("äö")));
        assert!(!check(&size, &Value::from("abcd")));
    }

    #[test]
    fn test_container_length() {
        let size = constraints::size(1, 2);
        let mut graph = ObjectGraph::new();
        let list = graph.sequence("List", [1, 2, 3]);
        assert!(!check_in(&size, &Value::from(list), Some(&graph), &SystemClock));
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let declaration = constraints::size(5, 1);
        let mut validator = SizeValidator::default();
        assert!(validator.initialize(declaration.descriptor()).is_err());
    }
}
