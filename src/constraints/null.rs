use crate::constraints::{ConstraintValidator, ConstraintValidatorContext, UnsupportedValueType};
use crate::error::BoxError;
use crate::types::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct NotNullValidator;

impl ConstraintValidator for NotNullValidator {
    fn is_valid(
        &self,
        value: &Value,
        _context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, BoxError> {
        Ok(!value.is_null())
    }
}

/// Text with at least one character, or a container with at least one element.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotEmptyValidator;

impl ConstraintValidator for NotEmptyValidator {
    fn is_valid(
        &self,
        value: &Value,
        context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, BoxError> {
        match value {
            Value::Null => Ok(false),
            Value::Text(text) => Ok(!text.is_empty()),
            Value::Ref(_) => match context.resolve(value)? {
                Some(object) if !object.is_bean() => Ok(!object.is_empty()),
                _ => Err(UnsupportedValueType::boxed("NotEmpty", value)),
            },
            _ => Err(UnsupportedValueType::boxed("NotEmpty", value)),
        }
    }
}

/// Text containing at least one non-whitespace character.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotBlankValidator;

impl ConstraintValidator for NotBlankValidator {
    fn is_valid(
        &self,
        value: &Value,
        _context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, BoxError> {
        match value {
            Value::Null => Ok(false),
            Value::Text(text) => Ok(!text.trim().is_empty()),
            _ => Err(UnsupportedValueType::boxed("NotBlank", value)),
        }
    }
}
