use regex::Regex;

use crate::constraints::{ConstraintValidator, ConstraintValidatorContext, UnsupportedValueType};
use crate::error::BoxError;
use crate::metadata::ConstraintDescriptor;
use crate::types::Value;

/// Text matching the `regexp` attribute in full.
#[derive(Debug, Default, Clone)]
pub struct PatternValidator {
    regex: Option<Regex>,
}

impl ConstraintValidator for PatternValidator {
    fn initialize(&mut self, descriptor: &ConstraintDescriptor) -> Result<(), BoxError> {
        let pattern = descriptor
            .attribute_str("regexp")
            .ok_or("Pattern requires a 'regexp' attribute")?;
        self.regex = Some(Regex::new(&format!("^(?:{pattern})$"))?);
        Ok(())
    }

    fn is_valid(
        &self,
        value: &Value,
        _context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, BoxError> {
        let Some(regex) = &self.regex else {
            return Err("Pattern validator used before initialization".into());
        };
        match value {
            Value::Null => Ok(true),
            Value::Text(text) => Ok(regex.is_match(text)),
            _ => Err(UnsupportedValueType::boxed("Pattern", value)),
        }
    }
}
