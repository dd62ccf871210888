use std::cmp::Ordering;

use crate::constraints::{ConstraintValidator, ConstraintValidatorContext, UnsupportedValueType};
use crate::error::BoxError;
use crate::metadata::ConstraintDescriptor;
use crate::types::Value;

/// Compares a numeric value against an integer bound. `NaN` compares as
/// `None`.
fn compare(
    constraint: &'static str,
    value: &Value,
    bound: i64,
) -> Result<Option<Ordering>, BoxError> {
    match value {
        Value::Integer(number) => Ok(Some(number.cmp(&bound))),
        Value::Decimal(number) => Ok(compare_decimal(*number, bound)),
        _ => Err(UnsupportedValueType::boxed(constraint, value)),
    }
}

/// Exact comparison of a float with an `i64`; the bound is never rounded
/// to the nearest `f64`.
fn compare_decimal(number: f64, bound: i64) -> Option<Ordering> {
    // 2^63 and -2^63 are exactly representable.
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if number.is_nan() {
        return None;
    }
    if number >= UPPER {
        return Some(Ordering::Greater);
    }
    if number < -UPPER {
        return Some(Ordering::Less);
    }
    let whole = number.trunc() as i64;
    Some(whole.cmp(&bound).then_with(|| {
        let fraction = number.fract();
        if fraction > 0.0 {
            Ordering::Greater
        } else if fraction < 0.0 {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }))
}

fn required_bound(descriptor: &ConstraintDescriptor) -> Result<i64, BoxError> {
    descriptor
        .attribute_i64("value")
        .ok_or_else(|| {
            format!("{} requires an integer 'value' attribute", descriptor.kind()).into()
        })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MinValidator {
    min: i64,
}

impl ConstraintValidator for MinValidator {
    fn initialize(&mut self, descriptor: &ConstraintDescriptor) -> Result<(), BoxError> {
        self.min = required_bound(descriptor)?;
        Ok(())
    }

    fn is_valid(
        &self,
        value: &Value,
        _context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, BoxError> {
        if value.is_null() {
            return Ok(true);
        }
        Ok(matches!(
            compare("Min", value, self.min)?,
            Some(Ordering::Greater | Ordering::Equal)
        ))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MaxValidator {
    max: i64,
}

impl ConstraintValidator for MaxValidator {
    fn initialize(&mut self, descriptor: &ConstraintDescriptor) -> Result<(), BoxError> {
        self.max = required_bound(descriptor)?;
        Ok(())
    }

    fn is_valid(
        &self,
        value: &Value,
        _context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, BoxError> {
        if value.is_null() {
            return Ok(true);
        }
        Ok(matches!(
            compare("Max", value, self.max)?,
            Some(Ordering::Less | Ordering::Equal)
        ))
    }
}

/// Strictly positive, or positive-or-zero when `strict` is false.
#[derive(Debug, Clone, Copy)]
pub struct PositiveValidator {
    strict: bool,
}

impl PositiveValidator {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn or_zero() -> Self {
        Self { strict: false }
    }
}

impl ConstraintValidator for PositiveValidator {
    fn is_valid(
        &self,
        value: &Value,
        _context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, BoxError> {
        if value.is_null() {
            return Ok(true);
        }
        let constraint = if self.strict { "Positive" } else { "PositiveOrZero" };
        Ok(match compare(constraint, value, 0)? {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => !self.strict,
            _ => false,
        })
    }
}
