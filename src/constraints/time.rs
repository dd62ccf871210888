use chrono::{DateTime, Utc};
use std::fmt::Debug;

use crate::constraints::{ConstraintValidator, ConstraintValidatorContext, UnsupportedValueType};
use crate::error::BoxError;
use crate::types::Value;

/// Source of the reference instant for time-based constraints.
pub trait ClockProvider: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockProvider for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl ClockProvider for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn timestamp(constraint: &'static str, value: &Value) -> Result<DateTime<Utc>, BoxError> {
    value
        .as_timestamp()
        .ok_or_else(|| UnsupportedValueType::boxed(constraint, value))
}

/// Instant strictly after the clock's current time.
#[derive(Debug, Default, Clone, Copy)]
pub struct FutureValidator;

impl ConstraintValidator for FutureValidator {
    fn is_valid(
        &self,
        value: &Value,
        context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, BoxError> {
        if value.is_null() {
            return Ok(true);
        }
        Ok(timestamp("Future", value)? > context.clock().now())
    }
}

/// Instant strictly before the clock's current time.
#[derive(Debug, Default, Clone, Copy)]
pub struct PastValidator;

impl ConstraintValidator for PastValidator {
    fn is_valid(
        &self,
        value: &Value,
        context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, BoxError> {
        if value.is_null() {
            return Ok(true);
        }
        Ok(timestamp("Past", value)? < context.clock().now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{self, test_support::check_in};
    use chrono::{Duration, TimeZone};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_future() {
        let clock = clock();
        let future = constraints::future();
        let later = Value::from(clock.0 + Duration::seconds(1));
        assert!(check_in(&future, &later, None, &clock));
        assert!(!check_in(&future, &Value::from(clock.0), None, &clock));
        assert!(check_in(&future, &Value::Null, None, &clock));
    }

    #[test]
    fn test_past() {
        let clock = clock();
        let past = constraints::past();
        let earlier = Value::from(clock.0 - Duration::days(1));
        assert!(check_in(&past, &earlier, None, &clock));
        assert!(!check_in(&past, &Value::from(clock.0), None, &clock));
    }
}
