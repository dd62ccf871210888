use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidatorError};
use crate::types::Group;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Stop a validation call after its first violation.
    pub fail_fast: bool,
    /// Maximum number of nested beans entered through cascading.
    pub max_cascade_depth: usize,
    /// Groups used when a call names none.
    pub default_groups: Vec<Group>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            max_cascade_depth: 256,
            default_groups: vec![Group::default_group()],
        }
    }
}

impl ValidatorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_max_cascade_depth(mut self, depth: usize) -> Self {
        self.max_cascade_depth = depth;
        self
    }

    pub fn with_default_groups<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<Group>,
    {
        self.default_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_cascade_depth == 0 {
            return Err(ValidatorError::config_error(
                "max_cascade_depth must be at least 1",
            ));
        }
        if self.default_groups.is_empty() {
            return Err(ValidatorError::config_error(
                "default_groups must name at least one group",
            ));
        }
        Ok(())
    }
}
