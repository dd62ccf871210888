use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ValidatorError};
use crate::types::Group;

/// A declared `from -> to` group conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupConversion {
    pub from: Group,
    pub to: Group,
}

impl GroupConversion {
    pub fn new(from: impl Into<Group>, to: impl Into<Group>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for GroupConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Group remapping applied when validation crosses a cascade boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupConversionHelper {
    conversions: IndexMap<Group, Group>,
}

impl GroupConversionHelper {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a helper from declared conversions.
    ///
    /// Two conversions sharing a source group are rejected. A conversion onto
    /// itself is kept but logged, since it has no effect.
    pub fn of(conversions: &[GroupConversion]) -> Result<Self> {
        let mut mapped = IndexMap::with_capacity(conversions.len());
        for conversion in conversions {
            if conversion.from == conversion.to {
                tracing::warn!(
                    "Redundant group conversion {}: source and target are the same group",
                    conversion
                );
            }
            if let Some(existing) = mapped.insert(conversion.from.clone(), conversion.to.clone()) {
                return Err(ValidatorError::invalid_group_conversion(
                    "group conversion helper",
                    format!(
                        "group {} is converted more than once ({} and {})",
                        conversion.from, existing, conversion.to
                    ),
                ));
            }
        }
        Ok(Self {
            conversions: mapped,
        })
    }

    /// Target of `group`, or `group` itself when it is not converted.
    pub fn convert_group(&self, group: &Group) -> Group {
        self.conversions
            .get(group)
            .cloned()
            .unwrap_or_else(|| group.clone())
    }

    /// Image of `groups` under [`Self::convert_group`]; duplicates collapse and
    /// first-occurrence order is kept.
    pub fn convert_groups(&self, groups: &[Group]) -> Vec<Group> {
        let mut converted: Vec<Group> = Vec::with_capacity(groups.len());
        for group in groups {
            let target = self.convert_group(group);
            if !converted.contains(&target) {
                converted.push(target);
            }
        }
        converted
    }

    pub fn as_descriptors(&self) -> Vec<GroupConversion> {
        self.conversions
            .iter()
            .map(|(from, to)| GroupConversion::new(from.clone(), to.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.conversions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conversions.len()
    }
}
