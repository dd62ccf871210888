use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const DEFAULT_GROUP: &str = "Default";

/// A named validation group.
///
/// Groups are cheap to clone; two groups are the same group when their names
/// are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Group(Arc<str>);

impl Group {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The implicit group every constraint without explicit groups belongs to.
    pub fn default_group() -> Self {
        Self::new(DEFAULT_GROUP)
    }

    pub fn is_default(&self) -> bool {
        &*self.0 == DEFAULT_GROUP
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::default_group()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Group {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Deduplicates `groups` keeping first-occurrence order; an empty input
/// yields `fallback`.
pub fn normalize_groups(groups: &[Group], fallback: &[Group]) -> Vec<Group> {
    let source = if groups.is_empty() { fallback } else { groups };
    let mut normalized: Vec<Group> = Vec::with_capacity(source.len());
    for group in source {
        if !normalized.contains(group) {
            normalized.push(group.clone());
        }
    }
    if normalized.is_empty() {
        normalized.push(Group::default_group());
    }
    normalized
}
