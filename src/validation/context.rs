use crate::types::{Group, ObjectGraph, ObjectId, PathNode, PropertyPath, TypeName};
use crate::validation::{ConstraintViolation, ValidationResult};

/// State of one top-level validation call.
///
/// `processing` holds the `(object, group)` pairs of the beans currently on
/// the traversal stack; it is how cycles are cut.
pub(crate) struct ValidationContext<'g> {
    graph: Option<&'g ObjectGraph>,
    root_type: TypeName,
    path: PropertyPath,
    violations: Vec<ConstraintViolation>,
    processing: Vec<(ObjectId, Group)>,
    depth: usize,
    fail_fast: bool,
}

impl<'g> ValidationContext<'g> {
    pub fn new(graph: Option<&'g ObjectGraph>, root_type: TypeName, fail_fast: bool) -> Self {
        Self {
            graph,
            root_type,
            path: PropertyPath::root(),
            violations: Vec::new(),
            processing: Vec::new(),
            depth: 0,
            fail_fast,
        }
    }

    pub fn graph(&self) -> Option<&'g ObjectGraph> {
        self.graph
    }

    pub fn root_type(&self) -> &TypeName {
        &self.root_type
    }

    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    pub fn push_path(&mut self, node: PathNode) {
        self.path.push(node);
    }

    pub fn pop_path(&mut self) {
        self.path.pop();
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Marks `object` as being validated under those of `groups` it is not
    /// already being validated under, and returns them. Empty when every
    /// pair is already on the stack.
    pub fn enter_bean(&mut self, object: ObjectId, groups: &[Group]) -> Vec<Group> {
        let fresh: Vec<Group> = groups
            .iter()
            .filter(|group| {
                !self
                    .processing
                    .iter()
                    .any(|(id, active)| *id == object && active == *group)
            })
            .cloned()
            .collect();
        if !fresh.is_empty() {
            self.processing
                .extend(fresh.iter().map(|group| (object, group.clone())));
            self.depth += 1;
        }
        fresh
    }

    /// Undoes the matching [`Self::enter_bean`] that returned `entered` groups.
    pub fn leave_bean(&mut self, entered: usize) {
        let remaining = self.processing.len().saturating_sub(entered);
        self.processing.truncate(remaining);
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn add_violation(&mut self, violation: ConstraintViolation) {
        self.violations.push(violation);
    }

    pub fn should_stop(&self) -> bool {
        self.fail_fast && !self.violations.is_empty()
    }

    pub fn into_result(self) -> ValidationResult {
        ValidationResult::from_violations(self.violations)
    }
}
