use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, ValidatorError};
use crate::types::{Group, ObjectGraph, ObjectId, TypeName, Value, normalize_groups};
use crate::validation::ValidationResult;
use crate::validation::context::ValidationContext;
use crate::validation::engine::ValidationEngine;
use crate::validation::factory::FactoryState;

/// Validates object graphs against the metadata of the factory that created
/// it. Cheap to clone and safe to share across threads; each call keeps its
/// own traversal state.
#[derive(Clone)]
pub struct Validator {
    state: Arc<FactoryState>,
}

impl Validator {
    pub(crate) fn new(state: Arc<FactoryState>) -> Self {
        Self { state }
    }

    fn engine(&self) -> ValidationEngine<'_> {
        ValidationEngine::new(
            &self.state.manager,
            self.state.clock.as_ref(),
            &self.state.config,
        )
    }

    fn active_groups(&self, groups: &[Group]) -> Vec<Group> {
        normalize_groups(groups, &self.state.config.default_groups)
    }

    /// Validates `root` and every bean reachable from it through cascaded
    /// properties and container elements. An empty `groups` slice means the
    /// configured default groups.
    pub fn validate(
        &self,
        graph: &ObjectGraph,
        root: ObjectId,
        groups: &[Group],
    ) -> Result<ValidationResult> {
        let object = graph.object(root)?;
        if !object.is_bean() {
            return Err(ValidatorError::config_error(format!(
                "validation root {root} of type {} is not a bean",
                object.type_name()
            )));
        }
        let groups = self.active_groups(groups);
        debug!(
            "Validating {} {} under groups {:?}",
            object.type_name(),
            root,
            groups
        );

        let mut context = ValidationContext::new(
            Some(graph),
            object.type_name().clone(),
            self.state.config.fail_fast,
        );
        self.engine().validate_bean(&mut context, root, &groups)?;
        Ok(context.into_result())
    }

    /// Validates one property of `root`, including whatever it cascades to.
    /// Class-level constraints and the other properties are not evaluated.
    pub fn validate_property(
        &self,
        graph: &ObjectGraph,
        root: ObjectId,
        property: &str,
        groups: &[Group],
    ) -> Result<ValidationResult> {
        let object = graph.object(root)?;
        if !object.is_bean() {
            return Err(ValidatorError::config_error(format!(
                "validation root {root} of type {} is not a bean",
                object.type_name()
            )));
        }
        let metadata = self.state.manager.bean_metadata(object.type_name())?;
        let property_metadata = metadata
            .property(property)
            .ok_or_else(|| ValidatorError::unknown_property(object.type_name().as_str(), property))?;
        let groups = self.active_groups(groups);

        let mut context = ValidationContext::new(
            Some(graph),
            object.type_name().clone(),
            self.state.config.fail_fast,
        );
        let entered = context.enter_bean(root, &groups);
        let null = Value::Null;
        let value = object.field(property).unwrap_or(&null);
        let result = self.engine().validate_property(
            &mut context,
            Some(root),
            property_metadata,
            value,
            &entered,
            true,
        );
        context.leave_bean(entered.len());
        result?;
        Ok(context.into_result())
    }

    /// Checks whether `value` would satisfy the constraints declared directly
    /// on `property` of `bean_type`. There is no graph behind the value, so
    /// container element constraints are skipped and nothing is cascaded.
    pub fn validate_value(
        &self,
        bean_type: &TypeName,
        property: &str,
        value: &Value,
        groups: &[Group],
    ) -> Result<ValidationResult> {
        let metadata = self.state.manager.bean_metadata(bean_type)?;
        let property_metadata = metadata
            .property(property)
            .ok_or_else(|| ValidatorError::unknown_property(bean_type.as_str(), property))?;
        let groups = self.active_groups(groups);

        let mut context =
            ValidationContext::new(None, bean_type.clone(), self.state.config.fail_fast);
        self.engine().validate_property(
            &mut context,
            None,
            property_metadata,
            value,
            &groups,
            false,
        )?;
        Ok(context.into_result())
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.state.config)
            .finish_non_exhaustive()
    }
}
