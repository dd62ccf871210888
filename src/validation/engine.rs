//! Graph traversal: evaluates constraints and cascades into nested beans and
//! container elements.

use tracing::trace;

use crate::constraints::{ClockProvider, ConstraintValidatorContext};
use crate::core::ValidatorConfig;
use crate::error::{Result, ValidatorError};
use crate::extraction::{ExtractedValue, ValueExtractorRegistry};
use crate::metadata::{
    BeanMetaData, BeanMetaDataManager, CascadingMetaData, ExtractionStep, MetaConstraint,
    PropertyMetaData,
};
use crate::types::{Group, Object, ObjectId, PathNode, TypeName, Value};
use crate::validation::ConstraintViolation;
use crate::validation::context::ValidationContext;

pub(crate) struct ValidationEngine<'v> {
    manager: &'v BeanMetaDataManager,
    clock: &'v dyn ClockProvider,
    config: &'v ValidatorConfig,
}

impl<'v> ValidationEngine<'v> {
    pub fn new(
        manager: &'v BeanMetaDataManager,
        clock: &'v dyn ClockProvider,
        config: &'v ValidatorConfig,
    ) -> Self {
        Self {
            manager,
            clock,
            config,
        }
    }

    fn registry(&self) -> &'v ValueExtractorRegistry {
        self.manager.registry()
    }

    /// Validates the bean `id` and everything reachable from it through
    /// cascading, under `groups`.
    pub fn validate_bean(
        &self,
        context: &mut ValidationContext<'_>,
        id: ObjectId,
        groups: &[Group],
    ) -> Result<()> {
        if context.should_stop() {
            return Ok(());
        }
        let Some(graph) = context.graph() else {
            return Ok(());
        };
        let object = graph.object(id)?;
        if !object.is_bean() {
            trace!(
                "Skipping cascade at '{}': {} is not a bean",
                context.path(),
                object.type_name()
            );
            return Ok(());
        }
        let active = context.enter_bean(id, groups);
        if active.is_empty() {
            trace!(
                "Skipping cascade at '{}': {} is already being validated",
                context.path(),
                id
            );
            return Ok(());
        }
        // Only beans that are actually entered count towards the limit.
        if context.depth() > self.config.max_cascade_depth {
            context.leave_bean(active.len());
            return Err(ValidatorError::CascadeDepthExceeded {
                depth: self.config.max_cascade_depth,
                path: context.path().to_string(),
            });
        }

        let result = self
            .manager
            .bean_metadata(object.type_name())
            .and_then(|metadata| {
                self.validate_bean_contents(context, id, object, &metadata, &active)
            });
        context.leave_bean(active.len());
        result
    }

    fn validate_bean_contents(
        &self,
        context: &mut ValidationContext<'_>,
        id: ObjectId,
        object: &Object,
        metadata: &BeanMetaData,
        groups: &[Group],
    ) -> Result<()> {
        let bean = Value::Ref(id);
        for constraint in metadata.class_constraints() {
            self.evaluate(context, constraint, &bean, Some(id), groups)?;
            if context.should_stop() {
                return Ok(());
            }
        }

        let null = Value::Null;
        for property in metadata.properties() {
            let value = object.field(property.name()).unwrap_or(&null);
            self.validate_property(context, Some(id), property, value, groups, true)?;
            if context.should_stop() {
                break;
            }
        }
        Ok(())
    }

    /// Evaluates the constraints of `property` against `value` and, when
    /// `cascade` is set, follows its cascading metadata.
    pub fn validate_property(
        &self,
        context: &mut ValidationContext<'_>,
        leaf_bean: Option<ObjectId>,
        property: &PropertyMetaData,
        value: &Value,
        groups: &[Group],
        cascade: bool,
    ) -> Result<()> {
        context.push_path(PathNode::property(property.name()));
        let result =
            self.validate_property_value(context, leaf_bean, property, value, groups, cascade);
        context.pop_path();
        result
    }

    fn validate_property_value(
        &self,
        context: &mut ValidationContext<'_>,
        leaf_bean: Option<ObjectId>,
        property: &PropertyMetaData,
        value: &Value,
        groups: &[Group],
        cascade: bool,
    ) -> Result<()> {
        for constraint in property.constraints() {
            self.evaluate(context, constraint, value, leaf_bean, groups)?;
            if context.should_stop() {
                return Ok(());
            }
        }
        if cascade {
            self.cascade(context, property.cascading_metadata(), value, groups)?;
        }
        Ok(())
    }

    fn evaluate(
        &self,
        context: &mut ValidationContext<'_>,
        constraint: &MetaConstraint,
        value: &Value,
        leaf_bean: Option<ObjectId>,
        groups: &[Group],
    ) -> Result<()> {
        let Some(group) = constraint.descriptor().first_matching_group(groups) else {
            return Ok(());
        };
        self.evaluate_along_path(
            context,
            constraint,
            constraint.extraction_path().steps(),
            value,
            leaf_bean,
            group,
        )
    }

    /// Walks the remaining extraction `steps` from `value` and checks the
    /// constraint against every value reached.
    fn evaluate_along_path(
        &self,
        context: &mut ValidationContext<'_>,
        constraint: &MetaConstraint,
        steps: &[ExtractionStep],
        value: &Value,
        leaf_bean: Option<ObjectId>,
        group: &Group,
    ) -> Result<()> {
        let Some((step, rest)) = steps.split_first() else {
            return self.check(context, constraint, value, leaf_bean, group);
        };
        let Some(graph) = context.graph() else {
            return Ok(());
        };
        let Some(container) = graph.resolve(value)? else {
            return Ok(());
        };
        let Some(descriptor) = self
            .registry()
            .select_for_runtime_type(&step.candidates, container.type_name())?
        else {
            trace!(
                "No value extractor for {} at '{}'; skipping {}",
                container.type_name(),
                context.path(),
                constraint.descriptor().kind()
            );
            return Ok(());
        };

        for extracted in descriptor.extractor().extract(container) {
            let element = extracted.value;
            context.push_path(container_element_node(
                Some(&step.container),
                step.type_argument_index,
                container,
                extracted,
            ));
            let result =
                self.evaluate_along_path(context, constraint, rest, element, leaf_bean, group);
            context.pop_path();
            result?;
            if context.should_stop() {
                break;
            }
        }
        Ok(())
    }

    fn check(
        &self,
        context: &mut ValidationContext<'_>,
        constraint: &MetaConstraint,
        value: &Value,
        leaf_bean: Option<ObjectId>,
        group: &Group,
    ) -> Result<()> {
        let descriptor = constraint.descriptor();
        let mut validator_context = ConstraintValidatorContext::new(
            context.graph(),
            self.clock,
            descriptor.message_template(),
        );
        let valid = constraint
            .validator()
            .is_valid(value, &mut validator_context)
            .map_err(|source| {
                ValidatorError::unexpected_validation(
                    descriptor.kind(),
                    context.path().to_string(),
                    source,
                )
            })?;
        if valid {
            return Ok(());
        }

        for template in validator_context.into_message_templates() {
            context.add_violation(ConstraintViolation {
                message: descriptor.interpolate(&template),
                message_template: template,
                property_path: context.path().clone(),
                invalid_value: value.clone(),
                group: group.clone(),
                constraint_kind: descriptor.kind().to_string(),
                root_type: context.root_type().clone(),
                leaf_bean,
            });
            if context.should_stop() {
                break;
            }
        }
        Ok(())
    }

    /// Follows `node` from `value`: into the value itself when it is a
    /// cascaded bean, and into the elements of every marked type argument.
    fn cascade(
        &self,
        context: &mut ValidationContext<'_>,
        node: &CascadingMetaData,
        value: &Value,
        groups: &[Group],
    ) -> Result<()> {
        if !node.is_marked_for_cascading_on_element_or_container_elements()
            || context.should_stop()
        {
            return Ok(());
        }
        if value.is_null() {
            trace!("Skipping cascade at '{}': null value", context.path());
            return Ok(());
        }
        let Some(graph) = context.graph() else {
            return Ok(());
        };
        let Some(object) = graph.resolve(value)? else {
            return Ok(());
        };

        if node.is_cascading() {
            if let Some(id) = value.as_object_id() {
                let converted = node.convert_groups(groups);
                context.push_path(PathNode::Bean);
                let result = self.validate_bean(context, id, &converted);
                context.pop_path();
                result?;
            }
        }

        for child in node.container_element_types_cascading_metadata() {
            if !child.is_marked_for_cascading_on_element_or_container_elements() {
                continue;
            }
            if context.should_stop() {
                break;
            }
            let Some(descriptor) = self
                .registry()
                .select_for_runtime_type(child.value_extractor_candidates(), object.type_name())?
            else {
                trace!(
                    "Skipping cascade at '{}': no value extractor for runtime type {}",
                    context.path(),
                    object.type_name()
                );
                continue;
            };

            for extracted in descriptor.extractor().extract(object) {
                let element = extracted.value;
                if element.is_null() {
                    continue;
                }
                context.push_path(container_element_node(
                    child.declared_container_class(),
                    child.type_parameter().index(),
                    object,
                    extracted,
                ));
                let result = self.cascade(context, child, element, groups);
                context.pop_path();
                result?;
                if context.should_stop() {
                    break;
                }
            }
        }
        Ok(())
    }
}

fn container_element_node(
    declared_container: Option<&TypeName>,
    type_argument_index: Option<usize>,
    container: &Object,
    extracted: ExtractedValue<'_>,
) -> PathNode {
    PathNode::ContainerElement {
        name: extracted.name.into_owned(),
        container: declared_container
            .cloned()
            .unwrap_or_else(|| container.type_name().clone()),
        type_argument_index,
        access: extracted.access,
    }
}
