use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, ValidatorError};
use crate::extraction::ValueExtractorRegistry;
use crate::metadata::{
    BeanDeclaration, BeanMetaData, CascadingMetaData, CascadingTypeParameter, ConstraintLocation,
    ExtractionStep, MetaConstraint, PropertyDeclaration, PropertyMetaData, TypeArgumentDeclaration,
    ValueExtractionPath,
};
use crate::types::{GenericType, TypeName, TypeParameter};

/// Builds and caches [`BeanMetaData`], once per bean type.
///
/// Metadata for a type aggregates the declarations of every type in its
/// supertype chain. Types without any declaration get empty metadata.
pub struct BeanMetaDataManager {
    registry: Arc<ValueExtractorRegistry>,
    declarations: HashMap<TypeName, BeanDeclaration>,
    cache: papaya::HashMap<TypeName, Arc<BeanMetaData>>,
}

impl BeanMetaDataManager {
    pub fn new<I>(registry: Arc<ValueExtractorRegistry>, declarations: I) -> Self
    where
        I: IntoIterator<Item = BeanDeclaration>,
    {
        let declarations = declarations
            .into_iter()
            .map(|declaration| (declaration.type_name().clone(), declaration))
            .collect();
        Self {
            registry,
            declarations,
            cache: papaya::HashMap::new(),
        }
    }

    pub fn registry(&self) -> &ValueExtractorRegistry {
        &self.registry
    }

    pub fn declaration(&self, type_name: &TypeName) -> Option<&BeanDeclaration> {
        self.declarations.get(type_name)
    }

    pub fn declared_types(&self) -> impl Iterator<Item = &TypeName> {
        self.declarations.keys()
    }

    /// Number of bean types whose metadata has been built so far.
    pub fn cached_len(&self) -> usize {
        self.cache.pin().len()
    }

    /// Metadata for `type_name`, built on first access.
    pub fn bean_metadata(&self, type_name: &TypeName) -> Result<Arc<BeanMetaData>> {
        let cache = self.cache.pin();
        if let Some(metadata) = cache.get(type_name) {
            return Ok(Arc::clone(metadata));
        }

        let built = Arc::new(self.build(type_name)?);
        Ok(Arc::clone(cache.get_or_insert(type_name.clone(), built)))
    }

    /// Builds metadata for every declared type, surfacing configuration
    /// errors up front.
    pub fn initialize_all(&self) -> Result<usize> {
        let mut types: Vec<&TypeName> = self.declarations.keys().collect();
        types.sort();
        for type_name in &types {
            self.bean_metadata(type_name)?;
        }
        Ok(types.len())
    }

    fn build(&self, type_name: &TypeName) -> Result<BeanMetaData> {
        let chain: Vec<&BeanDeclaration> = self
            .registry
            .hierarchy()
            .supertype_chain(type_name)
            .iter()
            .filter_map(|name| self.declarations.get(name))
            .collect();

        let mut class_constraints = Vec::new();
        let mut grouped: IndexMap<&str, Vec<(&TypeName, &PropertyDeclaration)>> = IndexMap::new();
        for declaration in &chain {
            let location = ConstraintLocation::Bean {
                bean_type: declaration.type_name().clone(),
            };
            for constraint in declaration.constraints() {
                if constraint.descriptor().is_unwrapping() {
                    return Err(ValidatorError::invalid_type_declaration(format!(
                        "class-level constraint {} on {} cannot unwrap a value",
                        constraint.descriptor().kind(),
                        declaration.type_name()
                    )));
                }
                class_constraints.push(MetaConstraint::new(
                    constraint,
                    location.clone(),
                    ValueExtractionPath::default(),
                )?);
            }
            for property in declaration.properties() {
                grouped
                    .entry(property.name())
                    .or_default()
                    .push((declaration.type_name(), property));
            }
        }

        let mut properties = IndexMap::with_capacity(grouped.len());
        for (name, declarations) in grouped {
            let property = self.build_property(name, &declarations)?;
            properties.insert(name.to_string(), property);
        }

        debug!(
            "Built metadata for bean type {} ({} declarations, {} properties, {} class constraints)",
            type_name,
            chain.len(),
            properties.len(),
            class_constraints.len()
        );
        Ok(BeanMetaData::new(
            type_name.clone(),
            class_constraints,
            properties,
        ))
    }

    /// `declarations` holds the property as declared along the supertype
    /// chain, most derived first.
    fn build_property(
        &self,
        name: &str,
        declarations: &[(&TypeName, &PropertyDeclaration)],
    ) -> Result<PropertyMetaData> {
        let Some(&(first_owner, first)) = declarations.first() else {
            return Err(ValidatorError::config_error(format!(
                "property {name} has no declaration"
            )));
        };
        let (owner, primary) = declarations
            .iter()
            .copied()
            .find(|(_, property)| property.is_marked_for_cascading())
            .unwrap_or((first_owner, first));

        let mut constraints = Vec::new();
        for &(bean_type, property) in declarations {
            self.collect_property_constraints(bean_type, property, &mut constraints)?;
        }

        let context = format!("{owner}.{name}");
        let parameter = CascadingTypeParameter::annotated_object(
            primary.declared_type().clone(),
            primary.is_cascading(),
            self.container_element_types(
                &context,
                primary.declared_type(),
                primary.type_arguments(),
            )?,
            primary.group_conversions().to_vec(),
        );
        let cascading = CascadingMetaData::of(&self.registry, &parameter, &context)?;

        Ok(PropertyMetaData::new(
            name.to_string(),
            first.declared_type().clone(),
            constraints,
            cascading,
        ))
    }

    fn container_element_types(
        &self,
        context: &str,
        enclosing: &GenericType,
        declarations: &[TypeArgumentDeclaration],
    ) -> Result<Vec<CascadingTypeParameter>> {
        let parameters = self.type_parameters(context, enclosing, declarations)?;

        let mut children = Vec::with_capacity(parameters.len());
        for (index, parameter) in parameters.into_iter().enumerate() {
            let argument = type_argument(context, enclosing, index)?;
            let declaration = declarations.iter().find(|d| d.index() == index);
            let nested = declaration.map(|d| d.type_arguments()).unwrap_or_default();
            children.push(CascadingTypeParameter::type_argument(
                enclosing.clone(),
                parameter,
                declaration.is_some_and(TypeArgumentDeclaration::is_cascading),
                self.container_element_types(context, argument, nested)?,
                declaration
                    .map(|d| d.group_conversions().to_vec())
                    .unwrap_or_default(),
            ));
        }
        Ok(children)
    }

    /// Type parameters of `enclosing`, after checking that `declarations`
    /// only refer to existing ones, each at most once.
    fn type_parameters(
        &self,
        context: &str,
        enclosing: &GenericType,
        declarations: &[TypeArgumentDeclaration],
    ) -> Result<Vec<TypeParameter>> {
        if !enclosing.is_parameterized() {
            if let Some(declaration) = declarations.first() {
                return Err(ValidatorError::invalid_type_declaration(format!(
                    "{context}: type argument #{} is declared but {enclosing} has no type arguments",
                    declaration.index()
                )));
            }
            return Ok(Vec::new());
        }

        let parameters = self.registry.hierarchy().type_parameters_of(enclosing)?;
        let mut seen = HashSet::new();
        for declaration in declarations {
            if declaration.index() >= parameters.len() {
                return Err(ValidatorError::invalid_type_declaration(format!(
                    "{context}: type argument #{} is out of range for {enclosing}",
                    declaration.index()
                )));
            }
            if !seen.insert(declaration.index()) {
                return Err(ValidatorError::invalid_type_declaration(format!(
                    "{context}: type argument #{} of {enclosing} is declared more than once",
                    declaration.index()
                )));
            }
        }
        Ok(parameters)
    }

    fn collect_property_constraints(
        &self,
        bean_type: &TypeName,
        property: &PropertyDeclaration,
        constraints: &mut Vec<MetaConstraint>,
    ) -> Result<()> {
        let location = ConstraintLocation::Property {
            bean_type: bean_type.clone(),
            property: property.name().to_string(),
        };
        let declared_type = property.declared_type();

        for declaration in property.constraints() {
            let path = if declaration.descriptor().is_unwrapping() {
                ValueExtractionPath::new(vec![self.unwrapping_step(declared_type)?])
            } else {
                ValueExtractionPath::default()
            };
            constraints.push(MetaConstraint::new(declaration, location.clone(), path)?);
        }

        self.collect_container_element_constraints(
            &location,
            declared_type,
            property.type_arguments(),
            &[],
            constraints,
        )
    }

    fn unwrapping_step(&self, declared_type: &GenericType) -> Result<ExtractionStep> {
        let candidates = self.registry.candidates_for_unwrapping(declared_type);
        if candidates.is_empty() {
            let type_parameter = self
                .registry
                .hierarchy()
                .type_parameters_of(declared_type)?
                .first()
                .map(ToString::to_string)
                .unwrap_or_else(|| "<non generic>".to_string());
            return Err(ValidatorError::no_value_extractor_found(
                declared_type.raw_type().as_str(),
                type_parameter,
            ));
        }
        Ok(ExtractionStep {
            container: declared_type.raw_type(),
            type_argument_index: declared_type.is_parameterized().then_some(0),
            candidates,
        })
    }

    fn collect_container_element_constraints(
        &self,
        location: &ConstraintLocation,
        enclosing: &GenericType,
        declarations: &[TypeArgumentDeclaration],
        steps: &[ExtractionStep],
        constraints: &mut Vec<MetaConstraint>,
    ) -> Result<()> {
        let context = location.to_string();
        let parameters = self.type_parameters(&context, enclosing, declarations)?;

        for declaration in declarations.iter().filter(|d| declares_constraints(d)) {
            let index = declaration.index();
            let parameter = &parameters[index];
            let candidates = self
                .registry
                .candidates_for_cascaded_validation(enclosing, parameter);
            if candidates.is_empty() {
                return Err(ValidatorError::no_value_extractor_found(
                    enclosing.raw_type().as_str(),
                    parameter.to_string(),
                ));
            }

            let mut path = steps.to_vec();
            path.push(ExtractionStep {
                container: enclosing.raw_type(),
                type_argument_index: parameter.index(),
                candidates,
            });

            for constraint in declaration.constraints() {
                constraints.push(MetaConstraint::new(
                    constraint,
                    location.clone(),
                    ValueExtractionPath::new(path.clone()),
                )?);
            }

            self.collect_container_element_constraints(
                location,
                type_argument(&context, enclosing, index)?,
                declaration.type_arguments(),
                &path,
                constraints,
            )?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for BeanMetaDataManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanMetaDataManager")
            .field("declared_types", &self.declarations.len())
            .field("cached", &self.cached_len())
            .finish()
    }
}

fn declares_constraints(declaration: &TypeArgumentDeclaration) -> bool {
    !declaration.constraints().is_empty()
        || declaration.type_arguments().iter().any(declares_constraints)
}

fn type_argument<'t>(context: &str, enclosing: &'t GenericType, index: usize) -> Result<&'t GenericType> {
    enclosing.type_arguments().get(index).ok_or_else(|| {
        ValidatorError::invalid_type_declaration(format!(
            "{context}: {enclosing} has no type argument #{index}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints;
    use crate::types::{TypeDescriptor, TypeHierarchy};

    fn manager_with(
        hierarchy: TypeHierarchy,
        declarations: Vec<BeanDeclaration>,
    ) -> BeanMetaDataManager {
        let registry = ValueExtractorRegistry::with_default_extractors(Arc::new(hierarchy));
        BeanMetaDataManager::new(Arc::new(registry), declarations)
    }

    fn manager(declarations: Vec<BeanDeclaration>) -> BeanMetaDataManager {
        manager_with(TypeHierarchy::with_builtin_containers(), declarations)
    }

    #[test]
    fn test_metadata_is_cached() {
        let manager = manager(vec![BeanDeclaration::new("Order").property(
            PropertyDeclaration::new("id", GenericType::class("String"))
                .constraint(constraints::not_null()),
        )]);

        let first = manager.bean_metadata(&"Order".into()).unwrap();
        let second = manager.bean_metadata(&"Order".into()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.cached_len(), 1);
        assert_eq!(first.property("id").unwrap().constraints().len(), 1);
    }

    #[test]
    fn test_unknown_type_has_empty_metadata() {
        let manager = manager(Vec::new());
        let metadata = manager.bean_metadata(&"Nothing".into()).unwrap();
        assert!(!metadata.is_constrained());
    }

    #[test]
    fn test_supertype_declarations_are_inherited() {
        let mut hierarchy = TypeHierarchy::with_builtin_containers();
        hierarchy.register(TypeDescriptor::new("Animal")).unwrap();
        hierarchy
            .register(TypeDescriptor::new("Dog").extends("Animal", Vec::new()))
            .unwrap();

        let manager = manager_with(
            hierarchy,
            vec![
                BeanDeclaration::new("Animal").property(
                    PropertyDeclaration::new("name", GenericType::class("String"))
                        .constraint(constraints::not_blank()),
                ),
                BeanDeclaration::new("Dog").property(
                    PropertyDeclaration::new("name", GenericType::class("String"))
                        .constraint(constraints::size(2, 20)),
                ),
            ],
        );

        let dog = manager.bean_metadata(&"Dog".into()).unwrap();
        let kinds: Vec<&str> = dog
            .property("name")
            .unwrap()
            .constraints()
            .iter()
            .map(|c| c.descriptor().kind())
            .collect();
        assert_eq!(kinds, vec!["Size", "NotBlank"]);
    }

    #[test]
    fn test_container_element_constraint_path() {
        let manager = manager(vec![BeanDeclaration::new("Survey").property(
            PropertyDeclaration::parse("answers", "List<Optional<String>>")
                .unwrap()
                .type_argument(TypeArgumentDeclaration::new(0).type_argument(
                    TypeArgumentDeclaration::new(0).constraint(constraints::size(1, 10)),
                )),
        )]);

        let survey = manager.bean_metadata(&"Survey".into()).unwrap();
        let constraint = &survey.property("answers").unwrap().constraints()[0];
        let steps = constraint.extraction_path().steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].container, TypeName::new("List"));
        assert_eq!(steps[1].container, TypeName::new("Optional"));
        assert!(constraint.is_container_element_constraint());
    }

    #[test]
    fn test_cascading_tree_mirrors_generic_shape() {
        let manager = manager(vec![BeanDeclaration::new("Catalog").property(
            PropertyDeclaration::parse("sections", "Map<String, List<Item>>")
                .unwrap()
                .type_argument(
                    TypeArgumentDeclaration::new(1)
                        .type_argument(TypeArgumentDeclaration::new(0).cascade()),
                ),
        )]);

        let catalog = manager.bean_metadata(&"Catalog".into()).unwrap();
        let cascading = catalog.property("sections").unwrap().cascading_metadata();
        let children = cascading.container_element_types_cascading_metadata();
        assert_eq!(children.len(), 2);
        assert!(!children[0].is_marked_for_cascading_on_element_or_container_elements());
        assert!(children[1].is_marked_for_cascading_on_element_or_container_elements());
        assert_eq!(children[1].container_element_types_cascading_metadata().len(), 1);
        assert!(children[1].container_element_types_cascading_metadata()[0].is_cascading());
    }

    #[test]
    fn test_out_of_range_type_argument_is_rejected() {
        let manager = manager(vec![BeanDeclaration::new("Bad").property(
            PropertyDeclaration::parse("values", "List<String>")
                .unwrap()
                .type_argument(TypeArgumentDeclaration::new(3).cascade()),
        )]);
        assert!(matches!(
            manager.bean_metadata(&"Bad".into()),
            Err(ValidatorError::InvalidTypeDeclaration { .. })
        ));
        assert_eq!(manager.cached_len(), 0);
    }

    #[test]
    fn test_unwrapping_constraint_without_extractor() {
        let manager = manager(vec![BeanDeclaration::new("Bad").property(
            PropertyDeclaration::new("name", GenericType::class("String"))
                .constraint(constraints::not_blank().unwrapped()),
        )]);
        assert!(matches!(
            manager.bean_metadata(&"Bad".into()),
            Err(ValidatorError::NoValueExtractorFound { .. })
        ));
    }
}
