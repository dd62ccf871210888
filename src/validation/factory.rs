use std::sync::Arc;
use tracing::info;

use crate::constraints::{ClockProvider, SystemClock};
use crate::core::ValidatorConfig;
use crate::error::Result;
use crate::extraction::{ValueExtractorDescriptor, ValueExtractorRegistry};
use crate::metadata::{BeanDeclaration, BeanMetaData, BeanMetaDataManager};
use crate::types::{TypeDescriptor, TypeHierarchy, TypeName};
use crate::validation::Validator;

pub(crate) struct FactoryState {
    pub(crate) manager: BeanMetaDataManager,
    pub(crate) clock: Arc<dyn ClockProvider>,
    pub(crate) config: ValidatorConfig,
}

/// Owns the immutable metadata every [`Validator`] it hands out shares.
#[derive(Clone)]
pub struct ValidatorFactory {
    state: Arc<FactoryState>,
}

impl ValidatorFactory {
    pub fn builder() -> ValidatorFactoryBuilder {
        ValidatorFactoryBuilder::default()
    }

    /// A validator backed by this factory's metadata. Cheap to create.
    pub fn validator(&self) -> Validator {
        Validator::new(Arc::clone(&self.state))
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.state.config
    }

    pub fn metadata_manager(&self) -> &BeanMetaDataManager {
        &self.state.manager
    }

    pub fn bean_metadata(&self, type_name: &TypeName) -> Result<Arc<BeanMetaData>> {
        self.state.manager.bean_metadata(type_name)
    }
}

impl std::fmt::Debug for ValidatorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorFactory")
            .field("config", &self.state.config)
            .field("manager", &self.state.manager)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct ValidatorFactoryBuilder {
    hierarchy: TypeHierarchy,
    types: Vec<TypeDescriptor>,
    extractors: Vec<ValueExtractorDescriptor>,
    beans: Vec<BeanDeclaration>,
    clock: Arc<dyn ClockProvider>,
    config: ValidatorConfig,
}

impl Default for ValidatorFactoryBuilder {
    fn default() -> Self {
        Self {
            hierarchy: TypeHierarchy::with_builtin_containers(),
            types: Vec::new(),
            extractors: Vec::new(),
            beans: Vec::new(),
            clock: Arc::new(SystemClock),
            config: ValidatorConfig::default(),
        }
    }
}

impl ValidatorFactoryBuilder {
    /// Replaces the type hierarchy, which defaults to the built-in
    /// container family.
    pub fn type_hierarchy(mut self, hierarchy: TypeHierarchy) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    pub fn register_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.types.push(descriptor);
        self
    }

    /// Adds a value extractor on top of the defaults; it replaces a default
    /// declared for the same container type and type parameter.
    pub fn value_extractor(mut self, descriptor: ValueExtractorDescriptor) -> Self {
        self.extractors.push(descriptor);
        self
    }

    pub fn bean(mut self, declaration: BeanDeclaration) -> Self {
        self.beans.push(declaration);
        self
    }

    pub fn beans<I>(mut self, declarations: I) -> Self
    where
        I: IntoIterator<Item = BeanDeclaration>,
    {
        self.beans.extend(declarations);
        self
    }

    pub fn clock_provider(mut self, clock: impl ClockProvider + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the factory, resolving the metadata of every declared bean so
    /// that configuration errors surface here.
    pub fn build(self) -> Result<ValidatorFactory> {
        self.config.validate()?;

        let mut hierarchy = self.hierarchy;
        for descriptor in self.types {
            hierarchy.register(descriptor)?;
        }

        let mut registry = ValueExtractorRegistry::with_default_extractors(Arc::new(hierarchy));
        for extractor in self.extractors {
            registry.register(extractor);
        }
        let extractor_count = registry.len();

        let manager = BeanMetaDataManager::new(Arc::new(registry), self.beans);
        let bean_count = manager.initialize_all()?;

        info!(
            "Validator factory ready: {} bean types, {} value extractors",
            bean_count, extractor_count
        );

        Ok(ValidatorFactory {
            state: Arc::new(FactoryState {
                manager,
                clock: self.clock,
                config: self.config,
            }),
        })
    }
}
