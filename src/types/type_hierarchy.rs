// Type hierarchy for container and bean type relationships

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{Result, ValidatorError};
use crate::types::{GenericType, TypeName, TypeParameter};

/// How a subtype fills in one type argument of a supertype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgumentBinding {
    /// Bound to the subtype's own type parameter at this index.
    Parameter(usize),
    /// Bound to a concrete type, e.g. `StringList extends List<String>`.
    Fixed(GenericType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupertypeBinding {
    pub name: TypeName,
    pub arguments: Vec<TypeArgumentBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: TypeName,
    pub type_parameters: Vec<String>,
    pub supertypes: Vec<SupertypeBinding>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
        }
    }

    pub fn with_type_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn extends(
        mut self,
        name: impl Into<TypeName>,
        arguments: Vec<TypeArgumentBinding>,
    ) -> Self {
        self.supertypes.push(SupertypeBinding {
            name: name.into(),
            arguments,
        });
        self
    }

    /// Extends a supertype passing this type's parameters through in order.
    pub fn extends_passing_parameters(self, name: impl Into<TypeName>) -> Self {
        let arguments = (0..self.type_parameters.len())
            .map(TypeArgumentBinding::Parameter)
            .collect();
        self.extends(name, arguments)
    }
}

/// Registry of type descriptors answering assignability and type-parameter
/// binding questions. Immutable once handed to a validator factory.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    types: HashMap<TypeName, TypeDescriptor>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hierarchy pre-seeded with the container family the default value
    /// extractors are declared on.
    pub fn with_builtin_containers() -> Self {
        let mut hierarchy = Self::new();
        let builtins = [
            TypeDescriptor::new("Iterable").with_type_parameters(["T"]),
            TypeDescriptor::new("Collection")
                .with_type_parameters(["E"])
                .extends_passing_parameters("Iterable"),
            TypeDescriptor::new("List")
                .with_type_parameters(["E"])
                .extends_passing_parameters("Collection"),
            TypeDescriptor::new("ArrayList")
                .with_type_parameters(["E"])
                .extends_passing_parameters("List"),
            TypeDescriptor::new("LinkedList")
                .with_type_parameters(["E"])
                .extends_passing_parameters("List"),
            TypeDescriptor::new("Set")
                .with_type_parameters(["E"])
                .extends_passing_parameters("Collection"),
            TypeDescriptor::new("HashSet")
                .with_type_parameters(["E"])
                .extends_passing_parameters("Set"),
            TypeDescriptor::new("Map").with_type_parameters(["K", "V"]),
            TypeDescriptor::new("HashMap")
                .with_type_parameters(["K", "V"])
                .extends_passing_parameters("Map"),
            TypeDescriptor::new("Optional").with_type_parameters(["T"]),
        ];
        for descriptor in builtins {
            hierarchy.types.insert(descriptor.name.clone(), descriptor);
        }
        hierarchy
    }

    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<()> {
        let arity = descriptor.type_parameters.len();
        for supertype in &descriptor.supertypes {
            if supertype.name == descriptor.name {
                return Err(ValidatorError::invalid_type_declaration(format!(
                    "type {} cannot extend itself",
                    descriptor.name
                )));
            }
            let mut bound = HashSet::new();
            for argument in &supertype.arguments {
                if let TypeArgumentBinding::Parameter(index) = argument {
                    if *index >= arity {
                        return Err(ValidatorError::invalid_type_declaration(format!(
                            "type {} binds parameter #{} of {} but declares only {} type parameters",
                            descriptor.name, index, supertype.name, arity
                        )));
                    }
                    // A parameter maps to a single extraction position per supertype.
                    if !bound.insert(*index) {
                        return Err(ValidatorError::invalid_type_declaration(format!(
                            "type {} binds parameter #{} to more than one type argument of {}",
                            descriptor.name, index, supertype.name
                        )));
                    }
                }
            }
        }
        self.types.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub fn get(&self, name: &TypeName) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Type parameters of the declared type at a position, one per type
    /// argument. Unregistered generic types get positional names.
    pub fn type_parameters_of(&self, declared: &GenericType) -> Result<Vec<TypeParameter>> {
        if declared.is_array() {
            return Ok(vec![TypeParameter::ArrayElement]);
        }

        let raw = declared.raw_type();
        let argument_count = declared.type_arguments().len();
        match self.types.get(&raw) {
            Some(descriptor) if descriptor.type_parameters.len() != argument_count => {
                Err(ValidatorError::invalid_type_declaration(format!(
                    "{} declares {} type parameters but {} were given in '{}'",
                    raw,
                    descriptor.type_parameters.len(),
                    argument_count,
                    declared
                )))
            }
            Some(descriptor) => Ok(descriptor
                .type_parameters
                .iter()
                .enumerate()
                .map(|(index, name)| TypeParameter::declared(raw.clone(), index, name.clone()))
                .collect()),
            None => Ok((0..argument_count)
                .map(|index| TypeParameter::declared(raw.clone(), index, format!("T{index}")))
                .collect()),
        }
    }

    /// Raw assignability: `sub` is `sup` or one of its (transitive) subtypes.
    pub fn is_assignable(&self, sub: &TypeName, sup: &TypeName) -> bool {
        self.distance(sub, sup).is_some()
    }

    /// Number of inheritance edges between `sub` and `sup`, if related.
    pub fn distance(&self, sub: &TypeName, sup: &TypeName) -> Option<usize> {
        if sub == sup {
            return Some(0);
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([(sub.clone(), 0usize)]);
        while let Some((current, depth)) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let Some(descriptor) = self.types.get(&current) else {
                continue;
            };
            for supertype in &descriptor.supertypes {
                if &supertype.name == sup {
                    return Some(depth + 1);
                }
                queue.push_back((supertype.name.clone(), depth + 1));
            }
        }
        None
    }

    /// `name` followed by all of its supertypes, nearest first.
    pub fn supertype_chain(&self, name: &TypeName) -> Vec<TypeName> {
        let mut chain = Vec::new();
        let mut queue = VecDeque::from([name.clone()]);
        while let Some(current) = queue.pop_front() {
            if chain.contains(&current) {
                continue;
            }
            if let Some(descriptor) = self.types.get(&current) {
                queue.extend(descriptor.supertypes.iter().map(|s| s.name.clone()));
            }
            chain.push(current);
        }
        chain
    }

    /// Index of the type parameter of `sup` that the `index`-th type
    /// parameter of `sub` is bound to, following the declared supertypes.
    pub fn bind_type_parameter(
        &self,
        sub: &TypeName,
        index: usize,
        sup: &TypeName,
    ) -> Option<usize> {
        self.bind_type_parameter_guarded(sub, index, sup, &mut HashSet::new())
    }

    fn bind_type_parameter_guarded(
        &self,
        sub: &TypeName,
        index: usize,
        sup: &TypeName,
        visited: &mut HashSet<TypeName>,
    ) -> Option<usize> {
        if sub == sup {
            return Some(index);
        }
        if !visited.insert(sub.clone()) {
            return None;
        }

        let descriptor = self.types.get(sub)?;
        descriptor.supertypes.iter().find_map(|supertype| {
            let position = supertype
                .arguments
                .iter()
                .position(|argument| *argument == TypeArgumentBinding::Parameter(index))?;
            self.bind_type_parameter_guarded(&supertype.name, position, sup, visited)
        })
    }
}
