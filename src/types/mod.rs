pub mod generic_type;
pub mod group;
pub mod path;
pub mod type_hierarchy;
pub mod value;

pub use generic_type::{GenericType, TypeName, TypeParameter};
pub use group::{Group, normalize_groups};
pub use path::{ElementAccess, PathNode, PropertyPath};
pub use type_hierarchy::{SupertypeBinding, TypeArgumentBinding, TypeDescriptor, TypeHierarchy};
pub use value::{Object, ObjectData, ObjectGraph, ObjectId, Value};
