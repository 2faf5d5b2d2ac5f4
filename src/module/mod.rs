//! The compiled-module container: building, validating, encoding and
//! loading modules.

pub mod builder;
pub mod codec;
pub mod debug_info;
pub mod definition;
pub mod errors;
pub mod index;
pub mod kind;
#[allow(clippy::module_inception)]
pub mod module;
pub mod package;
pub mod registry;
pub mod types;
pub mod value;

pub use builder::ModuleBuilder;
pub use codec::{FormatError, decode_module, encode_module};
pub use debug_info::{DebugInfo, PositionRecord, SourceLine};
pub use definition::{Definition, DefinitionKind, Dependency, Export, Import, SyntaxMethod};
pub use errors::ModuleError;
pub use index::{DefIndex, TypeIndex, ValueIndex};
pub use kind::ModuleKind;
pub use module::{Module, PropertyTypes};
pub use package::{Package, PackageError};
pub use registry::{LoadError, ModuleRegistry};
pub use types::{Field, Parameter, ParameterMode, TypeDesc};
pub use value::Value;

#[cfg(test)]
mod package_test;
