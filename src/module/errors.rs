use thiserror::Error;

use crate::module::definition::DefinitionKind;
use crate::module::index::{DefIndex, TypeIndex, ValueIndex};

/// A broken module invariant, reported by the builder or by validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("module `{name}` is still being built")]
    ModuleInProgress { name: String },
    #[error("module name is empty")]
    EmptyName,
    #[error("module has no bytecode")]
    MissingBytecode,
    #[error("bytecode was already set")]
    BytecodeAlreadySet,
    #[error("{index} is out of range: the module has {count} definitions")]
    DefinitionOutOfRange { index: DefIndex, count: usize },
    #[error("{index} is out of range: the module has {count} values")]
    ValueOutOfRange { index: ValueIndex, count: usize },
    #[error("{value} refers to {target}, which is not an earlier value")]
    ForwardValueReference { value: ValueIndex, target: ValueIndex },
    #[error("{index} is out of range: the module has {count} types")]
    TypeOutOfRange { index: TypeIndex, count: usize },
    #[error("dependency {index} is out of range: the module has {count} dependencies")]
    DependencyOutOfRange { index: u32, count: usize },
    #[error("import {index} is out of range: the module has {count} imports")]
    ImportOutOfRange { index: u32, count: usize },
    #[error("{definition} refers to {target}, which is a {found}, not a {expected}")]
    DefinitionKindMismatch {
        definition: DefIndex,
        target: DefIndex,
        expected: &'static str,
        found: DefinitionKind,
    },
    #[error("{ty} names {target}, which is a {found}, not a type")]
    TypeKindMismatch {
        ty: TypeIndex,
        target: DefIndex,
        found: DefinitionKind,
    },
    #[error("property {property} uses {accessor}, whose type cannot serve as its accessor")]
    AccessorSignatureMismatch { property: DefIndex, accessor: DefIndex },
    #[error("`{name}` is already exported")]
    DuplicateExport { name: String },
    #[error(
        "handler {definition} spans {start}..{finish}, outside the {length} bytes of bytecode"
    )]
    HandlerOutOfBounds {
        definition: DefIndex,
        start: u32,
        finish: u32,
        length: usize,
    },
    #[error("slot count {slot_count} is less than the {required} slots the variables need")]
    SlotCountTooSmall { slot_count: u32, required: u32 },
    #[error("debug info names {names} definitions but the module has {count}")]
    DefinitionNameCount { names: usize, count: usize },
    #[error("debug position at address {address} refers to unknown source file {file}")]
    SourceFileOutOfRange { address: u32, file: u32 },
    #[error("debug position at address {address} is outside the {length} bytes of bytecode")]
    PositionOutOfBounds { address: u32, length: usize },
    #[error("debug position at address {address} does not follow address {previous}")]
    PositionsUnordered { address: u32, previous: u32 },
}
