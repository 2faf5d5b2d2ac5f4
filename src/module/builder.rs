use rustc_hash::FxHashSet;

use crate::module::debug_info::PositionRecord;
use crate::module::definition::{Definition, DefinitionKind, Dependency, Export, Import};
use crate::module::errors::ModuleError;
use crate::module::index::{DefIndex, TypeIndex, ValueIndex, next_index};
use crate::module::kind::ModuleKind;
use crate::module::module::{Module, ModuleParts};
use crate::module::types::TypeDesc;
use crate::module::value::Value;

#[derive(Debug)]
struct PendingModule {
    parts: ModuleParts,
    exported: FxHashSet<String>,
}

/// Accumulates one module at a time, append-only.
///
/// Indices come back in insertion order starting at 0 and never change.
/// Cheap checks (export targets, duplicate exports, bytecode set twice)
/// fail at the call; everything else is checked by [`finish`].
///
/// Using any operation outside `begin_module`/`finish` is a bug in the
/// caller and panics.
///
/// [`finish`]: ModuleBuilder::finish
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    pending: Option<PendingModule>,
}

fn push<T>(table: &mut Vec<T>, item: T, what: &str) -> u32 {
    let index = next_index(table.len())
        .unwrap_or_else(|| panic!("internal inconsistency: {} table overflow", what));
    table.push(item);
    index
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True between `begin_module` and `finish`.
    pub fn is_building(&self) -> bool {
        self.pending.is_some()
    }

    pub fn begin_module(
        &mut self,
        name: impl Into<String>,
        kind: ModuleKind,
    ) -> Result<(), ModuleError> {
        if let Some(pending) = &self.pending {
            return Err(ModuleError::ModuleInProgress {
                name: pending.parts.name.clone(),
            });
        }
        let name = name.into();
        tracing::trace!(module = %name, %kind, "begin module");
        self.pending = Some(PendingModule {
            parts: ModuleParts {
                name,
                kind: Some(kind),
                ..ModuleParts::default()
            },
            exported: FxHashSet::default(),
        });
        Ok(())
    }

    /// Appends a dependency and returns its index. Duplicates are kept.
    pub fn add_dependency(&mut self, name: impl Into<String>) -> u32 {
        self.add_dependency_with_version(name, 0)
    }

    pub fn add_dependency_with_version(&mut self, name: impl Into<String>, version: u32) -> u32 {
        let parts = &mut self.pending_mut().parts;
        push(
            &mut parts.dependencies,
            Dependency {
                name: name.into(),
                version,
            },
            "dependency",
        )
    }

    pub fn add_value(&mut self, value: Value) -> ValueIndex {
        ValueIndex(push(&mut self.pending_mut().parts.values, value, "value"))
    }

    /// Adds a list whose elements are earlier values.
    pub fn add_list_value(&mut self, items: &[ValueIndex]) -> ValueIndex {
        self.add_value(Value::List(items.to_vec()))
    }

    pub fn add_type(&mut self, ty: TypeDesc) -> TypeIndex {
        TypeIndex(push(&mut self.pending_mut().parts.types, ty, "type"))
    }

    pub fn add_import(
        &mut self,
        dependency: u32,
        kind: DefinitionKind,
        name: impl Into<String>,
    ) -> u32 {
        let import = Import {
            dependency,
            kind,
            name: name.into(),
        };
        push(&mut self.pending_mut().parts.imports, import, "import")
    }

    pub fn add_definition(&mut self, definition: Definition) -> DefIndex {
        DefIndex(push(
            &mut self.pending_mut().parts.definitions,
            definition,
            "definition",
        ))
    }

    /// Publishes `index` under `name`.
    pub fn export_symbol(
        &mut self,
        name: impl Into<String>,
        index: DefIndex,
    ) -> Result<(), ModuleError> {
        let pending = self.pending_mut();
        let count = pending.parts.definitions.len();
        if index.index() >= count {
            return Err(ModuleError::DefinitionOutOfRange { index, count });
        }
        let name = name.into();
        if !pending.exported.insert(name.clone()) {
            return Err(ModuleError::DuplicateExport { name });
        }
        pending.parts.exports.push(Export {
            name,
            definition: index,
        });
        Ok(())
    }

    pub fn set_bytecode(&mut self, bytecode: impl Into<Vec<u8>>) -> Result<(), ModuleError> {
        let parts = &mut self.pending_mut().parts;
        if parts.bytecode.is_some() {
            return Err(ModuleError::BytecodeAlreadySet);
        }
        parts.bytecode = Some(bytecode.into());
        Ok(())
    }

    pub fn set_slot_count(&mut self, slot_count: u32) {
        self.pending_mut().parts.slot_count = slot_count;
    }

    /// Records the source name of a definition in the debug info.
    pub fn name_definition(
        &mut self,
        index: DefIndex,
        name: impl Into<String>,
    ) -> Result<(), ModuleError> {
        let parts = &mut self.pending_mut().parts;
        let count = parts.definitions.len();
        if index.index() >= count {
            return Err(ModuleError::DefinitionOutOfRange { index, count });
        }
        let names = &mut parts.debug.definition_names;
        if names.len() < count {
            names.resize(count, String::new());
        }
        names[index.index()] = name.into();
        Ok(())
    }

    /// Adds a source file to the debug info, reusing an existing entry.
    pub fn add_source_file(&mut self, path: &str) -> u32 {
        let files = &mut self.pending_mut().parts.debug.source_files;
        match files.iter().position(|file| file == path) {
            Some(index) => index as u32,
            None => push(files, path.to_string(), "source file"),
        }
    }

    /// Maps bytecode from `address` onwards to `line` of `file`.
    ///
    /// Addresses must be added in increasing order.
    pub fn add_position(&mut self, address: u32, file: u32, line: u32) {
        let record = PositionRecord {
            address,
            file,
            line,
        };
        let positions = &mut self.pending_mut().parts.debug.positions;
        push(positions, record, "position");
    }

    /// Validates the module and hands it over.
    ///
    /// The builder is empty afterwards, whether or not validation passed.
    ///
    /// # Panics
    ///
    /// Panics if no module was begun.
    pub fn finish(&mut self) -> Result<Module, ModuleError> {
        let mut pending = self
            .pending
            .take()
            .unwrap_or_else(|| panic!("internal inconsistency: finish called before begin_module"));

        let count = pending.parts.definitions.len();
        let names = &mut pending.parts.debug.definition_names;
        if !names.is_empty() && names.len() < count {
            names.resize(count, String::new());
        }

        let module = Module::from_parts(pending.parts)?;
        tracing::debug!(
            module = module.name(),
            definitions = module.definition_count(),
            exports = module.exports().len(),
            bytecode = module.bytecode().len(),
            slots = module.slot_count(),
            "module finished"
        );
        Ok(module)
    }

    fn pending_mut(&mut self) -> &mut PendingModule {
        self.pending.as_mut().unwrap_or_else(|| {
            panic!("internal inconsistency: module builder used before begin_module")
        })
    }
}
