use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::module::debug_info::{DebugInfo, SourceLine};
use crate::module::definition::{Definition, DefinitionKind, Dependency, Export, Import};
use crate::module::errors::ModuleError;
use crate::module::index::{DefIndex, TypeIndex, ValueIndex};
use crate::module::kind::ModuleKind;
use crate::module::types::TypeDesc;
use crate::module::value::Value;

/// The raw tables of a module before validation.
#[derive(Debug, Clone, Default)]
pub(crate) struct ModuleParts {
    pub name: String,
    pub kind: Option<ModuleKind>,
    pub dependencies: Vec<Dependency>,
    pub values: Vec<Value>,
    pub types: Vec<TypeDesc>,
    pub exports: Vec<Export>,
    pub imports: Vec<Import>,
    pub definitions: Vec<Definition>,
    pub bytecode: Option<Vec<u8>>,
    pub debug: DebugInfo,
    pub slot_count: u32,
}

/// Accessor types of a property, as answered by [`Module::query_property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyTypes<'a> {
    pub getter: &'a TypeDesc,
    pub setter: Option<&'a TypeDesc>,
}

/// A finished, validated compiled module.
///
/// Modules are immutable: every index stored anywhere in the tables has been
/// checked against its target table, so readers can index without further
/// checks. Share them behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    name: String,
    kind: ModuleKind,
    dependencies: Vec<Dependency>,
    values: Vec<Value>,
    types: Vec<TypeDesc>,
    exports: Vec<Export>,
    imports: Vec<Import>,
    definitions: Vec<Definition>,
    #[serde(with = "hex_bytes")]
    bytecode: Vec<u8>,
    debug: DebugInfo,
    slot_count: u32,
    #[serde(skip)]
    symbols: FxHashMap<String, DefIndex>,
    #[serde(skip)]
    slots: Vec<Option<u32>>,
}

impl Module {
    /// Validates `parts` and builds the lookup indexes.
    ///
    /// Reports the first violated invariant.
    pub(crate) fn from_parts(parts: ModuleParts) -> Result<Self, ModuleError> {
        let kind = parts.kind.unwrap_or(ModuleKind::Application);
        if parts.name.is_empty() {
            return Err(ModuleError::EmptyName);
        }
        let bytecode = parts.bytecode.ok_or(ModuleError::MissingBytecode)?;

        let tables = Tables {
            values: parts.values.len(),
            types: parts.types.len(),
            definitions: parts.definitions.len(),
            dependencies: parts.dependencies.len(),
            imports: parts.imports.len(),
        };

        for (index, value) in parts.values.iter().enumerate() {
            for target in value.references() {
                if target.index() >= index {
                    return Err(ModuleError::ForwardValueReference {
                        value: ValueIndex(index as u32),
                        target,
                    });
                }
            }
        }

        for ty in &parts.types {
            if let TypeDesc::Defined { definition } = ty {
                tables.check_definition(*definition)?;
            }
            for target in ty.type_references() {
                tables.check_type(target)?;
            }
        }

        for import in &parts.imports {
            tables.check_dependency(import.dependency)?;
        }

        let mut slots = Vec::with_capacity(parts.definitions.len());
        let mut next_slot = 0u32;
        for (index, definition) in parts.definitions.iter().enumerate() {
            tables.check_definition_refs(definition)?;
            if let Definition::Handler { start, finish, .. } = definition {
                if start > finish || *finish as usize > bytecode.len() {
                    return Err(ModuleError::HandlerOutOfBounds {
                        definition: DefIndex(index as u32),
                        start: *start,
                        finish: *finish,
                        length: bytecode.len(),
                    });
                }
            }
            if matches!(definition, Definition::Variable { .. }) {
                slots.push(Some(next_slot));
                next_slot += 1;
            } else {
                slots.push(None);
            }
        }

        let kinds = KindTable {
            definitions: &parts.definitions,
            imports: &parts.imports,
            types: &parts.types,
        };
        for (index, ty) in parts.types.iter().enumerate() {
            if let TypeDesc::Defined { definition } = ty {
                let found = kinds.kind_of(*definition)?;
                if found != DefinitionKind::Type {
                    return Err(ModuleError::TypeKindMismatch {
                        ty: TypeIndex(index as u32),
                        target: *definition,
                        found,
                    });
                }
            }
        }
        for (index, definition) in parts.definitions.iter().enumerate() {
            kinds.check(DefIndex(index as u32), definition)?;
        }

        let mut symbols =
            FxHashMap::with_capacity_and_hasher(parts.exports.len(), Default::default());
        for export in &parts.exports {
            tables.check_definition(export.definition)?;
            if symbols
                .insert(export.name.clone(), export.definition)
                .is_some()
            {
                return Err(ModuleError::DuplicateExport {
                    name: export.name.clone(),
                });
            }
        }

        if parts.slot_count < next_slot {
            return Err(ModuleError::SlotCountTooSmall {
                slot_count: parts.slot_count,
                required: next_slot,
            });
        }

        validate_debug_info(&parts.debug, tables.definitions, bytecode.len())?;

        Ok(Self {
            name: parts.name,
            kind,
            dependencies: parts.dependencies,
            values: parts.values,
            types: parts.types,
            exports: parts.exports,
            imports: parts.imports,
            definitions: parts.definitions,
            bytecode,
            debug: parts.debug,
            slot_count: parts.slot_count,
            symbols,
            slots,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub fn is_library(&self) -> bool {
        self.kind == ModuleKind::Library
    }

    pub fn is_widget(&self) -> bool {
        self.kind == ModuleKind::Widget
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value_at(&self, index: ValueIndex) -> Option<&Value> {
        self.values.get(index.index())
    }

    pub fn types(&self) -> &[TypeDesc] {
        &self.types
    }

    pub fn type_at(&self, index: TypeIndex) -> Option<&TypeDesc> {
        self.types.get(index.index())
    }

    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    pub fn debug_info(&self) -> &DebugInfo {
        &self.debug
    }

    /// The definition exported under `name`.
    pub fn resolve_symbol(&self, name: &str) -> Option<DefIndex> {
        self.symbols.get(name).copied()
    }

    pub fn definition_at(&self, index: DefIndex) -> Option<&Definition> {
        self.definitions.get(index.index())
    }

    /// The definition exported under `name`, if any.
    pub fn exported_definition(&self, name: &str) -> Option<&Definition> {
        self.resolve_symbol(name)
            .and_then(|index| self.definition_at(index))
    }

    /// Names of exported handlers, foreign ones included, in export order.
    pub fn exported_handlers(&self) -> Vec<&str> {
        self.exported_names(|kind| HANDLERS.contains(&kind))
    }

    pub fn exported_properties(&self) -> Vec<&str> {
        self.exported_names(|kind| kind == DefinitionKind::Property)
    }

    pub fn exported_events(&self) -> Vec<&str> {
        self.exported_names(|kind| kind == DefinitionKind::Event)
    }

    fn exported_names(&self, wanted: impl Fn(DefinitionKind) -> bool) -> Vec<&str> {
        self.exports
            .iter()
            .filter(|export| {
                self.definition_at(export.definition)
                    .is_some_and(|definition| wanted(definition.kind()))
            })
            .map(|export| export.name.as_str())
            .collect()
    }

    /// The signature of the exported handler `name`.
    pub fn query_handler(&self, name: &str) -> Option<&TypeDesc> {
        match self.exported_definition(name)? {
            Definition::Handler { ty, .. } | Definition::ForeignHandler { ty, .. } => {
                self.type_at(*ty)
            }
            _ => None,
        }
    }

    /// The signature of the exported event `name`.
    pub fn query_event(&self, name: &str) -> Option<&TypeDesc> {
        match self.exported_definition(name)? {
            Definition::Event { ty } => self.type_at(*ty),
            _ => None,
        }
    }

    /// The value types read and written through the exported property
    /// `name`.
    ///
    /// A variable accessor contributes its own type, a getter handler its
    /// return type and a setter handler the type of its first parameter.
    pub fn query_property(&self, name: &str) -> Option<PropertyTypes<'_>> {
        let Definition::Property { getter, setter } = self.exported_definition(name)? else {
            return None;
        };
        let getter = self.accessor_type(*getter, false)?;
        let setter = match setter {
            Some(setter) => Some(self.accessor_type(*setter, true)?),
            None => None,
        };
        Some(PropertyTypes { getter, setter })
    }

    fn accessor_type(&self, index: DefIndex, setter: bool) -> Option<&TypeDesc> {
        match self.definition_at(index)? {
            Definition::Variable { ty } => self.type_at(*ty),
            Definition::Handler { ty, .. } | Definition::ForeignHandler { ty, .. } => {
                match self.type_at(*ty)? {
                    TypeDesc::Handler { parameters, .. } if setter => {
                        self.type_at(parameters.first()?.ty)
                    }
                    TypeDesc::Handler { return_type, .. } => self.type_at(*return_type),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Number of per-instance storage slots an instance needs.
    pub fn instantiate_storage_layout(&self) -> u32 {
        self.slot_count
    }

    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    /// The storage slot of a variable definition.
    pub fn variable_slot(&self, index: DefIndex) -> Option<u32> {
        self.slots.get(index.index()).copied().flatten()
    }

    pub fn definition_name(&self, index: DefIndex) -> Option<&str> {
        self.debug.definition_name(index.index())
    }

    pub fn position_at(&self, address: u32) -> Option<SourceLine<'_>> {
        self.debug.position_at(address)
    }

    /// The same module with its debug info removed.
    pub fn without_debug_info(mut self) -> Self {
        self.debug = DebugInfo::default();
        self
    }

    /// Pretty JSON dump of every table, for inspection.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn into_parts(self) -> ModuleParts {
        ModuleParts {
            name: self.name,
            kind: Some(self.kind),
            dependencies: self.dependencies,
            values: self.values,
            types: self.types,
            exports: self.exports,
            imports: self.imports,
            definitions: self.definitions,
            bytecode: Some(self.bytecode),
            debug: self.debug,
            slot_count: self.slot_count,
        }
    }
}

struct Tables {
    values: usize,
    types: usize,
    definitions: usize,
    dependencies: usize,
    imports: usize,
}

impl Tables {
    fn check_definition(&self, index: DefIndex) -> Result<(), ModuleError> {
        if index.index() < self.definitions {
            Ok(())
        } else {
            Err(ModuleError::DefinitionOutOfRange {
                index,
                count: self.definitions,
            })
        }
    }

    fn check_value(&self, index: ValueIndex) -> Result<(), ModuleError> {
        if index.index() < self.values {
            Ok(())
        } else {
            Err(ModuleError::ValueOutOfRange {
                index,
                count: self.values,
            })
        }
    }

    fn check_type(&self, index: TypeIndex) -> Result<(), ModuleError> {
        if index.index() < self.types {
            Ok(())
        } else {
            Err(ModuleError::TypeOutOfRange {
                index,
                count: self.types,
            })
        }
    }

    fn check_dependency(&self, index: u32) -> Result<(), ModuleError> {
        if (index as usize) < self.dependencies {
            Ok(())
        } else {
            Err(ModuleError::DependencyOutOfRange {
                index,
                count: self.dependencies,
            })
        }
    }

    fn check_definition_refs(&self, definition: &Definition) -> Result<(), ModuleError> {
        if let Definition::External { import } = definition {
            if *import as usize >= self.imports {
                return Err(ModuleError::ImportOutOfRange {
                    index: *import,
                    count: self.imports,
                });
            }
        }
        for ty in definition.type_references() {
            self.check_type(ty)?;
        }
        for value in definition.value_references() {
            self.check_value(value)?;
        }
        for target in definition.definition_references() {
            self.check_definition(target)?;
        }
        Ok(())
    }
}

const HANDLERS: &[DefinitionKind] = &[DefinitionKind::Handler, DefinitionKind::ForeignHandler];
const SYNTAX_TARGETS: &[DefinitionKind] = &[
    DefinitionKind::Handler,
    DefinitionKind::ForeignHandler,
    DefinitionKind::DefinitionGroup,
];
const ACCESSORS: &[DefinitionKind] = &[
    DefinitionKind::Variable,
    DefinitionKind::Handler,
    DefinitionKind::ForeignHandler,
];

/// Checks what definition references point at. Runs after every index has
/// been range checked.
struct KindTable<'a> {
    definitions: &'a [Definition],
    imports: &'a [Import],
    types: &'a [TypeDesc],
}

impl KindTable<'_> {
    /// The kind a reference to `index` resolves to; externals take the kind
    /// of their import.
    fn kind_of(&self, index: DefIndex) -> Result<DefinitionKind, ModuleError> {
        let count = self.definitions.len();
        let definition = self
            .definitions
            .get(index.index())
            .ok_or(ModuleError::DefinitionOutOfRange { index, count })?;
        match definition {
            Definition::External { import } => self
                .imports
                .get(*import as usize)
                .map(|import| import.kind)
                .ok_or(ModuleError::ImportOutOfRange {
                    index: *import,
                    count: self.imports.len(),
                }),
            other => Ok(other.kind()),
        }
    }

    fn expect(
        &self,
        definition: DefIndex,
        target: DefIndex,
        allowed: &[DefinitionKind],
        expected: &'static str,
    ) -> Result<(), ModuleError> {
        let found = self.kind_of(target)?;
        if allowed.contains(&found) {
            Ok(())
        } else {
            Err(ModuleError::DefinitionKindMismatch {
                definition,
                target,
                expected,
                found,
            })
        }
    }

    fn check(&self, index: DefIndex, definition: &Definition) -> Result<(), ModuleError> {
        match definition {
            Definition::Property { getter, setter } => {
                self.check_accessor(index, *getter, false)?;
                if let Some(setter) = setter {
                    self.check_accessor(index, *setter, true)?;
                }
            }
            Definition::DefinitionGroup { handlers } => {
                for handler in handlers {
                    self.expect(index, *handler, HANDLERS, "handler")?;
                }
            }
            Definition::Syntax { methods, .. } => {
                for method in methods {
                    self.expect(
                        index,
                        method.handler,
                        SYNTAX_TARGETS,
                        "handler or definition group",
                    )?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    // Accessors are local: their types are needed to answer property queries.
    fn check_accessor(
        &self,
        property: DefIndex,
        accessor: DefIndex,
        setter: bool,
    ) -> Result<(), ModuleError> {
        let count = self.definitions.len();
        let definition = self
            .definitions
            .get(accessor.index())
            .ok_or(ModuleError::DefinitionOutOfRange {
                index: accessor,
                count,
            })?;
        if !ACCESSORS.contains(&definition.kind()) {
            return Err(ModuleError::DefinitionKindMismatch {
                definition: property,
                target: accessor,
                expected: "variable or handler",
                found: definition.kind(),
            });
        }
        let (Definition::Handler { ty, .. } | Definition::ForeignHandler { ty, .. }) = definition
        else {
            return Ok(());
        };
        match self.types.get(ty.index()) {
            Some(TypeDesc::Handler { parameters, .. }) if !setter || !parameters.is_empty() => {
                Ok(())
            }
            _ => Err(ModuleError::AccessorSignatureMismatch { property, accessor }),
        }
    }
}

fn validate_debug_info(
    debug: &DebugInfo,
    definitions: usize,
    bytecode_len: usize,
) -> Result<(), ModuleError> {
    let names = debug.definition_names.len();
    if names != 0 && names != definitions {
        return Err(ModuleError::DefinitionNameCount {
            names,
            count: definitions,
        });
    }

    let mut previous: Option<u32> = None;
    for record in &debug.positions {
        if record.file as usize >= debug.source_files.len() {
            return Err(ModuleError::SourceFileOutOfRange {
                address: record.address,
                file: record.file,
            });
        }
        if record.address as usize >= bytecode_len {
            return Err(ModuleError::PositionOutOfBounds {
                address: record.address,
                length: bytecode_len,
            });
        }
        if let Some(previous) = previous.filter(|p| *p >= record.address) {
            return Err(ModuleError::PositionsUnordered {
                address: record.address,
                previous,
            });
        }
        previous = Some(record.address);
    }
    Ok(())
}

mod hex_bytes {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        serializer.serialize_str(&hex)
    }
}
