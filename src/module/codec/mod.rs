//! Binary module images.
//!
//! Every integer is little-endian; strings and blobs carry a u32 byte length;
//! tables carry a u32 count. The layout is:
//!
//! ```text
//! "MSCM" u16:version
//! u8:kind name
//! dependencies  { name u32:version }
//! values        { u8:tag payload }
//! types         { u8:tag payload }
//! exports       { name u32:definition }
//! imports       { u32:dependency u8:kind name }
//! definitions   { u8:kind payload }
//! bytecode      u32:len bytes
//! debug         names { string } files { string } positions { u32:address u32:file u32:line }
//! u32:slot_count
//! ```
//!
//! Decoding fails closed: nothing is returned unless the whole image parses,
//! no bytes are left over, and the result passes the same validation as a
//! freshly built module.

use thiserror::Error;

use crate::module::debug_info::{DebugInfo, PositionRecord};
use crate::module::definition::{
    Definition, DefinitionKind, Dependency, Export, Import, SyntaxMethod,
};
use crate::module::errors::ModuleError;
use crate::module::index::{DefIndex, TypeIndex, ValueIndex};
use crate::module::kind::ModuleKind;
use crate::module::module::{Module, ModuleParts};
use crate::module::types::{Field, Parameter, ParameterMode, TypeDesc};
use crate::module::value::Value;

pub(crate) mod primitives;

pub(crate) use primitives::{Reader, Writer};

pub const MAGIC: &[u8; 4] = b"MSCM";
pub const FORMAT_VERSION: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("not a module image")]
    BadMagic,
    #[error("unsupported module format version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },
    #[error("unexpected end of data in {what}")]
    Truncated { what: &'static str },
    #[error("invalid UTF-8 in {what}")]
    InvalidUtf8 { what: &'static str },
    #[error("unknown {what} tag {tag}")]
    UnknownTag { what: &'static str, tag: u8 },
    #[error("{count} unexpected bytes after the module image")]
    TrailingBytes { count: usize },
    #[error("{what} is too large to encode")]
    TooLarge { what: &'static str },
    #[error("invalid module: {0}")]
    Invalid(#[from] ModuleError),
}

impl Module {
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        encode_module(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Module, FormatError> {
        decode_module(bytes)
    }
}

pub fn encode_module(module: &Module) -> Result<Vec<u8>, FormatError> {
    let mut w = Writer::new();
    w.raw(MAGIC);
    w.u16(FORMAT_VERSION);

    w.u8(module.kind().tag());
    w.string(module.name(), "module name")?;

    w.len(module.dependencies().len(), "dependencies")?;
    for dependency in module.dependencies() {
        w.string(&dependency.name, "dependency name")?;
        w.u32(dependency.version);
    }

    w.len(module.values().len(), "values")?;
    for value in module.values() {
        write_value(&mut w, value)?;
    }

    w.len(module.types().len(), "types")?;
    for ty in module.types() {
        write_type(&mut w, ty)?;
    }

    w.len(module.exports().len(), "exports")?;
    for export in module.exports() {
        w.string(&export.name, "export name")?;
        w.u32(export.definition.0);
    }

    w.len(module.imports().len(), "imports")?;
    for import in module.imports() {
        w.u32(import.dependency);
        w.u8(import.kind.tag());
        w.string(&import.name, "import name")?;
    }

    w.len(module.definitions().len(), "definitions")?;
    for definition in module.definitions() {
        write_definition(&mut w, definition)?;
    }

    w.bytes(module.bytecode(), "bytecode")?;
    write_debug_info(&mut w, module.debug_info())?;
    w.u32(module.slot_count());

    Ok(w.into_bytes())
}

pub fn decode_module(bytes: &[u8]) -> Result<Module, FormatError> {
    let mut r = Reader::new(bytes);

    if r.take(MAGIC.len(), "magic").ok() != Some(MAGIC.as_slice()) {
        return Err(FormatError::BadMagic);
    }
    let version = r.u16("format version")?;
    if version != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let kind_tag = r.u8("module kind")?;
    let kind = ModuleKind::from_tag(kind_tag).ok_or(FormatError::UnknownTag {
        what: "module kind",
        tag: kind_tag,
    })?;
    let name = r.string("module name")?;

    let mut parts = ModuleParts {
        name,
        kind: Some(kind),
        ..ModuleParts::default()
    };

    let count = r.count("dependencies", 8)?;
    for _ in 0..count {
        parts.dependencies.push(Dependency {
            name: r.string("dependency name")?,
            version: r.u32("dependency version")?,
        });
    }

    let count = r.count("values", 1)?;
    for _ in 0..count {
        parts.values.push(read_value(&mut r)?);
    }

    let count = r.count("types", 1)?;
    for _ in 0..count {
        parts.types.push(read_type(&mut r)?);
    }

    let count = r.count("exports", 8)?;
    for _ in 0..count {
        parts.exports.push(Export {
            name: r.string("export name")?,
            definition: DefIndex(r.u32("export definition")?),
        });
    }

    let count = r.count("imports", 9)?;
    for _ in 0..count {
        let dependency = r.u32("import dependency")?;
        let kind = read_definition_kind(&mut r)?;
        parts.imports.push(Import {
            dependency,
            kind,
            name: r.string("import name")?,
        });
    }

    let count = r.count("definitions", 1)?;
    for _ in 0..count {
        parts.definitions.push(read_definition(&mut r)?);
    }

    parts.bytecode = Some(r.bytes("bytecode")?);
    parts.debug = read_debug_info(&mut r)?;
    parts.slot_count = r.u32("slot count")?;

    if r.remaining() != 0 {
        return Err(FormatError::TrailingBytes {
            count: r.remaining(),
        });
    }

    Ok(Module::from_parts(parts)?)
}

fn write_value(w: &mut Writer, value: &Value) -> Result<(), FormatError> {
    match value {
        Value::Undefined => w.u8(Value::TAG_UNDEFINED),
        Value::Boolean(b) => {
            w.u8(Value::TAG_BOOLEAN);
            w.bool(*b);
        }
        Value::Integer(i) => {
            w.u8(Value::TAG_INTEGER);
            w.i64(*i);
        }
        Value::Real(f) => {
            w.u8(Value::TAG_REAL);
            w.f64(*f);
        }
        Value::String(s) => {
            w.u8(Value::TAG_STRING);
            w.string(s, "string value")?;
        }
        Value::Name(s) => {
            w.u8(Value::TAG_NAME);
            w.string(s, "name value")?;
        }
        Value::Data(bytes) => {
            w.u8(Value::TAG_DATA);
            w.bytes(bytes, "data value")?;
        }
        Value::List(items) => {
            w.u8(Value::TAG_LIST);
            w.len(items.len(), "list value")?;
            for item in items {
                w.u32(item.0);
            }
        }
        Value::Array(entries) => {
            w.u8(Value::TAG_ARRAY);
            w.len(entries.len(), "array value")?;
            for (key, item) in entries {
                w.string(key, "array key")?;
                w.u32(item.0);
            }
        }
    }
    Ok(())
}

fn read_value(r: &mut Reader<'_>) -> Result<Value, FormatError> {
    let value = match r.u8("value tag")? {
        Value::TAG_UNDEFINED => Value::Undefined,
        Value::TAG_BOOLEAN => Value::Boolean(r.bool("boolean value")?),
        Value::TAG_INTEGER => Value::Integer(r.i64("integer value")?),
        Value::TAG_REAL => Value::Real(r.f64("real value")?),
        Value::TAG_STRING => Value::String(r.string("string value")?),
        Value::TAG_NAME => Value::Name(r.string("name value")?),
        Value::TAG_DATA => Value::Data(r.bytes("data value")?),
        Value::TAG_LIST => {
            let count = r.count("list value", 4)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(ValueIndex(r.u32("list element")?));
            }
            Value::List(items)
        }
        Value::TAG_ARRAY => {
            let count = r.count("array value", 8)?;
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let key = r.string("array key")?;
                entries.push((key, ValueIndex(r.u32("array element")?)));
            }
            Value::Array(entries)
        }
        tag => return Err(FormatError::UnknownTag { what: "value", tag }),
    };
    Ok(value)
}

fn write_type(w: &mut Writer, ty: &TypeDesc) -> Result<(), FormatError> {
    match ty {
        TypeDesc::Defined { definition } => {
            w.u8(TypeDesc::TAG_DEFINED);
            w.u32(definition.0);
        }
        TypeDesc::Foreign { binding } => {
            w.u8(TypeDesc::TAG_FOREIGN);
            w.string(binding, "foreign binding")?;
        }
        TypeDesc::Optional { inner } => {
            w.u8(TypeDesc::TAG_OPTIONAL);
            w.u32(inner.0);
        }
        TypeDesc::Handler {
            parameters,
            return_type,
        } => {
            w.u8(TypeDesc::TAG_HANDLER);
            w.len(parameters.len(), "handler parameters")?;
            for parameter in parameters {
                w.u8(parameter.mode.tag());
                w.u32(parameter.ty.0);
                w.string(&parameter.name, "parameter name")?;
            }
            w.u32(return_type.0);
        }
        TypeDesc::Record { base, fields } => {
            w.u8(TypeDesc::TAG_RECORD);
            w.bool(base.is_some());
            if let Some(base) = base {
                w.u32(base.0);
            }
            w.len(fields.len(), "record fields")?;
            for field in fields {
                w.string(&field.name, "field name")?;
                w.u32(field.ty.0);
            }
        }
    }
    Ok(())
}

fn read_type(r: &mut Reader<'_>) -> Result<TypeDesc, FormatError> {
    let ty = match r.u8("type tag")? {
        TypeDesc::TAG_DEFINED => TypeDesc::Defined {
            definition: DefIndex(r.u32("defined type")?),
        },
        TypeDesc::TAG_FOREIGN => TypeDesc::Foreign {
            binding: r.string("foreign binding")?,
        },
        TypeDesc::TAG_OPTIONAL => TypeDesc::Optional {
            inner: TypeIndex(r.u32("optional type")?),
        },
        TypeDesc::TAG_HANDLER => {
            let count = r.count("handler parameters", 9)?;
            let mut parameters = Vec::with_capacity(count);
            for _ in 0..count {
                let tag = r.u8("parameter mode")?;
                let mode = ParameterMode::from_tag(tag).ok_or(FormatError::UnknownTag {
                    what: "parameter mode",
                    tag,
                })?;
                let ty = TypeIndex(r.u32("parameter type")?);
                parameters.push(Parameter {
                    mode,
                    ty,
                    name: r.string("parameter name")?,
                });
            }
            TypeDesc::Handler {
                parameters,
                return_type: TypeIndex(r.u32("return type")?),
            }
        }
        TypeDesc::TAG_RECORD => {
            let base = if r.bool("record base flag")? {
                Some(TypeIndex(r.u32("record base")?))
            } else {
                None
            };
            let count = r.count("record fields", 8)?;
            let mut fields = Vec::with_capacity(count);
            for _ in 0..count {
                let name = r.string("field name")?;
                fields.push(Field {
                    name,
                    ty: TypeIndex(r.u32("field type")?),
                });
            }
            TypeDesc::Record { base, fields }
        }
        tag => return Err(FormatError::UnknownTag { what: "type", tag }),
    };
    Ok(ty)
}

fn write_indices(
    w: &mut Writer,
    indices: impl ExactSizeIterator<Item = u32>,
    what: &'static str,
) -> Result<(), FormatError> {
    w.len(indices.len(), what)?;
    for index in indices {
        w.u32(index);
    }
    Ok(())
}

fn read_indices(r: &mut Reader<'_>, what: &'static str) -> Result<Vec<u32>, FormatError> {
    let count = r.count(what, 4)?;
    let mut indices = Vec::with_capacity(count);
    for _ in 0..count {
        indices.push(r.u32(what)?);
    }
    Ok(indices)
}

fn write_definition(w: &mut Writer, definition: &Definition) -> Result<(), FormatError> {
    w.u8(definition.kind().tag());
    match definition {
        Definition::External { import } => w.u32(*import),
        Definition::Type { ty } | Definition::Variable { ty } | Definition::Event { ty } => {
            w.u32(ty.0)
        }
        Definition::Constant { value } => w.u32(value.0),
        Definition::Handler {
            ty,
            locals,
            start,
            finish,
        } => {
            w.u32(ty.0);
            write_indices(w, locals.iter().map(|t| t.0), "handler locals")?;
            w.u32(*start);
            w.u32(*finish);
        }
        Definition::ForeignHandler { ty, binding } => {
            w.u32(ty.0);
            w.string(binding, "foreign handler binding")?;
        }
        Definition::Property { getter, setter } => {
            w.u32(getter.0);
            w.bool(setter.is_some());
            if let Some(setter) = setter {
                w.u32(setter.0);
            }
        }
        Definition::Syntax {
            variable_count,
            methods,
        } => {
            w.u32(*variable_count);
            w.len(methods.len(), "syntax methods")?;
            for method in methods {
                w.u32(method.handler.0);
                w.len(method.arguments.len(), "syntax method arguments")?;
                for argument in &method.arguments {
                    w.i32(*argument);
                }
            }
        }
        Definition::DefinitionGroup { handlers } => {
            write_indices(w, handlers.iter().map(|h| h.0), "definition group")?;
        }
        Definition::ContextVariable { ty, default } => {
            w.u32(ty.0);
            w.u32(default.0);
        }
    }
    Ok(())
}

fn read_definition_kind(r: &mut Reader<'_>) -> Result<DefinitionKind, FormatError> {
    let tag = r.u8("definition kind")?;
    DefinitionKind::from_tag(tag).ok_or(FormatError::UnknownTag {
        what: "definition kind",
        tag,
    })
}

fn read_definition(r: &mut Reader<'_>) -> Result<Definition, FormatError> {
    let definition = match read_definition_kind(r)? {
        DefinitionKind::External => Definition::External {
            import: r.u32("external import")?,
        },
        DefinitionKind::Type => Definition::Type {
            ty: TypeIndex(r.u32("type definition")?),
        },
        DefinitionKind::Constant => Definition::Constant {
            value: ValueIndex(r.u32("constant definition")?),
        },
        DefinitionKind::Variable => Definition::Variable {
            ty: TypeIndex(r.u32("variable definition")?),
        },
        DefinitionKind::Handler => {
            let ty = TypeIndex(r.u32("handler type")?);
            let locals = read_indices(r, "handler locals")?
                .into_iter()
                .map(TypeIndex)
                .collect();
            Definition::Handler {
                ty,
                locals,
                start: r.u32("handler start")?,
                finish: r.u32("handler finish")?,
            }
        }
        DefinitionKind::ForeignHandler => Definition::ForeignHandler {
            ty: TypeIndex(r.u32("foreign handler type")?),
            binding: r.string("foreign handler binding")?,
        },
        DefinitionKind::Property => {
            let getter = DefIndex(r.u32("property getter")?);
            let setter = if r.bool("property setter flag")? {
                Some(DefIndex(r.u32("property setter")?))
            } else {
                None
            };
            Definition::Property { getter, setter }
        }
        DefinitionKind::Event => Definition::Event {
            ty: TypeIndex(r.u32("event type")?),
        },
        DefinitionKind::Syntax => {
            let variable_count = r.u32("syntax variable count")?;
            let count = r.count("syntax methods", 8)?;
            let mut methods = Vec::with_capacity(count);
            for _ in 0..count {
                let handler = DefIndex(r.u32("syntax method handler")?);
                let arg_count = r.count("syntax method arguments", 4)?;
                let mut arguments = Vec::with_capacity(arg_count);
                for _ in 0..arg_count {
                    arguments.push(r.i32("syntax method argument")?);
                }
                methods.push(SyntaxMethod { handler, arguments });
            }
            Definition::Syntax {
                variable_count,
                methods,
            }
        }
        DefinitionKind::DefinitionGroup => Definition::DefinitionGroup {
            handlers: read_indices(r, "definition group")?
                .into_iter()
                .map(DefIndex)
                .collect(),
        },
        DefinitionKind::ContextVariable => Definition::ContextVariable {
            ty: TypeIndex(r.u32("context variable type")?),
            default: ValueIndex(r.u32("context variable default")?),
        },
    };
    Ok(definition)
}

fn write_debug_info(w: &mut Writer, debug: &DebugInfo) -> Result<(), FormatError> {
    w.len(debug.definition_names.len(), "definition names")?;
    for name in &debug.definition_names {
        w.string(name, "definition name")?;
    }
    w.len(debug.source_files.len(), "source files")?;
    for file in &debug.source_files {
        w.string(file, "source file")?;
    }
    w.len(debug.positions.len(), "positions")?;
    for record in &debug.positions {
        w.u32(record.address);
        w.u32(record.file);
        w.u32(record.line);
    }
    Ok(())
}

fn read_debug_info(r: &mut Reader<'_>) -> Result<DebugInfo, FormatError> {
    let mut debug = DebugInfo::default();

    let count = r.count("definition names", 4)?;
    for _ in 0..count {
        debug.definition_names.push(r.string("definition name")?);
    }
    let count = r.count("source files", 4)?;
    for _ in 0..count {
        debug.source_files.push(r.string("source file")?);
    }
    let count = r.count("positions", 12)?;
    for _ in 0..count {
        debug.positions.push(PositionRecord {
            address: r.u32("position address")?,
            file: r.u32("position file")?,
            line: r.u32("position line")?,
        });
    }
    Ok(debug)
}
