use std::fmt;

use serde::{Deserialize, Serialize};

use crate::module::index::{DefIndex, TypeIndex, ValueIndex};

/// The closed set of definition kinds a module can contain.
///
/// The discriminants are the tags used in the binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DefinitionKind {
    External = 0,
    Type = 1,
    Constant = 2,
    Variable = 3,
    Handler = 4,
    ForeignHandler = 5,
    Property = 6,
    Event = 7,
    Syntax = 8,
    DefinitionGroup = 9,
    ContextVariable = 10,
}

impl DefinitionKind {
    pub const ALL: [DefinitionKind; 11] = [
        DefinitionKind::External,
        DefinitionKind::Type,
        DefinitionKind::Constant,
        DefinitionKind::Variable,
        DefinitionKind::Handler,
        DefinitionKind::ForeignHandler,
        DefinitionKind::Property,
        DefinitionKind::Event,
        DefinitionKind::Syntax,
        DefinitionKind::DefinitionGroup,
        DefinitionKind::ContextVariable,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            DefinitionKind::External => "external",
            DefinitionKind::Type => "type",
            DefinitionKind::Constant => "constant",
            DefinitionKind::Variable => "variable",
            DefinitionKind::Handler => "handler",
            DefinitionKind::ForeignHandler => "foreign handler",
            DefinitionKind::Property => "property",
            DefinitionKind::Event => "event",
            DefinitionKind::Syntax => "syntax",
            DefinitionKind::DefinitionGroup => "definition group",
            DefinitionKind::ContextVariable => "context variable",
        }
    }

    /// True if an import of kind `self` may bind an export of kind `found`.
    ///
    /// Kinds must match, except that a handler import accepts a foreign
    /// handler.
    pub fn accepts(self, found: DefinitionKind) -> bool {
        self == found
            || (self == DefinitionKind::Handler && found == DefinitionKind::ForeignHandler)
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxMethod {
    pub handler: DefIndex,
    /// Argument mapping; negative values select syntax markers.
    pub arguments: Vec<i32>,
}

/// One entry of a module's definition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Definition {
    /// Stands in for a definition of a dependency, by import index.
    External { import: u32 },
    Type { ty: TypeIndex },
    Constant { value: ValueIndex },
    /// Module-level variable; takes the next per-instance slot.
    Variable { ty: TypeIndex },
    Handler {
        ty: TypeIndex,
        locals: Vec<TypeIndex>,
        /// First bytecode address of the body.
        start: u32,
        /// One past the last bytecode address of the body.
        finish: u32,
    },
    ForeignHandler { ty: TypeIndex, binding: String },
    Property {
        getter: DefIndex,
        setter: Option<DefIndex>,
    },
    Event { ty: TypeIndex },
    Syntax {
        variable_count: u32,
        methods: Vec<SyntaxMethod>,
    },
    DefinitionGroup { handlers: Vec<DefIndex> },
    ContextVariable { ty: TypeIndex, default: ValueIndex },
}

impl Definition {
    pub fn kind(&self) -> DefinitionKind {
        match self {
            Definition::External { .. } => DefinitionKind::External,
            Definition::Type { .. } => DefinitionKind::Type,
            Definition::Constant { .. } => DefinitionKind::Constant,
            Definition::Variable { .. } => DefinitionKind::Variable,
            Definition::Handler { .. } => DefinitionKind::Handler,
            Definition::ForeignHandler { .. } => DefinitionKind::ForeignHandler,
            Definition::Property { .. } => DefinitionKind::Property,
            Definition::Event { .. } => DefinitionKind::Event,
            Definition::Syntax { .. } => DefinitionKind::Syntax,
            Definition::DefinitionGroup { .. } => DefinitionKind::DefinitionGroup,
            Definition::ContextVariable { .. } => DefinitionKind::ContextVariable,
        }
    }

    pub(crate) fn type_references(&self) -> Vec<TypeIndex> {
        match self {
            Definition::Type { ty }
            | Definition::Variable { ty }
            | Definition::ForeignHandler { ty, .. }
            | Definition::Event { ty }
            | Definition::ContextVariable { ty, .. } => vec![*ty],
            Definition::Handler { ty, locals, .. } => {
                std::iter::once(*ty).chain(locals.iter().copied()).collect()
            }
            _ => Vec::new(),
        }
    }

    pub(crate) fn definition_references(&self) -> Vec<DefIndex> {
        match self {
            Definition::Property { getter, setter } => {
                std::iter::once(*getter).chain(*setter).collect()
            }
            Definition::Syntax { methods, .. } => methods.iter().map(|m| m.handler).collect(),
            Definition::DefinitionGroup { handlers } => handlers.clone(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn value_references(&self) -> Vec<ValueIndex> {
        match self {
            Definition::Constant { value } | Definition::ContextVariable { default: value, .. } => {
                vec![*value]
            }
            _ => Vec::new(),
        }
    }
}

/// An entry of the dependency list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: u32,
}

/// A public name and the definition it exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    pub name: String,
    pub definition: DefIndex,
}

/// A definition this module needs from one of its dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Index into the dependency list.
    pub dependency: u32,
    pub kind: DefinitionKind,
    pub name: String,
}
