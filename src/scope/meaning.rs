use std::fmt;

use serde::{Deserialize, Serialize};

use crate::module::index::{DefIndex, TypeIndex, ValueIndex};

/// What a name denotes in the scope where it was bound.
///
/// The resolver never looks inside a meaning; it only stores and returns
/// it. Callers match on it exhaustively when they emit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Meaning {
    /// A handler-local variable, by local slot.
    Local(u32),
    /// A handler parameter, by position.
    Parameter(u32),
    Handler(DefIndex),
    /// A module-level variable definition.
    Variable(DefIndex),
    Constant(ValueIndex),
    Type(TypeIndex),
    Property(DefIndex),
    Event(DefIndex),
    /// An imported module, by dependency index.
    Module(u32),
}

impl Meaning {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Meaning::Local(_) => "local",
            Meaning::Parameter(_) => "parameter",
            Meaning::Handler(_) => "handler",
            Meaning::Variable(_) => "variable",
            Meaning::Constant(_) => "constant",
            Meaning::Type(_) => "type",
            Meaning::Property(_) => "property",
            Meaning::Event(_) => "event",
            Meaning::Module(_) => "module",
        }
    }

    /// The definition this meaning refers to, if it refers to one.
    pub fn definition(&self) -> Option<DefIndex> {
        match self {
            Meaning::Handler(index)
            | Meaning::Variable(index)
            | Meaning::Property(index)
            | Meaning::Event(index) => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Meaning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meaning::Local(slot) | Meaning::Parameter(slot) | Meaning::Module(slot) => {
                write!(f, "{} {}", self.kind_name(), slot)
            }
            Meaning::Handler(index)
            | Meaning::Variable(index)
            | Meaning::Property(index)
            | Meaning::Event(index) => write!(f, "{} {}", self.kind_name(), index),
            Meaning::Constant(index) => write!(f, "constant {}", index),
            Meaning::Type(index) => write!(f, "type {}", index),
        }
    }
}
