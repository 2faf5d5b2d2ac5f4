use serde::{Deserialize, Serialize};

use crate::module::index::{DefIndex, TypeIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterMode {
    In,
    Out,
    InOut,
}

impl ParameterMode {
    pub(crate) fn tag(self) -> u8 {
        match self {
            ParameterMode::In => 0,
            ParameterMode::Out => 1,
            ParameterMode::InOut => 2,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ParameterMode::In),
            1 => Some(ParameterMode::Out),
            2 => Some(ParameterMode::InOut),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub mode: ParameterMode,
    pub ty: TypeIndex,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: TypeIndex,
}

/// An entry of a module's type pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDesc {
    /// The type named by a `Type` definition of this module.
    Defined { definition: DefIndex },
    /// A host type, found by its binding string at load time.
    Foreign { binding: String },
    Optional { inner: TypeIndex },
    Handler {
        parameters: Vec<Parameter>,
        return_type: TypeIndex,
    },
    Record {
        base: Option<TypeIndex>,
        fields: Vec<Field>,
    },
}

impl TypeDesc {
    pub(crate) const TAG_DEFINED: u8 = 0;
    pub(crate) const TAG_FOREIGN: u8 = 1;
    pub(crate) const TAG_OPTIONAL: u8 = 2;
    pub(crate) const TAG_HANDLER: u8 = 3;
    pub(crate) const TAG_RECORD: u8 = 4;

    /// Other pool types this one is built from.
    pub fn type_references(&self) -> Vec<TypeIndex> {
        match self {
            TypeDesc::Defined { .. } | TypeDesc::Foreign { .. } => Vec::new(),
            TypeDesc::Optional { inner } => vec![*inner],
            TypeDesc::Handler {
                parameters,
                return_type,
            } => parameters
                .iter()
                .map(|p| p.ty)
                .chain(std::iter::once(*return_type))
                .collect(),
            TypeDesc::Record { base, fields } => {
                base.iter().copied().chain(fields.iter().map(|f| f.ty)).collect()
            }
        }
    }
}
