use serde::{Deserialize, Serialize};

use crate::module::index::ValueIndex;

/// A constant in a module's value pool.
///
/// Aggregates refer to other pool entries by index; those entries must come
/// earlier in the pool, so the pool never contains a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Undefined,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
    Name(String),
    Data(Vec<u8>),
    List(Vec<ValueIndex>),
    Array(Vec<(String, ValueIndex)>),
}

impl Value {
    pub(crate) const TAG_UNDEFINED: u8 = 0;
    pub(crate) const TAG_BOOLEAN: u8 = 1;
    pub(crate) const TAG_INTEGER: u8 = 2;
    pub(crate) const TAG_REAL: u8 = 3;
    pub(crate) const TAG_STRING: u8 = 4;
    pub(crate) const TAG_NAME: u8 = 5;
    pub(crate) const TAG_DATA: u8 = 6;
    pub(crate) const TAG_LIST: u8 = 7;
    pub(crate) const TAG_ARRAY: u8 = 8;

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::String(_) => "string",
            Value::Name(_) => "name",
            Value::Data(_) => "data",
            Value::List(_) => "list",
            Value::Array(_) => "array",
        }
    }

    /// Pool entries this value refers to.
    pub fn references(&self) -> Vec<ValueIndex> {
        match self {
            Value::List(items) => items.clone(),
            Value::Array(entries) => entries.iter().map(|(_, value)| *value).collect(),
            _ => Vec::new(),
        }
    }
}
