use serde::{Deserialize, Serialize};

/// Maps one bytecode address to a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub address: u32,
    /// Index into [`DebugInfo::source_files`].
    pub file: u32,
    pub line: u32,
}

/// Strippable debugging data of a module.
///
/// `definition_names` is either empty or parallel to the definition table,
/// with an empty string for unnamed definitions. Position records are kept
/// sorted by address; each one covers the addresses up to the next record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebugInfo {
    pub definition_names: Vec<String>,
    pub source_files: Vec<String>,
    pub positions: Vec<PositionRecord>,
}

/// A bytecode address resolved to a file and line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub file: &'a str,
    pub line: u32,
}

impl DebugInfo {
    pub fn is_empty(&self) -> bool {
        self.definition_names.is_empty()
            && self.source_files.is_empty()
            && self.positions.is_empty()
    }

    pub fn definition_name(&self, index: usize) -> Option<&str> {
        self.definition_names
            .get(index)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn file_for(&self, file: u32) -> Option<&str> {
        self.source_files.get(file as usize).map(String::as_str)
    }

    /// The source line covering `address`: the last record at or before it.
    pub fn position_at(&self, address: u32) -> Option<SourceLine<'_>> {
        let record = match self
            .positions
            .binary_search_by_key(&address, |record| record.address)
        {
            Ok(index) => self.positions.get(index),
            Err(index) => index.checked_sub(1).and_then(|prev| self.positions.get(prev)),
        }?;
        Some(SourceLine {
            file: self.file_for(record.file)?,
            line: record.line,
        })
    }
}
