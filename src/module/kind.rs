use std::fmt;

use serde::{Deserialize, Serialize};

/// The behavioral role of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModuleKind {
    Application = 0,
    Library = 1,
    /// Widgets are instantiated by a host; nothing may depend on one.
    Widget = 2,
}

impl ModuleKind {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ModuleKind::Application),
            1 => Some(ModuleKind::Library),
            2 => Some(ModuleKind::Widget),
            _ => None,
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleKind::Application => "application",
            ModuleKind::Library => "library",
            ModuleKind::Widget => "widget",
        };
        f.write_str(name)
    }
}
