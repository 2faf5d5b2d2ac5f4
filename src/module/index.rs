use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

index_type!(
    /// Position of a definition in a module's definition table.
    DefIndex,
    "def#"
);
index_type!(
    /// Position of a constant in a module's value pool.
    ValueIndex,
    "value#"
);
index_type!(
    /// Position of a type descriptor in a module's type pool.
    TypeIndex,
    "type#"
);

/// Converts a table length into the next index, failing past `u32::MAX`.
pub(crate) fn next_index(len: usize) -> Option<u32> {
    u32::try_from(len).ok().filter(|index| *index < u32::MAX)
}
