use serde::{Deserialize, Serialize};

/// A handle to an interned piece of text.
///
/// Names are created by the [`Interner`](super::interner::Interner) and compare
/// equal exactly when their text is byte-identical. They are cheap to copy,
/// hash and compare, so the scope resolver keys its frames on them directly.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct Name(u32);

impl Name {
    /// Creates a name from a raw index.
    ///
    /// Only the interner should do this; resolving a name that it did not
    /// hand out panics.
    #[inline]
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this name.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
