use std::sync::{PoisonError, RwLock};

use crate::syntax::{interner::Interner, symbol::Name};

/// An [`Interner`] that several compilation units can use at once.
///
/// Known texts are found under a read lock; only the first occurrence of a
/// text takes the write lock. Names are plain indices, so a name obtained on
/// one thread is valid on every other.
#[derive(Debug, Default)]
pub struct SharedInterner {
    inner: RwLock<Interner>,
}

impl SharedInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_interner(interner: Interner) -> Self {
        Self {
            inner: RwLock::new(interner),
        }
    }

    pub fn intern(&self, text: &str) -> Name {
        if let Some(name) = self.read(|interner| interner.get(text)) {
            return name;
        }
        self.write(|interner| interner.intern(text))
    }

    pub fn intern_bytes(&self, bytes: &[u8]) -> Name {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.intern(text),
            Err(_) => self.write(|interner| interner.intern_bytes(bytes)),
        }
    }

    pub fn get(&self, text: &str) -> Option<Name> {
        self.read(|interner| interner.get(text))
    }

    /// Runs `f` on the text of `name` without copying it.
    ///
    /// # Panics
    ///
    /// Panics if `name` was not produced by this interner.
    pub fn with_text<R>(&self, name: Name, f: impl FnOnce(&str) -> R) -> R {
        self.read(|interner| f(interner.text_of(name)))
    }

    /// Returns an owned copy of the text of `name`.
    pub fn text_of(&self, name: Name) -> String {
        self.with_text(name, str::to_string)
    }

    pub fn try_text_of(&self, name: Name) -> Option<String> {
        self.read(|interner| interner.try_text_of(name).map(str::to_string))
    }

    pub fn qualify(&self, left: Name, right: Name) -> Name {
        self.write(|interner| interner.qualify(left, right))
    }

    pub fn to_path(&self, name: Name) -> Name {
        self.write(|interner| interner.to_path(name))
    }

    pub fn split_namespace(&self, name: Name) -> Option<(Name, Name)> {
        self.write(|interner| interner.split_namespace(name))
    }

    pub fn len(&self) -> usize {
        self.read(Interner::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the wrapper and returns the plain interner.
    pub fn into_inner(self) -> Interner {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<R>(&self, f: impl FnOnce(&Interner) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&*guard)
    }

    fn write<R>(&self, f: impl FnOnce(&mut Interner) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }
}
