use std::hash::BuildHasher;

use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::syntax::{entry::Entry, symbol::Name};

/// Deduplicates identifier and literal text into [`Name`] handles.
///
/// Every distinct text is stored once in a single contiguous buffer and
/// addressed by its index, so names are `u32`-sized and compare in O(1).
/// Lookups hash the text and then compare against the (usually single)
/// candidate in its bucket.
///
/// # Example
///
/// ```
/// use modscript::syntax::interner::Interner;
///
/// let mut interner = Interner::new();
/// let a = interner.intern("com.example.widget");
/// let b = interner.intern("com.example.widget");
///
/// assert_eq!(a, b);
/// assert_eq!(interner.text_of(a), "com.example.widget");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Interner {
    buckets: FxHashMap<u64, Vec<Name>>,
    entries: Vec<Entry>,
    storage: String,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an interner with room for `names` distinct texts totalling
    /// `storage_bytes` bytes.
    pub fn with_capacity(names: usize, storage_bytes: usize) -> Self {
        Self {
            buckets: FxHashMap::with_capacity_and_hasher(names, FxBuildHasher),
            entries: Vec::with_capacity(names),
            storage: String::with_capacity(storage_bytes),
        }
    }

    pub fn reserve(&mut self, names: usize, storage_bytes: usize) {
        self.buckets.reserve(names);
        self.entries.reserve(names);
        self.storage.reserve(storage_bytes);
    }

    /// Forgets every interned text but keeps the allocations.
    ///
    /// Names handed out before the call become invalid.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.entries.clear();
        self.storage.clear();
    }

    /// Number of distinct texts interned so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the name for `text`, creating it on first sight.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` distinct texts are interned.
    pub fn intern(&mut self, text: &str) -> Name {
        let hash = FxBuildHasher.hash_one(text);
        if let Some(existing) = self.find(hash, text) {
            return existing;
        }

        let index = self.entries.len();
        assert!(
            index < u32::MAX as usize,
            "name table overflow: cannot intern more than {} distinct texts",
            u32::MAX
        );
        let name = Name::new(index as u32);

        let start = self.storage.len();
        self.storage.push_str(text);
        self.entries.push(Entry::new(start, self.storage.len()));
        self.buckets.entry(hash).or_default().push(name);
        name
    }

    /// Interns a bounded byte range without the caller copying it first.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    pub fn intern_bytes(&mut self, bytes: &[u8]) -> Name {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.intern(text),
            Err(_) => {
                let lossy = String::from_utf8_lossy(bytes);
                self.intern(&lossy)
            }
        }
    }

    /// Looks `text` up without interning it.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.find(FxBuildHasher.hash_one(text), text)
    }

    /// Returns the text behind `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` was not produced by this interner.
    #[inline]
    pub fn text_of(&self, name: Name) -> &str {
        self.try_text_of(name)
            .unwrap_or_else(|| panic!("invalid name: {:?}", name))
    }

    pub fn try_text_of(&self, name: Name) -> Option<&str> {
        let entry = self.entries.get(name.as_u32() as usize)?;
        self.storage.get(entry.range())
    }

    /// Interns `"{left}.{right}"`.
    pub fn qualify(&mut self, left: Name, right: Name) -> Name {
        let joined = format!("{}.{}", self.text_of(left), self.text_of(right));
        self.intern(&joined)
    }

    /// Interns the text of `name` with every `.` replaced by `/`.
    pub fn to_path(&mut self, name: Name) -> Name {
        let path = self.text_of(name).replace('.', "/");
        self.intern(&path)
    }

    /// Splits a qualified name at its last `.` into namespace and leaf.
    ///
    /// Returns `None` for names without a namespace operator.
    pub fn split_namespace(&mut self, name: Name) -> Option<(Name, Name)> {
        let text = self.text_of(name);
        let dot = text.rfind('.')?;
        let (left, right) = (text[..dot].to_string(), text[dot + 1..].to_string());
        Some((self.intern(&left), self.intern(&right)))
    }

    /// True if the text of `name` contains the namespace operator.
    pub fn is_qualified(&self, name: Name) -> bool {
        self.text_of(name).contains('.')
    }

    fn find(&self, hash: u64, text: &str) -> Option<Name> {
        self.buckets.get(&hash)?.iter().copied().find(|candidate| {
            self.try_text_of(*candidate) == Some(text)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_reuses_name_for_same_text() {
        let mut interner = Interner::new();
        let a = interner.intern("alpha");
        let b = interner.intern("alpha");
        let c = interner.intern("beta");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.text_of(a), "alpha");
        assert_eq!(interner.text_of(c), "beta");
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut interner = Interner::new();
        assert_ne!(interner.intern("Foo"), interner.intern("foo"));
    }

    #[test]
    fn try_text_of_rejects_foreign_name() {
        let interner = Interner::new();
        assert_eq!(interner.try_text_of(Name::new(42)), None);
    }

    #[test]
    #[should_panic(expected = "invalid name")]
    fn text_of_panics_on_foreign_name() {
        let interner = Interner::new();
        let _ = interner.text_of(Name::new(42));
    }

    #[test]
    fn intern_bytes_matches_intern() {
        let mut interner = Interner::new();
        let source = b"handler Foo";
        let from_slice = interner.intern_bytes(&source[8..]);
        assert_eq!(from_slice, interner.intern("Foo"));
    }

    #[test]
    fn intern_bytes_replaces_invalid_utf8() {
        let mut interner = Interner::new();
        let name = interner.intern_bytes(&[b'a', 0xff, b'b']);
        assert_eq!(interner.text_of(name), "a\u{fffd}b");
    }

    #[test]
    fn get_does_not_insert() {
        let mut interner = Interner::new();
        assert_eq!(interner.get("missing"), None);
        let name = interner.intern("present");
        assert_eq!(interner.get("present"), Some(name));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn qualify_joins_with_dot() {
        let mut interner = Interner::new();
        let ns = interner.intern("com.example");
        let leaf = interner.intern("Widget");
        let qualified = interner.qualify(ns, leaf);
        assert_eq!(interner.text_of(qualified), "com.example.Widget");
        assert_eq!(qualified, interner.intern("com.example.Widget"));
    }

    #[test]
    fn to_path_replaces_every_dot() {
        let mut interner = Interner::new();
        let name = interner.intern("com.example.widget");
        let path = interner.to_path(name);
        assert_eq!(interner.text_of(path), "com/example/widget");

        let plain = interner.intern("plain");
        assert_eq!(interner.to_path(plain), plain);
    }

    #[test]
    fn split_namespace_uses_last_dot() {
        let mut interner = Interner::new();
        let name = interner.intern("com.example.Widget");
        let (ns, leaf) = interner.split_namespace(name).unwrap();
        assert_eq!(interner.text_of(ns), "com.example");
        assert_eq!(interner.text_of(leaf), "Widget");

        let plain = interner.intern("Widget");
        assert_eq!(interner.split_namespace(plain), None);
        assert!(!interner.is_qualified(plain));
        assert!(interner.is_qualified(name));
    }

    #[test]
    fn clear_invalidates_names() {
        let mut interner = Interner::new();
        let old = interner.intern("hello");
        interner.clear();
        assert_eq!(interner.try_text_of(old), None);
        let fresh = interner.intern("again");
        assert_eq!(interner.text_of(fresh), "again");
    }

    #[test]
    fn many_distinct_texts_stay_distinct() {
        let mut interner = Interner::with_capacity(64, 1024);
        let texts: Vec<String> = (0..200).map(|i| format!("ident_{}", i)).collect();
        let names: Vec<Name> = texts.iter().map(|t| interner.intern(t)).collect();

        for (i, name) in names.iter().enumerate() {
            assert_eq!(interner.text_of(*name), texts[i]);
            assert_eq!(interner.intern(&texts[i]), *name);
        }
        assert_eq!(interner.len(), 200);
    }

    #[test]
    fn empty_and_special_texts() {
        let mut interner = Interner::new();
        for text in ["", "tab\there", "nul\0byte", "你好"] {
            let name = interner.intern(text);
            assert_eq!(interner.text_of(name), text);
        }
    }
}
