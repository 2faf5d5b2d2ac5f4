/// Byte range of one interned text inside the interner's storage buffer.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub(super) start: usize,
    pub(super) end: usize,
}

impl Entry {
    #[inline]
    pub(super) fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Length of the text in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
