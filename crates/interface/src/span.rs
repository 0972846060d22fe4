use crate::BytePos;
use std::{fmt, ops::Range};

/// A source code location.
///
/// Essentially a `lo..hi` byte range into a single [`SourceFile`](crate::SourceFile).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    lo: BytePos,
    hi: BytePos,
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.lo.0, self.hi.0)
    }
}

impl Span {
    /// A dummy span.
    pub const DUMMY: Self = Self { lo: BytePos(0), hi: BytePos(0) };

    /// Creates a new span from two byte positions, swapping them if needed.
    #[inline]
    pub fn new(mut lo: BytePos, mut hi: BytePos) -> Self {
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        Self { lo, hi }
    }

    /// Creates a new span from a byte range.
    #[inline]
    pub fn from_range(range: Range<usize>) -> Self {
        Self::new(BytePos::from_usize(range.start), BytePos::from_usize(range.end))
    }

    /// Returns the span as a `Range<usize>`, suitable for indexing the source text.
    #[inline]
    pub fn to_range(self) -> Range<usize> {
        self.lo.to_usize()..self.hi.to_usize()
    }

    /// Returns the span's start position.
    #[inline(always)]
    pub fn lo(self) -> BytePos {
        self.lo
    }

    /// Returns the span's end position.
    #[inline(always)]
    pub fn hi(self) -> BytePos {
        self.hi
    }

    /// Returns the length of the span in bytes.
    #[inline]
    pub fn len(self) -> usize {
        self.hi.to_usize() - self.lo.to_usize()
    }

    /// Returns `true` if the span covers no bytes.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.lo == self.hi
    }

    /// Returns a zero-width span at `self.lo()`.
    #[inline]
    pub fn shrink_to_lo(self) -> Self {
        Self { lo: self.lo, hi: self.lo }
    }

    /// Returns a zero-width span at `self.hi()`.
    #[inline]
    pub fn shrink_to_hi(self) -> Self {
        Self { lo: self.hi, hi: self.hi }
    }

    /// Returns `true` if `self` fully encloses `other`.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.lo <= other.lo && other.hi <= self.hi
    }

    /// Returns a `Span` that would enclose both `self` and `end`.
    ///
    /// ```text
    ///     ____             ___
    ///     self lorem ipsum end
    ///     ^^^^^^^^^^^^^^^^^^^^
    /// ```
    #[inline]
    pub fn to(self, end: Self) -> Self {
        Self::new(self.lo.min(end.lo), self.hi.max(end.hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join() {
        let a = Span::from_range(2..4);
        let b = Span::from_range(10..12);
        assert_eq!(a.to(b), Span::from_range(2..12));
        assert_eq!(b.to(a), Span::from_range(2..12));
        assert!(a.to(b).contains(b));
        assert!(!a.contains(b));
        assert_eq!(Span::new(BytePos(5), BytePos(1)).to_range(), 1..5);
        assert!(a.shrink_to_hi().is_empty());
    }
}
