use crate::TokenKind;
use std::fmt;

const WORDS: usize = 3;
const _: () = assert!(TokenKind::COUNT <= WORDS * 64, "TokenSet is too small for TokenKind");

/// A set of [`TokenKind`]s, stored as a fixed-size bitset.
///
/// All builders are `const` so trigger and follow sets can be declared as constants.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TokenSet([u64; WORDS]);

impl TokenSet {
    /// The empty set.
    pub const EMPTY: Self = Self([0; WORDS]);

    /// Creates a set containing `kinds`.
    pub const fn new(kinds: &[TokenKind]) -> Self {
        let mut set = Self::EMPTY;
        let mut i = 0;
        while i < kinds.len() {
            set = set.with(kinds[i]);
            i += 1;
        }
        set
    }

    /// Returns this set with `kind` added.
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        let (word, bit) = Self::slot(kind);
        let mut words = self.0;
        words[word] |= bit;
        Self(words)
    }

    /// Returns the union of two sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        let mut words = self.0;
        let mut i = 0;
        while i < WORDS {
            words[i] |= other.0[i];
            i += 1;
        }
        Self(words)
    }

    /// Returns `true` if `kind` is in the set.
    #[inline]
    pub const fn contains(self, kind: TokenKind) -> bool {
        let (word, bit) = Self::slot(kind);
        self.0[word] & bit != 0
    }

    /// Returns `true` if the set has no members.
    #[inline]
    pub const fn is_empty(self) -> bool {
        let mut i = 0;
        while i < WORDS {
            if self.0[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Returns the number of members.
    pub fn len(self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the members in declaration order of [`TokenKind`].
    pub fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL.iter().copied().filter(move |&k| self.contains(k))
    }

    #[inline]
    const fn slot(kind: TokenKind) -> (usize, u64) {
        let i = kind as usize;
        (i / 64, 1 << (i % 64))
    }
}

impl FromIterator<TokenKind> for TokenSet {
    fn from_iter<I: IntoIterator<Item = TokenKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
