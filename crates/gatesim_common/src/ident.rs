//! Interned identifiers for chip and pin names.
//!
//! HDL names are case-insensitive: `Nand`, `NAND` and `nand` name the same
//! chip. Every name is therefore interned twice, once verbatim for display
//! and once case-folded as a lookup key. Both are plain [`Ident`]s.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A unique identifier for a chip, pin or part name.
///
/// Identifiers are interned strings represented as a `u32` index into a
/// string interner, giving O(1) equality and O(1) cloning.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw `u32` index.
    ///
    /// Intended for tests. Normal code obtains identifiers from an [`Interner`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32` which is always a valid `usize` on 32-bit and
// 64-bit platforms. `try_from_usize` rejects values that don't fit in `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner backed by [`lasso::ThreadedRodeo`].
///
/// Shared by the parser, the elaborator and the simulator so that names
/// resolved in one phase compare equal in the next.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a string verbatim, returning its [`Ident`].
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Interns the case-folded form of `s`, returning the lookup key used
    /// for case-insensitive name comparison.
    pub fn fold(&self, s: &str) -> Ident {
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            self.rodeo.get_or_intern(s.to_ascii_lowercase())
        } else {
            self.rodeo.get_or_intern(s)
        }
    }

    /// Returns the lookup key of an already interned identifier.
    pub fn fold_ident(&self, ident: Ident) -> Ident {
        let text = self.resolve(ident).to_string();
        self.fold(&text)
    }

    /// Returns the identifier for `s` if it has been interned, without interning it.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Resolves an [`Ident`] back to its string value.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
