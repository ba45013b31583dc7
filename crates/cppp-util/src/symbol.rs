//! String interning for identifiers.
//!
//! Every other preprocessor in the reference corpus interns identifiers in a
//! process-wide, thread-safe table (see the teacher's `DashMap`-backed
//! `StringTable`). That design fits a single long-lived compiler process, but
//! this core's resource model (§5 of SPEC_FULL.md) says sessions never share
//! mutable state and may run fully in parallel — a global table would be
//! either a needless contention point or an unbounded cross-session leak.
//! [`Interner`] is therefore owned by a `PreprocessSession` rather than a
//! `static`: same O(1) comparison and hashing benefits, scoped lifetime.

use rustc_hash::FxHashMap;
use std::fmt;

/// A compact, interned handle to an identifier string.
///
/// `Symbol` is `Copy` and compares in O(1); the backing string is only
/// reachable by handing the `Symbol` back to the [`Interner`] that produced
/// it via [`Interner::resolve`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Raw index into the owning interner's table. Exposed for debugging and
    /// for use as a dense map key elsewhere in the core.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol(#{})", self.0)
    }
}

/// A session-scoped string table.
///
/// Identifiers compare by byte equality (spec §4.5); interning guarantees
/// that equal byte sequences always produce the same `Symbol`, so macro table
/// lookups and hide-set membership tests reduce to integer comparisons.
#[derive(Default)]
pub struct Interner {
    map: FxHashMap<Box<str>, Symbol>,
    strings: Vec<Box<str>>,
}

impl Interner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            strings: Vec::new(),
        }
    }

    /// Intern `text`, returning the existing `Symbol` if already present or
    /// allocating a new slot otherwise.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&sym) = self.map.get(text) {
            return sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        let boxed: Box<str> = text.into();
        self.strings.push(boxed.clone());
        self.map.insert(boxed, sym);
        sym
    }

    /// Resolve a `Symbol` back to its string.
    ///
    /// # Panics
    ///
    /// Panics if `sym` was not produced by this interner. Symbols never
    /// cross session boundaries in normal use, so this indicates host misuse
    /// rather than a condition the core should recover from.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }

    /// Number of distinct strings interned so far.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
