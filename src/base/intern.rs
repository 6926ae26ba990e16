//! Case-insensitive string interning for object-model identifiers.
//!
//! mrScript is a COM Automation dialect: `IQuestion`, `iquestion`, and
//! `IQUESTION` all name the same interface, and `doc.labels` finds the
//! `Labels` property. Interning therefore keys on a case-folded form while
//! preserving the first-seen spelling for display (hover and completion
//! show the catalog's declared casing).

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;

/// An interned identifier symbol.
///
/// `Sym` is a lightweight handle (just a u32) that represents an identifier
/// string, compared case-insensitively. The actual string is stored in an
/// [`Interner`].
///
/// Benefits:
/// - O(1) case-insensitive equality
/// - 4 bytes storage vs variable-length string
/// - Cheap to copy and hash
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Sym(u32);

impl Sym {
    /// Create a Sym from a raw index (used internally).
    #[inline]
    pub(crate) const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sym({})", self.0)
    }
}

/// String interner that deduplicates identifiers case-insensitively.
///
/// The spelling stored (and returned by [`Interner::display`]) is the one
/// seen first; for catalog identifiers that is the declared casing, since
/// the catalog is interned before any user-written names.
///
/// Thread-safe via internal locking.
#[derive(Default)]
pub struct Interner {
    inner: RwLock<InternerInner>,
}

#[derive(Default)]
struct InternerInner {
    /// Map from case-folded string to index
    map: FxHashMap<SmolStr, u32>,
    /// Storage of first-seen spellings
    strings: Vec<SmolStr>,
}

/// Case fold used for identifier comparison.
///
/// mrScript identifiers are ASCII; the fold matches the host language's
/// case-insensitive comparison rules.
fn fold(s: &str) -> SmolStr {
    SmolStr::new(s.to_ascii_lowercase())
}

impl Interner {
    /// Create a new empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an identifier, returning a `Sym` handle.
    ///
    /// Strings differing only in case intern to the same `Sym`.
    pub fn intern(&self, s: &str) -> Sym {
        let key = fold(s);

        // Fast path: already interned (read lock)
        {
            let inner = self.inner.read();
            if let Some(&index) = inner.map.get(&key) {
                return Sym::from_raw(index);
            }
        }

        // Slow path: need to insert (write lock)
        let mut inner = self.inner.write();

        // Double-check after acquiring write lock
        if let Some(&index) = inner.map.get(&key) {
            return Sym::from_raw(index);
        }

        let index = inner.strings.len() as u32;
        inner.strings.push(SmolStr::new(s));
        inner.map.insert(key, index);

        Sym::from_raw(index)
    }

    /// Intern lookup without insertion.
    ///
    /// Returns `None` if no identifier equal to `s` (case-insensitively)
    /// has been interned.
    pub fn get(&self, s: &str) -> Option<Sym> {
        let key = fold(s);
        let inner = self.inner.read();
        inner.map.get(&key).map(|&index| Sym::from_raw(index))
    }

    /// Look up the display spelling for a `Sym`.
    ///
    /// Returns `None` if the `Sym` was created by a different interner.
    pub fn lookup(&self, sym: Sym) -> Option<SmolStr> {
        let inner = self.inner.read();
        inner.strings.get(sym.0 as usize).cloned()
    }

    /// Look up the display spelling for a `Sym`.
    ///
    /// # Panics
    /// Panics if the `Sym` was not created by this interner.
    pub fn display(&self, sym: Sym) -> SmolStr {
        self.lookup(sym).expect("Sym not found in interner")
    }

    /// Get the number of interned identifiers.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Check if the interner is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Interner")
            .field("count", &inner.strings.len())
            .finish()
    }
}
