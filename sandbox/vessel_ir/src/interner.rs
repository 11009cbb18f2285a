//! String interner for identifier and property names.
//!
//! Interned strings are leaked to obtain `'static` lifetimes, so lookup
//! returns plain `&'static str` without holding any lock.

// Arc is required here: the interner is shared between the embedder, the
// parser collaborator, and every evaluation.
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::Name;

struct InternTable {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name::raw()`.
    strings: Vec<&'static str>,
}

impl InternTable {
    fn with_empty() -> Self {
        // Pre-intern the empty string at index 0 so Name::EMPTY resolves.
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        Self {
            map,
            strings: vec![empty],
        }
    }
}

/// String interner.
///
/// Provides O(1) interning and lock-free lookup of previously interned
/// strings. Wrap in [`SharedInterner`] to share between the embedder,
/// the parser collaborator, and the evaluator.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(InternTable::with_empty()),
        }
    }

    /// Intern a string, returning its compact identifier.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned.
        {
            let guard = self.table.read();
            if let Some(&idx) = guard.map.get(s) {
                return Name::from_raw(idx);
            }
        }

        let mut guard = self.table.write();
        // Double-check after acquiring the write lock.
        if let Some(&idx) = guard.map.get(s) {
            return Name::from_raw(idx);
        }

        // Leak to get a 'static lifetime for lock-free lookup.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = u32::try_from(guard.strings.len()).unwrap_or_else(|_| {
            panic!("interner exceeded capacity: {} strings", guard.strings.len())
        });
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Name::from_raw(idx)
    }

    /// Resolve an interned identifier back to its string.
    ///
    /// Returns the empty string for identifiers this interner never issued.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    /// Number of interned strings (including the pre-interned empty string).
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Whether the interner holds only the pre-interned empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

/// Reference-counted handle to a [`StringInterner`].
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a handle around a fresh interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for SharedInterner {
    type Target = StringInterner;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for SharedInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedInterner").field(&self.0.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn intern_dedups() {
        let interner = StringInterner::new();
        let a = interner.intern("counter");
        let b = interner.intern("counter");
        assert_eq!(a, b);
        assert_eq!(interner.lookup(a), "counter");
    }

    #[test]
    fn empty_string_is_name_empty() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    #[test]
    fn distinct_strings_distinct_names() {
        let interner = StringInterner::new();
        let x = interner.intern("x");
        let y = interner.intern("y");
        assert_ne!(x, y);
        assert_eq!(interner.lookup(x), "x");
        assert_eq!(interner.lookup(y), "y");
    }

    #[test]
    fn unknown_name_resolves_empty() {
        let interner = StringInterner::new();
        assert_eq!(interner.lookup(Name::from_raw(9999)), "");
    }

    #[test]
    fn shared_handle_sees_interned_strings() {
        let shared = SharedInterner::new();
        let clone = shared.clone();
        let name = shared.intern("visible");
        assert_eq!(clone.lookup(name), "visible");
    }
}
