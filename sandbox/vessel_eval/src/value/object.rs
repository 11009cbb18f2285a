//! Sandboxed container values.
//!
//! Objects and arrays are constructed exclusively through the realm's
//! constructors (see `crate::guard::Realm`), so every container carries
//! sandbox-controlled prototype links and per-key enumerability flags
//! and never a host-native identity. The constructors here are
//! `pub(crate)` to make that the only path.

use rustc_hash::FxHashMap;

use vessel_ir::Name;

use super::shared::Shared;
use super::Value;

/// One own entry of an object.
#[derive(Clone, Debug)]
pub struct Property {
    pub value: Value,
    /// Non-enumerable entries model built-ins: invisible to `for-in`
    /// and write-protected anywhere on the delegation chain.
    pub enumerable: bool,
}

/// A plain sandbox object: insertion-ordered own entries plus an
/// explicit prototype link.
#[derive(Debug, Default)]
pub struct ObjectData {
    /// Own entries in insertion order (`for-in` enumeration order).
    entries: Vec<(Name, Property)>,
    /// Name -> position in `entries`.
    index: FxHashMap<Name, usize>,
    proto: Option<ObjectRef>,
}

/// Shared handle to an object.
pub type ObjectRef = Shared<ObjectData>;

impl ObjectData {
    pub(crate) fn with_proto(proto: Option<ObjectRef>) -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
            proto,
        }
    }

    /// The next link in the delegation chain, or none at the root.
    pub fn proto(&self) -> Option<ObjectRef> {
        self.proto.clone()
    }

    /// Look up an own entry.
    pub fn get_own(&self, name: Name) -> Option<&Property> {
        self.index.get(&name).map(|&i| &self.entries[i].1)
    }

    /// Whether an own entry exists.
    pub fn has_own(&self, name: Name) -> bool {
        self.index.contains_key(&name)
    }

    /// Insert or overwrite an own enumerable entry.
    pub(crate) fn insert(&mut self, name: Name, value: Value) {
        self.define(name, value, true);
    }

    /// Insert or overwrite an own entry with explicit enumerability.
    pub(crate) fn define(&mut self, name: Name, value: Value, enumerable: bool) {
        if let Some(&i) = self.index.get(&name) {
            self.entries[i].1 = Property { value, enumerable };
        } else {
            self.index.insert(name, self.entries.len());
            self.entries.push((name, Property { value, enumerable }));
        }
    }

    /// Own enumerable keys in insertion order.
    pub fn enumerable_keys(&self) -> Vec<Name> {
        self.entries
            .iter()
            .filter(|(_, p)| p.enumerable)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Number of own entries (enumerable or not).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the object has no own entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A sandbox array: ordered elements plus an explicit prototype link.
#[derive(Debug, Default)]
pub struct ArrayData {
    elements: Vec<Value>,
    proto: Option<ObjectRef>,
}

/// Shared handle to an array.
pub type ArrayRef = Shared<ArrayData>;

impl ArrayData {
    pub(crate) fn with_proto(elements: Vec<Value>, proto: Option<ObjectRef>) -> Self {
        Self { elements, proto }
    }

    /// The next link in the delegation chain, or none at the root.
    pub fn proto(&self) -> Option<ObjectRef> {
        self.proto.clone()
    }

    /// Element at `index`, or `Undefined` past the end.
    pub fn get(&self, index: usize) -> Value {
        self.elements.get(index).cloned().unwrap_or(Value::Undefined)
    }

    /// Set element at `index`, growing with `Undefined` holes.
    pub(crate) fn set(&mut self, index: usize, value: Value) {
        if index >= self.elements.len() {
            self.elements.resize(index + 1, Value::Undefined);
        }
        self.elements[index] = value;
    }

    /// Append an element.
    pub(crate) fn push(&mut self, value: Value) {
        self.elements.push(value);
    }

    /// Remove and return the last element.
    pub(crate) fn pop(&mut self) -> Value {
        self.elements.pop().unwrap_or(Value::Undefined)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in order.
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }
}
