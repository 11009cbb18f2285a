//! Lexical scope chain.
//!
//! Frames are reference-counted cells linked parent-ward, so a frame
//! outlives its activation for exactly as long as some closure still
//! captures it. Reads walk outward through the chain; writes walk the
//! same chain but stop at the first frame owning the binding, and a
//! non-enumerable owner denies the write silently.

use rustc_hash::FxHashMap;

use vessel_ir::Name;

use crate::value::{Shared, Value};

/// One binding in a frame.
#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    /// Non-enumerable bindings are embedder-installed and
    /// write-protected from guest assignment.
    enumerable: bool,
}

/// Outcome of an assignment walk over the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOutcome {
    /// An owning frame accepted the new value.
    Assigned,
    /// The first owner holds a protected binding; the write was
    /// discarded.
    Denied,
    /// No frame on the chain owns the name.
    NotFound,
}

/// A single scope frame: local bindings, the enclosing frame, and the
/// `this` value of the activation.
#[derive(Debug)]
pub struct Scope {
    bindings: FxHashMap<Name, Binding>,
    parent: Option<ScopeRef>,
    this_value: Value,
}

/// Shared handle to a frame; closures hold these to keep captured
/// frames alive.
pub type ScopeRef = Shared<Scope>;

impl Scope {
    /// Create a root frame with no parent.
    pub fn new_root(this_value: Value) -> ScopeRef {
        Shared::new(Scope {
            bindings: FxHashMap::default(),
            parent: None,
            this_value,
        })
    }

    /// Create a child frame chained to `parent`.
    pub fn with_parent(parent: ScopeRef, this_value: Value) -> ScopeRef {
        Shared::new(Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
            this_value,
        })
    }

    /// Define (or redefine) a guest-writable binding in this frame.
    pub fn define(&mut self, name: Name, value: Value) {
        self.bindings.insert(
            name,
            Binding {
                value,
                enumerable: true,
            },
        );
    }

    /// Define a protected binding in this frame. Guest assignment to it
    /// is silently discarded.
    pub fn define_builtin(&mut self, name: Name, value: Value) {
        self.bindings.insert(
            name,
            Binding {
                value,
                enumerable: false,
            },
        );
    }

    /// The `this` value of this activation.
    pub fn this_value(&self) -> Value {
        self.this_value.clone()
    }

    /// Whether this frame owns the binding.
    pub fn has_own(&self, name: Name) -> bool {
        self.bindings.contains_key(&name)
    }
}

/// Read a name, walking outward from `scope` through parent frames.
pub fn lookup(scope: &ScopeRef, name: Name) -> Option<Value> {
    let mut current = scope.clone();
    loop {
        let parent = {
            let frame = current.borrow();
            if let Some(binding) = frame.bindings.get(&name) {
                return Some(binding.value.clone());
            }
            frame.parent.clone()
        };
        match parent {
            Some(p) => current = p,
            None => return None,
        }
    }
}

/// Assign to a name, walking outward from `scope`.
///
/// The walk stops at the first frame owning the binding: a writable
/// owner takes the value, a protected owner denies the write. When no
/// frame owns the name the caller decides where to create it.
pub fn assign(scope: &ScopeRef, name: Name, value: Value) -> AssignOutcome {
    let mut current = scope.clone();
    loop {
        let parent = {
            let mut frame = current.borrow_mut();
            if let Some(binding) = frame.bindings.get_mut(&name) {
                if binding.enumerable {
                    binding.value = value;
                    return AssignOutcome::Assigned;
                }
                return AssignOutcome::Denied;
            }
            frame.parent.clone()
        };
        match parent {
            Some(p) => current = p,
            None => return AssignOutcome::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vessel_ir::Name;

    fn name(raw: u32) -> Name {
        Name::from_raw(raw)
    }

    #[test]
    fn lookup_walks_parents() {
        let root = Scope::new_root(Value::Null);
        root.borrow_mut().define(name(1), Value::number(10.0));
        let child = Scope::with_parent(root, Value::Null);
        assert_eq!(lookup(&child, name(1)), Some(Value::number(10.0)));
        assert_eq!(lookup(&child, name(2)), None);
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let root = Scope::new_root(Value::Null);
        root.borrow_mut().define(name(1), Value::number(1.0));
        let child = Scope::with_parent(root.clone(), Value::Null);
        child.borrow_mut().define(name(1), Value::number(2.0));
        assert_eq!(lookup(&child, name(1)), Some(Value::number(2.0)));
        assert_eq!(lookup(&root, name(1)), Some(Value::number(1.0)));
    }

    #[test]
    fn assign_updates_owning_frame() {
        let root = Scope::new_root(Value::Null);
        root.borrow_mut().define(name(1), Value::number(1.0));
        let child = Scope::with_parent(root.clone(), Value::Null);
        assert_eq!(
            assign(&child, name(1), Value::number(9.0)),
            AssignOutcome::Assigned
        );
        assert_eq!(lookup(&root, name(1)), Some(Value::number(9.0)));
        assert!(!child.borrow().has_own(name(1)));
    }

    #[test]
    fn protected_binding_denies_write() {
        let root = Scope::new_root(Value::Null);
        root.borrow_mut()
            .define_builtin(name(1), Value::string("builtin"));
        let child = Scope::with_parent(root.clone(), Value::Null);
        assert_eq!(
            assign(&child, name(1), Value::number(0.0)),
            AssignOutcome::Denied
        );
        assert_eq!(lookup(&root, name(1)), Some(Value::string("builtin")));
    }

    #[test]
    fn unknown_name_reports_not_found() {
        let root = Scope::new_root(Value::Null);
        assert_eq!(
            assign(&root, name(7), Value::Null),
            AssignOutcome::NotFound
        );
    }

    #[test]
    fn captured_frame_outlives_activation() {
        let captured = {
            let root = Scope::new_root(Value::Null);
            let frame = Scope::with_parent(root, Value::Null);
            frame.borrow_mut().define(name(1), Value::number(5.0));
            frame
        };
        assert_eq!(lookup(&captured, name(1)), Some(Value::number(5.0)));
    }
}
