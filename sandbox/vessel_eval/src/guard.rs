//! The realm: sandbox-controlled prototypes and the member-access
//! guard.
//!
//! Every container a script observes is created here, pre-linked to
//! realm-owned prototype objects that hold the only built-ins guest
//! code can reach. All property reads and writes funnel through
//! [`Realm::get_member`] and [`Realm::set_member`]: reads on nil raise
//! a catchable error, and denied writes are discarded silently so
//! probing scripts learn nothing from the failure.

use vessel_ir::{Name, SharedInterner};

use crate::budget::EvalLimits;
use crate::errors::{nil_access, not_callable, EvalError, EvalResult};
use crate::value::{
    number_to_display, ArrayData, ArrayRef, NativeFunction, ObjectData, ObjectRef, Shared, Value,
};

/// Pre-interned hot property names.
#[derive(Clone, Copy, Debug)]
pub struct KeyNames {
    pub arguments: Name,
    pub prototype: Name,
    pub proto: Name,
    pub length: Name,
    pub constructor: Name,
    pub name: Name,
}

impl KeyNames {
    pub fn new(interner: &SharedInterner) -> Self {
        Self {
            arguments: interner.intern("arguments"),
            prototype: interner.intern("prototype"),
            proto: interner.intern("__proto__"),
            length: interner.intern("length"),
            constructor: interner.intern("constructor"),
            name: interner.intern("name"),
        }
    }
}

/// Sandbox realm: the prototype objects all containers delegate to,
/// plus the member-access policy.
pub struct Realm {
    interner: SharedInterner,
    names: KeyNames,
    object_proto: ObjectRef,
    array_proto: ObjectRef,
    /// Largest index an array write may fill up to.
    max_array_length: usize,
}

impl Realm {
    /// Create a realm with fresh prototype objects and their built-ins
    /// installed as protected (non-enumerable) entries.
    pub fn new(interner: SharedInterner, limits: EvalLimits) -> Self {
        let names = KeyNames::new(&interner);
        let object_proto = Shared::new(ObjectData::with_proto(None));
        let array_proto = Shared::new(ObjectData::with_proto(Some(object_proto.clone())));

        let realm = Self {
            interner,
            names,
            object_proto,
            array_proto,
            max_array_length: limits.max_array_length,
        };
        realm.install_object_builtins();
        realm.install_array_builtins();
        realm
    }

    pub fn names(&self) -> &KeyNames {
        &self.names
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn object_proto(&self) -> &ObjectRef {
        &self.object_proto
    }

    pub fn array_proto(&self) -> &ObjectRef {
        &self.array_proto
    }

    /// Create an empty object delegating to the realm object prototype.
    pub fn new_object(&self) -> ObjectRef {
        Shared::new(ObjectData::with_proto(Some(self.object_proto.clone())))
    }

    /// Create an array delegating to the realm array prototype.
    pub fn new_array(&self, elements: Vec<Value>) -> ArrayRef {
        Shared::new(ArrayData::with_proto(
            elements,
            Some(self.array_proto.clone()),
        ))
    }

    /// Create an object delegating to an explicit prototype (used for
    /// `new` instances, whose chain starts at the closure's prototype
    /// object).
    pub fn new_instance(&self, proto: ObjectRef) -> ObjectRef {
        Shared::new(ObjectData::with_proto(Some(proto)))
    }

    /// Expose the guest-visible constructor value on both realm
    /// prototypes as their protected `constructor` entry.
    pub fn install_constructor(&self, ctor: Value) {
        self.object_proto
            .borrow_mut()
            .define(self.names.constructor, ctor.clone(), false);
        self.array_proto
            .borrow_mut()
            .define(self.names.constructor, ctor, false);
    }

    /// Intern the property name a dynamic index expression denotes.
    pub fn key_name(&self, key: &Value) -> Name {
        match key {
            Value::Str(s) => self.interner.intern(s),
            Value::Number(n) => self.interner.intern(&number_to_display(*n)),
            other => self.interner.intern(&other.to_string()),
        }
    }

    fn install_object_builtins(&self) {
        let interner = self.interner.clone();
        let has_own = NativeFunction::new("hasOwnProperty", move |this, args| {
            let key = match args.first() {
                Some(Value::Str(s)) => interner.intern(s),
                Some(other) => interner.intern(&other.to_string()),
                None => return Ok(Value::boolean(false)),
            };
            let owned = match this {
                Value::Object(obj) => obj.borrow().has_own(key),
                Value::Array(arr) => {
                    let arr = arr.borrow();
                    interner.lookup(key) == "length"
                        || interner
                            .lookup(key)
                            .parse::<usize>()
                            .is_ok_and(|i| i < arr.len())
                }
                _ => false,
            };
            Ok(Value::boolean(owned))
        });
        let key = self.interner.intern("hasOwnProperty");
        self.object_proto
            .borrow_mut()
            .define(key, Value::Native(has_own), false);
    }

    fn install_array_builtins(&self) {
        let push = NativeFunction::new("push", |this, args| {
            if let Value::Array(arr) = this {
                let mut arr = arr.borrow_mut();
                for arg in args {
                    arr.push(arg.clone());
                }
                return Ok(Value::number(arr.len() as f64));
            }
            Ok(Value::Undefined)
        });
        let pop = NativeFunction::new("pop", |this, _args| {
            if let Value::Array(arr) = this {
                return Ok(arr.borrow_mut().pop());
            }
            Ok(Value::Undefined)
        });
        let index_of = NativeFunction::new("indexOf", |this, args| {
            if let Value::Array(arr) = this {
                let needle = args.first().cloned().unwrap_or(Value::Undefined);
                let found = arr
                    .borrow()
                    .elements()
                    .iter()
                    .position(|v| v.strict_eq(&needle));
                return Ok(Value::number(found.map_or(-1.0, |i| i as f64)));
            }
            Ok(Value::number(-1.0))
        });
        let join = NativeFunction::new("join", |this, args| {
            if let Value::Array(arr) = this {
                let sep = match args.first() {
                    Some(Value::Str(s)) => s.to_string(),
                    Some(Value::Undefined) | None => ",".to_string(),
                    Some(other) => other.to_string(),
                };
                let rendered: Vec<String> = arr
                    .borrow()
                    .elements()
                    .iter()
                    .map(|v| if v.is_nil() { String::new() } else { v.to_string() })
                    .collect();
                return Ok(Value::string(rendered.join(&sep)));
            }
            Ok(Value::string(""))
        });

        let mut proto = self.array_proto.borrow_mut();
        for (name, func) in [
            ("push", push),
            ("pop", pop),
            ("indexOf", index_of),
            ("join", join),
        ] {
            proto.define(self.interner.intern(name), Value::Native(func), false);
        }
    }

    /// Walk a delegation chain for `key`, returning the first entry.
    fn chain_get(start: Option<ObjectRef>, key: Name) -> Option<Value> {
        let mut current = start;
        while let Some(obj) = current {
            let next = {
                let obj = obj.borrow();
                if let Some(prop) = obj.get_own(key) {
                    return Some(prop.value.clone());
                }
                obj.proto()
            };
            current = next;
        }
        None
    }

    /// Guarded property read.
    ///
    /// Reads on null or undefined raise a catchable error; everything
    /// else resolves own entries first and then the delegation chain,
    /// falling back to `Undefined`.
    pub fn get_member(&self, target: &Value, key: Name) -> EvalResult {
        match target {
            Value::Undefined | Value::Null => Err(nil_access(self.interner.lookup(key))),
            Value::Object(obj) => {
                if let Some(prop) = obj.borrow().get_own(key) {
                    return Ok(prop.value.clone());
                }
                let proto = obj.borrow().proto();
                Ok(Self::chain_get(proto, key).unwrap_or(Value::Undefined))
            }
            Value::Array(arr) => {
                if key == self.names.length {
                    return Ok(Value::number(arr.borrow().len() as f64));
                }
                if let Ok(index) = self.interner.lookup(key).parse::<usize>() {
                    return Ok(arr.borrow().get(index));
                }
                let proto = arr.borrow().proto();
                Ok(Self::chain_get(proto, key).unwrap_or(Value::Undefined))
            }
            Value::Str(s) => {
                if key == self.names.length {
                    return Ok(Value::number(s.chars().count() as f64));
                }
                if let Ok(index) = self.interner.lookup(key).parse::<usize>() {
                    return Ok(s
                        .chars()
                        .nth(index)
                        .map_or(Value::Undefined, |c| Value::string(c.to_string())));
                }
                Ok(Self::chain_get(Some(self.object_proto.clone()), key)
                    .unwrap_or(Value::Undefined))
            }
            Value::Closure(closure) => {
                if key == self.names.prototype {
                    Ok(Value::Object(closure.prototype.clone()))
                } else if key == self.names.length {
                    Ok(Value::number(closure.params.len() as f64))
                } else if key == self.names.name {
                    Ok(Value::string(self.interner.lookup(closure.name)))
                } else {
                    Ok(Value::Undefined)
                }
            }
            Value::Native(native) => {
                if key == self.names.name {
                    Ok(Value::string(native.name))
                } else {
                    Ok(Value::Undefined)
                }
            }
            Value::Number(_) | Value::Bool(_) | Value::FunctionCtor(_) => Ok(Value::Undefined),
        }
    }

    /// Whether a guest write to `key` on an object is permitted:
    /// `__proto__` never, and any protected entry anywhere on the
    /// delegation chain shadows the write.
    fn can_write(&self, obj: &ObjectRef, key: Name) -> bool {
        if key == self.names.proto {
            return false;
        }
        let mut current = Some(obj.clone());
        while let Some(link) = current {
            let next = {
                let link = link.borrow();
                if let Some(prop) = link.get_own(key) {
                    return prop.enumerable;
                }
                link.proto()
            };
            current = next;
        }
        true
    }

    /// Guarded property write.
    ///
    /// Writes on null or undefined raise a catchable error. Every
    /// denied write — primitives, protected entries, array `length`,
    /// `__proto__` — is a silent no-op: the target is left unchanged
    /// and no guest-observable failure is produced.
    pub fn set_member(&self, target: &Value, key: Name, value: Value) -> Result<(), EvalError> {
        match target {
            Value::Undefined | Value::Null => Err(nil_access(self.interner.lookup(key))),
            Value::Object(obj) => {
                if self.can_write(obj, key) {
                    obj.borrow_mut().insert(key, value);
                } else {
                    tracing::debug!(key = self.interner.lookup(key), "denied object write");
                }
                Ok(())
            }
            Value::Array(arr) => {
                match self.interner.lookup(key).parse::<usize>() {
                    // An indexed write densely fills the array up to
                    // `index`, so far-out indices are denied rather
                    // than allowed to demand arbitrary allocations.
                    Ok(index) if index < self.max_array_length => {
                        arr.borrow_mut().set(index, value);
                    }
                    Ok(index) => {
                        tracing::debug!(index, "denied array write past the element ceiling");
                    }
                    Err(_) => {
                        tracing::debug!(key = self.interner.lookup(key), "denied array write");
                    }
                }
                Ok(())
            }
            _ => {
                tracing::debug!(
                    key = self.interner.lookup(key),
                    target = target.type_name(),
                    "denied write to primitive"
                );
                Ok(())
            }
        }
    }

    /// `instanceof`: walk the instance's delegation chain looking for
    /// the constructor's prototype object. Primitives are never
    /// instances; a non-callable right-hand side is a catchable error.
    pub fn instance_of(&self, value: &Value, ctor: &Value) -> Result<bool, EvalError> {
        let target_proto = match ctor {
            Value::Closure(closure) => closure.prototype.clone(),
            Value::Native(_) | Value::FunctionCtor(_) => return Ok(false),
            other => return Err(not_callable(other.type_name())),
        };
        let mut current = match value {
            Value::Object(obj) => obj.borrow().proto(),
            Value::Array(arr) => arr.borrow().proto(),
            _ => None,
        };
        while let Some(link) = current {
            if Shared::ptr_eq(&link, &target_proto) {
                return Ok(true);
            }
            current = link.borrow().proto();
        }
        Ok(false)
    }
}

impl std::fmt::Debug for Realm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Realm").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn realm() -> Realm {
        Realm::new(SharedInterner::new(), EvalLimits::default())
    }

    #[test]
    fn member_read_on_nil_is_error() {
        let realm = realm();
        let key = realm.interner().intern("a");
        let err = match realm.get_member(&Value::Null, key) {
            Err(e) => e,
            Ok(v) => panic!("expected error, got {v:?}"),
        };
        assert!(!err.is_fatal());
        assert!(err.message.contains('a'));
    }

    #[test]
    fn array_length_and_indexing() {
        let realm = realm();
        let arr = Value::Array(realm.new_array(vec![
            Value::number(1.0),
            Value::number(2.0),
            Value::number(3.0),
        ]));
        let length = realm.interner().intern("length");
        assert_eq!(realm.get_member(&arr, length), Ok(Value::number(3.0)));
        let one = realm.interner().intern("1");
        assert_eq!(realm.get_member(&arr, one), Ok(Value::number(2.0)));
        let ten = realm.interner().intern("10");
        assert_eq!(realm.get_member(&arr, ten), Ok(Value::Undefined));
    }

    #[test]
    fn array_length_write_is_silently_denied() {
        let realm = realm();
        let arr = Value::Array(realm.new_array(vec![
            Value::number(1.0),
            Value::number(2.0),
            Value::number(3.0),
        ]));
        let length = realm.interner().intern("length");
        assert_eq!(realm.set_member(&arr, length, Value::number(0.0)), Ok(()));
        assert_eq!(realm.get_member(&arr, length), Ok(Value::number(3.0)));
    }

    #[test]
    fn far_index_write_is_silently_denied() {
        let realm = Realm::new(
            SharedInterner::new(),
            EvalLimits {
                max_array_length: 16,
                ..EvalLimits::default()
            },
        );
        let arr = Value::Array(realm.new_array(vec![Value::number(1.0)]));
        let far = realm.interner().intern("1000000000");
        assert_eq!(realm.set_member(&arr, far, Value::number(1.0)), Ok(()));
        let length = realm.interner().intern("length");
        assert_eq!(realm.get_member(&arr, length), Ok(Value::number(1.0)));

        // Indices under the ceiling still fill normally.
        let near = realm.interner().intern("15");
        assert_eq!(realm.set_member(&arr, near, Value::number(2.0)), Ok(()));
        assert_eq!(realm.get_member(&arr, length), Ok(Value::number(16.0)));
    }

    #[test]
    fn proto_key_write_is_silently_denied() {
        let realm = realm();
        let obj = Value::Object(realm.new_object());
        let proto_key = realm.interner().intern("__proto__");
        assert_eq!(realm.set_member(&obj, proto_key, Value::Null), Ok(()));
        if let Value::Object(o) = &obj {
            assert!(!o.borrow().has_own(proto_key));
        }
    }

    #[test]
    fn protected_chain_entry_shadows_write() {
        let realm = realm();
        let obj = Value::Object(realm.new_object());
        let key = realm.interner().intern("hasOwnProperty");
        assert_eq!(realm.set_member(&obj, key, Value::Null), Ok(()));
        if let Value::Object(o) = &obj {
            assert!(!o.borrow().has_own(key));
        }
        // The built-in is still reachable through the chain.
        assert!(matches!(realm.get_member(&obj, key), Ok(Value::Native(_))));
    }

    #[test]
    fn primitive_write_is_silently_ignored() {
        let realm = realm();
        let key = realm.interner().intern("x");
        assert_eq!(
            realm.set_member(&Value::number(1.0), key, Value::Null),
            Ok(())
        );
    }

    #[test]
    fn string_length_and_char_access() {
        let realm = realm();
        let s = Value::string("abc");
        let length = realm.interner().intern("length");
        assert_eq!(realm.get_member(&s, length), Ok(Value::number(3.0)));
        let one = realm.interner().intern("1");
        assert_eq!(realm.get_member(&s, one), Ok(Value::string("b")));
    }

    #[test]
    fn builtins_are_hidden_from_enumeration() {
        let realm = realm();
        assert!(realm.object_proto().borrow().enumerable_keys().is_empty());
        assert!(realm.array_proto().borrow().enumerable_keys().is_empty());
    }

    #[test]
    fn key_name_normalizes_numbers() {
        let realm = realm();
        let a = realm.key_name(&Value::number(1.0));
        let b = realm.key_name(&Value::string("1"));
        assert_eq!(a, b);
    }
}
