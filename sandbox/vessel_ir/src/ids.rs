//! Arena indices and ranges for the flat syntax tree.
//!
//! Nodes reference their children by `u32` indices instead of `Box`
//! pointers; lists of children are `(start, len)` ranges into side
//! tables. `u32::MAX` is the sentinel for optional slots.

use std::fmt;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel for optional slots.
            pub const INVALID: $name = $name(u32::MAX);

            /// Create a new id.
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Index into the owning arena table.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this id refers to a real node.
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                } else {
                    write!(f, concat!(stringify!($name), "::INVALID"))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

macro_rules! define_range {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        #[repr(C)]
        pub struct $name {
            pub start: u32,
            pub len: u16,
        }

        impl $name {
            /// Empty range.
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            /// Create a new range.
            #[inline]
            pub const fn new(start: u32, len: u16) -> Self {
                $name { start, len }
            }

            /// Check if the range is empty.
            #[inline]
            pub const fn is_empty(&self) -> bool {
                self.len == 0
            }

            /// Number of elements.
            #[inline]
            pub const fn len(&self) -> usize {
                self.len as usize
            }

            /// Start index into the owning side table.
            #[inline]
            pub const fn start(&self) -> usize {
                self.start as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "({}..+{})"),
                    self.start, self.len
                )
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::EMPTY
            }
        }
    };
}

define_id! {
    /// Index into the expression arena.
    ExprId
}

define_id! {
    /// Index into the statement arena.
    StmtId
}

define_id! {
    /// Index into the catch-handler side table.
    HandlerId
}

define_range! {
    /// Range of expression ids in the flattened expression-list table.
    ExprRange
}

define_range! {
    /// Range of statement ids in the flattened statement-list table.
    StmtRange
}

define_range! {
    /// Range of names (parameter lists) in the name side table.
    NameRange
}

define_range! {
    /// Range of object-literal property initializers.
    PropRange
}

define_range! {
    /// Range of variable declarators.
    DeclRange
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_sentinel() {
        assert!(!ExprId::INVALID.is_valid());
        assert!(ExprId::new(0).is_valid());
        assert_eq!(StmtId::default(), StmtId::INVALID);
    }

    #[test]
    fn range_len() {
        let range = ExprRange::new(4, 3);
        assert_eq!(range.len(), 3);
        assert_eq!(range.start(), 4);
        assert!(StmtRange::EMPTY.is_empty());
    }
}
