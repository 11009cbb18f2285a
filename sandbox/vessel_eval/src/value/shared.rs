//! Single-threaded shared mutable cell.

// Rc is the intentional implementation detail of Shared<T>.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// A single-threaded wrapper for reference-counted interior mutability.
///
/// Wraps `Rc<RefCell<T>>` and enforces that all allocations go through
/// the `Shared::new()` factory. The same cell backs scope frames,
/// objects, and arrays: scope frames are aliased by every closure that
/// captured them, and container values are aliased by every binding
/// that holds them — that aliasing is required sandbox semantics, not
/// accidental sharing.
///
/// # Thread Safety
/// `Shared<T>` is NOT thread-safe. Evaluation is single-threaded by
/// design, so `Rc` is used rather than `Arc`.
#[repr(transparent)]
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    /// Create a new `Shared` wrapping the given value.
    #[inline]
    pub fn new(value: T) -> Self {
        Shared(Rc::new(RefCell::new(value)))
    }

    /// Borrow the inner value immutably.
    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the inner value mutably.
    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Identity comparison: whether two handles alias the same cell.
    #[inline]
    pub fn ptr_eq(a: &Shared<T>, b: &Shared<T>) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for Shared<T> {
    #[inline]
    fn clone(&self) -> Self {
        Shared(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.0).finish()
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Shared::new(T::default())
    }
}

impl<T> Deref for Shared<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
