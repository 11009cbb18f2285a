//! Recursion headroom for the tree walk.
//!
//! Statement and expression evaluation recurse as deep as the guest
//! tree nests, and the embedder does not control that depth. Each
//! recursive step asks `stacker` for headroom first, spilling onto a
//! heap-allocated segment when the native stack runs short.

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const RED_ZONE: usize = 128 * 1024;
    const GROWN_SEGMENT: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, GROWN_SEGMENT, f)
}

/// `stacker` cannot grow the stack on wasm; the engine traps on
/// overflow instead of corrupting memory, so run `f` directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
