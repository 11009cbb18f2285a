//! Loop iteration budget.
//!
//! Every loop-statement activation gets its own counter measured
//! against a single configured ceiling; nested loops count
//! independently rather than sharing a whole-program budget.
//! Exhausting a budget is an environment-policy failure: fatal,
//! non-recoverable, and deliberately invisible to guest `try`.

use crate::errors::{loop_budget_exceeded, EvalError};

/// Default loop-iteration ceiling.
///
/// Embedders running untrusted expression-sized scripts may want a
/// much smaller value; see [`EvalLimits`].
pub const DEFAULT_LOOP_ITERATIONS: usize = 100_000;

/// Default ceiling on array length.
///
/// An indexed write densely fills the array up to the written index,
/// so a single guest statement could otherwise demand an arbitrary
/// allocation.
pub const DEFAULT_ARRAY_LENGTH: usize = 100_000;

/// Resource limits threaded explicitly into each evaluation call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalLimits {
    /// Iteration ceiling applied per loop activation.
    pub max_loop_iterations: usize,
    /// Largest index a guest array write may fill up to; writes past it
    /// are silently denied like any other guarded write.
    pub max_array_length: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_loop_iterations: DEFAULT_LOOP_ITERATIONS,
            max_array_length: DEFAULT_ARRAY_LENGTH,
        }
    }
}

/// Per-loop-activation iteration counter.
#[derive(Debug)]
pub struct LoopBudget {
    used: usize,
    ceiling: usize,
}

impl LoopBudget {
    /// Create a fresh counter for one loop activation.
    pub fn new(limits: &EvalLimits) -> Self {
        Self {
            used: 0,
            ceiling: limits.max_loop_iterations,
        }
    }

    /// Account for one iteration.
    ///
    /// Exceeding the ceiling raises a fatal [`EvalError`] that guest
    /// exception handling cannot observe.
    #[inline]
    pub fn tick(&mut self) -> Result<(), EvalError> {
        self.used += 1;
        if self.used > self.ceiling {
            tracing::warn!(ceiling = self.ceiling, "loop iteration ceiling exceeded");
            return Err(loop_budget_exceeded(self.ceiling));
        }
        Ok(())
    }

    /// Iterations consumed so far.
    pub fn used(&self) -> usize {
        self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_up_to_ceiling() {
        let limits = EvalLimits {
            max_loop_iterations: 3,
            ..EvalLimits::default()
        };
        let mut budget = LoopBudget::new(&limits);
        assert!(budget.tick().is_ok());
        assert!(budget.tick().is_ok());
        assert!(budget.tick().is_ok());
        assert_eq!(budget.used(), 3);
    }

    #[test]
    fn exceeding_ceiling_is_fatal() {
        let limits = EvalLimits {
            max_loop_iterations: 1,
            ..EvalLimits::default()
        };
        let mut budget = LoopBudget::new(&limits);
        assert!(budget.tick().is_ok());
        let err = match budget.tick() {
            Err(e) => e,
            Ok(()) => panic!("expected budget exhaustion"),
        };
        assert!(err.is_fatal());
    }

    #[test]
    fn nested_budgets_are_independent() {
        let limits = EvalLimits {
            max_loop_iterations: 2,
            ..EvalLimits::default()
        };
        let mut outer = LoopBudget::new(&limits);
        for _ in 0..2 {
            assert!(outer.tick().is_ok());
            // A nested loop activation starts from zero every time.
            let mut inner = LoopBudget::new(&limits);
            assert!(inner.tick().is_ok());
            assert!(inner.tick().is_ok());
            assert!(inner.tick().is_err());
        }
        assert!(outer.tick().is_err());
    }

    #[test]
    fn default_ceiling_documented() {
        assert_eq!(
            EvalLimits::default().max_loop_iterations,
            DEFAULT_LOOP_ITERATIONS
        );
        assert_eq!(EvalLimits::default().max_array_length, DEFAULT_ARRAY_LENGTH);
    }
}
