//! Static planning of literal ranges.
//!
//! A [`RangePlan`] is computed for ranges whose bounds are all literals. It
//! uses the same arithmetic as the emitted loop: the bound variable takes the
//! values `first + step * k` for `k` in `0..=count`, so the planned sequence
//! is exactly what the generated code iterates over.

use std::fmt;

/// Relative tolerance when deciding whether `end` is a whole number of steps away.
const STEP_TOLERANCE: f64 = 1e-9;

/// Why a literal range cannot be iterated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeProblem {
    /// The second term equals the first.
    ZeroStep,
    /// `end` lies behind `first` in the direction of the step.
    Backwards { first: f64, end: f64 },
    /// `end` is not `first` plus a whole multiple of the step.
    Unreachable { end: f64, step: f64 },
}

impl fmt::Display for RangeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeProblem::ZeroStep => f.write_str("step is zero"),
            RangeProblem::Backwards { first, end } => {
                write!(f, "end {end} lies before first {first}")
            }
            RangeProblem::Unreachable { end, step } => {
                write!(f, "end {end} is not reached in whole steps of {step}")
            }
        }
    }
}

/// Step and iteration count of a literal range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangePlan {
    pub first: f64,
    pub step: f64,
    /// Index of the last value; the range has `count + 1` values.
    pub count: u64,
}

impl RangePlan {
    /// `first .. end` with unit step. `end` need not be a whole step away;
    /// the range stops at the last value not past it.
    pub fn two_bound(first: f64, end: f64) -> Result<Self, RangeProblem> {
        if end < first {
            return Err(RangeProblem::Backwards { first, end });
        }
        Ok(Self {
            first,
            step: 1.0,
            count: (end - first).floor() as u64,
        })
    }

    /// `first, second .. end`, stepping by `second - first`.
    pub fn three_term(first: f64, second: f64, end: f64) -> Result<Self, RangeProblem> {
        let step = second - first;
        if step == 0.0 {
            return Err(RangeProblem::ZeroStep);
        }
        let quotient = (end - first) / step;
        if quotient < 0.0 {
            return Err(RangeProblem::Backwards { first, end });
        }
        let whole = quotient.round();
        if (quotient - whole).abs() > STEP_TOLERANCE * whole.max(1.0) {
            return Err(RangeProblem::Unreachable { end, step });
        }
        Ok(Self {
            first,
            step,
            count: whole as u64,
        })
    }

    /// Number of values in the range.
    #[inline]
    pub fn len(&self) -> u64 {
        self.count + 1
    }

    /// A plan always has at least one value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The bound values, in order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=self.count).map(move |k| self.first + self.step * k as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_range_hits_every_multiple() {
        let plan = RangePlan::three_term(0.0, 2.0, 10.0).unwrap();
        assert_eq!(plan.count, 5);
        let values: Vec<f64> = plan.values().collect();
        assert_eq!(values, [0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn fractional_step_does_not_drift() {
        let plan = RangePlan::three_term(0.0, 0.1, 1.0).unwrap();
        assert_eq!(plan.len(), 11);
        let last = plan.values().last().unwrap();
        assert!((last - 1.0).abs() < 1e-12);
    }

    #[test]
    fn descending_range() {
        let plan = RangePlan::three_term(10.0, 8.0, 0.0).unwrap();
        assert_eq!(plan.values().collect::<Vec<_>>(), [10.0, 8.0, 6.0, 4.0, 2.0, 0.0]);
    }

    #[test]
    fn unreachable_end_rejected() {
        assert_eq!(
            RangePlan::three_term(0.0, 2.0, 9.0),
            Err(RangeProblem::Unreachable { end: 9.0, step: 2.0 })
        );
        assert_eq!(RangePlan::three_term(1.0, 1.0, 5.0), Err(RangeProblem::ZeroStep));
        assert!(matches!(
            RangePlan::three_term(0.0, 1.0, -3.0),
            Err(RangeProblem::Backwards { .. })
        ));
    }

    #[test]
    fn two_bound_counts_inclusive() {
        let plan = RangePlan::two_bound(1.0, 4.0).unwrap();
        assert_eq!(plan.values().collect::<Vec<_>>(), [1.0, 2.0, 3.0, 4.0]);
        assert!(RangePlan::two_bound(3.0, 1.0).is_err());
    }
}
