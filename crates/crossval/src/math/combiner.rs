//! Reduction of per-fold error values to a single summary value.
//!
//! ## Purpose
//!
//! This module provides the combiners used to aggregate the error values of
//! all cross-validation folds: the grand mean (default), median, minimum and
//! maximum, plus selection by name.
//!
//! ## Design notes
//!
//! * **Pure**: Combiners never mutate their input and hold no state.
//! * **Explicit empty case**: Every built-in combiner rejects an empty sequence
//!   with [`CvError::EmptyResults`] rather than inventing a sentinel.
//! * **NaN propagation**: A NaN fold result makes every built-in combiner return NaN.
//! * **Quickselect**: The median is computed in O(n) on a scratch copy.
//! * **Open**: Any `Fn(&[T]) -> Result<T, CvError>` closure is a combiner.
//!
//! ## Invariants
//!
//! * All built-in combiners are independent of the order of their input.
//! * Custom combiners may depend on fold order and must document it.
//!
//! ## Non-goals
//!
//! * This module does not weight folds by their size.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::string::ToString;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::string::ToString;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::cmp::Ordering::Equal;
use core::str::FromStr;
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::CvError;

// ============================================================================
// Combiner Trait
// ============================================================================

/// Reduces the ordered per-fold error values of a run to one value.
pub trait Combiner<T> {
    /// Combine the per-fold results.
    fn combine(&self, results: &[T]) -> Result<T, CvError>;

    /// Human-readable name used in summaries.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<T, F> Combiner<T> for F
where
    F: Fn(&[T]) -> Result<T, CvError>,
{
    fn combine(&self, results: &[T]) -> Result<T, CvError> {
        self(results)
    }
}

// ============================================================================
// Built-in Combiners
// ============================================================================

/// Arithmetic mean of all fold results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GrandMean;

impl<T: Float> Combiner<T> for GrandMean {
    fn combine(&self, results: &[T]) -> Result<T, CvError> {
        CombinerKind::Mean.apply(results)
    }

    fn name(&self) -> &str {
        CombinerKind::Mean.name()
    }
}

/// Built-in combiners selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombinerKind {
    /// Arithmetic mean (`"mean"`).
    #[default]
    Mean,

    /// Median, average of the two middle values for even lengths (`"median"`).
    Median,

    /// Smallest fold result (`"min"`).
    Min,

    /// Largest fold result (`"max"`).
    Max,
}

impl CombinerKind {
    /// Name accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Reduce `results` with this combiner.
    pub fn apply<T: Float>(self, results: &[T]) -> Result<T, CvError> {
        if results.is_empty() {
            return Err(CvError::EmptyResults);
        }

        // NaN has no place in the ordering used by median, min and max
        if results.iter().any(|v| v.is_nan()) {
            return Ok(T::nan());
        }

        let value = match self {
            Self::Mean => {
                let n = T::from(results.len()).ok_or_else(|| {
                    CvError::InvalidInput("fold count does not fit the value type".to_string())
                })?;
                results.iter().fold(T::zero(), |acc, &v| acc + v) / n
            }
            Self::Median => {
                let mut scratch: Vec<T> = results.to_vec();
                median_inplace(&mut scratch)
            }
            Self::Min => results.iter().copied().fold(T::infinity(), T::min),
            Self::Max => results.iter().copied().fold(T::neg_infinity(), T::max),
        };

        Ok(value)
    }
}

impl<T: Float> Combiner<T> for CombinerKind {
    fn combine(&self, results: &[T]) -> Result<T, CvError> {
        self.apply(results)
    }

    fn name(&self) -> &str {
        CombinerKind::name(*self)
    }
}

impl FromStr for CombinerKind {
    type Err = CvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" | "grand_mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            _ => Err(CvError::UnknownCombiner(s.to_string())),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

// Median of a non-empty, NaN-free slice via quickselect; reorders the slice.
fn median_inplace<T: Float>(vals: &mut [T]) -> T {
    let n = vals.len();
    let mid = n / 2;

    vals.select_nth_unstable_by(mid, |a, b| a.partial_cmp(b).unwrap_or(Equal));
    let upper = vals[mid];

    if n % 2 == 1 {
        return upper;
    }

    // Largest value of the lower half
    let lower = vals[..mid]
        .iter()
        .copied()
        .fold(T::neg_infinity(), T::max);

    (lower + upper) / (T::one() + T::one())
}
