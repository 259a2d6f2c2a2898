//! Error types for cross-validation runs.
//!
//! ## Purpose
//!
//! This module defines the error conditions the cross-validation engine can
//! raise on its own: builder misconfiguration, malformed splitter output,
//! invalid combiner input and cooperative cancellation.
//!
//! ## Design notes
//!
//! * **Contextual**: Errors include the offending values (fold index, parameter name).
//! * **Deferred**: Builder errors are recorded during configuration and reported by `build`.
//! * **No-std**: Derived with `thiserror`, which works on top of `core::error::Error`.
//! * **Transparent evaluation**: Failures inside a transfer error are not wrapped here;
//!   they travel as the transfer error's own error type, which must implement
//!   `From<CvError>`.
//!
//! ## Key concepts
//!
//! 1. **Configuration errors**: Duplicate builder parameters, unknown combiner names.
//! 2. **Splitter contract errors**: A fold after the last split, unknown sample ids.
//! 3. **Combiner errors**: Reducing an empty result sequence.
//! 4. **Predictor state errors**: Duplicating a trained predictor.
//!
//! ## Invariants
//!
//! * All variants provide sufficient context for diagnosis.
//! * Errors are never retried by the engine.
//!
//! ## Non-goals
//!
//! * This module does not perform the validation logic itself.
//! * This module does not provide error recovery or fallback strategies.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(feature = "std")]
use std::string::String;

// External dependencies
use thiserror::Error;

// ============================================================================
// Error Type
// ============================================================================

/// Error type for cross-validation operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CvError {
    /// The combiner received no per-fold results (the splitter yielded no folds).
    #[error("No fold results to combine")]
    EmptyResults,

    /// A combiner was requested by a name that is not known.
    #[error("Unknown combiner '{0}' (expected one of: mean, median, min, max)")]
    UnknownCombiner(String),

    /// A parameter was set multiple times in the builder.
    #[error(
        "Parameter '{parameter}' was set multiple times. Each parameter can only be configured once."
    )]
    DuplicateParameter {
        /// Name of the parameter that was set multiple times.
        parameter: &'static str,
    },

    /// A harvest attribute was declared more than once.
    #[error("Harvest attribute '{0}' was declared more than once")]
    DuplicateHarvestAttribute(&'static str),

    /// The splitter produced a fold after a fold carrying the last-split marker.
    #[error("Splitter yielded fold #{fold} after a fold marked as the last split")]
    FoldAfterLastSplit {
        /// Index of the offending fold.
        fold: usize,
    },

    /// A per-sample error referenced a sample id the source dataset does not contain.
    #[error("Fold #{fold} reported an error for unknown sample id {id}")]
    UnknownSample {
        /// Index of the fold that produced the contribution.
        fold: usize,
        /// Debug rendering of the sample id.
        id: String,
    },

    /// A trained predictor was about to be duplicated.
    #[error("Cannot duplicate a trained transfer error; untrain it first")]
    DuplicateTrained,

    /// A summary received a label mapping it cannot use.
    #[error("Label mapping has {got} entries, summary needs at least {min}")]
    LabelsMapMismatch {
        /// Number of entries in the mapping.
        got: usize,
        /// Number of labels the summary tracks.
        min: usize,
    },

    /// The run was cancelled at a fold boundary.
    #[error("Cross-validation cancelled before fold #{fold}")]
    Cancelled {
        /// Index of the fold that was not started.
        fold: usize,
    },

    /// Generic invalid input error with a descriptive message.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
