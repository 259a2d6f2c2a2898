//! Predictor and transfer error contracts.
//!
//! ## Purpose
//!
//! This module defines the two collaborator traits the engine drives on every
//! fold: the [`Predictor`] that is trained and queried, and the
//! [`TransferError`] that wraps it together with an error function and
//! optional diagnostic sub-state.
//!
//! ## Design notes
//!
//! * **Explicit training state**: Predictors report [`TrainingState`] so the engine
//!   can refuse to duplicate a trained instance.
//! * **Opt-in capabilities**: Receiving a held-out test reference is a default-off
//!   capability; predictors without it ignore the call.
//! * **Transparent errors**: `TransferError::Error` is propagated unmodified by the
//!   engine; it only needs `From<CvError>` so engine errors fit the same channel.
//!
//! ## Key concepts
//!
//! * **evaluate(test, train)**: Train on `train` when present, then compute the error on `test`.
//! * **duplicate**: Independent copy that shares no mutable training state.
//! * **Diagnostic sub-state**: Confusion, training confusion and per-sample error,
//!   each populated only while enabled in [`TransferError::states`].
//!
//! ## Invariants
//!
//! * A duplicate never aliases the original's predictor state.
//! * Sub-state accessors return `None` for diagnostics that are disabled.
//!
//! ## Non-goals
//!
//! * This module does not implement any predictor or error function.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::collections::BTreeMap;
#[cfg(feature = "std")]
use std::sync::Arc;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::confusion::Summary;
use crate::primitives::dataset::Dataset;
use crate::primitives::errors::CvError;
use crate::primitives::state::{DiagnosticStates, TrainingState};

// ============================================================================
// Predictor
// ============================================================================

/// A trainable predictor as seen by the cross-validation engine.
pub trait Predictor<D> {
    /// Current training state.
    fn training_state(&self) -> TrainingState;

    /// Forget any fitted model.
    fn untrain(&mut self);

    /// Whether the predictor can use a reference to the held-out test data.
    ///
    /// Only meant for early-stopping heuristics; it breaks train/test isolation.
    fn accepts_test_reference(&self) -> bool {
        false
    }

    /// Attach (`Some`) or detach (`None`) the held-out test data.
    fn set_test_reference(&mut self, _test: Option<Arc<D>>) {}
}

// ============================================================================
// TransferError
// ============================================================================

/// A predictor bundled with the error computation of one fold.
pub trait TransferError<D: Dataset>: Sized {
    /// Numeric error value produced per fold.
    type Value: Float;

    /// Confusion summary type for the confusion diagnostics.
    type Summary: Summary;

    /// Wrapped predictor.
    type Predictor: Predictor<D>;

    /// Error raised by `evaluate`; engine errors convert into it.
    type Error: From<CvError>;

    /// Train on `train` when present, then return the error on `test`.
    fn evaluate(&mut self, test: Option<&D>, train: Option<&D>)
    -> Result<Self::Value, Self::Error>;

    /// Independent deep copy.
    fn duplicate(&self) -> Self;

    /// Wrapped predictor.
    fn predictor(&self) -> &Self::Predictor;

    /// Wrapped predictor, mutably.
    fn predictor_mut(&mut self) -> &mut Self::Predictor;

    /// Enablement of the diagnostic sub-state.
    fn states(&self) -> &DiagnosticStates;

    /// Enablement of the diagnostic sub-state, mutably.
    fn states_mut(&mut self) -> &mut DiagnosticStates;

    /// Confusion summary of the last evaluation (test partition).
    fn confusion(&self) -> Option<&Self::Summary> {
        None
    }

    /// Confusion summary of the last training (train partition).
    fn training_confusion(&self) -> Option<&Self::Summary> {
        None
    }

    /// Per-sample error contributions of the last evaluation.
    fn samples_error(&self) -> Option<&BTreeMap<D::SampleId, Self::Value>> {
        None
    }

    /// Training state of the wrapped predictor.
    fn training_state(&self) -> TrainingState {
        self.predictor().training_state()
    }

    /// Reset the wrapped predictor to the untrained state.
    fn untrain(&mut self) {
        self.predictor_mut().untrain();
    }
}
