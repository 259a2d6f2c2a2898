//! # crossval: Cross-Validated Transfer Errors for Rust
//!
//! Orchestration of cross-validation for trainable predictors: a splitter
//! produces `(train, test)` folds of a dataset, a transfer error trains its
//! predictor on each training partition and measures the error on the
//! matching test partition, and a combiner reduces the per-fold errors to a
//! single value.
//!
//! Along the way the engine can collect diagnostics (per-fold results, the
//! splits, the transfer error used on every fold, summed confusion summaries
//! and per-sample errors) and harvest arbitrary per-fold values for the caller.
//!
//! ## What this crate does not do
//!
//! Predictors, error measures and splitting schemes are supplied by the caller
//! through the [`prelude::Predictor`], [`prelude::TransferError`] and
//! [`prelude::Splitter`] traits. The only built-in splitter is the identity
//! splitter, which yields the whole dataset as a single fold.
//!
//! ## Quick Start
//!
//! ```rust
//! use crossval::prelude::*;
//!
//! #[derive(Clone)]
//! struct Samples(Vec<(u32, f64)>);
//!
//! impl Dataset for Samples {
//!     type SampleId = u32;
//!
//!     fn sample_ids(&self) -> Vec<u32> {
//!         self.0.iter().map(|(id, _)| *id).collect()
//!     }
//! }
//!
//! // Predicts the mean target of its training data
//! #[derive(Default)]
//! struct MeanPredictor {
//!     mean: Option<f64>,
//! }
//!
//! impl Predictor<Samples> for MeanPredictor {
//!     fn training_state(&self) -> TrainingState {
//!         match self.mean {
//!             Some(_) => TrainingState::Trained,
//!             None => TrainingState::Untrained,
//!         }
//!     }
//!
//!     fn untrain(&mut self) {
//!         self.mean = None;
//!     }
//! }
//!
//! // Mean squared error of the predictor
//! #[derive(Default)]
//! struct SquaredError {
//!     predictor: MeanPredictor,
//!     states: DiagnosticStates,
//! }
//!
//! impl TransferError<Samples> for SquaredError {
//!     type Value = f64;
//!     type Summary = ConfusionMatrix;
//!     type Predictor = MeanPredictor;
//!     type Error = CvError;
//!
//!     fn evaluate(&mut self, test: Option<&Samples>, train: Option<&Samples>) -> Result<f64, CvError> {
//!         if let Some(train) = train {
//!             let sum: f64 = train.0.iter().map(|(_, y)| y).sum();
//!             self.predictor.mean = Some(sum / train.0.len() as f64);
//!         }
//!         let mean = self.predictor.mean.unwrap_or(0.0);
//!         let test = test.ok_or(CvError::InvalidInput("missing test data".into()))?;
//!         let sse: f64 = test.0.iter().map(|(_, y)| (y - mean).powi(2)).sum();
//!         Ok(sse / test.0.len() as f64)
//!     }
//!
//!     fn duplicate(&self) -> Self {
//!         Self {
//!             predictor: MeanPredictor { mean: self.predictor.mean },
//!             states: self.states.clone(),
//!         }
//!     }
//!
//!     fn predictor(&self) -> &MeanPredictor { &self.predictor }
//!     fn predictor_mut(&mut self) -> &mut MeanPredictor { &mut self.predictor }
//!     fn states(&self) -> &DiagnosticStates { &self.states }
//!     fn states_mut(&mut self) -> &mut DiagnosticStates { &mut self.states }
//! }
//!
//! // Two folds: each half is held out once
//! let halves = |d: &Samples| {
//!     let (a, b) = d.0.split_at(d.0.len() / 2);
//!     vec![
//!         Fold::new(Some(Samples(a.to_vec())), Some(Samples(b.to_vec()))),
//!         Fold::new(Some(Samples(b.to_vec())), Some(Samples(a.to_vec()))).last_split(true),
//!     ]
//! };
//!
//! let data = Samples(vec![(0, 1.0), (1, 2.0), (2, 3.0), (3, 4.0)]);
//!
//! let mut cv = CrossValidation::new()
//!     .splitter(halves)
//!     .enable(Diagnostic::Results)
//!     .build(SquaredError::default())?;
//!
//! let error = cv.run(&data)?;
//! assert_eq!(error, 4.25);
//! assert_eq!(cv.diagnostics().results(), Some(&[4.25, 4.25][..]));
//!
//! println!("{}", cv);
//! # Result::<(), CvError>::Ok(())
//! ```
//!
//! ```text
//! CrossValidatedTransferError:
//!   Splitter:     custom
//!   Combiner:     mean
//!   Diagnostics:  results
//!   Expose test:  false
//! ```
//!
//! ### Result and Error Handling
//!
//! `run` returns `Result<TE::Value, TE::Error>`. The transfer error's own error
//! type must implement `From<CvError>`, so failures raised by the engine (an
//! empty splitter, a cancelled run, an inconsistent fold sequence) and failures
//! raised by `evaluate` travel through the same channel unmodified.
//!
//! After a failed run the diagnostics are partially populated and should not be
//! relied upon. The transfer error's diagnostic enablement is restored on every
//! path.
//!
//! ## Diagnostics
//!
//! | Diagnostic          | Accessor                                      |
//! |---------------------|-----------------------------------------------|
//! | `Results`           | `diagnostics().results()`                     |
//! | `Splits`            | `diagnostics().splits()`                      |
//! | `TransErrors`       | `transerrors()`                               |
//! | `Confusion`         | `diagnostics().confusion()`                   |
//! | `TrainingConfusion` | `diagnostics().training_confusion()`          |
//! | `SamplesError`      | `diagnostics().samples_error()`               |
//!
//! Enabling diagnostics never changes the value returned by `run`.
//!
//! ## Minimal Usage (no_std)
//!
//! The crate supports `no_std` environments with `alloc`. Disable default
//! features to remove the standard library dependency:
//!
//! ```toml
//! [dependencies]
//! crossval = { version = "0.3", default-features = false }
//! ```
//!
//! ## License
//!
//! See the repository for license information and contribution guidelines.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

// Layer 1: Primitives - data structures and basic utilities.
mod primitives;

// Layer 2: Math - result combiners and confusion summaries.
mod math;

// Layer 3: Algorithms - splitter and transfer error abstractions.
mod algorithms;

// Layer 4: Evaluation - diagnostics and per-fold harvesting.
mod evaluation;

// Layer 5: Engine - fold orchestration and execution control.
mod engine;

// High-level fluent API for cross-validation.
mod api;

// Standard crossval prelude.
pub mod prelude {
    pub use crate::api::{
        CancelToken, Combiner, CombinerKind, ConfusionMatrix, CrossValidatedTransferError,
        CrossValidationBuilder as CrossValidation, CvError, Dataset, Diagnostic, DiagnosticSet,
        DiagnosticStates, Fold, FoldContext, Folds, GrandMean, HarvestAttribute, HarvestCopy,
        HarvestRecord, LabelsMap, NoneSplitMode, NoneSplitter, Partition, Predictor, Splitter,
        Summary, TrainingState, TransferError,
    };
}

// Internal modules for development and testing.
//
// This module re-exports internal modules for development and testing purposes.
// It is only available with the `dev` feature enabled.
#[cfg(feature = "dev")]
pub mod internals {
    pub mod primitives {
        pub use crate::primitives::*;
    }
    pub mod math {
        pub use crate::math::*;
    }
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod evaluation {
        pub use crate::evaluation::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
}
