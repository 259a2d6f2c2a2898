//! High-level API for cross-validated transfer errors.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point. It implements a
//! fluent builder for configuring the splitter, combiner, diagnostics and
//! harvesting of a cross-validation run, finalized with the transfer error
//! to validate.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all parameters.
//! * **Deferred errors**: Misconfiguration is recorded while chaining and reported by `build`.
//! * **Single assignment**: Setting a parameter twice is a configuration error.
//!
//! ## Key concepts
//!
//! ### Configuration Flow
//!
//! 1. Create a [`CrossValidationBuilder`] via `CrossValidation::new()`.
//! 2. Chain configuration methods (`.splitter()`, `.combiner()`, `.enable()`, etc.).
//! 3. Call `.build(transerror)` to obtain a [`CrossValidatedTransferError`].
//!
//! ### Defaults
//!
//! * Splitter: [`NoneSplitter`] (whole dataset as a single, untrained fold).
//! * Combiner: [`GrandMean`].
//! * Test exposure: disabled.
//! * Harvesting: nothing, copy mode [`HarvestCopy::Copy`].
//! * Diagnostics: none enabled.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::boxed::Box;
#[cfg(feature = "std")]
use std::vec::Vec;

// Internal dependencies
use crate::engine::validator::Validator;
use crate::evaluation::diagnostics::CvDiagnostics;
use crate::evaluation::harvest::Harvester;

// Publicly re-exported types
pub use crate::algorithms::splitter::{Folds, NoneSplitMode, NoneSplitter, Splitter};
pub use crate::algorithms::transfer::{Predictor, TransferError};
pub use crate::engine::executor::{
    CrossValidatedTransferError, FoldHook, TransferHarvestRecord, TransferHarvester,
};
pub use crate::evaluation::harvest::{FoldContext, HarvestAttribute, HarvestCopy, HarvestRecord};
pub use crate::math::combiner::{Combiner, CombinerKind, GrandMean};
pub use crate::math::confusion::{ConfusionMatrix, Summary};
pub use crate::primitives::cancel::CancelToken;
pub use crate::primitives::dataset::{Dataset, Fold, LabelsMap, Partition};
pub use crate::primitives::errors::CvError;
pub use crate::primitives::state::{Diagnostic, DiagnosticSet, DiagnosticStates, TrainingState};

/// Fluent builder for configuring a cross-validated transfer error.
pub struct CrossValidationBuilder<D: Dataset, TE: TransferError<D>> {
    /// Fold generator.
    pub splitter: Option<Box<dyn Splitter<D>>>,

    /// Reduction of per-fold results.
    pub combiner: Option<Box<dyn Combiner<TE::Value>>>,

    /// Hand the held-out partition to capable predictors.
    pub expose_test_dataset: Option<bool>,

    /// Values captured per fold.
    pub harvest_attributes: Option<Vec<HarvestAttribute>>,

    /// Copy mode for harvested splits.
    pub copy_harvested: Option<HarvestCopy>,

    /// Enabled diagnostics.
    pub diagnostics: DiagnosticSet,

    /// Cooperative cancellation token.
    pub cancel_token: Option<CancelToken>,

    /// Caller hook called after each fold.
    pub on_fold: Option<FoldHook<D, TE>>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,

    /// First error encountered while configuring.
    #[doc(hidden)]
    pub deferred_error: Option<CvError>,
}

impl<D, TE> Default for CrossValidationBuilder<D, TE>
where
    D: Dataset + Clone + 'static,
    TE: TransferError<D>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D, TE> CrossValidationBuilder<D, TE>
where
    D: Dataset + Clone + 'static,
    TE: TransferError<D>,
{
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            splitter: None,
            combiner: None,
            expose_test_dataset: None,
            harvest_attributes: None,
            copy_harvested: None,
            diagnostics: DiagnosticSet::empty(),
            cancel_token: None,
            on_fold: None,
            duplicate_param: None,
            deferred_error: None,
        }
    }

    /// Set the splitter producing the folds.
    pub fn splitter<S>(mut self, splitter: S) -> Self
    where
        S: Splitter<D> + 'static,
    {
        if self.splitter.is_some() {
            self.duplicate_param = Some("splitter");
        }
        self.splitter = Some(Box::new(splitter));
        self
    }

    /// Set the combiner reducing the per-fold results.
    pub fn combiner<C>(mut self, combiner: C) -> Self
    where
        C: Combiner<TE::Value> + 'static,
    {
        if self.combiner.is_some() {
            self.duplicate_param = Some("combiner");
        }
        self.combiner = Some(Box::new(combiner));
        self
    }

    /// Select a built-in combiner by name (`"mean"`, `"median"`, `"min"`, `"max"`).
    pub fn combiner_name(self, name: &str) -> Self {
        match Validator::validate_combiner_name(name) {
            Ok(kind) => self.combiner(kind),
            Err(err) => self.defer(err),
        }
    }

    /// Hand the held-out test partition to predictors that accept it.
    ///
    /// This breaks train/test isolation and only exists for early-stopping heuristics.
    pub fn expose_test_dataset(mut self, expose: bool) -> Self {
        if self.expose_test_dataset.is_some() {
            self.duplicate_param = Some("expose_test_dataset");
        }
        self.expose_test_dataset = Some(expose);
        self
    }

    /// Declare the values harvested from every fold.
    pub fn harvest(mut self, attributes: &[HarvestAttribute]) -> Self {
        if self.harvest_attributes.is_some() {
            self.duplicate_param = Some("harvest");
        }
        self.harvest_attributes = Some(attributes.to_vec());
        self
    }

    /// Set how harvested splits are copied.
    pub fn copy_harvested(mut self, copy: HarvestCopy) -> Self {
        if self.copy_harvested.is_some() {
            self.duplicate_param = Some("copy_harvested");
        }
        self.copy_harvested = Some(copy);
        self
    }

    /// Enable a diagnostic.
    pub fn enable(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.insert(diagnostic);
        self
    }

    /// Enable several diagnostics.
    pub fn enable_all_of(mut self, diagnostics: &[Diagnostic]) -> Self {
        self.diagnostics = self.diagnostics.union(DiagnosticSet::from_slice(diagnostics));
        self
    }

    /// Enable every diagnostic.
    pub fn enable_all(mut self) -> Self {
        self.diagnostics = DiagnosticSet::all();
        self
    }

    /// Disable a diagnostic.
    pub fn disable(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.remove(diagnostic);
        self
    }

    /// Check a cancellation token between folds.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        if self.cancel_token.is_some() {
            self.duplicate_param = Some("cancel_token");
        }
        self.cancel_token = Some(token);
        self
    }

    /// Call `hook` with the context of every processed fold.
    pub fn on_fold<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&FoldContext<'_, D, TE>) + 'static,
    {
        if self.on_fold.is_some() {
            self.duplicate_param = Some("on_fold");
        }
        self.on_fold = Some(Box::new(hook));
        self
    }

    fn defer(mut self, err: CvError) -> Self {
        if self.deferred_error.is_none() {
            self.deferred_error = Some(err);
        }
        self
    }

    /// Validate the configuration and wrap `transerror`.
    pub fn build(self, transerror: TE) -> Result<CrossValidatedTransferError<D, TE>, CvError> {
        if let Some(err) = self.deferred_error {
            return Err(err);
        }

        // Check for duplicate parameter configuration
        Validator::validate_no_duplicates(self.duplicate_param)?;

        let attributes = self.harvest_attributes.unwrap_or_default();
        Validator::validate_harvest_attributes(&attributes)?;

        Ok(CrossValidatedTransferError {
            transerror,
            splitter: self
                .splitter
                .unwrap_or_else(|| Box::new(NoneSplitter::new())),
            combiner: self.combiner.unwrap_or_else(|| Box::new(GrandMean)),
            expose_test_dataset: self.expose_test_dataset.unwrap_or(false),
            diagnostics: CvDiagnostics::new(self.diagnostics),
            harvester: Harvester::new(attributes, self.copy_harvested.unwrap_or_default()),
            on_fold: self.on_fold,
            cancel: self.cancel_token,
        })
    }
}
