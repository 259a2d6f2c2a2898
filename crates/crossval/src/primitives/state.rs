//! Diagnostic toggles and predictor training state.
//!
//! ## Purpose
//!
//! This module defines the typed set of diagnostics that can be collected
//! during a cross-validation run, the per-object collection that tracks which
//! of them are enabled (with temporary overrides), and the explicit training
//! state of a predictor.
//!
//! ## Design notes
//!
//! * **Typed toggles**: Each diagnostic is an enum variant, stored as one bit.
//! * **Stacked overrides**: Temporary changes push the previous set and pop it on restore.
//! * **Copy semantics**: `DiagnosticSet` is `Copy`, so snapshots are free.
//!
//! ## Key concepts
//!
//! * **Engine-level diagnostics**: Results, splits, transfer error snapshots.
//! * **Transfer-level diagnostics**: Confusion, training confusion, per-sample error.
//! * **Temporary enablement**: Enable extra diagnostics for the duration of a run.
//!
//! ## Invariants
//!
//! * Every `change_temporarily` is undone by exactly one `reset_temporarily`.
//! * Restoring with an empty stack leaves the enabled set untouched.
//!
//! ## Non-goals
//!
//! * This module does not store diagnostic values, only their enablement.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt::{Display, Formatter, Result};

// ============================================================================
// Diagnostic
// ============================================================================

/// A single diagnostic stream collected during cross-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Diagnostic {
    /// Ordered per-fold error values.
    Results,

    /// Ordered folds produced by the splitter.
    Splits,

    /// Transfer error instances used on each fold.
    TransErrors,

    /// Summed confusion summary over all test partitions.
    Confusion,

    /// Summed confusion summary over all training partitions.
    TrainingConfusion,

    /// Per-sample error contributions.
    SamplesError,
}

impl Diagnostic {
    /// Every diagnostic, in declaration order.
    pub const ALL: [Diagnostic; 6] = [
        Diagnostic::Results,
        Diagnostic::Splits,
        Diagnostic::TransErrors,
        Diagnostic::Confusion,
        Diagnostic::TrainingConfusion,
        Diagnostic::SamplesError,
    ];

    /// Diagnostics that live on the transfer error and are forwarded by the engine.
    pub const TRANSFER: [Diagnostic; 3] = [
        Diagnostic::Confusion,
        Diagnostic::TrainingConfusion,
        Diagnostic::SamplesError,
    ];

    /// Stable snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Results => "results",
            Self::Splits => "splits",
            Self::TransErrors => "transerrors",
            Self::Confusion => "confusion",
            Self::TrainingConfusion => "training_confusion",
            Self::SamplesError => "samples_error",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// DiagnosticSet
// ============================================================================

/// Set of enabled diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct DiagnosticSet(u8);

impl DiagnosticSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every diagnostic enabled.
    pub fn all() -> Self {
        Self::from_slice(&Diagnostic::ALL)
    }

    /// Build a set from a list of diagnostics.
    pub fn from_slice(diagnostics: &[Diagnostic]) -> Self {
        let mut set = Self::empty();
        for &d in diagnostics {
            set.insert(d);
        }
        set
    }

    /// Enable a diagnostic.
    #[inline]
    pub fn insert(&mut self, diagnostic: Diagnostic) {
        self.0 |= diagnostic.bit();
    }

    /// Disable a diagnostic.
    #[inline]
    pub fn remove(&mut self, diagnostic: Diagnostic) {
        self.0 &= !diagnostic.bit();
    }

    /// Check whether a diagnostic is enabled.
    #[inline]
    pub fn contains(&self, diagnostic: Diagnostic) -> bool {
        self.0 & diagnostic.bit() != 0
    }

    /// Union of two sets.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Restriction of this set to the diagnostics a transfer error can provide.
    pub fn transfer_subset(self) -> Self {
        let mut set = Self::empty();
        for d in Diagnostic::TRANSFER {
            if self.contains(d) {
                set.insert(d);
            }
        }
        set
    }

    /// Whether no diagnostic is enabled.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Enabled diagnostics in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Diagnostic> + '_ {
        Diagnostic::ALL.into_iter().filter(|d| self.contains(*d))
    }
}

impl Display for DiagnosticSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, d) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

// ============================================================================
// DiagnosticStates
// ============================================================================

/// Enablement of the diagnostics owned by one object, with temporary overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticStates {
    enabled: DiagnosticSet,
    saved: Vec<DiagnosticSet>,
}

impl DiagnosticStates {
    /// Create a collection with the given diagnostics enabled.
    pub fn new(enabled: DiagnosticSet) -> Self {
        Self {
            enabled,
            saved: Vec::new(),
        }
    }

    /// Currently enabled diagnostics.
    pub fn enabled(&self) -> DiagnosticSet {
        self.enabled
    }

    /// Check whether a diagnostic is currently enabled.
    pub fn is_enabled(&self, diagnostic: Diagnostic) -> bool {
        self.enabled.contains(diagnostic)
    }

    /// Permanently enable a diagnostic.
    pub fn enable(&mut self, diagnostic: Diagnostic) {
        self.enabled.insert(diagnostic);
    }

    /// Permanently disable a diagnostic.
    pub fn disable(&mut self, diagnostic: Diagnostic) {
        self.enabled.remove(diagnostic);
    }

    /// Enable `extra` on top of the current set until the next reset.
    pub fn change_temporarily(&mut self, extra: DiagnosticSet) {
        self.saved.push(self.enabled);
        self.enabled = self.enabled.union(extra);
    }

    /// Disable everything until the next reset.
    pub fn disable_all_temporarily(&mut self) {
        self.saved.push(self.enabled);
        self.enabled = DiagnosticSet::empty();
    }

    /// Undo the most recent temporary change.
    pub fn reset_temporarily(&mut self) {
        if let Some(previous) = self.saved.pop() {
            self.enabled = previous;
        }
    }

    /// Number of pending temporary changes.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

// ============================================================================
// TrainingState
// ============================================================================

/// Explicit training state of a predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrainingState {
    /// No model has been fit (or it was reset).
    #[default]
    Untrained,

    /// A model has been fit and is ready to predict.
    Trained,
}
