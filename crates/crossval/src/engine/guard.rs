//! Scoped enablement override for a transfer error's diagnostics.
//!
//! ## Purpose
//!
//! The engine needs the transfer error to collect confusion and per-sample
//! data while a run is in progress, without leaking that enablement into the
//! caller's later use of the same instance. [`TemporaryEnablement`] enables
//! the extra diagnostics on construction and restores the previous set when
//! dropped, on the success path and on every early return alike.
//!
//! ## Design notes
//!
//! * **RAII**: Restoration lives in `Drop`, so `?` inside the fold loop cannot skip it.
//! * **Rebinding**: The guarded slot can be replaced by the instance used on the
//!   final fold; restoration then applies to that instance, whose state stack was
//!   copied from the live one when it was duplicated.
//! * **No-op when empty**: Nothing is pushed (and nothing popped) for an empty override.
//!
//! ## Invariants
//!
//! * Exactly one `reset_temporarily` per non-empty override.

// External dependencies
use core::marker::PhantomData;
use core::mem;
use core::ops::{Deref, DerefMut};
use tracing::trace;

// Internal dependencies
use crate::algorithms::transfer::TransferError;
use crate::primitives::dataset::Dataset;
use crate::primitives::state::DiagnosticSet;

/// Guard holding a transfer error with temporarily enabled diagnostics.
pub struct TemporaryEnablement<'a, D: Dataset, TE: TransferError<D>> {
    target: &'a mut TE,
    active: bool,
    _dataset: PhantomData<fn(&D)>,
}

impl<'a, D: Dataset, TE: TransferError<D>> TemporaryEnablement<'a, D, TE> {
    /// Enable `extra` on `target` until the guard is dropped.
    pub fn new(target: &'a mut TE, extra: DiagnosticSet) -> Self {
        let active = !extra.is_empty();
        if active {
            trace!(extra = %extra, "Enabling transfer error diagnostics temporarily");
            target.states_mut().change_temporarily(extra);
        }
        Self {
            target,
            active,
            _dataset: PhantomData,
        }
    }

    /// Replace the guarded instance, returning the previous one.
    pub fn rebind(&mut self, replacement: TE) -> TE {
        mem::replace(self.target, replacement)
    }
}

impl<D: Dataset, TE: TransferError<D>> Deref for TemporaryEnablement<'_, D, TE> {
    type Target = TE;

    fn deref(&self) -> &TE {
        self.target
    }
}

impl<D: Dataset, TE: TransferError<D>> DerefMut for TemporaryEnablement<'_, D, TE> {
    fn deref_mut(&mut self) -> &mut TE {
        self.target
    }
}

impl<D: Dataset, TE: TransferError<D>> Drop for TemporaryEnablement<'_, D, TE> {
    fn drop(&mut self) {
        if self.active {
            self.target.states_mut().reset_temporarily();
            trace!("Restored transfer error diagnostics");
        }
    }
}
