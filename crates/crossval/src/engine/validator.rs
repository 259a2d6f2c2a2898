//! Validation of cross-validation configuration and input.
//!
//! ## Purpose
//!
//! This module provides the checks run when the builder is finalized and at
//! the start of a run: duplicate builder parameters, duplicate harvest
//! attributes, combiner names and sample identifiers.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Side-effect free**: Validators only inspect their arguments.
//!
//! ## Invariants
//!
//! * A validated configuration can be run without further configuration errors.
//!
//! ## Non-goals
//!
//! * This module does not validate splitter output (checked fold by fold by the executor).

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::format;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt::Debug;
use core::str::FromStr;

// Internal dependencies
use crate::evaluation::harvest::HarvestAttribute;
use crate::math::combiner::CombinerKind;
use crate::primitives::errors::CvError;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for cross-validation configuration and input.
pub struct Validator;

impl Validator {
    /// Validate that no parameters were set multiple times in the builder.
    pub fn validate_no_duplicates(duplicate_param: Option<&'static str>) -> Result<(), CvError> {
        if let Some(param) = duplicate_param {
            return Err(CvError::DuplicateParameter { parameter: param });
        }
        Ok(())
    }

    /// Validate that every harvest attribute is declared once.
    pub fn validate_harvest_attributes(attributes: &[HarvestAttribute]) -> Result<(), CvError> {
        for (i, attr) in attributes.iter().enumerate() {
            if attributes[..i].contains(attr) {
                return Err(CvError::DuplicateHarvestAttribute(attr.name()));
            }
        }
        Ok(())
    }

    /// Resolve a combiner name.
    pub fn validate_combiner_name(name: &str) -> Result<CombinerKind, CvError> {
        CombinerKind::from_str(name)
    }

    /// Validate that sample identifiers are unique.
    pub fn validate_unique_ids<I: Ord + Debug>(ids: &[I]) -> Result<(), CvError> {
        let mut sorted: Vec<&I> = ids.iter().collect();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(CvError::InvalidInput(format!(
                "duplicate sample id {:?}",
                pair[0]
            )));
        }
        Ok(())
    }
}
