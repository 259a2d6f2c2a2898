//! Layer 5: Engine
//!
//! # Purpose
//!
//! This layer orchestrates a cross-validation run by coordinating the
//! splitter, the transfer error, the diagnostic accumulators and the
//! combiner. It provides the fold loop and the scoped state override that
//! protects the caller's transfer error.
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine ← You are here
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Fold loop and the cross-validated transfer error.
pub mod executor;

/// Scoped diagnostic enablement.
pub mod guard;

/// Validation utilities.
pub mod validator;
