//! Layer 4: Evaluation
//!
//! # Purpose
//!
//! This layer collects what a run produces besides its summary value:
//! - Diagnostic accumulators (results, splits, confusion, per-sample error)
//! - Harvested per-fold records
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Evaluation ← You are here
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Diagnostic accumulators.
pub mod diagnostics;

/// Per-fold harvesting.
pub mod harvest;
