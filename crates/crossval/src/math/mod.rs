//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides the pure reductions used by the engine: combiners
//! over per-fold error values and summable confusion summaries.
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Per-fold result combiners.
pub mod combiner;

/// Confusion summaries.
pub mod confusion;
