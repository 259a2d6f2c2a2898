//! Layer 3: Algorithms
//!
//! # Purpose
//!
//! This layer defines the collaborator contracts driven by the engine on
//! every fold: splitters that produce folds, and the predictor/transfer
//! error pair that is trained and evaluated on them.
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
//! Layer 3: Algorithms ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Splitter contract and identity splitter.
pub mod splitter;

/// Predictor and transfer error contracts.
pub mod transfer;
