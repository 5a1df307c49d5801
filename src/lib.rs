//! # sparray
//!
//! Random-access storage for large, mostly-zero fixed-width sequences:
//! a logical array of length N where only the non-zero entries are
//! materialized.
//!
//! Each store wraps one red-black tree keyed by the 64-bit logical index.
//! A "coder" moves opaque fixed-width values into and out of the tree's
//! payload slots; a value whose encoded components all equal zero is elided
//! from the tree instead of stored, so absent indices read as zero without
//! occupying memory.
//!
//! ## Usage Example
//!
//! ```rust
//! use sparray::dispatch;
//!
//! let store = dispatch::allocate(&0.0_f64, 10)?;
//! store.set(3, &5.0)?;
//!
//! let mut value = 0.0;
//! store.get(3, &mut value)?;
//! assert_eq!(value, 5.0);
//!
//! store.get(0, &mut value)?;
//! assert_eq!(value, 0.0);
//! # Ok::<(), sparray::StoreError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

// Core modules, leaf-first
pub mod tree; // balanced index tree (arena red-black tree)
pub mod coder; // coder contract and elementary kinds
pub mod store; // sparse indexed store
pub mod dispatch; // capability-driven allocation

// Re-exports for convenience
pub use coder::{BitFlags, Codable, Coder, Component, ElementKind, FixedText};
pub use dispatch::{allocate, KIND_PRIORITY};
pub use store::{IndexedStore, SparseStore};
pub use tree::RbTree;

use thiserror::Error;

/// Errors surfaced by stores and the allocation dispatcher.
///
/// None of these are retried internally: the core has no transient failure
/// modes, so every variant reports a contract violation to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Index outside `[0, length)`; raised by get/set before any mutation.
    #[error("index {index} out of range for store of length {length}")]
    IndexOutOfRange {
        /// The offending index.
        index: i64,
        /// The store's fixed logical length.
        length: i64,
    },

    /// Negative length requested at construction.
    #[error("invalid store length {0}")]
    InvalidSize(i64),

    /// The member type declares no recognized coder capability.
    #[error("no supported coder capability for {0}")]
    UnsupportedType(&'static str),
}
