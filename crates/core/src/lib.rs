//! Core types for tri-state values
//!
//! This crate defines the value model used throughout the workspace:
//! - Optional: two-state container (absent / present)
//! - und::Und: tri-state value (undefined / null / defined), inline
//! - sliceund::Und: the same contract backed by a sequence of length 0 or 1
//! - TriState / IsUndefined: the contract and the capability both share
//! - ser: serde glue advertising the is-undefined capability to serializers
//! - sql: rusqlite adapter (feature `sqlite`)
//!
//! ## Example
//!
//! ```
//! use und_core::und::Und;
//!
//! let name: Und<String> = Und::defined("alice".to_string());
//! assert!(name.is_defined());
//! assert!(Und::<String>::null() != Und::undefined());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod optional;
pub mod ser;
pub mod sliceund;
#[cfg(feature = "sqlite")]
pub mod sql;
pub mod und;

#[cfg(test)]
mod testcase;

pub use contract::{IsUndefined, TriState};
pub use optional::Optional;
