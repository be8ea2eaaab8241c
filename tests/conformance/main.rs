//! Cross-crate conformance suite
//!
//! Exercises the facade the way a consumer would: both tri-state
//! representations against the shared contract, the field-rewriting JSON
//! codec, and the SQLite adapter.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test conformance
//!
//! # Run codec tests only
//! cargo test --test conformance fields_json::
//!
//! # Without the SQLite adapter
//! cargo test --test conformance --no-default-features
//! ```

mod common;

mod fields_json;
#[cfg(feature = "sqlite")]
mod sql_null;
mod tri_state;
