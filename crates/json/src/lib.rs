//! JSON codec for tri-state values
//!
//! Plain `serde_json` writes an undefined [`Und`](und_core::und::Und) field as
//! `null`. The codec in this crate leaves the field out instead:
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use und_core::und::Und;
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Sample {
//!     #[serde(default)]
//!     a: Und<String>,
//!     #[serde(default)]
//!     b: Und<String>,
//! }
//!
//! let value = Sample {
//!     a: Und::null(),
//!     b: Und::undefined(),
//! };
//! let bytes = und_json::marshal_fields_json(&value).unwrap();
//! assert_eq!(bytes, br#"{"a":null}"#);
//!
//! let back: Sample = und_json::unmarshal_fields_json(&bytes).unwrap();
//! assert_eq!(back, value);
//! ```
//!
//! # Architecture
//!
//! - `directive`: `key:"value"` field directives and the `omitempty` rewrite
//! - `probe`: serializer that reads a value's shape without writing it
//! - `binding`: per-field encoding decisions and their per-record cache
//! - `ser`: serializer adapter applying bindings at every record
//! - `config` / `codec`: configured codecs and the default entry points

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod codec;
pub mod config;
pub mod directive;
pub mod error;
mod format;
pub mod probe;
mod ser;

pub use binding::{BindingCache, FieldBinding, OmitRule, RecordBindings, RecordKey};
pub use codec::{marshal_fields_json, unmarshal_fields_json, CodecBuilder, FieldsCodec};
pub use config::CodecConfig;
pub use directive::{force_omitempty, Directive, DirectiveError, JSON_KEY, OMITEMPTY};
pub use error::{Error, Result};
pub use probe::{probe, Shape};
