//! Und - tri-state values for partial updates
//!
//! A field of a patch-style record has three states: left out, explicitly
//! cleared, or set. [`Und`] models exactly that (undefined / null / defined),
//! and [`marshal_fields_json`] writes such records as JSON, omitting the
//! undefined fields.
//!
//! # Quick Start
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use und::Und;
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct ProfilePatch {
//!     #[serde(default)]
//!     nickname: Und<String>,
//!     #[serde(default)]
//!     bio: Und<String>,
//! }
//!
//! let patch = ProfilePatch {
//!     nickname: Und::null(),
//!     bio: Und::undefined(),
//! };
//! let bytes = und::marshal_fields_json(&patch).unwrap();
//! assert_eq!(bytes, br#"{"nickname":null}"#);
//!
//! let back: ProfilePatch = und::unmarshal_fields_json(&bytes).unwrap();
//! assert_eq!(back, patch);
//! ```
//!
//! # Architecture
//!
//! - `und-core`: [`Optional`], the two tri-state representations
//!   ([`und::Und`](crate::und::Und) inline, [`sliceund::Und`] sequence-backed),
//!   serde glue, and the rusqlite adapter (feature `sqlite`)
//! - `und-json`: the field-rewriting JSON codec

pub use und_core::{contract, optional, ser, sliceund, und, IsUndefined, Optional, TriState};
pub use und_json::{
    marshal_fields_json, unmarshal_fields_json, CodecBuilder, CodecConfig, Directive,
    DirectiveError, Error, FieldsCodec, Result,
};

pub use und_core::und::Und;

