//! Field-rewriting JSON codec
//!
//! [`FieldsCodec`] encodes any `Serialize` value as JSON, leaving out record
//! fields whose value is undefined. It owns the declared directives and the
//! binding cache; one codec may be shared freely between threads.
//!
//! [`marshal_fields_json`] and [`unmarshal_fields_json`] use a process-wide
//! default codec.

use crate::binding::{BindingCache, RecordKey};
use crate::config::CodecConfig;
use crate::directive::Directive;
use crate::error::{Error, Result};
use crate::format::HtmlSafe;
use crate::ser::Fields;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use std::io::Write;
use std::path::Path;
use tracing::info;

static DEFAULT_CODEC: Lazy<FieldsCodec> = Lazy::new(FieldsCodec::new);

/// Encode `value` as JSON, omitting undefined record fields.
///
/// ```
/// use serde::Serialize;
/// use und_core::und::Und;
///
/// #[derive(Serialize)]
/// struct Sample {
///     a: Und<String>,
///     b: Und<String>,
/// }
///
/// let bytes = und_json::marshal_fields_json(&Sample {
///     a: Und::undefined(),
///     b: Und::defined("x".to_string()),
/// })
/// .unwrap();
/// assert_eq!(bytes, br#"{"b":"x"}"#);
/// ```
pub fn marshal_fields_json<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    DEFAULT_CODEC.marshal(value)
}

/// Decode JSON into `T`.
///
/// Absent keys decode as undefined for fields that carry
/// `#[serde(default)]` (or whose record does).
pub fn unmarshal_fields_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    DEFAULT_CODEC.unmarshal(bytes)
}

/// Codec omitting undefined fields
#[derive(Debug)]
pub struct FieldsCodec {
    pretty: bool,
    sort_map_keys: bool,
    escape_html: bool,
    /// Record display name to field name to declared directive
    directives: FxHashMap<String, FxHashMap<String, Directive>>,
    cache: BindingCache,
}

impl Default for FieldsCodec {
    fn default() -> Self {
        CodecBuilder::default().build()
    }
}

impl FieldsCodec {
    /// Codec with no declared directives, compact output, sorted map keys
    /// and HTML escaping
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a configured codec
    pub fn builder() -> CodecBuilder {
        CodecBuilder::default()
    }

    /// Build a codec from parsed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Directive`] for the first malformed directive.
    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .pretty(config.pretty)
            .sort_map_keys(config.sort_map_keys)
            .escape_html(config.escape_html);
        for (record, fields) in &config.directives {
            for (field, text) in fields {
                builder = builder.directive(record, field, text)?;
            }
        }
        let codec = builder.build();
        info!(
            records = codec.directives.len(),
            pretty = codec.pretty,
            sort_map_keys = codec.sort_map_keys,
            escape_html = codec.escape_html,
            "built codec from config"
        );
        Ok(codec)
    }

    /// Read a TOML config file and build a codec from it
    pub fn from_config_file(path: &Path) -> Result<Self> {
        Self::from_config(&CodecConfig::from_file(path)?)
    }

    /// True if output is indented
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// True if entries of sized maps are written in key order
    pub fn sorts_map_keys(&self) -> bool {
        self.sort_map_keys
    }

    /// True if `<`, `>`, `&`, U+2028 and U+2029 are escaped in strings
    pub fn escapes_html(&self) -> bool {
        self.escape_html
    }

    /// Directive declared for `field` of `record`
    pub fn declared(&self, record: &RecordKey, field: &str) -> Option<&Directive> {
        if self.directives.is_empty() {
            return None;
        }
        self.directives.get(&record.to_string())?.get(field)
    }

    /// Binding cache shared by every encode through this codec
    pub fn cache(&self) -> &BindingCache {
        &self.cache
    }

    /// Encode `value` as JSON bytes
    pub fn marshal<T: ?Sized + Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(128);
        self.marshal_to_writer(&mut bytes, value)?;
        Ok(bytes)
    }

    /// Encode `value` as a JSON string
    pub fn marshal_to_string<T: ?Sized + Serialize>(&self, value: &T) -> Result<String> {
        let bytes = self.marshal(value)?;
        // serde_json only writes UTF-8
        String::from_utf8(bytes)
            .map_err(|e| Error::Json(<serde_json::Error as serde::ser::Error>::custom(e)))
    }

    /// Encode `value` as JSON into `writer`
    pub fn marshal_to_writer<W: Write, T: ?Sized + Serialize>(
        &self,
        writer: W,
        value: &T,
    ) -> Result<()> {
        match (self.pretty, self.escape_html) {
            (false, false) => self.write(writer, CompactFormatter, value),
            (true, false) => self.write(writer, PrettyFormatter::new(), value),
            (false, true) => self.write(writer, HtmlSafe::new(CompactFormatter), value),
            (true, true) => self.write(writer, HtmlSafe::new(PrettyFormatter::new()), value),
        }
    }

    fn write<W, F, T>(&self, writer: W, formatter: F, value: &T) -> Result<()>
    where
        W: Write,
        F: Formatter,
        T: ?Sized + Serialize,
    {
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        Fields::new(value, self).serialize(&mut serializer)?;
        Ok(())
    }

    /// Decode JSON bytes into `T`
    pub fn unmarshal<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Builder for [`FieldsCodec`]
#[derive(Debug)]
pub struct CodecBuilder {
    pretty: bool,
    sort_map_keys: bool,
    escape_html: bool,
    directives: FxHashMap<String, FxHashMap<String, Directive>>,
}

impl Default for CodecBuilder {
    fn default() -> Self {
        CodecBuilder {
            pretty: false,
            sort_map_keys: true,
            escape_html: true,
            directives: FxHashMap::default(),
        }
    }
}

impl CodecBuilder {
    /// Indent the output
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Write the entries of sized maps ordered by their JSON key (default
    /// on). Maps of unknown length, including records with flattened
    /// fields, keep their own order.
    pub fn sort_map_keys(mut self, sort: bool) -> Self {
        self.sort_map_keys = sort;
        self
    }

    /// Escape `<`, `>`, `&`, U+2028 and U+2029 in strings (default on)
    pub fn escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }

    /// Declare the directive of `field` in `record`.
    ///
    /// `record` is the serde struct name, or `Enum::Variant` for a struct
    /// variant. The `json` name, if given, must be the field's own name;
    /// wire names are set with `#[serde(rename)]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Directive`] if `text` does not parse or renames the
    /// field.
    pub fn directive(mut self, record: &str, field: &str, text: &str) -> Result<Self> {
        let directive = text
            .parse::<Directive>()
            .and_then(|directive| directive.check_name(field).map(|()| directive))
            .map_err(|source| Error::Directive {
                record: record.to_string(),
                field: field.to_string(),
                source,
            })?;
        self.directives
            .entry(record.to_string())
            .or_default()
            .insert(field.to_string(), directive);
        Ok(self)
    }

    /// Finish the codec
    pub fn build(self) -> FieldsCodec {
        FieldsCodec {
            pretty: self.pretty,
            sort_map_keys: self.sort_map_keys,
            escape_html: self.escape_html,
            directives: self.directives,
            cache: BindingCache::new(),
        }
    }
}
