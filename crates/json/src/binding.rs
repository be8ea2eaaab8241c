//! Field bindings and the per-record cache
//!
//! A [`FieldBinding`] records, for one field of one record type, the
//! directive the codec applies and the rule deciding when the field is
//! omitted. Bindings are computed on the first encode of a record and
//! published to a [`BindingCache`]; later encodes only read them.
//!
//! Records are keyed by serde name, which distinct Rust types may share
//! (`Page<A>` and `Page<B>` are both `Page`). A binding also records its
//! field's type, and a record holds one binding per field and type.
//!
//! ## Concurrency
//!
//! The cache is guarded by a `parking_lot::RwLock`. Two threads encoding the
//! same record for the first time may both compute its bindings. Bindings are
//! a pure function of the record type, so the first published set wins and a
//! later one only contributes fields the first did not see.

use crate::directive::{Directive, JSON_KEY, OMITEMPTY};
use crate::probe::probe;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Identifies a record: a serde struct, or a struct variant of an enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey {
    /// serde container name
    pub name: &'static str,
    /// Variant name for struct variants
    pub variant: Option<&'static str>,
}

impl RecordKey {
    /// Key for a struct
    pub const fn record(name: &'static str) -> Self {
        RecordKey {
            name,
            variant: None,
        }
    }

    /// Key for a struct variant
    pub const fn variant(name: &'static str, variant: &'static str) -> Self {
        RecordKey {
            name,
            variant: Some(variant),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant {
            Some(variant) => write!(f, "{}::{}", self.name, variant),
            None => f.write_str(self.name),
        }
    }
}

/// When a field is left out of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OmitRule {
    /// Always written
    Never,
    /// Omitted while the value is undefined
    WhenUndefined,
    /// Omitted while the value is a zero value
    WhenZero,
}

/// Encoding decision for one field of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    field: &'static str,
    type_name: &'static str,
    directive: Directive,
    omit: OmitRule,
}

impl FieldBinding {
    /// Bind `field` from its first observed value.
    ///
    /// A value with the is-undefined capability gets `omitempty` forced onto
    /// its directive and is omitted only while undefined. Any other value
    /// keeps its declared directive and is omitted while zero only if that
    /// directive asks for `omitempty`.
    pub fn bind<T: ?Sized + Serialize>(
        record: RecordKey,
        field: &'static str,
        value: &T,
        declared: Option<&Directive>,
    ) -> Self {
        let shape = probe(value);
        let (directive, omit) = if shape.undefinedable {
            let directive = declared
                .cloned()
                .unwrap_or_default()
                .with_flag(JSON_KEY, OMITEMPTY);
            (directive, OmitRule::WhenUndefined)
        } else {
            let directive = declared.cloned().unwrap_or_default();
            let omit = if directive.has_flag(JSON_KEY, OMITEMPTY) {
                OmitRule::WhenZero
            } else {
                OmitRule::Never
            };
            (directive, omit)
        };

        debug!(
            record = %record,
            field,
            type_name = type_name::<T>(),
            directive = %directive,
            omit = ?omit,
            "bound field"
        );

        FieldBinding {
            field,
            type_name: type_name::<T>(),
            directive,
            omit,
        }
    }

    /// Field name
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Name of the field type the binding was computed for
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Directive applied to the field
    pub fn directive(&self) -> &Directive {
        &self.directive
    }

    /// Omission rule
    pub fn omit(&self) -> OmitRule {
        self.omit
    }

    /// True if the binding was computed for values of type `T`
    pub(crate) fn binds<T: ?Sized>(&self) -> bool {
        self.type_name == type_name::<T>()
    }

    /// Decide whether `value` is left out of the output
    pub(crate) fn omits<T: ?Sized + Serialize>(&self, value: &T) -> bool {
        match self.omit {
            OmitRule::Never => false,
            OmitRule::WhenUndefined => probe(value).undefined,
            OmitRule::WhenZero => probe(value).zero,
        }
    }
}

/// All bindings of one record, in field order
#[derive(Debug, Clone, Default)]
pub struct RecordBindings {
    fields: Vec<FieldBinding>,
}

impl RecordBindings {
    /// First binding for `field`
    pub fn get(&self, field: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|b| b.field == field)
    }

    /// Binding for `field` computed for values of type `T`
    pub fn get_for<T: ?Sized>(&self, field: &str) -> Option<&FieldBinding> {
        self.fields
            .iter()
            .find(|b| b.field == field && b.binds::<T>())
    }

    fn get_typed(&self, field: &str, type_name: &str) -> Option<&FieldBinding> {
        self.fields
            .iter()
            .find(|b| b.field == field && b.type_name == type_name)
    }

    /// All bindings
    pub fn fields(&self) -> &[FieldBinding] {
        &self.fields
    }

    /// Number of bound fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no field is bound
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Cache of record bindings, shared by every encode through one codec
#[derive(Debug, Default)]
pub struct BindingCache {
    records: RwLock<FxHashMap<RecordKey, Arc<RecordBindings>>>,
}

impl BindingCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings for `record`, if published
    pub fn get(&self, record: &RecordKey) -> Option<Arc<RecordBindings>> {
        self.records.read().get(record).cloned()
    }

    /// Publish bindings for `record` and return the cached set.
    ///
    /// Fields already cached keep their binding; new fields, and known
    /// fields seen with a different type, are appended.
    pub fn publish(&self, record: RecordKey, fields: Vec<FieldBinding>) -> Arc<RecordBindings> {
        let mut records = self.records.write();
        match records.get(&record).cloned() {
            Some(existing) => {
                let missing: Vec<FieldBinding> = fields
                    .into_iter()
                    .filter(|b| existing.get_typed(b.field, b.type_name).is_none())
                    .collect();
                if missing.is_empty() {
                    return existing;
                }
                let mut merged = existing.fields.clone();
                merged.extend(missing);
                debug!(record = %record, fields = merged.len(), "extended record bindings");
                let merged = Arc::new(RecordBindings { fields: merged });
                records.insert(record, Arc::clone(&merged));
                merged
            }
            None => {
                debug!(record = %record, fields = fields.len(), "published record bindings");
                let bindings = Arc::new(RecordBindings { fields });
                records.insert(record, Arc::clone(&bindings));
                bindings
            }
        }
    }

    /// Number of cached records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Drop every cached record
    pub fn clear(&self) {
        self.records.write().clear();
    }
}
