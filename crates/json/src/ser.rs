//! Field-rewriting serializer
//!
//! [`Fields`] wraps a value so that serializing it through any serde
//! `Serializer` routes every nested value through [`FieldsSerializer`]. The
//! wrapper forwards everything to the inner serializer unchanged, except at
//! record boundaries (`serialize_struct` / `serialize_struct_variant`), where
//! each field is checked against its [`FieldBinding`] and skipped when the
//! binding says so. The bytes written for a field that is kept are exactly
//! what the inner serializer would have written. Maps drop undefined
//! entries and, when the codec sorts map keys, are written in key order.
//!
//! A record serialized directly inside the is-undefined marker is the
//! undefined-able value itself; its fields are forwarded without rewriting.

use crate::binding::{FieldBinding, RecordBindings, RecordKey};
use crate::codec::FieldsCodec;
use crate::probe::probe;
use serde::ser::{self, Serialize, Serializer};
use serde_json::Value;
use std::any::type_name;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{trace, warn};
use und_core::ser::UNDEFINEDABLE_TOKEN;

/// A value to be serialized with field rewriting
pub(crate) struct Fields<'a, T: ?Sized> {
    value: &'a T,
    codec: &'a FieldsCodec,
    rewrite: bool,
}

impl<'a, T: ?Sized> Fields<'a, T> {
    pub(crate) fn new(value: &'a T, codec: &'a FieldsCodec) -> Self {
        Fields {
            value,
            codec,
            rewrite: true,
        }
    }

    fn verbatim(value: &'a T, codec: &'a FieldsCodec) -> Self {
        Fields {
            value,
            codec,
            rewrite: false,
        }
    }
}

impl<T: ?Sized + Serialize> Serialize for Fields<'_, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value.serialize(FieldsSerializer {
            inner: serializer,
            codec: self.codec,
            rewrite: self.rewrite,
        })
    }
}

/// Serializer adapter applying field bindings at record boundaries
pub(crate) struct FieldsSerializer<'a, S> {
    inner: S,
    codec: &'a FieldsCodec,
    /// False for a record that is itself the undefined-able value
    rewrite: bool,
}

impl<'a, S: Serializer> Serializer for FieldsSerializer<'a, S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = Compound<'a, S::SerializeSeq>;
    type SerializeTuple = Compound<'a, S::SerializeTuple>;
    type SerializeTupleStruct = Compound<'a, S::SerializeTupleStruct>;
    type SerializeTupleVariant = Compound<'a, S::SerializeTupleVariant>;
    type SerializeMap = Entries<'a, S::SerializeMap>;
    type SerializeStruct = Record<'a, S::SerializeStruct>;
    type SerializeStructVariant = Record<'a, S::SerializeStructVariant>;

    fn serialize_bool(self, v: bool) -> Result<S::Ok, S::Error> {
        self.inner.serialize_bool(v)
    }

    fn serialize_i8(self, v: i8) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i8(v)
    }

    fn serialize_i16(self, v: i16) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i16(v)
    }

    fn serialize_i32(self, v: i32) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i32(v)
    }

    fn serialize_i64(self, v: i64) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i64(v)
    }

    fn serialize_i128(self, v: i128) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i128(v)
    }

    fn serialize_u8(self, v: u8) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u8(v)
    }

    fn serialize_u16(self, v: u16) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u16(v)
    }

    fn serialize_u32(self, v: u32) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u32(v)
    }

    fn serialize_u64(self, v: u64) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u64(v)
    }

    fn serialize_u128(self, v: u128) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u128(v)
    }

    fn serialize_f32(self, v: f32) -> Result<S::Ok, S::Error> {
        self.inner.serialize_f32(v)
    }

    fn serialize_f64(self, v: f64) -> Result<S::Ok, S::Error> {
        self.inner.serialize_f64(v)
    }

    fn serialize_char(self, v: char) -> Result<S::Ok, S::Error> {
        self.inner.serialize_char(v)
    }

    fn serialize_str(self, v: &str) -> Result<S::Ok, S::Error> {
        self.inner.serialize_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<S::Ok, S::Error> {
        self.inner.serialize_bytes(v)
    }

    fn serialize_none(self) -> Result<S::Ok, S::Error> {
        self.inner.serialize_none()
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<S::Ok, S::Error> {
        self.inner.serialize_some(&Fields::new(value, self.codec))
    }

    fn serialize_unit(self) -> Result<S::Ok, S::Error> {
        self.inner.serialize_unit()
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<S::Ok, S::Error> {
        self.inner.serialize_unit_struct(name)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<S::Ok, S::Error> {
        self.inner
            .serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        if name == UNDEFINEDABLE_TOKEN {
            self.inner
                .serialize_newtype_struct(name, &Fields::verbatim(value, self.codec))
        } else {
            self.inner
                .serialize_newtype_struct(name, &Fields::new(value, self.codec))
        }
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        self.inner.serialize_newtype_variant(
            name,
            variant_index,
            variant,
            &Fields::new(value, self.codec),
        )
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, S::Error> {
        Ok(Compound::new(self.inner.serialize_seq(len)?, self.codec))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, S::Error> {
        Ok(Compound::new(self.inner.serialize_tuple(len)?, self.codec))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, S::Error> {
        Ok(Compound::new(
            self.inner.serialize_tuple_struct(name, len)?,
            self.codec,
        ))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, S::Error> {
        Ok(Compound::new(
            self.inner
                .serialize_tuple_variant(name, variant_index, variant, len)?,
            self.codec,
        ))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, S::Error> {
        let sort = len.is_some() && self.codec.sorts_map_keys();
        Ok(Entries::new(self.inner.serialize_map(len)?, self.codec, sort))
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, S::Error> {
        let plan = Plan::for_record(self.codec, RecordKey::record(name), self.rewrite);
        Ok(Record {
            inner: self.inner.serialize_struct(name, len)?,
            codec: self.codec,
            plan,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, S::Error> {
        let plan = Plan::for_record(
            self.codec,
            RecordKey::variant(name, variant),
            self.rewrite,
        );
        Ok(Record {
            inner: self
                .inner
                .serialize_struct_variant(name, variant_index, variant, len)?,
            codec: self.codec,
            plan,
        })
    }

    fn collect_str<T: ?Sized + Display>(self, value: &T) -> Result<S::Ok, S::Error> {
        self.inner.collect_str(value)
    }

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }
}

/// Sequence and tuple adapter: wraps every element
pub(crate) struct Compound<'a, C> {
    inner: C,
    codec: &'a FieldsCodec,
}

impl<'a, C> Compound<'a, C> {
    fn new(inner: C, codec: &'a FieldsCodec) -> Self {
        Compound { inner, codec }
    }
}

impl<C: ser::SerializeSeq> ser::SerializeSeq for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_element(&Fields::new(value, self.codec))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTuple> ser::SerializeTuple for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_element(&Fields::new(value, self.codec))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTupleStruct> ser::SerializeTupleStruct for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_field(&Fields::new(value, self.codec))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTupleVariant> ser::SerializeTupleVariant for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_field(&Fields::new(value, self.codec))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

/// Map adapter.
///
/// Entries whose value is undefined are dropped, which also covers record
/// fields lifted into the map by `#[serde(flatten)]`. With key sorting on,
/// entries of a map of known length are buffered and written ordered by
/// their JSON key on `end`.
pub(crate) struct Entries<'a, M> {
    inner: M,
    codec: &'a FieldsCodec,
    /// Key written by `serialize_key`, awaiting its value
    pending: Option<String>,
    sorted: Option<Vec<(String, Value)>>,
}

impl<'a, M> Entries<'a, M> {
    fn new(inner: M, codec: &'a FieldsCodec, sort: bool) -> Self {
        Entries {
            inner,
            codec,
            pending: None,
            sorted: if sort { Some(Vec::new()) } else { None },
        }
    }
}

fn is_undefined<T: ?Sized + Serialize>(value: &T) -> bool {
    let shape = probe(value);
    shape.undefinedable && shape.undefined
}

/// The text a map key is written as
fn key_text<K: ?Sized + Serialize, E: ser::Error>(key: &K) -> Result<String, E> {
    match serde_json::to_value(key).map_err(E::custom)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(E::custom(format_args!(
            "map key must be a string, number or bool, got {}",
            other
        ))),
    }
}

impl<M: ser::SerializeMap> ser::SerializeMap for Entries<'_, M> {
    type Ok = M::Ok;
    type Error = M::Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), M::Error> {
        self.pending = Some(key_text::<_, M::Error>(key)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), M::Error> {
        let key = self
            .pending
            .take()
            .ok_or_else(|| {
                <M::Error as ser::Error>::custom("serialize_value called before serialize_key")
            })?;
        ser::SerializeMap::serialize_entry(self, &key, value)
    }

    fn serialize_entry<K, V>(&mut self, key: &K, value: &V) -> Result<(), M::Error>
    where
        K: ?Sized + Serialize,
        V: ?Sized + Serialize,
    {
        if is_undefined(value) {
            return Ok(());
        }
        match &mut self.sorted {
            Some(buffer) => {
                let value = serde_json::to_value(Fields::new(value, self.codec))
                    .map_err(<M::Error as ser::Error>::custom)?;
                buffer.push((key_text::<_, M::Error>(key)?, value));
                Ok(())
            }
            None => self
                .inner
                .serialize_entry(key, &Fields::new(value, self.codec)),
        }
    }

    fn end(mut self) -> Result<M::Ok, M::Error> {
        if let Some(mut buffer) = self.sorted.take() {
            buffer.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, value) in &buffer {
                self.inner.serialize_entry(key, value)?;
            }
        }
        self.inner.end()
    }
}

/// How a record's fields are decided
enum Plan {
    /// Forward every field
    Verbatim,
    /// Bindings are cached; `unseen` collects fields the cached set lacks
    Cached {
        record: RecordKey,
        bindings: Arc<RecordBindings>,
        unseen: Vec<FieldBinding>,
    },
    /// First encode of the record; bindings are published on `end`
    Building {
        record: RecordKey,
        fields: Vec<FieldBinding>,
    },
}

impl Plan {
    fn for_record(codec: &FieldsCodec, record: RecordKey, rewrite: bool) -> Plan {
        if !rewrite {
            return Plan::Verbatim;
        }
        match codec.cache().get(&record) {
            Some(bindings) => {
                trace!(record = %record, "record bindings cache hit");
                Plan::Cached {
                    record,
                    bindings,
                    unseen: Vec::new(),
                }
            }
            None => Plan::Building {
                record,
                fields: Vec::new(),
            },
        }
    }

    /// Decide whether `value` of field `key` is omitted
    fn omits<T: ?Sized + Serialize>(
        &mut self,
        codec: &FieldsCodec,
        key: &'static str,
        value: &T,
    ) -> bool {
        match self {
            Plan::Verbatim => false,
            Plan::Cached {
                record,
                bindings,
                unseen,
            } => {
                if let Some(binding) = bindings.get_for::<T>(key) {
                    return binding.omits(value);
                }
                if let Some(other) = bindings.get(key) {
                    // Published below, so each field type is reported once
                    warn!(
                        record = %record,
                        field = key,
                        cached = other.type_name(),
                        actual = type_name::<T>(),
                        "record name shared by different types, binding field per type"
                    );
                }
                let binding = FieldBinding::bind(*record, key, value, codec.declared(record, key));
                let omit = binding.omits(value);
                unseen.push(binding);
                omit
            }
            Plan::Building { record, fields } => {
                let binding = FieldBinding::bind(*record, key, value, codec.declared(record, key));
                let omit = binding.omits(value);
                fields.push(binding);
                omit
            }
        }
    }

    /// Publish whatever this encode learned about the record
    fn finish(self, codec: &FieldsCodec) {
        match self {
            Plan::Building { record, fields } => {
                codec.cache().publish(record, fields);
            }
            Plan::Cached {
                record, unseen, ..
            } if !unseen.is_empty() => {
                codec.cache().publish(record, unseen);
            }
            _ => {}
        }
    }
}

/// Struct and struct variant adapter: applies field bindings
pub(crate) struct Record<'a, C> {
    inner: C,
    codec: &'a FieldsCodec,
    plan: Plan,
}

impl<C: ser::SerializeStruct> ser::SerializeStruct for Record<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), C::Error> {
        if self.plan.omits(self.codec, key, value) {
            self.inner.skip_field(key)
        } else {
            self.inner
                .serialize_field(key, &Fields::new(value, self.codec))
        }
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), C::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.plan.finish(self.codec);
        self.inner.end()
    }
}

impl<C: ser::SerializeStructVariant> ser::SerializeStructVariant for Record<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), C::Error> {
        if self.plan.omits(self.codec, key, value) {
            self.inner.skip_field(key)
        } else {
            self.inner
                .serialize_field(key, &Fields::new(value, self.codec))
        }
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), C::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.plan.finish(self.codec);
        self.inner.end()
    }
}
