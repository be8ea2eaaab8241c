//! Serde glue for tri-state values
//!
//! serde carries no runtime type information, so a value advertises the
//! [`IsUndefined`] capability through the *shape* it serializes to: a newtype
//! struct named [`UNDEFINEDABLE_TOKEN`]. Inside the marker, the undefined state
//! is written as a unit struct named [`UNDEFINED_TOKEN`].
//!
//! Plain serializers treat both as transparent (`serde_json` writes `null`
//! for the undefined state), while the field-rewriting codec in `und-json`
//! recognizes the marker and omits undefined fields.

use crate::contract::{IsUndefined, TriState};
use crate::optional::Optional;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Newtype struct name marking a value with the is-undefined capability
pub const UNDEFINEDABLE_TOKEN: &str = "$und::private::Undefinedable";

/// Unit struct name written for the undefined state inside the marker
pub const UNDEFINED_TOKEN: &str = "$und::private::Undefined";

struct TriStatePayload<'a, T: ?Sized>(Optional<Optional<&'a T>>);

impl<T: Serialize + ?Sized> Serialize for TriStatePayload<'_, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            Optional::None => serializer.serialize_unit_struct(UNDEFINED_TOKEN),
            Optional::Some(Optional::None) => serializer.serialize_none(),
            Optional::Some(Optional::Some(v)) => serializer.serialize_some(v),
        }
    }
}

/// Serialize a tri-state container.
///
/// `Null` is written through `serialize_none` and `Defined(v)` through
/// `serialize_some`, so the defined value keeps whatever encoding `T` has.
pub fn serialize_tri_state<U, S>(value: &U, serializer: S) -> Result<S::Ok, S::Error>
where
    U: TriState,
    U::Value: Serialize,
    S: Serializer,
{
    serializer.serialize_newtype_struct(UNDEFINEDABLE_TOKEN, &TriStatePayload(value.as_option()))
}

struct TriStateVisitor<U>(PhantomData<U>);

impl<'de, U> Visitor<'de> for TriStateVisitor<U>
where
    U: TriState,
    U::Value: Deserialize<'de>,
{
    type Value = U;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("null or a value")
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<U, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<U::Value>::deserialize(deserializer).map(U::from_sql_null)
    }

    fn visit_none<E: de::Error>(self) -> Result<U, E> {
        Ok(U::from_sql_null(None))
    }

    fn visit_unit<E: de::Error>(self) -> Result<U, E> {
        Ok(U::from_sql_null(None))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<U, D::Error>
    where
        D: Deserializer<'de>,
    {
        U::Value::deserialize(deserializer).map(|v| U::from_sql_null(Some(v)))
    }
}

/// Deserialize a tri-state container from a present key.
///
/// `null` becomes null and anything else becomes defined. The container is
/// requested as a newtype struct, so a record field without a default fails
/// with a missing-field error when its key is absent, instead of decoding as
/// null. Fields that should decode an absent key as undefined carry
/// `#[serde(default)]`.
pub fn deserialize_tri_state<'de, U, D>(deserializer: D) -> Result<U, D::Error>
where
    U: TriState,
    U::Value: Deserialize<'de>,
    D: Deserializer<'de>,
{
    deserializer.deserialize_newtype_struct(UNDEFINEDABLE_TOKEN, TriStateVisitor(PhantomData))
}

struct RecordPayload<'a, B: ?Sized> {
    undefined: bool,
    body: &'a B,
}

impl<B: Serialize + ?Sized> Serialize for RecordPayload<'_, B> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.undefined {
            serializer.serialize_unit_struct(UNDEFINED_TOKEN)
        } else {
            self.body.serialize(serializer)
        }
    }
}

/// Serialize a user type that is itself undefined-able.
///
/// Call this from the type's `Serialize` impl, passing the part that carries
/// the actual encoding as `body`. The body is written directly inside the
/// marker, which tells the field-rewriting codec that the record as a whole
/// is the undefined-able value; its own fields are left untouched.
///
/// ```
/// use serde::{Serialize, Serializer};
/// use und_core::{ser, IsUndefined};
///
/// #[derive(Serialize)]
/// struct Body {
///     name: Option<String>,
/// }
///
/// struct Patch(Option<Body>);
///
/// impl IsUndefined for Patch {
///     fn is_undefined(&self) -> bool {
///         self.0.is_none()
///     }
/// }
///
/// impl Serialize for Patch {
///     fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
///         ser::serialize_undefinedable(self, &self.0, serializer)
///     }
/// }
///
/// assert_eq!(serde_json::to_string(&Patch(None)).unwrap(), "null");
/// ```
pub fn serialize_undefinedable<T, B, S>(value: &T, body: &B, serializer: S) -> Result<S::Ok, S::Error>
where
    T: IsUndefined + ?Sized,
    B: Serialize + ?Sized,
    S: Serializer,
{
    serializer.serialize_newtype_struct(
        UNDEFINEDABLE_TOKEN,
        &RecordPayload {
            undefined: value.is_undefined(),
            body,
        },
    )
}
