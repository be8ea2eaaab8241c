//! Shape probe
//!
//! A serializer that writes nothing and only reports the shape of a value:
//!
//! - whether it carries the is-undefined capability (the
//!   [`UNDEFINEDABLE_TOKEN`] marker), and if so whether it is undefined
//! - whether it is a zero value in the `omitempty` sense: `null`, `false`,
//!   `0`, an empty string, byte string, sequence or map
//!
//! Compound values are settled as soon as their header is seen; their
//! elements are never visited.

use serde::ser::{self, Impossible, Serialize, Serializer};
use std::fmt;
use und_core::ser::{UNDEFINEDABLE_TOKEN, UNDEFINED_TOKEN};

/// What the probe learned about a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shape {
    /// The value carries the is-undefined capability
    pub undefinedable: bool,
    /// The value is in the undefined state
    pub undefined: bool,
    /// The value is a zero value
    pub zero: bool,
}

impl Shape {
    fn zero(zero: bool) -> Self {
        Shape {
            zero,
            ..Shape::default()
        }
    }

    fn non_zero() -> Self {
        Shape::default()
    }
}

/// Probe the shape of `value`.
///
/// A value whose `Serialize` impl fails is reported as a plain non-zero
/// value; the real encoder surfaces the error when the value is written.
pub fn probe<T: ?Sized + Serialize>(value: &T) -> Shape {
    match value.serialize(Probe) {
        Ok(shape) | Err(ProbeError::Settled(shape)) => shape,
        Err(ProbeError::Custom) => Shape::non_zero(),
    }
}

#[derive(Debug)]
enum ProbeError {
    /// Compound value settled from its header
    Settled(Shape),
    /// The value's own serialization failed
    Custom,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Settled(shape) => write!(f, "settled: {:?}", shape),
            ProbeError::Custom => f.write_str("value failed to serialize"),
        }
    }
}

impl std::error::Error for ProbeError {}

impl ser::Error for ProbeError {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        ProbeError::Custom
    }
}

struct Probe;

type Unreachable = Impossible<Shape, ProbeError>;

impl Serializer for Probe {
    type Ok = Shape;
    type Error = ProbeError;
    type SerializeSeq = Unreachable;
    type SerializeTuple = Unreachable;
    type SerializeTupleStruct = Unreachable;
    type SerializeTupleVariant = Unreachable;
    type SerializeMap = Unreachable;
    type SerializeStruct = Unreachable;
    type SerializeStructVariant = Unreachable;

    fn serialize_bool(self, v: bool) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(!v))
    }

    fn serialize_i8(self, v: i8) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0))
    }

    fn serialize_i16(self, v: i16) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0))
    }

    fn serialize_i32(self, v: i32) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0))
    }

    fn serialize_i64(self, v: i64) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0))
    }

    fn serialize_i128(self, v: i128) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0))
    }

    fn serialize_u8(self, v: u8) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0))
    }

    fn serialize_u16(self, v: u16) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0))
    }

    fn serialize_u32(self, v: u32) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0))
    }

    fn serialize_u64(self, v: u64) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0))
    }

    fn serialize_u128(self, v: u128) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0))
    }

    fn serialize_f32(self, v: f32) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0.0))
    }

    fn serialize_f64(self, v: f64) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v == 0.0))
    }

    fn serialize_char(self, _v: char) -> Result<Shape, ProbeError> {
        Ok(Shape::non_zero())
    }

    fn serialize_str(self, v: &str) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v.is_empty()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(v.is_empty()))
    }

    fn serialize_none(self) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(true))
    }

    // A present optional is never empty, whatever it holds.
    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<Shape, ProbeError> {
        Ok(Shape::non_zero())
    }

    fn serialize_unit(self) -> Result<Shape, ProbeError> {
        Ok(Shape::zero(true))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Shape, ProbeError> {
        if name == UNDEFINED_TOKEN {
            Ok(Shape {
                undefinedable: false,
                undefined: true,
                zero: true,
            })
        } else {
            Ok(Shape::non_zero())
        }
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Shape, ProbeError> {
        Ok(Shape::non_zero())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Shape, ProbeError> {
        if name == UNDEFINEDABLE_TOKEN {
            let inner = probe(value);
            Ok(Shape {
                undefinedable: true,
                undefined: inner.undefined,
                zero: inner.zero,
            })
        } else {
            value.serialize(self)
        }
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Shape, ProbeError> {
        Ok(Shape::non_zero())
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, ProbeError> {
        Err(ProbeError::Settled(Shape::zero(len == Some(0))))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, ProbeError> {
        Err(ProbeError::Settled(Shape::zero(len == 0)))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, ProbeError> {
        Err(ProbeError::Settled(Shape::non_zero()))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, ProbeError> {
        Err(ProbeError::Settled(Shape::non_zero()))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, ProbeError> {
        Err(ProbeError::Settled(Shape::zero(len == Some(0))))
    }

    // Records are never empty.
    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, ProbeError> {
        Err(ProbeError::Settled(Shape::non_zero()))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, ProbeError> {
        Err(ProbeError::Settled(Shape::non_zero()))
    }
}
