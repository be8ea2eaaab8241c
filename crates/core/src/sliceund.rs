//! Tri-state value, sequence representation
//!
//! `Und<T>` here is a sequence of `Optional<T>` holding zero or one element:
//!
//! | State     | Elements          |
//! |-----------|-------------------|
//! | Undefined | `[]`              |
//! | Null      | `[None]`          |
//! | Defined   | `[Some(v)]`       |
//!
//! The sequence is exposed through [`Und::as_slice`] and [`Und::iter`], so
//! call sites that already work with slices can filter or iterate a value
//! with the usual slice algorithms. The single element is stored inline and
//! never allocates.
//!
//! Observable behavior (construction, queries, equality, serialization) is
//! identical to [`crate::und::Und`].

use crate::contract::{IsUndefined, TriState};
use crate::optional::Optional;
use crate::ser;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::{smallvec, SmallVec};

type Slot<T> = SmallVec<[Optional<T>; 1]>;

/// A value that is undefined, null, or defined, backed by a sequence of
/// length zero or one.
///
/// ## Invariants
///
/// - The sequence never holds more than one element
/// - An empty sequence is undefined; `[None]` is null; `[Some(v)]` is defined
///
/// As with [`crate::und::Und`], a record field of this type decodes an
/// absent key as undefined only when it carries `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Und<T>(Slot<T>);

impl<T> Default for Und<T> {
    fn default() -> Self {
        Und::undefined()
    }
}

impl<T> Und<T> {
    /// The undefined state
    #[inline]
    pub fn undefined() -> Self {
        Und(SmallVec::new())
    }

    /// The null state
    #[inline]
    pub fn null() -> Self {
        Und(smallvec![Optional::None])
    }

    /// The defined state holding `value`
    #[inline]
    pub fn defined(value: T) -> Self {
        Und(smallvec![Optional::Some(value)])
    }

    /// Copy out of a pointer-like input.
    ///
    /// `None` becomes undefined; `Some(&v)` becomes `Defined(v.clone())`.
    pub fn from_pointer(value: Option<&T>) -> Self
    where
        T: Clone,
    {
        match value {
            Some(v) => Und::defined(v.clone()),
            None => Und::undefined(),
        }
    }

    /// Build from the nested optional form
    pub fn from_option(opt: Optional<Optional<T>>) -> Self {
        match opt {
            Optional::None => Und::undefined(),
            Optional::Some(inner) => Und(smallvec![inner]),
        }
    }

    /// Consume into the nested optional form
    pub fn into_option(self) -> Optional<Optional<T>> {
        match self.0.into_iter().next() {
            Some(inner) => Optional::Some(inner),
            None => Optional::None,
        }
    }

    /// Borrow as the nested optional form
    pub fn as_option(&self) -> Optional<Optional<&T>> {
        match self.0.first() {
            Some(inner) => Optional::Some(inner.as_ref()),
            None => Optional::None,
        }
    }

    /// Build from the binary-null shape: NULL becomes null, never undefined.
    pub fn from_sql_null(value: Option<T>) -> Self {
        match value {
            Some(v) => Und::defined(v),
            None => Und::null(),
        }
    }

    /// Convert to the binary-null shape; null and undefined both become NULL.
    pub fn sql_null(&self) -> Option<T>
    where
        T: Clone,
    {
        self.as_value().cloned()
    }

    /// Returns true if undefined
    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self.0.first(), Some(Optional::None))
    }

    /// Returns true if defined
    #[inline]
    pub fn is_defined(&self) -> bool {
        matches!(self.0.first(), Some(Optional::Some(_)))
    }

    /// Get the defined value, or `T::default()` otherwise
    pub fn value(&self) -> T
    where
        T: Clone + Default,
    {
        self.as_value().cloned().unwrap_or_default()
    }

    /// Consume and return the defined value, or `T::default()` otherwise
    pub fn into_value(self) -> T
    where
        T: Default,
    {
        self.into_option().into_value().into_value()
    }

    /// Borrow the defined value
    pub fn as_value(&self) -> Option<&T> {
        match self.0.first() {
            Some(Optional::Some(v)) => Some(v),
            _ => None,
        }
    }

    /// Borrow the value, keeping the state
    pub fn as_ref(&self) -> Und<&T> {
        Und::from_option(self.as_option())
    }

    /// The backing sequence
    #[inline]
    pub fn as_slice(&self) -> &[Optional<T>] {
        &self.0
    }

    /// Iterate the backing sequence (zero or one element)
    pub fn iter(&self) -> std::slice::Iter<'_, Optional<T>> {
        self.0.iter()
    }

    /// Transform through the nested optional form.
    ///
    /// See [`crate::und::Und::map`].
    pub fn map<U, F>(self, f: F) -> Und<U>
    where
        F: FnOnce(Optional<Optional<T>>) -> Optional<Optional<U>>,
    {
        Und::from_option(f(self.into_option()))
    }

    /// Map the defined value, keeping undefined and null as they are
    pub fn map_value<U, F>(self, f: F) -> Und<U>
    where
        F: FnOnce(T) -> U,
    {
        self.map(|o| o.map_value(|inner| inner.map_value(f)))
    }

    /// Compare states; `cmp` decides only when both sides are defined.
    pub fn equal_func<F>(&self, other: &Und<T>, cmp: F) -> bool
    where
        F: FnOnce(&T, &T) -> bool,
    {
        TriState::equal_func(self, other, cmp)
    }
}

impl<'a, T> Und<&'a T> {
    /// Wrap a pointer-like input without copying.
    ///
    /// See [`crate::und::Und::wrap_pointer`].
    pub fn wrap_pointer(value: Option<&'a T>) -> Self {
        match value {
            Some(v) => Und::defined(v),
            None => Und::undefined(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Und<T> {
    type Item = &'a Optional<T>;
    type IntoIter = std::slice::Iter<'a, Optional<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> TriState for Und<T> {
    type Value = T;

    fn undefined() -> Self {
        Und::undefined()
    }

    fn null() -> Self {
        Und::null()
    }

    fn defined(value: T) -> Self {
        Und::defined(value)
    }

    fn from_option(opt: Optional<Optional<T>>) -> Self {
        Und::from_option(opt)
    }

    fn into_option(self) -> Optional<Optional<T>> {
        Und::into_option(self)
    }

    fn as_option(&self) -> Optional<Optional<&T>> {
        Und::as_option(self)
    }
}

impl<T> IsUndefined for Und<T> {
    fn is_undefined(&self) -> bool {
        Und::is_undefined(self)
    }
}

impl<T> From<Optional<Optional<T>>> for Und<T> {
    fn from(opt: Optional<Optional<T>>) -> Self {
        Und::from_option(opt)
    }
}

impl<T> From<Option<Option<T>>> for Und<T> {
    fn from(opt: Option<Option<T>>) -> Self {
        Und::from(crate::und::Und::from(opt))
    }
}

impl<T> From<Und<T>> for Option<Option<T>> {
    fn from(und: Und<T>) -> Self {
        crate::und::Und::from(und).into()
    }
}

impl<T> From<crate::und::Und<T>> for Und<T> {
    fn from(und: crate::und::Und<T>) -> Self {
        Und::from_option(und.into_option())
    }
}

impl<T> From<Und<T>> for crate::und::Und<T> {
    fn from(und: Und<T>) -> Self {
        crate::und::Und::from_option(und.into_option())
    }
}

impl<T: Serialize> Serialize for Und<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser::serialize_tri_state(self, serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Und<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        ser::deserialize_tri_state(deserializer)
    }
}
