//! Tri-state value, inline representation
//!
//! `Und<T>` is `Optional<Optional<T>>` held by value:
//!
//! | State     | Representation            |
//! |-----------|---------------------------|
//! | Undefined | `None`                    |
//! | Null      | `Some(None)`              |
//! | Defined   | `Some(Some(v))`           |
//!
//! It is `Copy` whenever `T` is, and suits plain value aggregates such as
//! request and patch records. For a representation backed by a sequence of
//! length zero or one, see [`crate::sliceund`].
//!
//! ## Serialization
//!
//! - `Defined(v)` writes `v`, `Null` writes `null`
//! - `Undefined` writes `null` with a plain encoder; `und-json` omits the field
//! - A present key decodes to `Null` or `Defined`
//! - An absent key decodes to `Undefined` only through `#[serde(default)]`
//!   on the field or its record; without it decoding fails with a
//!   missing-field error

use crate::contract::{IsUndefined, TriState};
use crate::optional::Optional;
use crate::ser;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value that is undefined, null, or defined.
///
/// Record fields of this type need `#[serde(default)]` to accept an absent
/// key:
///
/// ```
/// use serde::Deserialize;
/// use und_core::und::Und;
///
/// #[derive(Deserialize)]
/// struct Patch {
///     #[serde(default)]
///     name: Und<String>,
///     age: Und<u32>,
/// }
///
/// let patch: Patch = serde_json::from_str(r#"{"age":null}"#).unwrap();
/// assert!(patch.name.is_undefined());
/// assert!(patch.age.is_null());
///
/// assert!(serde_json::from_str::<Patch>(r#"{"name":"x"}"#).is_err());
/// ```
///
/// ## Equality
///
/// Two values are equal iff they are in the same state and, when defined,
/// their values are equal. `Defined(T::default())` is never equal to `Null`
/// or `Undefined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Und<T>(Optional<Optional<T>>);

impl<T> Default for Und<T> {
    fn default() -> Self {
        Und::undefined()
    }
}

impl<T> Und<T> {
    /// The undefined state
    #[inline]
    pub const fn undefined() -> Self {
        Und(Optional::None)
    }

    /// The null state
    #[inline]
    pub const fn null() -> Self {
        Und(Optional::Some(Optional::None))
    }

    /// The defined state holding `value`
    #[inline]
    pub const fn defined(value: T) -> Self {
        Und(Optional::Some(Optional::Some(value)))
    }

    /// Copy out of a pointer-like input.
    ///
    /// `None` becomes undefined; `Some(&v)` becomes `Defined(v.clone())`. Later
    /// changes to the original are not visible through the result.
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
    #[inline]
    pub const fn from_option(opt: Optional<Optional<T>>) -> Self {
        Und(opt)
    }

    /// Consume into the nested optional form
    #[inline]
    pub fn into_option(self) -> Optional<Optional<T>> {
        self.0
    }

    /// Borrow as the nested optional form
    pub fn as_option(&self) -> Optional<Optional<&T>> {
        match &self.0 {
            Optional::None => Optional::None,
            Optional::Some(inner) => Optional::Some(inner.as_ref()),
        }
    }

    /// Build from the binary-null shape: NULL becomes null, never undefined.
    pub fn from_sql_null(value: Option<T>) -> Self {
        match value {
            Some(v) => Und::defined(v),
            None => Und::null(),
        }
    }

    /// Convert to the binary-null shape.
    ///
    /// Both null and undefined become NULL; the binary protocol has no third
    /// state.
    pub fn sql_null(&self) -> Option<T>
    where
        T: Clone,
    {
        self.as_value().cloned()
    }

    /// Returns true if undefined
    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.0.is_none()
    }

    /// Returns true if null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self.0, Optional::Some(Optional::None))
    }

    /// Returns true if defined
    #[inline]
    pub fn is_defined(&self) -> bool {
        matches!(self.0, Optional::Some(Optional::Some(_)))
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
        match self.0 {
            Optional::Some(Optional::Some(v)) => v,
            _ => T::default(),
        }
    }

    /// Borrow the defined value
    pub fn as_value(&self) -> Option<&T> {
        match &self.0 {
            Optional::Some(Optional::Some(v)) => Some(v),
            _ => None,
        }
    }

    /// Borrow the value, keeping the state
    pub fn as_ref(&self) -> Und<&T> {
        Und(self.as_option())
    }

    /// Transform through the nested optional form.
    ///
    /// `f` receives the whole state and returns the new one, so it can change
    /// the state as well as the value type:
    ///
    /// ```
    /// use und_core::{Optional, und::Und};
    ///
    /// // Normalize null to undefined
    /// let v = Und::<i32>::null().map(|o| match o {
    ///     Optional::Some(Optional::None) => Optional::None,
    ///     other => other,
    /// });
    /// assert!(v.is_undefined());
    /// ```
    pub fn map<U, F>(self, f: F) -> Und<U>
    where
        F: FnOnce(Optional<Optional<T>>) -> Optional<Optional<U>>,
    {
        Und(f(self.0))
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
    /// `None` becomes undefined; `Some(r)` becomes `Defined(r)`. The result
    /// borrows the original for `'a`, so changes made through interior
    /// mutability of the original are visible through the wrapped value.
    #[inline]
    pub const fn wrap_pointer(value: Option<&'a T>) -> Self {
        match value {
            Some(v) => Und::defined(v),
            None => Und::undefined(),
        }
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
        self.0
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
        Und(opt)
    }
}

impl<T> From<Option<Option<T>>> for Und<T> {
    fn from(opt: Option<Option<T>>) -> Self {
        Und(Optional::from(opt).map_value(Optional::from))
    }
}

impl<T> From<Und<T>> for Option<Option<T>> {
    fn from(und: Und<T>) -> Self {
        und.0.map_value(Optional::into_option).into_option()
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
