//! Two-state optional value
//!
//! This module defines:
//! - Optional: a value that is either absent (`None`) or present (`Some`)
//!
//! `Optional<T>` is the building block of the tri-state types in
//! [`crate::und`] and [`crate::sliceund`]. It behaves like
//! `std::option::Option`, with two differences that matter to callers:
//!
//! - [`Optional::value`] never panics; it returns `T::default()` when absent.
//! - [`Optional::map`] transforms the whole container, not only the inner
//!   value. Use [`Optional::map_value`] for the latter.
//!
//! ## Binary-null protocol
//!
//! Database drivers scan nullable columns into `std::option::Option<T>`
//! (`NULL` is `None`). [`Optional::from_sql_null`] and
//! [`Optional::sql_null`] translate between that shape and `Optional<T>`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value that is either absent or present.
///
/// ## Equality
///
/// - `None == None`
/// - `Some(a) == Some(b)` iff `a == b`
/// - `None != Some(_)`, including `Some(T::default())`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Optional<T> {
    /// Absent
    None,
    /// Present with a value
    Some(T),
}

impl<T> Default for Optional<T> {
    fn default() -> Self {
        Optional::None
    }
}

impl<T> Optional<T> {
    /// Create a present value
    #[inline]
    pub const fn some(value: T) -> Self {
        Optional::Some(value)
    }

    /// Create an absent value
    #[inline]
    pub const fn none() -> Self {
        Optional::None
    }

    /// Check if a value is present
    #[inline]
    pub fn is_some(&self) -> bool {
        matches!(self, Optional::Some(_))
    }

    /// Check if the value is absent
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Optional::None)
    }

    /// Get the inner value, or `T::default()` when absent.
    pub fn value(&self) -> T
    where
        T: Clone + Default,
    {
        match self {
            Optional::Some(v) => v.clone(),
            Optional::None => T::default(),
        }
    }

    /// Consume and return the inner value, or `T::default()` when absent.
    pub fn into_value(self) -> T
    where
        T: Default,
    {
        match self {
            Optional::Some(v) => v,
            Optional::None => T::default(),
        }
    }

    /// Borrow the inner value
    #[inline]
    pub const fn as_ref(&self) -> Optional<&T> {
        match self {
            Optional::Some(v) => Optional::Some(v),
            Optional::None => Optional::None,
        }
    }

    /// Mutably borrow the inner value
    #[inline]
    pub fn as_mut(&mut self) -> Optional<&mut T> {
        match self {
            Optional::Some(v) => Optional::Some(v),
            Optional::None => Optional::None,
        }
    }

    /// Convert into `std::option::Option`
    #[inline]
    pub fn into_option(self) -> Option<T> {
        self.into()
    }

    /// Borrow as `std::option::Option<&T>`
    #[inline]
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Optional::Some(v) => Some(v),
            Optional::None => None,
        }
    }

    /// Apply `f` to the whole container and return its result.
    ///
    /// This is the composition point used by the tri-state `map`: `f` sees
    /// both states and decides the resulting state.
    pub fn map<U, F>(self, f: F) -> Optional<U>
    where
        F: FnOnce(Optional<T>) -> Optional<U>,
    {
        f(self)
    }

    /// Map the inner value, leaving `None` untouched
    pub fn map_value<U, F>(self, f: F) -> Optional<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Optional::Some(v) => Optional::Some(f(v)),
            Optional::None => Optional::None,
        }
    }

    /// Compare with `other`, using `cmp` only when both sides are present.
    ///
    /// When either side is absent the result is plain state comparison.
    pub fn equal_func<F>(&self, other: &Optional<T>, cmp: F) -> bool
    where
        F: FnOnce(&T, &T) -> bool,
    {
        match (self, other) {
            (Optional::Some(a), Optional::Some(b)) => cmp(a, b),
            (Optional::None, Optional::None) => true,
            _ => false,
        }
    }

    /// Build from the binary-null shape: `None` (NULL) becomes `None`.
    #[inline]
    pub fn from_sql_null(value: Option<T>) -> Self {
        value.into()
    }

    /// Convert to the binary-null shape: `None` becomes NULL.
    pub fn sql_null(&self) -> Option<T>
    where
        T: Clone,
    {
        self.as_option().cloned()
    }
}

impl<T> From<Option<T>> for Optional<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Optional::Some(v),
            None => Optional::None,
        }
    }
}

impl<T> From<Optional<T>> for Option<T> {
    fn from(v: Optional<T>) -> Self {
        match v {
            Optional::Some(v) => Some(v),
            Optional::None => None,
        }
    }
}

impl<T: Serialize> Serialize for Optional<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Optional::Some(v) => serializer.serialize_some(v),
            Optional::None => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Optional<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Optional::from)
    }
}
