//! Tri-state contract shared by both `Und` representations
//!
//! A tri-state value is one of:
//!
//! - **Undefined**: absent entirely (outer `None`)
//! - **Null**: present but explicitly empty (outer `Some`, inner `None`)
//! - **Defined**: present with a value (outer `Some`, inner `Some`)
//!
//! [`crate::und::Und`] stores the state inline and [`crate::sliceund::Und`]
//! stores it in a sequence of length zero or one. Both implement
//! [`TriState`], so code that only needs the contract can be written once
//! against the trait.

use crate::optional::Optional;

/// Capability to report whether the current value is undefined.
///
/// Serializers that skip undefined fields rely on this capability rather
/// than on a zero-value comparison: `Defined("")` and `Null` are both
/// emitted, only `Undefined` is omitted.
pub trait IsUndefined {
    /// Returns true if the value is in the undefined state
    fn is_undefined(&self) -> bool;
}

/// Construction and inspection of a tri-state value.
///
/// Implementors provide the three constructors and the conversions to and
/// from `Optional<Optional<T>>`; the state queries and comparisons are
/// derived from [`TriState::as_option`].
///
/// ## Invariants
///
/// - Exactly one of `is_undefined`, `is_null`, `is_defined` is true
/// - `from_option(x.into_option())` has the same state and value as `x`
pub trait TriState: Sized {
    /// Type of the defined value
    type Value;

    /// The undefined state
    fn undefined() -> Self;

    /// The null state
    fn null() -> Self;

    /// The defined state holding `value`
    fn defined(value: Self::Value) -> Self;

    /// Build from the nested optional form
    fn from_option(opt: Optional<Optional<Self::Value>>) -> Self;

    /// Consume into the nested optional form
    fn into_option(self) -> Optional<Optional<Self::Value>>;

    /// Borrow as the nested optional form
    fn as_option(&self) -> Optional<Optional<&Self::Value>>;

    /// Returns true if undefined
    fn is_undefined(&self) -> bool {
        self.as_option().is_none()
    }

    /// Returns true if null
    fn is_null(&self) -> bool {
        matches!(self.as_option(), Optional::Some(Optional::None))
    }

    /// Returns true if defined
    fn is_defined(&self) -> bool {
        matches!(self.as_option(), Optional::Some(Optional::Some(_)))
    }

    /// Borrow the defined value
    fn as_value(&self) -> Option<&Self::Value> {
        match self.as_option() {
            Optional::Some(Optional::Some(v)) => Some(v),
            _ => None,
        }
    }

    /// Compare states; `cmp` decides only when both sides are defined.
    fn equal_func<F>(&self, other: &Self, cmp: F) -> bool
    where
        F: FnOnce(&Self::Value, &Self::Value) -> bool,
    {
        match (self.as_option(), other.as_option()) {
            (Optional::None, Optional::None) => true,
            (Optional::Some(Optional::None), Optional::Some(Optional::None)) => true,
            (Optional::Some(Optional::Some(a)), Optional::Some(Optional::Some(b))) => cmp(a, b),
            _ => false,
        }
    }

    /// Build from the binary-null shape. Never produces undefined.
    fn from_sql_null(value: Option<Self::Value>) -> Self {
        match value {
            Some(v) => Self::defined(v),
            None => Self::null(),
        }
    }

    /// Convert to the binary-null shape; undefined and null both become NULL.
    fn sql_null(&self) -> Option<Self::Value>
    where
        Self::Value: Clone,
    {
        self.as_value().cloned()
    }
}
