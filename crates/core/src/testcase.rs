//! Conformance checks shared by both `Und` representations
//!
//! Every check is generic over [`TriState`], so the value and sequence
//! representations are held to the same observable behavior.

use crate::contract::{IsUndefined, TriState};
use crate::optional::Optional;
use proptest::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Strategy over all three states with arbitrary defined values
pub(crate) fn arb_state() -> impl Strategy<Value = Optional<Optional<i64>>> {
    prop_oneof![
        Just(Optional::None),
        Just(Optional::Some(Optional::None)),
        any::<i64>().prop_map(|v| Optional::Some(Optional::Some(v))),
    ]
}

/// Exactly one state predicate holds, and `as_value` agrees with it.
pub(crate) fn check_states<U>(value: i64)
where
    U: TriState<Value = i64> + IsUndefined + Debug,
{
    let defined = U::defined(value);
    let null = U::null();
    let undefined = U::undefined();

    assert!(TriState::is_defined(&defined));
    assert!(!TriState::is_null(&defined));
    assert!(!TriState::is_undefined(&defined));
    assert_eq!(defined.as_value(), Some(&value));

    assert!(!TriState::is_defined(&null));
    assert!(TriState::is_null(&null));
    assert!(!TriState::is_undefined(&null));
    assert_eq!(null.as_value(), None);

    assert!(!TriState::is_defined(&undefined));
    assert!(!TriState::is_null(&undefined));
    assert!(TriState::is_undefined(&undefined));
    assert_eq!(undefined.as_value(), None);

    // The capability agrees with the contract
    assert!(IsUndefined::is_undefined(&undefined));
    assert!(!IsUndefined::is_undefined(&null));
    assert!(!IsUndefined::is_undefined(&defined));
}

/// Same-state pairs are equal, cross-state pairs never are.
pub(crate) fn check_equality<U>(value: i64)
where
    U: TriState<Value = i64> + PartialEq + Debug,
{
    assert_eq!(U::defined(value), U::defined(value));
    assert_eq!(U::null(), U::null());
    assert_eq!(U::undefined(), U::undefined());
    assert_ne!(U::defined(value), U::defined(value.wrapping_add(1)));

    // Zero value never equals absence
    assert_ne!(U::defined(0), U::null());
    assert_ne!(U::defined(0), U::undefined());
    assert_ne!(U::null(), U::undefined());

    assert!(U::defined(value).equal_func(&U::defined(value), |a, b| a == b));
    assert!(!U::defined(value).equal_func(&U::defined(value), |a, b| a != b));
    assert!(U::null().equal_func(&U::null(), |_, _| false));
    assert!(U::undefined().equal_func(&U::undefined(), |_, _| false));
    assert!(!U::defined(value).equal_func(&U::null(), |_, _| true));
    assert!(!U::defined(value).equal_func(&U::undefined(), |_, _| true));
    assert!(!U::null().equal_func(&U::undefined(), |_, _| true));
}

/// `into_option` and `from_option` are inverses for every state.
pub(crate) fn check_option_round_trip<U>(value: i64)
where
    U: TriState<Value = i64> + PartialEq + Debug + Clone,
{
    assert_eq!(U::defined(value).into_option(), Optional::Some(Optional::Some(value)));
    assert_eq!(U::null().into_option(), Optional::Some(Optional::None));
    assert_eq!(U::undefined().into_option(), Optional::None);

    for x in [U::defined(value), U::null(), U::undefined()] {
        assert_eq!(U::from_option(x.clone().into_option()), x);
    }
}

/// The binary-null shape never yields undefined; undefined collapses to NULL.
pub(crate) fn check_sql_null<U>(value: i64)
where
    U: TriState<Value = i64> + Debug,
{
    assert!(TriState::is_null(&U::from_sql_null(None)));
    assert_eq!(U::from_sql_null(Some(value)).as_value(), Some(&value));

    assert_eq!(U::defined(value).sql_null(), Some(value));
    assert_eq!(U::null().sql_null(), None);
    assert_eq!(U::undefined().sql_null(), None);
}

/// Plain serde_json: undefined and null both write `null`; a present key
/// never decodes to undefined.
pub(crate) fn check_plain_json<U>(value: i64)
where
    U: TriState<Value = i64> + Serialize + DeserializeOwned + Debug,
{
    assert_eq!(serde_json::to_string(&U::defined(value)).unwrap(), value.to_string());
    assert_eq!(serde_json::to_string(&U::null()).unwrap(), "null");
    assert_eq!(serde_json::to_string(&U::undefined()).unwrap(), "null");

    let decoded: U = serde_json::from_str(&value.to_string()).unwrap();
    assert_eq!(decoded.as_value(), Some(&value));
    let decoded: U = serde_json::from_str("null").unwrap();
    assert!(TriState::is_null(&decoded));
}

/// Run every check against one representation
pub(crate) fn run_conformance<U>(value: i64)
where
    U: TriState<Value = i64>
        + IsUndefined
        + PartialEq
        + Debug
        + Clone
        + Serialize
        + DeserializeOwned,
{
    check_states::<U>(value);
    check_equality::<U>(value);
    check_option_round_trip::<U>(value);
    check_sql_null::<U>(value);
    check_plain_json::<U>(value);
}
