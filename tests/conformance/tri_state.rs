//! Both representations against the shared tri-state contract.

use crate::common::{assert_state, raw_states, states};
use proptest::prelude::*;
use std::cell::Cell;
use std::fmt::Debug;
use und::{sliceund, Optional, TriState, Und};

fn check_contract<U>()
where
    U: TriState<Value = i64> + PartialEq + Debug + Default,
{
    for (i, u) in states::<U>(7).iter().enumerate() {
        assert_state(u, i);
    }

    // Default is undefined
    assert_state(&U::default(), 0);

    // Raw shapes round trip
    for raw in raw_states(3) {
        assert_eq!(U::from_option(raw).into_option(), raw);
    }

    // Equality distinguishes every state and compares defined values
    let [undefined, null, defined] = states::<U>(1);
    assert_ne!(undefined, null);
    assert_ne!(null, defined);
    assert_ne!(undefined, defined);
    assert_eq!(U::defined(1), defined);
    assert_ne!(U::defined(2), defined);

    // as_value
    assert_eq!(undefined.as_value(), None);
    assert_eq!(null.as_value(), None);
    assert_eq!(defined.as_value(), Some(&1));

    // Database-null collapse
    assert_eq!(undefined.sql_null(), None);
    assert_eq!(null.sql_null(), None);
    assert_eq!(defined.sql_null(), Some(1));
    assert_state(&U::from_sql_null(None), 1);
    assert_eq!(U::from_sql_null(Some(1)), defined);
}

#[test]
fn test_inline_contract() {
    check_contract::<Und<i64>>();
}

#[test]
fn test_sequence_contract() {
    check_contract::<sliceund::Und<i64>>();
}

#[test]
fn test_equal_func_across_states() {
    let ci = |a: &&str, b: &&str| a.eq_ignore_ascii_case(b);
    assert!(Und::defined("Foo").equal_func(&Und::defined("foo"), ci));
    assert!(Und::<&str>::null().equal_func(&Und::null(), ci));
    assert!(!Und::<&str>::null().equal_func(&Und::undefined(), ci));
    assert!(!Und::defined("foo").equal_func(&Und::null(), ci));

    let a = sliceund::Und::defined("Foo");
    assert!(a.equal_func(&sliceund::Und::defined("FOO"), ci));
    assert!(!a.equal_func(&sliceund::Und::undefined(), ci));
}

#[test]
fn test_zero_values() {
    assert_eq!(Und::<String>::undefined().value(), "");
    assert_eq!(Und::<String>::null().value(), "");
    assert_eq!(Und::defined("x".to_string()).value(), "x");
    assert_eq!(sliceund::Und::<u8>::null().value(), 0);
    assert_eq!(Optional::<i32>::None.value(), 0);
}

#[test]
fn test_pointer_constructors() {
    let cell = Cell::new(1);

    let copied = Und::from_pointer(Some(&cell));
    let borrowed = Und::wrap_pointer(Some(&cell));
    cell.set(2);

    assert_eq!(copied.as_value().map(Cell::get), Some(1));
    assert_eq!(borrowed.as_value().map(|c| c.get()), Some(2));
    assert!(Und::<Cell<i32>>::from_pointer(None).is_undefined());
    assert!(Und::<&Cell<i32>>::wrap_pointer(None).is_undefined());

    let seq = sliceund::Und::wrap_pointer(Some(&cell));
    cell.set(3);
    assert_eq!(seq.as_value().map(|c| c.get()), Some(3));
}

#[test]
fn test_map_on_whole_container() {
    let doubled = Und::defined(2).map(|o| match o {
        Optional::Some(Optional::Some(v)) => Optional::Some(Optional::Some(v * 2)),
        other => other,
    });
    assert_eq!(doubled, Und::defined(4));

    // A mapping may move between states
    let revived = Und::<i32>::undefined().map(|_| Optional::Some(Optional::<i32>::None));
    assert!(revived.is_null());

    let len = sliceund::Und::defined("abc").map_value(str::len);
    assert_eq!(len, sliceund::Und::defined(3));
}

#[test]
fn test_representation_conversions() {
    for (i, raw) in raw_states(5).into_iter().enumerate() {
        let inline = Und::from_option(raw);
        let seq: sliceund::Und<i64> = inline.into();
        assert_state(&seq, i);
        assert_eq!(seq.as_slice().len(), usize::from(i > 0));

        let back: Und<i64> = seq.into();
        assert_eq!(back, inline);
    }
}

#[test]
fn test_std_option_conversions() {
    let und: Und<i32> = Some(None).into();
    assert!(und.is_null());
    let nested: Option<Option<i32>> = Und::defined(1).into();
    assert_eq!(nested, Some(Some(1)));
    let seq: sliceund::Und<i32> = None.into();
    assert!(seq.is_undefined());
}

fn arb_raw() -> impl Strategy<Value = Optional<Optional<i64>>> {
    prop_oneof![
        Just(Optional::None),
        Just(Optional::Some(Optional::None)),
        any::<i64>().prop_map(|v| Optional::Some(Optional::Some(v))),
    ]
}

proptest! {
    #[test]
    fn prop_representations_agree(raw in arb_raw()) {
        let inline = Und::from_option(raw);
        let seq = sliceund::Und::from_option(raw);
        prop_assert_eq!(inline.is_undefined(), seq.is_undefined());
        prop_assert_eq!(inline.is_null(), seq.is_null());
        prop_assert_eq!(inline.is_defined(), seq.is_defined());
        prop_assert_eq!(inline.value(), seq.value());
        prop_assert_eq!(inline.sql_null(), seq.sql_null());
        prop_assert_eq!(
            serde_json::to_string(&inline).unwrap(),
            serde_json::to_string(&seq).unwrap()
        );
    }

    #[test]
    fn prop_equality_matches_raw(a in arb_raw(), b in arb_raw()) {
        prop_assert_eq!(Und::from_option(a) == Und::from_option(b), a == b);
        prop_assert_eq!(
            sliceund::Und::from_option(a) == sliceund::Und::from_option(b),
            a == b
        );
    }

    #[test]
    fn prop_map_value_preserves_state(raw in arb_raw()) {
        let mapped = Und::from_option(raw).map_value(|v| v.wrapping_add(1));
        prop_assert_eq!(mapped.is_undefined(), raw.is_none());
        prop_assert_eq!(mapped.is_null(), raw == Optional::Some(Optional::None));
    }
}
