//! Shared fixtures for the conformance suite.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::sync::Once;
use und::{sliceund, Optional, TriState, Und};

static INIT_TRACING: Once = Once::new();

/// Route codec logs to the test harness output.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// The three states, in a fixed order: undefined, null, defined(`v`).
pub fn states<U: TriState>(v: U::Value) -> [U; 3] {
    [U::undefined(), U::null(), U::defined(v)]
}

/// Every raw nested-option shape.
pub fn raw_states(v: i64) -> [Optional<Optional<i64>>; 3] {
    [
        Optional::None,
        Optional::Some(Optional::None),
        Optional::Some(Optional::Some(v)),
    ]
}

/// Assert the state predicates of `u` match `expected` (0 undefined, 1 null, 2 defined).
pub fn assert_state<U: TriState>(u: &U, expected: usize) {
    assert_eq!(TriState::is_undefined(u), expected == 0);
    assert_eq!(TriState::is_null(u), expected == 1);
    assert_eq!(TriState::is_defined(u), expected == 2);
}

/// Patch of a user profile, inline representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePatch {
    pub nickname: Und<String>,
    pub age: Und<u32>,
    pub tags: Und<Vec<String>>,
}

/// Patch of a setting, sequence-backed representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingPatch {
    #[serde(default)]
    pub value: sliceund::Und<String>,
    pub key: String,
}
