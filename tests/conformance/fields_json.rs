//! Field-rewriting JSON codec through the facade.

use crate::common::{init_tracing, ProfilePatch, SettingPatch};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use und::{
    marshal_fields_json, sliceund, unmarshal_fields_json, CodecConfig, Error, FieldsCodec, Und,
};

fn to_string<T: Serialize>(value: &T) -> String {
    String::from_utf8(marshal_fields_json(value).unwrap()).unwrap()
}

#[test]
fn test_patch_encoding() {
    init_tracing();
    let patch = ProfilePatch {
        nickname: Und::defined("kit".to_string()),
        age: Und::null(),
        tags: Und::undefined(),
    };
    assert_eq!(to_string(&patch), r#"{"nickname":"kit","age":null}"#);
    assert_eq!(to_string(&ProfilePatch::default()), "{}");
}

#[test]
fn test_patch_decoding() {
    let patch: ProfilePatch = unmarshal_fields_json(br#"{"age":null,"tags":["a"]}"#).unwrap();
    assert!(patch.nickname.is_undefined());
    assert!(patch.age.is_null());
    assert_eq!(patch.tags, Und::defined(vec!["a".to_string()]));
}

#[test]
fn test_patch_round_trip_keeps_states() {
    let patches = [
        ProfilePatch::default(),
        ProfilePatch {
            nickname: Und::null(),
            age: Und::defined(0),
            tags: Und::defined(Vec::new()),
        },
        ProfilePatch {
            nickname: Und::defined(String::new()),
            age: Und::undefined(),
            tags: Und::null(),
        },
    ];
    for patch in patches {
        let bytes = marshal_fields_json(&patch).unwrap();
        let back: ProfilePatch = unmarshal_fields_json(&bytes).unwrap();
        assert_eq!(back, patch);
    }
}

#[test]
fn test_sequence_representation() {
    let setting = SettingPatch {
        value: sliceund::Und::undefined(),
        key: "theme".to_string(),
    };
    assert_eq!(to_string(&setting), r#"{"key":"theme"}"#);

    let back: SettingPatch = unmarshal_fields_json(br#"{"key":"theme"}"#).unwrap();
    assert_eq!(back, setting);

    let cleared: SettingPatch = unmarshal_fields_json(br#"{"value":null,"key":"theme"}"#).unwrap();
    assert!(cleared.value.is_null());
}

#[test]
fn test_plain_serde_json_is_unaffected() {
    let patch = ProfilePatch {
        nickname: Und::undefined(),
        age: Und::defined(3),
        tags: Und::undefined(),
    };
    assert_eq!(
        serde_json::to_string(&patch).unwrap(),
        r#"{"nickname":null,"age":3,"tags":null}"#
    );
}

#[test]
fn test_batch_of_patches() {
    #[derive(Serialize)]
    struct Batch {
        id: u64,
        patches: Vec<ProfilePatch>,
        note: Und<String>,
    }

    let batch = Batch {
        id: 9,
        patches: vec![
            ProfilePatch::default(),
            ProfilePatch {
                age: Und::defined(30),
                ..ProfilePatch::default()
            },
        ],
        note: Und::undefined(),
    };
    assert_eq!(
        to_string(&batch),
        r#"{"id":9,"patches":[{},{"age":30}]}"#
    );
}

#[test]
fn test_strict_patch_requires_every_key() {
    #[derive(Debug, Deserialize)]
    struct StrictPatch {
        nickname: Und<String>,
        #[serde(default)]
        age: Und<u32>,
    }

    match unmarshal_fields_json::<StrictPatch>(br#"{"age":3}"#) {
        Err(Error::Json(e)) => assert!(e.to_string().contains("missing field `nickname`")),
        other => panic!("expected a missing field error, got {other:?}"),
    }

    let patch: StrictPatch = unmarshal_fields_json(br#"{"nickname":null}"#).unwrap();
    assert!(patch.nickname.is_null());
    assert!(patch.age.is_undefined());
}

#[test]
fn test_flattened_patch() {
    #[derive(Serialize)]
    struct Envelope {
        id: u32,
        #[serde(flatten)]
        patch: ProfilePatch,
    }

    let envelope = Envelope {
        id: 7,
        patch: ProfilePatch {
            age: Und::defined(40),
            ..ProfilePatch::default()
        },
    };
    assert_eq!(to_string(&envelope), r#"{"id":7,"age":40}"#);
}

#[test]
fn test_output_options() {
    let mut labels = HashMap::new();
    labels.insert("team", "a&b");
    labels.insert("env", "<prod>");
    labels.insert("app", "x");

    assert_eq!(
        to_string(&labels),
        r#"{"app":"x","env":"\u003cprod\u003e","team":"a\u0026b"}"#
    );

    let codec = FieldsCodec::from_config(
        &CodecConfig::from_toml_str("sort_map_keys = false\nescape_html = false").unwrap(),
    )
    .unwrap();
    let raw = codec.marshal_to_string(&labels).unwrap();
    let back: HashMap<String, String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(back["env"], "<prod>");
    assert_eq!(back["team"], "a&b");
    assert!(raw.contains(r#""env":"<prod>""#));
}

#[test]
fn test_codec_from_config_file() {
    init_tracing();

    #[derive(Serialize)]
    struct Counter {
        hits: u32,
        label: String,
        extra: Und<bool>,
    }

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codec.toml");
    std::fs::write(
        &path,
        r#"
[directives.Counter]
hits = 'json:"hits,omitempty"'
label = 'json:"label"'
"#,
    )
    .unwrap();

    let codec = FieldsCodec::from_config(&CodecConfig::from_file(&path).unwrap()).unwrap();
    let counter = Counter {
        hits: 0,
        label: String::new(),
        extra: Und::undefined(),
    };
    assert_eq!(codec.marshal_to_string(&counter).unwrap(), r#"{"label":""}"#);
}

#[test]
fn test_codec_rejects_bad_config() {
    let config = CodecConfig::from_toml_str(
        r#"
[directives.Counter]
hits = 'json:hits'
"#,
    )
    .unwrap();
    match FieldsCodec::from_config(&config) {
        Err(Error::Directive { record, field, .. }) => {
            assert_eq!(record, "Counter");
            assert_eq!(field, "hits");
        }
        other => panic!("expected a directive error, got {other:?}"),
    }
}

#[test]
fn test_shared_codec_across_threads() {
    init_tracing();
    let codec = Arc::new(FieldsCodec::new());

    let handles: Vec<_> = (0..8u32)
        .map(|i| {
            let codec = Arc::clone(&codec);
            std::thread::spawn(move || {
                let patch = ProfilePatch {
                    age: if i % 2 == 0 {
                        Und::defined(i)
                    } else {
                        Und::undefined()
                    },
                    ..ProfilePatch::default()
                };
                (i, codec.marshal_to_string(&patch).unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (i, json) = handle.join().unwrap();
        if i % 2 == 0 {
            assert_eq!(json, format!(r#"{{"age":{}}}"#, i));
        } else {
            assert_eq!(json, "{}");
        }
    }
    assert_eq!(codec.cache().len(), 1);
}
