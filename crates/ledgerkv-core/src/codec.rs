//! Wire codec: a [`Value`] to CBOR bytes and back.
//!
//! Every supported variant maps to a native CBOR item, so the integer/float
//! distinction and container structure survive a round trip exactly. The
//! lossy [`Value::Opaque`] fallback is carried under a private CBOR tag:
//! decode recognises the tag and returns the raw string, it never tries to
//! rebuild whatever the string came from.
//!
//! CBOR items outside the closed set (byte strings, foreign tags, non-text
//! map keys) are downgraded to `Opaque` with a diagnostic rendering, or
//! rejected outright under [`DecodeMode::Strict`].

use std::collections::BTreeMap;

use ciborium::value::Value as Cbor;

use crate::error::{CoreError, Result};
use crate::value::Value;

/// Private CBOR tag marking the one-way textual fallback.
pub const OPAQUE_TAG: u64 = 27_700;

/// How decode treats items outside the closed type set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Downgrade unsupported items to [`Value::Opaque`].
    #[default]
    Lossy,
    /// Fail with [`CoreError::UnsupportedItem`] instead.
    Strict,
}

/// Encode a value to CBOR bytes.
pub fn encode_value(value: &Value) -> Result<Vec<u8>> {
    let item = to_cbor(value);
    let mut buf = Vec::new();
    ciborium::into_writer(&item, &mut buf)
        .map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(buf)
}

/// Decode CBOR bytes back into a value.
pub fn decode_value(bytes: &[u8], mode: DecodeMode) -> Result<Value> {
    let item: Cbor =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;
    from_cbor(item, mode)
}

fn to_cbor(value: &Value) -> Cbor {
    match value {
        Value::Int(n) => Cbor::Integer((*n).into()),
        Value::Float(f) => Cbor::Float(*f),
        Value::Bool(b) => Cbor::Bool(*b),
        Value::Str(s) => Cbor::Text(s.clone()),
        Value::Null => Cbor::Null,
        Value::List(items) => Cbor::Array(items.iter().map(to_cbor).collect()),
        Value::Map(entries) => Cbor::Map(
            entries
                .iter()
                .map(|(k, v)| (Cbor::Text(k.clone()), to_cbor(v)))
                .collect(),
        ),
        Value::Opaque(s) => Cbor::Tag(OPAQUE_TAG, Box::new(Cbor::Text(s.clone()))),
    }
}

fn from_cbor(item: Cbor, mode: DecodeMode) -> Result<Value> {
    match item {
        Cbor::Integer(n) => match i64::try_from(n) {
            Ok(n) => Ok(Value::Int(n)),
            Err(_) => unsupported("integer outside i64 range", &Cbor::Integer(n), mode),
        },
        Cbor::Float(f) => Ok(Value::Float(f)),
        Cbor::Bool(b) => Ok(Value::Bool(b)),
        Cbor::Text(s) => Ok(Value::Str(s)),
        Cbor::Null => Ok(Value::Null),
        Cbor::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(from_cbor(item, mode)?);
            }
            Ok(Value::List(out))
        }
        Cbor::Map(entries) => {
            let mut out = BTreeMap::new();
            for (k, v) in entries {
                match k {
                    Cbor::Text(key) => {
                        out.insert(key, from_cbor(v, mode)?);
                    }
                    other => return unsupported("non-text map key", &other, mode),
                }
            }
            Ok(Value::Map(out))
        }
        Cbor::Tag(OPAQUE_TAG, inner) => match *inner {
            Cbor::Text(s) => Ok(Value::Opaque(s)),
            other => Err(CoreError::DecodingError(format!(
                "opaque tag must wrap text, got {other:?}"
            ))),
        },
        other => unsupported("item outside the supported set", &other, mode),
    }
}

fn unsupported(what: &str, item: &Cbor, mode: DecodeMode) -> Result<Value> {
    match mode {
        DecodeMode::Strict => Err(CoreError::UnsupportedItem(format!("{what}: {item:?}"))),
        DecodeMode::Lossy => Ok(Value::Opaque(format!("{item:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roundtrip(v: &Value) -> Value {
        let bytes = encode_value(v).unwrap();
        decode_value(&bytes, DecodeMode::Lossy).unwrap()
    }

    #[test]
    fn test_scalar_roundtrips() {
        for v in [
            Value::Int(0),
            Value::Int(-42),
            Value::Int(i64::MAX),
            Value::Float(3.4),
            Value::Float(-0.0),
            Value::Bool(true),
            Value::Str(String::new()),
            Value::Str("Hello, world!".to_string()),
            Value::Null,
        ] {
            assert_eq!(roundtrip(&v), v);
        }
    }

    #[test]
    fn test_int_float_distinction_survives() {
        assert_eq!(roundtrip(&Value::Int(3)), Value::Int(3));
        assert_eq!(roundtrip(&Value::Float(3.0)), Value::Float(3.0));
    }

    #[test]
    fn test_nested_containers() {
        let mut map = BTreeMap::new();
        map.insert("message".to_string(), Value::Str("Hello, world!".into()));
        map.insert(
            "mixed".to_string(),
            Value::List(vec![Value::Int(1), Value::Str("2".into()), Value::Float(3.4)]),
        );
        let v = Value::Map(map);
        assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn test_opaque_stays_opaque() {
        let v = Value::Opaque("<Gadget object at 0x7f>".to_string());
        let back = roundtrip(&v);
        assert_eq!(back, v);
        // Never confused with a plain string of the same content.
        assert_ne!(back, Value::Str("<Gadget object at 0x7f>".to_string()));
    }

    #[test]
    fn test_foreign_item_downgrades_lossy() {
        // A raw CBOR byte string is outside the closed set.
        let mut buf = Vec::new();
        ciborium::into_writer(&Cbor::Bytes(vec![1, 2, 3]), &mut buf).unwrap();

        let v = decode_value(&buf, DecodeMode::Lossy).unwrap();
        assert!(matches!(v, Value::Opaque(_)));

        let err = decode_value(&buf, DecodeMode::Strict).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedItem(_)));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let err = decode_value(&[0xff, 0x00, 0xab], DecodeMode::Lossy).unwrap_err();
        assert!(matches!(err, CoreError::DecodingError(_)));
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<i64>().prop_map(Value::Int),
            (-1.0e12..1.0e12f64).prop_map(Value::Float),
            any::<bool>().prop_map(Value::Bool),
            "[a-zA-Z0-9 ]{0,24}".prop_map(Value::Str),
            Just(Value::Null),
            "[ -~]{0,24}".prop_map(Value::Opaque),
        ];
        leaf.prop_recursive(3, 24, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..6).prop_map(Value::Map),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_roundtrip_exact(v in arb_value()) {
            let bytes = encode_value(&v).unwrap();
            let back = decode_value(&bytes, DecodeMode::Lossy).unwrap();
            prop_assert_eq!(back, v);
        }

        #[test]
        fn prop_strict_accepts_closed_set(v in arb_value()) {
            let bytes = encode_value(&v).unwrap();
            prop_assert!(decode_value(&bytes, DecodeMode::Strict).is_ok());
        }
    }
}
