//! Versioned JSON encoding of [`SessionValue`].
//!
//! ```json
//! {
//!   "version": 1,
//!   "session": {
//!     "attributes": {"active": {"type": "flag", "value": true}},
//!     "rsa_key": {"kind": "private", "der": "MIIC..."}
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::key::KeyKind;
use super::{CodecError, RsaKeyMaterial, SessionAttribute, SessionValue};

/// Current version written by [`encode_session`].
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    session: WireSessionRef<'a>,
}

#[derive(Serialize)]
struct WireSessionRef<'a> {
    attributes: &'a BTreeMap<String, SessionAttribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rsa_key: Option<WireKey>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    session: WireSession,
}

#[derive(Deserialize)]
struct WireSession {
    #[serde(default)]
    attributes: BTreeMap<String, SessionAttribute>,
    #[serde(default)]
    rsa_key: Option<WireKey>,
}

#[derive(Serialize, Deserialize)]
struct WireKey {
    kind: KeyKind,
    der: String,
}

/// Serializes a session value to JSON bytes.
pub fn encode_session(value: &SessionValue) -> Result<Vec<u8>, CodecError> {
    let rsa_key = value
        .rsa_key
        .as_ref()
        .map(|key| {
            Ok::<_, CodecError>(WireKey {
                kind: key.kind(),
                der: key.to_base64()?,
            })
        })
        .transpose()?;

    let envelope = EnvelopeRef {
        version: FORMAT_VERSION,
        session: WireSessionRef {
            attributes: &value.attributes,
            rsa_key,
        },
    };

    serde_json::to_vec(&envelope).map_err(|e| CodecError::Serialize(e.to_string()))
}

/// Deserializes JSON bytes produced by [`encode_session`].
pub fn decode_session(bytes: &[u8]) -> Result<SessionValue, CodecError> {
    let probe: VersionProbe =
        serde_json::from_slice(bytes).map_err(|e| CodecError::Deserialize(e.to_string()))?;
    if probe.version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(probe.version));
    }

    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|e| CodecError::Deserialize(e.to_string()))?;

    let rsa_key = envelope
        .session
        .rsa_key
        .map(|key| RsaKeyMaterial::from_base64(key.kind, &key.der))
        .transpose()?;

    Ok(SessionValue {
        attributes: envelope.session.attributes,
        rsa_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    const PRIVATE_PEM: &str = include_str!("../../testdata/rsa_private_key.pem");
    const PUBLIC_PEM: &str = include_str!("../../testdata/rsa_public_key.pem");

    fn sample_session() -> SessionValue {
        SessionValue::new()
            .with("sub", "abc")
            .with("client_id", "full")
            .with("active", true)
            .with("revoked", false)
    }

    #[test]
    fn test_roundtrip_attributes() {
        let value = sample_session();

        let bytes = encode_session(&value).expect("encode should succeed");
        let decoded = decode_session(&bytes).expect("decode should succeed");

        assert_eq!(value, decoded);
    }

    #[test]
    fn test_roundtrip_with_private_key() {
        let key = RsaKeyMaterial::from_pem(PRIVATE_PEM).unwrap();
        let value = sample_session().with_rsa_key(key);

        let bytes = encode_session(&value).unwrap();
        let decoded = decode_session(&bytes).unwrap();

        assert_eq!(value, decoded);
        assert!(decoded.rsa_key.unwrap().is_private());
    }

    #[test]
    fn test_roundtrip_with_public_key() {
        let key = RsaKeyMaterial::from_pem(PUBLIC_PEM).unwrap();
        let value = SessionValue::new().with("sub", "abc").with_rsa_key(key);

        let bytes = encode_session(&value).unwrap();
        let decoded = decode_session(&bytes).unwrap();

        assert_eq!(value, decoded);
    }

    #[test]
    fn test_roundtrip_empty_session() {
        let value = SessionValue::new();

        let bytes = encode_session(&value).unwrap();
        let decoded = decode_session(&bytes).unwrap();

        assert!(decoded.is_empty());
    }

    #[test]
    fn test_encoded_document_shape() {
        let key = RsaKeyMaterial::from_pem(PRIVATE_PEM).unwrap();
        let value = SessionValue::new()
            .with("active", true)
            .with_rsa_key(key.clone());

        let bytes = encode_session(&value).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["version"], 1);
        assert_eq!(
            json["session"]["attributes"]["active"],
            serde_json::json!({"type": "flag", "value": true})
        );
        assert_eq!(json["session"]["rsa_key"]["kind"], "private");

        let der = STANDARD
            .decode(json["session"]["rsa_key"]["der"].as_str().unwrap())
            .unwrap();
        assert_eq!(der, key.to_der().unwrap());
    }

    #[test]
    fn test_rsa_key_omitted_when_absent() {
        let bytes = encode_session(&sample_session()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert!(json["session"].get("rsa_key").is_none());
    }

    #[test]
    fn test_encoding_is_independent_of_insertion_order() {
        let a = SessionValue::new().with("a", "1").with("b", true);
        let b = SessionValue::new().with("b", true).with("a", "1");

        assert_eq!(encode_session(&a).unwrap(), encode_session(&b).unwrap());
    }

    #[test]
    fn test_unsupported_version() {
        let bytes = br#"{"version": 2, "session": {"attributes": {}}}"#;

        let result = decode_session(bytes);

        assert_eq!(result, Err(CodecError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_invalid_json() {
        let result = decode_session(b"not json");
        assert!(matches!(result, Err(CodecError::Deserialize(_))));
    }

    #[test]
    fn test_wrong_attribute_type_is_rejected() {
        let bytes = br#"{"version": 1, "session": {"attributes": {"n": {"type": "number", "value": 3}}}}"#;

        let result = decode_session(bytes);

        assert!(matches!(result, Err(CodecError::Deserialize(_))));
    }

    #[test]
    fn test_corrupt_key_is_invalid_key() {
        let bytes = br#"{"version": 1, "session": {"attributes": {}, "rsa_key": {"kind": "private", "der": "AAAA"}}}"#;

        let result = decode_session(bytes);

        assert!(matches!(result, Err(CodecError::InvalidKey(_))));
    }
}
