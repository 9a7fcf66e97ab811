//! RSA key material embedded in session values.
//!
//! Keys travel as DER bytes (PKCS#8 for private keys, SPKI for public keys)
//! encoded with standard base64.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

use super::CodecError;

/// An RSA key stored alongside session attributes.
#[derive(Clone, PartialEq, Eq)]
pub enum RsaKeyMaterial {
    Private(RsaPrivateKey),
    Public(RsaPublicKey),
}

/// Which half of the key pair a stored key is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum KeyKind {
    Private,
    Public,
}

impl RsaKeyMaterial {
    /// Parses a PEM document.
    ///
    /// Accepts PKCS#8 and PKCS#1 private keys, and SPKI and PKCS#1 public keys.
    pub fn from_pem(pem: &str) -> Result<Self, CodecError> {
        if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
            return Ok(Self::Private(key));
        }
        if let Ok(key) = RsaPrivateKey::from_pkcs1_pem(pem) {
            return Ok(Self::Private(key));
        }
        if let Ok(key) = RsaPublicKey::from_public_key_pem(pem) {
            return Ok(Self::Public(key));
        }
        RsaPublicKey::from_pkcs1_pem(pem)
            .map(Self::Public)
            .map_err(|e| CodecError::InvalidKey(format!("unrecognized PEM document: {e}")))
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private(_))
    }

    /// Returns the public half of the key.
    pub fn public_key(&self) -> RsaPublicKey {
        match self {
            Self::Private(key) => RsaPublicKey::from(key),
            Self::Public(key) => key.clone(),
        }
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        match self {
            Self::Private(key) => key.size() * 8,
            Self::Public(key) => key.size() * 8,
        }
    }

    /// Exports the key as DER bytes.
    pub fn to_der(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Private(key) => key
                .to_pkcs8_der()
                .map(|doc| doc.as_bytes().to_vec())
                .map_err(|e| CodecError::InvalidKey(e.to_string())),
            Self::Public(key) => key
                .to_public_key_der()
                .map(|doc| doc.as_bytes().to_vec())
                .map_err(|e| CodecError::InvalidKey(e.to_string())),
        }
    }

    pub(crate) fn kind(&self) -> KeyKind {
        match self {
            Self::Private(_) => KeyKind::Private,
            Self::Public(_) => KeyKind::Public,
        }
    }

    pub(crate) fn to_base64(&self) -> Result<String, CodecError> {
        Ok(STANDARD.encode(self.to_der()?))
    }

    pub(crate) fn from_base64(kind: KeyKind, encoded: &str) -> Result<Self, CodecError> {
        let der = STANDARD
            .decode(encoded)
            .map_err(|e| CodecError::InvalidKey(format!("invalid base64: {e}")))?;

        match kind {
            KeyKind::Private => RsaPrivateKey::from_pkcs8_der(&der)
                .map(Self::Private)
                .map_err(|e| CodecError::InvalidKey(e.to_string())),
            KeyKind::Public => RsaPublicKey::from_public_key_der(&der)
                .map(Self::Public)
                .map_err(|e| CodecError::InvalidKey(e.to_string())),
        }
    }
}

// Never print key components.
impl fmt::Debug for RsaKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_private() { "Private" } else { "Public" };
        write!(f, "RsaKeyMaterial::{}({} bits)", kind, self.bits())
    }
}

impl From<RsaPrivateKey> for RsaKeyMaterial {
    fn from(key: RsaPrivateKey) -> Self {
        Self::Private(key)
    }
}

impl From<RsaPublicKey> for RsaKeyMaterial {
    fn from(key: RsaPublicKey) -> Self {
        Self::Public(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_PEM: &str = include_str!("../../testdata/rsa_private_key.pem");
    const PUBLIC_PEM: &str = include_str!("../../testdata/rsa_public_key.pem");

    #[test]
    fn from_pem_reads_private_and_public_keys() {
        let private = RsaKeyMaterial::from_pem(PRIVATE_PEM).unwrap();
        let public = RsaKeyMaterial::from_pem(PUBLIC_PEM).unwrap();

        assert!(private.is_private());
        assert!(!public.is_private());
        assert_eq!(private.public_key(), public.public_key());
        assert_eq!(private.bits(), 1024);
    }

    #[test]
    fn from_pem_rejects_garbage() {
        let result = RsaKeyMaterial::from_pem("-----BEGIN NOTHING-----\n-----END NOTHING-----\n");
        assert!(matches!(result, Err(CodecError::InvalidKey(_))));
    }

    #[test]
    fn base64_roundtrip_private() {
        let key = RsaKeyMaterial::from_pem(PRIVATE_PEM).unwrap();

        let encoded = key.to_base64().unwrap();
        let decoded = RsaKeyMaterial::from_base64(KeyKind::Private, &encoded).unwrap();

        assert_eq!(key, decoded);
    }

    #[test]
    fn base64_roundtrip_public() {
        let key = RsaKeyMaterial::from_pem(PUBLIC_PEM).unwrap();

        let encoded = key.to_base64().unwrap();
        let decoded = RsaKeyMaterial::from_base64(KeyKind::Public, &encoded).unwrap();

        assert_eq!(key, decoded);
    }

    #[test]
    fn from_base64_rejects_invalid_base64() {
        let result = RsaKeyMaterial::from_base64(KeyKind::Private, "not base64!!");
        assert!(matches!(result, Err(CodecError::InvalidKey(_))));
    }

    #[test]
    fn from_base64_rejects_wrong_kind() {
        let public = RsaKeyMaterial::from_pem(PUBLIC_PEM).unwrap();
        let encoded = public.to_base64().unwrap();

        let result = RsaKeyMaterial::from_base64(KeyKind::Private, &encoded);
        assert!(matches!(result, Err(CodecError::InvalidKey(_))));
    }

    #[test]
    fn debug_does_not_leak_key_material() {
        let key = RsaKeyMaterial::from_pem(PRIVATE_PEM).unwrap();
        assert_eq!(format!("{:?}", key), "RsaKeyMaterial::Private(1024 bits)");
    }
}
