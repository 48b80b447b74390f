//! Key objects: symmetric [`SecretKeyObjectHandle`]s, asymmetric
//! [`AsymmetricKeyObjectHandle`]s and the [`CryptoKey`] token that carries
//! either across API boundaries.

#[cfg(test)]
mod key_test;

pub(crate) mod asn1;
mod asymmetric;
mod config;
mod crypto_key;
mod jwk;
mod secret;

pub use self::asymmetric::{
    generate_key_pair, AsymmetricKeyDetail, AsymmetricKeyHandlePair, AsymmetricKeyObjectHandle,
    AsymmetricKeyType, NamedCurve,
};
pub use self::config::*;
pub use self::crypto_key::{AesMode, CryptoKey, KeyAlgorithm, KeyUsage};
pub use self::jwk::{JsonWebKey, JwkOtherPrime};
pub use self::secret::{SecretKeyAlgorithm, SecretKeyObjectHandle};

pub(crate) use self::asymmetric::{EcKey, Ed25519Key, KeyMaterial, PssParams};

use bytes::Bytes;
use std::fmt;

/// Whether a key object holds symmetric material, a public key or a
/// private key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum KeyObjectType {
    Secret,
    Public,
    Private,
}

impl KeyObjectType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            KeyObjectType::Secret => "secret",
            KeyObjectType::Public => "public",
            KeyObjectType::Private => "private",
        }
    }
}

impl fmt::Display for KeyObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized key as produced by `export`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyExportResult {
    /// PEM armoured text.
    Text(String),
    /// Raw secret bytes or DER.
    Buffer(Bytes),
    Jwk(JsonWebKey),
}

impl KeyExportResult {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeyExportResult::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_buffer(&self) -> Option<&[u8]> {
        match self {
            KeyExportResult::Buffer(buf) => Some(buf),
            _ => None,
        }
    }

    pub fn as_jwk(&self) -> Option<&JsonWebKey> {
        match self {
            KeyExportResult::Jwk(jwk) => Some(jwk),
            _ => None,
        }
    }
}
