use bytes::Bytes;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::hash::HashAlgorithm;
use crate::key::{
    CryptoKey, JsonWebKey, KeyAlgorithm, KeyExportResult, KeyUsage, SecretKeyExportOptions,
    SecretKeyFormat,
};
use crate::utilities::encoding::{base64url_decode, base64url_encode};
use crate::utilities::error::*;

/// Algorithm a secret key was imported for, when known.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SecretKeyAlgorithm {
    Hmac { hash: HashAlgorithm },
    /// AES key of `length` bits.
    Aes { length: usize },
}

/// Symmetric key material. The bytes are wiped on drop.
#[derive(Clone)]
pub struct SecretKeyObjectHandle {
    data: Zeroizing<Vec<u8>>,
    algorithm: Option<SecretKeyAlgorithm>,
}

impl fmt::Debug for SecretKeyObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKeyObjectHandle")
            .field("size", &self.data.len())
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl PartialEq for SecretKeyObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for SecretKeyObjectHandle {}

impl SecretKeyObjectHandle {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: Zeroizing::new(data.to_vec()),
            algorithm: None,
        }
    }

    pub fn with_algorithm(data: &[u8], algorithm: SecretKeyAlgorithm) -> Result<Self> {
        if let SecretKeyAlgorithm::Aes { length } = algorithm {
            if !matches!(length, 128 | 192 | 256) || data.len() * 8 != length {
                return Err(Error::InvalidArgument(format!(
                    "AES key of {} bytes does not match length {}",
                    data.len(),
                    length
                )));
            }
        }
        Ok(Self {
            data: Zeroizing::new(data.to_vec()),
            algorithm: Some(algorithm),
        })
    }

    pub fn from_jwk(jwk: &JsonWebKey) -> Result<Self> {
        if jwk.kty != "oct" {
            return Err(Error::InvalidArgument(format!(
                "expected an oct JWK, got {}",
                jwk.kty
            )));
        }
        let k = jwk
            .k
            .as_deref()
            .ok_or_else(|| Error::MalformedKey("oct JWK without k".to_string()))?;
        Ok(Self::new(&Zeroizing::new(base64url_decode(k)?)))
    }

    pub fn symmetric_key_size(&self) -> usize {
        self.data.len()
    }

    pub fn algorithm(&self) -> Option<SecretKeyAlgorithm> {
        self.algorithm
    }

    pub(crate) fn material(&self) -> &[u8] {
        &self.data
    }

    pub fn export(&self, options: &SecretKeyExportOptions) -> Result<KeyExportResult> {
        match options.format {
            SecretKeyFormat::Buffer => Ok(KeyExportResult::Buffer(Bytes::copy_from_slice(
                &self.data,
            ))),
            SecretKeyFormat::Jwk => {
                let mut jwk = JsonWebKey::new("oct");
                jwk.k = Some(base64url_encode(&self.data));
                Ok(KeyExportResult::Jwk(jwk))
            }
        }
    }

    /// Constant-time comparison of the key bytes. Keys of different sizes
    /// are unequal.
    pub fn equals(&self, other: &SecretKeyObjectHandle) -> bool {
        self.data.len() == other.data.len()
            && bool::from(self.data.as_slice().ct_eq(other.data.as_slice()))
    }

    pub fn to_crypto_key(
        &self,
        algorithm: KeyAlgorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<CryptoKey> {
        CryptoKey::from_secret(self.clone(), algorithm, extractable, usages)
    }

    pub fn from_crypto_key(key: &CryptoKey) -> Result<Self> {
        key.secret_key().cloned().ok_or_else(|| {
            Error::InvalidArgument(format!("CryptoKey holds a {} key", key.key_type()))
        })
    }
}
