use std::fmt;
use std::sync::Arc;

use num_bigint_dig::BigUint;

use crate::hash::HashAlgorithm;
use crate::key::{
    AsymmetricKeyObjectHandle, AsymmetricKeyType, KeyMaterial, KeyObjectType, NamedCurve,
    SecretKeyAlgorithm, SecretKeyObjectHandle,
};
use crate::utilities::error::*;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum KeyUsage {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
    DeriveKey,
    DeriveBits,
    WrapKey,
    UnwrapKey,
}

impl KeyUsage {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "encrypt" => Ok(KeyUsage::Encrypt),
            "decrypt" => Ok(KeyUsage::Decrypt),
            "sign" => Ok(KeyUsage::Sign),
            "verify" => Ok(KeyUsage::Verify),
            "deriveKey" => Ok(KeyUsage::DeriveKey),
            "deriveBits" => Ok(KeyUsage::DeriveBits),
            "wrapKey" => Ok(KeyUsage::WrapKey),
            "unwrapKey" => Ok(KeyUsage::UnwrapKey),
            _ => Err(Error::InvalidArgument(format!("unknown key usage {}", name))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            KeyUsage::Encrypt => "encrypt",
            KeyUsage::Decrypt => "decrypt",
            KeyUsage::Sign => "sign",
            KeyUsage::Verify => "verify",
            KeyUsage::DeriveKey => "deriveKey",
            KeyUsage::DeriveBits => "deriveBits",
            KeyUsage::WrapKey => "wrapKey",
            KeyUsage::UnwrapKey => "unwrapKey",
        }
    }
}

impl fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AesMode {
    Cbc,
    Ctr,
    Gcm,
    Kw,
}

/// Algorithm a [`CryptoKey`] is bound to, discriminated by its Web Crypto
/// name.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum KeyAlgorithm {
    RsassaPkcs1v15 {
        modulus_length: usize,
        public_exponent: u64,
        hash: HashAlgorithm,
    },
    RsaPss {
        modulus_length: usize,
        public_exponent: u64,
        hash: HashAlgorithm,
    },
    RsaOaep {
        modulus_length: usize,
        public_exponent: u64,
        hash: HashAlgorithm,
    },
    Ecdsa {
        named_curve: NamedCurve,
    },
    Ecdh {
        named_curve: NamedCurve,
    },
    Ed25519,
    X25519,
    /// DSA key over the big-endian prime `prime` with a `divisor_length`-bit
    /// subgroup order.
    Dsa {
        prime: Vec<u8>,
        divisor_length: usize,
    },
    /// Diffie-Hellman key over big-endian `prime` and `generator`.
    Dh {
        prime: Vec<u8>,
        generator: Vec<u8>,
    },
    /// HMAC key; `length` is in bits.
    Hmac {
        hash: HashAlgorithm,
        length: usize,
    },
    Aes {
        mode: AesMode,
        length: usize,
    },
}

impl KeyAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::RsassaPkcs1v15 { .. } => "RSASSA-PKCS1-v1_5",
            KeyAlgorithm::RsaPss { .. } => "RSA-PSS",
            KeyAlgorithm::RsaOaep { .. } => "RSA-OAEP",
            KeyAlgorithm::Ecdsa { .. } => "ECDSA",
            KeyAlgorithm::Ecdh { .. } => "ECDH",
            KeyAlgorithm::Ed25519 => "Ed25519",
            KeyAlgorithm::X25519 => "X25519",
            KeyAlgorithm::Dsa { .. } => "DSA",
            KeyAlgorithm::Dh { .. } => "DH",
            KeyAlgorithm::Hmac { .. } => "HMAC",
            KeyAlgorithm::Aes { mode, .. } => match mode {
                AesMode::Cbc => "AES-CBC",
                AesMode::Ctr => "AES-CTR",
                AesMode::Gcm => "AES-GCM",
                AesMode::Kw => "AES-KW",
            },
        }
    }

    /// Usages a key of `key_type` may carry under this algorithm.
    pub fn allowed_usages(&self, key_type: KeyObjectType) -> &'static [KeyUsage] {
        use KeyUsage::*;

        match (self, key_type) {
            (KeyAlgorithm::Hmac { .. }, _) => &[Sign, Verify],
            (KeyAlgorithm::Aes { mode: AesMode::Kw, .. }, _) => &[WrapKey, UnwrapKey],
            (KeyAlgorithm::Aes { .. }, _) => &[Encrypt, Decrypt, WrapKey, UnwrapKey],
            (KeyAlgorithm::RsaOaep { .. }, KeyObjectType::Public) => &[Encrypt, WrapKey],
            (KeyAlgorithm::RsaOaep { .. }, _) => &[Decrypt, UnwrapKey],
            (
                KeyAlgorithm::Ecdh { .. } | KeyAlgorithm::X25519 | KeyAlgorithm::Dh { .. },
                KeyObjectType::Public,
            ) => &[],
            (KeyAlgorithm::Ecdh { .. } | KeyAlgorithm::X25519 | KeyAlgorithm::Dh { .. }, _) => {
                &[DeriveKey, DeriveBits]
            }
            (_, KeyObjectType::Public) => &[Verify],
            (_, _) => &[Sign],
        }
    }

    fn check_secret(&self, key: &SecretKeyObjectHandle) -> Result<()> {
        let tagged = match (key.algorithm(), self) {
            (None, _) => true,
            (Some(SecretKeyAlgorithm::Hmac { hash }), KeyAlgorithm::Hmac { hash: wanted, .. }) => {
                hash == *wanted
            }
            (Some(SecretKeyAlgorithm::Aes { length }), KeyAlgorithm::Aes { length: wanted, .. }) => {
                length == *wanted
            }
            (Some(_), _) => false,
        };
        if !tagged {
            return Err(Error::InvalidArgument(format!(
                "{} does not match the key's algorithm {:?}",
                self.name(),
                key.algorithm()
            )));
        }

        match *self {
            KeyAlgorithm::Hmac { length, .. } => {
                if length == 0 || length > key.symmetric_key_size() * 8 {
                    return Err(Error::InvalidArgument(format!(
                        "HMAC length {} does not fit a {}-byte key",
                        length,
                        key.symmetric_key_size()
                    )));
                }
                Ok(())
            }
            KeyAlgorithm::Aes { length, .. } => {
                if !matches!(length, 128 | 192 | 256) || key.symmetric_key_size() * 8 != length {
                    return Err(Error::InvalidArgument(format!(
                        "AES length {} does not match a {}-byte key",
                        length,
                        key.symmetric_key_size()
                    )));
                }
                Ok(())
            }
            _ => Err(Error::InvalidArgument(format!(
                "{} requires an asymmetric key",
                self.name()
            ))),
        }
    }

    fn check_asymmetric(&self, key: &AsymmetricKeyObjectHandle) -> Result<()> {
        let key_type = key.asymmetric_key_type();
        let detail = key.asymmetric_key_detail();
        let compatible = match self {
            KeyAlgorithm::RsassaPkcs1v15 {
                modulus_length,
                public_exponent,
                ..
            }
            | KeyAlgorithm::RsaOaep {
                modulus_length,
                public_exponent,
                ..
            } => {
                key_type == AsymmetricKeyType::Rsa
                    && detail.modulus_length == Some(*modulus_length)
                    && detail.public_exponent == Some(*public_exponent)
            }
            KeyAlgorithm::RsaPss {
                modulus_length,
                public_exponent,
                ..
            } => {
                matches!(key_type, AsymmetricKeyType::Rsa | AsymmetricKeyType::RsaPss)
                    && detail.modulus_length == Some(*modulus_length)
                    && detail.public_exponent == Some(*public_exponent)
            }
            KeyAlgorithm::Ecdsa { named_curve } | KeyAlgorithm::Ecdh { named_curve } => {
                key_type == AsymmetricKeyType::Ec && detail.named_curve == Some(*named_curve)
            }
            KeyAlgorithm::Ed25519 => key_type == AsymmetricKeyType::Ed25519,
            KeyAlgorithm::X25519 => key_type == AsymmetricKeyType::X25519,
            KeyAlgorithm::Dsa {
                prime,
                divisor_length,
            } => match key.material() {
                KeyMaterial::Dsa(dsa) => {
                    dsa.p == BigUint::from_bytes_be(prime)
                        && detail.divisor_length == Some(*divisor_length)
                }
                _ => false,
            },
            KeyAlgorithm::Dh { prime, generator } => match key.material() {
                KeyMaterial::Dh(dh) => {
                    dh.p == BigUint::from_bytes_be(prime)
                        && dh.g == BigUint::from_bytes_be(generator)
                }
                _ => false,
            },
            KeyAlgorithm::Hmac { .. } | KeyAlgorithm::Aes { .. } => false,
        };
        if !compatible {
            return Err(Error::InvalidArgument(format!(
                "{} is not compatible with a {} key",
                self.name(),
                key_type
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum CryptoKeyMaterial {
    Secret(Arc<SecretKeyObjectHandle>),
    Asymmetric(AsymmetricKeyObjectHandle),
}

/// Key token handed across API boundaries. It shares the key object it was
/// created from, so converting back yields an equal key.
#[derive(Debug, Clone)]
pub struct CryptoKey {
    algorithm: KeyAlgorithm,
    extractable: bool,
    usages: Vec<KeyUsage>,
    material: CryptoKeyMaterial,
}

impl CryptoKey {
    pub(crate) fn from_secret(
        key: SecretKeyObjectHandle,
        algorithm: KeyAlgorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<Self> {
        algorithm.check_secret(&key)?;
        let usages = check_usages(&algorithm, KeyObjectType::Secret, usages)?;
        Ok(Self {
            algorithm,
            extractable,
            usages,
            material: CryptoKeyMaterial::Secret(Arc::new(key)),
        })
    }

    pub(crate) fn from_asymmetric(
        key: AsymmetricKeyObjectHandle,
        algorithm: KeyAlgorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<Self> {
        algorithm.check_asymmetric(&key)?;
        let usages = check_usages(&algorithm, key.key_object_type(), usages)?;
        Ok(Self {
            algorithm,
            extractable,
            usages,
            material: CryptoKeyMaterial::Asymmetric(key),
        })
    }

    pub fn algorithm(&self) -> &KeyAlgorithm {
        &self.algorithm
    }

    pub fn key_type(&self) -> KeyObjectType {
        match &self.material {
            CryptoKeyMaterial::Secret(_) => KeyObjectType::Secret,
            CryptoKeyMaterial::Asymmetric(key) => key.key_object_type(),
        }
    }

    pub fn extractable(&self) -> bool {
        self.extractable
    }

    pub fn usages(&self) -> &[KeyUsage] {
        &self.usages
    }

    pub(crate) fn secret_key(&self) -> Option<&SecretKeyObjectHandle> {
        match &self.material {
            CryptoKeyMaterial::Secret(key) => Some(&**key),
            CryptoKeyMaterial::Asymmetric(_) => None,
        }
    }

    pub(crate) fn asymmetric_key(&self) -> Option<&AsymmetricKeyObjectHandle> {
        match &self.material {
            CryptoKeyMaterial::Secret(_) => None,
            CryptoKeyMaterial::Asymmetric(key) => Some(key),
        }
    }
}

fn check_usages(
    algorithm: &KeyAlgorithm,
    key_type: KeyObjectType,
    usages: &[KeyUsage],
) -> Result<Vec<KeyUsage>> {
    let allowed = algorithm.allowed_usages(key_type);
    if let Some(usage) = usages.iter().find(|usage| !allowed.contains(*usage)) {
        return Err(Error::InvalidArgument(format!(
            "usage {} is not valid for a {} {} key",
            usage,
            key_type,
            algorithm.name()
        )));
    }
    // secret and private keys must be usable for something
    if usages.is_empty() && key_type != KeyObjectType::Public {
        return Err(Error::InvalidArgument(format!(
            "usages cannot be empty for a {} key",
            key_type
        )));
    }

    let mut deduped = Vec::with_capacity(usages.len());
    for usage in usages {
        if !deduped.contains(usage) {
            deduped.push(*usage);
        }
    }
    Ok(deduped)
}
