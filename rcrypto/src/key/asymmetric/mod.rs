
mod generate;
mod jwk;
mod material;

pub use self::generate::generate_key_pair;
pub(crate) use self::material::{EcKey, Ed25519Key, KeyMaterial, PssParams};

use bytes::Bytes;
use der::asn1::ObjectIdentifier;
use der::{Decode, Encode};
use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::hash::HashAlgorithm;
use crate::key::asn1::*;
use crate::key::{
    AsymmetricKeyExportOptions, CreateAsymmetricKeyOptions, CryptoKey, KeyAlgorithm, KeyCipher,
    KeyEncoding, KeyExportResult, KeyFormat, KeyInput, KeyObjectType, KeyUsage,
    PrivateKeyEncoding, PrivateKeyExportOptions, PublicKeyEncoding, PublicKeyExportOptions,
};
use crate::utilities::encoding::{is_pem, pem_encode};
use crate::utilities::error::*;
use crate::utilities::rand::random_bytes;

/// PBKDF2 iteration count for encrypted PKCS#8 export.
const PKCS8_PBKDF2_ITERATIONS: u32 = 2048;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AsymmetricKeyType {
    Rsa,
    RsaPss,
    Dsa,
    Ec,
    X25519,
    Ed25519,
    Dh,
}

impl AsymmetricKeyType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            AsymmetricKeyType::Rsa => "rsa",
            AsymmetricKeyType::RsaPss => "rsa-pss",
            AsymmetricKeyType::Dsa => "dsa",
            AsymmetricKeyType::Ec => "ec",
            AsymmetricKeyType::X25519 => "x25519",
            AsymmetricKeyType::Ed25519 => "ed25519",
            AsymmetricKeyType::Dh => "dh",
        }
    }

    pub(crate) fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        match *oid {
            oid if oid == RSA_ENCRYPTION => Ok(AsymmetricKeyType::Rsa),
            oid if oid == RSASSA_PSS => Ok(AsymmetricKeyType::RsaPss),
            oid if oid == DSA => Ok(AsymmetricKeyType::Dsa),
            oid if oid == EC_PUBLIC_KEY => Ok(AsymmetricKeyType::Ec),
            oid if oid == X25519 => Ok(AsymmetricKeyType::X25519),
            oid if oid == ED25519 => Ok(AsymmetricKeyType::Ed25519),
            oid if oid == DH_KEY_AGREEMENT => Ok(AsymmetricKeyType::Dh),
            oid => Err(Error::UnsupportedKeyType(oid.to_string())),
        }
    }
}

impl fmt::Display for AsymmetricKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named curves usable for `ec` keys.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NamedCurve {
    P256,
    P384,
}

impl NamedCurve {
    /// Accepts OpenSSL, SEC and JWK spellings.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "prime256v1" | "secp256r1" | "P-256" => Ok(NamedCurve::P256),
            "secp384r1" | "P-384" => Ok(NamedCurve::P384),
            _ => Err(Error::UnsupportedCurve(name.to_string())),
        }
    }

    /// OpenSSL short name.
    pub fn name(&self) -> &'static str {
        match *self {
            NamedCurve::P256 => "prime256v1",
            NamedCurve::P384 => "secp384r1",
        }
    }

    pub fn jwk_name(&self) -> &'static str {
        match *self {
            NamedCurve::P256 => "P-256",
            NamedCurve::P384 => "P-384",
        }
    }

    pub(crate) fn field_size(&self) -> usize {
        match *self {
            NamedCurve::P256 => 32,
            NamedCurve::P384 => 48,
        }
    }

    pub(crate) fn oid(&self) -> ObjectIdentifier {
        match *self {
            NamedCurve::P256 => SECP256R1,
            NamedCurve::P384 => SECP384R1,
        }
    }

    pub(crate) fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        if *oid == SECP256R1 {
            Ok(NamedCurve::P256)
        } else if *oid == SECP384R1 {
            Ok(NamedCurve::P384)
        } else {
            Err(Error::UnsupportedCurve(oid.to_string()))
        }
    }
}

impl fmt::Display for NamedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Family specific parameters of an asymmetric key. Members that do not
/// apply to the key type are `None`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AsymmetricKeyDetail {
    pub modulus_length: Option<usize>,
    pub public_exponent: Option<u64>,
    pub hash_algorithm: Option<HashAlgorithm>,
    pub mgf1_hash_algorithm: Option<HashAlgorithm>,
    pub salt_length: Option<u32>,
    pub divisor_length: Option<usize>,
    pub named_curve: Option<NamedCurve>,
}

/// Public or private asymmetric key. Clones share the decoded material.
#[derive(Clone)]
pub struct AsymmetricKeyObjectHandle {
    material: Arc<KeyMaterial>,
}

impl fmt::Debug for AsymmetricKeyObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsymmetricKeyObjectHandle")
            .field("type", &self.asymmetric_key_type())
            .field("key_object_type", &self.key_object_type())
            .finish()
    }
}

impl PartialEq for AsymmetricKeyObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl AsymmetricKeyObjectHandle {
    /// Builds a key object from PEM, DER, JWK, a [`CryptoKey`] or another
    /// handle.
    ///
    /// With `is_public_key` unset the input must hold a private key. With it
    /// set, private input is reduced to its public half.
    pub fn new(options: &CreateAsymmetricKeyOptions) -> Result<Self> {
        let material = match &options.key {
            KeyInput::Bytes(data) => {
                let format = match options.format {
                    Some(format) => format,
                    None if is_pem(data) => KeyFormat::Pem,
                    None if data.first() == Some(&b'{') => KeyFormat::Jwk,
                    None => KeyFormat::Der,
                };
                let passphrase = options.passphrase.as_deref().map(Vec::as_slice);
                match format {
                    KeyFormat::Pem => parse_pem(data, passphrase)?,
                    KeyFormat::Der => {
                        let encoding = options.encoding.ok_or_else(|| {
                            Error::InvalidArgument("DER key input requires an encoding".to_string())
                        })?;
                        parse_der(data, encoding, passphrase)?
                    }
                    KeyFormat::Jwk => {
                        KeyMaterial::from_jwk(&crate::key::JsonWebKey::from_json(data)?)?
                    }
                }
            }
            KeyInput::Jwk(jwk) => KeyMaterial::from_jwk(jwk)?,
            KeyInput::CryptoKey(key) => AsymmetricKeyObjectHandle::from_crypto_key(key)?
                .material()
                .clone(),
            KeyInput::Handle(handle) => handle.material().clone(),
        };

        if options.is_public_key {
            return Ok(Self::from_material(material.to_public()));
        }
        if !material.is_private() {
            return Err(Error::InvalidArgument(format!(
                "expected a private key, got a public {} key",
                material.key_type()
            )));
        }
        Ok(Self::from_material(material))
    }

    /// Public key object from PEM, DER or JWK bytes.
    pub fn create_public_key(data: &[u8]) -> Result<Self> {
        Self::new(&CreateAsymmetricKeyOptions::builder(KeyInput::Bytes(data.to_vec()))
            .with_public_key(true)
            .build())
    }

    /// Private key object from unencrypted PEM or JWK bytes.
    pub fn create_private_key(data: &[u8]) -> Result<Self> {
        Self::new(&CreateAsymmetricKeyOptions::builder(KeyInput::Bytes(data.to_vec())).build())
    }

    pub(crate) fn from_material(material: KeyMaterial) -> Self {
        Self {
            material: Arc::new(material),
        }
    }

    pub(crate) fn material(&self) -> &KeyMaterial {
        &self.material
    }

    pub fn key_object_type(&self) -> KeyObjectType {
        if self.material.is_private() {
            KeyObjectType::Private
        } else {
            KeyObjectType::Public
        }
    }

    pub fn asymmetric_key_type(&self) -> AsymmetricKeyType {
        self.material.key_type()
    }

    pub fn asymmetric_key_detail(&self) -> AsymmetricKeyDetail {
        self.material.detail()
    }

    /// The public half of this key; public keys return themselves.
    pub fn public_key(&self) -> AsymmetricKeyObjectHandle {
        if self.material.is_private() {
            Self::from_material(self.material.to_public())
        } else {
            self.clone()
        }
    }

    pub fn export(&self, options: &AsymmetricKeyExportOptions) -> Result<KeyExportResult> {
        match options {
            AsymmetricKeyExportOptions::Public(options) => self.export_public(options),
            AsymmetricKeyExportOptions::Private(options) => self.export_private(options),
        }
    }

    pub fn export_public(&self, options: &PublicKeyExportOptions) -> Result<KeyExportResult> {
        if self.material.is_private() {
            return Err(Error::IncompatibleKeyFormat(
                "public key encodings cannot export a private key".to_string(),
            ));
        }
        if options.format == KeyFormat::Jwk {
            return Ok(KeyExportResult::Jwk(self.material.to_jwk()?));
        }

        let (label, der) = match options.encoding {
            PublicKeyEncoding::Pkcs1 => match self.material.as_ref() {
                KeyMaterial::Rsa(_) => ("RSA PUBLIC KEY", self.material.to_pkcs1_der()?.to_vec()),
                material => {
                    return Err(Error::IncompatibleKeyFormat(format!(
                        "pkcs1 is not available for {} keys",
                        material.key_type()
                    )))
                }
            },
            PublicKeyEncoding::Spki => ("PUBLIC KEY", self.material.to_spki_der()?),
        };
        Ok(armor(options.format, label, &der))
    }

    pub fn export_private(&self, options: &PrivateKeyExportOptions) -> Result<KeyExportResult> {
        if !self.material.is_private() {
            return Err(Error::IncompatibleKeyFormat(
                "private key encodings cannot export a public key".to_string(),
            ));
        }
        if options.format == KeyFormat::Jwk {
            return Ok(KeyExportResult::Jwk(self.material.to_jwk()?));
        }
        if options.cipher.is_some() && options.encoding != PrivateKeyEncoding::Pkcs8 {
            return Err(Error::IncompatibleKeyFormat(
                "only pkcs8 private keys can be encrypted".to_string(),
            ));
        }

        match options.encoding {
            PrivateKeyEncoding::Pkcs1 => {
                let der = self.material.to_pkcs1_der()?;
                Ok(armor(options.format, "RSA PRIVATE KEY", &der))
            }
            PrivateKeyEncoding::Sec1 => {
                let der = self.material.to_sec1_der()?;
                Ok(armor(options.format, "EC PRIVATE KEY", &der))
            }
            PrivateKeyEncoding::Pkcs8 => {
                let der = self.material.to_pkcs8_der()?;
                match (options.cipher, options.passphrase.as_deref()) {
                    (Some(cipher), Some(passphrase)) => {
                        let encrypted = encrypt_pkcs8(&der, cipher, passphrase)?;
                        Ok(armor(options.format, "ENCRYPTED PRIVATE KEY", &encrypted))
                    }
                    (Some(_), None) => Err(Error::PassphraseRequired),
                    (None, _) => Ok(armor(options.format, "PRIVATE KEY", &der)),
                }
            }
        }
    }

    /// Same key type, same visibility and constant-time equal canonical
    /// encodings.
    pub fn equals(&self, other: &AsymmetricKeyObjectHandle) -> bool {
        if Arc::ptr_eq(&self.material, &other.material) {
            return true;
        }
        if self.asymmetric_key_type() != other.asymmetric_key_type()
            || self.key_object_type() != other.key_object_type()
        {
            return false;
        }
        match (
            self.material.canonical_der(),
            other.material.canonical_der(),
        ) {
            (Ok(a), Ok(b)) => a.len() == b.len() && bool::from(a.as_slice().ct_eq(b.as_slice())),
            _ => false,
        }
    }

    pub fn to_crypto_key(
        &self,
        algorithm: KeyAlgorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<CryptoKey> {
        CryptoKey::from_asymmetric(self.clone(), algorithm, extractable, usages)
    }

    pub fn from_crypto_key(key: &CryptoKey) -> Result<Self> {
        key.asymmetric_key().cloned().ok_or_else(|| {
            Error::InvalidArgument(format!("CryptoKey holds a {} key", key.key_type()))
        })
    }
}

/// Both halves of a freshly generated key.
#[derive(Debug, Clone)]
pub struct AsymmetricKeyHandlePair {
    pub public_key: AsymmetricKeyObjectHandle,
    pub private_key: AsymmetricKeyObjectHandle,
}

impl AsymmetricKeyHandlePair {
    /// Exports both halves in one call.
    pub fn export(
        &self,
        public: &PublicKeyExportOptions,
        private: &PrivateKeyExportOptions,
    ) -> Result<(KeyExportResult, KeyExportResult)> {
        Ok((
            self.public_key.export_public(public)?,
            self.private_key.export_private(private)?,
        ))
    }
}

fn armor(format: KeyFormat, label: &str, der: &[u8]) -> KeyExportResult {
    match format {
        KeyFormat::Der => KeyExportResult::Buffer(Bytes::copy_from_slice(der)),
        _ => KeyExportResult::Text(pem_encode(label, der)),
    }
}

fn encrypt_pkcs8(der: &[u8], cipher: KeyCipher, passphrase: &[u8]) -> Result<Vec<u8>> {
    let salt = random_bytes(16)?;
    let mut iv = [0u8; 16];
    iv.copy_from_slice(&random_bytes(16)?);
    let params = match cipher {
        KeyCipher::Aes128Cbc => pkcs8::pkcs5::pbes2::Parameters::pbkdf2_sha256_aes128cbc(
            PKCS8_PBKDF2_ITERATIONS,
            &salt,
            &iv,
        ),
        KeyCipher::Aes256Cbc => pkcs8::pkcs5::pbes2::Parameters::pbkdf2_sha256_aes256cbc(
            PKCS8_PBKDF2_ITERATIONS,
            &salt,
            &iv,
        ),
    }
    .map_err(pkcs8::Error::from)?;
    let document = pkcs8::PrivateKeyInfo::from_der(der)?.encrypt_with_params(params, passphrase)?;
    Ok(document.as_bytes().to_vec())
}

fn parse_pem(data: &[u8], passphrase: Option<&[u8]>) -> Result<KeyMaterial> {
    let pem = pem::parse(data)?;
    let der = pem.contents();
    match pem.tag() {
        "PUBLIC KEY" => KeyMaterial::from_spki_der(der),
        "RSA PUBLIC KEY" | "RSA PRIVATE KEY" => {
            if pem.headers().get("Proc-Type").is_some() {
                return Err(Error::UnsupportedCipher(
                    "legacy PEM encryption".to_string(),
                ));
            }
            KeyMaterial::from_pkcs1_der(der)
        }
        "PRIVATE KEY" => KeyMaterial::from_pkcs8_der(der),
        "ENCRYPTED PRIVATE KEY" => KeyMaterial::from_encrypted_pkcs8_der(der, passphrase),
        "EC PRIVATE KEY" => KeyMaterial::from_sec1_der(der),
        "CERTIFICATE" => {
            let certificate = x509_cert::Certificate::from_der(der)?;
            let spki = certificate.tbs_certificate.subject_public_key_info.to_der()?;
            KeyMaterial::from_spki_der(&spki)
        }
        label => Err(Error::MalformedKey(format!("unsupported PEM label {}", label))),
    }
}

fn parse_der(data: &[u8], encoding: KeyEncoding, passphrase: Option<&[u8]>) -> Result<KeyMaterial> {
    match encoding {
        KeyEncoding::Pkcs1 => KeyMaterial::from_pkcs1_der(data),
        KeyEncoding::Spki => KeyMaterial::from_spki_der(data),
        KeyEncoding::Sec1 => KeyMaterial::from_sec1_der(data),
        KeyEncoding::Pkcs8 => match KeyMaterial::from_pkcs8_der(data) {
            Ok(material) => Ok(material),
            Err(err) => {
                if pkcs8::EncryptedPrivateKeyInfo::try_from(data).is_ok() {
                    KeyMaterial::from_encrypted_pkcs8_der(data, passphrase)
                } else {
                    Err(err)
                }
            }
        },
    }
}
