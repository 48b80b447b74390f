use zeroize::Zeroizing;

use crate::hash::HashAlgorithm;
use crate::key::{AsymmetricKeyObjectHandle, CryptoKey, JsonWebKey, NamedCurve};
use crate::utilities::error::*;

/// Container format of an asymmetric key.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyFormat {
    #[default]
    Pem,
    Der,
    Jwk,
}

impl KeyFormat {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "pem" => Ok(KeyFormat::Pem),
            "der" => Ok(KeyFormat::Der),
            "jwk" => Ok(KeyFormat::Jwk),
            _ => Err(Error::InvalidArgument(format!("unknown key format {}", name))),
        }
    }
}

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum SecretKeyFormat {
    #[default]
    Buffer,
    Jwk,
}

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum PublicKeyEncoding {
    Pkcs1,
    #[default]
    Spki,
}

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrivateKeyEncoding {
    Pkcs1,
    #[default]
    Pkcs8,
    Sec1,
}

/// Encoding of DER input handed to key construction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyEncoding {
    Pkcs1,
    Spki,
    Pkcs8,
    Sec1,
}

impl KeyEncoding {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "pkcs1" => Ok(KeyEncoding::Pkcs1),
            "spki" => Ok(KeyEncoding::Spki),
            "pkcs8" => Ok(KeyEncoding::Pkcs8),
            "sec1" => Ok(KeyEncoding::Sec1),
            _ => Err(Error::InvalidArgument(format!("unknown key encoding {}", name))),
        }
    }
}

impl From<PublicKeyEncoding> for KeyEncoding {
    fn from(encoding: PublicKeyEncoding) -> Self {
        match encoding {
            PublicKeyEncoding::Pkcs1 => KeyEncoding::Pkcs1,
            PublicKeyEncoding::Spki => KeyEncoding::Spki,
        }
    }
}

impl From<PrivateKeyEncoding> for KeyEncoding {
    fn from(encoding: PrivateKeyEncoding) -> Self {
        match encoding {
            PrivateKeyEncoding::Pkcs1 => KeyEncoding::Pkcs1,
            PrivateKeyEncoding::Pkcs8 => KeyEncoding::Pkcs8,
            PrivateKeyEncoding::Sec1 => KeyEncoding::Sec1,
        }
    }
}

/// Cipher protecting an exported PKCS#8 private key (PBES2 with
/// PBKDF2-HMAC-SHA256).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyCipher {
    Aes128Cbc,
    Aes256Cbc,
}

impl KeyCipher {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "aes-128-cbc" | "aes128" => Ok(KeyCipher::Aes128Cbc),
            "aes-256-cbc" | "aes256" => Ok(KeyCipher::Aes256Cbc),
            _ => Err(Error::UnsupportedCipher(name.to_string())),
        }
    }
}

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub struct SecretKeyExportOptions {
    pub format: SecretKeyFormat,
}

impl SecretKeyExportOptions {
    pub fn new(format: SecretKeyFormat) -> Self {
        Self { format }
    }
}

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub struct PublicKeyExportOptions {
    pub format: KeyFormat,
    pub encoding: PublicKeyEncoding,
}

impl PublicKeyExportOptions {
    pub fn new(format: KeyFormat, encoding: PublicKeyEncoding) -> Self {
        Self { format, encoding }
    }

    pub fn jwk() -> Self {
        Self {
            format: KeyFormat::Jwk,
            encoding: PublicKeyEncoding::default(),
        }
    }
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct PrivateKeyExportOptions {
    pub format: KeyFormat,
    pub encoding: PrivateKeyEncoding,
    pub cipher: Option<KeyCipher>,
    pub passphrase: Option<Zeroizing<Vec<u8>>>,
}

impl PrivateKeyExportOptions {
    pub fn builder() -> PrivateKeyExportOptionsBuilder {
        PrivateKeyExportOptionsBuilder::default()
    }
}

#[derive(Default, Debug, Clone)]
pub struct PrivateKeyExportOptionsBuilder {
    format: KeyFormat,
    encoding: PrivateKeyEncoding,
    cipher: Option<KeyCipher>,
    passphrase: Option<Zeroizing<Vec<u8>>>,
}

impl PrivateKeyExportOptionsBuilder {
    pub fn with_format(mut self, format: KeyFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_encoding(mut self, encoding: PrivateKeyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_cipher(mut self, cipher: KeyCipher, passphrase: &[u8]) -> Self {
        self.cipher = Some(cipher);
        self.passphrase = Some(Zeroizing::new(passphrase.to_vec()));
        self
    }

    pub fn build(self) -> PrivateKeyExportOptions {
        PrivateKeyExportOptions {
            format: self.format,
            encoding: self.encoding,
            cipher: self.cipher,
            passphrase: self.passphrase,
        }
    }
}

/// Export options for either half of a key object.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AsymmetricKeyExportOptions {
    Public(PublicKeyExportOptions),
    Private(PrivateKeyExportOptions),
}

/// Source material for an asymmetric key object.
#[derive(Debug, Clone)]
pub enum KeyInput {
    /// PEM text, DER, or JWK JSON bytes.
    Bytes(Vec<u8>),
    Jwk(JsonWebKey),
    CryptoKey(CryptoKey),
    Handle(AsymmetricKeyObjectHandle),
}

#[derive(Debug, Clone)]
pub struct CreateAsymmetricKeyOptions {
    pub key: KeyInput,
    /// Detected from the input when unset.
    pub format: Option<KeyFormat>,
    /// Required for DER input.
    pub encoding: Option<KeyEncoding>,
    pub passphrase: Option<Zeroizing<Vec<u8>>>,
    /// Produce a public key object, deriving it from private material when
    /// necessary.
    pub is_public_key: bool,
}

impl CreateAsymmetricKeyOptions {
    pub fn builder(key: KeyInput) -> CreateAsymmetricKeyOptionsBuilder {
        CreateAsymmetricKeyOptionsBuilder {
            key,
            format: None,
            encoding: None,
            passphrase: None,
            is_public_key: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateAsymmetricKeyOptionsBuilder {
    key: KeyInput,
    format: Option<KeyFormat>,
    encoding: Option<KeyEncoding>,
    passphrase: Option<Zeroizing<Vec<u8>>>,
    is_public_key: bool,
}

impl CreateAsymmetricKeyOptionsBuilder {
    pub fn with_format(mut self, format: KeyFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn with_passphrase(mut self, passphrase: &[u8]) -> Self {
        self.passphrase = Some(Zeroizing::new(passphrase.to_vec()));
        self
    }

    pub fn with_public_key(mut self, is_public_key: bool) -> Self {
        self.is_public_key = is_public_key;
        self
    }

    pub fn build(self) -> CreateAsymmetricKeyOptions {
        CreateAsymmetricKeyOptions {
            key: self.key,
            format: self.format,
            encoding: self.encoding,
            passphrase: self.passphrase,
            is_public_key: self.is_public_key,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RsaKeyPairOptions {
    pub modulus_length: usize,
    pub public_exponent: u64,
}

impl Default for RsaKeyPairOptions {
    fn default() -> Self {
        Self {
            modulus_length: 2048,
            public_exponent: 65537,
        }
    }
}

impl RsaKeyPairOptions {
    pub fn new(modulus_length: usize) -> Self {
        Self {
            modulus_length,
            ..Default::default()
        }
    }

    pub fn with_public_exponent(mut self, public_exponent: u64) -> Self {
        self.public_exponent = public_exponent;
        self
    }
}

/// RSASSA-PSS key pair. Leaving `hash_algorithm` unset produces an
/// unrestricted key without PSS parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RsaPssKeyPairOptions {
    pub modulus_length: usize,
    pub public_exponent: u64,
    pub hash_algorithm: Option<HashAlgorithm>,
    pub mgf1_hash_algorithm: Option<HashAlgorithm>,
    pub salt_length: Option<u32>,
}

impl Default for RsaPssKeyPairOptions {
    fn default() -> Self {
        Self {
            modulus_length: 2048,
            public_exponent: 65537,
            hash_algorithm: None,
            mgf1_hash_algorithm: None,
            salt_length: None,
        }
    }
}

impl RsaPssKeyPairOptions {
    pub fn new(modulus_length: usize) -> Self {
        Self {
            modulus_length,
            ..Default::default()
        }
    }

    pub fn with_public_exponent(mut self, public_exponent: u64) -> Self {
        self.public_exponent = public_exponent;
        self
    }

    pub fn with_hash_algorithm(mut self, hash: HashAlgorithm) -> Self {
        self.hash_algorithm = Some(hash);
        self
    }

    pub fn with_mgf1_hash_algorithm(mut self, hash: HashAlgorithm) -> Self {
        self.mgf1_hash_algorithm = Some(hash);
        self
    }

    pub fn with_salt_length(mut self, salt_length: u32) -> Self {
        self.salt_length = Some(salt_length);
        self
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DsaKeyPairOptions {
    pub modulus_length: usize,
    /// Bit size of `q`; 160 below 2048-bit moduli and 256 otherwise when unset.
    pub divisor_length: Option<usize>,
}

impl DsaKeyPairOptions {
    pub fn new(modulus_length: usize) -> Self {
        Self {
            modulus_length,
            divisor_length: None,
        }
    }

    pub fn with_divisor_length(mut self, divisor_length: usize) -> Self {
        self.divisor_length = Some(divisor_length);
        self
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EcKeyPairOptions {
    pub named_curve: NamedCurve,
}

/// Domain parameters for a Diffie-Hellman key pair.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DhKeyPairOptions {
    /// Well-known group such as `modp14`.
    Group(String),
    Prime { prime: Vec<u8>, generator: u32 },
    PrimeLength { prime_length: usize, generator: u32 },
}

/// Parameters of `generate_key_pair`, one variant per key family.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum GenerateKeyPairOptions {
    Rsa(RsaKeyPairOptions),
    RsaPss(RsaPssKeyPairOptions),
    Dsa(DsaKeyPairOptions),
    Ec(EcKeyPairOptions),
    Ed25519,
    X25519,
    Dh(DhKeyPairOptions),
}

impl From<RsaKeyPairOptions> for GenerateKeyPairOptions {
    fn from(options: RsaKeyPairOptions) -> Self {
        GenerateKeyPairOptions::Rsa(options)
    }
}

impl From<RsaPssKeyPairOptions> for GenerateKeyPairOptions {
    fn from(options: RsaPssKeyPairOptions) -> Self {
        GenerateKeyPairOptions::RsaPss(options)
    }
}

impl From<DsaKeyPairOptions> for GenerateKeyPairOptions {
    fn from(options: DsaKeyPairOptions) -> Self {
        GenerateKeyPairOptions::Dsa(options)
    }
}

impl From<EcKeyPairOptions> for GenerateKeyPairOptions {
    fn from(options: EcKeyPairOptions) -> Self {
        GenerateKeyPairOptions::Ec(options)
    }
}

impl From<DhKeyPairOptions> for GenerateKeyPairOptions {
    fn from(options: DhKeyPairOptions) -> Self {
        GenerateKeyPairOptions::Dh(options)
    }
}
