use std::fmt;

use der::asn1::{BitStringRef, ObjectIdentifier, OctetStringRef, Uint};
use der::{AnyRef, Decode, Encode};
use ed25519_dalek::{SigningKey, VerifyingKey};
use num_bigint_dig::BigUint;
use num_traits::ToPrimitive;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use pkcs8::{DecodePrivateKey, EncodePrivateKey, PrivateKeyInfo};
use rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey,
    RsaPssParams,
};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sec1::{EcParameters, EcPrivateKey};
use spki::{
    AlgorithmIdentifier, AlgorithmIdentifierRef, DecodePublicKey, EncodePublicKey,
    SubjectPublicKeyInfoRef,
};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::hash::HashAlgorithm;
use crate::key::asn1::*;
use crate::key::{AsymmetricKeyDetail, AsymmetricKeyType, NamedCurve};
use crate::utilities::error::*;

#[derive(Clone)]
pub(crate) enum RsaKey {
    Private(RsaPrivateKey),
    Public(RsaPublicKey),
}

impl RsaKey {
    pub(crate) fn public_key(&self) -> RsaPublicKey {
        match self {
            RsaKey::Private(key) => key.to_public_key(),
            RsaKey::Public(key) => key.clone(),
        }
    }

    fn n(&self) -> &BigUint {
        match self {
            RsaKey::Private(key) => key.n(),
            RsaKey::Public(key) => key.n(),
        }
    }

    fn e(&self) -> &BigUint {
        match self {
            RsaKey::Private(key) => key.e(),
            RsaKey::Public(key) => key.e(),
        }
    }

    fn to_public(&self) -> RsaKey {
        RsaKey::Public(self.public_key())
    }

    fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        match RsaPrivateKey::from_pkcs1_der(der) {
            Ok(key) => Ok(RsaKey::Private(key)),
            Err(_) => Ok(RsaKey::Public(RsaPublicKey::from_pkcs1_der(der)?)),
        }
    }

    fn to_pkcs1_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(match self {
            RsaKey::Private(key) => Zeroizing::new(key.to_pkcs1_der()?.as_bytes().to_vec()),
            RsaKey::Public(key) => Zeroizing::new(key.to_pkcs1_der()?.as_bytes().to_vec()),
        })
    }
}

/// RSASSA-PSS restrictions carried in the key's AlgorithmIdentifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct PssParams {
    pub(crate) hash: HashAlgorithm,
    pub(crate) mgf1_hash: HashAlgorithm,
    pub(crate) salt_length: u8,
}

impl PssParams {
    pub(crate) fn decode(parameters: Option<AnyRef<'_>>) -> Result<Option<Self>> {
        let Some(parameters) = parameters else {
            return Ok(None);
        };
        if parameters.is_null() {
            return Ok(None);
        }
        let params: RsaPssParams<'_> = parameters.decode_as()?;
        if params.mask_gen.oid != MGF1 {
            return Err(Error::MalformedKey(format!(
                "unsupported mask generation function {}",
                params.mask_gen.oid
            )));
        }
        let mgf1_hash = params
            .mask_gen
            .parameters
            .ok_or_else(|| Error::MalformedKey("MGF1 without a digest".to_string()))?;
        Ok(Some(PssParams {
            hash: hash_from_oid(&params.hash.oid)?,
            mgf1_hash: hash_from_oid(&mgf1_hash.oid)?,
            salt_length: params.salt_len,
        }))
    }

    fn encode(self) -> Result<Vec<u8>> {
        let params = RsaPssParams {
            hash: AlgorithmIdentifierRef {
                oid: hash_oid(self.hash),
                parameters: Some(AnyRef::NULL),
            },
            mask_gen: AlgorithmIdentifier {
                oid: MGF1,
                parameters: Some(AlgorithmIdentifierRef {
                    oid: hash_oid(self.mgf1_hash),
                    parameters: Some(AnyRef::NULL),
                }),
            },
            salt_len: self.salt_length,
            trailer_field: Default::default(),
        };
        Ok(params.to_der()?)
    }
}

#[derive(Clone)]
pub(crate) enum EcKey {
    P256Private(p256::SecretKey),
    P256Public(p256::PublicKey),
    P384Private(p384::SecretKey),
    P384Public(p384::PublicKey),
}

impl EcKey {
    pub(crate) fn curve(&self) -> NamedCurve {
        match self {
            EcKey::P256Private(_) | EcKey::P256Public(_) => NamedCurve::P256,
            EcKey::P384Private(_) | EcKey::P384Public(_) => NamedCurve::P384,
        }
    }

    fn is_private(&self) -> bool {
        matches!(self, EcKey::P256Private(_) | EcKey::P384Private(_))
    }

    fn to_public(&self) -> EcKey {
        match self {
            EcKey::P256Private(key) => EcKey::P256Public(key.public_key()),
            EcKey::P384Private(key) => EcKey::P384Public(key.public_key()),
            public => public.clone(),
        }
    }

    /// Uncompressed SEC1 point `04 || x || y`.
    pub(crate) fn public_point(&self) -> Vec<u8> {
        match self.to_public() {
            EcKey::P256Public(key) => key.to_encoded_point(false).as_bytes().to_vec(),
            EcKey::P384Public(key) => key.to_encoded_point(false).as_bytes().to_vec(),
            _ => Vec::new(),
        }
    }

    /// Big-endian private scalar, padded to the field size.
    pub(crate) fn secret_scalar(&self) -> Option<Zeroizing<Vec<u8>>> {
        match self {
            EcKey::P256Private(key) => Some(Zeroizing::new(key.to_bytes().to_vec())),
            EcKey::P384Private(key) => Some(Zeroizing::new(key.to_bytes().to_vec())),
            _ => None,
        }
    }

    pub(crate) fn from_public_point(curve: NamedCurve, point: &[u8]) -> Result<Self> {
        Ok(match curve {
            NamedCurve::P256 => EcKey::P256Public(p256::PublicKey::from_sec1_bytes(point)?),
            NamedCurve::P384 => EcKey::P384Public(p384::PublicKey::from_sec1_bytes(point)?),
        })
    }

    pub(crate) fn from_secret_scalar(curve: NamedCurve, scalar: &[u8]) -> Result<Self> {
        Ok(match curve {
            NamedCurve::P256 => EcKey::P256Private(p256::SecretKey::from_slice(scalar)?),
            NamedCurve::P384 => EcKey::P384Private(p384::SecretKey::from_slice(scalar)?),
        })
    }

    fn to_spki_der(&self) -> Result<Vec<u8>> {
        let document = match self.to_public() {
            EcKey::P256Public(key) => key.to_public_key_der()?,
            EcKey::P384Public(key) => key.to_public_key_der()?,
            _ => return Err(Error::Other("EC public key expected".to_string())),
        };
        Ok(document.as_bytes().to_vec())
    }

    fn to_pkcs8_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let document = match self {
            EcKey::P256Private(key) => key.to_pkcs8_der()?,
            EcKey::P384Private(key) => key.to_pkcs8_der()?,
            _ => return Err(not_private()),
        };
        Ok(Zeroizing::new(document.as_bytes().to_vec()))
    }

    fn to_sec1_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let scalar = self.secret_scalar().ok_or_else(not_private)?;
        let point = self.public_point();
        let key = EcPrivateKey {
            private_key: scalar.as_slice(),
            parameters: Some(EcParameters::NamedCurve(self.curve().oid())),
            public_key: Some(point.as_slice()),
        };
        Ok(Zeroizing::new(key.to_der()?))
    }

    fn from_sec1_der(der: &[u8]) -> Result<Self> {
        let key = EcPrivateKey::try_from(der)?;
        let curve = key
            .parameters
            .and_then(EcParameters::named_curve)
            .ok_or_else(|| Error::MalformedKey("SEC1 key without a named curve".to_string()))?;
        Self::from_secret_scalar(NamedCurve::from_oid(&curve)?, key.private_key)
    }
}

#[derive(Clone)]
pub(crate) enum Ed25519Key {
    Private(SigningKey),
    Public(VerifyingKey),
}

impl Ed25519Key {
    pub(crate) fn verifying_key(&self) -> VerifyingKey {
        match self {
            Ed25519Key::Private(key) => key.verifying_key(),
            Ed25519Key::Public(key) => *key,
        }
    }
}

#[derive(Clone)]
pub(crate) enum X25519Key {
    Private(StaticSecret),
    Public(X25519PublicKey),
}

impl X25519Key {
    pub(crate) fn public_key(&self) -> X25519PublicKey {
        match self {
            X25519Key::Private(secret) => X25519PublicKey::from(secret),
            X25519Key::Public(key) => *key,
        }
    }
}

#[derive(Clone)]
pub(crate) struct DsaKey {
    pub(crate) p: BigUint,
    pub(crate) q: BigUint,
    pub(crate) g: BigUint,
    pub(crate) y: BigUint,
    pub(crate) x: Option<BigUint>,
}

impl DsaKey {
    fn params_der(&self) -> Result<Vec<u8>> {
        Ok(DssParams {
            p: to_uint(&self.p)?,
            q: to_uint(&self.q)?,
            g: to_uint(&self.g)?,
        }
        .to_der()?)
    }
}

#[derive(Clone)]
pub(crate) struct DhKey {
    pub(crate) p: BigUint,
    pub(crate) g: BigUint,
    pub(crate) y: BigUint,
    pub(crate) x: Option<BigUint>,
}

impl DhKey {
    fn params_der(&self) -> Result<Vec<u8>> {
        Ok(DhParameter {
            prime: to_uint(&self.p)?,
            base: to_uint(&self.g)?,
            private_value_length: None,
        }
        .to_der()?)
    }
}

// p must be a usable modulus and q a usable order before any modpow runs.
fn dsa_domain(params: &DssParams) -> Result<(BigUint, BigUint, BigUint)> {
    let (p, q, g) = (
        from_uint(&params.p),
        from_uint(&params.q),
        from_uint(&params.g),
    );
    if p.bits() < 2 || q.bits() == 0 {
        return Err(Error::MalformedKey(
            "DSA parameters need p > 1 and q > 0".to_string(),
        ));
    }
    Ok((p, q, g))
}

fn dh_domain(params: &DhParameter) -> Result<(BigUint, BigUint)> {
    let p = from_uint(&params.prime);
    if p.bits() < 2 {
        return Err(Error::MalformedKey(
            "Diffie-Hellman prime must be greater than 1".to_string(),
        ));
    }
    Ok((p, from_uint(&params.base)))
}

/// Decoded key of any supported family, public or private.
#[derive(Clone)]
pub(crate) enum KeyMaterial {
    Rsa(RsaKey),
    RsaPss(RsaKey, Option<PssParams>),
    Ec(EcKey),
    Ed25519(Ed25519Key),
    X25519(X25519Key),
    Dsa(DsaKey),
    Dh(DhKey),
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("type", &self.key_type())
            .field("private", &self.is_private())
            .finish()
    }
}

fn not_private() -> Error {
    Error::InvalidArgument("operation requires a private key".to_string())
}

fn algorithm_der(parameters: Option<&[u8]>) -> Result<Option<AnyRef<'_>>> {
    Ok(match parameters {
        Some(parameters) => Some(AnyRef::try_from(parameters)?),
        None => None,
    })
}

fn spki_der(
    oid: ObjectIdentifier,
    parameters: Option<&[u8]>,
    public_key: &[u8],
) -> Result<Vec<u8>> {
    let info = SubjectPublicKeyInfoRef {
        algorithm: AlgorithmIdentifierRef {
            oid,
            parameters: algorithm_der(parameters)?,
        },
        subject_public_key: BitStringRef::from_bytes(public_key)?,
    };
    Ok(info.to_der()?)
}

fn pkcs8_der(
    oid: ObjectIdentifier,
    parameters: Option<&[u8]>,
    private_key: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let info = PrivateKeyInfo::new(
        AlgorithmIdentifierRef {
            oid,
            parameters: algorithm_der(parameters)?,
        },
        private_key,
    );
    Ok(Zeroizing::new(info.to_der()?))
}

fn uint_der(n: &BigUint) -> Result<Zeroizing<Vec<u8>>> {
    Ok(Zeroizing::new(to_uint(n)?.to_der()?))
}

fn curve25519_secret(private_key: &[u8]) -> Result<[u8; 32]> {
    let secret = OctetStringRef::from_der(private_key)?;
    <[u8; 32]>::try_from(secret.as_bytes())
        .map_err(|_| Error::MalformedKey("curve25519 private key must be 32 bytes".to_string()))
}

fn curve25519_pkcs8(oid: ObjectIdentifier, secret: &[u8; 32]) -> Result<Zeroizing<Vec<u8>>> {
    let inner = Zeroizing::new(OctetStringRef::new(secret)?.to_der()?);
    pkcs8_der(oid, None, &inner)
}

impl KeyMaterial {
    pub(crate) fn key_type(&self) -> AsymmetricKeyType {
        match self {
            KeyMaterial::Rsa(_) => AsymmetricKeyType::Rsa,
            KeyMaterial::RsaPss(..) => AsymmetricKeyType::RsaPss,
            KeyMaterial::Ec(_) => AsymmetricKeyType::Ec,
            KeyMaterial::Ed25519(_) => AsymmetricKeyType::Ed25519,
            KeyMaterial::X25519(_) => AsymmetricKeyType::X25519,
            KeyMaterial::Dsa(_) => AsymmetricKeyType::Dsa,
            KeyMaterial::Dh(_) => AsymmetricKeyType::Dh,
        }
    }

    pub(crate) fn is_private(&self) -> bool {
        match self {
            KeyMaterial::Rsa(key) | KeyMaterial::RsaPss(key, _) => {
                matches!(key, RsaKey::Private(_))
            }
            KeyMaterial::Ec(key) => key.is_private(),
            KeyMaterial::Ed25519(key) => matches!(key, Ed25519Key::Private(_)),
            KeyMaterial::X25519(key) => matches!(key, X25519Key::Private(_)),
            KeyMaterial::Dsa(key) => key.x.is_some(),
            KeyMaterial::Dh(key) => key.x.is_some(),
        }
    }

    /// The public half. Public material is returned unchanged.
    pub(crate) fn to_public(&self) -> KeyMaterial {
        match self {
            KeyMaterial::Rsa(key) => KeyMaterial::Rsa(key.to_public()),
            KeyMaterial::RsaPss(key, params) => KeyMaterial::RsaPss(key.to_public(), *params),
            KeyMaterial::Ec(key) => KeyMaterial::Ec(key.to_public()),
            KeyMaterial::Ed25519(key) => {
                KeyMaterial::Ed25519(Ed25519Key::Public(key.verifying_key()))
            }
            KeyMaterial::X25519(key) => KeyMaterial::X25519(X25519Key::Public(key.public_key())),
            KeyMaterial::Dsa(key) => KeyMaterial::Dsa(DsaKey {
                x: None,
                ..key.clone()
            }),
            KeyMaterial::Dh(key) => KeyMaterial::Dh(DhKey {
                x: None,
                ..key.clone()
            }),
        }
    }

    pub(crate) fn detail(&self) -> AsymmetricKeyDetail {
        let mut detail = AsymmetricKeyDetail::default();
        match self {
            KeyMaterial::Rsa(key) | KeyMaterial::RsaPss(key, _) => {
                detail.modulus_length = Some(key.n().bits());
                detail.public_exponent = key.e().to_u64();
            }
            KeyMaterial::Ec(key) => detail.named_curve = Some(key.curve()),
            KeyMaterial::Dsa(key) => {
                detail.modulus_length = Some(key.p.bits());
                detail.divisor_length = Some(key.q.bits());
            }
            KeyMaterial::Ed25519(_) | KeyMaterial::X25519(_) | KeyMaterial::Dh(_) => {}
        }
        if let KeyMaterial::RsaPss(_, Some(params)) = self {
            detail.hash_algorithm = Some(params.hash);
            detail.mgf1_hash_algorithm = Some(params.mgf1_hash);
            detail.salt_length = Some(u32::from(params.salt_length));
        }
        detail
    }

    pub(crate) fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = PrivateKeyInfo::from_der(der)?;
        let algorithm = info.algorithm;
        match AsymmetricKeyType::from_oid(&algorithm.oid)? {
            AsymmetricKeyType::Rsa => Ok(KeyMaterial::Rsa(RsaKey::Private(
                RsaPrivateKey::from_pkcs8_der(der)?,
            ))),
            AsymmetricKeyType::RsaPss => {
                let params = PssParams::decode(algorithm.parameters)?;
                let key = RsaPrivateKey::from_pkcs1_der(info.private_key)?;
                Ok(KeyMaterial::RsaPss(RsaKey::Private(key), params))
            }
            AsymmetricKeyType::Ec => {
                let key = match NamedCurve::from_oid(&algorithm.parameters_oid()?)? {
                    NamedCurve::P256 => EcKey::P256Private(p256::SecretKey::from_pkcs8_der(der)?),
                    NamedCurve::P384 => EcKey::P384Private(p384::SecretKey::from_pkcs8_der(der)?),
                };
                Ok(KeyMaterial::Ec(key))
            }
            AsymmetricKeyType::Ed25519 => Ok(KeyMaterial::Ed25519(Ed25519Key::Private(
                SigningKey::from_pkcs8_der(der)?,
            ))),
            AsymmetricKeyType::X25519 => {
                let secret = Zeroizing::new(curve25519_secret(info.private_key)?);
                Ok(KeyMaterial::X25519(X25519Key::Private(StaticSecret::from(
                    *secret,
                ))))
            }
            AsymmetricKeyType::Dsa => {
                let params: DssParams = required_parameters(algorithm.parameters)?.decode_as()?;
                let (p, q, g) = dsa_domain(&params)?;
                let x = from_uint(&Uint::from_der(info.private_key)?);
                let y = g.modpow(&x, &p);
                Ok(KeyMaterial::Dsa(DsaKey {
                    p,
                    q,
                    g,
                    y,
                    x: Some(x),
                }))
            }
            AsymmetricKeyType::Dh => {
                let params: DhParameter = required_parameters(algorithm.parameters)?.decode_as()?;
                let (p, g) = dh_domain(&params)?;
                let x = from_uint(&Uint::from_der(info.private_key)?);
                let y = g.modpow(&x, &p);
                Ok(KeyMaterial::Dh(DhKey {
                    p,
                    g,
                    y,
                    x: Some(x),
                }))
            }
        }
    }

    pub(crate) fn from_spki_der(der: &[u8]) -> Result<Self> {
        let info = SubjectPublicKeyInfoRef::from_der(der)?;
        let algorithm = info.algorithm;
        let public_key = info
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| Error::MalformedKey("unaligned public key bit string".to_string()))?;
        match AsymmetricKeyType::from_oid(&algorithm.oid)? {
            AsymmetricKeyType::Rsa => Ok(KeyMaterial::Rsa(RsaKey::Public(
                RsaPublicKey::from_public_key_der(der)?,
            ))),
            AsymmetricKeyType::RsaPss => {
                let params = PssParams::decode(algorithm.parameters)?;
                let key = RsaPublicKey::from_pkcs1_der(public_key)?;
                Ok(KeyMaterial::RsaPss(RsaKey::Public(key), params))
            }
            AsymmetricKeyType::Ec => {
                let curve = NamedCurve::from_oid(&algorithm.parameters_oid()?)?;
                Ok(KeyMaterial::Ec(EcKey::from_public_point(curve, public_key)?))
            }
            AsymmetricKeyType::Ed25519 => Ok(KeyMaterial::Ed25519(Ed25519Key::Public(
                VerifyingKey::from_public_key_der(der)?,
            ))),
            AsymmetricKeyType::X25519 => {
                let bytes = <[u8; 32]>::try_from(public_key).map_err(|_| {
                    Error::MalformedKey("X25519 public key must be 32 bytes".to_string())
                })?;
                Ok(KeyMaterial::X25519(X25519Key::Public(X25519PublicKey::from(
                    bytes,
                ))))
            }
            AsymmetricKeyType::Dsa => {
                let params: DssParams = required_parameters(algorithm.parameters)?.decode_as()?;
                let (p, q, g) = dsa_domain(&params)?;
                Ok(KeyMaterial::Dsa(DsaKey {
                    p,
                    q,
                    g,
                    y: from_uint(&Uint::from_der(public_key)?),
                    x: None,
                }))
            }
            AsymmetricKeyType::Dh => {
                let params: DhParameter = required_parameters(algorithm.parameters)?.decode_as()?;
                let (p, g) = dh_domain(&params)?;
                Ok(KeyMaterial::Dh(DhKey {
                    p,
                    g,
                    y: from_uint(&Uint::from_der(public_key)?),
                    x: None,
                }))
            }
        }
    }

    /// RSA private key, or RSA public key when the input is not a private
    /// key structure.
    pub(crate) fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        Ok(KeyMaterial::Rsa(RsaKey::from_pkcs1_der(der)?))
    }

    pub(crate) fn from_sec1_der(der: &[u8]) -> Result<Self> {
        Ok(KeyMaterial::Ec(EcKey::from_sec1_der(der)?))
    }

    pub(crate) fn from_encrypted_pkcs8_der(der: &[u8], passphrase: Option<&[u8]>) -> Result<Self> {
        let passphrase = passphrase.ok_or(Error::PassphraseRequired)?;
        let info = pkcs8::EncryptedPrivateKeyInfo::try_from(der)?;
        let document = info.decrypt(passphrase)?;
        Self::from_pkcs8_der(document.as_bytes())
    }

    pub(crate) fn to_spki_der(&self) -> Result<Vec<u8>> {
        match self {
            KeyMaterial::Rsa(key) => Ok(key.public_key().to_public_key_der()?.as_bytes().to_vec()),
            KeyMaterial::RsaPss(key, params) => {
                let params = params.as_ref().map(|params| params.encode()).transpose()?;
                let public_key = key.public_key().to_pkcs1_der()?;
                spki_der(RSASSA_PSS, params.as_deref(), public_key.as_bytes())
            }
            KeyMaterial::Ec(key) => key.to_spki_der(),
            KeyMaterial::Ed25519(key) => Ok(key
                .verifying_key()
                .to_public_key_der()?
                .as_bytes()
                .to_vec()),
            KeyMaterial::X25519(key) => spki_der(X25519, None, key.public_key().as_bytes()),
            KeyMaterial::Dsa(key) => spki_der(
                DSA,
                Some(&key.params_der()?),
                &to_uint(&key.y)?.to_der()?,
            ),
            KeyMaterial::Dh(key) => spki_der(
                DH_KEY_AGREEMENT,
                Some(&key.params_der()?),
                &to_uint(&key.y)?.to_der()?,
            ),
        }
    }

    pub(crate) fn to_pkcs8_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            KeyMaterial::Rsa(RsaKey::Private(key)) => {
                Ok(Zeroizing::new(key.to_pkcs8_der()?.as_bytes().to_vec()))
            }
            KeyMaterial::RsaPss(RsaKey::Private(key), params) => {
                let params = params.as_ref().map(|params| params.encode()).transpose()?;
                let private_key = key.to_pkcs1_der()?;
                pkcs8_der(RSASSA_PSS, params.as_deref(), private_key.as_bytes())
            }
            KeyMaterial::Ec(key) => key.to_pkcs8_der(),
            KeyMaterial::Ed25519(Ed25519Key::Private(key)) => {
                curve25519_pkcs8(ED25519, &Zeroizing::new(key.to_bytes()))
            }
            KeyMaterial::X25519(X25519Key::Private(secret)) => {
                curve25519_pkcs8(X25519, &Zeroizing::new(secret.to_bytes()))
            }
            KeyMaterial::Dsa(key) => match &key.x {
                Some(x) => pkcs8_der(DSA, Some(&key.params_der()?), &uint_der(x)?),
                None => Err(not_private()),
            },
            KeyMaterial::Dh(key) => match &key.x {
                Some(x) => pkcs8_der(DH_KEY_AGREEMENT, Some(&key.params_der()?), &uint_der(x)?),
                None => Err(not_private()),
            },
            _ => Err(not_private()),
        }
    }

    pub(crate) fn to_pkcs1_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            KeyMaterial::Rsa(key) => key.to_pkcs1_der(),
            _ => Err(Error::IncompatibleKeyFormat(format!(
                "pkcs1 is not available for {} keys",
                self.key_type()
            ))),
        }
    }

    pub(crate) fn to_sec1_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            KeyMaterial::Ec(key) => key.to_sec1_der(),
            _ => Err(Error::IncompatibleKeyFormat(format!(
                "sec1 is not available for {} keys",
                self.key_type()
            ))),
        }
    }

    /// PKCS#8 for private keys and SPKI for public keys; the basis of key
    /// equality.
    pub(crate) fn canonical_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        if self.is_private() {
            self.to_pkcs8_der()
        } else {
            Ok(Zeroizing::new(self.to_spki_der()?))
        }
    }
}

fn required_parameters(parameters: Option<AnyRef<'_>>) -> Result<AnyRef<'_>> {
    parameters.ok_or_else(|| Error::MalformedKey("missing domain parameters".to_string()))
}
