use der::asn1::ObjectIdentifier;
use der::AnyRef;
use ed25519_dalek::Verifier;
use rsa::{Pkcs1v15Sign, Pss, RsaPublicKey};
use signature::hazmat::PrehashVerifier;
use spki::AlgorithmIdentifierOwned;

use crate::hash::{with_fixed_digest, HashAlgorithm};
use crate::key::asn1::*;
use crate::key::{EcKey, Ed25519Key, KeyMaterial, PssParams};
use crate::utilities::error::*;

/// Signature algorithm of a certificate, decoded from its
/// AlgorithmIdentifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum SignatureAlgorithm {
    RsaPkcs1v15(HashAlgorithm),
    RsaPss(PssParams),
    Ecdsa(HashAlgorithm),
    Ed25519,
}

/// RSASSA-PSS defaults when the parameters are absent.
const DEFAULT_PSS: PssParams = PssParams {
    hash: HashAlgorithm::Sha1,
    mgf1_hash: HashAlgorithm::Sha1,
    salt_length: 20,
};

impl SignatureAlgorithm {
    pub(crate) fn from_algorithm_identifier(
        algorithm: &AlgorithmIdentifierOwned,
    ) -> Result<Self> {
        let oid: ObjectIdentifier = algorithm.oid;
        let signature = match oid {
            oid if oid == MD5_WITH_RSA => SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Md5),
            oid if oid == SHA1_WITH_RSA => SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha1),
            oid if oid == SHA224_WITH_RSA => {
                SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha224)
            }
            oid if oid == SHA256_WITH_RSA => {
                SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha256)
            }
            oid if oid == SHA384_WITH_RSA => {
                SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha384)
            }
            oid if oid == SHA512_WITH_RSA => {
                SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha512)
            }
            oid if oid == RSASSA_PSS => {
                let parameters = algorithm.parameters.as_ref().map(AnyRef::from);
                let params = PssParams::decode(parameters)?.unwrap_or(DEFAULT_PSS);
                SignatureAlgorithm::RsaPss(params)
            }
            oid if oid == ECDSA_WITH_SHA1 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha1),
            oid if oid == ECDSA_WITH_SHA224 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha224),
            oid if oid == ECDSA_WITH_SHA256 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha256),
            oid if oid == ECDSA_WITH_SHA384 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha384),
            oid if oid == ECDSA_WITH_SHA512 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha512),
            oid if oid == ED25519 => SignatureAlgorithm::Ed25519,
            oid => return Err(Error::UnsupportedSignatureAlgorithm(oid.to_string())),
        };
        Ok(signature)
    }

    /// Verifies `signature` over `message`. Mismatched key families and bad
    /// signatures are `Ok(false)`.
    pub(crate) fn verify(
        &self,
        key: &KeyMaterial,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        let verified = match (self, key) {
            (SignatureAlgorithm::RsaPkcs1v15(hash), KeyMaterial::Rsa(rsa)) => {
                verify_pkcs1v15(&rsa.public_key(), *hash, message, signature)?
            }
            (
                SignatureAlgorithm::RsaPss(params),
                KeyMaterial::Rsa(rsa) | KeyMaterial::RsaPss(rsa, _),
            ) => verify_pss(&rsa.public_key(), params, message, signature)?,
            (SignatureAlgorithm::Ecdsa(hash), KeyMaterial::Ec(ec)) => {
                verify_ecdsa(ec, *hash, message, signature)?
            }
            (SignatureAlgorithm::Ed25519, KeyMaterial::Ed25519(ed)) => {
                verify_ed25519(ed, message, signature)
            }
            _ => {
                log::debug!("{:?} cannot be checked with a {} key", self, key.key_type());
                false
            }
        };
        Ok(verified)
    }
}

fn pkcs1v15_scheme(hash: HashAlgorithm) -> Result<Pkcs1v15Sign> {
    Ok(match hash {
        HashAlgorithm::Md5 => Pkcs1v15Sign::new::<md5::Md5>(),
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<sha1::Sha1>(),
        HashAlgorithm::Sha224 => Pkcs1v15Sign::new::<sha2::Sha224>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<sha2::Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<sha2::Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<sha2::Sha512>(),
        hash => return Err(Error::UnsupportedDigest(hash.name().to_string())),
    })
}

fn verify_pkcs1v15(
    key: &RsaPublicKey,
    hash: HashAlgorithm,
    message: &[u8],
    signature: &[u8],
) -> Result<bool> {
    let scheme = pkcs1v15_scheme(hash)?;
    let hashed = hash.digest(message);
    Ok(key.verify(scheme, &hashed, signature).is_ok())
}

fn verify_pss(
    key: &RsaPublicKey,
    params: &PssParams,
    message: &[u8],
    signature: &[u8],
) -> Result<bool> {
    if params.hash != params.mgf1_hash {
        return Err(Error::UnsupportedSignatureAlgorithm(format!(
            "RSASSA-PSS with {} and MGF1 {}",
            params.hash, params.mgf1_hash
        )));
    }
    let salt_length = usize::from(params.salt_length);
    let scheme = with_fixed_digest!(params.hash, D => Pss::new_with_salt::<D>(salt_length), xof => {
        return Err(Error::UnsupportedDigest(params.hash.name().to_string()));
    });
    let hashed = params.hash.digest(message);
    Ok(key.verify(scheme, &hashed, signature).is_ok())
}

fn verify_ecdsa(
    key: &EcKey,
    hash: HashAlgorithm,
    message: &[u8],
    signature: &[u8],
) -> Result<bool> {
    let prehash = hash.digest(message);
    let point = key.public_point();
    let verified = match key {
        EcKey::P256Private(_) | EcKey::P256Public(_) => {
            let verifying_key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&point)?;
            match p256::ecdsa::Signature::from_der(signature) {
                Ok(signature) => verifying_key.verify_prehash(&prehash, &signature).is_ok(),
                Err(_) => false,
            }
        }
        EcKey::P384Private(_) | EcKey::P384Public(_) => {
            let verifying_key = p384::ecdsa::VerifyingKey::from_sec1_bytes(&point)?;
            match p384::ecdsa::Signature::from_der(signature) {
                Ok(signature) => verifying_key.verify_prehash(&prehash, &signature).is_ok(),
                Err(_) => false,
            }
        }
    };
    Ok(verified)
}

fn verify_ed25519(key: &Ed25519Key, message: &[u8], signature: &[u8]) -> bool {
    match ed25519_dalek::Signature::from_slice(signature) {
        Ok(signature) => key.verifying_key().verify(message, &signature).is_ok(),
        Err(_) => false,
    }
}
