//! Netscape SignedPublicKeyAndChallenge (SPKAC) blobs, as produced by the
//! HTML `<keygen>` element and `openssl spkac`.
//!
//! Input is base64 text, whitespace tolerated, or raw DER. Inputs that do
//! not parse verify as `false` and export nothing.

#[cfg(test)]
mod spkac_test;

use der::asn1::{AnyRef, BitStringRef, Ia5StringRef};
use der::{Decode, Encode, Sequence};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoRef};

use crate::key::KeyMaterial;
use crate::utilities::encoding::{base64_decode_lenient, pem_encode};
use crate::utilities::error::*;
use crate::x509::verify::SignatureAlgorithm;

#[derive(Clone, Debug, Sequence)]
struct PublicKeyAndChallenge<'a> {
    spki: SubjectPublicKeyInfoRef<'a>,
    challenge: Ia5StringRef<'a>,
}

#[derive(Clone, Debug, Sequence)]
struct SignedPublicKeyAndChallenge<'a> {
    // kept undecoded so the signature is checked over the original bytes
    public_key_and_challenge: AnyRef<'a>,
    signature_algorithm: AlgorithmIdentifierOwned,
    signature: BitStringRef<'a>,
}

fn decode_input(input: &[u8]) -> Result<Vec<u8>> {
    match base64_decode_lenient(input) {
        Ok(der) => Ok(der),
        Err(_) if input.first() == Some(&0x30) => Ok(input.to_vec()),
        Err(err) => Err(err),
    }
}

fn with_spkac<T>(
    input: &[u8],
    f: impl FnOnce(&SignedPublicKeyAndChallenge<'_>, &PublicKeyAndChallenge<'_>) -> Result<T>,
) -> Result<T> {
    let der = decode_input(input)?;
    let signed = SignedPublicKeyAndChallenge::from_der(&der)?;
    let content: PublicKeyAndChallenge<'_> = signed.public_key_and_challenge.decode_as()?;
    f(&signed, &content)
}

fn verify(input: &[u8]) -> Result<bool> {
    with_spkac(input, |signed, content| {
        let algorithm = SignatureAlgorithm::from_algorithm_identifier(&signed.signature_algorithm)?;
        let key = KeyMaterial::from_spki_der(&content.spki.to_der()?)?;
        let message = signed.public_key_and_challenge.to_der()?;
        let signature = signed
            .signature
            .as_bytes()
            .ok_or_else(|| Error::MalformedInput("signature has unused bits".to_string()))?;
        algorithm.verify(&key, &message, signature)
    })
}

/// Whether the SPKAC signature verifies with its own embedded key.
pub fn verify_spkac(input: &[u8]) -> bool {
    match verify(input) {
        Ok(verified) => verified,
        Err(err) => {
            log::debug!("rejected SPKAC: {}", err);
            false
        }
    }
}

/// The embedded public key as a PEM `PUBLIC KEY` block.
pub fn export_public_key(input: &[u8]) -> Option<Vec<u8>> {
    let exported = with_spkac(input, |_, content| {
        Ok(pem_encode("PUBLIC KEY", &content.spki.to_der()?).into_bytes())
    });
    exported
        .map_err(|err| log::debug!("cannot export SPKAC public key: {}", err))
        .ok()
}

/// The challenge string.
pub fn export_challenge(input: &[u8]) -> Option<Vec<u8>> {
    let exported = with_spkac(input, |_, content| Ok(content.challenge.to_string().into_bytes()));
    exported
        .map_err(|err| log::debug!("cannot export SPKAC challenge: {}", err))
        .ok()
}
