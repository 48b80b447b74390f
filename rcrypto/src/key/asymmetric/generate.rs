use ed25519_dalek::SigningKey;
use num_bigint_dig::{BigUint, RandBigInt};
use num_traits::One;
use rsa::RsaPrivateKey;
use x25519_dalek::StaticSecret;

use super::material::{
    DhKey, DsaKey, EcKey, Ed25519Key, KeyMaterial, PssParams, RsaKey, X25519Key,
};
use super::{AsymmetricKeyHandlePair, AsymmetricKeyObjectHandle, NamedCurve};
use crate::dh::groups::{modp_group, MODP_GENERATOR};
use crate::dh::{generate_dh_prime, generate_private_value};
use crate::hash::HashAlgorithm;
use crate::key::{
    DhKeyPairOptions, DsaKeyPairOptions, GenerateKeyPairOptions, RsaPssKeyPairOptions,
};
use crate::prime::generate_prime;
use crate::utilities::error::*;
use crate::utilities::rand::rand;

const MIN_RSA_MODULUS_BITS: usize = 512;
const MIN_DSA_MODULUS_BITS: usize = 512;

/// Generates a fresh key pair of the requested family.
pub fn generate_key_pair(options: &GenerateKeyPairOptions) -> Result<AsymmetricKeyHandlePair> {
    let private = match options {
        GenerateKeyPairOptions::Rsa(options) => KeyMaterial::Rsa(RsaKey::Private(generate_rsa(
            options.modulus_length,
            options.public_exponent,
        )?)),
        GenerateKeyPairOptions::RsaPss(options) => generate_rsa_pss(options)?,
        GenerateKeyPairOptions::Dsa(options) => generate_dsa(options)?,
        GenerateKeyPairOptions::Ec(options) => generate_ec(options.named_curve)?,
        GenerateKeyPairOptions::Ed25519 => KeyMaterial::Ed25519(Ed25519Key::Private(
            rand().with_rng(|rng| SigningKey::generate(rng))?,
        )),
        GenerateKeyPairOptions::X25519 => KeyMaterial::X25519(X25519Key::Private(
            rand().with_rng(|rng| StaticSecret::random_from_rng(rng))?,
        )),
        GenerateKeyPairOptions::Dh(options) => generate_dh(options)?,
    };

    let public = private.to_public();
    Ok(AsymmetricKeyHandlePair {
        public_key: AsymmetricKeyObjectHandle::from_material(public),
        private_key: AsymmetricKeyObjectHandle::from_material(private),
    })
}

fn generate_rsa(modulus_length: usize, public_exponent: u64) -> Result<RsaPrivateKey> {
    if modulus_length < MIN_RSA_MODULUS_BITS {
        return Err(Error::InvalidArgument(format!(
            "RSA modulus must be at least {} bits",
            MIN_RSA_MODULUS_BITS
        )));
    }
    if public_exponent < 3 || public_exponent % 2 == 0 {
        return Err(Error::InvalidArgument(format!(
            "invalid RSA public exponent {}",
            public_exponent
        )));
    }

    log::debug!(
        "generating {}-bit RSA key (e = {})",
        modulus_length,
        public_exponent
    );
    let exponent = BigUint::from(public_exponent);
    Ok(rand().with_rng(|rng| RsaPrivateKey::new_with_exp(rng, modulus_length, &exponent))??)
}

fn generate_rsa_pss(options: &RsaPssKeyPairOptions) -> Result<KeyMaterial> {
    let restricted = options.hash_algorithm.is_some()
        || options.mgf1_hash_algorithm.is_some()
        || options.salt_length.is_some();

    let params = if restricted {
        let hash = options.hash_algorithm.unwrap_or(HashAlgorithm::Sha1);
        let mgf1_hash = options.mgf1_hash_algorithm.unwrap_or(hash);
        for digest in [hash, mgf1_hash] {
            if digest.is_xof() {
                return Err(Error::UnsupportedDigest(digest.name().to_string()));
            }
        }
        let salt_length = options.salt_length.unwrap_or(hash.output_size() as u32);
        let salt_length = u8::try_from(salt_length).map_err(|_| {
            Error::InvalidArgument(format!("PSS salt length {} is too large", salt_length))
        })?;
        Some(PssParams {
            hash,
            mgf1_hash,
            salt_length,
        })
    } else {
        None
    };

    let key = generate_rsa(options.modulus_length, options.public_exponent)?;
    Ok(KeyMaterial::RsaPss(RsaKey::Private(key), params))
}

fn generate_dsa(options: &DsaKeyPairOptions) -> Result<KeyMaterial> {
    let l = options.modulus_length;
    let n = options
        .divisor_length
        .unwrap_or(if l >= 2048 { 256 } else { 160 });
    if l < MIN_DSA_MODULUS_BITS || n < 2 || n >= l {
        return Err(Error::InvalidArgument(format!(
            "invalid DSA sizes L = {}, N = {}",
            l, n
        )));
    }

    log::debug!("generating DSA domain parameters (L = {}, N = {})", l, n);
    let q = generate_prime(n, false, None, None)?;
    // p = 1 mod 2q, so q divides p - 1
    let p = generate_prime(l, false, Some(&(&q << 1usize)), None)?;

    let exponent = (&p - 1u32) / &q;
    let mut h = BigUint::from(2u32);
    let g = loop {
        let g = h.modpow(&exponent, &p);
        if !g.is_one() {
            break g;
        }
        h += 1u32;
    };

    let x = rand().with_rng(|rng| rng.gen_biguint_range(&BigUint::one(), &q))?;
    let y = g.modpow(&x, &p);
    Ok(KeyMaterial::Dsa(DsaKey {
        p,
        q,
        g,
        y,
        x: Some(x),
    }))
}

fn generate_ec(curve: NamedCurve) -> Result<KeyMaterial> {
    log::debug!("generating {} key", curve);
    let key = rand().with_rng(|rng| match curve {
        NamedCurve::P256 => EcKey::P256Private(p256::SecretKey::random(rng)),
        NamedCurve::P384 => EcKey::P384Private(p384::SecretKey::random(rng)),
    })?;
    Ok(KeyMaterial::Ec(key))
}

fn generate_dh(options: &DhKeyPairOptions) -> Result<KeyMaterial> {
    let (p, g) = match options {
        DhKeyPairOptions::Group(name) => (modp_group(name)?, BigUint::from(MODP_GENERATOR)),
        DhKeyPairOptions::Prime { prime, generator } => {
            (BigUint::from_bytes_be(prime), BigUint::from(*generator))
        }
        DhKeyPairOptions::PrimeLength {
            prime_length,
            generator,
        } => {
            let g = BigUint::from(*generator);
            (generate_dh_prime(*prime_length, &g)?, g)
        }
    };
    if p.bits() < 2 || g < BigUint::from(2u32) || g >= p {
        return Err(Error::InvalidArgument(
            "invalid Diffie-Hellman parameters".to_string(),
        ));
    }

    let x = generate_private_value(&p)?;
    let y = g.modpow(&x, &p);
    Ok(KeyMaterial::Dh(DhKey {
        p,
        g,
        y,
        x: Some(x),
    }))
}
