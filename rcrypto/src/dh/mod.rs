//! Finite field Diffie-Hellman sessions over explicit, generated or
//! well-known MODP groups.

#[cfg(test)]
mod dh_test;

pub(crate) mod groups;

use num_bigint_dig::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use zeroize::Zeroizing;

use crate::prime::{check_prime, generate_prime, DEFAULT_PRIME_CHECKS};
use crate::utilities::error::*;
use crate::utilities::rand::rand;

pub const DH_CHECK_P_NOT_PRIME: u32 = 0x01;
pub const DH_CHECK_P_NOT_SAFE_PRIME: u32 = 0x02;
pub const DH_UNABLE_TO_CHECK_GENERATOR: u32 = 0x04;
pub const DH_NOT_SUITABLE_GENERATOR: u32 = 0x08;

/// Prime of a new session: a bit length to generate or big-endian bytes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PrimeSource {
    Length(usize),
    Prime(Vec<u8>),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum GeneratorSource {
    Number(u32),
    Bytes(Vec<u8>),
}

impl Default for GeneratorSource {
    fn default() -> Self {
        GeneratorSource::Number(groups::MODP_GENERATOR)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DhState {
    Uninitialized,
    KeysSet,
    SecretComputed,
}

/// Generates a safe prime of `bits` bits for which `generator` is a
/// suitable base.
pub(crate) fn generate_dh_prime(bits: usize, generator: &BigUint) -> Result<BigUint> {
    if generator < &BigUint::from(2u32) {
        return Err(Error::InvalidArgument(format!(
            "invalid Diffie-Hellman generator {}",
            generator
        )));
    }
    let (add, rem) = if generator == &BigUint::from(2u32) {
        (24u32, 23u32)
    } else if generator == &BigUint::from(5u32) {
        (60, 59)
    } else {
        (12, 11)
    };
    generate_prime(
        bits,
        true,
        Some(&BigUint::from(add)),
        Some(&BigUint::from(rem)),
    )
}

/// Random private value in `[2, p - 2]`.
pub(crate) fn generate_private_value(prime: &BigUint) -> Result<BigUint> {
    if prime.bits() < 3 {
        return Err(Error::InvalidArgument(
            "Diffie-Hellman prime is too small".to_string(),
        ));
    }
    let low = BigUint::from(2u32);
    let high = prime - 1u32;
    rand().with_rng(|rng| rng.gen_biguint_range(&low, &high))
}

fn verify_parameters(prime: &BigUint, generator: &BigUint) -> u32 {
    let mut flags = 0;
    if generator <= &BigUint::one() || generator >= &(prime - 1u32) {
        flags |= DH_NOT_SUITABLE_GENERATOR;
    }
    if !check_prime(prime, DEFAULT_PRIME_CHECKS) {
        flags |= DH_CHECK_P_NOT_PRIME;
    } else if !check_prime(&(prime >> 1usize), DEFAULT_PRIME_CHECKS) {
        flags |= DH_CHECK_P_NOT_SAFE_PRIME;
    }
    flags
}

/// Mutable Diffie-Hellman session.
///
/// A session holds a prime and generator plus an optional local key pair.
/// `compute_secret` requires the private half; `get_public_key` requires
/// the public half, which `generate_keys` derives.
#[derive(Debug)]
pub struct DiffieHellmanHandle {
    prime: BigUint,
    generator: BigUint,
    private_key: Option<Zeroizing<Vec<u8>>>,
    public_key: Option<BigUint>,
    verify_error: u32,
    state: DhState,
}

impl DiffieHellmanHandle {
    pub fn new(prime: PrimeSource, generator: GeneratorSource) -> Result<Self> {
        let generator = match generator {
            GeneratorSource::Number(g) => BigUint::from(g),
            GeneratorSource::Bytes(bytes) => BigUint::from_bytes_be(&bytes),
        };
        if generator < BigUint::from(2u32) {
            return Err(Error::InvalidArgument(format!(
                "invalid Diffie-Hellman generator {}",
                generator
            )));
        }

        let (prime, verify_error) = match prime {
            PrimeSource::Length(bits) => {
                log::debug!("generating {}-bit Diffie-Hellman prime", bits);
                let prime = generate_dh_prime(bits, &generator)?;
                let flags = if generator >= &prime - 1u32 {
                    DH_NOT_SUITABLE_GENERATOR
                } else {
                    0
                };
                (prime, flags)
            }
            PrimeSource::Prime(bytes) => {
                let prime = BigUint::from_bytes_be(&bytes);
                if prime.bits() < 2 {
                    return Err(Error::InvalidArgument(
                        "Diffie-Hellman prime is too small".to_string(),
                    ));
                }
                let flags = verify_parameters(&prime, &generator);
                if flags != 0 {
                    log::warn!("Diffie-Hellman parameters failed checks: {:#x}", flags);
                }
                (prime, flags)
            }
        };

        Ok(Self::with_parameters(prime, generator, verify_error))
    }

    /// Session over a named MODP group such as `modp14`.
    pub fn group(name: &str) -> Result<Self> {
        let prime = groups::modp_group(name)?;
        Ok(Self::with_parameters(
            prime,
            BigUint::from(groups::MODP_GENERATOR),
            0,
        ))
    }

    fn with_parameters(prime: BigUint, generator: BigUint, verify_error: u32) -> Self {
        Self {
            prime,
            generator,
            private_key: None,
            public_key: None,
            verify_error,
            state: DhState::Uninitialized,
        }
    }

    pub fn state(&self) -> DhState {
        self.state
    }

    fn prime_size(&self) -> usize {
        (self.prime.bits() + 7) / 8
    }

    fn private_value(&self) -> Option<BigUint> {
        self.private_key
            .as_ref()
            .map(|key| BigUint::from_bytes_be(key))
    }

    /// Creates a private key when none is set and derives the public key
    /// from it. Returns the public key.
    pub fn generate_keys(&mut self) -> Result<Vec<u8>> {
        let private = match self.private_value() {
            Some(private) => private,
            None => {
                let private = generate_private_value(&self.prime)?;
                self.private_key = Some(Zeroizing::new(private.to_bytes_be()));
                private
            }
        };
        let public = self.generator.modpow(&private, &self.prime);
        let bytes = public.to_bytes_be();
        self.public_key = Some(public);
        self.state = DhState::KeysSet;
        Ok(bytes)
    }

    /// Derives the shared secret with `peer_public_key`, left-padded to the
    /// byte length of the prime.
    pub fn compute_secret(&mut self, peer_public_key: &[u8]) -> Result<Vec<u8>> {
        let private = self.private_value().ok_or(Error::KeysNotSet)?;

        let peer = BigUint::from_bytes_be(peer_public_key);
        if peer < BigUint::from(2u32) || peer > &self.prime - 2u32 {
            log::debug!("rejected Diffie-Hellman peer key outside [2, p - 2]");
            return Err(Error::InvalidPeerPublicKey);
        }

        let shared = Zeroizing::new(peer.modpow(&private, &self.prime).to_bytes_be());
        let size = self.prime_size();
        let mut secret = vec![0u8; size - shared.len()];
        secret.extend_from_slice(&shared);
        self.state = DhState::SecretComputed;
        Ok(secret)
    }

    pub fn set_public_key(&mut self, key: &[u8]) -> Result<()> {
        let key = BigUint::from_bytes_be(key);
        if key.is_zero() {
            return Err(Error::InvalidArgument(
                "Diffie-Hellman public key cannot be zero".to_string(),
            ));
        }
        self.public_key = Some(key);
        Ok(())
    }

    /// Sets the private value. The public key is left unchanged until the
    /// next `generate_keys`.
    pub fn set_private_key(&mut self, key: &[u8]) -> Result<()> {
        let value = BigUint::from_bytes_be(key);
        if value.is_zero() {
            return Err(Error::InvalidArgument(
                "Diffie-Hellman private key cannot be zero".to_string(),
            ));
        }
        self.private_key = Some(Zeroizing::new(value.to_bytes_be()));
        self.state = DhState::KeysSet;
        Ok(())
    }

    pub fn get_public_key(&self) -> Result<Vec<u8>> {
        self.public_key
            .as_ref()
            .map(BigUint::to_bytes_be)
            .ok_or(Error::KeysNotSet)
    }

    pub fn get_private_key(&self) -> Result<Vec<u8>> {
        self.private_key
            .as_ref()
            .map(|key| key.to_vec())
            .ok_or(Error::KeysNotSet)
    }

    pub fn get_prime(&self) -> Vec<u8> {
        self.prime.to_bytes_be()
    }

    pub fn get_generator(&self) -> Vec<u8> {
        self.generator.to_bytes_be()
    }

    /// `DH_*` flags describing weak or malformed parameters. Advisory only.
    pub fn get_verify_error(&self) -> u32 {
        self.verify_error
    }
}
