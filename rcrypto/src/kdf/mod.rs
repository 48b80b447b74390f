//! Stateless key derivation: HKDF (RFC 5869), PBKDF2 (RFC 8018) and
//! scrypt (RFC 7914).

#[cfg(test)]
mod kdf_test;

use bytes::Bytes;
use hkdf::Hkdf;

use crate::hash::{with_fixed_digest, HashAlgorithm};
use crate::utilities::error::*;

/// Default `maxmem` used when callers have no budget of their own (32 MiB).
pub const SCRYPT_DEFAULT_MAXMEM: u64 = 32 << 20;

/// Derives `length` bytes with HKDF-Extract then HKDF-Expand.
pub fn get_hkdf(hash: &str, key: &[u8], salt: &[u8], info: &[u8], length: usize) -> Result<Bytes> {
    let algorithm = HashAlgorithm::from_name(hash)?;
    if algorithm.is_xof() {
        return Err(Error::UnsupportedDigest(hash.to_string()));
    }
    if length == 0 || length > 255 * algorithm.output_size() {
        return Err(Error::InvalidOutputLength(length));
    }

    let mut okm = vec![0u8; length];
    with_fixed_digest!(algorithm, D => {
        Hkdf::<D>::new(Some(salt), key)
            .expand(info, &mut okm)
            .map_err(|_| Error::InvalidOutputLength(length))?
    }, xof => return Err(Error::UnsupportedDigest(hash.to_string())));

    Ok(Bytes::from(okm))
}

/// Derives `keylen` bytes with PBKDF2-HMAC over `digest`.
pub fn get_pbkdf(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    keylen: usize,
    digest: &str,
) -> Result<Bytes> {
    let algorithm = HashAlgorithm::from_name(digest)?;
    if iterations == 0 {
        return Err(Error::InvalidIterationCount);
    }
    if keylen == 0 {
        return Err(Error::InvalidOutputLength(keylen));
    }

    let mut out = vec![0u8; keylen];
    with_fixed_digest!(algorithm, D => {
        pbkdf2::pbkdf2_hmac::<D>(password, salt, iterations, &mut out)
    }, xof => return Err(Error::UnsupportedDigest(digest.to_string())));

    Ok(Bytes::from(out))
}

/// Derives `keylen` bytes with scrypt. `n` is the CPU/memory cost and must
/// be a power of two greater than one; the working set
/// `128 * r * p + 128 * r * (n + 2)` must not exceed `maxmem`.
pub fn get_scrypt(
    password: &[u8],
    salt: &[u8],
    n: u64,
    r: u32,
    p: u32,
    maxmem: u64,
    keylen: usize,
) -> Result<Bytes> {
    if n < 2 || !n.is_power_of_two() || r == 0 || p == 0 {
        return Err(Error::InvalidScryptParameters { n, r, p });
    }
    if keylen == 0 {
        return Err(Error::InvalidOutputLength(keylen));
    }

    let required = scrypt_memory(n, r, p).ok_or(Error::InvalidScryptParameters { n, r, p })?;
    if required > maxmem {
        log::warn!("scrypt needs {} bytes, limit is {}", required, maxmem);
        return Err(Error::MemoryLimitExceeded { required, maxmem });
    }

    // The output length passed here only feeds the PHC string helpers;
    // the derived length is taken from the output buffer.
    let params = scrypt::Params::new(n.trailing_zeros() as u8, r, p, scrypt::Params::RECOMMENDED_LEN)
        .map_err(|_| Error::InvalidScryptParameters { n, r, p })?;

    let mut out = vec![0u8; keylen];
    scrypt::scrypt(password, salt, &params, &mut out)
        .map_err(|_| Error::InvalidOutputLength(keylen))?;

    Ok(Bytes::from(out))
}

fn scrypt_memory(n: u64, r: u32, p: u32) -> Option<u64> {
    let r = u64::from(r);
    let p = u64::from(p);
    let block = 128u64.checked_mul(r)?;
    block.checked_mul(p)?.checked_add(block.checked_mul(n.checked_add(2)?)?)
}
