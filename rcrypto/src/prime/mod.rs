//! Probabilistic primality checks and random prime generation.

#[cfg(test)]
mod prime_test;

use num_bigint_dig::prime::probably_prime;
use num_bigint_dig::{BigUint, RandBigInt, RandPrime};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::utilities::error::*;
use crate::utilities::rand::rand;

/// Miller-Rabin rounds used when the caller does not ask for a count.
pub const DEFAULT_PRIME_CHECKS: usize = 20;

/// Bit size above which safe primes are searched as `2q + 1` over random
/// primes `q`.
const SAFE_PRIME_SIEVE_THRESHOLD: usize = 16;

/// Checks whether the big-endian `candidate` is probably prime using
/// `checks` Miller-Rabin rounds (at least one) plus a Lucas test.
pub fn check_prime_sync(candidate: &[u8], checks: usize) -> bool {
    check_prime(&BigUint::from_bytes_be(candidate), checks)
}

pub fn check_prime(candidate: &BigUint, checks: usize) -> bool {
    probably_prime(candidate, checks.max(1))
}

/// Generates a random prime of exactly `bits` bits, returned big-endian.
///
/// With `safe`, `(p - 1) / 2` is prime as well. With `add`, the result
/// satisfies `p % add == rem` (`rem` defaults to 1, or 3 for safe primes).
pub fn random_prime(
    bits: usize,
    safe: bool,
    add: Option<&[u8]>,
    rem: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let add = add.map(BigUint::from_bytes_be);
    let rem = rem.map(BigUint::from_bytes_be);
    Ok(generate_prime(bits, safe, add.as_ref(), rem.as_ref())?.to_bytes_be())
}

pub(crate) fn generate_prime(
    bits: usize,
    safe: bool,
    add: Option<&BigUint>,
    rem: Option<&BigUint>,
) -> Result<BigUint> {
    let min_bits = if safe { 3 } else { 2 };
    if bits < min_bits {
        return Err(Error::InvalidArgument(format!(
            "prime size must be at least {} bits",
            min_bits
        )));
    }

    let constraint = match (add, rem) {
        (None, None) => None,
        (None, Some(_)) => {
            return Err(Error::InvalidArgument(
                "rem requires add to be set".to_string(),
            ))
        }
        (Some(add), rem) => {
            if add.is_zero() || add.bits() > bits {
                return Err(Error::InvalidArgument(format!(
                    "invalid add for a {}-bit prime",
                    bits
                )));
            }
            let rem = match rem {
                Some(rem) => rem.clone(),
                None if safe => BigUint::from(3u32),
                None => BigUint::one(),
            };
            if &rem >= add {
                return Err(Error::InvalidArgument("rem must be less than add".to_string()));
            }
            if add > &BigUint::one() && !add.gcd(&rem).is_one() {
                return Err(Error::InvalidArgument(
                    "add and rem admit no primes".to_string(),
                ));
            }
            Some((add.clone(), rem))
        }
    };

    log::debug!("generating {}-bit prime (safe: {})", bits, safe);

    rand().with_rng(|rng| {
        if safe && constraint.is_none() && bits > SAFE_PRIME_SIEVE_THRESHOLD {
            loop {
                let q = rng.gen_prime(bits - 1);
                let p = (q << 1usize) + 1u32;
                if p.bits() == bits && probably_prime(&p, DEFAULT_PRIME_CHECKS) {
                    return p;
                }
            }
        }

        let top = BigUint::one() << (bits - 1);
        loop {
            let mut candidate = rng.gen_biguint(bits) | &top;
            if let Some((add, rem)) = &constraint {
                candidate = &candidate - (&candidate % add) + rem;
                if candidate.bits() != bits {
                    continue;
                }
            } else if bits > 2 {
                candidate |= BigUint::one();
            }

            if !probably_prime(&candidate, DEFAULT_PRIME_CHECKS) {
                continue;
            }
            if safe && !probably_prime(&(&candidate >> 1usize), DEFAULT_PRIME_CHECKS) {
                continue;
            }
            return candidate;
        }
    })
}

