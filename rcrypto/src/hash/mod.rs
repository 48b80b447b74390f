//! Streaming message digests ([`HashHandle`]) and keyed MACs ([`HmacHandle`]).

#[cfg(test)]
mod hash_test;

mod accumulator;
mod hmac;

pub use self::hmac::HmacHandle;

use bytes::Bytes;
use std::fmt;

use crate::hash::accumulator::{Accumulator, Fixed, Xof};
use crate::utilities::error::*;

/// Expands `$body` once per fixed-output digest with `$d` bound to the
/// concrete digest type. XOF algorithms evaluate `$xof` instead.
macro_rules! with_fixed_digest {
    ($algorithm:expr, $d:ident => $body:expr, xof => $xof:expr) => {
        match $algorithm {
            $crate::hash::HashAlgorithm::Md5 => {
                type $d = ::md5::Md5;
                $body
            }
            $crate::hash::HashAlgorithm::Sha1 => {
                type $d = ::sha1::Sha1;
                $body
            }
            $crate::hash::HashAlgorithm::Sha224 => {
                type $d = ::sha2::Sha224;
                $body
            }
            $crate::hash::HashAlgorithm::Sha256 => {
                type $d = ::sha2::Sha256;
                $body
            }
            $crate::hash::HashAlgorithm::Sha384 => {
                type $d = ::sha2::Sha384;
                $body
            }
            $crate::hash::HashAlgorithm::Sha512 => {
                type $d = ::sha2::Sha512;
                $body
            }
            $crate::hash::HashAlgorithm::Sha512_224 => {
                type $d = ::sha2::Sha512_224;
                $body
            }
            $crate::hash::HashAlgorithm::Sha512_256 => {
                type $d = ::sha2::Sha512_256;
                $body
            }
            $crate::hash::HashAlgorithm::Sha3_224 => {
                type $d = ::sha3::Sha3_224;
                $body
            }
            $crate::hash::HashAlgorithm::Sha3_256 => {
                type $d = ::sha3::Sha3_256;
                $body
            }
            $crate::hash::HashAlgorithm::Sha3_384 => {
                type $d = ::sha3::Sha3_384;
                $body
            }
            $crate::hash::HashAlgorithm::Sha3_512 => {
                type $d = ::sha3::Sha3_512;
                $body
            }
            $crate::hash::HashAlgorithm::Shake128 | $crate::hash::HashAlgorithm::Shake256 => $xof,
        }
    };
}
pub(crate) use with_fixed_digest;

/// Digest algorithms understood by the hash, HMAC and KDF operations.
#[allow(non_camel_case_types)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Shake128,
    Shake256,
}

impl HashAlgorithm {
    /// Resolves a digest name such as `sha256`, `SHA-256` or `RSA-SHA256`.
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let normalized = lower.strip_prefix("rsa-").unwrap_or(&lower);
        let algorithm = match normalized {
            "md5" => HashAlgorithm::Md5,
            "sha1" | "sha-1" => HashAlgorithm::Sha1,
            "sha224" | "sha-224" => HashAlgorithm::Sha224,
            "sha256" | "sha-256" => HashAlgorithm::Sha256,
            "sha384" | "sha-384" => HashAlgorithm::Sha384,
            "sha512" | "sha-512" => HashAlgorithm::Sha512,
            "sha512-224" | "sha-512/224" | "sha512/224" => HashAlgorithm::Sha512_224,
            "sha512-256" | "sha-512/256" | "sha512/256" => HashAlgorithm::Sha512_256,
            "sha3-224" => HashAlgorithm::Sha3_224,
            "sha3-256" => HashAlgorithm::Sha3_256,
            "sha3-384" => HashAlgorithm::Sha3_384,
            "sha3-512" => HashAlgorithm::Sha3_512,
            "shake128" | "shake-128" => HashAlgorithm::Shake128,
            "shake256" | "shake-256" => HashAlgorithm::Shake256,
            _ => return Err(Error::UnsupportedDigest(name.to_string())),
        };
        Ok(algorithm)
    }

    pub fn name(&self) -> &'static str {
        match *self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha512_224 => "sha512-224",
            HashAlgorithm::Sha512_256 => "sha512-256",
            HashAlgorithm::Sha3_224 => "sha3-224",
            HashAlgorithm::Sha3_256 => "sha3-256",
            HashAlgorithm::Sha3_384 => "sha3-384",
            HashAlgorithm::Sha3_512 => "sha3-512",
            HashAlgorithm::Shake128 => "shake128",
            HashAlgorithm::Shake256 => "shake256",
        }
    }

    /// Output length in bytes; the default output length for XOFs.
    pub fn output_size(&self) -> usize {
        match *self {
            HashAlgorithm::Md5 | HashAlgorithm::Shake128 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 | HashAlgorithm::Sha512_224 | HashAlgorithm::Sha3_224 => 28,
            HashAlgorithm::Sha256
            | HashAlgorithm::Sha512_256
            | HashAlgorithm::Sha3_256
            | HashAlgorithm::Shake256 => 32,
            HashAlgorithm::Sha384 | HashAlgorithm::Sha3_384 => 48,
            HashAlgorithm::Sha512 | HashAlgorithm::Sha3_512 => 64,
        }
    }

    pub fn is_xof(&self) -> bool {
        matches!(self, HashAlgorithm::Shake128 | HashAlgorithm::Shake256)
    }

    pub(crate) fn accumulator(&self) -> Box<dyn Accumulator> {
        with_fixed_digest!(*self, D => Box::new(Fixed(<D as digest::Digest>::new())), xof => {
            if *self == HashAlgorithm::Shake128 {
                Box::new(Xof(sha3::Shake128::default()))
            } else {
                Box::new(Xof(sha3::Shake256::default()))
            }
        })
    }

    /// One-shot digest with the algorithm's default output length.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        let mut acc = self.accumulator();
        acc.update(data);
        acc.finalize(self.output_size())
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Streaming digest. `digest()` is terminal: later `update`, `digest` or
/// `copy` calls fail with [`Error::DigestAlreadyCalled`].
pub struct HashHandle {
    algorithm: HashAlgorithm,
    state: Option<Box<dyn Accumulator>>,
    output_len: usize,
    processed: u64,
}

impl fmt::Debug for HashHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashHandle")
            .field("algorithm", &self.algorithm)
            .field("output_len", &self.output_len)
            .field("processed", &self.processed)
            .field("finalized", &self.state.is_none())
            .finish()
    }
}

impl HashHandle {
    /// Creates an accumulator for the named digest. `xof_len` selects the
    /// output length of `shake128`/`shake256`; for fixed digests it must
    /// match the natural size if given.
    pub fn new(algorithm: &str, xof_len: Option<usize>) -> Result<Self> {
        Self::with_algorithm(HashAlgorithm::from_name(algorithm)?, xof_len)
    }

    pub fn with_algorithm(algorithm: HashAlgorithm, xof_len: Option<usize>) -> Result<Self> {
        let output_len = output_len(algorithm, xof_len, algorithm.output_size())?;
        Ok(Self {
            algorithm,
            state: Some(algorithm.accumulator()),
            output_len,
            processed: 0,
        })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Appends `data`, returning the number of bytes consumed so far.
    pub fn update(&mut self, data: &[u8]) -> Result<u64> {
        let state = self.state.as_mut().ok_or(Error::DigestAlreadyCalled)?;
        state.update(data);
        self.processed += data.len() as u64;
        Ok(self.processed)
    }

    pub fn digest(&mut self) -> Result<Bytes> {
        let state = self.state.take().ok_or(Error::DigestAlreadyCalled)?;
        Ok(Bytes::from(state.finalize(self.output_len)))
    }

    /// Duplicates the pending state into an independent accumulator,
    /// optionally with a different XOF output length.
    pub fn copy(&self, xof_len: Option<usize>) -> Result<HashHandle> {
        let state = self.state.as_ref().ok_or(Error::DigestAlreadyCalled)?;
        Ok(HashHandle {
            algorithm: self.algorithm,
            state: Some(state.box_clone()),
            output_len: output_len(self.algorithm, xof_len, self.output_len)?,
            processed: self.processed,
        })
    }
}

fn output_len(algorithm: HashAlgorithm, xof_len: Option<usize>, default: usize) -> Result<usize> {
    match xof_len {
        None => Ok(default),
        Some(len) if algorithm.is_xof() => Ok(len),
        Some(len) if len == algorithm.output_size() => Ok(len),
        Some(len) => Err(Error::InvalidXofLength(len)),
    }
}
