use bytes::Bytes;
use hmac::{Hmac, Mac};
use std::fmt;

use crate::hash::accumulator::{Accumulator, Keyed};
use crate::hash::{with_fixed_digest, HashAlgorithm};
use crate::key::{CryptoKey, SecretKeyObjectHandle};
use crate::utilities::error::*;

/// Streaming HMAC with the same one-shot `digest()` contract as
/// [`HashHandle`](crate::hash::HashHandle).
pub struct HmacHandle {
    algorithm: HashAlgorithm,
    state: Option<Box<dyn Accumulator>>,
    processed: u64,
}

impl fmt::Debug for HmacHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacHandle")
            .field("algorithm", &self.algorithm)
            .field("processed", &self.processed)
            .field("finalized", &self.state.is_none())
            .finish()
    }
}

impl HmacHandle {
    pub fn new(algorithm: &str, key: &[u8]) -> Result<Self> {
        Self::with_algorithm(HashAlgorithm::from_name(algorithm)?, key)
    }

    pub fn with_algorithm(algorithm: HashAlgorithm, key: &[u8]) -> Result<Self> {
        let state: Box<dyn Accumulator> = with_fixed_digest!(algorithm, D => {
            let mac = <Hmac<D> as Mac>::new_from_slice(key)
                .map_err(|err| Error::InvalidArgument(err.to_string()))?;
            Box::new(Keyed(mac))
        }, xof => return Err(Error::UnsupportedDigest(algorithm.name().to_string())));

        Ok(Self {
            algorithm,
            state: Some(state),
            processed: 0,
        })
    }

    pub fn with_secret_key(algorithm: &str, key: &SecretKeyObjectHandle) -> Result<Self> {
        Self::new(algorithm, key.material())
    }

    pub fn with_crypto_key(algorithm: &str, key: &CryptoKey) -> Result<Self> {
        let secret = key.secret_key().ok_or_else(|| {
            Error::InvalidArgument("HMAC requires a secret CryptoKey".to_string())
        })?;
        Self::with_secret_key(algorithm, secret)
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn update(&mut self, data: &[u8]) -> Result<u64> {
        let state = self.state.as_mut().ok_or(Error::DigestAlreadyCalled)?;
        state.update(data);
        self.processed += data.len() as u64;
        Ok(self.processed)
    }

    pub fn digest(&mut self) -> Result<Bytes> {
        let state = self.state.take().ok_or(Error::DigestAlreadyCalled)?;
        Ok(Bytes::from(state.finalize(self.algorithm.output_size())))
    }
}
