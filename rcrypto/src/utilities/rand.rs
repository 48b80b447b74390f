use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use std::sync::{Mutex, OnceLock};

use crate::utilities::error::*;

/// Process-wide random source shared by key generation, salts and IVs.
#[derive(Debug)]
pub(crate) struct RandChacha {
    rng: Mutex<ChaCha20Rng>,
}

impl Default for RandChacha {
    fn default() -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::from_entropy()),
        }
    }
}

impl RandChacha {
    pub(crate) fn fill(&self, buf: &mut [u8]) -> Result<()> {
        self.with_rng(|rng| rng.try_fill_bytes(buf))?
            .map_err(|err| Error::Other(err.to_string()))
    }

    pub(crate) fn with_rng<T>(&self, f: impl FnOnce(&mut ChaCha20Rng) -> T) -> Result<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|err| Error::Other(err.to_string()))?;
        Ok(f(&mut rng))
    }
}

static RAND: OnceLock<RandChacha> = OnceLock::new();

pub(crate) fn rand() -> &'static RandChacha {
    RAND.get_or_init(RandChacha::default)
}

pub(crate) fn random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    rand().fill(&mut buf)?;
    Ok(buf)
}
