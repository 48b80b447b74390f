use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`] so callers can tell a rejected
/// argument apart from an operation that was called out of order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    UnsupportedAlgorithm,
    MalformedInput,
    InvalidState,
    ResourceLimit,
    Other,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("unsupported digest {0}")]
    UnsupportedDigest(String),
    #[error("unsupported cipher {0}")]
    UnsupportedCipher(String),
    #[error("unsupported key type {0}")]
    UnsupportedKeyType(String),
    #[error("unsupported named curve {0}")]
    UnsupportedCurve(String),
    #[error("unsupported signature algorithm {0}")]
    UnsupportedSignatureAlgorithm(String),
    #[error("unknown group {0}")]
    UnknownGroup(String),
    #[error("invalid output length {0}")]
    InvalidOutputLength(usize),
    #[error("invalid XOF output length {0} for fixed-length digest")]
    InvalidXofLength(usize),
    #[error("iteration count must be greater than zero")]
    InvalidIterationCount,
    #[error("invalid scrypt parameters: N={n}, r={r}, p={p}")]
    InvalidScryptParameters { n: u64, r: u32, p: u32 },
    #[error("invalid format for key type: {0}")]
    IncompatibleKeyFormat(String),
    #[error("passphrase required for encrypted private key")]
    PassphraseRequired,
    #[error("peer public key is out of range")]
    InvalidPeerPublicKey,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed certificate: {0}")]
    MalformedCertificate(String),
    #[error("malformed key: {0}")]
    MalformedKey(String),
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("digest already called")]
    DigestAlreadyCalled,
    #[error("Diffie-Hellman key pair not set")]
    KeysNotSet,
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("memory limit exceeded: {required} > {maxmem}")]
    MemoryLimitExceeded { required: u64, maxmem: u64 },
    #[error("issuer chain deeper than {0}")]
    ChainTooDeep(usize),

    #[error("der: {0}")]
    Der(#[from] der::Error),
    #[error("spki: {0}")]
    Spki(#[from] spki::Error),
    #[error("pkcs8: {0}")]
    Pkcs8(#[from] pkcs8::Error),
    #[error("pkcs1: {0}")]
    Pkcs1(#[from] rsa::pkcs1::Error),
    #[error("sec1: {0}")]
    Sec1(#[source] sec1::Error),
    #[error("elliptic curve error")]
    EllipticCurve(#[source] p256::elliptic_curve::Error),
    #[error("rsa: {0}")]
    Rsa(#[from] rsa::Error),
    #[error("signature error")]
    Signature(#[source] signature::Error),
    #[error("pem: {0}")]
    Pem(#[from] pem::PemError),
    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("{0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("{0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("{0}")]
    Io(#[source] IoError),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedDigest(_)
            | Error::UnsupportedCipher(_)
            | Error::UnsupportedKeyType(_)
            | Error::UnsupportedCurve(_)
            | Error::UnsupportedSignatureAlgorithm(_)
            | Error::UnknownGroup(_) => ErrorKind::UnsupportedAlgorithm,
            Error::InvalidOutputLength(_)
            | Error::InvalidXofLength(_)
            | Error::InvalidIterationCount
            | Error::InvalidScryptParameters { .. }
            | Error::IncompatibleKeyFormat(_)
            | Error::PassphraseRequired
            | Error::InvalidPeerPublicKey
            | Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::MalformedCertificate(_)
            | Error::MalformedKey(_)
            | Error::MalformedInput(_)
            | Error::Der(_)
            | Error::Spki(_)
            | Error::Pkcs8(_)
            | Error::Pkcs1(_)
            | Error::Sec1(_)
            | Error::EllipticCurve(_)
            | Error::Pem(_)
            | Error::Base64(_)
            | Error::SerdeJson(_)
            | Error::Utf8(_) => ErrorKind::MalformedInput,
            Error::DigestAlreadyCalled | Error::KeysNotSet | Error::InvalidState(_) => {
                ErrorKind::InvalidState
            }
            Error::MemoryLimitExceeded { .. } | Error::ChainTooDeep(_) => ErrorKind::ResourceLimit,
            Error::Rsa(_) | Error::Signature(_) | Error::Io(_) | Error::Other(_) => {
                ErrorKind::Other
            }
        }
    }
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(IoError(e))
    }
}

impl From<sec1::Error> for Error {
    fn from(e: sec1::Error) -> Self {
        Error::Sec1(e)
    }
}

impl From<p256::elliptic_curve::Error> for Error {
    fn from(e: p256::elliptic_curve::Error) -> Self {
        Error::EllipticCurve(e)
    }
}

impl From<signature::Error> for Error {
    fn from(e: signature::Error) -> Self {
        Error::Signature(e)
    }
}
