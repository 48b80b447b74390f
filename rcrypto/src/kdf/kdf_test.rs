use serde::{Deserialize, Serialize};

use super::*;
use crate::utilities::encoding::encoding_test::load_test_vector;

#[derive(Serialize, Deserialize, Debug, Clone)]
struct HkdfTest {
    hash: String,
    #[serde(with = "hex")]
    key: Vec<u8>,
    #[serde(with = "hex")]
    salt: Vec<u8>,
    #[serde(with = "hex")]
    info: Vec<u8>,
    length: usize,
    #[serde(with = "hex")]
    output: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Pbkdf2Test {
    digest: String,
    #[serde(with = "hex")]
    password: Vec<u8>,
    #[serde(with = "hex")]
    salt: Vec<u8>,
    iterations: u32,
    keylen: usize,
    #[serde(with = "hex")]
    output: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ScryptTest {
    #[serde(with = "hex")]
    password: Vec<u8>,
    #[serde(with = "hex")]
    salt: Vec<u8>,
    n: u64,
    r: u32,
    p: u32,
    keylen: usize,
    #[serde(with = "hex")]
    output: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct KdfTests {
    hkdf: Vec<HkdfTest>,
    pbkdf2: Vec<Pbkdf2Test>,
    scrypt: Vec<ScryptTest>,
}

#[test]
fn test_hkdf() -> Result<()> {
    let tests: KdfTests = load_test_vector("test-vectors/kdf.json")?;

    for tc in &tests.hkdf {
        let out = get_hkdf(&tc.hash, &tc.key, &tc.salt, &tc.info, tc.length)?;
        assert_eq!(out.len(), tc.length);
        assert_eq!(out.as_ref(), tc.output.as_slice(), "hkdf {}", tc.hash);
    }

    Ok(())
}

#[test]
fn test_pbkdf2() -> Result<()> {
    let tests: KdfTests = load_test_vector("test-vectors/kdf.json")?;

    for tc in &tests.pbkdf2 {
        let out = get_pbkdf(&tc.password, &tc.salt, tc.iterations, tc.keylen, &tc.digest)?;
        assert_eq!(out.as_ref(), tc.output.as_slice(), "pbkdf2 {}", tc.digest);
    }

    Ok(())
}

#[test]
fn test_scrypt() -> Result<()> {
    let tests: KdfTests = load_test_vector("test-vectors/kdf.json")?;

    for tc in &tests.scrypt {
        let out = get_scrypt(
            &tc.password,
            &tc.salt,
            tc.n,
            tc.r,
            tc.p,
            SCRYPT_DEFAULT_MAXMEM,
            tc.keylen,
        )?;
        assert_eq!(out.as_ref(), tc.output.as_slice(), "scrypt N={}", tc.n);
    }

    Ok(())
}

#[test]
fn test_kdf_deterministic() -> Result<()> {
    let a = get_hkdf("sha384", b"ikm", b"salt", b"info", 77)?;
    let b = get_hkdf("sha384", b"ikm", b"salt", b"info", 77)?;
    assert_eq!(a, b);
    assert_eq!(a.len(), 77);

    let a = get_pbkdf(b"pw", b"salt", 3, 33, "sha3-256")?;
    let b = get_pbkdf(b"pw", b"salt", 3, 33, "sha3-256")?;
    assert_eq!(a, b);
    assert_eq!(a.len(), 33);

    let a = get_scrypt(b"pw", b"salt", 16, 1, 1, SCRYPT_DEFAULT_MAXMEM, 7)?;
    let b = get_scrypt(b"pw", b"salt", 16, 1, 1, SCRYPT_DEFAULT_MAXMEM, 7)?;
    assert_eq!(a, b);
    assert_eq!(a.len(), 7);

    Ok(())
}

#[test]
fn test_kdf_rejects_bad_parameters() {
    let kind = |r: Result<Bytes>| r.unwrap_err().kind();

    assert_eq!(
        kind(get_hkdf("sha256", b"k", b"", b"", 0)),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        kind(get_hkdf("sha256", b"k", b"", b"", 255 * 32 + 1)),
        ErrorKind::InvalidArgument
    );
    assert!(get_hkdf("sha256", b"k", b"", b"", 255 * 32).is_ok());
    assert_eq!(
        kind(get_hkdf("nope", b"k", b"", b"", 16)),
        ErrorKind::UnsupportedAlgorithm
    );

    assert_eq!(
        kind(get_pbkdf(b"pw", b"s", 0, 16, "sha256")),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        kind(get_pbkdf(b"pw", b"s", 1, 0, "sha256")),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        kind(get_pbkdf(b"pw", b"s", 1, 16, "shake128")),
        ErrorKind::UnsupportedAlgorithm
    );

    assert_eq!(
        kind(get_scrypt(b"pw", b"s", 15, 1, 1, SCRYPT_DEFAULT_MAXMEM, 16)),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        kind(get_scrypt(b"pw", b"s", 16, 0, 1, SCRYPT_DEFAULT_MAXMEM, 16)),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        kind(get_scrypt(b"pw", b"s", 16, 1, 1, SCRYPT_DEFAULT_MAXMEM, 0)),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn test_scrypt_memory_limit() -> Result<()> {
    // 128 * 8 * 1 + 128 * 8 * (16384 + 2) bytes
    let required = 16_780_288;
    let err = get_scrypt(b"pw", b"s", 16384, 8, 1, required - 1, 32).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceLimit);

    assert_eq!(get_scrypt(b"pw", b"s", 16384, 8, 1, required, 32)?.len(), 32);
    Ok(())
}
