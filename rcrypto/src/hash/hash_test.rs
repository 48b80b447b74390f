use serde::{Deserialize, Serialize};

use super::*;
use crate::utilities::encoding::encoding_test::load_test_vector;

#[derive(Serialize, Deserialize, Debug, Clone)]
struct HashTest {
    algorithm: String,
    #[serde(with = "hex")]
    input: Vec<u8>,
    #[serde(with = "hex")]
    output: Vec<u8>,
    #[serde(default)]
    xof_len: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct HmacTest {
    algorithm: String,
    #[serde(with = "hex")]
    key: Vec<u8>,
    #[serde(with = "hex")]
    input: Vec<u8>,
    #[serde(with = "hex")]
    output: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct HashTests {
    hash: Vec<HashTest>,
    hmac: Vec<HmacTest>,
}

#[test]
fn test_hash_known_answers() -> Result<()> {
    let tests: HashTests = load_test_vector("test-vectors/hash.json")?;

    for tc in &tests.hash {
        let mut h = HashHandle::new(&tc.algorithm, tc.xof_len)?;
        h.update(&tc.input)?;
        assert_eq!(
            h.digest()?.as_ref(),
            tc.output.as_slice(),
            "{} over {:?}",
            tc.algorithm,
            tc.input
        );
    }

    Ok(())
}

#[test]
fn test_hmac_known_answers() -> Result<()> {
    let tests: HashTests = load_test_vector("test-vectors/hash.json")?;

    for tc in &tests.hmac {
        let mut h = HmacHandle::new(&tc.algorithm, &tc.key)?;
        h.update(&tc.input)?;
        assert_eq!(h.digest()?.as_ref(), tc.output.as_slice(), "{}", tc.algorithm);
    }

    Ok(())
}

#[test]
fn test_split_updates_match_single_update() -> Result<()> {
    let data = b"The quick brown fox jumps over the lazy dog";
    for name in ["md5", "sha1", "sha256", "sha512-256", "sha3-384", "shake256"] {
        let mut whole = HashHandle::new(name, None)?;
        assert_eq!(whole.update(data)?, data.len() as u64);

        let mut split = HashHandle::new(name, None)?;
        assert_eq!(split.update(&data[..4])?, 4);
        assert_eq!(split.update(&data[4..19])?, 19);
        assert_eq!(split.update(&data[19..])?, data.len() as u64);

        assert_eq!(whole.digest()?, split.digest()?, "{}", name);
    }

    let mut whole = HmacHandle::new("sha256", b"key")?;
    whole.update(data)?;
    let mut split = HmacHandle::new("sha256", b"key")?;
    split.update(&data[..10])?;
    split.update(&data[10..])?;
    assert_eq!(whole.digest()?, split.digest()?);

    Ok(())
}

#[test]
fn test_digest_is_terminal() -> Result<()> {
    let mut h = HashHandle::new("sha256", None)?;
    h.update(b"abc")?;
    h.digest()?;

    assert_eq!(h.digest().unwrap_err().kind(), ErrorKind::InvalidState);
    assert_eq!(h.update(b"more").unwrap_err().kind(), ErrorKind::InvalidState);
    assert_eq!(h.copy(None).unwrap_err().kind(), ErrorKind::InvalidState);

    let mut m = HmacHandle::new("sha1", b"k")?;
    m.digest()?;
    assert_eq!(m.digest().unwrap_err().kind(), ErrorKind::InvalidState);
    assert_eq!(m.update(b"x").unwrap_err().kind(), ErrorKind::InvalidState);

    Ok(())
}

#[test]
fn test_copy_diverges() -> Result<()> {
    let mut h = HashHandle::new("sha256", None)?;
    h.update(b"ab")?;

    let mut c = h.copy(None)?;
    c.update(b"c")?;
    h.update(b"x")?;

    assert_eq!(
        c.digest()?.as_ref(),
        HashAlgorithm::Sha256.digest(b"abc").as_slice()
    );
    assert_eq!(
        h.digest()?.as_ref(),
        HashAlgorithm::Sha256.digest(b"abx").as_slice()
    );

    Ok(())
}

#[test]
fn test_xof_length() -> Result<()> {
    let mut short = HashHandle::new("shake256", None)?;
    short.update(b"abc")?;
    let mut long = short.copy(Some(64))?;

    let short = short.digest()?;
    let long = long.digest()?;
    assert_eq!(short.len(), 32);
    assert_eq!(long.len(), 64);
    assert_eq!(&long[..32], short.as_ref());

    let mut empty = HashHandle::new("shake128", Some(0))?;
    assert!(empty.digest()?.is_empty());

    assert!(HashHandle::new("sha256", Some(32)).is_ok());
    assert_eq!(
        HashHandle::new("sha256", Some(16)).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );

    Ok(())
}

#[test]
fn test_algorithm_names() -> Result<()> {
    assert_eq!(HashAlgorithm::from_name("SHA256")?, HashAlgorithm::Sha256);
    assert_eq!(HashAlgorithm::from_name("sha-1")?, HashAlgorithm::Sha1);
    assert_eq!(HashAlgorithm::from_name("RSA-SHA512")?, HashAlgorithm::Sha512);
    assert_eq!(
        HashAlgorithm::from_name("sha512-224")?.to_string(),
        "sha512-224"
    );

    assert_eq!(
        HashHandle::new("whirlpool", None).unwrap_err().kind(),
        ErrorKind::UnsupportedAlgorithm
    );
    assert_eq!(
        HmacHandle::new("shake128", b"k").unwrap_err().kind(),
        ErrorKind::UnsupportedAlgorithm
    );

    Ok(())
}
