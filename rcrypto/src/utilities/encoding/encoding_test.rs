use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::*;

pub(crate) fn load_test_vector<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

pub(crate) fn load_fixture<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

#[test]
fn test_colon_hex() {
    assert_eq!(colon_hex(&[0x0a, 0xbc, 0xff]), "0A:BC:FF");
    assert_eq!(colon_hex(&[]), "");
}

#[test]
fn test_base64url_tolerates_padding() -> Result<()> {
    assert_eq!(base64url_encode(b"\xfb\xff"), "-_8");
    assert_eq!(base64url_decode("-_8=")?, b"\xfb\xff");
    assert!(base64url_decode("+/8").is_err());
    Ok(())
}

#[test]
fn test_base64_decode_lenient() -> Result<()> {
    assert_eq!(base64_decode_lenient(b"aGVs\nbG8=\r\n")?, b"hello");
    Ok(())
}

#[test]
fn test_pem_round_trip() -> Result<()> {
    let text = pem_encode("PUBLIC KEY", &[1, 2, 3]);
    assert!(text.starts_with("-----BEGIN PUBLIC KEY-----\n"));
    assert!(is_pem(format!("\n  {}", text).as_bytes()));
    assert!(!is_pem(&[0x30, 0x03, 1, 2, 3]));

    let parsed = pem::parse(text)?;
    assert_eq!(parsed.tag(), "PUBLIC KEY");
    assert_eq!(parsed.contents(), &[1, 2, 3]);
    Ok(())
}
