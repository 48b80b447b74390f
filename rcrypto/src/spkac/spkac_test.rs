use super::*;
use crate::utilities::encoding::encoding_test::load_fixture;

fn load_spkac() -> Result<Vec<u8>> {
    load_fixture("test-vectors/spkac.txt")
}

#[test]
fn test_verify_spkac() -> Result<()> {
    let spkac = load_spkac()?;
    assert!(verify_spkac(&spkac));

    let der = base64_decode_lenient(&spkac)?;
    assert!(verify_spkac(&der));

    // last byte of the signature
    let mut tampered = der.clone();
    if let Some(last) = tampered.last_mut() {
        *last ^= 0x01;
    }
    assert!(!verify_spkac(&tampered));

    assert!(!verify_spkac(b""));
    assert!(!verify_spkac(b"not base64 at all!"));
    assert!(!verify_spkac(&der[..der.len() / 2]));
    Ok(())
}

#[test]
fn test_export_challenge() -> Result<()> {
    let spkac = load_spkac()?;
    assert_eq!(export_challenge(&spkac), Some(b"hello-challenge".to_vec()));
    assert_eq!(export_challenge(b"AAAA"), None);
    Ok(())
}

#[test]
fn test_export_public_key() -> Result<()> {
    let spkac = load_spkac()?;
    let exported = export_public_key(&spkac);
    assert_eq!(exported, Some(load_fixture("test-vectors/keys/rsa-spki.pem")?));

    let key = crate::key::AsymmetricKeyObjectHandle::create_public_key(
        &exported.unwrap_or_default(),
    )?;
    let private = crate::key::AsymmetricKeyObjectHandle::create_private_key(&load_fixture(
        "test-vectors/keys/rsa-pkcs1.pem",
    )?)?;
    assert!(key.equals(&private.public_key()));

    assert_eq!(export_public_key(b""), None);
    Ok(())
}
