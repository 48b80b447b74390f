use super::*;
use crate::hash::HashAlgorithm;
use crate::utilities::error::*;

fn hmac_algorithm(length: usize) -> KeyAlgorithm {
    KeyAlgorithm::Hmac {
        hash: HashAlgorithm::Sha256,
        length,
    }
}

#[test]
fn test_secret_key_export() -> Result<()> {
    let key = SecretKeyObjectHandle::new(b"\x00\x01\x02\xfb\xff");
    assert_eq!(key.symmetric_key_size(), 5);

    let buffer = key.export(&SecretKeyExportOptions::default())?;
    assert_eq!(buffer.as_buffer(), Some(&b"\x00\x01\x02\xfb\xff"[..]));

    let jwk = key.export(&SecretKeyExportOptions::new(SecretKeyFormat::Jwk))?;
    let jwk = jwk.as_jwk().ok_or_else(|| Error::Other("expected jwk".to_string()))?;
    assert_eq!(jwk.kty, "oct");
    assert_eq!(jwk.k.as_deref(), Some("AAEC-_8"));
    assert_eq!(jwk.to_json()?, r#"{"kty":"oct","k":"AAEC-_8"}"#);

    let imported = SecretKeyObjectHandle::from_jwk(jwk)?;
    assert_eq!(imported, key);

    Ok(())
}

#[test]
fn test_secret_key_from_jwk_rejects_other_types() {
    let err = SecretKeyObjectHandle::from_jwk(&JsonWebKey::new("RSA")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = SecretKeyObjectHandle::from_jwk(&JsonWebKey::new("oct")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}

#[test]
fn test_secret_key_equals() {
    let a = SecretKeyObjectHandle::new(b"same secret");
    let b = SecretKeyObjectHandle::new(b"same secret");
    let c = SecretKeyObjectHandle::new(b"same secreT");
    let d = SecretKeyObjectHandle::new(b"same secret!");

    assert!(a.equals(&b));
    assert!(!a.equals(&c));
    assert!(!a.equals(&d));
    assert!(SecretKeyObjectHandle::new(b"").equals(&SecretKeyObjectHandle::new(b"")));
}

#[test]
fn test_secret_key_aes_length() -> Result<()> {
    let key =
        SecretKeyObjectHandle::with_algorithm(&[7u8; 16], SecretKeyAlgorithm::Aes { length: 128 })?;
    assert_eq!(key.algorithm(), Some(SecretKeyAlgorithm::Aes { length: 128 }));

    assert!(
        SecretKeyObjectHandle::with_algorithm(&[7u8; 16], SecretKeyAlgorithm::Aes { length: 256 })
            .is_err()
    );
    assert!(
        SecretKeyObjectHandle::with_algorithm(&[7u8; 20], SecretKeyAlgorithm::Aes { length: 160 })
            .is_err()
    );
    Ok(())
}

#[test]
fn test_secret_crypto_key_round_trip() -> Result<()> {
    let key = SecretKeyObjectHandle::new(&[0x42; 32]);
    let crypto_key = key.to_crypto_key(
        hmac_algorithm(256),
        true,
        &[KeyUsage::Sign, KeyUsage::Verify, KeyUsage::Sign],
    )?;

    assert_eq!(crypto_key.key_type(), KeyObjectType::Secret);
    assert_eq!(crypto_key.algorithm().name(), "HMAC");
    assert!(crypto_key.extractable());
    assert_eq!(crypto_key.usages(), &[KeyUsage::Sign, KeyUsage::Verify]);

    let back = SecretKeyObjectHandle::from_crypto_key(&crypto_key)?;
    assert!(back.equals(&key));

    Ok(())
}

#[test]
fn test_secret_crypto_key_usage_checks() {
    let key = SecretKeyObjectHandle::new(&[0x42; 16]);

    let err = key
        .to_crypto_key(hmac_algorithm(128), false, &[KeyUsage::Encrypt])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = key.to_crypto_key(hmac_algorithm(128), false, &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    // longer than the key material
    assert!(key
        .to_crypto_key(hmac_algorithm(256), false, &[KeyUsage::Sign])
        .is_err());

    let aes = KeyAlgorithm::Aes {
        mode: AesMode::Gcm,
        length: 128,
    };
    assert_eq!(aes.name(), "AES-GCM");
    assert!(key
        .to_crypto_key(aes.clone(), false, &[KeyUsage::Encrypt, KeyUsage::Decrypt])
        .is_ok());
    assert!(key.to_crypto_key(aes, false, &[KeyUsage::Sign]).is_err());

    let ecdsa = KeyAlgorithm::Ecdsa {
        named_curve: NamedCurve::P256,
    };
    assert!(key.to_crypto_key(ecdsa, false, &[KeyUsage::Sign]).is_err());
}

#[test]
fn test_secret_crypto_key_keeps_algorithm_tag() -> Result<()> {
    let key = SecretKeyObjectHandle::with_algorithm(
        &[0x42; 32],
        SecretKeyAlgorithm::Hmac {
            hash: HashAlgorithm::Sha256,
        },
    )?;

    let crypto_key = key.to_crypto_key(hmac_algorithm(256), false, &[KeyUsage::Sign])?;
    let back = SecretKeyObjectHandle::from_crypto_key(&crypto_key)?;
    assert_eq!(
        back.algorithm(),
        Some(SecretKeyAlgorithm::Hmac {
            hash: HashAlgorithm::Sha256
        })
    );

    let aes = KeyAlgorithm::Aes {
        mode: AesMode::Gcm,
        length: 256,
    };
    let err = key
        .to_crypto_key(aes.clone(), false, &[KeyUsage::Encrypt])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let sha512 = KeyAlgorithm::Hmac {
        hash: HashAlgorithm::Sha512,
        length: 256,
    };
    assert!(key.to_crypto_key(sha512, false, &[KeyUsage::Sign]).is_err());

    let aes_key =
        SecretKeyObjectHandle::with_algorithm(&[0x42; 32], SecretKeyAlgorithm::Aes { length: 256 })?;
    let aes_token = aes_key.to_crypto_key(aes, false, &[KeyUsage::Encrypt])?;
    assert_eq!(
        SecretKeyObjectHandle::from_crypto_key(&aes_token)?.algorithm(),
        Some(SecretKeyAlgorithm::Aes { length: 256 })
    );
    assert!(aes_key
        .to_crypto_key(hmac_algorithm(256), false, &[KeyUsage::Sign])
        .is_err());

    // untagged keys take any fitting algorithm
    let untagged = SecretKeyObjectHandle::new(&[0x42; 32]);
    assert!(untagged
        .to_crypto_key(hmac_algorithm(256), false, &[KeyUsage::Sign])
        .is_ok());

    Ok(())
}

#[test]
fn test_key_usage_names() -> Result<()> {
    for name in [
        "encrypt",
        "decrypt",
        "sign",
        "verify",
        "deriveKey",
        "deriveBits",
        "wrapKey",
        "unwrapKey",
    ] {
        assert_eq!(KeyUsage::from_name(name)?.as_str(), name);
    }
    assert!(KeyUsage::from_name("derive_key").is_err());
    Ok(())
}

#[test]
fn test_option_names() -> Result<()> {
    assert_eq!(KeyFormat::from_name("jwk")?, KeyFormat::Jwk);
    assert_eq!(KeyEncoding::from_name("sec1")?, KeyEncoding::Sec1);
    assert_eq!(KeyCipher::from_name("AES-256-CBC")?, KeyCipher::Aes256Cbc);

    let err = KeyCipher::from_name("des-ede3-cbc").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    assert!(KeyFormat::from_name("p12").is_err());
    Ok(())
}
