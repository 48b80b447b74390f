use super::*;
use crate::key::{AsymmetricKeyObjectHandle, KeyMaterial};
use crate::utilities::encoding::encoding_test::load_fixture;

// 263 = 2 * 131 + 1
const SMALL_SAFE_PRIME: [u8; 2] = [0x01, 0x07];

#[test]
fn test_group_sessions_agree() -> Result<()> {
    for name in ["modp1", "modp14"] {
        let mut alice = DiffieHellmanHandle::group(name)?;
        let mut bob = DiffieHellmanHandle::group(name)?;
        assert_eq!(alice.get_verify_error(), 0);
        assert_eq!(alice.get_generator(), vec![2]);

        let alice_public = alice.generate_keys()?;
        let bob_public = bob.generate_keys()?;
        assert_ne!(alice_public, bob_public);
        assert_eq!(alice.state(), DhState::KeysSet);

        let alice_secret = alice.compute_secret(&bob_public)?;
        let bob_secret = bob.compute_secret(&alice_public)?;
        assert_eq!(alice_secret, bob_secret);
        assert_eq!(alice_secret.len(), alice.get_prime().len());
        assert_eq!(alice.state(), DhState::SecretComputed);
    }
    Ok(())
}

#[test]
fn test_group_primes() -> Result<()> {
    for (name, bits) in [
        ("modp1", 768),
        ("modp2", 1024),
        ("modp5", 1536),
        ("modp14", 2048),
        ("modp15", 3072),
        ("modp16", 4096),
        ("modp17", 6144),
        ("modp18", 8192),
    ] {
        let prime = groups::modp_group(name)?;
        assert_eq!(prime.bits(), bits, "{}", name);
        // 2^n - 2^(n-64) - 1 + 2^64 * k leaves the low 64 bits set
        assert_eq!(&prime % (BigUint::one() << 64usize), (BigUint::one() << 64usize) - 1u32);
    }

    assert!(check_prime(&groups::modp_group("modp2")?, DEFAULT_PRIME_CHECKS));

    let err = DiffieHellmanHandle::group("modp3").unwrap_err();
    assert!(matches!(err, Error::UnknownGroup(_)));
    assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    Ok(())
}

#[test]
fn test_group_matches_key_object() -> Result<()> {
    let key = AsymmetricKeyObjectHandle::create_private_key(&load_fixture(
        "test-vectors/keys/dh.pem",
    )?)?;
    let KeyMaterial::Dh(dh_key) = key.material() else {
        return Err(Error::Other("expected a dh key".to_string()));
    };

    let mut session = DiffieHellmanHandle::group("modp5")?;
    assert_eq!(session.get_prime(), dh_key.p.to_bytes_be());

    let private = dh_key
        .x
        .as_ref()
        .ok_or_else(|| Error::Other("expected a private value".to_string()))?;
    session.set_private_key(&private.to_bytes_be())?;
    assert_eq!(session.generate_keys()?, dh_key.y.to_bytes_be());
    assert_eq!(session.get_private_key()?, private.to_bytes_be());
    Ok(())
}

#[test]
fn test_compute_secret_requires_keys() -> Result<()> {
    let mut session = DiffieHellmanHandle::group("modp1")?;
    assert_eq!(session.state(), DhState::Uninitialized);

    let err = session.compute_secret(&[2]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(session.get_public_key().is_err());
    assert!(session.get_private_key().is_err());
    Ok(())
}

#[test]
fn test_secret_is_left_padded() -> Result<()> {
    let mut session = DiffieHellmanHandle::new(
        PrimeSource::Prime(SMALL_SAFE_PRIME.to_vec()),
        GeneratorSource::Number(3),
    )?;
    assert_eq!(session.get_verify_error(), 0);

    session.set_private_key(&[1])?;
    assert!(session.get_public_key().is_err());
    assert_eq!(session.compute_secret(&[2])?, vec![0x00, 0x02]);
    assert_eq!(session.generate_keys()?, vec![3]);
    assert_eq!(session.get_public_key()?, vec![3]);
    Ok(())
}

#[test]
fn test_peer_key_range() -> Result<()> {
    let mut session = DiffieHellmanHandle::new(
        PrimeSource::Prime(SMALL_SAFE_PRIME.to_vec()),
        GeneratorSource::Bytes(vec![3]),
    )?;
    session.generate_keys()?;

    // 0, 1, p - 1 and p itself are all rejected
    for peer in [vec![0], vec![1], vec![0x01, 0x06], SMALL_SAFE_PRIME.to_vec()] {
        let err = session.compute_secret(&peer).unwrap_err();
        assert!(matches!(err, Error::InvalidPeerPublicKey), "{:?}", peer);
    }
    assert!(session.compute_secret(&[0x01, 0x05]).is_ok());
    Ok(())
}

#[test]
fn test_verify_error_flags() -> Result<()> {
    let cases: [(&[u8], u32, u32); 4] = [
        (&[15], 2, DH_CHECK_P_NOT_PRIME),
        (&[29], 2, DH_CHECK_P_NOT_SAFE_PRIME),
        (&SMALL_SAFE_PRIME, 262, DH_NOT_SUITABLE_GENERATOR),
        (&[0x01, 0x05], 2, DH_CHECK_P_NOT_PRIME),
    ];
    for (prime, generator, flags) in cases {
        let session = DiffieHellmanHandle::new(
            PrimeSource::Prime(prime.to_vec()),
            GeneratorSource::Number(generator),
        )?;
        assert_eq!(session.get_verify_error(), flags, "{:?}", prime);
    }

    assert!(DiffieHellmanHandle::new(
        PrimeSource::Prime(SMALL_SAFE_PRIME.to_vec()),
        GeneratorSource::Number(1)
    )
    .is_err());
    assert!(DiffieHellmanHandle::new(PrimeSource::Prime(vec![1]), GeneratorSource::default()).is_err());
    Ok(())
}

#[test]
fn test_generated_prime() -> Result<()> {
    let mut alice = DiffieHellmanHandle::new(PrimeSource::Length(64), GeneratorSource::Number(2))?;
    let prime = BigUint::from_bytes_be(&alice.get_prime());
    assert_eq!(prime.bits(), 64);
    assert_eq!(&prime % 24u32, BigUint::from(23u32));
    assert!(check_prime(&(&prime >> 1usize), DEFAULT_PRIME_CHECKS));
    assert_eq!(alice.get_verify_error(), 0);

    let mut bob = DiffieHellmanHandle::new(
        PrimeSource::Prime(alice.get_prime()),
        GeneratorSource::Bytes(alice.get_generator()),
    )?;
    assert_eq!(bob.get_verify_error(), 0);

    let alice_public = alice.generate_keys()?;
    let bob_public = bob.generate_keys()?;
    assert_eq!(
        alice.compute_secret(&bob_public)?,
        bob.compute_secret(&alice_public)?
    );
    Ok(())
}
