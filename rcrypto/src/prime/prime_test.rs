use super::*;

#[test]
fn test_check_prime_sync() {
    assert!(check_prime_sync(&[0x07], 0));
    assert!(check_prime_sync(&[0x00, 0x65], 10)); // 101
    assert!(!check_prime_sync(&[0x64], 10)); // 100
    assert!(!check_prime_sync(&[], 10));
    assert!(!check_prime_sync(&[0x01], 10));

    // 2^127 - 1
    let mut m127 = vec![0xffu8; 16];
    m127[0] = 0x7f;
    assert!(check_prime_sync(&m127, 20));

    // 2^127 + 1 is divisible by 3
    let mut f = vec![0u8; 16];
    f[0] = 0x80;
    f[15] = 0x01;
    assert!(!check_prime_sync(&f, 20));
}

#[test]
fn test_random_prime_size() -> Result<()> {
    for bits in [2usize, 7, 16, 64, 127] {
        let p = BigUint::from_bytes_be(&random_prime(bits, false, None, None)?);
        assert_eq!(p.bits(), bits);
        assert!(check_prime(&p, DEFAULT_PRIME_CHECKS));
    }
    Ok(())
}

#[test]
fn test_random_safe_prime() -> Result<()> {
    for bits in [5usize, 12, 64] {
        let p = generate_prime(bits, true, None, None)?;
        assert_eq!(p.bits(), bits);
        assert!(check_prime(&p, DEFAULT_PRIME_CHECKS));
        assert!(check_prime(&(&p >> 1usize), DEFAULT_PRIME_CHECKS));
    }
    Ok(())
}

#[test]
fn test_random_prime_with_add_rem() -> Result<()> {
    let add = BigUint::from(12u32);
    let rem = BigUint::from(11u32);
    let p = generate_prime(48, false, Some(&add), Some(&rem))?;
    assert_eq!(&p % &add, rem);

    let p = generate_prime(32, false, Some(&add), None)?;
    assert!((&p % &add).is_one());
    Ok(())
}

#[test]
fn test_random_prime_rejects_bad_options() {
    let kind = |r: Result<Vec<u8>>| r.unwrap_err().kind();

    assert_eq!(kind(random_prime(1, false, None, None)), ErrorKind::InvalidArgument);
    assert_eq!(kind(random_prime(2, true, None, None)), ErrorKind::InvalidArgument);
    assert_eq!(
        kind(random_prime(16, false, None, Some(&[1]))),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        kind(random_prime(16, false, Some(&[0x0c]), Some(&[0x0c]))),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        kind(random_prime(16, false, Some(&[0x0c]), Some(&[0x04]))),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        kind(random_prime(8, false, Some(&[0x01, 0x00]), None)),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn test_random_prime_freshness() -> Result<()> {
    let a = random_prime(128, false, None, None)?;
    let b = random_prime(128, false, None, None)?;
    assert_ne!(a, b);
    Ok(())
}
