use std::time::{Duration, UNIX_EPOCH};

use super::check::host_matches;
use super::*;
use crate::key::AsymmetricKeyType;
use crate::utilities::encoding::encoding_test::load_fixture;

fn load_cert(name: &str) -> Result<X509Certificate> {
    X509Certificate::parse(&load_fixture(format!("test-vectors/certs/{}", name))?)
}

fn load_key(name: &str) -> Result<AsymmetricKeyObjectHandle> {
    AsymmetricKeyObjectHandle::create_private_key(&load_fixture(format!(
        "test-vectors/certs/{}",
        name
    ))?)
}

#[test]
fn test_parse_pem_and_der() -> Result<()> {
    let pem_text = load_fixture("test-vectors/certs/leaf.pem")?;
    let from_pem = X509Certificate::parse(&pem_text)?;
    let from_der = load_cert("leaf.der")?;
    assert_eq!(from_pem, from_der);
    assert_eq!(from_pem.raw(), load_fixture("test-vectors/certs/leaf.der")?);
    assert_eq!(from_pem.pem().as_bytes(), pem_text.as_slice());
    Ok(())
}

#[test]
fn test_parse_rejects_malformed_input() -> Result<()> {
    let der = load_fixture("test-vectors/certs/leaf.der")?;
    let err = X509Certificate::parse(&der[..der.len() / 2]).unwrap_err();
    assert!(matches!(err, Error::MalformedCertificate(_)));
    assert_eq!(err.kind(), ErrorKind::MalformedInput);

    let err = X509Certificate::parse(b"not a certificate").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);

    let err = X509Certificate::parse(&load_fixture("test-vectors/keys/rsa-spki.pem")?).unwrap_err();
    assert!(matches!(err, Error::MalformedCertificate(_)));
    Ok(())
}

#[test]
fn test_leaf_fields() -> Result<()> {
    let leaf = load_cert("leaf.pem")?;
    assert_eq!(
        leaf.subject().as_deref(),
        Some("C=US\nST=California\nO=Example\nCN=leaf.example.net")
    );
    assert_eq!(
        leaf.issuer().as_deref(),
        Some("C=US\nO=Example Trust\nCN=Example Root CA")
    );
    assert_eq!(
        leaf.subject_alt_name()?.as_deref(),
        Some(
            "DNS:*.example.com, DNS:www.example.org, IP Address:127.0.0.1, \
             IP Address:0:0:0:0:0:0:0:1, email:admin@example.com"
        )
    );
    assert_eq!(
        leaf.info_access()?.as_deref(),
        Some("OCSP - URI:http://ocsp.example.com\nCA Issuers - URI:http://ca.example.com/root.crt\n")
    );
    assert_eq!(
        leaf.key_usage()?,
        Some(vec![
            "1.3.6.1.5.5.7.3.1".to_string(),
            "1.3.6.1.5.5.7.3.2".to_string()
        ])
    );
    assert!(!leaf.is_ca()?);
    assert_eq!(leaf.serial_number(), "0A1B2C3D4E5F");

    assert_eq!(leaf.valid_from(), "Jan  2 03:04:05 2024 GMT");
    assert_eq!(leaf.valid_to(), "Dec 31 23:59:59 2049 GMT");
    assert_eq!(
        leaf.valid_from_time(),
        UNIX_EPOCH + Duration::from_secs(1_704_164_645)
    );
    assert_eq!(
        leaf.valid_to_time(),
        UNIX_EPOCH + Duration::from_secs(2_524_607_999)
    );

    assert_eq!(leaf.fingerprint(), "C5:88:F1:0A:ED:23:68:E0:73:F8:74:4C:10:8F:C6:D4:C5:00:BF:1B");
    assert_eq!(
        leaf.fingerprint256(),
        "8E:D0:A0:19:5E:A0:31:09:6B:7F:0A:FC:EE:E6:41:76:DE:4D:68:67:BF:8E:5C:E7:A9:A0:9F:19:25:BA:9F:D5"
    );
    assert_eq!(
        leaf.fingerprint512(),
        "16:9E:1B:A8:37:43:51:6D:EE:75:B2:D2:3E:C7:F7:80:B3:9A:66:46:28:FC:24:42:DF:9A:08:F3:F6:9B:E3:06:\
         AE:37:32:EF:02:55:87:C6:1E:3C:74:0F:BE:E9:80:FE:6A:51:7F:75:B9:5F:15:E3:D3:6D:3C:53:AD:22:CF:AC"
    );

    let key = leaf.public_key()?;
    assert_eq!(key.asymmetric_key_type(), AsymmetricKeyType::Ec);
    assert_eq!(key.key_object_type(), KeyObjectType::Public);
    Ok(())
}

#[test]
fn test_absent_fields() -> Result<()> {
    let plain = load_cert("plain.pem")?;
    assert_eq!(
        plain.subject().as_deref(),
        Some("CN=host.example.com\nemailAddress=Ops@Example.com")
    );
    assert_eq!(plain.subject_alt_name()?, None);
    assert_eq!(plain.info_access()?, None);
    assert_eq!(plain.key_usage()?, None);
    assert!(!plain.is_ca()?);
    assert!(plain.issuer_cert().is_none());
    assert_eq!(plain.serial_number(), "07");
    assert_eq!(plain.public_key()?.asymmetric_key_type(), AsymmetricKeyType::Ed25519);

    let wild = load_cert("wild.pem")?;
    assert_eq!(wild.serial_number(), "FF00");

    let ca = load_cert("ca.pem")?;
    assert!(ca.is_ca()?);
    assert_eq!(ca.serial_number(), "1001");
    Ok(())
}

#[test]
fn test_check_host() -> Result<()> {
    let leaf = load_cert("leaf.pem")?;
    let default = CheckOptions::default();

    assert_eq!(
        leaf.check_host("foo.example.com", &default)?.as_deref(),
        Some("*.example.com")
    );
    assert_eq!(
        leaf.check_host("WWW.Example.org.", &default)?.as_deref(),
        Some("www.example.org")
    );
    assert_eq!(leaf.check_host("example.com", &default)?, None);
    assert_eq!(leaf.check_host("a.b.example.com", &default)?, None);

    let no_wildcards = CheckOptions::builder().with_wildcards(false).build();
    assert_eq!(leaf.check_host("foo.example.com", &no_wildcards)?, None);

    // SAN DNS names hide the common name unless asked for
    assert_eq!(leaf.check_host("leaf.example.net", &default)?, None);
    let always = CheckOptions::builder()
        .with_subject(SubjectCheck::Always)
        .build();
    assert_eq!(
        leaf.check_host("leaf.example.net", &always)?.as_deref(),
        Some("leaf.example.net")
    );

    assert_eq!(
        leaf.check_host(".example.org", &default)?.as_deref(),
        Some("www.example.org")
    );

    let err = leaf.check_host("", &default).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(leaf.check_host("foo\0.example.com", &default).is_err());
    Ok(())
}

#[test]
fn test_check_host_wildcard_options() -> Result<()> {
    let wild = load_cert("wild.pem")?;
    let default = CheckOptions::default();

    assert_eq!(
        wild.check_host("foobar.partial.example.com", &default)?.as_deref(),
        Some("foo*.partial.example.com")
    );
    assert_eq!(wild.check_host("bar.partial.example.com", &default)?, None);
    let no_partial = CheckOptions::builder()
        .with_partial_wildcards(false)
        .build();
    assert_eq!(wild.check_host("foobar.partial.example.com", &no_partial)?, None);

    assert_eq!(
        wild.check_host("a.multi.example.com", &default)?.as_deref(),
        Some("*.multi.example.com")
    );
    assert_eq!(wild.check_host("a.b.multi.example.com", &default)?, None);
    let multi = CheckOptions::builder()
        .with_multi_label_wildcards(true)
        .build();
    assert_eq!(
        wild.check_host("a.b.multi.example.com", &multi)?.as_deref(),
        Some("*.multi.example.com")
    );

    assert_eq!(wild.check_host("wild.example.com", &default)?, None);
    let never = CheckOptions::builder()
        .with_subject(SubjectCheck::Never)
        .build();
    let plain = load_cert("plain.pem")?;
    assert_eq!(
        plain.check_host("HOST.example.com", &default)?.as_deref(),
        Some("host.example.com")
    );
    assert_eq!(plain.check_host("host.example.com", &never)?, None);
    Ok(())
}

#[test]
fn test_host_match_rules() {
    let default = CheckOptions::default();
    assert!(host_matches("*.example.com", "www.example.com", &default));
    assert!(!host_matches("*.example.com", ".example.com", &default));
    // wildcards need two labels after them
    assert!(!host_matches("*.com", "example.com", &default));
    assert!(host_matches("*.com", "*.com", &default));
    assert!(!host_matches("xn--*.example.com", "xn--abc.example.com", &default));
    assert!(!host_matches("a*.example.com", "xn--a.example.com", &default));
    assert!(!host_matches("www.*.example.com", "www.a.example.com", &default));
    assert!(!host_matches("**.example.com", "ab.example.com", &default));

    let single = CheckOptions::builder()
        .with_single_label_subdomains(true)
        .build();
    assert!(host_matches("a.b.example.com", ".example.com", &default));
    assert!(!host_matches("a.b.example.com", ".example.com", &single));
    assert!(host_matches("b.example.com", ".example.com", &single));
}

#[test]
fn test_check_email() -> Result<()> {
    let leaf = load_cert("leaf.pem")?;
    let default = CheckOptions::default();
    assert_eq!(
        leaf.check_email("admin@EXAMPLE.com", &default)?.as_deref(),
        Some("admin@example.com")
    );
    assert_eq!(leaf.check_email("Admin@example.com", &default)?, None);

    let plain = load_cert("plain.pem")?;
    assert_eq!(
        plain.check_email("Ops@example.COM", &default)?.as_deref(),
        Some("Ops@Example.com")
    );
    assert_eq!(plain.check_email("ops@example.com", &default)?, None);
    assert!(plain.check_email("", &default).is_err());
    Ok(())
}

#[test]
fn test_check_ip() -> Result<()> {
    let leaf = load_cert("leaf.pem")?;
    let options = CheckOptions::default();
    assert_eq!(
        leaf.check_ip("127.0.0.1", &options)?.as_deref(),
        Some("127.0.0.1")
    );
    assert_eq!(leaf.check_ip("::1", &options)?.as_deref(), Some("::1"));
    assert_eq!(
        leaf.check_ip("0:0:0:0:0:0:0:1", &options)?.as_deref(),
        Some("0:0:0:0:0:0:0:1")
    );
    assert_eq!(leaf.check_ip("10.0.0.1", &options)?, None);

    // subject and wildcard flags have no bearing on addresses
    let always = CheckOptions::builder()
        .with_subject(SubjectCheck::Always)
        .with_wildcards(false)
        .build();
    assert_eq!(
        leaf.check_ip("127.0.0.1", &always)?.as_deref(),
        Some("127.0.0.1")
    );
    assert_eq!(leaf.check_ip("10.0.0.1", &always)?, None);

    let err = leaf.check_ip("localhost", &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    Ok(())
}

#[test]
fn test_verify_and_check_issued() -> Result<()> {
    let ca = load_cert("ca.pem")?;
    let leaf = load_cert("leaf.pem")?;

    assert!(leaf.verify(&ca.public_key()?)?);
    assert!(!leaf.verify(&leaf.public_key()?)?);
    assert!(ca.verify(&ca.public_key()?)?);
    // a private key verifies through its public half
    assert!(ca.verify(&load_key("ca-key.pem")?)?);

    assert!(ca.check_issued(&leaf));
    assert!(ca.check_issued(&ca));
    assert!(!leaf.check_issued(&leaf));
    assert!(!leaf.check_issued(&ca));

    for name in ["wild.pem", "plain.pem"] {
        let cert = load_cert(name)?;
        assert!(cert.verify(&cert.public_key()?)?, "{}", name);
        assert!(cert.check_issued(&cert), "{}", name);
        assert!(!ca.check_issued(&cert), "{}", name);
    }
    Ok(())
}

#[test]
fn test_check_private_key() -> Result<()> {
    let leaf = load_cert("leaf.pem")?;
    assert!(leaf.check_private_key(&load_key("leaf-key.pem")?)?);
    assert!(!leaf.check_private_key(&load_key("ca-key.pem")?)?);

    let plain = load_cert("plain.pem")?;
    assert!(plain.check_private_key(&load_key("plain-key.pem")?)?);

    let err = leaf.check_private_key(&leaf.public_key()?).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    Ok(())
}

#[test]
fn test_issuer_chain() -> Result<()> {
    let ca = load_cert("ca.pem")?;
    let leaf = load_cert("leaf.pem")?.with_issuer_cert(ca.clone());
    assert_eq!(leaf.issuer_cert(), Some(&ca));

    let chain = leaf.chain()?;
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[1].subject(), ca.subject());

    let mut deep = ca.clone();
    for _ in 0..MAX_CHAIN_DEPTH {
        deep = leaf.clone().with_issuer_cert(deep);
    }
    let err = deep.chain().unwrap_err();
    assert!(matches!(err, Error::ChainTooDeep(MAX_CHAIN_DEPTH)));
    assert_eq!(err.kind(), ErrorKind::ResourceLimit);
    Ok(())
}

#[test]
fn test_legacy_object() -> Result<()> {
    let leaf = load_cert("leaf.pem")?;
    let object = leaf.to_legacy_object()?;
    assert_eq!(
        object["subject"],
        json!({"C": "US", "ST": "California", "O": "Example", "CN": "leaf.example.net"})
    );
    assert_eq!(object["issuer"]["CN"], json!("Example Root CA"));
    assert_eq!(
        object["infoAccess"],
        json!({
            "OCSP - URI": ["http://ocsp.example.com"],
            "CA Issuers - URI": ["http://ca.example.com/root.crt"],
        })
    );
    assert_eq!(object["ca"], json!(false));
    assert_eq!(object["bits"], json!(256));
    assert_eq!(object["asn1Curve"], json!("prime256v1"));
    assert_eq!(object["nistCurve"], json!("P-256"));
    assert_eq!(object["serialNumber"], json!("0A1B2C3D4E5F"));
    assert_eq!(object["valid_to"], json!("Dec 31 23:59:59 2049 GMT"));
    assert_eq!(object["fingerprint256"], json!(leaf.fingerprint256()));
    assert_eq!(object["ext_key_usage"][0], json!("1.3.6.1.5.5.7.3.1"));
    assert_eq!(object["raw"], json!(base64_encode(leaf.raw())));
    assert!(object.get("modulus").is_none());

    let ca = load_cert("ca.pem")?.to_legacy_object()?;
    assert_eq!(ca["ca"], json!(true));
    assert_eq!(ca["bits"], json!(2048));
    assert_eq!(ca["exponent"], json!("0x10001"));
    assert_eq!(ca["modulus"].as_str().map(str::len), Some(512));
    assert!(ca.get("subjectaltname").is_none());
    Ok(())
}
