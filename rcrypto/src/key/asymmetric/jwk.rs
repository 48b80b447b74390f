use ed25519_dalek::{SigningKey, VerifyingKey};
use num_bigint_dig::BigUint;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{RsaPrivateKey, RsaPublicKey};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

use super::material::{EcKey, Ed25519Key, KeyMaterial, RsaKey, X25519Key};
use crate::key::{JsonWebKey, NamedCurve};
use crate::utilities::encoding::{base64url_decode, base64url_encode};
use crate::utilities::error::*;

fn encode_uint(n: &BigUint) -> String {
    base64url_encode(&n.to_bytes_be())
}

fn member<'a>(jwk: &'a JsonWebKey, value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| Error::MalformedKey(format!("{} JWK without {}", jwk.kty, name)))
}

fn decode_uint(jwk: &JsonWebKey, value: &Option<String>, name: &str) -> Result<BigUint> {
    Ok(BigUint::from_bytes_be(&base64url_decode(member(jwk, value, name)?)?))
}

fn decode_32(
    jwk: &JsonWebKey,
    value: &Option<String>,
    name: &str,
) -> Result<Zeroizing<[u8; 32]>> {
    let bytes = Zeroizing::new(base64url_decode(member(jwk, value, name)?)?);
    let array = <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| Error::MalformedKey(format!("JWK member {} must be 32 bytes", name)))?;
    Ok(Zeroizing::new(array))
}

impl KeyMaterial {
    pub(crate) fn to_jwk(&self) -> Result<JsonWebKey> {
        match self {
            KeyMaterial::Rsa(key) => rsa_to_jwk(key),
            KeyMaterial::Ec(key) => {
                let mut jwk = JsonWebKey::new("EC");
                let curve = key.curve();
                let point = key.public_point();
                let size = curve.field_size();
                if point.len() != 1 + 2 * size {
                    return Err(Error::MalformedKey("unexpected EC point size".to_string()));
                }
                jwk.crv = Some(curve.jwk_name().to_string());
                jwk.x = Some(base64url_encode(&point[1..1 + size]));
                jwk.y = Some(base64url_encode(&point[1 + size..]));
                jwk.d = key.secret_scalar().map(|d| base64url_encode(&d));
                Ok(jwk)
            }
            KeyMaterial::Ed25519(key) => {
                let mut jwk = JsonWebKey::new("OKP");
                jwk.crv = Some("Ed25519".to_string());
                jwk.x = Some(base64url_encode(key.verifying_key().as_bytes()));
                if let Ed25519Key::Private(key) = key {
                    jwk.d = Some(base64url_encode(&Zeroizing::new(key.to_bytes())[..]));
                }
                Ok(jwk)
            }
            KeyMaterial::X25519(key) => {
                let mut jwk = JsonWebKey::new("OKP");
                jwk.crv = Some("X25519".to_string());
                jwk.x = Some(base64url_encode(key.public_key().as_bytes()));
                if let X25519Key::Private(secret) = key {
                    jwk.d = Some(base64url_encode(&Zeroizing::new(secret.to_bytes())[..]));
                }
                Ok(jwk)
            }
            KeyMaterial::RsaPss(..) | KeyMaterial::Dsa(_) | KeyMaterial::Dh(_) => {
                Err(Error::IncompatibleKeyFormat(format!(
                    "jwk is not available for {} keys",
                    self.key_type()
                )))
            }
        }
    }

    pub(crate) fn from_jwk(jwk: &JsonWebKey) -> Result<Self> {
        match jwk.kty.as_str() {
            "RSA" => rsa_from_jwk(jwk),
            "EC" => {
                let curve = NamedCurve::from_name(member(jwk, &jwk.crv, "crv")?)?;
                let x = base64url_decode(member(jwk, &jwk.x, "x")?)?;
                let y = base64url_decode(member(jwk, &jwk.y, "y")?)?;
                let size = curve.field_size();
                if x.len() != size || y.len() != size {
                    return Err(Error::MalformedKey(format!(
                        "EC JWK coordinates must be {} bytes",
                        size
                    )));
                }
                let mut point = Vec::with_capacity(1 + 2 * size);
                point.push(0x04);
                point.extend_from_slice(&x);
                point.extend_from_slice(&y);
                let public = EcKey::from_public_point(curve, &point)?;

                match &jwk.d {
                    Some(d) => {
                        let d = Zeroizing::new(base64url_decode(d)?);
                        let private = EcKey::from_secret_scalar(curve, &d)?;
                        if private.public_point() != public.public_point() {
                            return Err(Error::MalformedKey(
                                "EC JWK private key does not match x and y".to_string(),
                            ));
                        }
                        Ok(KeyMaterial::Ec(private))
                    }
                    None => Ok(KeyMaterial::Ec(public)),
                }
            }
            "OKP" => match member(jwk, &jwk.crv, "crv")? {
                "Ed25519" => {
                    let x = decode_32(jwk, &jwk.x, "x")?;
                    let public = VerifyingKey::from_bytes(&x)?;
                    match jwk.d {
                        Some(_) => {
                            let private = SigningKey::from_bytes(&*decode_32(jwk, &jwk.d, "d")?);
                            if private.verifying_key() != public {
                                return Err(Error::MalformedKey(
                                    "Ed25519 JWK private key does not match x".to_string(),
                                ));
                            }
                            Ok(KeyMaterial::Ed25519(Ed25519Key::Private(private)))
                        }
                        None => Ok(KeyMaterial::Ed25519(Ed25519Key::Public(public))),
                    }
                }
                "X25519" => {
                    let public = X25519PublicKey::from(*decode_32(jwk, &jwk.x, "x")?);
                    match jwk.d {
                        Some(_) => {
                            let secret = StaticSecret::from(*decode_32(jwk, &jwk.d, "d")?);
                            if X25519PublicKey::from(&secret) != public {
                                return Err(Error::MalformedKey(
                                    "X25519 JWK private key does not match x".to_string(),
                                ));
                            }
                            Ok(KeyMaterial::X25519(X25519Key::Private(secret)))
                        }
                        None => Ok(KeyMaterial::X25519(X25519Key::Public(public))),
                    }
                }
                crv => Err(Error::UnsupportedCurve(crv.to_string())),
            },
            kty => Err(Error::UnsupportedKeyType(kty.to_string())),
        }
    }
}

fn rsa_to_jwk(key: &RsaKey) -> Result<JsonWebKey> {
    let mut jwk = JsonWebKey::new("RSA");
    let public = key.public_key();
    jwk.n = Some(encode_uint(public.n()));
    jwk.e = Some(encode_uint(public.e()));

    if let RsaKey::Private(key) = key {
        let primes = key.primes();
        if primes.len() != 2 {
            return Err(Error::IncompatibleKeyFormat(
                "jwk export of multi-prime RSA keys".to_string(),
            ));
        }
        let (p, q) = (&primes[0], &primes[1]);
        let qi = key
            .crt_coefficient()
            .ok_or_else(|| Error::MalformedKey("RSA key without CRT coefficient".to_string()))?;
        jwk.d = Some(encode_uint(key.d()));
        jwk.p = Some(encode_uint(p));
        jwk.q = Some(encode_uint(q));
        jwk.dp = Some(encode_uint(&(key.d() % (p - 1u8))));
        jwk.dq = Some(encode_uint(&(key.d() % (q - 1u8))));
        jwk.qi = Some(encode_uint(&qi));
    }
    Ok(jwk)
}

fn rsa_from_jwk(jwk: &JsonWebKey) -> Result<KeyMaterial> {
    let n = decode_uint(jwk, &jwk.n, "n")?;
    let e = decode_uint(jwk, &jwk.e, "e")?;
    if jwk.d.is_none() {
        return Ok(KeyMaterial::Rsa(RsaKey::Public(RsaPublicKey::new(n, e)?)));
    }

    let d = decode_uint(jwk, &jwk.d, "d")?;
    let mut primes = Vec::new();
    if jwk.p.is_some() || jwk.q.is_some() {
        primes.push(decode_uint(jwk, &jwk.p, "p")?);
        primes.push(decode_uint(jwk, &jwk.q, "q")?);
        for other in jwk.oth.iter().flatten() {
            primes.push(BigUint::from_bytes_be(&base64url_decode(&other.r)?));
        }
    }
    let key = RsaPrivateKey::from_components(n, e, d, primes)?;
    key.validate()?;
    Ok(KeyMaterial::Rsa(RsaKey::Private(key)))
}
