//! Parsed X.509 certificates: field accessors, name matching, issuer checks
//! and signature verification.

#[cfg(test)]
mod x509_test;

mod check;
mod name;
pub(crate) mod verify;

pub use self::check::{CheckOptions, CheckOptionsBuilder, SubjectCheck};

use bytes::Bytes;
use der::asn1::ObjectIdentifier;
use der::oid::AssociatedOid;
use der::{Decode, DecodeOwned, Encode};
use rsa::traits::PublicKeyParts;
use serde_json::{json, Map, Value};
use std::time::SystemTime;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::{
    AuthorityInfoAccessSyntax, AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage,
    KeyUsage, KeyUsages, SubjectAltName, SubjectKeyIdentifier,
};
use x509_cert::Certificate;

use self::check::{email_matches, host_matches, ip_octets, parse_ip, validate_query};
use self::name::{
    attribute_values, format_general_name, format_name, format_time, name_object, COMMON_NAME,
    EMAIL_ADDRESS,
};
use self::verify::SignatureAlgorithm;
use crate::hash::HashAlgorithm;
use crate::key::{AsymmetricKeyObjectHandle, KeyMaterial, KeyObjectType};
use crate::utilities::encoding::{base64_encode, colon_hex, is_pem, pem_encode};
use crate::utilities::error::*;

/// Longest issuer chain `chain` will walk.
pub const MAX_CHAIN_DEPTH: usize = 32;

const OCSP: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.1");
const CA_ISSUERS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.2");

fn access_method_name(oid: &ObjectIdentifier) -> String {
    if *oid == OCSP {
        "OCSP".to_string()
    } else if *oid == CA_ISSUERS {
        "CA Issuers".to_string()
    } else {
        oid.to_string()
    }
}

/// An immutable parsed certificate, optionally linked to the certificate
/// that issued it.
#[derive(Debug, Clone)]
pub struct X509Certificate {
    raw: Bytes,
    certificate: Certificate,
    issuer_cert: Option<Box<X509Certificate>>,
}

impl PartialEq for X509Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl X509Certificate {
    /// Parses a PEM `CERTIFICATE` block or raw DER.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let der = if is_pem(data) {
            let block = pem::parse(data)?;
            if block.tag() != "CERTIFICATE" {
                return Err(Error::MalformedCertificate(format!(
                    "unexpected PEM label {}",
                    block.tag()
                )));
            }
            block.into_contents()
        } else {
            data.to_vec()
        };

        let certificate = Certificate::from_der(&der)
            .map_err(|err| Error::MalformedCertificate(err.to_string()))?;
        log::debug!(
            "parsed certificate with serial {}",
            hex::encode(certificate.tbs_certificate.serial_number.as_bytes())
        );
        Ok(Self {
            raw: Bytes::from(der),
            certificate,
            issuer_cert: None,
        })
    }

    fn extension<T: AssociatedOid + DecodeOwned>(&self) -> Result<Option<T>> {
        let Some(extensions) = &self.certificate.tbs_certificate.extensions else {
            return Ok(None);
        };
        match extensions.iter().find(|ext| ext.extn_id == T::OID) {
            Some(ext) => {
                let value = T::from_der(ext.extn_value.as_bytes())
                    .map_err(|err| Error::MalformedCertificate(err.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn general_names(&self) -> Result<Vec<GeneralName>> {
        Ok(self
            .extension::<SubjectAltName>()?
            .map(|san| san.0)
            .unwrap_or_default())
    }

    pub fn subject(&self) -> Option<String> {
        format_name(&self.certificate.tbs_certificate.subject)
    }

    pub fn issuer(&self) -> Option<String> {
        format_name(&self.certificate.tbs_certificate.issuer)
    }

    /// Subject alternative names as `DNS:a, IP Address:b, ...`.
    pub fn subject_alt_name(&self) -> Result<Option<String>> {
        let names = self.general_names()?;
        if names.is_empty() {
            return Ok(None);
        }
        let names: Vec<String> = names.iter().map(format_general_name).collect();
        Ok(Some(names.join(", ")))
    }

    /// Authority information access, one `method - name` line per entry.
    pub fn info_access(&self) -> Result<Option<String>> {
        let Some(access) = self.extension::<AuthorityInfoAccessSyntax>()? else {
            return Ok(None);
        };
        let mut text = String::new();
        for description in &access.0 {
            text.push_str(&format!(
                "{} - {}\n",
                access_method_name(&description.access_method),
                format_general_name(&description.access_location)
            ));
        }
        Ok(Some(text))
    }

    pub fn issuer_cert(&self) -> Option<&X509Certificate> {
        self.issuer_cert.as_deref()
    }

    pub fn with_issuer_cert(mut self, issuer: X509Certificate) -> Self {
        self.issuer_cert = Some(Box::new(issuer));
        self
    }

    /// This certificate followed by its linked issuers.
    pub fn chain(&self) -> Result<Vec<&X509Certificate>> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(issuer) = current.issuer_cert() {
            if chain.len() >= MAX_CHAIN_DEPTH {
                return Err(Error::ChainTooDeep(MAX_CHAIN_DEPTH));
            }
            chain.push(issuer);
            current = issuer;
        }
        Ok(chain)
    }

    pub fn valid_from(&self) -> String {
        format_time(&self.certificate.tbs_certificate.validity.not_before)
    }

    pub fn valid_to(&self) -> String {
        format_time(&self.certificate.tbs_certificate.validity.not_after)
    }

    pub fn valid_from_time(&self) -> SystemTime {
        self.certificate
            .tbs_certificate
            .validity
            .not_before
            .to_system_time()
    }

    pub fn valid_to_time(&self) -> SystemTime {
        self.certificate
            .tbs_certificate
            .validity
            .not_after
            .to_system_time()
    }

    pub fn fingerprint(&self) -> String {
        colon_hex(&HashAlgorithm::Sha1.digest(&self.raw))
    }

    pub fn fingerprint256(&self) -> String {
        colon_hex(&HashAlgorithm::Sha256.digest(&self.raw))
    }

    pub fn fingerprint512(&self) -> String {
        colon_hex(&HashAlgorithm::Sha512.digest(&self.raw))
    }

    /// Extended key usage OIDs in dotted form.
    pub fn key_usage(&self) -> Result<Option<Vec<String>>> {
        Ok(self
            .extension::<ExtendedKeyUsage>()?
            .map(|usage| usage.0.iter().map(ToString::to_string).collect()))
    }

    pub fn serial_number(&self) -> String {
        let bytes = self.certificate.tbs_certificate.serial_number.as_bytes();
        let start = bytes
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(bytes.len().saturating_sub(1));
        hex::encode_upper(&bytes[start..])
    }

    pub fn pem(&self) -> String {
        pem_encode("CERTIFICATE", &self.raw)
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn public_key(&self) -> Result<AsymmetricKeyObjectHandle> {
        let spki = self
            .certificate
            .tbs_certificate
            .subject_public_key_info
            .to_der()?;
        Ok(AsymmetricKeyObjectHandle::from_material(
            KeyMaterial::from_spki_der(&spki)?,
        ))
    }

    pub fn is_ca(&self) -> Result<bool> {
        Ok(self
            .extension::<BasicConstraints>()?
            .map(|constraints| constraints.ca)
            .unwrap_or(false))
    }

    fn consult_subject(&self, options: &CheckOptions, has_san: bool) -> bool {
        match options.subject {
            SubjectCheck::Default => !has_san,
            SubjectCheck::Always => true,
            SubjectCheck::Never => false,
        }
    }

    /// The certificate name matching `host`, if any.
    pub fn check_host(&self, host: &str, options: &CheckOptions) -> Result<Option<String>> {
        validate_query("host name", host)?;
        let dns_names: Vec<String> = self
            .general_names()?
            .iter()
            .filter_map(|name| match name {
                GeneralName::DnsName(dns) => Some(dns.to_string()),
                _ => None,
            })
            .collect();
        if let Some(name) = dns_names
            .iter()
            .find(|name| host_matches(name, host, options))
        {
            return Ok(Some(name.clone()));
        }

        if self.consult_subject(options, !dns_names.is_empty()) {
            let subject = &self.certificate.tbs_certificate.subject;
            if let Some(name) = attribute_values(subject, &COMMON_NAME)
                .into_iter()
                .find(|name| host_matches(name, host, options))
            {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }

    pub fn check_email(&self, email: &str, options: &CheckOptions) -> Result<Option<String>> {
        validate_query("email address", email)?;
        let emails: Vec<String> = self
            .general_names()?
            .iter()
            .filter_map(|name| match name {
                GeneralName::Rfc822Name(email) => Some(email.to_string()),
                _ => None,
            })
            .collect();
        if let Some(name) = emails.iter().find(|name| email_matches(name, email)) {
            return Ok(Some(name.clone()));
        }

        if self.consult_subject(options, !emails.is_empty()) {
            let subject = &self.certificate.tbs_certificate.subject;
            if let Some(name) = attribute_values(subject, &EMAIL_ADDRESS)
                .into_iter()
                .find(|name| email_matches(name, email))
            {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }

    /// Matches iPAddress alternative names only. The subject is never
    /// consulted for addresses, so none of `_options` applies.
    pub fn check_ip(&self, ip: &str, _options: &CheckOptions) -> Result<Option<String>> {
        validate_query("IP address", ip)?;
        let octets = ip_octets(&parse_ip(ip)?);
        let matched = self.general_names()?.iter().any(|name| match name {
            GeneralName::IpAddress(address) => address.as_bytes() == octets.as_slice(),
            _ => false,
        });
        Ok(matched.then(|| ip.to_string()))
    }

    /// Whether this certificate issued `other`.
    pub fn check_issued(&self, other: &X509Certificate) -> bool {
        let subject = &self.certificate.tbs_certificate.subject;
        if other.certificate.tbs_certificate.issuer != *subject {
            log::debug!("issuer name does not match subject");
            return false;
        }

        if let (Ok(Some(authority)), Ok(Some(subject_key))) = (
            other.extension::<AuthorityKeyIdentifier>(),
            self.extension::<SubjectKeyIdentifier>(),
        ) {
            if let Some(key_id) = &authority.key_identifier {
                if key_id.as_bytes() != subject_key.0.as_bytes() {
                    log::debug!("authority key identifier does not match");
                    return false;
                }
            }
        }

        match self.extension::<KeyUsage>() {
            Ok(Some(usage)) if !usage.0.contains(KeyUsages::KeyCertSign) => {
                log::debug!("issuer key usage does not allow certificate signing");
                return false;
            }
            Err(_) => return false,
            _ => {}
        }

        match self.public_key() {
            Ok(key) => other.verify(&key).unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Checks the certificate signature with `key`. A wrong key or a bad
    /// signature is `Ok(false)`.
    pub fn verify(&self, key: &AsymmetricKeyObjectHandle) -> Result<bool> {
        let algorithm =
            SignatureAlgorithm::from_algorithm_identifier(&self.certificate.signature_algorithm)?;
        let tbs = self.certificate.tbs_certificate.to_der()?;
        let signature = self.certificate.signature.as_bytes().ok_or_else(|| {
            Error::MalformedCertificate("signature has unused bits".to_string())
        })?;
        algorithm.verify(key.material(), &tbs, signature)
    }

    /// Whether `key` is the private half of the certificate's key.
    pub fn check_private_key(&self, key: &AsymmetricKeyObjectHandle) -> Result<bool> {
        if key.key_object_type() != KeyObjectType::Private {
            return Err(Error::InvalidArgument(
                "check_private_key requires a private key".to_string(),
            ));
        }
        Ok(key.public_key().equals(&self.public_key()?))
    }

    /// The certificate as a flat JSON object with the classic field names.
    pub fn to_legacy_object(&self) -> Result<Value> {
        let tbs = &self.certificate.tbs_certificate;
        let mut object = Map::new();
        object.insert("subject".to_string(), name_object(&tbs.subject));
        object.insert("issuer".to_string(), name_object(&tbs.issuer));
        if let Some(names) = self.subject_alt_name()? {
            object.insert("subjectaltname".to_string(), Value::String(names));
        }
        if let Some(access) = self.extension::<AuthorityInfoAccessSyntax>()? {
            let mut entries = Map::new();
            for description in &access.0 {
                let text = format_general_name(&description.access_location);
                let (kind, value) = text.split_once(':').unwrap_or(("", text.as_str()));
                let key = format!(
                    "{} - {}",
                    access_method_name(&description.access_method),
                    kind
                );
                match entries.get_mut(&key) {
                    Some(Value::Array(values)) => values.push(json!(value)),
                    _ => {
                        entries.insert(key, json!([value]));
                    }
                }
            }
            object.insert("infoAccess".to_string(), Value::Object(entries));
        }
        object.insert("ca".to_string(), Value::Bool(self.is_ca()?));

        let key = self.public_key()?;
        match key.material() {
            KeyMaterial::Rsa(rsa) | KeyMaterial::RsaPss(rsa, _) => {
                let public = rsa.public_key();
                object.insert(
                    "modulus".to_string(),
                    json!(hex::encode_upper(public.n().to_bytes_be())),
                );
                object.insert("bits".to_string(), json!(public.n().bits()));
                object.insert("exponent".to_string(), json!(format!("0x{:x}", public.e())));
                object.insert(
                    "pubkey".to_string(),
                    json!(base64_encode(&key.material().to_spki_der()?)),
                );
            }
            KeyMaterial::Ec(ec) => {
                let curve = ec.curve();
                object.insert("bits".to_string(), json!(curve.field_size() * 8));
                object.insert("pubkey".to_string(), json!(base64_encode(&ec.public_point())));
                object.insert("asn1Curve".to_string(), json!(curve.name()));
                object.insert("nistCurve".to_string(), json!(curve.jwk_name()));
            }
            _ => {}
        }

        object.insert("valid_from".to_string(), json!(self.valid_from()));
        object.insert("valid_to".to_string(), json!(self.valid_to()));
        object.insert("fingerprint".to_string(), json!(self.fingerprint()));
        object.insert("fingerprint256".to_string(), json!(self.fingerprint256()));
        object.insert("fingerprint512".to_string(), json!(self.fingerprint512()));
        if let Some(usage) = self.key_usage()? {
            object.insert("ext_key_usage".to_string(), json!(usage));
        }
        object.insert("serialNumber".to_string(), json!(self.serial_number()));
        object.insert("raw".to_string(), json!(base64_encode(&self.raw)));
        Ok(Value::Object(object))
    }
}
