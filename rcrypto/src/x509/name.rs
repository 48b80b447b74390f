//! Text renderings of names, general names and times in the forms OpenSSL
//! prints them.

use der::asn1::ObjectIdentifier;
use der::{Any, Tag, Tagged};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::net::{Ipv4Addr, Ipv6Addr};
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::name::Name;
use x509_cert::time::Time;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub(crate) const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
pub(crate) const EMAIL_ADDRESS: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");

const SHORT_NAMES: [(&str, &str); 17] = [
    ("2.5.4.3", "CN"),
    ("2.5.4.4", "SN"),
    ("2.5.4.5", "serialNumber"),
    ("2.5.4.6", "C"),
    ("2.5.4.7", "L"),
    ("2.5.4.8", "ST"),
    ("2.5.4.9", "street"),
    ("2.5.4.10", "O"),
    ("2.5.4.11", "OU"),
    ("2.5.4.12", "title"),
    ("2.5.4.42", "GN"),
    ("2.5.4.43", "initials"),
    ("2.5.4.46", "dnQualifier"),
    ("2.5.4.65", "pseudonym"),
    ("1.2.840.113549.1.9.1", "emailAddress"),
    ("0.9.2342.19200300.100.1.1", "UID"),
    ("0.9.2342.19200300.100.1.25", "DC"),
];

/// OpenSSL short name of an attribute type, or its dotted form.
pub(crate) fn attribute_name(oid: &ObjectIdentifier) -> Cow<'static, str> {
    let dotted = oid.to_string();
    SHORT_NAMES
        .iter()
        .find(|(known, _)| *known == dotted)
        .map(|(_, short)| Cow::Borrowed(*short))
        .unwrap_or(Cow::Owned(dotted))
}

/// Decoded attribute value. Non-string values render as `#` plus the hex
/// of their DER, as in RFC 4514.
pub(crate) fn attribute_value(value: &Any) -> String {
    match value.tag() {
        Tag::Utf8String
        | Tag::PrintableString
        | Tag::TeletexString
        | Tag::Ia5String
        | Tag::VisibleString
        | Tag::NumericString => String::from_utf8_lossy(value.value()).into_owned(),
        Tag::BmpString => {
            let units: Vec<u16> = value
                .value()
                .chunks(2)
                .map(|pair| u16::from_be_bytes([pair[0], *pair.get(1).unwrap_or(&0)]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => match der::Encode::to_der(value) {
            Ok(der) => format!("#{}", hex::encode(der)),
            Err(_) => String::new(),
        },
    }
}

/// Attribute values of `oid` in `name`, in certificate order.
pub(crate) fn attribute_values(name: &Name, oid: &ObjectIdentifier) -> Vec<String> {
    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .filter(|atv| atv.oid == *oid)
        .map(|atv| attribute_value(&atv.value))
        .collect()
}

/// One `type=value` line per RDN. Multi-valued RDNs join with `+`.
pub(crate) fn format_name(name: &Name) -> Option<String> {
    if name.0.is_empty() {
        return None;
    }
    let lines: Vec<String> = name
        .0
        .iter()
        .map(|rdn| {
            rdn.0
                .iter()
                .map(|atv| format!("{}={}", attribute_name(&atv.oid), attribute_value(&atv.value)))
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect();
    Some(lines.join("\n"))
}

/// `/type=value/...` rendering used inside general names.
fn format_name_oneline(name: &Name) -> String {
    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .map(|atv| format!("/{}={}", attribute_name(&atv.oid), attribute_value(&atv.value)))
        .collect()
}

/// Object keyed by short name; repeated attributes collect into an array.
pub(crate) fn name_object(name: &Name) -> Value {
    let mut object = Map::new();
    for atv in name.0.iter().flat_map(|rdn| rdn.0.iter()) {
        let key = attribute_name(&atv.oid).into_owned();
        let value = Value::String(attribute_value(&atv.value));
        match object.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                object.insert(key, value);
            }
        }
    }
    Value::Object(object)
}

pub(crate) fn format_ip(octets: &[u8]) -> Option<String> {
    if let Ok(v4) = <[u8; 4]>::try_from(octets) {
        return Some(Ipv4Addr::from(v4).to_string());
    }
    if let Ok(v6) = <[u8; 16]>::try_from(octets) {
        // uncompressed groups, as OpenSSL prints them
        let groups: Vec<String> = Ipv6Addr::from(v6)
            .segments()
            .iter()
            .map(|group| format!("{:X}", group))
            .collect();
        return Some(groups.join(":"));
    }
    None
}

pub(crate) fn format_general_name(name: &GeneralName) -> String {
    match name {
        GeneralName::DnsName(dns) => format!("DNS:{}", dns),
        GeneralName::Rfc822Name(email) => format!("email:{}", email),
        GeneralName::UniformResourceIdentifier(uri) => format!("URI:{}", uri),
        GeneralName::IpAddress(ip) => match format_ip(ip.as_bytes()) {
            Some(ip) => format!("IP Address:{}", ip),
            None => "IP Address:<invalid>".to_string(),
        },
        GeneralName::DirectoryName(name) => format!("DirName:{}", format_name_oneline(name)),
        GeneralName::RegisteredId(oid) => format!("Registered ID:{}", oid),
        GeneralName::OtherName(_) => "othername:<unsupported>".to_string(),
        GeneralName::EdiPartyName(_) => "EdiPartyName:<unsupported>".to_string(),
    }
}

/// `Jan  2 03:04:05 2024 GMT`
pub(crate) fn format_time(time: &Time) -> String {
    let dt = time.to_date_time();
    format!(
        "{} {:>2} {:02}:{:02}:{:02} {} GMT",
        MONTHS[usize::from(dt.month().saturating_sub(1)) % 12],
        dt.day(),
        dt.hour(),
        dt.minutes(),
        dt.seconds(),
        dt.year()
    )
}
