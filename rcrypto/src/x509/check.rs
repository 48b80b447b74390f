//! Host, email and IP address matching against certificate names, following
//! the rules of OpenSSL's `X509_check_host` family.

use std::net::IpAddr;

use crate::utilities::error::*;

/// When the subject common name (or email attribute) is consulted.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum SubjectCheck {
    /// Only when the certificate has no subject alternative name of the
    /// kind being checked.
    #[default]
    Default,
    Always,
    Never,
}

impl SubjectCheck {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "default" => Ok(SubjectCheck::Default),
            "always" => Ok(SubjectCheck::Always),
            "never" => Ok(SubjectCheck::Never),
            _ => Err(Error::InvalidArgument(format!(
                "unknown subject check {}",
                name
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CheckOptions {
    pub subject: SubjectCheck,
    pub wildcards: bool,
    pub partial_wildcards: bool,
    pub multi_label_wildcards: bool,
    pub single_label_subdomains: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            subject: SubjectCheck::Default,
            wildcards: true,
            partial_wildcards: true,
            multi_label_wildcards: false,
            single_label_subdomains: false,
        }
    }
}

impl CheckOptions {
    pub fn builder() -> CheckOptionsBuilder {
        CheckOptionsBuilder::default()
    }
}

#[derive(Default, Debug)]
pub struct CheckOptionsBuilder {
    options: CheckOptions,
}

impl CheckOptionsBuilder {
    pub fn with_subject(mut self, subject: SubjectCheck) -> Self {
        self.options.subject = subject;
        self
    }

    pub fn with_wildcards(mut self, wildcards: bool) -> Self {
        self.options.wildcards = wildcards;
        self
    }

    pub fn with_partial_wildcards(mut self, partial_wildcards: bool) -> Self {
        self.options.partial_wildcards = partial_wildcards;
        self
    }

    pub fn with_multi_label_wildcards(mut self, multi_label_wildcards: bool) -> Self {
        self.options.multi_label_wildcards = multi_label_wildcards;
        self
    }

    pub fn with_single_label_subdomains(mut self, single_label_subdomains: bool) -> Self {
        self.options.single_label_subdomains = single_label_subdomains;
        self
    }

    pub fn build(self) -> CheckOptions {
        self.options
    }
}

pub(crate) fn validate_query(kind: &str, query: &str) -> Result<()> {
    if query.is_empty() || query.contains('\0') {
        return Err(Error::InvalidArgument(format!("invalid {} {:?}", kind, query)));
    }
    Ok(())
}

pub(crate) fn parse_ip(ip: &str) -> Result<IpAddr> {
    ip.parse::<IpAddr>()
        .map_err(|_| Error::InvalidArgument(format!("invalid IP address {:?}", ip)))
}

/// Octets of an address as they appear in an iPAddress general name.
pub(crate) fn ip_octets(ip: &IpAddr) -> Vec<u8> {
    match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

fn is_label_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-'
}

/// Position of a usable wildcard in `pattern`: one `*` in the left-most
/// label, followed by at least two more labels, and not inside an IDNA
/// label.
fn valid_star(pattern: &[u8], options: &CheckOptions) -> Option<usize> {
    let star = pattern.iter().position(|&c| c == b'*')?;
    if pattern[star + 1..].contains(&b'*') {
        return None;
    }
    let first_label_end = pattern.iter().position(|&c| c == b'.')?;
    if star > first_label_end {
        return None;
    }

    let first_label = &pattern[..first_label_end];
    if first_label.len() >= 4 && first_label[..4].eq_ignore_ascii_case(b"xn--") {
        return None;
    }
    if !options.partial_wildcards && first_label.len() != 1 {
        return None;
    }

    let rest = &pattern[first_label_end + 1..];
    let labels: Vec<&[u8]> = rest.split(|&c| c == b'.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return None;
    }
    Some(star)
}

fn wildcard_match(pattern: &[u8], star: usize, subject: &[u8], options: &CheckOptions) -> bool {
    let prefix = &pattern[..star];
    let suffix = &pattern[star + 1..];
    if subject.len() < prefix.len() + suffix.len() {
        return false;
    }
    if !subject[..prefix.len()].eq_ignore_ascii_case(prefix) {
        return false;
    }
    let tail_start = subject.len() - suffix.len();
    if !subject[tail_start..].eq_ignore_ascii_case(suffix) {
        return false;
    }

    let whole_label = prefix.is_empty() && suffix.first() == Some(&b'.');
    let covered = &subject[prefix.len()..tail_start];
    if whole_label {
        if covered.is_empty() {
            return false;
        }
    } else if subject.len() >= 4 && subject[..4].eq_ignore_ascii_case(b"xn--") {
        // IDNA labels never match partial wildcards
        return false;
    }

    let allow_multi = whole_label && options.multi_label_wildcards;
    covered
        .iter()
        .all(|&c| is_label_char(c) || (allow_multi && c == b'.'))
}

/// Matches a host query against one DNS name from the certificate.
pub(crate) fn host_matches(pattern: &str, host: &str, options: &CheckOptions) -> bool {
    let pattern = pattern.trim_end_matches('.').as_bytes();
    let host = host.trim_end_matches('.').as_bytes();
    if pattern.is_empty() {
        return false;
    }

    // `.example.com` asks for any subdomain of example.com
    if host.first() == Some(&b'.') {
        if pattern.len() <= host.len() {
            return false;
        }
        let prefix_len = pattern.len() - host.len();
        if !pattern[prefix_len..].eq_ignore_ascii_case(host) {
            return false;
        }
        let prefix = &pattern[..prefix_len];
        if prefix.contains(&b'*') {
            return false;
        }
        return !options.single_label_subdomains || !prefix.contains(&b'.');
    }

    if options.wildcards {
        if let Some(star) = valid_star(pattern, options) {
            return wildcard_match(pattern, star, host, options);
        }
    }
    pattern.eq_ignore_ascii_case(host)
}

/// Local part compares exactly, the domain without regard to case.
pub(crate) fn email_matches(pattern: &str, email: &str) -> bool {
    match (pattern.rsplit_once('@'), email.rsplit_once('@')) {
        (Some((pattern_local, pattern_domain)), Some((local, domain))) => {
            pattern_local == local && pattern_domain.eq_ignore_ascii_case(domain)
        }
        _ => false,
    }
}
