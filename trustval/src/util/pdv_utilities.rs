//! Utility functions that support certification path processing

use lazy_static::lazy_static;
use log::error;
use regex::Regex;

use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256, ECDSA_WITH_SHA_384, ID_EC_PUBLIC_KEY, RSA_ENCRYPTION,
    SHA_224_WITH_RSA_ENCRYPTION, SHA_256_WITH_RSA_ENCRYPTION, SHA_384_WITH_RSA_ENCRYPTION,
    SHA_512_WITH_RSA_ENCRYPTION,
};
use der::asn1::{Ia5String, ObjectIdentifier, PrintableString, Utf8StringRef};
use der::{Encode, Tagged};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::Name;
use x509_cert::Certificate;

use crate::{pdv_certificate::PDVCertificate, util::error::*};

lazy_static! {
    static ref WHITESPACE_RE: Option<Regex> = Regex::new(r"\s+").ok();
}

/// `valid_at_time` evaluates the not_before and not_after fields of the given Certificate
/// and provides an indication of validity relative to presented time of interest (expressed as
/// seconds since the Unix epoch).
///
/// It returns the number of seconds left to live if the certificate is valid at the given time or
/// an error indicating which field failed if the certificate is not valid. The not_before field is
/// evaluated first. A time of interest of zero disables the check.
///
/// To stifle logging output upon error, pass true for the stifle_log parameter.
pub fn valid_at_time(target: &Certificate, toi: u64, stifle_log: bool) -> Result<u64> {
    if 0 == toi {
        // zero is used to disable validity check
        return Ok(0);
    }

    let tbs = &target.tbs_certificate;
    let nb = tbs.validity.not_before.to_unix_duration().as_secs();
    if nb > toi {
        if !stifle_log {
            log_error_for_subject(
                target,
                "certificate is not yet valid, i.e., not_before is after the configured time of interest",
            );
        }
        return Err(Error::path_validation(
            PathValidationStatus::InvalidNotBeforeDate,
            target,
        ));
    }

    let na = tbs.validity.not_after.to_unix_duration().as_secs();
    if na < toi {
        if !stifle_log {
            log_error_for_subject(
                target,
                format!(
                    "certificate is expired relative to the configured time of interest: {}",
                    tbs.validity.not_after
                )
                .as_str(),
            );
        }
        Err(Error::path_validation(
            PathValidationStatus::InvalidNotAfterDate,
            target,
        ))
    } else {
        Ok(na - toi)
    }
}

/// `name_to_string` returns a string representation of given Name value.
pub fn name_to_string(name: &Name) -> String {
    name.to_string()
}

/// `name_to_key` returns a normalized string form of a Name suitable for use as a map key. Two
/// names that [`compare_names`] deems equal yield the same key.
pub fn name_to_key(name: &Name) -> String {
    let mut parts = vec![];
    for rdn in name.0.iter() {
        let mut atavs = vec![];
        for atav in rdn.0.iter() {
            match normalized_value(atav) {
                Some(v) => atavs.push(format!("{}={}", atav.oid, v)),
                None => return name.to_string().to_lowercase(),
            }
        }
        parts.push(atavs.join("+"));
    }
    parts.join(",")
}

/// get_value_from_rdn returns the value from AttributeTypeAndValue as a string for use in comparing
/// values where leading whitespace may be a factor
pub fn get_value_from_rdn(atav: &AttributeTypeAndValue) -> Result<String> {
    let val = match atav.value.tag() {
        der::Tag::PrintableString => atav
            .value
            .decode_as()
            .ok()
            .map(|s: PrintableString| s.to_string()),
        der::Tag::Utf8String => atav
            .value
            .decode_as()
            .ok()
            .map(|s: Utf8StringRef<'_>| s.to_string()),
        der::Tag::Ia5String => atav
            .value
            .decode_as()
            .ok()
            .map(|s: Ia5String| s.to_string()),
        _ => None,
    };

    let mut s = String::new();
    if let Some(val) = val {
        let mut iter = val.char_indices().peekable();
        while let Some((i, c)) = iter.next() {
            match c {
                '#' if i == 0 => s.push_str("\\#"),
                ' ' if i == 0 || iter.peek().is_none() => s.push_str("\\ "),
                '"' | '+' | ',' | ';' | '<' | '>' | '\\' => s.push_str(format!("\\{}", c).as_str()),
                '\x00'..='\x1f' | '\x7f' => s.push_str(format!("\\{:02x}", c as u8).as_str()),
                _ => s.push(c),
            }
        }
    } else {
        let val = atav.value.to_der()?;
        s.push_str(format!("{}=#", atav.oid).as_str());
        for c in val {
            s.push_str(format!("{:02x}", c).as_str());
        }
    }
    Ok(s)
}

// lowercase, trimmed, with runs of whitespace collapsed into a single space
fn normalized_value(atav: &AttributeTypeAndValue) -> Option<String> {
    let val = get_value_from_rdn(atav).ok()?.replace("\\ ", " ");
    let val = val.trim().to_lowercase();
    match WHITESPACE_RE.as_ref() {
        Some(re) => Some(re.replace_all(val.as_str(), " ").to_string()),
        None => Some(val),
    }
}

/// [`compare_names`] compares two Name values returning true if they match and false otherwise.
///
/// RDNs are compared in order. Attribute values that differ in encoding are compared
/// case-insensitively with leading, trailing and repeated internal whitespace ignored.
pub fn compare_names(left: &Name, right: &Name) -> bool {
    // no match if not the same number of RDNs
    if left.0.len() != right.0.len() {
        return false;
    }

    for (lrdn, rrdn) in left.0.iter().zip(right.0.iter()) {
        if lrdn.0.len() != rrdn.0.len() {
            return false;
        }

        if lrdn == rrdn {
            continue;
        }

        for (l, r) in lrdn.0.iter().zip(rrdn.0.iter()) {
            if l.oid != r.oid {
                return false;
            }

            match (normalized_value(l), normalized_value(r)) {
                (Some(l_val), Some(r_val)) if l_val == r_val => {}
                _ => return false,
            }
        }
    }
    true
}

pub(crate) fn log_error_for_name(name: &Name, msg: &str) {
    let name_str = name_to_string(name);
    error!(
        "Encountered error while processing certificate with subject {}: {}",
        name_str, msg
    );
}

pub(crate) fn log_error_for_ca(ca: &PDVCertificate, msg: &str) {
    log_error_for_name(ca.subject(), msg);
}

/// log a message with subject name of the certificate appended
pub fn log_error_for_subject(ca: &Certificate, msg: &str) {
    log_error_for_name(&ca.tbs_certificate.subject, msg);
}

/// `oid_lookup` takes an ObjectIdentifier and returns a string with a friendly name for the
/// signature and key algorithms supported by the default verifier or Error::NotFound.
pub fn oid_lookup(oid: &ObjectIdentifier) -> Result<String> {
    let s = match *oid {
        SHA_224_WITH_RSA_ENCRYPTION => "SHA224 with RSA Encryption",
        SHA_256_WITH_RSA_ENCRYPTION => "SHA256 with RSA Encryption",
        SHA_384_WITH_RSA_ENCRYPTION => "SHA384 with RSA Encryption",
        SHA_512_WITH_RSA_ENCRYPTION => "SHA512 with RSA Encryption",
        RSA_ENCRYPTION => "RSA Encryption",
        ECDSA_WITH_SHA_256 => "ECDSA with SHA256",
        ECDSA_WITH_SHA_384 => "ECDSA with SHA384",
        ID_EC_PUBLIC_KEY => "EC Public Key",
        _ => return Err(Error::NotFound),
    };
    Ok(s.to_string())
}

#[test]
fn compare_names_tolerates_case_and_whitespace() {
    use core::str::FromStr;
    let l = Name::from_str("CN=Example  Root,O=Acme").unwrap();
    let r = Name::from_str("CN=example root,O=ACME").unwrap();
    assert!(compare_names(&l, &r));
    assert_eq!(name_to_key(&l), name_to_key(&r));

    let other = Name::from_str("CN=Example Intermediate,O=Acme").unwrap();
    assert!(!compare_names(&l, &other));
    assert_ne!(name_to_key(&l), name_to_key(&other));

    let shorter = Name::from_str("CN=Example Root").unwrap();
    assert!(!compare_names(&l, &shorter));
}

#[test]
fn oid_lookup_known_and_unknown() {
    assert_eq!(
        "ECDSA with SHA256",
        oid_lookup(&ECDSA_WITH_SHA_256).unwrap()
    );
    assert_eq!(
        Err(Error::NotFound),
        oid_lookup(&ObjectIdentifier::new_unwrap("1.2.3.4"))
    );
}
