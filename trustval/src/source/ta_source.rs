//! Provides an immutable, in-memory trust anchor store. The following snip, similar to code in
//! `trustcheck`, illustrates preparation of a [`TaSource`] object.
//!
//! ```
//! use trustval::*;
//!
//! // trusted certificates are typically read from a folder using ta_folder_to_vec
//! let trusted: Vec<PDVCertificate> = vec![];
//! let ta_source = TaSource::from_certificates(trusted).unwrap();
//! assert!(ta_source.is_empty());
//! ```
//!
//! Trust anchors are indexed by subject name so the issuer of a certificate can be matched to
//! candidate trust anchors without a linear search, and by certificate encoding so membership can
//! be tested for certificates that appear in a candidate chain.

use std::collections::BTreeMap;
use std::str;

use log::info;
use sha2::{Digest, Sha256};
use subtle_encoding::hex;
use x509_cert::name::Name;

use crate::{
    util::error::*,
    util::pdv_utilities::{compare_names, name_to_key, name_to_string},
    PDVCertificate, PDVTrustAnchorChoice,
};

/// `buffer_to_hex` takes a byte array and returns a string featuring upper case ASCII hex characters (without
/// commas, spaces, or brackets).
/// ```
/// use trustval::buffer_to_hex;
/// let buf :[u8; 3] = [1,2,3];
/// let bufhex = buffer_to_hex(&buf);
/// assert_eq!(bufhex, "010203");
/// ```
pub fn buffer_to_hex(buffer: &[u8]) -> String {
    let hex = hex::encode_upper(buffer);
    let r = str::from_utf8(hex.as_slice());
    if let Ok(s) = r {
        s.to_string()
    } else {
        "".to_string()
    }
}

/// `fingerprint` returns the SHA-256 hash of a certificate's encoding as upper case hex.
pub fn fingerprint(cert: &PDVCertificate) -> String {
    let digest = Sha256::digest(cert.encoded_cert.as_slice()).to_vec();
    buffer_to_hex(digest.as_slice())
}

/// `TaSource` is the immutable set of trust anchors, i.e., the trust store, used by a
/// [`TrustPathValidator`](crate::TrustPathValidator). Several trust anchors may share a subject name;
/// all are retained and returned in insertion order.
#[derive(Clone, Debug, Default)]
pub struct TaSource {
    /// Trust anchors in insertion order
    tas: Vec<PDVTrustAnchorChoice>,
    /// Maps normalized subject names to indices into tas
    name_map: BTreeMap<String, Vec<usize>>,
    /// Maps certificate encodings to indices into tas
    encoding_map: BTreeMap<Vec<u8>, usize>,
}

impl TaSource {
    /// `from_certificates` creates a [`TaSource`] from a set of trusted certificates. Duplicate
    /// certificates are ignored.
    pub fn from_certificates(certs: Vec<PDVCertificate>) -> Result<TaSource> {
        let mut tas = vec![];
        for cert in certs {
            tas.push(PDVTrustAnchorChoice::try_from(cert)?);
        }
        Ok(Self::from_trust_anchors(tas))
    }

    /// `from_trust_anchors` creates a [`TaSource`] from a set of trust anchors. Trust anchors whose
    /// certificates duplicate one already present are ignored.
    pub fn from_trust_anchors(tas: Vec<PDVTrustAnchorChoice>) -> TaSource {
        let mut ta_source = TaSource::default();
        for ta in tas {
            if ta_source
                .encoding_map
                .contains_key(&ta.certificate.encoded_cert)
            {
                continue;
            }
            let i = ta_source.tas.len();
            ta_source
                .encoding_map
                .insert(ta.certificate.encoded_cert.clone(), i);
            ta_source
                .name_map
                .entry(name_to_key(ta.subject()))
                .or_default()
                .push(i);
            ta_source.tas.push(ta);
        }
        ta_source
    }

    /// Number of trust anchors
    pub fn len(&self) -> usize {
        self.tas.len()
    }

    /// Returns true if there are no trust anchors
    pub fn is_empty(&self) -> bool {
        self.tas.is_empty()
    }

    /// `is_cert_a_trust_anchor` returns true if the presented certificate is the certificate of one of
    /// the trust anchors.
    pub fn is_cert_a_trust_anchor(&self, cert: &PDVCertificate) -> bool {
        self.encoding_map.contains_key(&cert.encoded_cert)
    }

    /// `get_trust_anchor_for_cert` returns the trust anchor whose certificate is the presented
    /// certificate or [`Error::NotFound`].
    pub fn get_trust_anchor_for_cert(&self, cert: &PDVCertificate) -> Result<&PDVTrustAnchorChoice> {
        match self.encoding_map.get(&cert.encoded_cert) {
            Some(i) => Ok(&self.tas[*i]),
            None => Err(Error::NotFound),
        }
    }

    /// `get_trust_anchors_for_name` returns all trust anchors whose subject matches the presented name.
    pub fn get_trust_anchors_for_name(&self, name: &Name) -> Vec<&PDVTrustAnchorChoice> {
        match self.name_map.get(&name_to_key(name)) {
            Some(indices) => indices
                .iter()
                .map(|i| &self.tas[*i])
                .filter(|ta| compare_names(ta.subject(), name))
                .collect(),
            None => vec![],
        }
    }

    /// `get_trust_anchors` returns all trust anchors in insertion order.
    pub fn get_trust_anchors(&self) -> &[PDVTrustAnchorChoice] {
        self.tas.as_slice()
    }

    /// `trusted_certificates` returns the certificates of all trust anchors in insertion order.
    pub fn trusted_certificates(&self) -> Vec<&PDVCertificate> {
        self.tas.iter().map(|ta| &ta.certificate).collect()
    }

    /// Log trust anchor details at info level.
    pub fn log_tas(&self) {
        for (i, ta) in self.tas.iter().enumerate() {
            info!(
                "Index: {:3}; SHA256: {}; Subject: {}; Filename: {}",
                i,
                fingerprint(&ta.certificate),
                name_to_string(ta.subject()),
                ta.locator().unwrap_or("")
            );
        }
    }
}
