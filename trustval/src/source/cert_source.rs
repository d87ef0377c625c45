//! Provides an in-memory pool of certificates available to a path builder, typically the union of
//! a candidate chain and any extra certificates supplied by the caller.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use x509_cert::name::Name;

use crate::{
    util::pdv_utilities::{compare_names, name_to_key, name_to_string},
    PDVCertificate,
};

/// `CertSource` is a pool of certificates indexed by subject name. Certificates are de-duplicated by
/// encoding and retained in insertion order.
#[derive(Clone, Debug, Default)]
pub struct CertSource {
    /// Certificates in insertion order
    certs: Vec<PDVCertificate>,
    /// Maps normalized subject names to indices into certs
    name_map: BTreeMap<String, Vec<usize>>,
    /// Encodings of certificates already present
    encodings: BTreeSet<Vec<u8>>,
}

impl CertSource {
    /// instantiates a new empty CertSource
    pub fn new() -> CertSource {
        CertSource::default()
    }

    /// `add_certificate` adds a certificate to the pool. Returns false if the certificate was already
    /// present.
    pub fn add_certificate(&mut self, cert: PDVCertificate) -> bool {
        if self.encodings.contains(&cert.encoded_cert) {
            debug!(
                "Ignoring duplicate certificate issued to {}",
                name_to_string(cert.subject())
            );
            return false;
        }
        let i = self.certs.len();
        self.encodings.insert(cert.encoded_cert.clone());
        self.name_map
            .entry(name_to_key(cert.subject()))
            .or_default()
            .push(i);
        self.certs.push(cert);
        true
    }

    /// `add_certificates` adds each certificate in the presented iterator to the pool.
    pub fn add_certificates<I>(&mut self, certs: I)
    where
        I: IntoIterator<Item = PDVCertificate>,
    {
        for cert in certs {
            self.add_certificate(cert);
        }
    }

    /// Number of certificates in the pool
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Returns true if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// `get_certificates` returns all certificates in insertion order.
    pub fn get_certificates(&self) -> &[PDVCertificate] {
        self.certs.as_slice()
    }

    /// `get_certificates_for_name` returns all certificates whose subject matches the presented name.
    pub fn get_certificates_for_name(&self, name: &Name) -> Vec<&PDVCertificate> {
        match self.name_map.get(&name_to_key(name)) {
            Some(indices) => indices
                .iter()
                .map(|i| &self.certs[*i])
                .filter(|c| compare_names(c.subject(), name))
                .collect(),
            None => vec![],
        }
    }
}

impl FromIterator<PDVCertificate> for CertSource {
    fn from_iter<I: IntoIterator<Item = PDVCertificate>>(iter: I) -> Self {
        let mut cs = CertSource::new();
        cs.add_certificates(iter);
        cs
    }
}
