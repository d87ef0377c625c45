//! Provides structure that represents a certification path including target, optional intermediate CAs
//! and trust anchor.

use crate::{PDVCertificate, PDVTrustAnchorChoice};

/// `CertificateChain` is a typedef for a vector of `PDVCertificate`.
pub type CertificateChain = Vec<PDVCertificate>;

/// `CertificationPath` is used to represent the trust anchor, intermediate CA certificates and target certificate
/// that comprise a certification path.
#[derive(Clone, Debug)]
#[readonly::make]
pub struct CertificationPath {
    /// `target` contains the target certificate for the certification path
    #[readonly]
    pub target: PDVCertificate,
    /// `intermediates` contains zero or more intermediate CA certificates, beginning with the certificate that
    /// was issued by `trust_anchor` and proceeding in order to a certificate that issued the target, i.e.,
    /// `intermediates\[0\]` can be used to verify `intermediates\[1\]`, `intermediates\[1\]` can be used to verify
    /// `intermediates\[2\]`, etc. until `intermediates[intermediates.len() - 1]` can be used to verify `target`.
    #[readonly]
    pub intermediates: CertificateChain,
    /// `trust_anchor` contains the trust anchor for the certification path
    #[readonly]
    pub trust_anchor: PDVTrustAnchorChoice,
}

impl CertificationPath {
    /// instantiates a new CertificationPath
    pub fn new(
        trust_anchor: PDVTrustAnchorChoice,
        intermediates: CertificateChain,
        target: PDVCertificate,
    ) -> CertificationPath {
        CertificationPath {
            trust_anchor,
            intermediates,
            target,
        }
    }

    /// `from_leaf_first` builds a path from certificates ordered target first, i.e., `chain[0]` is
    /// the target and each certificate is followed by its issuer, with the last certificate issued by
    /// `trust_anchor`. Returns None for an empty chain.
    pub fn from_leaf_first(
        trust_anchor: PDVTrustAnchorChoice,
        chain: &[PDVCertificate],
    ) -> Option<CertificationPath> {
        let (target, rest) = chain.split_first()?;
        let intermediates = rest.iter().rev().cloned().collect();
        Some(CertificationPath::new(
            trust_anchor,
            intermediates,
            target.clone(),
        ))
    }

    /// Returns true if the target is the trust anchor's certificate, i.e., the path features no
    /// certificates beyond the trust anchor.
    pub fn target_is_trust_anchor(&self) -> bool {
        self.intermediates.is_empty() && self.target == self.trust_anchor.certificate
    }

    /// Number of certificates in the path, excluding the trust anchor
    pub fn len(&self) -> usize {
        if self.target_is_trust_anchor() {
            0
        } else {
            self.intermediates.len() + 1
        }
    }

    /// Returns true if the path features no certificates beyond the trust anchor
    pub fn is_empty(&self) -> bool {
        0 == self.len()
    }

    /// `to_leaf_first` returns the certificates in the path, target first and ending with the trust
    /// anchor's certificate. A path whose target is the trust anchor yields a single certificate.
    pub fn to_leaf_first(&self) -> CertificateChain {
        let mut v = vec![self.target.clone()];
        if self.target_is_trust_anchor() {
            return v;
        }
        v.extend(self.intermediates.iter().rev().cloned());
        v.push(self.trust_anchor.certificate.clone());
        v
    }
}
