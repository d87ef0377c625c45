//! The trust_path_validator module provides [`TrustPathValidator`], which determines whether a
//! caller-supplied certificate chain establishes trust in its end-entity certificate relative to a
//! fixed set of trusted certificates.
//!
//! Validation first scans the chain as presented. A properly ordered chain that contains a trusted
//! certificate, or that ends with a certificate issued by one, is re-validated in full and returned
//! without searching. Anything else is handed to the [`CertificationPathBuilder`](crate::CertificationPathBuilder)
//! objects registered with the [`PkiEnvironment`], with the union of the chain and any extra
//! certificates serving as the pool.
//!
//! ```
//! use trustval::*;
//!
//! let mut pe = PkiEnvironment::new();
//! populate_default_pki_environment(&mut pe);
//! let r = TrustPathValidator::with_trust_anchors(
//!     Variant::TlsServer,
//!     vec![],
//!     ValidationSettings::default(),
//!     pe,
//! );
//! assert_eq!(Some(Error::Misconfiguration), r.err());
//! ```

use std::sync::atomic::{AtomicIsize, Ordering};

use log::{debug, error, info};

use crate::{
    environment::pki_environment_traits::PathBuildingRequest, util::error::*,
    util::pdv_utilities::*, validator::path_validator::validate_path, CertSource,
    CertificateChain, CertificationPath, PDVCertificate, PDVTrustAnchorChoice, PkiEnvironment,
    TaSource, TimeOfInterest, ValidationSettings, Variant,
};

/// `ValidatedPath` is the product of a successful [`TrustPathValidator::validate`] call: certificates
/// ordered target first and ending with the trust anchor's certificate. When the target is itself
/// trusted the path contains only the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedPath {
    certificates: CertificateChain,
}

impl ValidatedPath {
    fn trusted_target(target: &PDVCertificate) -> Self {
        ValidatedPath {
            certificates: vec![target.clone()],
        }
    }

    /// Certificates in the path, target first
    pub fn certificates(&self) -> &[PDVCertificate] {
        self.certificates.as_slice()
    }

    /// Number of certificates in the path, including the trust anchor's certificate
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Always false; a validated path contains at least the target
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// The end-entity certificate, i.e., `chain[0]` as passed to `validate`
    pub fn target(&self) -> &PDVCertificate {
        &self.certificates[0]
    }

    /// The trust anchor's certificate, i.e., the last certificate in the path
    pub fn trust_anchor(&self) -> &PDVCertificate {
        &self.certificates[self.certificates.len() - 1]
    }

    /// Iterates over the certificates, target first
    pub fn iter(&self) -> std::slice::Iter<'_, PDVCertificate> {
        self.certificates.iter()
    }
}

impl From<CertificationPath> for ValidatedPath {
    fn from(cp: CertificationPath) -> Self {
        ValidatedPath {
            certificates: cp.to_leaf_first(),
        }
    }
}

impl<'a> IntoIterator for &'a ValidatedPath {
    type Item = &'a PDVCertificate;
    type IntoIter = std::slice::Iter<'a, PDVCertificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certificates.iter()
    }
}

impl From<ValidatedPath> for CertificateChain {
    fn from(vp: ValidatedPath) -> Self {
        vp.certificates
    }
}

/// `TrustPathValidator` validates certificate chains against an immutable trust store.
///
/// The trust store, [`ValidationSettings`] and [`Variant`] are fixed at construction. The only state
/// written by [`validate`](TrustPathValidator::validate) is the advisory counter returned by
/// [`cert_path_length`](TrustPathValidator::cert_path_length), so a single instance may be shared by
/// several threads.
pub struct TrustPathValidator {
    variant: Variant,
    ta_source: TaSource,
    settings: ValidationSettings,
    pe: PkiEnvironment,
    cert_path_length: AtomicIsize,
}

impl TrustPathValidator {
    /// Creates a validator that trusts the given certificates, using default [`ValidationSettings`].
    ///
    /// Returns [`Error::Misconfiguration`] if no certificates are provided.
    pub fn new(
        variant: Variant,
        trusted_certificates: Vec<PDVCertificate>,
        pe: PkiEnvironment,
    ) -> Result<Self> {
        let ta_source = TaSource::from_certificates(trusted_certificates)?;
        Self::from_parts(variant, ta_source, ValidationSettings::default(), pe)
    }

    /// Creates a validator from a set of trust anchors and explicit settings.
    ///
    /// Returns [`Error::Misconfiguration`] if no trust anchors are provided or the settings cannot be
    /// honored (see [`ValidationSettings::check`]).
    pub fn with_trust_anchors(
        variant: Variant,
        trust_anchors: Vec<PDVTrustAnchorChoice>,
        settings: ValidationSettings,
        pe: PkiEnvironment,
    ) -> Result<Self> {
        let ta_source = TaSource::from_trust_anchors(trust_anchors);
        Self::from_parts(variant, ta_source, settings, pe)
    }

    fn from_parts(
        variant: Variant,
        ta_source: TaSource,
        settings: ValidationSettings,
        pe: PkiEnvironment,
    ) -> Result<Self> {
        settings.check()?;
        if ta_source.is_empty() {
            error!("A {} validator requires at least one trust anchor", variant);
            return Err(Error::Misconfiguration);
        }
        debug!(
            "Prepared {} validator with {} trust anchors",
            variant,
            ta_source.len()
        );
        Ok(TrustPathValidator {
            variant,
            ta_source,
            settings,
            pe,
            cert_path_length: AtomicIsize::new(-1),
        })
    }

    /// The variant this validator was created for
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The settings this validator was created with
    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// The point in time at which certificates are validated, if one was configured. When None, the
    /// current time is used by each call to `validate`.
    pub fn validation_date(&self) -> Option<TimeOfInterest> {
        self.settings.time_of_interest
    }

    /// The trust store
    pub fn trust_anchors(&self) -> &TaSource {
        &self.ta_source
    }

    /// Certificates of the trust anchors, in insertion order
    pub fn trusted_certificates(&self) -> Vec<&PDVCertificate> {
        self.ta_source.trusted_certificates()
    }

    /// Length of the chain most recently submitted to full validation, or -1 if no chain has been.
    ///
    /// The value is diagnostic only. Concurrent calls to `validate` race to update it.
    pub fn cert_path_length(&self) -> isize {
        self.cert_path_length.load(Ordering::Relaxed)
    }

    /// `validate` determines whether `chain`, ordered target first, establishes trust in `chain[0]`.
    ///
    /// `extra_certs` are made available to path building, along with `chain`, when the chain as
    /// presented does not lead directly to a trust anchor.
    ///
    /// When the chain contains a trusted certificate, the certificates preceding it are validated
    /// against that trust anchor and then against any other trust anchor sharing its name. The
    /// returned path ends with the certificate of the trust anchor that succeeded.
    ///
    /// Errors:
    /// - [`Error::MalformedChain`] when `chain` is empty
    /// - [`Error::NoTrustAnchor`] when the plugin variant cannot reach a trust anchor
    /// - [`Error::PathValidation`] when full validation of the chain fails
    /// - errors returned by path building, e.g., [`Error::PathBuilding`], are propagated unchanged
    pub fn validate(
        &self,
        chain: &[PDVCertificate],
        extra_certs: Option<&[PDVCertificate]>,
    ) -> Result<ValidatedPath> {
        if chain.is_empty() {
            error!("validate invoked with an empty certificate chain");
            return Err(Error::MalformedChain);
        }

        let mut prev_issuer = None;
        for (i, cert) in chain.iter().enumerate() {
            if let Some(prev_issuer) = prev_issuer {
                if !compare_names(cert.subject(), prev_issuer) {
                    debug!(
                        "Certificate at index {} issued to {} does not issue its predecessor; building",
                        i,
                        name_to_string(cert.subject())
                    );
                    return self.build(chain, extra_certs);
                }
            }

            if let Some(ta) = self.trust_anchor_for_cert(cert) {
                if 0 == i {
                    info!(
                        "Target certificate issued to {} is trusted",
                        name_to_string(cert.subject())
                    );
                    return Ok(ValidatedPath::trusted_target(cert));
                }
                debug!(
                    "Certificate at index {} issued to {} is trusted; validating preceding certificates",
                    i,
                    name_to_string(cert.subject())
                );
                // the matched anchor is tried first, then any others that share the issuer name of
                // the certificate it is expected to have signed
                let mut candidates = vec![ta];
                candidates.extend(
                    self.ta_source
                        .get_trust_anchors_for_name(chain[i - 1].issuer())
                        .into_iter()
                        .filter(|other| *other != ta),
                );
                return self.validate_chain(&chain[..i], &candidates);
            }
            prev_issuer = Some(cert.issuer());
        }

        let last = &chain[chain.len() - 1];
        let candidates: Vec<&PDVTrustAnchorChoice> = self
            .ta_source
            .get_trust_anchors_for_name(last.issuer())
            .into_iter()
            .filter(|ta| self.is_signature_valid(ta, last))
            .collect();
        if !candidates.is_empty() {
            debug!(
                "Last certificate in chain was issued by trust anchor {}; validating chain",
                name_to_string(last.issuer())
            );
            return self.validate_chain(chain, &candidates);
        }

        if self.variant.is_plugin() {
            if chain.len() > 1 {
                let temp_ta = PDVTrustAnchorChoice::try_from(last.clone())?;
                debug!(
                    "No trust anchor found; checking chain against its own last certificate issued to {}",
                    name_to_string(last.subject())
                );
                self.validate_chain(&chain[..chain.len() - 1], &[&temp_ta])?;
            }
            log_error_for_subject(&chain[0].decoded_cert, "no trust anchor found");
            return Err(Error::NoTrustAnchor);
        }

        debug!(
            "Chain for {} does not lead to a trust anchor; building",
            name_to_string(chain[0].subject())
        );
        self.build(chain, extra_certs)
    }

    // A certificate is trusted if it is a trust anchor's certificate or if a trust anchor shares its
    // subject name and public key.
    fn trust_anchor_for_cert(&self, cert: &PDVCertificate) -> Option<&PDVTrustAnchorChoice> {
        if let Ok(ta) = self.ta_source.get_trust_anchor_for_cert(cert) {
            return Some(ta);
        }
        self.ta_source
            .get_trust_anchors_for_name(cert.subject())
            .into_iter()
            .find(|ta| ta.subject_public_key_info() == cert.subject_public_key_info())
    }

    // Only the plugin variant verifies the signature before committing to a trust anchor matched by
    // name. Full validation verifies it regardless.
    fn is_signature_valid(&self, ta: &PDVTrustAnchorChoice, cert: &PDVCertificate) -> bool {
        if !self.variant.is_plugin() {
            return true;
        }
        match self
            .pe
            .verify_certificate(ta.subject_public_key_info(), cert)
        {
            Ok(()) => true,
            Err(e) => {
                debug!(
                    "Trust anchor {} did not verify certificate issued to {}: {}",
                    name_to_string(ta.subject()),
                    name_to_string(cert.subject()),
                    e
                );
                false
            }
        }
    }

    // Full validation of chain, target first, against each candidate in turn. The first success is
    // returned, else the first failure.
    fn validate_chain(
        &self,
        chain: &[PDVCertificate],
        candidates: &[&PDVTrustAnchorChoice],
    ) -> Result<ValidatedPath> {
        self.cert_path_length
            .store(chain.len() as isize, Ordering::Relaxed);

        let mut err = None;
        for ta in candidates {
            let cp = match CertificationPath::from_leaf_first((*ta).clone(), chain) {
                Some(cp) => cp,
                None => return Err(Error::MalformedChain),
            };
            match validate_path(&self.pe, &self.settings, &cp) {
                Ok(()) => return Ok(ValidatedPath::from(cp)),
                Err(e) => {
                    if err.is_none() {
                        err = Some(e);
                    }
                }
            }
        }
        Err(err.unwrap_or(Error::NoTrustAnchor))
    }

    fn build(
        &self,
        chain: &[PDVCertificate],
        extra_certs: Option<&[PDVCertificate]>,
    ) -> Result<ValidatedPath> {
        let mut pool: CertSource = chain.iter().cloned().collect();
        if let Some(extra_certs) = extra_certs {
            pool.add_certificates(extra_certs.iter().cloned());
        }
        let request = PathBuildingRequest {
            target: &chain[0],
            pool: &pool,
            trust_anchors: &self.ta_source,
            settings: &self.settings,
        };
        let cp = self.pe.build_path(&request)?;
        Ok(ValidatedPath::from(cp))
    }
}

#[test]
fn validator_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TrustPathValidator>();
}

#[test]
fn validator_requires_trust_anchors() {
    let r = TrustPathValidator::new(Variant::PluginCodeSigning, vec![], PkiEnvironment::new());
    assert_eq!(Some(Error::Misconfiguration), r.err());
}
