//! PkiEnvironment aggregates a set of function pointers and trait objects that supply functionality
//! useful when building and/or validating a certification path.
//!
//! The sample below illustrates preparation of a PkiEnvironment object for use in
//! building and validating certification paths.
//! ```
//! use trustval::*;
//!
//! // the default PkiEnvironment uses `oid_lookup` to look up friendly names for OIDs
//! let mut pe = PkiEnvironment::default();
//!
//! // add signature verification and path building capabilities
//! populate_default_pki_environment(&mut pe);
//! ```
//!
//! The aggregation of trait objects allows for implementations of features to vary. For example,
//! one app may use a hardware-backed signature verifier and another a path builder that fetches
//! certificates from a directory.

use der::asn1::ObjectIdentifier;
use log::error;
use spki::SubjectPublicKeyInfoOwned;

use crate::{
    builder::graph_builder::GraphBuilder, environment::pki_environment_traits::*,
    util::crypto::RustCryptoVerifier, util::error::*, util::pdv_utilities::oid_lookup,
    CertificationPath, PDVCertificate,
};

/// [`PkiEnvironment`] provides a switchboard of trait objects and callback functions that allow
/// support to vary on different platforms or to allow support to be tailored for specific use cases.
pub struct PkiEnvironment {
    //--------------------------------------------------------------------------
    //Crypto interfaces
    //--------------------------------------------------------------------------
    /// List of trait objects that provide certificate signature verification
    signature_verifiers: Vec<Box<(dyn SignatureVerifier + Send + Sync)>>,

    //--------------------------------------------------------------------------
    //Certification path processing interfaces
    //--------------------------------------------------------------------------
    /// List of trait objects that provide certification path building
    path_builders: Vec<Box<(dyn CertificationPathBuilder + Send + Sync)>>,

    //--------------------------------------------------------------------------
    //Miscellaneous interfaces
    //--------------------------------------------------------------------------
    /// List of functions that provide OID lookup capabilities
    oid_lookups: Vec<OidLookup>,
}

impl Default for PkiEnvironment {
    /// PkiEnvironment::default returns a new [`PkiEnvironment`] with empty vectors for each
    /// type of trait object and `oid_lookups` featuring the [`oid_lookup`] function.
    fn default() -> Self {
        PkiEnvironment {
            signature_verifiers: vec![],
            path_builders: vec![],
            oid_lookups: vec![oid_lookup],
        }
    }
}

impl PkiEnvironment {
    /// PkiEnvironment::new returns a new [`PkiEnvironment`] with empty vectors for each type of
    /// trait object and callback
    pub fn new() -> PkiEnvironment {
        PkiEnvironment {
            signature_verifiers: vec![],
            path_builders: vec![],
            oid_lookups: vec![],
        }
    }

    /// clear_all_callbacks clears the contents of all function pointer and trait object vectors
    /// associated with an instance of [`PkiEnvironment`].
    pub fn clear_all_callbacks(&mut self) {
        self.clear_signature_verifiers();
        self.clear_path_builders();
        self.clear_oid_lookups();
    }

    /// add_signature_verifier adds a [`SignatureVerifier`] object to the list used by verify_certificate.
    pub fn add_signature_verifier(&mut self, c: Box<(dyn SignatureVerifier + Send + Sync)>) {
        self.signature_verifiers.push(c);
    }

    /// clear_signature_verifiers clears the list of [`SignatureVerifier`] objects used by verify_certificate.
    pub fn clear_signature_verifiers(&mut self) {
        self.signature_verifiers.clear();
    }

    /// verify_certificate iterates over signature_verifiers until one verifies the signature on
    /// `certificate` using `issuer_spki`.
    ///
    /// When none succeeds, the first error other than [`Error::Unrecognized`] is returned, i.e., a
    /// verifier that recognized the algorithm and found a bad signature is authoritative.
    pub fn verify_certificate(
        &self,
        issuer_spki: &SubjectPublicKeyInfoOwned,
        certificate: &PDVCertificate,
    ) -> Result<()> {
        let mut err = None;
        for f in &self.signature_verifiers {
            match f.verify_certificate(issuer_spki, certificate) {
                Ok(r) => {
                    return Ok(r);
                }
                Err(Error::Unrecognized) => {}
                Err(e) => {
                    if err.is_none() {
                        err = Some(e);
                    }
                }
            }
        }
        if let Some(e) = err {
            return Err(e);
        }
        Err(Error::Unrecognized)
    }

    /// add_path_builder adds a [`CertificationPathBuilder`] object to the list used by build_path.
    pub fn add_path_builder(&mut self, c: Box<(dyn CertificationPathBuilder + Send + Sync)>) {
        self.path_builders.push(c);
    }

    /// clear_path_builders clears the list of [`CertificationPathBuilder`] objects used by build_path.
    pub fn clear_path_builders(&mut self) {
        self.path_builders.clear();
    }

    /// build_path iterates over path_builders until one returns a path. The error from the last
    /// builder is returned when none does. [`Error::Misconfiguration`] is returned when no builder
    /// has been added.
    pub fn build_path(&self, request: &PathBuildingRequest<'_>) -> Result<CertificationPath> {
        if self.path_builders.is_empty() {
            error!("No certification path builder is available");
            return Err(Error::Misconfiguration);
        }

        let mut err = None;
        for f in &self.path_builders {
            match f.build_path(self, request) {
                Ok(r) => {
                    return Ok(r);
                }
                Err(e) => {
                    err = Some(e);
                }
            }
        }
        if let Some(e) = err {
            return Err(e);
        }
        Err(Error::Unrecognized)
    }

    /// add_oid_lookup adds a oid_lookup callback to the list used by oid_lookup.
    pub fn add_oid_lookup(&mut self, c: OidLookup) {
        self.oid_lookups.push(c);
    }

    /// clear_oid_lookups clears the list of oid_lookup callbacks used by oid_lookup.
    pub fn clear_oid_lookups(&mut self) {
        self.oid_lookups.clear();
    }

    /// oid_lookup takes an [`ObjectIdentifier`] and returns either a friendly name for the OID or the
    /// OID represented in dot notation.
    pub fn oid_lookup(&self, oid: &ObjectIdentifier) -> String {
        for f in &self.oid_lookups {
            let r = f(oid);
            if let Ok(r) = r {
                return r;
            }
        }
        oid.to_string()
    }
}

/// `populate_default_pki_environment` populates a [`PkiEnvironment`] instance with a default set of
/// trait objects.
///
/// The following are added:
/// - [`RustCryptoVerifier`]
/// - [`GraphBuilder`]
///
/// [`oid_lookup`] is added if OID lookup support is absent.
pub fn populate_default_pki_environment(pe: &mut PkiEnvironment) {
    pe.add_signature_verifier(Box::new(RustCryptoVerifier::default()));
    pe.add_path_builder(Box::new(GraphBuilder::default()));
    if pe.oid_lookups.is_empty() {
        pe.add_oid_lookup(oid_lookup);
    }
}

#[test]
fn oid_lookup_falls_back_to_dot_notation() {
    use const_oid::db::rfc5912::ECDSA_WITH_SHA_256;

    let pe = PkiEnvironment::default();
    assert_eq!("ECDSA with SHA256", pe.oid_lookup(&ECDSA_WITH_SHA_256));

    let pe = PkiEnvironment::new();
    assert_eq!("1.2.840.10045.4.3.2", pe.oid_lookup(&ECDSA_WITH_SHA_256));
}
