//! The pki_environment_traits module features trait definitions and type definitions that are used
//! by [`PkiEnvironment`] to provide functionality that supports building and/or validating X.509
//! certification paths.

use der::asn1::ObjectIdentifier;
use spki::SubjectPublicKeyInfoOwned;

use crate::util::error::*;
use crate::{CertSource, CertificationPath, PDVCertificate, PkiEnvironment, TaSource, ValidationSettings};

/// `OidLookup` implementations take an OID and returns either a friendly name for the OID or a
/// NotFound error. Where NotFound is returned by all OidLookup implementations, the
/// [`PkiEnvironment`] returns a dot notation version of the OID.
pub type OidLookup = fn(&ObjectIdentifier) -> Result<String>;

/// The [`SignatureVerifier`] trait defines the interface for implementations that verify the
/// signature on a certificate.
///
/// Implementations are expected to be stateless from the caller's perspective.
pub trait SignatureVerifier {
    /// `verify_certificate` returns `Ok(())` if the signature on `certificate` verifies using
    /// `issuer_spki`. [`PathValidationStatus::SignatureVerificationFailure`] is returned when
    /// the signature does not verify and [`Error::Unrecognized`] when the algorithm or key is not
    /// supported by the implementation.
    fn verify_certificate(
        &self,
        issuer_spki: &SubjectPublicKeyInfoOwned,
        certificate: &PDVCertificate,
    ) -> Result<()>;
}

/// [`PathBuildingRequest`] aggregates the inputs to a path building operation.
#[derive(Clone, Copy, Debug)]
pub struct PathBuildingRequest<'a> {
    /// Certificate the path must begin with
    pub target: &'a PDVCertificate,
    /// Certificates available for use as intermediate CA certificates
    pub pool: &'a CertSource,
    /// Trust anchors at which a path may terminate
    pub trust_anchors: &'a TaSource,
    /// Settings governing the operation, including the time of interest
    pub settings: &'a ValidationSettings,
}

/// The [`CertificationPathBuilder`] trait defines the interface for implementations that support building
/// certification paths.
///
/// Search order is left to the implementation. Callers must not depend on which path is returned
/// when more than one valid path exists.
pub trait CertificationPathBuilder {
    /// `build_path` returns the first certification path found from the request's target to one of
    /// the request's trust anchors that passes validation, or a [`Error::PathBuilding`] error.
    fn build_path(
        &self,
        pe: &PkiEnvironment,
        request: &PathBuildingRequest<'_>,
    ) -> Result<CertificationPath>;
}
