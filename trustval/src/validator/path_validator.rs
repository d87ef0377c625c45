//! Functions related to certification path validation operations

use log::{debug, info};

use crate::{
    environment::pki_environment::*, path_settings::*, util::error::*, util::pdv_utilities::*,
    CertificationPath, PDVCertificate,
};

//-----------------------------------------------------------------------------
// Top level function. This aggregates lower level checks.
//-----------------------------------------------------------------------------
/// `validate_path` confirms a [`CertificationPath`] is internally consistent and anchored:
///
/// - every certificate other than the trust anchor is valid at the time of interest (the trust
///   anchor too when `enforce_trust_anchor_validity` is set),
/// - the issuer name of each certificate matches the subject name of the certificate above it,
///   beginning with the trust anchor, and
/// - the signature on each certificate verifies using the public key of the certificate above it,
///   beginning with the trust anchor.
///
/// Failures are reported as [`Error::PathValidation`] carrying the offending certificate.
///
/// A path whose target is the trust anchor's certificate is trivially valid, subject to the trust
/// anchor validity check.
pub fn validate_path(
    pe: &PkiEnvironment,
    settings: &ValidationSettings,
    cp: &CertificationPath,
) -> Result<()> {
    check_validity(pe, settings, cp)?;
    if cp.target_is_trust_anchor() {
        debug!(
            "Target certificate issued to {} is a trust anchor",
            name_to_string(cp.target.subject())
        );
        return Ok(());
    }

    check_names(pe, settings, cp)?;
    verify_signatures(pe, settings, cp)?;
    info!(
        "Successfully completed path validation checks for certificate issued to {}",
        name_to_string(cp.target.subject())
    );
    Ok(())
}

// for convenience, combine target into array with the intermediate CA certs
fn certs_below_trust_anchor(cp: &CertificationPath) -> Vec<&PDVCertificate> {
    let mut v: Vec<&PDVCertificate> = cp.intermediates.iter().collect();
    v.push(&cp.target);
    v
}

//-----------------------------------------------------------------------------
// Functions that perform some small aspect of path validation
//-----------------------------------------------------------------------------
/// `check_validity` ensures the target and intermediate CA certificates are valid at the time of
/// interest and, when `enforce_trust_anchor_validity` is set, that the trust anchor is too.
pub fn check_validity(
    _pe: &PkiEnvironment,
    settings: &ValidationSettings,
    cp: &CertificationPath,
) -> Result<()> {
    let toi = settings.get_time_of_interest();
    if 0 == toi {
        info!("check_validity invoked with no time of interest; validity check disabled");
        return Ok(());
    }

    if !cp.target_is_trust_anchor() {
        for cert in certs_below_trust_anchor(cp) {
            valid_at_time(&cert.decoded_cert, toi, false)?;
        }
    }

    if settings.enforce_trust_anchor_validity {
        valid_at_time(&cp.trust_anchor.certificate.decoded_cert, toi, false)?;
    }

    Ok(())
}

/// `check_names` ensures the issuer name in each certificate matches the subject name of the
/// certificate that precedes it in the path, beginning with the trust anchor.
pub fn check_names(
    _pe: &PkiEnvironment,
    _settings: &ValidationSettings,
    cp: &CertificationPath,
) -> Result<()> {
    let mut working_issuer_name = cp.trust_anchor.subject();

    for ca_cert in certs_below_trust_anchor(cp) {
        if !compare_names(ca_cert.issuer(), working_issuer_name) {
            log_error_for_ca(ca_cert, "name chaining violation");
            return Err(Error::path_validation(
                PathValidationStatus::NameChainingFailure,
                &ca_cert.decoded_cert,
            ));
        }
        working_issuer_name = ca_cert.subject();
    }
    Ok(())
}

/// `verify_signatures` verifies the signature on each certificate using the public key from the
/// certificate that precedes it in the path, beginning with the trust anchor.
pub fn verify_signatures(
    pe: &PkiEnvironment,
    _settings: &ValidationSettings,
    cp: &CertificationPath,
) -> Result<()> {
    let mut working_spki = cp.trust_anchor.subject_public_key_info();

    for cur_cert in certs_below_trust_anchor(cp) {
        if let Err(e) = pe.verify_certificate(working_spki, cur_cert) {
            log_error_for_ca(
                cur_cert,
                format!("signature verification error: {}", e).as_str(),
            );
            return Err(Error::path_validation(
                PathValidationStatus::SignatureVerificationFailure,
                &cur_cert.decoded_cert,
            ));
        }
        working_spki = cur_cert.subject_public_key_info();
    }
    Ok(())
}
