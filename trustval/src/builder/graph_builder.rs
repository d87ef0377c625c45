//! Builder support
//!
//! [`GraphBuilder`] finds certification paths by searching, depth first, the graph formed by
//! matching the issuer name of one certificate to the subject names of trust anchors and pool
//! certificates. Each complete candidate is confirmed with [`validate_path`] before it is returned.

use log::debug;

use crate::{
    environment::pki_environment_traits::*, util::error::*, util::pdv_utilities::*,
    validator::path_validator::validate_path, CertificationPath, PDVCertificate, PkiEnvironment,
};

/// [`GraphBuilder`] implements [`CertificationPathBuilder`] with a depth-first search from the target.
///
/// At each step trust anchors whose subject matches the current issuer are tried before pool
/// certificates. Pool certificates already present in the partial path, that repeat a public key
/// from the partial path, that are not valid at the time of interest, or whose public key does not
/// verify the current certificate are skipped. Depth is bounded by the `max_path_length` setting.
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    /// Creates a new [`GraphBuilder`]
    pub fn new() -> Self {
        GraphBuilder
    }

    // chain is ordered target first; the last element is the certificate whose issuer is sought
    fn search<'a>(
        &self,
        pe: &PkiEnvironment,
        request: &PathBuildingRequest<'a>,
        toi: u64,
        chain: &mut Vec<&'a PDVCertificate>,
    ) -> Option<CertificationPath> {
        let current = *chain.last()?;
        let issuer = current.issuer();

        for ta in request.trust_anchors.get_trust_anchors_for_name(issuer) {
            let owned_chain: Vec<PDVCertificate> = chain.iter().map(|c| (*c).clone()).collect();
            let cp = CertificationPath::from_leaf_first(ta.clone(), &owned_chain)?;
            match validate_path(pe, request.settings, &cp) {
                Ok(()) => return Some(cp),
                Err(e) => debug!(
                    "Candidate path to trust anchor {} rejected: {}",
                    name_to_string(ta.subject()),
                    e
                ),
            }
        }

        if chain.len() >= request.settings.max_path_length as usize {
            debug!(
                "Abandoning partial path of length {} at maximum path length",
                chain.len()
            );
            return None;
        }

        for candidate in request.pool.get_certificates_for_name(issuer) {
            if chain.iter().any(|c| *c == candidate) {
                continue;
            }
            if chain
                .iter()
                .any(|c| c.subject_public_key_info() == candidate.subject_public_key_info())
            {
                continue;
            }
            if valid_at_time(&candidate.decoded_cert, toi, true).is_err() {
                debug!(
                    "Skipping certificate issued to {} that is not valid at time of interest",
                    name_to_string(candidate.subject())
                );
                continue;
            }
            if pe
                .verify_certificate(candidate.subject_public_key_info(), current)
                .is_err()
            {
                continue;
            }

            chain.push(candidate);
            let r = self.search(pe, request, toi, chain);
            chain.pop();
            if r.is_some() {
                return r;
            }
        }
        None
    }
}

impl CertificationPathBuilder for GraphBuilder {
    fn build_path(
        &self,
        pe: &PkiEnvironment,
        request: &PathBuildingRequest<'_>,
    ) -> Result<CertificationPath> {
        let target = request.target;

        if let Ok(ta) = request.trust_anchors.get_trust_anchor_for_cert(target) {
            let cp = CertificationPath::new(ta.clone(), vec![], target.clone());
            validate_path(pe, request.settings, &cp)?;
            return Ok(cp);
        }

        let toi = request.settings.get_time_of_interest();
        if valid_at_time(&target.decoded_cert, toi, false).is_err() {
            return Err(Error::PathBuilding(PathBuildingStatus::TargetNotValid));
        }

        let mut chain = vec![target];
        match self.search(pe, request, toi, &mut chain) {
            Some(cp) => {
                debug!(
                    "Found path of length {} for certificate issued to {}",
                    cp.len(),
                    name_to_string(target.subject())
                );
                Ok(cp)
            }
            None => {
                log_error_for_ca(target, "no valid certification path found");
                Err(Error::PathBuilding(PathBuildingStatus::NoPathsFound))
            }
        }
    }
}
