//! Actions taken in response to command line arguments

use log::{error, info};

use trustval::*;

use crate::args::TrustcheckArgs;

/// `options` loads the trust anchors, settings and certificates named by `args` and validates the
/// chain, if any. The validated path is logged at info level and failures at error level.
pub fn options(args: &TrustcheckArgs) -> Result<()> {
    let mut settings = read_settings(&args.settings)?;
    if let Some(toi) = args.time_of_interest {
        settings.time_of_interest = Some(TimeOfInterest::from_unix_secs(toi)?);
    }

    let ta_folder = match &args.ta_folder {
        Some(ta_folder) => ta_folder,
        None => {
            error!("A trust anchor folder must be provided via --ta-folder");
            return Err(Error::Misconfiguration);
        }
    };

    // trust anchor validity is only screened when it would be enforced anyway
    let ta_toi = if settings.enforce_trust_anchor_validity {
        settings.get_time_of_interest()
    } else {
        0
    };
    let mut tas = vec![];
    let count = ta_folder_to_vec(ta_folder, &mut tas, ta_toi)?;
    info!("Loaded {} trust anchors from {}", count, ta_folder);

    let mut pe = PkiEnvironment::default();
    populate_default_pki_environment(&mut pe);
    let tpv = TrustPathValidator::with_trust_anchors(args.variant, tas, settings, pe)?;

    if args.list_trust_anchors {
        tpv.trust_anchors().log_tas();
    }

    if args.chain.is_empty() {
        if !args.list_trust_anchors {
            error!("No certificates to validate were provided via --chain");
            return Err(Error::Misconfiguration);
        }
        return Ok(());
    }

    let chain = read_certificates(&args.chain)?;
    let mut extra_certs = vec![];
    if let Some(ca_folder) = &args.ca_folder {
        let count = cert_folder_to_vec(ca_folder, &mut extra_certs, 0)?;
        info!("Loaded {} CA certificates from {}", count, ca_folder);
    }

    match tpv.validate(&chain, Some(extra_certs.as_slice())) {
        Ok(vp) => {
            info!(
                "Validated path of length {} using {} validator",
                vp.len(),
                tpv.variant()
            );
            for (i, cert) in vp.iter().enumerate() {
                info!(
                    "\t[{}] {} ({})",
                    i,
                    name_to_string(cert.subject()),
                    cert.locator().unwrap_or("trust anchor")
                );
            }
            Ok(())
        }
        Err(e) => {
            error!("Validation failed: {}", e);
            if tpv.cert_path_length() >= 0 {
                error!(
                    "Length of last chain submitted to full validation: {}",
                    tpv.cert_path_length()
                );
            }
            Err(e)
        }
    }
}
