//! Wrappers around asn.1 encoder/decoder structures to support trust anchor processing

use der::{Decode, Encode};
use log::error;
use spki::SubjectPublicKeyInfoOwned;
use x509_cert::anchor::TrustAnchorChoice;
use x509_cert::name::Name;
use x509_cert::Certificate;

use crate::util::error::*;
use crate::validator::pdv_certificate::*;

/// [`PDVTrustAnchorChoice`] is used to aggregate a binary TrustAnchorChoice, a parsed TrustAnchorChoice
/// and the certificate the trust anchor carries.
///
/// Only trust anchors that carry a certificate are supported, i.e., the Certificate choice or a
/// TrustAnchorInfo with a certificate in its certPath field. Validated paths always end with the
/// trust anchor's certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PDVTrustAnchorChoice {
    /// Binary, encoded TrustAnchorChoice object
    pub encoded_ta: Vec<u8>,
    /// Decoded TrustAnchorChoice object
    pub decoded_ta: TrustAnchorChoice,
    /// Certificate carried by the trust anchor
    pub certificate: PDVCertificate,
}

impl PDVTrustAnchorChoice {
    /// Subject name of the trust anchor's certificate
    pub fn subject(&self) -> &Name {
        self.certificate.subject()
    }

    /// Public key of the trust anchor. For TrustAnchorInfo this is the public key given in the
    /// TrustAnchorInfo structure, which is expected to match the embedded certificate.
    pub fn subject_public_key_info(&self) -> &SubjectPublicKeyInfoOwned {
        match &self.decoded_ta {
            TrustAnchorChoice::TaInfo(tai) => &tai.pub_key,
            #[allow(unreachable_patterns)]
            _ => self.certificate.subject_public_key_info(),
        }
    }

    /// Certificate carried by the trust anchor
    pub fn certificate(&self) -> &PDVCertificate {
        &self.certificate
    }

    /// Locator of the trust anchor's certificate, if any
    pub fn locator(&self) -> Option<&str> {
        self.certificate.locator()
    }
}

fn certificate_from_ta(ta: &TrustAnchorChoice) -> Result<Certificate> {
    match ta {
        TrustAnchorChoice::Certificate(c) => return Ok(c.clone()),
        TrustAnchorChoice::TaInfo(tai) => {
            if let Some(cp) = &tai.cert_path {
                if let Some(c) = &cp.certificate {
                    return Ok(c.clone());
                }
            }
        }
        #[allow(unreachable_patterns)]
        _ => {}
    }
    error!("Trust anchors that do not include a certificate are not supported");
    Err(Error::Misconfiguration)
}

impl TryFrom<&[u8]> for PDVTrustAnchorChoice {
    type Error = Error;

    fn try_from(enc_ta: &[u8]) -> Result<Self> {
        let ta = TrustAnchorChoice::from_der(enc_ta)?;
        let cert = certificate_from_ta(&ta)?;
        // keep the original encoding when the trust anchor is a bare certificate
        let certificate = match &ta {
            TrustAnchorChoice::Certificate(_) => PDVCertificate {
                encoded_cert: enc_ta.to_vec(),
                decoded_cert: cert,
                locator: None,
            },
            #[allow(unreachable_patterns)]
            _ => PDVCertificate::try_from(cert)?,
        };
        Ok(PDVTrustAnchorChoice {
            encoded_ta: enc_ta.to_vec(),
            decoded_ta: ta,
            certificate,
        })
    }
}

impl TryFrom<TrustAnchorChoice> for PDVTrustAnchorChoice {
    type Error = Error;

    fn try_from(ta: TrustAnchorChoice) -> Result<Self> {
        let enc_ta = ta.to_der()?;
        let cert = certificate_from_ta(&ta)?;
        Ok(PDVTrustAnchorChoice {
            encoded_ta: enc_ta,
            decoded_ta: ta,
            certificate: PDVCertificate::try_from(cert)?,
        })
    }
}

impl TryFrom<PDVCertificate> for PDVTrustAnchorChoice {
    type Error = Error;

    fn try_from(cert: PDVCertificate) -> Result<Self> {
        Ok(PDVTrustAnchorChoice {
            encoded_ta: cert.encoded_cert.clone(),
            decoded_ta: TrustAnchorChoice::Certificate(cert.decoded_cert.clone()),
            certificate: cert,
        })
    }
}

/// `parse_ta` takes a buffer containing a binary DER encoded TrustAnchorChoice and returns a
/// [`PDVTrustAnchorChoice`] whose certificate is tagged with the given locator.
pub fn parse_ta(buffer: &[u8], locator: &str) -> Result<PDVTrustAnchorChoice> {
    match PDVTrustAnchorChoice::try_from(buffer) {
        Ok(mut ta) => {
            ta.certificate.locator = Some(locator.to_string());
            Ok(ta)
        }
        Err(e) => {
            error!("Failed to parse trust anchor from {}: {}", locator, e);
            Err(e)
        }
    }
}
