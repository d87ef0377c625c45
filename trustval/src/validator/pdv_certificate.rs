//! Wrappers around asn.1 encoder/decoder structures to support certification path processing

use core::fmt;

use der::{asn1::BitString, Decode, Encode};
use log::error;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::name::Name;
use x509_cert::Certificate;

use crate::util::error::*;

/// [`PDVCertificate`] is used to aggregate a binary, DER-encoded Certificate, a parsed Certificate
/// and an optional locator in support of certification path development and validation operations.
///
/// Two [`PDVCertificate`] instances are equal when their encodings are equal.
#[derive(Clone)]
pub struct PDVCertificate {
    /// Binary, encoded Certificate object
    pub encoded_cert: Vec<u8>,
    /// Decoded Certificate object
    pub decoded_cert: Certificate,
    /// Optional file name, URI or other locator for troubleshooting purposes
    pub locator: Option<String>,
}

impl PDVCertificate {
    /// Subject name of the certificate
    pub fn subject(&self) -> &Name {
        &self.decoded_cert.tbs_certificate.subject
    }

    /// Issuer name of the certificate
    pub fn issuer(&self) -> &Name {
        &self.decoded_cert.tbs_certificate.issuer
    }

    /// Subject public key of the certificate
    pub fn subject_public_key_info(&self) -> &SubjectPublicKeyInfoOwned {
        &self.decoded_cert.tbs_certificate.subject_public_key_info
    }

    /// `tbs_bytes` returns the TBSCertificate as it appears in the encoded certificate, i.e., the
    /// bytes that were signed.
    pub fn tbs_bytes(&self) -> Result<Vec<u8>> {
        let defer_cert = DeferDecodeSigned::from_der(self.encoded_cert.as_slice())?;
        Ok(defer_cert.tbs_field)
    }

    /// Locator associated with the certificate, if any
    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }
}

impl PartialEq for PDVCertificate {
    fn eq(&self, other: &Self) -> bool {
        self.encoded_cert == other.encoded_cert
    }
}

impl Eq for PDVCertificate {}

impl fmt::Debug for PDVCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PDVCertificate")
            .field("subject", &self.subject().to_string())
            .field("issuer", &self.issuer().to_string())
            .field("locator", &self.locator)
            .finish()
    }
}

impl TryFrom<&[u8]> for PDVCertificate {
    type Error = der::Error;

    fn try_from(enc_cert: &[u8]) -> der::Result<Self> {
        let cert = Certificate::from_der(enc_cert)?;
        Ok(PDVCertificate {
            encoded_cert: enc_cert.to_vec(),
            decoded_cert: cert,
            locator: None,
        })
    }
}

impl TryFrom<Certificate> for PDVCertificate {
    type Error = der::Error;

    fn try_from(cert: Certificate) -> der::Result<Self> {
        let enc_cert = cert.to_der()?;
        Ok(PDVCertificate {
            encoded_cert: enc_cert,
            decoded_cert: cert,
            locator: None,
        })
    }
}

/// [`DeferDecodeSigned`] used to parse only the top-level Certificate structure, without parsing the details of the
/// TBSCertificate, AlgorithmIdentifier or BIT STRING fields.
///
/// Deferred decoding is useful when verifying certificates to avoid re-encoding the TBSCertificate
/// (and potentially encountering problems with structures that were not DER-encoded prior to signing).
pub struct DeferDecodeSigned {
    /// tbsCertificate       TBSCertificate,
    pub tbs_field: Vec<u8>,
    /// signatureAlgorithm   AlgorithmIdentifier,
    pub signature_algorithm: AlgorithmIdentifierOwned,
    /// signature            BIT STRING
    pub signature: BitString,
}

impl ::der::FixedTag for DeferDecodeSigned {
    const TAG: ::der::Tag = ::der::Tag::Sequence;
}

impl<'a> ::der::DecodeValue<'a> for DeferDecodeSigned {
    fn decode_value<R: ::der::Reader<'a>>(
        reader: &mut R,
        header: ::der::Header,
    ) -> ::der::Result<Self> {
        use ::der::Reader as _;
        reader.read_nested(header.length, |reader| {
            let tbs_certificate = reader.tlv_bytes()?;
            let signature_algorithm = reader.decode()?;
            let signature = reader.decode()?;
            Ok(Self {
                tbs_field: tbs_certificate.to_vec(),
                signature_algorithm,
                signature,
            })
        })
    }
}

/// `parse_cert` takes a buffer containing a binary DER encoded certificate and returns
/// a [`PDVCertificate`] containing the parsed certificate, tagged with the given locator, if
/// parsing was successful.
pub fn parse_cert(buffer: &[u8], locator: &str) -> Result<PDVCertificate> {
    match Certificate::from_der(buffer) {
        Ok(cert) => Ok(PDVCertificate {
            encoded_cert: buffer.to_vec(),
            decoded_cert: cert,
            locator: Some(locator.to_string()),
        }),
        Err(e) => {
            error!("Failed to parse certificate from {}: {}", locator, e);
            Err(Error::Asn1Error(e))
        }
    }
}

#[test]
fn parse_cert_rejects_garbage() {
    let r = parse_cert(&[0x30, 0x03, 0x02, 0x01, 0x01], "garbage.der");
    assert!(matches!(r, Err(Error::Asn1Error(_))));
    assert!(PDVCertificate::try_from(&[0x04, 0x00][..]).is_err());
}
