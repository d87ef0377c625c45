//! Provides an implementation of the [`SignatureVerifier`] interface using libraries from the
//! [Rust Crypto](https://github.com/RustCrypto) project for support.

use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256, ECDSA_WITH_SHA_384, ID_SHA_224, ID_SHA_256, ID_SHA_384, ID_SHA_512,
    SECP_256_R_1, SECP_384_R_1, SHA_224_WITH_RSA_ENCRYPTION, SHA_256_WITH_RSA_ENCRYPTION,
    SHA_384_WITH_RSA_ENCRYPTION, SHA_512_WITH_RSA_ENCRYPTION,
};
use der::{asn1::ObjectIdentifier, Decode, Encode};
use log::{debug, error};
use p256::ecdsa::{
    signature::Verifier as Verifier256, Signature as Signature256, VerifyingKey as VerifyingKey256,
};
use p384::ecdsa::{
    signature::Verifier as Verifier384, Signature as Signature384, VerifyingKey as VerifyingKey384,
};
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::util::error::{Error, PathValidationStatus, Result};
use crate::{
    environment::pki_environment_traits::SignatureVerifier, util::pdv_utilities::oid_lookup,
    DeferDecodeSigned, PDVCertificate,
};

/// get_padding_scheme takes an AlgorithmIdentifier containing a signature algorithm and returns
/// a corresponding Pkcs1v15Sign instance.
///
/// At present, only the PKCS1v15Sign padding scheme is supported, relative to the
/// [`SHA_224_WITH_RSA_ENCRYPTION`], [`SHA_256_WITH_RSA_ENCRYPTION`],
/// [`SHA_384_WITH_RSA_ENCRYPTION`] and [`SHA_512_WITH_RSA_ENCRYPTION`] algorithm identifiers.
pub fn get_padding_scheme(signature_alg: &AlgorithmIdentifierOwned) -> Result<Pkcs1v15Sign> {
    match signature_alg.oid {
        SHA_256_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha256>()),
        SHA_384_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha384>()),
        SHA_224_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha224>()),
        SHA_512_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha512>()),
        _ => Err(Error::Unrecognized),
    }
}

/// get_hash_alg_from_sig_alg takes an ObjectIdentifier that notionally contains an RSA signature
/// algorithm and returns the hash algorithm it uses.
pub fn get_hash_alg_from_sig_alg(sig_alg: &ObjectIdentifier) -> Result<ObjectIdentifier> {
    match *sig_alg {
        SHA_224_WITH_RSA_ENCRYPTION => Ok(ID_SHA_224),
        SHA_256_WITH_RSA_ENCRYPTION => Ok(ID_SHA_256),
        SHA_384_WITH_RSA_ENCRYPTION => Ok(ID_SHA_384),
        SHA_512_WITH_RSA_ENCRYPTION => Ok(ID_SHA_512),
        _ => Err(Error::Unrecognized),
    }
}

/// is_rsa returns true is the presented OID is one of [`SHA_224_WITH_RSA_ENCRYPTION`],
/// [`SHA_256_WITH_RSA_ENCRYPTION`], [`SHA_384_WITH_RSA_ENCRYPTION`] or
/// [`SHA_512_WITH_RSA_ENCRYPTION`] and false otherwise.
pub(crate) fn is_rsa(oid: &ObjectIdentifier) -> bool {
    *oid == SHA_256_WITH_RSA_ENCRYPTION
        || *oid == SHA_384_WITH_RSA_ENCRYPTION
        || *oid == SHA_224_WITH_RSA_ENCRYPTION
        || *oid == SHA_512_WITH_RSA_ENCRYPTION
}

/// is_ecdsa returns true is the presented OID is one of [`ECDSA_WITH_SHA_256`] or
/// [`ECDSA_WITH_SHA_384`] and false otherwise.
pub(crate) fn is_ecdsa(oid: &ObjectIdentifier) -> bool {
    *oid == ECDSA_WITH_SHA_256 || *oid == ECDSA_WITH_SHA_384
}

/// calculate_hash_rust_crypto hashes the presented buffer using implementations from the Rust
/// Crypto project.
///
/// It supports [`ID_SHA_224`], [`ID_SHA_256`], [`ID_SHA_384`] and [`ID_SHA_512`].
pub fn calculate_hash_rust_crypto(
    hash_alg: &ObjectIdentifier,
    buffer_to_hash: &[u8],
) -> Result<Vec<u8>> {
    match *hash_alg {
        ID_SHA_224 => Ok(Sha224::digest(buffer_to_hash).to_vec()),
        ID_SHA_256 => Ok(Sha256::digest(buffer_to_hash).to_vec()),
        ID_SHA_384 => Ok(Sha384::digest(buffer_to_hash).to_vec()),
        ID_SHA_512 => Ok(Sha512::digest(buffer_to_hash).to_vec()),
        _ => Err(Error::Unrecognized),
    }
}

fn get_named_curve_parameter(alg_id: &AlgorithmIdentifierOwned) -> Result<ObjectIdentifier> {
    if let Some(params) = &alg_id.parameters {
        if let Ok(oid) = params.decode_as::<ObjectIdentifier>() {
            return Ok(oid);
        }
    }
    Err(Error::Unrecognized)
}

fn signature_failure() -> Error {
    Error::PathValidation {
        status: PathValidationStatus::SignatureVerificationFailure,
        certificate: None,
    }
}

/// verify_signature_message_rust_crypto verifies a signature over a message using
/// implementations from the [Rust Crypto](https://github.com/RustCrypto) project.
///
/// RSA PKCS #1 v1.5 signatures with SHA-224, SHA-256, SHA-384 or SHA-512 are supported along with
/// ECDSA signatures using P-256 with SHA-256 and P-384 with SHA-384.
pub fn verify_signature_message_rust_crypto(
    message_to_verify: &[u8],                 // buffer to verify
    signature: &[u8],                         // signature
    signature_alg: &AlgorithmIdentifierOwned, // signature algorithm
    spki: &SubjectPublicKeyInfoOwned,         // public key
) -> Result<()> {
    if is_rsa(&signature_alg.oid) {
        let enc_spki = spki.to_der()?;
        let rsa = match RsaPublicKey::from_public_key_der(&enc_spki) {
            Ok(rsa) => rsa,
            Err(e) => {
                debug!("Failed to parse RSA public key: {}", e);
                return Err(Error::Unrecognized);
            }
        };
        let hash_alg = get_hash_alg_from_sig_alg(&signature_alg.oid)?;
        let hash_to_verify = calculate_hash_rust_crypto(&hash_alg, message_to_verify)?;
        let ps = get_padding_scheme(signature_alg)?;
        return match rsa.verify(ps, hash_to_verify.as_slice(), signature) {
            Ok(x) => Ok(x),
            Err(_x) => Err(signature_failure()),
        };
    } else if is_ecdsa(&signature_alg.oid) {
        let named_curve = get_named_curve_parameter(&spki.algorithm)?;
        let public_key = spki.subject_public_key.raw_bytes();

        return match (named_curve, signature_alg.oid) {
            (SECP_256_R_1, ECDSA_WITH_SHA_256) => {
                let ecdsa = VerifyingKey256::from_sec1_bytes(public_key)
                    .map_err(|_e| Error::Unrecognized)?;
                let s = Signature256::from_der(signature).map_err(|_e| signature_failure())?;
                match ecdsa.verify(message_to_verify, &s) {
                    Ok(x) => Ok(x),
                    Err(_x) => Err(signature_failure()),
                }
            }
            (SECP_384_R_1, ECDSA_WITH_SHA_384) => {
                let ecdsa = VerifyingKey384::from_sec1_bytes(public_key)
                    .map_err(|_e| Error::Unrecognized)?;
                let s = Signature384::from_der(signature).map_err(|_e| signature_failure())?;
                match ecdsa.verify(message_to_verify, &s) {
                    Ok(x) => Ok(x),
                    Err(_x) => Err(signature_failure()),
                }
            }
            _ => {
                error!(
                    "Unrecognized or unsupported named curve and signature algorithm pair: {} and {}",
                    named_curve,
                    oid_lookup(&signature_alg.oid).unwrap_or_else(|_| signature_alg.oid.to_string())
                );
                Err(Error::Unrecognized)
            }
        };
    }
    error!(
        "Unrecognized signature algorithm: {}",
        oid_lookup(&signature_alg.oid).unwrap_or_else(|_| signature_alg.oid.to_string())
    );
    Err(Error::Unrecognized)
}

/// [`RustCryptoVerifier`] implements [`SignatureVerifier`] using [`verify_signature_message_rust_crypto`].
///
/// The TBSCertificate is verified as it appears in the certificate's encoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct RustCryptoVerifier;

impl SignatureVerifier for RustCryptoVerifier {
    fn verify_certificate(
        &self,
        issuer_spki: &SubjectPublicKeyInfoOwned,
        certificate: &PDVCertificate,
    ) -> Result<()> {
        let defer_cert = DeferDecodeSigned::from_der(certificate.encoded_cert.as_slice())?;
        verify_signature_message_rust_crypto(
            &defer_cert.tbs_field,
            defer_cert.signature.raw_bytes(),
            &defer_cert.signature_algorithm,
            issuer_spki,
        )
        .map_err(|e| match e {
            Error::PathValidation { status, .. } => {
                Error::path_validation(status, &certificate.decoded_cert)
            }
            e => e,
        })
    }
}

#[test]
fn test_calculate_hash() {
    use hex_literal::hex;

    let result = calculate_hash_rust_crypto(&ID_SHA_256, "abc".as_bytes()).unwrap();
    assert_eq!(
        result,
        hex!("BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD")
    );
    assert_eq!(
        Err(Error::Unrecognized),
        calculate_hash_rust_crypto(&SECP_256_R_1, "abc".as_bytes())
    );
}

#[test]
fn test_rsa_hash_selection() {
    assert_eq!(
        ID_SHA_384,
        get_hash_alg_from_sig_alg(&SHA_384_WITH_RSA_ENCRYPTION).unwrap()
    );
    assert!(is_rsa(&SHA_512_WITH_RSA_ENCRYPTION));
    assert!(!is_rsa(&ECDSA_WITH_SHA_256));
    assert!(is_ecdsa(&ECDSA_WITH_SHA_384));
    let alg = AlgorithmIdentifierOwned {
        oid: ECDSA_WITH_SHA_256,
        parameters: None,
    };
    assert!(get_padding_scheme(&alg).is_err());
}
