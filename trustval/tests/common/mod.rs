//! Synthetic PKIs for integration tests.
//!
//! Most tests use "mock" certificates: the public key is an arbitrary byte string and the signature
//! is a copy of the signer's public key, checked by [`MockVerifier`]. [`rsa_cert`], [`p256_cert`] and
//! [`p384_cert`] produce real certificates for use with `RustCryptoVerifier`.
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256, ECDSA_WITH_SHA_384, ID_EC_PUBLIC_KEY, SECP_256_R_1, SECP_384_R_1,
};
use der::asn1::{BitString, Null, ObjectIdentifier, UtcTime};
use der::{Any, Decode, Encode};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rsa::pkcs8::{DecodePrivateKey, EncodePublicKey};
use rsa::RsaPrivateKey;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::certificate::{TbsCertificate, Version};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};
use x509_cert::Certificate;

use trustval::*;

/// 2020-09-13
pub const NOT_BEFORE: u64 = 1_600_000_000;
/// 2046-01-20
pub const NOT_AFTER: u64 = 2_400_000_000;
/// 2023-11-14, inside the default validity period
pub const TOI: u64 = 1_700_000_000;
/// 2022-04-15, before TOI
pub const EXPIRED: u64 = 1_650_000_000;

const MOCK_SIG_ALG: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.99999.1");
const MOCK_KEY_ALG: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.99999.2");

fn utc(secs: u64) -> Time {
    Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(secs)).unwrap())
}

fn tbs(
    subject: &str,
    issuer: &str,
    serial: u8,
    spki: SubjectPublicKeyInfoOwned,
    sig_alg: &AlgorithmIdentifierOwned,
    not_before: u64,
    not_after: u64,
) -> TbsCertificate {
    TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&[serial]).unwrap(),
        signature: sig_alg.clone(),
        issuer: Name::from_str(issuer).unwrap(),
        validity: Validity {
            not_before: utc(not_before),
            not_after: utc(not_after),
        },
        subject: Name::from_str(subject).unwrap(),
        subject_public_key_info: spki,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: None,
    }
}

/// A mock key is an arbitrary byte string; use a distinct seed per key.
pub fn mock_key(seed: u8) -> Vec<u8> {
    vec![seed; 16]
}

/// Mock certificate for `subject` holding `subject_key`, issued by `issuer` and "signed" with
/// `signer_key`, valid from [`NOT_BEFORE`] to [`NOT_AFTER`].
pub fn mock_cert(
    subject: &str,
    subject_key: &[u8],
    issuer: &str,
    signer_key: &[u8],
    serial: u8,
) -> PDVCertificate {
    mock_cert_with_validity(
        subject,
        subject_key,
        issuer,
        signer_key,
        serial,
        NOT_BEFORE,
        NOT_AFTER,
    )
}

/// As [`mock_cert`] with an explicit validity period.
pub fn mock_cert_with_validity(
    subject: &str,
    subject_key: &[u8],
    issuer: &str,
    signer_key: &[u8],
    serial: u8,
    not_before: u64,
    not_after: u64,
) -> PDVCertificate {
    let sig_alg = AlgorithmIdentifierOwned {
        oid: MOCK_SIG_ALG,
        parameters: None,
    };
    let spki = SubjectPublicKeyInfoOwned {
        algorithm: AlgorithmIdentifierOwned {
            oid: MOCK_KEY_ALG,
            parameters: None,
        },
        subject_public_key: BitString::from_bytes(subject_key).unwrap(),
    };
    let cert = Certificate {
        tbs_certificate: tbs(
            subject, issuer, serial, spki, &sig_alg, not_before, not_after,
        ),
        signature_algorithm: sig_alg,
        signature: BitString::from_bytes(signer_key).unwrap(),
    };
    PDVCertificate::try_from(cert).unwrap()
}

/// Self-issued, self-signed mock certificate
pub fn mock_root(subject: &str, key: &[u8], serial: u8) -> PDVCertificate {
    mock_cert(subject, key, subject, key, serial)
}

/// Certificate for `subject` holding `spki`, issued by `issuer` and signed by `sign`, which takes
/// the encoded TBSCertificate and returns the signature value.
pub fn signed_cert(
    subject: &str,
    spki: SubjectPublicKeyInfoOwned,
    issuer: &str,
    sig_alg: AlgorithmIdentifierOwned,
    sign: impl Fn(&[u8]) -> Vec<u8>,
    serial: u8,
) -> PDVCertificate {
    let tbs_certificate = tbs(
        subject, issuer, serial, spki, &sig_alg, NOT_BEFORE, NOT_AFTER,
    );
    let signature = sign(&tbs_certificate.to_der().unwrap());
    let cert = Certificate {
        tbs_certificate,
        signature_algorithm: sig_alg,
        signature: BitString::from_bytes(&signature).unwrap(),
    };
    PDVCertificate::try_from(cert).unwrap()
}

fn ec_spki(curve: ObjectIdentifier, point: &[u8]) -> SubjectPublicKeyInfoOwned {
    SubjectPublicKeyInfoOwned {
        algorithm: AlgorithmIdentifierOwned {
            oid: ID_EC_PUBLIC_KEY,
            parameters: Some(Any::encode_from(&curve).unwrap()),
        },
        subject_public_key: BitString::from_bytes(point).unwrap(),
    }
}

/// Deterministic P-256 signing key
pub fn p256_key(seed: u8) -> SigningKey {
    SigningKey::from_slice(&[seed; 32]).unwrap()
}

/// ECDSA P-256 certificate for `subject` holding `subject_key`'s public key, issued by `issuer` and
/// signed with `signer`.
pub fn p256_cert(
    subject: &str,
    subject_key: &SigningKey,
    issuer: &str,
    signer: &SigningKey,
    serial: u8,
) -> PDVCertificate {
    let point = p256::PublicKey::from(subject_key.verifying_key()).to_encoded_point(false);
    signed_cert(
        subject,
        ec_spki(SECP_256_R_1, point.as_bytes()),
        issuer,
        AlgorithmIdentifierOwned {
            oid: ECDSA_WITH_SHA_256,
            parameters: None,
        },
        |data| {
            let signature: Signature = signer.sign(data);
            signature.to_der().as_bytes().to_vec()
        },
        serial,
    )
}

/// Deterministic P-384 signing key
pub fn p384_key(seed: u8) -> p384::ecdsa::SigningKey {
    p384::ecdsa::SigningKey::from_slice(&[seed; 48]).unwrap()
}

/// ECDSA P-384 certificate, otherwise as [`p256_cert`]
pub fn p384_cert(
    subject: &str,
    subject_key: &p384::ecdsa::SigningKey,
    issuer: &str,
    signer: &p384::ecdsa::SigningKey,
    serial: u8,
) -> PDVCertificate {
    let point = p384::PublicKey::from(subject_key.verifying_key()).to_encoded_point(false);
    signed_cert(
        subject,
        ec_spki(SECP_384_R_1, point.as_bytes()),
        issuer,
        AlgorithmIdentifierOwned {
            oid: ECDSA_WITH_SHA_384,
            parameters: None,
        },
        |data| {
            let signature: p384::ecdsa::Signature = signer.sign(data);
            signature.to_der().as_bytes().to_vec()
        },
        serial,
    )
}

/// One of three fixed 2048-bit RSA test keys, numbered 1 to 3
pub fn rsa_key(n: u8) -> RsaPrivateKey {
    let pem = match n {
        1 => include_str!("keys/rsa1.pem"),
        2 => include_str!("keys/rsa2.pem"),
        _ => include_str!("keys/rsa3.pem"),
    };
    RsaPrivateKey::from_pkcs8_pem(pem).unwrap()
}

/// RSA PKCS #1 v1.5 certificate signed using the hash algorithm named by `sig_alg`, one of the
/// shaNNNWithRSAEncryption identifiers.
pub fn rsa_cert(
    subject: &str,
    subject_key: &RsaPrivateKey,
    issuer: &str,
    signer: &RsaPrivateKey,
    sig_alg: ObjectIdentifier,
    serial: u8,
) -> PDVCertificate {
    let enc_spki = subject_key.to_public_key().to_public_key_der().unwrap();
    let spki = SubjectPublicKeyInfoOwned::from_der(enc_spki.as_bytes()).unwrap();
    let hash_alg = get_hash_alg_from_sig_alg(&sig_alg).unwrap();
    signed_cert(
        subject,
        spki,
        issuer,
        AlgorithmIdentifierOwned {
            oid: sig_alg,
            parameters: Some(Any::encode_from(&Null).unwrap()),
        },
        |data| {
            let digest = calculate_hash_rust_crypto(&hash_alg, data).unwrap();
            let padding = get_padding_scheme(&AlgorithmIdentifierOwned {
                oid: sig_alg,
                parameters: None,
            })
            .unwrap();
            signer.sign(padding, &digest).unwrap()
        },
        serial,
    )
}

/// Verifies mock certificates: the signature must equal the issuer's public key.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockVerifier;

impl SignatureVerifier for MockVerifier {
    fn verify_certificate(
        &self,
        issuer_spki: &SubjectPublicKeyInfoOwned,
        certificate: &PDVCertificate,
    ) -> Result<()> {
        if certificate.decoded_cert.signature_algorithm.oid != MOCK_SIG_ALG {
            return Err(Error::Unrecognized);
        }
        if certificate.decoded_cert.signature.raw_bytes()
            == issuer_spki.subject_public_key.raw_bytes()
        {
            Ok(())
        } else {
            Err(Error::path_validation(
                PathValidationStatus::SignatureVerificationFailure,
                &certificate.decoded_cert,
            ))
        }
    }
}

/// Wraps [`GraphBuilder`] and counts invocations.
#[derive(Clone, Debug, Default)]
pub struct CountingBuilder {
    pub calls: Arc<AtomicUsize>,
}

impl CertificationPathBuilder for CountingBuilder {
    fn build_path(
        &self,
        pe: &PkiEnvironment,
        request: &PathBuildingRequest<'_>,
    ) -> Result<CertificationPath> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        GraphBuilder::new().build_path(pe, request)
    }
}

/// Environment with [`MockVerifier`] and [`GraphBuilder`]
pub fn mock_environment() -> PkiEnvironment {
    let mut pe = PkiEnvironment::new();
    pe.add_signature_verifier(Box::new(MockVerifier));
    pe.add_path_builder(Box::new(GraphBuilder::new()));
    pe
}

/// Environment with [`MockVerifier`] and a [`CountingBuilder`] whose counter is returned
pub fn counting_environment() -> (PkiEnvironment, Arc<AtomicUsize>) {
    let builder = CountingBuilder::default();
    let calls = builder.calls.clone();
    let mut pe = PkiEnvironment::new();
    pe.add_signature_verifier(Box::new(MockVerifier));
    pe.add_path_builder(Box::new(builder));
    (pe, calls)
}

/// Settings with [`TOI`] as the time of interest
pub fn test_settings() -> ValidationSettings {
    ValidationSettings::default().with_time_of_interest(TimeOfInterest::from_unix_secs(TOI).unwrap())
}

/// Root -> ICA -> Leaf, all mock certificates
pub struct MockPki {
    pub root: PDVCertificate,
    pub ica: PDVCertificate,
    pub leaf: PDVCertificate,
}

pub fn mock_pki() -> MockPki {
    let root_key = mock_key(1);
    let ica_key = mock_key(2);
    let leaf_key = mock_key(3);
    MockPki {
        root: mock_root("CN=Root,O=Test", &root_key, 1),
        ica: mock_cert("CN=ICA,O=Test", &ica_key, "CN=Root,O=Test", &root_key, 2),
        leaf: mock_cert("CN=Leaf,O=Test", &leaf_key, "CN=ICA,O=Test", &ica_key, 3),
    }
}

/// Validator of the given variant trusting the given certificates, using [`test_settings`]
pub fn mock_validator(variant: Variant, trusted: &[PDVCertificate]) -> TrustPathValidator {
    let tas = trusted
        .iter()
        .map(|c| PDVTrustAnchorChoice::try_from(c.clone()).unwrap())
        .collect();
    TrustPathValidator::with_trust_anchors(variant, tas, test_settings(), mock_environment())
        .unwrap()
}
