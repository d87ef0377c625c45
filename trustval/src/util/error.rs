//! Error types

use core::fmt;

use x509_cert::Certificate;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// Reasons full validation of a certification path can fail
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum PathValidationStatus {
    /// NameChainingFailure occurs when a CertificationPath features certificates for which the subject
    /// name of a superior certificate does not match the issuer name of the immediately subordinate certificate.
    NameChainingFailure,
    /// SignatureVerificationFailure occurs when a CertificationPath features certificates for which the subject
    /// public key of a superior certificate does not verify the signature of the immediately subordinate certificate.
    SignatureVerificationFailure,
    /// InvalidNotBeforeDate occurs when a CertificationPath features a certificate that contains a notBefore
    /// date that is after the time of interest used for a certification path validation operation.
    InvalidNotBeforeDate,
    /// InvalidNotAfterDate occurs when a CertificationPath features a certificate that contains a notAfter
    /// date that is before the time of interest used for a certification path validation operation.
    InvalidNotAfterDate,
}

/// Reasons a path builder can fail to produce a certification path
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum PathBuildingStatus {
    /// NoPathsFound occurs when the certification path builder exhausts the available certificates
    /// without finding a path to a trust anchor that passes validation.
    NoPathsFound,
    /// TargetNotValid occurs when the target certificate is not valid at the time of interest, so no
    /// path search is attempted.
    TargetNotValid,
}

/// Error type
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// MalformedChain occurs when an empty candidate chain is presented for validation.
    MalformedChain,
    /// NoTrustAnchor occurs when a candidate chain does not reach any trusted certificate.
    NoTrustAnchor,
    /// PathValidation occurs when full validation of a certification path fails. The certificate
    /// that caused the failure is included, when known.
    PathValidation {
        /// Reason validation failed
        status: PathValidationStatus,
        /// Offending certificate
        certificate: Option<Box<Certificate>>,
    },
    /// PathBuilding is returned by path builders that could not produce a certification path.
    PathBuilding(PathBuildingStatus),
    /// A configuration error was detected. See textual log output for more details.
    Misconfiguration,
    /// NotFound occurs when an action failed because a necessary artifact was not found.
    NotFound,
    /// Unrecognized occurs when an error conditions does not match anything else here, including
    /// use of unsupported signature algorithms.
    Unrecognized,
    /// Asn1Error is used to propagate error information from the der crate.
    Asn1Error(der::Error),
    /// StdIoError encapsulates an error derived from [std::io::ErrorKind]
    StdIoError(std::io::ErrorKind),
}

impl Error {
    /// Builds an [`Error::PathValidation`] for the given status and offending certificate.
    pub fn path_validation(status: PathValidationStatus, certificate: &Certificate) -> Self {
        Error::PathValidation {
            status,
            certificate: Some(Box::new(certificate.clone())),
        }
    }

    /// Returns the [`PathValidationStatus`] when this is a path validation error.
    pub fn path_validation_status(&self) -> Option<PathValidationStatus> {
        match self {
            Error::PathValidation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the offending certificate when this is a path validation error that identifies one.
    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            Error::PathValidation {
                certificate: Some(c),
                ..
            } => Some(c),
            _ => None,
        }
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::Asn1Error(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::StdIoError(err.kind())
    }
}

impl fmt::Display for PathValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValidationStatus::NameChainingFailure => write!(f, "Name chaining failure"),
            PathValidationStatus::SignatureVerificationFailure => {
                write!(f, "Signature verification failure")
            }
            PathValidationStatus::InvalidNotBeforeDate => write!(f, "InvalidNotBeforeDate"),
            PathValidationStatus::InvalidNotAfterDate => write!(f, "InvalidNotAfterDate"),
        }
    }
}

impl fmt::Display for PathBuildingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathBuildingStatus::NoPathsFound => write!(f, "NoPathsFound"),
            PathBuildingStatus::TargetNotValid => write!(f, "TargetNotValid"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedChain => write!(f, "null or zero-length certificate chain"),
            Error::NoTrustAnchor => write!(f, "No trusted certificate found"),
            Error::PathValidation {
                status,
                certificate: Some(c),
            } => write!(
                f,
                "Path validation failed: {} (certificate issued to {})",
                status, c.tbs_certificate.subject
            ),
            Error::PathValidation {
                status,
                certificate: None,
            } => write!(f, "Path validation failed: {}", status),
            Error::PathBuilding(pbs) => write!(f, "Path building failed: {}", pbs),
            Error::Misconfiguration => write!(f, "Misconfiguration"),
            Error::NotFound => write!(f, "NotFound"),
            Error::Unrecognized => write!(f, "Unrecognized"),
            Error::Asn1Error(e) => write!(f, "Asn1Error: {}", e),
            Error::StdIoError(k) => write!(f, "StdIoError: {:?}", k),
        }
    }
}

impl std::error::Error for Error {}

#[test]
fn error_display() {
    assert_eq!(
        "null or zero-length certificate chain",
        Error::MalformedChain.to_string()
    );
    assert_eq!(
        "Path building failed: NoPathsFound",
        Error::PathBuilding(PathBuildingStatus::NoPathsFound).to_string()
    );
    let e = Error::PathValidation {
        status: PathValidationStatus::NameChainingFailure,
        certificate: None,
    };
    assert_eq!("Path validation failed: Name chaining failure", e.to_string());
    assert_eq!(
        Some(PathValidationStatus::NameChainingFailure),
        e.path_validation_status()
    );
    assert!(e.certificate().is_none());
    assert_eq!(None, Error::NoTrustAnchor.path_validation_status());
}

#[test]
fn path_validation_status_display() {
    let statuses = [
        PathValidationStatus::NameChainingFailure,
        PathValidationStatus::SignatureVerificationFailure,
        PathValidationStatus::InvalidNotBeforeDate,
        PathValidationStatus::InvalidNotAfterDate,
    ];
    let displayed: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
    assert_eq!(
        vec![
            "Name chaining failure",
            "Signature verification failure",
            "InvalidNotBeforeDate",
            "InvalidNotAfterDate"
        ],
        displayed
    );
}
