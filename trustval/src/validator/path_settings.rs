//! Structures and functions related to configuring certification path processing operations

use core::fmt;
use core::str::FromStr;
use std::path::Path;

use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Result as SerdeResult;

use crate::builder::file_utils::get_file_as_byte_vec;
use crate::util::time_of_interest::*;
use crate::{Error, Result};

/// `PS_MAX_PATH_LENGTH_CONSTRAINT` is the default maximum number of certificates, excluding the
/// trust anchor, a path builder will chain together.
pub const PS_MAX_PATH_LENGTH_CONSTRAINT: u8 = 15;

/// `Variant` identifies the calling context a [`TrustPathValidator`](crate::TrustPathValidator) serves.
///
/// Only [`Variant::PluginCodeSigning`] alters validation behavior. It requires a cryptographic check
/// before accepting a trust anchor found by name and, when no trust anchor is found, performs a
/// diagnostic validation of the chain against its own last certificate before failing.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Variant {
    /// General purpose validation
    #[default]
    Generic,
    /// Code signing
    CodeSigning,
    /// Signed cryptographic providers
    JceSigning,
    /// TLS client authentication
    TlsClient,
    /// TLS server authentication
    TlsServer,
    /// Time stamping authorities
    TsaServer,
    /// Signed plugins, validated permissively
    PluginCodeSigning,
}

impl Variant {
    /// All variants, in declaration order
    pub const ALL: [Variant; 7] = [
        Variant::Generic,
        Variant::CodeSigning,
        Variant::JceSigning,
        Variant::TlsClient,
        Variant::TlsServer,
        Variant::TsaServer,
        Variant::PluginCodeSigning,
    ];

    /// Returns the string form of the variant
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Generic => "generic",
            Variant::CodeSigning => "code signing",
            Variant::JceSigning => "jce signing",
            Variant::TlsClient => "tls client",
            Variant::TlsServer => "tls server",
            Variant::TsaServer => "tsa server",
            Variant::PluginCodeSigning => "plugin code signing",
        }
    }

    /// Returns true for the permissive plugin variant
    pub fn is_plugin(&self) -> bool {
        matches!(self, Variant::PluginCodeSigning)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase().replace(['_', '-'], " ");
        for v in Variant::ALL {
            if v.as_str() == s {
                return Ok(v);
            }
        }
        error!("Unrecognized validator variant: {}", s);
        Err(Error::Unrecognized)
    }
}

fn default_max_path_length() -> u8 {
    PS_MAX_PATH_LENGTH_CONSTRAINT
}

/// `ValidationSettings` governs a [`TrustPathValidator`](crate::TrustPathValidator) instance. Settings are
/// fixed when the validator is constructed.
///
/// Absent fields take default values when deserialized from JSON.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Point in time at which certificates must be valid. When absent the current time is used at
    /// each validation.
    pub time_of_interest: Option<TimeOfInterest>,
    /// Revocation checking is not supported. Setting this to true causes validator construction to
    /// fail with [`Error::Misconfiguration`].
    pub check_revocation_status: bool,
    /// When true, the validity period of the trust anchor's certificate is checked along with the
    /// rest of the path.
    pub enforce_trust_anchor_validity: bool,
    /// Maximum number of certificates, excluding the trust anchor, a path builder may chain together.
    #[serde(default = "default_max_path_length")]
    pub max_path_length: u8,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        ValidationSettings {
            time_of_interest: None,
            check_revocation_status: false,
            enforce_trust_anchor_validity: false,
            max_path_length: PS_MAX_PATH_LENGTH_CONSTRAINT,
        }
    }
}

impl ValidationSettings {
    /// Creates a new [`ValidationSettings`] with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of these settings with the given time of interest
    pub fn with_time_of_interest(mut self, toi: TimeOfInterest) -> Self {
        self.time_of_interest = Some(toi);
        self
    }

    /// Returns the time of interest as seconds since the Unix epoch, using the current time when
    /// no time of interest was configured.
    pub fn get_time_of_interest(&self) -> u64 {
        match &self.time_of_interest {
            Some(toi) => toi.as_unix_secs(),
            None => now_as_unix_secs(),
        }
    }

    /// `check` returns [`Error::Misconfiguration`] for settings a validator cannot honor.
    pub fn check(&self) -> Result<()> {
        if self.check_revocation_status {
            error!("Revocation status checking is not supported");
            return Err(Error::Misconfiguration);
        }
        if 0 == self.max_path_length {
            error!("max_path_length must be greater than zero");
            return Err(Error::Misconfiguration);
        }
        Ok(())
    }
}

/// `read_settings` accepts a string containing the name of a file that notionally contains JSON data that
/// represents [`ValidationSettings`]. Default settings are returned when no file name is given.
pub fn read_settings(fname: &Option<String>) -> Result<ValidationSettings> {
    if let Some(fname) = fname {
        let p = Path::new(fname.as_str());
        if !Path::exists(p) {
            error!("Settings file {} does not exist", fname);
            return Err(Error::NotFound);
        }
        let json = get_file_as_byte_vec(p)?;
        let r: SerdeResult<ValidationSettings> = serde_json::from_slice(&json);
        return match r {
            Ok(settings) => Ok(settings),
            Err(e) => {
                error!("Failed to parse settings from {}: {}", fname, e);
                Err(Error::Misconfiguration)
            }
        };
    }
    Ok(ValidationSettings::default())
}

#[test]
fn variant_strings() {
    for v in Variant::ALL {
        assert_eq!(v, Variant::from_str(&v.to_string()).unwrap());
    }
    assert_eq!(
        Variant::PluginCodeSigning,
        Variant::from_str("Plugin_Code_Signing").unwrap()
    );
    assert_eq!(Variant::TlsServer, "tls-server".parse::<Variant>().unwrap());
    assert_eq!(Err(Error::Unrecognized), Variant::from_str("email"));
    assert!(Variant::PluginCodeSigning.is_plugin());
    assert!(!Variant::CodeSigning.is_plugin());
}

#[test]
fn default_settings() {
    let vs = ValidationSettings::default();
    assert_eq!(None, vs.time_of_interest);
    assert!(!vs.check_revocation_status);
    assert!(!vs.enforce_trust_anchor_validity);
    assert_eq!(15, vs.max_path_length);
    assert!(vs.check().is_ok());
    assert!(vs.get_time_of_interest() > 1_600_000_000);

    let vs = ValidationSettings {
        check_revocation_status: true,
        ..Default::default()
    };
    assert_eq!(Err(Error::Misconfiguration), vs.check());
}

#[test]
fn settings_json() {
    let vs: ValidationSettings = serde_json::from_str(r#"{"time_of_interest": 1700000000}"#).unwrap();
    assert_eq!(1_700_000_000, vs.get_time_of_interest());
    assert_eq!(15, vs.max_path_length);
    assert!(!vs.enforce_trust_anchor_validity);

    let s = serde_json::to_string(&vs).unwrap();
    let back: ValidationSettings = serde_json::from_str(&s).unwrap();
    assert_eq!(vs, back);
}
