//! Utils to define the time of interest when validating certificates

use core::{cmp::Ordering, fmt, time::Duration};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{
    de::{self, Deserializer, Visitor},
    ser::Serializer,
    Deserialize, Serialize,
};

/// Time of interest for the validation of a certificate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct TimeOfInterest(pub der::DateTime);

impl fmt::Display for TimeOfInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TimeOfInterest {
    /// Create a [`TimeOfInterest`] from Unix epoch
    pub fn from_unix_secs(v: u64) -> der::Result<Self> {
        Ok(Self(der::DateTime::from_unix_duration(
            Duration::from_secs(v),
        )?))
    }

    /// Creates a [`TimeOfInterest`] for the current system time
    pub fn now() -> der::Result<Self> {
        Ok(Self(der::DateTime::from_system_time(SystemTime::now())?))
    }

    /// Return Unix epoch (in seconds) for this value
    pub fn as_unix_secs(&self) -> u64 {
        self.0.unix_duration().as_secs()
    }
}

/// Returns the current system time as seconds since the Unix epoch, or zero if the clock is set
/// prior to the epoch (which disables validity checks).
pub fn now_as_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl PartialEq<x509_cert::time::Time> for TimeOfInterest {
    fn eq(&self, other: &x509_cert::time::Time) -> bool {
        self.0.eq(&other.to_date_time())
    }
}

impl PartialOrd<x509_cert::time::Time> for TimeOfInterest {
    fn partial_cmp(&self, other: &x509_cert::time::Time) -> Option<Ordering> {
        self.0.partial_cmp(&other.to_date_time())
    }
}

impl Serialize for TimeOfInterest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.as_unix_secs())
    }
}

impl<'de> Deserialize<'de> for TimeOfInterest {
    fn deserialize<D>(deserializer: D) -> Result<TimeOfInterest, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ToiVisitor;

        impl<'de> Visitor<'de> for ToiVisitor {
            type Value = TimeOfInterest;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an integer between 0 and 2^64")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                TimeOfInterest::from_unix_secs(value)
                    .map_err(|_| E::custom(format!("time of interest out of range: {value}")))
            }
        }

        deserializer.deserialize_u64(ToiVisitor)
    }
}

#[test]
fn toi_serde() {
    let toi = TimeOfInterest::from_unix_secs(1_700_000_000).unwrap();
    let s = serde_json::to_string(&toi).unwrap();
    assert_eq!("1700000000", s);
    let back: TimeOfInterest = serde_json::from_str(&s).unwrap();
    assert_eq!(toi, back);
    assert!(serde_json::from_str::<TimeOfInterest>("\"yesterday\"").is_err());
}

#[test]
fn toi_now() {
    let toi = TimeOfInterest::now().unwrap();
    assert!(toi.as_unix_secs() > 1_600_000_000);
    assert!(now_as_unix_secs() >= toi.as_unix_secs());
}
