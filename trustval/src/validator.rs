//! Trust path validation: the linear-scan validator, full signature and name validation, and the
//! certificate, trust anchor and path types they operate on

pub mod cert_path;
pub mod path_settings;
pub mod path_validator;
pub mod pdv_certificate;
pub mod pdv_trust_anchor;
pub mod trust_path_validator;

pub use crate::{
    validator::cert_path::*, validator::path_settings::*, validator::path_validator::*,
    validator::pdv_certificate::*, validator::pdv_trust_anchor::*,
    validator::trust_path_validator::*,
};
