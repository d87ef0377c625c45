//! Sources of trust anchors and candidate certificates

pub mod cert_source;
pub mod ta_source;

pub use crate::{source::cert_source::*, source::ta_source::*};
