//! Certification path building and file-based loading of certificates and trust anchors

pub mod file_utils;
pub mod graph_builder;

pub use crate::builder::{file_utils::*, graph_builder::*};
