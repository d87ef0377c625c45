//! The file_utils module contains utility functions related to interactions with the filesystem.

use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, error};
use walkdir::WalkDir;

use crate::util::pdv_utilities::*;
use crate::*;

/// `ta_folder_to_vec` is used to help process a folder containing trust anchor files for use as a
/// trust store.
///
/// `ta_folder_to_vec` takes a string containing the full path of a folder containing binary DER or
/// PEM encoded Certificate or TrustAnchorChoice files, a mutable vector of [`PDVTrustAnchorChoice`]
/// objects and a time of interest, expressed as seconds since Unix epoch. It recursively traverses
/// the directory populating the vector with items corresponding to files that could be processed as
/// a TrustAnchorChoice that is valid at the time of interest and returns the number of items added.
/// Pass 0 for `time_of_interest` to skip the validity check.
///
/// Only files with .der, .cer, .crt, .pem or .ta extensions are processed.
pub fn ta_folder_to_vec(
    tas_dir: &str,
    tas_vec: &mut Vec<PDVTrustAnchorChoice>,
    time_of_interest: u64,
) -> Result<usize> {
    let initial_count = tas_vec.len();
    for (path, buffer) in read_folder(tas_dir, &["der", "crt", "cer", "pem", "ta"])? {
        let locator = path.to_str().unwrap_or("");
        let ta = match parse_ta(buffer.as_slice(), locator) {
            Ok(ta) => ta,
            Err(_e) => continue,
        };
        if valid_at_time(&ta.certificate.decoded_cert, time_of_interest, true).is_err() {
            error!(
                "Ignored {} as not valid at indicated time of interest",
                locator
            );
            continue;
        }
        if !tas_vec.contains(&ta) {
            tas_vec.push(ta);
        }
    }
    Ok(tas_vec.len() - initial_count)
}

/// `cert_folder_to_vec` is used to help process a folder containing certificate files for use as
/// extra certificates available to a path builder.
///
/// `cert_folder_to_vec` takes a string containing the full path of a folder containing binary DER or
/// PEM encoded Certificate files, a mutable vector of [`PDVCertificate`] objects and a time of interest,
/// expressed as seconds since Unix epoch. It recursively traverses the directory populating the
/// vector with items corresponding to files that could be processed as a Certificate that is valid
/// at the time of interest and returns the number of items added. Pass 0 for `time_of_interest` to
/// skip the validity check.
///
/// Only files with .der, .cer, .crt or .pem extensions are processed.
pub fn cert_folder_to_vec(
    certs_dir: &str,
    certs_vec: &mut Vec<PDVCertificate>,
    time_of_interest: u64,
) -> Result<usize> {
    let initial_count = certs_vec.len();
    for (path, buffer) in read_folder(certs_dir, &["der", "crt", "cer", "pem"])? {
        let locator = path.to_str().unwrap_or("");
        let cert = match parse_cert(buffer.as_slice(), locator) {
            Ok(cert) => cert,
            Err(_e) => continue,
        };
        if valid_at_time(&cert.decoded_cert, time_of_interest, true).is_err() {
            error!(
                "Ignored {} as not valid at indicated time of interest",
                locator
            );
            continue;
        }
        if !certs_vec.contains(&cert) {
            certs_vec.push(cert);
        }
    }
    Ok(certs_vec.len() - initial_count)
}

/// `read_certificates` reads each of the named files as a DER or PEM encoded certificate, returning
/// the certificates in the order given. Any file that cannot be read or parsed causes an error.
pub fn read_certificates(filenames: &[String]) -> Result<Vec<PDVCertificate>> {
    let mut certs = vec![];
    for f in filenames {
        let buffer = get_file_as_byte_vec_pem(Path::new(f.as_str()))?;
        certs.push(parse_cert(buffer.as_slice(), f.as_str())?);
    }
    Ok(certs)
}

// recursively collects the contents of files with one of the given extensions
fn read_folder(dir: &str, file_exts: &[&str]) -> Result<Vec<(std::path::PathBuf, Vec<u8>)>> {
    if !Path::is_dir(Path::new(dir)) {
        error!("{} does not exist or is not a directory", dir);
        return Err(Error::NotFound);
    }

    let mut v = vec![];
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let e = match entry {
            Ok(e) => e,
            Err(err) => {
                error!("Failed to read entry while traversing {}: {}", dir, err);
                continue;
            }
        };
        if e.file_type().is_dir() {
            continue;
        }
        let path = e.path();
        match path.extension().and_then(OsStr::to_str) {
            Some(ext) if file_exts.contains(&ext.to_lowercase().as_str()) => {}
            _ => {
                debug!("Skipping {}", path.display());
                continue;
            }
        }
        match get_file_as_byte_vec_pem(path) {
            Ok(buffer) => v.push((path.to_path_buf(), buffer)),
            Err(err) => {
                error!("Failed to read {}: {}", path.display(), err);
                continue;
            }
        }
    }
    Ok(v)
}

/// `get_file_as_byte_vec` takes a Path containing a file name and returns a vector of bytes containing
/// the contents of that file or an [Error::StdIoError].
pub fn get_file_as_byte_vec(filename: &Path) -> Result<Vec<u8>> {
    match File::open(filename) {
        Ok(mut f) => {
            let mut buffer = vec![];
            match f.read_to_end(&mut buffer) {
                Ok(_) => Ok(buffer),
                Err(e) => Err(Error::StdIoError(e.kind())),
            }
        }
        Err(e) => Err(Error::StdIoError(e.kind())),
    }
}

/// `get_file_as_byte_vec_pem` takes a Path containing a file name and returns a vector of bytes containing
/// the contents of that file or an [Error::StdIoError]. If the file is PEM encoded, it is decoded
/// prior to returning the vector of bytes. To read without PEM, use `get_file_as_byte_vec`.
pub fn get_file_as_byte_vec_pem(filename: &Path) -> Result<Vec<u8>> {
    let b = get_file_as_byte_vec(filename)?;
    if b.first() == Some(&0x2D) {
        return match pem_rfc7468::decode_vec(b.as_slice()) {
            Ok(b) => Ok(b.1),
            Err(e) => {
                error!("Failed to parse PEM from {:?}: {:?}", filename, e);
                Err(Error::Unrecognized)
            }
        };
    }
    Ok(b)
}

#[test]
fn non_existent_dir() {
    let mut certsvec = vec![];
    let r = cert_folder_to_vec("tests/examples/nonexistent", &mut certsvec, 0);
    assert_eq!(Some(Error::NotFound), r.err());
    let mut tasvec = vec![];
    let r = ta_folder_to_vec("tests/examples/nonexistent", &mut tasvec, 0);
    assert_eq!(Some(Error::NotFound), r.err());
}

#[test]
fn missing_file() {
    let r = get_file_as_byte_vec(Path::new("tests/examples/nonexistent.der"));
    assert_eq!(
        Some(Error::StdIoError(std::io::ErrorKind::NotFound)),
        r.err()
    );
    let r = read_certificates(&["tests/examples/nonexistent.der".to_string()]);
    assert!(r.is_err());
}
