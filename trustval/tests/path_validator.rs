use trustval::*;

mod common;
use common::*;

fn root_ta(root: &PDVCertificate) -> PDVTrustAnchorChoice {
    PDVTrustAnchorChoice::try_from(root.clone()).unwrap()
}

#[test]
fn valid_path() {
    let pki = mock_pki();
    let cp = CertificationPath::new(root_ta(&pki.root), vec![pki.ica.clone()], pki.leaf.clone());
    assert!(validate_path(&mock_environment(), &test_settings(), &cp).is_ok());
}

#[test]
fn name_chaining_failure() {
    let pki = mock_pki();
    let stray_leaf = mock_cert("CN=Leaf,O=Test", &mock_key(3), "CN=Other", &mock_key(2), 9);
    let cp = CertificationPath::new(root_ta(&pki.root), vec![pki.ica.clone()], stray_leaf.clone());

    let err = validate_path(&mock_environment(), &test_settings(), &cp).unwrap_err();
    assert_eq!(
        Some(PathValidationStatus::NameChainingFailure),
        err.path_validation_status()
    );
    assert_eq!(Some(&stray_leaf.decoded_cert), err.certificate());
}

#[test]
fn names_compare_loosely() {
    let root = mock_root("CN=Root,O=Test", &mock_key(1), 1);
    let ica = mock_cert("CN=ICA", &mock_key(2), "CN=ROOT,O=test", &mock_key(1), 2);
    let cp = CertificationPath::new(root_ta(&root), vec![], ica);
    assert!(check_names(&mock_environment(), &test_settings(), &cp).is_ok());
}

#[test]
fn no_verifier_is_signature_failure() {
    let pki = mock_pki();
    let cp = CertificationPath::new(root_ta(&pki.root), vec![pki.ica.clone()], pki.leaf.clone());
    let err = validate_path(&PkiEnvironment::new(), &test_settings(), &cp).unwrap_err();
    assert_eq!(
        Some(PathValidationStatus::SignatureVerificationFailure),
        err.path_validation_status()
    );
    assert_eq!(Some(&pki.ica.decoded_cert), err.certificate());
}

#[test]
fn trust_anchor_as_target() {
    let pki = mock_pki();
    let cp = CertificationPath::new(root_ta(&pki.root), vec![], pki.root.clone());
    assert!(cp.target_is_trust_anchor());
    // no signatures are checked
    assert!(validate_path(&PkiEnvironment::new(), &test_settings(), &cp).is_ok());
}

#[test]
fn trust_anchor_validity_is_optional() {
    let pki = mock_pki();
    let expired_root = mock_cert_with_validity(
        "CN=Root,O=Test",
        &mock_key(1),
        "CN=Root,O=Test",
        &mock_key(1),
        1,
        NOT_BEFORE,
        EXPIRED,
    );
    let cp = CertificationPath::new(root_ta(&expired_root), vec![pki.ica.clone()], pki.leaf.clone());

    let mut settings = test_settings();
    assert!(validate_path(&mock_environment(), &settings, &cp).is_ok());

    settings.enforce_trust_anchor_validity = true;
    let err = validate_path(&mock_environment(), &settings, &cp).unwrap_err();
    assert_eq!(
        Some(PathValidationStatus::InvalidNotAfterDate),
        err.path_validation_status()
    );
    assert_eq!(Some(&expired_root.decoded_cert), err.certificate());
}

#[test]
fn not_yet_valid_target() {
    let pki = mock_pki();
    let future_leaf = mock_cert_with_validity(
        "CN=Leaf,O=Test",
        &mock_key(3),
        "CN=ICA,O=Test",
        &mock_key(2),
        8,
        TOI + 1,
        NOT_AFTER,
    );
    let cp = CertificationPath::new(root_ta(&pki.root), vec![pki.ica.clone()], future_leaf.clone());
    let err = validate_path(&mock_environment(), &test_settings(), &cp).unwrap_err();
    assert_eq!(
        Some(PathValidationStatus::InvalidNotBeforeDate),
        err.path_validation_status()
    );
    assert_eq!(Some(&future_leaf.decoded_cert), err.certificate());
}

#[test]
fn zero_time_of_interest_disables_validity_check() {
    let pki = mock_pki();
    let expired_ica = mock_cert_with_validity(
        "CN=ICA,O=Test",
        &mock_key(2),
        "CN=Root,O=Test",
        &mock_key(1),
        2,
        NOT_BEFORE,
        EXPIRED,
    );
    let cp = CertificationPath::new(root_ta(&pki.root), vec![expired_ica], pki.leaf.clone());

    let settings =
        ValidationSettings::default().with_time_of_interest(TimeOfInterest::from_unix_secs(0).unwrap());
    assert!(validate_path(&mock_environment(), &settings, &cp).is_ok());
    assert!(validate_path(&mock_environment(), &test_settings(), &cp).is_err());
}

#[test]
fn settings_from_json() {
    let json = br#"{"time_of_interest": 1700000000, "enforce_trust_anchor_validity": true}"#;
    let settings: ValidationSettings = serde_json::from_slice(json).unwrap();
    assert_eq!(TOI, settings.get_time_of_interest());
    assert!(settings.enforce_trust_anchor_validity);
    assert!(!settings.check_revocation_status);
    assert_eq!(PS_MAX_PATH_LENGTH_CONSTRAINT, settings.max_path_length);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, json).unwrap();
    let read = read_settings(&Some(path.to_str().unwrap().to_string())).unwrap();
    assert_eq!(settings, read);

    let missing = dir.path().join("missing.json");
    assert_eq!(
        Some(Error::NotFound),
        read_settings(&Some(missing.to_str().unwrap().to_string())).err()
    );
}
