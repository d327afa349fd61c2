use super::*;

#[test]
fn test_version_creation() {
    let version = Version::new("1.00").unwrap();
    assert_eq!(version.as_str(), "1.00");
    assert_eq!(format!("{}", version), "1.00");
}

#[test]
fn test_version_rejects_empty() {
    assert!(matches!(Version::new(""), Err(CoreError::EmptyVersion)));
    assert!("".parse::<Version>().is_err());
}

#[test]
fn test_version_equality() {
    let version = Version::new("v0.01").unwrap();
    assert_eq!(version, "v0.01");
    assert_eq!(version, "v0.01".to_string());
}

#[test]
fn test_version_ordering_is_lexicographic() {
    // Known limitation: not semantic-version aware.
    let mut versions = vec![Version::new("2.00").unwrap(), Version::new("10.00").unwrap()];
    versions.sort();
    assert_eq!(versions[0], "10.00");
    assert_eq!(versions[1], "2.00");
}

#[test]
fn test_version_deserialize_rejects_empty() {
    let ok: Version = serde_json::from_str("\"v1.00\"").unwrap();
    assert_eq!(ok, "v1.00");
    assert!(serde_json::from_str::<Version>("\"\"").is_err());
}
