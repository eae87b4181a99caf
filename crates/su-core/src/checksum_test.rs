use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_compute_checksum_known_vector() {
    assert_eq!(
        compute_checksum("abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_file_digest_matches_string_checksum() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("01_init.sql");
    let content = "CREATE TABLE t (id INT);\n";
    fs::write(&path, content).unwrap();

    let digest = compute_file_digest(&path).unwrap();
    assert_eq!(digest, compute_checksum(content));
    assert_eq!(digest.len(), 64);
    assert!(digest
        .chars()
        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_file_digest_is_deterministic() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("02_seed.sql");
    fs::write(&path, "INSERT INTO t VALUES (1);\n").unwrap();

    let first = compute_file_digest(&path).unwrap();
    let second = compute_file_digest(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_file_digest_changes_with_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("03_more.sql");
    fs::write(&path, "SELECT 1;\n").unwrap();
    let before = compute_file_digest(&path).unwrap();

    fs::write(&path, "SELECT 2;\n").unwrap();
    let after = compute_file_digest(&path).unwrap();
    assert_ne!(before, after);
}

#[test]
fn test_file_digest_missing_file() {
    let dir = tempdir().unwrap();
    let err = compute_file_digest(&dir.path().join("missing.sql")).unwrap_err();
    assert!(matches!(err, CoreError::IoWithPath { .. }));
}
