//! Integration tests for the archive lifecycle

use corpusdb::prelude::*;
use std::fs;
use tempfile::TempDir;

fn seeded_store(temp: &TempDir) -> std::path::PathBuf {
    let path = temp.path().join("corpus.db");
    let db = CorpusDb::open(&path).unwrap();

    let mut frame = Frame::new(vec!["id", "body"]);
    for i in 0..50 {
        frame
            .push_row(vec![
                Value::from(format!("k{i:03}")),
                Value::from("some article text\n\nwith a second paragraph"),
            ])
            .unwrap();
    }
    db.ingest().append_frame(&frame, "Docs", true, None).unwrap();
    db.close().unwrap();
    path
}

#[test]
fn test_pack_unpack_round_trip_is_byte_identical() {
    let temp = tempfile::tempdir().unwrap();
    let path = seeded_store(&temp);
    let original = fs::read(&path).unwrap();

    let archive_path = ArchiveManager::pack(&path, None).unwrap();
    assert!(!path.exists());
    assert!(archive_path.is_file());
    assert_eq!(archive_path, ArchiveManager::archive_path(&path));

    ArchiveManager::unpack(&path).unwrap();
    let restored = fs::read(&path).unwrap();
    assert_eq!(original, restored);

    // Archive is retained as a durable backup
    assert!(archive_path.is_file());
}

#[test]
fn test_pack_reports_progress_in_bytes() {
    let temp = tempfile::tempdir().unwrap();
    let path = seeded_store(&temp);
    let total_bytes = fs::metadata(&path).unwrap().len() as usize;

    let seen = std::cell::Cell::new((0usize, 0usize));
    let cb = |current: usize, total: usize| seen.set((current, total));
    ArchiveManager::pack(&path, Some(&cb)).unwrap();

    assert_eq!(seen.get(), (total_bytes, total_bytes));
}

#[test]
fn test_unpack_refuses_to_clobber_raw_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = seeded_store(&temp);

    ArchiveManager::pack(&path, None).unwrap();
    ArchiveManager::unpack(&path).unwrap();

    // Both representations now exist; a second unpack must refuse
    let raw_before = fs::read(&path).unwrap();
    let err = ArchiveManager::unpack(&path).unwrap_err();
    assert!(matches!(err, CorpusError::ArchiveIntegrity(_)));
    assert_eq!(fs::read(&path).unwrap(), raw_before);
}

#[test]
fn test_verify_rejects_corrupt_archive() {
    let temp = tempfile::tempdir().unwrap();
    let path = seeded_store(&temp);
    let archive_path = ArchiveManager::pack(&path, None).unwrap();

    // Flip a byte in the middle of the archive
    let mut bytes = fs::read(&archive_path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xff;
    fs::write(&archive_path, &bytes).unwrap();

    let err = ArchiveManager::verify(&archive_path).unwrap_err();
    assert!(matches!(err, CorpusError::ArchiveIntegrity(_)));
}

#[test]
fn test_pack_missing_raw_file_fails() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("nothing.db");

    let err = ArchiveManager::pack(&path, None).unwrap_err();
    assert!(matches!(err, CorpusError::StoreUnavailable { .. }));
}

#[test]
fn test_db_pack_closes_and_archives() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("corpus.db");

    let db = CorpusDb::open(&path).unwrap();
    db.schema()
        .create_table("t", &[ColumnDef::primary_key("id")], &[], false)
        .unwrap();
    db.ingest().insert_row("t", &[Value::from("k1")]).unwrap();

    let archive_path = db.pack(None).unwrap();
    assert!(!path.exists());
    assert!(archive_path.is_file());
    assert!(ArchiveManager::is_archived(&path));
}

#[test]
fn test_connect_auto_restores_from_archive() {
    let temp = tempfile::tempdir().unwrap();
    let path = seeded_store(&temp);
    ArchiveManager::pack(&path, None).unwrap();
    assert!(!path.exists());

    let db = CorpusDb::connect(&path, true).unwrap();
    assert_eq!(db.query().count("*", "Docs").unwrap(), 50);
    db.close().unwrap();
}

#[test]
fn test_connect_without_auto_restore_opens_fresh_store() {
    let temp = tempfile::tempdir().unwrap();
    let path = seeded_store(&temp);
    ArchiveManager::pack(&path, None).unwrap();

    // Without auto-restore a fresh empty store is created beside the archive
    let db = CorpusDb::connect(&path, false).unwrap();
    assert!(db.schema().list_tables().unwrap().is_empty());
    db.close().unwrap();
}

#[test]
fn test_store_never_left_with_neither_representation() {
    let temp = tempfile::tempdir().unwrap();
    let path = seeded_store(&temp);
    let archive_path = ArchiveManager::archive_path(&path);

    // After a successful pack: archive yes, raw no
    ArchiveManager::pack(&path, None).unwrap();
    assert!(archive_path.is_file() || path.is_file());

    // After unpack: both exist, raw is authoritative for the next open
    ArchiveManager::unpack(&path).unwrap();
    assert!(path.is_file());
}
