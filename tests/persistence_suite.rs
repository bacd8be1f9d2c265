mod common;

use std::fs;
use std::path::{Path, PathBuf};

use common::{book_with_annual_loan, date, temp_storage};
use loan_core::core::services::PaymentService;
use loan_core::ledger::PaymentRequest;
use loan_core::storage::{book_warnings, JsonStorage, StorageBackend};

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => String::from("tmp"),
    };
    tmp.set_extension(ext);
    tmp
}

#[test]
fn roundtrip_preserves_payment_history() {
    let (storage, _guard) = temp_storage();
    let (mut book, _, loan_id) = book_with_annual_loan(10_000.0, 12.0);
    PaymentService::record(
        &mut book,
        loan_id,
        PaymentRequest::new(2_500.0, date(2024, 5, 1)).with_description("first installment"),
    )
    .unwrap();

    storage.save(&book, "household").expect("save book");
    let loaded = storage.load("household").expect("load book");

    let original = book.loan(loan_id).unwrap();
    let restored = loaded.loan(loan_id).expect("loan survives the roundtrip");
    assert_eq!(restored.payment_history.len(), 1);
    assert_eq!(
        restored.payment_history[0].new_balance,
        original.payment_history[0].new_balance
    );
    assert_eq!(restored.current_balance, original.current_balance);
    assert_eq!(
        restored.payment_history[0].description.as_deref(),
        Some("first installment")
    );
    assert!(book_warnings(&loaded).is_empty());
}

#[test]
fn overwriting_a_book_leaves_a_backup_behind() {
    let (storage, _guard) = temp_storage();
    let (book, _, _) = book_with_annual_loan(1_000.0, 12.0);

    storage.save(&book, "family").expect("first save");
    storage.save(&book, "family").expect("second save");

    let backups = storage.list_backups("family").expect("list backups");
    assert!(!backups.is_empty());
}

#[test]
fn restore_brings_back_the_earlier_state() {
    let (storage, _guard) = temp_storage();
    let (mut book, _, loan_id) = book_with_annual_loan(1_000.0, 12.0);
    storage.save(&book, "family").expect("initial save");
    storage
        .backup(&book, "family", Some("before payments"))
        .expect("explicit backup");

    PaymentService::record(
        &mut book,
        loan_id,
        PaymentRequest::new(400.0, date(2024, 3, 1)),
    )
    .unwrap();
    storage.save(&book, "family").expect("save after payment");

    let backups = storage.list_backups("family").expect("list backups");
    let snapshot = backups
        .iter()
        .find(|name| name.contains("before-payments"))
        .expect("named backup present");
    let restored = storage.restore("family", snapshot).expect("restore");
    assert!(restored
        .loan(loan_id)
        .expect("loan present")
        .payment_history
        .is_empty());
}

#[test]
fn retention_caps_backup_count() {
    let (storage, _guard) = temp_storage();
    let (book, _, _) = book_with_annual_loan(1_000.0, 12.0);
    for _ in 0..6 {
        storage.backup(&book, "family", None).expect("backup");
    }
    let backups = storage.list_backups("family").expect("list backups");
    assert!(backups.len() <= 3, "retention must prune old backups");
}

#[test]
fn last_book_state_survives_reopening() {
    let (storage, guard) = temp_storage();
    storage.record_last_book(Some("Household")).unwrap();
    drop(storage);

    let reopened = JsonStorage::new(Some(guard.path().to_path_buf()), Some(3)).unwrap();
    assert_eq!(reopened.last_book().unwrap().as_deref(), Some("household"));
}

#[test]
fn newer_schema_versions_are_refused() {
    let (storage, _guard) = temp_storage();
    let (book, _, _) = book_with_annual_loan(1_000.0, 12.0);
    storage.save(&book, "future").expect("save book");

    let path = storage.book_path("future");
    let mut raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    raw["schema_version"] = serde_json::json!(99);
    fs::write(&path, serde_json::to_string_pretty(&raw).unwrap()).unwrap();

    let err = storage.load("future").expect_err("newer schema must fail");
    assert!(err.to_string().contains("newer schema"));
}

#[test]
fn tampered_histories_surface_warnings() {
    let (storage, _guard) = temp_storage();
    let (mut book, _, loan_id) = book_with_annual_loan(1_000.0, 12.0);
    PaymentService::record(
        &mut book,
        loan_id,
        PaymentRequest::new(400.0, date(2024, 3, 1)),
    )
    .unwrap();
    book.loan_mut(loan_id).unwrap().payment_history[0].new_balance += 100.0;
    storage.save(&book, "drifted").expect("save book");

    let loaded = storage.load("drifted").expect("load succeeds regardless");
    let warnings = book_warnings(&loaded);
    assert!(warnings.iter().any(|w| w.contains("does not reconcile")));
}

#[test]
fn failed_atomic_save_preserves_the_original_file() {
    let (storage, _guard) = temp_storage();
    let (book, _, _) = book_with_annual_loan(1_000.0, 12.0);
    storage.save(&book, "reliable").expect("initial save");
    let path = storage.book_path("reliable");
    let original = fs::read_to_string(&path).expect("read original file");

    // A directory squatting on the temp file name forces File::create to fail.
    let tmp = tmp_path_for(&path);
    fs::create_dir_all(&tmp).unwrap();

    let result = storage.save_to_path(&book, &path);
    assert!(result.is_err(), "save must fail when the temp path is taken");
    let current = fs::read_to_string(&path).expect("read after failure");
    assert_eq!(original, current);
}
