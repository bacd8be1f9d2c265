use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    errors::LoanError,
    interest::round2,
    ledger::LoanBook,
    utils::{self, ensure_dir},
};

use super::{Result, StorageBackend};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// One cent; entry arithmetic is rounded to two decimals at write time.
const RECONCILE_TOLERANCE: f64 = 0.01;

/// File-per-owner JSON persistence with timestamped backups.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    books_dir: PathBuf,
    backups_dir: PathBuf,
    state_file: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = root.unwrap_or_else(utils::app_data_dir);
        ensure_dir(&app_root)?;
        let books_dir = utils::books_dir_in(&app_root);
        let backups_dir = utils::backups_dir_in(&app_root);
        ensure_dir(&books_dir)?;
        ensure_dir(&backups_dir)?;
        let state_file = utils::state_file_in(&app_root);
        Ok(Self {
            root: app_root,
            books_dir,
            backups_dir,
            state_file,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn book_path(&self, owner: &str) -> PathBuf {
        self.books_dir
            .join(format!("{}.json", canonical_name(owner)))
    }

    fn backup_dir(&self, owner: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(owner))
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn last_book(&self) -> Result<Option<String>> {
        let state = self.read_state()?;
        Ok(state.last_book)
    }

    pub fn record_last_book(&self, owner: Option<&str>) -> Result<()> {
        let mut state = self.read_state()?;
        state.last_book = owner.map(canonical_name);
        let data = serde_json::to_string_pretty(&state)?;
        write_atomic(&self.state_file, &data)?;
        Ok(())
    }

    fn read_state(&self) -> Result<StoreState> {
        if self.state_file.exists() {
            let data = fs::read_to_string(&self.state_file)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(StoreState::default())
        }
    }

    pub fn backup_path(&self, owner: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(owner).join(backup_name)
    }

    fn write_backup_file(&self, book: &LoanBook, owner: &str, note: Option<&str>) -> Result<()> {
        let dir = self.backup_dir(owner);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut file_stem = format!("{}_{}", canonical_name(owner), timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            file_stem.push('_');
            file_stem.push_str(&label);
        }
        let path = dir.join(format!("{}.{}", file_stem, BACKUP_EXTENSION));
        let json = serde_json::to_string_pretty(book)?;
        write_atomic(&path, &json)?;
        self.prune_backups(owner)?;
        Ok(())
    }

    fn backup_existing_file(&self, owner: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(owner);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup_name = format!(
            "{}_{}.{}",
            canonical_name(owner),
            timestamp,
            BACKUP_EXTENSION
        );
        let backup_path = dir.join(&backup_name);
        fs::copy(path, &backup_path)?;
        self.prune_backups(owner)?;
        Ok(())
    }

    fn prune_backups(&self, owner: &str) -> Result<()> {
        let backups = self.list_backups(owner)?;
        if backups.len() <= self.retention {
            return Ok(());
        }
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(owner, entry);
            let _ = fs::remove_file(path);
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, book: &LoanBook, owner: &str) -> Result<()> {
        let path = self.book_path(owner);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        if path.exists() {
            self.backup_existing_file(owner, &path)?;
        }
        let json = serde_json::to_string_pretty(book)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(owner, loans = book.loan_count(), "book saved");
        Ok(())
    }

    fn load(&self, owner: &str) -> Result<LoanBook> {
        let path = self.book_path(owner);
        load_book_from_path(&path)
    }

    fn list_books(&self) -> Result<Vec<String>> {
        if !self.books_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.books_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                entries.push(stem.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn list_backups(&self, owner: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(owner);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let file_name = match path.file_name().and_then(|stem| stem.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            entries.push(file_name);
        }
        entries.sort_by(|a, b| parse_backup_timestamp(b).cmp(&parse_backup_timestamp(a)));
        Ok(entries)
    }

    fn backup(&self, book: &LoanBook, owner: &str, note: Option<&str>) -> Result<()> {
        self.write_backup_file(book, owner, note)
    }

    fn restore(&self, owner: &str, backup_name: &str) -> Result<LoanBook> {
        let backup_path = self.backup_path(owner, backup_name);
        if !backup_path.exists() {
            return Err(LoanError::StorageError(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let target = self.book_path(owner);
        fs::copy(&backup_path, &target)?;
        tracing::info!(owner, backup = backup_name, "book restored from backup");
        load_book_from_path(&target)
    }
}

pub fn save_book_to_path(book: &LoanBook, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(book)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Typed deserialization boundary: untrusted files become a validated
/// `LoanBook` or an error, never a loosely-shaped map.
pub fn load_book_from_path(path: &Path) -> Result<LoanBook> {
    let data = fs::read_to_string(path)?;
    let book: LoanBook = serde_json::from_str(&data)?;
    if book.schema_version > LoanBook::schema_version_default() {
        return Err(LoanError::StorageError(format!(
            "book `{}` is from a newer schema version",
            path.display()
        )));
    }
    Ok(book)
}

/// Referential and arithmetic checks over a loaded book.
///
/// Advisory: the caller decides whether a warning blocks anything. Loads
/// always return the data as stored.
pub fn book_warnings(book: &LoanBook) -> Vec<String> {
    let person_ids: HashSet<_> = book.persons.iter().map(|p| p.id).collect();
    let mut warnings = Vec::new();

    for loan in &book.loans {
        if !person_ids.contains(&loan.person_id) {
            warnings.push(format!(
                "loan {} references unknown person {}",
                loan.id, loan.person_id
            ));
        }
        if loan.due_date <= loan.start_date {
            warnings.push(format!("loan {} due date is not after start date", loan.id));
        }

        let mut previous_date = None;
        for (index, entry) in loan.payment_history.iter().enumerate() {
            if let Some(previous) = previous_date {
                if entry.deposit_date < previous {
                    warnings.push(format!(
                        "loan {} payment history is out of order at entry {}",
                        loan.id, index
                    ));
                }
            }
            previous_date = Some(entry.deposit_date);

            let expected = round2(
                entry.balance_before + entry.interest_for_period - entry.payment_amount,
            )
            .max(0.0);
            if (entry.new_balance - expected).abs() > RECONCILE_TOLERANCE {
                warnings.push(format!(
                    "loan {} entry {} does not reconcile: {} recorded, {} expected",
                    loan.id, index, entry.new_balance, expected
                ));
            }
        }

        if let Some(last) = loan.payment_history.last() {
            if (loan.current_balance - last.new_balance).abs() > RECONCILE_TOLERANCE {
                warnings.push(format!(
                    "loan {} current balance {} disagrees with its history ({})",
                    loan.id, loan.current_balance, last.new_balance
                ));
            }
            if (loan.total_interest_paid - last.cumulative_interest).abs() > RECONCILE_TOLERANCE {
                warnings.push(format!(
                    "loan {} interest paid {} disagrees with its history ({})",
                    loan.id, loan.total_interest_paid, last.cumulative_interest
                ));
            }
        }
    }
    warnings
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    last_book: Option<String>,
}

fn canonical_name(owner: &str) -> String {
    let sanitized: String = owner
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "book".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if ch.is_whitespace() || matches!(ch, '-' | '.') {
            if !sanitized.is_empty() && !last_dash {
                sanitized.push('-');
                last_dash = true;
            }
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = name.split('_').collect();
    if parts.len() < 3 {
        return None;
    }
    let date_part = parts.get(parts.len() - 2)?;
    let time_part = parts.last()?;
    if !is_digits(date_part, 8) || !time_part.ends_with(".json") {
        return None;
    }
    let time_digits = &time_part[..time_part.len() - 5];
    if !is_digits(time_digits, 4) {
        return None;
    }
    let raw = format!("{}{}", date_part, time_digits);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
