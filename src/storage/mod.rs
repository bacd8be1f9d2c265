pub mod json_backend;

use std::path::Path;

use crate::{errors::LoanError, ledger::LoanBook};

pub type Result<T> = std::result::Result<T, LoanError>;

/// Abstraction over persistence backends capable of storing loan books and
/// snapshots, keyed by owner.
///
/// Backends provide durability only; they do no locking. Callers serialize
/// writes per book.
pub trait StorageBackend: Send + Sync {
    fn save(&self, book: &LoanBook, owner: &str) -> Result<()>;
    fn load(&self, owner: &str) -> Result<LoanBook>;
    fn list_books(&self) -> Result<Vec<String>>;
    fn list_backups(&self, owner: &str) -> Result<Vec<String>>;
    fn backup(&self, book: &LoanBook, owner: &str, note: Option<&str>) -> Result<()>;
    fn restore(&self, owner: &str, backup_name: &str) -> Result<LoanBook>;

    /// Optional helpers for ad-hoc file operations. Default implementations forward to
    /// managed storage when not overridden.
    fn save_to_path(&self, book: &LoanBook, path: &Path) -> Result<()> {
        json_backend::save_book_to_path(book, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<LoanBook> {
        json_backend::load_book_from_path(path)
    }
}

pub use json_backend::{book_warnings, JsonStorage};
