//! Ledger export and atomic file writes
//!
//! Files are written to a hidden temporary file beside the target and
//! renamed into place, so a failed export never leaves a partial file.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ExportError;
use crate::records::{timestamp, AccountRecord};

pub const TEXT_HEADER: &str = "=== Created Email Accounts ===";
pub const SEPARATOR_WIDTH: usize = 50;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Human-readable block per account
    #[default]
    Text,
    /// JSON array of records
    Structured,
}

impl ExportFormat {
    /// `Structured` for `.json` paths, `Text` otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Structured,
            _ => ExportFormat::Text,
        }
    }
}

pub fn render_text(accounts: &[AccountRecord]) -> String {
    let mut out = format!("{TEXT_HEADER}\n\n");
    let separator = "-".repeat(SEPARATOR_WIDTH);
    for (i, account) in accounts.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "Account #{}\n\
             Provider: {}\n\
             Username: {}\n\
             Password: {}\n\
             Name: {} {}\n\
             Birthday: {}\n\
             Country: {}\n\
             Created: {}\n\
             Status: {}\n\
             {}\n\n",
            i + 1,
            account.provider,
            account.username,
            account.password,
            account.first_name,
            account.last_name,
            account.birthdate,
            account.country,
            account.created_at.format(timestamp::FORMAT),
            account.status,
            separator,
        );
    }
    out
}

pub fn render_structured(accounts: &[AccountRecord]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(accounts)?)
}

/// Render and atomically write `accounts`. An empty slice writes nothing.
pub fn write_accounts(
    path: &Path,
    accounts: &[AccountRecord],
    format: ExportFormat,
) -> Result<(), ExportError> {
    if accounts.is_empty() {
        return Err(ExportError::EmptyLedger);
    }
    let contents = match format {
        ExportFormat::Text => render_text(accounts),
        ExportFormat::Structured => render_structured(accounts)?,
    };
    write_atomic(path, &contents).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read back a structured export.
pub fn read_accounts(path: &Path) -> Result<Vec<AccountRecord>, ExportError> {
    let json = fs::read_to_string(path).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}

/// Replace `path` with `contents` via a synced temp file and a rename.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "export path must name a file"))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let mut tmp_name = OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".tmp.{}.{}.{}", std::process::id(), suffix, counter));
    let tmp_path = dir.join(tmp_name);

    if let Err(err) = write_temp(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    sync_dir(&dir);
    Ok(())
}

fn write_temp(tmp_path: &Path, contents: &str) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp_path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

fn sync_dir(dir: &Path) {
    // Directories cannot be opened for syncing on every platform.
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}
