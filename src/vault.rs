//! Vault traversal and note file access.
//!
//! A vault is a directory tree of markdown notes. Both the linker and the
//! rater start from [`scan_vault`], which takes an in-memory snapshot of every
//! readable note.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const NOTE_EXTENSION: &str = ".md";

/// Snapshot of a single note taken at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    /// File name without the `.md` extension
    pub title: String,
    /// Full path, unique per note
    pub path: PathBuf,
    /// Raw UTF-8 content
    pub content: String,
}

/// Result of walking the vault.
#[derive(Debug, Default)]
pub struct VaultScan {
    /// Notes in discovery order
    pub notes: Vec<NoteRecord>,
    /// Markdown files that could not be read
    pub unreadable: usize,
}

/// Recursively collect every markdown note under `root`.
///
/// Entries are visited sorted by file name, so discovery order is stable
/// across runs. Unreadable files are logged and skipped.
pub fn scan_vault(root: &Path) -> VaultScan {
    let mut scan = VaultScan::default();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("could not walk {}: {err}", root.display());
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(title) = note_title(entry.path()) else {
            continue;
        };

        match read_note(entry.path()) {
            Ok(content) => scan.notes.push(NoteRecord {
                title,
                path: entry.path().to_path_buf(),
                content,
            }),
            Err(err) => {
                log::warn!("Could not read file {}: {err}", entry.path().display());
                scan.unreadable += 1;
            }
        }
    }

    scan
}

/// Title for a markdown file, or `None` if the file is not a note.
pub fn note_title(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    name.strip_suffix(NOTE_EXTENSION).map(str::to_string)
}

/// Read a note as UTF-8. Invalid UTF-8 is an `InvalidData` error.
pub fn read_note(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

/// Overwrite a note in place.
pub fn write_note(path: &Path, content: &str) -> std::io::Result<()> {
    std::fs::write(path, content.as_bytes())
}
