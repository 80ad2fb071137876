//! Filesystem access for the notes directory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{ExportError, Result};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Every non-hidden file under `root` with the given extension, sorted by path
pub fn list_notes(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("filesystem loop"));
            ExportError::io_at(path, source)
        })?;

        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == extension)
        {
            paths.push(entry.into_path());
        }
    }

    Ok(paths)
}

/// Create the notes root when it does not exist yet
pub fn ensure_root(root: &Path) -> Result<()> {
    if !root.is_dir() {
        tracing::info!(root = %root.display(), "creating notes directory");
        fs::create_dir_all(root).map_err(|e| ExportError::io_at(root, e))?;
    }
    Ok(())
}

/// Read a note as UTF-8.
///
/// Content that does not decode is an invalid note, not an I/O failure.
pub fn read_note(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| ExportError::io_at(path, e))?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFrontmatter {
        path: path.to_path_buf(),
        reason: format!("not valid UTF-8: {}", e.utf8_error()),
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Replace `path` with `content` in one step.
///
/// The content goes to a hidden sibling first and is renamed over the target,
/// so readers never see a partially written note.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp = temp_path(path);
    fs::write(&tmp, content).map_err(|e| ExportError::io_at(&tmp, e))?;

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(ExportError::io_at(path, e));
    }
    Ok(())
}
