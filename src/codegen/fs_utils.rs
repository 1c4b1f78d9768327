//! Filesystem utilities for code generation: write file, create archive, delete tree

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::GenerationError;

/// Write content to a file, creating parent directories if needed
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    let path = path.as_ref();

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, contents)
}

/// Archive every file below `source_dir` into a zip at `archive_path`
///
/// Entry names are relative to `source_dir` and always use `/` separators.
/// Entries are added in sorted order so the same tree always produces the
/// same entry list. Returns the number of files archived.
pub fn archive_directory(source_dir: &Path, archive_path: &Path) -> Result<usize, GenerationError> {
    if let Some(parent) = archive_path.parent() {
        fs::create_dir_all(parent).map_err(|e| GenerationError::io(parent, e))?;
    }

    let file = fs::File::create(archive_path).map_err(|e| GenerationError::io(archive_path, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut count = 0;

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(source_dir)
            .map_err(|e| GenerationError::Task(e.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let bytes = fs::read(path).map_err(|e| GenerationError::io(path, e))?;
        zip.start_file(name, options)?;
        zip.write_all(&bytes).map_err(|e| GenerationError::io(archive_path, e))?;
        count += 1;
    }

    zip.finish()?;
    Ok(count)
}

/// Delete a directory tree; a missing tree is not an error
pub fn remove_tree<P: AsRef<Path>>(path: P) -> io::Result<()> {
    match fs::remove_dir_all(path.as_ref()) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
