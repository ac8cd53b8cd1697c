//! Unique names for uploads and output artifacts.
//!
//! Output files are named `converted_<random>.<ext>` and spooled uploads
//! `upload_<random>.<ext>`. The random part comes from `tempfile`'s name
//! generator with the file created atomically, so two concurrent
//! conversions can never race each other onto the same path; `keep()`
//! then detaches the file from tempfile's auto-delete so it survives as
//! the artifact.

use crate::error::MorphError;
use crate::formats::Target;
use std::io::Write;
use std::path::{Path, PathBuf};

/// An output slot reserved on disk: the file exists (empty) and is owned by
/// the conversion that allocated it.
#[derive(Debug, Clone)]
pub struct AllocatedOutput {
    /// Bare file name, the handle a download endpoint would expose.
    pub file_name: String,
    /// Full path inside the output directory.
    pub path: PathBuf,
}

/// Reserve a uniquely named output file for `target` inside `dir`.
pub fn allocate_output(dir: &Path, target: Target) -> Result<AllocatedOutput, MorphError> {
    std::fs::create_dir_all(dir).map_err(|e| MorphError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let file = tempfile::Builder::new()
        .prefix("converted_")
        .suffix(&format!(".{}", target.extension()))
        .rand_bytes(8)
        .tempfile_in(dir)
        .map_err(|e| MorphError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let (_handle, path) = file
        .keep()
        .map_err(|e| MorphError::Internal(format!("failed to persist output slot: {e}")))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(AllocatedOutput { file_name, path })
}

/// Spool uploaded bytes to a uniquely named file in `dir`, returning its path.
pub fn spool_upload(dir: &Path, extension: &str, bytes: &[u8]) -> Result<PathBuf, MorphError> {
    std::fs::create_dir_all(dir).map_err(|e| MorphError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut file = tempfile::Builder::new()
        .prefix("upload_")
        .suffix(&format!(".{}", extension.to_ascii_lowercase()))
        .rand_bytes(8)
        .tempfile_in(dir)
        .map_err(|e| MorphError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    file.write_all(bytes).map_err(|e| MorphError::OutputWriteFailed {
        path: file.path().to_path_buf(),
        source: e,
    })?;

    let (_handle, path) = file
        .keep()
        .map_err(|e| MorphError::Internal(format!("failed to persist upload: {e}")))?;
    Ok(path)
}

/// Path for raster page `page_num` (1-indexed) alongside the allocated
/// output: page 1 keeps `path` itself, later pages get `-2`, `-3`, …
/// before the extension.
pub fn page_path(path: &Path, page_num: usize) -> PathBuf {
    if page_num <= 1 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}-{page_num}.{ext}"))
}
