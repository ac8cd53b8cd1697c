//! Input resolution: normalise a user-supplied path or URL to a local file.
//!
//! Downloads land in a `TempDir` that stays alive for as long as the
//! `ResolvedInput` does, so cleanup happens automatically even if the
//! conversion bails out half way. Document inputs get their magic bytes
//! checked here, before any extraction library touches them, so callers
//! see a typed error instead of a parser panic deep in the pipeline.

use crate::error::MorphError;
use crate::formats::Category;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// The resolved input, classified by extension.
#[derive(Debug)]
pub struct ResolvedInput {
    kind: ResolvedKind,
    /// Lowercased extension of the original input.
    pub extension: String,
    /// Conversion category the extension maps to.
    pub category: Category,
}

#[derive(Debug)]
enum ResolvedKind {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; body downloaded to a temp directory.
    /// The `TempDir` is kept alive to prevent cleanup until processing completes.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the local file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match &self.kind {
            ResolvedKind::Local(p) => p,
            ResolvedKind::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Lowercased extension of a path or URL, or a typed error when there is none
/// or it maps to no conversion category.
pub fn classify(input: &str) -> Result<(String, Category), MorphError> {
    let name = if is_url(input) {
        // Strip query/fragment so `?download=1` does not pollute the extension.
        input
            .split(['?', '#'])
            .next()
            .unwrap_or(input)
            .rsplit('/')
            .next()
            .unwrap_or(input)
            .to_string()
    } else {
        Path::new(input)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let category = Category::from_extension(&extension).ok_or_else(|| {
        MorphError::UnrecognizedExtension {
            extension: extension.clone(),
        }
    })?;

    Ok((extension, category))
}

/// Resolve the input string to a local file path.
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, MorphError> {
    if input.trim().is_empty() {
        return Err(MorphError::InvalidInput {
            input: input.to_string(),
        });
    }
    let (extension, category) = classify(input)?;

    let kind = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        resolve_local(input)?
    };

    let resolved = ResolvedInput {
        kind,
        extension,
        category,
    };
    validate_magic(&resolved)?;
    Ok(resolved)
}

/// Resolve a local file path, validating existence and readability.
fn resolve_local(path_str: &str) -> Result<ResolvedKind, MorphError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(MorphError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(MorphError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(MorphError::FileNotFound { path });
        }
    }

    debug!("Resolved local input: {}", path.display());
    Ok(ResolvedKind::Local(path))
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedKind, MorphError> {
    info!("Downloading input from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| MorphError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            MorphError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            MorphError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(MorphError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = extract_filename(url);

    let temp_dir = TempDir::new().map_err(|e| MorphError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| MorphError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| MorphError::Internal(format!("failed to write temp file: {e}")))?;

    info!("Downloaded to: {}", file_path.display());

    Ok(ResolvedKind::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.bin".to_string()
}

/// Check container magic for formats where a wrong file crashes downstream
/// parsers. Only PDF and DOCX carry a stable 4-byte signature worth gating on.
fn validate_magic(resolved: &ResolvedInput) -> Result<(), MorphError> {
    let (expected, signature): (&'static str, &[u8; 4]) = match resolved.extension.as_str() {
        "pdf" => ("PDF", b"%PDF"),
        "docx" => ("DOCX", b"PK\x03\x04"),
        _ => return Ok(()),
    };

    use std::io::Read;
    let mut magic = [0u8; 4];
    let mut file = std::fs::File::open(resolved.path()).map_err(|_| MorphError::FileNotFound {
        path: resolved.path().to_path_buf(),
    })?;
    if file.read_exact(&mut magic).is_err() || &magic != signature {
        return Err(MorphError::MagicMismatch {
            path: resolved.path().to_path_buf(),
            expected,
            magic,
        });
    }
    Ok(())
}
