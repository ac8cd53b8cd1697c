//! Error types for the filemorph library.
//!
//! One enum covers every failure the library can surface. Conversions are
//! single-shot (one input file, one output artifact), so there is no
//! partial-success story to model: the top-level `convert*` functions either
//! return a finished [`crate::output::ConversionOutput`] or an error, and on
//! error no partial output artifact is left behind.
//!
//! Variants carry enough context (paths, format names, tool stderr) for the
//! CLI to print an actionable message without string-matching.

use std::path::PathBuf;
use thiserror::Error;

use crate::formats::{Category, Target};

/// All errors returned by the filemorph library.
#[derive(Debug, Error)]
pub enum MorphError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The input has no extension, or one that no conversion category covers.
    #[error("Unrecognized input extension '{extension}'\nSupported: png jpg jpeg webp pdf docx txt mp3 wav ogg mp4 avi webm")]
    UnrecognizedExtension { extension: String },

    /// The target format is valid but not offered for this input category.
    #[error("Cannot convert {category} input to {target}\nRun with --list-formats to see the conversion table.")]
    UnsupportedTarget { category: Category, target: Target },

    /// The file's leading bytes do not match its extension (e.g. a renamed file).
    #[error("File is not a valid {expected} file: '{path}'\nFirst bytes: {magic:?}")]
    MagicMismatch {
        path: PathBuf,
        expected: &'static str,
        magic: [u8; 4],
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// The document container parsed, but text extraction failed.
    #[error("Failed to extract text from '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    /// No usable TrueType font for raster rendering.
    #[error(
        "No TrueType font found for PNG rendering.\n\
         Searched the standard DejaVu/Liberation locations.\n\
         Point --font (or ConversionConfig::font_path) at a .ttf file."
    )]
    FontNotFound,

    /// The configured font file exists but could not be parsed.
    #[error("Failed to parse font '{path}': {detail}")]
    FontUnusable { path: PathBuf, detail: String },

    // ── Image errors ──────────────────────────────────────────────────────
    /// The image crate could not decode or encode the bitmap.
    #[error("Image processing failed for '{path}': {source}")]
    ImageFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    // ── External tool errors ──────────────────────────────────────────────
    /// The transcode tool binary is not on PATH (or the configured path).
    #[error(
        "'{tool}' was not found.\n\
         Install ffmpeg (https://ffmpeg.org) or set ConversionConfig::ffmpeg_path."
    )]
    ToolNotFound { tool: String },

    /// The tool ran but exited non-zero.
    #[error("{tool} exited with {status}:\n{stderr_tail}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr_tail: String,
    },

    /// The tool exceeded the configured timeout and was killed.
    #[error("{tool} did not finish within {secs}s and was killed")]
    ToolTimedOut { tool: String, secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed (includes the layout geometry preconditions).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
