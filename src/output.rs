//! Output records returned by the conversion entry points.

use crate::formats::{Category, Target};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of a single successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Primary output artifact.
    pub path: PathBuf,
    /// Bare file name of the primary artifact, the handle a download
    /// endpoint would expose.
    pub file_name: String,
    /// Category the input was classified into.
    pub category: Category,
    /// Requested output format.
    pub target: Target,
    /// Additional page files for multi-page raster output, in page order
    /// starting at page 2. Empty for every other conversion.
    pub extra_pages: Vec<PathBuf>,
    /// Size of the primary artifact in bytes.
    pub bytes_written: u64,
    /// Per-stage timings.
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// All output files, primary first.
    pub fn all_paths(&self) -> Vec<&PathBuf> {
        std::iter::once(&self.path).chain(self.extra_pages.iter()).collect()
    }
}

/// Timing breakdown for one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Input resolution, including any download.
    pub resolve_duration_ms: u64,
    /// Handler work (extraction + rendering, re-encode, or transcode).
    pub convert_duration_ms: u64,
    /// Wall-clock total.
    pub total_duration_ms: u64,
}

/// Per-input outcome of a batch conversion. A failed input carries its
/// rendered error instead of aborting the batch.
#[derive(Debug, Serialize)]
pub struct BatchItem {
    /// The input path or URL as given.
    pub input: String,
    /// `Ok` with the output record, or the error message for this input.
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum BatchOutcome {
    Converted {
        output: ConversionOutput,
    },
    Failed {
        error: String,
    },
}
