//! Configuration for conversions.
//!
//! All behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config across a batch, serialise it for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! The page-geometry preconditions from the layout engine (margin must fit
//! inside the page, font size must be positive) are validated here in
//! `build()`, so a degenerate geometry fails before any layout work starts.

use crate::error::MorphError;
use crate::layout::PageGeometry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A4 portrait in PDF points.
pub const A4_WIDTH_PT: f32 = 595.276;
/// A4 portrait in PDF points.
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Configuration for a conversion run.
///
/// Built via [`ConversionConfig::builder()`] or [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use filemorph::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output_dir("./converted")
///     .pdf_font_size(12.0)
///     .tool_timeout_secs(120)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Directory where output artifacts are written. Created on demand.
    /// Default: `./converted`.
    pub output_dir: PathBuf,

    /// Spool directory for `convert_bytes` uploads. Created on demand.
    /// Default: `./uploads`.
    pub upload_dir: PathBuf,

    // ── Vector (PDF) page geometry ────────────────────────────────────────
    /// PDF page width in points. Default: A4 (595.276).
    pub pdf_page_width: f32,
    /// PDF page height in points. Default: A4 (841.89).
    pub pdf_page_height: f32,
    /// PDF page margin in points. Default: 40.
    pub pdf_margin: f32,
    /// PDF body font size in points. Default: 14.
    pub pdf_font_size: f32,
    /// Extra leading added to the font size per line, in points. Default: 4.
    ///
    /// Line height is `pdf_font_size + pdf_line_gap`. 4 pt over a 14 pt face
    /// keeps descenders clear of the next line's ascenders without looking
    /// double-spaced.
    pub pdf_line_gap: f32,

    // ── Raster (PNG) page geometry ────────────────────────────────────────
    /// PNG page width in pixels. Default: 1000.
    pub png_page_width: u32,
    /// PNG page height in pixels. Default: 1400.
    pub png_page_height: u32,
    /// PNG page margin in pixels. Default: 30.
    pub png_margin: f32,
    /// PNG body font size in pixels. Default: 20.
    pub png_font_size: f32,
    /// Fixed line pitch on PNG pages, in pixels. Default: 30.
    pub png_line_height: f32,
    /// Maximum characters drawn per raster line. Default: 1000.
    ///
    /// A defensive bound for pathological inputs with no wrap points (a
    /// megabyte of base64 on one line would otherwise be measured and drawn
    /// in full, far past the right edge).
    pub max_line_chars: usize,

    /// TrueType font for PNG rendering. If None, standard DejaVu/Liberation
    /// system locations are probed at render time.
    pub font_path: Option<PathBuf>,

    // ── External tools ────────────────────────────────────────────────────
    /// ffmpeg binary to invoke for audio/video transcodes. Default: `ffmpeg`
    /// (resolved via PATH).
    pub ffmpeg_path: String,

    /// Per-transcode timeout in seconds. Default: 300.
    ///
    /// Video transcodes are unbounded in principle (a corrupt input can make
    /// ffmpeg spin forever); the timeout turns that into a typed error and a
    /// removed partial output.
    pub tool_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Parallelism for `convert_many`. Default: 4.
    ///
    /// Conversions are CPU- or subprocess-bound, so unlike a network-bound
    /// pipeline there is little to gain past the physical core count.
    pub concurrency: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("converted"),
            upload_dir: PathBuf::from("uploads"),
            pdf_page_width: A4_WIDTH_PT,
            pdf_page_height: A4_HEIGHT_PT,
            pdf_margin: 40.0,
            pdf_font_size: 14.0,
            pdf_line_gap: 4.0,
            png_page_width: 1000,
            png_page_height: 1400,
            png_margin: 30.0,
            png_font_size: 20.0,
            png_line_height: 30.0,
            max_line_chars: 1000,
            font_path: None,
            ffmpeg_path: "ffmpeg".to_string(),
            tool_timeout_secs: 300,
            download_timeout_secs: 120,
            concurrency: 4,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The vector-backend page geometry implied by this config.
    pub fn pdf_geometry(&self) -> PageGeometry {
        PageGeometry {
            width: self.pdf_page_width,
            height: self.pdf_page_height,
            margin: self.pdf_margin,
            line_height: self.pdf_font_size + self.pdf_line_gap,
        }
    }

    /// The raster-backend page geometry implied by this config.
    pub fn png_geometry(&self) -> PageGeometry {
        PageGeometry {
            width: self.png_page_width as f32,
            height: self.png_page_height as f32,
            margin: self.png_margin,
            line_height: self.png_line_height,
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn pdf_page_size(mut self, width: f32, height: f32) -> Self {
        self.config.pdf_page_width = width;
        self.config.pdf_page_height = height;
        self
    }

    pub fn pdf_margin(mut self, margin: f32) -> Self {
        self.config.pdf_margin = margin;
        self
    }

    pub fn pdf_font_size(mut self, size: f32) -> Self {
        self.config.pdf_font_size = size;
        self
    }

    pub fn pdf_line_gap(mut self, gap: f32) -> Self {
        self.config.pdf_line_gap = gap.max(0.0);
        self
    }

    pub fn png_page_size(mut self, width: u32, height: u32) -> Self {
        self.config.png_page_width = width;
        self.config.png_page_height = height;
        self
    }

    pub fn png_margin(mut self, margin: f32) -> Self {
        self.config.png_margin = margin;
        self
    }

    pub fn png_font_size(mut self, size: f32) -> Self {
        self.config.png_font_size = size;
        self
    }

    pub fn png_line_height(mut self, pitch: f32) -> Self {
        self.config.png_line_height = pitch;
        self
    }

    pub fn max_line_chars(mut self, n: usize) -> Self {
        self.config.max_line_chars = n.max(1);
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = Some(path.into());
        self
    }

    pub fn ffmpeg_path(mut self, path: impl Into<String>) -> Self {
        self.config.ffmpeg_path = path.into();
        self
    }

    pub fn tool_timeout_secs(mut self, secs: u64) -> Self {
        self.config.tool_timeout_secs = secs.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    /// Build the configuration, validating the layout preconditions.
    ///
    /// A margin of at least half the page width leaves no usable interior,
    /// and a non-positive font size or line height would make the cursor
    /// never advance; both are rejected here rather than producing
    /// degenerate pages downstream.
    pub fn build(self) -> Result<ConversionConfig, MorphError> {
        let c = &self.config;

        validate_geometry("pdf", &c.pdf_geometry())?;
        validate_geometry("png", &c.png_geometry())?;

        if c.pdf_font_size <= 0.0 {
            return Err(MorphError::InvalidConfig(format!(
                "PDF font size must be positive, got {}",
                c.pdf_font_size
            )));
        }
        if c.png_font_size <= 0.0 {
            return Err(MorphError::InvalidConfig(format!(
                "PNG font size must be positive, got {}",
                c.png_font_size
            )));
        }
        if c.ffmpeg_path.is_empty() {
            return Err(MorphError::InvalidConfig("ffmpeg path is empty".into()));
        }

        Ok(self.config)
    }
}

fn validate_geometry(label: &str, g: &PageGeometry) -> Result<(), MorphError> {
    if !(g.width > 0.0 && g.height > 0.0) {
        return Err(MorphError::InvalidConfig(format!(
            "{label} page size must be positive, got {}x{}",
            g.width, g.height
        )));
    }
    if g.margin < 0.0 || g.margin >= g.width / 2.0 || g.margin >= g.height / 2.0 {
        return Err(MorphError::InvalidConfig(format!(
            "{label} margin {} leaves no usable page interior ({}x{})",
            g.margin, g.width, g.height
        )));
    }
    if g.line_height <= 0.0 {
        return Err(MorphError::InvalidConfig(format!(
            "{label} line height must be positive, got {}",
            g.line_height
        )));
    }
    Ok(())
}
