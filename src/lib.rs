//! # filemorph
//!
//! Convert files between formats within their category: images re-encode,
//! documents re-render, audio and video transcode through ffmpeg.
//!
//! ## Why this crate?
//!
//! Format conversion services usually grow as a pile of shell-outs. This
//! crate keeps the external tool surface down to exactly one binary (ffmpeg, for
//! media) and does everything else natively: image codecs via the `image`
//! crate, text extraction via `lopdf`/`zip`/`quick-xml`, and document
//! rendering through its own paginated layout engine with a vector (PDF)
//! and a raster (PNG) backend.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input (path | URL | bytes)
//!  │
//!  ├─ 1. Input    resolve local file or download, classify by extension
//!  ├─ 2. Route    category × target from the conversion table
//!  ├─ 3. Handler  image re-encode │ extract → layout → render │ ffmpeg
//!  └─ 4. Output   converted_<id>.<ext> + timings record
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use filemorph::{convert, ConversionConfig, Target};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("notes.txt", Target::Pdf, &config).await?;
//!     println!("{}", output.path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `filemorph` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! filemorph = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod fonts;
pub mod formats;
pub mod layout;
pub mod naming;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_bytes, convert_many, convert_sync};
pub use error::MorphError;
pub use formats::{Category, Target};
pub use output::{BatchItem, BatchOutcome, ConversionOutput, ConversionStats};
