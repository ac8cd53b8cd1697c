//! Conversion pipeline stages.
//!
//! Each stage is a small module with a focused job:
//! - [`input`]: normalise a path or URL to a local file and classify it
//! - [`extract`]: pull plain text out of document inputs
//! - [`render`]: lay text out onto PDF pages
//! - [`image`]: image re-encoding and image-to-PDF embedding
//! - [`media`]: audio/video transcodes delegated to ffmpeg
//! - [`cleanup`]: normalisation of extracted text before layout

pub mod cleanup;
pub mod extract;
pub mod image;
pub mod input;
pub mod media;
pub mod render;
