//! Page rendering: turn laid-out text into PDF or PNG artifacts.
//!
//! Both backends consume the same [`crate::layout`] output. The PDF
//! backend writes base-14 Helvetica with WinAnsi encoding so no font
//! file ships with the binary; the PNG backend rasterises glyph
//! outlines from a system TrueType font, so characters outside its
//! coverage are simply skipped.

use crate::config::ConversionConfig;
use crate::error::MorphError;
use crate::fonts::{helvetica_width, RasterFont};
use crate::layout::{layout, LaidOutPage, RasterSurface, VectorSurface};
use crate::naming::page_path;
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lay out `paragraphs` and write a PDF document to `output_path`.
pub fn render_text_to_pdf(
    paragraphs: &[String],
    config: &ConversionConfig,
    output_path: &Path,
) -> Result<usize, MorphError> {
    let geometry = config.pdf_geometry();
    let font_size = config.pdf_font_size;

    let pages = layout(
        paragraphs.iter().map(String::as_str),
        &geometry,
        &VectorSurface,
        |text| helvetica_width(text, font_size),
    );

    let bytes = build_pdf(&pages, geometry.width, geometry.height, font_size);
    std::fs::write(output_path, bytes).map_err(|e| MorphError::OutputWriteFailed {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    debug!("Wrote {} PDF page(s) to {}", pages.len(), output_path.display());
    Ok(pages.len())
}

/// Assemble the document: one content stream per page, a shared Helvetica
/// Type1 font as `F1` in every page's resources.
fn build_pdf(pages: &[LaidOutPage], width: f32, height: f32, font_size: f32) -> Vec<u8> {
    let mut pdf = Pdf::new();

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let font_id = Ref::new(3);
    let font_name = Name(b"F1");

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.type1_font(font_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let mut next_id = 4;
    let mut page_ids = Vec::with_capacity(pages.len());

    for laid_out in pages {
        let page_id = Ref::new(next_id);
        let content_id = Ref::new(next_id + 1);
        next_id += 2;
        page_ids.push(page_id);

        let mut content = Content::new();
        for line in &laid_out.lines {
            if line.text.is_empty() {
                continue;
            }
            content.begin_text();
            content.set_font(font_name, font_size);
            content.next_line(line.x, line.y);
            content.show(Str(&to_winansi(&line.text)));
            content.end_text();
        }
        pdf.stream(content_id, &content.finish());

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, width, height));
        page.parent(page_tree_id);
        page.contents(content_id);
        page.resources().fonts().pair(font_name, font_id);
        page.finish();
    }

    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    pdf.finish()
}

/// Encode text for a WinAnsi-encoded base font. ASCII and Latin-1 pass
/// through, the handful of WinAnsi-only punctuation marks get their CP-1252
/// slots, everything else degrades to `?`.
fn to_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => c as u8,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2022}' => 0x95,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            _ => b'?',
        })
        .collect()
}

/// Lay out `paragraphs` and write one PNG per page.
///
/// Page 1 lands at `base_path`; further pages get `-2`, `-3`, … suffixes.
/// Returns the written paths in page order.
pub fn render_text_to_png(
    paragraphs: &[String],
    config: &ConversionConfig,
    font: &RasterFont,
    base_path: &Path,
) -> Result<Vec<PathBuf>, MorphError> {
    let geometry = config.png_geometry();
    let font_size = config.png_font_size;
    let surface = RasterSurface {
        max_line_chars: config.max_line_chars,
    };

    let pages = layout(
        paragraphs.iter().map(String::as_str),
        &geometry,
        &surface,
        |text| font.measure(text, font_size),
    );

    let width = geometry.width as u32;
    let height = geometry.height as u32;

    let mut written: Vec<PathBuf> = Vec::with_capacity(pages.len());
    for (index, laid_out) in pages.iter().enumerate() {
        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            MorphError::Internal(format!("invalid raster page size {width}x{height}"))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);

        for line in &laid_out.lines {
            if line.text.is_empty() {
                continue;
            }
            font.draw_line(&mut pixmap, &line.text, line.x, line.y, font_size);
        }

        let path = page_path(base_path, index + 1);
        if let Err(e) = pixmap.save_png(&path) {
            // A failed page must not strand the pages already written.
            for page in &written {
                if let Err(e) = std::fs::remove_file(page) {
                    warn!("Failed to remove {}: {}", page.display(), e);
                }
            }
            return Err(MorphError::OutputWriteFailed {
                path,
                source: std::io::Error::other(e),
            });
        }
        written.push(path);
    }

    debug!("Wrote {} PNG page(s) at {}", written.len(), base_path.display());
    Ok(written)
}
