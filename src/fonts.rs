//! Font metrics and glyph rasterization.
//!
//! Two backends, two needs:
//!
//! * The PDF renderer uses base-14 Helvetica, which every viewer ships, so
//!   no font file is embedded or required at runtime. Width measurement
//!   comes from the inlined Helvetica AFM advance table below.
//! * The PNG renderer has to actually paint glyphs, so it needs a real
//!   TrueType file: [`RasterFont`] loads one (configured path or probed
//!   system locations), measures with `ttf-parser` advances, and fills
//!   outlines onto a `tiny-skia` pixmap.

use crate::error::MorphError;
use std::path::{Path, PathBuf};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};
use ttf_parser::{Face, OutlineBuilder};

/// Helvetica advance widths for ASCII 0x20..=0x7E, in 1/1000 em (AFM values).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Fallback advance for characters outside the ASCII table, in 1/1000 em.
const DEFAULT_ADVANCE: f32 = 556.0;

/// Measure a string in Helvetica at `font_size`, in the same unit as the size.
pub fn helvetica_width(text: &str, font_size: f32) -> f32 {
    let milli_em: f32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (0x20..=0x7E).contains(&code) {
                HELVETICA_WIDTHS[(code - 0x20) as usize] as f32
            } else {
                DEFAULT_ADVANCE
            }
        })
        .sum();
    milli_em / 1000.0 * font_size
}

/// Default locations probed when no font path is configured.
const FONT_PROBE_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Locate a usable TrueType font: the configured path, or the first probe
/// hit. Returns the path only; parsing happens in [`RasterFont::load`].
pub fn resolve_font_path(configured: Option<&Path>) -> Result<PathBuf, MorphError> {
    if let Some(p) = configured {
        if p.exists() {
            return Ok(p.to_path_buf());
        }
        return Err(MorphError::FileNotFound {
            path: p.to_path_buf(),
        });
    }
    FONT_PROBE_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or(MorphError::FontNotFound)
}

/// A loaded TrueType font, owned as raw bytes.
///
/// `ttf_parser::Face` borrows the byte slice, so the face is re-parsed per
/// operation instead of held; parsing is a header walk, not a glyph decode,
/// and conversions are single-shot.
#[derive(Debug)]
pub struct RasterFont {
    data: Vec<u8>,
    path: PathBuf,
}

impl RasterFont {
    /// Load and validate a TrueType font per the config's `font_path`.
    pub fn load(configured: Option<&Path>) -> Result<Self, MorphError> {
        let path = resolve_font_path(configured)?;
        let data = std::fs::read(&path).map_err(|e| MorphError::FontUnusable {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        // Validate up front so render loops can assume a parseable face.
        Face::parse(&data, 0).map_err(|e| MorphError::FontUnusable {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        Ok(Self { data, path })
    }

    /// Construct from raw font bytes (tests, embedded fonts).
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, MorphError> {
        Face::parse(&data, 0).map_err(|e| MorphError::FontUnusable {
            path: PathBuf::from("<bytes>"),
            detail: e.to_string(),
        })?;
        Ok(Self {
            data,
            path: PathBuf::from("<bytes>"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn face(&self) -> Face<'_> {
        // Validated in load(); the bytes have not changed since.
        Face::parse(&self.data, 0).unwrap()
    }

    /// Rendered width of `text` at `px_size` pixels.
    pub fn measure(&self, text: &str, px_size: f32) -> f32 {
        let face = self.face();
        let scale = px_size / face.units_per_em() as f32;
        text.chars()
            .map(|c| match face.glyph_index(c) {
                Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32,
                // No glyph: advance by half an em like a replacement box would.
                None => face.units_per_em() as f32 / 2.0,
            })
            .sum::<f32>()
            * scale
    }

    /// Baseline offset from the top of a line box at `px_size`.
    pub fn ascent(&self, px_size: f32) -> f32 {
        let face = self.face();
        face.ascender() as f32 * px_size / face.units_per_em() as f32
    }

    /// Paint `text` in black onto `pixmap`, with the line box's top-left at
    /// `(x, y_top)` in pixel coordinates.
    ///
    /// Characters without a glyph are skipped (their advance is still
    /// consumed), matching how terminals render tofu-less.
    pub fn draw_line(&self, pixmap: &mut Pixmap, text: &str, x: f32, y_top: f32, px_size: f32) {
        let face = self.face();
        let scale = px_size / face.units_per_em() as f32;
        let baseline = y_top + face.ascender() as f32 * scale;

        let mut pen_x = x;
        let mut sink = OutlineSink {
            builder: PathBuilder::new(),
            x: 0.0,
            y: baseline,
            scale,
        };

        for c in text.chars() {
            match face.glyph_index(c) {
                Some(gid) => {
                    sink.x = pen_x;
                    face.outline_glyph(gid, &mut sink);
                    pen_x += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
                }
                None => pen_x += face.units_per_em() as f32 / 2.0 * scale,
            }
        }

        if let Some(path) = sink.builder.finish() {
            let mut paint = Paint::default();
            paint.set_color_rgba8(0, 0, 0, 255);
            paint.anti_alias = true;
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    /// Whether the loaded face covers `c` with a real glyph.
    pub fn has_glyph(&self, c: char) -> bool {
        self.face().glyph_index(c).is_some()
    }
}

/// Accumulates glyph outlines into a single fill path for one line.
///
/// Glyph coordinates are y-up font units; the pixmap is y-down pixels, so
/// the y axis is flipped around the baseline while scaling.
struct OutlineSink {
    builder: PathBuilder,
    x: f32,
    y: f32,
    scale: f32,
}

impl OutlineBuilder for OutlineSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder
            .move_to(self.x + x * self.scale, self.y - y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder
            .line_to(self.x + x * self.scale, self.y - y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(
            self.x + x1 * self.scale,
            self.y - y1 * self.scale,
            self.x + x * self.scale,
            self.y - y * self.scale,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.x + x1 * self.scale,
            self.y - y1 * self.scale,
            self.x + x2 * self.scale,
            self.y - y2 * self.scale,
            self.x + x * self.scale,
            self.y - y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
