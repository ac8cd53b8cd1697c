//! The paginated text-layout engine.
//!
//! This is the one piece of filemorph that is an algorithm rather than a
//! delegation: given a document's paragraphs, produce an ordered sequence of
//! fixed-size pages, each holding positioned lines of text. Both document
//! renderers (PDF and multi-page PNG) consume the same engine; they differ
//! only in their [`PageSurface`] and in the width-measurement function they
//! supply.
//!
//! The engine is a pure function. It performs no I/O, holds no state between
//! calls, and never fails: geometry preconditions are validated up front by
//! [`crate::config::ConversionConfigBuilder::build`], and the single known
//! edge case — a word wider than the usable width — is placed alone on its
//! own line rather than treated as an error.
//!
//! ```rust
//! use filemorph::layout::{layout, PageGeometry, VectorSurface};
//!
//! let geometry = PageGeometry { width: 500.0, height: 800.0, margin: 40.0, line_height: 18.0 };
//! let pages = layout(
//!     "hello layout\n\nsecond paragraph".lines(),
//!     &geometry,
//!     &VectorSurface,
//!     |text| text.chars().count() as f32 * 8.0,
//! );
//! assert_eq!(pages.len(), 1);
//! assert_eq!(pages[0].lines[0].text, "hello layout");
//! ```

mod surface;
mod wrap;

pub use surface::{PageSurface, RasterSurface, VectorSurface};
pub use wrap::wrap_paragraph;

use wrap::clip_chars;

/// Fixed page geometry shared by every page of one layout run.
///
/// `width`/`height`/`margin` are in the backend's length unit (PDF points
/// or pixels); the usable interior is the page inset by `margin` on all
/// four sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub line_height: f32,
}

impl PageGeometry {
    /// Horizontal space available to a line.
    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

/// One line of text at its draw position on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// One finalized page: its lines, in draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub lines: Vec<PositionedLine>,
}

/// Lay paragraphs out onto fixed-size pages.
///
/// Each paragraph is greedily word-wrapped against the usable width, then
/// lines flow down the page at `geometry.line_height` pitch; when the cursor
/// leaves the usable interior (as judged by the surface), the page is
/// finalized and a fresh one begins. Empty paragraphs produce no lines but
/// still act as paragraph breaks.
///
/// The result is never empty: an empty document yields a single blank page,
/// so a well-formed (if empty) output artifact can always be written.
pub fn layout<'a, S, M, I>(paragraphs: I, geometry: &PageGeometry, surface: &S, measure: M) -> Vec<LaidOutPage>
where
    S: PageSurface,
    M: Fn(&str) -> f32,
    I: IntoIterator<Item = &'a str>,
{
    let usable = geometry.usable_width();
    let cap = surface.max_line_chars();

    let mut pages = Vec::new();
    let mut page = LaidOutPage::default();
    let mut cursor = surface.start_cursor(geometry);

    for paragraph in paragraphs {
        for line in wrap_paragraph(paragraph, usable, cap, &measure) {
            if surface.overflowed(cursor, geometry) {
                pages.push(std::mem::take(&mut page));
                cursor = surface.start_cursor(geometry);
            }
            let text = clip_chars(&line, cap).to_string();
            page.lines.push(PositionedLine {
                text,
                x: geometry.margin,
                y: cursor,
            });
            cursor = surface.advance(cursor, geometry.line_height);
        }
    }

    pages.push(page);
    pages
}
