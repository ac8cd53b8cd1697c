//! Page surfaces: the two cursor conventions behind one trait.
//!
//! The wrap/pagination algorithm is identical for PDF and PNG output; only
//! the coordinate system differs. PDF pages have their origin bottom-left
//! with y increasing upward, so writing proceeds by *decreasing* the cursor
//! from `height - margin` down to `margin`. Raster pages have their origin
//! top-left with y increasing downward, so the cursor *increases* from
//! `margin` up to `height - margin`. [`PageSurface`] captures exactly that
//! difference so [`super::layout`] can stay backend-agnostic.

use super::PageGeometry;

/// Cursor behaviour for one rendering backend.
pub trait PageSurface {
    /// Vertical position of the first line on a fresh page.
    fn start_cursor(&self, geometry: &PageGeometry) -> f32;

    /// The cursor after one line has been placed.
    fn advance(&self, cursor: f32, line_height: f32) -> f32;

    /// True once the cursor has left the usable interior and the next line
    /// must go on a new page.
    fn overflowed(&self, cursor: f32, geometry: &PageGeometry) -> bool;

    /// Per-line character cap, if the backend needs one.
    fn max_line_chars(&self) -> Option<usize> {
        None
    }
}

/// PDF-point pages: origin bottom-left, cursor counts down.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorSurface;

impl PageSurface for VectorSurface {
    fn start_cursor(&self, geometry: &PageGeometry) -> f32 {
        geometry.height - geometry.margin
    }

    fn advance(&self, cursor: f32, line_height: f32) -> f32 {
        cursor - line_height
    }

    fn overflowed(&self, cursor: f32, geometry: &PageGeometry) -> bool {
        cursor < geometry.margin
    }
}

/// Pixel pages: origin top-left, cursor counts up.
///
/// Also applies the per-line character cap: a token with no wrap points
/// (minified JSON, base64 blobs) would otherwise be measured and drawn
/// arbitrarily far past the right page edge.
#[derive(Debug, Clone, Copy)]
pub struct RasterSurface {
    pub max_line_chars: usize,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self {
            max_line_chars: 1000,
        }
    }
}

impl PageSurface for RasterSurface {
    fn start_cursor(&self, geometry: &PageGeometry) -> f32 {
        geometry.margin
    }

    fn advance(&self, cursor: f32, line_height: f32) -> f32 {
        cursor + line_height
    }

    fn overflowed(&self, cursor: f32, geometry: &PageGeometry) -> bool {
        cursor > geometry.height - geometry.margin
    }

    fn max_line_chars(&self) -> Option<usize> {
        Some(self.max_line_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom() -> PageGeometry {
        PageGeometry {
            width: 500.0,
            height: 200.0,
            margin: 30.0,
            line_height: 30.0,
        }
    }

    #[test]
    fn vector_counts_down_from_top() {
        let s = VectorSurface;
        let g = geom();
        let mut cursor = s.start_cursor(&g);
        assert_eq!(cursor, 170.0);
        cursor = s.advance(cursor, g.line_height);
        assert_eq!(cursor, 140.0);
        assert!(!s.overflowed(cursor, &g));
        assert!(s.overflowed(29.0, &g));
        assert!(!s.overflowed(30.0, &g));
    }

    #[test]
    fn raster_counts_up_from_top() {
        let s = RasterSurface::default();
        let g = geom();
        let mut cursor = s.start_cursor(&g);
        assert_eq!(cursor, 30.0);
        cursor = s.advance(cursor, g.line_height);
        assert_eq!(cursor, 60.0);
        assert!(!s.overflowed(170.0, &g));
        assert!(s.overflowed(171.0, &g));
    }

    #[test]
    fn only_raster_caps_line_length() {
        assert_eq!(VectorSurface.max_line_chars(), None);
        assert_eq!(RasterSurface::default().max_line_chars(), Some(1000));
    }
}
