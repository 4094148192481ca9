//! Overlay stage: draw a caption into the working buffer.
//!
//! Font lookup goes through a [`FontCatalog`]. A name the catalog cannot
//! resolve falls back to the built-in [`BitmapFont`]; resolution never fails
//! the pipeline.
//!
//! The rendered text's ink box is centered on the image, shifted by the
//! requested offset and clamped so the whole box stays inside. Coverage is
//! alpha-composited with the fill color directly into the buffer.

use super::calculations::place_centered;
use super::font::BitmapFont;
use super::params::TextOverlay;
use super::raster::Raster;
use tracing::debug;

/// Per-pixel glyph coverage in `[0, 1]`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMask {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<f32>,
}

impl TextMask {
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Coverage at `(x, y)`; outside the mask reads as 0.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.index(x, y).map_or(0.0, |i| self.coverage[i])
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        if let Some(i) = self.index(x, y) {
            self.coverage[i] = value.clamp(0.0, 1.0);
        }
    }

    /// Add coverage, saturating at 1 where glyphs overlap.
    pub fn accumulate(&mut self, x: u32, y: u32, value: f32) {
        if let Some(i) = self.index(x, y) {
            self.coverage[i] = (self.coverage[i] + value).clamp(0.0, 1.0);
        }
    }
}

/// Something that can rasterize a string at a point size.
pub trait GlyphSource {
    /// Render `text` into a coverage mask cropped to its ink. `None` when
    /// nothing would be drawn (empty or whitespace-only text).
    fn render(&self, text: &str, size: f32) -> Option<TextMask>;
}

/// Maps a font name to a glyph source.
pub trait FontCatalog: Sync {
    fn resolve(&self, name: &str) -> Option<Box<dyn GlyphSource>>;
}

/// Resolve `name`, falling back to the built-in bitmap face.
pub fn resolve_glyphs(catalog: &dyn FontCatalog, name: &str) -> Box<dyn GlyphSource> {
    match catalog.resolve(name) {
        Some(source) => source,
        None => {
            debug!(font = name, "font not found, using built-in bitmap face");
            Box::new(BitmapFont)
        }
    }
}

/// Top-left corner for a `mask_w x mask_h` box inside a `w x h` image.
pub fn text_position(
    image: (u32, u32),
    mask: (u32, u32),
    offset: (i32, i32),
) -> (u32, u32) {
    (
        place_centered(image.0, mask.0, i64::from(offset.0)),
        place_centered(image.1, mask.1, i64::from(offset.1)),
    )
}

/// Draw `overlay` into the buffer. Ink falling outside the image is dropped.
pub fn draw_text(mut working: Raster, overlay: &TextOverlay, fonts: &dyn FontCatalog) -> Raster {
    let glyphs = resolve_glyphs(fonts, &overlay.font);
    let Some(mask) = glyphs.render(&overlay.content, overlay.size) else {
        return working;
    };

    let (w, h) = working.dimensions();
    let (x0, y0) = text_position(
        (w, h),
        (mask.width, mask.height),
        (overlay.offset_x, overlay.offset_y),
    );
    debug!(
        text_width = mask.width,
        text_height = mask.height,
        x = x0,
        y = y0,
        "draw text"
    );

    let fill = overlay.color.0.map(f32::from);
    for my in 0..mask.height.min(h - y0) {
        for mx in 0..mask.width.min(w - x0) {
            let alpha = mask.get(mx, my);
            if alpha <= 0.0 {
                continue;
            }
            let px = working.pixel_mut(x0 + mx, y0 + my);
            for c in 0..3 {
                px[c] = px[c] * (1.0 - alpha) + fill[c] * alpha;
            }
        }
    }
    working
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::font::BuiltinFonts;
    use crate::imaging::params::Color;

    /// A catalog that only knows one name, backed by a solid block glyph.
    struct BlockCatalog;

    struct Block;

    impl GlyphSource for Block {
        fn render(&self, text: &str, _size: f32) -> Option<TextMask> {
            let mut mask = TextMask::blank(text.len() as u32 * 2, 3);
            mask.coverage.fill(1.0);
            Some(mask)
        }
    }

    impl FontCatalog for BlockCatalog {
        fn resolve(&self, name: &str) -> Option<Box<dyn GlyphSource>> {
            (name == "Block").then(|| Box::new(Block) as Box<dyn GlyphSource>)
        }
    }

    fn overlay(content: &str, font: &str) -> TextOverlay {
        TextOverlay {
            content: content.to_string(),
            size: 10.0,
            color: Color([0, 255, 0]),
            font: font.to_string(),
            ..TextOverlay::default()
        }
    }

    #[test]
    fn text_is_centered_with_floor() {
        assert_eq!(text_position((11, 10), (4, 3), (0, 0)), (3, 3));
    }

    #[test]
    fn offsets_clamp_box_inside_image() {
        assert_eq!(text_position((100, 50), (20, 10), (1000, -1000)), (80, 0));
        assert_eq!(text_position((100, 50), (20, 10), (-1000, 1000)), (0, 40));
    }

    #[test]
    fn resolved_font_is_used() {
        let src = Raster::filled(10, 5, [0.0; 3]).unwrap();
        let out = draw_text(src, &overlay("ab", "Block"), &BlockCatalog);
        // 4x3 block centered: x = 3, y = 1
        assert_eq!(out.pixel(3, 1), [0.0, 255.0, 0.0]);
        assert_eq!(out.pixel(6, 3), [0.0, 255.0, 0.0]);
        assert_eq!(out.pixel(2, 1), [0.0; 3]);
        assert_eq!(out.pixel(7, 1), [0.0; 3]);
        assert_eq!(out.pixel(3, 4), [0.0; 3]);
    }

    #[test]
    fn unknown_font_falls_back_to_bitmap_face() {
        let src = Raster::filled(40, 20, [0.0; 3]).unwrap();
        let out = draw_text(src.clone(), &overlay("I", "No Such Font"), &BlockCatalog);
        // 5x7 bitmap 'I' centered at (17, 6); its stem is column 2
        assert_eq!(out.pixel(19, 6), [0.0, 255.0, 0.0]);
        assert_eq!(out.pixel(19, 12), [0.0, 255.0, 0.0]);
        assert_eq!(out.pixel(17, 9), [0.0; 3]);
        assert_ne!(out, src);
    }

    #[test]
    fn empty_text_is_a_no_op() {
        let src = Raster::filled(8, 8, [9.0; 3]).unwrap();
        assert_eq!(draw_text(src.clone(), &overlay("", "Arial"), &BuiltinFonts), src);
    }

    #[test]
    fn text_larger_than_image_is_cropped_at_origin() {
        let src = Raster::filled(3, 2, [0.0; 3]).unwrap();
        let out = draw_text(src, &overlay("abcd", "Block"), &BlockCatalog);
        assert!(out.pixels().all(|px| px == [0.0, 255.0, 0.0]));
    }

    #[test]
    fn partial_coverage_blends() {
        struct Half;
        impl GlyphSource for Half {
            fn render(&self, _: &str, _: f32) -> Option<TextMask> {
                let mut mask = TextMask::blank(1, 1);
                mask.set(0, 0, 0.5);
                Some(mask)
            }
        }
        struct HalfCatalog;
        impl FontCatalog for HalfCatalog {
            fn resolve(&self, _: &str) -> Option<Box<dyn GlyphSource>> {
                Some(Box::new(Half))
            }
        }
        let src = Raster::filled(1, 1, [100.0; 3]).unwrap();
        let out = draw_text(src, &overlay("x", "any"), &HalfCatalog);
        assert_eq!(out.pixel(0, 0), [50.0, 177.5, 50.0]);
    }
}
