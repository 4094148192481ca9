//! Glyph sources and font catalogs.
//!
//! - [`BitmapFont`]: built-in 5x7 ASCII face, always available.
//! - [`OutlineFont`]: any TrueType/OpenType face, rasterized with `ab_glyph`.
//! - [`SystemFontCatalog`]: resolves family names (or font file paths)
//!   against the fonts installed on this machine via `fontdb`.
//! - [`BuiltinFonts`]: a catalog that resolves nothing, so every request falls
//!   back to the bitmap face. Deterministic across machines.

use super::overlay::{FontCatalog, GlyphSource, TextMask};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use std::path::Path;
use tracing::debug;

const CELL_W: u32 = 5;
const CELL_H: u32 = 7;
const ADVANCE: u32 = CELL_W + 1;

/// Columns for a glyph that has no bitmap: a hollow box.
const MISSING: [u8; 5] = [0x7F, 0x41, 0x41, 0x41, 0x7F];

/// Printable ASCII `0x20..=0x7E`, five columns per glyph, bit 0 is the top row.
#[rustfmt::skip]
const GLYPHS: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5F, 0x00, 0x00], // ' ' !
    [0x00, 0x07, 0x00, 0x07, 0x00], [0x14, 0x7F, 0x14, 0x7F, 0x14], // " #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62], // $ %
    [0x36, 0x49, 0x56, 0x20, 0x50], [0x00, 0x05, 0x03, 0x00, 0x00], // & '
    [0x00, 0x1C, 0x22, 0x41, 0x00], [0x00, 0x41, 0x22, 0x1C, 0x00], // ( )
    [0x14, 0x08, 0x3E, 0x08, 0x14], [0x08, 0x08, 0x3E, 0x08, 0x08], // * +
    [0x00, 0x50, 0x30, 0x00, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08], // , -
    [0x00, 0x60, 0x60, 0x00, 0x00], [0x20, 0x10, 0x08, 0x04, 0x02], // . /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], [0x00, 0x42, 0x7F, 0x40, 0x00], // 0 1
    [0x42, 0x61, 0x51, 0x49, 0x46], [0x21, 0x41, 0x45, 0x4B, 0x31], // 2 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], [0x27, 0x45, 0x45, 0x45, 0x39], // 4 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], [0x01, 0x71, 0x09, 0x05, 0x03], // 6 7
    [0x36, 0x49, 0x49, 0x49, 0x36], [0x06, 0x49, 0x49, 0x29, 0x1E], // 8 9
    [0x00, 0x36, 0x36, 0x00, 0x00], [0x00, 0x56, 0x36, 0x00, 0x00], // : ;
    [0x08, 0x14, 0x22, 0x41, 0x00], [0x14, 0x14, 0x14, 0x14, 0x14], // < =
    [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x51, 0x09, 0x06], // > ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], [0x7E, 0x11, 0x11, 0x11, 0x7E], // @ A
    [0x7F, 0x49, 0x49, 0x49, 0x36], [0x3E, 0x41, 0x41, 0x41, 0x22], // B C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], [0x7F, 0x49, 0x49, 0x49, 0x41], // D E
    [0x7F, 0x09, 0x09, 0x09, 0x01], [0x3E, 0x41, 0x49, 0x49, 0x7A], // F G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], [0x00, 0x41, 0x7F, 0x41, 0x00], // H I
    [0x20, 0x40, 0x41, 0x3F, 0x01], [0x7F, 0x08, 0x14, 0x22, 0x41], // J K
    [0x7F, 0x40, 0x40, 0x40, 0x40], [0x7F, 0x02, 0x0C, 0x02, 0x7F], // L M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], [0x3E, 0x41, 0x41, 0x41, 0x3E], // N O
    [0x7F, 0x09, 0x09, 0x09, 0x06], [0x3E, 0x41, 0x51, 0x21, 0x5E], // P Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], [0x46, 0x49, 0x49, 0x49, 0x31], // R S
    [0x01, 0x01, 0x7F, 0x01, 0x01], [0x3F, 0x40, 0x40, 0x40, 0x3F], // T U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], [0x3F, 0x40, 0x38, 0x40, 0x3F], // V W
    [0x63, 0x14, 0x08, 0x14, 0x63], [0x07, 0x08, 0x70, 0x08, 0x07], // X Y
    [0x61, 0x51, 0x49, 0x45, 0x43], [0x00, 0x7F, 0x41, 0x41, 0x00], // Z [
    [0x02, 0x04, 0x08, 0x10, 0x20], [0x00, 0x41, 0x41, 0x7F, 0x00], // \ ]
    [0x04, 0x02, 0x01, 0x02, 0x04], [0x40, 0x40, 0x40, 0x40, 0x40], // ^ _
    [0x00, 0x01, 0x02, 0x04, 0x00], [0x20, 0x54, 0x54, 0x54, 0x78], // ` a
    [0x7F, 0x48, 0x44, 0x44, 0x38], [0x38, 0x44, 0x44, 0x44, 0x20], // b c
    [0x38, 0x44, 0x44, 0x48, 0x7F], [0x38, 0x54, 0x54, 0x54, 0x18], // d e
    [0x08, 0x7E, 0x09, 0x01, 0x02], [0x0C, 0x52, 0x52, 0x52, 0x3E], // f g
    [0x7F, 0x08, 0x04, 0x04, 0x78], [0x00, 0x44, 0x7D, 0x40, 0x00], // h i
    [0x20, 0x40, 0x44, 0x3D, 0x00], [0x7F, 0x10, 0x28, 0x44, 0x00], // j k
    [0x00, 0x41, 0x7F, 0x40, 0x00], [0x7C, 0x04, 0x18, 0x04, 0x78], // l m
    [0x7C, 0x08, 0x04, 0x04, 0x78], [0x38, 0x44, 0x44, 0x44, 0x38], // n o
    [0x7C, 0x14, 0x14, 0x14, 0x08], [0x08, 0x14, 0x14, 0x18, 0x7C], // p q
    [0x7C, 0x08, 0x04, 0x04, 0x08], [0x48, 0x54, 0x54, 0x54, 0x20], // r s
    [0x04, 0x3F, 0x44, 0x40, 0x20], [0x3C, 0x40, 0x40, 0x20, 0x7C], // t u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], [0x3C, 0x40, 0x30, 0x40, 0x3C], // v w
    [0x44, 0x28, 0x10, 0x28, 0x44], [0x0C, 0x50, 0x50, 0x50, 0x3C], // x y
    [0x44, 0x64, 0x54, 0x4C, 0x44], [0x00, 0x08, 0x36, 0x41, 0x00], // z {
    [0x00, 0x00, 0x7F, 0x00, 0x00], [0x00, 0x41, 0x36, 0x08, 0x00], // | }
    [0x10, 0x08, 0x08, 0x10, 0x08],                                 // ~
];

fn glyph_columns(ch: char) -> [u8; 5] {
    match ch {
        ' '..='~' => GLYPHS[ch as usize - 0x20],
        _ => MISSING,
    }
}

/// The built-in fallback face: a 5x7 pixel font scaled by an integer factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFont;

impl BitmapFont {
    /// Integer scale for a point size: `max(1, round(size / 8))`.
    pub fn scale_for(size: f32) -> u32 {
        ((size / 8.0).round() as u32).max(1)
    }
}

impl GlyphSource for BitmapFont {
    fn render(&self, text: &str, size: f32) -> Option<TextMask> {
        let chars: Vec<char> = text.chars().filter(|c| !c.is_control()).collect();
        if chars.iter().all(|c| c.is_whitespace()) {
            return None;
        }
        let scale = Self::scale_for(size);
        let cells_w = chars.len() as u32 * ADVANCE - 1;
        let mut mask = TextMask::blank(cells_w * scale, CELL_H * scale);

        for (i, &ch) in chars.iter().enumerate() {
            let origin = i as u32 * ADVANCE;
            for (col, bits) in glyph_columns(ch).into_iter().enumerate() {
                for row in 0..CELL_H {
                    if bits & (1 << row) == 0 {
                        continue;
                    }
                    let cx = (origin + col as u32) * scale;
                    let cy = row * scale;
                    for dy in 0..scale {
                        for dx in 0..scale {
                            mask.set(cx + dx, cy + dy, 1.0);
                        }
                    }
                }
            }
        }
        Some(mask)
    }
}

/// A scalable outline face.
pub struct OutlineFont {
    font: FontVec,
}

impl OutlineFont {
    pub fn new(font: FontVec) -> Self {
        Self { font }
    }

    /// Load a face from a `.ttf`/`.otf`/`.ttc` file (first face of a collection).
    pub fn from_file(path: &Path) -> Option<Self> {
        let data = std::fs::read(path).ok()?;
        FontVec::try_from_vec(data).ok().map(Self::new)
    }

    /// Point size to `ab_glyph` pixel scale: the em square spans `size` pixels.
    fn px_scale(&self, size: f32) -> PxScale {
        let em = self.font.units_per_em().unwrap_or(1000.0);
        PxScale::from(size * self.font.height_unscaled() / em)
    }
}

impl GlyphSource for OutlineFont {
    fn render(&self, text: &str, size: f32) -> Option<TextMask> {
        if text.chars().all(char::is_whitespace) {
            return None;
        }
        let scale = self.px_scale(size);
        let scaled = self.font.as_scaled(scale);

        let mut caret = 0.0;
        let mut previous = None;
        let mut outlined = Vec::new();
        for ch in text.chars().filter(|c| !c.is_control()) {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
            caret += scaled.h_advance(id);
            previous = Some(id);
            if let Some(og) = self.font.outline_glyph(glyph) {
                outlined.push(og);
            }
        }

        // Ink bounds across every glyph
        let first = outlined.first()?.px_bounds();
        let (mut min, mut max) = (first.min, first.max);
        for og in &outlined[1..] {
            let b = og.px_bounds();
            min.x = min.x.min(b.min.x);
            min.y = min.y.min(b.min.y);
            max.x = max.x.max(b.max.x);
            max.y = max.y.max(b.max.y);
        }
        let width = (max.x - min.x).ceil() as u32;
        let height = (max.y - min.y).ceil() as u32;
        if width == 0 || height == 0 {
            return None;
        }

        let mut mask = TextMask::blank(width, height);
        for og in &outlined {
            let b = og.px_bounds();
            let left = (b.min.x - min.x) as u32;
            let top = (b.min.y - min.y) as u32;
            og.draw(|x, y, coverage| mask.accumulate(left + x, top + y, coverage));
        }
        Some(mask)
    }
}

/// Font names resolved against the fonts installed on this machine.
///
/// A name that points at an existing font file is loaded directly; anything
/// else is matched as a family name.
pub struct SystemFontCatalog {
    db: fontdb::Database,
}

impl SystemFontCatalog {
    /// Scan the system font directories. This is slow; build one catalog per
    /// batch and share it.
    pub fn load() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "system font catalog loaded");
        Self { db }
    }

    pub fn from_database(db: fontdb::Database) -> Self {
        Self { db }
    }
}

impl FontCatalog for SystemFontCatalog {
    fn resolve(&self, name: &str) -> Option<Box<dyn GlyphSource>> {
        let path = Path::new(name);
        if path.is_file() {
            return OutlineFont::from_file(path).map(|f| Box::new(f) as Box<dyn GlyphSource>);
        }

        let families = [fontdb::Family::Name(name)];
        let query = fontdb::Query {
            families: &families,
            ..fontdb::Query::default()
        };
        let id = self.db.query(&query)?;
        let font = self
            .db
            .with_face_data(id, |data, index| {
                FontVec::try_from_vec_and_index(data.to_vec(), index)
            })?
            .ok()?;
        Some(Box::new(OutlineFont::new(font)))
    }
}

/// Resolves nothing: every request uses the built-in bitmap face.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFonts;

impl FontCatalog for BuiltinFonts {
    fn resolve(&self, _name: &str) -> Option<Box<dyn GlyphSource>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn bitmap_scale_rounds_size() {
        assert_eq!(BitmapFont::scale_for(10.0), 1);
        assert_eq!(BitmapFont::scale_for(50.0), 6);
        assert_eq!(BitmapFont::scale_for(200.0), 25);
        assert_eq!(BitmapFont::scale_for(2.0), 1);
    }

    #[test]
    fn bitmap_mask_dimensions() {
        let mask = BitmapFont.render("Hi!", 16.0).unwrap();
        // 3 glyphs × 6 cells − 1 trailing gap, at scale 2
        assert_eq!((mask.width, mask.height), (34, 14));
    }

    #[test]
    fn bitmap_empty_text_renders_nothing() {
        assert!(BitmapFont.render("", 50.0).is_none());
        assert!(BitmapFont.render("\n", 50.0).is_none());
    }

    #[test]
    fn bitmap_whitespace_only_text_renders_nothing() {
        assert!(BitmapFont.render(" ", 50.0).is_none());
        assert!(BitmapFont.render(" \t  ", 8.0).is_none());
        // inner spaces still take up room
        let mask = BitmapFont.render("a b", 8.0).unwrap();
        assert_eq!(mask.width, 17);
    }

    #[test]
    fn bitmap_glyph_pixels() {
        // 'I' at scale 1: middle column is fully set, first column empty
        let mask = BitmapFont.render("I", 8.0).unwrap();
        assert_eq!((mask.width, mask.height), (5, 7));
        for y in 0..7 {
            assert_eq!(mask.get(2, y), 1.0);
        }
        assert_eq!(mask.get(0, 3), 0.0);
    }

    #[test]
    fn bitmap_unknown_char_is_hollow_box() {
        let mask = BitmapFont.render("é", 8.0).unwrap();
        assert_eq!(mask.get(0, 0), 1.0);
        assert_eq!(mask.get(4, 6), 1.0);
        assert_eq!(mask.get(2, 3), 0.0);
    }

    #[test]
    fn builtin_catalog_resolves_nothing() {
        assert!(BuiltinFonts.resolve("Arial").is_none());
    }

    // =========================================================================
    // Outline fonts
    // =========================================================================

    fn fixture_font() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/Tuffy.ttf")
    }

    fn inked(mask: &TextMask) -> usize {
        mask.coverage.iter().filter(|&&c| c > 0.0).count()
    }

    #[test]
    fn outline_mask_is_trimmed_to_ink() {
        let font = OutlineFont::from_file(&fixture_font()).unwrap();
        let mask = font.render("Hello", 50.0).unwrap();
        // Cap height of a 50px em, no descenders
        assert!((25..=50).contains(&mask.height), "height {}", mask.height);
        assert!(mask.width > mask.height, "width {}", mask.width);
        let ink = inked(&mask);
        assert!(ink > 0 && ink < (mask.width * mask.height) as usize);
        // Ink bounds touch every edge of the mask
        assert!((0..mask.height).any(|y| mask.get(0, y) > 0.0));
        assert!((0..mask.width).any(|x| mask.get(x, 0) > 0.0));
    }

    #[test]
    fn outline_mask_scales_with_size() {
        let font = OutlineFont::from_file(&fixture_font()).unwrap();
        let small = font.render("Hello", 20.0).unwrap();
        let large = font.render("Hello", 80.0).unwrap();
        assert!(large.width > small.width * 3);
        assert!(large.height > small.height * 3);
    }

    #[test]
    fn outline_whitespace_only_text_renders_nothing() {
        let font = OutlineFont::from_file(&fixture_font()).unwrap();
        assert!(font.render("   ", 50.0).is_none());
        assert!(font.render("", 50.0).is_none());
    }

    #[test]
    fn outline_font_rejects_non_font_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bogus = tmp.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();
        assert!(OutlineFont::from_file(&bogus).is_none());
    }

    // =========================================================================
    // Catalogs
    // =========================================================================

    #[test]
    fn system_catalog_resolves_loaded_family() {
        let mut db = fontdb::Database::new();
        db.load_font_file(fixture_font()).unwrap();
        let catalog = SystemFontCatalog::from_database(db);
        let glyphs = catalog.resolve("Tuffy").unwrap();
        assert!(glyphs.render("Hi", 30.0).is_some());
        assert!(catalog.resolve("No Such Family").is_none());
    }

    #[test]
    fn system_catalog_loads_font_paths_directly() {
        let catalog = SystemFontCatalog::from_database(fontdb::Database::new());
        let path = fixture_font();
        let glyphs = catalog.resolve(path.to_str().unwrap()).unwrap();
        assert!(glyphs.render("Hi", 30.0).is_some());
    }

    #[test]
    fn empty_system_database_resolves_nothing() {
        let catalog = SystemFontCatalog::from_database(fontdb::Database::new());
        assert!(catalog.resolve("DejaVu Sans").is_none());
        assert!(catalog.resolve("/definitely/not/a/font.ttf").is_none());
    }
}
