//! Named colormap catalog and the false-color renderer seam.
//!
//! Every palette is a list of evenly spaced hex stops. Continuous palettes
//! interpolate linearly between neighbouring stops; qualitative palettes are
//! discrete and pick stop `floor(t * n)`.

use image::{GrayImage, Rgb, RgbImage};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Sequential,
    Diverging,
    Cyclical,
    Qualitative,
    Misc,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Sequential => "sequential",
            Family::Diverging => "diverging",
            Family::Cyclical => "cyclical",
            Family::Qualitative => "qualitative",
            Family::Misc => "miscellaneous",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub family: Family,
    stops: &'static [u32],
}

impl Palette {
    pub fn is_discrete(&self) -> bool {
        self.family == Family::Qualitative
    }

    pub fn stops(&self) -> usize {
        self.stops.len()
    }

    /// Color at position `t` in `[0, 1]`; values outside are clamped.
    pub fn sample(&self, t: f32) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let n = self.stops.len();
        if n == 1 {
            return unpack(self.stops[0]);
        }
        if self.is_discrete() {
            let idx = ((t * n as f32) as usize).min(n - 1);
            return unpack(self.stops[idx]);
        }

        let pos = t * (n - 1) as f32;
        let lower = (pos as usize).min(n - 2);
        let local = pos - lower as f32;
        let (a, b) = (unpack(self.stops[lower]), unpack(self.stops[lower + 1]));
        let mut out = [0u8; 3];
        for c in 0..3 {
            let v = f32::from(a[c]) + (f32::from(b[c]) - f32::from(a[c])) * local;
            out[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

fn unpack(hex: u32) -> [u8; 3] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

/// Look up a palette by its exact (case-sensitive) name.
pub fn lookup(name: &str) -> Option<&'static Palette> {
    CATALOG.iter().find(|p| p.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|p| p.name)
}

pub fn catalog() -> &'static [Palette] {
    CATALOG
}

/// Turns an intensity image into a colored rendition.
///
/// Implementations may return an image of any size (a plotting backend would
/// add axes and margins); the pipeline treats the result as independent.
pub trait ColormapRenderer: Sync {
    fn render(&self, intensity: &GrayImage, palette: &Palette) -> RgbImage;
}

/// Same-size renderer: each pixel is auto-scaled by the image's min/max
/// intensity and mapped through the palette. A flat image maps to `t = 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientRenderer;

impl ColormapRenderer for GradientRenderer {
    fn render(&self, intensity: &GrayImage, palette: &Palette) -> RgbImage {
        let (lo, hi) = intensity
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
        let span = f32::from(hi.saturating_sub(lo));
        RgbImage::from_fn(intensity.width(), intensity.height(), |x, y| {
            let v = intensity.get_pixel(x, y).0[0];
            let t = if span > 0.0 {
                f32::from(v - lo) / span
            } else {
                0.0
            };
            Rgb(palette.sample(t))
        })
    }
}

macro_rules! palette {
    ($name:literal, $family:ident, [$($stop:literal),+ $(,)?]) => {
        Palette {
            name: $name,
            family: Family::$family,
            stops: &[$($stop),+],
        }
    };
}

#[rustfmt::skip]
static CATALOG: &[Palette] = &[
    // Perceptually uniform sequential
    palette!("viridis", Sequential, [0x440154, 0x472C7A, 0x3B518B, 0x2C718E, 0x21908D, 0x27AD81, 0x5CC863, 0xAADC32, 0xFDE725]),
    palette!("plasma", Sequential, [0x0D0887, 0x4C02A1, 0x7E03A8, 0xA92395, 0xCC4778, 0xE56B5D, 0xF89441, 0xFDC328, 0xF0F921]),
    palette!("inferno", Sequential, [0x000004, 0x1B0C41, 0x4A0C6B, 0x781C6D, 0xA52C60, 0xCF4446, 0xED6925, 0xFB9B06, 0xFCFFA4]),
    palette!("magma", Sequential, [0x000004, 0x180F3D, 0x440F76, 0x721F81, 0x9E2F7F, 0xCD4071, 0xF1605D, 0xFD9668, 0xFCFDBF]),
    palette!("cividis", Sequential, [0x00224E, 0x123570, 0x3B496C, 0x575D6D, 0x707173, 0x8A8678, 0xA59C74, 0xC3B369, 0xFEE838]),
    // Sequential
    palette!("Greys", Sequential, [0xFFFFFF, 0xF0F0F0, 0xD9D9D9, 0xBDBDBD, 0x969696, 0x737373, 0x525252, 0x252525, 0x000000]),
    palette!("Purples", Sequential, [0xFCFBFD, 0xEFEDF5, 0xDADAEB, 0xBCBDDC, 0x9E9AC8, 0x807DBA, 0x6A51A3, 0x54278F, 0x3F007D]),
    palette!("Blues", Sequential, [0xF7FBFF, 0xDEEBF7, 0xC6DBEF, 0x9ECAE1, 0x6BAED6, 0x4292C6, 0x2171B5, 0x08519C, 0x08306B]),
    palette!("Greens", Sequential, [0xF7FCF5, 0xE5F5E0, 0xC7E9C0, 0xA1D99B, 0x74C476, 0x41AB5D, 0x238B45, 0x006D2C, 0x00441B]),
    palette!("Oranges", Sequential, [0xFFF5EB, 0xFEE6CE, 0xFDD0A2, 0xFDAE6B, 0xFD8D3C, 0xF16913, 0xD94801, 0xA63603, 0x7F2704]),
    palette!("Reds", Sequential, [0xFFF5F0, 0xFEE0D2, 0xFCBBA1, 0xFC9272, 0xFB6A4A, 0xEF3B2C, 0xCB181D, 0xA50F15, 0x67000D]),
    palette!("YlOrBr", Sequential, [0xFFFFE5, 0xFFF7BC, 0xFEE391, 0xFEC44F, 0xFE9929, 0xEC7014, 0xCC4C02, 0x993404, 0x662506]),
    palette!("YlOrRd", Sequential, [0xFFFFCC, 0xFFEDA0, 0xFED976, 0xFEB24C, 0xFD8D3C, 0xFC4E2A, 0xE31A1C, 0xBD0026, 0x800026]),
    palette!("OrRd", Sequential, [0xFFF7EC, 0xFEE8C8, 0xFDD49E, 0xFDBB84, 0xFC8D59, 0xEF6548, 0xD7301F, 0xB30000, 0x7F0000]),
    palette!("PuRd", Sequential, [0xF7F4F9, 0xE7E1EF, 0xD4B9DA, 0xC994C7, 0xDF65B0, 0xE7298A, 0xCE1256, 0x980043, 0x67001F]),
    palette!("RdPu", Sequential, [0xFFF7F3, 0xFDE0DD, 0xFCC5C0, 0xFA9FB5, 0xF768A1, 0xDD3497, 0xAE017E, 0x7A0177, 0x49006A]),
    palette!("BuPu", Sequential, [0xF7FCFD, 0xE0ECF4, 0xBFD3E6, 0x9EBCDA, 0x8C96C6, 0x8C6BB1, 0x88419D, 0x810F7C, 0x4D004B]),
    palette!("GnBu", Sequential, [0xF7FCF0, 0xE0F3DB, 0xCCEBC5, 0xA8DDB5, 0x7BCCC4, 0x4EB3D3, 0x2B8CBE, 0x0868AC, 0x084081]),
    palette!("PuBu", Sequential, [0xFFF7FB, 0xECE7F2, 0xD0D1E6, 0xA6BDDB, 0x74A9CF, 0x3690C0, 0x0570B0, 0x045A8D, 0x023858]),
    palette!("YlGnBu", Sequential, [0xFFFFD9, 0xEDF8B1, 0xC7E9B4, 0x7FCDBB, 0x41B6C4, 0x1D91C0, 0x225EA8, 0x253494, 0x081D58]),
    palette!("PuBuGn", Sequential, [0xFFF7FB, 0xECE2F0, 0xD0D1E6, 0xA6BDDB, 0x67A9CF, 0x3690C0, 0x02818A, 0x016C59, 0x014636]),
    palette!("BuGn", Sequential, [0xF7FCFD, 0xE5F5F9, 0xCCECE6, 0x99D8C9, 0x66C2A4, 0x41AE76, 0x238B45, 0x006D2C, 0x00441B]),
    palette!("YlGn", Sequential, [0xFFFFE5, 0xF7FCB9, 0xD9F0A3, 0xADDD8E, 0x78C679, 0x41AB5D, 0x238443, 0x006837, 0x004529]),
    // Diverging
    palette!("PiYG", Diverging, [0x8E0152, 0xC51B7D, 0xDE77AE, 0xF1B6DA, 0xFDE0EF, 0xF7F7F7, 0xE6F5D0, 0xB8E186, 0x7FBC41, 0x4D9221, 0x276419]),
    palette!("PRGn", Diverging, [0x40004B, 0x762A83, 0x9970AB, 0xC2A5CF, 0xE7D4E8, 0xF7F7F7, 0xD9F0D3, 0xA6DBA0, 0x5AAE61, 0x1B7837, 0x00441B]),
    palette!("BrBG", Diverging, [0x543005, 0x8C510A, 0xBF812D, 0xDFC27D, 0xF6E8C3, 0xF5F5F5, 0xC7EAE5, 0x80CDC1, 0x35978F, 0x01665E, 0x003C30]),
    palette!("PuOr", Diverging, [0x7F3B08, 0xB35806, 0xE08214, 0xFDB863, 0xFEE0B6, 0xF7F7F7, 0xD8DAEB, 0xB2ABD2, 0x8073AC, 0x542788, 0x2D004B]),
    palette!("RdGy", Diverging, [0x67001F, 0xB2182B, 0xD6604D, 0xF4A582, 0xFDDBC7, 0xFFFFFF, 0xE0E0E0, 0xBABABA, 0x878787, 0x4D4D4D, 0x1A1A1A]),
    palette!("RdBu", Diverging, [0x67001F, 0xB2182B, 0xD6604D, 0xF4A582, 0xFDDBC7, 0xF7F7F7, 0xD1E5F0, 0x92C5DE, 0x4393C3, 0x2166AC, 0x053061]),
    palette!("RdYlBu", Diverging, [0xA50026, 0xD73027, 0xF46D43, 0xFDAE61, 0xFEE090, 0xFFFFBF, 0xE0F3F8, 0xABD9E9, 0x74ADD1, 0x4575B4, 0x313695]),
    palette!("RdYlGn", Diverging, [0xA50026, 0xD73027, 0xF46D43, 0xFDAE61, 0xFEE08B, 0xFFFFBF, 0xD9EF8B, 0xA6D96A, 0x66BD63, 0x1A9850, 0x006837]),
    palette!("Spectral", Diverging, [0x9E0142, 0xD53E4F, 0xF46D43, 0xFDAE61, 0xFEE08B, 0xFFFFBF, 0xE6F598, 0xABDDA4, 0x66C2A5, 0x3288BD, 0x5E4FA2]),
    palette!("coolwarm", Diverging, [0x3B4CC0, 0x6788EE, 0x9ABBFF, 0xC9D7F0, 0xEDD1C2, 0xF7A889, 0xE26952, 0xB40426]),
    // Cyclical
    palette!("twilight", Cyclical, [0xE2D9E2, 0x9EB9CE, 0x6D8EC6, 0x5B5CA9, 0x4B2C6D, 0x2F1436, 0x5B1E4C, 0x8C2C4D, 0xB25E55, 0xC9947A, 0xE2D9E2]),
    palette!("twilight_shifted", Cyclical, [0x2F1436, 0x4B2C6D, 0x5B5CA9, 0x6D8EC6, 0x9EB9CE, 0xE2D9E2, 0xC9947A, 0xB25E55, 0x8C2C4D, 0x5B1E4C, 0x2F1436]),
    palette!("hsv", Cyclical, [0xFF0000, 0xFFFF00, 0x00FF00, 0x00FFFF, 0x0000FF, 0xFF00FF, 0xFF0000]),
    // Qualitative
    palette!("Pastel1", Qualitative, [0xFBB4AE, 0xB3CDE3, 0xCCEBC5, 0xDECBE4, 0xFED9A6, 0xFFFFCC, 0xE5D8BD, 0xFDDAEC, 0xF2F2F2]),
    palette!("Pastel2", Qualitative, [0xB3E2CD, 0xFDCDAC, 0xCBD5E8, 0xF4CAE4, 0xE6F5C9, 0xFFF2AE, 0xF1E2CC, 0xCCCCCC]),
    palette!("Paired", Qualitative, [0xA6CEE3, 0x1F78B4, 0xB2DF8A, 0x33A02C, 0xFB9A99, 0xE31A1C, 0xFDBF6F, 0xFF7F00, 0xCAB2D6, 0x6A3D9A, 0xFFFF99, 0xB15928]),
    palette!("Accent", Qualitative, [0x7FC97F, 0xBEAED4, 0xFDC086, 0xFFFF99, 0x386CB0, 0xF0027F, 0xBF5B17, 0x666666]),
    palette!("Dark2", Qualitative, [0x1B9E77, 0xD95F02, 0x7570B3, 0xE7298A, 0x66A61E, 0xE6AB02, 0xA6761D, 0x666666]),
    palette!("Set1", Qualitative, [0xE41A1C, 0x377EB8, 0x4DAF4A, 0x984EA3, 0xFF7F00, 0xFFFF33, 0xA65628, 0xF781BF, 0x999999]),
    palette!("Set2", Qualitative, [0x66C2A5, 0xFC8D62, 0x8DA0CB, 0xE78AC3, 0xA6D854, 0xFFD92F, 0xE5C494, 0xB3B3B3]),
    palette!("Set3", Qualitative, [0x8DD3C7, 0xFFFFB3, 0xBEBADA, 0xFB8072, 0x80B1D3, 0xFDB462, 0xB3DE69, 0xFCCDE5, 0xD9D9D9, 0xBC80BD, 0xCCEBC5, 0xFFED6F]),
    // Miscellaneous
    palette!("hot", Misc, [0x0A0000, 0x610000, 0xB80000, 0xFF0700, 0xFF5A00, 0xFFAD00, 0xFFFF04, 0xFFFF80, 0xFFFFFF]),
    palette!("afmhot", Misc, [0x000000, 0x400000, 0x800000, 0xBF4000, 0xFF8000, 0xFFBF40, 0xFFFF80, 0xFFFFBF, 0xFFFFFF]),
    palette!("gist_heat", Misc, [0x000000, 0x300000, 0x600000, 0x8F0000, 0xBF0000, 0xEF4000, 0xFF8000, 0xFFBF80, 0xFFFFFF]),
    palette!("copper", Misc, [0x000000, 0x50321F, 0xA0643F, 0xEF955F, 0xFFC77F]),
    palette!("cool", Misc, [0x00FFFF, 0xFF00FF]),
    palette!("spring", Misc, [0xFF00FF, 0xFFFF00]),
    palette!("summer", Misc, [0x008066, 0xFFFF66]),
    palette!("autumn", Misc, [0xFF0000, 0xFFFF00]),
    palette!("winter", Misc, [0x0000FF, 0x00FF80]),
    palette!("bone", Misc, [0x000001, 0x2A2A3A, 0x545474, 0x7A8E9E, 0xA1B8C8, 0xCFE1E1, 0xFFFFFF]),
    palette!("pink", Misc, [0x1E0000, 0x8A5757, 0xBD8F78, 0xD5B98C, 0xE6DAA3, 0xF5F5C6, 0xFFFFFF]),
    palette!("gray", Misc, [0x000000, 0xFFFFFF]),
];
