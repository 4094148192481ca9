//! Parameter types for the edit pipeline.
//!
//! These structs describe *what* to do, not *how* to do it. A full
//! [`EditParams`] is an immutable snapshot handed to one pipeline run; it is
//! validated once, up front, so no stage starts on an out-of-range value.
//!
//! ## Types
//!
//! - [`Rotation`]: 0°, 90°, 180° or 270° clockwise.
//! - [`AspectRatio`] / [`AspectCrop`]: target ratio plus offsets into the slack.
//! - [`ToneParams`]: brightness, contrast, sharpness, saturation (0.5–2.0).
//! - [`Vignette`]: radial darkening strength (0.0–2.0).
//! - [`TextOverlay`]: caption text, size, color, offset and font name.
//! - [`Filter`] / [`SkyStyle`]: catalog entry plus blend intensity (0.0–2.0).
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Clamped on construction.

use super::error::{ImagingError, Stage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

const TONE_RANGE: RangeInclusive<f32> = 0.5..=2.0;
const STRENGTH_RANGE: RangeInclusive<f32> = 0.0..=2.0;
const TEXT_SIZE_RANGE: RangeInclusive<f32> = 10.0..=200.0;

fn check_range(
    stage: Stage,
    param: &'static str,
    value: f32,
    range: RangeInclusive<f32>,
    expected: &'static str,
) -> Result<(), ImagingError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ImagingError::invalid(stage, param, value, expected))
    }
}

/// Clockwise rotation in quarter turns. Serialized as degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Whether this rotation swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<u32> for Rotation {
    type Error = String;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(format!("rotation must be 0, 90, 180 or 270 (got {other})")),
        }
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> u32 {
        rotation.degrees()
    }
}

/// Target aspect ratio, written `"W:H"` or `"Original"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AspectRatio {
    /// Bypass the crop entirely.
    #[default]
    Original,
    Ratio { width: u32, height: u32 },
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("original") {
            return Ok(AspectRatio::Original);
        }
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| format!("aspect ratio must be \"W:H\" or \"Original\" (got {s:?})"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid aspect ratio component {part:?} in {s:?}"))
        };
        Ok(AspectRatio::Ratio {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(ratio: AspectRatio) -> String {
        ratio.to_string()
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Original => f.write_str("Original"),
            AspectRatio::Ratio { width, height } => write!(f, "{width}:{height}"),
        }
    }
}

/// Aspect-ratio crop followed by a pad onto a fixed canvas.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AspectCrop {
    pub aspect: AspectRatio,
    /// Horizontal offset into the slack. `None` centers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<u32>,
    /// Vertical offset into the slack. `None` centers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<u32>,
    /// Output canvas `[width, height]`. `None` pads to the crop box itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas: Option<[u32; 2]>,
}

impl AspectCrop {
    pub fn ratio(width: u32, height: u32) -> Self {
        Self {
            aspect: AspectRatio::Ratio { width, height },
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ImagingError> {
        if let AspectRatio::Ratio { width, height } = self.aspect
            && (width == 0 || height == 0)
        {
            return Err(ImagingError::invalid(
                Stage::Geometry,
                "crop.aspect",
                self.aspect,
                "both ratio components > 0",
            ));
        }
        if let Some([w, h]) = self.canvas
            && (w == 0 || h == 0)
        {
            return Err(ImagingError::invalid(
                Stage::Geometry,
                "crop.canvas",
                format!("{w}x{h}"),
                "both canvas sides > 0",
            ));
        }
        Ok(())
    }
}

/// Four independent enhancement multipliers; 1.0 is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToneParams {
    pub brightness: f32,
    pub contrast: f32,
    pub sharpness: f32,
    pub saturation: f32,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            sharpness: 1.0,
            saturation: 1.0,
        }
    }
}

impl ToneParams {
    fn validate(&self) -> Result<(), ImagingError> {
        for (param, value) in [
            ("tone.brightness", self.brightness),
            ("tone.contrast", self.contrast),
            ("tone.sharpness", self.sharpness),
            ("tone.saturation", self.saturation),
        ] {
            check_range(Stage::Tone, param, value, TONE_RANGE, "0.5..=2.0")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Vignette {
    /// 0.0 disables the vignette.
    pub strength: f32,
}

/// An 8-bit sRGB color, written `"#RRGGBB"` or `"#RGB"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255]);
    pub const RED: Color = Color([255, 0, 0]);
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let bad = || format!("invalid color {s:?} (expected #RRGGBB)");
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| bad());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        match hex.len() {
            6 => Ok(Color([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ])),
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, ch) in rgb.iter_mut().zip(hex.chars()) {
                    *slot = channel(&ch.to_string())? * 17;
                }
                Ok(Color(rgb))
            }
            _ => Err(bad()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

/// Text drawn once into the working buffer, centered then offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextOverlay {
    pub content: String,
    /// Point size (10–200).
    pub size: f32,
    pub color: Color,
    /// Pixel offset from center; the final position is clamped in-bounds.
    pub offset_x: i32,
    pub offset_y: i32,
    /// Font family name, resolved through a font catalog.
    pub font: String,
}

impl Default for TextOverlay {
    fn default() -> Self {
        Self {
            content: "Hello!".to_string(),
            size: 50.0,
            color: Color::RED,
            offset_x: 0,
            offset_y: 0,
            font: "Arial".to_string(),
        }
    }
}

impl TextOverlay {
    fn validate(&self) -> Result<(), ImagingError> {
        check_range(
            Stage::Overlay,
            "text.size",
            self.size,
            TEXT_SIZE_RANGE,
            "10..=200",
        )
    }
}

/// Stylistic filter catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    #[default]
    None,
    Invert,
    Grayscale,
    Sepia,
    EdgeOutline,
    WarmTone,
    CoolTone,
    VintageFade,
    HighContrast,
    SoftPastel,
}

impl FilterKind {
    pub const ALL: [FilterKind; 10] = [
        FilterKind::None,
        FilterKind::Invert,
        FilterKind::Grayscale,
        FilterKind::Sepia,
        FilterKind::EdgeOutline,
        FilterKind::WarmTone,
        FilterKind::CoolTone,
        FilterKind::VintageFade,
        FilterKind::HighContrast,
        FilterKind::SoftPastel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::None => "None",
            FilterKind::Invert => "Invert Colors",
            FilterKind::Grayscale => "Grayscale",
            FilterKind::Sepia => "Old Film (Sepia)",
            FilterKind::EdgeOutline => "Outlines",
            FilterKind::WarmTone => "Warm Tone",
            FilterKind::CoolTone => "Cool Tone",
            FilterKind::VintageFade => "Vintage Fade",
            FilterKind::HighContrast => "High Contrast",
            FilterKind::SoftPastel => "Soft Pastel",
        }
    }
}

/// Sky-style catalog, applied after the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkyKind {
    #[default]
    None,
    BrightDay,
    GoldenHour,
    SunsetGlow,
    NightSky,
    StormyMood,
}

impl SkyKind {
    pub const ALL: [SkyKind; 6] = [
        SkyKind::None,
        SkyKind::BrightDay,
        SkyKind::GoldenHour,
        SkyKind::SunsetGlow,
        SkyKind::NightSky,
        SkyKind::StormyMood,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SkyKind::None => "None",
            SkyKind::BrightDay => "Bright Day",
            SkyKind::GoldenHour => "Golden Hour",
            SkyKind::SunsetGlow => "Sunset Glow",
            SkyKind::NightSky => "Night Sky",
            SkyKind::StormyMood => "Stormy Mood",
        }
    }
}

fn default_intensity() -> f32 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Filter {
    pub kind: FilterKind,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

impl Filter {
    pub fn new(kind: FilterKind, intensity: f32) -> Self {
        Self { kind, intensity }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::new(FilterKind::None, default_intensity())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkyStyle {
    pub kind: SkyKind,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

impl SkyStyle {
    pub fn new(kind: SkyKind, intensity: f32) -> Self {
        Self { kind, intensity }
    }
}

impl Default for SkyStyle {
    fn default() -> Self {
        Self::new(SkyKind::None, default_intensity())
    }
}

/// Everything one pipeline run needs, in stage order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditParams {
    pub rotation: Rotation,
    pub crop: AspectCrop,
    pub tone: ToneParams,
    pub vignette: Vignette,
    pub text: Option<TextOverlay>,
    pub filter: Filter,
    pub sky: SkyStyle,
}

impl EditParams {
    /// Reject any out-of-range value before a stage runs.
    pub fn validate(&self) -> Result<(), ImagingError> {
        self.crop.validate()?;
        self.tone.validate()?;
        check_range(
            Stage::Tone,
            "vignette.strength",
            self.vignette.strength,
            STRENGTH_RANGE,
            "0.0..=2.0",
        )?;
        if let Some(text) = &self.text {
            text.validate()?;
        }
        check_range(
            Stage::Filter,
            "filter.intensity",
            self.filter.intensity,
            STRENGTH_RANGE,
            "0.0..=2.0",
        )?;
        check_range(
            Stage::SkyStyle,
            "sky.intensity",
            self.sky.intensity,
            STRENGTH_RANGE,
            "0.0..=2.0",
        )?;
        Ok(())
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_parses_degrees() {
        assert_eq!(Rotation::try_from(270), Ok(Rotation::Deg270));
        assert!(Rotation::try_from(45).is_err());
        assert!(Rotation::Deg90.swaps_dimensions());
        assert!(!Rotation::Deg180.swaps_dimensions());
    }

    #[test]
    fn aspect_ratio_parse_and_display() {
        assert_eq!("Original".parse(), Ok(AspectRatio::Original));
        assert_eq!(
            "16:9".parse(),
            Ok(AspectRatio::Ratio {
                width: 16,
                height: 9
            })
        );
        assert!("16x9".parse::<AspectRatio>().is_err());
        assert!("a:9".parse::<AspectRatio>().is_err());
        assert_eq!(AspectRatio::Ratio { width: 21, height: 9 }.to_string(), "21:9");
    }

    #[test]
    fn color_parse_forms() {
        assert_eq!("#FF0000".parse(), Ok(Color([255, 0, 0])));
        assert_eq!("0a0B0c".parse(), Ok(Color([10, 11, 12])));
        assert_eq!("#fff".parse(), Ok(Color::WHITE));
        assert!("#12345".parse::<Color>().is_err());
        assert_eq!(Color([1, 2, 255]).to_string(), "#0102FF");
    }

    #[test]
    fn color_rejects_non_hex_digits() {
        // from_str_radix alone would accept a sign on each pair
        assert!("#+F+F+F".parse::<Color>().is_err());
        assert!("#-1-1-1".parse::<Color>().is_err());
        assert!("#+FF".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
        assert!("#ff 000".parse::<Color>().is_err());
    }

    #[test]
    fn default_params_are_valid_identity() {
        let params = EditParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.rotation, Rotation::Deg0);
        assert_eq!(params.crop.aspect, AspectRatio::Original);
        assert_eq!(params.filter.kind, FilterKind::None);
    }

    #[test]
    fn validate_rejects_out_of_range_tone() {
        let mut params = EditParams::default();
        params.tone.contrast = 2.5;
        assert!(matches!(
            params.validate(),
            Err(ImagingError::InvalidParameter {
                stage: Stage::Tone,
                param: "tone.contrast",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_nan_intensity() {
        let mut params = EditParams::default();
        params.sky = SkyStyle::new(SkyKind::NightSky, f32::NAN);
        assert!(matches!(
            params.validate(),
            Err(ImagingError::InvalidParameter {
                param: "sky.intensity",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_zero_ratio_and_small_text() {
        let mut params = EditParams::default();
        params.crop = AspectCrop::ratio(0, 9);
        assert!(params.validate().is_err());

        let mut params = EditParams::default();
        params.text = Some(TextOverlay {
            size: 4.0,
            ..TextOverlay::default()
        });
        assert!(matches!(
            params.validate(),
            Err(ImagingError::InvalidParameter {
                stage: Stage::Overlay,
                ..
            })
        ));
    }

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn filter_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&FilterKind::EdgeOutline).unwrap();
        assert_eq!(json, "\"edge-outline\"");
        let kind: SkyKind = serde_json::from_str("\"golden-hour\"").unwrap();
        assert_eq!(kind, SkyKind::GoldenHour);
    }
}
