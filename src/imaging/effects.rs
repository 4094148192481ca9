//! Filter and sky-style stages.
//!
//! Both catalogs share one contract: a kind maps to an effect function that
//! computes an *effect buffer* from the current working buffer, and the result
//! is `blend(working, effect, intensity)`. The sky style always runs on the
//! output of the filter, never on the pre-filter image.
//!
//! | Filter | Effect |
//! |---|---|
//! | Invert | `255 - c` |
//! | Grayscale | mean of R, G, B in every channel |
//! | Sepia | standard 3x3 sepia matrix |
//! | EdgeOutline | FIND_EDGES 3x3 convolution on the 8-bit image, border ring kept |
//! | WarmTone | tint ×1.4 / ×1.2 / ×0.9 |
//! | CoolTone | tint ×0.9 / ×1.2 / ×1.4 |
//! | VintageFade | `c * 0.6 + 80` |
//! | HighContrast | `128 + 2 (c - 128)` |
//! | SoftPastel | `c * 0.8 + 50` |
//!
//! | Sky style | Effect |
//! |---|---|
//! | BrightDay | tint ×1.2 / ×1.2 / ×1.3 |
//! | GoldenHour | tint ×1.4 / ×1.2 / ×0.9 |
//! | SunsetGlow | tint ×1.5 / ×1.0 / ×0.8 |
//! | NightSky | `c * 0.5`, then blue ×1.8 |
//! | StormyMood | `c * 0.7`, then red ×0.8, blue ×1.4 |
//!
//! Tints clamp their own effect buffer to `[0, 255]`; every other formula is
//! left unclamped until the blend.

use super::error::{ImagingError, Stage};
use super::params::{Filter, FilterKind, SkyKind, SkyStyle};
use super::raster::Raster;
use image::Rgb;
use tracing::debug;

/// Computes an effect buffer from the working buffer.
pub type EffectFn = fn(&Raster) -> Raster;

const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

const FIND_EDGES: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// Effect function for a filter kind. `None` has no effect.
pub fn filter_effect(kind: FilterKind) -> Option<EffectFn> {
    let f: EffectFn = match kind {
        FilterKind::None => return None,
        FilterKind::Invert => invert,
        FilterKind::Grayscale => grayscale,
        FilterKind::Sepia => sepia,
        FilterKind::EdgeOutline => edge_outline,
        FilterKind::WarmTone => |w| tint(w, [1.4, 1.2, 0.9]),
        FilterKind::CoolTone => |w| tint(w, [0.9, 1.2, 1.4]),
        FilterKind::VintageFade => |w| w.map(|px| px.map(|c| c * 0.6 + 80.0)),
        FilterKind::HighContrast => |w| w.map(|px| px.map(|c| 128.0 + 2.0 * (c - 128.0))),
        FilterKind::SoftPastel => |w| w.map(|px| px.map(|c| c * 0.8 + 50.0)),
    };
    Some(f)
}

/// Effect function for a sky style. `None` has no effect.
pub fn sky_effect(kind: SkyKind) -> Option<EffectFn> {
    let f: EffectFn = match kind {
        SkyKind::None => return None,
        SkyKind::BrightDay => |w| tint(w, [1.2, 1.2, 1.3]),
        SkyKind::GoldenHour => |w| tint(w, [1.4, 1.2, 0.9]),
        SkyKind::SunsetGlow => |w| tint(w, [1.5, 1.0, 0.8]),
        SkyKind::NightSky => |w| {
            w.map(|px| {
                let [r, g, b] = px.map(|c| c * 0.5);
                [r, g, b * 1.8]
            })
        },
        SkyKind::StormyMood => |w| {
            w.map(|px| {
                let [r, g, b] = px.map(|c| c * 0.7);
                [r * 0.8, g, b * 1.4]
            })
        },
    };
    Some(f)
}

pub fn apply_filter(working: Raster, filter: Filter) -> Result<Raster, ImagingError> {
    debug!(kind = ?filter.kind, intensity = filter.intensity, "filter");
    apply_effect(
        working,
        filter_effect(filter.kind),
        filter.intensity,
        Stage::Filter,
    )
}

pub fn apply_sky(working: Raster, sky: SkyStyle) -> Result<Raster, ImagingError> {
    debug!(kind = ?sky.kind, intensity = sky.intensity, "sky style");
    apply_effect(working, sky_effect(sky.kind), sky.intensity, Stage::SkyStyle)
}

/// Blend an effect into the working buffer. Intensity 0 skips the effect.
pub fn apply_effect(
    working: Raster,
    effect: Option<EffectFn>,
    intensity: f32,
    stage: Stage,
) -> Result<Raster, ImagingError> {
    match effect {
        Some(f) if intensity != 0.0 => {
            let effect = f(&working);
            working.blend(&effect, intensity, stage)
        }
        _ => Ok(working),
    }
}

fn invert(w: &Raster) -> Raster {
    w.map(|px| px.map(|c| 255.0 - c))
}

fn grayscale(w: &Raster) -> Raster {
    w.map(|[r, g, b]| [(r + g + b) / 3.0; 3])
}

fn sepia(w: &Raster) -> Raster {
    w.map(|px| SEPIA.map(|row| row[0] * px[0] + row[1] * px[1] + row[2] * px[2]))
}

/// Per-channel multiplicative tint, clamped into channel range.
fn tint(w: &Raster, factors: [f32; 3]) -> Raster {
    w.map(|px| {
        let mut out = px;
        for c in 0..3 {
            out[c] = (px[c] * factors[c]).clamp(0.0, 255.0);
        }
        out
    })
}

fn edge_outline(w: &Raster) -> Raster {
    let src = w.to_rgb_image();
    let edges = image::imageops::filter3x3(&src, &FIND_EDGES);
    let (width, height) = w.dimensions();
    w.map_xy(|x, y, _| {
        // the kernel has no full neighborhood on the outer ring
        let border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
        let Rgb(px) = if border {
            *src.get_pixel(x, y)
        } else {
            *edges.get_pixel(x, y)
        };
        px.map(f32::from)
    })
}
