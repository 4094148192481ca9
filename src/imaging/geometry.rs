//! Geometric stage: quarter-turn rotation, then aspect crop and pad.
//!
//! Both steps replace the working buffer wholesale. Rotation never crops: a
//! 90° or 270° turn swaps the canvas dimensions instead.

use super::calculations::{CropWindow, calculate_crop_window, calculate_fit_dimensions};
use super::error::{ImagingError, Stage};
use super::params::{AspectCrop, AspectRatio, Color, Rotation};
use super::raster::Raster;
use image::imageops::{self, FilterType};
use image::{Rgb, Rgb32FImage};
use tracing::debug;

/// Fill used when the crop is letterboxed onto a larger canvas.
pub const PAD_FILL: Color = Color::WHITE;

/// Run the whole stage: rotate, then crop and pad (unless the ratio is `Original`).
pub fn apply(
    working: Raster,
    rotation: Rotation,
    crop: &AspectCrop,
) -> Result<Raster, ImagingError> {
    let working = rotate(working, rotation)?;
    match crop.aspect {
        AspectRatio::Original => Ok(working),
        AspectRatio::Ratio { .. } => aspect_crop(working, crop),
    }
}

/// Rotate clockwise by a quarter-turn multiple.
pub fn rotate(src: Raster, rotation: Rotation) -> Result<Raster, ImagingError> {
    let (w, h) = src.dimensions();
    debug!(degrees = rotation.degrees(), width = w, height = h, "rotate");
    match rotation {
        Rotation::Deg0 => Ok(src),
        Rotation::Deg90 => Raster::from_image(imageops::rotate90(src.as_image())),
        Rotation::Deg180 => Raster::from_image(imageops::rotate180(src.as_image())),
        Rotation::Deg270 => Raster::from_image(imageops::rotate270(src.as_image())),
    }
}

/// Crop the largest region matching the requested ratio, then pad it onto
/// the output canvas.
pub fn aspect_crop(src: Raster, crop: &AspectCrop) -> Result<Raster, ImagingError> {
    let AspectRatio::Ratio { width, height } = crop.aspect else {
        return Ok(src);
    };
    let window = calculate_crop_window(
        src.dimensions(),
        (width, height),
        (crop.offset_x, crop.offset_y),
    )
    .ok_or_else(|| ImagingError::GeometryInfeasible {
        stage: Stage::Geometry,
        reason: format!(
            "{}x{} source cannot hold a non-empty {width}:{height} crop",
            src.width(),
            src.height()
        ),
    })?;
    debug!(?window, ratio = %crop.aspect, "aspect crop");

    let cropped = crop_to(&src, window)?;
    let canvas = crop
        .canvas
        .map(|[w, h]| (w, h))
        .unwrap_or((window.width, window.height));
    pad_to_canvas(cropped, canvas, PAD_FILL)
}

fn crop_to(src: &Raster, window: CropWindow) -> Result<Raster, ImagingError> {
    let view = imageops::crop_imm(
        src.as_image(),
        window.x,
        window.y,
        window.width,
        window.height,
    );
    Raster::from_image(view.to_image())
}

/// Scale `src` to fit inside `canvas` (aspect preserved, never stretched) and
/// center it on a `fill` background. A source already matching the canvas
/// passes through untouched.
pub fn pad_to_canvas(
    src: Raster,
    canvas: (u32, u32),
    fill: Color,
) -> Result<Raster, ImagingError> {
    if src.dimensions() == canvas {
        return Ok(src);
    }
    let (canvas_w, canvas_h) = canvas;
    if canvas_w == 0 || canvas_h == 0 {
        return Err(ImagingError::GeometryInfeasible {
            stage: Stage::Geometry,
            reason: format!("pad canvas {canvas_w}x{canvas_h} has zero area"),
        });
    }

    let (fit_w, fit_h) = calculate_fit_dimensions(src.dimensions(), canvas);
    let scaled = if (fit_w, fit_h) == src.dimensions() {
        src.into_image()
    } else {
        resize(src.as_image(), fit_w, fit_h)
    };
    let left = (canvas_w - fit_w) / 2;
    let top = (canvas_h - fit_h) / 2;

    let mut out = Rgb32FImage::from_pixel(canvas_w, canvas_h, Rgb(fill.0.map(f32::from)));
    imageops::replace(&mut out, &scaled, i64::from(left), i64::from(top));
    // Lanczos3 rings past the channel range near hard edges
    Ok(Raster::from_image(out)?.clamp())
}

/// Lanczos3 resample. Float samples are resampled on the nominal `[0, 1]`
/// scale, where the filter clamps them.
fn resize(src: &Rgb32FImage, width: u32, height: u32) -> Rgb32FImage {
    let mut unit = src.clone();
    for c in unit.iter_mut() {
        *c /= 255.0;
    }
    let mut out = imageops::resize(&unit, width, height, FilterType::Lanczos3);
    for c in out.iter_mut() {
        *c *= 255.0;
    }
    out
}
