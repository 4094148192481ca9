//! Tonal stage: four enhancement passes, then the radial vignette.
//!
//! Every enhancement is an interpolation away from a "degenerate" version of
//! the image: `degenerate + factor * (pixel - degenerate)`, clamped after
//! each pass. The passes run in a fixed order:
//!
//! | Pass | Degenerate image |
//! |---|---|
//! | Brightness | black |
//! | Contrast | uniform gray at the rounded mean luma |
//! | Sharpness | 3x3 smooth (`[1 1 1; 1 5 1; 1 1 1] / 13`), border copied |
//! | Saturation | per-pixel luma |
//!
//! A factor of exactly 1.0 skips its pass so identity settings never touch
//! the buffer.

use super::calculations::{luma, vignette_mask};
use super::params::{ToneParams, Vignette};
use super::raster::{Pixel, Raster};
use tracing::debug;

const SMOOTH_KERNEL: [[f32; 3]; 3] = [[1.0, 1.0, 1.0], [1.0, 5.0, 1.0], [1.0, 1.0, 1.0]];
const SMOOTH_SCALE: f32 = 13.0;

#[inline]
fn lerp_from(degenerate: f32, value: f32, factor: f32) -> f32 {
    (degenerate + factor * (value - degenerate)).clamp(0.0, 255.0)
}

/// Apply brightness, contrast, sharpness and saturation in that order.
pub fn enhance(working: Raster, tone: &ToneParams) -> Raster {
    debug!(?tone, "enhance");
    let working = brightness(working, tone.brightness);
    let working = contrast(working, tone.contrast);
    let working = sharpness(working, tone.sharpness);
    saturation(working, tone.saturation)
}

pub fn brightness(mut working: Raster, factor: f32) -> Raster {
    if factor == 1.0 {
        return working;
    }
    for px in working.pixels_mut() {
        for c in px.iter_mut() {
            *c = lerp_from(0.0, *c, factor);
        }
    }
    working
}

pub fn contrast(mut working: Raster, factor: f32) -> Raster {
    if factor == 1.0 {
        return working;
    }
    let (w, h) = working.dimensions();
    let total: f64 = working.pixels().map(|px| f64::from(luma(px))).sum();
    let mean = (total / (f64::from(w) * f64::from(h)) + 0.5).floor() as f32;
    for px in working.pixels_mut() {
        for c in px.iter_mut() {
            *c = lerp_from(mean, *c, factor);
        }
    }
    working
}

pub fn sharpness(working: Raster, factor: f32) -> Raster {
    if factor == 1.0 {
        return working;
    }
    let smoothed = smooth(&working);
    let mut out = working;
    for (px, deg) in out.pixels_mut().zip(smoothed.pixels()) {
        for c in 0..3 {
            px[c] = lerp_from(deg[c], px[c], factor);
        }
    }
    out
}

/// 3x3 smoothing with the outermost ring copied from the source.
fn smooth(src: &Raster) -> Raster {
    let (w, h) = src.dimensions();
    let mut out = src.clone();
    if w < 3 || h < 3 {
        return out;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut acc: Pixel = [0.0; 3];
            for (ky, row) in SMOOTH_KERNEL.iter().enumerate() {
                for (kx, &weight) in row.iter().enumerate() {
                    let px = src.pixel(x + kx as u32 - 1, y + ky as u32 - 1);
                    for c in 0..3 {
                        acc[c] += px[c] * weight;
                    }
                }
            }
            *out.pixel_mut(x, y) = acc.map(|v| v / SMOOTH_SCALE);
        }
    }
    out
}

pub fn saturation(mut working: Raster, factor: f32) -> Raster {
    if factor == 1.0 {
        return working;
    }
    for px in working.pixels_mut() {
        let gray = luma(*px);
        for c in px.iter_mut() {
            *c = lerp_from(gray, *c, factor);
        }
    }
    working
}

/// Darken toward the corners. Strength 0 returns the buffer untouched.
pub fn vignette(mut working: Raster, vignette: Vignette) -> Raster {
    if vignette.strength == 0.0 {
        return working;
    }
    let (w, h) = working.dimensions();
    debug!(strength = vignette.strength, width = w, height = h, "vignette");
    let mask = vignette_mask(w, h, vignette.strength);
    for (px, m) in working.pixels_mut().zip(mask) {
        for c in px.iter_mut() {
            *c = (*c * m).clamp(0.0, 255.0);
        }
    }
    working
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> Raster {
        Raster::from_fn(w, h, |x, y| {
            [(x * 20) as f32, (y * 30) as f32, ((x + y) * 10) as f32]
        })
        .unwrap()
    }

    #[test]
    fn identity_tone_is_exact_no_op() {
        let src = gradient(6, 5);
        assert_eq!(enhance(src.clone(), &ToneParams::default()), src);
    }

    #[test]
    fn brightness_scales_and_clamps() {
        let src = Raster::filled(2, 2, [100.0, 200.0, 10.0]).unwrap();
        let out = brightness(src, 2.0);
        assert_eq!(out.pixel(1, 1), [200.0, 255.0, 20.0]);
    }

    #[test]
    fn contrast_pivots_around_mean_luma() {
        // Two pixels: luma 0 and luma 200 → mean 100
        let src =
            Raster::from_fn(2, 1, |x, _| if x == 0 { [0.0; 3] } else { [200.0; 3] }).unwrap();
        let out = contrast(src, 0.5);
        assert_eq!(out.pixel(0, 0), [50.0; 3]);
        assert_eq!(out.pixel(1, 0), [150.0; 3]);
    }

    #[test]
    fn saturation_half_moves_toward_gray() {
        let src = Raster::filled(1, 1, [255.0, 0.0, 0.0]).unwrap();
        let out = saturation(src, 0.5);
        let gray: f32 = 255.0 * 0.299;
        let px = out.pixel(0, 0);
        assert!((px[0] - (gray + 0.5 * (255.0 - gray))).abs() < 1e-3);
        assert!((px[1] - gray * 0.5).abs() < 1e-3);
    }

    #[test]
    fn sharpness_leaves_flat_images_and_borders_alone() {
        let flat = Raster::filled(5, 5, [80.0, 90.0, 100.0]).unwrap();
        assert_eq!(sharpness(flat.clone(), 2.0), flat);

        let src = gradient(5, 5);
        let out = sharpness(src.clone(), 2.0);
        assert_eq!(out.pixel(0, 0), src.pixel(0, 0));
        assert_eq!(out.pixel(4, 2), src.pixel(4, 2));
    }

    #[test]
    fn sharpness_amplifies_a_spike() {
        let mut src = Raster::filled(3, 3, [100.0; 3]).unwrap();
        *src.pixel_mut(1, 1) = [113.0; 3];
        // smoothed center = (8*100 + 5*113) / 13 = 105
        let out = sharpness(src, 2.0);
        assert!((out.pixel(1, 1)[0] - 121.0).abs() < 1e-3);
    }

    #[test]
    fn vignette_zero_is_identity() {
        let src = gradient(7, 4);
        assert_eq!(vignette(src.clone(), Vignette { strength: 0.0 }), src);
    }

    #[test]
    fn vignette_darkens_corners_keeps_center() {
        let src = Raster::filled(3, 3, [200.0; 3]).unwrap();
        let out = vignette(src, Vignette { strength: 1.0 });
        assert_eq!(out.pixel(1, 1), [200.0; 3]);
        assert_eq!(out.pixel(0, 0), [0.0; 3]);
        assert!(out.pixel(1, 0)[0] < 200.0);
    }
}
