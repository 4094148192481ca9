//! Pure calculation functions for geometry, masks and placement.
//!
//! All functions here are pure and testable without any I/O or images.

use super::raster::Pixel;

/// ITU-R 601-2 luma: `0.299 R + 0.587 G + 0.114 B`.
#[inline]
pub fn luma(px: Pixel) -> f32 {
    px[0] * 0.299 + px[1] * 0.587 + px[2] * 0.114
}

/// The region an aspect crop keeps, plus the slack that bounds its offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Horizontal slack: valid `x` offsets are `0..=max_x`.
    pub max_x: u32,
    /// Vertical slack: valid `y` offsets are `0..=max_y`.
    pub max_y: u32,
}

/// Calculate the largest region of `source` matching `ratio`.
///
/// When the source is wider than the target ratio the full height is kept and
/// the width derived; otherwise the full width is kept. Offsets default to
/// half the slack and are clamped into `0..=slack`. Arithmetic is integer-exact
/// so a source that already matches the ratio yields the full frame.
///
/// Returns `None` if the derived side rounds down to zero.
///
/// # Examples
/// ```
/// # use retouch::imaging::calculate_crop_window;
/// // 1:1 on a 200x100 source → 100x100 window centered at x = 50
/// let w = calculate_crop_window((200, 100), (1, 1), (None, None)).unwrap();
/// assert_eq!((w.width, w.height, w.max_x, w.x), (100, 100, 100, 50));
/// ```
pub fn calculate_crop_window(
    source: (u32, u32),
    ratio: (u32, u32),
    offset: (Option<u32>, Option<u32>),
) -> Option<CropWindow> {
    let (src_w, src_h) = (u64::from(source.0), u64::from(source.1));
    let (rw, rh) = (u64::from(ratio.0), u64::from(ratio.1));
    if rw == 0 || rh == 0 {
        return None;
    }

    let (crop_w, crop_h) = if src_w * rh > src_h * rw {
        // Wider than target: height is fully used
        (src_h * rw / rh, src_h)
    } else {
        (src_w, src_w * rh / rw)
    };
    if crop_w == 0 || crop_h == 0 {
        return None;
    }

    let max_x = (src_w - crop_w) as u32;
    let max_y = (src_h - crop_h) as u32;
    let x = offset.0.map_or(max_x / 2, |ox| ox.min(max_x));
    let y = offset.1.map_or(max_y / 2, |oy| oy.min(max_y));

    Some(CropWindow {
        x,
        y,
        width: crop_w as u32,
        height: crop_h as u32,
        max_x,
        max_y,
    })
}

/// Calculate dimensions that fit inside `target` while keeping the source
/// aspect ratio (the inverse of a fill). At least one side matches the target.
pub fn calculate_fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: width matches, height shrinks
        let h = (tgt_w as f64 / src_aspect).round().max(1.0) as u32;
        (tgt_w, h.min(tgt_h))
    } else {
        let w = (tgt_h as f64 * src_aspect).round().max(1.0) as u32;
        (w.min(tgt_w), tgt_h)
    }
}

/// `n` evenly spaced samples over `[-1, 1]`. A single sample sits at `-1`.
pub fn linspace_unit(n: u32) -> Vec<f32> {
    match n {
        0 => Vec::new(),
        1 => vec![-1.0],
        _ => {
            let step = 2.0 / (n - 1) as f64;
            (0..n).map(|i| (-1.0 + step * i as f64) as f32).collect()
        }
    }
}

/// Radial falloff mask, row-major, one weight per pixel.
///
/// `mask = clamp(1 - r / r_max, 0, 1) ^ strength` over normalized coordinates,
/// so the mask shape is independent of resolution.
pub fn vignette_mask(width: u32, height: u32, strength: f32) -> Vec<f32> {
    let xs = linspace_unit(width);
    let ys = linspace_unit(height);

    let radius: Vec<f32> = ys
        .iter()
        .flat_map(|&y| xs.iter().map(move |&x| (x * x + y * y).sqrt()))
        .collect();
    let max = radius.iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return vec![1.0; radius.len()];
    }

    radius
        .into_iter()
        .map(|r| (1.0 - r / max).clamp(0.0, 1.0).powf(strength))
        .collect()
}

/// Position of a box of size `item` centered in `container`, shifted by
/// `offset`, then clamped so the box stays inside.
///
/// Centering floors toward negative infinity. When the box is larger than the
/// container the lower bound wins and the result is 0.
pub fn place_centered(container: u32, item: u32, offset: i64) -> u32 {
    let container = i64::from(container);
    let item = i64::from(item);
    let base = (container - item).div_euclid(2);
    let upper = container - item;
    (base + offset).min(upper).max(0) as u32
}
