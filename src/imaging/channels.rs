//! Read-only views of the final buffer: per-channel splits and false color.

use super::colormap::{self, ColormapRenderer};
use super::error::ImagingError;
use super::raster::Raster;
use image::{GrayImage, RgbImage};
use tracing::debug;

/// Three same-size images, each holding one channel of the source with the
/// other two zeroed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSplit {
    pub red: Raster,
    pub green: Raster,
    pub blue: Raster,
}

impl ChannelSplit {
    /// `(suffix, image)` pairs in RGB order, as used for file names.
    pub fn named(&self) -> [(&'static str, &Raster); 3] {
        [("red", &self.red), ("green", &self.green), ("blue", &self.blue)]
    }
}

pub fn decompose(raster: &Raster) -> ChannelSplit {
    let only = |channel: usize| {
        raster.map(|px| {
            let mut out = [0.0; 3];
            out[channel] = px[channel];
            out
        })
    };
    ChannelSplit {
        red: only(0),
        green: only(1),
        blue: only(2),
    }
}

/// 8-bit luma of the buffer, the input to every colormap renderer.
pub fn intensity(raster: &Raster) -> GrayImage {
    raster.to_luma_image()
}

/// Render the buffer's intensity through the named palette.
///
/// There is no fallback palette: an unknown name is an error.
pub fn false_color(
    raster: &Raster,
    renderer: &dyn ColormapRenderer,
    palette: &str,
) -> Result<RgbImage, ImagingError> {
    let palette = colormap::lookup(palette)
        .ok_or_else(|| ImagingError::UnknownColormap(palette.to_string()))?;
    debug!(palette = palette.name, family = %palette.family, "false color");
    Ok(renderer.render(&intensity(raster), palette))
}
