//! Image processing: the edit stages and their building blocks.
//!
//! | Stage | Module | Operation |
//! |---|---|---|
//! | **Geometry** | [`geometry`] | quarter-turn rotation, aspect crop, letterbox pad |
//! | **Tone** | [`tonal`] | brightness, contrast, sharpness, saturation, vignette |
//! | **Overlay** | [`overlay`] + [`font`] | caption text via a font catalog |
//! | **Filter** | [`effects`] | stylistic catalog, intensity blend |
//! | **Sky style** | [`effects`] | second tint catalog, blended after the filter |
//! | **Channels** | [`channels`] | RGB split and false color |
//!
//! The module is split into:
//! - **Calculations**: pure functions for crop windows, masks and placement (unit testable)
//! - **Parameters**: data structures describing an edit
//! - **Raster**: the floating-point buffer every stage owns in turn
//! - **Stages**: one module per stage, each a function from buffer to buffer

mod calculations;
pub mod channels;
pub mod colormap;
pub mod effects;
mod error;
pub mod font;
pub mod geometry;
pub mod overlay;
mod params;
mod raster;
pub mod tonal;

pub use calculations::{CropWindow, calculate_crop_window, luma};
pub use channels::{ChannelSplit, decompose, false_color};
pub use colormap::{ColormapRenderer, GradientRenderer, Palette};
pub use error::{ImagingError, Stage};
pub use font::{BitmapFont, BuiltinFonts, OutlineFont, SystemFontCatalog};
pub use overlay::{FontCatalog, GlyphSource, TextMask};
pub use params::{
    AspectCrop, AspectRatio, Color, EditParams, Filter, FilterKind, Quality, Rotation, SkyKind,
    SkyStyle, TextOverlay, ToneParams, Vignette,
};
pub use raster::{Pixel, Raster, quantize};
