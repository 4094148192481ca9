//! The floating-point RGB buffer every stage reads and writes.
//!
//! Channel values are `f32` and may leave `[0, 255]` while a stage computes an
//! effect; stages clamp before handing the buffer on. Quantization to 8 bits
//! happens only at export ([`Raster::to_rgb_image`]): clamp, then truncate
//! toward zero, so `227.5` becomes `227`.

use super::calculations::luma;
use super::error::{ImagingError, Stage};
use image::{DynamicImage, GrayImage, Luma, Rgb, Rgb32FImage, RgbImage};

/// One RGB pixel in working precision.
pub type Pixel = [f32; 3];

/// A non-empty `Rgb32FImage` holding channel values on the 0-255 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    inner: Rgb32FImage,
}

impl Raster {
    /// Wrap an existing buffer. Zero-area images are rejected.
    pub fn from_image(inner: Rgb32FImage) -> Result<Self, ImagingError> {
        let (width, height) = inner.dimensions();
        if width == 0 || height == 0 {
            return Err(ImagingError::EmptyImage { width, height });
        }
        Ok(Self { inner })
    }

    /// A buffer of the given size with every pixel set to `fill`.
    pub fn filled(width: u32, height: u32, fill: Pixel) -> Result<Self, ImagingError> {
        Self::from_image(Rgb32FImage::from_pixel(width, height, Rgb(fill)))
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> Pixel,
    ) -> Result<Self, ImagingError> {
        Self::from_image(Rgb32FImage::from_fn(width, height, |x, y| Rgb(f(x, y))))
    }

    pub fn from_rgb_image(img: &RgbImage) -> Result<Self, ImagingError> {
        Self::from_fn(img.width(), img.height(), |x, y| {
            img.get_pixel(x, y).0.map(f32::from)
        })
    }

    /// Decode-side entry point: any color type is flattened to RGB first.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self, ImagingError> {
        Self::from_rgb_image(&img.to_rgb8())
    }

    /// Quantize to 8-bit RGB: clamp to `[0, 255]`, truncate toward zero.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width(), self.height(), |x, y| {
            Rgb(self.pixel(x, y).map(quantize))
        })
    }

    /// Single-channel intensity view (ITU-R 601-2 luma), quantized like
    /// [`to_rgb_image`](Self::to_rgb_image).
    pub fn to_luma_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([quantize(luma(self.pixel(x, y)))])
        })
    }

    pub fn as_image(&self) -> &Rgb32FImage {
        &self.inner
    }

    pub fn into_image(self) -> Rgb32FImage {
        self.inner
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        self.inner.get_pixel(x, y).0
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut Pixel {
        &mut self.inner.get_pixel_mut(x, y).0
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.inner.pixels().map(|p| p.0)
    }

    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut Pixel> + '_ {
        self.inner.pixels_mut().map(|p| &mut p.0)
    }

    /// Apply `f` to every pixel, producing a new buffer of the same size.
    /// No clamping: effect formulas may overshoot.
    pub fn map(&self, f: impl Fn(Pixel) -> Pixel) -> Raster {
        let mut inner = self.inner.clone();
        for px in inner.pixels_mut() {
            px.0 = f(px.0);
        }
        Raster { inner }
    }

    /// Like [`map`](Self::map), with the pixel coordinates passed in.
    pub fn map_xy(&self, f: impl Fn(u32, u32, Pixel) -> Pixel) -> Raster {
        let mut inner = self.inner.clone();
        for (x, y, px) in inner.enumerate_pixels_mut() {
            px.0 = f(x, y, px.0);
        }
        Raster { inner }
    }

    /// Clamp every channel into `[0, 255]` in place.
    pub fn clamp(mut self) -> Raster {
        for c in self.inner.iter_mut() {
            *c = c.clamp(0.0, 255.0);
        }
        self
    }

    /// `clamp(self * (1 - intensity) + effect * intensity, 0, 255)`.
    ///
    /// Intensity above 1.0 extrapolates past the pure effect.
    pub fn blend(
        mut self,
        effect: &Raster,
        intensity: f32,
        stage: Stage,
    ) -> Result<Raster, ImagingError> {
        if effect.dimensions() != self.dimensions() {
            return Err(ImagingError::SizeMismatch {
                stage,
                expected: self.dimensions(),
                actual: effect.dimensions(),
            });
        }
        let keep = 1.0 - intensity;
        for (w, e) in self.inner.iter_mut().zip(effect.inner.iter()) {
            *w = (*w * keep + e * intensity).clamp(0.0, 255.0);
        }
        Ok(self)
    }
}

/// Clamp then truncate, matching a float-to-`u8` cast after clipping.
#[inline]
pub fn quantize(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}
