//! The edit pipeline: one linear chain of stages over an owned buffer.
//!
//! ```text
//! original ──clone──▶ Geometry ─▶ Tone ─▶ Overlay ─▶ Filter ─▶ Sky style ─▶ edited
//!                                                                            │
//!                                                   channels / false color ◀─┘
//! ```
//!
//! Each stage takes the working [`Raster`] by value and returns the next one,
//! so the data flow is explicit and every stage can be tested on its own. The
//! original is never touched; it is kept for side-by-side output.
//!
//! Parameters are validated once before the first stage runs. Any stage error
//! aborts the whole run.

use crate::imaging::{
    ChannelSplit, ColormapRenderer, EditParams, FontCatalog, ImagingError, Raster, Stage,
    channels, effects, geometry, overlay, tonal,
};
use image::RgbImage;
use tracing::debug_span;

/// Run every stage over a copy of `original`.
pub fn run(
    original: &Raster,
    params: &EditParams,
    fonts: &dyn FontCatalog,
) -> Result<Raster, ImagingError> {
    params.validate()?;
    let working = original.clone();

    let working = {
        let _span = debug_span!("stage", name = %Stage::Geometry).entered();
        geometry::apply(working, params.rotation, &params.crop)?
    };
    let working = {
        let _span = debug_span!("stage", name = %Stage::Tone).entered();
        let working = tonal::enhance(working, &params.tone);
        tonal::vignette(working, params.vignette)
    };
    let working = match &params.text {
        Some(text) => {
            let _span = debug_span!("stage", name = %Stage::Overlay).entered();
            overlay::draw_text(working, text, fonts)
        }
        None => working,
    };
    let working = {
        let _span = debug_span!("stage", name = %Stage::Filter).entered();
        effects::apply_filter(working, params.filter)?
    };
    let _span = debug_span!("stage", name = %Stage::SkyStyle).entered();
    effects::apply_sky(working, params.sky)
}

/// An original and its edited rendition, kept together for output.
#[derive(Debug, Clone)]
pub struct Edit {
    pub original: Raster,
    pub edited: Raster,
}

impl Edit {
    pub fn apply(
        original: Raster,
        params: &EditParams,
        fonts: &dyn FontCatalog,
    ) -> Result<Self, ImagingError> {
        let edited = run(&original, params, fonts)?;
        Ok(Self { original, edited })
    }

    pub fn channels(&self) -> ChannelSplit {
        let _span = debug_span!("stage", name = %Stage::Channels).entered();
        channels::decompose(&self.edited)
    }

    pub fn false_color(
        &self,
        renderer: &dyn ColormapRenderer,
        palette: &str,
    ) -> Result<RgbImage, ImagingError> {
        let _span = debug_span!("stage", name = %Stage::FalseColor).entered();
        channels::false_color(&self.edited, renderer, palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{
        AspectCrop, BuiltinFonts, Filter, FilterKind, GradientRenderer, Rotation, SkyKind,
        SkyStyle, TextOverlay, ToneParams, Vignette,
    };

    fn white(w: u32, h: u32) -> Raster {
        Raster::filled(w, h, [255.0; 3]).unwrap()
    }

    #[test]
    fn default_params_are_identity() {
        let src = Raster::from_fn(5, 4, |x, y| [(x * 50) as f32, (y * 60) as f32, 7.0]).unwrap();
        let out = run(&src, &EditParams::default(), &BuiltinFonts).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn rotate_then_vintage_fade_on_white() {
        let params = EditParams {
            rotation: Rotation::Deg90,
            filter: Filter::new(FilterKind::VintageFade, 1.0),
            ..EditParams::default()
        };
        let out = run(&white(100, 100), &params, &BuiltinFonts).unwrap();
        assert_eq!(out.dimensions(), (100, 100));
        assert!(out.to_rgb_image().pixels().all(|p| p.0 == [233, 233, 233]));
    }

    #[test]
    fn sky_style_blends_against_filtered_buffer() {
        let src = Raster::filled(2, 2, [100.0; 3]).unwrap();
        let params = EditParams {
            filter: Filter::new(FilterKind::Invert, 1.0),
            sky: SkyStyle::new(SkyKind::NightSky, 1.0),
            ..EditParams::default()
        };
        let out = run(&src, &params, &BuiltinFonts).unwrap();
        // invert → 155, then night sky → (77.5, 77.5, 139.5)
        assert_eq!(out.pixel(0, 0), [77.5, 77.5, 139.5]);
    }

    #[test]
    fn invalid_parameters_fail_before_any_stage() {
        let params = EditParams {
            tone: ToneParams {
                brightness: 0.1,
                ..ToneParams::default()
            },
            ..EditParams::default()
        };
        let err = run(&white(4, 4), &params, &BuiltinFonts).unwrap_err();
        assert!(matches!(
            err,
            ImagingError::InvalidParameter {
                stage: Stage::Tone,
                ..
            }
        ));
    }

    #[test]
    fn geometry_failure_aborts_run() {
        let params = EditParams {
            crop: AspectCrop::ratio(21, 9),
            ..EditParams::default()
        };
        let err = run(&white(1, 50), &params, &BuiltinFonts).unwrap_err();
        assert!(matches!(err, ImagingError::GeometryInfeasible { .. }));
    }

    #[test]
    fn original_is_retained_untouched() {
        let src = white(6, 3);
        let params = EditParams {
            crop: AspectCrop::ratio(1, 1),
            vignette: Vignette { strength: 1.0 },
            text: Some(TextOverlay::default()),
            ..EditParams::default()
        };
        let edit = Edit::apply(src.clone(), &params, &BuiltinFonts).unwrap();
        assert_eq!(edit.original, src);
        assert_eq!(edit.edited.dimensions(), (3, 3));
    }

    #[test]
    fn edit_views_read_the_final_buffer() {
        let edit = Edit::apply(white(4, 2), &EditParams::default(), &BuiltinFonts).unwrap();
        let split = edit.channels();
        assert_eq!(split.red.pixel(0, 0), [255.0, 0.0, 0.0]);
        let fc = edit.false_color(&GradientRenderer, "gray").unwrap();
        assert_eq!(fc.dimensions(), (4, 2));
        assert!(edit.false_color(&GradientRenderer, "nope").is_err());
    }
}
