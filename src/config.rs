//! Edit recipe configuration.
//!
//! A recipe is a `recipe.toml` describing one edit: every stage's parameters
//! plus output and processing settings. Loading is layered: the stock
//! defaults are serialized to a TOML table, the user's file is merged over
//! it key by key, and the result is deserialized and validated.
//!
//! ## Recipe Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! rotation = 0              # 0, 90, 180 or 270 (clockwise)
//!
//! [crop]
//! aspect = "Original"       # "W:H" or "Original"
//! # offset_x = 0            # Offset into the horizontal slack (default: centered)
//! # offset_y = 0            # Offset into the vertical slack (default: centered)
//! # canvas = [1080, 1080]   # Letterbox the crop onto a fixed canvas
//!
//! [tone]
//! brightness = 1.0          # 0.5 - 2.0
//! contrast = 1.0
//! sharpness = 1.0
//! saturation = 1.0
//!
//! [vignette]
//! strength = 0.0            # 0.0 - 2.0
//!
//! # [text]
//! # content = "Hello!"
//! # size = 50               # 10 - 200
//! # color = "#FF0000"
//! # offset_x = 0
//! # offset_y = 0
//! # font = "Arial"
//!
//! [filter]
//! kind = "none"
//! intensity = 1.0           # 0.0 - 2.0
//!
//! [sky]
//! kind = "none"
//! intensity = 1.0           # 0.0 - 2.0
//!
//! [output]
//! jpeg_quality = 90         # 1 - 100
//! channels = false          # Also write red/green/blue channel images
//! # colormap = "viridis"    # Also write a false-color rendition
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Recipes
//!
//! Recipe files are sparse. Override just the values you want:
//!
//! ```toml
//! rotation = 90
//!
//! [filter]
//! kind = "vintage-fade"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    AspectCrop, EditParams, Filter, ImagingError, Quality, Rotation, SkyStyle, TextOverlay,
    ToneParams, Vignette, colormap,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up when no recipe path is given.
pub const RECIPE_FILENAME: &str = "recipe.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML encode error: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("Invalid recipe: {0}")]
    Invalid(#[from] ImagingError),
    #[error("Recipe validation error: {0}")]
    Validation(String),
}

/// A complete edit recipe loaded from `recipe.toml`.
///
/// All fields have defaults that leave the image untouched. Unknown keys are
/// rejected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipeConfig {
    /// Clockwise rotation in degrees.
    pub rotation: Rotation,
    pub crop: AspectCrop,
    pub tone: ToneParams,
    pub vignette: Vignette,
    /// Caption; absent means no text is drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextOverlay>,
    pub filter: Filter,
    pub sky: SkyStyle,
    /// What gets written for each input.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl RecipeConfig {
    /// The pipeline parameter snapshot for one run.
    pub fn edit_params(&self) -> EditParams {
        EditParams {
            rotation: self.rotation,
            crop: self.crop.clone(),
            tone: self.tone,
            vignette: self.vignette,
            text: self.text.clone(),
            filter: self.filter,
            sky: self.sky,
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.jpeg_quality)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.edit_params().validate()?;
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        if let Some(name) = &self.output.colormap
            && colormap::lookup(name).is_none()
        {
            return Err(ImagingError::UnknownColormap(name.clone()).into());
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality for the edited image (1-100).
    pub jpeg_quality: u32,
    /// Write per-channel images alongside the edit.
    pub channels: bool,
    /// Palette for a false-color rendition. `None` skips it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colormap: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            channels: false,
            colormap: None,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Returns the stock default recipe as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(RecipeConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a recipe file as a raw TOML value.
pub fn load_raw_recipe(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_recipe(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<RecipeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let recipe: RecipeConfig = merged.try_into()?;
    recipe.validate()?;
    Ok(recipe)
}

/// Load a recipe file. The file must exist.
pub fn load_recipe(path: &Path) -> Result<RecipeConfig, ConfigError> {
    let overlay = load_raw_recipe(path)?;
    resolve_recipe(stock_defaults_value()?, Some(overlay))
}

/// Load `recipe.toml` from `dir` if present, stock defaults otherwise.
pub fn discover_recipe(dir: &Path) -> Result<RecipeConfig, ConfigError> {
    let path = dir.join(RECIPE_FILENAME);
    if path.exists() {
        load_recipe(&path)
    } else {
        resolve_recipe(stock_defaults_value()?, None)
    }
}

/// Returns a fully-commented stock `recipe.toml` with all keys and explanations.
///
/// Used by the `gen-recipe` CLI command.
pub fn stock_recipe_toml() -> &'static str {
    r##"# retouch recipe
# ==============
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults, which leave the image untouched.
# Unknown keys will cause an error.
#
# Stages run in a fixed order:
#   rotation -> crop -> tone -> vignette -> text -> filter -> sky

# Clockwise rotation in degrees: 0, 90, 180 or 270.
# 90 and 270 swap width and height.
rotation = 0

# ---------------------------------------------------------------------------
# Aspect crop
# ---------------------------------------------------------------------------
[crop]
# Target ratio as "W:H", or "Original" to skip cropping.
aspect = "Original"

# Offsets into the slack left by the crop. Omit to center.
# Values past the slack are clamped.
# offset_x = 0
# offset_y = 0

# Letterbox the crop onto a fixed [width, height] canvas with a white fill.
# Omit to keep the crop box as-is.
# canvas = [1080, 1080]

# ---------------------------------------------------------------------------
# Tone (each 0.5 - 2.0, 1.0 = unchanged)
# ---------------------------------------------------------------------------
[tone]
brightness = 1.0
contrast = 1.0
sharpness = 1.0
saturation = 1.0

# ---------------------------------------------------------------------------
# Vignette (0.0 = off, up to 2.0)
# ---------------------------------------------------------------------------
[vignette]
strength = 0.0

# ---------------------------------------------------------------------------
# Text overlay (uncomment the table to draw a caption)
# ---------------------------------------------------------------------------
# [text]
# content = "Hello!"
# size = 50               # 10 - 200
# color = "#FF0000"
# offset_x = 0            # Pixels from center; clamped to stay in frame
# offset_y = 0
# font = "Arial"          # Family name or font file; falls back to a built-in face

# ---------------------------------------------------------------------------
# Filter
# ---------------------------------------------------------------------------
[filter]
# none, invert, grayscale, sepia, edge-outline, warm-tone, cool-tone,
# vintage-fade, high-contrast, soft-pastel
kind = "none"
# 0.0 = no effect, 1.0 = full effect, up to 2.0 to exaggerate.
intensity = 1.0

# ---------------------------------------------------------------------------
# Sky style (applied after the filter)
# ---------------------------------------------------------------------------
[sky]
# none, bright-day, golden-hour, sunset-glow, night-sky, stormy-mood
kind = "none"
intensity = 1.0

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG quality for the edited image (1 = worst, 100 = best).
jpeg_quality = 90

# Also write {name}-red.png, {name}-green.png and {name}-blue.png.
channels = false

# Also write a false-color rendition, {name}-{colormap}.png.
# Run 'retouch palettes' for the list.
# colormap = "viridis"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{AspectRatio, Color, FilterKind, SkyKind, Stage};
    use tempfile::TempDir;

    #[test]
    fn default_recipe_is_identity() {
        let recipe = RecipeConfig::default();
        assert_eq!(recipe.edit_params(), EditParams::default());
        assert_eq!(recipe.output.jpeg_quality, 90);
        assert!(!recipe.output.channels);
        assert!(recipe.validate().is_ok());
    }

    #[test]
    fn parse_partial_recipe() {
        let toml = r##"
rotation = 270

[crop]
aspect = "16:9"
offset_y = 10

[filter]
kind = "warm-tone"
intensity = 0.5
"##;
        let recipe: RecipeConfig = toml::from_str(toml).unwrap();
        assert_eq!(recipe.rotation, Rotation::Deg270);
        assert_eq!(
            recipe.crop.aspect,
            AspectRatio::Ratio {
                width: 16,
                height: 9
            }
        );
        assert_eq!(recipe.crop.offset_x, None);
        assert_eq!(recipe.crop.offset_y, Some(10));
        assert_eq!(recipe.filter, Filter::new(FilterKind::WarmTone, 0.5));
        // Defaults preserved
        assert_eq!(recipe.sky.kind, SkyKind::None);
        assert_eq!(recipe.tone, ToneParams::default());
    }

    #[test]
    fn partial_text_table_fills_defaults() {
        let recipe: RecipeConfig = toml::from_str("[text]\ncontent = \"Hi\"\n").unwrap();
        let text = recipe.text.unwrap();
        assert_eq!(text.content, "Hi");
        assert_eq!(text.color, Color::RED);
        assert_eq!(text.size, 50.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<RecipeConfig>("[tone]\nbrightnes = 1.2\n").is_err());
        assert!(toml::from_str::<RecipeConfig>("zoom = 2\n").is_err());
    }

    #[test]
    fn bad_rotation_is_rejected_at_parse() {
        assert!(toml::from_str::<RecipeConfig>("rotation = 45\n").is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut recipe = RecipeConfig::default();
        recipe.vignette.strength = 3.0;
        assert!(matches!(
            recipe.validate(),
            Err(ConfigError::Invalid(ImagingError::InvalidParameter {
                stage: Stage::Tone,
                ..
            }))
        ));

        let mut recipe = RecipeConfig::default();
        recipe.output.jpeg_quality = 0;
        assert!(matches!(recipe.validate(), Err(ConfigError::Validation(_))));

        let mut recipe = RecipeConfig::default();
        recipe.processing.max_processes = Some(0);
        assert!(matches!(recipe.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_unknown_colormap() {
        let mut recipe = RecipeConfig::default();
        recipe.output.colormap = Some("viridis".into());
        assert!(recipe.validate().is_ok());
        recipe.output.colormap = Some("Viridis".into());
        assert!(matches!(
            recipe.validate(),
            Err(ConfigError::Invalid(ImagingError::UnknownColormap(_)))
        ));
    }

    #[test]
    fn quality_comes_from_output_section() {
        let mut recipe = RecipeConfig::default();
        recipe.output.jpeg_quality = 75;
        assert_eq!(recipe.quality().value(), 75);
    }

    // =========================================================================
    // Layered loading
    // =========================================================================

    #[test]
    fn merge_toml_overrides_nested_keys() {
        let base: toml::Value =
            toml::from_str("[tone]\nbrightness = 1.0\ncontrast = 1.0\n").unwrap();
        let overlay: toml::Value = toml::from_str("[tone]\ncontrast = 1.5\n").unwrap();
        let merged = merge_toml(base, overlay);
        let tone = merged.get("tone").unwrap();
        assert_eq!(tone.get("brightness").unwrap().as_float(), Some(1.0));
        assert_eq!(tone.get("contrast").unwrap().as_float(), Some(1.5));
    }

    #[test]
    fn stock_defaults_roundtrip() {
        let recipe = resolve_recipe(stock_defaults_value().unwrap(), None).unwrap();
        assert_eq!(recipe, RecipeConfig::default());
    }

    #[test]
    fn stock_recipe_toml_parses_to_defaults() {
        let recipe: RecipeConfig = toml::from_str(stock_recipe_toml()).unwrap();
        assert_eq!(recipe, RecipeConfig::default());
    }

    #[test]
    fn load_recipe_reads_file_over_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mine.toml");
        fs::write(
            &path,
            r##"
[tone]
contrast = 1.4

[output]
channels = true
colormap = "magma"
"##,
        )
        .unwrap();

        let recipe = load_recipe(&path).unwrap();
        assert_eq!(recipe.tone.contrast, 1.4);
        assert_eq!(recipe.tone.brightness, 1.0);
        assert!(recipe.output.channels);
        assert_eq!(recipe.output.colormap.as_deref(), Some("magma"));
    }

    #[test]
    fn load_recipe_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_recipe(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_recipe_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(RECIPE_FILENAME);
        fs::write(&path, "[sky]\nkind = \"night-sky\"\nintensity = 2.5\n").unwrap();
        assert!(matches!(
            load_recipe(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn discover_recipe_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(discover_recipe(tmp.path()).unwrap(), RecipeConfig::default());

        fs::write(tmp.path().join(RECIPE_FILENAME), "rotation = 180\n").unwrap();
        assert_eq!(discover_recipe(tmp.path()).unwrap().rotation, Rotation::Deg180);
    }

    #[test]
    fn effective_threads_caps_at_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
        let one = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&one), 1);
        let many = ProcessingConfig {
            max_processes: Some(cores + 100),
        };
        assert_eq!(effective_threads(&many), cores);
    }
}
