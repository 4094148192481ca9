//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each processed photo leads with its positional index and file name, then
//! its dimensions before and after the edit. Output files are shown as
//! indented context lines with how they came to exist in this run.
//!
//! # Output Format
//!
//! ## Edit
//!
//! ```text
//! Editing 2 photos → edited/
//! 001 dawn.jpg (4000x3000 → 3000x3000)
//!     Source: photos/dawn.jpg
//!     dawn-edited.jpg: written
//!     dawn-original.png: written
//! 002 dusk.jpg (3000x4000 → 3000x3000)
//!     Source: photos/dusk.jpg
//!     dusk-edited.jpg: cached
//!     dusk-original.png: cached
//! ```
//!
//! ## Check
//!
//! ```text
//! Recipe
//!     Rotation: 90°
//!     Crop: 1:1, centered
//!     Tone: brightness 1.20, contrast 1.00, sharpness 1.00, saturation 1.00
//!     Vignette: 0.50
//!     Text: none
//!     Filter: Vintage Fade at 1.00
//!     Sky: none
//! Output
//!     JPEG quality: 90
//!     Channels: no
//!     False color: viridis
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::RecipeConfig;
use crate::imaging::colormap::{self, Family};
use crate::imaging::{AspectRatio, FilterKind, SkyKind};
use crate::process::{OutputStatus, ProcessEvent};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn format_dims((w, h): (u32, u32)) -> String {
    format!("{w}x{h}")
}

// ============================================================================
// edit
// ============================================================================

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted {
            input_count,
            output_dir,
        } => {
            let noun = if *input_count == 1 { "photo" } else { "photos" };
            vec![format!(
                "Editing {} {} \u{2192} {}",
                input_count,
                noun,
                output_dir.display()
            )]
        }
        ProcessEvent::ImageProcessed {
            index,
            source_path,
            source_dimensions,
            edited_dimensions,
            outputs,
        } => {
            let filename = Path::new(source_path)
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| source_path.clone());

            let mut lines = vec![
                format!(
                    "{} {} ({} \u{2192} {})",
                    format_index(*index),
                    filename,
                    format_dims(*source_dimensions),
                    format_dims(*edited_dimensions)
                ),
                format!("{}Source: {}", indent(1), source_path),
            ];
            for output in outputs {
                let status = match output.status {
                    OutputStatus::Cached => "cached",
                    OutputStatus::Copied => "copied",
                    OutputStatus::Written => "written",
                };
                lines.push(format!("{}{}: {}", indent(1), output.file, status));
            }
            lines
        }
    }
}

// ============================================================================
// check
// ============================================================================

fn format_crop(recipe: &RecipeConfig) -> String {
    let crop = &recipe.crop;
    let mut parts = vec![match crop.aspect {
        AspectRatio::Original => "original aspect".to_string(),
        ratio => ratio.to_string(),
    }];
    match (crop.offset_x, crop.offset_y) {
        (None, None) => parts.push("centered".to_string()),
        (x, y) => {
            let show = |o: Option<u32>| o.map_or("center".to_string(), |v| v.to_string());
            parts.push(format!("offset {}, {}", show(x), show(y)));
        }
    }
    if let Some([w, h]) = crop.canvas {
        parts.push(format!("canvas {w}x{h}"));
    }
    parts.join(", ")
}

fn format_blend(label: &str, is_none: bool, intensity: f32) -> String {
    if is_none {
        "none".to_string()
    } else {
        format!("{label} at {intensity:.2}")
    }
}

/// Summarize a resolved recipe, section by section.
pub fn format_recipe_summary(recipe: &RecipeConfig) -> Vec<String> {
    let tone = &recipe.tone;
    let text = match &recipe.text {
        Some(t) => format!(
            "\"{}\" in {} at {}pt, {}, offset ({:+}, {:+})",
            t.content, t.font, t.size, t.color, t.offset_x, t.offset_y
        ),
        None => "none".to_string(),
    };
    let vignette = if recipe.vignette.strength == 0.0 {
        "off".to_string()
    } else {
        format!("{:.2}", recipe.vignette.strength)
    };

    vec![
        "Recipe".to_string(),
        format!("{}Rotation: {}\u{b0}", indent(1), recipe.rotation.degrees()),
        format!("{}Crop: {}", indent(1), format_crop(recipe)),
        format!(
            "{}Tone: brightness {:.2}, contrast {:.2}, sharpness {:.2}, saturation {:.2}",
            indent(1),
            tone.brightness,
            tone.contrast,
            tone.sharpness,
            tone.saturation
        ),
        format!("{}Vignette: {}", indent(1), vignette),
        format!("{}Text: {}", indent(1), text),
        format!(
            "{}Filter: {}",
            indent(1),
            format_blend(
                recipe.filter.kind.label(),
                recipe.filter.kind == FilterKind::None,
                recipe.filter.intensity
            )
        ),
        format!(
            "{}Sky: {}",
            indent(1),
            format_blend(
                recipe.sky.kind.label(),
                recipe.sky.kind == SkyKind::None,
                recipe.sky.intensity
            )
        ),
        "Output".to_string(),
        format!("{}JPEG quality: {}", indent(1), recipe.output.jpeg_quality),
        format!(
            "{}Channels: {}",
            indent(1),
            if recipe.output.channels { "yes" } else { "no" }
        ),
        format!(
            "{}False color: {}",
            indent(1),
            recipe.output.colormap.as_deref().unwrap_or("none")
        ),
    ]
}

// ============================================================================
// palettes
// ============================================================================

const FAMILY_ORDER: [Family; 5] = [
    Family::Sequential,
    Family::Diverging,
    Family::Cyclical,
    Family::Qualitative,
    Family::Misc,
];

/// List every palette name, grouped by family.
pub fn format_palettes() -> Vec<String> {
    let mut lines = Vec::new();
    for family in FAMILY_ORDER {
        let members: Vec<_> = colormap::catalog()
            .iter()
            .filter(|p| p.family == family)
            .collect();
        if members.is_empty() {
            continue;
        }
        lines.push(format!("{} ({})", family, members.len()));
        for palette in members {
            lines.push(format!("{}{}", indent(1), palette.name));
        }
    }
    lines
}

pub fn print_recipe_summary(recipe: &RecipeConfig) {
    for line in format_recipe_summary(recipe) {
        println!("{}", line);
    }
}

pub fn print_palettes() {
    for line in format_palettes() {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{AspectCrop, Filter, SkyStyle, TextOverlay};
    use crate::process::OutputInfo;
    use std::path::PathBuf;

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    // =========================================================================
    // Process event formatting tests
    // =========================================================================

    #[test]
    fn format_batch_started() {
        let event = ProcessEvent::BatchStarted {
            input_count: 1,
            output_dir: PathBuf::from("edited"),
        };
        assert_eq!(
            format_process_event(&event),
            vec!["Editing 1 photo \u{2192} edited"]
        );
    }

    #[test]
    fn format_image_processed() {
        let event = ProcessEvent::ImageProcessed {
            index: 2,
            source_path: "photos/dawn.jpg".to_string(),
            source_dimensions: (400, 300),
            edited_dimensions: (300, 300),
            outputs: vec![
                OutputInfo {
                    file: "dawn-edited.jpg".to_string(),
                    status: OutputStatus::Written,
                },
                OutputInfo {
                    file: "dawn-original.png".to_string(),
                    status: OutputStatus::Copied,
                },
            ],
        };
        let lines = format_process_event(&event);
        assert_eq!(lines[0], "002 dawn.jpg (400x300 \u{2192} 300x300)");
        assert_eq!(lines[1], "    Source: photos/dawn.jpg");
        assert_eq!(lines[2], "    dawn-edited.jpg: written");
        assert_eq!(lines[3], "    dawn-original.png: copied");
    }

    // =========================================================================
    // Recipe summary tests
    // =========================================================================

    #[test]
    fn default_recipe_summary() {
        let lines = format_recipe_summary(&RecipeConfig::default());
        assert_eq!(lines[0], "Recipe");
        assert_eq!(lines[1], "    Rotation: 0\u{b0}");
        assert_eq!(lines[2], "    Crop: original aspect, centered");
        assert_eq!(lines[4], "    Vignette: off");
        assert_eq!(lines[5], "    Text: none");
        assert_eq!(lines[6], "    Filter: none");
        assert_eq!(lines[7], "    Sky: none");
        assert_eq!(lines[11], "    False color: none");
    }

    #[test]
    fn customized_recipe_summary() {
        let recipe = RecipeConfig {
            crop: AspectCrop {
                offset_x: Some(10),
                canvas: Some([640, 480]),
                ..AspectCrop::ratio(4, 3)
            },
            text: Some(TextOverlay {
                offset_y: -5,
                ..TextOverlay::default()
            }),
            filter: Filter::new(FilterKind::VintageFade, 0.5),
            sky: SkyStyle::new(SkyKind::NightSky, 1.0),
            ..RecipeConfig::default()
        };
        let lines = format_recipe_summary(&recipe);
        assert_eq!(lines[2], "    Crop: 4:3, offset 10, center, canvas 640x480");
        assert_eq!(
            lines[5],
            "    Text: \"Hello!\" in Arial at 50pt, #FF0000, offset (+0, -5)"
        );
        assert_eq!(lines[6], "    Filter: Vintage Fade at 0.50");
        assert_eq!(lines[7], "    Sky: Night Sky at 1.00");
    }

    // =========================================================================
    // Palette listing tests
    // =========================================================================

    #[test]
    fn palettes_grouped_by_family() {
        let lines = format_palettes();
        assert!(lines[0].starts_with("sequential ("));
        let headers = lines.iter().filter(|l| !l.starts_with("    ")).count();
        let names = lines.len() - headers;
        assert_eq!(names, colormap::catalog().len());
        assert!(lines.contains(&"    viridis".to_string()));
    }
}
