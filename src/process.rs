//! Batch driver: decode, edit and export a set of photos with one recipe.
//!
//! ## Inputs
//!
//! [`collect_inputs`] expands directories (recursively, via `walkdir`) to the
//! supported files they contain, sorted by path. Files named explicitly are
//! passed through as given.
//!
//! ## Output Structure
//!
//! For each input with stem `{stem}`:
//!
//! ```text
//! edited/
//! ├── report.json                # Per-input dimensions and outputs
//! ├── .retouch-cache.json        # Cache manifest (see crate::cache)
//! ├── dawn-edited.jpg            # Final buffer, JPEG at the recipe quality
//! ├── dawn-original.png          # Retained original, for side-by-side review
//! ├── dawn-red.png               # Channel splits (output.channels = true)
//! ├── dawn-green.png
//! ├── dawn-blue.png
//! └── dawn-viridis.png           # False color (output.colormap = "viridis")
//! ```
//!
//! ## Parallel Processing
//!
//! Inputs are processed in parallel using [rayon](https://docs.rs/rayon); each
//! pipeline run is single-threaded. The first failing input aborts the batch.
//! Progress is reported as [`ProcessEvent`]s over an optional channel so the
//! caller decides how to display it.

use crate::cache::{self, CacheEntry, CacheManifest, CacheStats};
use crate::config::{ConfigError, RecipeConfig};
use crate::imaging::{
    ColormapRenderer, EditParams, FontCatalog, ImagingError, Quality, Raster,
};
use crate::pipeline::Edit;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// File extensions accepted when expanding directories (case-insensitive).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Name of the batch report within the output directory.
pub const REPORT_FILENAME: &str = "report.json";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Recipe error: {0}")]
    Recipe(#[from] ConfigError),
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Edit failed: {0}")]
    Imaging(#[from] ImagingError),
    #[error("No supported images found in the given inputs")]
    NoInputs,
    #[error(
        "{} and {} would write the same outputs (stem {stem:?})",
        first.display(),
        second.display()
    )]
    DuplicateStem {
        stem: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// How an output file came to exist in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    /// Already on disk from an earlier run with the same source and recipe.
    Cached,
    /// Copied from a cached output recorded under another stem.
    Copied,
    /// Produced by running the pipeline.
    Written,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    pub file: String,
    pub status: OutputStatus,
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    BatchStarted {
        input_count: usize,
        output_dir: PathBuf,
    },
    /// One input finished. `index` is 1-based in input order; events may
    /// arrive out of order.
    ImageProcessed {
        index: usize,
        source_path: String,
        source_dimensions: (u32, u32),
        edited_dimensions: (u32, u32),
        outputs: Vec<OutputInfo>,
    },
}

/// `report.json`: what the batch produced, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub recipe_hash: String,
    pub images: Vec<ReportImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportImage {
    pub source_path: String,
    /// Original dimensions (width, height)
    pub source_dimensions: (u32, u32),
    /// Edited dimensions (width, height)
    pub edited_dimensions: (u32, u32),
    /// Output files, relative to the output directory.
    pub outputs: Vec<String>,
}

#[derive(Debug)]
pub struct ProcessResult {
    pub report: Report,
    pub cache_stats: CacheStats,
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| e.eq_ignore_ascii_case(s))
        })
}

/// Expand command-line inputs into the list of files to process.
///
/// Directories contribute their supported files (recursively, sorted);
/// files are kept in argument order. A missing path is an IO error.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ProcessError> {
    let mut inputs = Vec::new();
    for path in paths {
        if !std::fs::metadata(path)?.is_dir() {
            inputs.push(path.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() && has_supported_extension(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        inputs.extend(found);
    }
    if inputs.is_empty() {
        return Err(ProcessError::NoInputs);
    }
    Ok(inputs)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// Output file names for one input, in write order.
pub fn output_names(stem: &str, recipe: &RecipeConfig) -> Vec<String> {
    let mut names = vec![format!("{stem}-edited.jpg"), format!("{stem}-original.png")];
    if recipe.output.channels {
        for channel in ["red", "green", "blue"] {
            names.push(format!("{stem}-{channel}.png"));
        }
    }
    if let Some(palette) = &recipe.output.colormap {
        names.push(format!("{stem}-{palette}.png"));
    }
    names
}

/// Shared, read-only state for every input of a batch.
struct Batch<'a> {
    recipe: &'a RecipeConfig,
    params: EditParams,
    quality: Quality,
    recipe_hash: String,
    output_dir: &'a Path,
    fonts: &'a dyn FontCatalog,
    renderer: &'a dyn ColormapRenderer,
    manifest: Mutex<CacheManifest>,
    stats: Mutex<CacheStats>,
    events: Option<Sender<ProcessEvent>>,
}

/// Run every input through the edit pipeline and export the results.
///
/// With `use_cache`, inputs whose source bytes and recipe are unchanged
/// since the last run into `output_dir` are skipped.
pub fn process(
    inputs: &[PathBuf],
    recipe: &RecipeConfig,
    output_dir: &Path,
    use_cache: bool,
    fonts: &dyn FontCatalog,
    renderer: &dyn ColormapRenderer,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    if inputs.is_empty() {
        return Err(ProcessError::NoInputs);
    }
    recipe.validate()?;

    let mut stems: HashMap<String, &PathBuf> = HashMap::new();
    for input in inputs {
        let stem = file_stem(input);
        if let Some(first) = stems.insert(stem.clone(), input) {
            return Err(ProcessError::DuplicateStem {
                stem,
                first: first.clone(),
                second: input.clone(),
            });
        }
    }

    std::fs::create_dir_all(output_dir)?;

    let manifest = if use_cache {
        CacheManifest::load(output_dir)
    } else {
        CacheManifest::empty()
    };

    let batch = Batch {
        recipe,
        params: recipe.edit_params(),
        quality: recipe.quality(),
        recipe_hash: cache::hash_recipe(recipe)?,
        output_dir,
        fonts,
        renderer,
        manifest: Mutex::new(manifest),
        stats: Mutex::new(CacheStats::default()),
        events,
    };

    if let Some(tx) = &batch.events {
        tx.send(ProcessEvent::BatchStarted {
            input_count: inputs.len(),
            output_dir: output_dir.to_path_buf(),
        })
        .ok();
    }

    let images = inputs
        .par_iter()
        .enumerate()
        .map(|(i, input)| process_one(&batch, i + 1, input))
        .collect::<Result<Vec<_>, _>>()?;

    let mut manifest = batch
        .manifest
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    manifest.retain_stems(|stem| stems.contains_key(stem));
    manifest.save(output_dir)?;

    let report = Report {
        recipe_hash: batch.recipe_hash,
        images,
    };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(output_dir.join(REPORT_FILENAME), json)?;

    let cache_stats = batch
        .stats
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    Ok(ProcessResult {
        report,
        cache_stats,
    })
}

fn process_one(batch: &Batch, index: usize, source: &Path) -> Result<ReportImage, ProcessError> {
    let stem = file_stem(source);
    let names = output_names(&stem, batch.recipe);
    let source_hash = cache::hash_file(source)?;

    let cached = batch
        .manifest
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .find_cached(&stem, &source_hash, &batch.recipe_hash, batch.output_dir)
        .map(|(cached_stem, entry)| (cached_stem.to_string(), entry.clone()));

    let (entry, status) = match cached {
        Some((cached_stem, entry)) if cached_stem == stem => {
            debug!(source = %source.display(), "cache hit");
            batch.stats.lock().unwrap_or_else(PoisonError::into_inner).hit();
            (entry, OutputStatus::Cached)
        }
        Some((cached_stem, entry)) => {
            debug!(source = %source.display(), from = %cached_stem, "cache copy");
            for (from, to) in entry.outputs.iter().zip(&names) {
                std::fs::copy(batch.output_dir.join(from), batch.output_dir.join(to))?;
            }
            batch.stats.lock().unwrap_or_else(PoisonError::into_inner).copy();
            let entry = CacheEntry {
                outputs: names.clone(),
                ..entry
            };
            (entry, OutputStatus::Copied)
        }
        None => {
            let entry = edit_and_export(batch, source, source_hash, &stem, &names)?;
            batch.stats.lock().unwrap_or_else(PoisonError::into_inner).miss();
            (entry, OutputStatus::Written)
        }
    };

    batch
        .manifest
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(stem, entry.clone());

    let source_path = source.display().to_string();
    info!(
        source = %source_path,
        width = entry.edited_dimensions.0,
        height = entry.edited_dimensions.1,
        "processed"
    );

    if let Some(tx) = &batch.events {
        tx.send(ProcessEvent::ImageProcessed {
            index,
            source_path: source_path.clone(),
            source_dimensions: entry.source_dimensions,
            edited_dimensions: entry.edited_dimensions,
            outputs: entry
                .outputs
                .iter()
                .map(|file| OutputInfo {
                    file: file.clone(),
                    status,
                })
                .collect(),
        })
        .ok();
    }

    Ok(ReportImage {
        source_path,
        source_dimensions: entry.source_dimensions,
        edited_dimensions: entry.edited_dimensions,
        outputs: entry.outputs,
    })
}

/// Decode, run the pipeline, and write every output named in `names`.
fn edit_and_export(
    batch: &Batch,
    source: &Path,
    source_hash: String,
    stem: &str,
    names: &[String],
) -> Result<CacheEntry, ProcessError> {
    let decoded = image::open(source).map_err(|e| ProcessError::Decode {
        path: source.to_path_buf(),
        source: e,
    })?;
    let original = Raster::from_dynamic(&decoded)?;
    let edit = Edit::apply(original, &batch.params, batch.fonts)?;

    let path_for = |name: &str| batch.output_dir.join(name);

    write_jpeg(
        &edit.edited.to_rgb_image(),
        &path_for(&format!("{stem}-edited.jpg")),
        batch.quality,
    )?;
    write_png(
        &edit.original.to_rgb_image(),
        &path_for(&format!("{stem}-original.png")),
    )?;
    if batch.recipe.output.channels {
        for (channel, raster) in edit.channels().named() {
            write_png(
                &raster.to_rgb_image(),
                &path_for(&format!("{stem}-{channel}.png")),
            )?;
        }
    }
    if let Some(palette) = &batch.recipe.output.colormap {
        let rendered = edit.false_color(batch.renderer, palette)?;
        write_png(&rendered, &path_for(&format!("{stem}-{palette}.png")))?;
    }

    Ok(CacheEntry {
        source_hash,
        recipe_hash: batch.recipe_hash.clone(),
        source_dimensions: edit.original.dimensions(),
        edited_dimensions: edit.edited.dimensions(),
        outputs: names.to_vec(),
    })
}

fn write_jpeg(img: &RgbImage, path: &Path, quality: Quality) -> Result<(), ProcessError> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(writer, quality.value())
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| ProcessError::Encode {
            path: path.to_path_buf(),
            source: e,
        })
}

fn write_png(img: &RgbImage, path: &Path) -> Result<(), ProcessError> {
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|e| ProcessError::Encode {
            path: path.to_path_buf(),
            source: e,
        })
}
