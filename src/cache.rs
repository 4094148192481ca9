//! Edit cache for repeated batch runs.
//!
//! Running a recipe over a folder of photos re-decodes, re-edits and
//! re-encodes every image. This module lets the batch skip an input when
//! neither the source bytes nor the recipe changed since the last run.
//!
//! # Design
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: lookups are by the combination of
//! `source_hash` and `recipe_hash`, not by file name. Renaming an input does
//! not invalidate its cached outputs; they are copied under the new name.
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout`.
//!
//! - **`recipe_hash`**: SHA-256 of everything in the recipe that affects the
//!   written files: the edit parameters and the output section. Processing
//!   settings (worker count) are left out.
//!
//! A cache hit requires:
//! 1. An entry with matching `source_hash` and `recipe_hash` exists
//! 2. Every output recorded for that entry still exists on disk
//!
//! The input's own stem is checked first, so byte-identical inputs under
//! different names each keep their own entry. Entries for stems that are not
//! part of the current batch are pruned before the manifest is saved.
//!
//! ## Storage
//!
//! The cache manifest is a JSON file at `<output_dir>/.retouch-cache.json`.
//! A missing, corrupt or wrong-version manifest loads as empty.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `edit` to force every input through the pipeline.

use crate::config::RecipeConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the output directory.
const MANIFEST_FILENAME: &str = ".retouch-cache.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// Everything written for one input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub recipe_hash: String,
    /// Source dimensions (width, height)
    pub source_dimensions: (u32, u32),
    /// Edited dimensions (width, height)
    pub edited_dimensions: (u32, u32),
    /// Output file names, relative to the output directory.
    pub outputs: Vec<String>,
}

/// On-disk cache manifest mapping output stems to their cache entries.
///
/// Lookups go through a runtime `content_index` that maps
/// `"{source_hash}:{recipe_hash}"` to the stem that owns the outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    /// Runtime reverse index: `"{source_hash}:{recipe_hash}"` → stem.
    /// Built at load time, maintained on insert. Never serialized.
    #[serde(skip)]
    content_index: HashMap<String, String>,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or a first run).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            content_index: HashMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let path = manifest_path(output_dir);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::empty();
        };
        let mut manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest.content_index = build_content_index(&manifest.entries);
        manifest
    }

    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(output_dir), json)
    }

    /// Look up cached outputs for the input named `stem`.
    ///
    /// Returns the owning stem and its entry if every recorded output is
    /// still on disk. An entry under `stem` itself wins; otherwise any stem
    /// holding the same content is used and the caller copies its files
    /// (the input was renamed, or duplicates another input).
    pub fn find_cached(
        &self,
        stem: &str,
        source_hash: &str,
        recipe_hash: &str,
        output_dir: &Path,
    ) -> Option<(&str, &CacheEntry)> {
        let usable = |entry: &CacheEntry| {
            entry.source_hash == source_hash
                && entry.recipe_hash == recipe_hash
                && entry.outputs.iter().all(|o| output_dir.join(o).exists())
        };
        if let Some((own, entry)) = self.entries.get_key_value(stem)
            && usable(entry)
        {
            return Some((own.as_str(), entry));
        }
        let owner = self.content_index.get(&content_key(source_hash, recipe_hash))?;
        let entry = self.entries.get(owner)?;
        usable(entry).then_some((owner.as_str(), entry))
    }

    /// Record the outputs written for `stem`. Other stems holding the same
    /// content keep their entries.
    pub fn insert(&mut self, stem: String, entry: CacheEntry) {
        let key = content_key(&entry.source_hash, &entry.recipe_hash);
        self.content_index.insert(key, stem.clone());
        self.entries.insert(stem, entry);
    }

    /// Drop every entry whose stem fails `keep`.
    pub fn retain_stems(&mut self, keep: impl Fn(&str) -> bool) {
        self.entries.retain(|stem, _| keep(stem));
        self.content_index = build_content_index(&self.entries);
    }
}

fn content_key(source_hash: &str, recipe_hash: &str) -> String {
    format!("{source_hash}:{recipe_hash}")
}

fn build_content_index(entries: &HashMap<String, CacheEntry>) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(stem, entry)| {
            (
                content_key(&entry.source_hash, &entry.recipe_hash),
                stem.clone(),
            )
        })
        .collect()
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// SHA-256 hash of the output-affecting part of a recipe.
pub fn hash_recipe(recipe: &RecipeConfig) -> serde_json::Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(b"recipe\0");
    hasher.update(serde_json::to_vec(&recipe.edit_params())?);
    hasher.update(b"\0");
    hasher.update(serde_json::to_vec(&recipe.output)?);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Summary of cache performance for a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits == 0 && self.copies == 0 {
            return write!(f, "{} edited", self.misses);
        }
        if self.copies > 0 {
            write!(
                f,
                "{} cached, {} copied, {} edited ({} total)",
                self.hits,
                self.copies,
                self.misses,
                self.total()
            )
        } else {
            write!(
                f,
                "{} cached, {} edited ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        }
    }
}

/// Resolve the cache manifest path for an output directory.
pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILENAME)
}
