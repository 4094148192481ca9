//! # Retouch
//!
//! A deterministic photo-edit pipeline. One recipe describes an edit; every
//! photo runs through the same fixed chain of stages and comes out the same way
//! every time.
//!
//! # Architecture: One Linear Pipeline
//!
//! ```text
//! original ─▶ Geometry ─▶ Tone ─▶ Overlay ─▶ Filter ─▶ Sky style ─▶ edited
//!                                                                     │
//!                                            channels / false color ◀─┘
//! ```
//!
//! Each stage is a function from an owned floating-point buffer to the next.
//! Values stay in `f32` between stages and are quantized to 8 bits only at
//! export, so intermediate overshoot (a high-contrast filter blended past 1.0,
//! say) never wraps around.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The stages and their building blocks: raster, parameters, colormaps, fonts |
//! | [`pipeline`] | Runs the stages in order over a copy of the original |
//! | [`config`] | Layered `recipe.toml` loading, merging and validation |
//! | [`process`] | Batch driver: collect inputs, edit in parallel, export, write the report |
//! | [`cache`] | Content-addressed skip of inputs whose source and recipe are unchanged |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Recipes Over Flags
//!
//! Every edit parameter lives in a TOML recipe rather than on the command line.
//! A recipe can be checked into a repository next to the photos, diffed, and
//! re-applied later with identical results. Stock defaults are the identity
//! edit; a recipe only names what it changes.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding use the `image` crate; text is rasterized
//! with `ab_glyph` from fonts found through `fontdb`. There are no system
//! dependencies beyond the fonts already installed. When a named font cannot be
//! found, a built-in bitmap face is used so a caption is never silently
//! dropped.
//!
//! ## Single-Threaded Stages, Parallel Batches
//!
//! A single pipeline run is sequential and allocation-light. Throughput comes
//! from running many photos at once on the `rayon` pool, sized by
//! `[processing] max_processes`.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod process;
