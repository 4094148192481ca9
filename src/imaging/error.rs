//! Error taxonomy shared by every pipeline stage.
//!
//! Each variant carries the [`Stage`] that raised it so a failed run can be
//! reproduced from the message alone.

use std::fmt;
use thiserror::Error;

/// Pipeline stage names, used to attribute errors and log spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Geometry,
    Tone,
    Overlay,
    Filter,
    SkyStyle,
    Channels,
    FalseColor,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Geometry => "geometry",
            Stage::Tone => "tone",
            Stage::Overlay => "overlay",
            Stage::Filter => "filter",
            Stage::SkyStyle => "sky-style",
            Stage::Channels => "channels",
            Stage::FalseColor => "false-color",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImagingError {
    #[error("{stage}: parameter `{param}` = {value} is out of range (expected {expected})")]
    InvalidParameter {
        stage: Stage,
        param: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{stage}: {reason}")]
    GeometryInfeasible { stage: Stage, reason: String },
    #[error("false-color: unknown colormap `{0}`")]
    UnknownColormap(String),
    #[error("image has zero area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("{stage}: buffer size mismatch ({expected:?} vs {actual:?})")]
    SizeMismatch {
        stage: Stage,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

impl ImagingError {
    pub(crate) fn invalid(
        stage: Stage,
        param: &'static str,
        value: impl fmt::Display,
        expected: &'static str,
    ) -> Self {
        ImagingError::InvalidParameter {
            stage,
            param,
            value: value.to_string(),
            expected,
        }
    }
}
