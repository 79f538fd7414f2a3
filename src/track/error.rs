//! Error types for track generation.
//!
//! Every component reports its own `thiserror` enum; [`TrackError`] groups them
//! into the three categories callers act on.

use thiserror::Error;

use crate::geom::{
    CurveError, ExtrusionError, FrameError, LayoutError, ProfileError, RailSide, RibbonError,
};

pub type TrackResult<T> = Result<T, TrackError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackErrorKind {
    InvalidPath,
    DegenerateGeometry,
    Configuration,
}

impl TrackErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPath => "invalid_path",
            Self::DegenerateGeometry => "degenerate_geometry",
            Self::Configuration => "configuration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("invalid track path: {0}")]
    InvalidPath(#[from] PathError),
    #[error("degenerate track geometry: {0}")]
    DegenerateGeometry(#[from] GeometryError),
    #[error("invalid track configuration: {0}")]
    Configuration(#[from] ConfigError),
}

impl TrackError {
    #[must_use]
    pub fn kind(&self) -> TrackErrorKind {
        match self {
            Self::InvalidPath(_) => TrackErrorKind::InvalidPath,
            Self::DegenerateGeometry(_) => TrackErrorKind::DegenerateGeometry,
            Self::Configuration(_) => TrackErrorKind::Configuration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("a closed track needs at least 3 points, got {count}")]
    TooFewPoints { count: usize },
    #[error("point {index} has non-finite coordinates")]
    NonFinitePoint { index: usize },
    #[error("flat coordinate buffer length {len} is not a multiple of 3")]
    RaggedCoordinates { len: usize },
    #[error(transparent)]
    Curve(#[from] CurveError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("centerline length {length} yields no samples")]
    TooShort { length: f64 },
    #[error("{steps} steps across {columns} columns exceed the 32-bit vertex index range")]
    TooManyVertices { steps: usize, columns: usize },
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Ribbon(#[from] RibbonError),
    #[error("{} extrusion failed: {source}", .side.name())]
    Rail {
        side: RailSide,
        #[source]
        source: ExtrusionError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("track width must be finite and > 0, got {0}")]
    InvalidTrackWidth(f64),
    #[error("tile repeat scale must be finite and > 0, got {0}")]
    InvalidTileRepeatScale(f64),
    #[error("tile repeat v must be finite and > 0, got {0}")]
    InvalidTileRepeatV(f64),
    #[error("samples per unit must be finite and > 0, got {0}")]
    InvalidDensity(f64),
    #[error(transparent)]
    Lanes(#[from] LayoutError),
    #[error(transparent)]
    RailProfile(#[from] ProfileError),
    #[error("could not read track configuration: {0}")]
    Deserialize(String),
}
