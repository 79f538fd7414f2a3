//! Closed-track generation on top of the [`crate::geom`] kernel.
//!
//! [`generate`] turns a [`TrackPath`] and a [`TrackConfig`] into a
//! [`TrackGeometry`]: a lane ribbon with one material group per lane and two
//! extruded rails. The call is pure; any validation or geometry failure aborts
//! it with a [`TrackError`] and no partial output.

pub mod config;
pub mod error;
pub mod generate;
pub mod path;

pub use config::{TextureTiling, TrackConfig};
pub use error::{ConfigError, GeometryError, PathError, TrackError, TrackErrorKind, TrackResult};
pub use generate::{
    TrackDiagnostics, TrackGeometry, generate, generate_batch, generate_with_tolerance,
};
pub use path::TrackPath;
