//! Geometry kernel for track generation: curve sampling, frames, ribbon and rail
//! meshes.

mod core;
mod curve;
mod diagnostics;
mod extrusion;
mod frame;
mod mesh;
mod rail;
mod ribbon;

pub use core::{Point3, Tolerance, Vec3};
pub use curve::{
    ARC_LENGTH_DIVISIONS, CatmullRom3, Curve3, CurveError, CurveSampler, ResolutionPolicy,
    SampledCurve,
};
pub use diagnostics::MeshDiagnostics;
pub use extrusion::{
    ExtrusionCaps, ExtrusionError, ProfileError, RailExtrusion, RailExtrusionOptions, RailProfile,
    extrude_rail, extrude_rail_with_tolerance,
};
pub use frame::{
    Frame, FrameError, SEED_BINORMAL, horizontal_frame_step, horizontal_frames,
    parallel_transport_frames,
};
pub use mesh::{MaterialGroup, Mesh, MeshError};
pub use rail::{RailCurve, RailExtractor, RailSide, extract_column};
pub use ribbon::{
    DEFAULT_LANE_OFFSETS, DEFAULT_LEFT_RAIL_COLUMN, DEFAULT_RIGHT_RAIL_COLUMN, LaneLayout,
    LayoutError, Ribbon, RibbonError, build_ribbon, ribbon_row,
};

#[cfg(test)]
mod tests;
