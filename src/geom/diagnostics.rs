//! Mesh diagnostics for generated track geometry.
//!
//! Diagnostics are collected when a mesh is finalized and describe its topology
//! and any corrections applied:
//!
//! - Validating mesh quality (watertight rails, manifold ribbon)
//! - Debugging generation issues (degenerate triangles, open edges)
//! - Tracking corrections (outward orientation flips)
//!
//! # Example
//!
//! ```ignore
//! use track_engine::{TrackConfig, TrackPath, generate};
//!
//! let geometry = generate(&path, &TrackConfig::default())?;
//!
//! if geometry.diagnostics.left_rail.is_valid_solid() {
//!     println!("rail is closed with {} triangles", geometry.diagnostics.left_rail.triangle_count);
//! }
//! ```

use std::fmt;

use serde::Serialize;

/// Topology and quality information for one mesh.
///
/// # Topology Metrics
///
/// - `open_edge_count`: Edges with only one adjacent triangle (the ribbon's
///   border is expected to be open, rails are expected to be closed)
/// - `non_manifold_edge_count`: Edges with more than two adjacent triangles
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MeshDiagnostics {
    /// Total number of vertices in the final mesh.
    pub vertex_count: usize,

    /// Total number of triangles in the final mesh.
    pub triangle_count: usize,

    /// Number of zero-area triangles. They are kept so triangle counts and
    /// material groups stay stable.
    pub degenerate_triangle_count: usize,

    /// Number of open (boundary) edges in the mesh.
    pub open_edge_count: usize,

    /// Number of non-manifold edges in the mesh.
    pub non_manifold_edge_count: usize,

    /// Whether every triangle was flipped to make a closed mesh face outward.
    pub orientation_flipped: bool,

    /// Human-readable warnings about mesh issues and corrections.
    pub warnings: Vec<String>,
}

impl MeshDiagnostics {
    /// Returns `true` if the mesh is watertight (no open edges).
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
    }

    /// Returns `true` if the mesh is manifold (no non-manifold edges).
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Returns `true` if the mesh is both watertight and manifold.
    #[must_use]
    pub fn is_valid_solid(&self) -> bool {
        self.is_watertight() && self.is_manifold()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Returns a short summary string suitable for logging.
    ///
    /// Format: `"V:{vertices} T:{triangles} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} T:{}", self.vertex_count, self.triangle_count)];

        if self.degenerate_triangle_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_triangle_count));
        }
        if self.open_edge_count > 0 {
            parts.push(format!("open:{}", self.open_edge_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }
        if self.orientation_flipped {
            parts.push("flipped".to_string());
        }

        parts.join(" ")
    }
}

impl fmt::Display for MeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;

        if self.degenerate_triangle_count > 0 {
            writeln!(f, "  Degenerate triangles: {}", self.degenerate_triangle_count)?;
        }
        if self.orientation_flipped {
            writeln!(f, "  Orientation: flipped outward")?;
        }

        if self.open_edge_count > 0 || self.non_manifold_edge_count > 0 {
            writeln!(f, "  Topology:")?;
            if self.open_edge_count > 0 {
                writeln!(f, "    - Open edges: {}", self.open_edge_count)?;
            }
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    - Non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        let status = if self.is_valid_solid() {
            "CLOSED"
        } else if self.is_manifold() {
            "OPEN SURFACE"
        } else {
            "ISSUES DETECTED"
        };
        writeln!(f, "  Status: {status}")?;

        Ok(())
    }
}
