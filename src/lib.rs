#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod track;

use std::fmt;

use geom::{MaterialGroup, Mesh, RailCurve};
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

pub use track::{
    ConfigError, GeometryError, PathError, TextureTiling, TrackConfig, TrackDiagnostics,
    TrackError, TrackErrorKind, TrackGeometry, TrackPath, TrackResult, generate, generate_batch,
};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // A second `initialize` keeps the logger that is already installed.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not start rayon thread pool: {err}")))
}

/// GPU-ready buffers of one mesh.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct MeshExport {
    positions: Vec<f32>,
    indices: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uvs: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    normals: Option<Vec<f32>>,
    groups: Vec<MaterialGroup>,
}

#[allow(clippy::cast_possible_truncation)]
fn to_f32(values: &[f64]) -> Vec<f32> {
    values.iter().map(|v| *v as f32).collect()
}

impl From<&Mesh> for MeshExport {
    fn from(mesh: &Mesh) -> Self {
        Self {
            positions: to_f32(mesh.positions_flat()),
            indices: mesh.indices.clone(),
            uvs: mesh.uvs_flat().map(to_f32),
            normals: mesh.normals_flat().map(to_f32),
            groups: mesh.groups.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RailCurvesExport<'a> {
    left: &'a RailCurve,
    right: &'a RailCurve,
}

#[derive(Debug, Serialize)]
struct TrackSummary<'a> {
    steps: usize,
    total_length: f64,
    tiling: TextureTiling,
    diagnostics: &'a TrackDiagnostics,
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct TrackEngine {
    config: TrackConfig,
    last_geometry: Option<TrackGeometry>,
}

impl Default for TrackEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl TrackEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> TrackEngine {
        TrackEngine {
            config: TrackConfig::default(),
            last_geometry: None,
        }
    }

    /// Replaces the configuration with a (partial) JS object; missing fields
    /// take their defaults. The previous result is discarded.
    #[wasm_bindgen]
    pub fn set_config(&mut self, value: JsValue) -> Result<(), JsValue> {
        let config: TrackConfig = serde_wasm_bindgen::from_value(value).map_err(|err| {
            to_js_error(TrackError::from(ConfigError::Deserialize(err.to_string())))
        })?;
        config
            .validate()
            .map_err(|err| to_js_error(TrackError::from(err)))?;
        self.config = config;
        self.last_geometry = None;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn get_config(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.config).map_err(to_js_error)
    }

    /// Generates a track from `[x0, y0, z0, x1, y1, z1, ...]`.
    #[wasm_bindgen]
    pub fn generate(&mut self, coords: &[f64]) -> Result<(), JsValue> {
        self.last_geometry = None;
        let geometry = self.generate_native(coords).map_err(to_js_error)?;
        self.last_geometry = Some(geometry);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn get_ribbon(&self) -> Result<JsValue, JsValue> {
        let geometry = self.geometry()?;
        export(&MeshExport::from(&geometry.ribbon))
    }

    #[wasm_bindgen]
    pub fn get_left_rail(&self) -> Result<JsValue, JsValue> {
        let geometry = self.geometry()?;
        export(&MeshExport::from(&geometry.left_rail))
    }

    #[wasm_bindgen]
    pub fn get_right_rail(&self) -> Result<JsValue, JsValue> {
        let geometry = self.geometry()?;
        export(&MeshExport::from(&geometry.right_rail))
    }

    #[wasm_bindgen]
    pub fn get_rail_curves(&self) -> Result<JsValue, JsValue> {
        let geometry = self.geometry()?;
        export(&RailCurvesExport {
            left: &geometry.left_rail_curve,
            right: &geometry.right_rail_curve,
        })
    }

    /// Step count, length, tiling and per-mesh diagnostics of the last track.
    #[wasm_bindgen]
    pub fn get_summary(&self) -> Result<JsValue, JsValue> {
        let geometry = self.geometry()?;
        export(&summarize(geometry))
    }
}

impl TrackEngine {
    #[must_use]
    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    pub fn set_config_native(&mut self, config: TrackConfig) -> Result<(), TrackError> {
        config.validate()?;
        self.config = config;
        self.last_geometry = None;
        Ok(())
    }

    /// Same as [`TrackEngine::generate`] without the JS error conversion.
    pub fn generate_native(&self, coords: &[f64]) -> Result<TrackGeometry, TrackError> {
        let path = TrackPath::from_flat(coords)?;
        generate(&path, &self.config)
    }

    #[must_use]
    pub fn last_geometry(&self) -> Option<&TrackGeometry> {
        self.last_geometry.as_ref()
    }

    fn geometry(&self) -> Result<&TrackGeometry, JsValue> {
        self.last_geometry
            .as_ref()
            .ok_or_else(|| js_error("no track has been generated"))
    }
}

fn summarize(geometry: &TrackGeometry) -> TrackSummary<'_> {
    TrackSummary {
        steps: geometry.steps,
        total_length: geometry.total_length,
        tiling: geometry.tiling,
        diagnostics: &geometry.diagnostics,
    }
}

fn export<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
