//! Scene persistence: the JSON scene file.
//!
//! FORMAT
//! ======
//! ```json
//! {
//!   "ownCS": { "min": {"x": -10.0, "y": -10.0}, "max": {"x": 10.0, "y": 10.0} },
//!   "points": [ { "pos": {"x": 1.23, "y": -4.56}, "set": "FIRST_SET" } ]
//! }
//! ```
//! Doubles are written in shortest round-trip form, so `load(save(s)) == s`
//! bit for bit. Unknown keys are ignored on load; missing keys, unknown set
//! tags, and degenerate viewports are rejected.
//!
//! ERROR HANDLING
//! ==============
//! Saving writes a sibling temp file and renames it over the target, so a
//! failed save never truncates an existing scene. Loading builds the whole
//! scene before returning it; callers swap it in only on success.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::camera::RealCs;
use crate::scene::{Point, PointSet, Scene};
use crate::vector::Vec2d;

/// Default scene file location, relative to the working directory.
pub const DEFAULT_SCENE_PATH: &str = "resources/conf.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed scene file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid scene file {}: {message}", .path.display())]
    Schema { path: PathBuf, message: String },
}

impl StoreError {
    /// Stable code for the error family: filesystem vs. document problems.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "E_IO",
            Self::Json { .. } | Self::Schema { .. } => "E_PARSE",
        }
    }
}

// =============================================================
// Wire schema
// =============================================================

#[derive(Debug, Serialize, Deserialize)]
struct SceneFile {
    #[serde(rename = "ownCS")]
    own_cs: CsFile,
    points: Vec<PointFile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CsFile {
    min: Vec2d,
    max: Vec2d,
}

#[derive(Debug, Serialize, Deserialize)]
struct PointFile {
    pos: Vec2d,
    set: PointSet,
}

impl From<&Scene> for SceneFile {
    fn from(scene: &Scene) -> Self {
        Self {
            own_cs: CsFile { min: scene.cs().min(), max: scene.cs().max() },
            points: scene
                .points()
                .iter()
                .map(|p| PointFile { pos: p.pos(), set: p.set() })
                .collect(),
        }
    }
}

impl SceneFile {
    fn into_scene(self) -> Result<Scene, String> {
        let cs = RealCs::new(self.own_cs.min, self.own_cs.max).map_err(|e| e.to_string())?;
        let mut points = Vec::with_capacity(self.points.len());
        for (i, p) in self.points.into_iter().enumerate() {
            if !p.pos.is_finite() {
                return Err(format!("point {i} has a non-finite position"));
            }
            points.push(Point::new(p.pos, p.set));
        }
        Ok(Scene::with_points(cs, points))
    }
}

// =============================================================
// Encode / decode
// =============================================================

/// Render a scene as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`StoreError::Json`] if serialization fails.
pub fn to_json(scene: &Scene, path: &Path) -> Result<String, StoreError> {
    serde_json::to_string_pretty(&SceneFile::from(scene))
        .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })
}

/// Parse a scene from JSON text. `path` only labels errors.
///
/// # Errors
///
/// Returns [`StoreError::Json`] for syntax errors, missing keys, or unknown
/// set tags, and [`StoreError::Schema`] for invalid viewports or positions.
pub fn from_json(text: &str, path: &Path) -> Result<Scene, StoreError> {
    let file: SceneFile =
        serde_json::from_str(text).map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;
    file.into_scene()
        .map_err(|message| StoreError::Schema { path: path.to_path_buf(), message })
}

// =============================================================
// Filesystem
// =============================================================

/// Write `scene` to `path` atomically (temp file + rename).
///
/// # Errors
///
/// Returns [`StoreError::Io`] on any filesystem failure.
pub fn save(scene: &Scene, path: &Path) -> Result<(), StoreError> {
    let text = to_json(scene, path)?;
    let io_err = |op: &'static str| move |source: std::io::Error| StoreError::Io { op, path: path.to_path_buf(), source };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err("create directory for"))?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write_synced(&tmp, text.as_bytes()) {
        discard_temp(&tmp);
        return Err(io_err("write")(e));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        discard_temp(&tmp);
        return Err(io_err("replace")(e));
    }

    info!(path = %path.display(), points = scene.len(), "scene saved");
    Ok(())
}

/// Read and validate a scene from `path`.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be read, otherwise the
/// parse errors of [`from_json`].
pub fn load(path: &Path) -> Result<Scene, StoreError> {
    let text =
        fs::read_to_string(path).map_err(|source| StoreError::Io { op: "read", path: path.to_path_buf(), source })?;
    let scene = from_json(&text, path)?;
    info!(path = %path.display(), points = scene.len(), "scene loaded");
    Ok(scene)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn discard_temp(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp) {
        debug!(path = %tmp.display(), error = %e, "temp scene file not removed");
    }
}

/// Scene file bound to one path, used by the save/load shortcuts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneStore {
    path: PathBuf,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new(DEFAULT_SCENE_PATH)
    }
}

impl SceneStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// # Errors
    ///
    /// See [`save`].
    pub fn save(&self, scene: &Scene) -> Result<(), StoreError> {
        save(scene, &self.path)
    }

    /// # Errors
    ///
    /// See [`load`].
    pub fn load(&self) -> Result<Scene, StoreError> {
        load(&self.path)
    }
}
