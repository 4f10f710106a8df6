//! Configuration types deserialized from `gatesim.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default bound on fixed-point passes per `evaluate` call.
pub const DEFAULT_MAX_PASSES: u32 = 1024;

/// Default bound on the total input bits a truth table may enumerate.
pub const DEFAULT_MAX_TABLE_INPUTS: u32 = 16;

/// The top-level project configuration.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata and chip library location.
    pub project: ProjectMeta,
    /// Simulation limits.
    #[serde(default)]
    pub sim: SimSettings,
}

/// The `[project]` table.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// Name of the chip simulated by default.
    pub top: String,
    /// Folder holding `<Chip>.hdl` files, relative to the project directory.
    #[serde(default = "default_library")]
    pub library: String,
}

/// The `[sim]` table.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SimSettings {
    /// Maximum fixed-point passes before evaluation reports non-convergence.
    #[serde(default = "default_max_passes")]
    pub max_passes: u32,
    /// Maximum total input bits enumerated by a truth table.
    #[serde(default = "default_max_table_inputs")]
    pub max_table_inputs: u32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            max_table_inputs: DEFAULT_MAX_TABLE_INPUTS,
        }
    }
}

impl ProjectConfig {
    /// Returns the absolute chip library folder for a project rooted at `project_dir`.
    pub fn library_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.project.library)
    }
}

fn default_library() -> String {
    ".".to_string()
}

fn default_max_passes() -> u32 {
    DEFAULT_MAX_PASSES
}

fn default_max_table_inputs() -> u32 {
    DEFAULT_MAX_TABLE_INPUTS
}
