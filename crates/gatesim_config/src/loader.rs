//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the project file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "gatesim.toml";

/// Upper bound for `sim.max_table_inputs`; a table has `2^n` rows.
const MAX_TABLE_INPUTS_LIMIT: u32 = 24;

/// Loads and validates `<project_dir>/gatesim.toml`.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.top.is_empty() {
        return Err(ConfigError::MissingField("project.top".to_string()));
    }
    if config.sim.max_passes == 0 {
        return Err(ConfigError::ValidationError(
            "sim.max_passes must be at least 1".to_string(),
        ));
    }
    if config.sim.max_table_inputs == 0 || config.sim.max_table_inputs > MAX_TABLE_INPUTS_LIMIT {
        return Err(ConfigError::ValidationError(format!(
            "sim.max_table_inputs must be between 1 and {MAX_TABLE_INPUTS_LIMIT}"
        )));
    }
    Ok(())
}
