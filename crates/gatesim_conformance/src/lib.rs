//! Conformance test helpers for the gatesim pipeline.
//!
//! Provides shared pipeline functions that load HDL text through the full
//! pipeline (parse → resolve → link → freeze) and return structured results
//! for assertion in integration tests, plus a helper that settles the frozen
//! netlist for one set of inputs.

#![warn(missing_docs)]

use std::path::Path;

use gatesim_config::ProjectConfig;
use gatesim_diagnostics::{Diagnostic, Severity};
use gatesim_elaborate::Context;
use gatesim_ir::Netlist;
use gatesim_sim::{evaluate, SimConfig, SimError, State};

/// Result of running the full load → link → freeze pipeline.
pub struct PipelineResult {
    /// The context, kept for its interner and chip definitions.
    pub context: Context,
    /// The frozen netlist, if the top chip linked without errors.
    pub netlist: Option<Netlist>,
    /// All diagnostics emitted during the pipeline.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether any errors were emitted.
    pub has_errors: bool,
    /// Number of error-severity diagnostics.
    pub error_count: usize,
    /// Number of warning-severity diagnostics.
    pub warning_count: usize,
}

impl PipelineResult {
    /// Diagnostic codes in emission order, such as `"E204"`.
    pub fn codes(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.code.to_string()).collect()
    }

    /// Whether a diagnostic with `code` was emitted.
    pub fn has_code(&self, code: &str) -> bool {
        self.codes().iter().any(|c| c == code)
    }

    /// Settles the top chip with the given inputs and returns every output
    /// pin by name, in declaration order.
    ///
    /// # Panics
    ///
    /// Panics if the pipeline produced no netlist.
    pub fn simulate(&self, inputs: &[(&str, u64)]) -> Result<Vec<(String, u64)>, SimError> {
        self.simulate_with(inputs, &SimConfig::default())
    }

    /// Like [`simulate`](Self::simulate) with explicit limits.
    pub fn simulate_with(
        &self,
        inputs: &[(&str, u64)],
        config: &SimConfig,
    ) -> Result<Vec<(String, u64)>, SimError> {
        let netlist = self
            .netlist
            .as_ref()
            .unwrap_or_else(|| panic!("no netlist; diagnostics: {:?}", self.codes()));
        let interner = self.context.interner();
        let mut state = State::for_top(netlist)?;
        for (name, value) in inputs {
            state.set_named(interner, name, *value)?;
        }
        evaluate(&mut state, config)?;
        Ok(state
            .chip()
            .outputs()
            .map(|pin| (interner.resolve(pin.name).to_string(), state.get(pin.index)))
            .collect())
    }

    /// Settles the top chip and returns one named output.
    pub fn output(&self, inputs: &[(&str, u64)], name: &str) -> u64 {
        self.simulate(inputs)
            .unwrap_or_else(|e| panic!("simulation failed: {e}"))
            .into_iter()
            .find(|(pin, _)| pin == name)
            .map(|(_, value)| value)
            .unwrap_or_else(|| panic!("no output `{name}`"))
    }
}

/// Creates a minimal `ProjectConfig` with the given top chip.
pub fn make_config(top: &str) -> ProjectConfig {
    let toml_str = format!(
        r#"
[project]
name = "conformance_test"
top = "{top}"
"#
    );
    gatesim_config::load_config_from_str(&toml_str)
        .unwrap_or_else(|e| panic!("invalid test config: {e}"))
}

/// Runs the full pipeline on in-memory HDL sources.
///
/// Each entry in `files` is `(filename, source_text)`. Every file is
/// registered before `top` is resolved, linked and frozen.
pub fn full_pipeline(files: &[(&str, &str)], top: &str) -> PipelineResult {
    let mut context = Context::new();
    for (name, source) in files {
        context.add_source(name, source);
    }
    finish_pipeline(context, top)
}

/// Runs the full pipeline on a single in-memory source.
pub fn full_pipeline_str(source: &str, top: &str) -> PipelineResult {
    full_pipeline(&[("test.hdl", source)], top)
}

/// Runs the full pipeline against a library folder of `.hdl` files.
pub fn full_pipeline_library(dir: &Path, top: &str) -> PipelineResult {
    finish_pipeline(Context::with_library(dir), top)
}

/// Runs the full pipeline for a project directory holding `gatesim.toml`.
pub fn full_pipeline_project(project_dir: &Path) -> PipelineResult {
    let config = gatesim_config::load_config(project_dir)
        .unwrap_or_else(|e| panic!("invalid project config: {e}"));
    let context = Context::with_library(config.library_dir(project_dir));
    finish_pipeline(context, &config.project.top)
}

fn finish_pipeline(mut context: Context, top: &str) -> PipelineResult {
    let netlist = context
        .elaborate(top)
        .unwrap_or_else(|e| panic!("internal error: {e}"));
    let diagnostics = context.sink().diagnostics();
    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    PipelineResult {
        has_errors: context.has_errors(),
        context,
        netlist,
        diagnostics,
        error_count,
        warning_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_config_sets_top() {
        let config = make_config("AndOr3");
        assert_eq!(config.project.top, "AndOr3");
        assert_eq!(config.project.library, ".");
    }

    #[test]
    fn pipeline_on_builtin_gate() {
        let result = full_pipeline(&[], "Nand");
        assert!(!result.has_errors);
        assert_eq!(result.output(&[("a", 1), ("b", 1)], "out"), 0);
    }
}
