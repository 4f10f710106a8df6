//! Shared pipeline helpers for CLI commands.
//!
//! Contains project root discovery, config loading, construction of the
//! chip [`Context`], logging setup, input-assignment parsing and diagnostic
//! rendering used by every command.

use std::path::{Path, PathBuf};

use gatesim_common::Interner;
use gatesim_config::{ProjectConfig, CONFIG_FILE_NAME};
use gatesim_diagnostics::{DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer};
use gatesim_elaborate::Context;
use gatesim_ir::Netlist;
use gatesim_sim::{SimConfig, SimError};
use gatesim_source::SourceDb;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::GlobalArgs;

/// Everything a command needs: the chip context and the run limits.
pub struct Session {
    /// Chip registry rooted at the resolved library folder.
    pub context: Context,
    /// Simulation limits from `[sim]`, or the defaults.
    pub sim: SimConfig,
    /// The project's top chip, when a project file was found.
    pub top: Option<String>,
}

impl Session {
    /// Picks the chip named on the command line, falling back to the project top.
    pub fn chip_name(&self, arg: Option<&str>) -> Result<String, Box<dyn std::error::Error>> {
        arg.map(str::to_string)
            .or_else(|| self.top.clone())
            .ok_or_else(|| {
                format!("no chip given and no {CONFIG_FILE_NAME} with a `project.top`").into()
            })
    }
}

/// Installs the `tracing` subscriber. `RUST_LOG` wins over the CLI flags.
pub fn init_logging(global: &GlobalArgs) {
    let level = if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Walks up from `start` looking for the nearest directory containing `gatesim.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}

/// Loads the project file selected by `--config`, or the nearest one above
/// the current directory. Returns the project directory with the config.
pub fn resolve_config(
    global: &GlobalArgs,
) -> Result<Option<(PathBuf, ProjectConfig)>, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let path = PathBuf::from(config_path);
        if path.is_file() {
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let content = std::fs::read_to_string(&path)?;
            let config = gatesim_config::load_config_from_str(&content)?;
            return Ok(Some((dir, config)));
        }
        let config = gatesim_config::load_config(&path)?;
        return Ok(Some((path, config)));
    }
    match find_project_root(&std::env::current_dir()?) {
        Some(dir) => {
            let config = gatesim_config::load_config(&dir)?;
            Ok(Some((dir, config)))
        }
        None => Ok(None),
    }
}

/// Builds a [`Session`]: `--lib` wins, then the project's library folder,
/// then the current directory.
pub fn open_session(global: &GlobalArgs) -> Result<Session, Box<dyn std::error::Error>> {
    let project = resolve_config(global)?;
    let library = match (&global.lib, &project) {
        (Some(lib), _) => PathBuf::from(lib),
        (None, Some((dir, config))) => config.library_dir(dir),
        (None, None) => std::env::current_dir()?,
    };
    debug!(library = %library.display(), "opening chip library");

    let (sim, top) = match project {
        Some((_, config)) => (
            SimConfig {
                max_passes: config.sim.max_passes,
                max_table_inputs: config.sim.max_table_inputs,
            },
            Some(config.project.top),
        ),
        None => (SimConfig::default(), None),
    };
    Ok(Session {
        context: Context::with_library(library),
        sim,
        top,
    })
}

/// Parses `name=value` where the value is decimal, `0b` binary or `0x` hex.
pub fn parse_assignment(s: &str) -> Result<(String, u64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected `name=value`, found `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing pin name in `{s}`"));
    }
    Ok((name.to_string(), parse_value(value.trim())?))
}

/// Parses an unsigned integer literal with an optional `0b`/`0x` prefix.
pub fn parse_value(s: &str) -> Result<u64, String> {
    let digits = s.replace('_', "");
    let parsed = if let Some(bin) = digits.strip_prefix("0b") {
        u64::from_str_radix(bin, 2)
    } else if let Some(hex) = digits.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        digits.parse()
    };
    parsed.map_err(|_| format!("invalid value `{s}`"))
}

/// Rewrites chip IDs in a simulation error into chip names.
pub fn describe_sim_error(err: &SimError, netlist: &Netlist, interner: &Interner) -> String {
    let name = |id| {
        netlist
            .chip(id)
            .map_or("?", |chip| interner.resolve(chip.name))
            .to_string()
    };
    match err {
        SimError::NoConvergence { chip, passes } => {
            format!("chip `{}` did not settle within {passes} passes", name(*chip))
        }
        SimError::ChipNotFound(chip) => format!("chip {chip} is not in the netlist"),
        other => other.to_string(),
    }
}

/// Renders all diagnostics from a sink to stderr using the terminal renderer.
///
/// Warnings are skipped with `--quiet`. Returns the number rendered.
pub fn render_diagnostics(sink: &DiagnosticSink, source_db: &SourceDb, global: &GlobalArgs) -> usize {
    let renderer = TerminalRenderer::new(global.color);
    let mut rendered = 0;
    for diag in sink.diagnostics() {
        if global.quiet && diag.severity != Severity::Error {
            continue;
        }
        eprintln!("{}", renderer.render(&diag, source_db));
        rendered += 1;
    }
    rendered
}

/// Prints the `Result:` summary line unless `--quiet`.
pub fn print_summary(sink: &DiagnosticSink, global: &GlobalArgs) {
    if global.quiet {
        return;
    }
    let diagnostics = sink.diagnostics();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    eprintln!(
        "   Result: {} error(s), {} warning(s)",
        sink.error_count(),
        warnings
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn global(config: Option<String>, lib: Option<String>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config,
            lib,
        }
    }

    #[test]
    fn find_project_root_in_current_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[project]\nname = \"t\"\ntop = \"Not\"\n",
        )
        .unwrap();
        assert_eq!(find_project_root(tmp.path()).as_deref(), Some(tmp.path()));
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[project]\nname = \"t\"\ntop = \"Not\"\n",
        )
        .unwrap();
        let sub = tmp.path().join("hdl");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_project_root(&sub).as_deref(), Some(tmp.path()));
    }

    #[test]
    fn config_file_sets_library_and_limits() {
        let tmp = TempDir::new().unwrap();
        let hdl = tmp.path().join("hdl");
        fs::create_dir_all(&hdl).unwrap();
        fs::write(
            hdl.join("Buf.hdl"),
            "CHIP Buf { IN in; OUT out; PARTS: Not(in=in, out=n); Not(in=n, out=out); }",
        )
        .unwrap();
        let config = tmp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &config,
            "[project]\nname = \"t\"\ntop = \"Buf\"\nlibrary = \"hdl\"\n\n[sim]\nmax_passes = 7\n",
        )
        .unwrap();

        let mut session =
            open_session(&global(Some(config.display().to_string()), None)).unwrap();
        assert_eq!(session.sim.max_passes, 7);
        assert_eq!(session.chip_name(None).unwrap(), "Buf");
        assert_eq!(session.chip_name(Some("Not")).unwrap(), "Not");
        assert_eq!(session.context.library(), Some(hdl.as_path()));
        assert!(session.context.chip("Buf").is_some());
    }

    #[test]
    fn lib_flag_overrides_project_library() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[project]\nname = \"t\"\ntop = \"Not\"\nlibrary = \"hdl\"\n",
        )
        .unwrap();
        let other = tmp.path().join("other");
        let session = open_session(&global(
            Some(tmp.path().display().to_string()),
            Some(other.display().to_string()),
        ))
        .unwrap();
        assert_eq!(session.context.library(), Some(other.as_path()));
    }

    #[test]
    fn invalid_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "[project]\nname = \"t\"\n").unwrap();
        assert!(open_session(&global(Some(tmp.path().display().to_string()), None)).is_err());
    }

    #[test]
    fn parse_values() {
        assert_eq!(parse_value("12"), Ok(12));
        assert_eq!(parse_value("0b1010"), Ok(10));
        assert_eq!(parse_value("0xff"), Ok(255));
        assert_eq!(parse_value("0b1111_0000"), Ok(0xf0));
        assert!(parse_value("0b2").is_err());
        assert!(parse_value("").is_err());
    }

    #[test]
    fn parse_assignments() {
        assert_eq!(parse_assignment("sel = 1"), Ok(("sel".to_string(), 1)));
        assert!(parse_assignment("=1").is_err());
        assert!(parse_assignment("a").is_err());
    }

    #[test]
    fn no_convergence_names_the_chip() {
        let mut ctx = Context::new();
        ctx.add_source(
            "Buf.hdl",
            "CHIP Buf { IN in; OUT out; PARTS: Not(in=in, out=n); Not(in=n, out=out); }",
        );
        let netlist = ctx.elaborate("Buf").unwrap().unwrap();
        let err = SimError::NoConvergence {
            chip: netlist.top(),
            passes: 3,
        };
        assert_eq!(
            describe_sim_error(&err, &netlist, ctx.interner()),
            "chip `Buf` did not settle within 3 passes"
        );
    }
}
