//! `gatesim check`: load and link a chip.
//!
//! 1. Resolve the project and chip library
//! 2. Load the chip and everything it instantiates
//! 3. Link and freeze the netlist
//! 4. Render diagnostics

use crate::pipeline::{open_session, print_summary, render_diagnostics};
use crate::{ChipArgs, GlobalArgs};

/// Runs the `gatesim check` command.
///
/// Returns exit code 0 if the chip links cleanly, 1 if there are errors.
pub fn run(args: &ChipArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut session = open_session(global)?;
    let name = session.chip_name(args.chip.as_deref())?;

    if !global.quiet {
        eprintln!("   Checking {name}");
    }

    let ctx = &mut session.context;
    let netlist = ctx.elaborate(&name)?;

    render_diagnostics(ctx.sink(), ctx.source_db(), global);
    print_summary(ctx.sink(), global);

    match netlist {
        Some(netlist) if !ctx.has_errors() => {
            if !global.quiet {
                eprintln!("   Linked {name}: {} chip definition(s)", netlist.len());
            }
            Ok(0)
        }
        _ => Ok(1),
    }
}
