//! `gatesim table`: print the truth table of a chip.

use gatesim_sim::truth_table;

use crate::pipeline::{describe_sim_error, open_session, render_diagnostics};
use crate::{GlobalArgs, ReportFormat, TableArgs};

/// Runs the `gatesim table` command.
///
/// Refuses chips whose inputs exceed `sim.max_table_inputs` bits.
pub fn run(args: &TableArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut session = open_session(global)?;
    let name = session.chip_name(args.chip.as_deref())?;
    let ctx = &mut session.context;
    let netlist = ctx.elaborate(&name)?;
    render_diagnostics(ctx.sink(), ctx.source_db(), global);
    let Some(netlist) = netlist else {
        return Ok(1);
    };

    let interner = ctx.interner();
    let table = truth_table(&netlist, netlist.top(), interner, &session.sim)
        .map_err(|e| describe_sim_error(&e, &netlist, interner))?;

    match args.format {
        ReportFormat::Text => print!("{table}"),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
    }
    Ok(0)
}
