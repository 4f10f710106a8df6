//! `gatesim eval`: settle a chip for one set of inputs.

use gatesim_ir::{Pin, PinKind};
use gatesim_sim::{evaluate, State};

use crate::pipeline::{describe_sim_error, open_session, render_diagnostics};
use crate::{EvalArgs, GlobalArgs, ReportFormat};

/// Runs the `gatesim eval` command.
///
/// Unassigned inputs read as zero. Prints every output pin after the chip
/// settles. Returns 1 if the chip does not link.
pub fn run(args: &EvalArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut session = open_session(global)?;
    let ctx = &mut session.context;
    let netlist = ctx.elaborate(&args.chip)?;
    render_diagnostics(ctx.sink(), ctx.source_db(), global);
    let Some(netlist) = netlist else {
        return Ok(1);
    };

    let interner = ctx.interner();
    let mut state = State::for_top(&netlist)?;
    let chip = state.chip();
    for (name, value) in &args.inputs {
        let pin = state.pin_named(interner, name)?;
        if chip.pin(pin).map(|p| p.kind) != Some(PinKind::Input) {
            return Err(format!("`{name}` is not an input of `{}`", args.chip).into());
        }
        state.set_named(interner, name, *value)?;
    }
    evaluate(&mut state, &session.sim).map_err(|e| describe_sim_error(&e, &netlist, interner))?;

    let outputs: Vec<(&Pin, u64)> = chip.outputs().map(|pin| (pin, state.get(pin.index))).collect();
    match args.format {
        ReportFormat::Text => {
            for (pin, value) in outputs {
                println!(
                    "{} = {:0width$b}",
                    interner.resolve(pin.name),
                    value,
                    width = pin.width as usize
                );
            }
        }
        ReportFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = outputs
                .into_iter()
                .map(|(pin, value)| (interner.resolve(pin.name).to_string(), value.into()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
    }
    Ok(0)
}
