//! `gatesim render`: print the canonical HDL of a chip.

use crate::pipeline::{open_session, render_diagnostics};
use crate::{ChipArgs, GlobalArgs};

/// Runs the `gatesim render` command.
///
/// The chip is loaded but not linked, so a chip with broken parts still
/// renders. Returns 1 if it cannot be loaded.
pub fn run(args: &ChipArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut session = open_session(global)?;
    let name = session.chip_name(args.chip.as_deref())?;
    let ctx = &mut session.context;

    let text = ctx
        .chip(&name)
        .and_then(|id| ctx.decl(id))
        .map(|decl| decl.render(ctx.interner()));

    render_diagnostics(ctx.sink(), ctx.source_db(), global);
    match text {
        Some(text) => {
            print!("{text}");
            Ok(0)
        }
        None => Ok(1),
    }
}
