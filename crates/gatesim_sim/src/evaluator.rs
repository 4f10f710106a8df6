//! Fixed-point evaluation.
//!
//! A gate computes its output directly. A composite chip is settled in
//! passes: for every part in declaration order, push the wires that drive
//! the part's inputs, evaluate the part, then pull the wires its outputs
//! drive. Passes repeat until one changes nothing. The pass count is
//! bounded so that a combinational loop ends in
//! [`SimError::NoConvergence`] instead of spinning forever.

use gatesim_ir::{ChipKind, GateKind, PinId, WireDirection};
use tracing::trace;

use crate::error::SimError;
use crate::state::State;
use crate::SimConfig;

/// Settles `state` and returns whether any value changed during the call.
pub fn evaluate(state: &mut State<'_>, config: &SimConfig) -> Result<bool, SimError> {
    match state.chip().kind {
        ChipKind::Gate(gate) => Ok(evaluate_gate(state, gate)),
        ChipKind::Composite => settle(state, config),
    }
}

fn evaluate_gate(state: &mut State<'_>, gate: GateKind) -> bool {
    let arity = gate.input_names().len();
    let mut inputs = [0u64; 2];
    for (i, input) in inputs.iter_mut().enumerate().take(arity) {
        *input = state.get(PinId::from_raw(i as u32));
    }
    let out = PinId::from_raw(arity as u32);
    state.set(out, gate.apply(&inputs[..arity]))
}

fn settle(state: &mut State<'_>, config: &SimConfig) -> Result<bool, SimError> {
    let chip = state.chip();
    let mut changed_any = false;
    for pass in 0..config.max_passes {
        let mut changed = false;
        for part in chip.parts.values() {
            for wire in part.wires.iter().filter(|w| w.direction == WireDirection::Drive) {
                changed |= state.assign(part.index, wire)?;
            }
            changed |= evaluate(state.child_mut(part.index)?, config)?;
            for wire in part.wires.iter().filter(|w| w.direction == WireDirection::Sense) {
                changed |= state.assign(part.index, wire)?;
            }
        }
        if !changed {
            trace!(chip = %state.chip_id(), passes = pass + 1, "settled");
            return Ok(changed_any);
        }
        changed_any = true;
    }
    Err(SimError::NoConvergence {
        chip: state.chip_id(),
        passes: config.max_passes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatesim_elaborate::Context;
    use gatesim_ir::Netlist;

    fn netlist(source: &str, top: &str) -> (Context, Netlist) {
        let mut ctx = Context::new();
        ctx.add_source("test.hdl", source);
        let netlist = ctx.elaborate(top).unwrap().unwrap();
        (ctx, netlist)
    }

    fn gate(name: &str) -> (Context, Netlist) {
        let mut ctx = Context::new();
        let netlist = ctx.elaborate(name).unwrap().unwrap();
        (ctx, netlist)
    }

    fn run(netlist: &Netlist, ctx: &Context, inputs: &[(&str, u64)], output: &str) -> u64 {
        let mut state = State::for_top(netlist).unwrap();
        for (name, value) in inputs {
            state.set_named(ctx.interner(), name, *value).unwrap();
        }
        evaluate(&mut state, &SimConfig::default()).unwrap();
        state.get_named(ctx.interner(), output).unwrap()
    }

    #[test]
    fn binary_gate_truth_tables() {
        let expected = [
            ("Nand", [1, 1, 1, 0]),
            ("And", [0, 0, 0, 1]),
            ("Or", [0, 1, 1, 1]),
            ("Xor", [0, 1, 1, 0]),
        ];
        for (name, outs) in expected {
            let (ctx, netlist) = gate(name);
            for (row, (a, b)) in [(0, 0), (0, 1), (1, 0), (1, 1)].into_iter().enumerate() {
                let out = run(&netlist, &ctx, &[("a", a), ("b", b)], "out");
                assert_eq!(out, outs[row], "{name}({a}, {b})");
            }
        }
    }

    #[test]
    fn not_truth_table() {
        let (ctx, netlist) = gate("Not");
        assert_eq!(run(&netlist, &ctx, &[("in", 0)], "out"), 1);
        assert_eq!(run(&netlist, &ctx, &[("in", 1)], "out"), 0);
    }

    #[test]
    fn gates_are_idempotent() {
        for g in GateKind::ALL {
            let (ctx, netlist) = gate(g.name());
            for a in 0..2 {
                let mut state = State::for_top(&netlist).unwrap();
                let first = g.input_names()[0];
                state.set_named(ctx.interner(), first, a).unwrap();
                evaluate(&mut state, &SimConfig::default()).unwrap();
                assert!(!evaluate(&mut state, &SimConfig::default()).unwrap());
            }
        }
    }

    #[test]
    fn and_or3_settles() {
        let (ctx, netlist) = netlist(
            "CHIP AndOr3 {
                IN a, b, c;
                OUT out;
                PARTS:
                And(a=a, b=b, out=ab);
                Or(a=ab, b=c, out=out);
            }",
            "AndOr3",
        );
        assert_eq!(run(&netlist, &ctx, &[("a", 1), ("b", 0), ("c", 0)], "out"), 0);
        assert_eq!(run(&netlist, &ctx, &[("a", 1), ("b", 1), ("c", 0)], "out"), 1);
        assert_eq!(run(&netlist, &ctx, &[("a", 0), ("b", 0), ("c", 1)], "out"), 1);
    }

    #[test]
    fn parts_out_of_order_still_settle() {
        let (ctx, netlist) = netlist(
            "CHIP Late { IN a, b, c; OUT out; PARTS:
                Or(a=ab, b=c, out=out);
                And(a=a, b=b, out=ab);
            }",
            "Late",
        );
        assert_eq!(run(&netlist, &ctx, &[("a", 1), ("b", 1), ("c", 0)], "out"), 1);
    }

    #[test]
    fn second_evaluate_reports_no_change() {
        let (ctx, netlist) = netlist(
            "CHIP Buf { IN in; OUT out; PARTS: Not(in=in, out=n); Not(in=n, out=out); }",
            "Buf",
        );
        let mut state = State::for_top(&netlist).unwrap();
        state.set_named(ctx.interner(), "in", 1).unwrap();
        let config = SimConfig::default();
        assert!(evaluate(&mut state, &config).unwrap());
        assert!(!evaluate(&mut state, &config).unwrap());
        assert_eq!(state.get_named(ctx.interner(), "out").unwrap(), 1);
    }

    #[test]
    fn bus_wiring_with_ranges() {
        let (ctx, netlist) = netlist(
            "CHIP Swap { IN in[2]; OUT out[2]; PARTS:
                Not(in=in[0], out=n0);
                Not(in=n0, out=out[1]);
                Not(in=in[1], out=n1);
                Not(in=n1, out=out[0]);
            }",
            "Swap",
        );
        assert_eq!(run(&netlist, &ctx, &[("in", 0b01)], "out"), 0b10);
        assert_eq!(run(&netlist, &ctx, &[("in", 0b10)], "out"), 0b01);
    }

    #[test]
    fn pass_limit_reports_no_convergence() {
        let (ctx, netlist) = netlist(
            "CHIP Buf { IN in; OUT out; PARTS: Not(in=in, out=n); Not(in=n, out=out); }",
            "Buf",
        );
        let mut state = State::for_top(&netlist).unwrap();
        state.set_named(ctx.interner(), "in", 0).unwrap();
        let tight = SimConfig {
            max_passes: 1,
            ..SimConfig::default()
        };
        assert!(matches!(
            evaluate(&mut state, &tight),
            Err(SimError::NoConvergence { passes: 1, .. })
        ));
    }

    #[test]
    fn evaluates_from_many_threads() {
        let (ctx, netlist) = netlist(
            "CHIP AndOr3 { IN a, b, c; OUT out; PARTS:
                And(a=a, b=b, out=ab);
                Or(a=ab, b=c, out=out);
            }",
            "AndOr3",
        );
        let netlist = &netlist;
        let interner = ctx.interner();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8u64)
                .map(|n| {
                    scope.spawn(move || {
                        let (a, b, c) = ((n >> 2) & 1, (n >> 1) & 1, n & 1);
                        let mut state = State::for_top(netlist).unwrap();
                        state.set_named(interner, "a", a).unwrap();
                        state.set_named(interner, "b", b).unwrap();
                        state.set_named(interner, "c", c).unwrap();
                        evaluate(&mut state, &SimConfig::default()).unwrap();
                        (n, state.get_named(interner, "out").unwrap())
                    })
                })
                .collect();
            for handle in handles {
                let (n, out) = handle.join().unwrap();
                let expected = ((n >> 2) & (n >> 1) & 1) | (n & 1);
                assert_eq!(out, expected);
            }
        });
    }
}
