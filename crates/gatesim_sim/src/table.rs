//! Truth tables by exhaustive input enumeration.

use gatesim_common::Interner;
use gatesim_ir::{ChipId, Netlist};
use serde::Serialize;
use std::fmt;

use crate::bits;
use crate::error::SimError;
use crate::evaluator::evaluate;
use crate::state::State;
use crate::SimConfig;

/// A table column: one pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Pin name as declared.
    pub name: String,
    /// Pin width in bits.
    pub width: u32,
}

/// One input combination and the settled outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Input values, parallel to [`TruthTable::inputs`].
    pub inputs: Vec<u64>,
    /// Output values, parallel to [`TruthTable::outputs`].
    pub outputs: Vec<u64>,
}

/// Every input combination of a chip with its settled outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TruthTable {
    /// Input pins in declaration order.
    pub inputs: Vec<Column>,
    /// Output pins in declaration order.
    pub outputs: Vec<Column>,
    /// One row per combination, counting up with the first input most significant.
    pub rows: Vec<Row>,
}

/// Enumerates all inputs of `chip`, settling a fresh state for each row.
pub fn truth_table(
    netlist: &Netlist,
    chip: ChipId,
    interner: &Interner,
    config: &SimConfig,
) -> Result<TruthTable, SimError> {
    let def = netlist.chip(chip).ok_or(SimError::ChipNotFound(chip))?;
    let input_bits = def.input_bits();
    if input_bits > config.max_table_inputs || input_bits >= u64::BITS {
        return Err(SimError::TooManyInputs {
            bits: input_bits,
            max: config.max_table_inputs,
        });
    }
    let column = |pin: &gatesim_ir::Pin| Column {
        name: interner.resolve(pin.name).to_string(),
        width: pin.width,
    };
    let input_pins: Vec<_> = def.inputs().collect();
    let output_pins: Vec<_> = def.outputs().collect();

    let mut rows = Vec::with_capacity(1usize << input_bits);
    for combination in 0..(1u64 << input_bits) {
        let mut state = State::new(netlist, chip)?;
        let mut shift = input_bits;
        let mut inputs = Vec::with_capacity(input_pins.len());
        for pin in &input_pins {
            shift -= pin.width;
            let value = (combination >> shift) & bits::mask(pin.width);
            state.set(pin.index, value);
            inputs.push(value);
        }
        evaluate(&mut state, config)?;
        let outputs = output_pins.iter().map(|pin| state.get(pin.index)).collect();
        rows.push(Row { inputs, outputs });
    }

    Ok(TruthTable {
        inputs: input_pins.into_iter().map(column).collect(),
        outputs: output_pins.into_iter().map(column).collect(),
        rows,
    })
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<&Column> = self.inputs.iter().chain(&self.outputs).collect();
        let widths: Vec<usize> = columns
            .iter()
            .map(|c| c.name.len().max(c.width as usize))
            .collect();

        write!(f, "|")?;
        for (column, width) in columns.iter().zip(&widths) {
            write!(f, " {:^width$} |", column.name)?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "|")?;
            let values = row.inputs.iter().chain(&row.outputs);
            for ((value, column), width) in values.zip(&columns).zip(&widths) {
                let digits = format!("{:0bits$b}", value, bits = column.width as usize);
                write!(f, " {digits:^width$} |")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatesim_elaborate::Context;

    fn table(source: &str, top: &str, config: &SimConfig) -> Result<TruthTable, SimError> {
        let mut ctx = Context::new();
        ctx.add_source("test.hdl", source);
        let netlist = ctx.elaborate(top).unwrap().unwrap();
        truth_table(&netlist, netlist.top(), ctx.interner(), config)
    }

    #[test]
    fn xor_table() {
        let mut ctx = Context::new();
        let netlist = ctx.elaborate("Xor").unwrap().unwrap();
        let t = truth_table(&netlist, netlist.top(), ctx.interner(), &SimConfig::default()).unwrap();
        assert_eq!(t.inputs.len(), 2);
        let outs: Vec<u64> = t.rows.iter().map(|r| r.outputs[0]).collect();
        assert_eq!(outs, vec![0, 1, 1, 0]);
        assert_eq!(t.rows[2].inputs, vec![1, 0]);
        assert_eq!(
            t.to_string(),
            "| a | b | out |\n| 0 | 0 |  0  |\n| 0 | 1 |  1  |\n| 1 | 0 |  1  |\n| 1 | 1 |  0  |\n"
        );
    }

    #[test]
    fn multi_bit_inputs_split_msb_first() {
        let t = table(
            "CHIP Pick { IN sel, d[2]; OUT out; PARTS: And(a=sel, b=d[1], out=out); }",
            "Pick",
            &SimConfig::default(),
        )
        .unwrap();
        assert_eq!(t.rows.len(), 8);
        assert_eq!(t.rows[6].inputs, vec![1, 0b10]);
        assert_eq!(t.rows[6].outputs, vec![1]);
        assert_eq!(t.rows[5].outputs, vec![0]);
    }

    #[test]
    fn input_limit() {
        let config = SimConfig {
            max_table_inputs: 4,
            ..SimConfig::default()
        };
        let err = table(
            "CHIP Big { IN a[5]; OUT o; PARTS: Not(in=a[0], out=o); }",
            "Big",
            &config,
        )
        .unwrap_err();
        assert_eq!(err, SimError::TooManyInputs { bits: 5, max: 4 });
    }

    #[test]
    fn serializes_to_json() {
        let mut ctx = Context::new();
        let netlist = ctx.elaborate("Not").unwrap().unwrap();
        let t = truth_table(&netlist, netlist.top(), ctx.interner(), &SimConfig::default()).unwrap();
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["rows"][0]["outputs"][0], 1);
        assert_eq!(json["inputs"][0]["name"], "in");
    }
}
