/*!
  The human readable textual form of a memory image is called assembly. This module leverages
  the `strum` derives of the instruction related enums to render memory as a listing.

  Operands are written according to their mode:

    [12]      position:  the cell at address 12
    12        immediate: the number 12
    [rb+12]   relative:  the cell at the relative base plus 12

  A listing is only a best guess at the program's structure. Code and data share memory, so
  a data word that happens to look like an instruction is listed as one, and a program may
  rewrite its own instructions before they run.
*/

use std::fmt::{Display, Formatter};

use super::{Instruction, ParameterMode, Word};
use crate::address::Address;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Operand {
  pub mode: ParameterMode,
  pub value: Word,
}

impl Display for Operand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.mode {
      ParameterMode::Position => write!(f, "[{}]", self.value),
      ParameterMode::Immediate => write!(f, "{}", self.value),
      ParameterMode::Relative if self.value < 0 => write!(f, "[rb{}]", self.value),
      ParameterMode::Relative => write!(f, "[rb+{}]", self.value),
    }
  }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ListingLine {
  Instruction {
    address: Address,
    instruction: Instruction,
    operands: Vec<Operand>,
  },
  /// A cell that does not decode as an instruction, or an instruction truncated by the end
  /// of memory.
  Data {
    address: Address,
    value: Word,
  },
}

impl ListingLine {
  /// Number of cells the line covers.
  pub fn width(&self) -> usize {
    match self {
      ListingLine::Instruction { instruction, .. } => instruction.opcode.width(),
      ListingLine::Data { .. } => 1,
    }
  }
}

impl Display for ListingLine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      ListingLine::Instruction { address, instruction, operands } => {
        write!(f, "{:>6}: {}", address.idx(), instruction.opcode)?;
        if !operands.is_empty() {
          write!(
            f,
            " {}",
            operands
              .iter()
              .map(Operand::to_string)
              .collect::<Vec<String>>()
              .join(", ")
          )?;
        }
        Ok(())
      }

      ListingLine::Data { address, value } => {
        write!(f, "{:>6}: data {}", address.idx(), value)
      }
    }
  }
}

/// A disassembled memory image.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Listing {
  pub lines: Vec<ListingLine>,
}

impl Display for Listing {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    for line in &self.lines {
      writeln!(f, "{}", line)?;
    }
    Ok(())
  }
}

/// Walks `cells` from address zero, decoding one instruction at a time.
pub fn disassemble(cells: &[Word]) -> Listing {
  let mut lines = Vec::new();
  let mut idx = 0;

  while idx < cells.len() {
    let address = Address(idx);
    let line =
      match Instruction::decode(cells[idx], address) {
        Ok(instruction) if idx + instruction.opcode.arity() < cells.len() => {
          let operands =
            instruction
              .modes()
              .iter()
              .enumerate()
              .map(|(offset, mode)| Operand { mode: *mode, value: cells[idx + offset + 1] })
              .collect();
          ListingLine::Instruction { address, instruction, operands }
        }

        _ => ListingLine::Data { address, value: cells[idx] },
      };

    idx += line.width();
    lines.push(line);
  }

  Listing { lines }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::Opcode;

  #[test]
  fn formats_operands_by_mode() {
    let position = Operand { mode: ParameterMode::Position, value: 9 };
    let immediate = Operand { mode: ParameterMode::Immediate, value: -4 };
    let relative = Operand { mode: ParameterMode::Relative, value: -1 };
    let forward = Operand { mode: ParameterMode::Relative, value: 3 };
    assert_eq!(position.to_string(), "[9]");
    assert_eq!(immediate.to_string(), "-4");
    assert_eq!(relative.to_string(), "[rb-1]");
    assert_eq!(forward.to_string(), "[rb+3]");
  }

  #[test]
  fn lists_a_small_program() {
    let listing = disassemble(&[109, 1, 204, -1, 1001, 100, 1, 100, 99]);
    let text = listing.to_string();
    assert_eq!(
      text,
      "     0: arb 1\n     \
            2: out [rb-1]\n     \
            4: add [100], 1, [100]\n     \
            8: halt\n"
    );
  }

  #[test]
  fn undecodable_cells_become_data() {
    let listing = disassemble(&[3, 5, -7, 1101, 1]);
    assert_eq!(listing.lines.len(), 4);
    match &listing.lines[0] {
      ListingLine::Instruction { instruction, .. } => assert_eq!(instruction.opcode, Opcode::Input),
      other => panic!("expected an instruction, found {:?}", other),
    }
    assert_eq!(listing.lines[1], ListingLine::Data { address: Address(2), value: -7 });
    // `1101` needs three more cells than remain.
    assert_eq!(listing.lines[2], ListingLine::Data { address: Address(3), value: 1101 });
    assert_eq!(listing.lines[3], ListingLine::Data { address: Address(4), value: 1 });
  }
}
