use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use strum_macros::Display as StrumDisplay;
use num_enum::TryFromPrimitive;

use super::{Opcode, Word};
use crate::address::Address;
use crate::error::VmError;

/// No instruction takes more than three parameters.
pub const MAX_PARAMETERS: usize = 3;

/**
  How an instruction parameter is interpreted.

    Position:  the parameter is the address of the operand.
    Immediate: the parameter is the operand itself. Only valid for reads.
    Relative:  the parameter plus the relative base is the address of the operand.
*/
#[derive(
StrumDisplay, TryFromPrimitive,
Clone,        Copy,             Eq, PartialEq, Debug, Hash
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum ParameterMode {
  Position  = 0,
  Immediate = 1,
  Relative  = 2,
}

impl Default for ParameterMode {
  fn default() -> ParameterMode {
    ParameterMode::Position
  }
}

/// A decoded instruction word: the opcode and the modes of its parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub opcode: Opcode,
  modes: [ParameterMode; MAX_PARAMETERS],
}

impl Instruction {
  /**
    Decodes the instruction word fetched from `address`. Only the mode digits of parameters
    the opcode actually takes are checked; the remaining slots default to position mode. An
    instruction that would store through an immediate mode parameter is rejected here, before
    any of it executes.
  */
  pub fn decode(word: Word, address: Address) -> Result<Instruction, VmError> {
    let opcode =
      u8::try_from(word % 100)
        .ok()
        .and_then(|code| Opcode::try_from(code).ok())
        .ok_or(VmError::UnknownOpcode { opcode: word, address })?;

    let mut modes = [ParameterMode::default(); MAX_PARAMETERS];
    let mut digits = word / 100;
    for mode in modes.iter_mut().take(opcode.arity()) {
      let digit = digits % 10;
      *mode =
        u8::try_from(digit)
          .ok()
          .and_then(|code| ParameterMode::try_from(code).ok())
          .ok_or(VmError::InvalidAddressingMode { mode: digit, address })?;
      digits /= 10;
    }

    if let Some(slot) = opcode.write_slot() {
      if modes[slot - 1] == ParameterMode::Immediate {
        return Err(VmError::InvalidWriteTarget { address });
      }
    }

    Ok(Instruction { opcode, modes })
  }

  /// The mode of parameter `slot`, counting from 1.
  pub fn mode(&self, slot: usize) -> ParameterMode {
    self.modes[slot - 1]
  }

  pub fn modes(&self) -> &[ParameterMode] {
    &self.modes[..self.opcode.arity()]
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}({})",
      self.opcode,
      self
        .modes()
        .iter()
        .map(ParameterMode::to_string)
        .collect::<Vec<String>>()
        .join(", ")
    )
  }
}
