/*!

  The computer uses a signed 64 bit word. Code and data live in the same memory, and an
  instruction is nothing more than a word that happens to sit under the instruction pointer
  when it is fetched. The word is read as a decimal number:

    ...EDCBA
         ^^   opcode, `word % 100`
        ^     mode of the first parameter
       ^      mode of the second parameter
      ^       mode of the third parameter

  Parameters follow the instruction word in consecutive cells. Mode digits that are absent
  are zero. See `ParameterMode` for what each mode means.

  As with the opcode enum of a byte-encoded machine, only the opcode is an enum. The
  parameters are never decoded ahead of time, because a program may overwrite them between
  the moment an instruction is written and the moment it is executed.

*/

mod assembly;
mod instruction;

pub use assembly::disassemble;
pub use instruction::{Instruction, ParameterMode};

use strum_macros::{Display as StrumDisplay, EnumString};
use num_enum::TryFromPrimitive;

// If you change this you must also change `Address::try_from`.
pub type Word = i64;

/// Opcodes of the computer. The discriminants are the opcode numbers as they appear in the
/// two lowest decimal digits of an instruction word.
#[derive(
StrumDisplay, EnumString, TryFromPrimitive,
Clone,        Copy,       Eq, PartialEq,  Debug, Hash
)]
#[repr(u8)]
pub enum Opcode {
  #[strum(serialize = "add")]
  Add                = 1,  // add( a, b, dst )
  #[strum(serialize = "mul")]
  Multiply           = 2,  // mul( a, b, dst )
  #[strum(serialize = "in")]
  Input              = 3,  // in( dst )
  #[strum(serialize = "out")]
  Output             = 4,  // out( a )
  #[strum(serialize = "jnz")]
  JumpIfTrue         = 5,  // jnz( a, target )
  #[strum(serialize = "jz")]
  JumpIfFalse        = 6,  // jz( a, target )
  #[strum(serialize = "lt")]
  LessThan           = 7,  // lt( a, b, dst )
  #[strum(serialize = "eq")]
  Equals             = 8,  // eq( a, b, dst )
  #[strum(serialize = "arb")]
  AdjustRelativeBase = 9,  // arb( a )
  #[strum(serialize = "halt")]
  Halt               = 99, // halt
}

impl Opcode {
  /// Number of parameter cells following the instruction word.
  pub fn arity(&self) -> usize {
    match self {
      | Opcode::Add
      | Opcode::Multiply
      | Opcode::LessThan
      | Opcode::Equals => 3,

      | Opcode::JumpIfTrue
      | Opcode::JumpIfFalse => 2,

      | Opcode::Input
      | Opcode::Output
      | Opcode::AdjustRelativeBase => 1,

      Opcode::Halt => 0,
    }
  }

  /// The parameter slot (counting from 1) the instruction stores its result through, if any.
  pub fn write_slot(&self) -> Option<usize> {
    match self {
      | Opcode::Add
      | Opcode::Multiply
      | Opcode::LessThan
      | Opcode::Equals => Some(3),

      Opcode::Input => Some(1),

      _ => None,
    }
  }

  /// Distance from this instruction to the next one when no jump is taken.
  pub fn width(&self) -> usize {
    self.arity() + 1
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::convert::TryFrom;
  use std::str::FromStr;

  #[test]
  fn opcodes_from_numbers() {
    assert_eq!(Opcode::try_from(1u8).ok(), Some(Opcode::Add));
    assert_eq!(Opcode::try_from(99u8).ok(), Some(Opcode::Halt));
    assert!(Opcode::try_from(10u8).is_err());
    assert!(Opcode::try_from(0u8).is_err());
  }

  #[test]
  fn opcode_mnemonics() {
    assert_eq!(Opcode::JumpIfFalse.to_string(), "jz");
    assert_eq!(Opcode::from_str("mul").ok(), Some(Opcode::Multiply));
    assert_eq!(Opcode::Halt.to_string(), "halt");
  }

  #[test]
  fn widths_follow_arity() {
    assert_eq!(Opcode::Add.width(), 4);
    assert_eq!(Opcode::Input.width(), 2);
    assert_eq!(Opcode::JumpIfTrue.width(), 3);
    assert_eq!(Opcode::Halt.width(), 1);
    assert_eq!(Opcode::Output.write_slot(), None);
    assert_eq!(Opcode::Equals.write_slot(), Some(3));
  }
}
