//! Structures and functions for the Intcode computer: memory, the instruction pointer, the
//! relative base, and the fetch-decode-execute loop that drives them.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use log::{debug, log_enabled, trace, Level};
use prettytable::{format as TableFormat, Table};

use crate::address::Address;
use crate::bytecode::{Instruction, Opcode, ParameterMode, Word};
use crate::error::VmError;
use crate::memory::Memory;

// Number of memory cells shown on either side of the instruction pointer by `Display`.
static DISPLAY_WINDOW: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
  Running,
  AwaitingInput,
  Halted,
}

impl Display for State {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      State::Running => write!(f, "Running"),
      State::AwaitingInput => write!(f, "Awaiting input"),
      State::Halted => write!(f, "Halted"),
    }
  }
}

/// Why a call to `Computer::run` returned, together with everything the program output
/// during that call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RunOutcome {
  /// The program reached an input instruction with no input left. Calling `run` again
  /// resumes at that same instruction.
  AwaitingInput { outputs: Vec<Word> },
  /// The program executed a halt instruction.
  Halted { outputs: Vec<Word> },
}

impl RunOutcome {
  pub fn outputs(&self) -> &[Word] {
    match self {
      | RunOutcome::AwaitingInput { outputs }
      | RunOutcome::Halted { outputs } => outputs,
    }
  }

  pub fn is_halted(&self) -> bool {
    match self {
      RunOutcome::Halted { .. } => true,
      _ => false,
    }
  }
}

pub struct Computer {
  // Memory Store
  memory: Memory, // Shared by code and data

  // Registers //
  ip            : Address, // Instruction Pointer
  relative_base : Word,    // Offset for relative mode parameters

  state: State,
}

impl Computer {

  // region Display methods

  fn make_memory_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    let ip = self.ip.idx();
    let start = ip.saturating_sub(DISPLAY_WINDOW);
    let end = (ip + DISPLAY_WINDOW + 1).min(self.memory.len().max(ip + 1));

    for idx in start..end {
      let cell = self.memory.peek(Address(idx));
      match idx == ip {

        true  => {
          table.add_row(row![r->format!("* --> MEM[{}] =", idx), format!("{}", cell)]);
        }

        false => {
          table.add_row(row![r->format!("MEM[{}] =", idx), format!("{}", cell)]);
        }

      } // end match on highlight
    } // end for
    table
  }

  fn make_register_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);
    table.add_row(row![r->"IP =", format!("{}", self.ip.idx())]);
    table.add_row(row![r->"RB =", format!("{}", self.relative_base)]);
    table.add_row(row![r->"Memory =", format!("{} cells", self.memory.len())]);
    table
  }

  // endregion

  // region Low-level utility methods

  pub fn new(program: &[Word]) -> Computer {
    Computer {
      memory        : Memory::new(program),
      ip            : Address(0),
      relative_base : 0,
      state         : State::Running,
    }
  }

  pub fn is_halted(&self) -> bool {
    self.state == State::Halted
  }

  /// Writes directly into memory, bypassing the program. Used to patch a program before its
  /// first run, e.g. to put the arcade cabinet into free play.
  pub fn poke(&mut self, address: Address, value: Word) -> Result<(), VmError> {
    self.memory.write(address, value)
  }

  // endregion

  // region Parameter resolution

  /// Resolves parameter `slot` of `instruction` to the value it denotes.
  fn read_parameter(&mut self, instruction: &Instruction, slot: usize) -> Result<Word, VmError> {
    let parameter = self.memory.read(self.ip + slot)?;
    match instruction.mode(slot) {

      ParameterMode::Position  => self.memory.read(Address::try_from(parameter)?),

      ParameterMode::Immediate => Ok(parameter),

      ParameterMode::Relative  => {
        let address = Address::try_from(self.relative_base.wrapping_add(parameter))?;
        self.memory.read(address)
      }

    }
  }

  /// Resolves parameter `slot` of `instruction` to the address it stores through.
  fn write_address(&mut self, instruction: &Instruction, slot: usize) -> Result<Address, VmError> {
    let parameter = self.memory.read(self.ip + slot)?;
    match instruction.mode(slot) {

      ParameterMode::Position  => Address::try_from(parameter),

      // `Instruction::decode` already refuses these.
      ParameterMode::Immediate => Err(VmError::InvalidWriteTarget { address: self.ip }),

      ParameterMode::Relative  => Address::try_from(self.relative_base.wrapping_add(parameter)),

    }
  }

  fn write_parameter(
    &mut self,
    instruction: &Instruction,
    slot: usize,
    value: Word
  ) -> Result<(), VmError> {
    let address = self.write_address(instruction, slot)?;
    self.memory.write(address, value)
  }

  // endregion

  // region Execution

  /**
    Runs the program until it halts or needs input it does not have, feeding it `inputs` in
    order. Returns everything the program output during this call.

    Memory, the instruction pointer, and the relative base persist between calls. A call that
    ends in `RunOutcome::AwaitingInput` leaves the instruction pointer on the input
    instruction, so the next call with fresh input picks up exactly where this one stopped.
    Calling `run` after the program halts is an error.
  */
  pub fn run<I>(&mut self, inputs: I) -> Result<RunOutcome, VmError>
    where I: IntoIterator<Item = Word>
  {
    if self.is_halted() {
      return Err(VmError::AlreadyHalted);
    }

    let mut inputs = inputs.into_iter();
    let mut outputs: Vec<Word> = Vec::new();
    self.state = State::Running;

    loop {
      let instruction = Instruction::decode(self.memory.read(self.ip)?, self.ip)?;

      #[cfg(feature = "trace_computation")]
        println!("{:>6}: {} rb={}", self.ip.idx(), instruction, self.relative_base);

      // `Some(target)` when the instruction jumps.
      let jump: Option<Address> =
        match instruction.opcode {

          Opcode::Add => {
            let value =
              self.read_parameter(&instruction, 1)?
                  .wrapping_add(self.read_parameter(&instruction, 2)?);
            self.write_parameter(&instruction, 3, value)?;
            None
          }

          Opcode::Multiply => {
            let value =
              self.read_parameter(&instruction, 1)?
                  .wrapping_mul(self.read_parameter(&instruction, 2)?);
            self.write_parameter(&instruction, 3, value)?;
            None
          }

          Opcode::Input => {
            match inputs.next() {

              Some(value) => {
                self.write_parameter(&instruction, 1, value)?;
                None
              }

              None => {
                // Leave `ip` on this instruction so the next call re-executes it.
                self.state = State::AwaitingInput;
                debug!(
                  "Suspended awaiting input at {} after {} outputs",
                  self.ip,
                  outputs.len()
                );
                if log_enabled!(Level::Trace) {
                  trace!("\n{}", self);
                }
                return Ok(RunOutcome::AwaitingInput { outputs });
              }

            }
          }

          Opcode::Output => {
            outputs.push(self.read_parameter(&instruction, 1)?);
            None
          }

          Opcode::JumpIfTrue => {
            match self.read_parameter(&instruction, 1)? != 0 {
              true  => Some(Address::try_from(self.read_parameter(&instruction, 2)?)?),
              false => None
            }
          }

          Opcode::JumpIfFalse => {
            match self.read_parameter(&instruction, 1)? == 0 {
              true  => Some(Address::try_from(self.read_parameter(&instruction, 2)?)?),
              false => None
            }
          }

          Opcode::LessThan => {
            let value = (self.read_parameter(&instruction, 1)? < self.read_parameter(&instruction, 2)?) as Word;
            self.write_parameter(&instruction, 3, value)?;
            None
          }

          Opcode::Equals => {
            let value = (self.read_parameter(&instruction, 1)? == self.read_parameter(&instruction, 2)?) as Word;
            self.write_parameter(&instruction, 3, value)?;
            None
          }

          Opcode::AdjustRelativeBase => {
            self.relative_base = self.relative_base.wrapping_add(self.read_parameter(&instruction, 1)?);
            None
          }

          Opcode::Halt => {
            self.state = State::Halted;
            debug!("Halted at {} after {} outputs", self.ip, outputs.len());
            if log_enabled!(Level::Trace) {
              trace!("\n{}", self);
            }
            return Ok(RunOutcome::Halted { outputs });
          }

        }; // end match on opcode

      self.ip = match jump {
        Some(target) => target,
        None         => self.ip + instruction.opcode.width(),
      };
    } // end loop
  }

  // endregion

}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Computer {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let m_table = self.make_memory_table();
    let r_table = self.make_register_table();

    let mut combined_table = table!([m_table, r_table]);

    combined_table.set_titles(row![ub->"Memory", ub->"Registers"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "State: {}\n{}", self.state, combined_table)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::loader::parse_program;

  fn computer(text: &str) -> Computer {
    Computer::new(&parse_program(text).unwrap())
  }

  /// Runs a fresh copy of `text` with `inputs` and returns its outputs.
  fn outputs(text: &str, inputs: Vec<Word>) -> Vec<Word> {
    computer(text).run(inputs).unwrap().outputs().to_vec()
  }

  static COMPARE_TO_EIGHT: &str = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
    1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,999,1105,1,46,1101,1000,1,20,4,20,\
    1105,1,46,98,99";

  #[test]
  fn position_mode_equals() {
    assert_eq!(outputs("3,9,8,9,10,9,4,9,99,-1,8", vec![8]), vec![1]);
    assert_eq!(outputs("3,9,8,9,10,9,4,9,99,-1,8", vec![5]), vec![0]);
  }

  #[test]
  fn position_mode_less_than() {
    assert_eq!(outputs("3,9,7,9,10,9,4,9,99,-1,8", vec![5]), vec![1]);
    assert_eq!(outputs("3,9,7,9,10,9,4,9,99,-1,8", vec![9]), vec![0]);
  }

  #[test]
  fn immediate_mode_comparisons() {
    assert_eq!(outputs("3,3,1108,-1,8,3,4,3,99", vec![8]), vec![1]);
    assert_eq!(outputs("3,3,1108,-1,8,3,4,3,99", vec![7]), vec![0]);
    assert_eq!(outputs("3,3,1107,-1,8,3,4,3,99", vec![3]), vec![1]);
    assert_eq!(outputs("3,3,1107,-1,8,3,4,3,99", vec![8]), vec![0]);
  }

  #[test]
  fn jumps() {
    assert_eq!(outputs("3,12,6,12,15,1,13,14,13,4,13,99,-1,0,1,9", vec![0]), vec![0]);
    assert_eq!(outputs("3,12,6,12,15,1,13,14,13,4,13,99,-1,0,1,9", vec![8]), vec![1]);
    assert_eq!(outputs("3,3,1105,-1,9,1101,0,0,12,4,12,99,1", vec![0]), vec![0]);
    assert_eq!(outputs("3,3,1105,-1,9,1101,0,0,12,4,12,99,1", vec![8]), vec![1]);
  }

  #[test]
  fn compare_to_eight() {
    assert_eq!(outputs(COMPARE_TO_EIGHT, vec![5]), vec![999]);
    assert_eq!(outputs(COMPARE_TO_EIGHT, vec![8]), vec![1000]);
    assert_eq!(outputs(COMPARE_TO_EIGHT, vec![10]), vec![1001]);
  }

  #[test]
  fn large_values() {
    assert_eq!(outputs("1102,34915192,34915192,7,4,7,99,0", vec![]), vec![1219070632396864]);
    assert_eq!(outputs("104,1125899906842624,99", vec![]), vec![1125899906842624]);
  }

  #[test]
  fn relative_mode_quine() {
    let text = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";
    let mut machine = computer(text);
    let outcome = machine.run(vec![]).unwrap();
    assert!(outcome.is_halted());
    assert_eq!(outcome.outputs(), parse_program(text).unwrap().as_slice());
    assert_eq!(machine.relative_base, 16);
  }

  #[test]
  fn suspends_without_input_and_resumes() {
    let text = "3,9,8,9,10,9,4,9,99,-1,8";
    let mut machine = computer(text);

    let outcome = machine.run(vec![]).unwrap();
    assert_eq!(outcome, RunOutcome::AwaitingInput { outputs: vec![] });
    assert_eq!(machine.state, State::AwaitingInput);
    assert_eq!(machine.ip, Address(0));

    let resumed = machine.run(vec![8]).unwrap();
    let single = computer(text).run(vec![8]).unwrap();
    assert_eq!(resumed, single);
    assert_eq!(resumed, RunOutcome::Halted { outputs: vec![1] });
    assert!(machine.is_halted());
  }

  #[test]
  fn outputs_do_not_carry_across_runs() {
    // out 7, in [20], out [20], halt
    let mut machine = computer("104,7,3,20,4,20,99");
    assert_eq!(machine.run(vec![]).unwrap(), RunOutcome::AwaitingInput { outputs: vec![7] });
    assert_eq!(machine.run(vec![3]).unwrap(), RunOutcome::Halted { outputs: vec![3] });
  }

  #[test]
  fn unused_inputs_are_dropped() {
    assert_eq!(outputs("3,9,8,9,10,9,4,9,99,-1,8", vec![8, 1, 2]), vec![1]);
  }

  #[test]
  fn running_after_halt_is_an_error() {
    let mut machine = computer("99");
    assert!(machine.run(vec![]).unwrap().is_halted());
    assert_eq!(machine.run(vec![]), Err(VmError::AlreadyHalted));
  }

  #[test]
  fn memory_grows_on_demand() {
    // Store 5 at 1000, copy it to 2000, output 2000 and untouched 3000.
    let mut machine = computer("1101,2,3,1000,1001,1000,0,2000,4,2000,4,3000,99");
    let outcome = machine.run(vec![]).unwrap();
    assert_eq!(outcome.outputs(), &[5, 5, 0]);
    assert_eq!(machine.memory.peek(Address(1000)), 5);
    assert_eq!(machine.memory.peek(Address(2000)), 5);
    assert!(machine.memory.len() > 3000);
  }

  #[test]
  fn parameters_round_trip_through_position_and_relative_modes() {
    let mut machine = Computer::new(&[0, 50, 50, 50]);
    machine.relative_base = 10;

    // The parameter cells hold 50, so position mode targets 50 and relative mode 60.
    // An add with every parameter in position mode, then in relative mode.
    for &word in &[1, 22201] {
      let instruction = Instruction::decode(word, Address(0)).unwrap();
      machine.write_parameter(&instruction, 1, 77).unwrap();
      assert_eq!(machine.read_parameter(&instruction, 1).unwrap(), 77);
      machine.write_parameter(&instruction, 3, -3).unwrap();
      assert_eq!(machine.read_parameter(&instruction, 2).unwrap(), -3);
    }
    assert_eq!(machine.memory.peek(Address(50)), -3);
    assert_eq!(machine.memory.peek(Address(60)), -3);
  }

  #[test]
  fn immediate_mode_is_not_a_write_target() {
    assert_eq!(
      computer("1101,1,2,3,99").run(vec![]).map(|_| ()),
      Ok(())
    );
    assert_eq!(
      computer("11101,1,2,3,99").run(vec![]),
      Err(VmError::InvalidWriteTarget { address: Address(0) })
    );
    assert_eq!(
      computer("103,3,99").run(vec![1]),
      Err(VmError::InvalidWriteTarget { address: Address(0) })
    );
    // The instruction is rejected when decoded, so it cannot suspend instead.
    assert_eq!(
      computer("103,3,99").run(vec![]),
      Err(VmError::InvalidWriteTarget { address: Address(0) })
    );
  }

  #[test]
  fn relative_mode_destinations_and_jump_targets() {
    // arb 50; add 15, 0 -> [rb+1]; in [rb+0]; out [50]; jt 1, [rb+1]; out -1; halt
    let text = "109,50,21101,15,0,1,203,0,4,50,2105,1,1,104,-1,99";

    let mut machine = computer(text);
    assert_eq!(machine.run(vec![42]).unwrap(), RunOutcome::Halted { outputs: vec![42] });
    assert_eq!(machine.memory.peek(Address(50)), 42);
    assert_eq!(machine.memory.peek(Address(51)), 15);

    let mut machine = computer(text);
    assert_eq!(machine.run(vec![]).unwrap(), RunOutcome::AwaitingInput { outputs: vec![] });
    assert_eq!(machine.ip, Address(6));
    assert_eq!(machine.relative_base, 50);
  }

  #[test]
  fn unreachable_addresses_are_fatal() {
    let far = Address(i64::MAX as usize);
    assert_eq!(
      Computer::new(&[4, i64::MAX, 99]).run(vec![]),
      Err(VmError::MemoryExhausted(far))
    );
    assert_eq!(
      Computer::new(&[1101, 1, 1, i64::MAX, 99]).run(vec![]),
      Err(VmError::MemoryExhausted(far))
    );
    assert_eq!(
      Computer::new(&[1105, 1, i64::MAX]).run(vec![]),
      Err(VmError::MemoryExhausted(far))
    );
  }

  #[test]
  fn fatal_decode_errors() {
    assert_eq!(
      computer("104,1,42").run(vec![]),
      Err(VmError::UnknownOpcode { opcode: 42, address: Address(2) })
    );
    assert_eq!(
      computer("304,1,99").run(vec![]),
      Err(VmError::InvalidAddressingMode { mode: 3, address: Address(0) })
    );
  }

  #[test]
  fn negative_addresses_are_rejected() {
    assert_eq!(computer("4,-1,99").run(vec![]), Err(VmError::NegativeMemoryIndex(-1)));
    assert_eq!(computer("204,-1,99").run(vec![]), Err(VmError::NegativeMemoryIndex(-1)));
    assert_eq!(computer("1105,1,-4").run(vec![]), Err(VmError::NegativeMemoryIndex(-4)));
  }

  #[test]
  fn poke_before_first_run() {
    let mut machine = computer("1,0,0,0,99");
    machine.poke(Address(0), 2).unwrap();
    assert!(machine.run(vec![]).unwrap().is_halted());
    // 2 * 2 stored back into address 0.
    assert_eq!(machine.memory.peek(Address(0)), 4);
    assert_eq!(
      machine.poke(Address(usize::MAX), 1),
      Err(VmError::MemoryExhausted(Address(usize::MAX)))
    );
  }

  #[test]
  fn displays_registers_and_memory() {
    let mut machine = computer("3,0,99");
    machine.run(vec![]).unwrap();
    let text = machine.to_string();
    assert!(text.starts_with("State: Awaiting input"));
    assert!(text.contains("* --> MEM[0] ="));
    assert!(text.contains("IP ="));
  }
}
