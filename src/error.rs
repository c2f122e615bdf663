//! Error types for the computer and the program loader.

use thiserror::Error;

use crate::address::Address;
use crate::bytecode::Word;

/// Fatal conditions that abort a run. Running out of input is not among them; that is the
/// normal suspension path and is reported through `RunOutcome::AwaitingInput`.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum VmError {
  /// A parameter mode digit other than 0, 1, or 2.
  #[error("invalid addressing mode {mode} in instruction at {address}")]
  InvalidAddressingMode { mode: Word, address: Address },

  /// An instruction tried to store through an immediate mode parameter.
  #[error("instruction at {address} writes through an immediate mode parameter")]
  InvalidWriteTarget { address: Address },

  #[error("unknown opcode {opcode} at {address}")]
  UnknownOpcode { opcode: Word, address: Address },

  #[error("memory index {0} is negative")]
  NegativeMemoryIndex(Word),

  /// Growing memory to cover the address failed: the allocation is larger than the host
  /// can provide.
  #[error("cannot grow memory to reach {0}")]
  MemoryExhausted(Address),

  /// `run` was called on a computer that already executed a halt instruction.
  #[error("the computer has halted and cannot run again")]
  AlreadyHalted,
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum LoadError {
  #[error("program text contains no values")]
  Empty,

  /// `offset` is the byte position in the text where parsing stopped.
  #[error("malformed program text at byte {offset}: expected a signed integer near `{near}`")]
  Syntax { offset: usize, near: String },
}
