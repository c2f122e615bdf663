//! The computer's single flat address space. Code and data share it, so programs are free to
//! modify their own instructions.

use crate::address::Address;
use crate::bytecode::Word;
use crate::error::VmError;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Memory {
  cells: Vec<Word>,
}

impl Memory {
  pub fn new(program: &[Word]) -> Memory {
    Memory {
      cells: program.to_vec(),
    }
  }

  /**
    Reads the cell at the given address, dynamically growing the memory with zeros if the
    address is larger than the max index of the vector.
  */
  pub fn read(&mut self, address: Address) -> Result<Word, VmError> {
    self.grow_to(address)?;
    Ok(self.cells[address.idx()])
  }

  /// Writes the cell at the given address, growing the memory as `read` does.
  pub fn write(&mut self, address: Address, value: Word) -> Result<(), VmError> {
    self.grow_to(address)?;
    self.cells[address.idx()] = value;
    Ok(())
  }

  /// Reads without growing. Cells past the end read as zero.
  pub fn peek(&self, address: Address) -> Word {
    self.cells.get(address.idx()).copied().unwrap_or(0)
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  // An address the host cannot back is `MemoryExhausted`.
  fn grow_to(&mut self, address: Address) -> Result<(), VmError> {
    if address.idx() < self.cells.len() {
      return Ok(());
    }
    let new_len = address.idx().checked_add(1).ok_or(VmError::MemoryExhausted(address))?;
    self
      .cells
      .try_reserve(new_len - self.cells.len())
      .map_err(|_| VmError::MemoryExhausted(address))?;
    self.cells.resize(new_len, 0);
    Ok(())
  }
}
