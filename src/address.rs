//! An `Address` is a validated index into the computer's memory, with some convenience
//! functions. Every value the program uses as a pointer passes through `Address::try_from`,
//! which is the single place negative indices are rejected.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::ops::Add;

use crate::bytecode::Word;
use crate::error::VmError;

// `AddressNumberType` is `usize`, as it is naturally an index into a memory store.
pub type AddressNumberType = usize;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Address(pub AddressNumberType);

impl Address {
  /// Converts the address to an index into the memory vector.
  pub fn idx(&self) -> AddressNumberType {
    self.0
  }
}

impl TryFrom<Word> for Address {
  type Error = VmError;

  fn try_from(value: Word) -> Result<Address, VmError> {
    if value < 0 {
      return Err(VmError::NegativeMemoryIndex(value));
    }
    Ok(Address(value as AddressNumberType))
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "MEM[{}]", self.0)
  }
}

// Increment an address
impl Add<AddressNumberType> for Address {
  type Output = Address;
  fn add(self, rhs: AddressNumberType) -> Address {
    Address(self.0 + rhs)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn converts_non_negative_words() {
    assert_eq!(Address::try_from(0i64), Ok(Address(0)));
    assert_eq!(Address::try_from(1234i64), Ok(Address(1234)));
  }

  #[test]
  fn rejects_negative_words() {
    assert_eq!(Address::try_from(-1i64), Err(VmError::NegativeMemoryIndex(-1)));
  }

  #[test]
  fn increments_and_displays() {
    let address = Address(7) + 3;
    assert_eq!(address.idx(), 10);
    assert_eq!(address.to_string(), "MEM[10]");
  }
}
