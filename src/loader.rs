/*!

This module parses program text into the initial contents of memory.

Program text is a comma-delineated list of signed decimal integers:

  1,9,10,3,2,3,11,0,99,30,40,50

Whitespace around values and commas is ignored, which lets us accept files that end in a
newline. An integer may carry a leading `+` or `-`. Anything else is an error that reports
the byte offset where parsing stopped.

*/

use nom::{
  character::complete::{char as one_char, digit1, multispace0, one_of},
  combinator::{all_consuming, map_res, opt, recognize},
  multi::separated_nonempty_list,
  sequence::{delimited, pair},
  IResult,
};

use crate::bytecode::Word;
use crate::error::LoadError;

// How much of the unparsed text to quote in an error message.
static ERROR_CONTEXT_CHARS: usize = 16;

fn word(text: &str) -> IResult<&str, Word> {
  map_res(
    recognize(pair(opt(one_of("+-")), digit1)),
    |digits: &str| digits.parse::<Word>(),
  )(text)
}

fn program(text: &str) -> IResult<&str, Vec<Word>> {
  all_consuming(
    delimited(
      multispace0,
      separated_nonempty_list(
        delimited(multispace0, one_char(','), multispace0),
        word,
      ),
      multispace0,
    )
  )(text)
}

pub fn parse_program(text: &str) -> Result<Vec<Word>, LoadError> {
  if text.trim().is_empty() {
    return Err(LoadError::Empty);
  }

  match program(text) {
    Ok((_rest, words)) => Ok(words),

    | Err(nom::Err::Error((rest, _kind)))
    | Err(nom::Err::Failure((rest, _kind))) => {
      Err(LoadError::Syntax {
        offset: text.len() - rest.len(),
        near: rest.chars().take(ERROR_CONTEXT_CHARS).collect(),
      })
    }

    Err(nom::Err::Incomplete(_)) => {
      Err(LoadError::Syntax { offset: text.len(), near: String::new() })
    }
  }
}
