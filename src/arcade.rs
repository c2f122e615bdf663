/*!
  The arcade cabinet: a breakout game whose logic runs entirely on the computer. The program
  draws by outputting `(x, y, tile)` triplets, reports the score as the special triplet
  `(-1, 0, score)`, and reads the joystick position (-1 left, 0 neutral, 1 right) whenever it
  wants to advance a frame.

  `Screen` keeps the drawn grid, the score, the positions of the ball and paddle, and the set
  of blocks still standing. `Arcade` couples a screen to a computer and plays the game by
  keeping the paddle under the ball.
*/

use std::collections::HashSet;
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use log::{debug, info};
use num_enum::TryFromPrimitive;
use strum_macros::Display as StrumDisplay;
use thiserror::Error;

use crate::address::Address;
use crate::bytecode::Word;
use crate::computer::{Computer, RunOutcome};
use crate::error::VmError;

// Writing this to memory[0] before the first run lets the game be played for free.
static FREE_PLAY: Word = 2;
// Each drawing instruction is an `(x, y, tile)` triplet.
static RECORD_LEN: usize = 3;
// Coordinates at or past this are rejected rather than allocated.
static MAX_SCREEN_SIDE: usize = 4096;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum GameError {
  #[error(transparent)]
  Vm(#[from] VmError),

  /// The program output a number of values that is not a multiple of three.
  #[error("output of {0} values does not divide into (x, y, tile) records")]
  IncompleteRecord(usize),

  #[error("unknown tile code {0}")]
  UnknownTile(Word),

  #[error("cannot draw at ({x}, {y})")]
  InvalidCoordinate { x: Word, y: Word },
}

#[derive(
StrumDisplay, TryFromPrimitive,
Clone,        Copy,             Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum Tile {
  Empty  = 0,
  Wall   = 1,
  Block  = 2,
  Paddle = 3,
  Ball   = 4,
}

impl Tile {
  pub fn glyph(&self) -> char {
    match self {
      Tile::Empty  => ' ',
      Tile::Wall   => '#',
      Tile::Block  => '+',
      Tile::Paddle => '-',
      Tile::Ball   => '*',
    }
  }

  /// Converts the third value of a drawing record into a tile.
  pub fn from_code(code: Word) -> Result<Tile, GameError> {
    u8::try_from(code)
      .ok()
      .and_then(|code| Tile::try_from_primitive(code).ok())
      .ok_or(GameError::UnknownTile(code))
  }
}

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Point {
  pub x: usize,
  pub y: usize,
}

impl Point {
  fn from_words(x: Word, y: Word) -> Result<Point, GameError> {
    match (usize::try_from(x), usize::try_from(y)) {
      (Ok(px), Ok(py)) if px < MAX_SCREEN_SIDE && py < MAX_SCREEN_SIDE => Ok(Point { x: px, y: py }),
      _ => Err(GameError::InvalidCoordinate { x, y }),
    }
  }
}

#[derive(Clone, Debug, Default)]
pub struct Screen {
  grid   : Vec<Vec<Tile>>, // Indexed `grid[y][x]`; every row is `width` long
  width  : usize,
  score  : Word,
  ball   : Option<Point>,
  paddle : Option<Point>,
  blocks : HashSet<Point>,
}

impl Screen {
  pub fn new() -> Screen {
    Screen::default()
  }

  /// Applies a batch of program output. The batch must consist of whole records.
  pub fn update(&mut self, outputs: &[Word]) -> Result<(), GameError> {
    if outputs.len() % RECORD_LEN != 0 {
      return Err(GameError::IncompleteRecord(outputs.len()));
    }

    for record in outputs.chunks(RECORD_LEN) {
      match (record[0], record[1], record[2]) {

        (-1, 0, score) => {
          debug!("Score: {}", score);
          self.score = score;
        }

        (x, y, code) => {
          let tile = Tile::from_code(code)?;
          self.draw(Point::from_words(x, y)?, tile);
        }

      }
    }
    Ok(())
  }

  /**
    Sets the tile at `point`, dynamically growing the grid if the point lies outside it, and
    keeps the block set and the ball and paddle positions in step with the grid.
  */
  fn draw(&mut self, point: Point, tile: Tile) {
    if point.x >= self.width {
      self.width = point.x + 1;
      for row in self.grid.iter_mut() {
        row.resize(self.width, Tile::Empty);
      }
    }
    if point.y >= self.grid.len() {
      self.grid.resize(point.y + 1, vec![Tile::Empty; self.width]);
    }

    self.grid[point.y][point.x] = tile;

    // A block only goes away when it is erased.
    match tile {
      Tile::Empty  => { self.blocks.remove(&point); }
      Tile::Block  => { self.blocks.insert(point); }
      Tile::Paddle => { self.paddle = Some(point); }
      Tile::Ball   => { self.ball = Some(point); }
      Tile::Wall   => {}
    }
  }

  pub fn blocks_remaining(&self) -> usize {
    self.blocks.len()
  }

  pub fn score(&self) -> Word {
    self.score
  }

  /// The joystick position that moves the paddle toward the ball: the sign of
  /// `ball.x - paddle.x`. Neutral until both have been drawn.
  pub fn joystick(&self) -> Word {
    match (self.ball, self.paddle) {
      (Some(ball), Some(paddle)) => (ball.x as Word - paddle.x as Word).signum(),
      _ => 0,
    }
  }
}

impl Display for Screen {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    for row in &self.grid {
      writeln!(f, "{}", row.iter().map(Tile::glyph).collect::<String>())?;
    }
    write!(f, "Score: {}", self.score)
  }
}

pub struct Arcade {
  computer: Computer,
  screen: Screen,
}

impl Arcade {
  pub fn new(program: &[Word]) -> Arcade {
    Arcade {
      computer: Computer::new(program),
      screen: Screen::new(),
    }
  }

  pub fn screen(&self) -> &Screen {
    &self.screen
  }

  /// Puts the cabinet into free play. Must happen before the first `step`.
  pub fn insert_quarters(&mut self) -> Result<(), GameError> {
    Ok(self.computer.poke(Address(0), FREE_PLAY)?)
  }

  /// Runs the program with the given joystick inputs and draws whatever it outputs.
  pub fn step(&mut self, inputs: Vec<Word>) -> Result<RunOutcome, GameError> {
    let outcome = self.computer.run(inputs)?;
    self.screen.update(outcome.outputs())?;
    Ok(outcome)
  }

  /**
    Plays until the program halts or every block is gone, steering the paddle toward the
    ball each frame. Returns the final score.
  */
  pub fn play(&mut self) -> Result<Word, GameError> {
    let mut outcome = self.step(Vec::new())?;
    info!("Game started with {} blocks", self.screen.blocks_remaining());

    while !outcome.is_halted() && self.screen.blocks_remaining() > 0 {
      let joystick = self.screen.joystick();
      outcome = self.step(vec![joystick])?;
    }

    debug!("Final screen:\n{}", self.screen);
    info!(
      "Game over with score {} and {} blocks left",
      self.screen.score(),
      self.screen.blocks_remaining()
    );
    Ok(self.screen.score())
  }
}

/// Counts the blocks on the screen the program draws before it first asks for input.
pub fn count_blocks(program: &[Word]) -> Result<usize, GameError> {
  let mut arcade = Arcade::new(program);
  arcade.step(Vec::new())?;
  Ok(arcade.screen().blocks_remaining())
}

/// Plays the game in free play and returns the final score.
pub fn play(program: &[Word]) -> Result<Word, GameError> {
  let mut arcade = Arcade::new(program);
  arcade.insert_quarters()?;
  arcade.play()
}
