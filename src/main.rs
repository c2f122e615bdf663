#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

mod address;
mod arcade;
mod bytecode;
mod computer;
mod error;
mod loader;
mod logger;
mod memory;

use std::env;
use std::error::Error;
use std::fs;
use std::process;

static DEFAULT_PROGRAM_PATH: &str = "inputs/13";

fn main() {
  if let Err(e) = logger::init() {
    eprintln!("Error: could not install the logger: {}", e);
  }

  #[cfg(feature = "trace_computation")]
  eprintln!("Computation Tracing ENABLED");

  let mut disassemble = false;
  let mut path: Option<String> = None;
  for arg in env::args().skip(1) {
    match arg.as_str() {
      "-d" | "--disassemble" => disassemble = true,
      _                      => path = Some(arg),
    }
  }
  let path = path.unwrap_or_else(|| DEFAULT_PROGRAM_PATH.to_string());

  if let Err(e) = run(&path, disassemble) {
    eprintln!("Error: {}", e);
    process::exit(1);
  }
}

fn run(path: &str, disassemble: bool) -> Result<(), Box<dyn Error>> {
  let text =
    fs::read_to_string(path)
      .map_err(|e| format!("could not read {}: {}", path, e))?;
  let program = loader::parse_program(&text)?;
  log::info!("Loaded {} words from {}", program.len(), path);

  if disassemble {
    print!("{}", bytecode::disassemble(&program));
    return Ok(());
  }

  println!("{}", arcade::count_blocks(&program)?);
  println!("{}", arcade::play(&program)?);
  Ok(())
}
