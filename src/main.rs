#![warn(clippy::pedantic, clippy::cargo, clippy::nursery)]
use std::error::Error;

use todotrack::cli;

fn main() -> Result<(), Box<dyn Error>> {
  env_logger::init();
  cli::cli()
}
