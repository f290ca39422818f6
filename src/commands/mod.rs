//! Driver commands (spec section 4.6). Adapted from the teacher's
//! `commands` module (`rd::commands::RdCommand`): a small trait so `main`
//! stays a thin "parse, construct, run, map error to exit code" shell.

pub mod inject_command;

use crate::error::Result;

pub trait InjectorCommand {
    fn run(&mut self) -> Result<()>;
}
