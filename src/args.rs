mod types;
pub mod validation;

pub use types::{AddArgs, Args, Command};

use clap::Parser;

#[must_use]
pub fn args_checks() -> Args {
    Args::parse()
}
