//! Shell completion generation for estab

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::Write;

use crate::cli::CliArgs;

/// Write the completion script for `shell` to `out`
pub fn generate_completion(shell: Shell, out: &mut dyn Write) {
    let mut cmd = CliArgs::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}
