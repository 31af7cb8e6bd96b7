use std::path::PathBuf;

use palc::{Parser, Subcommand};

/// CLI arguments
#[derive(Parser)]
#[command(name = "smython", after_long_help = "A tree-walking interpreter for the Smython language.")]
pub struct Cli {
	/// Directory searched for `<name>.py` modules on import
	#[arg(long)]
	pub modules: Option<PathBuf>,

	/// Program mode
	#[command(subcommand)]
	pub mode: Mode,
}

/// Program mode
#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Run a script file
	File { path: PathBuf },
	/// Interactive prompt
	Repl,
	/// Parse every .py file in a directory without running it
	Check { dir: PathBuf },
}
