use std::{fs::read_to_string, io::Write, path::{Path, PathBuf}};

use anyhow::Context;

use crate::{SmythonError, interpreter::{Interpreter, value::Value}};

/// The embedding surface: one runtime with persistent globals, driven by
/// `execute`/`import`, plus the file and prompt front ends.
#[derive(Default)]
pub struct Smython {
	interpreter: Interpreter,
}

impl Smython {
	pub fn new() -> Self { Self::default() }

	/// Directory searched for `<name>.py` when a script imports by name.
	pub fn set_module_dir(&self, dir: PathBuf) { self.interpreter.set_module_dir(dir); }

	/// Run a script in the runtime's globals and return the value of its
	/// last statement.
	pub fn execute(&self, source: &str) -> Result<Value, SmythonError> { self.interpreter.execute(source) }

	/// Return the named module, or `None` when no such module exists.
	pub fn import(&self, name: &str) -> Result<Option<Value>, SmythonError> {
		self.interpreter.import(name)
	}

	pub fn run_file(&self, path: &Path) -> Result<(), SmythonError> {
		let source = read_to_string(path)
			.with_context(|| format!("Failed to open source file {}", path.display()))?;
		self.execute(&source)?;
		Ok(())
	}

	/// Parse every `.py` file directly inside `dir`, reporting the first
	/// syntax error; returns how many files were checked.
	pub fn check_dir(&self, dir: &Path) -> Result<usize, SmythonError> {
		let entries = std::fs::read_dir(dir)
			.with_context(|| format!("Failed to read directory {}", dir.display()))?;
		let mut checked = 0;
		for entry in entries {
			let path = entry.context("Failed to read directory entry")?.path();
			if path.extension().is_none_or(|ext| ext != "py") {
				continue;
			}
			let source = read_to_string(&path)
				.with_context(|| format!("Failed to open source file {}", path.display()))?;
			self.interpreter.check(&source)?;
			checked += 1;
		}
		Ok(checked)
	}

	/// Read-eval-print loop. A line opening a block (ending in `:`) keeps
	/// reading continuation lines until a blank line closes it.
	pub fn run_prompt(&self) {
		let stdin = std::io::stdin();
		let mut line = String::new();
		loop {
			print!(">>> ");
			if let Err(e) = std::io::stdout().flush() {
				eprintln!("Failed flush: {e}");
			}
			line.clear();
			match stdin.read_line(&mut line) {
				Ok(0) => {
					println!();
					break;
				}
				Ok(_) => {}
				Err(e) => {
					eprintln!("Failed read line: {e}");
					continue;
				}
			}
			let mut source = line.clone();
			if line.trim_end().ends_with(':') {
				loop {
					print!("... ");
					if let Err(e) = std::io::stdout().flush() {
						eprintln!("Failed flush: {e}");
					}
					line.clear();
					match stdin.read_line(&mut line) {
						Ok(0) => break,
						Ok(_) if line.trim().is_empty() => break,
						Ok(_) => source.push_str(&line),
						Err(e) => {
							eprintln!("Failed read line: {e}");
							break;
						}
					}
				}
			}
			if source.trim().is_empty() {
				continue;
			}
			match self.execute(&source) {
				Ok(Value::None) => {}
				Ok(value) => println!("{}", value.repr()),
				Err(e) => eprintln!("{e}"),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn execute_returns_last_value() {
		let smython = Smython::new();
		let value = smython.execute("a = 20\na + 1").unwrap();
		assert_eq!(value.repr(), "21");
	}

	#[test]
	fn globals_survive_between_executes() {
		let smython = Smython::new();
		smython.execute("greeting = 'hi'").unwrap();
		assert_eq!(smython.execute("greeting").unwrap().repr(), "'hi'");
	}

	#[test]
	fn import_misses_are_none() {
		let smython = Smython::new();
		assert!(smython.import("nosuch").unwrap().is_none());
		assert!(smython.import("sys").unwrap().is_some());
	}

	#[test]
	fn execute_surfaces_errors() {
		let smython = Smython::new();
		let error = smython.execute("if 1\n").unwrap_err();
		assert_eq!(error.to_string(), "SyntaxError: expected : but found NEWLINE at line 1");
		let error = smython.execute("missing").unwrap_err();
		assert_eq!(error.to_string(), "NameError: name 'missing' is not defined");
	}
}
