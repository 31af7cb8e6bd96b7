use palc::Parser;
use smython::cli::*;

fn main() {
	let cli = Cli::parse();
	let smython = smython::Smython::new();
	if let Some(dir) = cli.modules {
		smython.set_module_dir(dir);
	}

	match cli.mode {
		Mode::File { path } => {
			if let Err(e) = smython.run_file(&path) {
				eprintln!("{e}");
				std::process::exit(1);
			}
		}
		Mode::Repl => smython.run_prompt(),
		Mode::Check { dir } => match smython.check_dir(&dir) {
			Ok(checked) => println!("checked {checked} files"),
			Err(e) => {
				eprintln!("{e}");
				std::process::exit(1);
			}
		},
	}
}
