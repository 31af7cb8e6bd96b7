/// A tokenizer error with the line it occurred on.
#[derive(thiserror::Error, Debug)]
#[error("SyntaxError: {kind} at line {line}")]
pub struct ScanError {
	line: usize,
	kind: ScanErrorType,
}

impl ScanError {
	pub fn new(line: usize, kind: ScanErrorType) -> Self { Self { line, kind } }
}

#[derive(Debug)]
pub enum ScanErrorType {
	/// Indentation must be spaces; a tab in leading whitespace is rejected.
	TabIndent,
	/// Leading whitespace that is not a multiple of four spaces.
	BadIndent(usize),
	UnterminatedString,
	UnexpectedCharacter(char),
}

impl std::fmt::Display for ScanErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ScanErrorType::*;
		match self {
			TabIndent => write!(f, "tab in indentation"),
			BadIndent(spaces) => {
				write!(f, "indentation of {spaces} spaces is not a multiple of four")
			}
			UnterminatedString => write!(f, "unterminated string literal"),
			UnexpectedCharacter(c) => write!(f, "unexpected character '{c}'"),
		}
	}
}
