pub mod interpreter;
pub mod parser;
pub mod scanner;

use parser::{ParseError, ParserError};
use scanner::ScanError;

/// SmythonError is the top-level error type for the interpreter.
#[derive(thiserror::Error, Debug)]
pub enum SmythonError {
	/// Internal interpreter error, should never happen
	#[error("InternalError: {0}")]
	InternalError(#[from] anyhow::Error),
	#[error(transparent)]
	ScanError(#[from] ScanError),
	#[error(transparent)]
	ParseError(#[from] ParseError),
	/// An exception that escaped the program, already formatted as `Kind: message`
	#[error("{0}")]
	Uncaught(String),
}

impl From<ParserError> for SmythonError {
	fn from(error: ParserError) -> Self {
		match error {
			ParserError::InternalError(e) => SmythonError::InternalError(e),
			ParserError::ParseError(e) => SmythonError::ParseError(e),
		}
	}
}
