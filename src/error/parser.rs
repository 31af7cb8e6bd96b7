/// Errors that can occur during parsing.
#[derive(thiserror::Error, Debug)]
pub enum ParserError {
	/// Internal interpreter error, should never happen
	#[error("{0}")]
	InternalError(#[from] anyhow::Error),
	/// Errors encountered during parsing
	#[error(transparent)]
	ParseError(#[from] ParseError),
}

/// A specific parsing error with line number and type.
#[derive(thiserror::Error, Debug)]
#[error("SyntaxError: {kind} at line {line}")]
pub struct ParseError {
	/// The line number where the error occurred.
	line: usize,
	/// The type of parsing error.
	kind: ParseErrorType,
}

impl ParseError {
	pub fn new(line: usize, kind: ParseErrorType) -> Self { Self { line, kind } }
}

/// Types of parsing errors.
#[derive(Debug)]
pub enum ParseErrorType {
	/// The token stream did not continue the way the grammar requires.
	Expected { expected: String, found: String },
	/// A parameter without a default follows one with a default.
	NonDefaultAfterDefault,
	/// A `*` parameter that is not the last parameter.
	StarParamNotLast,
	/// The left side of an assignment does not denote a storage location.
	NotAssignable,
}

impl std::fmt::Display for ParseErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ParseErrorType::*;
		match self {
			Expected { expected, found } => write!(f, "expected {expected} but found {found}"),
			NonDefaultAfterDefault => {
				write!(f, "parameter without a default follows parameter with a default")
			}
			StarParamNotLast => write!(f, "parameter after * parameter"),
			NotAssignable => write!(f, "cannot assign to this expression"),
		}
	}
}
