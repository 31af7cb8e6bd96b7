use std::rc::Rc;

use crate::interpreter::value::Value;

/// Non-local control flow. The evaluator throws these and catches each kind
/// at exactly one statement boundary: `Break`/`Continue` at the enclosing
/// loop, `Return` at a function invocation, `Raise` at `try`.
///
/// Runtime errors are ordinary `Raise` signals carrying a `Kind: message`
/// string, so user code can catch them like any other raised value.
#[derive(Debug)]
pub enum Unwind {
	Break,
	Continue,
	Return(Value),
	Raise(Value),
}

impl Unwind {
	pub fn error(kind: &str, message: &str) -> Self {
		Unwind::Raise(Value::Str(Rc::from(format!("{kind}: {message}"))))
	}

	pub fn name_error(name: &str) -> Self {
		Self::error("NameError", &format!("name '{name}' is not defined"))
	}

	pub fn type_error(message: &str) -> Self { Self::error("TypeError", message) }

	pub fn attribute_error(message: &str) -> Self { Self::error("AttributeError", message) }

	pub fn index_error() -> Self { Self::error("IndexError", "index out of range") }

	pub fn value_error(message: &str) -> Self { Self::error("ValueError", message) }

	pub fn import_error(name: &str) -> Self {
		Self::error("ImportError", &format!("No module named '{name}'"))
	}

	pub fn unimplemented(what: &str) -> Self { Self::error("UnimplementedError", what) }

	/// The message shown when this signal escapes the outermost evaluation.
	pub fn into_message(self) -> String {
		match self {
			Unwind::Break => "SyntaxError: 'break' outside loop".to_string(),
			Unwind::Continue => "SyntaxError: 'continue' outside loop".to_string(),
			Unwind::Return(_) => "SyntaxError: 'return' outside function".to_string(),
			Unwind::Raise(value) => value.to_string(),
		}
	}
}
