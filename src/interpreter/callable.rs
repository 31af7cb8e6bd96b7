use std::{fmt::Debug, rc::Rc};

use crate::{environment::Frame, error::interpreter::Unwind, interpreter::value::Value, statement::FunctionDef};

/// A closure: the shared definition plus the frame it was defined in. Calls
/// chain a fresh frame to `frame`, and default expressions evaluate there
/// too.
pub struct FunctionValue {
	pub def:   Rc<FunctionDef>,
	pub frame: Frame,
}

/// A bound method: attribute access on an instance pairs the receiver with
/// the class-stored function; calling it prepends the receiver.
pub struct MethodValue {
	pub receiver: Value,
	pub function: Rc<FunctionValue>,
}

pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, Unwind>>;

/// A builtin: a name and a host closure.
pub struct BuiltinValue {
	pub name: &'static str,
	pub func: NativeFn,
}

impl BuiltinValue {
	pub fn new(name: &'static str, func: impl Fn(&[Value]) -> Result<Value, Unwind> + 'static) -> Value {
		Value::Builtin(Rc::new(Self { name, func: Rc::new(func) }))
	}
}

impl Debug for BuiltinValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BuiltinValue").field("name", &self.name).finish_non_exhaustive()
	}
}
