use std::{fmt::Display, rc::Rc};

use crate::{environment::Bindings, error::interpreter::Unwind, interpreter::value::Value, utils::RcCell};

/// A class: a name, an optional superclass, and a dictionary. The dictionary
/// is shared with the frame the class body evaluated in, so every top-level
/// binding of the body (including each `def`) is a class member.
pub struct ClassValue {
	pub name:       Rc<str>,
	pub superclass: Option<Rc<ClassValue>>,
	pub dict:       RcCell<Bindings>,
}

impl ClassValue {
	pub fn new(name: Rc<str>, superclass: Option<Rc<ClassValue>>) -> Self {
		Self { name, superclass, dict: RcCell::new(Bindings::new()) }
	}

	/// Walk the superclass chain for a member. Single inheritance keeps this
	/// a plain linear search.
	pub fn lookup(&self, name: &str) -> Option<Value> {
		if let Some(value) = self.dict.borrow().get(name) {
			return Some(value.clone());
		}
		self.superclass.as_ref().and_then(|superclass| superclass.lookup(name))
	}

	pub fn get_attr(&self, name: &str) -> Result<Value, Unwind> {
		match name {
			"__name__" => return Ok(Value::Str(self.name.clone())),
			"__superclass__" => {
				return Ok(match &self.superclass {
					Some(superclass) => Value::Class(superclass.clone()),
					None => Value::None,
				});
			}
			_ => {}
		}
		self.lookup(name).ok_or_else(|| {
			Unwind::attribute_error(&format!("type object '{}' has no attribute '{name}'", self.name))
		})
	}
}

impl Display for ClassValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "<class '{}'>", self.name)
	}
}
