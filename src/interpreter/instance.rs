use std::{fmt::Display, rc::Rc};

use crate::{environment::Bindings, interpreter::class::ClassValue, utils::RcCell};

/// An instance: a reference to its class and its own attribute dictionary.
/// Attribute reads fall back to the class chain (see `Value::get_attr`);
/// writes always land in the instance dictionary.
pub struct InstanceValue {
	pub class: Rc<ClassValue>,
	pub dict:  RcCell<Bindings>,
}

impl InstanceValue {
	pub fn new(class: Rc<ClassValue>) -> Self { Self { class, dict: RcCell::new(Bindings::new()) } }
}

impl Display for InstanceValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "<{} object>", self.class.name)
	}
}
