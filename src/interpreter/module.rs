use std::{fmt::Display, rc::Rc};

use crate::{environment::Bindings, utils::RcCell};

/// A module: a name and the globals mapping its top level evaluated into.
/// `from m import *` merges this mapping into the importing frame.
pub struct ModuleValue {
	pub name:    Rc<str>,
	pub globals: RcCell<Bindings>,
}

impl ModuleValue {
	pub fn new(name: Rc<str>, globals: RcCell<Bindings>) -> Self { Self { name, globals } }
}

impl Display for ModuleValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "<module '{}'>", self.name)
	}
}
