//! The evaluation environment. A frame is one link in the lexical chain:
//! locals, a parent link, and the globals/builtins maps shared by every
//! frame of one execution. At the top frame locals *is* the globals map,
//! which is what makes top-level assignment global assignment.
//!
//! There is no `nonlocal`: assignment writes to the first enclosing frame
//! that already has the name as a local, else it defines the name in the
//! current frame. That one rule is how closures mutate enclosing state.

use std::{cell::RefCell, collections::{HashMap, HashSet}, rc::Rc};

use crate::{error::interpreter::Unwind, interpreter::value::Value, utils::RcCell};

pub type Bindings = HashMap<Rc<str>, Value>;

#[derive(Clone)]
pub struct Frame {
	inner: Rc<FrameInner>,
}

struct FrameInner {
	parent:       Option<Frame>,
	locals:       RcCell<Bindings>,
	globals:      RcCell<Bindings>,
	builtins:     Rc<Bindings>,
	/// Names routed to globals by a `global` statement in this frame.
	global_names: RefCell<HashSet<Rc<str>>>,
}

impl Frame {
	/// The frame of a whole script or module; locals and globals are the
	/// same mapping.
	pub fn top(globals: RcCell<Bindings>, builtins: Rc<Bindings>) -> Self {
		Self {
			inner: Rc::new(FrameInner {
				parent: None,
				locals: globals.clone(),
				globals,
				builtins,
				global_names: RefCell::default(),
			}),
		}
	}

	/// A frame for one function call, chained to its defining frame.
	pub fn child(&self) -> Self { self.child_with_locals(RcCell::new(Bindings::new())) }

	/// A child frame with caller-provided locals; a class body evaluates
	/// with the class dictionary as its locals.
	pub fn child_with_locals(&self, locals: RcCell<Bindings>) -> Self {
		Self {
			inner: Rc::new(FrameInner {
				parent: Some(self.clone()),
				locals,
				globals: self.inner.globals.clone(),
				builtins: self.inner.builtins.clone(),
				global_names: RefCell::default(),
			}),
		}
	}

	/// Lookup order: locals, parent chain, globals, builtins.
	pub fn lookup(&self, name: &str) -> Result<Value, Unwind> {
		let mut frame = Some(self.clone());
		while let Some(current) = frame {
			if let Some(value) = current.inner.locals.borrow().get(name) {
				return Ok(value.clone());
			}
			frame = current.inner.parent.clone();
		}
		if let Some(value) = self.inner.globals.borrow().get(name) {
			return Ok(value.clone());
		}
		if let Some(value) = self.inner.builtins.get(name) {
			return Ok(value.clone());
		}
		Err(Unwind::name_error(name))
	}

	/// Assignment: a `global` name writes to globals; otherwise the first
	/// enclosing frame that already has the name as a local, otherwise here.
	pub fn set(&self, name: Rc<str>, value: Value) {
		if self.inner.global_names.borrow().contains(&*name) {
			self.inner.globals.borrow_mut().insert(name, value);
			return;
		}
		let mut frame = Some(self.clone());
		while let Some(current) = frame {
			if current.inner.locals.borrow().contains_key(&*name) {
				current.inner.locals.borrow_mut().insert(name, value);
				return;
			}
			frame = current.inner.parent.clone();
		}
		self.inner.locals.borrow_mut().insert(name, value);
	}

	/// Bind directly in this frame's locals, bypassing the enclosing-scope
	/// walk. Parameters, `def`, `class`, imports and `except ... as` bind
	/// this way.
	pub fn define(&self, name: Rc<str>, value: Value) {
		self.inner.locals.borrow_mut().insert(name, value);
	}

	pub fn declare_global(&self, name: Rc<str>) {
		self.inner.global_names.borrow_mut().insert(name);
	}

	pub fn globals(&self) -> RcCell<Bindings> { self.inner.globals.clone() }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn name(text: &str) -> Rc<str> { Rc::from(text) }

	fn top() -> Frame { Frame::top(RcCell::new(Bindings::new()), Rc::new(Bindings::new())) }

	#[test]
	fn top_level_assignment_is_global() {
		let frame = top();
		frame.set(name("a"), Value::Int(1));
		assert!(frame.globals().borrow().contains_key("a"));
		assert_eq!(frame.lookup("a").unwrap(), Value::Int(1));
	}

	#[test]
	fn missing_name_is_a_name_error() {
		let err = top().lookup("ghost").unwrap_err();
		assert_eq!(err.into_message(), "NameError: name 'ghost' is not defined");
	}

	#[test]
	fn assignment_writes_through_to_enclosing_local() {
		let outer = top().child();
		outer.define(name("x"), Value::Int(1));
		let inner = outer.child();
		inner.set(name("x"), Value::Int(2));
		assert_eq!(outer.lookup("x").unwrap(), Value::Int(2));
		assert!(!inner.globals().borrow().contains_key("x"));
	}

	#[test]
	fn fresh_name_defines_in_current_frame() {
		let outer = top().child();
		let inner = outer.child();
		inner.set(name("y"), Value::Int(3));
		assert_eq!(inner.lookup("y").unwrap(), Value::Int(3));
		assert!(outer.lookup("y").is_err());
	}

	#[test]
	fn global_declaration_routes_assignment_to_globals() {
		let frame = top();
		let call = frame.child();
		call.declare_global(name("counter"));
		call.set(name("counter"), Value::Int(7));
		assert_eq!(frame.lookup("counter").unwrap(), Value::Int(7));
	}

	#[test]
	fn builtins_are_read_only_fallback() {
		let mut builtins = Bindings::new();
		builtins.insert(name("answer"), Value::Int(42));
		let frame = Frame::top(RcCell::new(Bindings::new()), Rc::new(builtins));
		assert_eq!(frame.lookup("answer").unwrap(), Value::Int(42));
		frame.set(name("answer"), Value::Int(0));
		assert_eq!(frame.lookup("answer").unwrap(), Value::Int(0));
		let call = frame.child();
		assert_eq!(call.lookup("answer").unwrap(), Value::Int(0));
	}
}
