//! The runtime value model: a closed set of tagged variants with the
//! protocols every value answers — truthiness, printable forms, equality,
//! and (where it makes sense) numeric projection, length, iteration,
//! indexing, and attribute access.
//!
//! Every variant clones cheaply: composites and the identity-bearing kinds
//! are behind `Rc`. Equality is structural for scalars and containers and
//! identity for classes, instances, callables and modules. Cycles between
//! values (a class whose methods close over the frame defining the class)
//! are expected and simply never reclaimed.

use std::{fmt, rc::Rc};

use crate::{error::interpreter::Unwind, interpreter::{callable::{BuiltinValue, FunctionValue, MethodValue}, class::ClassValue, instance::InstanceValue, module::ModuleValue}, utils::RcCell};

#[derive(Clone)]
pub enum Value {
	None,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(Rc<str>),
	Tuple(Rc<Vec<Value>>),
	List(RcCell<Vec<Value>>),
	/// Insertion-ordered mapping; keys compare structurally.
	Dict(RcCell<Vec<(Value, Value)>>),
	Set(RcCell<Vec<Value>>),
	Class(Rc<ClassValue>),
	Instance(Rc<InstanceValue>),
	Function(Rc<FunctionValue>),
	Method(Rc<MethodValue>),
	Builtin(Rc<BuiltinValue>),
	Module(Rc<ModuleValue>),
}

impl Value {
	pub fn str(text: &str) -> Value { Value::Str(Rc::from(text)) }

	pub fn tuple(items: Vec<Value>) -> Value { Value::Tuple(Rc::new(items)) }

	pub fn list(items: Vec<Value>) -> Value { Value::List(RcCell::new(items)) }

	/// The kind name used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Value::None => "NoneType",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::Str(_) => "str",
			Value::Tuple(_) => "tuple",
			Value::List(_) => "list",
			Value::Dict(_) => "dict",
			Value::Set(_) => "set",
			Value::Class(_) => "class",
			Value::Instance(_) => "object",
			Value::Function(_) => "function",
			Value::Method(_) => "method",
			Value::Builtin(_) => "builtin",
			Value::Module(_) => "module",
		}
	}

	pub fn truthy(&self) -> bool {
		match self {
			Value::None => false,
			Value::Bool(b) => *b,
			Value::Int(n) => *n != 0,
			Value::Float(x) => *x != 0.0,
			Value::Str(s) => !s.is_empty(),
			Value::Tuple(items) => !items.is_empty(),
			Value::List(items) => !items.borrow().is_empty(),
			Value::Dict(pairs) => !pairs.borrow().is_empty(),
			Value::Set(items) => !items.borrow().is_empty(),
			_ => true,
		}
	}

	/// Numeric projection, defined for numbers and booleans.
	pub fn as_number(&self) -> Option<f64> {
		match self {
			Value::Bool(b) => Some(*b as i64 as f64),
			Value::Int(n) => Some(*n as f64),
			Value::Float(x) => Some(*x),
			_ => None,
		}
	}

	/// Integer projection, used by bitwise operators and indexing.
	pub fn as_int(&self) -> Result<i64, Unwind> {
		match self {
			Value::Bool(b) => Ok(*b as i64),
			Value::Int(n) => Ok(*n),
			Value::Float(x) if x.fract() == 0.0 => Ok(*x as i64),
			_ => Err(Unwind::type_error(&format!(
				"'{}' object cannot be interpreted as an integer",
				self.kind()
			))),
		}
	}

	pub fn len(&self) -> Option<usize> {
		match self {
			Value::Str(s) => Some(s.chars().count()),
			Value::Tuple(items) => Some(items.len()),
			Value::List(items) => Some(items.borrow().len()),
			Value::Dict(pairs) => Some(pairs.borrow().len()),
			Value::Set(items) => Some(items.borrow().len()),
			_ => None,
		}
	}

	/// Iterable projection: the elements a `for` loop visits. Strings yield
	/// one-character strings, dicts yield key/value 2-tuples.
	pub fn iterate(&self) -> Result<Vec<Value>, Unwind> {
		match self {
			Value::Str(s) => Ok(s.chars().map(|c| Value::Str(Rc::from(c.to_string().as_str()))).collect()),
			Value::Tuple(items) => Ok(items.as_ref().clone()),
			Value::List(items) => Ok(items.borrow().clone()),
			Value::Set(items) => Ok(items.borrow().clone()),
			Value::Dict(pairs) => Ok(pairs
				.borrow()
				.iter()
				.map(|(k, v)| Value::tuple(vec![k.clone(), v.clone()]))
				.collect()),
			_ => Err(Unwind::type_error(&format!("'{}' object is not iterable", self.kind()))),
		}
	}

	/// Membership for `in`: elements of sequences and sets, keys of dicts,
	/// substrings of strings.
	pub fn contains(&self, item: &Value) -> Result<bool, Unwind> {
		match self {
			Value::Tuple(items) => Ok(items.iter().any(|v| v == item)),
			Value::List(items) => Ok(items.borrow().iter().any(|v| v == item)),
			Value::Set(items) => Ok(items.borrow().iter().any(|v| v == item)),
			Value::Dict(pairs) => Ok(pairs.borrow().iter().any(|(k, _)| k == item)),
			Value::Str(s) => match item {
				Value::Str(needle) => Ok(s.contains(&**needle)),
				_ => Err(Unwind::type_error(&format!(
					"'in <string>' requires string as left operand, not {}",
					item.kind()
				))),
			},
			_ => Err(Unwind::type_error(&format!("argument of type '{}' is not iterable", self.kind()))),
		}
	}

	/// Identity for `is`: shared storage for the `Rc`-backed kinds,
	/// structural identity for scalars.
	pub fn is_identical(&self, other: &Value) -> bool {
		match (self, other) {
			(Value::None, Value::None) => true,
			(Value::Bool(l), Value::Bool(r)) => l == r,
			(Value::Int(l), Value::Int(r)) => l == r,
			(Value::Float(l), Value::Float(r)) => l == r,
			(Value::Str(l), Value::Str(r)) => Rc::ptr_eq(l, r) || l == r,
			(Value::Tuple(l), Value::Tuple(r)) => Rc::ptr_eq(l, r),
			(Value::List(l), Value::List(r)) => l.ptr_eq(r),
			(Value::Dict(l), Value::Dict(r)) => l.ptr_eq(r),
			(Value::Set(l), Value::Set(r)) => l.ptr_eq(r),
			(Value::Class(l), Value::Class(r)) => Rc::ptr_eq(l, r),
			(Value::Instance(l), Value::Instance(r)) => Rc::ptr_eq(l, r),
			(Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
			(Value::Method(l), Value::Method(r)) => Rc::ptr_eq(l, r),
			(Value::Builtin(l), Value::Builtin(r)) => Rc::ptr_eq(l, r),
			(Value::Module(l), Value::Module(r)) => Rc::ptr_eq(l, r),
			_ => false,
		}
	}

	pub fn add(&self, other: &Value) -> Result<Value, Unwind> {
		match (self, other) {
			(Value::Int(l), Value::Int(r)) => Ok(Value::Int(l + r)),
			(Value::Str(l), Value::Str(r)) => Ok(Value::str(&format!("{l}{r}"))),
			(Value::List(l), Value::List(r)) => {
				let mut items = l.borrow().clone();
				items.extend(r.borrow().iter().cloned());
				Ok(Value::list(items))
			}
			(Value::Tuple(l), Value::Tuple(r)) => {
				let mut items = l.as_ref().clone();
				items.extend(r.iter().cloned());
				Ok(Value::tuple(items))
			}
			_ => match (self.as_number(), other.as_number()) {
				(Some(l), Some(r)) => Ok(Value::Float(l + r)),
				_ => Err(self.operand_error("+", other)),
			},
		}
	}

	pub fn sub(&self, other: &Value) -> Result<Value, Unwind> {
		match (self, other) {
			(Value::Int(l), Value::Int(r)) => Ok(Value::Int(l - r)),
			_ => match (self.as_number(), other.as_number()) {
				(Some(l), Some(r)) => Ok(Value::Float(l - r)),
				_ => Err(self.operand_error("-", other)),
			},
		}
	}

	pub fn mul(&self, other: &Value) -> Result<Value, Unwind> {
		match (self, other) {
			(Value::Int(l), Value::Int(r)) => Ok(Value::Int(l * r)),
			(Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
				Ok(Value::str(&s.repeat((*n).max(0) as usize)))
			}
			(Value::List(l), Value::Int(n)) | (Value::Int(n), Value::List(l)) => {
				let items = l.borrow();
				let mut repeated = Vec::with_capacity(items.len() * (*n).max(0) as usize);
				for _ in 0..(*n).max(0) {
					repeated.extend(items.iter().cloned());
				}
				Ok(Value::list(repeated))
			}
			_ => match (self.as_number(), other.as_number()) {
				(Some(l), Some(r)) => Ok(Value::Float(l * r)),
				_ => Err(self.operand_error("*", other)),
			},
		}
	}

	/// Division always yields a float; a zero divisor follows host float
	/// semantics rather than raising.
	pub fn div(&self, other: &Value) -> Result<Value, Unwind> {
		match (self.as_number(), other.as_number()) {
			(Some(l), Some(r)) => Ok(Value::Float(l / r)),
			_ => Err(self.operand_error("/", other)),
		}
	}

	pub fn rem(&self, other: &Value) -> Result<Value, Unwind> {
		match (self, other) {
			(Value::Int(l), Value::Int(r)) if *r != 0 => Ok(Value::Int(l % r)),
			_ => match (self.as_number(), other.as_number()) {
				(Some(l), Some(r)) => Ok(Value::Float(l % r)),
				_ => Err(self.operand_error("%", other)),
			},
		}
	}

	pub fn bitor(&self, other: &Value) -> Result<Value, Unwind> {
		Ok(Value::Int(self.as_int()? | other.as_int()?))
	}

	pub fn bitand(&self, other: &Value) -> Result<Value, Unwind> {
		Ok(Value::Int(self.as_int()? & other.as_int()?))
	}

	pub fn neg(&self) -> Result<Value, Unwind> {
		match self {
			Value::Int(n) => Ok(Value::Int(-n)),
			Value::Float(x) => Ok(Value::Float(-x)),
			_ => Err(Unwind::type_error(&format!("bad operand type for unary -: '{}'", self.kind()))),
		}
	}

	pub fn pos(&self) -> Result<Value, Unwind> {
		match self {
			Value::Int(_) | Value::Float(_) => Ok(self.clone()),
			_ => Err(Unwind::type_error(&format!("bad operand type for unary +: '{}'", self.kind()))),
		}
	}

	/// Ordering uses the numeric projection; anything else refuses.
	pub fn number_pair(&self, other: &Value, op: &str) -> Result<(f64, f64), Unwind> {
		match (self.as_number(), other.as_number()) {
			(Some(l), Some(r)) => Ok((l, r)),
			_ => Err(Unwind::type_error(&format!(
				"'{op}' not supported between instances of '{}' and '{}'",
				self.kind(),
				other.kind()
			))),
		}
	}

	fn operand_error(&self, op: &str, other: &Value) -> Unwind {
		Unwind::type_error(&format!(
			"unsupported operand type(s) for {op}: '{}' and '{}'",
			self.kind(),
			other.kind()
		))
	}

	/// Subscription. Dicts answer `None` for a missing key; sequences accept
	/// integers (negative wraps) and slice 3-tuples.
	pub fn index(&self, index: &Value) -> Result<Value, Unwind> {
		match self {
			Value::Dict(pairs) => Ok(pairs
				.borrow()
				.iter()
				.find(|(k, _)| k == index)
				.map(|(_, v)| v.clone())
				.unwrap_or(Value::None)),
			Value::Str(_) | Value::Tuple(_) | Value::List(_) => match index {
				Value::Tuple(parts) if parts.len() == 3 => self.slice(&parts[0], &parts[1], &parts[2]),
				_ => self.element(index),
			},
			_ => Err(Unwind::type_error(&format!("'{}' object is not subscriptable", self.kind()))),
		}
	}

	fn element(&self, index: &Value) -> Result<Value, Unwind> {
		let len = self.len().unwrap_or(0) as i64;
		let mut i = match index {
			Value::Int(n) => *n,
			Value::Bool(b) => *b as i64,
			_ => {
				return Err(Unwind::type_error(&format!(
					"{} indices must be integers, not {}",
					self.kind(),
					index.kind()
				)));
			}
		};
		if i < 0 {
			i += len;
		}
		if i < 0 || i >= len {
			return Err(Unwind::index_error());
		}
		match self {
			Value::Str(s) => {
				let c = s.chars().nth(i as usize).ok_or_else(Unwind::index_error)?;
				Ok(Value::str(&c.to_string()))
			}
			Value::Tuple(items) => Ok(items[i as usize].clone()),
			Value::List(items) => Ok(items.borrow()[i as usize].clone()),
			_ => Err(Unwind::index_error()),
		}
	}

	/// Slice with the `(start, stop, step)` tuple the parser builds. Only a
	/// `None` step is supported; bounds wrap and clamp, and `start >= stop`
	/// is empty.
	fn slice(&self, start: &Value, stop: &Value, step: &Value) -> Result<Value, Unwind> {
		if !matches!(step, Value::None) {
			return Err(Unwind::unimplemented("slice step"));
		}
		let len = self.len().unwrap_or(0);
		let start = slice_bound(start, 0, len)?;
		let stop = slice_bound(stop, len, len)?;
		let (start, stop) = if start >= stop { (0, 0) } else { (start, stop) };
		match self {
			Value::Str(s) => Ok(Value::str(&s.chars().skip(start).take(stop - start).collect::<String>())),
			Value::Tuple(items) => Ok(Value::tuple(items[start..stop].to_vec())),
			Value::List(items) => Ok(Value::list(items.borrow()[start..stop].to_vec())),
			_ => Err(Unwind::type_error(&format!("'{}' object is not subscriptable", self.kind()))),
		}
	}

	/// Attribute access. Instances search their own dict and then the class
	/// chain, binding functions as methods; classes and modules expose their
	/// dictionaries directly.
	pub fn get_attr(&self, name: &str) -> Result<Value, Unwind> {
		match self {
			Value::Instance(instance) => {
				if let Some(value) = instance.dict.borrow().get(name) {
					return Ok(value.clone());
				}
				match instance.class.lookup(name) {
					Some(Value::Function(function)) => Ok(Value::Method(Rc::new(MethodValue {
						receiver: self.clone(),
						function,
					}))),
					Some(value) => Ok(value),
					None => Err(Unwind::attribute_error(&format!(
						"'{}' object has no attribute '{name}'",
						instance.class.name
					))),
				}
			}
			Value::Class(class) => class.get_attr(name),
			Value::Module(module) => module.globals.borrow().get(name).cloned().ok_or_else(|| {
				Unwind::attribute_error(&format!("module '{}' has no attribute '{name}'", module.name))
			}),
			_ => Err(Unwind::attribute_error(&format!(
				"'{}' object has no attribute '{name}'",
				self.kind()
			))),
		}
	}

	pub fn set_attr(&self, name: Rc<str>, value: Value) -> Result<(), Unwind> {
		match self {
			Value::Instance(instance) => {
				instance.dict.borrow_mut().insert(name, value);
				Ok(())
			}
			Value::Class(class) => {
				class.dict.borrow_mut().insert(name, value);
				Ok(())
			}
			Value::Module(module) => {
				module.globals.borrow_mut().insert(name, value);
				Ok(())
			}
			_ => Err(Unwind::attribute_error(&format!(
				"'{}' object has no attribute '{name}'",
				self.kind()
			))),
		}
	}

	/// The quoted, escape-encoded form used by the REPL and inside
	/// containers.
	pub fn repr(&self) -> String {
		match self {
			Value::Str(s) => quote(s),
			Value::Tuple(items) => match items.len() {
				0 => "()".to_string(),
				1 => format!("({},)", items[0].repr()),
				_ => format!("({})", join_reprs(items)),
			},
			Value::List(items) => format!("[{}]", join_reprs(&items.borrow())),
			Value::Set(items) => {
				let items = items.borrow();
				if items.is_empty() { "set()".to_string() } else { format!("{{{}}}", join_reprs(&items)) }
			}
			Value::Dict(pairs) => {
				let pairs = pairs.borrow();
				let body: Vec<String> =
					pairs.iter().map(|(k, v)| format!("{}: {}", k.repr(), v.repr())).collect();
				format!("{{{}}}", body.join(", "))
			}
			_ => self.to_string(),
		}
	}
}

fn join_reprs(items: &[Value]) -> String {
	items.iter().map(Value::repr).collect::<Vec<_>>().join(", ")
}

fn quote(s: &str) -> String {
	let mut out = String::with_capacity(s.len() + 2);
	out.push('\'');
	for c in s.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			'\'' => out.push_str("\\'"),
			'\n' => out.push_str("\\n"),
			_ => out.push(c),
		}
	}
	out.push('\'');
	out
}

/// Resolve one bound of a slice tuple: `None` means the default, negative
/// values wrap once, and everything clamps to the container.
pub(crate) fn slice_bound(bound: &Value, default: usize, len: usize) -> Result<usize, Unwind> {
	let i = match bound {
		Value::None => return Ok(default),
		_ => bound.as_int().map_err(|_| {
			Unwind::type_error(&format!("slice indices must be integers or None, not {}", bound.kind()))
		})?,
	};
	let wrapped = if i < 0 { i + len as i64 } else { i };
	Ok(wrapped.clamp(0, len as i64) as usize)
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::None, Value::None) => true,
			(Value::Bool(l), Value::Bool(r)) => l == r,
			(Value::Int(l), Value::Int(r)) => l == r,
			(Value::Float(l), Value::Float(r)) => l == r,
			(Value::Int(l), Value::Float(r)) | (Value::Float(r), Value::Int(l)) => *l as f64 == *r,
			(Value::Str(l), Value::Str(r)) => l == r,
			(Value::Tuple(l), Value::Tuple(r)) => l == r,
			(Value::List(l), Value::List(r)) => *l.borrow() == *r.borrow(),
			(Value::Set(l), Value::Set(r)) => {
				let (l, r) = (l.borrow(), r.borrow());
				l.len() == r.len() && l.iter().all(|v| r.contains(v))
			}
			(Value::Dict(l), Value::Dict(r)) => {
				let (l, r) = (l.borrow(), r.borrow());
				l.len() == r.len()
					&& l.iter().all(|(k, v)| r.iter().any(|(rk, rv)| rk == k && rv == v))
			}
			_ => self.is_identical(other),
		}
	}
}

/// The unquoted form: what `print` writes. Everything except a bare string
/// renders as its repr.
impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::None => write!(f, "None"),
			Value::Bool(true) => write!(f, "True"),
			Value::Bool(false) => write!(f, "False"),
			Value::Int(n) => write!(f, "{n}"),
			Value::Float(x) => write!(f, "{x:?}"),
			Value::Str(s) => write!(f, "{s}"),
			Value::Class(class) => write!(f, "<class '{}'>", class.name),
			Value::Instance(instance) => write!(f, "<{} object>", instance.class.name),
			Value::Function(function) => write!(f, "<function {}>", function.def.name),
			Value::Method(method) => write!(f, "<bound method {}>", method.function.def.name),
			Value::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name),
			Value::Module(module) => write!(f, "<module '{}'>", module.name),
			_ => write!(f, "{}", self.repr()),
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.repr()) }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn repr_forms() {
		assert_eq!(Value::None.repr(), "None");
		assert_eq!(Value::Bool(true).repr(), "True");
		assert_eq!(Value::Int(-3).repr(), "-3");
		assert_eq!(Value::Float(4.0).repr(), "4.0");
		assert_eq!(Value::Float(4.8).repr(), "4.8");
		assert_eq!(Value::str("it's\n").repr(), "'it\\'s\\n'");
		assert_eq!(Value::tuple(vec![]).repr(), "()");
		assert_eq!(Value::tuple(vec![Value::Int(3)]).repr(), "(3,)");
		assert_eq!(Value::list(vec![Value::Int(1), Value::str("a")]).repr(), "[1, 'a']");
	}

	#[test]
	fn display_strings_are_raw() {
		assert_eq!(Value::str("hi").to_string(), "hi");
		assert_eq!(Value::list(vec![Value::str("hi")]).to_string(), "['hi']");
	}

	#[test]
	fn truthiness() {
		assert!(!Value::None.truthy());
		assert!(!Value::Int(0).truthy());
		assert!(!Value::str("").truthy());
		assert!(!Value::list(vec![]).truthy());
		assert!(Value::Float(0.5).truthy());
		assert!(Value::str("x").truthy());
	}

	#[test]
	fn equality_is_structural_for_scalars_and_containers() {
		assert_eq!(Value::Int(1), Value::Float(1.0));
		assert_eq!(Value::list(vec![Value::Int(1)]), Value::list(vec![Value::Int(1)]));
		assert_ne!(Value::Int(1), Value::str("1"));
	}

	#[test]
	fn arithmetic_kinds() {
		assert_eq!(Value::Int(2).mul(&Value::Int(3)).unwrap(), Value::Int(6));
		assert_eq!(Value::Int(9).div(&Value::Int(3)).unwrap().repr(), "3.0");
		assert_eq!(Value::Int(17).rem(&Value::Int(7)).unwrap(), Value::Int(3));
		assert_eq!(Value::Int(192).bitand(&Value::Int(224)).unwrap(), Value::Int(192));
		assert_eq!(Value::str("ab").add(&Value::str("cd")).unwrap(), Value::str("abcd"));
		assert!(Value::str("a").add(&Value::Int(1)).is_err());
	}

	#[test]
	fn indexing_wraps_and_bounds() {
		let list = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
		assert_eq!(list.index(&Value::Int(-1)).unwrap(), Value::Int(3));
		let err = list.index(&Value::Int(3)).unwrap_err();
		assert_eq!(err.into_message(), "IndexError: index out of range");
		let err = Value::str("").index(&Value::Int(-2)).unwrap_err();
		assert_eq!(err.into_message(), "IndexError: index out of range");
	}

	#[test]
	fn slicing_clamps_and_preserves_kind() {
		let abcdef = Value::str("abcdef");
		let index = Value::tuple(vec![Value::Int(1), Value::Int(-1), Value::None]);
		assert_eq!(abcdef.index(&index).unwrap(), Value::str("bcde"));
		let whole = Value::tuple(vec![Value::None, Value::None, Value::None]);
		let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
		assert_eq!(list.index(&whole).unwrap(), list);
		let empty = Value::tuple(vec![Value::Int(5), Value::Int(2), Value::None]);
		assert_eq!(list.index(&empty).unwrap(), Value::list(vec![]));
		let stepped = Value::tuple(vec![Value::None, Value::None, Value::Int(2)]);
		assert_eq!(
			list.index(&stepped).unwrap_err().into_message(),
			"UnimplementedError: slice step"
		);
	}

	#[test]
	fn dict_index_misses_are_none() {
		let dict = Value::Dict(RcCell::new(vec![(Value::str("a"), Value::Int(3))]));
		assert_eq!(dict.index(&Value::str("a")).unwrap(), Value::Int(3));
		assert_eq!(dict.index(&Value::str("b")).unwrap(), Value::None);
	}

	#[test]
	fn containment() {
		let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
		assert!(list.contains(&Value::Int(2)).unwrap());
		assert!(!list.contains(&Value::Int(3)).unwrap());
		assert!(Value::str("abc").contains(&Value::str("bc")).unwrap());
		assert!(Value::Int(1).contains(&Value::Int(1)).is_err());
	}
}
