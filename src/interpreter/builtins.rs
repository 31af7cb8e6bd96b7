//! The builtin callables seeded into every runtime. Each one is a plain
//! host function wrapped in a `BuiltinValue`; none of them touch the
//! evaluator.

use crate::{environment::Bindings, error::interpreter::Unwind, interpreter::{callable::BuiltinValue, value::{Value, slice_bound}}, utils::Interner};

pub(crate) fn table(interner: &Interner) -> Bindings {
	let mut table = Bindings::new();
	let mut install = |name: &'static str, func: fn(&[Value]) -> Result<Value, Unwind>| {
		table.insert(interner.intern(name), BuiltinValue::new(name, func));
	};
	install("print", print);
	install("len", len);
	install("slice", slice);
	install("del", del);
	install("range", range);
	install("hasattr", hasattr);
	install("chr", chr);
	install("ord", ord);
	table
}

pub(crate) fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), Unwind> {
	if args.len() == expected {
		return Ok(());
	}
	Err(Unwind::type_error(&format!(
		"{name}() takes exactly {expected} arguments ({} given)",
		args.len()
	)))
}

/// Space-separated unquoted forms, then a newline, straight to stdout.
fn print(args: &[Value]) -> Result<Value, Unwind> {
	let parts: Vec<String> = args.iter().map(ToString::to_string).collect();
	println!("{}", parts.join(" "));
	Ok(Value::None)
}

fn len(args: &[Value]) -> Result<Value, Unwind> {
	arity("len", args, 1)?;
	match args[0].len() {
		Some(n) => Ok(Value::Int(n as i64)),
		None => Err(Unwind::type_error(&format!("object of type '{}' has no len()", args[0].kind()))),
	}
}

/// The 3-tuple the parser feeds back to subscription for `a[x:y:z]`.
fn slice(args: &[Value]) -> Result<Value, Unwind> {
	arity("slice", args, 3)?;
	Ok(Value::tuple(args.to_vec()))
}

/// Remove an index from a list, a key from a dict, or a slice range from a
/// list.
fn del(args: &[Value]) -> Result<Value, Unwind> {
	arity("del", args, 2)?;
	match (&args[0], &args[1]) {
		(Value::List(items), Value::Tuple(parts)) if parts.len() == 3 => {
			if !matches!(parts[2], Value::None) {
				return Err(Unwind::unimplemented("slice step"));
			}
			let len = items.borrow().len();
			let start = slice_bound(&parts[0], 0, len)?;
			let stop = slice_bound(&parts[1], len, len)?;
			if start < stop {
				items.borrow_mut().drain(start..stop);
			}
			Ok(Value::None)
		}
		(Value::List(items), index) => {
			let len = items.borrow().len() as i64;
			let mut i = index.as_int()?;
			if i < 0 {
				i += len;
			}
			if i < 0 || i >= len {
				return Err(Unwind::index_error());
			}
			items.borrow_mut().remove(i as usize);
			Ok(Value::None)
		}
		(Value::Dict(pairs), key) => {
			pairs.borrow_mut().retain(|(k, _)| k != key);
			Ok(Value::None)
		}
		(other, _) => {
			Err(Unwind::type_error(&format!("del() argument must be a list or dict, not '{}'", other.kind())))
		}
	}
}

fn range(args: &[Value]) -> Result<Value, Unwind> {
	let (start, stop, step) = match args {
		[stop] => (0, stop.as_int()?, 1),
		[start, stop] => (start.as_int()?, stop.as_int()?, 1),
		[start, stop, step] => (start.as_int()?, stop.as_int()?, step.as_int()?),
		_ => {
			return Err(Unwind::type_error(&format!("range() takes 1 to 3 arguments ({} given)", args.len())));
		}
	};
	if step == 0 {
		return Err(Unwind::value_error("range() arg 3 must not be zero"));
	}
	let mut items = Vec::new();
	let mut i = start;
	while if step > 0 { i < stop } else { i > stop } {
		items.push(Value::Int(i));
		i += step;
	}
	Ok(Value::list(items))
}

/// Key presence on dicts, attribute presence on modules, classes and
/// instances, index validity on lists.
fn hasattr(args: &[Value]) -> Result<Value, Unwind> {
	arity("hasattr", args, 2)?;
	match (&args[0], &args[1]) {
		(Value::Dict(pairs), key) => Ok(Value::Bool(pairs.borrow().iter().any(|(k, _)| k == key))),
		(Value::List(items), index) => {
			let len = items.borrow().len() as i64;
			let i = index.as_int()?;
			let i = if i < 0 { i + len } else { i };
			Ok(Value::Bool(i >= 0 && i < len))
		}
		(value @ (Value::Module(_) | Value::Class(_) | Value::Instance(_)), Value::Str(name)) => {
			Ok(Value::Bool(value.get_attr(name).is_ok()))
		}
		(Value::Module(_) | Value::Class(_) | Value::Instance(_), other) => {
			Err(Unwind::type_error(&format!("attribute name must be a string, not '{}'", other.kind())))
		}
		(other, _) => Err(Unwind::type_error(&format!(
			"hasattr() argument must be a list, dict, module, class, or object, not '{}'",
			other.kind()
		))),
	}
}

fn chr(args: &[Value]) -> Result<Value, Unwind> {
	arity("chr", args, 1)?;
	let code = args[0].as_int()?;
	u32::try_from(code)
		.ok()
		.and_then(char::from_u32)
		.map(|c| Value::str(&c.to_string()))
		.ok_or_else(|| Unwind::value_error("chr() arg not in range(0x110000)"))
}

fn ord(args: &[Value]) -> Result<Value, Unwind> {
	arity("ord", args, 1)?;
	match &args[0] {
		Value::Str(s) => {
			let mut chars = s.chars();
			match (chars.next(), chars.next()) {
				(Some(c), None) => Ok(Value::Int(c as i64)),
				_ => Err(Unwind::type_error(&format!(
					"ord() expected a character, but string of length {} found",
					s.chars().count()
				))),
			}
		}
		other => {
			Err(Unwind::type_error(&format!("ord() expected string of length 1, but '{}' found", other.kind())))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::utils::RcCell;

	#[test]
	fn len_counts_characters_and_elements() {
		assert_eq!(len(&[Value::str("abc")]).unwrap(), Value::Int(3));
		assert_eq!(len(&[Value::tuple(vec![])]).unwrap(), Value::Int(0));
		let err = len(&[Value::Int(1)]).unwrap_err();
		assert_eq!(err.into_message(), "TypeError: object of type 'int' has no len()");
	}

	#[test]
	fn range_directions() {
		assert_eq!(range(&[Value::Int(3)]).unwrap().repr(), "[0, 1, 2]");
		assert_eq!(range(&[Value::Int(1), Value::Int(4)]).unwrap().repr(), "[1, 2, 3]");
		assert_eq!(range(&[Value::Int(6), Value::Int(0), Value::Int(-2)]).unwrap().repr(), "[6, 4, 2]");
		let err = range(&[Value::Int(1), Value::Int(2), Value::Int(0)]).unwrap_err();
		assert_eq!(err.into_message(), "ValueError: range() arg 3 must not be zero");
	}

	#[test]
	fn del_removes_indexes_keys_and_ranges() {
		let list = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
		del(&[list.clone(), Value::Int(-1)]).unwrap();
		assert_eq!(list.repr(), "[1, 2]");

		let dict = Value::Dict(RcCell::new(vec![(Value::Int(1), Value::Int(2))]));
		del(&[dict.clone(), Value::Int(1)]).unwrap();
		assert_eq!(dict.repr(), "{}");

		let list = Value::list((0..5).map(Value::Int).collect());
		let span = Value::tuple(vec![Value::Int(1), Value::Int(3), Value::None]);
		del(&[list.clone(), span]).unwrap();
		assert_eq!(list.repr(), "[0, 3, 4]");
	}

	#[test]
	fn chr_and_ord_round() {
		assert_eq!(chr(&[Value::Int(65)]).unwrap(), Value::str("A"));
		assert_eq!(ord(&[Value::str("a")]).unwrap(), Value::Int(97));
		assert!(ord(&[Value::str("ab")]).is_err());
		assert!(chr(&[Value::Int(-1)]).is_err());
	}
}
