//! The tree-walking evaluator and the runtime it runs in.
//!
//! `Interpreter` owns everything shared across an execution: the top-level
//! globals, the builtins table, the interned-name table, the module cache,
//! and the seed for the `random` shim. `execute` scans, parses, and walks
//! the resulting suite against a top frame whose locals are the globals.
//!
//! Control flow unwinds through the ordinary `Result` channel as `Unwind`
//! signals rather than host panics; each statement that can absorb a signal
//! catches exactly the kinds it owns and re-raises the rest. Evaluation
//! order is strictly left to right, top to bottom, and fully synchronous.

pub(crate) mod builtins;
pub(crate) mod callable;
pub(crate) mod class;
pub(crate) mod instance;
pub(crate) mod module;
pub mod value;

use std::{cell::RefCell, collections::HashMap, path::PathBuf, rc::Rc};

use builtins::arity;
use callable::{BuiltinValue, FunctionValue};
use class::ClassValue;
use instance::InstanceValue;
use module::ModuleValue;
use value::Value;

use crate::{environment::{Bindings, Frame}, error::{SmythonError, interpreter::Unwind}, parser::{Parser, expression::{BinOp, CmpOp, Expr, Literal, UnaryOp}}, scanner::Scanner, statement::{FromItems, Stmt, Suite}, utils::{Interner, RcCell}};

pub struct Interpreter {
	globals:    RcCell<Bindings>,
	builtins:   Rc<Bindings>,
	interner:   Interner,
	/// Imported modules by interned name.
	modules:    RcCell<HashMap<Rc<str>, Value>>,
	/// Directory searched for `<name>.py` on import.
	module_dir: RefCell<Option<PathBuf>>,
	/// State of the `random` module shim.
	rng:        RcCell<u64>,
}

impl Default for Interpreter {
	fn default() -> Self { Self::new() }
}

impl Interpreter {
	pub fn new() -> Self {
		let interner = Interner::new();
		let builtins = Rc::new(builtins::table(&interner));
		Self {
			globals: RcCell::new(Bindings::new()),
			builtins,
			interner,
			modules: RcCell::new(HashMap::new()),
			module_dir: RefCell::new(None),
			rng: RcCell::new(0x5DEECE66D),
		}
	}

	pub fn set_module_dir(&self, dir: PathBuf) { *self.module_dir.borrow_mut() = Some(dir); }

	/// Parse and run a script against the runtime globals; the result is the
	/// value of its last statement.
	pub fn execute(&self, source: &str) -> Result<Value, SmythonError> {
		let tokens = Scanner::new(source).scan_tokens()?;
		let program = Parser::new(tokens, self.interner.clone()).parse()?;
		let frame = Frame::top(self.globals.clone(), self.builtins.clone());
		self.exec_suite(&program, &frame).map_err(|unwind| SmythonError::Uncaught(unwind.into_message()))
	}

	/// Scan and parse only, for validating sources without running them.
	pub fn check(&self, source: &str) -> Result<(), SmythonError> {
		let tokens = Scanner::new(source).scan_tokens()?;
		Parser::new(tokens, self.interner.clone()).parse()?;
		Ok(())
	}

	/// Return the named module, importing it if necessary; `None` when no
	/// such module exists.
	pub fn import(&self, name: &str) -> Result<Option<Value>, SmythonError> {
		self.import_module(name).map_err(|unwind| SmythonError::Uncaught(unwind.into_message()))
	}

	fn exec_suite(&self, suite: &Suite, frame: &Frame) -> Result<Value, Unwind> {
		let mut value = Value::None;
		for stmt in &suite.0 {
			value = self.exec_stmt(stmt, frame)?;
		}
		Ok(value)
	}

	/// Suite evaluation at a function boundary: absorbs `Return` and yields
	/// its payload.
	fn exec_suite_as_func(&self, suite: &Suite, frame: &Frame) -> Result<Value, Unwind> {
		match self.exec_suite(suite, frame) {
			Err(Unwind::Return(value)) => Ok(value),
			result => result,
		}
	}

	fn exec_stmt(&self, stmt: &Stmt, frame: &Frame) -> Result<Value, Unwind> {
		match stmt {
			Stmt::Expr(expr) => return self.evaluate(expr, frame),
			Stmt::Pass => {}
			Stmt::Assign { target, value } => {
				let value = self.evaluate(value, frame)?;
				self.assign(target, value, frame)?;
			}
			Stmt::AugAssign { target, op, value } => self.aug_assign(target, *op, value, frame)?,
			Stmt::If { test, then_suite, else_suite } => {
				if self.evaluate(test, frame)?.truthy() {
					self.exec_suite(then_suite, frame)?;
				} else {
					self.exec_suite(else_suite, frame)?;
				}
			}
			Stmt::While { test, body, else_suite } => loop {
				if !self.evaluate(test, frame)?.truthy() {
					self.exec_suite(else_suite, frame)?;
					break;
				}
				match self.exec_suite(body, frame) {
					Ok(_) | Err(Unwind::Continue) => {}
					Err(Unwind::Break) => break,
					Err(other) => return Err(other),
				}
			},
			Stmt::For { target, iter, body, else_suite } => {
				let iterable = self.evaluate(iter, frame)?;
				let mut broke = false;
				for item in iterable.iterate()? {
					self.assign(target, item, frame)?;
					match self.exec_suite(body, frame) {
						Ok(_) | Err(Unwind::Continue) => {}
						Err(Unwind::Break) => {
							broke = true;
							break;
						}
						Err(other) => return Err(other),
					}
				}
				if !broke {
					self.exec_suite(else_suite, frame)?;
				}
			}
			Stmt::TryFinally { body, finally } => {
				let result = self.exec_suite(body, frame);
				self.exec_suite(finally, frame)?;
				result?;
			}
			Stmt::TryExcept { body, clauses, else_suite } => match self.exec_suite(body, frame) {
				Ok(_) => {
					self.exec_suite(else_suite, frame)?;
				}
				Err(Unwind::Raise(exception)) => {
					let mut handled = false;
					for clause in clauses {
						let matched = match &clause.test {
							None => true,
							Some(test) => self.evaluate(test, frame)? == exception,
						};
						if !matched {
							continue;
						}
						let handler_frame = match &clause.name {
							Some(name) => {
								let child = frame.child();
								child.define(name.clone(), exception.clone());
								child
							}
							None => frame.clone(),
						};
						self.exec_suite(&clause.body, &handler_frame)?;
						handled = true;
						break;
					}
					if !handled {
						return Err(Unwind::Raise(exception));
					}
				}
				Err(other) => return Err(other),
			},
			Stmt::Def(def) => {
				let function = FunctionValue { def: def.clone(), frame: frame.clone() };
				frame.define(def.name.clone(), Value::Function(Rc::new(function)));
			}
			Stmt::Class { name, superclass, body } => {
				let superclass = match superclass {
					None => None,
					Some(expr) => match self.evaluate(expr, frame)? {
						Value::Class(class) => Some(class),
						Value::None => None,
						other => {
							return Err(Unwind::type_error(&format!(
								"superclass must be a class, not '{}'",
								other.kind()
							)));
						}
					},
				};
				let class = Rc::new(ClassValue::new(name.clone(), superclass));
				frame.define(name.clone(), Value::Class(class.clone()));
				let class_frame = frame.child_with_locals(class.dict.clone());
				self.exec_suite(body, &class_frame)?;
			}
			Stmt::Break => return Err(Unwind::Break),
			Stmt::Continue => return Err(Unwind::Continue),
			Stmt::Return(expr) => {
				let value = match expr {
					Some(expr) => self.evaluate(expr, frame)?,
					None => Value::None,
				};
				return Err(Unwind::Return(value));
			}
			Stmt::Raise(expr) => {
				let value = match expr {
					Some(expr) => self.evaluate(expr, frame)?,
					None => Value::None,
				};
				return Err(Unwind::Raise(value));
			}
			Stmt::Assert { test, message } => {
				if !self.evaluate(test, frame)?.truthy() {
					return Err(match message {
						Some(expr) => {
							let message = self.evaluate(expr, frame)?;
							Unwind::error("AssertionError", &message.to_string())
						}
						None => Unwind::Raise(Value::str("AssertionError")),
					});
				}
			}
			Stmt::Global(names) => {
				for name in names {
					frame.declare_global(name.clone());
				}
			}
			Stmt::Import(items) => {
				for item in items {
					let module = self
						.import_module(&item.name)?
						.ok_or_else(|| Unwind::import_error(&item.name))?;
					frame.define(item.alias.clone().unwrap_or_else(|| item.name.clone()), module);
				}
			}
			Stmt::FromImport { module, items } => {
				let imported =
					self.import_module(module)?.ok_or_else(|| Unwind::import_error(module))?;
				match items {
					FromItems::Star => {
						if let Value::Module(m) = &imported {
							for (name, value) in m.globals.borrow().iter() {
								frame.define(name.clone(), value.clone());
							}
						}
					}
					FromItems::Names(names) => {
						for item in names {
							let value = imported.get_attr(&item.name).map_err(|_| {
								Unwind::error(
									"ImportError",
									&format!("cannot import name '{}' from '{module}'", item.name),
								)
							})?;
							frame.define(item.alias.clone().unwrap_or_else(|| item.name.clone()), value);
						}
					}
				}
			}
		}
		Ok(Value::None)
	}

	fn evaluate(&self, expr: &Expr, frame: &Frame) -> Result<Value, Unwind> {
		match expr {
			Expr::Lit(literal) => Ok(match literal {
				Literal::None => Value::None,
				Literal::True => Value::Bool(true),
				Literal::False => Value::Bool(false),
				Literal::Int(n) => Value::Int(*n),
				Literal::Float(x) => Value::Float(*x),
				Literal::Str(s) => Value::Str(s.clone()),
			}),
			Expr::Var(name) => frame.lookup(name),
			Expr::Tuple(items) => Ok(Value::tuple(self.evaluate_all(items, frame)?)),
			Expr::List(items) => Ok(Value::list(self.evaluate_all(items, frame)?)),
			Expr::Set(items) => {
				let mut values: Vec<Value> = Vec::new();
				for item in items {
					let value = self.evaluate(item, frame)?;
					if !values.contains(&value) {
						values.push(value);
					}
				}
				Ok(Value::Set(RcCell::new(values)))
			}
			Expr::Dict(pairs) => {
				let mut entries: Vec<(Value, Value)> = Vec::new();
				for (key_expr, value_expr) in pairs {
					let key = self.evaluate(key_expr, frame)?;
					let value = self.evaluate(value_expr, frame)?;
					match entries.iter_mut().find(|(k, _)| *k == key) {
						Some(entry) => entry.1 = value,
						None => entries.push((key, value)),
					}
				}
				Ok(Value::Dict(RcCell::new(entries)))
			}
			Expr::Cond { test, then, orelse } => {
				if self.evaluate(test, frame)?.truthy() {
					self.evaluate(then, frame)
				} else {
					self.evaluate(orelse, frame)
				}
			}
			Expr::Or(left, right) => {
				let value = self.evaluate(left, frame)?;
				if value.truthy() { Ok(value) } else { self.evaluate(right, frame) }
			}
			Expr::And(left, right) => {
				let value = self.evaluate(left, frame)?;
				if value.truthy() { self.evaluate(right, frame) } else { Ok(value) }
			}
			Expr::Not(operand) => Ok(Value::Bool(!self.evaluate(operand, frame)?.truthy())),
			Expr::Comparison { first, rest } => {
				let mut left = self.evaluate(first, frame)?;
				for (op, right_expr) in rest {
					let right = self.evaluate(right_expr, frame)?;
					if !compare(*op, &left, &right)? {
						return Ok(Value::Bool(false));
					}
					left = right;
				}
				Ok(Value::Bool(true))
			}
			Expr::Binary { op, left, right } => {
				let left = self.evaluate(left, frame)?;
				let right = self.evaluate(right, frame)?;
				binary(*op, &left, &right)
			}
			Expr::Unary { op, operand } => {
				let value = self.evaluate(operand, frame)?;
				match op {
					UnaryOp::Pos => value.pos(),
					UnaryOp::Neg => value.neg(),
				}
			}
			Expr::Call { callee, args } => {
				let callee = self.evaluate(callee, frame)?;
				let args = self.evaluate_all(args, frame)?;
				self.call_value(&callee, args)
			}
			Expr::Index { value, index } => {
				let value = self.evaluate(value, frame)?;
				let index = self.evaluate(index, frame)?;
				value.index(&index)
			}
			Expr::Attr { value, name } => self.evaluate(value, frame)?.get_attr(name),
		}
	}

	fn evaluate_all(&self, exprs: &[Expr], frame: &Frame) -> Result<Vec<Value>, Unwind> {
		exprs.iter().map(|expr| self.evaluate(expr, frame)).collect()
	}

	/// Store `value` at the location `target` denotes. Tuples destructure,
	/// demanding an exact element count.
	fn assign(&self, target: &Expr, value: Value, frame: &Frame) -> Result<(), Unwind> {
		match target {
			Expr::Var(name) => {
				frame.set(name.clone(), value);
				Ok(())
			}
			Expr::Attr { value: object, name } => {
				let object = self.evaluate(object, frame)?;
				object.set_attr(name.clone(), value)
			}
			Expr::Index { .. } => Err(Unwind::unimplemented("assignment to a subscript")),
			Expr::Tuple(targets) => {
				let items = value.iterate().map_err(|_| {
					Unwind::type_error(&format!("cannot unpack non-iterable '{}' object", value.kind()))
				})?;
				if items.len() < targets.len() {
					return Err(Unwind::value_error("not enough values to unpack"));
				}
				if items.len() > targets.len() {
					return Err(Unwind::value_error("too many values to unpack"));
				}
				for (target, item) in targets.iter().zip(items) {
					self.assign(target, item, frame)?;
				}
				Ok(())
			}
			_ => Err(Unwind::type_error("cannot assign to this expression")),
		}
	}

	/// Read the target, combine, write back to the same slot. The read comes
	/// first, so `x += 1` on an unbound `x` is a `NameError`.
	fn aug_assign(&self, target: &Expr, op: BinOp, value: &Expr, frame: &Frame) -> Result<(), Unwind> {
		match target {
			Expr::Var(name) => {
				let current = frame.lookup(name)?;
				let rhs = self.evaluate(value, frame)?;
				frame.set(name.clone(), binary(op, &current, &rhs)?);
				Ok(())
			}
			Expr::Attr { value: object, name } => {
				let object = self.evaluate(object, frame)?;
				let current = object.get_attr(name)?;
				let rhs = self.evaluate(value, frame)?;
				object.set_attr(name.clone(), binary(op, &current, &rhs)?)
			}
			Expr::Index { .. } => Err(Unwind::unimplemented("augmented assignment to a subscript")),
			_ => Err(Unwind::type_error("illegal target for augmented assignment")),
		}
	}

	/// Invoke a value's call protocol. Methods prepend their receiver;
	/// classes construct an instance and run `__init__` when present.
	pub(crate) fn call_value(&self, callee: &Value, args: Vec<Value>) -> Result<Value, Unwind> {
		match callee {
			Value::Function(function) => self.call_function(function, args),
			Value::Method(method) => {
				let mut full = Vec::with_capacity(args.len() + 1);
				full.push(method.receiver.clone());
				full.extend(args);
				self.call_function(&method.function, full)
			}
			Value::Builtin(builtin) => (builtin.func)(&args),
			Value::Class(class) => {
				let instance = Value::Instance(Rc::new(InstanceValue::new(class.clone())));
				match class.lookup("__init__") {
					Some(Value::Function(function)) => {
						let mut full = Vec::with_capacity(args.len() + 1);
						full.push(instance.clone());
						full.extend(args);
						self.call_function(&function, full)?;
					}
					Some(other) => {
						return Err(Unwind::type_error(&format!(
							"__init__ must be a function, not '{}'",
							other.kind()
						)));
					}
					None if !args.is_empty() => {
						return Err(Unwind::type_error(&format!("{}() takes no arguments", class.name)));
					}
					None => {}
				}
				Ok(instance)
			}
			_ => Err(Unwind::type_error(&format!("'{}' object is not callable", callee.kind()))),
		}
	}

	/// Bind arguments positionally into a frame chained to the defining
	/// frame, filling trailing parameters from defaults (evaluated in the
	/// defining frame) and collecting the rest into a `*` tuple.
	fn call_function(&self, function: &FunctionValue, args: Vec<Value>) -> Result<Value, Unwind> {
		let def = &function.def;
		if args.len() > def.params.len() && def.star.is_none() {
			return Err(Unwind::type_error(&format!(
				"{}() takes {} arguments but {} were given",
				def.name,
				def.params.len(),
				args.len()
			)));
		}
		let frame = function.frame.child();
		for (i, param) in def.params.iter().enumerate() {
			let value = if i < args.len() {
				args[i].clone()
			} else if let Some(default) = &param.default {
				self.evaluate(default, &function.frame)?
			} else {
				return Err(Unwind::type_error(&format!(
					"{}() missing required argument: '{}'",
					def.name, param.name
				)));
			};
			frame.define(param.name.clone(), value);
		}
		if let Some(star) = &def.star {
			let rest: Vec<Value> = args.iter().skip(def.params.len()).cloned().collect();
			frame.define(star.clone(), Value::tuple(rest));
		}
		self.exec_suite_as_func(&def.body, &frame)
	}

	/// Cache hit, else a predefined shim, else `<module_dir>/<name>.py`.
	fn import_module(&self, name: &str) -> Result<Option<Value>, Unwind> {
		if let Some(module) = self.modules.borrow().get(name) {
			return Ok(Some(module.clone()));
		}
		let module = match self.predefined_module(name) {
			Some(module) => module,
			None => match self.load_source_module(name)? {
				Some(module) => module,
				None => return Ok(None),
			},
		};
		self.modules.borrow_mut().insert(self.interner.intern(name), module.clone());
		Ok(Some(module))
	}

	/// Evaluate `<name>.py` into a fresh globals mapping and wrap it as a
	/// module. Scan and parse failures surface as raised values.
	fn load_source_module(&self, name: &str) -> Result<Option<Value>, Unwind> {
		let Some(dir) = self.module_dir.borrow().clone() else { return Ok(None) };
		let path = dir.join(format!("{name}.py"));
		let Ok(source) = std::fs::read_to_string(&path) else { return Ok(None) };
		let tokens = Scanner::new(&source)
			.scan_tokens()
			.map_err(|e| Unwind::Raise(Value::str(&e.to_string())))?;
		let program = Parser::new(tokens, self.interner.clone())
			.parse()
			.map_err(|e| Unwind::Raise(Value::str(&e.to_string())))?;
		let globals = RcCell::new(Bindings::new());
		let frame = Frame::top(globals.clone(), self.builtins.clone());
		self.exec_suite(&program, &frame)?;
		Ok(Some(Value::Module(Rc::new(ModuleValue::new(self.interner.intern(name), globals)))))
	}

	/// The small set of pre-canned modules; everything here is a trivial
	/// shim over the host.
	fn predefined_module(&self, name: &str) -> Option<Value> {
		let globals = RcCell::new(Bindings::new());
		let define = |key: &str, value: Value| {
			globals.borrow_mut().insert(self.interner.intern(key), value);
		};
		match name {
			"sys" => {
				let modules: Vec<(Value, Value)> = self
					.modules
					.borrow()
					.iter()
					.map(|(name, module)| (Value::Str(name.clone()), module.clone()))
					.collect();
				define("modules", Value::Dict(RcCell::new(modules)));
			}
			"os" => {
				define(
					"getlogin",
					BuiltinValue::new("getlogin", |args| {
						arity("getlogin", args, 0)?;
						let user = std::env::var("USER")
							.or_else(|_| std::env::var("LOGNAME"))
							.unwrap_or_else(|_| "user".to_string());
						Ok(Value::str(&user))
					}),
				);
				define(
					"getpid",
					BuiltinValue::new("getpid", |args| {
						arity("getpid", args, 0)?;
						Ok(Value::Int(std::process::id() as i64))
					}),
				);
			}
			"random" => {
				let state = self.rng.clone();
				define(
					"seed",
					BuiltinValue::new("seed", move |args| {
						arity("seed", args, 1)?;
						*state.borrow_mut() = args[0].as_int()? as u64;
						Ok(Value::None)
					}),
				);
				let state = self.rng.clone();
				define(
					"randint",
					BuiltinValue::new("randint", move |args| {
						arity("randint", args, 2)?;
						let low = args[0].as_int()?;
						let high = args[1].as_int()?;
						if high < low {
							return Err(Unwind::value_error("empty range for randint()"));
						}
						let mut s = state.borrow_mut();
						*s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
						let span = (high - low + 1) as u64;
						Ok(Value::Int(low + ((*s >> 33) % span) as i64))
					}),
				);
			}
			"curses" => {
				define("error", Value::Class(Rc::new(ClassValue::new(self.interner.intern("error"), None))));
				for func in ["initscr", "endwin", "noecho", "cbreak", "echo", "curs_set", "napms"] {
					define(func, BuiltinValue::new(func, |_args| Ok(Value::None)));
				}
			}
			"atexit" => {
				define(
					"register",
					BuiltinValue::new("register", |args| {
						arity("register", args, 1)?;
						Ok(args[0].clone())
					}),
				);
			}
			"copy" => {
				define(
					"copy",
					BuiltinValue::new("copy", |args| {
						arity("copy", args, 1)?;
						Ok(match &args[0] {
							Value::List(items) => Value::list(items.borrow().clone()),
							Value::Dict(pairs) => Value::Dict(RcCell::new(pairs.borrow().clone())),
							Value::Set(items) => Value::Set(RcCell::new(items.borrow().clone())),
							Value::Instance(instance) => {
								let copy = InstanceValue::new(instance.class.clone());
								*copy.dict.borrow_mut() = instance.dict.borrow().clone();
								Value::Instance(Rc::new(copy))
							}
							other => other.clone(),
						})
					}),
				);
			}
			"time" => {}
			_ => return None,
		}
		Some(Value::Module(Rc::new(ModuleValue::new(self.interner.intern(name), globals))))
	}
}

fn binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, Unwind> {
	match op {
		BinOp::Add => left.add(right),
		BinOp::Sub => left.sub(right),
		BinOp::Mul => left.mul(right),
		BinOp::Div => left.div(right),
		BinOp::Mod => left.rem(right),
		BinOp::BitOr => left.bitor(right),
		BinOp::BitAnd => left.bitand(right),
	}
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, Unwind> {
	match op {
		CmpOp::Eq => Ok(left == right),
		CmpOp::Ne => Ok(left != right),
		CmpOp::Lt => {
			let (l, r) = left.number_pair(right, "<")?;
			Ok(l < r)
		}
		CmpOp::Gt => {
			let (l, r) = left.number_pair(right, ">")?;
			Ok(l > r)
		}
		CmpOp::Le => {
			let (l, r) = left.number_pair(right, "<=")?;
			Ok(l <= r)
		}
		CmpOp::Ge => {
			let (l, r) = left.number_pair(right, ">=")?;
			Ok(l >= r)
		}
		CmpOp::In => right.contains(left),
		CmpOp::NotIn => Ok(!right.contains(left)?),
		CmpOp::Is => Ok(left.is_identical(right)),
		CmpOp::IsNot => Ok(!left.is_identical(right)),
	}
}
