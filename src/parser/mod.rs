//! Hand-written recursive descent over the token stream, one token of
//! lookahead. The parser never backtracks and never recovers: the first
//! violation aborts with a `SyntaxError` naming what was expected, what was
//! found, and the line.
//!
//! ``` EBNF
//! file_input:  {NEWLINE | stmt} EOF
//! stmt:        simple_stmt | compound_stmt
//! simple_stmt: small_stmt {';' small_stmt} [';'] NEWLINE
//! small_stmt:  'pass' | 'break' | 'continue' | 'return' [testlist]
//!            | 'raise' [test] | 'assert' test [',' test]
//!            | 'global' NAME {',' NAME}
//!            | 'import' module_item {',' module_item} [',']
//!            | 'from' NAME 'import' ('*' | module_item {',' module_item} [','])
//!            | testlist [('=' | '+=' | '-=' | '*=' | '/=' | '%=' | '|=' | '&=') testlist]
//! module_item: NAME ['as' NAME]
//! compound_stmt: if_stmt | while_stmt | for_stmt | try_stmt | def_stmt | class_stmt
//! if_stmt:     'if' test ':' suite {'elif' test ':' suite} ['else' ':' suite]
//! while_stmt:  'while' test ':' suite ['else' ':' suite]
//! for_stmt:    'for' target_list 'in' testlist ':' suite ['else' ':' suite]
//! try_stmt:    'try' ':' suite ('finally' ':' suite
//!                | except_clause {except_clause} ['else' ':' suite])
//! except_clause: 'except' [test ['as' NAME]] ':' suite
//! def_stmt:    'def' NAME '(' [params] ')' ':' suite
//! params:      param {',' param} [','] | {param ','} '*' NAME [',']
//! param:       NAME ['=' test]
//! class_stmt:  'class' NAME ['(' [test] ')'] ':' suite
//! suite:       simple_stmt | NEWLINE INDENT stmt {stmt} DEDENT
//! test:        or_test ['if' or_test 'else' test]
//! or_test:     and_test {'or' and_test}
//! and_test:    not_test {'and' not_test}
//! not_test:    'not' not_test | comparison
//! comparison:  bitor {comp_op bitor}
//! comp_op:     '<' | '>' | '==' | '>=' | '<=' | '!=' | 'in' | 'not' 'in' | 'is' ['not']
//! bitor:       bitand {'|' bitand}
//! bitand:      arith {'&' arith}
//! arith:       term {('+' | '-') term}
//! term:        factor {('*' | '/' | '%') factor}
//! factor:      ('+' | '-') factor | power
//! power:       atom {trailer}
//! trailer:     '(' [args] ')' | '[' subscript ']' | '.' NAME
//! args:        test {',' test} [',']
//! subscript:   test | [test] ':' [test] [':' [test]]
//! atom:        '(' [testlist] ')' | '[' [list_items] ']'
//!            | '{' [dict_items | set_items] '}'
//!            | NAME | NUMBER | STRING {STRING}
//! testlist:    test {',' test} [',']
//! target_list: bitor {',' bitor} [',']
//! ```
//!
//! A subscript containing `:` becomes a synthetic call to the builtin
//! `slice`, so indexing only ever sees a single value. `True`, `False` and
//! `None` are names turned into literals here. Adjacent string literals are
//! concatenated at parse time.

pub(crate) mod expression;

use std::{iter::Peekable, rc::Rc, vec::IntoIter};

use anyhow::anyhow;

use crate::{error::parser::{ParseError, ParseErrorType, ParserError}, parser::expression::{BinOp, CmpOp, Expr, Literal, UnaryOp}, scanner::{Token, TokenKind}, statement::{ExceptClause, FromItems, FunctionDef, ImportItem, Param, Stmt, Suite}, utils::Interner};

pub(crate) struct Parser {
	/// The tokens to parse; the scanner guarantees a trailing EOF.
	tokens:   Peekable<IntoIter<Token>>,
	/// Canonicalizes identifier and attribute names.
	interner: Interner,
}

impl Parser {
	pub fn new(tokens: Vec<Token>, interner: Interner) -> Self {
		Self { tokens: tokens.into_iter().peekable(), interner }
	}

	pub fn parse(mut self) -> Result<Suite, ParserError> {
		let mut statements = Vec::new();
		loop {
			if self.peek()?.kind() == TokenKind::Eof {
				break;
			}
			if self.at("\n")? {
				continue;
			}
			self.statement(&mut statements)?;
		}
		Ok(Suite(statements))
	}

	/// Parse a single expression, ignoring whatever follows it.
	#[allow(dead_code)]
	pub fn parse_expression(mut self) -> Result<Expr, ParserError> { self.test() }

	fn statement(&mut self, out: &mut Vec<Stmt>) -> Result<(), ParserError> {
		let head = self.peek()?.clone();
		let stmt = match head.lexeme() {
			"if" => self.if_stmt()?,
			"while" => self.while_stmt()?,
			"for" => self.for_stmt()?,
			"try" => self.try_stmt()?,
			"def" => self.def_stmt()?,
			"class" => self.class_stmt()?,
			_ => return self.simple_stmt(out),
		};
		out.push(stmt);
		Ok(())
	}

	fn simple_stmt(&mut self, out: &mut Vec<Stmt>) -> Result<(), ParserError> {
		loop {
			out.push(self.small_stmt()?);
			if !self.at(";")? {
				break;
			}
			if self.peek_is("\n")? {
				break;
			}
		}
		self.expect("\n")
	}

	fn small_stmt(&mut self) -> Result<Stmt, ParserError> {
		let head = self.peek()?.clone();
		match head.lexeme() {
			"pass" => {
				self.advance()?;
				Ok(Stmt::Pass)
			}
			"break" => {
				self.advance()?;
				Ok(Stmt::Break)
			}
			"continue" => {
				self.advance()?;
				Ok(Stmt::Continue)
			}
			"return" => {
				self.advance()?;
				if self.ends_stmt()? { Ok(Stmt::Return(None)) } else { Ok(Stmt::Return(Some(self.testlist()?))) }
			}
			"raise" => {
				self.advance()?;
				if self.ends_stmt()? { Ok(Stmt::Raise(None)) } else { Ok(Stmt::Raise(Some(self.test()?))) }
			}
			"assert" => {
				self.advance()?;
				let test = self.test()?;
				let message = if self.at(",")? { Some(self.test()?) } else { None };
				Ok(Stmt::Assert { test, message })
			}
			"global" => {
				self.advance()?;
				let mut names = vec![self.expect_name()?];
				while self.at(",")? {
					names.push(self.expect_name()?);
				}
				Ok(Stmt::Global(names))
			}
			"import" => {
				self.advance()?;
				Ok(Stmt::Import(self.import_items()?))
			}
			"from" => {
				self.advance()?;
				let module = self.expect_name()?;
				self.expect("import")?;
				let items = if self.at("*")? { FromItems::Star } else { FromItems::Names(self.import_items()?) };
				Ok(Stmt::FromImport { module, items })
			}
			_ => self.expr_stmt(),
		}
	}

	fn import_items(&mut self) -> Result<Vec<ImportItem>, ParserError> {
		let mut items = vec![self.import_item()?];
		while self.at(",")? {
			if self.ends_stmt()? {
				break;
			}
			items.push(self.import_item()?);
		}
		Ok(items)
	}

	fn import_item(&mut self) -> Result<ImportItem, ParserError> {
		let name = self.expect_name()?;
		let alias = if self.at("as")? { Some(self.expect_name()?) } else { None };
		Ok(ImportItem { name, alias })
	}

	fn expr_stmt(&mut self) -> Result<Stmt, ParserError> {
		let target = self.testlist()?;
		let token = self.peek()?.clone();
		let op = match token.lexeme() {
			"=" => {
				self.advance()?;
				let value = self.testlist()?;
				self.check_target(&target, token.line())?;
				return Ok(Stmt::Assign { target, value });
			}
			"+=" => BinOp::Add,
			"-=" => BinOp::Sub,
			"*=" => BinOp::Mul,
			"/=" => BinOp::Div,
			"%=" => BinOp::Mod,
			"|=" => BinOp::BitOr,
			"&=" => BinOp::BitAnd,
			_ => return Ok(Stmt::Expr(target)),
		};
		self.advance()?;
		if !matches!(target, Expr::Var(_) | Expr::Attr { .. } | Expr::Index { .. }) {
			return Err(ParseError::new(token.line(), ParseErrorType::NotAssignable).into());
		}
		let value = self.testlist()?;
		Ok(Stmt::AugAssign { target, op, value })
	}

	fn check_target(&self, target: &Expr, line: usize) -> Result<(), ParserError> {
		match target {
			Expr::Var(_) | Expr::Attr { .. } | Expr::Index { .. } => Ok(()),
			Expr::Tuple(items) => {
				for item in items {
					self.check_target(item, line)?;
				}
				Ok(())
			}
			_ => Err(ParseError::new(line, ParseErrorType::NotAssignable).into()),
		}
	}

	/// Consumes its own `if` (or `elif`) head token, so the `elif` chain is
	/// parsed by plain recursion into the else suite.
	fn if_stmt(&mut self) -> Result<Stmt, ParserError> {
		self.advance()?;
		let test = self.test()?;
		self.expect(":")?;
		let then_suite = self.suite()?;
		let else_suite = if self.peek_is("elif")? {
			Suite(vec![self.if_stmt()?])
		} else {
			self.else_clause()?
		};
		Ok(Stmt::If { test, then_suite, else_suite })
	}

	fn while_stmt(&mut self) -> Result<Stmt, ParserError> {
		self.advance()?;
		let test = self.test()?;
		self.expect(":")?;
		let body = self.suite()?;
		Ok(Stmt::While { test, body, else_suite: self.else_clause()? })
	}

	fn for_stmt(&mut self) -> Result<Stmt, ParserError> {
		self.advance()?;
		let target = self.target_list()?;
		self.expect("in")?;
		let iter = self.testlist()?;
		self.expect(":")?;
		let body = self.suite()?;
		Ok(Stmt::For { target, iter, body, else_suite: self.else_clause()? })
	}

	fn else_clause(&mut self) -> Result<Suite, ParserError> {
		if self.at("else")? {
			self.expect(":")?;
			self.suite()
		} else {
			Ok(Suite::default())
		}
	}

	fn try_stmt(&mut self) -> Result<Stmt, ParserError> {
		self.advance()?;
		self.expect(":")?;
		let body = self.suite()?;
		if self.at("finally")? {
			self.expect(":")?;
			return Ok(Stmt::TryFinally { body, finally: self.suite()? });
		}
		let mut clauses = vec![self.except_clause()?];
		while self.peek_is("except")? {
			clauses.push(self.except_clause()?);
		}
		Ok(Stmt::TryExcept { body, clauses, else_suite: self.else_clause()? })
	}

	fn except_clause(&mut self) -> Result<ExceptClause, ParserError> {
		self.expect("except")?;
		let test = if self.peek_is(":")? { None } else { Some(self.test()?) };
		let name = if self.at("as")? { Some(self.expect_name()?) } else { None };
		self.expect(":")?;
		Ok(ExceptClause { test, name, body: self.suite()? })
	}

	fn def_stmt(&mut self) -> Result<Stmt, ParserError> {
		self.advance()?;
		let name = self.expect_name()?;
		self.expect("(")?;
		let mut params = Vec::new();
		let mut star = None;
		let mut seen_default = false;
		if !self.peek_is(")")? {
			loop {
				let line = self.line()?;
				if self.at("*")? {
					star = Some(self.expect_name()?);
					self.at(",")?;
					if !self.peek_is(")")? {
						return Err(ParseError::new(line, ParseErrorType::StarParamNotLast).into());
					}
					break;
				}
				let param = self.expect_name()?;
				let default = if self.at("=")? { Some(self.test()?) } else { None };
				if default.is_none() && seen_default {
					return Err(ParseError::new(line, ParseErrorType::NonDefaultAfterDefault).into());
				}
				seen_default |= default.is_some();
				params.push(Param { name: param, default });
				if !self.at(",")? {
					break;
				}
				if self.peek_is(")")? {
					break;
				}
			}
		}
		self.expect(")")?;
		self.expect(":")?;
		let body = self.suite()?;
		Ok(Stmt::Def(Rc::new(FunctionDef { name, params, star, body })))
	}

	fn class_stmt(&mut self) -> Result<Stmt, ParserError> {
		self.advance()?;
		let name = self.expect_name()?;
		let superclass = if self.at("(")? {
			if self.at(")")? {
				None
			} else {
				let expr = self.test()?;
				self.expect(")")?;
				Some(expr)
			}
		} else {
			None
		};
		self.expect(":")?;
		Ok(Stmt::Class { name, superclass, body: self.suite()? })
	}

	fn suite(&mut self) -> Result<Suite, ParserError> {
		let mut statements = Vec::new();
		if self.at("\n")? {
			self.expect_indent()?;
			loop {
				self.statement(&mut statements)?;
				if self.at_dedent()? {
					break;
				}
			}
		} else {
			self.simple_stmt(&mut statements)?;
		}
		Ok(Suite(statements))
	}

	fn test(&mut self) -> Result<Expr, ParserError> {
		let expr = self.or_test()?;
		if self.at("if")? {
			let test = self.or_test()?;
			self.expect("else")?;
			let orelse = self.test()?;
			return Ok(Expr::Cond { test: test.boxed(), then: expr.boxed(), orelse: orelse.boxed() });
		}
		Ok(expr)
	}

	fn or_test(&mut self) -> Result<Expr, ParserError> {
		let mut expr = self.and_test()?;
		while self.at("or")? {
			expr = Expr::Or(expr.boxed(), self.and_test()?.boxed());
		}
		Ok(expr)
	}

	fn and_test(&mut self) -> Result<Expr, ParserError> {
		let mut expr = self.not_test()?;
		while self.at("and")? {
			expr = Expr::And(expr.boxed(), self.not_test()?.boxed());
		}
		Ok(expr)
	}

	fn not_test(&mut self) -> Result<Expr, ParserError> {
		if self.at("not")? {
			return Ok(Expr::Not(self.not_test()?.boxed()));
		}
		self.comparison()
	}

	fn comparison(&mut self) -> Result<Expr, ParserError> {
		let first = self.bitor()?;
		let mut rest = Vec::new();
		loop {
			let op = if self.at("<")? {
				CmpOp::Lt
			} else if self.at(">")? {
				CmpOp::Gt
			} else if self.at("==")? {
				CmpOp::Eq
			} else if self.at(">=")? {
				CmpOp::Ge
			} else if self.at("<=")? {
				CmpOp::Le
			} else if self.at("!=")? {
				CmpOp::Ne
			} else if self.at("in")? {
				CmpOp::In
			} else if self.at("not")? {
				self.expect("in")?;
				CmpOp::NotIn
			} else if self.at("is")? {
				if self.at("not")? { CmpOp::IsNot } else { CmpOp::Is }
			} else {
				break;
			};
			rest.push((op, self.bitor()?));
		}
		if rest.is_empty() { Ok(first) } else { Ok(Expr::Comparison { first: first.boxed(), rest }) }
	}

	fn bitor(&mut self) -> Result<Expr, ParserError> {
		let mut expr = self.bitand()?;
		while self.at("|")? {
			expr = Expr::Binary { op: BinOp::BitOr, left: expr.boxed(), right: self.bitand()?.boxed() };
		}
		Ok(expr)
	}

	fn bitand(&mut self) -> Result<Expr, ParserError> {
		let mut expr = self.arith()?;
		while self.at("&")? {
			expr = Expr::Binary { op: BinOp::BitAnd, left: expr.boxed(), right: self.arith()?.boxed() };
		}
		Ok(expr)
	}

	fn arith(&mut self) -> Result<Expr, ParserError> {
		let mut expr = self.term()?;
		loop {
			let op = if self.at("+")? {
				BinOp::Add
			} else if self.at("-")? {
				BinOp::Sub
			} else {
				break;
			};
			expr = Expr::Binary { op, left: expr.boxed(), right: self.term()?.boxed() };
		}
		Ok(expr)
	}

	fn term(&mut self) -> Result<Expr, ParserError> {
		let mut expr = self.factor()?;
		loop {
			let op = if self.at("*")? {
				BinOp::Mul
			} else if self.at("/")? {
				BinOp::Div
			} else if self.at("%")? {
				BinOp::Mod
			} else {
				break;
			};
			expr = Expr::Binary { op, left: expr.boxed(), right: self.factor()?.boxed() };
		}
		Ok(expr)
	}

	fn factor(&mut self) -> Result<Expr, ParserError> {
		if self.at("+")? {
			return Ok(Expr::Unary { op: UnaryOp::Pos, operand: self.factor()?.boxed() });
		}
		if self.at("-")? {
			return Ok(Expr::Unary { op: UnaryOp::Neg, operand: self.factor()?.boxed() });
		}
		self.power()
	}

	fn power(&mut self) -> Result<Expr, ParserError> {
		let mut expr = self.atom()?;
		loop {
			if self.at("(")? {
				expr = Expr::Call { callee: expr.boxed(), args: self.call_args()? };
			} else if self.at("[")? {
				let index = self.subscript()?;
				self.expect("]")?;
				expr = Expr::Index { value: expr.boxed(), index: index.boxed() };
			} else if self.at(".")? {
				expr = Expr::Attr { value: expr.boxed(), name: self.expect_name()? };
			} else {
				break;
			}
		}
		Ok(expr)
	}

	fn call_args(&mut self) -> Result<Vec<Expr>, ParserError> {
		let mut args = Vec::new();
		if !self.peek_is(")")? {
			loop {
				args.push(self.test()?);
				if !self.at(",")? {
					break;
				}
				if self.peek_is(")")? {
					break;
				}
			}
		}
		self.expect(")")?;
		Ok(args)
	}

	/// A subscript containing `:` turns into `slice(start, stop, step)` with
	/// `None` for omitted parts, so indexing receives a 3-tuple.
	fn subscript(&mut self) -> Result<Expr, ParserError> {
		let start = if self.peek_is(":")? { None } else { Some(self.test()?) };
		if !self.at(":")? {
			let Some(index) = start else {
				return Err(anyhow!("subscript without index or colon").into());
			};
			return Ok(index);
		}
		let stop = if self.peek_is(":")? || self.peek_is("]")? { None } else { Some(self.test()?) };
		let step = if self.at(":")? {
			if self.peek_is("]")? { None } else { Some(self.test()?) }
		} else {
			None
		};
		let none = || Expr::Lit(Literal::None);
		Ok(Expr::Call {
			callee: Expr::Var(self.interner.intern("slice")).boxed(),
			args:   vec![
				start.unwrap_or_else(none),
				stop.unwrap_or_else(none),
				step.unwrap_or_else(none),
			],
		})
	}

	fn atom(&mut self) -> Result<Expr, ParserError> {
		let token = self.peek()?.clone();
		if token.is_name() {
			self.advance()?;
			let literal = match token.lexeme() {
				"None" => Literal::None,
				"True" => Literal::True,
				"False" => Literal::False,
				name => return Ok(Expr::Var(self.interner.intern(name))),
			};
			return Ok(Expr::Lit(literal));
		}
		if token.is_number() {
			self.advance()?;
			return Ok(Expr::Lit(self.number_literal(token.lexeme())?));
		}
		if token.is_string() {
			let mut value = String::new();
			while self.peek()?.is_string() {
				value.push_str(&self.advance()?.string_value());
			}
			return Ok(Expr::Lit(Literal::Str(Rc::from(value))));
		}
		match token.lexeme() {
			"(" => {
				self.advance()?;
				self.paren_atom()
			}
			"[" => {
				self.advance()?;
				self.list_atom()
			}
			"{" => {
				self.advance()?;
				self.dict_or_set_atom()
			}
			_ => Err(self.expected("(, [, {, NAME, NUMBER, or STRING")),
		}
	}

	fn number_literal(&self, lexeme: &str) -> Result<Literal, ParserError> {
		if !lexeme.contains('.')
			&& let Ok(n) = lexeme.parse::<i64>()
		{
			return Ok(Literal::Int(n));
		}
		let x = lexeme.parse::<f64>().map_err(|e| anyhow!("bad number literal {lexeme}: {e}"))?;
		Ok(Literal::Float(x))
	}

	/// `()` is the empty tuple, `(e)` a group, one or more commas a tuple.
	fn paren_atom(&mut self) -> Result<Expr, ParserError> {
		if self.at(")")? {
			return Ok(Expr::Tuple(Vec::new()));
		}
		let first = self.test()?;
		if self.at(",")? {
			let mut items = vec![first];
			while !self.peek_is(")")? {
				items.push(self.test()?);
				if !self.at(",")? {
					break;
				}
			}
			self.expect(")")?;
			return Ok(Expr::Tuple(items));
		}
		self.expect(")")?;
		Ok(first)
	}

	fn list_atom(&mut self) -> Result<Expr, ParserError> {
		let mut items = Vec::new();
		if !self.peek_is("]")? {
			loop {
				items.push(self.test()?);
				if !self.at(",")? {
					break;
				}
				if self.peek_is("]")? {
					break;
				}
			}
		}
		self.expect("]")?;
		Ok(Expr::List(items))
	}

	/// `{}` is an empty dict; a `:` after the first element decides dict
	/// versus set.
	fn dict_or_set_atom(&mut self) -> Result<Expr, ParserError> {
		if self.at("}")? {
			return Ok(Expr::Dict(Vec::new()));
		}
		let first = self.test()?;
		if self.at(":")? {
			let mut pairs = vec![(first, self.test()?)];
			while self.at(",")? {
				if self.peek_is("}")? {
					break;
				}
				let key = self.test()?;
				self.expect(":")?;
				pairs.push((key, self.test()?));
			}
			self.expect("}")?;
			return Ok(Expr::Dict(pairs));
		}
		let mut items = vec![first];
		while self.at(",")? {
			if self.peek_is("}")? {
				break;
			}
			items.push(self.test()?);
		}
		self.expect("}")?;
		Ok(Expr::Set(items))
	}

	/// `test {',' test} [',']`; a single expression without a trailing comma
	/// is not a tuple.
	fn testlist(&mut self) -> Result<Expr, ParserError> {
		let first = self.test()?;
		if !self.peek_is(",")? {
			return Ok(first);
		}
		let mut items = vec![first];
		while self.at(",")? {
			if !self.starts_expr()? {
				break;
			}
			items.push(self.test()?);
		}
		Ok(Expr::Tuple(items))
	}

	/// Assignment targets for `for`: comparisons would swallow the `in`, so
	/// targets parse at the bit-or level.
	fn target_list(&mut self) -> Result<Expr, ParserError> {
		let line = self.line()?;
		let first = self.bitor()?;
		let target = if self.peek_is(",")? {
			let mut items = vec![first];
			while self.at(",")? {
				if !self.starts_expr()? {
					break;
				}
				items.push(self.bitor()?);
			}
			Expr::Tuple(items)
		} else {
			first
		};
		self.check_target(&target, line)?;
		Ok(target)
	}

	fn starts_expr(&mut self) -> Result<bool, ParserError> {
		let token = self.peek()?;
		Ok(token.is_name()
			|| token.is_number()
			|| token.is_string()
			|| matches!(token.lexeme(), "(" | "[" | "{" | "not" | "+" | "-"))
	}

	fn ends_stmt(&mut self) -> Result<bool, ParserError> {
		let token = self.peek()?;
		Ok(token.kind() != TokenKind::Plain || matches!(token.lexeme(), ";" | "\n"))
	}

	/// Consume the next token if its lexeme equals `lexeme`.
	fn at(&mut self, lexeme: &str) -> Result<bool, ParserError> {
		if self.peek_is(lexeme)? {
			self.advance()?;
			return Ok(true);
		}
		Ok(false)
	}

	fn peek_is(&mut self, lexeme: &str) -> Result<bool, ParserError> {
		let token = self.peek()?;
		Ok(token.kind() == TokenKind::Plain && token.lexeme() == lexeme)
	}

	/// Consume the next token if its lexeme equals `lexeme`, or fail naming
	/// the expectation and the current line.
	fn expect(&mut self, lexeme: &str) -> Result<(), ParserError> {
		if self.at(lexeme)? {
			return Ok(());
		}
		let shown = if lexeme == "\n" { "NEWLINE" } else { lexeme };
		Err(self.expected(shown))
	}

	fn expect_name(&mut self) -> Result<Rc<str>, ParserError> {
		if self.peek()?.is_name() {
			let token = self.advance()?;
			return Ok(self.interner.intern(token.lexeme()));
		}
		Err(self.expected("NAME"))
	}

	fn expect_indent(&mut self) -> Result<(), ParserError> {
		if self.peek()?.kind() == TokenKind::Indent {
			self.advance()?;
			return Ok(());
		}
		Err(self.expected("INDENT"))
	}

	fn at_dedent(&mut self) -> Result<bool, ParserError> {
		if self.peek()?.kind() == TokenKind::Dedent {
			self.advance()?;
			return Ok(true);
		}
		Ok(false)
	}

	fn expected(&mut self, expected: &str) -> ParserError {
		match self.peek() {
			Ok(token) => ParseError::new(
				token.line(),
				ParseErrorType::Expected { expected: expected.to_string(), found: token.describe().to_string() },
			)
			.into(),
			Err(e) => ParserError::InternalError(e),
		}
	}

	fn line(&mut self) -> Result<usize, ParserError> { Ok(self.peek()?.line()) }

	fn advance(&mut self) -> anyhow::Result<Token> {
		self.tokens.next().ok_or_else(|| anyhow!("token stream exhausted"))
	}

	fn peek(&mut self) -> anyhow::Result<&Token> {
		self.tokens.peek().ok_or_else(|| anyhow!("token stream exhausted"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scanner::Scanner;

	fn parser(input: &str) -> Parser {
		let tokens = Scanner::new(input).scan_tokens().unwrap();
		Parser::new(tokens, Interner::new())
	}

	fn parse_expr(input: &str, expected: &str) {
		let expr = parser(input).parse_expression().unwrap();
		assert_eq!(expr.to_string(), expected, "input: {input}");
	}

	fn parse_err(input: &str) -> String { parser(input).parse().unwrap_err().to_string() }

	fn parse_program(input: &str) -> Suite { parser(input).parse().unwrap() }

	#[test]
	fn parse_precedence() {
		parse_expr("1 + 2 * 3", "(+ 1 (* 2 3))");
		parse_expr("(1 + 2) * 3", "(* (+ 1 2) 3)");
		parse_expr("1 + 2 % 3 - 4 / 5", "(- (+ 1 (% 2 3)) (/ 4 5))");
		parse_expr("1 | 2 & 3 + 4", "(| 1 (& 2 (+ 3 4)))");
		parse_expr("-a.b", "(- (attr a b))");
		parse_expr("not a or b and c", "(or (not a) (and b c))");
		parse_expr("1 if a else 2", "(if a 1 2)");
		parse_expr("1 if a else 2 if b else 3", "(if a 1 (if b 2 3))");
	}

	#[test]
	fn parse_comparisons() {
		parse_expr("a < b", "(a < b)");
		parse_expr("1 < 4 < 5", "(1 < 4 < 5)");
		parse_expr("a == b != c", "(a == b != c)");
		parse_expr("a in b", "(a in b)");
		parse_expr("a not in b", "(a not in b)");
		parse_expr("a is not b", "(a is not b)");
		parse_expr("1 + 2 == 3", "((+ 1 2) == 3)");
	}

	#[test]
	fn parse_trailers() {
		parse_expr("f(1, 2)", "(call f 1 2)");
		parse_expr("f()()", "(call (call f))");
		parse_expr("a.b.c", "(attr (attr a b) c)");
		parse_expr("a[0]", "(index a 0)");
		parse_expr("a.b(1)[2]", "(index (call (attr a b) 1) 2)");
	}

	#[test]
	fn parse_subscripts_with_colon_become_slice_calls() {
		parse_expr("a[1:2]", "(index a (call slice 1 2 None))");
		parse_expr("a[1:]", "(index a (call slice 1 None None))");
		parse_expr("a[:-1]", "(index a (call slice None (- 1) None))");
		parse_expr("a[:]", "(index a (call slice None None None))");
		parse_expr("a[::2]", "(index a (call slice None None 2))");
	}

	#[test]
	fn parse_atoms() {
		parse_expr("True", "True");
		parse_expr("None", "None");
		parse_expr("42", "42");
		parse_expr("4.8", "4.8");
		parse_expr("'a' \"b\"", "'ab'");
		parse_expr("()", "(tuple)");
		parse_expr("(1)", "1");
		parse_expr("(1,)", "(tuple 1)");
		parse_expr("(1, 2)", "(tuple 1 2)");
		parse_expr("[1, 2]", "(list 1 2)");
		parse_expr("[]", "(list)");
		parse_expr("{}", "(dict)");
		parse_expr("{1: 2, 3: 4}", "(dict (1 2) (3 4))");
		parse_expr("{1, 2}", "(set 1 2)");
	}

	#[test]
	fn parse_statement_shapes() {
		let suite = parse_program("a = 1; b = 2\nc\n");
		assert_eq!(suite.0.len(), 3);
		assert!(matches!(suite.0[0], Stmt::Assign { .. }));
		assert!(matches!(suite.0[2], Stmt::Expr(_)));

		let suite = parse_program("a, b = 1, 2\n");
		assert!(matches!(&suite.0[0], Stmt::Assign { target: Expr::Tuple(items), .. } if items.len() == 2));

		let suite = parse_program("x += 1\n");
		assert!(matches!(&suite.0[0], Stmt::AugAssign { op: BinOp::Add, .. }));
	}

	#[test]
	fn parse_compound_statements() {
		let suite = parse_program("if a:\n    b\nelif c:\n    d\nelse:\n    e\n");
		let Stmt::If { else_suite, .. } = &suite.0[0] else { panic!("expected if") };
		assert!(matches!(else_suite.0[0], Stmt::If { .. }));

		let suite = parse_program("while a:\n    break\nelse:\n    pass\n");
		let Stmt::While { body, else_suite, .. } = &suite.0[0] else { panic!("expected while") };
		assert!(matches!(body.0[0], Stmt::Break));
		assert_eq!(else_suite.0.len(), 1);

		let suite = parse_program("for k, v in d:\n    pass\n");
		let Stmt::For { target, .. } = &suite.0[0] else { panic!("expected for") };
		assert!(matches!(target, Expr::Tuple(items) if items.len() == 2));

		let suite = parse_program("try:\n    a\nexcept 1:\n    b\nexcept 2 as e:\n    c\nelse:\n    d\n");
		let Stmt::TryExcept { clauses, else_suite, .. } = &suite.0[0] else { panic!("expected try") };
		assert_eq!(clauses.len(), 2);
		assert!(clauses[0].name.is_none());
		assert_eq!(clauses[1].name.as_deref(), Some("e"));
		assert_eq!(else_suite.0.len(), 1);

		let suite = parse_program("try:\n    a\nfinally:\n    b\n");
		assert!(matches!(suite.0[0], Stmt::TryFinally { .. }));
	}

	#[test]
	fn parse_def() {
		let suite = parse_program("def f(a, b=1, *rest):\n    return a\n");
		let Stmt::Def(def) = &suite.0[0] else { panic!("expected def") };
		assert_eq!(&*def.name, "f");
		assert_eq!(def.params.len(), 2);
		assert!(def.params[0].default.is_none());
		assert!(def.params[1].default.is_some());
		assert_eq!(def.star.as_deref(), Some("rest"));
	}

	#[test]
	fn parse_class_heads() {
		let suite = parse_program("class A: pass\nclass B(A): pass\nclass C(): pass\n");
		assert!(matches!(&suite.0[0], Stmt::Class { superclass: None, .. }));
		assert!(matches!(&suite.0[1], Stmt::Class { superclass: Some(_), .. }));
		assert!(matches!(&suite.0[2], Stmt::Class { superclass: None, .. }));
	}

	#[test]
	fn parse_imports() {
		let suite = parse_program("import a, b as x,\nfrom m import *\nfrom m import a, b as y,\n");
		let Stmt::Import(items) = &suite.0[0] else { panic!("expected import") };
		assert_eq!(items.len(), 2);
		assert_eq!(items[1].alias.as_deref(), Some("x"));
		assert!(matches!(&suite.0[1], Stmt::FromImport { items: FromItems::Star, .. }));
		let Stmt::FromImport { items: FromItems::Names(names), .. } = &suite.0[2] else {
			panic!("expected from import")
		};
		assert_eq!(names.len(), 2);
	}

	#[test]
	fn parse_errors_name_expectation_and_line() {
		assert_eq!(parse_err("if 1\n"), "SyntaxError: expected : but found NEWLINE at line 1");
		assert_eq!(parse_err("break 1\n"), "SyntaxError: expected NEWLINE but found 1 at line 1");
		assert_eq!(parse_err("class \"A\"\n"), "SyntaxError: expected NAME but found \"A\" at line 1");
		assert_eq!(parse_err("global a, b,\n"), "SyntaxError: expected NAME but found NEWLINE at line 1");
		assert_eq!(
			parse_err("a = \n"),
			"SyntaxError: expected (, [, {, NAME, NUMBER, or STRING but found NEWLINE at line 1"
		);
		assert_eq!(
			parse_err("a\nif 1:\nb\n"),
			"SyntaxError: expected INDENT but found b at line 3"
		);
	}

	#[test]
	fn parse_rejects_bad_targets_and_params() {
		assert_eq!(parse_err("1 = 2\n"), "SyntaxError: cannot assign to this expression at line 1");
		assert_eq!(parse_err("a, 1 = 1, 2\n"), "SyntaxError: cannot assign to this expression at line 1");
		assert_eq!(
			parse_err("def f(a=1, b): pass\n"),
			"SyntaxError: parameter without a default follows parameter with a default at line 1"
		);
		assert_eq!(
			parse_err("def f(*rest, a): pass\n"),
			"SyntaxError: parameter after * parameter at line 1"
		);
	}

	#[test]
	fn parse_is_deterministic() {
		let source = "def f(n):\n    if n == 0: return 1\n    return n * f(n - 1)\nf(10)\n";
		let first = format!("{:?}", parse_program(source));
		let second = format!("{:?}", parse_program(source));
		assert_eq!(first, second);
	}
}
