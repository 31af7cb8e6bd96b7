use std::{fmt, rc::Rc};

/// An expression node. Every variant evaluates to a value; the subset that
/// also denotes a storage location (`Var`, `Attr`, `Index`, and `Tuple` of
/// those) is additionally accepted on the left of `=`.
#[derive(Debug)]
pub enum Expr {
	/// `then if test else orelse`
	Cond { test: Box<Expr>, then: Box<Expr>, orelse: Box<Expr> },
	Or(Box<Expr>, Box<Expr>),
	And(Box<Expr>, Box<Expr>),
	Not(Box<Expr>),
	/// A chain `a < b == c`; operands evaluate once, left to right, and the
	/// chain short-circuits on the first false link.
	Comparison { first: Box<Expr>, rest: Vec<(CmpOp, Expr)> },
	Binary { op: BinOp, left: Box<Expr>, right: Box<Expr> },
	Unary { op: UnaryOp, operand: Box<Expr> },
	Call { callee: Box<Expr>, args: Vec<Expr> },
	Index { value: Box<Expr>, index: Box<Expr> },
	Attr { value: Box<Expr>, name: Rc<str> },
	Var(Rc<str>),
	Lit(Literal),
	Tuple(Vec<Expr>),
	List(Vec<Expr>),
	Dict(Vec<(Expr, Expr)>),
	Set(Vec<Expr>),
}

impl Expr {
	pub fn boxed(self) -> Box<Self> { Box::new(self) }
}

#[derive(Debug, Clone)]
pub enum Literal {
	None,
	True,
	False,
	Int(i64),
	Float(f64),
	Str(Rc<str>),
}

/// Binary operators shared by expressions and augmented assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
	BitOr,
	BitAnd,
	Add,
	Sub,
	Mul,
	Div,
	Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
	Eq,
	Ne,
	Lt,
	Gt,
	Le,
	Ge,
	In,
	NotIn,
	Is,
	IsNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
	Pos,
	Neg,
}

impl fmt::Display for BinOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let symbol = match self {
			BinOp::BitOr => "|",
			BinOp::BitAnd => "&",
			BinOp::Add => "+",
			BinOp::Sub => "-",
			BinOp::Mul => "*",
			BinOp::Div => "/",
			BinOp::Mod => "%",
		};
		write!(f, "{symbol}")
	}
}

impl fmt::Display for CmpOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let symbol = match self {
			CmpOp::Eq => "==",
			CmpOp::Ne => "!=",
			CmpOp::Lt => "<",
			CmpOp::Gt => ">",
			CmpOp::Le => "<=",
			CmpOp::Ge => ">=",
			CmpOp::In => "in",
			CmpOp::NotIn => "not in",
			CmpOp::Is => "is",
			CmpOp::IsNot => "is not",
		};
		write!(f, "{symbol}")
	}
}

/// S-expression rendering, used by the parser tests to pin tree shapes.
impl fmt::Display for Expr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Expr::Cond { test, then, orelse } => write!(f, "(if {test} {then} {orelse})"),
			Expr::Or(left, right) => write!(f, "(or {left} {right})"),
			Expr::And(left, right) => write!(f, "(and {left} {right})"),
			Expr::Not(operand) => write!(f, "(not {operand})"),
			Expr::Comparison { first, rest } => {
				write!(f, "({first}")?;
				for (op, right) in rest {
					write!(f, " {op} {right}")?;
				}
				write!(f, ")")
			}
			Expr::Binary { op, left, right } => write!(f, "({op} {left} {right})"),
			Expr::Unary { op: UnaryOp::Pos, operand } => write!(f, "(+ {operand})"),
			Expr::Unary { op: UnaryOp::Neg, operand } => write!(f, "(- {operand})"),
			Expr::Call { callee, args } => {
				write!(f, "(call {callee}")?;
				for arg in args {
					write!(f, " {arg}")?;
				}
				write!(f, ")")
			}
			Expr::Index { value, index } => write!(f, "(index {value} {index})"),
			Expr::Attr { value, name } => write!(f, "(attr {value} {name})"),
			Expr::Var(name) => write!(f, "{name}"),
			Expr::Lit(literal) => write!(f, "{literal}"),
			Expr::Tuple(items) => write_seq(f, "tuple", items),
			Expr::List(items) => write_seq(f, "list", items),
			Expr::Set(items) => write_seq(f, "set", items),
			Expr::Dict(pairs) => {
				write!(f, "(dict")?;
				for (key, value) in pairs {
					write!(f, " ({key} {value})")?;
				}
				write!(f, ")")
			}
		}
	}
}

fn write_seq(f: &mut fmt::Formatter<'_>, label: &str, items: &[Expr]) -> fmt::Result {
	write!(f, "({label}")?;
	for item in items {
		write!(f, " {item}")?;
	}
	write!(f, ")")
}

impl fmt::Display for Literal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Literal::None => write!(f, "None"),
			Literal::True => write!(f, "True"),
			Literal::False => write!(f, "False"),
			Literal::Int(n) => write!(f, "{n}"),
			Literal::Float(x) => write!(f, "{x:?}"),
			Literal::Str(s) => write!(f, "'{s}'"),
		}
	}
}
