use std::rc::Rc;

/// Reserved words of the language. `True`, `False` and `None` are ordinary
/// names as far as the scanner is concerned; the parser turns them into
/// literals.
pub const KEYWORDS: &[&str] = &[
	"and", "as", "assert", "break", "class", "continue", "def", "elif", "else", "except", "finally", "for",
	"from", "global", "if", "import", "in", "is", "not", "or", "pass", "raise", "return", "try", "while",
];

/// Distinguishes the synthetic block markers from tokens backed by source
/// text. The synthetic kinds carry an empty span at the point of synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	/// A token with a lexeme taken from the source.
	Plain,
	Indent,
	Dedent,
	Eof,
}

/// A token is a window into the (shared, normalized) source text. The lexeme
/// and the line number are derived from the offsets on demand; two tokens are
/// equal when their lexemes are.
#[derive(Debug, Clone)]
pub struct Token {
	kind:   TokenKind,
	source: Rc<str>,
	start:  usize,
	end:    usize,
}

impl Token {
	pub fn new(kind: TokenKind, source: Rc<str>, start: usize, end: usize) -> Self {
		Self { kind, source, start, end }
	}

	pub fn kind(&self) -> TokenKind { self.kind }

	pub fn lexeme(&self) -> &str {
		match self.kind {
			TokenKind::Plain => &self.source[self.start..self.end],
			_ => "",
		}
	}

	/// 1-based source line, counted from the newlines preceding the token.
	/// Synthetic tokens report the line they were synthesized on.
	pub fn line(&self) -> usize { self.source[..self.start].matches('\n').count() + 1 }

	pub fn is_keyword(&self) -> bool { KEYWORDS.contains(&self.lexeme()) }

	pub fn is_name(&self) -> bool {
		let lexeme = self.lexeme();
		matches!(lexeme.chars().next(), Some(c) if c.is_ascii_alphabetic() || c == '_') && !self.is_keyword()
	}

	pub fn is_number(&self) -> bool { matches!(self.lexeme().chars().next(), Some(c) if c.is_ascii_digit()) }

	pub fn is_string(&self) -> bool { matches!(self.lexeme().chars().next(), Some('\'' | '"')) }

	/// How the token is named in diagnostics. String lexemes keep their
	/// quotes, which is what error messages want.
	pub fn describe(&self) -> &str {
		match self.kind {
			TokenKind::Indent => "INDENT",
			TokenKind::Dedent => "DEDENT",
			TokenKind::Eof => "EOF",
			TokenKind::Plain if self.lexeme() == "\n" => "NEWLINE",
			TokenKind::Plain => self.lexeme(),
		}
	}

	/// The value of a string literal: quotes stripped, escapes decoded.
	/// Unknown escape pairs are preserved literally.
	pub fn string_value(&self) -> String {
		let lexeme = self.lexeme();
		let inner = &lexeme[1..lexeme.len() - 1];
		let mut value = String::with_capacity(inner.len());
		let mut chars = inner.chars();
		while let Some(c) = chars.next() {
			if c != '\\' {
				value.push(c);
				continue;
			}
			match chars.next() {
				Some('n') => value.push('\n'),
				Some('\'') => value.push('\''),
				Some('"') => value.push('"'),
				Some('\\') => value.push('\\'),
				Some(other) => {
					value.push('\\');
					value.push(other);
				}
				None => value.push('\\'),
			}
		}
		value
	}
}

impl PartialEq for Token {
	fn eq(&self, other: &Self) -> bool { self.kind == other.kind && self.lexeme() == other.lexeme() }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn token(source: &str, start: usize, end: usize) -> Token {
		Token::new(TokenKind::Plain, Rc::from(source), start, end)
	}

	#[test]
	fn predicates_derive_from_lexeme() {
		let source = "while x 12.5 'hi'\n";
		assert!(token(source, 0, 5).is_keyword());
		assert!(!token(source, 0, 5).is_name());
		assert!(token(source, 6, 7).is_name());
		assert!(token(source, 8, 12).is_number());
		assert!(token(source, 13, 17).is_string());
	}

	#[test]
	fn line_counts_preceding_newlines() {
		let source = "a\nb\n\nc\n";
		assert_eq!(token(source, 0, 1).line(), 1);
		assert_eq!(token(source, 2, 3).line(), 2);
		assert_eq!(token(source, 5, 6).line(), 4);
	}

	#[test]
	fn equality_is_by_lexeme() {
		let a = token("x + x\n", 0, 1);
		let b = token("x + x\n", 4, 5);
		assert_eq!(a, b);
		let synthetic = Token::new(TokenKind::Eof, Rc::from("x + x\n"), 6, 6);
		assert_ne!(a, synthetic);
	}

	#[test]
	fn string_value_decodes_escapes() {
		let source = r#"'a\n\'b\\' "unknown\q""#;
		assert_eq!(token(source, 0, 10).string_value(), "a\n'b\\");
		assert_eq!(token(source, 11, 22).string_value(), "unknown\\q");
	}

	#[test]
	fn describe_names_synthetic_tokens() {
		let source: Rc<str> = Rc::from("x\n");
		assert_eq!(Token::new(TokenKind::Indent, source.clone(), 0, 0).describe(), "INDENT");
		assert_eq!(Token::new(TokenKind::Plain, source.clone(), 1, 2).describe(), "NEWLINE");
		assert_eq!(Token::new(TokenKind::Plain, source, 0, 1).describe(), "x");
	}
}
