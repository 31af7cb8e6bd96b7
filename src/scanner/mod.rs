//! Converts source text into tokens, synthesizing the INDENT/DEDENT markers
//! that bracket blocks.
//!
//! Smython has no braces; block structure is carried entirely by leading
//! whitespace, which must be spaces in multiples of four. The scanner tracks
//! the current indent depth and a pending depth measured at the start of each
//! line. Just before the first real token of a line is emitted, the two are
//! reconciled by emitting `INDENT` or `DEDENT` markers. Newlines are tokens
//! in their own right (simple statements end with one); blank lines and
//! comment-only lines are consumed silently and never touch the pending
//! indent. Parentheses do not suspend any of this.
//!
//! Before tokenizing, the source is normalized: a backslash immediately
//! followed by a newline joins the two physical lines, and a trailing newline
//! is appended so the final line ends like every other.

mod token;

pub(crate) use token::*;

use std::rc::Rc;

use crate::error::scanner::{ScanError, ScanErrorType};

/// A scanner for Smython source code
pub(crate) struct Scanner {
	/// Normalized source text, shared with every token produced from it
	source: Rc<str>,
	/// Byte offset of the character currently being considered
	pos:    usize,
	/// Current indent depth, in units of four spaces
	indent: usize,
}

impl Scanner {
	pub fn new(source: &str) -> Self {
		let mut normalized = source.replace("\\\n", "");
		if !normalized.ends_with('\n') {
			normalized.push('\n');
		}
		Self { source: Rc::from(normalized), pos: 0, indent: 0 }
	}

	/// Scan all tokens from the source code. The result always ends with a
	/// single `EOF`, with every `INDENT` balanced by a `DEDENT` before it.
	pub fn scan_tokens(mut self) -> Result<Vec<Token>, ScanError> {
		let mut tokens = Vec::new();
		let mut pending = 0;
		let mut at_line_start = true;
		loop {
			if at_line_start {
				self.start_of_line(&mut pending)?;
				at_line_start = false;
			}
			let Some(c) = self.peek() else { break };
			match c {
				'\n' => {
					tokens.push(self.token_at(TokenKind::Plain, self.pos, self.pos + 1));
					self.bump();
					at_line_start = true;
				}
				' ' => {
					self.bump();
				}
				'#' => {
					while self.peek().is_some_and(|c| c != '\n') {
						self.bump();
					}
				}
				'\'' | '"' => {
					self.sync_indent(&mut tokens, pending);
					self.string(&mut tokens)?;
				}
				c if c.is_ascii_digit() => {
					self.sync_indent(&mut tokens, pending);
					self.number(&mut tokens);
				}
				c if c.is_ascii_alphabetic() || c == '_' => {
					self.sync_indent(&mut tokens, pending);
					self.name(&mut tokens);
				}
				'(' | ')' | '[' | ']' | '{' | '}' | ':' | '.' | ',' | ';' => {
					self.sync_indent(&mut tokens, pending);
					let start = self.pos;
					self.bump();
					tokens.push(self.token_at(TokenKind::Plain, start, self.pos));
				}
				'+' | '-' | '*' | '/' | '%' | '<' | '>' | '=' | '|' | '&' => {
					self.sync_indent(&mut tokens, pending);
					let start = self.pos;
					self.bump();
					if self.peek() == Some('=') {
						self.bump();
					}
					tokens.push(self.token_at(TokenKind::Plain, start, self.pos));
				}
				'!' => {
					self.sync_indent(&mut tokens, pending);
					let start = self.pos;
					self.bump();
					if self.peek() != Some('=') {
						return Err(self.error(ScanErrorType::UnexpectedCharacter('!')));
					}
					self.bump();
					tokens.push(self.token_at(TokenKind::Plain, start, self.pos));
				}
				other => return Err(self.error(ScanErrorType::UnexpectedCharacter(other))),
			}
		}
		while self.indent > 0 {
			self.indent -= 1;
			tokens.push(self.token_at(TokenKind::Dedent, self.pos, self.pos));
		}
		tokens.push(self.token_at(TokenKind::Eof, self.pos, self.pos));
		Ok(tokens)
	}

	/// Measure the indent of the next non-blank line into `pending`. Blank
	/// and comment-only lines are consumed here and leave `pending` alone.
	fn start_of_line(&mut self, pending: &mut usize) -> Result<(), ScanError> {
		loop {
			let mut spaces = 0;
			while self.peek() == Some(' ') {
				self.bump();
				spaces += 1;
			}
			match self.peek() {
				Some('\t') => return Err(self.error(ScanErrorType::TabIndent)),
				Some('\n') => {
					self.bump();
				}
				Some('#') => {
					while self.peek().is_some_and(|c| c != '\n') {
						self.bump();
					}
					self.bump();
				}
				Some(_) => {
					if spaces % 4 != 0 {
						return Err(self.error(ScanErrorType::BadIndent(spaces)));
					}
					*pending = spaces / 4;
					return Ok(());
				}
				None => return Ok(()),
			}
		}
	}

	/// Reconcile the measured indent with the current one, right before a
	/// real token goes out.
	fn sync_indent(&mut self, tokens: &mut Vec<Token>, pending: usize) {
		while pending > self.indent {
			self.indent += 1;
			tokens.push(self.token_at(TokenKind::Indent, self.pos, self.pos));
		}
		while self.indent > pending {
			self.indent -= 1;
			tokens.push(self.token_at(TokenKind::Dedent, self.pos, self.pos));
		}
	}

	/// Scan a number literal: digits, optionally a dot followed by digits.
	fn number(&mut self, tokens: &mut Vec<Token>) {
		let start = self.pos;
		while self.peek().is_some_and(|c| c.is_ascii_digit()) {
			self.bump();
		}
		if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
			self.bump();
			while self.peek().is_some_and(|c| c.is_ascii_digit()) {
				self.bump();
			}
		}
		tokens.push(self.token_at(TokenKind::Plain, start, self.pos));
	}

	/// Scan an identifier or keyword: one alphanumeric/underscore run.
	fn name(&mut self, tokens: &mut Vec<Token>) {
		let start = self.pos;
		while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
			self.bump();
		}
		tokens.push(self.token_at(TokenKind::Plain, start, self.pos));
	}

	/// Scan a quoted string literal. The lexeme keeps quotes and raw escape
	/// pairs; decoding happens when the parser asks for the value.
	fn string(&mut self, tokens: &mut Vec<Token>) -> Result<(), ScanError> {
		let start = self.pos;
		let quote = self.bump().expect("string() called at a quote");
		loop {
			match self.peek() {
				None | Some('\n') => return Err(self.error(ScanErrorType::UnterminatedString)),
				Some('\\') => {
					self.bump();
					self.bump();
				}
				Some(c) if c == quote => {
					self.bump();
					break;
				}
				Some(_) => {
					self.bump();
				}
			}
		}
		tokens.push(self.token_at(TokenKind::Plain, start, self.pos));
		Ok(())
	}

	fn token_at(&self, kind: TokenKind, start: usize, end: usize) -> Token {
		Token::new(kind, self.source.clone(), start, end)
	}

	fn error(&self, kind: ScanErrorType) -> ScanError { ScanError::new(self.line(), kind) }

	fn line(&self) -> usize { self.source[..self.pos].matches('\n').count() + 1 }

	fn peek(&self) -> Option<char> { self.source[self.pos..].chars().next() }

	fn peek_second(&self) -> Option<char> { self.source[self.pos..].chars().nth(1) }

	fn bump(&mut self) -> Option<char> {
		let c = self.peek()?;
		self.pos += c.len_utf8();
		Some(c)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lexemes(input: &str) -> Vec<String> {
		let tokens = Scanner::new(input).scan_tokens().unwrap();
		tokens.iter().map(|t| t.describe().to_string()).collect()
	}

	fn scan_err(input: &str) -> String { Scanner::new(input).scan_tokens().unwrap_err().to_string() }

	#[test]
	fn scan_simple_statement() {
		assert_eq!(lexemes("a = 1\n"), ["a", "=", "1", "NEWLINE", "EOF"]);
		assert_eq!(lexemes("1 + 2 * 3"), ["1", "+", "2", "*", "3", "NEWLINE", "EOF"]);
	}

	#[test]
	fn scan_operators() {
		assert_eq!(
			lexemes("a <= b != c |= d"),
			["a", "<=", "b", "!=", "c", "|=", "d", "NEWLINE", "EOF"]
		);
		assert_eq!(lexemes("x += 1; x //"), ["x", "+=", "1", ";", "x", "/", "/", "NEWLINE", "EOF"]);
	}

	#[test]
	fn scan_blocks() {
		let input = "if a:\n    b\n    if c:\n        d\ne\n";
		assert_eq!(
			lexemes(input),
			[
				"if", "a", ":", "NEWLINE", "INDENT", "b", "NEWLINE", "if", "c", ":", "NEWLINE", "INDENT",
				"d", "NEWLINE", "DEDENT", "DEDENT", "e", "NEWLINE", "EOF"
			]
		);
	}

	#[test]
	fn dangling_indent_closed_at_eof() {
		let input = "while a:\n    b\n";
		assert_eq!(
			lexemes(input),
			["while", "a", ":", "NEWLINE", "INDENT", "b", "NEWLINE", "DEDENT", "EOF"]
		);
	}

	#[test]
	fn blank_and_comment_lines_are_silent() {
		let input = "if a:\n    b\n\n# comment\n    # indented comment\n    c\n";
		assert_eq!(
			lexemes(input),
			["if", "a", ":", "NEWLINE", "INDENT", "b", "NEWLINE", "c", "NEWLINE", "DEDENT", "EOF"]
		);
	}

	#[test]
	fn trailing_comment_is_silent() {
		assert_eq!(lexemes("a = 1 # set a\n"), ["a", "=", "1", "NEWLINE", "EOF"]);
	}

	#[test]
	fn line_continuation_joins_lines() {
		assert_eq!(lexemes("a = 1 + \\\n2\n"), ["a", "=", "1", "+", "2", "NEWLINE", "EOF"]);
	}

	#[test]
	fn missing_final_newline_is_supplied() {
		assert_eq!(lexemes("a"), ["a", "NEWLINE", "EOF"]);
	}

	#[test]
	fn scan_strings() {
		assert_eq!(lexemes("'a' \"b\"\n"), ["'a'", "\"b\"", "NEWLINE", "EOF"]);
		assert_eq!(lexemes(r#"'it\'s'"#), [r#"'it\'s'"#, "NEWLINE", "EOF"]);
	}

	#[test]
	fn scan_errors() {
		assert_eq!(scan_err("\tx\n"), "SyntaxError: tab in indentation at line 1");
		assert_eq!(
			scan_err("if a:\n   b\n"),
			"SyntaxError: indentation of 3 spaces is not a multiple of four at line 2"
		);
		assert_eq!(scan_err("a = 'oops\n"), "SyntaxError: unterminated string literal at line 1");
		assert_eq!(scan_err("a = 1 ^ 2\n"), "SyntaxError: unexpected character '^' at line 1");
		assert_eq!(scan_err("a!b\n"), "SyntaxError: unexpected character '!' at line 1");
	}

	#[test]
	fn every_scan_ends_with_one_eof_and_balanced_indents() {
		let programs = [
			"",
			"a\n",
			"if a:\n    if b:\n        c\n",
			"def f():\n    return 1\nf()\n",
			"while a:\n    b\nelse:\n    c\n",
		];
		for program in programs {
			let tokens = Scanner::new(program).scan_tokens().unwrap();
			let eofs = tokens.iter().filter(|t| t.kind() == TokenKind::Eof).count();
			assert_eq!(eofs, 1, "program: {program:?}");
			assert_eq!(tokens.last().unwrap().kind(), TokenKind::Eof);
			let indents = tokens.iter().filter(|t| t.kind() == TokenKind::Indent).count();
			let dedents = tokens.iter().filter(|t| t.kind() == TokenKind::Dedent).count();
			assert_eq!(indents, dedents, "program: {program:?}");
		}
	}
}
