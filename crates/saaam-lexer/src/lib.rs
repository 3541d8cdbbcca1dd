//! Hand-written lexer for SAAAM source text.
//!
//! Scans a source string into a finite token stream ending with a single
//! [`TokenKind::Eof`]. Matching is longest-match, priority-ordered exactly as
//! laid out in the design: whitespace/comments, then keywords, then domain
//! keywords, then identifiers, numbers, strings, operators, punctuation, and
//! brackets. A byte that matches none of these records one error and is
//! skipped; lexing always continues and always terminates.

use saaam_diagnostics::DiagnosticSink;
use saaam_diagnostics_codes::DiagnosticCode;
use saaam_token::{Token, TokenKind, classify_word};

/// Scans a `&str` into a [`Token`] stream.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, bytes: input.as_bytes(), position: 0 }
    }

    /// Run the lexer to completion, recording errors on `diagnostics`.
    ///
    /// The returned vector always ends with exactly one `Eof` token and its
    /// `offset`s are strictly increasing.
    pub fn tokenize(mut self, diagnostics: &mut DiagnosticSink) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token(diagnostics);
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return tokens;
            }
        }
    }

    fn next_token(&mut self, diagnostics: &mut DiagnosticSink) -> Token {
        loop {
            self.skip_whitespace_and_comments();

            if self.position >= self.bytes.len() {
                return Token::eof(self.position);
            }

            let start = self.position;
            let c = self.bytes[start];

            if c.is_ascii_alphabetic() || c == b'_' {
                return self.scan_word(start);
            }
            if c.is_ascii_digit() {
                return self.scan_number(start);
            }
            if c == b'"' || c == b'\'' {
                return self.scan_string(start, c, diagnostics);
            }
            if let Some(tok) = self.try_scan_operator(start) {
                return tok;
            }
            if matches!(c, b'.' | b',' | b';' | b'(' | b')') {
                self.position += 1;
                return Token::new(TokenKind::Punct, self.slice(start), start);
            }
            if matches!(c, b'[' | b']' | b'{' | b'}') {
                self.position += 1;
                return Token::new(TokenKind::Bracket, self.slice(start), start);
            }

            diagnostics.error(
                DiagnosticCode::UnexpectedCharacter,
                format!("unexpected character '{}'", c as char),
                start,
            );
            self.position += 1;
            // Error recovery: record and keep scanning for the next real token.
        }
    }

    fn slice(&self, start: usize) -> &'a str {
        &self.input[start..self.position]
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.position < self.bytes.len() && self.bytes[self.position].is_ascii_whitespace()
            {
                self.position += 1;
            }
            if self.starts_with("//") {
                self.position = match memchr::memchr(b'\n', &self.bytes[self.position..]) {
                    Some(rel) => self.position + rel,
                    None => self.bytes.len(),
                };
                continue;
            }
            if self.starts_with("/*") {
                self.position += 2;
                self.position = match memchr::memmem::find(&self.bytes[self.position..], b"*/") {
                    Some(rel) => self.position + rel + 2,
                    None => self.bytes.len(),
                };
                continue;
            }
            break;
        }
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.input[self.position..].starts_with(pat)
    }

    fn scan_word(&mut self, start: usize) -> Token {
        while self.position < self.bytes.len()
            && (self.bytes[self.position].is_ascii_alphanumeric() || self.bytes[self.position] == b'_')
        {
            self.position += 1;
        }
        let text = self.slice(start);
        Token::new(classify_word(text), text, start)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while self.position < self.bytes.len() && self.bytes[self.position].is_ascii_digit() {
            self.position += 1;
        }
        if self.position < self.bytes.len()
            && self.bytes[self.position] == b'.'
            && self.position + 1 < self.bytes.len()
            && self.bytes[self.position + 1].is_ascii_digit()
        {
            self.position += 1;
            while self.position < self.bytes.len() && self.bytes[self.position].is_ascii_digit() {
                self.position += 1;
            }
        }
        if self.position < self.bytes.len() && matches!(self.bytes[self.position], b'e' | b'E') {
            let mut lookahead = self.position + 1;
            if lookahead < self.bytes.len() && matches!(self.bytes[lookahead], b'+' | b'-') {
                lookahead += 1;
            }
            if lookahead < self.bytes.len() && self.bytes[lookahead].is_ascii_digit() {
                self.position = lookahead;
                while self.position < self.bytes.len() && self.bytes[self.position].is_ascii_digit()
                {
                    self.position += 1;
                }
            }
        }
        Token::new(TokenKind::Number, self.slice(start), start)
    }

    fn scan_string(&mut self, start: usize, quote: u8, diagnostics: &mut DiagnosticSink) -> Token {
        self.position += 1;
        let mut terminated = false;
        while self.position < self.bytes.len() {
            match memchr::memchr3(b'\\', b'\n', quote, &self.bytes[self.position..]) {
                None => {
                    self.position = self.bytes.len();
                    break;
                }
                Some(rel) => {
                    self.position += rel;
                    let b = self.bytes[self.position];
                    if b == b'\\' && self.position + 1 < self.bytes.len() {
                        self.position += 2;
                        continue;
                    }
                    if b == b'\n' {
                        break;
                    }
                    // Only `quote` is left among the three bytes memchr3 searched for.
                    self.position += 1;
                    terminated = true;
                    break;
                }
            }
        }
        if !terminated {
            diagnostics.error(
                DiagnosticCode::UnexpectedCharacter,
                "unterminated string literal",
                start,
            );
        }
        Token::new(TokenKind::String, self.slice(start), start)
    }

    /// Three-, then two-, then one-character operators, longest match first.
    fn try_scan_operator(&mut self, start: usize) -> Option<Token> {
        const THREE: &[&str] = &["..."];
        const TWO: &[&str] = &[
            "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=",
        ];
        const ONE: &[u8] = b"+-*/=<>!&|^%?:";

        for op in THREE {
            if self.starts_with(op) {
                self.position += op.len();
                return Some(Token::new(TokenKind::Operator, self.slice(start), start));
            }
        }
        for op in TWO {
            if self.starts_with(op) {
                self.position += op.len();
                return Some(Token::new(TokenKind::Operator, self.slice(start), start));
            }
        }
        if ONE.contains(&self.bytes[start]) {
            self.position += 1;
            return Some(Token::new(TokenKind::Operator, self.slice(start), start));
        }
        None
    }
}

/// Convenience entry point: tokenize `source` in one call.
pub fn tokenize(source: &str, diagnostics: &mut DiagnosticSink) -> Vec<Token> {
    Lexer::new(source).tokenize(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_a_var_decl() -> TestResult {
        let mut diags = DiagnosticSink::new();
        let tokens = tokenize("var v = keyboard_check(vk_space);", &mut diags);
        assert!(!diags.has_errors());
        let last = tokens.last().ok_or("expected at least one token")?;
        assert_eq!(last.kind, TokenKind::Eof);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
                TokenKind::Punct,
                TokenKind::Identifier,
                TokenKind::Punct,
                TokenKind::Punct,
                TokenKind::Eof,
            ]
        );
        Ok(())
    }

    #[test]
    fn terminates_and_reports_unexpected_character() -> TestResult {
        let mut diags = DiagnosticSink::new();
        let tokens = tokenize("var v = @;", &mut diags);
        assert!(diags.has_errors());
        let last = tokens.last().ok_or("expected at least one token")?;
        assert_eq!(last.kind, TokenKind::Eof);
        Ok(())
    }

    #[test]
    fn offsets_are_strictly_increasing_and_in_bounds() {
        let mut diags = DiagnosticSink::new();
        let source = "function step(dt) { position.x += velocity.x * dt; }";
        let tokens = tokenize(source, &mut diags);
        let mut last = None;
        for t in &tokens {
            assert!(t.offset <= source.len());
            if let Some(prev) = last {
                assert!(t.offset > prev, "offsets must be strictly increasing");
            }
            last = Some(t.offset);
        }
    }

    #[test]
    fn scans_vector_and_float_literals() {
        let mut diags = DiagnosticSink::new();
        let tokens = tokenize("vec2(1, 2.5e-3)", &mut diags);
        assert!(!diags.has_errors());
        assert_eq!(tokens[0].kind, TokenKind::DomainKeyword);
        let nums: Vec<_> =
            tokens.iter().filter(|t| t.kind == TokenKind::Number).map(|t| &*t.text).collect();
        assert_eq!(nums, vec!["1", "2.5e-3"]);
    }

    #[test]
    fn skips_line_and_block_comments() {
        let mut diags = DiagnosticSink::new();
        let tokens = tokenize("// hi\nvar /* inline */ a = 1;", &mut diags);
        assert!(!diags.has_errors());
        assert_eq!(kinds(&tokens)[0], TokenKind::Keyword);
    }
}
