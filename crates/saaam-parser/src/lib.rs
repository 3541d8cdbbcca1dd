//! Recursive-descent parser for the SAAAM compiler.
//!
//! Consumes the token stream produced by `saaam-lexer` with a single token
//! of lookahead and produces the AST defined in `saaam-ast`. Parse errors
//! inside a statement are recoverable: the parser records a diagnostic,
//! skips ahead to the next `;` or `}`, and resumes with the next statement
//! at whatever nesting level it was in. Running out of input before a
//! block's closing `}` is the one unrecoverable condition — it aborts the
//! whole parse, which the facade turns into a diagnostic-only result.

use saaam_ast::{BindingForm, LiteralValue, Node, NodeKind, Property, PropertyKey, SourceLocation};
use saaam_diagnostics::DiagnosticSink;
use saaam_diagnostics_codes::DiagnosticCode;
use saaam_token::{Token, TokenKind};

/// Input ran out before a block's closing `}`. Unwinds the whole parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseAbort;

/// Outcome of parsing one statement-shaped production.
enum StmtError {
    /// A diagnostic was recorded; resynchronise and keep parsing siblings.
    Recovered,
    /// Fatal: propagate all the way out of [`parse`].
    Abort,
}

type PResult<T> = Result<T, StmtError>;

/// Parse a full program from `tokens`, recording diagnostics on `diagnostics`.
pub fn parse(tokens: &[Token], diagnostics: &mut DiagnosticSink) -> Result<Node, ParseAbort> {
    let mut parser = Parser { tokens, pos: 0, diagnostics };
    let start = parser.peek().offset;
    let mut body = Vec::new();
    while !parser.is_at_end() {
        match parser.parse_statement() {
            Ok(node) => body.push(node),
            Err(StmtError::Abort) => return Err(ParseAbort),
            Err(StmtError::Recovered) => parser.synchronize(),
        }
    }
    let end = parser.previous_end();
    Ok(Node::new(NodeKind::Program { body }, SourceLocation::new(start, end.max(start))))
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    diagnostics: &'a mut DiagnosticSink,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    /// Byte offset just past the most recently consumed token.
    fn previous_end(&self) -> usize {
        if self.pos == 0 {
            self.tokens[0].offset
        } else {
            let tok = &self.tokens[self.pos - 1];
            tok.offset + tok.text.len()
        }
    }

    fn span_from(&self, start: usize) -> SourceLocation {
        SourceLocation::new(start, self.previous_end().max(start))
    }

    fn check(&self, kind: TokenKind, text: &str) -> bool {
        let tok = self.peek();
        tok.kind == kind && &*tok.text == text
    }

    fn check_kind(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_keyword(&self, text: &str) -> bool {
        self.check(TokenKind::Keyword, text)
    }

    fn check_punct(&self, text: &str) -> bool {
        self.check(TokenKind::Punct, text)
    }

    fn check_bracket(&self, text: &str) -> bool {
        self.check(TokenKind::Bracket, text)
    }

    fn check_operator(&self, text: &str) -> bool {
        self.check(TokenKind::Operator, text)
    }

    fn unexpected(&mut self, message: impl Into<String>) -> StmtError {
        self.diagnostics.error(DiagnosticCode::UnexpectedToken, message, self.peek().offset);
        StmtError::Recovered
    }

    fn expect(&mut self, kind: TokenKind, text: &str, context: &str) -> PResult<Token> {
        if self.check(kind, text) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(format!("expected '{text}' {context}")))
        }
    }

    /// A declaration/parameter/member name: a plain identifier or one of the
    /// domain keywords used as barewords (`create`, `step`, `yield`, ...).
    fn expect_name(&mut self, context: &str) -> PResult<String> {
        let tok = self.peek();
        if matches!(tok.kind, TokenKind::Identifier | TokenKind::DomainKeyword) {
            Ok(self.advance().text.to_string())
        } else {
            Err(self.unexpected(format!("expected an identifier {context}")))
        }
    }

    /// Consume tokens through (and including) the next `;` or `}`, or EOF.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            let tok = self.advance();
            if self.check(TokenKind::Eof, "") {
                break;
            }
            if (tok.kind == TokenKind::Punct && &*tok.text == ";")
                || (tok.kind == TokenKind::Bracket && &*tok.text == "}")
            {
                return;
            }
        }
    }

    fn consume_optional_semicolon(&mut self) {
        if self.check_punct(";") {
            self.advance();
        } else {
            self.diagnostics.warn(
                DiagnosticCode::MissingSemicolon,
                "missing semicolon",
                self.previous_end(),
            );
        }
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    fn parse_statement(&mut self) -> PResult<Node> {
        let tok = self.peek();
        match (tok.kind, &*tok.text) {
            (TokenKind::Keyword, "var" | "const" | "let") => self.parse_var_decl(),
            (TokenKind::Keyword, "function") => self.parse_func_decl(),
            (TokenKind::Bracket, "{") => self.parse_block(),
            (TokenKind::Keyword, "if") => self.parse_if(),
            (TokenKind::Keyword, "for") => self.parse_for(),
            (TokenKind::Keyword, "while") => self.parse_while(),
            (TokenKind::Keyword, "do") => self.parse_do_while(),
            (TokenKind::Keyword, "switch") => self.parse_switch(),
            (TokenKind::Keyword, "return") => self.parse_return(),
            (TokenKind::Keyword, "break") => self.parse_break(),
            (TokenKind::Keyword, "continue") => self.parse_continue(),
            (TokenKind::Punct, ";") => {
                let start = self.advance().offset;
                Ok(Node::new(NodeKind::Empty, self.span_from(start)))
            }
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_var_decl(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        let keyword = self.advance();
        let binding = match &*keyword.text {
            "var" => BindingForm::Mutable,
            "const" => BindingForm::Immutable,
            _ => BindingForm::Lexical,
        };
        let name = self.expect_name("after binding keyword")?;
        let init = if self.check_operator("=") {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.consume_optional_semicolon();
        Ok(Node::new(NodeKind::VarDecl { binding, name, init }, self.span_from(start)))
    }

    /// `for`-clause variant: no trailing semicolon (the caller consumes it).
    fn parse_var_decl_clause(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        let keyword = self.advance();
        let binding = match &*keyword.text {
            "var" => BindingForm::Mutable,
            "const" => BindingForm::Immutable,
            _ => BindingForm::Lexical,
        };
        let name = self.expect_name("after binding keyword")?;
        let init = if self.check_operator("=") {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        Ok(Node::new(NodeKind::VarDecl { binding, name, init }, self.span_from(start)))
    }

    fn parse_func_decl(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        self.advance(); // 'function'
        let name = self.expect_name("as the function name")?;
        self.expect(TokenKind::Punct, "(", "after function name")?;
        let mut params = Vec::new();
        if !self.check_punct(")") {
            loop {
                params.push(self.expect_name("as a parameter name")?);
                if self.check_punct(",") {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::Punct, ")", "after parameter list")?;

        if params.is_empty() {
            match name.as_str() {
                "step" => self.diagnostics.warn(
                    DiagnosticCode::MissingLifecycleParameter,
                    "`step` should accept a time-delta parameter",
                    start,
                ),
                "draw" => self.diagnostics.warn(
                    DiagnosticCode::MissingLifecycleParameter,
                    "`draw` should accept a drawing-context parameter",
                    start,
                ),
                _ => {}
            }
        }

        if !self.check_bracket("{") {
            return Err(self.unexpected("expected '{' to begin function body"));
        }
        let body = self.parse_block()?;
        Ok(Node::new(NodeKind::FuncDecl { name, params, body: Box::new(body) }, self.span_from(start)))
    }

    fn parse_block(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        self.advance(); // '{'
        let mut body = Vec::new();
        loop {
            if self.check_bracket("}") {
                self.advance();
                break;
            }
            if self.is_at_end() {
                self.diagnostics.error(
                    DiagnosticCode::UnexpectedEof,
                    "unexpected end of input inside block",
                    self.peek().offset,
                );
                return Err(StmtError::Abort);
            }
            match self.parse_statement() {
                Ok(node) => body.push(node),
                Err(StmtError::Abort) => return Err(StmtError::Abort),
                Err(StmtError::Recovered) => self.synchronize(),
            }
        }
        Ok(Node::new(NodeKind::Block { body }, self.span_from(start)))
    }

    fn parse_if(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        self.advance(); // 'if'
        self.expect(TokenKind::Punct, "(", "after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Punct, ")", "after if-condition")?;
        let then_branch = self.parse_statement()?;
        let else_branch = if self.check_keyword("else") {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Node::new(
            NodeKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            },
            self.span_from(start),
        ))
    }

    fn parse_for(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        self.advance(); // 'for'
        self.expect(TokenKind::Punct, "(", "after 'for'")?;

        let init = if self.check_punct(";") {
            None
        } else if matches!(&*self.peek().text, "var" | "const" | "let")
            && self.check_kind(TokenKind::Keyword)
        {
            Some(Box::new(self.parse_var_decl_clause()?))
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(TokenKind::Punct, ";", "after for-loop initializer")?;

        let condition = if self.check_punct(";") {
            Node::new(NodeKind::Literal(LiteralValue::Bool(true)), SourceLocation::empty(self.peek().offset))
        } else {
            self.parse_expression()?
        };
        self.expect(TokenKind::Punct, ";", "after for-loop condition")?;

        let update = if self.check_punct(")") { None } else { Some(Box::new(self.parse_expression()?)) };
        self.expect(TokenKind::Punct, ")", "after for-loop clauses")?;

        let body = self.parse_statement()?;
        Ok(Node::new(
            NodeKind::For { init, condition: Box::new(condition), update, body: Box::new(body) },
            self.span_from(start),
        ))
    }

    fn parse_while(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        self.advance(); // 'while'
        self.expect(TokenKind::Punct, "(", "after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Punct, ")", "after while-condition")?;
        let body = self.parse_statement()?;
        Ok(Node::new(NodeKind::While { condition: Box::new(condition), body: Box::new(body) }, self.span_from(start)))
    }

    fn parse_do_while(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        self.advance(); // 'do'
        let body = self.parse_statement()?;
        self.expect(TokenKind::Keyword, "while", "after do-block body")?;
        self.expect(TokenKind::Punct, "(", "after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Punct, ")", "after do-while condition")?;
        if self.check_punct(";") {
            self.advance();
        } else {
            self.diagnostics.warn(
                DiagnosticCode::MissingSemicolon,
                "expected ';' after do-while statement",
                self.previous_end(),
            );
        }
        Ok(Node::new(NodeKind::DoWhile { body: Box::new(body), condition: Box::new(condition) }, self.span_from(start)))
    }

    fn parse_switch(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        self.advance(); // 'switch'
        self.expect(TokenKind::Punct, "(", "after 'switch'")?;
        let discriminant = self.parse_expression()?;
        self.expect(TokenKind::Punct, ")", "after switch-discriminant")?;
        self.expect(TokenKind::Bracket, "{", "to begin switch body")?;

        let mut cases = Vec::new();
        loop {
            if self.check_bracket("}") {
                self.advance();
                break;
            }
            if self.is_at_end() {
                self.diagnostics.error(
                    DiagnosticCode::UnexpectedEof,
                    "unexpected end of input inside switch",
                    self.peek().offset,
                );
                return Err(StmtError::Abort);
            }

            let case_start = self.peek().offset;
            let test = if self.check_keyword("case") {
                self.advance();
                let test_expr = self.parse_expression()?;
                self.expect(TokenKind::Operator, ":", "after case expression")?;
                Some(Box::new(test_expr))
            } else if self.check_keyword("default") {
                self.advance();
                self.expect(TokenKind::Operator, ":", "after 'default'")?;
                None
            } else {
                return Err(self.unexpected("expected 'case' or 'default'"));
            };

            let mut body = Vec::new();
            while !self.check_keyword("case")
                && !self.check_keyword("default")
                && !self.check_bracket("}")
                && !self.is_at_end()
            {
                match self.parse_statement() {
                    Ok(node) => body.push(node),
                    Err(StmtError::Abort) => return Err(StmtError::Abort),
                    Err(StmtError::Recovered) => self.synchronize(),
                }
            }
            cases.push(Node::new(NodeKind::SwitchCase { test, body }, self.span_from(case_start)));
        }

        Ok(Node::new(NodeKind::Switch { discriminant: Box::new(discriminant), cases }, self.span_from(start)))
    }

    fn parse_return(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        self.advance(); // 'return'
        let argument = if self.check_punct(";") || self.check_bracket("}") || self.is_at_end() {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.consume_optional_semicolon();
        Ok(Node::new(NodeKind::Return { argument }, self.span_from(start)))
    }

    fn parse_break(&mut self) -> PResult<Node> {
        let start = self.advance().offset; // 'break'
        self.consume_optional_semicolon();
        Ok(Node::new(NodeKind::Break, self.span_from(start)))
    }

    fn parse_continue(&mut self) -> PResult<Node> {
        let start = self.advance().offset; // 'continue'
        self.consume_optional_semicolon();
        Ok(Node::new(NodeKind::Continue, self.span_from(start)))
    }

    fn parse_expr_stmt(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        let expr = self.parse_expression()?;
        self.consume_optional_semicolon();
        Ok(Node::new(NodeKind::ExprStmt { expr: Box::new(expr) }, self.span_from(start)))
    }

    // ---------------------------------------------------------------
    // Expressions — lowest to highest precedence
    // ---------------------------------------------------------------

    fn parse_expression(&mut self) -> PResult<Node> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        let target = self.parse_logical_or()?;
        if self.check_kind(TokenKind::Operator)
            && matches!(&*self.peek().text, "=" | "+=" | "-=" | "*=" | "/=" | "%=")
        {
            let op = self.advance().text.to_string();
            let value = self.parse_assignment()?; // right-associative
            return Ok(Node::new(
                NodeKind::Assign { op, target: Box::new(target), value: Box::new(value) },
                self.span_from(start),
            ));
        }
        Ok(target)
    }

    fn parse_binary_level(
        &mut self,
        ops: &[&str],
        next: fn(&mut Self) -> PResult<Node>,
    ) -> PResult<Node> {
        let start = self.peek().offset;
        let mut left = next(self)?;
        while self.check_kind(TokenKind::Operator) && ops.contains(&&*self.peek().text) {
            let op = self.advance().text.to_string();
            let right = next(self)?;
            left = Node::new(
                NodeKind::Binary { op, left: Box::new(left), right: Box::new(right) },
                self.span_from(start),
            );
        }
        Ok(left)
    }

    fn parse_logical_or(&mut self) -> PResult<Node> {
        self.parse_binary_level(&["||"], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> PResult<Node> {
        self.parse_binary_level(&["&&"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> PResult<Node> {
        self.parse_binary_level(&["==", "!="], Self::parse_compare)
    }

    fn parse_compare(&mut self) -> PResult<Node> {
        self.parse_binary_level(&["<", "<=", ">", ">="], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> PResult<Node> {
        self.parse_binary_level(&["+", "-"], Self::parse_mult)
    }

    fn parse_mult(&mut self) -> PResult<Node> {
        self.parse_binary_level(&["*", "/", "%"], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        if self.check_kind(TokenKind::Operator) && matches!(&*self.peek().text, "+" | "-" | "!") {
            let op = self.advance().text.to_string();
            let operand = self.parse_unary()?;
            return Ok(Node::new(NodeKind::Unary { op, operand: Box::new(operand) }, self.span_from(start)));
        }
        self.parse_call_or_member()
    }

    fn parse_call_or_member(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        let mut expr = self.parse_primary()?;
        loop {
            if self.check_punct("(") {
                self.advance();
                let mut args = Vec::new();
                if !self.check_punct(")") {
                    loop {
                        args.push(self.parse_expression()?);
                        if self.check_punct(",") {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                self.expect(TokenKind::Punct, ")", "to close call argument list")?;
                expr = Node::new(
                    NodeKind::Call { callee: Box::new(expr), args },
                    self.span_from(start),
                );
            } else if self.check_punct(".") {
                self.advance();
                let name_start = self.peek().offset;
                let name = self.expect_name("after '.'")?;
                let property_span = SourceLocation::new(name_start, self.previous_end());
                let property = Node::new(NodeKind::Identifier { name, is_intrinsic: false }, property_span);
                expr = Node::new(
                    NodeKind::Member { object: Box::new(expr), property: Box::new(property), computed: false },
                    self.span_from(start),
                );
            } else if self.check_bracket("[") {
                self.advance();
                let property = self.parse_expression()?;
                self.expect(TokenKind::Bracket, "]", "to close computed member access")?;
                expr = Node::new(
                    NodeKind::Member { object: Box::new(expr), property: Box::new(property), computed: true },
                    self.span_from(start),
                );
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        let tok = self.peek().clone();
        match (tok.kind, &*tok.text) {
            (TokenKind::Keyword, "this") => {
                self.advance();
                Ok(Node::new(NodeKind::ThisRef, self.span_from(start)))
            }
            (TokenKind::Keyword, "true") => {
                self.advance();
                Ok(Node::new(NodeKind::Literal(LiteralValue::Bool(true)), self.span_from(start)))
            }
            (TokenKind::Keyword, "false") => {
                self.advance();
                Ok(Node::new(NodeKind::Literal(LiteralValue::Bool(false)), self.span_from(start)))
            }
            (TokenKind::Keyword, "null") => {
                self.advance();
                Ok(Node::new(NodeKind::Literal(LiteralValue::Null), self.span_from(start)))
            }
            (TokenKind::Keyword, "undefined") => {
                self.advance();
                Ok(Node::new(NodeKind::Literal(LiteralValue::Undefined), self.span_from(start)))
            }
            (TokenKind::DomainKeyword, "vec2") => self.parse_vec_lit(2),
            (TokenKind::DomainKeyword, "vec3") => self.parse_vec_lit(3),
            (TokenKind::Identifier, _) | (TokenKind::DomainKeyword, _) => {
                let name = self.advance().text.to_string();
                let is_intrinsic = saaam_intrinsics::is_intrinsic(&name);
                Ok(Node::new(NodeKind::Identifier { name, is_intrinsic }, self.span_from(start)))
            }
            (TokenKind::Number, _) => {
                self.advance();
                let value = tok.text.parse::<f64>().unwrap_or(0.0);
                Ok(Node::new(NodeKind::Literal(LiteralValue::Number(value)), self.span_from(start)))
            }
            (TokenKind::String, _) => {
                self.advance();
                Ok(Node::new(NodeKind::Literal(LiteralValue::String(unescape_string(&tok.text))), self.span_from(start)))
            }
            (TokenKind::Bracket, "{") => self.parse_object_literal(),
            (TokenKind::Bracket, "[") => self.parse_array_literal(),
            (TokenKind::Punct, "(") => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Punct, ")", "to close parenthesised expression")?;
                Ok(expr)
            }
            _ => Err(self.unexpected(format!("unexpected token '{}'", tok.text))),
        }
    }

    fn parse_vec_lit(&mut self, arity: usize) -> PResult<Node> {
        let start = self.peek().offset;
        self.advance(); // 'vec2' | 'vec3'
        self.expect(TokenKind::Punct, "(", "after vector constructor")?;
        let x = self.parse_expression()?;
        self.expect(TokenKind::Punct, ",", "between vector components")?;
        let y = self.parse_expression()?;
        if arity == 2 {
            self.expect(TokenKind::Punct, ")", "to close vec2(...)")?;
            return Ok(Node::new(NodeKind::Vec2Lit { x: Box::new(x), y: Box::new(y) }, self.span_from(start)));
        }
        self.expect(TokenKind::Punct, ",", "between vector components")?;
        let z = self.parse_expression()?;
        self.expect(TokenKind::Punct, ")", "to close vec3(...)")?;
        Ok(Node::new(NodeKind::Vec3Lit { x: Box::new(x), y: Box::new(y), z: Box::new(z) }, self.span_from(start)))
    }

    fn parse_property_key(&mut self) -> PResult<(PropertyKey, bool)> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::String => {
                self.advance();
                Ok((PropertyKey::String(unescape_string(&tok.text)), false))
            }
            TokenKind::Identifier | TokenKind::Keyword | TokenKind::DomainKeyword => {
                self.advance();
                Ok((PropertyKey::Identifier(tok.text.to_string()), false))
            }
            TokenKind::Bracket if &*tok.text == "[" => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Bracket, "]", "after computed property key")?;
                Ok((PropertyKey::Expr(Box::new(expr)), true))
            }
            _ => Err(self.unexpected("expected an object literal key")),
        }
    }

    fn parse_object_literal(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        self.advance(); // '{'
        let mut properties = Vec::new();
        loop {
            if self.check_bracket("}") {
                self.advance();
                break;
            }
            let key_start = self.peek().offset;
            let (key, computed) = self.parse_property_key()?;
            let value = if !computed && !self.check_operator(":") {
                // Shorthand `{x}` => `{x: x}`; only identifier-shaped keys qualify.
                match &key {
                    PropertyKey::Identifier(name) => {
                        let span = SourceLocation::new(key_start, self.previous_end());
                        Node::new(
                            NodeKind::Identifier {
                                name: name.clone(),
                                is_intrinsic: saaam_intrinsics::is_intrinsic(name),
                            },
                            span,
                        )
                    }
                    _ => {
                        self.expect(TokenKind::Operator, ":", "after object literal key")?;
                        self.parse_expression()?
                    }
                }
            } else {
                self.expect(TokenKind::Operator, ":", "after object literal key")?;
                self.parse_expression()?
            };
            properties.push(Property { key, value: Box::new(value), computed });

            if self.check_punct(",") {
                self.advance();
                if self.check_bracket("}") {
                    self.advance();
                    break;
                }
                continue;
            }
            if self.check_bracket("}") {
                self.advance();
                break;
            }
            self.diagnostics.warn(
                DiagnosticCode::UnexpectedToken,
                "expected ',' between object literal properties",
                self.peek().offset,
            );
        }
        Ok(Node::new(NodeKind::ObjectLit { properties }, self.span_from(start)))
    }

    fn parse_array_literal(&mut self) -> PResult<Node> {
        let start = self.peek().offset;
        self.advance(); // '['
        let mut elements = Vec::new();
        loop {
            if self.check_bracket("]") {
                break;
            }
            if self.check_punct(",") {
                elements.push(None); // hole
                self.advance();
                continue;
            }
            elements.push(Some(self.parse_expression()?));
            if self.check_punct(",") {
                self.advance();
                if self.check_bracket("]") {
                    break;
                }
                continue;
            }
            break;
        }
        self.expect(TokenKind::Bracket, "]", "to close array literal")?;
        Ok(Node::new(NodeKind::ArrayLit { elements }, self.span_from(start)))
    }
}

/// Strips the surrounding quotes from a scanned string lexeme and resolves
/// its `\`-escapes. Tolerates an unterminated lexeme (missing closing quote).
fn unescape_string(lexeme: &str) -> String {
    let without_open = lexeme.get(1..).unwrap_or("");
    let inner = without_open.strip_suffix(['"', '\'']).unwrap_or(without_open);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use saaam_diagnostics::DiagnosticSink;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn parse_source(source: &str) -> Result<(Node, DiagnosticSink), Box<dyn std::error::Error>> {
        let mut diagnostics = DiagnosticSink::new();
        let tokens = saaam_lexer::tokenize(source, &mut diagnostics);
        let ast = parse(&tokens, &mut diagnostics).map_err(|_| "parse aborted unexpectedly")?;
        Ok((ast, diagnostics))
    }

    fn body_of(node: &Node) -> Result<&[Node], Box<dyn std::error::Error>> {
        match &node.kind {
            NodeKind::Program { body } => Ok(body),
            other => Err(format!("expected Program, got {other:?}").into()),
        }
    }

    #[test]
    fn parses_var_decl_with_binding_forms() -> TestResult {
        let (ast, diags) = parse_source("var a = 1; const b = 2; let c = 3;")?;
        assert!(!diags.has_errors());
        let body = body_of(&ast)?;
        assert_eq!(body.len(), 3);
        match &body[0].kind {
            NodeKind::VarDecl { binding, name, .. } => {
                assert_eq!(*binding, BindingForm::Mutable);
                assert_eq!(name, "a");
            }
            other => return Err(format!("unexpected {other:?}").into()),
        }
        Ok(())
    }

    fn object_properties(node: &Node) -> Result<&[Property], Box<dyn std::error::Error>> {
        match &body_of(node)?[0].kind {
            NodeKind::VarDecl { init: Some(init), .. } => match &init.kind {
                NodeKind::ObjectLit { properties } => Ok(properties),
                other => Err(format!("unexpected {other:?}").into()),
            },
            other => Err(format!("unexpected {other:?}").into()),
        }
    }

    #[test]
    fn object_shorthand_matches_explicit_form() -> TestResult {
        // Equal in shape (key, computed flag, value identifier), not in byte
        // position — `{x}` and `{x: x}` span different source lengths.
        let (shorthand, _) = parse_source("var o = {x};")?;
        let (explicit, _) = parse_source("var o = {x: x};")?;
        let shorthand_props = object_properties(&shorthand)?;
        let explicit_props = object_properties(&explicit)?;
        assert_eq!(shorthand_props.len(), 1);
        assert_eq!(explicit_props.len(), 1);
        assert_eq!(shorthand_props[0].key, explicit_props[0].key);
        assert_eq!(shorthand_props[0].computed, explicit_props[0].computed);
        match (&shorthand_props[0].value.kind, &explicit_props[0].value.kind) {
            (
                NodeKind::Identifier { name: n1, is_intrinsic: i1 },
                NodeKind::Identifier { name: n2, is_intrinsic: i2 },
            ) => {
                assert_eq!(n1, n2);
                assert_eq!(i1, i2);
            }
            other => return Err(format!("unexpected {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn array_literal_holes() -> TestResult {
        let (ast, diags) = parse_source("var a = [1, , 3];")?;
        assert!(!diags.has_errors());
        match &body_of(&ast)?[0].kind {
            NodeKind::VarDecl { init: Some(init), .. } => match &init.kind {
                NodeKind::ArrayLit { elements } => {
                    assert!(elements[0].is_some());
                    assert!(elements[1].is_none());
                    assert!(elements[2].is_some());
                }
                other => return Err(format!("unexpected {other:?}").into()),
            },
            other => return Err(format!("unexpected {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn for_loop_condition_defaults_to_true() -> TestResult {
        let (ast, _) = parse_source("for (;;) { break; }")?;
        match &body_of(&ast)?[0].kind {
            NodeKind::For { condition, .. } => {
                assert_eq!(condition.kind, NodeKind::Literal(LiteralValue::Bool(true)));
            }
            other => return Err(format!("unexpected {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn resyncs_after_a_single_malformed_statement() -> TestResult {
        let (ast, diags) = parse_source("var a = 1; var = ; var c = 3;")?;
        assert!(diags.has_errors());
        let body = body_of(&ast)?;
        let names: Vec<_> = body
            .iter()
            .filter_map(|n| match &n.kind {
                NodeKind::VarDecl { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert!(names.contains(&"a"));
        assert!(names.contains(&"c"));
        Ok(())
    }

    #[test]
    fn unterminated_block_aborts() {
        let mut diagnostics = DiagnosticSink::new();
        let tokens = saaam_lexer::tokenize("function f(){ var x = 1", &mut diagnostics);
        let result = parse(&tokens, &mut diagnostics);
        assert!(result.is_err());
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn lifecycle_parameter_lint_fires_for_step_and_draw() -> TestResult {
        let (_, diags) = parse_source("function step(){} function draw(){}")?;
        let warnings: Vec<_> = diags.warnings().collect();
        assert_eq!(warnings.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_semicolon_is_a_warning_not_an_error() -> TestResult {
        let (ast, diags) = parse_source("var a = 1\nvar b = 2;")?;
        assert!(!diags.has_errors());
        assert!(diags.warnings().count() >= 1);
        assert_eq!(body_of(&ast)?.len(), 2);
        Ok(())
    }

    #[test]
    fn vec2_and_vec3_parse_as_dedicated_nodes() -> TestResult {
        let (ast, _) = parse_source("var p = vec2(1, 2); var q = vec3(1, 2, 3);")?;
        let body = body_of(&ast)?;
        match &body[0].kind {
            NodeKind::VarDecl { init: Some(init), .. } => {
                assert!(matches!(init.kind, NodeKind::Vec2Lit { .. }))
            }
            other => return Err(format!("unexpected {other:?}").into()),
        }
        match &body[1].kind {
            NodeKind::VarDecl { init: Some(init), .. } => {
                assert!(matches!(init.kind, NodeKind::Vec3Lit { .. }))
            }
            other => return Err(format!("unexpected {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn member_property_span_starts_at_the_name_token() -> TestResult {
        let (ast, _) = parse_source("var q = p.name;")?;
        let name_start = "var q = p.".len();
        match &body_of(&ast)?[0].kind {
            NodeKind::VarDecl { init: Some(init), .. } => match &init.kind {
                NodeKind::Member { property, computed: false, .. } => {
                    assert_eq!(property.location.start, name_start);
                }
                other => return Err(format!("unexpected {other:?}").into()),
            },
            other => return Err(format!("unexpected {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn shorthand_property_span_starts_at_the_name_token() -> TestResult {
        let (ast, _) = parse_source("var o = {name};")?;
        let name_start = "var o = {".len();
        let properties = object_properties(&ast)?;
        assert_eq!(properties[0].value.location.start, name_start);
        Ok(())
    }
}
