//! Syntax-directed emitter for the SAAAM compiler.
//!
//! Pure translation, no further analysis: given a well-formed AST it prints
//! target text that, evaluated against an environment binding `H` to the
//! runtime interface, reproduces the program's intended behaviour. The
//! output is deterministic and locale-independent; indentation exists for
//! readability only.

use saaam_ast::{BindingForm, LiteralValue, Node, NodeKind, Property, PropertyKey};
use saaam_diagnostics::{Diagnostic, DiagnosticSink};
use saaam_diagnostics_codes::DiagnosticCode;

/// Emit `program`, wrapped in the `H`-scope and followed by the lifecycle
/// registration epilogue for whichever lifecycle functions it declares.
///
/// Any AST node kind this emitter has no rule for is printed as a commented
/// placeholder and recorded as an `UnknownNodeKind` warning; translation
/// always completes.
pub fn emit(program: &Node, diagnostics: &mut DiagnosticSink) -> String {
    let NodeKind::Program { body } = &program.kind else {
        return String::new();
    };

    let mut emitter = Emitter { diagnostics, out: String::new(), indent: 0 };
    emitter.out.push_str("function (H) {\n");
    emitter.indent += 1;

    let mut lifecycle_declared = Vec::new();
    for stmt in body {
        if let NodeKind::FuncDecl { name, .. } = &stmt.kind {
            if saaam_intrinsics::LIFECYCLE_FUNCTIONS.contains(&name.as_str()) {
                lifecycle_declared.push(name.as_str());
            }
        }
        emitter.write_indent();
        emitter.emit_stmt(stmt);
        emitter.out.push('\n');
    }

    for name in lifecycle_declared {
        let register_fn = match name {
            "create" => "registerCreate",
            "step" => "registerStep",
            "draw" => "registerDraw",
            "on_collision" => "registerCollision",
            other => other,
        };
        emitter.write_indent();
        emitter.out.push_str(&format!("H.{register_fn}({name});\n"));
    }

    emitter.indent -= 1;
    emitter.out.push_str("}\n");
    emitter.out
}

/// On compilation failure, the facade emits this in place of a translation:
/// a comment-only header listing every recorded error message.
pub fn failure_header(errors: &[&Diagnostic]) -> String {
    let mut out = String::from("/*\n * compilation failed:\n");
    for err in errors {
        out.push_str(&format!(" * - {}\n", err.message));
    }
    out.push_str(" */\n");
    out
}

struct Emitter<'a> {
    diagnostics: &'a mut DiagnosticSink,
    out: String,
    indent: usize,
}

impl<'a> Emitter<'a> {
    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn emit_block(&mut self, body: &[Node]) {
        self.out.push_str("{\n");
        self.indent += 1;
        for stmt in body {
            self.write_indent();
            self.emit_stmt(stmt);
            self.out.push('\n');
        }
        self.indent -= 1;
        self.write_indent();
        self.out.push('}');
    }

    fn emit_var_decl_inline(&mut self, binding: BindingForm, name: &str, init: &Option<Box<Node>>) {
        self.out.push_str(binding_keyword(binding));
        self.out.push(' ');
        self.out.push_str(name);
        if let Some(init) = init {
            self.out.push_str(" = ");
            self.emit_expr(init);
        }
    }

    fn emit_stmt(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::VarDecl { binding, name, init } => {
                self.emit_var_decl_inline(*binding, name, init);
                self.out.push(';');
            }
            NodeKind::FuncDecl { name, params, body } => {
                self.out.push_str("function ");
                self.out.push_str(name);
                self.out.push('(');
                self.out.push_str(&params.join(", "));
                self.out.push_str(") ");
                self.emit_stmt(body);
            }
            NodeKind::Block { body } => self.emit_block(body),
            NodeKind::If { condition, then_branch, else_branch } => {
                self.out.push_str("if (");
                self.emit_expr(condition);
                self.out.push_str(") ");
                self.emit_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.out.push_str(" else ");
                    self.emit_stmt(else_branch);
                }
            }
            NodeKind::For { init, condition, update, body } => {
                self.out.push_str("for (");
                if let Some(init) = init {
                    match &init.kind {
                        NodeKind::VarDecl { binding, name, init: var_init } => {
                            self.emit_var_decl_inline(*binding, name, var_init);
                        }
                        _ => self.emit_expr(init),
                    }
                }
                self.out.push_str("; ");
                self.emit_expr(condition);
                self.out.push_str("; ");
                if let Some(update) = update {
                    self.emit_expr(update);
                }
                self.out.push_str(") ");
                self.emit_stmt(body);
            }
            NodeKind::While { condition, body } => {
                self.out.push_str("while (");
                self.emit_expr(condition);
                self.out.push_str(") ");
                self.emit_stmt(body);
            }
            NodeKind::DoWhile { body, condition } => {
                self.out.push_str("do ");
                self.emit_stmt(body);
                self.out.push_str(" while (");
                self.emit_expr(condition);
                self.out.push_str(");");
            }
            NodeKind::Switch { discriminant, cases } => {
                self.out.push_str("switch (");
                self.emit_expr(discriminant);
                self.out.push_str(") {\n");
                self.indent += 1;
                for case in cases {
                    self.write_indent();
                    self.emit_stmt(case);
                    self.out.push('\n');
                }
                self.indent -= 1;
                self.write_indent();
                self.out.push('}');
            }
            NodeKind::SwitchCase { test, body } => {
                match test {
                    Some(test) => {
                        self.out.push_str("case ");
                        self.emit_expr(test);
                        self.out.push(':');
                    }
                    None => self.out.push_str("default:"),
                }
                self.indent += 1;
                for stmt in body {
                    self.out.push('\n');
                    self.write_indent();
                    self.emit_stmt(stmt);
                }
                self.indent -= 1;
            }
            NodeKind::Return { argument } => {
                self.out.push_str("return");
                if let Some(argument) = argument {
                    self.out.push(' ');
                    self.emit_expr(argument);
                }
                self.out.push(';');
            }
            NodeKind::Break => self.out.push_str("break;"),
            NodeKind::Continue => self.out.push_str("continue;"),
            NodeKind::Empty => self.out.push(';'),
            NodeKind::ExprStmt { expr } => {
                self.emit_expr(expr);
                self.out.push(';');
            }
            other => self.emit_unknown(other, node.location.start),
        }
    }

    fn emit_expr(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Identifier { name, .. } => {
                let text = saaam_intrinsics::rewrite(name).unwrap_or(name);
                self.out.push_str(text);
            }
            NodeKind::Literal(value) => self.emit_literal(value),
            NodeKind::ThisRef => self.out.push_str("this"),
            NodeKind::Assign { op, target, value } => {
                self.emit_expr(target);
                self.out.push(' ');
                self.out.push_str(op);
                self.out.push(' ');
                self.emit_expr(value);
            }
            NodeKind::Binary { op, left, right } => {
                self.emit_expr(left);
                self.out.push(' ');
                self.out.push_str(op);
                self.out.push(' ');
                self.emit_expr(right);
            }
            NodeKind::Unary { op, operand } => {
                self.out.push_str(op);
                self.emit_expr(operand);
            }
            NodeKind::Call { callee, args } => {
                self.emit_expr(callee);
                self.out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.emit_expr(arg);
                }
                self.out.push(')');
            }
            NodeKind::Member { object, property, computed } => {
                self.emit_expr(object);
                if *computed {
                    self.out.push('[');
                    self.emit_expr(property);
                    self.out.push(']');
                } else {
                    self.out.push('.');
                    self.emit_expr(property);
                }
            }
            NodeKind::ObjectLit { properties } => {
                self.out.push_str("{ ");
                for (i, prop) in properties.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.emit_property(prop);
                }
                self.out.push_str(" }");
            }
            NodeKind::ArrayLit { elements } => {
                self.out.push('[');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    if let Some(element) = element {
                        self.emit_expr(element);
                    }
                }
                self.out.push(']');
            }
            NodeKind::Vec2Lit { x, y } => {
                self.out.push_str("{ x: ");
                self.emit_expr(x);
                self.out.push_str(", y: ");
                self.emit_expr(y);
                self.out.push_str(" }");
            }
            NodeKind::Vec3Lit { x, y, z } => {
                self.out.push_str("{ x: ");
                self.emit_expr(x);
                self.out.push_str(", y: ");
                self.emit_expr(y);
                self.out.push_str(", z: ");
                self.emit_expr(z);
                self.out.push_str(" }");
            }
            other => self.emit_unknown(other, node.location.start),
        }
    }

    fn emit_property(&mut self, prop: &Property) {
        match &prop.key {
            PropertyKey::Identifier(name) => self.out.push_str(name),
            PropertyKey::String(s) => {
                self.out.push('"');
                self.out.push_str(s);
                self.out.push('"');
            }
            PropertyKey::Expr(expr) => {
                self.out.push('[');
                self.emit_expr(expr);
                self.out.push(']');
            }
        }
        self.out.push_str(": ");
        self.emit_expr(&prop.value);
    }

    fn emit_literal(&mut self, value: &LiteralValue) {
        match value {
            LiteralValue::Number(n) => self.out.push_str(&format!("{n}")),
            LiteralValue::String(s) => {
                self.out.push('"');
                for c in s.chars() {
                    match c {
                        '"' => self.out.push_str("\\\""),
                        '\\' => self.out.push_str("\\\\"),
                        '\n' => self.out.push_str("\\n"),
                        _ => self.out.push(c),
                    }
                }
                self.out.push('"');
            }
            LiteralValue::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            LiteralValue::Null => self.out.push_str("null"),
            LiteralValue::Undefined => self.out.push_str("undefined"),
        }
    }

    fn emit_unknown(&mut self, kind: &NodeKind, pos: usize) {
        let label = kind.label();
        self.diagnostics.warn(
            DiagnosticCode::UnknownNodeKind,
            format!("emitter has no rule for node kind '{label}'"),
            pos,
        );
        self.out.push_str(&format!("/* unknown node: {label} */"));
    }
}

fn binding_keyword(binding: BindingForm) -> &'static str {
    match binding {
        BindingForm::Mutable => "var",
        BindingForm::Immutable => "const",
        BindingForm::Lexical => "let",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn emit_source(source: &str) -> Result<(String, DiagnosticSink), Box<dyn std::error::Error>> {
        let mut diagnostics = DiagnosticSink::new();
        let tokens = saaam_lexer::tokenize(source, &mut diagnostics);
        let ast = saaam_parser::parse(&tokens, &mut diagnostics).map_err(|_| "parse aborted")?;
        let output = emit(&ast, &mut diagnostics);
        Ok((output, diagnostics))
    }

    #[test]
    fn var_decl_prints_binding_and_init() -> TestResult {
        let (out, _) = emit_source("var a = 5;")?;
        assert!(out.contains("var a = 5;"));
        Ok(())
    }

    #[test]
    fn const_and_let_keep_their_own_keyword() -> TestResult {
        let (out, _) = emit_source("const a = 1; let b = 2;")?;
        assert!(out.contains("const a = 1;"));
        assert!(out.contains("let b = 2;"));
        Ok(())
    }

    #[test]
    fn intrinsic_call_rewrites_function_and_argument() -> TestResult {
        let (out, _) = emit_source("function step(dt){ keyboard_check(vk_space); }")?;
        assert!(out.contains("H.keyboardCheck(H.vk.space)"));
        Ok(())
    }

    #[test]
    fn non_rewritten_intrinsic_passes_through_verbatim() -> TestResult {
        let (out, _) = emit_source("function step(dt){ mouse_check(0); }")?;
        assert!(out.contains("mouse_check(0)"));
        Ok(())
    }

    #[test]
    fn vec2_and_vec3_expand_to_object_literals() -> TestResult {
        let (out, _) = emit_source("var a = vec2(1, 2); var b = vec3(1, 2, 3);")?;
        assert!(out.contains("{ x: 1, y: 2 }"));
        assert!(out.contains("{ x: 1, y: 2, z: 3 }"));
        Ok(())
    }

    #[test]
    fn object_shorthand_emits_explicit_key_value() -> TestResult {
        let (out, _) = emit_source("var x = 1; var o = {x};")?;
        assert!(out.contains("{ x: x }"));
        Ok(())
    }

    #[test]
    fn string_literal_requotes_with_double_quotes_and_escapes_inner_ones() -> TestResult {
        let (out, _) = emit_source(r#"var s = 'he said "hi"';"#)?;
        assert!(out.contains(r#""he said \"hi\"""#));
        Ok(())
    }

    #[test]
    fn lifecycle_epilogue_registers_only_declared_functions() -> TestResult {
        let (out, _) = emit_source("function create(){} function step(dt){}")?;
        assert!(out.contains("H.registerCreate(create);"));
        assert!(out.contains("H.registerStep(step);"));
        assert!(!out.contains("registerDraw"));
        assert!(!out.contains("registerCollision"));
        Ok(())
    }

    #[test]
    fn failure_header_lists_error_messages_only() {
        let mut sink = DiagnosticSink::new();
        sink.error(DiagnosticCode::UnexpectedEof, "unexpected end of input inside block", 10);
        sink.warn(DiagnosticCode::UnusedDeclaration, "'a' declared but never used", 2);
        let errors: Vec<_> = sink.errors().collect();
        let header = failure_header(&errors);
        assert!(header.contains("unexpected end of input inside block"));
        assert!(!header.contains("declared but never used"));
    }

    #[test]
    fn block_indentation_is_two_spaces_per_level() -> TestResult {
        let (out, _) = emit_source("function step(dt){ if (dt > 0) { dt = 0; } }")?;
        assert!(out.contains("\n    if (dt > 0) {\n      dt = 0;\n    }\n"));
        Ok(())
    }
}
