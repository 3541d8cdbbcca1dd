//! Facade for the SAAAM compiler: wires the lexer, parser, analyser, and
//! emitter into the single [`compile`] entry point.
//!
//! `compile` is a pure function of its input string: same source, same
//! tokens, AST, diagnostics, and emitted text across runs, provided each
//! call uses its own [`DiagnosticSink`] (as this one does internally).
//! There is no shared mutable state between invocations.

use saaam_ast::Node;
use saaam_diagnostics::{Diagnostic, DiagnosticSink};

/// Result of a single [`compile`] call.
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// `true` iff no `Error`-severity diagnostic was produced.
    pub success: bool,
    /// Emitted target text. `None` only when parsing aborted before an AST
    /// existed at all; on an analysis/emission failure this instead holds
    /// the comment-only failure header (see [`saaam_emitter::failure_header`]).
    pub output: Option<String>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    /// The parsed program, when parsing completed (even with recovered
    /// errors). `None` only when the parser aborted on EOF inside a block.
    pub ast: Option<Node>,
}

/// Compile `source` end to end: lex, parse, analyse, and — if no error
/// diagnostic was produced — emit.
pub fn compile(source: &str) -> CompileResult {
    let mut diagnostics = DiagnosticSink::new();

    tracing::debug!(len = source.len(), "lexing source");
    let tokens = saaam_lexer::tokenize(source, &mut diagnostics);

    tracing::debug!(tokens = tokens.len(), "parsing token stream");
    let ast = match saaam_parser::parse(&tokens, &mut diagnostics) {
        Ok(ast) => ast,
        Err(_abort) => {
            tracing::debug!("parse aborted on unexpected end of input");
            return finish(diagnostics, None, None);
        }
    };

    tracing::debug!("running static analysis");
    saaam_analyzer::analyze(&ast, &mut diagnostics);

    if diagnostics.has_errors() {
        let errors: Vec<_> = diagnostics.errors().collect();
        let header = saaam_emitter::failure_header(&errors);
        return finish(diagnostics, Some(ast), Some(header));
    }

    tracing::debug!("emitting target text");
    let output = saaam_emitter::emit(&ast, &mut diagnostics);
    finish(diagnostics, Some(ast), Some(output))
}

fn finish(diagnostics: DiagnosticSink, ast: Option<Node>, output: Option<String>) -> CompileResult {
    let success = !diagnostics.has_errors();
    let all = diagnostics.into_all();
    let (errors, warnings) =
        all.into_iter().partition(|d| d.severity == saaam_diagnostics::DiagnosticSeverity::Error);
    CompileResult { success, output, errors, warnings, ast }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn well_formed_program_compiles_successfully() -> TestResult {
        let result = compile("function step(dt) { position.x += velocity.x * dt; }");
        assert!(result.success);
        let output = result.output.ok_or("expected emitted output")?;
        assert!(output.contains("function step(dt)"));
        Ok(())
    }

    #[test]
    fn unexpected_eof_inside_block_aborts_without_an_ast() {
        let result = compile("function step(dt) {");
        assert!(!result.success);
        assert!(result.ast.is_none());
        assert!(result.errors.iter().any(|e| e.message.contains("unexpected end of input")));
    }

    #[test]
    fn analyser_error_free_program_with_only_warnings_still_emits() -> TestResult {
        let result = compile("var unused = 1;");
        assert!(result.success);
        assert!(!result.warnings.is_empty());
        let output = result.output.ok_or("expected emitted output")?;
        assert!(output.contains("var unused = 1;"));
        Ok(())
    }

    #[test]
    fn lexer_error_suppresses_emission_with_failure_header() -> TestResult {
        let result = compile("var v = @;");
        assert!(!result.success);
        let output = result.output.ok_or("failure header is still produced")?;
        assert!(output.starts_with("/*"));
        assert!(output.contains("unexpected character"));
        Ok(())
    }

    #[test]
    fn same_source_compiles_identically_across_runs() {
        let source = "function create() { var score = 0; } create();";
        let first = compile(source);
        let second = compile(source);
        assert_eq!(first.output, second.output);
        assert_eq!(first.errors.len(), second.errors.len());
        assert_eq!(first.warnings.len(), second.warnings.len());
    }

    #[test]
    fn lifecycle_registration_epilogue_appears_for_declared_functions_only() -> TestResult {
        let result = compile("function create(){} function on_collision(other){}");
        let output = result.output.ok_or("expected emitted output")?;
        assert!(output.contains("H.registerCreate(create);"));
        assert!(output.contains("H.registerCollision(on_collision);"));
        assert!(!output.contains("registerStep"));
        Ok(())
    }

    // End-to-end scenarios, one per literal case.

    #[test]
    fn s1_hello_lifecycle() -> TestResult {
        let result = compile(
            "function create(){ }\nfunction step(dt){ }\nfunction draw(ctx){ }\n",
        );
        assert!(result.success);
        let output = result.output.ok_or("expected emitted output")?;
        let create_at = output.find("H.registerCreate(create);").ok_or("missing registerCreate")?;
        let step_at = output.find("H.registerStep(step);").ok_or("missing registerStep")?;
        let draw_at = output.find("H.registerDraw(draw);").ok_or("missing registerDraw")?;
        assert!(create_at < step_at);
        assert!(step_at < draw_at);
        Ok(())
    }

    #[test]
    fn s2_intrinsic_rewrite() -> TestResult {
        let result = compile("var v = keyboard_check(vk_space);");
        assert!(result.success);
        let output = result.output.ok_or("expected emitted output")?;
        assert!(output.contains("H.keyboardCheck(H.vk.space)"));
        assert!(!output.contains("keyboard_check("));
        assert!(!output.contains("vk_space"));
        Ok(())
    }

    #[test]
    fn s3_vector_literal() -> TestResult {
        let result = compile("var p = vec2(1, 2+3);");
        assert!(result.success);
        let output = result.output.ok_or("expected emitted output")?;
        assert!(output.contains("{ x: 1, y: 2 + 3 }"));
        Ok(())
    }

    #[test]
    fn s4_missing_semicolon_tolerated() -> TestResult {
        let result = compile("var a = 1\nvar b = 2;\n");
        assert!(result.success);
        assert!(result.warnings.iter().any(|w| w.message.contains("missing semicolon")));
        let ast = result.ast.ok_or("expected an ast")?;
        let saaam_ast::NodeKind::Program { body } = &ast.kind else {
            return Err("expected a program node".into());
        };
        let decl_count = body
            .iter()
            .filter(|stmt| matches!(stmt.kind, saaam_ast::NodeKind::VarDecl { .. }))
            .count();
        assert_eq!(decl_count, 2);
        Ok(())
    }

    #[test]
    fn s5_unterminated_block_fatal() -> TestResult {
        let result = compile("function f(){ var x = 1");
        assert!(!result.success);
        assert!(result.errors.iter().any(|e| e.message.contains("end of input")));
        let output = result.output.ok_or("failure header is still produced")?;
        assert!(output.starts_with("/*"));
        Ok(())
    }

    #[test]
    fn s6_intrinsic_arity_warning() -> TestResult {
        let result = compile("draw_sprite(\"hero\");");
        assert!(result.success);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.message.contains("draw_sprite") && w.message.contains("argument")));
        let output = result.output.ok_or("expected emitted output")?;
        assert!(output.contains("H.drawSprite(\"hero\")"));
        Ok(())
    }
}
