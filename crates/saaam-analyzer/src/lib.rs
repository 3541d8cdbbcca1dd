//! Static analyser for the SAAAM compiler.
//!
//! A single top-down walk over the AST maintaining a symbol table: one flat
//! scope for the program plus one additional scope per function body.
//! Non-intrinsic identifiers are tracked for declared/used bookkeeping;
//! intrinsic identifiers are recognised purely by catalogue membership and
//! never enter the symbol table. Calls to arity-sensitive intrinsics are
//! checked against the fixed rules in `saaam-intrinsics`.

use saaam_ast::{Node, NodeKind, Property, PropertyKey};
use saaam_diagnostics::DiagnosticSink;
use saaam_diagnostics_codes::DiagnosticCode;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct SymbolInfo {
    declared: bool,
    used: bool,
    first_pos: usize,
}

/// Walk `program` and record every diagnostic the analyser's rules produce.
pub fn analyze(program: &Node, diagnostics: &mut DiagnosticSink) {
    let mut analyzer = Analyzer { diagnostics, stack: vec![0], scopes: vec![HashMap::new()] };
    if let NodeKind::Program { body } = &program.kind {
        for stmt in body {
            analyzer.visit_stmt(stmt);
        }
    }
    analyzer.final_sweep();
}

struct Analyzer<'a> {
    diagnostics: &'a mut DiagnosticSink,
    /// Chain of scope indices, innermost last. Index 0 is always the
    /// program-level scope.
    stack: Vec<usize>,
    /// Every scope ever opened, kept around for the post-walk sweep.
    scopes: Vec<HashMap<String, SymbolInfo>>,
}

impl<'a> Analyzer<'a> {
    fn current_scope(&self) -> usize {
        self.stack.last().copied().unwrap_or(0)
    }

    fn declare(&mut self, name: &str, pos: usize) {
        let idx = self.current_scope();
        match self.scopes[idx].get_mut(name) {
            Some(info) if info.declared => {
                self.diagnostics.warn(
                    DiagnosticCode::DuplicateDeclaration,
                    format!("'{name}' already declared"),
                    pos,
                );
            }
            Some(info) => info.declared = true,
            None => {
                self.scopes[idx].insert(name.to_string(), SymbolInfo { declared: true, used: false, first_pos: pos });
            }
        }
    }

    fn use_name(&mut self, name: &str, pos: usize) {
        if saaam_intrinsics::is_intrinsic(name) {
            return;
        }
        for &idx in self.stack.iter().rev() {
            if let Some(info) = self.scopes[idx].get_mut(name) {
                info.used = true;
                if !info.declared {
                    self.diagnostics.warn(
                        DiagnosticCode::UndeclaredUse,
                        format!("'{name}' used but not declared"),
                        pos,
                    );
                }
                return;
            }
        }
        let idx = self.current_scope();
        self.scopes[idx].insert(name.to_string(), SymbolInfo { declared: false, used: true, first_pos: pos });
        self.diagnostics.warn(
            DiagnosticCode::UndeclaredUse,
            format!("'{name}' used but not declared"),
            pos,
        );
    }

    fn enter_function_scope(&mut self) {
        let idx = self.scopes.len();
        self.scopes.push(HashMap::new());
        self.stack.push(idx);
    }

    fn exit_function_scope(&mut self) {
        self.stack.pop();
    }

    fn final_sweep(&mut self) {
        for scope in &self.scopes {
            // `HashMap` iteration order is not stable across instantiations;
            // sort by first-occurrence position so the emitted warning order
            // is deterministic across runs, per the accumulation-order
            // invariant.
            let mut entries: Vec<_> = scope.iter().collect();
            entries.sort_by_key(|(_, info)| info.first_pos);
            for (name, info) in entries {
                if info.declared && !info.used {
                    self.diagnostics.warn(
                        DiagnosticCode::UnusedDeclaration,
                        format!("'{name}' declared but never used"),
                        info.first_pos,
                    );
                } else if !info.declared && info.used && !saaam_intrinsics::is_intrinsic(name) {
                    self.diagnostics.warn(
                        DiagnosticCode::UndeclaredUse,
                        format!("'{name}' used but not declared"),
                        info.first_pos,
                    );
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    fn visit_stmt(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::VarDecl { name, init, .. } => {
                self.declare(name, node.location.start);
                if let Some(init) = init {
                    self.visit_expr(init);
                }
            }
            NodeKind::FuncDecl { name, params, body } => {
                self.declare(name, node.location.start);
                self.enter_function_scope();
                for param in params {
                    self.declare(param, node.location.start);
                }
                self.visit_stmt(body);
                self.exit_function_scope();
            }
            NodeKind::Block { body } => {
                for stmt in body {
                    self.visit_stmt(stmt);
                }
            }
            NodeKind::If { condition, then_branch, else_branch } => {
                self.visit_expr(condition);
                self.visit_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.visit_stmt(else_branch);
                }
            }
            NodeKind::For { init, condition, update, body } => {
                if let Some(init) = init {
                    self.visit_stmt(init);
                }
                self.visit_expr(condition);
                if let Some(update) = update {
                    self.visit_expr(update);
                }
                self.visit_stmt(body);
            }
            NodeKind::While { condition, body } => {
                self.visit_expr(condition);
                self.visit_stmt(body);
            }
            NodeKind::DoWhile { body, condition } => {
                self.visit_stmt(body);
                self.visit_expr(condition);
            }
            NodeKind::Switch { discriminant, cases } => {
                self.visit_expr(discriminant);
                for case in cases {
                    self.visit_stmt(case);
                }
            }
            NodeKind::SwitchCase { test, body } => {
                if let Some(test) = test {
                    self.visit_expr(test);
                }
                for stmt in body {
                    self.visit_stmt(stmt);
                }
            }
            NodeKind::Return { argument } => {
                if let Some(argument) = argument {
                    self.visit_expr(argument);
                }
            }
            NodeKind::Break | NodeKind::Continue | NodeKind::Empty => {}
            NodeKind::ExprStmt { expr } => self.visit_expr(expr),
            // Every other `NodeKind` is an expression variant; the parser
            // never places one directly in statement position (it always
            // wraps bare expressions in `ExprStmt`), so this is unreachable
            // in practice but kept for match exhaustiveness.
            _ => {}
        }
    }

    // ---------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------

    fn visit_expr(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Identifier { name, is_intrinsic } => {
                if !is_intrinsic {
                    self.use_name(name, node.location.start);
                }
            }
            NodeKind::Literal(_) | NodeKind::ThisRef => {}
            NodeKind::Assign { target, value, .. } => {
                self.visit_expr(target);
                self.visit_expr(value);
            }
            NodeKind::Binary { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            NodeKind::Unary { operand, .. } => self.visit_expr(operand),
            NodeKind::Call { callee, args } => {
                self.check_intrinsic_arity(callee, args);
                self.visit_expr(callee);
                for arg in args {
                    self.visit_expr(arg);
                }
            }
            NodeKind::Member { object, property, computed } => {
                self.visit_expr(object);
                if *computed {
                    self.visit_expr(property);
                }
                // Non-computed member names (`.x`) are field labels, not
                // variable reads, and are intentionally left unvisited.
            }
            NodeKind::ObjectLit { properties } => {
                for Property { key, value, .. } in properties {
                    if let PropertyKey::Expr(key_expr) = key {
                        self.visit_expr(key_expr);
                    }
                    self.visit_expr(value);
                }
            }
            NodeKind::ArrayLit { elements } => {
                for element in elements.iter().flatten() {
                    self.visit_expr(element);
                }
            }
            NodeKind::Vec2Lit { x, y } => {
                self.visit_expr(x);
                self.visit_expr(y);
            }
            NodeKind::Vec3Lit { x, y, z } => {
                self.visit_expr(x);
                self.visit_expr(y);
                self.visit_expr(z);
            }
            _ => {}
        }
    }

    fn check_intrinsic_arity(&mut self, callee: &Node, args: &[Node]) {
        let NodeKind::Identifier { name, is_intrinsic: true } = &callee.kind else {
            return;
        };
        if saaam_intrinsics::expects_exactly_one_arg(name) && args.len() != 1 {
            self.diagnostics.warn(
                DiagnosticCode::IntrinsicArityMismatch,
                format!("'{name}' expects exactly 1 argument, got {}", args.len()),
                callee.location.start,
            );
        }
        if saaam_intrinsics::expects_at_least_three_args(name) && args.len() < 3 {
            self.diagnostics.warn(
                DiagnosticCode::IntrinsicArityMismatch,
                format!("'{name}' expects at least 3 arguments, got {}", args.len()),
                callee.location.start,
            );
        }
    }
}
