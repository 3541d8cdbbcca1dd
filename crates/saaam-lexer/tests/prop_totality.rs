// Property-based tests for the lexer totality invariant: tokenizing any
// input terminates, ends with exactly one EOF, and produces strictly
// increasing token offsets within the source's bounds.

use proptest::prelude::*;
use saaam_diagnostics::DiagnosticSink;
use saaam_token::TokenKind;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        ..ProptestConfig::default()
    })]

    #[test]
    fn tokenizing_any_input_terminates_with_one_eof_and_increasing_offsets(source in ".{0,200}") {
        let mut diagnostics = DiagnosticSink::new();
        let tokens = saaam_lexer::tokenize(&source, &mut diagnostics);

        let eof_count = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        prop_assert_eq!(eof_count, 1);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));

        let mut prev = None;
        for token in &tokens {
            prop_assert!(token.offset <= source.len());
            if let Some(prev_offset) = prev {
                prop_assert!(token.offset > prev_offset);
            }
            prev = Some(token.offset);
        }
    }
}
