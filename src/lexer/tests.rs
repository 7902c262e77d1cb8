//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords, identifiers and booleans
//! - Numeric literals in every radix, and their error cases
//! - String literals with escape sequences
//! - Operator fixity resolution
//! - Comments, constructs and delimiter balance

use super::{
    lexer::tokenize,
    operators::{resolve_fixity, Arity, Associativity, Fixity, Operator, OperatorTable, OPERATORS},
    tokens::{Token, TokenKind},
};
use crate::errors::{errors::ErrorImpl, fault::InternalFault};
use std::panic::{catch_unwind, AssertUnwindSafe};

fn lex(source: &str) -> Vec<Token> {
    tokenize(source.to_string(), Some("test.lang".to_string()))
        .unwrap()
        .into_tokens()
}

fn lex_error(source: &str) -> ErrorImpl {
    tokenize(source.to_string(), Some("test.lang".to_string()))
        .unwrap_err()
        .get_kind()
        .clone()
}

fn operator_name(token: &Token) -> &'static str {
    token.get_operator().name
}

#[test]
fn test_tokenize_keywords() {
    let tokens = lex("define function return do end if else while for break type constructor method public private protected static foreign inherits from void");

    let expected = [
        TokenKind::Define,
        TokenKind::Function,
        TokenKind::Return,
        TokenKind::Do,
        TokenKind::End,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::While,
        TokenKind::For,
        TokenKind::Break,
        TokenKind::Type,
        TokenKind::Constructor,
        TokenKind::Method,
        TokenKind::Public,
        TokenKind::Private,
        TokenKind::Protected,
        TokenKind::Static,
        TokenKind::Foreign,
        TokenKind::Inherits,
        TokenKind::From,
        TokenKind::Void,
        TokenKind::EOF,
    ];

    assert_eq!(tokens.len(), expected.len());
    for (token, kind) in tokens.iter().zip(expected) {
        assert_eq!(token.kind, kind);
    }
}

#[test]
fn test_tokenize_identifiers_and_booleans() {
    let tokens = lex("foo baz_123 _underscore CamelCase true false truthy");

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[1].value, "baz_123");
    assert_eq!(tokens[2].value, "_underscore");
    assert_eq!(tokens[3].value, "CamelCase");
    assert_eq!(tokens[4].kind, TokenKind::Boolean);
    assert_eq!(tokens[4].value, "true");
    assert_eq!(tokens[5].kind, TokenKind::Boolean);
    assert_eq!(tokens[5].value, "false");
    assert_eq!(tokens[6].kind, TokenKind::Identifier);
    assert_eq!(tokens[7].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    let tokens = lex("42 3.14 0 100.5 0.25");

    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].kind, TokenKind::Float);
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].kind, TokenKind::Integer);
    assert_eq!(tokens[2].value, "0");
    assert_eq!(tokens[3].kind, TokenKind::Float);
    assert_eq!(tokens[3].value, "100.5");
    assert_eq!(tokens[4].kind, TokenKind::Float);
    assert_eq!(tokens[4].value, "0.25");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_radix_literals() {
    let tokens = lex("0x1A 0o10 0b101 0xff");

    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[0].value, "26");
    assert_eq!(tokens[1].value, "8");
    assert_eq!(tokens[2].value, "5");
    assert_eq!(tokens[3].value, "255");
}

#[test]
fn test_number_errors() {
    assert_eq!(lex_error("0123"), ErrorImpl::LeadingZero);
    assert_eq!(lex_error("0z12"), ErrorImpl::InvalidRadix { radix: 'z' });
    assert!(matches!(
        lex_error("1.2.3"),
        ErrorImpl::MalformedNumber { reason, .. } if reason == "multiple decimal points"
    ));
    assert!(matches!(
        lex_error("1."),
        ErrorImpl::MalformedNumber { reason, .. } if reason == "missing digits after decimal point"
    ));
    assert!(matches!(
        lex_error("0x1.5"),
        ErrorImpl::MalformedNumber { reason, .. } if reason == "floats must be decimal"
    ));
    assert!(matches!(
        lex_error("0x;"),
        ErrorImpl::MalformedNumber { reason, .. } if reason == "missing digits after radix prefix"
    ));
    assert_eq!(
        lex_error("12abc"),
        ErrorImpl::InvalidCharacterInNumber { character: 'a' }
    );
    assert_eq!(
        lex_error("0b102"),
        ErrorImpl::InvalidCharacterInNumber { character: '2' }
    );
    assert!(matches!(
        lex_error("99999999999999999999"),
        ErrorImpl::NumberParseError { .. }
    ));
}

fn error_column(source: &str) -> u32 {
    tokenize(source.to_string(), Some("test.lang".to_string()))
        .unwrap_err()
        .get_trace()
        .start
        .column
}

#[test]
fn test_literal_errors_point_at_offending_character() {
    assert_eq!(error_column("0b2"), 3);
    assert_eq!(error_column("a = 0b102;"), 9);
    assert_eq!(error_column("0123"), 2);
    assert_eq!(error_column("1.2.3"), 4);
    assert_eq!(error_column("12abc"), 3);
    assert_eq!(error_column("0x;"), 3);
    assert_eq!(error_column(r#"x = "ab\q";"#), 8);
    assert_eq!(error_column(r#""\x4""#), 2);
    assert_eq!(error_column(r#"  "open"#), 3);

    let error = tokenize("define a;\n  1.x".to_string(), None).unwrap_err();
    assert_eq!(error.get_trace().start.line, 2);
    assert_eq!(error.get_trace().start.column, 5);
}

#[test]
fn test_tokenize_strings() {
    let tokens = lex(r#""hello" "multiple words" """#);

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "multiple words");
    assert_eq!(tokens[2].value, "");
    assert_eq!(tokens[3].kind, TokenKind::EOF);
}

#[test]
fn test_string_escapes() {
    let tokens = lex(r#""a\tb\n" "\"q\" \\ \? \'" "\x41\x7a" "\101\0""#);

    assert_eq!(tokens[0].value, "a\tb\n");
    assert_eq!(tokens[1].value, "\"q\" \\ ? '");
    assert_eq!(tokens[2].value, "Az");
    assert_eq!(tokens[3].value, "A\0");
}

#[test]
fn test_string_errors() {
    assert_eq!(lex_error(r#""open"#), ErrorImpl::UnterminatedString);
    assert_eq!(
        lex_error(r#""\q""#),
        ErrorImpl::InvalidEscape {
            sequence: "\\q".to_string()
        }
    );
    assert_eq!(
        lex_error(r#""\x4""#),
        ErrorImpl::InvalidEscape {
            sequence: "\\x4".to_string()
        }
    );
    assert_eq!(
        lex_error(r#""\777""#),
        ErrorImpl::InvalidEscape {
            sequence: "\\777".to_string()
        }
    );
    assert_eq!(lex_error("a \\ b"), ErrorImpl::ExtraneousEscape);
}

#[test]
fn test_tokenize_constructs() {
    let tokens = lex("; : ? ( ) [ ] =>");

    assert_eq!(tokens[0].kind, TokenKind::Semicolon);
    assert_eq!(tokens[1].kind, TokenKind::Colon);
    assert_eq!(tokens[2].kind, TokenKind::Question);
    assert_eq!(tokens[3].kind, TokenKind::OpenParen);
    assert_eq!(tokens[4].kind, TokenKind::CloseParen);
    assert_eq!(tokens[5].kind, TokenKind::OpenBracket);
    assert_eq!(tokens[6].kind, TokenKind::CloseBracket);
    assert_eq!(tokens[7].kind, TokenKind::FatArrow);
    assert_eq!(tokens[8].kind, TokenKind::EOF);
}

#[test]
fn test_unmatched_delimiters() {
    assert_eq!(
        lex_error("(1 + 2"),
        ErrorImpl::UnmatchedDelimiter { delimiter: '(' }
    );
    assert_eq!(
        lex_error("1 + 2)"),
        ErrorImpl::UnmatchedDelimiter { delimiter: ')' }
    );
    assert_eq!(
        lex_error("a[(1])"),
        ErrorImpl::UnmatchedDelimiter { delimiter: ']' }
    );
}

#[test]
fn test_longest_operator_match() {
    let tokens = lex("a <<= 1 >> 2 != 3");

    assert_eq!(operator_name(&tokens[1]), "Left shift assignment");
    assert_eq!(operator_name(&tokens[3]), "Right shift");
    assert_eq!(operator_name(&tokens[5]), "Inequality");
}

#[test]
fn test_fixity_resolution() {
    assert_eq!(operator_name(&lex("+1")[0]), "Unary +");
    assert_eq!(operator_name(&lex("1+1")[1]), "Add");
    assert_eq!(operator_name(&lex("1++")[1]), "Postfix ++");
    assert_eq!(operator_name(&lex("++1")[0]), "Prefix ++");

    let tokens = lex("+ -- a ++ --");
    assert_eq!(operator_name(&tokens[0]), "Unary +");
    assert_eq!(operator_name(&tokens[1]), "Prefix --");
    assert_eq!(operator_name(&tokens[3]), "Postfix ++");
    assert_eq!(operator_name(&tokens[4]), "Postfix --");

    let tokens = lex("(-12 + -3) - a[1] - f()");
    assert_eq!(operator_name(&tokens[1]), "Unary -");
    assert_eq!(operator_name(&tokens[3]), "Add");
    assert_eq!(operator_name(&tokens[4]), "Unary -");
    assert_eq!(operator_name(&tokens[7]), "Subtract");
    assert_eq!(operator_name(&tokens[12]), "Subtract");
}

#[test]
fn test_resolve_fixity_is_pure() {
    let operand = lex("x")[0].clone();
    let infix = resolve_fixity("-", Some(&operand));
    let prefix = resolve_fixity("-", None);

    assert_eq!(OPERATORS.lookup_by_index(infix).name, "Subtract");
    assert_eq!(OPERATORS.lookup_by_index(prefix).name, "Unary -");
    assert_eq!(resolve_fixity("-", Some(&operand)), infix);
    assert_eq!(OPERATORS.lookup_by_name("Subtract").precedence, 10);
}

#[test]
fn test_operator_table_lookups() {
    let assignment = OPERATORS.lookup_by_name("Assignment");
    assert_eq!(assignment.symbol, "=");
    assert_eq!(assignment.associativity, Associativity::Right);

    let multiply = OPERATORS.lookup_by_name("Multiply");
    assert!(multiply.precedence > OPERATORS.lookup_by_name("Add").precedence);

    let call = OPERATORS.lookup_by_name("Call");
    assert!(call.synthetic);
    assert!(OPERATORS.candidates("()").is_empty());

    assert!(OPERATORS.find("Exponent").is_none());

    let symbols = OPERATORS.lexed_symbols();
    assert_eq!(symbols[0].len(), 3);
    assert!(!symbols.contains(&""));
}

#[test]
fn test_unary_infix_operator_faults() {
    let result = catch_unwind(AssertUnwindSafe(|| {
        OperatorTable::new(vec![Operator {
            symbol: "!",
            precedence: 12,
            name: "Broken",
            associativity: Associativity::Left,
            arity: Arity::Unary,
            fixity: Fixity::Infix,
            synthetic: false,
        }])
    }));

    let payload = result.err().expect("construction should fault");
    let fault = payload.downcast_ref::<InternalFault>().unwrap();
    assert_eq!(fault.get("operator"), Some("Broken"));
}

#[test]
fn test_comments_are_skipped() {
    let tokens = lex("a // line comment\n/* block\ncomment */ b /**/ c");

    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[0].value, "a");
    assert_eq!(tokens[1].value, "b");
    assert_eq!(tokens[2].value, "c");

    assert_eq!(lex_error("a /* never closed"), ErrorImpl::UnterminatedComment);
}

#[test]
fn test_traces_and_line_count() {
    let stream = tokenize(
        "define a;\n  a = 1;\n".to_string(),
        Some("trace.lang".to_string()),
    )
    .unwrap();

    assert_eq!(stream.line_count(), 3);

    let a = &stream[3];
    assert_eq!(a.value, "a");
    assert_eq!(a.trace.start.line, 2);
    assert_eq!(a.trace.start.column, 3);
    assert_eq!(a.trace.end.column, 4);
    assert_eq!(a.trace.file.as_str(), "trace.lang");

    let one = &stream[5];
    assert_eq!(one.trace.start.offset, 16);
}

#[test]
fn test_empty_source() {
    let stream = tokenize(String::new(), None).unwrap();

    assert_eq!(stream.len(), 1);
    assert_eq!(stream[0].kind, TokenKind::EOF);
    assert_eq!(stream[0].trace.file.as_str(), "<input>");
    assert_eq!(stream.line_count(), 1);

    let comments_only = tokenize("// one\n/* two\n */\n".to_string(), None).unwrap();
    assert_eq!(comments_only.len(), 1);
    assert_eq!(comments_only.line_count(), 4);
}

#[test]
fn test_token_equality_ignores_trace() {
    let first = lex("a + 1");
    let second = lex("a    +\n1");

    assert_eq!(first, second);
    assert_eq!(first[1].debug(), "Operator (Add)");
    assert_eq!(first[2].debug(), "Integer (1)");
    assert_eq!(first[3].to_string(), "end of file");
}
