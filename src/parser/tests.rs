//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Expressions: precedence, associativity, prefix/postfix chains, calls
//! - Declarations and the literal type check
//! - Control flow statements and `break` placement
//! - Functions, foreign functions and type definitions
//! - Scope errors: redeclaration and undeclared names

use std::panic::{catch_unwind, AssertUnwindSafe};

use super::parser::{parse, Parser};
use crate::{
    ast::{ast::Ast, visitor::TreePrinter},
    errors::{errors::ErrorImpl, fault::InternalFault},
    lexer::{
        lexer::tokenize,
        tokens::{Token, TokenKind},
    },
    Trace, MK_TOKEN,
};

fn parse_source(source: &str) -> Result<Ast, crate::errors::errors::Error> {
    let tokens = tokenize(source.to_string(), Some("test.lang".to_string())).unwrap();
    parse(tokens.into_tokens())
}

fn print(source: &str) -> String {
    TreePrinter::print(&parse_source(source).unwrap())
}

fn parse_error(source: &str) -> ErrorImpl {
    parse_source(source).unwrap_err().get_kind().clone()
}

fn lines(expected: &[&str]) -> String {
    expected.iter().map(|line| format!("{}\n", line)).collect()
}

#[test]
fn test_parse_empty_program() {
    assert_eq!(print(""), lines(&["Block (root)"]));
}

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(
        print("1 + 2 * 3;"),
        lines(&[
            "Block (root)",
            "  Operator Add",
            "    Integer 1",
            "    Operator Multiply",
            "      Integer 2",
            "      Integer 3",
        ])
    );
}

#[test]
fn test_left_associativity() {
    assert_eq!(
        print("1 - 2 - 3;"),
        lines(&[
            "Block (root)",
            "  Operator Subtract",
            "    Operator Subtract",
            "      Integer 1",
            "      Integer 2",
            "    Integer 3",
        ])
    );
}

#[test]
fn test_right_associativity() {
    assert_eq!(
        print("define a; define b; a = b = 1;"),
        lines(&[
            "Block (root)",
            "  Declaration a: [dynamic]",
            "  Declaration b: [dynamic]",
            "  Operator Assignment",
            "    Identifier a",
            "    Operator Assignment",
            "      Identifier b",
            "      Integer 1",
        ])
    );
}

#[test]
fn test_grouping_and_prefix_operands() {
    assert_eq!(
        print("(-12 + -3) / 1.5 >> 1;"),
        lines(&[
            "Block (root)",
            "  Operator Right shift",
            "    Operator Divide",
            "      Operator Add",
            "        Operator Unary -",
            "          Integer 12",
            "        Operator Unary -",
            "          Integer 3",
            "      Float 1.5",
            "    Integer 1",
        ])
    );
}

#[test]
fn test_prefix_and_postfix_chains() {
    assert_eq!(
        print("define a; + -- a ++ --;"),
        lines(&[
            "Block (root)",
            "  Declaration a: [dynamic]",
            "  Operator Unary +",
            "    Operator Prefix --",
            "      Operator Postfix --",
            "        Operator Postfix ++",
            "          Identifier a",
        ])
    );
}

#[test]
fn test_call_binds_tighter_than_binary_operators() {
    assert_eq!(
        print("define a; function b [define x] do end a + b(1);"),
        lines(&[
            "Block (root)",
            "  Declaration a: [dynamic]",
            "  Function b [x: [dynamic]] => [void]",
            "    Block (function)",
            "  Operator Add",
            "    Identifier a",
            "    Operator Call",
            "      Identifier b",
            "      Integer 1",
        ])
    );
}

#[test]
fn test_call_arguments() {
    assert_eq!(
        print("define f; f(); f(1, 2); -f(3);"),
        lines(&[
            "Block (root)",
            "  Declaration f: [dynamic]",
            "  Operator Call",
            "    Identifier f",
            "    Operator No-op",
            "  Operator Call",
            "    Identifier f",
            "    Operator Comma",
            "      Integer 1",
            "      Integer 2",
            "  Operator Unary -",
            "    Operator Call",
            "      Identifier f",
            "      Integer 3",
        ])
    );
}

#[test]
fn test_grouped_callee() {
    assert_eq!(
        print("define f; (f)(1);"),
        lines(&[
            "Block (root)",
            "  Declaration f: [dynamic]",
            "  Operator Call",
            "    Identifier f",
            "    Integer 1",
        ])
    );
}

#[test]
fn test_subscript_and_member_access() {
    assert_eq!(
        print("define a; define p; a[1] + 2; p.x = a[0];"),
        lines(&[
            "Block (root)",
            "  Declaration a: [dynamic]",
            "  Declaration p: [dynamic]",
            "  Operator Add",
            "    Operator Subscript",
            "      Identifier a",
            "      Integer 1",
            "    Integer 2",
            "  Operator Assignment",
            "    Operator Member access",
            "      Identifier p",
            "      Identifier x",
            "    Operator Subscript",
            "      Identifier a",
            "      Integer 0",
        ])
    );
}

#[test]
fn test_declarations() {
    assert_eq!(
        print("define a = 1;\nInteger i = 2;\nFloat, Integer nr = 3.3;"),
        lines(&[
            "Block (root)",
            "  Declaration a: [dynamic]",
            "    Integer 1",
            "  Declaration i: Integer",
            "    Integer 2",
            "  Declaration nr: Float Integer",
            "    Float 3.3",
        ])
    );
}

#[test]
fn test_literal_type_mismatch() {
    assert_eq!(
        parse_error("Integer i = \"text\";"),
        ErrorImpl::TypeMatchError {
            expected: "Integer".to_string(),
            received: "String".to_string(),
        }
    );

    // Non-literal initializers are left for a runtime check.
    assert!(parse_source("define a = 1; Integer i = a;").is_ok());
    assert!(parse_source("String, Boolean s = true;").is_ok());
}

#[test]
fn test_missing_semicolon() {
    let error = parse_source("define a = 1").unwrap_err();
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::UnexpectedToken {
            expected: "`;`".to_string(),
            found: "end of file".to_string(),
        }
    );
    assert_eq!(error.get_tip().to_string(), "did you miss a semicolon?");
}

#[test]
fn test_unexpected_token_in_expression() {
    assert_eq!(
        parse_error("1 + ;"),
        ErrorImpl::UnexpectedToken {
            expected: "expression".to_string(),
            found: ";".to_string(),
        }
    );
}

#[test]
fn test_if_else_statement() {
    assert_eq!(
        print("if true == false do\n  1 + 2;\nelse do\n  100 - 101;\nend"),
        lines(&[
            "Block (root)",
            "  Branch",
            "    condition:",
            "      Operator Equality",
            "        Boolean true",
            "        Boolean false",
            "    success:",
            "      Block (if)",
            "        Operator Add",
            "          Integer 1",
            "          Integer 2",
            "    failure:",
            "      Block (code)",
            "        Operator Subtract",
            "          Integer 100",
            "          Integer 101",
        ])
    );
}

#[test]
fn test_else_if_chain_shares_end() {
    assert_eq!(
        print("if true do 1; else if false do 2; else do 3; end 4;"),
        lines(&[
            "Block (root)",
            "  Branch",
            "    condition:",
            "      Boolean true",
            "    success:",
            "      Block (if)",
            "        Integer 1",
            "    failure:",
            "      Branch",
            "        condition:",
            "          Boolean false",
            "        success:",
            "          Block (if)",
            "            Integer 2",
            "        failure:",
            "          Block (code)",
            "            Integer 3",
            "  Integer 4",
        ])
    );
}

#[test]
fn test_else_requires_do_or_if() {
    assert!(matches!(
        parse_error("if true do else 1; end"),
        ErrorImpl::UnexpectedTokenDetailed { .. }
    ));
}

#[test]
fn test_for_loop() {
    assert_eq!(
        print("for define x = 1; x < 3; ++x do\n  1+1;\nend"),
        lines(&[
            "Block (root)",
            "  Loop",
            "    init:",
            "      Declaration x: [dynamic]",
            "        Integer 1",
            "    condition:",
            "      Operator Less than",
            "        Identifier x",
            "        Integer 3",
            "    update:",
            "      Operator Prefix ++",
            "        Identifier x",
            "    code:",
            "      Block (code)",
            "        Operator Add",
            "          Integer 1",
            "          Integer 1",
        ])
    );
}

#[test]
fn test_for_loop_with_empty_header() {
    assert_eq!(
        print("for ;; do break; end"),
        lines(&[
            "Block (root)",
            "  Loop",
            "    code:",
            "      Block (code)",
            "        Break",
        ])
    );
}

#[test]
fn test_for_init_is_scoped_to_the_loop() {
    assert!(parse_source("for define i = 0; i < 10; i += 1 do i; end").is_ok());
    assert_eq!(
        parse_error("for define i = 0; i < 10; i += 1 do end i;"),
        ErrorImpl::VariableNotDeclared {
            variable: "i".to_string()
        }
    );
}

#[test]
fn test_while_loop_and_break() {
    assert_eq!(
        print("while true do if false do break; end end"),
        lines(&[
            "Block (root)",
            "  Loop",
            "    condition:",
            "      Boolean true",
            "    code:",
            "      Block (code)",
            "        Branch",
            "          condition:",
            "            Boolean false",
            "          success:",
            "            Block (if)",
            "              Break",
        ])
    );
}

#[test]
fn test_break_outside_loop() {
    assert_eq!(parse_error("break;"), ErrorImpl::BreakOutsideLoop);
    assert_eq!(
        parse_error("while true do function f do break; end end"),
        ErrorImpl::BreakOutsideLoop
    );
}

#[test]
fn test_return_statement() {
    assert_eq!(
        print("return 1 + 1; return;"),
        lines(&[
            "Block (root)",
            "  Return",
            "    Operator Add",
            "      Integer 1",
            "      Integer 1",
            "  Return",
        ])
    );
}

#[test]
fn test_functions() {
    assert_eq!(
        print("function add [Integer a, Float, Integer b] => Integer do return a + b; end"),
        lines(&[
            "Block (root)",
            "  Function add [a: Integer, b: Float Integer] => Integer",
            "    Block (function)",
            "      Return",
            "        Operator Add",
            "          Identifier a",
            "          Identifier b",
        ])
    );
    assert!(parse_source("function do end").is_ok());
    assert!(parse_source("function f => void do end").is_ok());
}

#[test]
fn test_recursive_function() {
    assert!(parse_source("function f [Integer n] => Integer do return f(n - 1); end").is_ok());
}

#[test]
fn test_function_arguments_are_local() {
    assert_eq!(
        parse_error("function f [define x] do end x;"),
        ErrorImpl::VariableNotDeclared {
            variable: "x".to_string()
        }
    );
    assert_eq!(
        parse_error("function f [define x, Integer x] do end"),
        ErrorImpl::VariableAlreadyDeclared {
            variable: "x".to_string()
        }
    );
}

#[test]
fn test_foreign_function() {
    assert_eq!(
        print("foreign function print [String s];"),
        lines(&[
            "Block (root)",
            "  Function print [s: String] => [void] foreign",
        ])
    );
    assert!(matches!(
        parse_error("foreign function [String s];"),
        ErrorImpl::UnexpectedTokenDetailed { .. }
    ));
}

#[test]
fn test_type_definition() {
    let source = "
type Point inherits from Shape do
  public Integer x = 0;
  private static define count;
  constructor [Integer x0] do x = x0; end
  public method length => Float do return x; end
  public foreign method native;
end";

    assert_eq!(
        print(source),
        lines(&[
            "Block (root)",
            "  Type Point inherits Shape",
            "    Member public x: Integer",
            "      Integer 0",
            "    Member private static count: [dynamic]",
            "    Constructor public [x0: Integer] => [void]",
            "      Block (function)",
            "        Operator Assignment",
            "          Identifier x",
            "          Identifier x0",
            "    Method public length [] => Float",
            "      Block (function)",
            "        Return",
            "          Identifier x",
            "    Method public native [] => [void] foreign",
        ])
    );
}

#[test]
fn test_type_modifier_errors() {
    let detailed = |source: &str| {
        matches!(
            parse_error(source),
            ErrorImpl::UnexpectedTokenDetailed { .. }
        )
    };

    assert!(detailed("type T do method m do end end"));
    assert!(detailed("type T do define x; end"));
    assert!(detailed("type T do static constructor do end end"));
    assert!(detailed("type T do public static static define x; end"));
    assert!(detailed("type T do public private define x; end"));
    assert!(detailed("type T do public foreign define x; end"));
}

#[test]
fn test_type_body_redeclaration() {
    assert_eq!(
        parse_error("type T do public define x; private Integer x; end"),
        ErrorImpl::VariableAlreadyDeclared {
            variable: "x".to_string()
        }
    );
    assert_eq!(
        parse_error("type T do end type T do end"),
        ErrorImpl::TypeAlreadyDeclared {
            type_: "T".to_string()
        }
    );
}

#[test]
fn test_redeclaration_in_one_block() {
    assert_eq!(
        parse_error("define a; define a;"),
        ErrorImpl::VariableAlreadyDeclared {
            variable: "a".to_string()
        }
    );
    assert_eq!(
        parse_error("function f do end function f do end"),
        ErrorImpl::FunctionAlreadyDeclared {
            function: "f".to_string()
        }
    );

    // A nested block is a new scope.
    assert!(parse_source("define a; do define a; a; end").is_ok());
}

#[test]
fn test_undeclared_variable() {
    let error = parse_source("define a;\na + b;").unwrap_err();
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::VariableNotDeclared {
            variable: "b".to_string()
        }
    );
    assert_eq!(error.get_trace().start.line, 2);
    assert_eq!(error.get_trace().start.column, 5);
}

#[test]
fn test_parser_requires_eof() {
    let token = MK_TOKEN!(TokenKind::Integer, "1".to_string(), Trace::null());

    let result = catch_unwind(AssertUnwindSafe(|| Parser::new(vec![token])));
    let payload = result.err().unwrap();
    let fault = payload.downcast_ref::<InternalFault>().unwrap();
    assert_eq!(fault.message, "token list must end with an EOF token");
}
