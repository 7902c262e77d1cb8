use super::builder::{build_from_xml, BuildError};
use crate::{
    ast::{
        ast::NodeKind,
        statements::{BlockType, Visibility},
        types::TypeInfo,
        visitor::TreePrinter,
    },
    errors::errors::{ErrorCategory, ErrorImpl},
    parse_source,
};

fn build(document: &str) -> crate::ast::ast::Ast {
    build_from_xml(document, None).unwrap()
}

fn build_error(document: &str) -> BuildError {
    build_from_xml(document, None).unwrap_err()
}

#[test]
fn test_empty_root() {
    let ast = build("<block/>");
    assert_eq!(ast.block(ast.get_root()).block_type, BlockType::Root);
    assert!(ast == parse_source("", None).unwrap());

    let ast = build(r#"<block type="root"></block>"#);
    assert_eq!(ast.len(), 1);
}

#[test]
fn test_simple_expression() {
    let document = r#"
<block type="root">
  <expr type="Operator" value="Divide">
    <expr type="Operator" value="Add">
      <expr type="Integer" value="12"/>
      <expr type="Integer" value="3"/>
    </expr>
    <expr type="Float" value="1.5"/>
  </expr>
</block>"#;

    assert!(build(document) == parse_source("(12 + 3) / 1.5;", None).unwrap());
    assert!(build(document) != parse_source("12 + 3 / 1.5;", None).unwrap());
}

#[test]
fn test_unary_chain() {
    let document = r#"
<block type="root">
  <decl ident="a" dynamic="true"/>
  <expr type="Operator" value="Unary +">
    <expr type="Operator" value="Prefix --">
      <expr type="Operator" value="Postfix --">
        <expr type="Operator" value="Postfix ++">
          <expr type="Identifier" value="a"/>
        </expr>
      </expr>
    </expr>
  </expr>
</block>"#;

    assert!(build(document) == parse_source("define a; + -- a ++ --;", None).unwrap());
}

#[test]
fn test_calls() {
    let document = r#"
<block>
  <function ident="f" args="a:,b:Integer">
    <block type="function"/>
  </function>
  <expr type="Operator" value="Call">
    <expr type="Identifier" value="f"/>
    <expr type="Operator" value="Comma">
      <expr type="Integer" value="1"/>
      <expr type="String" value="two"/>
    </expr>
  </expr>
  <expr type="Operator" value="Call">
    <expr type="Identifier" value="f"/>
    <expr type="Operator" value="No-op"/>
  </expr>
</block>"#;

    let source = r#"function f [define a, Integer b] do end f(1, "two"); f();"#;
    assert!(build(document) == parse_source(source, None).unwrap());
}

#[test]
fn test_declarations_and_types() {
    let document = r#"
<block type="root">
  <decl ident="nr" types="Integer Float">
    <expr type="Float" value="3.3"/>
  </decl>
</block>"#;

    let ast = build(document);
    let declaration = ast.children(ast.get_root())[0];
    match ast.kind(declaration) {
        NodeKind::Declaration(declaration) => {
            assert_eq!(declaration.identifier, "nr");
            assert_eq!(declaration.type_info, TypeInfo::definite(["Float", "Integer"]));
        }
        other => panic!("expected a declaration, found {}", other.name()),
    }
}

#[test]
fn test_else_if_chain() {
    let document = r#"
<block type="root">
  <branch>
    <expr type="Boolean" value="true"/>
    <block type="if"/>
    <branch>
      <expr type="Boolean" value="false"/>
      <block type="if">
        <expr type="Integer" value="1"/>
      </block>
      <block type="code">
        <expr type="Integer" value="2"/>
      </block>
    </branch>
  </branch>
</block>"#;

    let source = "if true do else if false do 1; else do 2; end";
    assert!(build(document) == parse_source(source, None).unwrap());
}

#[test]
fn test_while_and_break() {
    let document = r#"
<block type="root">
  <loop>
    <loop_condition><expr type="Boolean" value="true"/></loop_condition>
    <block type="code"><break/></block>
  </loop>
</block>"#;

    assert!(build(document) == parse_source("while true do break; end", None).unwrap());
}

#[test]
fn test_type_definition() {
    let document = r#"
<block type="root">
  <type name="Point" inherits="Shape Printable">
    <member ident="x" types="Integer" visibility="public">
      <expr type="Integer" value="0"/>
    </member>
    <member ident="count" dynamic="true" visibility="protected" static="true"/>
    <constructor args="x:Integer">
      <block type="function"/>
    </constructor>
    <method ident="norm" visibility="public" return="Float">
      <block type="function">
        <return><expr type="Float" value="1.0"/></return>
      </block>
    </method>
    <method ident="draw" visibility="private" static="true" foreign="true"/>
  </type>
</block>"#;

    let source = "
type Point inherits from Shape, Printable do
  public Integer x = 0;
  protected static define count;
  constructor [Integer x] do end
  public method norm => Float do return 1.0; end
  private static foreign method draw;
end";

    let ast = build(document);
    assert!(ast == parse_source(source, None).unwrap());
    assert!(TreePrinter::print(&ast).contains("Member protected static count: [dynamic]"));
}

#[test]
fn test_visibility_defaults() {
    let ast = build(
        r#"<block><type name="T"><member ident="a" dynamic="true"/><constructor><block/></constructor></type></block>"#,
    );
    let type_node = ast.children(ast.get_root())[0];
    let items = ast.children(type_node);

    match (ast.kind(items[0]), ast.kind(items[1])) {
        (NodeKind::Member(member), NodeKind::Constructor(constructor)) => {
            assert_eq!(member.visibility, Visibility::Private);
            assert_eq!(constructor.visibility, Visibility::Public);
        }
        _ => panic!("expected a member and a constructor"),
    }
}

#[test]
fn test_traces_point_into_the_document() {
    let ast = build_from_xml("<block>\n  <break/>\n</block>", Some("tree.xml".to_string())).unwrap();
    let break_node = ast.children(ast.get_root())[0];

    let trace = ast.trace(break_node);
    assert_eq!(trace.file.as_str(), "tree.xml");
    assert_eq!((trace.start.line, trace.start.column), (2, 3));
}

#[test]
fn test_malformed_document() {
    assert!(matches!(build_error("<block>"), BuildError::Document(_)));
    assert!(matches!(
        build_error("<expr/>"),
        BuildError::RootNotBlock { tag } if tag == "expr"
    ));
    assert!(matches!(
        build_error(r#"<block type="code"/>"#),
        BuildError::InvalidAttribute { attribute: "type", .. }
    ));
}

#[test]
fn test_element_errors() {
    assert!(matches!(
        build_error("<block><statement/></block>"),
        BuildError::UnknownElement { tag, .. } if tag == "statement"
    ));
    assert!(matches!(
        build_error(r#"<block><member ident="a" dynamic="true"/></block>"#),
        BuildError::UnexpectedChild { tag, child, .. } if tag == "block" && child == "member"
    ));
    assert!(matches!(
        build_error(r#"<block><expr type="Integer"/></block>"#),
        BuildError::MissingAttribute { attribute: "value", .. }
    ));
    assert!(matches!(
        build_error(r#"<block><expr type="Operator" value="Plus"/></block>"#),
        BuildError::InvalidAttribute { attribute: "value", .. }
    ));
    assert!(matches!(
        build_error(r#"<block><expr type="Integer" value="0x10"/></block>"#),
        BuildError::InvalidAttribute { attribute: "value", .. }
    ));
    assert!(matches!(
        build_error(r#"<block><decl ident="a"/></block>"#),
        BuildError::MissingAttribute { attribute: "types", .. }
    ));
    assert!(matches!(
        build_error(r#"<block><function foreign="true"/></block>"#),
        BuildError::MissingAttribute { attribute: "ident", .. }
    ));
    assert!(matches!(
        build_error(r#"<block><function ident="f"/></block>"#),
        BuildError::MissingChild { child: "code block", .. }
    ));
    assert!(matches!(
        build_error(r#"<block><branch><expr type="Boolean" value="true"/></branch></block>"#),
        BuildError::MissingChild { child: "success block", .. }
    ));
}

#[test]
fn test_operand_count() {
    let document = r#"
<block>
  <expr type="Operator" value="Add">
    <expr type="Integer" value="1"/>
  </expr>
</block>"#;

    match build_error(document) {
        BuildError::OperandCount {
            expected, found, ..
        } => assert_eq!((expected, found), (2, 1)),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_redeclaration_is_a_diagnostic() {
    let document = r#"
<block>
  <decl ident="a" dynamic="true"/>
  <decl ident="a" types="Integer"/>
</block>"#;

    match build_error(document) {
        BuildError::Diagnostic(error) => {
            assert_eq!(error.get_category(), ErrorCategory::Reference);
            assert_eq!(
                error.get_kind(),
                &ErrorImpl::VariableAlreadyDeclared {
                    variable: "a".to_string()
                }
            );
        }
        other => panic!("unexpected error: {}", other),
    }

    assert!(matches!(
        build_error(r#"<block><function ident="f" args="a:Integer,a:Float"><block/></function></block>"#),
        BuildError::Diagnostic(_)
    ));
}
