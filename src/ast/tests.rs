use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::{scope::scope::{ScopeId, VariableId}, Span};

use super::{
    ast::Node,
    dump::dump,
    expressions::{BinaryExpr, BinaryOp, Literal, ValueExpr},
    statements::{BlockStmt, VarDeclStmt},
    types::{StructLayout, VarType},
};

fn int(value: i64) -> Node {
    Node::Value(ValueExpr {
        value: Literal::Integer(value),
        var_type: VarType::Int,
        span: Span::null(),
    })
}

#[test]
fn test_primitive_sizes() {
    let sizes: Vec<u32> = [
        VarType::Void,
        VarType::Char,
        VarType::Short,
        VarType::Int,
        VarType::Long,
        VarType::Float,
        VarType::Double,
    ]
    .iter()
    .map(VarType::size)
    .collect();

    assert_eq!(sizes, vec![0, 1, 2, 4, 8, 4, 8]);
    assert_eq!(VarType::Char.pointer_to().size(), 8);
    assert_eq!(VarType::Array(Rc::new(VarType::Short), 5).size(), 10);
}

#[test]
fn test_struct_layout_has_no_padding() {
    let mut layout = StructLayout::new(1, "S".to_string());
    assert!(layout.push_member("a".to_string(), VarType::Int));
    assert!(layout.push_member("b".to_string(), VarType::Char));
    assert!(layout.push_member("c".to_string(), VarType::Double));

    let offsets: Vec<u32> = layout.members.iter().map(|m| m.offset).collect();
    assert_eq!(offsets, vec![0, 4, 5]);
    assert_eq!(layout.size, 13);
    assert_eq!(layout.member_index("c"), Some(2));
    assert!(!layout.push_member("a".to_string(), VarType::Int));
}

#[test]
fn test_struct_identity_is_by_declaration() {
    let first = VarType::Struct(Rc::new(StructLayout::new(1, "P".to_string())));
    let same = VarType::Struct(Rc::new(StructLayout::new(1, "P".to_string())));
    let other = VarType::Struct(Rc::new(StructLayout::new(2, "P".to_string())));

    assert_eq!(first, same);
    assert_ne!(first, other);
}

#[test]
fn test_type_display() {
    let point = VarType::Struct(Rc::new(StructLayout::new(1, "P".to_string())));

    assert_eq!(VarType::Int.to_string(), "int");
    assert_eq!(point.to_string(), "struct P");
    assert_eq!(point.pointer_to().to_string(), "struct P*");
    assert_eq!(VarType::Array(Rc::new(VarType::Int), 4).to_string(), "int[4]");
}

#[test]
fn test_constant_detection() {
    let sum = Node::Binary(BinaryExpr {
        left: Box::new(int(1)),
        operator: BinaryOp::Add,
        right: Box::new(int(2)),
        var_type: VarType::Int,
        span: Span::null(),
    });
    let variable = Node::Value(ValueExpr {
        value: Literal::Variable {
            name: "x".to_string(),
            id: VariableId(0),
        },
        var_type: VarType::Int,
        span: Span::null(),
    });

    assert!(sum.is_constant());
    assert!(!variable.is_constant());
    assert!(sum.is_expression());
}

#[test]
fn test_dump_format() {
    let block = Node::Block(BlockStmt {
        body: vec![Node::VarDecl(VarDeclStmt {
            name: "x".to_string(),
            id: VariableId(0),
            var_type: VarType::Int,
            initializer: Some(Box::new(Node::Binary(BinaryExpr {
                left: Box::new(int(1)),
                operator: BinaryOp::Subtract,
                right: Box::new(int(2)),
                var_type: VarType::Int,
                span: Span::null(),
            }))),
            span: Span::null(),
        })],
        scope: ScopeId::ROOT,
        span: Span::null(),
    });

    let expected = "\
BLOCK:
  VAR: int x
    BINARY:
      LHS:
        VALUE: 1
      OPERAND: -
      RHS:
        VALUE: 2
";
    assert_eq!(dump(&block), expected);
}
