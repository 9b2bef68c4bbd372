use crate::Span;

use super::{
    expressions::{
        AssignmentExpr, BinaryExpr, CallExpr, Literal, MemberExpr, UnaryExpr, ValueExpr,
    },
    statements::{BlockStmt, FnDeclStmt, IfStmt, ReturnStmt, VarDeclStmt, WhileStmt},
    types::VarType,
};

/// Every node the parser produces. Expressions may appear directly as
/// statements inside a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Value(ValueExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Assign(AssignmentExpr),
    Member(MemberExpr),
    Call(CallExpr),
    VarDecl(VarDeclStmt),
    FuncDecl(FnDeclStmt),
    Block(BlockStmt),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
}

impl Node {
    /// Static type of an expression; statements are `void`.
    pub fn var_type(&self) -> VarType {
        match self {
            Node::Value(expr) => expr.var_type.clone(),
            Node::Binary(expr) => expr.var_type.clone(),
            Node::Unary(expr) => expr.var_type.clone(),
            Node::Assign(expr) => expr.var_type.clone(),
            Node::Member(expr) => expr.var_type.clone(),
            Node::Call(expr) => expr.var_type.clone(),
            _ => VarType::Void,
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Node::Value(_)
                | Node::Binary(_)
                | Node::Unary(_)
                | Node::Assign(_)
                | Node::Member(_)
                | Node::Call(_)
        )
    }

    /// True for expressions built only from literals.
    pub fn is_constant(&self) -> bool {
        match self {
            Node::Value(expr) => !matches!(expr.value, Literal::Variable { .. }),
            Node::Binary(expr) => expr.left.is_constant() && expr.right.is_constant(),
            Node::Unary(expr) => expr.operand.is_constant(),
            _ => false,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Node::Value(node) => &node.span,
            Node::Binary(node) => &node.span,
            Node::Unary(node) => &node.span,
            Node::Assign(node) => &node.span,
            Node::Member(node) => &node.span,
            Node::Call(node) => &node.span,
            Node::VarDecl(node) => &node.span,
            Node::FuncDecl(node) => &node.span,
            Node::Block(node) => &node.span,
            Node::If(node) => &node.span,
            Node::While(node) => &node.span,
            Node::Return(node) => &node.span,
        }
    }
}
