use std::{fmt::Display, rc::Rc};

use crate::{
    scope::scope::{FunctionId, VariableId},
    Span,
};

use super::{
    ast::Node,
    types::{Member, StructLayout, VarType},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Char(char),
    String(String),
    Variable { name: String, id: VariableId },
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{}", value),
            Literal::Float(value) => write!(f, "{:?}", value),
            Literal::Char(value) => write!(f, "{:?}", value),
            Literal::String(value) => write!(f, "{:?}", value),
            Literal::Variable { name, .. } => write!(f, "{}", name),
        }
    }
}

/// A literal or a resolved variable reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueExpr {
    pub value: Literal,
    pub var_type: VarType,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    /// `a, b` evaluates both and yields `b`.
    Comma,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equals
                | BinaryOp::NotEquals
                | BinaryOp::Less
                | BinaryOp::LessEquals
                | BinaryOp::Greater
                | BinaryOp::GreaterEquals
        )
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEquals => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEquals => ">=",
            BinaryOp::Comma => ",",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Node>,
    pub operator: BinaryOp,
    pub right: Box<Node>,
    pub var_type: VarType,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Negate => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub operand: Box<Node>,
    pub var_type: VarType,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl AssignOp {
    /// The arithmetic a compound assignment performs before storing.
    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Subtract => Some(BinaryOp::Subtract),
            AssignOp::Multiply => Some(BinaryOp::Multiply),
            AssignOp::Divide => Some(BinaryOp::Divide),
        }
    }
}

impl Display for AssignOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.binary_op() {
            Some(op) => write!(f, "{}=", op),
            None => write!(f, "="),
        }
    }
}

/// Assignment to a variable or a member chain. The expression's value is the
/// stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpr {
    pub target: Box<Node>,
    pub operator: AssignOp,
    pub value: Box<Node>,
    pub var_type: VarType,
    pub span: Span,
}

/// One `.name` or `->name` in a member chain.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberStep {
    pub layout: Rc<StructLayout>,
    pub index: usize,
    pub member: Member,
    pub arrow: bool,
}

/// A member chain such as `a.b->c`, resolved when it is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub base: VariableId,
    pub base_name: String,
    pub chain: Vec<MemberStep>,
    pub var_type: VarType,
    pub span: Span,
}

impl MemberExpr {
    /// The member the chain ends at.
    pub fn member(&self) -> Option<&Member> {
        self.chain.last().map(|step| &step.member)
    }

    pub fn path(&self) -> String {
        let mut path = self.base_name.clone();
        for step in &self.chain {
            path.push_str(if step.arrow { "->" } else { "." });
            path.push_str(&step.member.name);
        }
        path
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub function: FunctionId,
    /// One argument per parameter; omitted trailing arguments are filled in
    /// with the parameter defaults.
    pub arguments: Vec<Node>,
    pub var_type: VarType,
    pub span: Span,
}
