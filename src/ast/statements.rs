use std::slice::Iter;

use crate::{
    scope::scope::{FunctionId, ScopeId, VariableId},
    Span,
};

use super::{ast::Node, types::VarType};

/// A sequence of statements together with the scope they were parsed in.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub body: Vec<Node>,
    pub scope: ScopeId,
    pub span: Span,
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, Node> {
        self.body.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    pub name: String,
    pub id: VariableId,
    pub var_type: VarType,
    pub initializer: Option<Box<Node>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDeclStmt {
    pub name: String,
    pub id: FunctionId,
    pub return_type: VarType,
    pub params: Vec<VarDeclStmt>,
    /// Shares its scope with the parameters.
    pub body: BlockStmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Box<Node>,
    pub then_branch: BlockStmt,
    pub else_branch: Option<BlockStmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Box<Node>,
    pub body: BlockStmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Box<Node>>,
    pub span: Span,
}
