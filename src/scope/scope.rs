//! Lexical scopes stored in an arena.
//!
//! Scopes reference their parent by index. A scope stays in the arena after
//! it is exited because the `Block` that owns it refers to it by id; once
//! exited it is simply no longer reachable from the active scope.

use crate::{
    ast::{ast::Node, types::VarType},
    errors::errors::ErrorImpl,
    lexer::tokens::RESERVED_LOOKUP,
    Position,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub usize);

impl ScopeId {
    /// File scope.
    pub const ROOT: ScopeId = ScopeId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub var_type: VarType,
    pub scope: ScopeId,
    pub position: Position,
}

impl Variable {
    pub fn is_global(&self) -> bool {
        self.scope == ScopeId::ROOT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub var_type: VarType,
    /// Constant expression used when a call omits the argument.
    pub default: Option<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSig {
    pub name: String,
    pub return_type: VarType,
    pub params: Vec<Parameter>,
}

impl FunctionSig {
    /// Number of arguments a call must supply.
    pub fn required_params(&self) -> usize {
        self.params
            .iter()
            .rposition(|param| param.default.is_none())
            .map(|index| index + 1)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Struct types in declaration order.
    pub types: Vec<VarType>,
    pub variables: Vec<VariableId>,
    pub functions: Vec<FunctionId>,
}

#[derive(Debug, Clone)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
    variables: Vec<Variable>,
    functions: Vec<FunctionSig>,
    current: ScopeId,
    struct_count: usize,
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTable {
    pub fn new() -> Self {
        ScopeTable {
            scopes: vec![Scope::default()],
            variables: vec![],
            functions: vec![],
            current: ScopeId::ROOT,
            struct_count: 0,
        }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn is_global(&self) -> bool {
        self.current == ScopeId::ROOT
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn function(&self, id: FunctionId) -> &FunctionSig {
        &self.functions[id.0]
    }

    /// Creates a child of the active scope and activates it.
    pub fn enter_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: Some(self.current),
            ..Scope::default()
        });
        self.scopes[self.current.0].children.push(id);
        self.current = id;

        log::debug!("entered scope {}", id.0);
        id
    }

    /// Reactivates the parent of the active scope. The root has no parent and
    /// stays active.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0].parent {
            log::debug!("exited scope {}", self.current.0);
            self.current = parent;
        }
    }

    /// Makes `id` the active scope and returns the previously active one.
    pub fn activate(&mut self, id: ScopeId) -> ScopeId {
        std::mem::replace(&mut self.current, id)
    }

    /// Id for the next struct declaration.
    pub fn next_struct_id(&mut self) -> usize {
        self.struct_count += 1;
        self.struct_count
    }

    pub fn declare_type(&mut self, var_type: VarType) -> Result<(), ErrorImpl> {
        let name = match var_type.as_struct() {
            Some(layout) => layout.name.clone(),
            None => {
                return Err(ErrorImpl::UnknownType {
                    type_: var_type.to_string(),
                })
            }
        };

        let scope = &mut self.scopes[self.current.0];
        let duplicate = scope
            .types
            .iter()
            .any(|declared| declared.as_struct().map(|l| l.name == name).unwrap_or(false));
        if duplicate {
            return Err(ErrorImpl::TypeAlreadyDeclared { type_: name });
        }

        log::debug!("declared type struct {} in scope {}", name, self.current.0);
        scope.types.push(var_type);
        Ok(())
    }

    pub fn declare_variable(
        &mut self,
        name: &str,
        var_type: VarType,
        position: Position,
    ) -> Result<VariableId, ErrorImpl> {
        let duplicate = self.scopes[self.current.0]
            .variables
            .iter()
            .any(|id| self.variables[id.0].name == name);
        if duplicate {
            return Err(ErrorImpl::VariableAlreadyDeclared {
                variable: name.to_string(),
            });
        }

        let id = VariableId(self.variables.len());
        log::debug!("declared {} {} in scope {}", var_type, name, self.current.0);

        self.variables.push(Variable {
            name: name.to_string(),
            var_type,
            scope: self.current,
            position,
        });
        self.scopes[self.current.0].variables.push(id);
        Ok(id)
    }

    pub fn declare_function(&mut self, signature: FunctionSig) -> Result<FunctionId, ErrorImpl> {
        if self.find_function(&signature.name).is_some() {
            return Err(ErrorImpl::FunctionAlreadyDeclared {
                function: signature.name,
            });
        }

        let id = FunctionId(self.functions.len());
        log::debug!("declared function {}", signature.name);

        self.functions.push(signature);
        self.scopes[self.current.0].functions.push(id);
        Ok(id)
    }

    /// Fills in the parameter list of a function registered before its
    /// parameters were parsed.
    pub fn set_function_params(&mut self, id: FunctionId, params: Vec<Parameter>) {
        self.functions[id.0].params = params;
    }

    fn ancestors(&self) -> impl Iterator<Item = &Scope> {
        let mut next = Some(self.current);
        std::iter::from_fn(move || {
            let id = next?;
            let scope = &self.scopes[id.0];
            next = scope.parent;
            Some(scope)
        })
    }

    /// Resolves a type name. Primitive keywords win over every scope.
    pub fn find_type(&self, name: &str) -> Option<VarType> {
        if let Some(primitive) = RESERVED_LOOKUP
            .get(name)
            .copied()
            .and_then(VarType::primitive)
        {
            return Some(primitive);
        }

        self.ancestors().find_map(|scope| {
            scope
                .types
                .iter()
                .rev()
                .find(|declared| {
                    declared
                        .as_struct()
                        .map(|layout| layout.name == name)
                        .unwrap_or(false)
                })
                .cloned()
        })
    }

    /// Nearest visible variable with this name.
    pub fn find_identifier(&self, name: &str) -> Option<VariableId> {
        self.ancestors().find_map(|scope| {
            scope
                .variables
                .iter()
                .rev()
                .find(|id| self.variables[id.0].name == name)
                .copied()
        })
    }

    pub fn find_function(&self, name: &str) -> Option<FunctionId> {
        self.ancestors().find_map(|scope| {
            scope
                .functions
                .iter()
                .find(|id| self.functions[id.0].name == name)
                .copied()
        })
    }

    /// True if the variable's scope is the active scope or one of its
    /// ancestors.
    pub fn is_visible(&self, id: VariableId) -> bool {
        let owner = self.variables[id.0].scope;
        let mut next = Some(self.current);
        while let Some(scope) = next {
            if scope == owner {
                return true;
            }
            next = self.scopes[scope.0].parent;
        }
        false
    }
}
