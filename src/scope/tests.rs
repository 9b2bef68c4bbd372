use std::rc::Rc;

use crate::{
    ast::types::{StructLayout, VarType},
    errors::errors::ErrorImpl,
    Position,
};

use super::scope::{FunctionSig, Parameter, ScopeId, ScopeTable};

fn struct_type(table: &mut ScopeTable, name: &str) -> VarType {
    let mut layout = StructLayout::new(table.next_struct_id(), name.to_string());
    layout.push_member("x".to_string(), VarType::Int);
    VarType::Struct(Rc::new(layout))
}

#[test]
fn test_root_scope_is_active() {
    let table = ScopeTable::new();

    assert_eq!(table.current(), ScopeId::ROOT);
    assert!(table.is_global());
}

#[test]
fn test_shadowing_and_restore() {
    let mut table = ScopeTable::new();
    let outer = table
        .declare_variable("x", VarType::Int, Position::null())
        .unwrap();

    table.enter_scope();
    assert_eq!(table.find_identifier("x"), Some(outer));

    let inner = table
        .declare_variable("x", VarType::Double, Position::null())
        .unwrap();
    assert_ne!(inner, outer);
    assert_eq!(table.find_identifier("x"), Some(inner));
    assert_eq!(table.variable(inner).var_type, VarType::Double);

    table.exit_scope();
    assert_eq!(table.find_identifier("x"), Some(outer));
    assert!(!table.is_visible(inner));
    assert!(table.is_visible(outer));
}

#[test]
fn test_duplicate_variable_in_same_scope() {
    let mut table = ScopeTable::new();
    table
        .declare_variable("a", VarType::Int, Position::null())
        .unwrap();

    let result = table.declare_variable("a", VarType::Char, Position::null());
    assert_eq!(
        result,
        Err(ErrorImpl::VariableAlreadyDeclared {
            variable: "a".to_string()
        })
    );
}

#[test]
fn test_lookup_not_found_is_none() {
    let table = ScopeTable::new();

    assert_eq!(table.find_identifier("missing"), None);
    assert_eq!(table.find_type("Missing"), None);
    assert_eq!(table.find_function("missing"), None);
}

#[test]
fn test_primitive_types_resolve_everywhere() {
    let mut table = ScopeTable::new();
    table.enter_scope();
    table.enter_scope();

    assert_eq!(table.find_type("int"), Some(VarType::Int));
    assert_eq!(table.find_type("double"), Some(VarType::Double));
    assert_eq!(table.find_type("while"), None);
}

#[test]
fn test_struct_types_follow_scopes() {
    let mut table = ScopeTable::new();
    let outer = struct_type(&mut table, "P");
    table.declare_type(outer.clone()).unwrap();

    table.enter_scope();
    assert_eq!(table.find_type("P"), Some(outer.clone()));

    let inner = struct_type(&mut table, "P");
    table.declare_type(inner.clone()).unwrap();
    assert_eq!(table.find_type("P"), Some(inner.clone()));
    assert_ne!(inner, outer);

    table.exit_scope();
    assert_eq!(table.find_type("P"), Some(outer));
}

#[test]
fn test_duplicate_type_in_same_scope() {
    let mut table = ScopeTable::new();
    let first = struct_type(&mut table, "P");
    let second = struct_type(&mut table, "P");
    table.declare_type(first).unwrap();

    assert_eq!(
        table.declare_type(second),
        Err(ErrorImpl::TypeAlreadyDeclared {
            type_: "P".to_string()
        })
    );
}

#[test]
fn test_exited_scope_stays_in_arena() {
    let mut table = ScopeTable::new();
    let block = table.enter_scope();
    let id = table
        .declare_variable("t", VarType::Int, Position::null())
        .unwrap();
    table.exit_scope();

    assert_eq!(table.find_identifier("t"), None);
    assert_eq!(table.scope(block).variables, vec![id]);
    assert_eq!(table.scope(ScopeId::ROOT).children, vec![block]);

    let previous = table.activate(block);
    assert_eq!(previous, ScopeId::ROOT);
    assert_eq!(table.find_identifier("t"), Some(id));
}

#[test]
fn test_exit_root_is_noop() {
    let mut table = ScopeTable::new();
    table.exit_scope();

    assert_eq!(table.current(), ScopeId::ROOT);
}

#[test]
fn test_functions() {
    let mut table = ScopeTable::new();
    let id = table
        .declare_function(FunctionSig {
            name: "f".to_string(),
            return_type: VarType::Int,
            params: vec![],
        })
        .unwrap();
    table.set_function_params(
        id,
        vec![Parameter {
            name: "a".to_string(),
            var_type: VarType::Int,
            default: None,
        }],
    );

    table.enter_scope();
    assert_eq!(table.find_function("f"), Some(id));
    assert_eq!(table.function(id).required_params(), 1);

    let duplicate = table.declare_function(FunctionSig {
        name: "f".to_string(),
        return_type: VarType::Void,
        params: vec![],
    });
    assert!(matches!(
        duplicate,
        Err(ErrorImpl::FunctionAlreadyDeclared { .. })
    ));
}
