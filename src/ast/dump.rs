//! Indented textual form of the AST.
//!
//! One line per label, two spaces per nesting level. The output only depends
//! on the tree, so parsing the same tokens twice gives byte-identical dumps.

use super::{
    ast::Node,
    statements::{BlockStmt, VarDeclStmt},
};

pub fn dump(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

pub fn dump_block(block: &BlockStmt) -> String {
    let mut out = String::new();
    write_block(&mut out, block, 0);
    out
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(text);
    out.push('\n');
}

fn write_block(out: &mut String, block: &BlockStmt, depth: usize) {
    line(out, depth, "BLOCK:");
    for stmt in block.iter() {
        write_node(out, stmt, depth + 1);
    }
}

fn write_var(out: &mut String, decl: &VarDeclStmt, depth: usize) {
    line(out, depth, &format!("VAR: {} {}", decl.var_type, decl.name));
    if let Some(initializer) = &decl.initializer {
        write_node(out, initializer, depth + 1);
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    match node {
        Node::Value(expr) => line(out, depth, &format!("VALUE: {}", expr.value)),
        Node::Binary(expr) => {
            line(out, depth, "BINARY:");
            line(out, depth + 1, "LHS:");
            write_node(out, &expr.left, depth + 2);
            line(out, depth + 1, &format!("OPERAND: {}", expr.operator));
            line(out, depth + 1, "RHS:");
            write_node(out, &expr.right, depth + 2);
        }
        Node::Unary(expr) => {
            line(out, depth, &format!("UNARY: {}", expr.operator));
            write_node(out, &expr.operand, depth + 1);
        }
        Node::Assign(expr) => {
            line(out, depth, &format!("ASSIGN: {}", expr.operator));
            write_node(out, &expr.target, depth + 1);
            write_node(out, &expr.value, depth + 1);
        }
        Node::Member(expr) => {
            let offset = expr.member().map(|member| member.offset).unwrap_or(0);
            line(
                out,
                depth,
                &format!("MEMBER: {} ({}, offset {})", expr.path(), expr.var_type, offset),
            );
        }
        Node::Call(expr) => {
            line(out, depth, &format!("CALL: {}", expr.name));
            for argument in &expr.arguments {
                write_node(out, argument, depth + 1);
            }
        }
        Node::VarDecl(decl) => write_var(out, decl, depth),
        Node::FuncDecl(decl) => {
            line(out, depth, &format!("FUNC: {} {}", decl.return_type, decl.name));
            line(out, depth + 1, "Params:");
            for param in &decl.params {
                write_var(out, param, depth + 2);
            }
            line(out, depth + 1, "Body:");
            write_block(out, &decl.body, depth + 2);
        }
        Node::Block(block) => write_block(out, block, depth),
        Node::If(stmt) => {
            line(out, depth, "IF:");
            line(out, depth + 1, "Cond:");
            write_node(out, &stmt.condition, depth + 2);
            line(out, depth + 1, "Then:");
            write_block(out, &stmt.then_branch, depth + 2);
            if let Some(else_branch) = &stmt.else_branch {
                line(out, depth + 1, "Else:");
                write_block(out, else_branch, depth + 2);
            }
        }
        Node::While(stmt) => {
            line(out, depth, "WHILE:");
            line(out, depth + 1, "COND:");
            write_node(out, &stmt.condition, depth + 2);
            line(out, depth + 1, "THEN:");
            write_block(out, &stmt.body, depth + 2);
        }
        Node::Return(stmt) => {
            line(out, depth, "RETURN:");
            if let Some(value) = &stmt.value {
                write_node(out, value, depth + 1);
            }
        }
    }
}
