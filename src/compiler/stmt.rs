use inkwell::{
    basic_block::BasicBlock,
    types::{BasicMetadataTypeEnum, BasicType},
    values::{BasicValueEnum, FunctionValue},
    AddressSpace,
};

use crate::{
    ast::{
        ast::Node,
        statements::{BlockStmt, FnDeclStmt, IfStmt, ReturnStmt, VarDeclStmt, WhileStmt},
        types::VarType,
    },
    errors::errors::Error,
};

use super::{
    compiler::Compiler,
    expr::{gen_call, gen_expression},
};

/// Lowers one statement. The result is the value the statement produces,
/// if any, which becomes the value of an enclosing `if` branch when it is
/// the branch's last statement.
pub fn gen_statement<'ctx>(
    compiler: &mut Compiler<'ctx>,
    stmt: &Node,
) -> Result<Option<BasicValueEnum<'ctx>>, Error> {
    let value = match stmt {
        Node::VarDecl(decl) => gen_var_decl(compiler, decl)?,
        Node::FuncDecl(function) => {
            gen_function(compiler, function)?;
            None
        }
        Node::Block(block) => gen_block(compiler, block)?,
        Node::If(if_stmt) => gen_if(compiler, if_stmt)?,
        Node::While(while_stmt) => {
            gen_while(compiler, while_stmt)?;
            None
        }
        Node::Return(return_stmt) => gen_return(compiler, return_stmt)?,
        Node::Call(call) => gen_call(compiler, call)?,
        expr => Some(gen_expression(compiler, expr, None)?),
    };

    compiler.trace();
    Ok(value)
}

/// Lowers a block with its scope active and yields the value of its last
/// statement.
pub fn gen_block<'ctx>(
    compiler: &mut Compiler<'ctx>,
    block: &BlockStmt,
) -> Result<Option<BasicValueEnum<'ctx>>, Error> {
    let previous = compiler.scopes.activate(block.scope);

    let mut result = Ok(None);
    for statement in block.iter() {
        result = gen_statement(compiler, statement);
        if result.is_err() {
            break;
        }
    }

    compiler.scopes.activate(previous);
    result
}

fn gen_var_decl<'ctx>(
    compiler: &mut Compiler<'ctx>,
    decl: &VarDeclStmt,
) -> Result<Option<BasicValueEnum<'ctx>>, Error> {
    let llvm_type = compiler.llvm_type(&decl.var_type)?;

    let slot = if compiler.scopes.variable(decl.id).is_global() {
        let global =
            compiler
                .module
                .add_global(llvm_type, Some(AddressSpace::default()), &decl.name);
        global.set_initializer(&compiler.zero_value(llvm_type)?);
        global.as_pointer_value()
    } else {
        compiler.create_entry_alloca(llvm_type, &decl.name)?
    };
    compiler.named_allocas.insert(decl.id, slot);

    let Some(initializer) = &decl.initializer else {
        return Ok(None);
    };

    // File-scope initialisers run inside __module_init
    let value = gen_expression(compiler, initializer, Some(&decl.var_type))?;
    let value = compiler.cast_value(value, llvm_type)?;
    compiler.builder.build_store(slot, value)?;

    Ok(Some(value))
}

fn gen_function<'ctx>(compiler: &mut Compiler<'ctx>, function: &FnDeclStmt) -> Result<(), Error> {
    let mut param_types: Vec<BasicMetadataTypeEnum<'ctx>> = vec![];
    for param in &function.params {
        param_types.push(compiler.llvm_type(&param.var_type)?.into());
    }

    let fn_type = match &function.return_type {
        VarType::Void => compiler.context.void_type().fn_type(&param_types, false),
        return_type => compiler.llvm_type(return_type)?.fn_type(&param_types, false),
    };

    let fn_value = compiler.module.add_function(&function.name, fn_type, None);
    // Registered first so the body can call itself
    compiler.functions.insert(function.id, fn_value);

    let previous_block = compiler.current_block()?;
    let previous_function = compiler.current_function.replace(fn_value);
    let previous_return =
        std::mem::replace(&mut compiler.return_type, function.return_type.clone());

    let result = gen_function_body(compiler, function, fn_value);

    compiler.return_type = previous_return;
    compiler.current_function = previous_function;
    compiler.builder.position_at_end(previous_block);

    result?;
    log::debug!("lowered function {}", function.name);
    Ok(())
}

fn gen_function_body<'ctx>(
    compiler: &mut Compiler<'ctx>,
    function: &FnDeclStmt,
    fn_value: FunctionValue<'ctx>,
) -> Result<(), Error> {
    let entry = compiler.context.append_basic_block(fn_value, "entry");
    compiler.builder.position_at_end(entry);

    if function.name == "main" {
        compiler
            .builder
            .build_call(compiler.init_function, &[], "")?;
    }

    for (param, value) in function.params.iter().zip(fn_value.get_param_iter()) {
        let slot = compiler.create_entry_alloca(value.get_type(), &param.name)?;
        compiler.builder.build_store(slot, value)?;
        compiler.named_allocas.insert(param.id, slot);
    }

    gen_block(compiler, &function.body)?;

    // Falling off the end returns zero
    if !compiler.current_block_terminated() {
        match &function.return_type {
            VarType::Void => {
                compiler.builder.build_return(None)?;
            }
            return_type => {
                let llvm_type = compiler.llvm_type(return_type)?;
                let zero = compiler.zero_value(llvm_type)?;
                compiler.builder.build_return(Some(&zero))?;
            }
        }
    }

    Ok(())
}

/// Branches to `target` unless the current block already ends, and returns
/// the block that was left.
fn branch_to<'ctx>(
    compiler: &Compiler<'ctx>,
    target: BasicBlock<'ctx>,
) -> Result<BasicBlock<'ctx>, Error> {
    let block = compiler.current_block()?;
    if block.get_terminator().is_none() {
        compiler.builder.build_unconditional_branch(target)?;
    }

    Ok(block)
}

/// Every `if` gets then, else and merge blocks, even without an `else`.
/// When a branch yields a value the merge block starts with a phi of the
/// first valued branch's type; a branch without a matching value
/// contributes zero.
fn gen_if<'ctx>(
    compiler: &mut Compiler<'ctx>,
    if_stmt: &IfStmt,
) -> Result<Option<BasicValueEnum<'ctx>>, Error> {
    let condition = gen_expression(compiler, &if_stmt.condition, None)?;
    let condition = compiler.build_condition(condition)?;

    let then_block = compiler.append_block("then")?;
    let else_block = compiler.append_block("else")?;
    let merge_block = compiler.append_block("merge")?;
    compiler
        .builder
        .build_conditional_branch(condition, then_block, else_block)?;

    compiler.builder.position_at_end(then_block);
    let then_value = gen_block(compiler, &if_stmt.then_branch)?;
    let then_end = branch_to(compiler, merge_block)?;

    compiler.builder.position_at_end(else_block);
    let else_value = match &if_stmt.else_branch {
        Some(else_branch) => gen_block(compiler, else_branch)?,
        None => None,
    };
    let else_end = branch_to(compiler, merge_block)?;

    compiler.builder.position_at_end(merge_block);

    let phi_type = match then_value.or(else_value) {
        Some(value) => value.get_type(),
        None => return Ok(None),
    };

    let phi = compiler.builder.build_phi(phi_type, "if.value")?;
    for (value, block) in [(then_value, then_end), (else_value, else_end)] {
        let incoming = match value {
            Some(value) if value.get_type() == phi_type => value,
            _ => compiler.zero_value(phi_type)?,
        };
        phi.add_incoming(&[(&incoming, block)]);
    }

    Ok(Some(phi.as_basic_value()))
}

fn gen_while<'ctx>(compiler: &mut Compiler<'ctx>, while_stmt: &WhileStmt) -> Result<(), Error> {
    let cond_block = compiler.append_block("while.cond")?;
    let body_block = compiler.append_block("while.body")?;
    let end_block = compiler.append_block("while.end")?;

    branch_to(compiler, cond_block)?;

    compiler.builder.position_at_end(cond_block);
    let condition = gen_expression(compiler, &while_stmt.condition, None)?;
    let condition = compiler.build_condition(condition)?;
    compiler
        .builder
        .build_conditional_branch(condition, body_block, end_block)?;

    compiler.builder.position_at_end(body_block);
    gen_block(compiler, &while_stmt.body)?;
    branch_to(compiler, cond_block)?;

    compiler.builder.position_at_end(end_block);
    Ok(())
}

/// Returns from the current function. Anything after a `return` lands in a
/// fresh block with no predecessors.
fn gen_return<'ctx>(
    compiler: &mut Compiler<'ctx>,
    return_stmt: &ReturnStmt,
) -> Result<Option<BasicValueEnum<'ctx>>, Error> {
    let value = match &return_stmt.value {
        Some(expr) => {
            let return_type = compiler.return_type.clone();
            let value = gen_expression(compiler, expr, Some(&return_type))?;
            let value = compiler.cast_to(value, &return_type)?;
            compiler.builder.build_return(Some(&value))?;
            Some(value)
        }
        None => {
            compiler.builder.build_return(None)?;
            None
        }
    };

    let unreachable = compiler.append_block("after.return")?;
    compiler.builder.position_at_end(unreachable);

    Ok(value)
}
