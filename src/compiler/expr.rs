use inkwell::{
    types::BasicTypeEnum,
    values::{BasicMetadataValueEnum, BasicValueEnum, FloatValue, IntValue, PointerValue},
    FloatPredicate, IntPredicate,
};

use crate::{
    ast::{
        ast::Node,
        expressions::{
            AssignmentExpr, BinaryExpr, BinaryOp, CallExpr, Literal, MemberExpr, UnaryExpr,
            UnaryOp, ValueExpr,
        },
        types::VarType,
    },
    errors::errors::{Error, ErrorImpl},
    ArithmeticMode,
};

use super::compiler::Compiler;

/// Lowers an expression to a value. `expected` is the type the value will be
/// stored as, which lets literals be emitted directly at that type.
pub fn gen_expression<'ctx>(
    compiler: &mut Compiler<'ctx>,
    expr: &Node,
    expected: Option<&VarType>,
) -> Result<BasicValueEnum<'ctx>, Error> {
    match expr {
        Node::Value(value) => gen_value(compiler, value, expected),
        Node::Binary(binary) => gen_binary(compiler, binary),
        Node::Unary(unary) => gen_unary(compiler, unary),
        Node::Assign(assignment) => gen_assignment(compiler, assignment),
        Node::Member(member) => {
            let address = member_address(compiler, member)?;
            Ok(compiler.builder.build_load(address, &member.path())?)
        }
        Node::Call(call) => gen_call(compiler, call)?.ok_or_else(|| {
            Error::new(
                ErrorImpl::TypeMatchError {
                    expected: "a value".to_string(),
                    received: VarType::Void.to_string(),
                },
                call.span.start.clone(),
            )
        }),
        other => Err(Error::codegen(format!(
            "statement on line {} used as a value",
            other.span().line()
        ))),
    }
}

fn gen_value<'ctx>(
    compiler: &mut Compiler<'ctx>,
    value: &ValueExpr,
    expected: Option<&VarType>,
) -> Result<BasicValueEnum<'ctx>, Error> {
    let context = compiler.context;

    let llvm_value: BasicValueEnum<'ctx> = match &value.value {
        Literal::Integer(integer) => match expected {
            Some(target) if target.is_float() => {
                let float_type = compiler.llvm_type(target)?.into_float_type();
                float_type.const_float(*integer as f64).into()
            }
            Some(target) if target.is_integer() => {
                let int_type = compiler.llvm_type(target)?.into_int_type();
                int_type.const_int(*integer as u64, true).into()
            }
            _ => context.i32_type().const_int(*integer as u64, true).into(),
        },
        Literal::Float(float) => match expected {
            Some(target) if target.is_float() => {
                let float_type = compiler.llvm_type(target)?.into_float_type();
                float_type.const_float(*float).into()
            }
            _ => context.f64_type().const_float(*float).into(),
        },
        Literal::Char(character) => {
            let code = *character as u32 as u64;
            match expected {
                Some(target) if target.is_integer() => {
                    let int_type = compiler.llvm_type(target)?.into_int_type();
                    int_type.const_int(code, false).into()
                }
                _ => context.i8_type().const_int(code, false).into(),
            }
        }
        Literal::String(string) => compiler
            .builder
            .build_global_string_ptr(string, "str")?
            .as_pointer_value()
            .into(),
        Literal::Variable { name, id } => {
            let slot = compiler.slot(*id, &value.span.start)?;
            compiler.builder.build_load(slot, name)?
        }
    };

    Ok(llvm_value)
}

/// Type both operands are converted to before the operator is applied. A
/// constant side adapts to the other side.
fn operand_type(left: &Node, right: &Node) -> VarType {
    let left_type = left.var_type();
    let right_type = right.var_type();
    if left_type == right_type {
        return left_type;
    }

    match (left.is_constant(), right.is_constant()) {
        (true, false) => right_type,
        (false, true) => left_type,
        _ => match (left_type.is_float(), right_type.is_float()) {
            (true, false) => left_type,
            (false, true) => right_type,
            _ if left_type.size() >= right_type.size() => left_type,
            _ => right_type,
        },
    }
}

fn gen_binary<'ctx>(
    compiler: &mut Compiler<'ctx>,
    binary: &BinaryExpr,
) -> Result<BasicValueEnum<'ctx>, Error> {
    if binary.operator == BinaryOp::Comma {
        gen_expression(compiler, &binary.left, None)?;
        return gen_expression(compiler, &binary.right, None);
    }

    let operand_type = operand_type(&binary.left, &binary.right);
    let lhs = gen_expression(compiler, &binary.left, Some(&operand_type))?;
    let rhs = gen_expression(compiler, &binary.right, Some(&operand_type))?;

    gen_operation(compiler, binary.operator, lhs, rhs, &operand_type)
}

/// Applies a binary operator to two lowered operands of `operand_type`.
pub fn gen_operation<'ctx>(
    compiler: &mut Compiler<'ctx>,
    operator: BinaryOp,
    lhs: BasicValueEnum<'ctx>,
    rhs: BasicValueEnum<'ctx>,
    operand_type: &VarType,
) -> Result<BasicValueEnum<'ctx>, Error> {
    let float_mode = compiler.options.arithmetic == ArithmeticMode::Float;
    let f64_type: BasicTypeEnum<'ctx> = compiler.context.f64_type().into();

    let result = if float_mode && operand_type.is_numeric() {
        let lhs = compiler.cast_value(lhs, f64_type)?.into_float_value();
        let rhs = compiler.cast_value(rhs, f64_type)?.into_float_value();
        float_operation(compiler, operator, lhs, rhs)?
    } else if operand_type.is_float() {
        let llvm_type = compiler.llvm_type(operand_type)?;
        let lhs = compiler.cast_value(lhs, llvm_type)?.into_float_value();
        let rhs = compiler.cast_value(rhs, llvm_type)?.into_float_value();
        float_operation(compiler, operator, lhs, rhs)?
    } else if let VarType::Pointer(_) = operand_type {
        let lhs = pointer_to_int(compiler, lhs)?;
        let rhs = pointer_to_int(compiler, rhs)?;
        int_operation(compiler, operator, lhs, rhs)?
    } else {
        let llvm_type = compiler.llvm_type(operand_type)?;
        let lhs = compiler.cast_value(lhs, llvm_type)?.into_int_value();
        let rhs = compiler.cast_value(rhs, llvm_type)?.into_int_value();
        int_operation(compiler, operator, lhs, rhs)?
    };

    // Comparisons stay doubles too
    if float_mode && operator.is_comparison() {
        return compiler.cast_value(result, f64_type);
    }

    Ok(result)
}

fn pointer_to_int<'ctx>(
    compiler: &Compiler<'ctx>,
    value: BasicValueEnum<'ctx>,
) -> Result<IntValue<'ctx>, Error> {
    match value {
        BasicValueEnum::PointerValue(pointer) => Ok(compiler.builder.build_ptr_to_int(
            pointer,
            compiler.context.i64_type(),
            "ptrtoint",
        )?),
        other => Err(Error::codegen(format!(
            "expected a pointer, found {:?}",
            other.get_type()
        ))),
    }
}

fn int_operation<'ctx>(
    compiler: &Compiler<'ctx>,
    operator: BinaryOp,
    lhs: IntValue<'ctx>,
    rhs: IntValue<'ctx>,
) -> Result<BasicValueEnum<'ctx>, Error> {
    let builder = &compiler.builder;
    let compare = |predicate| builder.build_int_compare(predicate, lhs, rhs, "cmp");

    let value = match operator {
        BinaryOp::Add => builder.build_int_add(lhs, rhs, "add")?,
        BinaryOp::Subtract => builder.build_int_sub(lhs, rhs, "sub")?,
        BinaryOp::Multiply => builder.build_int_mul(lhs, rhs, "mul")?,
        BinaryOp::Divide => builder.build_int_signed_div(lhs, rhs, "div")?,
        BinaryOp::Equals => compare(IntPredicate::EQ)?,
        BinaryOp::NotEquals => compare(IntPredicate::NE)?,
        BinaryOp::Less => compare(IntPredicate::SLT)?,
        BinaryOp::LessEquals => compare(IntPredicate::SLE)?,
        BinaryOp::Greater => compare(IntPredicate::SGT)?,
        BinaryOp::GreaterEquals => compare(IntPredicate::SGE)?,
        BinaryOp::Comma => rhs,
    };

    Ok(value.into())
}

fn float_operation<'ctx>(
    compiler: &Compiler<'ctx>,
    operator: BinaryOp,
    lhs: FloatValue<'ctx>,
    rhs: FloatValue<'ctx>,
) -> Result<BasicValueEnum<'ctx>, Error> {
    let builder = &compiler.builder;
    let compare = |predicate| builder.build_float_compare(predicate, lhs, rhs, "cmp");

    let value: BasicValueEnum<'ctx> = match operator {
        BinaryOp::Add => builder.build_float_add(lhs, rhs, "add")?.into(),
        BinaryOp::Subtract => builder.build_float_sub(lhs, rhs, "sub")?.into(),
        BinaryOp::Multiply => builder.build_float_mul(lhs, rhs, "mul")?.into(),
        BinaryOp::Divide => builder.build_float_div(lhs, rhs, "div")?.into(),
        BinaryOp::Equals => compare(FloatPredicate::OEQ)?.into(),
        BinaryOp::NotEquals => compare(FloatPredicate::ONE)?.into(),
        BinaryOp::Less => compare(FloatPredicate::OLT)?.into(),
        BinaryOp::LessEquals => compare(FloatPredicate::OLE)?.into(),
        BinaryOp::Greater => compare(FloatPredicate::OGT)?.into(),
        BinaryOp::GreaterEquals => compare(FloatPredicate::OGE)?.into(),
        BinaryOp::Comma => rhs.into(),
    };

    Ok(value)
}

fn gen_unary<'ctx>(
    compiler: &mut Compiler<'ctx>,
    unary: &UnaryExpr,
) -> Result<BasicValueEnum<'ctx>, Error> {
    let float_mode = compiler.options.arithmetic == ArithmeticMode::Float;
    let f64_type: BasicTypeEnum<'ctx> = compiler.context.f64_type().into();

    match unary.operator {
        UnaryOp::Not => {
            let operand = gen_expression(compiler, &unary.operand, None)?;
            let condition = compiler.build_condition(operand)?;
            let negated: BasicValueEnum<'ctx> =
                compiler.builder.build_not(condition, "not")?.into();

            if float_mode {
                compiler.cast_value(negated, f64_type)
            } else {
                Ok(negated)
            }
        }
        UnaryOp::Negate => {
            let mut operand = gen_expression(compiler, &unary.operand, Some(&unary.var_type))?;
            if float_mode {
                operand = compiler.cast_value(operand, f64_type)?;
            }

            let negated: BasicValueEnum<'ctx> = match operand {
                BasicValueEnum::IntValue(int) => compiler.builder.build_int_neg(int, "neg")?.into(),
                BasicValueEnum::FloatValue(float) => {
                    compiler.builder.build_float_neg(float, "neg")?.into()
                }
                other => {
                    return Err(Error::codegen(format!(
                        "cannot negate {:?}",
                        other.get_type()
                    )))
                }
            };

            Ok(negated)
        }
    }
}

/// Stores into a variable or member and yields the stored value.
pub fn gen_assignment<'ctx>(
    compiler: &mut Compiler<'ctx>,
    assignment: &AssignmentExpr,
) -> Result<BasicValueEnum<'ctx>, Error> {
    let target_type = &assignment.var_type;
    let address = gen_address(compiler, &assignment.target)?;

    let value = gen_expression(compiler, &assignment.value, Some(target_type))?;
    let value = match assignment.operator.binary_op() {
        Some(operator) => {
            let current = compiler.builder.build_load(address, "current")?;
            gen_operation(compiler, operator, current, value, target_type)?
        }
        None => value,
    };

    let value = compiler.cast_to(value, target_type)?;
    compiler.builder.build_store(address, value)?;

    Ok(value)
}

/// Address of an assignable expression.
pub fn gen_address<'ctx>(
    compiler: &mut Compiler<'ctx>,
    target: &Node,
) -> Result<PointerValue<'ctx>, Error> {
    match target {
        Node::Value(ValueExpr {
            value: Literal::Variable { id, .. },
            span,
            ..
        }) => compiler.slot(*id, &span.start),
        Node::Member(member) => member_address(compiler, member),
        other => Err(Error::new(
            ErrorImpl::InvalidAssignmentTarget,
            other.span().start.clone(),
        )),
    }
}

/// Walks a member chain from its base variable. Each `->` loads the pointer
/// before indexing.
fn member_address<'ctx>(
    compiler: &mut Compiler<'ctx>,
    member: &MemberExpr,
) -> Result<PointerValue<'ctx>, Error> {
    let mut address = compiler.slot(member.base, &member.span.start)?;

    for step in &member.chain {
        if step.arrow {
            address = match compiler.builder.build_load(address, "deref")? {
                BasicValueEnum::PointerValue(pointer) => pointer,
                other => {
                    return Err(Error::codegen(format!(
                        "{} is not a pointer: {:?}",
                        member.base_name,
                        other.get_type()
                    )))
                }
            };
        }

        address = compiler
            .builder
            .build_struct_gep(address, step.index as u32, &step.member.name)?;
    }

    Ok(address)
}

/// Calls a function with its arguments converted to the parameter types.
/// A `void` call yields no value.
pub fn gen_call<'ctx>(
    compiler: &mut Compiler<'ctx>,
    call: &CallExpr,
) -> Result<Option<BasicValueEnum<'ctx>>, Error> {
    let function = compiler
        .functions
        .get(&call.function)
        .copied()
        .ok_or_else(|| {
            Error::new(
                ErrorImpl::FunctionNotDeclared {
                    function: call.name.clone(),
                },
                call.span.start.clone(),
            )
        })?;

    let param_types: Vec<VarType> = compiler
        .scopes
        .function(call.function)
        .params
        .iter()
        .map(|param| param.var_type.clone())
        .collect();

    let mut arguments: Vec<BasicMetadataValueEnum<'ctx>> = vec![];
    for (argument, param_type) in call.arguments.iter().zip(&param_types) {
        let value = gen_expression(compiler, argument, Some(param_type))?;
        arguments.push(compiler.cast_to(value, param_type)?.into());
    }

    // Void results cannot be named
    let name = if call.var_type == VarType::Void { "" } else { "call" };
    let call_site = compiler.builder.build_call(function, &arguments, name)?;

    Ok(call_site.try_as_basic_value().left())
}
