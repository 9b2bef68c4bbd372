//! Lowering of the parsed tree to LLVM IR.
//!
//! A [`Compiler`] is created per compilation unit and owns the module, the
//! builder and the per-unit tables (variable slots, struct types, function
//! values). Nothing is global, so independent compilations can share a
//! process and tests can build isolated instances.
//!
//! File-scope variables become zero-initialised globals. Their initialisers,
//! and any other statement written at file scope, are lowered into a
//! synthesized `void __module_init()` that a user `main` calls first.

use std::{collections::HashMap, path::Path};

use inkwell::{
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::Module,
    targets::TargetMachine,
    types::{BasicType, BasicTypeEnum, StructType},
    values::{AnyValue, BasicValueEnum, FunctionValue, IntValue, PointerValue},
    AddressSpace, FloatPredicate, IntPredicate,
};

use crate::{
    ast::{statements::BlockStmt, types::{StructLayout, VarType}},
    errors::errors::{Diagnostics, Error, ErrorImpl},
    parser::parser::{parse_source, ParseResult},
    scope::scope::{FunctionId, ScopeTable, VariableId},
    CompileOptions, Position,
};

use super::stmt::gen_statement;

/// Name of the function that runs file-scope initialisers.
pub const MODULE_INIT: &str = "__module_init";

pub struct Compiler<'ctx> {
    pub options: CompileOptions,
    /// Symbols from parsing; lowering only activates scopes, it never
    /// declares anything.
    pub scopes: ScopeTable,

    /// Storage slot (alloca or global) of every lowered variable
    pub named_allocas: HashMap<VariableId, PointerValue<'ctx>>,
    /// LLVM struct types keyed by struct declaration id
    pub named_structs: HashMap<usize, StructType<'ctx>>,
    pub functions: HashMap<FunctionId, FunctionValue<'ctx>>,
    /// Function whose body is being lowered
    pub current_function: Option<FunctionValue<'ctx>>,
    pub return_type: VarType,
    pub init_function: FunctionValue<'ctx>,

    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,
}

impl<'ctx> Compiler<'ctx> {
    pub fn new(
        context: &'ctx Context,
        scopes: ScopeTable,
        module_name: &str,
        options: CompileOptions,
    ) -> Self {
        let module = context.create_module(module_name);
        module.set_triple(&TargetMachine::get_default_triple());

        let builder = context.create_builder();
        let init_function =
            module.add_function(MODULE_INIT, context.void_type().fn_type(&[], false), None);
        let entry = context.append_basic_block(init_function, "entry");
        builder.position_at_end(entry);

        Compiler {
            options,
            scopes,
            named_allocas: HashMap::new(),
            named_structs: HashMap::new(),
            functions: HashMap::new(),
            current_function: Some(init_function),
            return_type: VarType::Void,
            init_function,
            context,
            module,
            builder,
        }
    }

    /// Lowers the file-scope block, closes `__module_init` and verifies the
    /// module.
    fn gen(&mut self, root: &BlockStmt) -> Result<(), Error> {
        for statement in root.iter() {
            gen_statement(self, statement)?;
        }

        if !self.current_block_terminated() {
            self.builder.build_return(None)?;
        }

        self.module.verify().map_err(|message| {
            Error::new(
                ErrorImpl::InvalidModule {
                    message: message.to_string(),
                },
                Position::null(),
            )
        })
    }

    /// The IR type of a value of `var_type`. `void` has none.
    pub fn llvm_type(&mut self, var_type: &VarType) -> Result<BasicTypeEnum<'ctx>, Error> {
        let llvm_type: BasicTypeEnum<'ctx> = match var_type {
            VarType::Char => self.context.i8_type().into(),
            VarType::Short => self.context.i16_type().into(),
            VarType::Int => self.context.i32_type().into(),
            VarType::Long => self.context.i64_type().into(),
            VarType::Float => self.context.f32_type().into(),
            VarType::Double => self.context.f64_type().into(),
            VarType::Pointer(base) => match base.as_ref() {
                VarType::Void => self
                    .context
                    .i8_type()
                    .ptr_type(AddressSpace::default())
                    .into(),
                base => self
                    .llvm_type(base)?
                    .ptr_type(AddressSpace::default())
                    .into(),
            },
            VarType::Array(element, count) => self.llvm_type(element)?.array_type(*count).into(),
            VarType::Struct(layout) => self.struct_type(layout)?.into(),
            VarType::Void | VarType::Error => {
                return Err(Error::codegen(format!("type {} has no value", var_type)))
            }
        };

        Ok(llvm_type)
    }

    /// Packed named struct matching the parser's offsets.
    fn struct_type(&mut self, layout: &StructLayout) -> Result<StructType<'ctx>, Error> {
        if let Some(struct_type) = self.named_structs.get(&layout.id) {
            return Ok(*struct_type);
        }

        let mut fields = vec![];
        for member in &layout.members {
            fields.push(self.llvm_type(&member.var_type)?);
        }

        let struct_type = self.context.opaque_struct_type(&layout.name);
        struct_type.set_body(&fields, true);
        self.named_structs.insert(layout.id, struct_type);

        Ok(struct_type)
    }

    pub fn zero_value(&self, llvm_type: BasicTypeEnum<'ctx>) -> Result<BasicValueEnum<'ctx>, Error> {
        #[allow(unreachable_patterns)]
        let zero = match llvm_type {
            BasicTypeEnum::ArrayType(t) => t.const_zero().into(),
            BasicTypeEnum::FloatType(t) => t.const_zero().into(),
            BasicTypeEnum::IntType(t) => t.const_zero().into(),
            BasicTypeEnum::PointerType(t) => t.const_null().into(),
            BasicTypeEnum::StructType(t) => t.const_zero().into(),
            BasicTypeEnum::VectorType(t) => t.const_zero().into(),
            other => return Err(Error::codegen(format!("no zero value for {:?}", other))),
        };

        Ok(zero)
    }

    /// Converts a value to another IR type: integer widths, int/float,
    /// float widths and pointer casts. Booleans (`i1`) are zero-extended.
    pub fn cast_value(
        &self,
        value: BasicValueEnum<'ctx>,
        target: BasicTypeEnum<'ctx>,
    ) -> Result<BasicValueEnum<'ctx>, Error> {
        if value.get_type() == target {
            return Ok(value);
        }

        let builder = &self.builder;
        let converted: BasicValueEnum<'ctx> = match (value, target) {
            (BasicValueEnum::IntValue(int), BasicTypeEnum::IntType(int_type)) => {
                let from = int.get_type().get_bit_width();
                let to = int_type.get_bit_width();
                if to == 1 {
                    self.build_condition(value)?.into()
                } else if from == 1 {
                    builder.build_int_z_extend(int, int_type, "zext")?.into()
                } else if from < to {
                    builder.build_int_s_extend(int, int_type, "sext")?.into()
                } else {
                    builder.build_int_truncate(int, int_type, "trunc")?.into()
                }
            }
            (BasicValueEnum::IntValue(int), BasicTypeEnum::FloatType(float_type)) => {
                if int.get_type().get_bit_width() == 1 {
                    builder
                        .build_unsigned_int_to_float(int, float_type, "uitofp")?
                        .into()
                } else {
                    builder
                        .build_signed_int_to_float(int, float_type, "sitofp")?
                        .into()
                }
            }
            (BasicValueEnum::FloatValue(float), BasicTypeEnum::IntType(int_type)) => {
                if int_type.get_bit_width() == 1 {
                    self.build_condition(value)?.into()
                } else {
                    builder
                        .build_float_to_signed_int(float, int_type, "fptosi")?
                        .into()
                }
            }
            (BasicValueEnum::FloatValue(float), BasicTypeEnum::FloatType(float_type)) => {
                if float.get_type() == self.context.f32_type() {
                    builder.build_float_ext(float, float_type, "fpext")?.into()
                } else {
                    builder.build_float_trunc(float, float_type, "fptrunc")?.into()
                }
            }
            (BasicValueEnum::PointerValue(pointer), BasicTypeEnum::PointerType(pointer_type)) => {
                builder
                    .build_pointer_cast(pointer, pointer_type, "ptrcast")?
                    .into()
            }
            (BasicValueEnum::PointerValue(_), BasicTypeEnum::IntType(int_type))
                if int_type.get_bit_width() == 1 =>
            {
                self.build_condition(value)?.into()
            }
            _ => {
                return Err(Error::codegen(format!(
                    "cannot convert {:?} to {:?}",
                    value.get_type(),
                    target
                )))
            }
        };

        Ok(converted)
    }

    /// Casts `value` to the IR type of `var_type`.
    pub fn cast_to(
        &mut self,
        value: BasicValueEnum<'ctx>,
        var_type: &VarType,
    ) -> Result<BasicValueEnum<'ctx>, Error> {
        let target = self.llvm_type(var_type)?;
        self.cast_value(value, target)
    }

    /// Truth value of a scalar as an `i1`: non-zero, non-null.
    pub fn build_condition(&self, value: BasicValueEnum<'ctx>) -> Result<IntValue<'ctx>, Error> {
        let condition = match value {
            BasicValueEnum::IntValue(int) if int.get_type().get_bit_width() == 1 => int,
            BasicValueEnum::IntValue(int) => self.builder.build_int_compare(
                IntPredicate::NE,
                int,
                int.get_type().const_zero(),
                "cond",
            )?,
            BasicValueEnum::FloatValue(float) => self.builder.build_float_compare(
                FloatPredicate::ONE,
                float,
                float.get_type().const_zero(),
                "cond",
            )?,
            BasicValueEnum::PointerValue(pointer) => {
                self.builder.build_is_not_null(pointer, "cond")?
            }
            other => {
                return Err(Error::codegen(format!(
                    "{:?} cannot be used as a condition",
                    other.get_type()
                )))
            }
        };

        Ok(condition)
    }

    /// Stack slot in the entry block of the current function, so loops do
    /// not grow the stack.
    pub fn create_entry_alloca(
        &self,
        llvm_type: BasicTypeEnum<'ctx>,
        name: &str,
    ) -> Result<PointerValue<'ctx>, Error> {
        let function = self
            .current_function
            .ok_or_else(|| Error::codegen("no function to allocate in"))?;
        let entry = function
            .get_first_basic_block()
            .ok_or_else(|| Error::codegen("function has no entry block"))?;

        let builder = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(first) => builder.position_before(&first),
            None => builder.position_at_end(entry),
        }

        Ok(builder.build_alloca(llvm_type, name)?)
    }

    /// The storage slot of a variable.
    pub fn slot(&self, id: VariableId, position: &Position) -> Result<PointerValue<'ctx>, Error> {
        let not_allocated = || {
            Error::new(
                ErrorImpl::VariableNotAllocated {
                    variable: self.scopes.variable(id).name.clone(),
                },
                position.clone(),
            )
        };

        if !self.scopes.is_visible(id) {
            return Err(not_allocated());
        }

        self.named_allocas.get(&id).copied().ok_or_else(not_allocated)
    }

    pub fn current_block(&self) -> Result<BasicBlock<'ctx>, Error> {
        self.builder
            .get_insert_block()
            .ok_or_else(|| Error::codegen("builder is not positioned"))
    }

    pub fn current_block_terminated(&self) -> bool {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_terminator())
            .is_some()
    }

    pub fn append_block(&self, name: &str) -> Result<BasicBlock<'ctx>, Error> {
        let function = self
            .current_function
            .ok_or_else(|| Error::codegen("no function to append a block to"))?;

        Ok(self.context.append_basic_block(function, name))
    }

    /// Logs the IR of the function being lowered when tracing is enabled.
    pub fn trace(&self) {
        if !self.options.trace_ir {
            return;
        }

        if let Some(function) = self.current_function {
            log::trace!("{}", function.print_to_string().to_string());
        }
    }
}

/// A successfully lowered and verified module.
pub struct Compilation<'ctx> {
    module: Module<'ctx>,
}

impl<'ctx> Compilation<'ctx> {
    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    pub fn function(&self, name: &str) -> Option<FunctionValue<'ctx>> {
        self.module.get_function(name)
    }

    /// Textual IR of the whole module.
    pub fn ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    pub fn write_ir(&self, path: &Path) -> Result<(), Error> {
        self.module
            .print_to_file(path)
            .map_err(|message| Error::codegen(message.to_string()))
    }
}

/// Lowers a parsed unit. Parse diagnostics are returned unchanged; lowering
/// only runs on an error-free tree.
pub fn compile<'ctx>(
    context: &'ctx Context,
    parsed: ParseResult,
    module_name: &str,
    options: CompileOptions,
) -> Result<Compilation<'ctx>, Diagnostics> {
    if parsed.has_errors() {
        return Err(parsed.diagnostics);
    }

    let mut compiler = Compiler::new(context, parsed.scopes, module_name, options);
    compiler.gen(&parsed.root)?;

    log::debug!(
        "lowered {} functions into module {}",
        compiler.functions.len(),
        module_name
    );

    Ok(Compilation {
        module: compiler.module,
    })
}

/// Lexes, parses and lowers a source string.
pub fn compile_source<'ctx>(
    context: &'ctx Context,
    source: &str,
    file_name: &str,
    options: CompileOptions,
) -> Result<Compilation<'ctx>, Diagnostics> {
    let parsed = parse_source(source, Some(file_name.to_string()), options);
    compile(context, parsed, file_name, options)
}
