//! Core IR builder: turns a flat Wasm operator stream into a structured
//! instruction tree.
//!
//! ## Overview
//!
//! Unlike a stack-machine interpreter that simulates Wasm's implicit value
//! stack and allocates a basic-block graph, `TreeBuilder` does a direct
//! recursive descent over the operator stream. `wasmparser` already delimits
//! nested structure with `Operator::End` (closes block/loop/if) and
//! `Operator::Else` (splits if/else), so a function body, and each nested
//! block/loop/if arm, is parsed by the same `parse_expr` routine: consume
//! operators into an `Expression` until a delimiter is hit, then return.
//!
//! No value-stack or control-stack bookkeeping is needed here: operand order
//! is implicit in the resulting tree (an instruction's operands are whatever
//! precedes it in the same `Expression`), and a `Call`'s arity is resolved
//! later from module-level signatures during code generation, not during
//! tree construction.

use super::super::types::*;
use anyhow::{bail, Context, Result};
use wasmparser::Operator;

/// Module-level context for function translation.
///
/// Contains information about the module's functions, types, and imports that
/// is needed during translation of individual functions.
#[derive(Debug, Clone, Default)]
pub struct ModuleContext {
    /// Number of imported functions (these occupy indices 0..N-1 in the
    /// function index space, before local functions).
    pub num_imported_functions: usize,
}

/// Builds a structured instruction tree from a flat Wasm operator stream.
pub struct TreeBuilder;

impl TreeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Translate one function body's operators into an `Expression` tree.
    ///
    /// `operators` must include the trailing `Operator::End` that closes the
    /// function body (as returned by `wasmparser`'s operator reader).
    pub fn translate_function(&mut self, operators: &[Operator]) -> Result<Expression> {
        let mut pos = 0;
        let body = self
            .parse_expr(operators, &mut pos)
            .context("translating function body")?;
        if pos != operators.len() {
            bail!("trailing operators after function body end");
        }
        Ok(body)
    }

    /// Parse operators into an `Expression`, stopping at (and consuming) the
    /// matching `End`, or stopping without consuming at an `Else` (the caller,
    /// `If`, decides what to do next).
    fn parse_expr(&mut self, ops: &[Operator], pos: &mut usize) -> Result<Expression> {
        let mut body = Vec::new();
        loop {
            let op = ops
                .get(*pos)
                .ok_or_else(|| anyhow::anyhow!("unexpected end of operator stream"))?;

            if matches!(op, Operator::Else) {
                return Ok(body);
            }
            if matches!(op, Operator::End) {
                *pos += 1;
                return Ok(body);
            }

            *pos += 1;
            body.push(self.parse_one(op, ops, pos)?);
        }
    }

    /// Parse a single operator, recursing into `parse_expr` for block/loop/if bodies.
    /// `pos` already points past `op` itself.
    fn parse_one(&mut self, op: &Operator, ops: &[Operator], pos: &mut usize) -> Result<Instruction> {
        Ok(match op {
            Operator::Block { blockty } => Instruction::Block(BlockArgs {
                rt: block_result_type(blockty)?,
                body: self.parse_expr(ops, pos)?,
            }),

            Operator::Loop { blockty } => Instruction::Loop(BlockArgs {
                rt: block_result_type(blockty)?,
                body: self.parse_expr(ops, pos)?,
            }),

            Operator::If { blockty } => {
                let rt = block_result_type(blockty)?;
                let then_branch = self.parse_expr(ops, pos)?;
                let else_branch = if matches!(ops.get(*pos), Some(Operator::Else)) {
                    *pos += 1;
                    self.parse_expr(ops, pos)?
                } else {
                    Vec::new()
                };
                Instruction::If(IfArgs {
                    rt,
                    then_branch,
                    else_branch,
                })
            }

            _ => translate_flat(op)?,
        })
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn block_result_type(blockty: &wasmparser::BlockType) -> Result<Option<WasmType>> {
    match blockty {
        wasmparser::BlockType::Empty => Ok(None),
        wasmparser::BlockType::Type(vt) => Ok(Some(WasmType::from_wasmparser(*vt))),
        wasmparser::BlockType::FuncType(_) => bail!("multi-value blocks not supported"),
    }
}

/// Translate a single non-structural operator to an `Instruction`.
/// `Block`/`Loop`/`If`/`Else`/`End` are handled by the caller, since they need
/// access to the surrounding operator stream to recurse.
fn translate_flat(op: &Operator) -> Result<Instruction> {
    use MemoryAccessWidth as W;
    use SignExtension as S;

    Ok(match op {
        Operator::Unreachable => Instruction::Unreachable,
        Operator::Nop => Instruction::Nop,

        Operator::Br { relative_depth } => Instruction::Br(*relative_depth),
        Operator::BrIf { relative_depth } => Instruction::BrIf(*relative_depth),
        Operator::BrTable { targets } => {
            let labels: Vec<u32> = targets.targets().collect::<Result<_, _>>()?;
            Instruction::BrTable(BrTableArgs {
                labels,
                default: targets.default(),
            })
        }
        Operator::Return => Instruction::Return,

        Operator::Call { function_index } => Instruction::Call {
            func_idx: *function_index,
        },
        Operator::CallIndirect {
            type_index,
            table_index,
        } => {
            if *table_index != 0 {
                bail!("multi-table not supported (table_index={})", table_index);
            }
            Instruction::CallIndirect {
                type_idx: TypeIdx::new(*type_index as usize),
            }
        }

        Operator::Drop => Instruction::Drop,
        Operator::Select => Instruction::Select,

        Operator::LocalGet { local_index } => Instruction::LocalGet(*local_index),
        Operator::LocalSet { local_index } => Instruction::LocalSet(*local_index),
        Operator::LocalTee { local_index } => Instruction::LocalTee(*local_index),

        Operator::GlobalGet { global_index } => {
            Instruction::GlobalGet(GlobalIdx::new(*global_index as usize))
        }
        Operator::GlobalSet { global_index } => {
            Instruction::GlobalSet(GlobalIdx::new(*global_index as usize))
        }

        // Full-width loads
        Operator::I32Load { memarg } => load(WasmType::I32, W::Full, None, memarg),
        Operator::I64Load { memarg } => load(WasmType::I64, W::Full, None, memarg),
        Operator::F32Load { memarg } => load(WasmType::F32, W::Full, None, memarg),
        Operator::F64Load { memarg } => load(WasmType::F64, W::Full, None, memarg),

        // Sub-width i32 loads
        Operator::I32Load8S { memarg } => load(WasmType::I32, W::I8, Some(S::Signed), memarg),
        Operator::I32Load8U { memarg } => load(WasmType::I32, W::I8, Some(S::Unsigned), memarg),
        Operator::I32Load16S { memarg } => load(WasmType::I32, W::I16, Some(S::Signed), memarg),
        Operator::I32Load16U { memarg } => load(WasmType::I32, W::I16, Some(S::Unsigned), memarg),

        // Sub-width i64 loads
        Operator::I64Load8S { memarg } => load(WasmType::I64, W::I8, Some(S::Signed), memarg),
        Operator::I64Load8U { memarg } => load(WasmType::I64, W::I8, Some(S::Unsigned), memarg),
        Operator::I64Load16S { memarg } => load(WasmType::I64, W::I16, Some(S::Signed), memarg),
        Operator::I64Load16U { memarg } => load(WasmType::I64, W::I16, Some(S::Unsigned), memarg),
        Operator::I64Load32S { memarg } => load(WasmType::I64, W::I32, Some(S::Signed), memarg),
        Operator::I64Load32U { memarg } => load(WasmType::I64, W::I32, Some(S::Unsigned), memarg),

        // Full-width stores
        Operator::I32Store { memarg } => store(WasmType::I32, W::Full, memarg),
        Operator::I64Store { memarg } => store(WasmType::I64, W::Full, memarg),
        Operator::F32Store { memarg } => store(WasmType::F32, W::Full, memarg),
        Operator::F64Store { memarg } => store(WasmType::F64, W::Full, memarg),

        // Sub-width stores
        Operator::I32Store8 { memarg } => store(WasmType::I32, W::I8, memarg),
        Operator::I32Store16 { memarg } => store(WasmType::I32, W::I16, memarg),
        Operator::I64Store8 { memarg } => store(WasmType::I64, W::I8, memarg),
        Operator::I64Store16 { memarg } => store(WasmType::I64, W::I16, memarg),
        Operator::I64Store32 { memarg } => store(WasmType::I64, W::I32, memarg),

        Operator::MemorySize { mem: 0, .. } => Instruction::MemorySize,
        Operator::MemoryGrow { mem: 0, .. } => Instruction::MemoryGrow,

        Operator::I32Const { value } => Instruction::Const(IrValue::I32(*value)),
        Operator::I64Const { value } => Instruction::Const(IrValue::I64(*value)),
        Operator::F32Const { value } => Instruction::Const(IrValue::F32(f32::from_bits(value.bits()))),
        Operator::F64Const { value } => Instruction::Const(IrValue::F64(f64::from_bits(value.bits()))),

        // i32 binops
        Operator::I32Add => Instruction::Bin(BinOp::I32Add),
        Operator::I32Sub => Instruction::Bin(BinOp::I32Sub),
        Operator::I32Mul => Instruction::Bin(BinOp::I32Mul),
        Operator::I32DivS => Instruction::Bin(BinOp::I32DivS),
        Operator::I32DivU => Instruction::Bin(BinOp::I32DivU),
        Operator::I32RemS => Instruction::Bin(BinOp::I32RemS),
        Operator::I32RemU => Instruction::Bin(BinOp::I32RemU),
        Operator::I32And => Instruction::Bin(BinOp::I32And),
        Operator::I32Or => Instruction::Bin(BinOp::I32Or),
        Operator::I32Xor => Instruction::Bin(BinOp::I32Xor),
        Operator::I32Shl => Instruction::Bin(BinOp::I32Shl),
        Operator::I32ShrS => Instruction::Bin(BinOp::I32ShrS),
        Operator::I32ShrU => Instruction::Bin(BinOp::I32ShrU),
        Operator::I32Rotl => Instruction::Bin(BinOp::I32Rotl),
        Operator::I32Rotr => Instruction::Bin(BinOp::I32Rotr),
        Operator::I32Eq => Instruction::Bin(BinOp::I32Eq),
        Operator::I32Ne => Instruction::Bin(BinOp::I32Ne),
        Operator::I32LtS => Instruction::Bin(BinOp::I32LtS),
        Operator::I32LtU => Instruction::Bin(BinOp::I32LtU),
        Operator::I32GtS => Instruction::Bin(BinOp::I32GtS),
        Operator::I32GtU => Instruction::Bin(BinOp::I32GtU),
        Operator::I32LeS => Instruction::Bin(BinOp::I32LeS),
        Operator::I32LeU => Instruction::Bin(BinOp::I32LeU),
        Operator::I32GeS => Instruction::Bin(BinOp::I32GeS),
        Operator::I32GeU => Instruction::Bin(BinOp::I32GeU),
        Operator::I32Eqz => Instruction::Un(UnOp::I32Eqz),
        Operator::I32Clz => Instruction::Un(UnOp::I32Clz),
        Operator::I32Ctz => Instruction::Un(UnOp::I32Ctz),
        Operator::I32Popcnt => Instruction::Un(UnOp::I32Popcnt),

        // i64 binops
        Operator::I64Add => Instruction::Bin(BinOp::I64Add),
        Operator::I64Sub => Instruction::Bin(BinOp::I64Sub),
        Operator::I64Mul => Instruction::Bin(BinOp::I64Mul),
        Operator::I64DivS => Instruction::Bin(BinOp::I64DivS),
        Operator::I64DivU => Instruction::Bin(BinOp::I64DivU),
        Operator::I64RemS => Instruction::Bin(BinOp::I64RemS),
        Operator::I64RemU => Instruction::Bin(BinOp::I64RemU),
        Operator::I64And => Instruction::Bin(BinOp::I64And),
        Operator::I64Or => Instruction::Bin(BinOp::I64Or),
        Operator::I64Xor => Instruction::Bin(BinOp::I64Xor),
        Operator::I64Shl => Instruction::Bin(BinOp::I64Shl),
        Operator::I64ShrS => Instruction::Bin(BinOp::I64ShrS),
        Operator::I64ShrU => Instruction::Bin(BinOp::I64ShrU),
        Operator::I64Rotl => Instruction::Bin(BinOp::I64Rotl),
        Operator::I64Rotr => Instruction::Bin(BinOp::I64Rotr),
        Operator::I64Eq => Instruction::Bin(BinOp::I64Eq),
        Operator::I64Ne => Instruction::Bin(BinOp::I64Ne),
        Operator::I64LtS => Instruction::Bin(BinOp::I64LtS),
        Operator::I64LtU => Instruction::Bin(BinOp::I64LtU),
        Operator::I64GtS => Instruction::Bin(BinOp::I64GtS),
        Operator::I64GtU => Instruction::Bin(BinOp::I64GtU),
        Operator::I64LeS => Instruction::Bin(BinOp::I64LeS),
        Operator::I64LeU => Instruction::Bin(BinOp::I64LeU),
        Operator::I64GeS => Instruction::Bin(BinOp::I64GeS),
        Operator::I64GeU => Instruction::Bin(BinOp::I64GeU),
        Operator::I64Eqz => Instruction::Un(UnOp::I64Eqz),
        Operator::I64Clz => Instruction::Un(UnOp::I64Clz),
        Operator::I64Ctz => Instruction::Un(UnOp::I64Ctz),
        Operator::I64Popcnt => Instruction::Un(UnOp::I64Popcnt),

        // f32 binops
        Operator::F32Add => Instruction::Bin(BinOp::F32Add),
        Operator::F32Sub => Instruction::Bin(BinOp::F32Sub),
        Operator::F32Mul => Instruction::Bin(BinOp::F32Mul),
        Operator::F32Div => Instruction::Bin(BinOp::F32Div),
        Operator::F32Min => Instruction::Bin(BinOp::F32Min),
        Operator::F32Max => Instruction::Bin(BinOp::F32Max),
        Operator::F32Copysign => Instruction::Bin(BinOp::F32Copysign),
        Operator::F32Eq => Instruction::Bin(BinOp::F32Eq),
        Operator::F32Ne => Instruction::Bin(BinOp::F32Ne),
        Operator::F32Lt => Instruction::Bin(BinOp::F32Lt),
        Operator::F32Gt => Instruction::Bin(BinOp::F32Gt),
        Operator::F32Le => Instruction::Bin(BinOp::F32Le),
        Operator::F32Ge => Instruction::Bin(BinOp::F32Ge),
        Operator::F32Abs => Instruction::Un(UnOp::F32Abs),
        Operator::F32Neg => Instruction::Un(UnOp::F32Neg),
        Operator::F32Ceil => Instruction::Un(UnOp::F32Ceil),
        Operator::F32Floor => Instruction::Un(UnOp::F32Floor),
        Operator::F32Trunc => Instruction::Un(UnOp::F32Trunc),
        Operator::F32Nearest => Instruction::Un(UnOp::F32Nearest),
        Operator::F32Sqrt => Instruction::Un(UnOp::F32Sqrt),

        // f64 binops
        Operator::F64Add => Instruction::Bin(BinOp::F64Add),
        Operator::F64Sub => Instruction::Bin(BinOp::F64Sub),
        Operator::F64Mul => Instruction::Bin(BinOp::F64Mul),
        Operator::F64Div => Instruction::Bin(BinOp::F64Div),
        Operator::F64Min => Instruction::Bin(BinOp::F64Min),
        Operator::F64Max => Instruction::Bin(BinOp::F64Max),
        Operator::F64Copysign => Instruction::Bin(BinOp::F64Copysign),
        Operator::F64Eq => Instruction::Bin(BinOp::F64Eq),
        Operator::F64Ne => Instruction::Bin(BinOp::F64Ne),
        Operator::F64Lt => Instruction::Bin(BinOp::F64Lt),
        Operator::F64Gt => Instruction::Bin(BinOp::F64Gt),
        Operator::F64Le => Instruction::Bin(BinOp::F64Le),
        Operator::F64Ge => Instruction::Bin(BinOp::F64Ge),
        Operator::F64Abs => Instruction::Un(UnOp::F64Abs),
        Operator::F64Neg => Instruction::Un(UnOp::F64Neg),
        Operator::F64Ceil => Instruction::Un(UnOp::F64Ceil),
        Operator::F64Floor => Instruction::Un(UnOp::F64Floor),
        Operator::F64Trunc => Instruction::Un(UnOp::F64Trunc),
        Operator::F64Nearest => Instruction::Un(UnOp::F64Nearest),
        Operator::F64Sqrt => Instruction::Un(UnOp::F64Sqrt),

        // conversions
        Operator::I32WrapI64 => Instruction::Un(UnOp::I32WrapI64),
        Operator::I64ExtendI32S => Instruction::Un(UnOp::I64ExtendI32S),
        Operator::I64ExtendI32U => Instruction::Un(UnOp::I64ExtendI32U),
        Operator::I32TruncF32S => Instruction::Un(UnOp::I32TruncF32S),
        Operator::I32TruncF32U => Instruction::Un(UnOp::I32TruncF32U),
        Operator::I32TruncF64S => Instruction::Un(UnOp::I32TruncF64S),
        Operator::I32TruncF64U => Instruction::Un(UnOp::I32TruncF64U),
        Operator::I64TruncF32S => Instruction::Un(UnOp::I64TruncF32S),
        Operator::I64TruncF32U => Instruction::Un(UnOp::I64TruncF32U),
        Operator::I64TruncF64S => Instruction::Un(UnOp::I64TruncF64S),
        Operator::I64TruncF64U => Instruction::Un(UnOp::I64TruncF64U),
        Operator::F32ConvertI32S => Instruction::Un(UnOp::F32ConvertI32S),
        Operator::F32ConvertI32U => Instruction::Un(UnOp::F32ConvertI32U),
        Operator::F32ConvertI64S => Instruction::Un(UnOp::F32ConvertI64S),
        Operator::F32ConvertI64U => Instruction::Un(UnOp::F32ConvertI64U),
        Operator::F64ConvertI32S => Instruction::Un(UnOp::F64ConvertI32S),
        Operator::F64ConvertI32U => Instruction::Un(UnOp::F64ConvertI32U),
        Operator::F64ConvertI64S => Instruction::Un(UnOp::F64ConvertI64S),
        Operator::F64ConvertI64U => Instruction::Un(UnOp::F64ConvertI64U),
        Operator::F32DemoteF64 => Instruction::Un(UnOp::F32DemoteF64),
        Operator::F64PromoteF32 => Instruction::Un(UnOp::F64PromoteF32),
        Operator::I32ReinterpretF32 => Instruction::Un(UnOp::I32ReinterpretF32),
        Operator::I64ReinterpretF64 => Instruction::Un(UnOp::I64ReinterpretF64),
        Operator::F32ReinterpretI32 => Instruction::Un(UnOp::F32ReinterpretI32),
        Operator::F64ReinterpretI64 => Instruction::Un(UnOp::F64ReinterpretI64),

        _ => bail!("unsupported operator: {:?}", op),
    })
}

fn load(
    ty: WasmType,
    width: MemoryAccessWidth,
    sign: Option<SignExtension>,
    memarg: &wasmparser::MemArg,
) -> Instruction {
    Instruction::Load {
        ty,
        width,
        sign,
        memarg: MemArg {
            offset: memarg.offset as u32,
        },
    }
}

fn store(ty: WasmType, width: MemoryAccessWidth, memarg: &wasmparser::MemArg) -> Instruction {
    Instruction::Store {
        ty,
        width,
        memarg: MemArg {
            offset: memarg.offset as u32,
        },
    }
}
