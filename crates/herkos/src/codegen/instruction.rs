//! Leaf instruction code generation.
//!
//! Handles every `Instruction` variant that is not structural control flow
//! (`Block`/`Loop`/`If`/`Br`/`BrIf`/`BrTable`/`Return`/`BrTarget` are emitted
//! directly by `function::emit_expr`, since they need access to the enclosing
//! label stack). Each leaf instruction pops its operands off the function's
//! emission context (a simulated Wasm operand stack of `Slot` addresses) and
//! pushes its result, mirroring the stack-machine semantics of the Wasm
//! instruction it was translated from.

use crate::backend::{Backend, Slot};
use crate::codegen::function::EmitCtx;
use crate::ir::*;
use anyhow::Result;

/// Generate code for one leaf instruction, mutating `ctx`'s virtual stack.
///
/// Returns `None` for instructions with no emitted code (`Drop`, `Nop`).
pub(crate) fn generate_instruction<B: Backend>(
    ctx: &mut EmitCtx,
    backend: &B,
    instr: &Instruction,
) -> Result<Option<String>> {
    let info = ctx.info;

    let code = match instr {
        Instruction::Const(value) => {
            let dest = ctx.push();
            Some(backend.emit_const(dest, value))
        }

        Instruction::Bin(op) => {
            let rhs = ctx.pop();
            let lhs = ctx.pop();
            let dest = ctx.push();
            Some(backend.emit_binop(dest, *op, lhs, rhs))
        }

        Instruction::Un(op) => {
            let operand = ctx.pop();
            let dest = ctx.push();
            Some(backend.emit_unop(dest, *op, operand))
        }

        Instruction::Load { ty, width, sign, memarg } => {
            let addr = ctx.pop();
            let dest = ctx.push();
            Some(backend.emit_load(dest, *ty, addr, memarg.offset, *width, *sign)?)
        }

        Instruction::Store { ty, width, memarg } => {
            let value = ctx.pop();
            let addr = ctx.pop();
            Some(backend.emit_store(*ty, addr, value, memarg.offset, *width)?)
        }

        Instruction::Call { func_idx } => {
            let num_imports = info.num_imported_functions();
            if (*func_idx as usize) < num_imports {
                generate_call_import(ctx, backend, *func_idx as usize)
            } else {
                generate_call_local(ctx, backend, *func_idx as usize - num_imports)
            }
        }

        Instruction::CallIndirect { type_idx } => {
            Some(generate_call_indirect(ctx, type_idx.clone())?)
        }

        Instruction::Drop => {
            ctx.pop();
            None
        }

        Instruction::Select => {
            let condition = ctx.pop();
            let val2 = ctx.pop();
            let val1 = ctx.pop();
            let dest = ctx.push();
            Some(backend.emit_select(dest, val1, val2, condition))
        }

        Instruction::LocalGet(n) => {
            let dest = ctx.push();
            Some(format!("{IND}l{dest} = l{n};", IND = INDENT))
        }

        Instruction::LocalSet(n) => {
            let src = ctx.pop();
            Some(format!("{IND}l{n} = l{src};", IND = INDENT))
        }

        Instruction::LocalTee(n) => {
            let top = ctx.peek();
            Some(format!("{IND}l{n} = l{top};", IND = INDENT))
        }

        Instruction::GlobalGet(idx) => {
            let dest = ctx.push();
            Some(match info.resolve_global(*idx) {
                ResolvedGlobal::Imported(_, g) => {
                    let cast = cast_from_native(g.wasm_type, &format!("host.get_{}()", g.name));
                    format!("{INDENT}l{dest} = {cast};")
                }
                ResolvedGlobal::Local(local_idx, g) => {
                    backend.emit_global_get(dest, local_idx.as_usize(), g.init_value.ty(), g.mutable)
                }
            })
        }

        Instruction::GlobalSet(idx) => {
            let value = ctx.pop();
            Some(match info.resolve_global(*idx) {
                ResolvedGlobal::Imported(_, g) => {
                    let val_expr = cast_to_native(g.wasm_type, value);
                    format!("{INDENT}host.set_{}({val_expr});", g.name)
                }
                ResolvedGlobal::Local(local_idx, g) => {
                    backend.emit_global_set(local_idx.as_usize(), value, g.init_value.ty())
                }
            })
        }

        Instruction::MemorySize => {
            let dest = ctx.push();
            Some(backend.emit_memory_size(dest))
        }

        Instruction::MemoryGrow => {
            let delta = ctx.pop();
            let dest = ctx.push();
            Some(backend.emit_memory_grow(dest, delta))
        }

        Instruction::Unreachable => {
            ctx.unreachable = true;
            Some(backend.emit_unreachable())
        }

        Instruction::Nop => None,

        // Structural instructions are handled by `function::emit_expr`.
        Instruction::Block(_)
        | Instruction::Loop(_)
        | Instruction::If(_)
        | Instruction::Br(_)
        | Instruction::BrIf(_)
        | Instruction::BrTable(_)
        | Instruction::Return
        | Instruction::BrTarget => {
            unreachable!("structural instruction reached leaf dispatch")
        }
    };

    Ok(code)
}

const INDENT: &str = "                ";

/// Cast a natively-typed function parameter (`l{n}: i32`/`i64`/`f32`/`f64`
/// in the signature) into its `i64` slot representation for the shadowing
/// prologue line `let mut l{n}: i64 = <this>;`.
pub(crate) fn cast_param_to_i64(ty: WasmType, expr: &str) -> String {
    cast_from_native(ty, expr)
}

fn cast_to_native(ty: WasmType, slot: Slot) -> String {
    match ty {
        WasmType::I32 => format!("(l{slot} as i32)"),
        WasmType::I64 => format!("l{slot}"),
        WasmType::F32 => format!("f32::from_bits(l{slot} as u32)"),
        WasmType::F64 => format!("f64::from_bits(l{slot} as u64)"),
    }
}

fn cast_from_native(ty: WasmType, expr: &str) -> String {
    match ty {
        WasmType::I32 => format!("({expr}) as u32 as i64"),
        WasmType::I64 => format!("({expr}) as i64"),
        WasmType::F32 | WasmType::F64 => format!("({expr}).to_bits() as i64"),
    }
}

fn generate_call_local<B: Backend>(
    ctx: &mut EmitCtx,
    backend: &B,
    local_idx: usize,
) -> Option<String> {
    let info = ctx.info;
    let callee = info.ir_functions.get(local_idx)?;
    let arg_types = callee.params.clone();
    let return_type = callee.return_type;
    let args = ctx.pop_n(arg_types.len());
    let dest = return_type.map(|_| ctx.push());
    Some(backend.emit_call(
        dest,
        local_idx,
        &args,
        &arg_types,
        return_type,
        info.has_mutable_globals(),
        info.has_memory,
        info.has_table(),
    ))
}

fn generate_call_import<B: Backend>(
    ctx: &mut EmitCtx,
    backend: &B,
    import_idx: usize,
) -> Option<String> {
    let info = ctx.info;
    let imp = info.func_imports.get(import_idx)?;
    let arg_types = imp.params.clone();
    let return_type = imp.return_type;
    let args = ctx.pop_n(arg_types.len());
    let dest = return_type.map(|_| ctx.push());
    Some(backend.emit_call_import(
        dest,
        &imp.module_name,
        &imp.func_name,
        &args,
        &arg_types,
        return_type,
    ))
}

/// Generate inline dispatch code for `call_indirect`.
///
/// 1. Looks up the table entry by index.
/// 2. Checks the canonical type signature matches (structural equivalence,
///    Wasm spec §4.4.9 — two distinct type indices with identical
///    (params, results) are interchangeable).
/// 3. Dispatches to the matching function via a match on func_index.
fn generate_call_indirect(ctx: &mut EmitCtx, type_idx: TypeIdx) -> Result<String> {
    let info = ctx.info;
    let sig = info
        .type_signature(type_idx.clone())
        .ok_or_else(|| anyhow::anyhow!("call_indirect references unknown type {type_idx:?}"))?;
    let arg_types = sig.params.clone();
    let return_type = sig.return_type;

    let table_idx = ctx.pop();
    let args = ctx.pop_n(arg_types.len());
    let dest = return_type.map(|_| ctx.push());

    let canon_idx = info
        .canonical_type
        .get(type_idx.as_usize())
        .copied()
        .unwrap_or(type_idx.as_usize());

    let mut code = String::new();
    code.push_str(&format!(
        "{INDENT}let __entry = table.get({} as u32)?;\n",
        cast_to_native(WasmType::I32, table_idx)
    ));
    code.push_str(&format!(
        "{INDENT}if __entry.type_index != {canon_idx} as u32 {{ return Err(WasmTrap::IndirectCallTypeMismatch); }}\n"
    ));

    let mut call_args: Vec<String> = args
        .iter()
        .zip(arg_types.iter())
        .map(|(&s, &ty)| cast_to_native(ty, s))
        .collect();
    if info.has_mutable_globals() {
        call_args.push("globals".to_string());
    }
    if info.has_memory {
        call_args.push("memory".to_string());
    }
    if info.has_table() {
        call_args.push("table".to_string());
    }
    let args_str = call_args.join(", ");

    let mut match_expr = String::from("match __entry.func_index {\n");
    for (func_idx, ir_func) in info.ir_functions.iter().enumerate() {
        if ir_func.type_idx.as_usize() == canon_idx {
            match_expr.push_str(&format!(
                "{INDENT}    {func_idx} => func_{func_idx}({args_str})?,\n"
            ));
        }
    }
    match_expr.push_str(&format!("{INDENT}    _ => return Err(WasmTrap::UndefinedElement),\n"));
    match_expr.push_str(&format!("{INDENT}}}"));

    match dest {
        Some(d) => {
            let stored = cast_from_native(return_type.expect("dest implies return_type"), &match_expr);
            code.push_str(&format!("{INDENT}l{d} = {stored};"));
        }
        None => code.push_str(&format!("{INDENT}{match_expr};")),
    }

    Ok(code)
}
