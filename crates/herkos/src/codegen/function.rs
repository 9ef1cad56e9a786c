//! Function code generation from IR.
//!
//! Converts an IR function (a flat Wasm-stack-machine instruction sequence)
//! into a single straight-line Rust function body. Every local and every
//! position on the Wasm operand stack is realized as a flat `i64` slot
//! (`l0`, `l1`, ...); codegen simulates the Wasm operand stack with a simple
//! depth counter (`EmitCtx::stack_ptr`) so that values produced by either arm
//! of a conditional land in the same physical slot for code that follows.
//! Structured control flow (`block`/`loop`/`if`) lowers to Rust scopes, or to
//! a labelled `loop { ... break 'l; }` when the branch-target analyzer has
//! marked the construct as the destination of a `br`/`br_if`/`br_table`.

use crate::backend::{Backend, Slot};
use crate::codegen::instruction;
use crate::ir::*;
use anyhow::Result;

/// Tracks one enclosing `block`/`loop`/`if` while emitting a function body.
///
/// `if` pushes exactly one `BlockInfo` shared by both its then- and
/// else-branches, since a `br` can only ever exit an `if` (there is no
/// "continue the condition" target), so it is never `is_loop`.
struct BlockInfo {
    is_loop: bool,
}

/// Emission state threaded through a single function body.
pub(crate) struct EmitCtx<'a> {
    pub(crate) info: &'a ModuleInfo,
    return_type: Option<WasmType>,
    /// Slot address of stack position 0.
    base: usize,
    /// Current simulated Wasm operand stack depth.
    stack_ptr: usize,
    blocks: Vec<BlockInfo>,
    pub(crate) unreachable: bool,
}

impl<'a> EmitCtx<'a> {
    fn new(info: &'a ModuleInfo, return_type: Option<WasmType>, base: usize) -> Self {
        EmitCtx {
            info,
            return_type,
            base,
            stack_ptr: 0,
            blocks: Vec::new(),
            unreachable: false,
        }
    }

    pub(crate) fn push(&mut self) -> Slot {
        let slot = self.base + self.stack_ptr;
        self.stack_ptr += 1;
        slot
    }

    pub(crate) fn pop(&mut self) -> Slot {
        self.stack_ptr = self
            .stack_ptr
            .checked_sub(1)
            .expect("operand stack underflow during codegen");
        self.base + self.stack_ptr
    }

    pub(crate) fn pop_n(&mut self, n: usize) -> Vec<Slot> {
        let mut slots: Vec<Slot> = (0..n).map(|_| self.pop()).collect();
        slots.reverse();
        slots
    }

    pub(crate) fn peek(&self) -> Slot {
        self.base + self.stack_ptr - 1
    }
}

/// Generate a complete Rust function from IR with module info.
///
/// `is_public` controls whether the function is `pub fn` or `fn`.
pub fn generate_function_with_info<B: Backend>(
    backend: &B,
    ir_func: &IrFunction,
    func_name: &str,
    info: &ModuleInfo,
    is_public: bool,
) -> Result<String> {
    let mut output = String::new();

    output.push_str(
        "#[allow(unused_mut, unused_variables, unused_assignments, unreachable_code, clippy::all)]\n",
    );
    output.push_str(&generate_signature_with_info(
        ir_func, func_name, info, is_public,
    ));
    output.push_str(" {\n");

    let num_named = ir_func.params.len() + ir_func.locals.len();
    let stack_max = compute_stack_max(info, &ir_func.body);

    for (idx, ty) in ir_func.params.iter().enumerate() {
        let rust_ty = crate::codegen::types::wasm_type_to_rust(ty);
        let cast = instruction::cast_param_to_i64(*ty, &format!("l{idx}"));
        output.push_str(&format!("    let mut l{idx}: i64 = {cast};\n"));
        let _ = rust_ty;
    }
    for slot in num_named..num_named + stack_max {
        output.push_str(&format!("    let mut l{slot}: i64 = 0i64;\n"));
    }
    for slot in ir_func.params.len()..num_named {
        output.push_str(&format!("    let mut l{slot}: i64 = 0i64;\n"));
    }

    let mut ctx = EmitCtx::new(info, ir_func.return_type, num_named);
    let body_code = emit_expr(&mut ctx, backend, &ir_func.body)?;
    output.push_str(&body_code);

    if !last_real_instruction_diverges(&ir_func.body) {
        let value = ir_func.return_type.map(|ty| (ctx.peek(), ty));
        output.push_str(&format!("    {}\n", backend.emit_return(value)));
    }

    output.push_str("}\n");
    Ok(output)
}

/// Whether `body`'s last *real* instruction unconditionally diverges, making a
/// trailing `return` after it dead code. The analyzer may append a `BrTarget`
/// sentinel after the last real instruction for any `br`/`br_if`/`br_table`
/// targeting depth 0 found anywhere in the function, so that sentinel alone
/// says nothing about whether the fall-through path reaches the end of the
/// body — only `Return`, an unconditional `Br`, or `Unreachable` do.
fn last_real_instruction_diverges(body: &Expression) -> bool {
    let real_len = if matches!(body.last(), Some(Instruction::BrTarget)) {
        body.len() - 1
    } else {
        body.len()
    };
    matches!(
        body[..real_len].last(),
        Some(Instruction::Return | Instruction::Br(_) | Instruction::Unreachable)
    )
}

/// Statically computes the largest number of virtual operand-stack slots
/// live at any point while executing `body`, so the generated function can
/// declare that many `l{n}` slots up front.
fn compute_stack_max(info: &ModuleInfo, body: &Expression) -> usize {
    let mut max_seen = 0usize;
    let _ = walk_stack(info, body, 0, &mut max_seen);
    max_seen
}

fn walk_stack(info: &ModuleInfo, body: &Expression, start: usize, max_seen: &mut usize) -> usize {
    let mut depth = start;
    *max_seen = (*max_seen).max(depth);

    let real_len = if matches!(body.last(), Some(Instruction::BrTarget)) {
        body.len() - 1
    } else {
        body.len()
    };

    for instr in &body[..real_len] {
        let (pops, pushes) = instruction_stack_effect(info, instr);
        depth = depth.saturating_sub(pops);
        match instr {
            Instruction::Block(args) | Instruction::Loop(args) => {
                walk_stack(info, &args.body, depth, max_seen);
            }
            Instruction::If(args) => {
                walk_stack(info, &args.then_branch, depth, max_seen);
                walk_stack(info, &args.else_branch, depth, max_seen);
            }
            _ => {}
        }
        depth += pushes;
        *max_seen = (*max_seen).max(depth);
    }

    depth
}

/// Returns `(pops, pushes)` for a single instruction against the virtual
/// operand stack, matching exactly what `instruction::generate_instruction`
/// does when it calls `ctx.pop()`/`ctx.push()`.
fn instruction_stack_effect(info: &ModuleInfo, instr: &Instruction) -> (usize, usize) {
    match instr {
        Instruction::Unreachable | Instruction::Nop | Instruction::BrTarget => (0, 0),
        Instruction::Block(args) | Instruction::Loop(args) => (0, args.rt.is_some() as usize),
        Instruction::If(args) => (1, args.rt.is_some() as usize),
        Instruction::Br(_) => (0, 0),
        Instruction::BrIf(_) => (1, 0),
        Instruction::BrTable(_) => (1, 0),
        Instruction::Return => (0, 0),
        Instruction::Call { func_idx } => {
            let num_imports = info.num_imported_functions();
            let (params, ret) = if (*func_idx as usize) < num_imports {
                info.func_imports
                    .get(*func_idx as usize)
                    .map(|i| (i.params.len(), i.return_type))
                    .unwrap_or((0, None))
            } else {
                info.ir_functions
                    .get(*func_idx as usize - num_imports)
                    .map(|f| (f.params.len(), f.return_type))
                    .unwrap_or((0, None))
            };
            (params, ret.is_some() as usize)
        }
        Instruction::CallIndirect { type_idx } => {
            let (params, ret) = info
                .type_signature(type_idx.clone())
                .map(|s| (s.params.len(), s.return_type))
                .unwrap_or((0, None));
            (params + 1, ret.is_some() as usize)
        }
        Instruction::Drop => (1, 0),
        Instruction::Select => (3, 1),
        Instruction::LocalGet(_) => (0, 1),
        Instruction::LocalSet(_) => (1, 0),
        Instruction::LocalTee(_) => (0, 0),
        Instruction::GlobalGet(_) => (0, 1),
        Instruction::GlobalSet(_) => (1, 0),
        Instruction::Load { .. } => (1, 1),
        Instruction::Store { .. } => (2, 0),
        Instruction::MemorySize => (0, 1),
        Instruction::MemoryGrow => (1, 1),
        Instruction::Const(_) => (0, 1),
        Instruction::Bin(_) => (2, 1),
        Instruction::Un(_) => (1, 1),
    }
}

/// Emit the code for a sequence of instructions, recursing into structural
/// constructs. The trailing `BrTarget` sentinel (if present) is skipped.
fn emit_expr<B: Backend>(ctx: &mut EmitCtx, backend: &B, body: &Expression) -> Result<String> {
    let real_len = if matches!(body.last(), Some(Instruction::BrTarget)) {
        body.len() - 1
    } else {
        body.len()
    };

    let mut out = String::new();
    for instr in &body[..real_len] {
        match instr {
            Instruction::Block(args) => out.push_str(&emit_block(ctx, backend, args, false)?),
            Instruction::Loop(args) => out.push_str(&emit_block(ctx, backend, args, true)?),
            Instruction::If(args) => out.push_str(&emit_if(ctx, backend, args)?),
            Instruction::Br(n) => out.push_str(&emit_branch(ctx, backend, *n)?),
            Instruction::BrIf(n) => out.push_str(&emit_br_if(ctx, backend, *n)?),
            Instruction::BrTable(args) => out.push_str(&emit_br_table(ctx, backend, args)?),
            Instruction::Return => out.push_str(&emit_function_return(ctx, backend)),
            Instruction::BrTarget => {}
            other => {
                if let Some(code) = instruction::generate_instruction(ctx, backend, other)? {
                    out.push_str(&code);
                    out.push('\n');
                }
            }
        }
    }
    Ok(out)
}

fn emit_block<B: Backend>(
    ctx: &mut EmitCtx,
    backend: &B,
    args: &BlockArgs,
    is_loop: bool,
) -> Result<String> {
    let marked = matches!(args.body.last(), Some(Instruction::BrTarget));

    ctx.blocks.push(BlockInfo { is_loop });
    let depth = ctx.blocks.len();
    let inner = emit_expr(ctx, backend, &args.body)?;
    ctx.blocks.pop();

    if marked {
        Ok(format!("'_l{depth}: loop {{\n{inner}    break '_l{depth};\n}}\n"))
    } else {
        Ok(inner)
    }
}

fn emit_if<B: Backend>(ctx: &mut EmitCtx, backend: &B, args: &IfArgs) -> Result<String> {
    let cond = ctx.pop();
    let marked = matches!(args.then_branch.last(), Some(Instruction::BrTarget))
        || matches!(args.else_branch.last(), Some(Instruction::BrTarget));

    ctx.blocks.push(BlockInfo { is_loop: false });
    let depth = ctx.blocks.len();

    let start_ptr = ctx.stack_ptr;
    let then_code = emit_expr(ctx, backend, &args.then_branch)?;
    let end_ptr = ctx.stack_ptr;
    ctx.stack_ptr = start_ptr;
    let else_code = if args.else_branch.is_empty() {
        String::new()
    } else {
        emit_expr(ctx, backend, &args.else_branch)?
    };
    ctx.stack_ptr = end_ptr;
    ctx.blocks.pop();

    let mut inner = format!("if (l{cond} as i32) != 0 {{\n{then_code}}}");
    if !args.else_branch.is_empty() {
        inner.push_str(&format!(" else {{\n{else_code}}}"));
    }
    inner.push('\n');

    if marked {
        Ok(format!("'_l{depth}: loop {{\n{inner}    break '_l{depth};\n}}\n"))
    } else {
        Ok(inner)
    }
}

/// Resolve and emit a branch to relative label `n`, where `n == ctx.blocks.len()`
/// targets the function's own implicit top-level body — equivalent to `return`,
/// since it has no loop to continue and nothing further to fall through to.
fn emit_branch<B: Backend>(ctx: &EmitCtx, backend: &B, n: u32) -> Result<String> {
    let depth = ctx.blocks.len() as u32;
    let target = depth
        .checked_sub(n)
        .ok_or_else(|| anyhow::anyhow!("branch label {n} exceeds nesting depth {depth}"))?;

    if target == 0 {
        return Ok(emit_function_return(ctx, backend));
    }

    let is_loop = ctx.blocks[(target - 1) as usize].is_loop;
    if is_loop {
        Ok(format!("continue '_l{target};\n"))
    } else {
        Ok(format!("break '_l{target};\n"))
    }
}

fn emit_br_if<B: Backend>(ctx: &mut EmitCtx, backend: &B, n: u32) -> Result<String> {
    let cond = ctx.pop();
    let branch_code = emit_branch(ctx, backend, n)?;
    Ok(format!("if (l{cond} as i32) != 0 {{\n    {branch_code}}}\n"))
}

fn emit_br_table<B: Backend>(
    ctx: &mut EmitCtx,
    backend: &B,
    args: &BrTableArgs,
) -> Result<String> {
    let idx = ctx.pop();
    let mut out = format!("match l{idx} as u32 {{\n");
    for (i, label) in args.labels.iter().enumerate() {
        let branch_code = emit_branch(ctx, backend, *label)?;
        out.push_str(&format!("    {i} => {{ {branch_code} }}\n"));
    }
    let default_code = emit_branch(ctx, backend, args.default)?;
    out.push_str(&format!("    _ => {{ {default_code} }}\n"));
    out.push_str("}\n");
    Ok(out)
}

fn emit_function_return<B: Backend>(ctx: &EmitCtx, backend: &B) -> String {
    let value = ctx.return_type.map(|ty| (ctx.peek(), ty));
    format!("{}\n", backend.emit_return(value))
}

/// Generate function signature with module info.
fn generate_signature_with_info(
    ir_func: &IrFunction,
    func_name: &str,
    info: &ModuleInfo,
    is_public: bool,
) -> String {
    let visibility = if is_public { "pub " } else { "" };

    let needs_host = ir_func.needs_host;
    let trait_bounds_opt = if needs_host {
        crate::codegen::traits::build_trait_bounds(info)
    } else {
        None
    };

    let has_multiple_bounds = trait_bounds_opt.as_ref().is_some_and(|b| b.contains(" + "));

    let mut generics: Vec<String> = Vec::new();
    if info.has_memory_import {
        generics.push("const MP: usize".to_string());
    }
    if has_multiple_bounds {
        generics.push(format!("H: {}", trait_bounds_opt.as_ref().unwrap()));
    }

    let generic_part = if generics.is_empty() {
        String::new()
    } else {
        format!("<{}>", generics.join(", "))
    };

    let mut sig = format!("{visibility}fn {func_name}{generic_part}(");

    let mut param_parts: Vec<String> = ir_func
        .params
        .iter()
        .enumerate()
        .map(|(idx, ty)| {
            let rust_ty = crate::codegen::types::wasm_type_to_rust(ty);
            format!("mut l{idx}: {rust_ty}")
        })
        .collect();

    if needs_host {
        if let Some(trait_bounds) = trait_bounds_opt {
            if has_multiple_bounds {
                param_parts.push("host: &mut H".to_string());
            } else {
                param_parts.push(format!("host: &mut impl {trait_bounds}"));
            }
        } else {
            param_parts.push("host: &mut impl Host".to_string());
        }
    }

    if info.has_mutable_globals() {
        param_parts.push("globals: &mut Globals".to_string());
    }

    if info.has_memory {
        param_parts.push("memory: &mut IsolatedMemory<MAX_PAGES>".to_string());
    } else if info.has_memory_import {
        param_parts.push("memory: &mut IsolatedMemory<MP>".to_string());
    }

    if info.has_table() {
        param_parts.push("table: &Table<TABLE_MAX>".to_string());
    }

    sig.push_str(&param_parts.join(", "));
    sig.push(')');

    sig.push_str(&format!(
        " -> {}",
        crate::codegen::types::format_return_type(ir_func.return_type.as_ref())
    ));

    sig
}
