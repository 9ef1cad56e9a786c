//! Module initialization code generation.
//!
//! Generates the preamble (`use` items), const items for immutable globals,
//! and the `new()` constructor that wires up memory, globals, and the
//! indirect call table from the Wasm module's data/element segments and
//! global initializers.

use crate::backend::Backend;
use crate::codegen::types::global_init_to_rust;
use crate::ir::*;
use anyhow::Result;

/// Fixed preamble every generated module starts with.
pub fn rust_code_preamble() -> String {
    let mut s = String::new();
    s.push_str("// Generated by herkos. Do not edit by hand.\n");
    s.push_str("#![allow(dead_code, clippy::all)]\n\n");
    s.push_str("use herkos_runtime::{FuncRef, IsolatedMemory, LibraryModule, Module, Table, Value, WasmResult, WasmTrap};\n\n");
    s
}

/// Emit `pub const G{idx}` items for immutable globals.
pub fn emit_const_globals<B: Backend>(_backend: &B, info: &ModuleInfo) -> String {
    let mut code = String::new();
    for (idx, g) in info.globals.iter().enumerate() {
        if !g.mutable {
            let (rust_ty, value) = global_init_to_rust(&g.init_value);
            code.push_str(&format!("pub const G{idx}: {rust_ty} = {value};\n"));
        }
    }
    if !code.is_empty() {
        code.push('\n');
    }
    code
}

/// Generate the `pub fn new() -> WasmResult<WasmModule>` constructor.
pub fn generate_constructor<B: Backend>(
    _backend: &B,
    info: &ModuleInfo,
    has_mut_globals: bool,
) -> Result<String> {
    let mut code = String::new();
    code.push_str("impl WasmModule {\n");
    code.push_str("    pub fn new() -> WasmResult<WasmModule> {\n");

    if has_mut_globals {
        code.push_str("        let globals = Globals {\n");
        for (idx, g) in info.globals.iter().enumerate() {
            if g.mutable {
                let (_, value) = global_init_to_rust(&g.init_value);
                code.push_str(&format!("            g{idx}: {value},\n"));
            }
        }
        code.push_str("        };\n");
    }

    let globals_expr = if has_mut_globals { "globals" } else { "()" };
    let table_initial = info.table_initial;

    code.push_str(&format!(
        "        let mut table = Table::try_new({table_initial})?;\n"
    ));
    for seg in &info.element_segments {
        if seg.func_indices.is_empty() {
            continue;
        }
        let entries: Vec<String> = seg
            .func_indices
            .iter()
            .map(|f| {
                let canon = info
                    .ir_function(*f)
                    .map(|func| {
                        info.canonical_type
                            .get(func.type_idx.as_usize())
                            .copied()
                            .unwrap_or(func.type_idx.as_usize())
                    })
                    .unwrap_or(0);
                format!("({canon}, {})", f.as_usize())
            })
            .collect();
        code.push_str(&format!(
            "        table.init_elements({}u32, &[{}])?;\n",
            seg.offset,
            entries.join(", ")
        ));
    }

    if info.has_memory {
        code.push_str(&format!(
            "        let mut module = Module::try_new({}, {globals_expr}, table)?;\n",
            info.initial_pages
        ));
        for seg in &info.data_segments {
            if seg.data.is_empty() {
                continue;
            }
            let bytes: Vec<String> = seg.data.iter().map(|b| b.to_string()).collect();
            code.push_str(&format!(
                "        module.memory.init_data({}, &[{}])?;\n",
                seg.offset,
                bytes.join(", ")
            ));
        }
        code.push_str("        Ok(WasmModule(module))\n");
    } else {
        code.push_str(&format!(
            "        let module = LibraryModule::new({globals_expr}, table);\n"
        ));
        code.push_str("        Ok(WasmModule(module))\n");
    }

    code.push_str("    }\n");
    code.push_str("}\n");

    Ok(code)
}
