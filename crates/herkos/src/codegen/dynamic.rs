//! Dynamic (name-keyed) export dispatch generation.
//!
//! The typed wrappers generated by `export.rs` are the primary, zero-overhead
//! interface. This module generates an additive reflective layer over the
//! same export list: `call_func(name, args)`, `get(name)`, and
//! `get_global_value(name)`, all driven by a `Value` enum rather than a
//! Rust-level type parameter.
//!
//! Exports whose typed wrapper requires a generic parameter (host trait
//! bound, imported-memory size) cannot be named in a single non-generic
//! match arm, since there is no one concrete type to instantiate the
//! generic with from just a name and a `&[Value]`. Those exports are
//! omitted from `call_func`/`get`; `get_global_value` is unaffected since
//! globals never carry such generics.

use crate::ir::*;

/// Generate the `Export` enum and the `impl WasmModule { call_func, get,
/// get_global_value }` block.
pub fn generate_dynamic_dispatch(info: &ModuleInfo) -> String {
    let mut code = String::new();

    code.push_str(&generate_export_enum(info));
    code.push_str("impl WasmModule {\n");
    code.push_str(&generate_call_func(info));
    code.push_str(&generate_get(info));
    code.push_str(&generate_get_global_value(info));
    code.push_str("}\n");

    code
}

fn dispatchable_exports(info: &ModuleInfo) -> impl Iterator<Item = &FuncExport> {
    info.func_exports.iter().filter(move |export| {
        let sig = info
            .ir_function(export.func_index)
            .expect("export references a valid local function index");
        !sig.needs_host && !info.has_memory_import
    })
}

fn generate_export_enum(info: &ModuleInfo) -> String {
    let mut code = String::new();
    code.push_str("pub enum Export<'a> {\n");
    code.push_str("    Function,\n");
    code.push_str("    Global(Value),\n");
    if info.has_memory {
        code.push_str("    Memory(&'a IsolatedMemory<MAX_PAGES>),\n");
    }
    if info.has_table() {
        code.push_str("    Table(&'a Table<TABLE_MAX>),\n");
    }
    code.push_str("}\n\n");
    code
}

fn generate_call_func(info: &ModuleInfo) -> String {
    let mut code = String::new();
    code.push_str(
        "    pub fn call_func(&mut self, name: &str, args: &[Value]) -> WasmResult<Option<Value>> {\n",
    );
    code.push_str("        match name {\n");

    for export in dispatchable_exports(info) {
        let sig = info.ir_function(export.func_index).unwrap();
        let mut binds = Vec::new();
        for (i, ty) in sig.params.iter().enumerate() {
            binds.push(format!(
                "                let v{i} = match args.get({i}) {{ Some(Value::{variant}(v)) => *v, _ => return Err(WasmTrap::IndirectCallTypeMismatch) }};\n",
                variant = value_variant(*ty),
            ));
        }
        code.push_str(&format!("            {:?} => {{\n", export.name));
        for b in &binds {
            code.push_str(b);
        }
        let call_args: Vec<String> = (0..sig.params.len()).map(|i| format!("v{i}")).collect();
        code.push_str(&format!(
            "                self.{}({})",
            export.name,
            call_args.join(", ")
        ));
        if sig.return_type.is_some() {
            code.push_str(".map(|r| Some(Value::from(r)))\n");
        } else {
            code.push_str(".map(|_| None)\n");
        }
        code.push_str("            }\n");
    }

    code.push_str("            _ => Err(WasmTrap::UndefinedElement),\n");
    code.push_str("        }\n");
    code.push_str("    }\n\n");
    code
}

fn generate_get(info: &ModuleInfo) -> String {
    let mut code = String::new();
    code.push_str("    pub fn get(&self, name: &str) -> Option<Export<'_>> {\n");
    code.push_str("        match name {\n");

    for export in dispatchable_exports(info) {
        code.push_str(&format!(
            "            {:?} => Some(Export::Function),\n",
            export.name
        ));
    }
    for export in &info.global_exports {
        let g = info.local_global(export.global_index).unwrap();
        code.push_str(&format!(
            "            {:?} => Some(Export::Global({})),\n",
            export.name,
            global_value_expr(export.global_index.as_usize(), g)
        ));
    }
    if let Some(name) = &info.memory_export_name {
        if info.has_memory {
            code.push_str(&format!(
                "            {name:?} => Some(Export::Memory(&self.0.memory)),\n"
            ));
        }
    }
    if let Some(name) = &info.table_export_name {
        if info.has_table() {
            code.push_str(&format!(
                "            {name:?} => Some(Export::Table(&self.0.table)),\n"
            ));
        }
    }

    code.push_str("            _ => None,\n");
    code.push_str("        }\n");
    code.push_str("    }\n\n");
    code
}

fn generate_get_global_value(info: &ModuleInfo) -> String {
    let mut code = String::new();
    code.push_str("    pub fn get_global_value(&self, name: &str) -> Option<Value> {\n");
    code.push_str("        match name {\n");

    for export in &info.global_exports {
        let g = info.local_global(export.global_index).unwrap();
        code.push_str(&format!(
            "            {:?} => Some({}),\n",
            export.name,
            global_value_expr(export.global_index.as_usize(), g)
        ));
    }

    code.push_str("            _ => None,\n");
    code.push_str("        }\n");
    code.push_str("    }\n");
    code
}

fn global_value_expr(idx: usize, g: &GlobalDef) -> String {
    if g.mutable {
        format!("Value::from(self.0.globals.g{idx})")
    } else {
        format!("Value::from(G{idx})")
    }
}

fn value_variant(ty: WasmType) -> &'static str {
    match ty {
        WasmType::I32 => "I32",
        WasmType::I64 => "I64",
        WasmType::F32 => "F32",
        WasmType::F64 => "F64",
    }
}
