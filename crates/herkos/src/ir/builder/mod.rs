//! # IR Builder
//!
//! Translates a `ParsedModule` (parsed WebAssembly) into a `ModuleInfo` (structured IR).
//!
//! ## Pipeline overview
//!
//! ```text
//! ParsedModule
//!      │
//!      ├─[analysis]──────────────────────────────────────────────┐
//!      │  extract_memory_info()  ─► MemoryInfo                   │
//!      │  extract_table_info()   ─► TableInfo                    │
//!      │  build_type_mappings()  ─► canonical_type                │
//!      │  build_imported_globals() ─► Vec<ImportedGlobalDef>     │
//!      │  build_ir_functions()   ─► Vec<IrFunction>              │
//!      │    └── for each local function:                         │
//!      │          TreeBuilder::translate_function()               │
//!      │            └── recursive descent over Operators         │
//!      │                  ├── Block/Loop/If recurse into body    │
//!      │                  └── everything else maps 1:1           │
//!      │                                                         │
//!      └─[assembly]──────────────────────────────────────────────┘
//!         assemble_module_metadata()
//!           ├── build_globals()
//!           ├── build_data_segments()
//!           ├── build_element_segments()
//!           ├── build_function_exports()
//!           ├── build_call_indirect_signatures()
//!           ├── build_function_imports()
//!           └── enrich_ir_functions()  (sets type_idx, needs_host)
//!                ─► ModuleInfo  ──► codegen
//! ```
//!
//! ## Architecture
//!
//! The builder is split into three sub-modules:
//!
//! | Module       | Responsibility                                               |
//! |--------------|--------------------------------------------------------------|
//! | [`core`]     | `TreeBuilder`: recursive-descent operator → `Expression` tree |
//! | [`analysis`] | Extract per-section metadata from `ParsedModule`             |
//! | [`assembly`] | Assemble extracted pieces into a final `ModuleInfo`          |
//!
//! ### Flow
//!
//! 1. **Analysis phase**: module structure is examined to extract fixed information
//!    (memory size, table size, canonical types, imported globals) and every local
//!    function body is parsed into a structured `Expression` tree.
//! 2. **Assembly phase**: all pieces are combined into the final `ModuleInfo`, and
//!    each `IrFunction` is enriched with its canonical `type_idx` and `needs_host`
//!    flag now that import counts are known.
//!
//! Unlike a stack-machine interpreter, `TreeBuilder` does not simulate Wasm's
//! value stack or allocate a basic-block graph: nesting in the operator stream
//! (delimited by `Operator::End`/`Operator::Else`) is mirrored directly into a
//! tree of `Instruction`s, where an instruction's operands are simply whatever
//! precedes it in the same `Expression`.

mod analysis;
mod assembly;
pub mod core;

pub use core::ModuleContext;

use super::types::ModuleInfo;
use crate::parser::ParsedModule;
use crate::TranspileOptions;
use anyhow::Result;

/// Build complete module metadata from a parsed WebAssembly module.
///
/// This is the main entry point for IR construction, coordinating all
/// the intermediate steps needed to produce a fully-formed `ModuleInfo`.
pub fn build_module_info(parsed: &ParsedModule, options: &TranspileOptions) -> Result<ModuleInfo> {
    // Analyze module structure (memory, table, types)
    let mem_info = analysis::extract_memory_info(parsed, options)?;
    let table_info = analysis::extract_table_info(parsed);
    let canonical_type = analysis::build_type_mappings(parsed);

    // Analyze imports
    let imported_globals = analysis::build_imported_globals(parsed);
    let num_imported_functions = parsed.num_imported_functions;

    // Translate WebAssembly to intermediate representation
    let ir_functions = analysis::build_ir_functions(parsed)?;

    // Assemble module metadata for code generation
    assembly::assemble_module_metadata(
        parsed,
        &mem_info,
        &table_info,
        &canonical_type,
        ir_functions,
        num_imported_functions as usize,
        &imported_globals,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::{BinOp, Instruction, WasmType};
    use super::core::TreeBuilder;
    use wasmparser::Operator;

    #[test]
    fn translates_flat_function_body() {
        let mut builder = TreeBuilder::new();
        let operators = vec![
            Operator::LocalGet { local_index: 0 },
            Operator::LocalGet { local_index: 1 },
            Operator::I32Add,
            Operator::End,
        ];

        let body = builder
            .translate_function(&operators)
            .expect("translation should succeed");

        assert_eq!(body.len(), 3);
        assert!(matches!(body[2], Instruction::Bin(BinOp::I32Add)));
    }

    #[test]
    fn translates_void_function_with_nop() {
        let mut builder = TreeBuilder::new();
        let operators = vec![Operator::Nop, Operator::End];

        let body = builder
            .translate_function(&operators)
            .expect("translation should succeed");

        assert_eq!(body.len(), 1);
        assert!(matches!(body[0], Instruction::Nop));
    }

    #[test]
    fn local_get_set_tee_preserve_indices() {
        let mut builder = TreeBuilder::new();
        let operators = vec![
            Operator::LocalGet { local_index: 0 },
            Operator::LocalSet { local_index: 1 },
            Operator::LocalGet { local_index: 1 },
            Operator::End,
        ];

        let body = builder
            .translate_function(&operators)
            .expect("translation should succeed");

        assert_eq!(body.len(), 3);
        assert!(matches!(body[0], Instruction::LocalGet(0)));
        assert!(matches!(body[1], Instruction::LocalSet(1)));
        assert!(matches!(body[2], Instruction::LocalGet(1)));
    }

    #[test]
    fn build_ir_functions_sets_params_and_locals() {
        use crate::parser::parse_wasm;

        // Smallest possible module: one function `(func (param i32) (result i32)
        // (local i32) local.get 0)`.
        let wat = r#"
            (module
                (func (export "f") (param i32) (result i32) (local i32)
                    local.get 0))
        "#;
        let bytes = wat::parse_str(wat).expect("valid wat");
        let parsed = parse_wasm(&bytes).expect("valid module");

        let ir_functions = analysis::build_ir_functions(&parsed).expect("builds ir");
        assert_eq!(ir_functions.len(), 1);
        let f = &ir_functions[0];
        assert_eq!(f.params, vec![WasmType::I32]);
        assert_eq!(f.locals, vec![WasmType::I32]);
        assert_eq!(f.return_type, Some(WasmType::I32));
        assert_eq!(f.body.len(), 1);
    }
}
