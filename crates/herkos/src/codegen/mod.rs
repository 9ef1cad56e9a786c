//! Code generation — emits Rust source code from IR.
//!
//! # Overview
//!
//! This module walks the IR and uses a Backend to emit complete Rust functions and module
//! structures. It generates a `Module<Globals, MAX_PAGES, 0>` struct with constructor,
//! internal functions, and exported methods.
//!
//! # Architecture
//!
//! The code generation pipeline is organized into focused sub-modules:
//!
//! ```text
//!                          ┌─────────────────────────────────────┐
//!                          │      ModuleInfo (IR input)          │
//!                          │  ┌─ IR functions                    │
//!                          │  ├─ Imports/Exports                 │
//!                          │  ├─ Globals, Memory, Table          │
//!                          │  └─ Data/Element segments           │
//!                          └─────────────────────────────────────┘
//!                                            │
//!                                            ▼
//!                          ┌─────────────────────────────────────┐
//!                          │   generate_module_with_info()       │
//!                          │   (Main entry point)                │
//!                          └─────────────────────────────────────┘
//!                                            │
//!                                            ▼
//!                      ┌──────────────────────────────────────┐
//!                      │      MODULE WRAPPER GENERATION      │
//!                      ├─ Preamble                           │
//!                      ├─ Host traits                        │
//!                      ├─ Const globals                      │
//!                      ├─ Globals struct                     │
//!                      ├─ WasmModule newtype                 │
//!                      ├─ Constructor (new())                │
//!                      ├─ Private functions                  │
//!                      ├─ Export impl block                  │
//!                      └──────────────────────────────────────┘
//!                                            │
//!                                            ▼
//!                ┌──────────────────────┐
//!                │   Rust Source Code   │
//!                │   (ready to compile) │
//!                └──────────────────────┘
//!
//!
//! # Sub-modules
//!
//! Each sub-module handles a specific aspect of code generation:
//!
//! - **`module`**: Main generation orchestration (`generate_module_with_info`, standalone vs wrapper)
//! - **`traits`**: Host trait definitions from imports (`EnvImports`, `WasiImports`, etc.)
//! - **`constructor`**: Module initialization (`new()`, data/element segments, const globals)
//! - **`function`**: IR function translation (signatures, blocks, variables, SSA)
//! - **`instruction`**: Individual instruction code generation and terminators
//! - **`export`**: Export method generation (forwarding to internal functions)
//! - **`types`**: Type conversions (Wasm→Rust, WasmResult formatting)
//! - **`utils`**: Utility functions (call arg building, grouping)
//!
//! # Control Flow Example
//!
//! When transpiling a module with a memory and an export:
//!
//! ```text
//! ModuleInfo {
//!   has_memory: true,
//!   max_pages: 16,
//!   func_exports: [FuncExport { name: "process", func_index: 0 }],
//!   ...
//! }
//!    │
//!    ├─→ generate_module_with_info()
//!    │     └─→ generate_wrapper_module()
//!    │
//!    ├─→ [Constructor generation]
//!    │   └─ emit_element_segments() (if table)
//!    │   └─ Data segment init (byte-by-byte)
//!    │
//!    ├─→ [Function generation per func in IR]
//!    │   └─→ generate_function_with_info("func_0", ...)
//!    │       ├─→ generate_signature_with_info()
//!    │       │   ├─ Collect trait bounds if needs_host
//!    │       │   ├─ Add globals/memory/table/host parameters
//!    │       │   └─ Build generic param H (if multiple trait bounds)
//!    │       │
//!    │       ├─→ [Variable type inference from instructions]
//!    │       │
//!    │       └─→ [Block translation]
//!    │           ├─ Single-block: flat code emission
//!    │           └─ Multi-block: state machine with Block enum + loop/match
//!    │
//!    ├─→ [Per instruction]
//!    │   └─→ generate_instruction_with_info()
//!    │       ├─ Delegates to backend.emit_*() for most operations
//!    │       ├─ CallImport → host.func_name()
//!    │       ├─ CallIndirect → dispatch match on func_index
//!    │       └─ GlobalGet/Set → redirect to imported globals via host traits
//!    │
//!    └─→ [Export impl generation]
//!        └─→ generate_export_impl()
//!            └─ pub fn process(&mut self, ...) { func_0(...) }
//!
//! ```
//!
//! # Key Design Decisions
//!
//! 1. **Backend Delegation**: All instruction emission is delegated to a `Backend` trait
//!    (SafeBackend, VerifiedBackend, etc.). This module orchestrates structure;
//!    the backend handles the actual Rust code patterns.
//!
//! 2. **Trait-Based Imports**: Imported functions become trait bounds on a generic `H`
//!    parameter. Each import module gets its own trait (e.g., `EnvImports`, `WasiImports`).
//!    This ensures zero-cost dispatch and type safety.
//!
//! 3. **SSA Variable Inference**: Types are inferred from instructions using a HashMap,
//!    ensuring correct Rust type declarations for all intermediate values.
//!
//! 4. **State Machine for Multi-Block Functions**: Functions with multiple blocks emit
//!    a local `Block` enum and a `loop { match }` structure. Single-block functions
//!    optimize to flat code.
//!
//! 5. **Const Generics Over Runtime Sizes**: `MAX_PAGES` and `TABLE_MAX` are const
//!    generics, not runtime values. This enables monomorphization and zero-cost memory
//!    bounds checking.
//!
//! # Integration Points
//!
//! - **Input**: [`ModuleInfo`] from IR builder, [`Backend`] trait for emission rules
//! - **Output**: Formatted Rust source code (typically passed through `rustfmt`)
//! - **Error Handling**: Uses `anyhow::Result` for context on generation failures

pub mod constructor;
pub mod dynamic;
pub mod export;
pub mod function;
pub mod instruction;
pub mod module;
pub mod traits;
pub mod types;
pub mod utils;

use crate::backend::Backend;
use crate::ir::*;
use anyhow::Result;

/// Main code generator struct that orchestrates emission of Rust code from IR.
///
/// # Example
///
/// ```ignore
/// let backend = SafeBackend::new();
/// let codegen = CodeGenerator::new(&backend);
/// let rust_code = codegen.generate_module_with_info(&module_info)?;
/// ```
pub struct CodeGenerator<'a, B: Backend> {
    backend: &'a B,
}

impl<'a, B: Backend> CodeGenerator<'a, B> {
    /// Create a new code generator with a given backend.
    pub fn new(backend: &'a B) -> Self {
        CodeGenerator { backend }
    }

    /// Generate a complete Rust module from IR with full module info.
    ///
    /// This is the main entry point. It generates a module wrapper structure.
    pub fn generate_module_with_info(&self, info: &ModuleInfo) -> Result<String> {
        module::generate_module_with_info(self.backend, info)
    }
}
