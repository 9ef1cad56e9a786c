//! Code generation backends.
//!
//! The Backend trait abstracts the difference between safe, verified, and hybrid
//! code generation. Each backend emits different Rust code for the same IR.
//!
//! All operand slots are uniform `i64` machine words addressed by index
//! (`l0`, `l1`, ...); a backend method is handed the slot indices it needs to
//! read and write and is responsible for casting to/from the Wasm-level type
//! at use sites (see `ir::types` module docs for the storage model).

mod safe;
pub use safe::SafeBackend;

use crate::ir::*;
use anyhow::Result;

/// A slot index into a function's flat `i64` operand array.
pub type Slot = usize;

/// Code generation backend trait.
///
/// Different backends emit different Rust code from the same IR:
/// - SafeBackend: bounds-checked, returns Result
/// - VerifiedBackend: unsafe + proof comments (Milestone 6)
/// - HybridBackend: mix of safe and unsafe (Milestone 6)
pub trait Backend {
    /// Emit Rust code for a constant value.
    fn emit_const(&self, dest: Slot, value: &IrValue) -> String;

    /// Emit Rust code for a binary operation.
    fn emit_binop(&self, dest: Slot, op: BinOp, lhs: Slot, rhs: Slot) -> String;

    /// Emit Rust code for a unary operation.
    fn emit_unop(&self, dest: Slot, op: UnOp, operand: Slot) -> String;

    /// Emit Rust code for a memory load (full or sub-width).
    fn emit_load(
        &self,
        dest: Slot,
        ty: WasmType,
        addr: Slot,
        offset: u32,
        width: MemoryAccessWidth,
        sign: Option<SignExtension>,
    ) -> Result<String>;

    /// Emit Rust code for a memory store (full or sub-width).
    fn emit_store(
        &self,
        ty: WasmType,
        addr: Slot,
        value: Slot,
        offset: u32,
        width: MemoryAccessWidth,
    ) -> Result<String>;

    /// Emit Rust code for a function call (local function).
    #[allow(clippy::too_many_arguments)]
    fn emit_call(
        &self,
        dest: Option<Slot>,
        func_idx: usize,
        args: &[Slot],
        arg_types: &[WasmType],
        return_type: Option<WasmType>,
        has_globals: bool,
        has_memory: bool,
        has_table: bool,
    ) -> String;

    /// Emit Rust code for an imported function call.
    /// Generates `host.func_name(args)?`
    fn emit_call_import(
        &self,
        dest: Option<Slot>,
        module_name: &str,
        func_name: &str,
        args: &[Slot],
        arg_types: &[WasmType],
        return_type: Option<WasmType>,
    ) -> String;

    /// Emit Rust code for reading a global variable.
    /// Mutable globals: `globals.g{index}`, immutable: `G{index}` (const item).
    fn emit_global_get(&self, dest: Slot, index: usize, ty: WasmType, is_mutable: bool) -> String;

    /// Emit Rust code for writing a mutable global variable.
    fn emit_global_set(&self, index: usize, value: Slot, ty: WasmType) -> String;

    /// Emit Rust code for select (conditional move). Slots are raw `i64`
    /// words, so no type-aware casting is needed: whichever operand is
    /// chosen is copied verbatim.
    fn emit_select(&self, dest: Slot, val1: Slot, val2: Slot, condition: Slot) -> String;

    /// Emit Rust code for a return statement. `value` pairs the slot holding
    /// the result with its native Wasm type, since slots are always `i64`
    /// and must be cast back before returning from a natively-typed function.
    fn emit_return(&self, value: Option<(Slot, WasmType)>) -> String;

    /// Emit Rust code for memory.size (returns current page count as i32).
    fn emit_memory_size(&self, dest: Slot) -> String;

    /// Emit Rust code for memory.grow (grows by delta pages, returns old size or -1).
    fn emit_memory_grow(&self, dest: Slot, delta: Slot) -> String;

    /// Emit Rust code for unreachable.
    fn emit_unreachable(&self) -> String;
}
