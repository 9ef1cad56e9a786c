//! `herkos-runtime` — Runtime library for herkos transpiled output.
//!
//! This crate is `#![no_std]` by default. It provides:
//! - `IsolatedMemory<const MAX_PAGES: usize>` for Wasm linear memory
//! - `WasmTrap` / `WasmResult<T>` for Wasm trap handling
//! - Trait definitions for capability-based host imports (Phase 3+)

#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

/// WebAssembly page size: 64 KiB per the Wasm specification.
pub const PAGE_SIZE: usize = 65536;

mod memory;
pub use memory::IsolatedMemory;

mod table;
pub use table::{FuncRef, Table};

mod module;
pub use module::{LibraryModule, Module};

/// Wasm execution errors — no panics, no unwinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WasmTrap {
    /// Memory access out of bounds.
    OutOfBounds,
    /// Integer division by zero.
    DivisionByZero,
    /// Integer overflow (e.g., `i32.trunc_f64_s` on out-of-range float).
    IntegerOverflow,
    /// Unreachable instruction executed.
    Unreachable,
    /// Indirect call type mismatch (`call_indirect` signature check).
    IndirectCallTypeMismatch,
    /// Table access out of bounds.
    TableOutOfBounds,
    /// Undefined element in table.
    UndefinedElement,
}

impl core::fmt::Display for WasmTrap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            WasmTrap::OutOfBounds => "out of bounds memory access",
            WasmTrap::DivisionByZero => "integer divide by zero",
            WasmTrap::IntegerOverflow => "integer overflow",
            WasmTrap::Unreachable => "unreachable instruction executed",
            WasmTrap::IndirectCallTypeMismatch => "indirect call type mismatch",
            WasmTrap::TableOutOfBounds => "out of bounds table access",
            WasmTrap::UndefinedElement => "undefined element",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for WasmTrap {}

/// A dynamically-typed Wasm value, used by the name-keyed `call_func`/
/// `get_global_value` surface generated for each module (the typed
/// `func_N`/export wrappers remain the zero-overhead primary interface;
/// this enum backs the additional reflective layer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

/// Result type for Wasm operations — `Result<T, WasmTrap>`.
pub type WasmResult<T> = Result<T, WasmTrap>;

/// Errors that occur during module/memory/table construction.
///
/// These are programming errors in the transpiler, not runtime Wasm traps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionError {
    /// Initial pages exceeds MAX_PAGES for memory.
    MemoryInitialPagesExceedsMax { initial: usize, max: usize },
    /// Initial size exceeds MAX_SIZE for table.
    TableInitialSizeExceedsMax { initial: usize, max: usize },
}

impl From<ConstructionError> for WasmTrap {
    fn from(_: ConstructionError) -> Self {
        // Construction errors are programming errors, but we map them to
        // OutOfBounds for compatibility with the error propagation chain.
        WasmTrap::OutOfBounds
    }
}
