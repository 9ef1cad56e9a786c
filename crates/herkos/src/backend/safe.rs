//! Safe backend — emits 100% safe Rust with bounds checking.
//!
//! This backend generates code that never uses `unsafe` and always performs
//! runtime bounds checks on memory accesses. All operations return `WasmResult<T>`.
//!
//! Every slot is a flat `i64` word (see `ir::types` module docs). The helpers
//! below cast a slot to the Wasm-level type an operation actually needs and
//! cast results back into the uniform slot representation, preserving bit
//! patterns exactly (so floats keep their NaN payload across loads/stores and
//! reinterprets).

use crate::backend::{Backend, Slot};
use crate::ir::*;

const INDENT: &str = "                ";

// ─── Slot ↔ native type casts ───────────────────────────────────────────────

fn i32_of(s: Slot) -> String {
    format!("(l{s} as i32)")
}

fn u32_of(s: Slot) -> String {
    format!("(l{s} as u32)")
}

fn i64_of(s: Slot) -> String {
    format!("l{s}")
}

fn u64_of(s: Slot) -> String {
    format!("(l{s} as u64)")
}

fn f32_of(s: Slot) -> String {
    format!("f32::from_bits(l{s} as u32)")
}

fn f64_of(s: Slot) -> String {
    format!("f64::from_bits(l{s} as u64)")
}

/// Cast a slot to its native Wasm-typed value.
fn native_of(ty: WasmType, s: Slot) -> String {
    match ty {
        WasmType::I32 => i32_of(s),
        WasmType::I64 => i64_of(s),
        WasmType::F32 => f32_of(s),
        WasmType::F64 => f64_of(s),
    }
}

fn store_i32(dest: Slot, expr: &str) -> String {
    format!("{INDENT}l{dest} = ({expr}) as u32 as i64;")
}

fn store_i64(dest: Slot, expr: &str) -> String {
    format!("{INDENT}l{dest} = ({expr}) as i64;")
}

fn store_f32(dest: Slot, expr: &str) -> String {
    format!("{INDENT}l{dest} = ({expr}).to_bits() as i64;")
}

fn store_f64(dest: Slot, expr: &str) -> String {
    format!("{INDENT}l{dest} = ({expr}).to_bits() as i64;")
}

/// Store a native-typed expression into a slot, casting into the uniform
/// `i64` representation per the storage model.
fn store_native(ty: WasmType, dest: Slot, expr: &str) -> String {
    match ty {
        WasmType::I32 => store_i32(dest, expr),
        WasmType::I64 => store_i64(dest, expr),
        WasmType::F32 => store_f32(dest, expr),
        WasmType::F64 => store_f64(dest, expr),
    }
}

/// Format a function call result assignment.
fn emit_call_result(dest: Option<Slot>, return_type: Option<WasmType>, call_expr: &str) -> String {
    match (dest, return_type) {
        (Some(d), Some(ty)) => store_native(ty, d, call_expr),
        _ => format!("{INDENT}{call_expr};"),
    }
}

/// Emit a f32 const, handling NaN and infinity special values.
fn emit_f32_const(dest: Slot, value: f32) -> String {
    let expr = if value.is_nan() {
        "f32::NAN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "f32::INFINITY".to_string()
        } else {
            "f32::NEG_INFINITY".to_string()
        }
    } else {
        format!("{value}f32")
    };
    store_f32(dest, &expr)
}

/// Emit a f64 const, handling NaN and infinity special values.
fn emit_f64_const(dest: Slot, value: f64) -> String {
    let expr = if value.is_nan() {
        "f64::NAN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "f64::INFINITY".to_string()
        } else {
            "f64::NEG_INFINITY".to_string()
        }
    } else {
        format!("{value}f64")
    };
    store_f64(dest, &expr)
}

/// Safe code generation backend.
pub struct SafeBackend;

impl SafeBackend {
    pub fn new() -> Self {
        SafeBackend
    }
}

impl Default for SafeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for SafeBackend {
    fn emit_const(&self, dest: Slot, value: &IrValue) -> String {
        match value {
            IrValue::I32(v) => store_i32(dest, &format!("{v}i32")),
            IrValue::I64(v) => store_i64(dest, &format!("{v}i64")),
            IrValue::F32(v) => emit_f32_const(dest, *v),
            IrValue::F64(v) => emit_f64_const(dest, *v),
        }
    }

    fn emit_binop(&self, dest: Slot, op: BinOp, lhs: Slot, rhs: Slot) -> String {
        use BinOp::*;

        macro_rules! bin32 {
            ($expr:expr) => {{
                let (l, r) = (i32_of(lhs), i32_of(rhs));
                let expr = format!($expr, l = l, r = r);
                store_i32(dest, &expr)
            }};
        }
        macro_rules! bin32u {
            ($expr:expr) => {{
                let (l, r) = (u32_of(lhs), u32_of(rhs));
                let expr = format!($expr, l = l, r = r);
                store_i32(dest, &expr)
            }};
        }
        macro_rules! bin64 {
            ($expr:expr) => {{
                let (l, r) = (i64_of(lhs), i64_of(rhs));
                let expr = format!($expr, l = l, r = r);
                store_i64(dest, &expr)
            }};
        }
        macro_rules! bin64u {
            ($expr:expr) => {{
                let (l, r) = (u64_of(lhs), u64_of(rhs));
                let expr = format!($expr, l = l, r = r);
                store_i64(dest, &expr)
            }};
        }
        macro_rules! cmp {
            ($l:expr, $op:literal, $r:expr) => {{
                let expr = format!("if {} {} {} {{ 1i32 }} else {{ 0i32 }}", $l, $op, $r);
                store_i32(dest, &expr)
            }};
        }

        match op {
            // i32 arithmetic — Wasm uses wrapping semantics
            I32Add => bin32!("{l}.wrapping_add({r})"),
            I32Sub => bin32!("{l}.wrapping_sub({r})"),
            I32Mul => bin32!("{l}.wrapping_mul({r})"),
            I32DivS => bin32!("{l}.checked_div({r}).ok_or(WasmTrap::DivisionByZero)?"),
            I32DivU => bin32u!("{l}.checked_div({r}).ok_or(WasmTrap::DivisionByZero)? as i32"),
            I32RemS => rem_guard(i32_of(lhs), i32_of(rhs), dest, store_i32),
            I32RemU => bin32u!("{l}.checked_rem({r}).ok_or(WasmTrap::DivisionByZero)? as i32"),
            I32And => bin32!("{l} & {r}"),
            I32Or => bin32!("{l} | {r}"),
            I32Xor => bin32!("{l} ^ {r}"),
            I32Shl => bin32!("{l}.wrapping_shl(({r} & 31) as u32)"),
            I32ShrS => bin32!("{l}.wrapping_shr(({r} & 31) as u32)"),
            I32ShrU => bin32u!("{l}.wrapping_shr(({r} & 31) as u32) as i32"),
            I32Rotl => bin32!("{l}.rotate_left(({r} & 31) as u32)"),
            I32Rotr => bin32!("{l}.rotate_right(({r} & 31) as u32)"),

            // i32 comparisons
            I32Eq => cmp!(i32_of(lhs), "==", i32_of(rhs)),
            I32Ne => cmp!(i32_of(lhs), "!=", i32_of(rhs)),
            I32LtS => cmp!(i32_of(lhs), "<", i32_of(rhs)),
            I32LtU => cmp!(u32_of(lhs), "<", u32_of(rhs)),
            I32GtS => cmp!(i32_of(lhs), ">", i32_of(rhs)),
            I32GtU => cmp!(u32_of(lhs), ">", u32_of(rhs)),
            I32LeS => cmp!(i32_of(lhs), "<=", i32_of(rhs)),
            I32LeU => cmp!(u32_of(lhs), "<=", u32_of(rhs)),
            I32GeS => cmp!(i32_of(lhs), ">=", i32_of(rhs)),
            I32GeU => cmp!(u32_of(lhs), ">=", u32_of(rhs)),

            // i64 arithmetic (same pattern as i32)
            I64Add => bin64!("{l}.wrapping_add({r})"),
            I64Sub => bin64!("{l}.wrapping_sub({r})"),
            I64Mul => bin64!("{l}.wrapping_mul({r})"),
            I64DivS => bin64!("{l}.checked_div({r}).ok_or(WasmTrap::DivisionByZero)?"),
            I64DivU => bin64u!("{l}.checked_div({r}).ok_or(WasmTrap::DivisionByZero)? as i64"),
            I64RemS => rem_guard(i64_of(lhs), i64_of(rhs), dest, store_i64),
            I64RemU => bin64u!("{l}.checked_rem({r}).ok_or(WasmTrap::DivisionByZero)? as i64"),
            I64And => bin64!("{l} & {r}"),
            I64Or => bin64!("{l} | {r}"),
            I64Xor => bin64!("{l} ^ {r}"),
            I64Shl => bin64!("{l}.wrapping_shl(({r} & 63) as u32)"),
            I64ShrS => bin64!("{l}.wrapping_shr(({r} & 63) as u32)"),
            I64ShrU => bin64u!("{l}.wrapping_shr(({r} & 63) as u32) as i64"),
            I64Rotl => bin64!("{l}.rotate_left(({r} & 63) as u32)"),
            I64Rotr => bin64!("{l}.rotate_right(({r} & 63) as u32)"),

            // i64 comparisons — note I64GeU compares as u64, never delegated
            // to the i32 unsigned comparator.
            I64Eq => cmp!(i64_of(lhs), "==", i64_of(rhs)),
            I64Ne => cmp!(i64_of(lhs), "!=", i64_of(rhs)),
            I64LtS => cmp!(i64_of(lhs), "<", i64_of(rhs)),
            I64LtU => cmp!(u64_of(lhs), "<", u64_of(rhs)),
            I64GtS => cmp!(i64_of(lhs), ">", i64_of(rhs)),
            I64GtU => cmp!(u64_of(lhs), ">", u64_of(rhs)),
            I64LeS => cmp!(i64_of(lhs), "<=", i64_of(rhs)),
            I64LeU => cmp!(u64_of(lhs), "<=", u64_of(rhs)),
            I64GeS => cmp!(i64_of(lhs), ">=", i64_of(rhs)),
            I64GeU => cmp!(u64_of(lhs), ">=", u64_of(rhs)),

            // f32/f64 arithmetic (no wrapping needed)
            F32Add => {
                let expr = format!("{} + {}", f32_of(lhs), f32_of(rhs));
                store_f32(dest, &expr)
            }
            F32Sub => {
                let expr = format!("{} - {}", f32_of(lhs), f32_of(rhs));
                store_f32(dest, &expr)
            }
            F32Mul => {
                let expr = format!("{} * {}", f32_of(lhs), f32_of(rhs));
                store_f32(dest, &expr)
            }
            F32Div => {
                let expr = format!("{} / {}", f32_of(lhs), f32_of(rhs));
                store_f32(dest, &expr)
            }
            F32Min => {
                let expr = format!("{}.min({})", f32_of(lhs), f32_of(rhs));
                store_f32(dest, &expr)
            }
            F32Max => {
                let expr = format!("{}.max({})", f32_of(lhs), f32_of(rhs));
                store_f32(dest, &expr)
            }
            F32Copysign => {
                let expr = format!("{}.copysign({})", f32_of(lhs), f32_of(rhs));
                store_f32(dest, &expr)
            }

            F64Add => {
                let expr = format!("{} + {}", f64_of(lhs), f64_of(rhs));
                store_f64(dest, &expr)
            }
            F64Sub => {
                let expr = format!("{} - {}", f64_of(lhs), f64_of(rhs));
                store_f64(dest, &expr)
            }
            F64Mul => {
                let expr = format!("{} * {}", f64_of(lhs), f64_of(rhs));
                store_f64(dest, &expr)
            }
            F64Div => {
                let expr = format!("{} / {}", f64_of(lhs), f64_of(rhs));
                store_f64(dest, &expr)
            }
            F64Min => {
                let expr = format!("{}.min({})", f64_of(lhs), f64_of(rhs));
                store_f64(dest, &expr)
            }
            F64Max => {
                let expr = format!("{}.max({})", f64_of(lhs), f64_of(rhs));
                store_f64(dest, &expr)
            }
            F64Copysign => {
                let expr = format!("{}.copysign({})", f64_of(lhs), f64_of(rhs));
                store_f64(dest, &expr)
            }

            // Float comparisons
            F32Eq => cmp!(f32_of(lhs), "==", f32_of(rhs)),
            F32Ne => cmp!(f32_of(lhs), "!=", f32_of(rhs)),
            F32Lt => cmp!(f32_of(lhs), "<", f32_of(rhs)),
            F32Gt => cmp!(f32_of(lhs), ">", f32_of(rhs)),
            F32Le => cmp!(f32_of(lhs), "<=", f32_of(rhs)),
            F32Ge => cmp!(f32_of(lhs), ">=", f32_of(rhs)),

            F64Eq => cmp!(f64_of(lhs), "==", f64_of(rhs)),
            F64Ne => cmp!(f64_of(lhs), "!=", f64_of(rhs)),
            F64Lt => cmp!(f64_of(lhs), "<", f64_of(rhs)),
            F64Gt => cmp!(f64_of(lhs), ">", f64_of(rhs)),
            F64Le => cmp!(f64_of(lhs), "<=", f64_of(rhs)),
            F64Ge => cmp!(f64_of(lhs), ">=", f64_of(rhs)),
        }
    }

    fn emit_unop(&self, dest: Slot, op: UnOp, operand: Slot) -> String {
        use UnOp::*;

        match op {
            I32Clz => store_i32(dest, &format!("{}.leading_zeros() as i32", i32_of(operand))),
            I32Ctz => store_i32(dest, &format!("{}.trailing_zeros() as i32", i32_of(operand))),
            I32Popcnt => store_i32(dest, &format!("{}.count_ones() as i32", i32_of(operand))),
            I32Eqz => store_i32(dest, &format!("if {} == 0 {{ 1 }} else {{ 0 }}", i32_of(operand))),

            I64Eqz => store_i32(
                dest,
                &format!("if {} == 0 {{ 1i32 }} else {{ 0i32 }}", i64_of(operand)),
            ),
            I64Clz => store_i64(dest, &format!("{}.leading_zeros() as i64", i64_of(operand))),
            I64Ctz => store_i64(dest, &format!("{}.trailing_zeros() as i64", i64_of(operand))),
            I64Popcnt => store_i64(dest, &format!("{}.count_ones() as i64", i64_of(operand))),

            F32Abs => store_f32(dest, &format!("{}.abs()", f32_of(operand))),
            F32Neg => store_f32(dest, &format!("-{}", f32_of(operand))),
            F32Sqrt => store_f32(dest, &format!("{}.sqrt()", f32_of(operand))),
            F32Ceil => store_f32(dest, &format!("{}.ceil()", f32_of(operand))),
            F32Floor => store_f32(dest, &format!("{}.floor()", f32_of(operand))),
            F32Trunc => store_f32(dest, &format!("{}.trunc()", f32_of(operand))),
            F32Nearest => store_f32(dest, &format!("{}.round_ties_even()", f32_of(operand))),

            F64Abs => store_f64(dest, &format!("{}.abs()", f64_of(operand))),
            F64Neg => store_f64(dest, &format!("-{}", f64_of(operand))),
            F64Sqrt => store_f64(dest, &format!("{}.sqrt()", f64_of(operand))),
            F64Ceil => store_f64(dest, &format!("{}.ceil()", f64_of(operand))),
            F64Floor => store_f64(dest, &format!("{}.floor()", f64_of(operand))),
            F64Trunc => store_f64(dest, &format!("{}.trunc()", f64_of(operand))),
            F64Nearest => store_f64(dest, &format!("{}.round_ties_even()", f64_of(operand))),

            // === Conversions ===
            I32WrapI64 => store_i32(dest, &i64_of(operand)),
            I64ExtendI32S => store_i64(dest, &format!("({}) as i64", i32_of(operand))),
            I64ExtendI32U => store_i64(dest, &format!("({}) as i64", u32_of(operand))),

            // Float → i32 (trapping on NaN/overflow)
            I32TruncF32S => trunc_guard(
                &f32_of(operand),
                "2147483648.0f32",
                "-2147483648.0f32",
                false,
                &store_i32(dest, &format!("({}) as i32", f32_of(operand))),
            ),
            I32TruncF32U => trunc_guard(
                &f32_of(operand),
                "4294967296.0f32",
                "-1.0f32",
                true,
                &store_i32(dest, &format!("({}) as u32 as i32", f32_of(operand))),
            ),
            I32TruncF64S => trunc_guard(
                &f64_of(operand),
                "2147483648.0f64",
                "-2147483648.0f64",
                false,
                &store_i32(dest, &format!("({}) as i32", f64_of(operand))),
            ),
            I32TruncF64U => trunc_guard(
                &f64_of(operand),
                "4294967296.0f64",
                "-1.0f64",
                true,
                &store_i32(dest, &format!("({}) as u32 as i32", f64_of(operand))),
            ),

            // Float → i64 (trapping on NaN/overflow)
            I64TruncF32S => trunc_guard(
                &f32_of(operand),
                "9223372036854775808.0f32",
                "-9223372036854775808.0f32",
                false,
                &store_i64(dest, &format!("({}) as i64", f32_of(operand))),
            ),
            I64TruncF32U => trunc_guard(
                &f32_of(operand),
                "18446744073709551616.0f32",
                "-1.0f32",
                true,
                &store_i64(dest, &format!("({}) as u64 as i64", f32_of(operand))),
            ),
            I64TruncF64S => trunc_guard(
                &f64_of(operand),
                "9223372036854775808.0f64",
                "-9223372036854775808.0f64",
                false,
                &store_i64(dest, &format!("({}) as i64", f64_of(operand))),
            ),
            I64TruncF64U => trunc_guard(
                &f64_of(operand),
                "18446744073709551616.0f64",
                "-1.0f64",
                true,
                &store_i64(dest, &format!("({}) as u64 as i64", f64_of(operand))),
            ),

            // Integer → float
            F32ConvertI32S => store_f32(dest, &format!("({}) as f32", i32_of(operand))),
            F32ConvertI32U => store_f32(dest, &format!("({}) as f32", u32_of(operand))),
            F32ConvertI64S => store_f32(dest, &format!("({}) as f32", i64_of(operand))),
            F32ConvertI64U => store_f32(dest, &format!("({}) as f32", u64_of(operand))),
            F64ConvertI32S => store_f64(dest, &format!("({}) as f64", i32_of(operand))),
            F64ConvertI32U => store_f64(dest, &format!("({}) as f64", u32_of(operand))),
            F64ConvertI64S => store_f64(dest, &format!("({}) as f64", i64_of(operand))),
            F64ConvertI64U => store_f64(dest, &format!("({}) as f64", u64_of(operand))),

            // Float precision
            F32DemoteF64 => store_f32(dest, &format!("({}) as f32", f64_of(operand))),
            F64PromoteF32 => store_f64(dest, &format!("({}) as f64", f32_of(operand))),

            // Reinterpretations (bitcast, not a no-op: bit pattern moves between
            // the float and integer domains unchanged).
            I32ReinterpretF32 => store_i32(dest, &format!("{}.to_bits() as i32", f32_of(operand))),
            I64ReinterpretF64 => store_i64(dest, &format!("{}.to_bits() as i64", f64_of(operand))),
            F32ReinterpretI32 => store_f32(dest, &format!("f32::from_bits({})", u32_of(operand))),
            F64ReinterpretI64 => store_f64(dest, &format!("f64::from_bits({})", u64_of(operand))),
        }
    }

    fn emit_load(
        &self,
        dest: Slot,
        ty: WasmType,
        addr: Slot,
        offset: u32,
        width: MemoryAccessWidth,
        sign: Option<SignExtension>,
    ) -> anyhow::Result<String> {
        let addr_expr = effective_addr(addr, offset);

        let load_expr = match (ty, width, sign) {
            (WasmType::I32, MemoryAccessWidth::Full, _) => format!("memory.load_i32({addr_expr})?"),
            (WasmType::I64, MemoryAccessWidth::Full, _) => format!("memory.load_i64({addr_expr})?"),
            (WasmType::F32, MemoryAccessWidth::Full, _) => format!("memory.load_f32({addr_expr})?"),
            (WasmType::F64, MemoryAccessWidth::Full, _) => format!("memory.load_f64({addr_expr})?"),

            (WasmType::I32, MemoryAccessWidth::I8, Some(SignExtension::Signed)) => {
                format!("memory.load_u8({addr_expr})? as i8 as i32")
            }
            (WasmType::I32, MemoryAccessWidth::I8, Some(SignExtension::Unsigned)) => {
                format!("memory.load_u8({addr_expr})? as i32")
            }
            (WasmType::I32, MemoryAccessWidth::I16, Some(SignExtension::Signed)) => {
                format!("memory.load_u16({addr_expr})? as i16 as i32")
            }
            (WasmType::I32, MemoryAccessWidth::I16, Some(SignExtension::Unsigned)) => {
                format!("memory.load_u16({addr_expr})? as i32")
            }
            (WasmType::I64, MemoryAccessWidth::I8, Some(SignExtension::Signed)) => {
                format!("memory.load_u8({addr_expr})? as i8 as i64")
            }
            (WasmType::I64, MemoryAccessWidth::I8, Some(SignExtension::Unsigned)) => {
                format!("memory.load_u8({addr_expr})? as i64")
            }
            (WasmType::I64, MemoryAccessWidth::I16, Some(SignExtension::Signed)) => {
                format!("memory.load_u16({addr_expr})? as i16 as i64")
            }
            (WasmType::I64, MemoryAccessWidth::I16, Some(SignExtension::Unsigned)) => {
                format!("memory.load_u16({addr_expr})? as i64")
            }
            (WasmType::I64, MemoryAccessWidth::I32, Some(SignExtension::Signed)) => {
                format!("memory.load_i32({addr_expr})? as i64")
            }
            (WasmType::I64, MemoryAccessWidth::I32, Some(SignExtension::Unsigned)) => {
                format!("memory.load_i32({addr_expr})? as u32 as i64")
            }
            _ => anyhow::bail!("invalid load combination: {ty:?}/{width:?}/{sign:?}"),
        };

        Ok(store_native(ty, dest, &load_expr))
    }

    fn emit_store(
        &self,
        ty: WasmType,
        addr: Slot,
        value: Slot,
        offset: u32,
        width: MemoryAccessWidth,
    ) -> anyhow::Result<String> {
        let addr_expr = effective_addr(addr, offset);
        let value_expr = native_of(ty, value);

        let store_call = match (ty, width) {
            (WasmType::I32, MemoryAccessWidth::Full) => {
                format!("memory.store_i32({addr_expr}, {value_expr})?")
            }
            (WasmType::I64, MemoryAccessWidth::Full) => {
                format!("memory.store_i64({addr_expr}, {value_expr})?")
            }
            (WasmType::F32, MemoryAccessWidth::Full) => {
                format!("memory.store_f32({addr_expr}, {value_expr})?")
            }
            (WasmType::F64, MemoryAccessWidth::Full) => {
                format!("memory.store_f64({addr_expr}, {value_expr})?")
            }
            (WasmType::I32 | WasmType::I64, MemoryAccessWidth::I8) => {
                format!("memory.store_u8({addr_expr}, ({value_expr}) as u8)?")
            }
            (WasmType::I32 | WasmType::I64, MemoryAccessWidth::I16) => {
                format!("memory.store_u16({addr_expr}, ({value_expr}) as u16)?")
            }
            (WasmType::I64, MemoryAccessWidth::I32) => {
                format!("memory.store_i32({addr_expr}, ({value_expr}) as i32)?")
            }
            _ => anyhow::bail!("invalid store combination: {ty:?}/{width:?}"),
        };

        Ok(format!("{INDENT}{store_call};"))
    }

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
    ) -> String {
        let mut call_args = call_arg_exprs(args, arg_types);
        if has_globals {
            call_args.push("globals".to_string());
        }
        if has_memory {
            call_args.push("memory".to_string());
        }
        if has_table {
            call_args.push("table".to_string());
        }
        let call_expr = format!("func_{}({})?", func_idx, call_args.join(", "));
        emit_call_result(dest, return_type, &call_expr)
    }

    fn emit_call_import(
        &self,
        dest: Option<Slot>,
        _module_name: &str,
        func_name: &str,
        args: &[Slot],
        arg_types: &[WasmType],
        return_type: Option<WasmType>,
    ) -> String {
        let call_args = call_arg_exprs(args, arg_types);
        let call_expr = format!("host.{}({})?", func_name, call_args.join(", "));
        emit_call_result(dest, return_type, &call_expr)
    }

    fn emit_global_get(&self, dest: Slot, index: usize, ty: WasmType, is_mutable: bool) -> String {
        let expr = if is_mutable {
            format!("globals.g{index}")
        } else {
            format!("G{index}")
        };
        store_native(ty, dest, &expr)
    }

    fn emit_global_set(&self, index: usize, value: Slot, ty: WasmType) -> String {
        format!("{INDENT}globals.g{index} = {};", native_of(ty, value))
    }

    fn emit_select(&self, dest: Slot, val1: Slot, val2: Slot, condition: Slot) -> String {
        format!(
            "{INDENT}l{dest} = if l{condition} != 0 {{ l{val1} }} else {{ l{val2} }};"
        )
    }

    fn emit_return(&self, value: Option<(Slot, WasmType)>) -> String {
        match value {
            Some((v, ty)) => format!("{INDENT}return Ok({});", native_of(ty, v)),
            None => format!("{INDENT}return Ok(());"),
        }
    }

    fn emit_memory_size(&self, dest: Slot) -> String {
        store_i32(dest, "memory.size()")
    }

    fn emit_memory_grow(&self, dest: Slot, delta: Slot) -> String {
        store_i32(dest, &format!("memory.grow({} as u32)", i32_of(delta)))
    }

    fn emit_unreachable(&self) -> String {
        format!("{INDENT}return Err(WasmTrap::Unreachable);")
    }
}

fn effective_addr(addr: Slot, offset: u32) -> String {
    if offset > 0 {
        format!("({} as usize).wrapping_add({offset} as usize)", u32_of(addr))
    } else {
        format!("({}) as usize", u32_of(addr))
    }
}

fn call_arg_exprs(args: &[Slot], arg_types: &[WasmType]) -> Vec<String> {
    args.iter()
        .zip(arg_types.iter())
        .map(|(&slot, &ty)| native_of(ty, slot))
        .collect()
}

/// Guards signed remainder against division by zero only. Unlike `div_s`,
/// Wasm's `rem_s` doesn't trap on `MIN % -1` — there's no overflow in a
/// remainder — so this uses `wrapping_rem` rather than `checked_rem`.
fn rem_guard(l: String, r: String, dest: Slot, store: fn(Slot, &str) -> String) -> String {
    format!(
        "{INDENT}if {r} == 0 {{ return Err(WasmTrap::DivisionByZero); }}\n{}",
        store(dest, &format!("{l}.wrapping_rem({r})"))
    )
}

/// Guards a float-to-integer truncation against NaN and out-of-range values,
/// which `as` silently saturates instead of trapping on.
fn trunc_guard(operand: &str, hi: &str, lo: &str, lo_inclusive: bool, store: &str) -> String {
    let lo_cmp = if lo_inclusive { "<=" } else { "<" };
    format!(
        "{INDENT}if {operand}.is_nan() || {operand} >= {hi} || {operand} {lo_cmp} {lo} {{ return Err(WasmTrap::IntegerOverflow); }}\n{store}"
    )
}
