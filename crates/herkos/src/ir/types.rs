//! IR type definitions.
//!
//! The IR represents each WebAssembly function body as a tree of structured
//! instructions (`Expression = Vec<Instruction>`), mirroring the nesting of
//! Wasm's `block`/`loop`/`if` constructs directly rather than flattening them
//! into a basic-block graph. Operand order is implicit: an instruction's
//! operands are simply the instructions that precede it in the same
//! `Expression`, exactly as in the Wasm stack machine. Code generation is
//! responsible for turning this nesting into flat host code over a slot
//! array (see `codegen::function`).

use std::fmt;

/// Generic index type with a phantom tag to distinguish different index spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Idx<TAG> {
    idx: usize,
    _marker: std::marker::PhantomData<TAG>,
}

impl<TAG> Idx<TAG> {
    pub fn new(idx: usize) -> Self {
        Self {
            idx,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn as_usize(&self) -> usize {
        self.idx
    }
}

impl<TAG> From<Idx<TAG>> for usize {
    fn from(idx: Idx<TAG>) -> Self {
        idx.idx
    }
}

/// Type index — indexes into `ModuleInfo::type_signatures` and `ModuleInfo::canonical_type`.
pub type TypeIdx = Idx<FuncSignature>;

/// Marker type for local function indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalFuncIdxTag;

/// Local function index — indexes into `ModuleInfo::ir_functions`.
/// Import count has already been subtracted (imports occupy 0..num_imported_functions-1 in the
/// global Wasm function index space).
pub type LocalFuncIdx = Idx<LocalFuncIdxTag>;

/// Imported function index — indexes into `ModuleInfo::func_imports`.
/// Numerically equivalent to the position in the global Wasm function index space
/// (imports occupy indices 0..num_imports-1).
pub type ImportIdx = Idx<FuncImport>;

/// Global index — unified index into the global space (imported globals first, then local globals).
/// Resolved via `ModuleInfo::resolve_global()` to distinguish imported from local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalIdxdxTag;
pub type GlobalIdx = Idx<GlobalIdxdxTag>;

/// Imported global index — indexes into `ModuleInfo::imported_globals` (raw position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImportedGlobalIdxTag;
pub type ImportedGlobalIdx = Idx<ImportedGlobalIdxTag>;

/// Local global index — indexes into `ModuleInfo::globals` (import count already subtracted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalGlobalIdxTag;
pub type LocalGlobalIdx = Idx<LocalGlobalIdxTag>;

/// WebAssembly value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WasmType {
    I32,
    I64,
    F32,
    F64,
}

// `i32`, `i64`, `f32`, `f64` are the canonical names from the Wasm spec, which happen
// to coincide with Rust's primitive names. This Display implementation reflects the
// spec-level name, not a Rust-specific choice, so it belongs here in the IR layer.
// Any backend that uses different type names (e.g., `int32_t` for C) should do its
// own formatting in codegen rather than calling `to_string()` on a `WasmType`.
impl fmt::Display for WasmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WasmType::I32 => write!(f, "i32"),
            WasmType::I64 => write!(f, "i64"),
            WasmType::F32 => write!(f, "f32"),
            WasmType::F64 => write!(f, "f64"),
        }
    }
}

impl WasmType {
    /// Convert wasmparser::ValType to our WasmType.
    pub fn from_wasmparser(vt: wasmparser::ValType) -> Self {
        use wasmparser::ValType;
        match vt {
            ValType::I32 => WasmType::I32,
            ValType::I64 => WasmType::I64,
            ValType::F32 => WasmType::F32,
            ValType::F64 => WasmType::F64,
            _ => panic!("Unsupported value type: {:?}", vt),
        }
    }

    /// Get the default/zero value literal string for this type (used in code generation).
    ///
    /// Examples:
    /// - `I32` → `"0i32"`
    /// - `F64` → `"0.0f64"`
    pub fn default_value_literal(&self) -> &'static str {
        match self {
            WasmType::I32 => "0i32",
            WasmType::I64 => "0i64",
            WasmType::F32 => "0.0f32",
            WasmType::F64 => "0.0f64",
        }
    }
}

/// A structured sequence of instructions — the body of a function, block, loop,
/// or if-arm. Operands of an instruction are the instructions preceding it in
/// the same `Expression`; there is no explicit SSA variable naming here, the
/// tree mirrors Wasm's implicit operand stack directly.
pub type Expression = Vec<Instruction>;

/// Arguments shared by `block` and `loop`.
#[derive(Debug, Clone)]
pub struct BlockArgs {
    /// Result type carried out of the block (None for void blocks).
    pub rt: Option<WasmType>,
    /// Nested body.
    pub body: Expression,
}

/// Arguments for `if`/`else`.
#[derive(Debug, Clone)]
pub struct IfArgs {
    /// Result type carried out of the if (None for void).
    pub rt: Option<WasmType>,
    /// Then-branch body.
    pub then_branch: Expression,
    /// Else-branch body (empty if there was no `else`).
    pub else_branch: Expression,
}

/// Arguments for `br_table`.
#[derive(Debug, Clone)]
pub struct BrTableArgs {
    /// Branch target depth for each table entry.
    pub labels: Vec<u32>,
    /// Branch target depth used when the index is out of range.
    pub default: u32,
}

/// Memory instruction immediate (alignment is not load-bearing for codegen and is dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemArg {
    pub offset: u32,
}

/// Width of a memory access.
///
/// Wasm supports sub-width loads/stores (e.g., `i32.load8_s` loads 1 byte
/// and sign-extends to i32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAccessWidth {
    /// Full type width (i32=4 bytes, i64=8 bytes, f32=4, f64=8)
    Full,
    /// 8-bit access
    I8,
    /// 16-bit access
    I16,
    /// 32-bit access (only valid for i64 loads/stores)
    I32,
}

/// Sign extension for sub-width loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignExtension {
    Signed,
    Unsigned,
}

/// Result of resolving a `GlobalIdx` to distinguish imported from local globals.
#[derive(Debug, Clone)]
pub enum ResolvedGlobal<'a> {
    /// Imported global with its index and definition.
    Imported(ImportedGlobalIdx, &'a ImportedGlobalDef),
    /// Local global with its index and definition.
    Local(LocalGlobalIdx, &'a GlobalDef),
}

/// A single structured Wasm instruction.
///
/// `Br`/`BrIf`/`BrTable` carry a relative label depth exactly as encoded in the
/// Wasm binary (0 = innermost enclosing block/loop/if). Resolving a depth to a
/// Rust loop label or a fallthrough is entirely codegen's job — the tree
/// builder never resolves branch targets.
#[derive(Debug, Clone)]
pub enum Instruction {
    Unreachable,
    Nop,

    Block(BlockArgs),
    Loop(BlockArgs),
    If(IfArgs),

    Br(u32),
    BrIf(u32),
    BrTable(BrTableArgs),
    Return,

    /// Direct call in the global Wasm function index space (imports included).
    /// Whether this targets an import or a local function is resolved during
    /// codegen by comparing against `ModuleInfo::num_imported_functions()`.
    Call { func_idx: u32 },

    /// Indirect call through table 0, checked against `type_idx`'s signature.
    CallIndirect { type_idx: TypeIdx },

    Drop,
    Select,

    LocalGet(u32),
    LocalSet(u32),
    LocalTee(u32),

    /// Global index in the unified (imported-then-local) index space.
    GlobalGet(GlobalIdx),
    GlobalSet(GlobalIdx),

    Load {
        ty: WasmType,
        width: MemoryAccessWidth,
        sign: Option<SignExtension>,
        memarg: MemArg,
    },
    Store {
        ty: WasmType,
        width: MemoryAccessWidth,
        memarg: MemArg,
    },

    MemorySize,
    MemoryGrow,

    Const(IrValue),
    Bin(BinOp),
    Un(UnOp),

    /// Sentinel marking that the enclosing block is itself a branch target.
    /// Appended by the branch-target analyzer; reserved opcode, always a
    /// structural no-op wherever it is matched.
    BrTarget,
}

/// Constant value in the IR.
#[derive(Debug, Clone, Copy)]
pub enum IrValue {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl IrValue {
    /// Returns the WasmType of this constant value.
    pub fn wasm_type(&self) -> WasmType {
        match self {
            IrValue::I32(_) => WasmType::I32,
            IrValue::I64(_) => WasmType::I64,
            IrValue::F32(_) => WasmType::F32,
            IrValue::F64(_) => WasmType::F64,
        }
    }
}

// This Display emits Rust literal syntax (`42i32`, `1.5f32`) and is intentionally
// backend-specific. It is used by the IR debug output and tests to verify that
// constants will be emitted correctly. Since herkos currently has one codegen target
// (Rust), keeping it here avoids premature abstraction. If a second backend is ever
// added, replace this with an explicit `to_rust_literal()` method in the codegen
// layer and repurpose Display for a backend-neutral debug form.
impl fmt::Display for IrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrValue::I32(v) => write!(f, "{}i32", v),
            IrValue::I64(v) => write!(f, "{}i64", v),
            IrValue::F32(v) => write!(f, "{}f32", v),
            IrValue::F64(v) => write!(f, "{}f64", v),
        }
    }
}

/// Binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // i32 operations
    I32Add,
    I32Sub,
    I32Mul,
    I32DivS, // Signed division
    I32DivU, // Unsigned division
    I32RemS, // Signed remainder
    I32RemU, // Unsigned remainder
    I32And,
    I32Or,
    I32Xor,
    I32Shl,  // Shift left
    I32ShrS, // Shift right (signed)
    I32ShrU, // Shift right (unsigned)
    I32Rotl, // Rotate left
    I32Rotr, // Rotate right

    // i32 comparisons
    I32Eq,
    I32Ne,
    I32LtS, // Less than (signed)
    I32LtU, // Less than (unsigned)
    I32GtS, // Greater than (signed)
    I32GtU, // Greater than (unsigned)
    I32LeS, // Less or equal (signed)
    I32LeU, // Less or equal (unsigned)
    I32GeS, // Greater or equal (signed)
    I32GeU, // Greater or equal (unsigned)

    // i64 operations (same pattern as i32)
    I64Add,
    I64Sub,
    I64Mul,
    I64DivS,
    I64DivU,
    I64RemS,
    I64RemU,
    I64And,
    I64Or,
    I64Xor,
    I64Shl,
    I64ShrS,
    I64ShrU,
    I64Rotl,
    I64Rotr,

    // i64 comparisons
    I64Eq,
    I64Ne,
    I64LtS,
    I64LtU,
    I64GtS,
    I64GtU,
    I64LeS,
    I64LeU,
    I64GeS,
    I64GeU,

    // f32 operations
    F32Add,
    F32Sub,
    F32Mul,
    F32Div,
    F32Min,
    F32Max,
    F32Copysign,

    // f32 comparisons
    F32Eq,
    F32Ne,
    F32Lt,
    F32Gt,
    F32Le,
    F32Ge,

    // f64 operations
    F64Add,
    F64Sub,
    F64Mul,
    F64Div,
    F64Min,
    F64Max,
    F64Copysign,

    // f64 comparisons
    F64Eq,
    F64Ne,
    F64Lt,
    F64Gt,
    F64Le,
    F64Ge,
}

/// Unary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    // i32 unary
    I32Clz,    // Count leading zeros
    I32Ctz,    // Count trailing zeros
    I32Popcnt, // Population count (count 1 bits)
    I32Eqz,    // Equal to zero (i32 → i32, 0 or 1)

    // i64 unary
    I64Clz,
    I64Ctz,
    I64Popcnt,
    I64Eqz,

    // f32 unary
    F32Abs,
    F32Neg,
    F32Ceil,
    F32Floor,
    F32Trunc,
    F32Nearest,
    F32Sqrt,

    // f64 unary
    F64Abs,
    F64Neg,
    F64Ceil,
    F64Floor,
    F64Trunc,
    F64Nearest,
    F64Sqrt,
    // Conversions: integer truncation/extension
    I32WrapI64,    // i64 → i32 (truncate to low 32 bits)
    I64ExtendI32S, // i32 → i64 (sign-extend)
    I64ExtendI32U, // i32 → i64 (zero-extend)

    // Conversions: float → integer (trapping on NaN/overflow)
    I32TruncF32S,
    I32TruncF32U,
    I32TruncF64S,
    I32TruncF64U,
    I64TruncF32S,
    I64TruncF32U,
    I64TruncF64S,
    I64TruncF64U,

    // Conversions: integer → float
    F32ConvertI32S,
    F32ConvertI32U,
    F32ConvertI64S,
    F32ConvertI64U,
    F64ConvertI32S,
    F64ConvertI32U,
    F64ConvertI64S,
    F64ConvertI64U,

    // Conversions: float precision
    F32DemoteF64,  // f64 → f32
    F64PromoteF32, // f32 → f64

    // Reinterpretations (bitcast)
    I32ReinterpretF32, // f32 → i32
    I64ReinterpretF64, // f64 → i64
    F32ReinterpretI32, // i32 → f32
    F64ReinterpretI64, // i64 → f64
}

impl BinOp {
    /// Returns the WasmType of the result produced by this operation.
    ///
    /// Note: all comparison operations return i32 (0 or 1), even for i64/f32/f64 operands.
    pub fn result_type(&self) -> WasmType {
        match self {
            // i32 arithmetic → i32
            BinOp::I32Add
            | BinOp::I32Sub
            | BinOp::I32Mul
            | BinOp::I32DivS
            | BinOp::I32DivU
            | BinOp::I32RemS
            | BinOp::I32RemU
            | BinOp::I32And
            | BinOp::I32Or
            | BinOp::I32Xor
            | BinOp::I32Shl
            | BinOp::I32ShrS
            | BinOp::I32ShrU
            | BinOp::I32Rotl
            | BinOp::I32Rotr => WasmType::I32,

            // i32 comparisons → i32
            BinOp::I32Eq
            | BinOp::I32Ne
            | BinOp::I32LtS
            | BinOp::I32LtU
            | BinOp::I32GtS
            | BinOp::I32GtU
            | BinOp::I32LeS
            | BinOp::I32LeU
            | BinOp::I32GeS
            | BinOp::I32GeU => WasmType::I32,

            // i64 arithmetic → i64
            BinOp::I64Add
            | BinOp::I64Sub
            | BinOp::I64Mul
            | BinOp::I64DivS
            | BinOp::I64DivU
            | BinOp::I64RemS
            | BinOp::I64RemU
            | BinOp::I64And
            | BinOp::I64Or
            | BinOp::I64Xor
            | BinOp::I64Shl
            | BinOp::I64ShrS
            | BinOp::I64ShrU
            | BinOp::I64Rotl
            | BinOp::I64Rotr => WasmType::I64,

            // i64 comparisons → i32
            BinOp::I64Eq
            | BinOp::I64Ne
            | BinOp::I64LtS
            | BinOp::I64LtU
            | BinOp::I64GtS
            | BinOp::I64GtU
            | BinOp::I64LeS
            | BinOp::I64LeU
            | BinOp::I64GeS
            | BinOp::I64GeU => WasmType::I32,

            // f32 arithmetic → f32
            BinOp::F32Add
            | BinOp::F32Sub
            | BinOp::F32Mul
            | BinOp::F32Div
            | BinOp::F32Min
            | BinOp::F32Max
            | BinOp::F32Copysign => WasmType::F32,

            // f32 comparisons → i32
            BinOp::F32Eq
            | BinOp::F32Ne
            | BinOp::F32Lt
            | BinOp::F32Gt
            | BinOp::F32Le
            | BinOp::F32Ge => WasmType::I32,

            // f64 arithmetic → f64
            BinOp::F64Add
            | BinOp::F64Sub
            | BinOp::F64Mul
            | BinOp::F64Div
            | BinOp::F64Min
            | BinOp::F64Max
            | BinOp::F64Copysign => WasmType::F64,

            // f64 comparisons → i32
            BinOp::F64Eq
            | BinOp::F64Ne
            | BinOp::F64Lt
            | BinOp::F64Gt
            | BinOp::F64Le
            | BinOp::F64Ge => WasmType::I32,
        }
    }
}

impl UnOp {
    /// Returns the WasmType of the result produced by this operation.
    ///
    /// Note: `I64Eqz` returns i32 (0 or 1), not i64.
    pub fn result_type(&self) -> WasmType {
        match self {
            UnOp::I32Clz | UnOp::I32Ctz | UnOp::I32Popcnt | UnOp::I32Eqz => WasmType::I32,
            UnOp::I64Clz | UnOp::I64Ctz | UnOp::I64Popcnt => WasmType::I64,
            UnOp::I64Eqz => WasmType::I32,
            UnOp::F32Abs
            | UnOp::F32Neg
            | UnOp::F32Ceil
            | UnOp::F32Floor
            | UnOp::F32Trunc
            | UnOp::F32Nearest
            | UnOp::F32Sqrt => WasmType::F32,
            UnOp::F64Abs
            | UnOp::F64Neg
            | UnOp::F64Ceil
            | UnOp::F64Floor
            | UnOp::F64Trunc
            | UnOp::F64Nearest
            | UnOp::F64Sqrt => WasmType::F64,

            // Conversions → i32
            UnOp::I32WrapI64
            | UnOp::I32TruncF32S
            | UnOp::I32TruncF32U
            | UnOp::I32TruncF64S
            | UnOp::I32TruncF64U
            | UnOp::I32ReinterpretF32 => WasmType::I32,

            // Conversions → i64
            UnOp::I64ExtendI32S
            | UnOp::I64ExtendI32U
            | UnOp::I64TruncF32S
            | UnOp::I64TruncF32U
            | UnOp::I64TruncF64S
            | UnOp::I64TruncF64U
            | UnOp::I64ReinterpretF64 => WasmType::I64,

            // Conversions → f32
            UnOp::F32ConvertI32S
            | UnOp::F32ConvertI32U
            | UnOp::F32ConvertI64S
            | UnOp::F32ConvertI64U
            | UnOp::F32DemoteF64
            | UnOp::F32ReinterpretI32 => WasmType::F32,

            // Conversions → f64
            UnOp::F64ConvertI32S
            | UnOp::F64ConvertI32U
            | UnOp::F64ConvertI64S
            | UnOp::F64ConvertI64U
            | UnOp::F64PromoteF32
            | UnOp::F64ReinterpretI64 => WasmType::F64,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::I32Add => "i32.add",
            BinOp::I32Sub => "i32.sub",
            BinOp::I32Mul => "i32.mul",
            BinOp::I64Add => "i64.add",
            BinOp::I64Sub => "i64.sub",
            BinOp::I64Mul => "i64.mul",
            BinOp::F32Add => "f32.add",
            BinOp::F32Sub => "f32.sub",
            BinOp::F32Mul => "f32.mul",
            BinOp::F64Add => "f64.add",
            BinOp::F64Sub => "f64.sub",
            BinOp::F64Mul => "f64.mul",
            _ => return fmt::Debug::fmt(self, f), // Use debug format for others
        };
        write!(f, "{}", s)
    }
}

// ─── Function-level IR ──────────────────────────────────────────────────────

/// IR representation of a complete function as a structured instruction tree.
#[derive(Debug, Clone)]
pub struct IrFunction {
    /// Parameter types, in order. Parameters occupy slots `[0, params.len())`.
    pub params: Vec<WasmType>,

    /// Local variable types, in declaration order. Locals occupy slots
    /// `[params.len(), params.len() + locals.len())`.
    pub locals: Vec<WasmType>,

    /// The function body.
    pub body: Expression,

    /// Return type (None for void functions).
    pub return_type: Option<WasmType>,

    /// Index into the Wasm type section (needed for call_indirect dispatch).
    pub type_idx: TypeIdx,

    /// Whether this function calls imported functions or accesses imported globals (needs host parameter).
    pub needs_host: bool,
}

// ─── Module-level IR metadata ───────────────────────────────────────────────

/// Definition of a Wasm global variable.
#[derive(Debug, Clone)]
pub struct GlobalDef {
    /// Whether the global is mutable.
    pub mutable: bool,
    /// The constant initializer value (also encodes the type).
    pub init_value: GlobalInit,
}

/// Constant initializer value for a global.
#[derive(Debug, Clone, Copy)]
pub enum GlobalInit {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl GlobalInit {
    /// Get the WasmType of this global init value.
    pub fn ty(&self) -> WasmType {
        match self {
            GlobalInit::I32(_) => WasmType::I32,
            GlobalInit::I64(_) => WasmType::I64,
            GlobalInit::F32(_) => WasmType::F32,
            GlobalInit::F64(_) => WasmType::F64,
        }
    }
}

/// A data segment to initialize memory.
#[derive(Debug, Clone)]
pub struct DataSegmentDef {
    /// Byte offset into memory.
    pub offset: u32,
    /// Raw bytes to write.
    pub data: Vec<u8>,
}

/// An exported function mapping.
#[derive(Debug, Clone)]
pub struct FuncExport {
    /// The exported name (becomes a Rust method name).
    pub name: String,
    /// Index into the local function index space (imports excluded).
    pub func_index: LocalFuncIdx,
}

/// An exported global mapping, backing `get_global_value(name)`.
#[derive(Debug, Clone)]
pub struct GlobalExport {
    /// The exported name.
    pub name: String,
    /// Index into the local global index space (imports excluded).
    pub global_index: LocalGlobalIdx,
}

/// Signature of a function.
#[derive(Debug, Clone)]
pub struct FuncSignature {
    /// Parameter types.
    pub params: Vec<WasmType>,
    /// Return type (None for void).
    pub return_type: Option<WasmType>,
    /// Index into the Wasm type section (needed for call_indirect dispatch).
    /// Note: This field is currently always set to 0 and not used in codegen.
    pub type_idx: TypeIdx,
    /// Whether this function calls imported functions (needs host parameter).
    pub needs_host: bool,
}

/// An element segment to initialize a table.
#[derive(Debug, Clone)]
pub struct ElementSegmentDef {
    /// Starting offset in the table.
    pub offset: usize,
    /// Function indices to place into the table starting at `offset`.
    /// These are in the local function index space (imports already subtracted).
    pub func_indices: Vec<LocalFuncIdx>,
}

/// An imported function for trait generation.
#[derive(Debug, Clone)]
pub struct FuncImport {
    /// Import module name (e.g., "env").
    pub module_name: String,
    /// Import function name (e.g., "log").
    pub func_name: String,
    /// Parameter types.
    pub params: Vec<WasmType>,
    /// Return type (None for void).
    pub return_type: Option<WasmType>,
}

/// An imported global variable.
#[derive(Debug, Clone)]
pub struct ImportedGlobalDef {
    /// Import module name.
    pub module_name: String,
    /// Import field name (used as method name in host trait).
    pub name: String,
    /// The Wasm value type.
    pub wasm_type: WasmType,
    /// Whether the global is mutable.
    pub mutable: bool,
}

/// Module-level information describing a WebAssembly module.
/// Memory ownership model for a WebAssembly module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryMode {
    /// Module owns its memory (declares the memory section).
    Owned,
    /// Module imports memory from the host.
    Imported,
    /// Module does not use memory.
    None,
}

/// This is the IR representation of a module's structure and metadata,
/// independent of any specific code generation backend. It includes memory
/// layout, table configuration, globals, imports, exports, and code segments.
#[derive(Debug, Clone, Default)]
pub struct ModuleInfo {
    /// Whether the module declares linear memory.
    pub has_memory: bool,
    /// Maximum memory pages (from Wasm memory section or default).
    pub max_pages: usize,
    /// Initial memory pages (from Wasm memory section).
    pub initial_pages: usize,
    /// Initial table size (number of entries).
    pub table_initial: usize,
    /// Maximum table size (for const generic TABLE_MAX).
    pub table_max: usize,
    /// Element segments for table initialization.
    pub element_segments: Vec<ElementSegmentDef>,
    /// Global variable definitions (mutable + immutable).
    pub globals: Vec<GlobalDef>,
    /// Data segments for memory initialization.
    pub data_segments: Vec<DataSegmentDef>,
    /// Exported functions.
    pub func_exports: Vec<FuncExport>,
    /// Exported globals, backing `get_global_value(name)`.
    pub global_exports: Vec<GlobalExport>,
    /// Name the linear memory is exported under, if any (MVP: at most one memory).
    pub memory_export_name: Option<String>,
    /// Name the table is exported under, if any (MVP: at most one table).
    pub table_export_name: Option<String>,
    /// Type section signatures (for call_indirect dispatch).
    pub type_signatures: Vec<FuncSignature>,
    /// Canonical type index mapping: maps each Wasm type index to the
    /// smallest index with the same structural signature.
    /// Used for spec-compliant structural type equivalence in call_indirect.
    pub canonical_type: Vec<usize>,
    /// Imported functions for trait generation.
    /// The number of imported functions is `func_imports.len()`.
    pub func_imports: Vec<FuncImport>,
    /// Whether memory is imported rather than locally declared.
    pub has_memory_import: bool,
    /// Imported global definitions, in import declaration order.
    pub imported_globals: Vec<ImportedGlobalDef>,
    /// All IR functions in the module.
    pub ir_functions: Vec<IrFunction>,
}

impl ModuleInfo {
    /// Get the number of imported functions.
    ///
    /// This is derived from `func_imports.len()` rather than storing it separately.
    pub fn num_imported_functions(&self) -> usize {
        self.func_imports.len()
    }

    // ─── Typed accessors ───────────────────────────────────────────────────

    /// Get an IR function by local function index.
    pub fn ir_function(&self, idx: LocalFuncIdx) -> Option<&IrFunction> {
        self.ir_functions.get(idx.as_usize())
    }

    /// Get a type signature by type index.
    pub fn type_signature(&self, idx: TypeIdx) -> Option<&FuncSignature> {
        self.type_signatures.get(idx.as_usize())
    }

    /// Get a function import by import index.
    pub fn func_import(&self, idx: ImportIdx) -> Option<&FuncImport> {
        self.func_imports.get(idx.as_usize())
    }

    /// Get a local global by local global index.
    pub fn local_global(&self, idx: LocalGlobalIdx) -> Option<&GlobalDef> {
        self.globals.get(idx.as_usize())
    }

    /// Get an imported global by imported global index.
    pub fn imported_global(&self, idx: ImportedGlobalIdx) -> Option<&ImportedGlobalDef> {
        self.imported_globals.get(idx.as_usize())
    }

    /// Resolve a global index to distinguish imported from local globals.
    pub fn resolve_global(&self, idx: GlobalIdx) -> ResolvedGlobal<'_> {
        let i = idx.as_usize();
        if i < self.imported_globals.len() {
            ResolvedGlobal::Imported(ImportedGlobalIdx::new(i), &self.imported_globals[i])
        } else {
            let local_i = i - self.imported_globals.len();
            ResolvedGlobal::Local(LocalGlobalIdx::new(local_i), &self.globals[local_i])
        }
    }

    // ─── Builder methods ───────────────────────────────────────────────────

    /// Push an IR function and return its local function index.
    pub fn push_ir_function(&mut self, f: IrFunction) -> LocalFuncIdx {
        let idx = LocalFuncIdx::new(self.ir_functions.len());
        self.ir_functions.push(f);
        idx
    }

    /// Push a type signature and return its type index.
    pub fn push_type_signature(&mut self, s: FuncSignature) -> TypeIdx {
        let idx = TypeIdx::new(self.type_signatures.len());
        self.type_signatures.push(s);
        idx
    }

    /// Push a function import and return its import index.
    pub fn push_func_import(&mut self, i: FuncImport) -> ImportIdx {
        let idx = ImportIdx::new(self.func_imports.len());
        self.func_imports.push(i);
        idx
    }

    /// Push a local global and return its local global index.
    pub fn push_global(&mut self, g: GlobalDef) -> LocalGlobalIdx {
        let idx = LocalGlobalIdx::new(self.globals.len());
        self.globals.push(g);
        idx
    }

    /// Push an imported global and return its imported global index.
    pub fn push_imported_global(&mut self, g: ImportedGlobalDef) -> ImportedGlobalIdx {
        let idx = ImportedGlobalIdx::new(self.imported_globals.len());
        self.imported_globals.push(g);
        idx
    }

    // ─── Query methods ─────────────────────────────────────────────────────

    /// Whether the module has any mutable globals.
    pub fn has_mutable_globals(&self) -> bool {
        self.globals.iter().any(|g| g.mutable)
    }

    /// Whether the module has a non-trivial table (for indirect calls).
    pub fn has_table(&self) -> bool {
        self.table_max > 0
    }

    /// Determine the memory ownership model.
    pub fn memory_mode(&self) -> MemoryMode {
        match (self.has_memory, self.has_memory_import) {
            (true, false) => MemoryMode::Owned,
            (false, true) => MemoryMode::Imported,
            _ => MemoryMode::None,
        }
    }
}

/// Group items by module name using a key function.
pub fn group_by_module<'a, T, F>(
    items: &'a [T],
    key: F,
) -> std::collections::BTreeMap<String, Vec<&'a T>>
where
    F: Fn(&T) -> &str,
{
    let mut grouped: std::collections::BTreeMap<String, Vec<&'a T>> =
        std::collections::BTreeMap::new();
    for item in items {
        grouped.entry(key(item).to_string()).or_default().push(item);
    }
    grouped
}

/// Collect all unique module names from function and global imports.
pub fn all_import_module_names(info: &ModuleInfo) -> std::collections::BTreeSet<String> {
    info.func_imports
        .iter()
        .map(|i| i.module_name.clone())
        .chain(info.imported_globals.iter().map(|g| g.module_name.clone()))
        .collect()
}

/// Check if an IR function calls an imported function anywhere in its body.
pub fn has_import_calls(ir_func: &IrFunction, num_imported_functions: usize) -> bool {
    if num_imported_functions == 0 {
        return false;
    }
    expr_any(&ir_func.body, &|instr| {
        matches!(instr, Instruction::Call { func_idx } if (*func_idx as usize) < num_imported_functions)
    })
}

/// Check if an IR function accesses any imported globals.
pub fn has_global_import_access(ir_func: &IrFunction, num_imported_globals: usize) -> bool {
    if num_imported_globals == 0 {
        return false;
    }
    expr_any(&ir_func.body, &|instr| {
        matches!(
            instr,
            Instruction::GlobalGet(idx) | Instruction::GlobalSet(idx)
            if idx.as_usize() < num_imported_globals
        )
    })
}

/// Recursively test whether any instruction in `expr` (including nested block/loop/if
/// bodies) satisfies `pred`.
fn expr_any(expr: &Expression, pred: &impl Fn(&Instruction) -> bool) -> bool {
    expr.iter().any(|instr| {
        if pred(instr) {
            return true;
        }
        match instr {
            Instruction::Block(args) | Instruction::Loop(args) => expr_any(&args.body, pred),
            Instruction::If(args) => {
                expr_any(&args.then_branch, pred) || expr_any(&args.else_branch, pred)
            }
            _ => false,
        }
    })
}
