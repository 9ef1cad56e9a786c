//! Module-level analysis - extracts metadata from parsed WebAssembly modules.
//!
//! This module performs structural analysis on a `ParsedModule` to extract
//! memory, table, type, import, and function signature information needed
//! for IR construction and code generation.

use super::super::types::*;
use crate::parser::{ImportKind, ParsedModule};
use crate::TranspileOptions;
use anyhow::{Context, Result};

/// Memory information extracted from the module.
pub(super) struct MemoryInfo {
    pub(super) has_memory: bool,
    pub(super) has_memory_import: bool,
    pub(super) max_pages: usize,
    pub(super) initial_pages: usize,
}

/// Table information extracted from the module.
pub(super) struct TableInfo {
    pub(super) initial: usize,
    pub(super) max: usize,
}

/// Extracts memory information from a parsed WASM module.
pub(super) fn extract_memory_info(
    parsed: &ParsedModule,
    options: &TranspileOptions,
) -> Result<MemoryInfo> {
    let has_memory = parsed.memory.is_some();
    let has_memory_import = parsed
        .imports
        .iter()
        .any(|imp| matches!(imp.kind, ImportKind::Memory { .. }));
    let max_pages = if let Some(ref mem) = parsed.memory {
        mem.maximum_pages
            .map(|p| p as usize)
            .unwrap_or(options.max_pages)
    } else {
        options.max_pages
    };
    let initial_pages = parsed
        .memory
        .as_ref()
        .map(|m| m.initial_pages as usize)
        .unwrap_or(0);

    Ok(MemoryInfo {
        has_memory,
        has_memory_import,
        max_pages,
        initial_pages,
    })
}

/// Extracts table information from a parsed WASM module.
pub(super) fn extract_table_info(parsed: &ParsedModule) -> TableInfo {
    if let Some(ref tbl) = parsed.table {
        TableInfo {
            initial: tbl.initial_size as usize,
            max: (tbl.max_size.unwrap_or(tbl.initial_size) as usize),
        }
    } else {
        TableInfo { initial: 0, max: 0 }
    }
}

/// Builds the canonical type index mapping.
///
/// Canonical mapping ensures that call_indirect type checks follow the Wasm spec:
/// two different type indices with identical (params, results) must match.
/// We map each type_idx to the smallest index with the same structural signature.
pub(super) fn build_type_mappings(parsed: &ParsedModule) -> Vec<usize> {
    let mut mapping = Vec::with_capacity(parsed.types.len());
    for (i, ty) in parsed.types.iter().enumerate() {
        let canon = parsed.types[..i]
            .iter()
            .position(|earlier| earlier.params() == ty.params() && earlier.results() == ty.results())
            .map(|pos| mapping[pos])
            .unwrap_or(i);
        mapping.push(canon);
    }
    mapping
}

/// Extracts imported globals from a parsed WASM module.
pub(super) fn build_imported_globals(parsed: &ParsedModule) -> Vec<ImportedGlobalDef> {
    parsed
        .imports
        .iter()
        .filter_map(|imp| {
            if let ImportKind::Global { val_type, mutable } = &imp.kind {
                Some(ImportedGlobalDef {
                    module_name: imp.module_name.clone(),
                    name: imp.name.clone(),
                    wasm_type: WasmType::from_wasmparser(*val_type),
                    mutable: *mutable,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Parses Wasm operators from a function body.
pub(super) fn parse_function_operators(body: &[u8]) -> Result<Vec<wasmparser::Operator<'_>>> {
    let mut operators = Vec::new();
    let mut binary_reader = wasmparser::BinaryReader::new(body, 0);

    while !binary_reader.eof() {
        let op = binary_reader
            .read_operator()
            .context("failed to read operator")?;
        operators.push(op);
    }

    Ok(operators)
}

/// Translates all functions in the module to intermediate representation.
///
/// Arity and import/export resolution are not needed at this stage: the
/// tree builder records operands implicitly (stack order) and leaves
/// `type_idx`/`needs_host` zeroed for `assembly::enrich_ir_functions` to fill
/// in once canonical type indices and import counts are known.
pub(super) fn build_ir_functions(parsed: &ParsedModule) -> Result<Vec<IrFunction>> {
    use super::core::TreeBuilder;

    let mut tree_builder = TreeBuilder::new();
    let mut ir_functions = Vec::new();

    for (func_idx, func) in parsed.functions.iter().enumerate() {
        let func_type = &parsed.types[func.type_idx as usize];

        let params: Vec<WasmType> = func_type
            .params()
            .iter()
            .map(|vt| WasmType::from_wasmparser(*vt))
            .collect();

        let locals: Vec<WasmType> = func
            .locals
            .iter()
            .map(|vt| WasmType::from_wasmparser(*vt))
            .collect();

        let return_type = func_type
            .results()
            .first()
            .map(|vt| WasmType::from_wasmparser(*vt));

        let operators = parse_function_operators(&func.body)?;

        let body = tree_builder
            .translate_function(&operators)
            .with_context(|| format!("failed to build IR for function {}", func_idx))?;

        ir_functions.push(IrFunction {
            params,
            locals,
            body,
            return_type,
            type_idx: TypeIdx::new(0),
            needs_host: false,
        });
    }

    Ok(ir_functions)
}
