//! Metadata assembly - builds the final ModuleInfo from analyzed pieces.
//!
//! This module takes the results of module analysis (extracted memory, table,
//! type, and function information) and assembles them into the final `ModuleInfo`
//! structure that is passed to code generation.

use super::super::types::*;
use super::analysis::{MemoryInfo, TableInfo};
use crate::parser::{ExportKind, ImportKind, ParsedModule};
use anyhow::Result;

/// Assembles module metadata for code generation.
#[allow(clippy::too_many_arguments)]
pub(super) fn assemble_module_metadata(
    parsed: &ParsedModule,
    mem_info: &MemoryInfo,
    table_info: &TableInfo,
    canonical_type: &[usize],
    mut ir_functions: Vec<IrFunction>,
    num_imported_functions: usize,
    imported_globals: &[ImportedGlobalDef],
) -> Result<ModuleInfo> {
    let globals = build_globals(parsed);
    let data_segments = build_data_segments(parsed);
    let element_segments = build_element_segments(parsed, num_imported_functions);
    let func_exports = build_function_exports(parsed, num_imported_functions);
    let global_exports = build_global_exports(parsed, imported_globals.len());
    let memory_export_name = find_export_name(parsed, ExportKind::Memory);
    let table_export_name = find_export_name(parsed, ExportKind::Table);
    let type_signatures = build_call_indirect_signatures(parsed);
    let func_imports = build_function_imports(parsed);

    // Enrich IR functions with signature metadata (type_idx and needs_host)
    enrich_ir_functions(
        parsed,
        canonical_type,
        &mut ir_functions,
        num_imported_functions,
        imported_globals,
    );

    // Mark every block/loop/if-arm that is the target of a nested branch, so
    // codegen knows which constructs need a labelled Rust loop.
    for ir_func in &mut ir_functions {
        crate::ir::analyze_function(&mut ir_func.body)?;
    }

    Ok(ModuleInfo {
        has_memory: mem_info.has_memory,
        has_memory_import: mem_info.has_memory_import,
        max_pages: mem_info.max_pages,
        initial_pages: mem_info.initial_pages,
        table_initial: table_info.initial,
        table_max: table_info.max,
        element_segments,
        globals,
        data_segments,
        func_exports,
        global_exports,
        memory_export_name,
        table_export_name,
        type_signatures,
        canonical_type: canonical_type.to_vec(),
        func_imports,
        imported_globals: imported_globals.to_vec(),
        ir_functions,
    })
}

/// Builds global variable definitions.
fn build_globals(parsed: &ParsedModule) -> Vec<GlobalDef> {
    parsed
        .globals
        .iter()
        .map(|g| {
            let init_value = match g.init_value {
                crate::parser::InitValue::I32(v) => GlobalInit::I32(v),
                crate::parser::InitValue::I64(v) => GlobalInit::I64(v),
                crate::parser::InitValue::F32(v) => GlobalInit::F32(v),
                crate::parser::InitValue::F64(v) => GlobalInit::F64(v),
            };
            GlobalDef {
                mutable: g.mutable,
                init_value,
            }
        })
        .collect()
}

/// Builds data segment definitions.
fn build_data_segments(parsed: &ParsedModule) -> Vec<DataSegmentDef> {
    parsed
        .data_segments
        .iter()
        .map(|ds| DataSegmentDef {
            offset: ds.offset,
            data: ds.data.clone(),
        })
        .collect()
}

/// Builds element segment (table initialization) definitions.
///
/// `func_indices` are encoded in the Wasm binary in the global function index
/// space (imports first); `ElementSegmentDef::func_indices` expects the local
/// index space, so imports are subtracted here.
fn build_element_segments(
    parsed: &ParsedModule,
    num_imported_functions: usize,
) -> Vec<ElementSegmentDef> {
    parsed
        .element_segments
        .iter()
        .map(|es| ElementSegmentDef {
            offset: es.offset as usize,
            func_indices: es
                .func_indices
                .iter()
                .map(|idx| LocalFuncIdx::new(*idx as usize - num_imported_functions))
                .collect(),
        })
        .collect()
}

/// Builds exported function definitions.
///
/// Export indices use global numbering (imports + locals). We filter to local
/// functions and offset to local function index space for codegen (func_0, func_1, ...).
fn build_function_exports(parsed: &ParsedModule, num_imported_functions: usize) -> Vec<FuncExport> {
    parsed
        .exports
        .iter()
        .filter(|e| e.kind == ExportKind::Func && (e.index as usize) >= num_imported_functions)
        .map(|e| FuncExport {
            name: e.name.clone(),
            func_index: LocalFuncIdx::new((e.index as usize) - num_imported_functions),
        })
        .collect()
}

/// Builds exported global definitions.
///
/// Export indices use global numbering (imports + locals); imported globals
/// are never mutated from generated code's global-export surface, so only
/// locally-declared globals are exposed, offset to local index space.
fn build_global_exports(parsed: &ParsedModule, num_imported_globals: usize) -> Vec<GlobalExport> {
    parsed
        .exports
        .iter()
        .filter(|e| e.kind == ExportKind::Global && (e.index as usize) >= num_imported_globals)
        .map(|e| GlobalExport {
            name: e.name.clone(),
            global_index: LocalGlobalIdx::new((e.index as usize) - num_imported_globals),
        })
        .collect()
}

/// Finds the export name for the single memory/table of the given kind, if exported.
/// MVP modules declare at most one memory and one table, so the first match suffices.
fn find_export_name(parsed: &ParsedModule, kind: ExportKind) -> Option<String> {
    parsed
        .exports
        .iter()
        .find(|e| e.kind == kind)
        .map(|e| e.name.clone())
}

/// Enriches IR functions with signature metadata (type_idx and needs_host).
///
/// This iterates through the parsed functions and sets the type_idx and needs_host
/// fields in the corresponding IR functions.
fn enrich_ir_functions(
    parsed: &ParsedModule,
    canonical_type: &[usize],
    ir_functions: &mut [IrFunction],
    num_imported_functions: usize,
    imported_globals: &[ImportedGlobalDef],
) {
    let num_imported_globals = imported_globals.len();
    for (func_idx, func) in parsed.functions.iter().enumerate() {
        if let Some(ir_func) = ir_functions.get_mut(func_idx) {
            ir_func.type_idx = TypeIdx::new(canonical_type[func.type_idx as usize]);
            ir_func.needs_host =
                function_calls_imports(ir_func, num_imported_functions, num_imported_globals);
        }
    }
}

/// Determines if a function calls imports or accesses imported globals.
fn function_calls_imports(
    ir_func: &IrFunction,
    num_imported_functions: usize,
    num_imported_globals: usize,
) -> bool {
    has_import_calls(ir_func, num_imported_functions)
        || has_global_import_access(ir_func, num_imported_globals)
}

/// Builds type signatures for call_indirect type checking.
fn build_call_indirect_signatures(parsed: &ParsedModule) -> Vec<FuncSignature> {
    parsed
        .types
        .iter()
        .map(|ty| {
            let params = ty
                .params()
                .iter()
                .map(|vt| WasmType::from_wasmparser(*vt))
                .collect();
            let return_type = ty
                .results()
                .first()
                .map(|vt| WasmType::from_wasmparser(*vt));
            FuncSignature {
                params,
                return_type,
                type_idx: TypeIdx::new(0),
                needs_host: false,
            }
        })
        .collect()
}

/// Builds function import trait definitions.
fn build_function_imports(parsed: &ParsedModule) -> Vec<FuncImport> {
    parsed
        .imports
        .iter()
        .filter_map(|imp| match &imp.kind {
            ImportKind::Function(type_idx) => {
                let func_type = &parsed.types[*type_idx as usize];
                let params = func_type
                    .params()
                    .iter()
                    .map(|vt| WasmType::from_wasmparser(*vt))
                    .collect();
                let return_type = func_type
                    .results()
                    .first()
                    .map(|vt| WasmType::from_wasmparser(*vt));
                Some(FuncImport {
                    module_name: imp.module_name.clone(),
                    func_name: imp.name.clone(),
                    params,
                    return_type,
                })
            }
            _ => None,
        })
        .collect()
}
