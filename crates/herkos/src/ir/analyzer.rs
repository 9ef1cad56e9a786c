//! Branch-target analyzer.
//!
//! Marks every structured block, loop, or if-arm that is the target of at
//! least one `br`/`br_if`/`br_table` nested inside it, by appending the
//! `Instruction::BrTarget` sentinel to its body. Code generation uses the
//! sentinel to decide whether a construct needs to be wrapped in a labelled
//! Rust loop (so a branch back into it can be realized as `continue`/`break`)
//! or can be emitted as a plain lexical scope.
//!
//! Label depths are resolved exactly as Wasm encodes them: a `br n` inside
//! a body nested `depth` levels deep (the function's own top-level body is
//! depth 0) targets the construct at `depth - n`. `return` is excluded from
//! this analysis — unlike `br`, it lowers directly to a Rust `return`, which
//! already unwinds out of any number of enclosing loops/scopes on its own.

use super::types::{Expression, Instruction};
use anyhow::Result;

/// Runs branch-target analysis over a complete function body, marking the
/// body itself if a `br` anywhere inside it targets the function's own
/// implicit outermost label (equivalent to `return`).
pub fn analyze_function(body: &mut Expression) -> Result<()> {
    let targets = analyze_expr(0, body)?;
    if targets.contains(&0) {
        mark(body);
    }
    Ok(())
}

/// Appends the `BrTarget` sentinel unless it's already present.
fn mark(body: &mut Expression) {
    if !matches!(body.last(), Some(Instruction::BrTarget)) {
        body.push(Instruction::BrTarget);
    }
}

/// Analyzes `expr`, nested `depth` levels deep, marking any child block/loop/if
/// that is itself targeted by a nested branch. Returns the branch target
/// depths that are not resolved within `expr` (i.e. that target an ancestor).
fn analyze_expr(depth: u32, expr: &mut Expression) -> Result<Vec<u32>> {
    let mut own = Vec::new();

    for instr in expr.iter_mut() {
        match instr {
            Instruction::Block(args) | Instruction::Loop(args) => {
                let sub = analyze_expr(depth + 1, &mut args.body)?;
                bubble(depth + 1, sub, &mut args.body, &mut own);
            }
            Instruction::If(args) => {
                let mut sub = analyze_expr(depth + 1, &mut args.then_branch)?;
                sub.extend(analyze_expr(depth + 1, &mut args.else_branch)?);
                bubble(depth + 1, sub, &mut args.then_branch, &mut own);
            }
            Instruction::Br(n) | Instruction::BrIf(n) => {
                own.push(resolve(depth, *n)?);
            }
            Instruction::BrTable(args) => {
                for label in &args.labels {
                    own.push(resolve(depth, *label)?);
                }
                own.push(resolve(depth, args.default)?);
            }
            _ => {}
        }
    }

    Ok(own)
}

/// Resolves a relative branch label at nesting `depth` to an absolute depth.
fn resolve(depth: u32, label: u32) -> Result<u32> {
    depth
        .checked_sub(label)
        .ok_or_else(|| anyhow::anyhow!("branch label {label} exceeds nesting depth {depth}"))
}

/// Filters `targets` from a nested scope: any target equal to `self_depth`
/// marks the nested body itself as a branch target; the rest bubble up to
/// the caller's `own` list.
fn bubble(self_depth: u32, targets: Vec<u32>, body: &mut Expression, own: &mut Vec<u32>) {
    let mut marks_self = false;
    for t in targets {
        if t == self_depth {
            marks_self = true;
        } else {
            own.push(t);
        }
    }
    if marks_self {
        mark(body);
    }
}
