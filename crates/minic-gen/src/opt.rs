//! Peephole optimization over TAC.
//!
//! A bounded fixed point: passes repeat until one makes no change, capped
//! at five. Each pass applies three rewrites:
//!
//! - constant folding: `ADD`/`SUB`/`MUL` with two numeric literal operands
//!   becomes an `ASSIGN` of the folded value;
//! - algebraic identities: `x + 0`, `x * 1` become `ASSIGN x`; `x * 0`
//!   becomes `ASSIGN 0`;
//! - dead stores: of two consecutive `ASSIGN`s into the same place, the
//!   earlier one is dropped (unless the later one reads the place); and a
//!   value staged through a temporary that is immediately copied out and
//!   never read again (`ASSIGN v -> tN; ASSIGN tN -> x`) collapses into a
//!   single `ASSIGN v -> x`.
//!
//! The result is a new sequence; the input is never mutated. Instruction
//! numbers are rewritten afterwards.

use crate::tac::{renumber, Instr, Op};

/// Maximum number of rewrite passes.
pub const MAX_PASSES: u32 = 5;

/// Optimizes `instrs`, returning the new sequence and the number of passes
/// executed (the final, no-change pass included).
pub fn optimize(instrs: &[Instr]) -> (Vec<Instr>, u32) {
    let mut current = instrs.to_vec();
    let mut passes = 0;

    while passes < MAX_PASSES {
        let next = run_pass(&current);
        passes += 1;
        let changed = next != current;
        current = next;
        if !changed {
            break;
        }
    }

    renumber(&mut current);
    (current, passes)
}

fn run_pass(instrs: &[Instr]) -> Vec<Instr> {
    let rewritten: Vec<Instr> = instrs.iter().map(rewrite).collect();
    let collapsed = collapse_temp_copies(rewritten);
    drop_dead_stores(collapsed)
}

/// Constant folding and algebraic identities for a single instruction.
fn rewrite(instr: &Instr) -> Instr {
    let (Some(arg1), Some(arg2)) = (instr.arg1.as_deref(), instr.arg2.as_deref()) else {
        return instr.clone();
    };

    match instr.op {
        Op::Add | Op::Sub | Op::Mul => {
            if let (Some(a), Some(b)) = (parse_number(arg1), parse_number(arg2)) {
                let folded = match instr.op {
                    Op::Add => a + b,
                    Op::Sub => a - b,
                    _ => a * b,
                };
                return assign(format_number(folded), instr);
            }
        }
        _ => return instr.clone(),
    }

    match instr.op {
        Op::Add => {
            if is_zero(arg2) {
                return assign(arg1.to_string(), instr);
            }
            if is_zero(arg1) {
                return assign(arg2.to_string(), instr);
            }
        }
        Op::Mul => {
            if is_one(arg2) {
                return assign(arg1.to_string(), instr);
            }
            if is_one(arg1) {
                return assign(arg2.to_string(), instr);
            }
            if is_zero(arg1) || is_zero(arg2) {
                return assign("0".to_string(), instr);
            }
        }
        _ => {}
    }

    instr.clone()
}

/// Drops the earlier of two consecutive assignments into the same place.
fn drop_dead_stores(instrs: Vec<Instr>) -> Vec<Instr> {
    let mut out: Vec<Instr> = Vec::with_capacity(instrs.len());
    for instr in instrs {
        if let Some(previous) = out.last() {
            let dead = previous.op == Op::Assign
                && instr.op == Op::Assign
                && previous.result.is_some()
                && previous.result == instr.result
                && instr.arg1 != previous.result;
            if dead {
                out.pop();
            }
        }
        out.push(instr);
    }
    out
}

/// Collapses `ASSIGN v -> tN; ASSIGN tN -> x` into `ASSIGN v -> x` when
/// `tN` is a temporary that is never read afterwards.
fn collapse_temp_copies(instrs: Vec<Instr>) -> Vec<Instr> {
    let mut out: Vec<Instr> = Vec::with_capacity(instrs.len());
    let mut index = 0;

    while index < instrs.len() {
        let instr = &instrs[index];
        if index + 1 < instrs.len() {
            let next = &instrs[index + 1];
            let staged = instr.op == Op::Assign
                && next.op == Op::Assign
                && instr.result.is_some()
                && instr.result == next.arg1
                && instr
                    .result
                    .as_deref()
                    .is_some_and(is_temp)
                && !used_after(&instrs[index + 2..], instr.result.as_deref().unwrap());
            if staged {
                let mut merged = Instr::new(
                    Op::Assign,
                    instr.arg1.clone(),
                    None,
                    next.result.clone(),
                );
                merged.line = instr.line;
                out.push(merged);
                index += 2;
                continue;
            }
        }
        out.push(instr.clone());
        index += 1;
    }
    out
}

fn is_temp(name: &str) -> bool {
    name.strip_prefix('t')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

fn used_after(rest: &[Instr], name: &str) -> bool {
    rest.iter().any(|instr| {
        instr.arg1.as_deref() == Some(name)
            || instr.arg2.as_deref() == Some(name)
            || instr.result.as_deref() == Some(name)
    })
}

fn assign(value: String, original: &Instr) -> Instr {
    let mut instr = Instr::new(Op::Assign, Some(value), None, original.result.clone());
    instr.line = original.line;
    instr
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn is_zero(text: &str) -> bool {
    parse_number(text) == Some(0.0)
}

fn is_one(text: &str) -> bool {
    parse_number(text) == Some(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: &str, b: &str, result: &str) -> Instr {
        Instr::new(Op::Add, Some(a.into()), Some(b.into()), Some(result.into()))
    }

    fn mul(a: &str, b: &str, result: &str) -> Instr {
        Instr::new(Op::Mul, Some(a.into()), Some(b.into()), Some(result.into()))
    }

    fn assign_to(value: &str, result: &str) -> Instr {
        Instr::new(Op::Assign, Some(value.into()), None, Some(result.into()))
    }

    #[test]
    fn test_constant_folding() {
        let (optimized, _) = optimize(&[add("2", "3", "t0")]);
        assert_eq!(optimized[0].op, Op::Assign);
        assert_eq!(optimized[0].arg1.as_deref(), Some("5"));
        assert_eq!(optimized[0].result.as_deref(), Some("t0"));
    }

    #[test]
    fn test_fold_sub_and_mul() {
        let (optimized, _) = optimize(&[
            Instr::new(Op::Sub, Some("10".into()), Some("4".into()), Some("t0".into())),
            mul("6", "7", "t1"),
        ]);
        assert_eq!(optimized[0].arg1.as_deref(), Some("6"));
        assert_eq!(optimized[1].arg1.as_deref(), Some("42"));
    }

    #[test]
    fn test_division_is_not_folded() {
        let (optimized, _) = optimize(&[Instr::new(
            Op::Div,
            Some("6".into()),
            Some("3".into()),
            Some("t0".into()),
        )]);
        assert_eq!(optimized[0].op, Op::Div);
    }

    #[test]
    fn test_add_zero_identity() {
        let (optimized, _) = optimize(&[add("x", "0", "t0")]);
        assert_eq!(optimized[0].op, Op::Assign);
        assert_eq!(optimized[0].arg1.as_deref(), Some("x"));

        let (optimized, _) = optimize(&[add("0", "x", "t0")]);
        assert_eq!(optimized[0].arg1.as_deref(), Some("x"));
    }

    #[test]
    fn test_mul_one_identity() {
        let (optimized, _) = optimize(&[mul("x", "1", "t0")]);
        assert_eq!(optimized[0].op, Op::Assign);
        assert_eq!(optimized[0].arg1.as_deref(), Some("x"));
    }

    #[test]
    fn test_mul_zero_identity() {
        let (optimized, _) = optimize(&[mul("x", "0", "t0")]);
        assert_eq!(optimized[0].op, Op::Assign);
        assert_eq!(optimized[0].arg1.as_deref(), Some("0"));
    }

    #[test]
    fn test_dead_store_elimination() {
        let (optimized, _) = optimize(&[assign_to("1", "x"), assign_to("2", "x")]);
        assert_eq!(optimized.len(), 1);
        assert_eq!(optimized[0].arg1.as_deref(), Some("2"));
    }

    #[test]
    fn test_self_referential_store_is_kept() {
        // x = 5; x = x; must not drop the first store.
        let (optimized, _) = optimize(&[assign_to("5", "x"), assign_to("x", "x")]);
        assert_eq!(optimized.len(), 2);
    }

    #[test]
    fn test_stores_to_different_places_kept() {
        let (optimized, _) = optimize(&[assign_to("1", "x"), assign_to("2", "y")]);
        assert_eq!(optimized.len(), 2);
    }

    #[test]
    fn test_temp_copy_collapse() {
        // DECLARE y; ADD 2 3 t0; ASSIGN t0 y folds and then collapses,
        // shrinking the sequence.
        let instrs = vec![
            Instr::new(Op::Declare, Some("y".into()), None, None),
            add("2", "3", "t0"),
            assign_to("t0", "y"),
        ];
        let (optimized, _) = optimize(&instrs);
        assert_eq!(optimized.len(), 2);
        assert_eq!(optimized[1].op, Op::Assign);
        assert_eq!(optimized[1].arg1.as_deref(), Some("5"));
        assert_eq!(optimized[1].result.as_deref(), Some("y"));
    }

    #[test]
    fn test_temp_copy_kept_when_temp_read_later() {
        let instrs = vec![
            assign_to("5", "t0"),
            assign_to("t0", "y"),
            assign_to("t0", "z"),
        ];
        let (optimized, _) = optimize(&instrs);
        assert_eq!(optimized.len(), 3);
    }

    #[test]
    fn test_named_variables_are_not_collapsed() {
        // x is a real variable, not a temp; the staging store must stay.
        let instrs = vec![assign_to("5", "x"), assign_to("x", "y")];
        let (optimized, _) = optimize(&instrs);
        assert_eq!(optimized.len(), 2);
    }

    #[test]
    fn test_monotonic() {
        let instrs = vec![
            add("2", "3", "t0"),
            assign_to("t0", "y"),
            assign_to("9", "y"),
            mul("y", "1", "t1"),
        ];
        let (optimized, _) = optimize(&instrs);
        assert!(optimized.len() <= instrs.len());
    }

    #[test]
    fn test_idempotent() {
        let instrs = vec![
            add("2", "3", "t0"),
            assign_to("t0", "x"),
            assign_to("7", "x"),
            mul("x", "1", "t1"),
            add("t1", "0", "t2"),
        ];
        let (once, _) = optimize(&instrs);
        let (twice, passes) = optimize(&once);
        assert_eq!(once, twice);
        assert_eq!(passes, 1);
    }

    #[test]
    fn test_pass_count_bounded() {
        let instrs = vec![add("1", "2", "t0"), add("t0", "0", "t1")];
        let (_, passes) = optimize(&instrs);
        assert!(passes <= MAX_PASSES);
        assert!(passes >= 1);
    }

    #[test]
    fn test_renumbered_after_optimization() {
        let (optimized, _) = optimize(&[assign_to("1", "x"), assign_to("2", "x")]);
        assert_eq!(optimized[0].line, 0);
    }

    #[test]
    fn test_labels_and_control_flow_untouched() {
        let instrs = vec![
            Instr::label("main"),
            Instr::new(Op::IfFalse, Some("t0".into()), None, Some("IF_END0".into())),
            Instr::new(Op::Goto, None, None, Some("IF_END0".into())),
            Instr::label("IF_END0"),
        ];
        let (optimized, _) = optimize(&instrs);
        assert_eq!(optimized.len(), 4);
        assert_eq!(optimized[0].label.as_deref(), Some("main"));
    }
}
