//! Pattern binding (spec §4.5: "attempt to unify pattern with subject,
//! extending a trial environment"). The pattern compiler in `kira_patterns`
//! only advises on exhaustiveness; this linear, structural match is what
//! actually executes at runtime.

use kira_ir::ast::{LiteralPat, PatternKind};
use kira_ir::{Arena, ExprId, Name, PatternId, StringInterner};

use crate::value::Value;

/// The bindings a successful match would introduce, plus an optional
/// guard expression the caller must still evaluate before committing to
/// this arm.
pub struct MatchOutcome {
    pub bindings: Vec<(Name, Value, bool)>,
    pub guard: Option<ExprId>,
}

/// Try to unify `pattern` against `value` without mutating any
/// environment. Returns `None` on a structural mismatch; on success,
/// returns every `(name, value, is_var)` the pattern would bind — callers
/// apply these to a fresh trial scope themselves, and separately evaluate
/// `guard` if present before committing.
pub fn try_match(arena: &Arena, interner: &StringInterner, pattern: PatternId, value: &Value) -> Option<MatchOutcome> {
    let mut bindings = Vec::new();
    let guard = collect(arena, interner, pattern, value, &mut bindings)?;
    Some(MatchOutcome { bindings, guard })
}

fn collect(
    arena: &Arena,
    interner: &StringInterner,
    pattern: PatternId,
    value: &Value,
    bindings: &mut Vec<(Name, Value, bool)>,
) -> Option<Option<ExprId>> {
    match &arena.pattern(pattern).kind {
        PatternKind::Wildcard | PatternKind::Rest => Some(None),
        PatternKind::Identifier { name, is_var } => {
            bindings.push((*name, value.clone(), *is_var));
            Some(None)
        }
        PatternKind::Literal(lit) => {
            if literal_matches(lit, value, interner) {
                Some(None)
            } else {
                None
            }
        }
        PatternKind::Range { lo, hi, inclusive } => {
            if range_matches(lo, hi, *inclusive, value) {
                Some(None)
            } else {
                None
            }
        }
        PatternKind::Constructor { name, args } => {
            let Value::Variant(data) = value else { return None };
            if data.name != *name {
                return None;
            }
            match args {
                None => (data.args.is_empty()).then_some(None),
                Some(range) => {
                    let sub_patterns = arena.pattern_list(*range);
                    if sub_patterns.len() != data.args.len() {
                        return None;
                    }
                    for (&sub_pattern, sub_value) in sub_patterns.iter().zip(data.args.iter()) {
                        collect(arena, interner, sub_pattern, sub_value, bindings)?;
                    }
                    Some(None)
                }
            }
        }
        PatternKind::Record { fields, .. } => {
            let Value::Record(data) = value else { return None };
            let data = data.borrow();
            for (field_name, sub_pattern) in fields {
                let field_value = data.get(*field_name)?;
                collect(arena, interner, *sub_pattern, field_value, bindings)?;
            }
            Some(None)
        }
        PatternKind::Tuple(range) => {
            let Value::Tuple(items) = value else { return None };
            let sub_patterns = arena.pattern_list(*range);
            bind_sequence(arena, interner, sub_patterns, items, bindings)
        }
        PatternKind::Or(range) => {
            for &alt in arena.pattern_list(*range) {
                let mut trial = Vec::new();
                if let Some(guard) = collect(arena, interner, alt, value, &mut trial) {
                    bindings.extend(trial);
                    return Some(guard);
                }
            }
            None
        }
        PatternKind::Guarded { pattern, guard } => {
            let result = collect(arena, interner, *pattern, value, bindings)?;
            debug_assert!(result.is_none(), "nested guards are not produced by the parser");
            Some(Some(*guard))
        }
        PatternKind::Typed { pattern, .. } => collect(arena, interner, *pattern, value, bindings),
    }
}

/// Bind a flat list of sub-patterns against a slice of values, honoring at
/// most one `..` rest marker: patterns before it bind the front of the
/// slice, patterns after it bind the back, and the rest is skipped.
fn bind_sequence(
    arena: &Arena,
    interner: &StringInterner,
    patterns: &[PatternId],
    values: &[Value],
    bindings: &mut Vec<(Name, Value, bool)>,
) -> Option<Option<ExprId>> {
    let rest_pos = patterns.iter().position(|&p| matches!(arena.pattern(p).kind, PatternKind::Rest));
    match rest_pos {
        None => {
            if patterns.len() != values.len() {
                return None;
            }
            for (&p, v) in patterns.iter().zip(values.iter()) {
                collect(arena, interner, p, v, bindings)?;
            }
            Some(None)
        }
        Some(pos) => {
            let after_len = patterns.len() - pos - 1;
            if values.len() < pos + after_len {
                return None;
            }
            for (&p, v) in patterns[..pos].iter().zip(values.iter()) {
                collect(arena, interner, p, v, bindings)?;
            }
            let tail_start = values.len() - after_len;
            for (&p, v) in patterns[pos + 1..].iter().zip(values[tail_start..].iter()) {
                collect(arena, interner, p, v, bindings)?;
            }
            Some(None)
        }
    }
}

fn literal_matches(lit: &LiteralPat, value: &Value, interner: &StringInterner) -> bool {
    match (lit, value) {
        (LiteralPat::Int(n), Value::Int(i)) => *n == i.value(),
        (LiteralPat::Float(bits), Value::Float(f)) => f64::from_bits(*bits) == *f,
        (LiteralPat::Str(name), Value::Str(s)) => interner.resolve(*name) == s.as_ref(),
        (LiteralPat::Char(c), Value::Char(v)) => c == v,
        (LiteralPat::Bool(b), Value::Bool(v)) => b == v,
        _ => false,
    }
}

fn range_matches(lo: &LiteralPat, hi: &LiteralPat, inclusive: bool, value: &Value) -> bool {
    match (lo, hi, value) {
        (LiteralPat::Int(lo), LiteralPat::Int(hi), Value::Int(i)) => {
            let v = i.value();
            v >= *lo && if inclusive { v <= *hi } else { v < *hi }
        }
        (LiteralPat::Char(lo), LiteralPat::Char(hi), Value::Char(v)) => {
            v >= lo && if inclusive { v <= hi } else { v < hi }
        }
        _ => false,
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests use expect for clarity")]
mod tests {
    use super::*;
    use kira_ir::ast::{IntWidth, Pattern, PatternKind};
    use kira_ir::{Arena, Span};
    use pretty_assertions::assert_eq;

    use crate::value::KiraInt;

    fn pat(arena: &mut Arena, kind: PatternKind) -> PatternId {
        arena.alloc_pattern(Pattern { kind, span: Span::DUMMY })
    }

    #[test]
    fn wildcard_matches_anything_without_binding() {
        let interner = StringInterner::new();
        let mut arena = Arena::new();
        let p = pat(&mut arena, PatternKind::Wildcard);
        let outcome = try_match(&arena, &interner, p, &Value::Bool(true)).expect("matches");
        assert!(outcome.bindings.is_empty());
        assert!(outcome.guard.is_none());
    }

    #[test]
    fn identifier_pattern_binds_the_whole_value() {
        let mut interner = StringInterner::new();
        let name = interner.intern("x");
        let mut arena = Arena::new();
        let p = pat(&mut arena, PatternKind::Identifier { name, is_var: false });
        let outcome = try_match(&arena, &interner, p, &Value::Bool(true)).expect("matches");
        assert_eq!(outcome.bindings.len(), 1);
        assert_eq!(outcome.bindings[0].0, name);
    }

    #[test]
    fn constructor_pattern_destructures_variant_args() {
        let mut interner = StringInterner::new();
        let some = interner.intern("Some");
        let x = interner.intern("x");
        let mut arena = Arena::new();
        let inner = pat(&mut arena, PatternKind::Identifier { name: x, is_var: false });
        let args = arena.alloc_pattern_list([inner]);
        let p = pat(&mut arena, PatternKind::Constructor { name: some, args: Some(args) });

        let value = Value::variant(some, vec![Value::Bool(true)]);
        let outcome = try_match(&arena, &interner, p, &value).expect("matches");
        assert_eq!(outcome.bindings, vec![(x, Value::Bool(true), false)]);
    }

    #[test]
    fn constructor_pattern_with_wrong_variant_name_fails() {
        let mut interner = StringInterner::new();
        let some = interner.intern("Some");
        let none = interner.intern("None");
        let mut arena = Arena::new();
        let p = pat(&mut arena, PatternKind::Constructor { name: none, args: None });
        let value = Value::variant(some, vec![Value::Unit]);
        assert!(try_match(&arena, &interner, p, &value).is_none());
    }

    #[test]
    fn tuple_pattern_with_rest_binds_front_and_back() {
        let mut interner = StringInterner::new();
        let head = interner.intern("head");
        let tail = interner.intern("tail");
        let mut arena = Arena::new();
        let head_pat = pat(&mut arena, PatternKind::Identifier { name: head, is_var: false });
        let rest_pat = pat(&mut arena, PatternKind::Rest);
        let tail_pat = pat(&mut arena, PatternKind::Identifier { name: tail, is_var: false });
        let list = arena.alloc_pattern_list([head_pat, rest_pat, tail_pat]);
        let p = pat(&mut arena, PatternKind::Tuple(list));

        let value = Value::tuple(vec![Value::Bool(true), Value::Unit, Value::Unit, Value::Bool(false)]);
        let outcome = try_match(&arena, &interner, p, &value).expect("matches");
        assert_eq!(outcome.bindings[0], (head, Value::Bool(true), false));
        assert_eq!(outcome.bindings[1], (tail, Value::Bool(false), false));
    }

    #[test]
    fn range_pattern_matches_inclusive_bounds() {
        let interner = StringInterner::new();
        let mut arena = Arena::new();
        let p = pat(
            &mut arena,
            PatternKind::Range { lo: LiteralPat::Int(1), hi: LiteralPat::Int(3), inclusive: true },
        );
        assert!(try_match(&arena, &interner, p, &Value::Int(KiraInt::new(3, IntWidth::I32))).is_some());
        assert!(try_match(&arena, &interner, p, &Value::Int(KiraInt::new(4, IntWidth::I32))).is_none());
    }
}
