//! Match exhaustiveness and reachability checking (spec §4.4).
//!
//! This is a compile-time advisory pass only: the interpreter's linear,
//! arm-by-arm match evaluation is authoritative for binding semantics
//! (spec §4.5, §9 "pattern compilation is advisory, not mandatory at
//! runtime"). This crate exists to produce the non-exhaustive-match and
//! unreachable-pattern diagnostics.

mod ctor;
mod matrix;

pub use ctor::{is_guarded, lower, CtorInfo, CtorKind, CtorPat, WellKnownNames};
pub use matrix::MatchReport;

use kira_ir::{Arena, PatternId, StringInterner};
use kira_symbols::{SymbolTable, Type};

/// Check one match's arms (given in source order) against the scrutinee's
/// column types. `scrutinee` has one entry unless every arm pattern is
/// itself a tuple pattern of matching arity, in which case passing the
/// tuple's element types lets the algorithm reason about each position's
/// coverage independently — this is what makes scenario §8.5
/// (`(List[i32], List[i32])`) classify correctly.
pub fn analyze_match(
    arena: &Arena,
    scrutinee: &[Type],
    arm_patterns: &[PatternId],
    symbols: &SymbolTable,
    interner: &mut StringInterner,
) -> MatchReport {
    let ncols = scrutinee.len().max(1);
    let arms: Vec<(Vec<CtorPat>, bool)> = arm_patterns
        .iter()
        .map(|&id| {
            let guarded = is_guarded(arena, id);
            let alternatives = lower(arena, id).into_iter().map(|pat| to_row(pat, ncols)).collect();
            (alternatives, guarded)
        })
        .collect();
    matrix::check(&arms, scrutinee, symbols, interner)
}

fn to_row(pat: CtorPat, ncols: usize) -> Vec<CtorPat> {
    if ncols <= 1 {
        return vec![pat];
    }
    match pat {
        CtorPat::Wildcard => vec![CtorPat::Wildcard; ncols],
        CtorPat::Tuple(items) if items.len() == ncols => items,
        other => vec![other],
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests use expect for clarity")]
mod tests {
    use super::*;
    use kira_ir::ast::{Pattern, PatternKind};
    use kira_ir::Span;
    use kira_symbols::{SymbolKind, TypeDefKind, VariantFieldsInfo, VariantInfo};

    fn alloc_pattern(arena: &mut Arena, kind: PatternKind) -> PatternId {
        arena.alloc_pattern(Pattern { kind, span: Span::DUMMY })
    }

    fn list_type(symbols: &mut SymbolTable, interner: &mut StringInterner, elem: Type) -> (Type, kira_symbols::SymbolId) {
        let cons = interner.intern("Cons");
        let nil = interner.intern("Nil");
        let list_name = interner.intern("List");
        let t = interner.intern("T");
        let list_sym = symbols
            .define(kira_symbols::NewSymbol {
                name: list_name,
                kind: SymbolKind::TypeDef {
                    generics: vec![kira_symbols::GenericParamInfo { name: t, bounds: Vec::new() }],
                    kind: TypeDefKind::Sum(vec![
                        VariantInfo {
                            name: cons,
                            fields: VariantFieldsInfo::Positional(vec![Type::Var(t), Type::Var(t)]),
                        },
                        VariantInfo { name: nil, fields: VariantFieldsInfo::Unit },
                    ]),
                },
                visibility: kira_ir::ast::Visibility::Public,
                doc: None,
                span: Span::DUMMY,
            })
            .expect("fresh symbol table");
        (
            Type::Instantiated {
                base: list_sym,
                args: vec![elem],
            },
            list_sym,
        )
    }

    #[test]
    fn cons_nil_wildcard_is_exhaustive() {
        let mut arena = Arena::new();
        let mut interner = StringInterner::new();
        let mut symbols = SymbolTable::new();
        let (list_i32, _) = list_type(&mut symbols, &mut interner, Type::Primitive(kira_ir::ast::PrimitiveType::Int(kira_ir::ast::IntWidth::I32)));

        let cons_name = interner.intern("Cons");
        let nil_name = interner.intern("Nil");
        let h = alloc_pattern(&mut arena, PatternKind::Identifier { name: interner.intern("h"), is_var: false });
        let t = alloc_pattern(&mut arena, PatternKind::Identifier { name: interner.intern("t"), is_var: false });
        let args = arena.alloc_pattern_list([h, t]);
        let cons_pat = alloc_pattern(&mut arena, PatternKind::Constructor { name: cons_name, args: Some(args) });
        let nil_pat = alloc_pattern(&mut arena, PatternKind::Constructor { name: nil_name, args: None });

        let report = analyze_match(&arena, &[list_i32], &[cons_pat, nil_pat], &symbols, &mut interner);
        assert!(report.exhaustive, "missing: {:?}", report.missing);
        assert!(report.unreachable_arms.is_empty());
    }

    #[test]
    fn missing_nil_arm_is_non_exhaustive() {
        let mut arena = Arena::new();
        let mut interner = StringInterner::new();
        let mut symbols = SymbolTable::new();
        let (list_i32, _) = list_type(&mut symbols, &mut interner, Type::Primitive(kira_ir::ast::PrimitiveType::Int(kira_ir::ast::IntWidth::I32)));

        let cons_name = interner.intern("Cons");
        let h = alloc_pattern(&mut arena, PatternKind::Identifier { name: interner.intern("h"), is_var: false });
        let t = alloc_pattern(&mut arena, PatternKind::Identifier { name: interner.intern("t"), is_var: false });
        let args = arena.alloc_pattern_list([h, t]);
        let cons_pat = alloc_pattern(&mut arena, PatternKind::Constructor { name: cons_name, args: Some(args) });

        let report = analyze_match(&arena, &[list_i32], &[cons_pat], &symbols, &mut interner);
        assert!(!report.exhaustive);
        assert_eq!(report.missing.len(), 1);
    }

    #[test]
    fn trailing_wildcard_after_exhaustive_arms_is_unreachable() {
        let mut arena = Arena::new();
        let mut interner = StringInterner::new();
        let mut symbols = SymbolTable::new();
        let (list_i32, _) = list_type(&mut symbols, &mut interner, Type::Primitive(kira_ir::ast::PrimitiveType::Int(kira_ir::ast::IntWidth::I32)));

        let cons_name = interner.intern("Cons");
        let nil_name = interner.intern("Nil");
        let h = alloc_pattern(&mut arena, PatternKind::Identifier { name: interner.intern("h"), is_var: false });
        let t = alloc_pattern(&mut arena, PatternKind::Identifier { name: interner.intern("t"), is_var: false });
        let args = arena.alloc_pattern_list([h, t]);
        let cons_pat = alloc_pattern(&mut arena, PatternKind::Constructor { name: cons_name, args: Some(args) });
        let nil_pat = alloc_pattern(&mut arena, PatternKind::Constructor { name: nil_name, args: None });
        let wildcard = alloc_pattern(&mut arena, PatternKind::Wildcard);

        let report = analyze_match(&arena, &[list_i32], &[cons_pat, nil_pat, wildcard], &symbols, &mut interner);
        assert!(report.exhaustive);
        assert_eq!(report.unreachable_arms, vec![2]);
    }

    #[test]
    fn bool_needs_both_arms() {
        let mut arena = Arena::new();
        let mut interner = StringInterner::new();
        let symbols = SymbolTable::new();
        let t_pat = alloc_pattern(&mut arena, PatternKind::Literal(kira_ir::ast::LiteralPat::Bool(true)));
        let report = analyze_match(
            &arena,
            &[Type::Primitive(kira_ir::ast::PrimitiveType::Bool)],
            &[t_pat],
            &symbols,
            &mut interner,
        );
        assert!(!report.exhaustive);
    }
}
