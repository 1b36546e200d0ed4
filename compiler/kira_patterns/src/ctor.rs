//! Structural pattern shapes (constructors), lowered from `kira_ir` AST
//! patterns, and the finite-constructor-set enumeration (spec §4.3/§4.4)
//! that drives matrix specialization.

use rustc_hash::FxHashMap;

use kira_ir::ast::{LiteralPat, Pattern, PatternKind};
use kira_ir::{Arena, Name, PatternId};
use kira_symbols::{SymbolTable, Type, TypeDefKind, VariantFieldsInfo};

/// A handful of well-known variant names the checker needs to recognize
/// structurally (`Option`/`Result` are resolved types, not user sum types,
/// so their variant names live here rather than in a symbol's variant list).
#[derive(Clone, Copy)]
pub struct WellKnownNames {
    pub some: Name,
    pub none: Name,
    pub ok: Name,
    pub err: Name,
}

impl WellKnownNames {
    pub fn intern(interner: &mut kira_ir::StringInterner) -> Self {
        WellKnownNames {
            some: interner.intern("Some"),
            none: interner.intern("None"),
            ok: interner.intern("Ok"),
            err: interner.intern("Err"),
        }
    }
}

/// A pattern shape with source spans and guards stripped, ready for matrix
/// specialization. `Or` is not a variant here: it is expanded into multiple
/// rows before the algorithm ever sees a matrix (see [`crate::expand_rows`]).
#[derive(Clone, Debug, PartialEq)]
pub enum CtorPat {
    Wildcard,
    Bool(bool),
    Int(i128),
    Float(u64),
    Str(Name),
    Char(char),
    Range { lo: i128, hi: i128, inclusive: bool },
    Variant { name: Name, fields: Vec<CtorPat> },
    Tuple(Vec<CtorPat>),
    Record { fields: Vec<(Name, CtorPat)> },
}

impl CtorPat {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, CtorPat::Wildcard)
    }
}

/// Lower a single pattern into its alternative structural shapes (more than
/// one only when an `Or` pattern is nested somewhere inside it).
pub fn lower(arena: &Arena, id: PatternId) -> Vec<CtorPat> {
    let pat = arena.pattern(id);
    lower_kind(arena, pat)
}

fn lower_kind(arena: &Arena, pat: &Pattern) -> Vec<CtorPat> {
    match &pat.kind {
        PatternKind::Wildcard | PatternKind::Identifier { .. } | PatternKind::Rest => {
            vec![CtorPat::Wildcard]
        }
        PatternKind::Literal(lit) => vec![match lit {
            LiteralPat::Int(v) => CtorPat::Int(*v),
            LiteralPat::Float(bits) => CtorPat::Float(*bits),
            LiteralPat::Str(name) => CtorPat::Str(*name),
            LiteralPat::Char(c) => CtorPat::Char(*c),
            LiteralPat::Bool(b) => CtorPat::Bool(*b),
        }],
        PatternKind::Range { lo, hi, inclusive } => vec![CtorPat::Range {
            lo: literal_to_i128(lo),
            hi: literal_to_i128(hi),
            inclusive: *inclusive,
        }],
        PatternKind::Constructor { name, args } => {
            let arg_alts: Vec<Vec<CtorPat>> = match args {
                Some(range) => arena
                    .pattern_list(*range)
                    .iter()
                    .map(|&id| lower(arena, id))
                    .collect(),
                None => Vec::new(),
            };
            cartesian(arg_alts)
                .into_iter()
                .map(|fields| CtorPat::Variant { name: *name, fields })
                .collect()
        }
        PatternKind::Tuple(range) => {
            let alts: Vec<Vec<CtorPat>> = arena
                .pattern_list(*range)
                .iter()
                .map(|&id| lower(arena, id))
                .collect();
            cartesian(alts).into_iter().map(CtorPat::Tuple).collect()
        }
        PatternKind::Record { fields, .. } => {
            let names: Vec<Name> = fields.iter().map(|(name, _)| *name).collect();
            let alts: Vec<Vec<CtorPat>> = fields.iter().map(|(_, id)| lower(arena, *id)).collect();
            cartesian(alts)
                .into_iter()
                .map(|values| CtorPat::Record {
                    fields: names.iter().copied().zip(values).collect(),
                })
                .collect()
        }
        PatternKind::Or(range) => arena
            .pattern_list(*range)
            .iter()
            .flat_map(|&id| lower(arena, id))
            .collect(),
        PatternKind::Guarded { pattern, .. } => lower(arena, *pattern),
        PatternKind::Typed { pattern, .. } => lower(arena, *pattern),
    }
}

/// Range pattern bounds are restricted by the grammar to int or char
/// literals (spec §3); both fit in `i128` for comparison purposes.
fn literal_to_i128(lit: &LiteralPat) -> i128 {
    match lit {
        LiteralPat::Int(v) => *v,
        LiteralPat::Char(c) => i128::from(*c as u32),
        _ => 0,
    }
}

fn cartesian(columns: Vec<Vec<CtorPat>>) -> Vec<Vec<CtorPat>> {
    let mut rows: Vec<Vec<CtorPat>> = vec![Vec::new()];
    for column in columns {
        let mut next = Vec::with_capacity(rows.len() * column.len().max(1));
        for row in &rows {
            for alt in &column {
                let mut r = row.clone();
                r.push(alt.clone());
                next.push(r);
            }
        }
        rows = next;
    }
    rows
}

/// Whether the top-level pattern is `Guarded` (a guard only ever appears at
/// the outermost position of a match arm's pattern in this language).
pub fn is_guarded(arena: &Arena, id: PatternId) -> bool {
    matches!(arena.pattern(id).kind, PatternKind::Guarded { .. })
}

#[derive(Clone, Debug)]
pub enum CtorKind {
    Bool(bool),
    Variant(Name),
    Tuple,
    Record(Vec<Name>),
}

#[derive(Clone, Debug)]
pub struct CtorInfo {
    pub kind: CtorKind,
    pub field_types: Vec<Type>,
}

pub fn ctor_matches(pat: &CtorPat, info: &CtorInfo) -> bool {
    match (pat, &info.kind) {
        (CtorPat::Bool(a), CtorKind::Bool(b)) => a == b,
        (CtorPat::Variant { name, .. }, CtorKind::Variant(n)) => name == n,
        (CtorPat::Tuple(_), CtorKind::Tuple) => true,
        (CtorPat::Record { .. }, CtorKind::Record(_)) => true,
        _ => false,
    }
}

/// Sub-patterns for a concrete (non-wildcard) pattern, in the declared
/// field order given by `info`.
pub fn sub_patterns(pat: &CtorPat, info: &CtorInfo) -> Vec<CtorPat> {
    match pat {
        CtorPat::Variant { fields, .. } => fields.clone(),
        CtorPat::Tuple(items) => items.clone(),
        CtorPat::Record { fields } => match &info.kind {
            CtorKind::Record(names) => names
                .iter()
                .map(|n| {
                    fields
                        .iter()
                        .find(|(fname, _)| fname == n)
                        .map(|(_, p)| p.clone())
                        .unwrap_or(CtorPat::Wildcard)
                })
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Rebuild a concrete pattern of the given shape from its (possibly
/// recursively rewritten) sub-patterns, for constructing missing-pattern
/// witnesses.
pub fn rebuild(info: &CtorInfo, fields: Vec<CtorPat>) -> CtorPat {
    match &info.kind {
        CtorKind::Bool(b) => CtorPat::Bool(*b),
        CtorKind::Variant(name) => CtorPat::Variant { name: *name, fields },
        CtorKind::Tuple => CtorPat::Tuple(fields),
        CtorKind::Record(names) => CtorPat::Record {
            fields: names.iter().copied().zip(fields).collect(),
        },
    }
}

/// The finite set of constructors inhabiting `ty`, or `None` if the domain
/// is infinite (or opaque — arrays, functions, etc., which have no pattern
/// syntax to destructure them in this language).
pub fn finite_ctors(ty: &Type, symbols: &SymbolTable, well_known: WellKnownNames) -> Option<Vec<CtorInfo>> {
    match ty {
        Type::Primitive(kira_ir::ast::PrimitiveType::Bool) => Some(vec![
            CtorInfo {
                kind: CtorKind::Bool(true),
                field_types: Vec::new(),
            },
            CtorInfo {
                kind: CtorKind::Bool(false),
                field_types: Vec::new(),
            },
        ]),
        Type::Option(inner) => Some(vec![
            CtorInfo {
                kind: CtorKind::Variant(well_known.none),
                field_types: Vec::new(),
            },
            CtorInfo {
                kind: CtorKind::Variant(well_known.some),
                field_types: vec![(**inner).clone()],
            },
        ]),
        Type::Result { ok, err } => Some(vec![
            CtorInfo {
                kind: CtorKind::Variant(well_known.ok),
                field_types: vec![(**ok).clone()],
            },
            CtorInfo {
                kind: CtorKind::Variant(well_known.err),
                field_types: vec![(**err).clone()],
            },
        ]),
        Type::Tuple(items) => Some(vec![CtorInfo {
            kind: CtorKind::Tuple,
            field_types: items.clone(),
        }]),
        Type::Named(sym) => sum_ctors(*sym, &[], symbols),
        Type::Instantiated { base, args } => sum_ctors(*base, args, symbols),
        _ => None,
    }
}

fn sum_ctors(sym: kira_symbols::SymbolId, args: &[Type], symbols: &SymbolTable) -> Option<Vec<CtorInfo>> {
    let symbol = symbols.symbol(sym);
    let kira_symbols::SymbolKind::TypeDef { generics, kind } = &symbol.kind else {
        return None;
    };
    let TypeDefKind::Sum(variants) = kind else {
        return None;
    };
    let substitution: FxHashMap<Name, Type> = generics
        .iter()
        .map(|g| g.name)
        .zip(args.iter().cloned())
        .collect();
    Some(
        variants
            .iter()
            .map(|variant| {
                let field_types = match &variant.fields {
                    VariantFieldsInfo::Unit => Vec::new(),
                    VariantFieldsInfo::Positional(tys) => {
                        tys.iter().map(|t| substitute(t, &substitution)).collect()
                    }
                    VariantFieldsInfo::Record(fields) => {
                        fields.iter().map(|(_, t)| substitute(t, &substitution)).collect()
                    }
                };
                CtorInfo {
                    kind: CtorKind::Variant(variant.name),
                    field_types,
                }
            })
            .collect(),
    )
}

fn substitute(ty: &Type, subst: &FxHashMap<Name, Type>) -> Type {
    match ty {
        Type::Var(name) => subst.get(name).cloned().unwrap_or_else(|| ty.clone()),
        Type::Instantiated { base, args } => Type::Instantiated {
            base: *base,
            args: args.iter().map(|a| substitute(a, subst)).collect(),
        },
        Type::Function { params, ret, effect } => Type::Function {
            params: params.iter().map(|p| substitute(p, subst)).collect(),
            ret: Box::new(substitute(ret, subst)),
            effect: *effect,
        },
        Type::Tuple(items) => Type::Tuple(items.iter().map(|t| substitute(t, subst)).collect()),
        Type::Array { elem, size } => Type::Array {
            elem: Box::new(substitute(elem, subst)),
            size: *size,
        },
        Type::Io(inner) => Type::Io(Box::new(substitute(inner, subst))),
        Type::Result { ok, err } => Type::Result {
            ok: Box::new(substitute(ok, subst)),
            err: Box::new(substitute(err, subst)),
        },
        Type::Option(inner) => Type::Option(Box::new(substitute(inner, subst))),
        _ => ty.clone(),
    }
}
