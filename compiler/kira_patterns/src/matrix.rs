//! The matrix-specialization exhaustiveness/reachability algorithm
//! (spec §4.4): maintain a matrix of patterns, specialize column-by-column
//! by each constructor in the scrutinee type's finite set plus a default
//! (wildcard) column, and recurse.

use kira_ir::StringInterner;
use kira_symbols::SymbolTable;

use crate::ctor::{ctor_matches, finite_ctors, rebuild, sub_patterns, CtorInfo, CtorPat, WellKnownNames};

type Row = Vec<CtorPat>;

/// `Some(witness)` if `query` matches some value not matched by any row of
/// `matrix` (i.e. `query` is useful added to `matrix`); `None` if `matrix`
/// already covers everything `query` would.
fn is_useful(
    matrix: &[Row],
    query: &[CtorPat],
    col_types: &[kira_symbols::Type],
    symbols: &SymbolTable,
    well_known: WellKnownNames,
) -> Option<Row> {
    let Some((head, rest_query)) = query.split_first() else {
        return if matrix.is_empty() { Some(Vec::new()) } else { None };
    };
    let rest_types = &col_types[1..];

    if !head.is_wildcard() {
        if is_literal(head) {
            // Infinite-domain literal (int/float/string/char) or a range:
            // zero-arity, matched by exact value equality. A wildcard row
            // still covers it (the default specialization).
            let specialized_matrix: Vec<Row> = matrix
                .iter()
                .filter_map(|row| {
                    let (row_head, row_rest) = row.split_first()?;
                    (row_head.is_wildcard() || row_head == head).then(|| row_rest.to_vec())
                })
                .collect();
            return is_useful(&specialized_matrix, rest_query, rest_types, symbols, well_known).map(|mut w| {
                w.insert(0, head.clone());
                w
            });
        }
        let ctors = finite_ctors(&col_types[0], symbols, well_known);
        let info = ctors.into_iter().flatten().find(|c| ctor_matches(head, c))?;
        return specialize_one(matrix, head, &info, rest_query, rest_types, symbols, well_known);
    }

    match finite_ctors(&col_types[0], symbols, well_known) {
        Some(ctors) if !ctors.is_empty() => {
            for info in &ctors {
                let arity = info.field_types.len();
                let wildcard_head = CtorPat::Wildcard;
                if let Some(witness) =
                    specialize_one(matrix, &wildcard_head, info, rest_query, rest_types, symbols, well_known)
                {
                    let (ctor_part, tail) = witness.split_at(arity);
                    let mut result = vec![rebuild(info, ctor_part.to_vec())];
                    result.extend_from_slice(tail);
                    return Some(result);
                }
            }
            None
        }
        _ => {
            let default_matrix: Vec<Row> = matrix
                .iter()
                .filter_map(|row| {
                    row.split_first()
                        .filter(|(h, _)| h.is_wildcard())
                        .map(|(_, rest)| rest.to_vec())
                })
                .collect();
            is_useful(&default_matrix, rest_query, rest_types, symbols, well_known).map(|mut w| {
                w.insert(0, CtorPat::Wildcard);
                w
            })
        }
    }
}

/// Specialize `matrix` and `query`'s head by `info` (the constructor the
/// caller already identified `head` as, or is probing), recurse, and
/// un-specialize the witness back into `info`'s shape.
fn specialize_one(
    matrix: &[Row],
    head: &CtorPat,
    info: &CtorInfo,
    rest_query: &[CtorPat],
    rest_types: &[kira_symbols::Type],
    symbols: &SymbolTable,
    well_known: WellKnownNames,
) -> Option<Row> {
    let arity = info.field_types.len();
    let specialized_matrix: Vec<Row> = matrix
        .iter()
        .filter_map(|row| {
            let (row_head, row_rest) = row.split_first()?;
            if row_head.is_wildcard() {
                let mut new_row = vec![CtorPat::Wildcard; arity];
                new_row.extend_from_slice(row_rest);
                Some(new_row)
            } else if ctor_matches(row_head, info) {
                let mut new_row = sub_patterns(row_head, info);
                new_row.extend_from_slice(row_rest);
                Some(new_row)
            } else {
                None
            }
        })
        .collect();

    let mut specialized_query = if head.is_wildcard() {
        vec![CtorPat::Wildcard; arity]
    } else {
        sub_patterns(head, info)
    };
    specialized_query.extend_from_slice(rest_query);

    let mut specialized_types = info.field_types.clone();
    specialized_types.extend_from_slice(rest_types);

    let witness = is_useful(&specialized_matrix, &specialized_query, &specialized_types, symbols, well_known)?;
    let (ctor_part, tail) = witness.split_at(arity);
    let mut result = vec![rebuild(info, ctor_part.to_vec())];
    result.extend_from_slice(tail);
    Some(result)
}

fn is_literal(pat: &CtorPat) -> bool {
    matches!(
        pat,
        CtorPat::Int(_) | CtorPat::Float(_) | CtorPat::Str(_) | CtorPat::Char(_) | CtorPat::Range { .. }
    )
}

#[derive(Debug)]
pub struct MatchReport {
    pub exhaustive: bool,
    /// Human-readable witness patterns not covered by any non-guarded arm.
    pub missing: Vec<String>,
    /// Arm indices (0-based, in source order) that no input can reach
    /// because earlier, non-guarded arms already cover every value they'd
    /// match.
    pub unreachable_arms: Vec<usize>,
}

/// Check a match's arms for exhaustiveness and reachability.
///
/// `arms` is one entry per source arm: its lowered alternatives (more than
/// one only for a top-level `Or`), whether it carries a guard, given in
/// source order. `col_types` is the scrutinee's column types (one column
/// for a plain scrutinee, or the tuple's element types when every arm is
/// itself a tuple pattern).
pub fn check(
    arms: &[(Vec<CtorPat>, bool)],
    col_types: &[kira_symbols::Type],
    symbols: &SymbolTable,
    interner: &mut StringInterner,
) -> MatchReport {
    let well_known = WellKnownNames::intern(interner);
    let mut covering_matrix: Vec<Row> = Vec::new();
    let mut unreachable_arms = Vec::new();

    for (arm_index, (alternatives, guarded)) in arms.iter().enumerate() {
        let mut any_alt_useful = false;
        for row in alternatives {
            if is_useful(&covering_matrix, row, col_types, symbols, well_known).is_some() {
                any_alt_useful = true;
            }
        }
        if !any_alt_useful {
            unreachable_arms.push(arm_index);
        }
        if !guarded {
            covering_matrix.extend(alternatives.iter().cloned());
        }
    }

    let wildcard_row = vec![CtorPat::Wildcard; col_types.len()];
    let missing_witness = is_useful(&covering_matrix, &wildcard_row, col_types, symbols, well_known);
    let (exhaustive, missing) = match missing_witness {
        None => (true, Vec::new()),
        Some(witness) => (false, vec![render_row(&witness, interner)]),
    };

    MatchReport {
        exhaustive,
        missing,
        unreachable_arms,
    }
}

fn render(pat: &CtorPat, interner: &StringInterner) -> String {
    match pat {
        CtorPat::Wildcard => "_".to_string(),
        CtorPat::Bool(b) => b.to_string(),
        CtorPat::Int(v) => v.to_string(),
        CtorPat::Float(bits) => f64::from_bits(*bits).to_string(),
        CtorPat::Str(name) => format!("{:?}", interner.resolve(*name)),
        CtorPat::Char(c) => format!("{c:?}"),
        CtorPat::Range { lo, hi, inclusive } => {
            format!("{lo}..{}{hi}", if *inclusive { "=" } else { "" })
        }
        CtorPat::Variant { name, fields } => {
            let name = interner.resolve(*name);
            if fields.is_empty() {
                name.to_string()
            } else {
                format!("{name}({})", render_row(fields, interner))
            }
        }
        CtorPat::Tuple(items) => format!("({})", render_row(items, interner)),
        CtorPat::Record { fields } => {
            let rendered = fields
                .iter()
                .map(|(name, pat)| format!("{}: {}", interner.resolve(*name), render(pat, interner)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{ {rendered} }}")
        }
    }
}

fn render_row(row: &[CtorPat], interner: &StringInterner) -> String {
    row.iter().map(|p| render(p, interner)).collect::<Vec<_>>().join(", ")
}
