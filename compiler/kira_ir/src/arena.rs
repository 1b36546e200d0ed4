//! Arena allocation for a single [`crate::Program`].
//!
//! All expressions, statements, patterns and type ASTs that make up one
//! parsed program are allocated from one `Arena` and freed together when
//! the program is dropped (spec §3, "AST arena"). Lists (call arguments,
//! tuple elements, ...) are stored flattened in side vectors and referenced
//! by a `(start, len)` range rather than by `Vec<Id>` per node, so cloning
//! an `Expr` node never allocates.

use crate::ast::{Decl, Expr, Pattern, Stmt, TypeAst};
use crate::{
    DeclId, DeclRange, ExprId, ExprRange, PatternId, PatternRange, StmtId, StmtRange, TypeAstId,
    TypeAstRange,
};

#[cold]
#[inline(never)]
fn panic_capacity_exceeded(what: &str, len: usize) -> ! {
    panic!("arena capacity exceeded: {what} has {len} elements, max is {}", u32::MAX);
}

fn to_u32(value: usize, what: &str) -> u32 {
    u32::try_from(value).unwrap_or_else(|_| panic_capacity_exceeded(what, value))
}

/// Owns every node of one parsed program's AST.
#[derive(Default, Clone)]
pub struct Arena {
    exprs: Vec<Expr>,
    expr_list: Vec<ExprId>,
    stmts: Vec<Stmt>,
    stmt_list: Vec<StmtId>,
    patterns: Vec<Pattern>,
    pattern_list: Vec<PatternId>,
    types: Vec<TypeAst>,
    type_list: Vec<TypeAstId>,
    decls: Vec<Decl>,
    decl_list: Vec<DeclId>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(to_u32(self.exprs.len(), "expressions"));
        self.exprs.push(expr);
        id
    }

    pub fn alloc_expr_list(&mut self, items: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = self.expr_list.len();
        self.expr_list.extend(items);
        ExprRange::new(start, self.expr_list.len() - start)
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_list[range.range()]
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(to_u32(self.stmts.len(), "statements"));
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_stmt_list(&mut self, items: impl IntoIterator<Item = StmtId>) -> StmtRange {
        let start = self.stmt_list.len();
        self.stmt_list.extend(items);
        StmtRange::new(start, self.stmt_list.len() - start)
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn stmt_list(&self, range: StmtRange) -> &[StmtId] {
        &self.stmt_list[range.range()]
    }

    pub fn alloc_pattern(&mut self, pattern: Pattern) -> PatternId {
        let id = PatternId(to_u32(self.patterns.len(), "patterns"));
        self.patterns.push(pattern);
        id
    }

    pub fn alloc_pattern_list(
        &mut self,
        items: impl IntoIterator<Item = PatternId>,
    ) -> PatternRange {
        let start = self.pattern_list.len();
        self.pattern_list.extend(items);
        PatternRange::new(start, self.pattern_list.len() - start)
    }

    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    pub fn pattern_list(&self, range: PatternRange) -> &[PatternId] {
        &self.pattern_list[range.range()]
    }

    pub fn alloc_type(&mut self, ty: TypeAst) -> TypeAstId {
        let id = TypeAstId(to_u32(self.types.len(), "type ASTs"));
        self.types.push(ty);
        id
    }

    pub fn alloc_type_list(&mut self, items: impl IntoIterator<Item = TypeAstId>) -> TypeAstRange {
        let start = self.type_list.len();
        self.type_list.extend(items);
        TypeAstRange::new(start, self.type_list.len() - start)
    }

    pub fn ty(&self, id: TypeAstId) -> &TypeAst {
        &self.types[id.index()]
    }

    pub fn type_list(&self, range: TypeAstRange) -> &[TypeAstId] {
        &self.type_list[range.range()]
    }

    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(to_u32(self.decls.len(), "declarations"));
        self.decls.push(decl);
        id
    }

    pub fn alloc_decl_list(&mut self, items: impl IntoIterator<Item = DeclId>) -> DeclRange {
        let start = self.decl_list.len();
        self.decl_list.extend(items);
        DeclRange::new(start, self.decl_list.len() - start)
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn decl_list(&self, range: DeclRange) -> &[DeclId] {
        &self.decl_list[range.range()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expr::ExprKind;
    use crate::span::Span;

    fn dummy_expr(kind: ExprKind) -> Expr {
        Expr {
            kind,
            span: Span::DUMMY,
        }
    }

    #[test]
    fn alloc_expr_list_round_trips_in_order() {
        let mut arena = Arena::new();
        let a = arena.alloc_expr(dummy_expr(ExprKind::IntLiteral(1)));
        let b = arena.alloc_expr(dummy_expr(ExprKind::IntLiteral(2)));
        let c = arena.alloc_expr(dummy_expr(ExprKind::IntLiteral(3)));
        let range = arena.alloc_expr_list([a, b, c]);
        assert_eq!(arena.expr_list(range), &[a, b, c]);
    }

    #[test]
    fn ids_are_stable_across_further_allocation() {
        let mut arena = Arena::new();
        let a = arena.alloc_expr(dummy_expr(ExprKind::BoolLiteral(true)));
        let _b = arena.alloc_expr(dummy_expr(ExprKind::BoolLiteral(false)));
        assert!(matches!(arena.expr(a).kind, ExprKind::BoolLiteral(true)));
    }
}
