//! The AST node kinds themselves. See [`crate::arena::Arena`] for how they
//! are allocated and [`crate::Program`] for the owning container.

pub mod decl;
pub mod expr;
pub mod pattern;
pub mod stmt;
pub mod ty;

pub use decl::{
    ConstDecl, Decl, FieldDecl, FunctionDecl, GenericParam, ImplDecl, ImportDecl, ImportItem,
    ModuleDecl, Param, TestDecl, TopLevelLet, TraitDecl, TraitMethodSig, TypeDecl, TypeDeclKind,
    VariantDecl, VariantFields, Visibility, WherePredicate,
};
pub use expr::{ClosureParam, Expr, ExprKind, MatchArm, TemplatePart};
pub use pattern::{LiteralPat, Pattern, PatternKind};
pub use stmt::{AssignTarget, Stmt, StmtKind, StmtMatchArm};
pub use ty::{FloatWidth, IntWidth, PrimitiveType, TypeAst, TypeAstKind};
