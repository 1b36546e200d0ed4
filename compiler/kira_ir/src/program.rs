//! The top-level parsed unit: one source file's worth of AST.

use crate::arena::Arena;
use crate::ast::{Decl, ModuleDecl};
use crate::interner::StringInterner;
use crate::DeclId;

/// One parsed `.ki` file.
///
/// Owns the arena that every expression/statement/pattern/type AST node in
/// the file was allocated from, and the interner that every [`crate::Name`]
/// in the file was interned into. Dropping a `Program` frees its whole AST
/// at once — there is no reference counting inside the tree (spec §9,
/// "Arena-owned ASTs").
pub struct Program {
    pub arena: Arena,
    pub interner: StringInterner,
    /// The `module path` declaration at the top of the file, if present.
    /// The module loader (`kira_loader`) requires this to be `Some` before
    /// registering the module (`ResolveError` otherwise).
    pub module_decl: Option<ModuleDecl>,
    /// Top-level declarations, in source order.
    pub decls: Vec<DeclId>,
    /// The source text, kept around so diagnostics and `:type` style
    /// tooling can slice out snippets by span.
    pub source: String,
}

impl Program {
    pub fn new(arena: Arena, interner: StringInterner, source: String) -> Self {
        Program {
            arena,
            interner,
            module_decl: None,
            decls: Vec::new(),
            source,
        }
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        self.arena.decl(id)
    }

    pub fn functions(&self) -> impl Iterator<Item = (DeclId, &crate::ast::FunctionDecl)> {
        self.decls.iter().filter_map(move |&id| match self.arena.decl(id) {
            Decl::Function(f) => Some((id, f)),
            _ => None,
        })
    }
}
