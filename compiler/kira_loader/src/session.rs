//! The `Session`: the one object that owns the symbol table, the module
//! cache, and the loaded-bytes counter (spec §5 — "all three are owned by
//! a single `Session` object").

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use kira_diagnostic::{Bag, Diagnostic, Kind};
use kira_ir::ast::Decl;
use kira_ir::{Name, Program, Span, StringInterner};
use kira_symbols::{NewSymbol, ScopeId, ScopeKind, SymbolKind, SymbolTable};

use crate::config::ProjectConfig;
use crate::error::LoadError;
use crate::resolve::{self, ResolveContext};

/// The external parser: given source text and the session's (growing,
/// shared) interner, produce an arena-owned `Program`. No lexer or parser
/// lives in this crate — tests supply a stub, a real driver supplies the
/// actual one (spec §1, "no crate implements a lexer, parser...").
///
/// Implementations must intern every name through the interner they are
/// given; `kira_loader` re-syncs `Program::interner` from its own canonical
/// copy immediately afterward, so what the closure leaves in `Program`'s
/// own field is not load-bearing, but the `Name`s it returns must have come
/// from interning into the reference it was handed.
pub type ParseFn<'a> = dyn FnMut(&str, &mut StringInterner) -> Result<Program, String> + 'a;

/// The type+effect checker entry point, injected rather than depended on
/// directly — `kira_loader` does not depend on `kira_types` (see
/// `SPEC_FULL.md` §0); a real driver passes `kira_types::check_program`
/// (wrapped to stash its `TypeTable`/`Bag` wherever the driver wants them).
pub type CheckFn<'a> = dyn FnMut(&mut Program, &mut SymbolTable) + 'a;

struct ModuleRecord {
    file_path: PathBuf,
    program: Program,
}

/// Owns everything module loading touches across a whole run: the symbol
/// table, the shared name interner, the module cache, and the resource
/// caps (spec §5).
pub struct Session {
    pub symbols: SymbolTable,
    /// Canonical, ever-growing interner shared by every module loaded in
    /// this session (see the doc comment on [`ParseFn`]).
    pub interner: StringInterner,
    /// Owning cache of parsed modules, keyed the same way
    /// `SymbolTable::module_registry` is (`Vec<Name>`). Wrapped for
    /// interior mutability the way the reference compiler wraps its
    /// read-heavy, write-rare owning containers, even though the loader
    /// itself only ever runs on one thread (spec `SPEC_FULL.md` §1).
    programs: RwLock<FxHashMap<Vec<Name>, ModuleRecord>>,
    /// Modules currently being loaded — re-entering one of these is a
    /// circular dependency.
    loading: FxHashSet<Vec<Name>>,
    depth: usize,
    max_depth: usize,
    total_bytes: u64,
    max_total_bytes: u64,
    project_root: PathBuf,
    root_config: Option<ProjectConfig>,
    package_cache: FxHashMap<String, (PathBuf, ProjectConfig)>,
    search_dirs: Vec<PathBuf>,
    cwd: PathBuf,
}

impl Session {
    /// Build a session rooted at `start_dir`, walking up for a `kira.toml`
    /// the way spec §6 describes. `start_dir` doubles as the relative-to-
    /// cwd fallback directory (spec §4.2 step 4).
    pub fn new(start_dir: PathBuf, search_dirs: Vec<PathBuf>, max_depth: usize, max_total_bytes: u64) -> Result<Self, LoadError> {
        let (project_root, root_config) = match resolve::discover_project_config(&start_dir)? {
            Some((root, config)) => (root, Some(config)),
            None => (start_dir.clone(), None),
        };
        Ok(Session {
            symbols: SymbolTable::new(),
            interner: StringInterner::new(),
            programs: RwLock::new(FxHashMap::default()),
            loading: FxHashSet::default(),
            depth: 0,
            max_depth,
            total_bytes: 0,
            max_total_bytes,
            project_root,
            root_config,
            package_cache: FxHashMap::default(),
            search_dirs,
            cwd: start_dir,
        })
    }

    pub fn loaded_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn file_path(&self, path: &[Name]) -> Option<PathBuf> {
        self.programs.read().get(path).map(|r| r.file_path.clone())
    }

    fn dotted(&self, path: &[Name]) -> String {
        path.iter().map(|n| self.interner.resolve(*n)).collect::<Vec<_>>().join(".")
    }

    /// Load (and, the first time, check) the module named by `path`.
    /// Idempotent: a second call with the same path returns the cached
    /// `ScopeId` without touching the depth counter, the byte counter, or
    /// the `loading` set (spec §8, "load_module is idempotent").
    ///
    /// Diagnostics produced while resolving *this module's own* imports are
    /// pushed to `bag` rather than aborting the load (spec §7: "Module-
    /// loader diagnostics are accumulated per-module but abort only that
    /// module's population"). A failure to load `path` itself — as opposed
    /// to one of its imports — is still a hard `Err`.
    pub fn load_module(
        &mut self,
        path: &[Name],
        parse: &mut ParseFn,
        check: &mut CheckFn,
        bag: &mut Bag,
        span: Span,
    ) -> Result<ScopeId, LoadError> {
        let dotted = self.dotted(path);

        if let Some(scope) = self.symbols.resolve_module(path) {
            return Ok(scope);
        }

        let segment_strs: Vec<&str> = path.iter().map(|n| self.interner.resolve(*n)).collect();
        resolve::validate_path(&dotted, &segment_strs)?;

        if self.loading.contains(path) {
            return Err(LoadError::CircularDependency { path: dotted });
        }
        if self.depth >= self.max_depth {
            return Err(LoadError::MaxImportDepthExceeded { path: dotted, max: self.max_depth });
        }

        self.loading.insert(path.to_vec());
        self.depth += 1;
        let result = self.load_module_inner(path, &dotted, &segment_strs, parse, check, bag, span);
        self.depth -= 1;
        self.loading.remove(path);
        result
    }

    fn load_module_inner(
        &mut self,
        path: &[Name],
        dotted: &str,
        segment_strs: &[&str],
        parse: &mut ParseFn,
        check: &mut CheckFn,
        bag: &mut Bag,
        span: Span,
    ) -> Result<ScopeId, LoadError> {
        tracing::debug!(module = %dotted, "loading module");

        let file_path = {
            let mut ctx = ResolveContext {
                project_root: &self.project_root,
                root_config: self.root_config.as_ref(),
                package_cache: &mut self.package_cache,
                search_dirs: &self.search_dirs,
                cwd: &self.cwd,
            };
            resolve::resolve_module_path(segment_strs, &mut ctx)
                .map_err(|searched| LoadError::ModuleNotFound { path: dotted.to_string(), searched })?
        };

        let metadata = std::fs::metadata(&file_path)
            .map_err(|e| LoadError::FileReadError { path: file_path.clone(), message: e.to_string() })?;
        let remaining = self.max_total_bytes.saturating_sub(self.total_bytes);
        if metadata.len() > remaining {
            return Err(LoadError::TotalBytesExceeded { path: dotted.to_string(), attempted: metadata.len(), remaining });
        }

        let content = std::fs::read_to_string(&file_path)
            .map_err(|e| LoadError::FileReadError { path: file_path.clone(), message: e.to_string() })?;
        self.total_bytes += content.len() as u64;

        let mut program =
            parse(&content, &mut self.interner).map_err(|message| LoadError::ParseError { path: file_path.clone(), message })?;
        program.interner = self.interner.clone();

        if program.module_decl.is_none() {
            return Err(LoadError::ResolveError { path: dotted.to_string() });
        }

        let scope = self.symbols.enter_scope(ScopeKind::Module);
        self.symbols.register_module(path.to_vec(), scope);

        let import_decls: Vec<_> = program
            .decls
            .iter()
            .filter_map(|&id| match program.arena.decl(id) {
                Decl::Import(import) => Some(import.clone()),
                _ => None,
            })
            .collect();

        for import in &import_decls {
            match self.load_module(&import.path, &mut *parse, &mut *check, bag, import.span) {
                Ok(imported_scope) => self.bind_import(imported_scope, import, bag),
                Err(err) => bag.push(err.to_diagnostic(import.span)),
            }
        }

        check(&mut program, &mut self.symbols);
        self.symbols.leave_scope();

        tracing::debug!(module = %dotted, bytes = content.len(), "module loaded");

        self.programs.write().insert(path.to_vec(), ModuleRecord { file_path, program });

        let _ = span;
        Ok(scope)
    }

    /// Bind an already-loaded import's symbols into the current scope
    /// (spec §4.1): a bare `import a.b.c` binds the module namespace under
    /// its last segment; `import a.b.c.{x, y as z}` binds each named `pub`
    /// symbol, under its alias if one was given.
    fn bind_import(&mut self, imported_scope: ScopeId, import: &kira_ir::ast::ImportDecl, bag: &mut Bag) {
        match &import.items {
            None => {
                let Some(&alias) = import.path.last() else { return };
                if self
                    .symbols
                    .define(NewSymbol {
                        name: alias,
                        kind: SymbolKind::Module { scope: imported_scope },
                        visibility: kira_ir::ast::Visibility::Private,
                        doc: None,
                        span: import.span,
                    })
                    .is_err()
                {
                    bag.push(Diagnostic::error(
                        Kind::DuplicateDefinition,
                        format!("duplicate definition of '{}'", self.interner.resolve(alias)),
                        import.span,
                    ));
                }
            }
            Some(items) => {
                for item in items {
                    match self.symbols.lookup_qualified(imported_scope, item.name) {
                        Some(sym) => {
                            let local_name = item.alias.unwrap_or(item.name);
                            self.symbols.bind_in_current(local_name, sym);
                        }
                        None => {
                            let module = self.dotted(&import.path);
                            bag.push(Diagnostic::error(
                                Kind::UndefinedSymbol,
                                format!("module '{module}' has no public symbol '{}'", self.interner.resolve(item.name)),
                                import.span,
                            ));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use kira_ir::ast::{ModuleDecl, Visibility};
    use kira_ir::{Arena, Span};
    use std::fs;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// A parser stub: every file's content is just its own module path,
    /// dot-separated, with an optional `use X` line per import and `pub`
    /// line per exported function name — just enough structure for the
    /// loader's own tests, which never touch expression bodies.
    fn stub_parse(content: &str, interner: &mut StringInterner) -> Result<Program, String> {
        let mut lines = content.lines();
        let module_line = lines.next().ok_or("empty file")?;
        let module_path: Vec<Name> = module_line.split('.').map(|s| interner.intern(s.trim())).collect();

        let mut arena = Arena::new();
        let mut decls = Vec::new();
        for line in lines {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("use ") {
                let segments: Vec<Name> = rest.split('.').map(|s| interner.intern(s.trim())).collect();
                let decl = Decl::Import(kira_ir::ast::ImportDecl { path: segments, items: None, span: Span::DUMMY });
                decls.push(arena.alloc_decl(decl));
            } else if let Some(rest) = line.strip_prefix("pub fn ") {
                let name = interner.intern(rest.trim());
                let decl = Decl::Function(kira_ir::ast::FunctionDecl {
                    name,
                    generics: Vec::new(),
                    params: Vec::new(),
                    return_ty: arena.alloc_type(kira_ir::ast::TypeAst {
                        kind: kira_ir::ast::TypeAstKind::Primitive(kira_ir::ast::PrimitiveType::Void),
                        span: Span::DUMMY,
                    }),
                    is_effect: false,
                    visibility: Visibility::Public,
                    body: None,
                    where_clause: Vec::new(),
                    doc: None,
                    span: Span::DUMMY,
                });
                decls.push(arena.alloc_decl(decl));
            }
        }

        let mut program = Program::new(arena, StringInterner::new(), content.to_string());
        program.module_decl = Some(ModuleDecl { path: module_path, span: Span::DUMMY });
        program.decls = decls;
        Ok(program)
    }

    /// A no-op checker stub standing in for `kira_types::check_program`:
    /// defines each local function signature directly (the minimum the
    /// loader's own import-binding tests need to see `pub` symbols show
    /// up in the imported module's scope).
    fn stub_check(program: &mut Program, symbols: &mut SymbolTable) {
        for &id in &program.decls {
            if let Decl::Function(f) = program.arena.decl(id).clone() {
                let _ = symbols.define(NewSymbol {
                    name: f.name,
                    kind: SymbolKind::Function {
                        generics: Vec::new(),
                        params: Vec::new(),
                        return_ty: kira_symbols::Type::Void,
                        effect: kira_ir::EffectTag::Pure,
                        has_body: f.body.is_some(),
                    },
                    visibility: f.visibility,
                    doc: None,
                    span: f.span,
                });
            }
        }
    }

    #[test]
    fn loading_the_same_module_twice_is_idempotent() {
        let dir = tempdir();
        write_file(&dir, "src/foo.ki", "foo\npub fn hello\n");
        write_file(
            &dir,
            "kira.toml",
            "[modules]\nfoo = \"src/foo.ki\"\n",
        );

        let mut session = Session::new(dir.clone(), Vec::new(), 64, 1_000_000).unwrap();
        let foo = session.interner.intern("foo");
        let mut bag = Bag::new();

        let first = session.load_module(&[foo], &mut stub_parse, &mut stub_check, &mut bag, Span::DUMMY).unwrap();
        let bytes_after_first = session.loaded_bytes();
        let second = session.load_module(&[foo], &mut stub_parse, &mut stub_check, &mut bag, Span::DUMMY).unwrap();

        assert_eq!(first, second);
        assert_eq!(session.loaded_bytes(), bytes_after_first);
        assert!(bag.is_empty());
    }

    #[test]
    fn importing_a_public_function_binds_it_into_the_importer_scope() {
        let dir = tempdir();
        write_file(&dir, "src/demo.ki", "demo\npub fn twice\n");
        write_file(&dir, "src/importer.ki", "importer\nuse demo\npub fn main\n");
        write_file(
            &dir,
            "kira.toml",
            "[modules]\ndemo = \"src/demo.ki\"\nimporter = \"src/importer.ki\"\n",
        );

        let mut session = Session::new(dir.clone(), Vec::new(), 64, 1_000_000).unwrap();
        let importer = session.interner.intern("importer");
        let demo = session.interner.intern("demo");
        let twice = session.interner.intern("twice");
        let mut bag = Bag::new();

        let importer_scope = session
            .load_module(&[importer], &mut stub_parse, &mut stub_check, &mut bag, Span::DUMMY)
            .unwrap();
        assert!(bag.is_empty());

        let demo_scope = session.symbols.resolve_module(&[demo]).unwrap();
        let twice_symbol = session.symbols.lookup_qualified(demo_scope, twice).unwrap();
        let bound_in_importer = session.symbols.lookup_qualified(importer_scope, twice).unwrap();
        assert_eq!(twice_symbol, bound_in_importer);
    }

    #[test]
    fn a_module_that_imports_itself_transitively_is_a_circular_dependency() {
        let dir = tempdir();
        write_file(&dir, "src/a.ki", "a\nuse b\n");
        write_file(&dir, "src/b.ki", "b\nuse a\n");
        write_file(&dir, "kira.toml", "[modules]\na = \"src/a.ki\"\nb = \"src/b.ki\"\n");

        let mut session = Session::new(dir.clone(), Vec::new(), 64, 1_000_000).unwrap();
        let a = session.interner.intern("a");
        let mut bag = Bag::new();

        // `a`'s own load succeeds (the cycle is detected while loading its
        // import of `b`, which in turn imports `a`); the failure shows up as
        // a diagnostic on `a`'s import of `b`, not as an `Err` from the
        // top-level call, matching the "diagnostics accumulated per-module"
        // rule for import failures.
        let result = session.load_module(&[a], &mut stub_parse, &mut stub_check, &mut bag, Span::DUMMY);
        assert!(result.is_ok());
        assert!(!bag.is_empty());
        assert!(bag.iter().any(|d| d.kind == Kind::CircularDependency));
    }

    #[test]
    fn unresolved_module_surfaces_a_diagnostic_and_aborts() {
        let dir = tempdir();
        write_file(&dir, "kira.toml", "[package]\nname = \"demo\"\n");

        let mut session = Session::new(dir.clone(), Vec::new(), 64, 1_000_000).unwrap();
        let missing = session.interner.intern("nope");
        let mut bag = Bag::new();

        let result = session.load_module(&[missing], &mut stub_parse, &mut stub_check, &mut bag, Span::DUMMY);
        assert!(result.is_err());
    }

    #[test]
    fn exceeding_max_import_depth_is_reported() {
        let dir = tempdir();
        write_file(&dir, "src/a.ki", "a\n");
        write_file(&dir, "kira.toml", "[modules]\na = \"src/a.ki\"\n");

        let mut session = Session::new(dir.clone(), Vec::new(), 0, 1_000_000).unwrap();
        let a = session.interner.intern("a");
        let mut bag = Bag::new();

        let err = session.load_module(&[a], &mut stub_parse, &mut stub_check, &mut bag, Span::DUMMY).unwrap_err();
        assert!(matches!(err, LoadError::MaxImportDepthExceeded { .. }));
    }

    #[test]
    fn exceeding_the_total_byte_budget_is_reported() {
        let dir = tempdir();
        write_file(&dir, "src/a.ki", "a\npub fn hello\n");
        write_file(&dir, "kira.toml", "[modules]\na = \"src/a.ki\"\n");

        let mut session = Session::new(dir.clone(), Vec::new(), 64, 4).unwrap();
        let a = session.interner.intern("a");
        let mut bag = Bag::new();

        let err = session.load_module(&[a], &mut stub_parse, &mut stub_check, &mut bag, Span::DUMMY).unwrap_err();
        assert!(matches!(err, LoadError::TotalBytesExceeded { .. }));
    }

    fn tempdir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        let unique = format!("kira_loader_test_{}_{:p}", std::process::id(), &dir);
        dir.push(unique);
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}
