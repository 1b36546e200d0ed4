//! The tree-walking interpreter (spec §4.5): construction (global letrec
//! setup and method-dispatch-map construction), expression/statement
//! evaluation, and the call protocol.

use rustc_hash::FxHashMap;

use kira_ir::ast::{
    AssignTarget, Decl, ExprKind, FunctionDecl, StmtKind, TypeAstKind,
};
use kira_ir::{ExprId, Name, Program, Span, StmtId, StmtRange};
use kira_symbols::{SymbolTable, Type};
use kira_types::TypeTable;

use crate::environment::{Environment, Mutability};
use crate::error::{Eval, RuntimeAbort, Unwind};
use crate::host::SharedHost;
use crate::operators::{eval_binary, eval_cast, eval_unary};
use crate::pattern::try_match;
use crate::value::{Closure, Value};

use std::cell::RefCell;
use std::rc::Rc;

/// Names the interpreter needs to recognize structurally (constructors of
/// `Option`/`Result`, the `self` binding) but which a given program might
/// never itself spell, so they are interned once at construction rather
/// than looked up on demand (mirrors the reference compiler's
/// `interpreter/interned_names.rs` pre-interned-name-struct pattern).
struct WellKnown {
    some: Name,
    none: Name,
    ok: Name,
    err: Name,
    cons: Name,
    nil: Name,
    self_: Name,
}

impl WellKnown {
    fn new(program: &mut Program) -> Self {
        WellKnown {
            some: program.interner.intern("Some"),
            none: program.interner.intern("None"),
            ok: program.interner.intern("Ok"),
            err: program.interner.intern("Err"),
            cons: program.interner.intern("Cons"),
            nil: program.interner.intern("Nil"),
            self_: program.interner.intern("self"),
        }
    }
}

/// A user-defined method found in an `impl` block (or a trait's default
/// body), keyed by `(receiver type name, method name)`.
struct MethodEntry {
    params: Vec<Name>,
    body: StmtRange,
}

/// `(receiver type name, method name) -> body`. Built once from the AST at
/// construction time: `kira_types::tables::MethodTable` only carries
/// signatures (no body), so the interpreter keeps its own map instead of
/// trying to reuse the checker's.
type MethodMap = FxHashMap<(Name, Name), MethodEntry>;

pub struct Interpreter<'a> {
    program: &'a Program,
    types: &'a TypeTable,
    symbols: &'a SymbolTable,
    methods: MethodMap,
    globals: Environment,
    /// The one frozen snapshot every top-level function's closure captures
    /// (spec §4.5: "module-level ... functions capture the global/module
    /// environment"). Taken once, after every top-level const/let/function
    /// has been bound, so mutually-recursive top-level functions all see
    /// each other.
    module_captures: Rc<FxHashMap<Name, Value>>,
    host: SharedHost,
    well_known: WellKnown,
}

impl<'a> Interpreter<'a> {
    /// Build an interpreter over an already-checked `Program`. Takes
    /// `&mut Program` only to intern the handful of well-known names this
    /// construction needs (mirrors `kira_types::check_program`'s own
    /// `&mut Program` signature, used there for the same reason —
    /// `check_option_result_variant` interns `"Some"`/`"None"`/`"Ok"`/
    /// `"Err"` mid-phase); the interpreter itself only ever holds a shared
    /// `&'a Program` afterward.
    pub fn new(
        program: &'a mut Program,
        types: &'a TypeTable,
        symbols: &'a SymbolTable,
        host: SharedHost,
    ) -> Result<Self, RuntimeAbort> {
        let well_known = WellKnown::new(program);
        let program: &'a Program = program;
        let methods = build_methods(program);

        let globals = Environment::new_root();
        let mut cells = Vec::new();
        for (_, func) in program.functions() {
            let cell = Rc::new(RefCell::new(None));
            globals.define(func.name, Value::Recursive(cell.clone()), Mutability::Immutable);
            cells.push((func, cell));
        }

        let mut interp = Interpreter {
            program,
            types,
            symbols,
            methods,
            globals,
            module_captures: Rc::new(FxHashMap::default()),
            host,
            well_known,
        };

        for &id in &program.decls {
            match program.decl(id) {
                Decl::Const(c) => {
                    let value = interp.eval_top_level(c.value)?;
                    interp.globals.define(c.name, value, Mutability::Immutable);
                }
                Decl::Let(l) => {
                    let value = interp.eval_top_level(l.init)?;
                    interp.globals.define(l.name, value, Mutability::Immutable);
                }
                _ => {}
            }
        }

        let captures = Rc::new(interp.globals.capture());
        interp.module_captures = captures.clone();

        for (func, cell) in cells {
            // A checked program never reaches here with a body-less
            // top-level function — the checker rejects it with
            // `Kind::MissingBody` before the interpreter is ever built.
            let Some(body) = func.body else {
                return Err(RuntimeAbort::new(
                    format!("function '{}' has no body", program.interner.resolve(func.name)),
                    func.span,
                ));
            };
            let params = func.params.iter().map(|p| p.name).collect();
            let closure = Value::Closure(Rc::new(Closure {
                params,
                body,
                captures: captures.clone(),
                name: Some(func.name),
            }));
            *cell.borrow_mut() = Some(closure);
        }

        Ok(interp)
    }

    fn eval_top_level(&self, id: ExprId) -> Result<Value, RuntimeAbort> {
        self.eval_expr(&self.globals, id).map_err(unwind_to_abort)
    }

    /// Run `main` with no arguments (the CLI driver's entry point; spec
    /// §6, "`kira run <file.ki>` -> load, check, evaluate `main`").
    pub fn run_main(&self) -> Result<Value, RuntimeAbort> {
        let Some(main) = find_main(self.program) else {
            return Err(RuntimeAbort::new("no 'main' function is defined", Span::DUMMY));
        };
        let Some(value) = self.globals.lookup(main) else {
            return Err(RuntimeAbort::new("no 'main' function is defined", Span::DUMMY));
        };
        self.call(&value, Vec::new(), Span::DUMMY).map_err(unwind_to_abort)
    }

    // ---- expression evaluation ----

    pub fn eval_expr(&self, env: &Environment, id: ExprId) -> Eval<Value> {
        let expr = self.program.arena.expr(id);
        let span = expr.span;
        match &expr.kind {
            ExprKind::IntLiteral(n) => Ok(Value::int(*n, crate::operators::DEFAULT_INT_WIDTH)),
            ExprKind::FloatLiteral(bits) => Ok(Value::Float(f64::from_bits(*bits))),
            ExprKind::StringLiteral(name) => Ok(Value::string(self.program.interner.resolve(*name))),
            ExprKind::CharLiteral(c) => Ok(Value::Char(*c)),
            ExprKind::BoolLiteral(b) => Ok(Value::Bool(*b)),
            ExprKind::Identifier { name, .. } => env
                .lookup(*name)
                .ok_or_else(|| RuntimeAbort::new(undefined_message(self.program, *name), span).into()),
            ExprKind::SelfExpr => env
                .lookup(self.well_known.self_)
                .ok_or_else(|| RuntimeAbort::new("'self' used outside a method body", span).into()),
            ExprKind::Binary { op, lhs, rhs } => self.eval_binary_expr(env, *op, *lhs, *rhs, span),
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(env, *operand)?;
                eval_unary(*op, value, span)
            }
            ExprKind::Field { base, name } => self.eval_field(env, *base, *name, span),
            ExprKind::Index { base, index } => self.eval_index(env, *base, *index, span),
            ExprKind::TupleAccess { base, index } => self.eval_tuple_access(env, *base, *index, span),
            ExprKind::Call { callee, args } => self.eval_call(env, id, *callee, *args, span),
            ExprKind::MethodCall { receiver, method, args, .. } => {
                self.eval_method_call(env, *receiver, *method, *args, span)
            }
            ExprKind::Closure { params, body, .. } => {
                let params = params.iter().map(|p| p.name).collect();
                Ok(Value::Closure(Rc::new(Closure {
                    params,
                    body: *body,
                    captures: Rc::new(env.capture()),
                    name: None,
                })))
            }
            ExprKind::Match { scrutinee, arms } => self.eval_match_expr(env, *scrutinee, arms, span),
            ExprKind::Tuple(range) => {
                let items = self.eval_expr_list(env, *range)?;
                Ok(Value::tuple(items))
            }
            ExprKind::Array(range) => {
                let items = self.eval_expr_list(env, *range)?;
                Ok(Value::array(items))
            }
            ExprKind::Record { type_name, fields } => {
                let mut out = Vec::with_capacity(fields.len());
                for (name, value_id) in fields {
                    out.push((*name, self.eval_expr(env, *value_id)?));
                }
                Ok(Value::record(*type_name, out))
            }
            ExprKind::Variant { name, positional, .. } => {
                let args = self.eval_expr_list(env, *positional)?;
                Ok(Value::variant(*name, args))
            }
            ExprKind::Cast { expr: inner, ty } => {
                let value = self.eval_expr(env, *inner)?;
                eval_cast(value, self.program.arena.ty(*ty), span)
            }
            ExprKind::Range { start, end, inclusive } => self.eval_range(env, *start, *end, *inclusive, span),
            ExprKind::Grouped(inner) => self.eval_expr(env, *inner),
            ExprKind::InterpolatedString(parts) => self.eval_interpolated(env, parts),
            ExprKind::Try(inner) => self.eval_try(env, *inner, span),
            ExprKind::NullCoalesce { value, default } => self.eval_null_coalesce(env, *value, *default, span),
            ExprKind::Error => Err(RuntimeAbort::new("encountered a poisoned expression", span).into()),
        }
    }

    fn eval_expr_list(&self, env: &Environment, range: kira_ir::ExprRange) -> Eval<Vec<Value>> {
        self.program.arena.expr_list(range).iter().map(|&id| self.eval_expr(env, id)).collect()
    }

    fn eval_binary_expr(&self, env: &Environment, op: kira_ir::BinaryOp, lhs: ExprId, rhs: ExprId, span: Span) -> Eval<Value> {
        use kira_ir::BinaryOp;
        match op {
            BinaryOp::And => {
                let l = self.eval_expr(env, lhs)?;
                if !l.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                self.eval_expr(env, rhs)
            }
            BinaryOp::Or => {
                let l = self.eval_expr(env, lhs)?;
                if l.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                self.eval_expr(env, rhs)
            }
            BinaryOp::Is => {
                let l = self.eval_expr(env, lhs)?;
                let rhs_name = self.variant_name_operand(rhs, span)?;
                Ok(Value::Bool(matches!(&l, Value::Variant(data) if data.name == rhs_name)))
            }
            BinaryOp::In => {
                let l = self.eval_expr(env, lhs)?;
                let r = self.eval_expr(env, rhs)?;
                self.eval_membership(l, r, span)
            }
            _ => {
                let l = self.eval_expr(env, lhs)?;
                let r = self.eval_expr(env, rhs)?;
                eval_binary(op, l, r, span)
            }
        }
    }

    /// `x is Variant` reads its right-hand side as a bare constructor name,
    /// never evaluates it as a value.
    fn variant_name_operand(&self, rhs: ExprId, span: Span) -> Eval<Name> {
        match &self.program.arena.expr(rhs).kind {
            ExprKind::Identifier { name, .. } => Ok(*name),
            ExprKind::Variant { name, .. } => Ok(*name),
            _ => Err(RuntimeAbort::new("'is' expects a bare variant name", span).into()),
        }
    }

    fn eval_membership(&self, needle: Value, haystack: Value, span: Span) -> Eval<Value> {
        match haystack {
            Value::Array(items) => Ok(Value::Bool(items.borrow().iter().any(|v| *v == needle))),
            Value::Variant(_) => Ok(Value::Bool(self.variant_chain_contains(&haystack, &needle))),
            _ => Err(RuntimeAbort::new("'in' requires an array or a list value", span).into()),
        }
    }

    /// Walk a cons-style (2-arg constructor) variant chain structurally,
    /// without assuming a specific constructor name, the same way the
    /// checker's `iterable_elem_type` treats any single-type-argument
    /// instantiated type as iterable.
    fn variant_chain_contains(&self, mut node: &Value, needle: &Value) -> bool {
        loop {
            match node {
                Value::Variant(data) if data.args.len() == 2 => {
                    if data.args[0] == *needle {
                        return true;
                    }
                    node = &data.args[1];
                }
                _ => return false,
            }
        }
    }

    fn eval_field(&self, env: &Environment, base: ExprId, name: Name, span: Span) -> Eval<Value> {
        let base_val = self.eval_expr(env, base)?;
        match base_val {
            Value::Record(data) => data
                .borrow()
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeAbort::new("no such field on this record", span).into()),
            Value::Module(map) => map
                .get(&name)
                .cloned()
                .ok_or_else(|| RuntimeAbort::new("no such member in this module", span).into()),
            _ => Err(RuntimeAbort::new("field access on a non-record value", span).into()),
        }
    }

    fn eval_index(&self, env: &Environment, base: ExprId, index: ExprId, span: Span) -> Eval<Value> {
        let base_val = self.eval_expr(env, base)?;
        let index_val = self.eval_expr(env, index)?;
        match (base_val, index_val) {
            (Value::Array(items), Value::Int(i)) => {
                let items = items.borrow();
                let idx = usize::try_from(i.value()).ok().filter(|&n| n < items.len());
                match idx {
                    Some(idx) => Ok(items[idx].clone()),
                    None => Err(RuntimeAbort::new("array index out of range", span).into()),
                }
            }
            _ => Err(RuntimeAbort::new("invalid index operation", span).into()),
        }
    }

    fn eval_tuple_access(&self, env: &Environment, base: ExprId, index: u32, span: Span) -> Eval<Value> {
        let base_val = self.eval_expr(env, base)?;
        let Value::Tuple(items) = base_val else {
            return Err(RuntimeAbort::new("tuple access on a non-tuple value", span).into());
        };
        items
            .get(index as usize)
            .cloned()
            .ok_or_else(|| RuntimeAbort::new("tuple index out of range", span).into())
    }

    fn eval_call(&self, env: &Environment, call_id: ExprId, callee: ExprId, args: kira_ir::ExprRange, span: Span) -> Eval<Value> {
        let _ = call_id;
        if let Some(path) = self.std_path(callee) {
            let arg_values = self.eval_expr_list(env, args)?;
            return crate::stdlib::dispatch(self, &path, &arg_values, span);
        }
        let callee_val = self.eval_expr(env, callee)?;
        let arg_values = self.eval_expr_list(env, args)?;
        self.call(&callee_val, arg_values, span)
    }

    /// Recognize a call whose callee is a `std.a.b....z` field-access
    /// chain, directly from the AST — independent of whatever resolved
    /// `Type` the checker assigned (which has no `Module` variant at all;
    /// qualified `std.*` access is resolved entirely here, structurally,
    /// rather than through ordinary value-based field/call dispatch).
    fn std_path(&self, mut id: ExprId) -> Option<Vec<&str>> {
        let mut segments = Vec::new();
        loop {
            match &self.program.arena.expr(id).kind {
                ExprKind::Field { base, name } => {
                    segments.push(self.program.interner.resolve(*name));
                    id = *base;
                }
                ExprKind::Identifier { name, .. } => {
                    segments.push(self.program.interner.resolve(*name));
                    break;
                }
                _ => return None,
            }
        }
        segments.reverse();
        if segments.first().copied() != Some("std") {
            return None;
        }
        Some(segments)
    }

    fn eval_method_call(&self, env: &Environment, receiver: ExprId, method: Name, args: kira_ir::ExprRange, span: Span) -> Eval<Value> {
        let receiver_val = self.eval_expr(env, receiver)?;
        let arg_values = self.eval_expr_list(env, args)?;

        if let Some(type_name) = self.value_type_name(receiver) {
            if let Some(entry) = self.methods.get(&(type_name, method)) {
                let mut bindings = vec![(self.well_known.self_, receiver_val)];
                bindings.extend(entry.params.iter().copied().zip(arg_values));
                return self.call_body(&self.module_captures, bindings, entry.body, span);
            }
        }

        Err(RuntimeAbort::new(
            format!("no such method '{}' on a {}", self.program.interner.resolve(method), receiver_val.type_name()),
            span,
        )
        .into())
    }

    fn value_type_name(&self, receiver_expr: ExprId) -> Option<Name> {
        match self.types.get(receiver_expr)? {
            Type::Named(sym) => Some(self.symbols.symbol(*sym).name),
            Type::Instantiated { base, .. } => Some(self.symbols.symbol(*base).name),
            _ => None,
        }
    }

    fn eval_match_expr(&self, env: &Environment, scrutinee: ExprId, arms: &[kira_ir::ast::MatchArm], span: Span) -> Eval<Value> {
        let value = self.eval_expr(env, scrutinee)?;
        for arm in arms {
            let Some(outcome) = try_match(&self.program.arena, &self.program.interner, arm.pattern, &value) else {
                continue;
            };
            let mut trial = env.clone();
            trial.push_scope();
            for (name, v, _) in &outcome.bindings {
                trial.define(*name, v.clone(), Mutability::Immutable);
            }
            if let Some(guard) = outcome.guard {
                let guard_val = self.eval_expr(&trial, guard)?;
                if !guard_val.is_truthy() {
                    continue;
                }
            }
            return self.eval_expr(&trial, arm.body);
        }
        Err(RuntimeAbort::new("no match arm matched this value", span).into())
    }

    fn eval_range(&self, env: &Environment, start: Option<ExprId>, end: Option<ExprId>, inclusive: bool, span: Span) -> Eval<Value> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(RuntimeAbort::new("an open-ended range cannot be used as a value here", span).into());
        };
        let start_val = self.eval_expr(env, start)?;
        let end_val = self.eval_expr(env, end)?;
        let (Value::Int(lo), Value::Int(hi)) = (start_val, end_val) else {
            return Err(RuntimeAbort::new("range bounds must be integers", span).into());
        };
        let (lo, hi) = (lo.value(), hi.value());
        let hi = if inclusive { hi.saturating_add(1) } else { hi };
        let width = crate::operators::DEFAULT_INT_WIDTH;
        let items = (lo..hi).map(|n| Value::int(n, width)).collect();
        Ok(Value::array(items))
    }

    fn eval_interpolated(&self, env: &Environment, parts: &[kira_ir::ast::TemplatePart]) -> Eval<Value> {
        use kira_ir::ast::TemplatePart;
        let mut out = String::new();
        for part in parts {
            match part {
                TemplatePart::Literal(name) => out.push_str(self.program.interner.resolve(*name)),
                TemplatePart::Expr(id) => {
                    let value = self.eval_expr(env, *id)?;
                    out.push_str(&value.format(&self.program.interner));
                }
            }
        }
        Ok(Value::string(out))
    }

    fn eval_try(&self, env: &Environment, inner: ExprId, span: Span) -> Eval<Value> {
        let value = self.eval_expr(env, inner)?;
        match &value {
            Value::Variant(data) if data.name == self.well_known.some && data.args.len() == 1 => Ok(data.args[0].clone()),
            Value::Variant(data) if data.name == self.well_known.none && data.args.is_empty() => {
                Err(Unwind::Return(self.none()))
            }
            Value::Variant(data) if data.name == self.well_known.ok && data.args.len() == 1 => Ok(data.args[0].clone()),
            Value::Variant(data) if data.name == self.well_known.err && data.args.len() == 1 => {
                Err(Unwind::Return(Value::variant(self.well_known.err, vec![data.args[0].clone()])))
            }
            _ => Err(RuntimeAbort::new("'?' requires an Option or Result value", span).into()),
        }
    }

    fn eval_null_coalesce(&self, env: &Environment, value: ExprId, default: ExprId, span: Span) -> Eval<Value> {
        let v = self.eval_expr(env, value)?;
        match &v {
            Value::Variant(data) if data.name == self.well_known.some && data.args.len() == 1 => Ok(data.args[0].clone()),
            Value::Variant(data) if data.name == self.well_known.none && data.args.is_empty() => self.eval_expr(env, default),
            _ => Err(RuntimeAbort::new("'??' requires an Option on the left", span).into()),
        }
    }

    // ---- statement execution ----

    fn exec_stmt(&self, env: &mut Environment, id: StmtId) -> Eval<()> {
        let stmt = self.program.arena.stmt(id);
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::Let { pattern, init, .. } => {
                let value = self.eval_expr(env, *init)?;
                self.bind_pattern(env, *pattern, value, span)
            }
            StmtKind::Var { name, init, .. } => {
                let value = match init {
                    Some(e) => self.eval_expr(env, *e)?,
                    None => Value::Unit,
                };
                env.define(*name, value, Mutability::Mutable);
                Ok(())
            }
            StmtKind::Assign { target, value } => self.exec_assign(env, target, *value, span),
            StmtKind::If { cond, then_branch, else_branch } => {
                let cond_val = self.eval_expr(env, *cond)?;
                if cond_val.is_truthy() {
                    self.exec_block(env, *then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.exec_block(env, *else_branch)?;
                }
                Ok(())
            }
            StmtKind::For { pattern, iter, body } => self.exec_for(env, *pattern, *iter, *body, span),
            StmtKind::Match { scrutinee, arms } => {
                self.exec_match_stmt(env, *scrutinee, arms, span)?;
                Ok(())
            }
            StmtKind::Return(value) => {
                let v = match value {
                    Some(e) => self.eval_expr(env, *e)?,
                    None => Value::Unit,
                };
                Err(Unwind::Return(v))
            }
            StmtKind::Break { .. } => Err(Unwind::Break),
            StmtKind::ExprStmt(e) => {
                self.eval_expr(env, *e)?;
                Ok(())
            }
            StmtKind::Block(body) => {
                self.exec_block(env, *body)?;
                Ok(())
            }
        }
    }

    fn bind_pattern(&self, env: &Environment, pattern: kira_ir::PatternId, value: Value, span: Span) -> Eval<()> {
        let Some(outcome) = try_match(&self.program.arena, &self.program.interner, pattern, &value) else {
            return Err(RuntimeAbort::new("let pattern did not match its initializer", span).into());
        };
        for (name, v, is_var) in outcome.bindings {
            let mutability = if is_var { Mutability::Mutable } else { Mutability::Immutable };
            env.define(name, v, mutability);
        }
        Ok(())
    }

    fn exec_assign(&self, env: &mut Environment, target: &AssignTarget, value_id: ExprId, span: Span) -> Eval<()> {
        let value = self.eval_expr(env, value_id)?;
        match target {
            AssignTarget::Identifier(name) => env
                .assign(*name, value)
                .map_err(|_| RuntimeAbort::new("assignment to an undefined or immutable binding", span).into()),
            AssignTarget::Field { base, name } => {
                let base_val = self.eval_expr(env, *base)?;
                let Value::Record(data) = base_val else {
                    return Err(RuntimeAbort::new("field assignment target is not a record", span).into());
                };
                data.borrow_mut().set(*name, value);
                Ok(())
            }
            AssignTarget::Index { base, index } => {
                let base_val = self.eval_expr(env, *base)?;
                let index_val = self.eval_expr(env, *index)?;
                let (Value::Array(items), Value::Int(i)) = (base_val, index_val) else {
                    return Err(RuntimeAbort::new("index assignment requires an array and an integer index", span).into());
                };
                let mut items = items.borrow_mut();
                let idx = usize::try_from(i.value()).ok().filter(|&n| n < items.len());
                match idx {
                    Some(idx) => {
                        items[idx] = value;
                        Ok(())
                    }
                    None => Err(RuntimeAbort::new("array index out of range", span).into()),
                }
            }
        }
    }

    fn exec_for(&self, env: &mut Environment, pattern: kira_ir::PatternId, iter: ExprId, body: StmtRange, span: Span) -> Eval<()> {
        let iterable = self.eval_expr(env, iter)?;
        let items = self.iterate_values(iterable, span)?;
        for item in items {
            let Some(outcome) = try_match(&self.program.arena, &self.program.interner, pattern, &item) else {
                return Err(RuntimeAbort::new("for-loop pattern did not match an element", span).into());
            };
            env.push_scope();
            for (name, v, _) in outcome.bindings {
                env.define(name, v, Mutability::Immutable);
            }
            let result = self.exec_block_body(env, body);
            env.pop_scope();
            match result {
                Ok(_) => {}
                Err(Unwind::Break) => return Ok(()),
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    /// Only over finite sequences (spec §4.5): an `Array` directly, or a
    /// structurally-walked cons-style variant chain (any 2-argument
    /// constructor, by arity rather than by name — matches the checker's
    /// own structural `iterable_elem_type`).
    fn iterate_values(&self, iterable: Value, span: Span) -> Eval<Vec<Value>> {
        match iterable {
            Value::Array(items) => Ok(items.borrow().clone()),
            Value::Variant(_) => {
                let mut out = Vec::new();
                let mut node = iterable;
                loop {
                    match node {
                        Value::Variant(data) if data.args.len() == 2 => {
                            out.push(data.args[0].clone());
                            node = data.args[1].clone();
                        }
                        _ => break,
                    }
                }
                Ok(out)
            }
            _ => Err(RuntimeAbort::new("'for' requires an array or a list value", span).into()),
        }
    }

    fn exec_match_stmt(&self, env: &Environment, scrutinee: ExprId, arms: &[kira_ir::ast::StmtMatchArm], span: Span) -> Eval<Value> {
        let value = self.eval_expr(env, scrutinee)?;
        for arm in arms {
            let Some(outcome) = try_match(&self.program.arena, &self.program.interner, arm.pattern, &value) else {
                continue;
            };
            let mut trial = env.clone();
            trial.push_scope();
            for (name, v, _) in &outcome.bindings {
                trial.define(*name, v.clone(), Mutability::Immutable);
            }
            if let Some(guard) = outcome.guard {
                let guard_val = self.eval_expr(&trial, guard)?;
                if !guard_val.is_truthy() {
                    continue;
                }
            }
            return self.exec_block(&mut trial, arm.body);
        }
        Err(RuntimeAbort::new("no match arm matched this value", span).into())
    }

    fn exec_block(&self, env: &mut Environment, body: StmtRange) -> Eval<Value> {
        env.push_scope();
        let result = self.exec_block_body(env, body);
        env.pop_scope();
        result
    }

    fn exec_block_body(&self, env: &mut Environment, body: StmtRange) -> Eval<Value> {
        let stmts = self.program.arena.stmt_list(body);
        let Some((&last, init)) = stmts.split_last() else {
            return Ok(Value::Unit);
        };
        for &id in init {
            self.exec_stmt(env, id)?;
        }
        self.stmt_tail_value(env, last)
    }

    /// Mirrors `kira_types::infer::stmt`'s block-tail-value rule exactly:
    /// only an `ExprStmt`, nested `Block`, `If`, or statement-`Match` in
    /// tail position contributes a value; everything else yields `Unit`.
    fn stmt_tail_value(&self, env: &mut Environment, id: StmtId) -> Eval<Value> {
        let stmt = self.program.arena.stmt(id);
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::ExprStmt(e) => self.eval_expr(env, *e),
            StmtKind::Block(inner) => self.exec_block(env, *inner),
            StmtKind::If { cond, then_branch, else_branch } => {
                let cond_val = self.eval_expr(env, *cond)?;
                if cond_val.is_truthy() {
                    self.exec_block(env, *then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_block(env, *else_branch)
                } else {
                    Ok(Value::Unit)
                }
            }
            StmtKind::Match { scrutinee, arms } => self.exec_match_stmt(env, *scrutinee, arms, span),
            _ => {
                self.exec_stmt(env, id)?;
                Ok(Value::Unit)
            }
        }
    }

    // ---- call protocol ----

    /// `call(fn_val, args, caller_env)` (spec §4.5): allocate a new frame
    /// whose parent is the callee's captured environment, bind parameters,
    /// run the body, and catch the `return` unwind at this boundary.
    pub fn call(&self, callee: &Value, args: Vec<Value>, span: Span) -> Eval<Value> {
        match callee {
            Value::Closure(closure) => {
                let bindings = closure.params.iter().copied().zip(args).collect();
                self.call_body(&closure.captures, bindings, closure.body, span)
            }
            Value::Recursive(cell) => {
                let inner = cell.borrow().clone();
                match inner {
                    Some(value) => self.call(&value, args, span),
                    None => Err(RuntimeAbort::new("recursive binding called before it finished initializing", span).into()),
                }
            }
            Value::Builtin(b) => (b.func)(self, &args, span).map_err(Into::into),
            _ => Err(RuntimeAbort::new(format!("cannot call a {}", callee.type_name()), span).into()),
        }
    }

    fn call_body(&self, captures: &FxHashMap<Name, Value>, bindings: Vec<(Name, Value)>, body: StmtRange, span: Span) -> Eval<Value> {
        let frame = Environment::from_captures(captures);
        for (name, value) in bindings {
            frame.define(name, value, Mutability::Mutable);
        }
        let mut frame = frame;
        match self.exec_block_body(&mut frame, body) {
            Ok(value) => Ok(value),
            Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Break) => Err(RuntimeAbort::new("'break' used outside a loop", span).into()),
            Err(other @ Unwind::Abort(_)) => Err(other),
        }
    }

    pub fn some(&self, inner: Value) -> Value {
        Value::variant(self.well_known.some, vec![inner])
    }

    pub fn none(&self) -> Value {
        Value::variant(self.well_known.none, Vec::new())
    }

    pub fn ok(&self, inner: Value) -> Value {
        Value::variant(self.well_known.ok, vec![inner])
    }

    pub fn err(&self, inner: Value) -> Value {
        Value::variant(self.well_known.err, vec![inner])
    }

    /// Build a `Cons`/`Nil` list value out of a Rust vector, back to front.
    pub fn make_list(&self, items: impl DoubleEndedIterator<Item = Value>) -> Value {
        let mut list = Value::variant(self.well_known.nil, Vec::new());
        for item in items.rev() {
            list = Value::variant(self.well_known.cons, vec![item, list]);
        }
        list
    }

    pub fn host(&self) -> &SharedHost {
        &self.host
    }

    pub fn interner(&self) -> &kira_ir::StringInterner {
        &self.program.interner
    }

    pub fn some_name(&self) -> Name {
        self.well_known.some
    }

    pub fn none_name(&self) -> Name {
        self.well_known.none
    }

    pub fn ok_name(&self) -> Name {
        self.well_known.ok
    }

    pub fn err_name(&self) -> Name {
        self.well_known.err
    }

    pub fn cons_name(&self) -> Name {
        self.well_known.cons
    }

    pub fn nil_name(&self) -> Name {
        self.well_known.nil
    }

    /// Walk a `Cons`/`Nil` list value into a `Vec`, for `std.list`
    /// builtins that need to work with Rust-native slices.
    pub fn list_to_vec(&self, value: &Value, span: Span) -> Eval<Vec<Value>> {
        let mut out = Vec::new();
        let mut node = value.clone();
        loop {
            match node {
                Value::Variant(data) if data.name == self.well_known.nil && data.args.is_empty() => break,
                Value::Variant(data) if data.name == self.well_known.cons && data.args.len() == 2 => {
                    out.push(data.args[0].clone());
                    node = data.args[1].clone();
                }
                _ => return Err(RuntimeAbort::new("expected a List value", span).into()),
            }
        }
        Ok(out)
    }
}

fn undefined_message(program: &Program, name: Name) -> String {
    format!("undefined symbol '{}'", program.interner.resolve(name))
}

fn unwind_to_abort(unwind: Unwind) -> RuntimeAbort {
    match unwind {
        Unwind::Abort(a) => a,
        Unwind::Return(_) => RuntimeAbort::new("'return' used outside a function body", Span::DUMMY),
        Unwind::Break => RuntimeAbort::new("'break' used outside a loop", Span::DUMMY),
    }
}

/// Scan every `impl` block and trait default body for methods, keyed by
/// `(target type name, method name)`. Inherent `impl` methods take
/// priority; a trait's default body only fills in a method a matching
/// `impl` block (naming that trait) didn't itself override.
fn build_methods(program: &Program) -> MethodMap {
    let mut map = MethodMap::default();
    let mut impls = Vec::new();
    let mut trait_defaults: FxHashMap<Name, Vec<(Name, Vec<Name>, StmtRange)>> = FxHashMap::default();

    for &id in &program.decls {
        match program.decl(id) {
            Decl::Impl(impl_decl) => {
                let Some(target_name) = impl_target_name(program, impl_decl.target) else { continue };
                for method in &impl_decl.methods {
                    if let Some(body) = method.body {
                        let params = method.params.iter().map(|p| p.name).collect();
                        map.insert((target_name, method.name), MethodEntry { params, body });
                    }
                }
                impls.push((target_name, impl_decl.trait_name));
            }
            Decl::Trait(trait_decl) => {
                let defaults = trait_decl
                    .methods
                    .iter()
                    .filter_map(|sig| {
                        let body = sig.default_body?;
                        let params = sig.params.iter().map(|p| p.name).collect();
                        Some((sig.name, params, body))
                    })
                    .collect();
                trait_defaults.insert(trait_decl.name, defaults);
            }
            _ => {}
        }
    }

    for (target_name, trait_name) in impls {
        let Some(trait_name) = trait_name else { continue };
        let Some(defaults) = trait_defaults.get(&trait_name) else { continue };
        for (method_name, params, body) in defaults {
            map.entry((target_name, *method_name)).or_insert_with(|| MethodEntry { params: params.clone(), body: *body });
        }
    }

    map
}

fn impl_target_name(program: &Program, target: kira_ir::TypeAstId) -> Option<Name> {
    match &program.arena.ty(target).kind {
        TypeAstKind::Named(name) => Some(*name),
        TypeAstKind::Generic { base, .. } => Some(*base),
        _ => None,
    }
}

/// `main`'s interned name, if the program ever spelled it (used only by
/// `Interpreter::run_main`, never a hot path).
fn find_main(program: &Program) -> Option<Name> {
    program.functions().find(|(_, f)| program.interner.resolve(f.name) == "main").map(|(_, f)| f.name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use kira_ir::ast::{Param, Visibility};
    use kira_ir::{Arena, StringInterner};
    use kira_symbols::SymbolTable as Symbols;
    use pretty_assertions::assert_eq;

    use crate::host::native_host;

    /// `fn double(x: i32) -> i32 { return x * 2 }` built directly, then
    /// called through the public `Interpreter` API.
    fn build_double_program() -> Program {
        let mut arena = Arena::new();
        let mut interner = StringInterner::new();
        let x = interner.intern("x");
        let double = interner.intern("double");
        let i32_ty = arena.alloc_type(kira_ir::ast::TypeAst {
            kind: TypeAstKind::Primitive(kira_ir::ast::PrimitiveType::Int(kira_ir::ast::IntWidth::I32)),
            span: Span::DUMMY,
        });

        let x_ident = arena.alloc_expr(kira_ir::ast::Expr {
            kind: ExprKind::Identifier { name: x, generic_args: None },
            span: Span::DUMMY,
        });
        let two = arena.alloc_expr(kira_ir::ast::Expr { kind: ExprKind::IntLiteral(2), span: Span::DUMMY });
        let mul = arena.alloc_expr(kira_ir::ast::Expr {
            kind: ExprKind::Binary { op: kira_ir::BinaryOp::Mul, lhs: x_ident, rhs: two },
            span: Span::DUMMY,
        });
        let ret = arena.alloc_stmt(kira_ir::ast::Stmt { kind: StmtKind::Return(Some(mul)), span: Span::DUMMY });
        let body = arena.alloc_stmt_list([ret]);

        let func = FunctionDecl {
            name: double,
            generics: Vec::new(),
            params: vec![Param { name: x, ty: i32_ty, span: Span::DUMMY }],
            return_ty: i32_ty,
            is_effect: false,
            visibility: Visibility::Public,
            body: Some(body),
            where_clause: Vec::new(),
            doc: None,
            span: Span::DUMMY,
        };
        let decl_id = arena.alloc_decl(Decl::Function(func));

        let mut program = Program::new(arena, interner, String::new());
        program.decls.push(decl_id);
        program
    }

    #[test]
    fn calling_a_top_level_function_evaluates_its_body() {
        let mut program = build_double_program();
        let types = TypeTable::new();
        let symbols = Symbols::new();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).expect("builds");

        let double_name = interp.program.interner.resolve(interp.program.functions().next().unwrap().1.name).to_string();
        assert_eq!(double_name, "double");

        let double = interp.globals.lookup(interp.program.functions().next().unwrap().1.name).unwrap();
        let result = interp.call(&double, vec![Value::int(21, kira_ir::ast::IntWidth::I32)], Span::DUMMY).unwrap();
        assert_eq!(result, Value::int(42, kira_ir::ast::IntWidth::I32));
    }

    /// `std.string.length("hi")`, built as a real `Field`/`Field`/`Identifier`
    /// callee chain under a `Call` expression, exercised through `eval_expr`
    /// end to end — not by calling `stdlib::dispatch` directly.
    #[test]
    fn a_std_qualified_call_routes_through_std_path_and_stdlib_dispatch() {
        let mut arena = Arena::new();
        let mut interner = StringInterner::new();
        let std_name = interner.intern("std");
        let string_name = interner.intern("string");
        let length_name = interner.intern("length");

        let std_ident = arena.alloc_expr(kira_ir::ast::Expr {
            kind: ExprKind::Identifier { name: std_name, generic_args: None },
            span: Span::DUMMY,
        });
        let std_string = arena.alloc_expr(kira_ir::ast::Expr {
            kind: ExprKind::Field { base: std_ident, name: string_name },
            span: Span::DUMMY,
        });
        let callee = arena.alloc_expr(kira_ir::ast::Expr {
            kind: ExprKind::Field { base: std_string, name: length_name },
            span: Span::DUMMY,
        });
        let hi = interner.intern("hi");
        let arg = arena.alloc_expr(kira_ir::ast::Expr { kind: ExprKind::StringLiteral(hi), span: Span::DUMMY });
        let args = arena.alloc_expr_list([arg]);
        let call = arena.alloc_expr(kira_ir::ast::Expr { kind: ExprKind::Call { callee, args }, span: Span::DUMMY });

        let mut program = Program::new(arena, interner, String::new());
        let types = TypeTable::new();
        let symbols = Symbols::new();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).expect("builds");
        let env = Environment::new_root();

        let result = interp.eval_expr(&env, call).unwrap();
        assert_eq!(result, Value::int(2, crate::operators::DEFAULT_INT_WIDTH));
    }
}
