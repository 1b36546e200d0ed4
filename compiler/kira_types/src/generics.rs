//! Generic instantiation: substituting type variables throughout a
//! resolved type recursively (spec §4.3, "Generic instantiation substitutes
//! type variables throughout a resolved type recursively, producing a
//! fresh instantiated copy").

use rustc_hash::FxHashMap;

use kira_ir::Name;
use kira_symbols::Type;

pub fn substitute(ty: &Type, subst: &FxHashMap<Name, Type>) -> Type {
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

pub fn substitute_all(tys: &[Type], subst: &FxHashMap<Name, Type>) -> Vec<Type> {
    tys.iter().map(|t| substitute(t, subst)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kira_ir::StringInterner;

    #[test]
    fn substitutes_var_inside_option() {
        let mut interner = StringInterner::new();
        let t = interner.intern("T");
        let ty = Type::option(Type::Var(t));
        let mut subst = FxHashMap::default();
        subst.insert(t, Type::Primitive(kira_ir::ast::PrimitiveType::Bool));
        let result = substitute(&ty, &subst);
        assert_eq!(result, Type::option(Type::Primitive(kira_ir::ast::PrimitiveType::Bool)));
    }

    #[test]
    fn leaves_unrelated_vars_alone() {
        let mut interner = StringInterner::new();
        let t = interner.intern("T");
        let u = interner.intern("U");
        let ty = Type::Var(u);
        let mut subst = FxHashMap::default();
        subst.insert(t, Type::Void);
        assert_eq!(substitute(&ty, &subst), Type::Var(u));
    }
}
