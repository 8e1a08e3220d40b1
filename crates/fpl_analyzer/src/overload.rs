use fpl_type::{
  function::{FunctionInstance, param_list},
  types::{Substitution, Type, TypeId, TypeStore},
};

#[derive(Debug)]
pub(crate) enum Resolution {
  Found(FunctionInstance),
  NoMatch,
  Ambiguous(Vec<FunctionInstance>),
}

/// Picks the one overload accepting `args`. When an argument is already
/// Error, ambiguity is resolved to the first candidate so nothing cascades.
pub(crate) fn resolve_overload(
  types: &TypeStore,
  candidates: &[FunctionInstance],
  args: &[TypeId],
) -> Resolution {
  let matching: Vec<&FunctionInstance> = candidates.iter().filter(|c| accepts(types, c, args)).collect();
  let has_error = args.iter().any(|a| types.is_error(a));

  match matching.as_slice() {
    [] => Resolution::NoMatch,
    [single] => Resolution::Found((*single).clone()),
    [first, ..] if has_error => Resolution::Found((*first).clone()),
    many => Resolution::Ambiguous(many.iter().map(|c| (*c).clone()).collect()),
  }
}

pub(crate) fn accepts(
  types: &TypeStore,
  candidate: &FunctionInstance,
  args: &[TypeId],
) -> bool {
  let params = &candidate.param_types;

  if !candidate.is_vararg {
    return params.len() == args.len() && params.iter().zip(args).all(|(p, a)| types.is_assignable_from(p, a));
  }

  let Some((element, fixed)) = params.split_last() else {
    return false;
  };
  if args.len() < fixed.len() {
    return false;
  }

  let (fixed_args, rest) = args.split_at(fixed.len());
  fixed.iter().zip(fixed_args).all(|(p, a)| types.is_assignable_from(p, a))
    && rest.iter().all(|a| types.is_assignable_from(element, a))
}

/// `fred(Int,String)`, the call as written, for diagnostics.
pub(crate) fn call_description(
  types: &TypeStore,
  name: &str,
  args: &[TypeId],
) -> String {
  format!("{}({})", name, param_list(types, args, false))
}

/// Binds type parameters appearing in `params` from the matching argument types.
pub(crate) fn infer_substitution(
  types: &TypeStore,
  params: &[TypeId],
  args: &[TypeId],
) -> Substitution {
  let mut subst = Substitution::new();
  for (param, arg) in params.iter().zip(args) {
    unify(types, *param, *arg, &mut subst);
  }
  subst
}

fn unify(
  types: &TypeStore,
  param: TypeId,
  arg: TypeId,
  subst: &mut Substitution,
) {
  match (types.get(&param), types.get(&arg)) {
    (Type::TypeParameter { .. }, _) => {
      subst.entry(param).or_insert(arg);
    },
    (Type::Array(p), Type::Array(a))
    | (Type::Array(p), Type::InlineArray { element: a, .. })
    | (Type::Range(p), Type::Range(a))
    | (Type::Nullable(p), Type::Nullable(a))
    | (Type::ErrorUnion(p), Type::ErrorUnion(a)) => unify(types, *p, *a, subst),
    (Type::Nullable(p), _) | (Type::ErrorUnion(p), _) => unify(types, *p, arg, subst),
    (Type::Class { class: pc, args: pa }, Type::Class { class: ac, args: aa }) if pc == ac => {
      for (p, a) in pa.iter().zip(aa) {
        unify(types, *p, *a, subst);
      }
    },
    _ => {},
  }
}

#[cfg(test)]
mod tests {
  use fpl_type::{Id, span::Span};

  use super::*;

  fn instance(
    name: &str,
    params: Vec<TypeId>,
    is_vararg: bool,
    types: &TypeStore,
  ) -> FunctionInstance {
    FunctionInstance {
      function: Id::new(0),
      name: name.to_string(),
      param_types: params,
      this_type: None,
      is_vararg,
      return_type: types.unit(),
      substitution: Substitution::new(),
    }
  }

  #[test]
  fn vararg_accepts_empty_tail_only_after_fixed_params() {
    let types = TypeStore::new();
    let int = types.int();
    let fred = instance("fred", vec![int, int], true, &types);

    assert!(!accepts(&types, &fred, &[]));
    assert!(accepts(&types, &fred, &[int]));
    assert!(accepts(&types, &fred, &[int, int, int, int]));
    assert!(!accepts(&types, &fred, &[int, types.string()]));
  }

  #[test]
  fn ambiguity_reported_unless_argument_is_error() {
    let mut types = TypeStore::new();
    let string = types.string();
    let nullable = types.nullable(string);
    let candidates = vec![
      instance("f", vec![nullable], false, &types),
      instance("f", vec![types.any()], false, &types),
    ];

    match resolve_overload(&types, &candidates, &[string]) {
      Resolution::Ambiguous(found) => assert_eq!(found.len(), 2),
      other => panic!("expected ambiguity, got {:?}", other),
    }
    assert!(matches!(
      resolve_overload(&types, &candidates, &[types.error()]),
      Resolution::Found(_)
    ));
  }

  #[test]
  fn infers_class_parameter_from_argument() {
    let mut types = TypeStore::new();
    let class = types.new_class("Box", Span::default(), &["T".to_string()]);
    let t = types.class(&class).type_params[0];
    let array_t = types.array(t);
    let int = types.int();
    let array_int = types.array(int);

    let subst = infer_substitution(&types, &[array_t], &[array_int]);
    assert_eq!(subst.get(&t), Some(&int));
    assert_eq!(call_description(&types, "fred", &[int, array_int]), "fred(Int,Array<Int>)");
  }
}
