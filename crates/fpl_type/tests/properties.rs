use fpl_type::types::{TypeId, TypeStore};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Shape {
  Int,
  Char,
  Real,
  Bool,
  String,
  Any,
  Array(Box<Shape>),
  Nullable(Box<Shape>),
  ErrorUnion(Box<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
  let leaf = prop_oneof![
    Just(Shape::Int),
    Just(Shape::Char),
    Just(Shape::Real),
    Just(Shape::Bool),
    Just(Shape::String),
    Just(Shape::Any),
  ];
  leaf.prop_recursive(3, 12, 1, |inner| {
    prop_oneof![
      inner.clone().prop_map(|s| Shape::Array(Box::new(s))),
      inner.clone().prop_map(|s| Shape::Nullable(Box::new(s))),
      inner.prop_map(|s| Shape::ErrorUnion(Box::new(s))),
    ]
  })
}

fn build(
  types: &mut TypeStore,
  shape: &Shape,
) -> TypeId {
  match shape {
    Shape::Int => types.int(),
    Shape::Char => types.char(),
    Shape::Real => types.real(),
    Shape::Bool => types.bool(),
    Shape::String => types.string(),
    Shape::Any => types.any(),
    Shape::Array(inner) => {
      let inner = build(types, inner);
      types.array(inner)
    },
    Shape::Nullable(inner) => {
      let inner = build(types, inner);
      types.nullable(inner)
    },
    Shape::ErrorUnion(inner) => {
      let inner = build(types, inner);
      types.error_union(inner)
    },
  }
}

proptest! {
    #[test]
    fn building_a_type_twice_interns_it(s in shape()) {
        let mut types = TypeStore::new();
        let first = build(&mut types, &s);
        let second = build(&mut types, &s);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn assignability_is_reflexive(s in shape()) {
        let mut types = TypeStore::new();
        let ty = build(&mut types, &s);
        prop_assert!(types.is_assignable_from(&ty, &ty));
    }

    #[test]
    fn error_and_any_accept_everything(s in shape()) {
        let mut types = TypeStore::new();
        let ty = build(&mut types, &s);
        let error = types.error();
        let any = types.any();
        let nothing = types.nothing();

        prop_assert!(types.is_assignable_from(&error, &ty));
        prop_assert!(types.is_assignable_from(&ty, &error));
        prop_assert!(types.is_assignable_from(&any, &ty));
        prop_assert!(types.is_assignable_from(&ty, &nothing));
    }

    #[test]
    fn nullable_is_idempotent(s in shape()) {
        let mut types = TypeStore::new();
        let ty = build(&mut types, &s);
        let once = types.nullable(ty);
        let twice = types.nullable(once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn display_does_not_depend_on_the_store(a in shape(), b in shape()) {
        let mut shared = TypeStore::new();
        build(&mut shared, &a);
        let in_shared = build(&mut shared, &b);

        let mut fresh = TypeStore::new();
        let in_fresh = build(&mut fresh, &b);

        prop_assert_eq!(shared.display(&in_shared), fresh.display(&in_fresh));
    }
}
