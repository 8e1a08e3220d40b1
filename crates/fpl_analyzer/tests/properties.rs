mod common;

use std::collections::HashSet;

use fpl_analyzer::{PathContext, merge};
use fpl_type::{Id, symbol::SymbolId};
use proptest::prelude::*;

fn sym(i: u32) -> SymbolId {
  Id::new(i)
}

/// A path with some of symbols 0..8 uninitialized, possibly unreachable.
fn path() -> impl Strategy<Value = PathContext> {
  (
    prop::collection::vec(0u32..8, 0..5),
    prop::collection::vec(0u32..8, 0..5),
    any::<bool>(),
  )
    .prop_map(|(uninit, maybe, unreachable)| {
      let mut path = PathContext::new();
      for s in uninit {
        path = path.add_uninitialized(sym(s));
      }
      for s in maybe {
        path.maybe_uninitialized.insert(sym(s));
      }
      if unreachable { path.set_unreachable() } else { path }
    })
}

/// Function bodies that check cleanly.
fn valid_body() -> impl Strategy<Value = String> {
  prop_oneof![
    Just("return 1".to_string()),
    Just("val x = 1\n    return x".to_string()),
    Just("var x:Int\n    x = 2\n    return x".to_string()),
    Just("if (a=1)\n        return 1\n    else\n        return 2".to_string()),
    Just("var t = 0\n    for i in 0..<a\n        t += i\n    return t".to_string()),
  ]
}

fn valid_program() -> impl Strategy<Value = String> {
  valid_body().prop_map(|body| format!("fun f(a:Int) -> Int\n    {}\n", body))
}

proptest! {
    #[test]
    fn unreachable_inputs_do_not_change_merge(paths in prop::collection::vec(path(), 1..5)) {
        let reachable: Vec<_> = paths.iter().filter(|p| !p.unreachable).cloned().collect();
        let mut padded = paths.clone();
        padded.push(PathContext::unreachable());

        prop_assert_eq!(merge(&padded), merge(&paths));
        if !reachable.is_empty() {
            prop_assert_eq!(merge(&paths), merge(&reachable));
        }
    }

    #[test]
    fn merge_intersects_uninitialized_and_unions_maybe(paths in prop::collection::vec(path(), 1..5)) {
        let merged = merge(&paths);
        let reachable: Vec<_> = paths.iter().filter(|p| !p.unreachable).collect();
        prop_assert_eq!(merged.unreachable, reachable.is_empty());

        for s in (0..8).map(sym) {
            if reachable.is_empty() {
                continue;
            }
            let all = reachable.iter().all(|p| p.is_uninitialized(s));
            let any = reachable.iter().any(|p| p.is_maybe_uninitialized(s));
            prop_assert_eq!(merged.is_uninitialized(s), all);
            prop_assert_eq!(merged.is_maybe_uninitialized(s), any);
        }
    }

    #[test]
    fn merge_ignores_input_order(mut paths in prop::collection::vec(path(), 1..5)) {
        let forward = merge(&paths);
        paths.reverse();
        let backward = merge(&paths);

        let set = |p: &PathContext| p.uninitialized.iter().copied().collect::<HashSet<_>>();
        prop_assert_eq!(set(&forward), set(&backward));
        prop_assert_eq!(forward.maybe_uninitialized, backward.maybe_uninitialized);
    }

    #[test]
    fn valid_programs_check_cleanly(src in valid_program()) {
        let out = common::check(&src);
        prop_assert!(out.starts_with("top\n"), "unexpected diagnostics: {}", out);
    }

    #[test]
    fn checking_is_deterministic(src in valid_program()) {
        prop_assert_eq!(common::check(&src), common::check(&src));
    }
}
