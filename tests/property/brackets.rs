//! Property tests for the symbol table and the bracket handler chain.

#[path = "../integration/common/mod.rs"]
mod common;
use common::{FixedHandler, registry, tokens};

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;
use zenreg::{Constant, Symbol};

fn arb_handlers() -> impl Strategy<Value = Vec<(i32, String)>> {
    prop::collection::vec((-3i32..3, "[a-e]{1,2}"), 1..12)
}

proptest! {
    #[test]
    fn chain_order_ignores_registration_order(
        (handlers, shuffled) in arb_handlers().prop_flat_map(|h| (Just(h.clone()), Just(h).prop_shuffle()))
    ) {
        let order_of = |list: &[(i32, String)]| {
            let (mut reg, _) = registry();
            for (priority, identity) in list {
                reg.register_bracket_handler(FixedHandler::new(identity, *priority, ".*", None));
            }
            reg.bracket_handlers()
                .iter()
                .map(|h| (h.priority(), h.identity().into_owned()))
                .collect::<Vec<_>>()
        };

        let mut expected = handlers.clone();
        expected.sort();
        prop_assert_eq!(order_of(&handlers), expected.clone());
        prop_assert_eq!(order_of(&shuffled), expected);
    }

    #[test]
    fn first_handler_in_order_wins(handlers in arb_handlers()) {
        let (mut reg, _) = registry();
        for (priority, identity) in &handlers {
            let result = Symbol::constant(Constant::String(format!("{priority}/{identity}")));
            reg.register_bracket_handler(FixedHandler::new(identity, *priority, ".*", Some(result)));
        }

        let (priority, identity) = handlers.iter().min().unwrap();
        let env = reg.make_global_environment(BTreeMap::new());
        let resolved = env.resolve_bracket(&tokens("ore:ingotIron")).unwrap();
        prop_assert_eq!(&*resolved, &Symbol::Constant(Constant::String(format!("{priority}/{identity}"))));
    }

    #[test]
    fn distinct_globals_are_all_queryable(names in prop::collection::hash_set("[a-zA-Z_][a-zA-Z0-9_]{0,8}", 0..20)) {
        let (mut reg, _) = registry();
        for (i, name) in names.iter().enumerate() {
            reg.register_global(name.clone(), Symbol::constant(Constant::Int(i as i64))).unwrap();
        }

        prop_assert_eq!(reg.globals().len(), names.len());
        let bound: HashSet<&String> = reg.globals().keys().collect();
        prop_assert_eq!(bound, names.iter().collect::<HashSet<_>>());
    }

    #[test]
    fn duplicate_global_never_changes_table(name in "[a-z]{1,6}", first in any::<i64>(), second in any::<i64>()) {
        let (mut reg, _) = registry();
        reg.register_global(name.clone(), Symbol::constant(Constant::Int(first))).unwrap();
        prop_assert!(reg.register_global(name.clone(), Symbol::constant(Constant::Int(second))).is_err());
        prop_assert_eq!(reg.global(&name), Some(&Symbol::constant(Constant::Int(first))));
    }
}
