mod common;
use common::registry;

use std::sync::Arc;

use zenreg::{Constant, RegistryError, Symbol};

#[test]
fn distinct_globals_are_all_queryable() {
    let (mut reg, _) = registry();
    for (i, name) in ["print", "recipes", "oreDict", "furnace"].iter().enumerate() {
        reg.register_global(*name, Symbol::constant(Constant::Int(i as i64))).unwrap();
    }

    assert_eq!(reg.globals().len(), 4);
    assert_eq!(reg.global("recipes"), Some(&Symbol::constant(Constant::Int(1))));
    assert_eq!(reg.global("furnace"), Some(&Symbol::constant(Constant::Int(3))));
    assert_eq!(reg.global("missing"), None);
}

#[test]
fn duplicate_global_is_an_error_and_table_is_unchanged() {
    let (mut reg, logger) = registry();
    let first = Symbol::constant(Constant::String("first".into()));
    reg.register_global("recipes", Arc::clone(&first)).unwrap();

    let err = reg
        .register_global("recipes", Symbol::constant(Constant::String("second".into())))
        .unwrap_err();

    assert_eq!(err, RegistryError::DuplicateSymbol { name: "recipes".into() });
    assert_eq!(reg.globals().len(), 1);
    assert!(Arc::ptr_eq(reg.global("recipes").unwrap(), &first));
    // Hard errors are returned, not logged.
    assert!(logger.is_empty());
}

#[test]
fn globals_do_not_shadow_namespace_entries() {
    let (mut reg, _) = registry();
    reg.register_native_class(&common::ore_dict()).unwrap();
    reg.register_global("mods", Symbol::constant(Constant::Bool(true))).unwrap();

    assert!(reg.root().package("mods.ore").is_some());
    assert_eq!(reg.global("mods"), Some(&Symbol::constant(Constant::Bool(true))));
}
