//! Tests for dispatch resolution.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::resolver::Dispatcher;
use crate::config::{CacheConfig, DispatchConfig};
use crate::error::DispatchError;
use crate::types::{Builtins, ClassId, TypeUniverse};

fn builtins() -> (Arc<TypeUniverse>, Builtins) {
    let (universe, b) = TypeUniverse::with_builtins().unwrap();
    (Arc::new(universe), b)
}

fn dispatcher(universe: &Arc<TypeUniverse>) -> Dispatcher<TypeUniverse, &'static str> {
    Dispatcher::new(Arc::clone(universe), "default")
}

#[test]
fn test_object_resolves_to_default() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);

    assert_eq!(dispatch.resolve(b.object), Ok("default"));
    dispatch.register(b.int, "int").unwrap();
    assert_eq!(dispatch.resolve(b.object), Ok("default"));
}

#[test]
fn test_unregistered_type_falls_back() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    dispatch.register(b.str, "str").unwrap();

    assert_eq!(dispatch.resolve(b.float), Ok("default"));
    assert_eq!(dispatch.resolve(b.list), Ok("default"));
}

#[test]
fn test_bool_resolves_to_int() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    dispatch.register(b.int, "int_impl").unwrap();
    dispatch.register(b.object, "default").unwrap();

    assert_eq!(dispatch.resolve(b.bool), Ok("int_impl"));
    assert_eq!(dispatch.resolve(b.int), Ok("int_impl"));
}

#[test]
fn test_exact_match_wins() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    dispatch.register(b.int, "int").unwrap();
    dispatch.register(b.bool, "bool").unwrap();
    dispatch.register(b.hashable, "hashable").unwrap();

    assert_eq!(dispatch.resolve(b.bool), Ok("bool"));
    assert_eq!(dispatch.resolve(b.int), Ok("int"));
    assert_eq!(dispatch.resolve(b.hashable), Ok("hashable"));
}

#[test]
fn test_reregistration_is_reflected() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    dispatch.register(b.float, "f").unwrap();
    assert_eq!(dispatch.resolve(b.float), Ok("f"));

    dispatch.register(b.float, "f2").unwrap();
    assert_eq!(dispatch.resolve(b.float), Ok("f2"));
}

#[test]
fn test_unrelated_registration_keeps_answers() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    dispatch.register(b.int, "int").unwrap();
    assert_eq!(dispatch.resolve(b.bool), Ok("int"));

    dispatch.register(b.str, "str").unwrap();
    assert_eq!(dispatch.cache_len(), 0);
    assert_eq!(dispatch.resolve(b.bool), Ok("int"));
}

#[test]
fn test_more_specific_registration_changes_answer() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    dispatch.register(b.int, "int").unwrap();
    assert_eq!(dispatch.resolve(b.bool), Ok("int"));

    dispatch.register(b.bool, "bool").unwrap();
    assert_eq!(dispatch.resolve(b.bool), Ok("bool"));
}

#[test]
fn test_most_specific_capability_wins() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    dispatch.register(b.iterable, "iterable").unwrap();
    dispatch.register(b.sequence, "sequence").unwrap();
    dispatch.register(b.mapping, "mapping").unwrap();

    assert_eq!(dispatch.resolve(b.list), Ok("sequence"));
    assert_eq!(dispatch.resolve(b.tuple), Ok("sequence"));
    assert_eq!(dispatch.resolve(b.dict), Ok("mapping"));
    assert_eq!(dispatch.resolve(b.int), Ok("default"));
}

#[test]
fn test_ambiguous_unrelated_capabilities() {
    let universe = Arc::new(TypeUniverse::new());
    let sequence = universe.define_abstract("Sequence", &[], &[]).unwrap();
    let iterable = universe.define_abstract("Iterable", &[], &[]).unwrap();
    let list_like = universe.define_class("ListLike", &[], &[]).unwrap();
    universe.register_virtual(sequence, list_like).unwrap();
    universe.register_virtual(iterable, list_like).unwrap();

    let dispatch = dispatcher(&universe);
    dispatch.register(sequence, "seq").unwrap();
    dispatch.register(iterable, "iter").unwrap();

    let err = dispatch.resolve(list_like).unwrap_err();
    assert_eq!(
        err,
        DispatchError::Ambiguous {
            first: "Iterable".to_string(),
            second: "Sequence".to_string(),
        }
    );
    assert_eq!(err.to_string(), "Ambiguous dispatch: Iterable or Sequence");

    // Failures are not memoized; a direct registration settles it.
    assert_eq!(dispatch.cache_len(), 0);
    dispatch.register(list_like, "list_like").unwrap();
    assert_eq!(dispatch.resolve(list_like), Ok("list_like"));
}

#[test]
fn test_chain_member_beats_unrelated_capability() {
    let universe = Arc::new(TypeUniverse::new());
    let runnable = universe.define_abstract("Runnable", &[], &["run"]).unwrap();
    let base = universe.define_class("Base", &[], &[]).unwrap();
    let child = universe.define_class("Child", &[base], &["run"]).unwrap();

    let dispatch = dispatcher(&universe);
    dispatch.register(runnable, "runnable").unwrap();
    dispatch.register(base, "base").unwrap();

    assert_eq!(dispatch.resolve(child), Ok("base"));
}

#[test]
fn test_capability_below_own_ancestor() {
    let universe = Arc::new(TypeUniverse::new());
    let runnable = universe.define_abstract("Runnable", &[], &["run"]).unwrap();
    let base = universe.define_class("Base", &[], &["run"]).unwrap();
    let child = universe.define_class("Child", &[base], &[]).unwrap();

    let dispatch = dispatcher(&universe);
    dispatch.register(runnable, "runnable").unwrap();
    assert_eq!(dispatch.resolve(child), Ok("runnable"));

    dispatch.register(base, "base").unwrap();
    assert_eq!(dispatch.resolve(child), Ok("base"));
}

#[test]
fn test_virtual_registration_invalidates_cache() {
    let universe = Arc::new(TypeUniverse::new());
    let drawable = universe.define_abstract("Drawable", &[], &[]).unwrap();
    let shape = universe.define_class("Shape", &[], &[]).unwrap();

    let dispatch = dispatcher(&universe);
    dispatch.register(drawable, "draw").unwrap();
    assert!(dispatch.is_tracking_virtual());
    assert_eq!(dispatch.resolve(shape), Ok("default"));
    assert_eq!(dispatch.cache_len(), 1);

    universe.register_virtual(drawable, shape).unwrap();
    assert_eq!(dispatch.resolve(shape), Ok("draw"));
}

#[test]
fn test_concrete_registrations_do_not_track_virtual() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    dispatch.register(b.int, "int").unwrap();
    dispatch.register(b.list, "list").unwrap();
    assert!(!dispatch.is_tracking_virtual());

    dispatch.register(b.sequence, "sequence").unwrap();
    assert!(dispatch.is_tracking_virtual());
}

#[test]
fn test_register_rejects_foreign_type() {
    let universe = Arc::new(TypeUniverse::new());
    let (_, b) = builtins();
    let dispatch = dispatcher(&universe);

    let err = dispatch.register(b.dict, "dict").unwrap_err();
    assert!(matches!(err, DispatchError::NotAType(_)));
    assert_eq!(dispatch.registry().len(), 1);
}

#[test]
fn test_register_returns_implementation() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    assert_eq!(dispatch.register(b.int, "int"), Ok("int"));
}

#[test]
fn test_marker_types_are_never_composed() {
    let universe = Arc::new(TypeUniverse::new());
    let marker = universe.define_marker("Marker").unwrap();
    let a = universe.define_class("A", &[], &[]).unwrap();
    universe.register_virtual(marker, a).unwrap();

    let dispatch = dispatcher(&universe);
    dispatch.register(marker, "marker").unwrap();

    assert_eq!(dispatch.resolve(a), Ok("default"));
    assert_eq!(dispatch.resolve(marker), Ok("marker"));
}

#[test]
fn test_cache_hits_counted() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    dispatch.register(b.int, "int").unwrap();

    for _ in 0..3 {
        assert_eq!(dispatch.resolve(b.bool), Ok("int"));
    }

    let stats = dispatch.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.invalidations, 1);
}

#[test]
fn test_clear_cache() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    dispatch.resolve(b.int).unwrap();
    dispatch.resolve(b.str).unwrap();
    assert_eq!(dispatch.cache_len(), 2);

    dispatch.clear_cache();
    assert_eq!(dispatch.cache_len(), 0);
    assert_eq!(dispatch.resolve(b.int), Ok("default"));
}

#[test]
fn test_uncached_dispatcher() {
    let (universe, b) = builtins();
    let dispatch = Dispatcher::with_config(
        Arc::clone(&universe),
        "default",
        DispatchConfig::uncached(),
    );
    dispatch.register(b.int, "int").unwrap();

    assert_eq!(dispatch.resolve(b.bool), Ok("int"));
    assert_eq!(dispatch.resolve(b.bool), Ok("int"));
    assert_eq!(dispatch.cache_len(), 0);
    assert_eq!(dispatch.stats().misses, 2);
}

#[test]
fn test_cache_capacity_bound() {
    let (universe, b) = builtins();
    let config = DispatchConfig {
        cache: CacheConfig {
            enabled: true,
            max_entries: Some(2),
        },
    };
    let dispatch = Dispatcher::with_config(Arc::clone(&universe), "default", config);

    for class in [b.int, b.bool, b.float, b.str] {
        dispatch.resolve(class).unwrap();
        assert!(dispatch.cache_len() <= 2);
    }
    assert_eq!(dispatch.stats().invalidations, 1);
    assert_eq!(dispatch.resolve(b.str), Ok("default"));
}

#[test]
fn test_zero_capacity_stores_nothing() {
    let (universe, b) = builtins();
    let config = DispatchConfig {
        cache: CacheConfig {
            enabled: true,
            max_entries: Some(0),
        },
    };
    let dispatch = Dispatcher::with_config(Arc::clone(&universe), "default", config);
    dispatch.register(b.int, "int").unwrap();

    assert_eq!(dispatch.resolve(b.bool), Ok("int"));
    assert_eq!(dispatch.resolve(b.bool), Ok("int"));
    assert_eq!(dispatch.cache_len(), 0);
    let stats = dispatch.stats();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.invalidations, 1);
}

#[test]
fn test_registry_view() {
    let (universe, b) = builtins();
    let dispatch = dispatcher(&universe);
    dispatch.register(b.int, "int").unwrap();

    let view = dispatch.registry();
    assert_eq!(view.keys().collect::<Vec<_>>(), vec![ClassId::OBJECT, b.int]);
    assert_eq!(view.get(b.int), Some(&"int"));
}
