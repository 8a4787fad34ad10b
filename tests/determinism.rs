use std::collections::HashSet;
use std::thread;

use persist_core::pickling::{dumps, loads, SetReducer, StandardPickler};
use persist_core::types::{Blob, Object, Value, ValueSet};
use proptest::prelude::*;

fn int_set(order: &[i64]) -> Value {
    Value::set(order.iter().map(|i| Value::Int(*i)))
}

fn str_frozenset(order: &[&str]) -> Value {
    Value::frozenset(order.iter().map(|s| Value::from(*s)))
}

#[test]
fn set_encoding_ignores_insertion_order() {
    let a = dumps(&int_set(&[3, 1, 2])).unwrap();
    let b = dumps(&int_set(&[1, 2, 3])).unwrap();
    let c = dumps(&int_set(&[2, 3, 1])).unwrap();

    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn frozenset_encoding_ignores_insertion_order() {
    let a = dumps(&str_frozenset(&["b", "c", "a"])).unwrap();
    let b = dumps(&str_frozenset(&["a", "b", "c"])).unwrap();
    assert_eq!(a, b);
}

#[test]
fn set_and_frozenset_with_same_elements_encode_differently() {
    let set = dumps(&int_set(&[1, 2])).unwrap();
    let frozen = dumps(&Value::frozenset([Value::Int(1), Value::Int(2)])).unwrap();
    assert_ne!(set, frozen);
}

#[test]
fn nested_sets_are_canonicalized_at_any_depth() {
    let build = |order: &[i64], tags: &[&str]| {
        let inner = Object::new("app.Result")
            .with_attr("ids", int_set(order))
            .with_attr("tags", str_frozenset(tags));
        Value::List(vec![
            Value::Int(7),
            Value::dict([
                (Value::from("result"), Value::Object(inner)),
                (
                    Value::from("groups"),
                    Value::Tuple(vec![Value::List(vec![int_set(order)])]),
                ),
            ]),
        ])
    };

    let a = dumps(&build(&[5, 4, 9, 1], &["x", "y", "z"])).unwrap();
    let b = dumps(&build(&[1, 9, 4, 5], &["z", "x", "y"])).unwrap();
    assert_eq!(a, b);
}

#[test]
fn sets_of_tuples_are_canonicalized() {
    let pair = |a: i64, b: &str| Value::Tuple(vec![Value::Int(a), Value::from(b)]);

    let a = Value::set([pair(2, "b"), pair(1, "z"), pair(1, "a")]);
    let b = Value::set([pair(1, "a"), pair(2, "b"), pair(1, "z")]);
    assert_eq!(dumps(&a).unwrap(), dumps(&b).unwrap());
}

#[test]
fn mixed_numeric_set_is_deterministic() {
    let a = Value::set([Value::Float(2.5), Value::Int(1), Value::Bool(true), Value::Int(-3)]);
    let b = Value::set([Value::Int(-3), Value::Bool(true), Value::Float(2.5), Value::Int(1)]);
    assert_eq!(dumps(&a).unwrap(), dumps(&b).unwrap());
}

#[test]
fn standard_pickler_depends_on_insertion_order() {
    let a = StandardPickler.dump(&int_set(&[3, 1, 2])).unwrap();
    let b = StandardPickler.dump(&int_set(&[1, 2, 3])).unwrap();
    assert_ne!(a, b);

    // Both still decode to the same logical set.
    assert_eq!(loads(&a).unwrap(), loads(&b).unwrap());
}

#[test]
fn deterministic_blob_decodes_with_generic_loads() {
    let standard = StandardPickler.dump(&int_set(&[1, 2, 3])).unwrap();
    let sorted = dumps(&int_set(&[3, 2, 1])).unwrap();

    // Sorted order matches ascending insertion, so the two coincide here.
    assert_eq!(standard, sorted);
    assert_eq!(loads(&sorted).unwrap(), int_set(&[1, 2, 3]));
}

#[test]
fn golden_set_bytes() {
    let blob = dumps(&int_set(&[2, 1])).unwrap();

    // four ops: Int(1), Int(2), List(2), Reduce { builtins.set, 1 }
    // (ints are zigzag varints: 1 -> 2, 2 -> 4)
    let mut expected = vec![4u8, 2, 2, 2, 4, 6, 2, 9, 12];
    expected.extend_from_slice(b"builtins.set");
    expected.push(1);

    assert_eq!(blob.as_bytes(), expected.as_slice());
}

#[test]
fn signed_zeros_collapse_to_one_encoding() {
    let a = Value::set([Value::Float(0.0), Value::Float(-0.0), Value::Float(2.0)]);
    let b = Value::set([Value::Float(2.0), Value::Float(-0.0), Value::Float(0.0)]);

    assert_eq!(a, b);
    assert_eq!(dumps(&a).unwrap(), dumps(&b).unwrap());

    let zero_tuple = |z: f64| Value::Tuple(vec![Value::Int(1), Value::Float(z)]);
    let c = Value::frozenset([zero_tuple(0.0), zero_tuple(-0.0)]);
    let d = Value::frozenset([zero_tuple(-0.0), zero_tuple(0.0)]);
    assert_eq!(dumps(&c).unwrap(), dumps(&d).unwrap());
}

#[test]
fn large_mixed_kind_set_fails_without_panicking() {
    for n in [21_i64, 40, 64, 100, 2000] {
        let items = (0..n).map(|i| {
            if i % 7 == 0 {
                Value::from(format!("item-{i}"))
            } else {
                Value::Int(i)
            }
        });
        let err = dumps(&Value::set(items)).unwrap_err();
        assert!(
            matches!(err, persist_core::pickling::SerializationError::Unorderable { .. }),
            "n={n}: {err}"
        );
    }
}

#[test]
fn large_ints_sort_exactly_next_to_floats() {
    let big = 1_i64 << 53;
    let a = Value::set([Value::Int(big + 1), Value::Float(big as f64)]);
    let b = Value::set([Value::Float(big as f64), Value::Int(big + 1)]);

    let blob = dumps(&a).unwrap();
    assert_eq!(blob, dumps(&b).unwrap());
    assert_eq!(
        blob,
        StandardPickler
            .dump(&Value::set([Value::Float(big as f64), Value::Int(big + 1)]))
            .unwrap()
    );
}

#[test]
fn digest_is_stable_for_equal_values() {
    let a = dumps(&int_set(&[10, 20, 30])).unwrap();
    let b = dumps(&int_set(&[30, 10, 20])).unwrap();

    assert_eq!(a.digest(), b.digest());
    assert!(a.digest().starts_with("sha256:"));
    assert_eq!(a.digest().len(), "sha256:".len() + 64);
}

#[test]
fn concurrent_encoding_produces_identical_blobs() {
    let handles: Vec<_> = (0..8)
        .map(|n| {
            thread::spawn(move || {
                let mut order: Vec<i64> = (0..50).collect();
                order.rotate_left(n * 5);
                dumps(&Value::List(vec![int_set(&order)])).unwrap()
            })
        })
        .collect();

    let blobs: Vec<Blob> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for blob in &blobs[1..] {
        assert_eq!(blob, &blobs[0]);
    }
}

fn permuted_pairs() -> impl Strategy<Value = (Vec<i64>, Vec<i64>)> {
    prop::collection::hash_set(any::<i64>(), 0..24)
        .prop_map(|s: HashSet<i64>| s.into_iter().collect::<Vec<_>>())
        .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
}

proptest! {
    #[test]
    fn prop_set_encoding_is_order_independent((a, b) in permuted_pairs()) {
        let left = dumps(&int_set(&a)).unwrap();
        let right = dumps(&int_set(&b)).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_nested_encoding_is_order_independent(
        (a, b) in permuted_pairs(),
        key in "[a-z]{1,8}",
    ) {
        let wrap = |order: &[i64]| Value::dict([(
            Value::from(key.as_str()),
            Value::Tuple(vec![Value::frozenset(order.iter().map(|i| Value::Int(*i)))]),
        )]);
        prop_assert_eq!(dumps(&wrap(&a)).unwrap(), dumps(&wrap(&b)).unwrap());
    }

    #[test]
    fn prop_string_sets_round_trip(items in prop::collection::vec("[a-z0-9]{0,6}", 0..16)) {
        let set: ValueSet = items.iter().map(|s| Value::from(s.as_str())).collect();
        let value = Value::Set(set);
        let decoded = loads(&dumps(&value).unwrap()).unwrap();
        prop_assert_eq!(decoded, value);
    }
}
