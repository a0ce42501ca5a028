//! Property tests for the cart invariants.
//!
//! Whatever sequence of operations is applied, every retained line item has
//! a quantity of at least 1 and no two line items share an id.

use std::collections::HashSet;

use cart_kit::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Increment(u8),
    Decrement(u8),
}

fn op() -> impl Strategy<Value = Op> {
    // A small id space so operations collide often.
    prop_oneof![
        (0u8..6).prop_map(Op::Add),
        (0u8..6).prop_map(Op::Increment),
        (0u8..6).prop_map(Op::Decrement),
    ]
}

fn apply(cart: &mut CartState, op: &Op) -> Change {
    match op {
        Op::Add(id) => cart.add(Product::new(
            format!("p{id}"),
            format!("Product {id}"),
            format!("https://img/{id}.png"),
            f64::from(*id) * 2.5,
        )
        .unwrap()),
        Op::Increment(id) => cart.increment(&format!("p{id}")),
        Op::Decrement(id) => cart.decrement(&format!("p{id}")),
    }
}

proptest! {
    #[test]
    fn quantities_stay_positive(ops in proptest::collection::vec(op(), 0..200)) {
        let mut cart = CartState::new();
        for op in &ops {
            apply(&mut cart, op);
            prop_assert!(cart.iter().all(|item| item.quantity() >= 1));
        }
    }

    #[test]
    fn ids_stay_unique(ops in proptest::collection::vec(op(), 0..200)) {
        let mut cart = CartState::new();
        for op in &ops {
            apply(&mut cart, op);
        }
        let ids: HashSet<&str> = cart.iter().map(CartItem::id).collect();
        prop_assert_eq!(ids.len(), cart.len());
    }

    #[test]
    fn unknown_ids_never_change_the_cart(ops in proptest::collection::vec(op(), 0..50)) {
        let mut cart = CartState::new();
        for op in &ops {
            apply(&mut cart, op);
        }
        let before = cart.clone();

        prop_assert_eq!(cart.increment("missing"), Change::Unchanged);
        prop_assert_eq!(cart.decrement("missing"), Change::Unchanged);
        prop_assert_eq!(cart, before);
    }

    #[test]
    fn total_quantity_tracks_changes(ops in proptest::collection::vec(op(), 0..200)) {
        let mut cart = CartState::new();
        let mut expected: u64 = 0;
        for op in &ops {
            match apply(&mut cart, op) {
                Change::Added | Change::Incremented { .. } => expected += 1,
                Change::Decremented { .. } | Change::Removed => expected -= 1,
                Change::Cleared { .. } | Change::Unchanged => {}
            }
        }
        prop_assert_eq!(cart.total_quantity(), expected);
    }
}

#[test]
fn add_then_drain_leaves_empty_cart() {
    let mut cart = CartState::new();
    for _ in 0..3 {
        cart.add(Product::new("A", "T", "u", 10.0).unwrap());
    }
    cart.add(Product::new("B", "T", "u", 5.0).unwrap());

    assert_eq!(cart.decrement("A"), Change::Decremented { quantity: 2 });
    assert_eq!(cart.decrement("A"), Change::Decremented { quantity: 1 });
    assert_eq!(cart.decrement("A"), Change::Removed);
    assert_eq!(cart.decrement("B"), Change::Removed);
    assert!(cart.is_empty());
    assert_eq!(cart.decrement("A"), Change::Unchanged);
}
