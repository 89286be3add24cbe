#![forbid(unsafe_code)]

//! Proptest strategies over bound values.

use proptest::prelude::*;

use trellis_runtime::value::BoundValue;

/// Any bound value, weighted toward the truthiness boundary cases.
pub fn bound_value() -> impl Strategy<Value = BoundValue> {
    prop_oneof![
        any::<bool>().prop_map(BoundValue::Bool),
        prop::sample::select(vec![0.0, 1.0, -1.0, f64::NAN]).prop_map(BoundValue::Num),
        prop::sample::select(vec!["", "0", "false", "text"]).prop_map(BoundValue::from),
        Just(BoundValue::Null),
        Just(BoundValue::Undefined),
        (0_u64..4).prop_map(BoundValue::Sym),
    ]
}

/// A short sequence of bound values to toggle through.
pub fn toggle_sequence(max_len: usize) -> impl Strategy<Value = Vec<BoundValue>> {
    prop::collection::vec(bound_value(), 1..=max_len)
}
