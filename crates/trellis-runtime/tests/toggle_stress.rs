//! Randomized toggle/flush sequences against the conditional controller.
//!
//! The model under test is small: after any flush, the host shows exactly
//! the branch selected by the latest written value, and between flushes the
//! host keeps showing the previously flushed branch.

use proptest::prelude::*;

use trellis_harness::strategies::{bound_value, toggle_sequence};
use trellis_harness::{hydrate_if_else, item_scope};
use trellis_runtime::{Bindable, LifecycleFlags, State};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn host_always_tracks_the_last_flushed_value(
        ops in prop::collection::vec((bound_value(), any::<bool>()), 1..24)
    ) {
        let (fixture, _else_attr) = hydrate_if_else("yes", "no");
        let scope = item_scope([("yes", "Y"), ("no", "N")]);

        fixture.if_attr.set_value(true, LifecycleFlags::empty());
        fixture.if_attr.bind(LifecycleFlags::FROM_BIND, &scope);
        fixture.run_attach();
        prop_assert_eq!(fixture.host_text(), "Y");

        let mut shown_truthy = true;
        for (value, flush) in ops {
            let written_truthy = value.is_truthy();
            fixture.if_attr.set_value(value, LifecycleFlags::empty());
            prop_assert_eq!(
                fixture.host_text(),
                if shown_truthy { "Y" } else { "N" },
                "writes alone never touch the DOM"
            );

            if flush {
                fixture.change_set.flush_changes();
                shown_truthy = written_truthy;
                prop_assert_eq!(
                    fixture.host_text(),
                    if shown_truthy { "Y" } else { "N" }
                );
                prop_assert_eq!(fixture.change_set.size(), 0);
            }
        }

        fixture.change_set.flush_changes();
        let final_truthy = fixture.if_attr.value().is_truthy();
        prop_assert_eq!(fixture.host_text(), if final_truthy { "Y" } else { "N" });

        let attached = [fixture.if_attr.if_view(), fixture.if_attr.else_view()]
            .into_iter()
            .flatten()
            .filter(|view| view.state().contains(State::IS_ATTACHED))
            .count();
        prop_assert!(attached <= 1, "never more than one branch attached");
    }

    #[test]
    fn at_most_one_reaction_is_ever_pending(values in toggle_sequence(16)) {
        let (fixture, _else_attr) = hydrate_if_else("yes", "no");
        let scope = item_scope([("yes", "Y"), ("no", "N")]);
        fixture.if_attr.set_value(false, LifecycleFlags::empty());
        fixture.if_attr.bind(LifecycleFlags::FROM_BIND, &scope);
        fixture.run_attach();

        for value in values {
            fixture.if_attr.set_value(value, LifecycleFlags::empty());
            prop_assert!(fixture.change_set.size() <= 1, "controller coalesces by identity");
        }
    }
}
