//! Property-based tests for the responder
//!
//! These tests verify the responder's invariants across arbitrary input text.

use super::*;
use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        Just(Intent::Greeting),
        Just(Intent::AskTime),
        Just(Intent::AskDate),
        Just(Intent::AskJoke),
        Just(Intent::AskCapability),
        Just(Intent::Farewell),
        Just(Intent::Unknown),
    ]
}

fn arb_state() -> impl Strategy<Value = ConversationState> {
    (
        proptest::option::of(arb_intent()),
        0u64..10_000,
        any::<bool>(),
        proptest::option::of(0usize..JOKES.len() + 2),
    )
        .prop_map(
            |(last_intent, turn_count, should_exit, last_joke)| ConversationState {
                last_intent,
                turn_count,
                should_exit,
                last_joke,
            },
        )
}

fn arb_now() -> impl Strategy<Value = NaiveDateTime> {
    (1u32..=12, 1u32..=28, 0u32..24, 0u32..60).prop_map(|(month, day, hour, minute)| {
        NaiveDate::from_ymd_opt(2026, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    })
}

/// Phrases that hit the keyword table, mixed with filler words
fn arb_phrase() -> impl Strategy<Value = String> {
    let words = prop_oneof![
        Just("hello"),
        Just("bye"),
        Just("what time"),
        Just("the date"),
        Just("joke"),
        Just("help"),
        Just("weather"),
        Just("please"),
        Just("this"),
        Just("and"),
    ];
    proptest::collection::vec(words, 0..5).prop_map(|w| w.join(" "))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_any_input_gets_nonempty_reply(
        text in any::<String>(),
        state in arb_state(),
        now in arb_now(),
        seed in any::<u64>(),
    ) {
        let result = respond(&text, state, now, &mut StdRng::seed_from_u64(seed));
        prop_assert!(!result.reply.trim().is_empty());
    }

    #[test]
    fn prop_turn_count_increments_by_one(
        text in any::<String>(),
        state in arb_state(),
        now in arb_now(),
        seed in any::<u64>(),
    ) {
        let before = state.turn_count;
        let result = respond(&text, state, now, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(result.state.turn_count, before + 1);
    }

    #[test]
    fn prop_exit_iff_farewell(
        text in arb_phrase(),
        state in arb_state(),
        now in arb_now(),
        seed in any::<u64>(),
    ) {
        let result = respond(&text, state, now, &mut StdRng::seed_from_u64(seed));
        let is_farewell = result.state.last_intent == Some(Intent::Farewell);
        prop_assert_eq!(result.should_exit, is_farewell);
        prop_assert_eq!(result.state.should_exit, result.should_exit);
    }

    #[test]
    fn prop_classification_ignores_case_and_padding(
        text in arb_phrase(),
        left in "[ \t\n]{0,4}",
        right in "[ \t\n]{0,4}",
    ) {
        let padded = format!("{left}{}{right}", text.to_uppercase());
        prop_assert_eq!(classify(&normalize(&padded)), classify(&normalize(&text)));
    }

    #[test]
    fn prop_classification_independent_of_state(
        text in arb_phrase(),
        a in arb_state(),
        b in arb_state(),
        now in arb_now(),
    ) {
        let first = respond(&text, a, now, &mut StdRng::seed_from_u64(0));
        let second = respond(&text, b, now, &mut StdRng::seed_from_u64(0));
        prop_assert_eq!(first.state.last_intent, second.state.last_intent);
    }

    #[test]
    fn prop_fixed_replies_independent_of_state_and_seed(
        text in arb_phrase(),
        a in arb_state(),
        b in arb_state(),
        now in arb_now(),
        seed_a in any::<u64>(),
        seed_b in any::<u64>(),
    ) {
        let first = respond(&text, a, now, &mut StdRng::seed_from_u64(seed_a));
        let second = respond(&text, b, now, &mut StdRng::seed_from_u64(seed_b));
        prop_assert_eq!(first.intent(), second.intent());
        if matches!(
            first.intent(),
            Intent::Farewell
                | Intent::AskTime
                | Intent::AskDate
                | Intent::AskCapability
                | Intent::Unknown
        ) {
            prop_assert_eq!(first.reply, second.reply);
        }
    }

    #[test]
    fn prop_same_seed_same_reply(
        text in arb_phrase(),
        state in arb_state(),
        now in arb_now(),
        seed in any::<u64>(),
    ) {
        let first = respond(&text, state.clone(), now, &mut StdRng::seed_from_u64(seed));
        let second = respond(&text, state, now, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_whitespace_only_is_unknown(
        text in "[ \t\r\n]{0,12}",
        state in arb_state(),
        now in arb_now(),
    ) {
        let result = respond(&text, state, now, &mut StdRng::seed_from_u64(1));
        prop_assert_eq!(result.state.last_intent, Some(Intent::Unknown));
        prop_assert!(!result.should_exit);
    }
}
