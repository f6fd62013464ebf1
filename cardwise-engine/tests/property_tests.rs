//! Property-based tests for combination selection
use cardwise_core::Strategy as Pick;
use cardwise_core::{Card, Constraints, RewardCategoryRate, SignupBonus, SpendingProfile};
use cardwise_engine::{select_combination, value_card};
use proptest::prelude::*;

const CATEGORIES: &[&str] = &["dining", "groceries", "gas", "travel", "other"];

fn card_strategy() -> impl Strategy<Value = (f64, Vec<(usize, f64, Option<f64>)>, Option<(f64, f64)>)> {
    (
        prop_oneof![Just(0.0), Just(95.0), Just(250.0), Just(695.0)],
        prop::collection::vec((0..CATEGORIES.len(), 0.0f64..8.0, prop::option::of(500.0f64..10_000.0)), 0..4),
        prop::option::of((50.0f64..1500.0, 0.0f64..6000.0)),
    )
}

fn build_catalog(raw: Vec<(f64, Vec<(usize, f64, Option<f64>)>, Option<(f64, f64)>)>) -> Vec<Card> {
    raw.into_iter()
        .enumerate()
        .map(|(i, (fee, rates, bonus))| {
            let mut card = Card::new(i.to_string(), format!("Card {i}"), "bank").with_annual_fee(fee);
            for (c, rate, cap) in rates {
                let mut r = RewardCategoryRate::new(CATEGORIES[c], rate);
                r.cap = cap;
                card = card.with_rate(r);
            }
            if let Some((amount, min_spend)) = bonus {
                card = card.with_signup_bonus(SignupBonus::dollars(amount, min_spend, 3));
            }
            card
        })
        .collect()
}

fn profile_strategy() -> impl Strategy<Value = SpendingProfile> {
    prop::collection::vec(0.0f64..2000.0, CATEGORIES.len()).prop_map(|amounts| {
        SpendingProfile::new(CATEGORIES.iter().copied().zip(amounts)).unwrap()
    })
}

fn constraints_strategy() -> impl Strategy<Value = Constraints> {
    (
        1usize..4,
        prop::option::of(prop_oneof![Just(0.0), Just(95.0), Just(300.0), Just(1000.0)]),
        prop::bool::ANY,
    )
        .prop_map(|(n, ceiling, marginal)| {
            let mut c = Constraints::new(n);
            c.max_annual_fees = ceiling;
            if marginal {
                c.strategy = Pick::Marginal;
            }
            c
        })
}

proptest! {
    #[test]
    fn fee_ceiling_and_cardinality_respected(
        raw in prop::collection::vec(card_strategy(), 0..8),
        profile in profile_strategy(),
        constraints in constraints_strategy(),
    ) {
        let catalog = build_catalog(raw);
        let result = select_combination(&catalog, &profile, &constraints).unwrap();

        prop_assert!(result.card_count <= constraints.max_cards);
        prop_assert_eq!(result.card_count, result.recommended_sequence.len());
        if let Some(max) = constraints.max_annual_fees {
            prop_assert!(result.total_annual_fees <= max + 1e-9);
        }
    }

    #[test]
    fn no_category_is_counted_twice(
        raw in prop::collection::vec(card_strategy(), 1..8),
        profile in profile_strategy(),
        constraints in constraints_strategy(),
    ) {
        let catalog = build_catalog(raw);
        let result = select_combination(&catalog, &profile, &constraints).unwrap();

        // each category is bounded by the best selected card's standalone value for it
        let mut bound = 0.0;
        let mut bonuses = 0.0;
        for id in &result.recommended_sequence {
            let card = catalog.iter().find(|c| &c.id == id).unwrap();
            let v = value_card(card, &profile);
            bonuses += v.signup_bonus_value + v.credits_value;
        }
        for category in profile.categories() {
            let best = result
                .recommended_sequence
                .iter()
                .filter_map(|id| catalog.iter().find(|c| &c.id == id))
                .map(|card| value_card(card, &profile).rewards_by_category[category].value)
                .fold(0.0, f64::max);
            bound += best;
        }
        prop_assert!((result.total_value - (bound + bonuses)).abs() < 1e-6);

        let mut seen = std::collections::HashSet::new();
        for detail in result.card_details.values() {
            for category in &detail.attributed_categories {
                prop_assert!(seen.insert(category.clone()), "{} attributed twice", category);
            }
        }
    }

    #[test]
    fn selection_is_idempotent(
        raw in prop::collection::vec(card_strategy(), 0..8),
        profile in profile_strategy(),
        constraints in constraints_strategy(),
    ) {
        let catalog = build_catalog(raw);
        let first = select_combination(&catalog, &profile, &constraints).unwrap();
        let second = select_combination(&catalog, &profile, &constraints).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn projection_ends_at_net_value(
        raw in prop::collection::vec(card_strategy(), 1..6),
        profile in profile_strategy(),
    ) {
        let catalog = build_catalog(raw);
        let result = select_combination(&catalog, &profile, &Constraints::new(3)).unwrap();
        prop_assert!((result.per_month_value[11] - result.net_value).abs() < 1e-6);
    }
}
