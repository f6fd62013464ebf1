//! Standalone annual value of one card for one spending profile.

use cardwise_core::{Card, SpendingProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reward earned in one category, with the cap split kept for auditing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryReward {
    pub main_rate: f64,
    pub main_spend: f64,
    pub limit: Option<f64>,
    pub base_rate: f64,
    pub base_spend: f64,
    /// Points, miles, or dollars for cash-back cards
    pub points_earned: f64,
    /// Dollar value of `points_earned`
    pub value: f64,
}

impl CategoryReward {
    /// Dollars per dollar spent, after cap tiering and the card multiplier.
    pub fn effective_rate(&self) -> f64 {
        let spend = self.main_spend + self.base_spend;
        if spend > 0.0 { self.value / spend } else { 0.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardValuation {
    pub card_id: String,
    pub card_name: String,
    pub annual_fee: f64,
    pub rewards_by_category: BTreeMap<String, CategoryReward>,
    pub total_reward_value: f64,
    /// Full bonus value when the minimum spend is reachable, otherwise 0
    pub signup_bonus_value: f64,
    /// Zero-based month the bonus lands in; `None` when not earned
    pub signup_bonus_month: Option<usize>,
    /// Annual statement credits for categories the profile spends in
    pub credits_value: f64,
    pub annual_value: f64,
    pub net_value: f64,
}

/// Reward for one category: explicit rate if listed, base rate otherwise.
pub fn value_category(card: &Card, category: &str, annual_spend: f64) -> CategoryReward {
    let base_rate = card.base_rate();
    let multiplier = card.reward_value_multiplier;

    let (main_rate, limit) = match card.rate_for(category) {
        Some(entry) => (entry.rate, entry.cap),
        None => (base_rate, None),
    };

    let (main_spend, base_spend) = match limit {
        Some(cap) => (annual_spend.min(cap), (annual_spend - cap).max(0.0)),
        None => (annual_spend, 0.0),
    };

    let points_earned = main_spend * main_rate / 100.0 + base_spend * base_rate / 100.0;

    CategoryReward {
        main_rate,
        main_spend,
        limit,
        base_rate,
        base_spend,
        points_earned,
        value: points_earned * multiplier,
    }
}

/// Value `card` against `profile` in isolation from any other card.
pub fn value_card(card: &Card, profile: &SpendingProfile) -> CardValuation {
    let rewards_by_category: BTreeMap<String, CategoryReward> = profile
        .iter()
        .map(|(category, _)| {
            let reward = value_category(card, category, profile.annual(category));
            (category.to_string(), reward)
        })
        .collect();

    let total_reward_value: f64 = rewards_by_category.values().map(|r| r.value).sum();

    let total_monthly = profile.total_monthly();
    let (signup_bonus_value, signup_bonus_month) = match &card.signup_bonus {
        Some(bonus) if bonus.is_reachable(total_monthly) => (
            bonus.dollar_value(card.reward_value_multiplier),
            Some(bonus.earned_month(total_monthly)),
        ),
        _ => (0.0, None),
    };

    let credits_value: f64 = card
        .credits
        .iter()
        .filter(|credit| profile.monthly(&credit.category) > 0.0)
        .map(|credit| credit.annual_value())
        .sum();

    let annual_value = total_reward_value + signup_bonus_value + credits_value;

    tracing::trace!(
        card_id = %card.id,
        total_reward_value,
        signup_bonus_value,
        credits_value,
        annual_fee = card.annual_fee,
        "valued card"
    );

    CardValuation {
        card_id: card.id.clone(),
        card_name: card.name.clone(),
        annual_fee: card.annual_fee,
        rewards_by_category,
        total_reward_value,
        signup_bonus_value,
        signup_bonus_month,
        credits_value,
        annual_value,
        net_value: annual_value - card.annual_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardwise_core::{CardCredit, RewardCategoryRate, SignupBonus};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_base_rate_fallback_with_multiplier() {
        let card = Card::new("1", "Venture", "capone")
            .with_multiplier(1.5)
            .with_rate(RewardCategoryRate::new("other", 2.0));
        let profile = SpendingProfile::new([("dining", 500.0)]).unwrap();

        let v = value_card(&card, &profile);
        assert!(approx(v.annual_value, 180.0));
        assert!(approx(v.net_value, 180.0));
        assert_eq!(v.rewards_by_category["dining"].main_rate, 2.0);
    }

    #[test]
    fn test_capped_category_tiers_to_base_rate() {
        let card = Card::new("2", "Gas Card", "citi")
            .with_rate(RewardCategoryRate::new("gas", 5.0).with_cap(1000.0))
            .with_rate(RewardCategoryRate::new("other", 1.0));
        let profile = SpendingProfile::new([("gas", 200.0)]).unwrap();

        let v = value_card(&card, &profile);
        let gas = &v.rewards_by_category["gas"];
        assert!(approx(gas.main_spend, 1000.0));
        assert!(approx(gas.base_spend, 1400.0));
        assert!(approx(gas.points_earned, 64.0));
        assert!(approx(v.total_reward_value, 64.0));
    }

    #[test]
    fn test_cap_above_spend_keeps_everything_at_main_rate() {
        let card = Card::new("2", "Gas Card", "citi")
            .with_rate(RewardCategoryRate::new("gas", 5.0).with_cap(10_000.0));
        let profile = SpendingProfile::new([("gas", 100.0)]).unwrap();

        let gas = &value_card(&card, &profile).rewards_by_category["gas"];
        assert!(approx(gas.main_spend, 1200.0));
        assert_eq!(gas.base_spend, 0.0);
        assert!(approx(gas.value, 60.0));
    }

    #[test]
    fn test_zero_cap_sends_all_spend_to_base() {
        let card = Card::new("3", "Odd", "bank")
            .with_rate(RewardCategoryRate::new("dining", 4.0).with_cap(0.0))
            .with_rate(RewardCategoryRate::new("other", 1.5));
        let profile = SpendingProfile::new([("dining", 100.0)]).unwrap();

        let dining = &value_card(&card, &profile).rewards_by_category["dining"];
        assert_eq!(dining.main_spend, 0.0);
        assert!(approx(dining.value, 18.0));
    }

    #[test]
    fn test_zero_rate_does_not_fall_back() {
        let card = Card::new("4", "No Gas", "bank")
            .with_rate(RewardCategoryRate::new("gas", 0.0))
            .with_rate(RewardCategoryRate::new("other", 2.0));
        let profile = SpendingProfile::new([("gas", 100.0), ("pet supplies", 100.0)]).unwrap();

        let v = value_card(&card, &profile);
        assert_eq!(v.rewards_by_category["gas"].value, 0.0);
        assert!(approx(v.rewards_by_category["pet_supplies"].value, 24.0));
    }

    #[test]
    fn test_signup_bonus_credited_in_full_when_reachable() {
        let card = Card::new("5", "Bonus", "bank")
            .with_annual_fee(95.0)
            .with_signup_bonus(SignupBonus::dollars(200.0, 1000.0, 3));
        let profile = SpendingProfile::new([("groceries", 400.0)]).unwrap();

        let v = value_card(&card, &profile);
        assert_eq!(v.signup_bonus_value, 200.0);
        assert_eq!(v.signup_bonus_month, Some(2));
        assert!(approx(v.annual_value, 48.0 + 200.0));
        assert!(approx(v.net_value, 48.0 + 200.0 - 95.0));
    }

    #[test]
    fn test_signup_bonus_dropped_when_unreachable() {
        let card = Card::new("5", "Bonus", "bank")
            .with_signup_bonus(SignupBonus::reward_units(60_000.0, 4000.0, 3));
        let profile = SpendingProfile::new([("groceries", 1000.0)]).unwrap();

        let v = value_card(&card, &profile);
        assert_eq!(v.signup_bonus_value, 0.0);
        assert_eq!(v.signup_bonus_month, None);
    }

    #[test]
    fn test_empty_profile_values_to_bonus_minus_fee() {
        let card = Card::new("6", "Free Bonus", "bank")
            .with_annual_fee(50.0)
            .with_signup_bonus(SignupBonus::dollars(100.0, 0.0, 3));
        let v = value_card(&card, &SpendingProfile::default());
        assert!(v.rewards_by_category.is_empty());
        assert!(approx(v.net_value, 50.0));
    }

    #[test]
    fn test_credits_count_only_for_categories_with_spend() {
        let card = Card::new("7", "Credits", "amex")
            .with_annual_fee(250.0)
            .with_credit(CardCredit::new("dining", 10.0, 12))
            .with_credit(CardCredit::new("streaming", 20.0, 12))
            .with_credit(CardCredit::new("travel", 200.0, 1));
        let profile = SpendingProfile::new([("dining", 100.0), ("travel", 0.0)]).unwrap();

        let v = value_card(&card, &profile);
        assert!(approx(v.credits_value, 120.0));
        // dining 1% of 1200 = 12
        assert!(approx(v.annual_value, 12.0 + 120.0));
        assert!(approx(v.net_value, 132.0 - 250.0));
    }

    #[test]
    fn test_effective_rate() {
        let card = Card::new("2", "Gas Card", "citi")
            .with_rate(RewardCategoryRate::new("gas", 5.0).with_cap(1000.0))
            .with_rate(RewardCategoryRate::new("other", 1.0));
        let gas = value_category(&card, "gas", 2400.0);
        assert!(approx(gas.effective_rate(), 64.0 / 2400.0));
        assert_eq!(value_category(&card, "gas", 0.0).effective_rate(), 0.0);
    }
}
