//! Packaging of a selected combination into the caller-facing result shape.

use crate::projection::{PROJECTION_MONTHS, project_monthly};
use crate::selection::Attribution;
use crate::valuation::{CardValuation, CategoryReward};
use cardwise_core::{CARD_CREDITS, SIGNUP_BONUS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of `rewards_by_category`: a real category, or the dollar amount
/// of the signup bonus or card credits line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RewardEntry {
    Category(CategoryReward),
    Amount(f64),
}

/// Per-card breakdown inside a recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardDetail {
    pub card_name: String,
    /// Standalone annual value, bonus and credits included
    pub annual_value: f64,
    pub net_value: f64,
    pub annual_fee: f64,
    /// Share of the combination total credited to this card
    pub attributed_value: f64,
    pub attributed_categories: Vec<String>,
    pub rewards_by_category: BTreeMap<String, RewardEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub recommended_sequence: Vec<String>,
    pub card_details: BTreeMap<String, CardDetail>,
    /// Attributed category value plus eligible signup bonuses and credits
    pub total_value: f64,
    pub total_annual_fees: f64,
    /// `total_value - total_annual_fees`
    pub net_value: f64,
    pub card_count: usize,
    pub per_month_value: [f64; PROJECTION_MONTHS],
}

impl RecommendationResult {
    pub fn is_empty(&self) -> bool {
        self.card_count == 0
    }
}

fn detail(valuation: &CardValuation, attribution: &Attribution, pick: usize) -> CardDetail {
    let mut rewards_by_category: BTreeMap<String, RewardEntry> = valuation
        .rewards_by_category
        .iter()
        .map(|(c, r)| (c.clone(), RewardEntry::Category(r.clone())))
        .collect();
    if valuation.signup_bonus_value > 0.0 {
        rewards_by_category.insert(
            SIGNUP_BONUS.to_string(),
            RewardEntry::Amount(valuation.signup_bonus_value),
        );
    }
    if valuation.credits_value > 0.0 {
        rewards_by_category.insert(CARD_CREDITS.to_string(), RewardEntry::Amount(valuation.credits_value));
    }

    CardDetail {
        card_name: valuation.card_name.clone(),
        annual_value: valuation.annual_value,
        net_value: valuation.net_value,
        annual_fee: valuation.annual_fee,
        attributed_value: attribution.credited_to(pick)
            + valuation.signup_bonus_value
            + valuation.credits_value,
        attributed_categories: attribution.categories_won(pick),
        rewards_by_category,
    }
}

/// Build the result for `picks` (in selection order) and their attribution.
pub fn assemble(picks: &[&CardValuation], attribution: &Attribution) -> RecommendationResult {
    let category_total = attribution.category_total();
    let bonus_total: f64 = picks.iter().map(|v| v.signup_bonus_value).sum();
    let credits_total: f64 = picks.iter().map(|v| v.credits_value).sum();
    let total_annual_fees: f64 = picks.iter().map(|v| v.annual_fee).sum();
    let total_value = category_total + bonus_total + credits_total;

    let bonuses = picks
        .iter()
        .filter_map(|v| v.signup_bonus_month.map(|m| (m, v.signup_bonus_value)));
    let per_month_value = project_monthly(category_total + credits_total, bonuses, total_annual_fees);

    let card_details = picks
        .iter()
        .enumerate()
        .map(|(pick, v)| (v.card_id.clone(), detail(v, attribution, pick)))
        .collect();

    RecommendationResult {
        recommended_sequence: picks.iter().map(|v| v.card_id.clone()).collect(),
        card_details,
        total_value,
        total_annual_fees,
        net_value: total_value - total_annual_fees,
        card_count: picks.len(),
        per_month_value,
    }
}
