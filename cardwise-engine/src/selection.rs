//! Card combination selection with category exclusivity.
//!
//! Cards are ranked by standalone net value, then picked under the count and
//! fee ceilings. Once the set is fixed each profile category is credited to
//! exactly one selected card: the one earning the most for it.

use crate::assembly::{RecommendationResult, assemble};
use crate::valuation::{CardValuation, value_card};
use cardwise_core::{Card, Constraints, SpendingProfile, Strategy, ValidationError};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// A catalog card with its standalone valuation.
#[derive(Debug, Clone)]
pub struct RankedCard<'a> {
    pub card: &'a Card,
    pub valuation: CardValuation,
    /// Position in the caller's catalog, last tie-breaker
    pub catalog_index: usize,
}

/// Which selected card is credited with a category, and for how much.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAttribution {
    /// Index into the selection order
    pub pick: usize,
    pub value: f64,
}

/// Category credit for a fixed selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attribution {
    pub by_category: BTreeMap<String, CategoryAttribution>,
}

impl Attribution {
    pub fn category_total(&self) -> f64 {
        self.by_category.values().map(|a| a.value).sum()
    }

    /// Summed category value credited to the card at `pick`.
    pub fn credited_to(&self, pick: usize) -> f64 {
        self.by_category
            .values()
            .filter(|a| a.pick == pick)
            .map(|a| a.value)
            .sum()
    }

    pub fn categories_won(&self, pick: usize) -> Vec<String> {
        self.by_category
            .iter()
            .filter(|(_, a)| a.pick == pick)
            .map(|(c, _)| c.clone())
            .collect()
    }
}

fn validate_catalog(catalog: &[Card]) -> Result<(), ValidationError> {
    let mut ids = HashSet::new();
    for card in catalog {
        card.validate()?;
        if !ids.insert(card.id.as_str()) {
            return Err(ValidationError::DuplicateCardId(card.id.clone()));
        }
    }
    Ok(())
}

fn is_eligible(card: &Card, constraints: &Constraints) -> bool {
    if let Some(issuer) = &constraints.preferred_issuer_id {
        if &card.issuer_id != issuer {
            return false;
        }
    }
    match constraints.reward_type {
        Some(wanted) => card.reward_type == wanted,
        None => true,
    }
}

fn rank_order(a: &RankedCard<'_>, b: &RankedCard<'_>) -> Ordering {
    b.valuation
        .net_value
        .total_cmp(&a.valuation.net_value)
        .then_with(|| a.card.annual_fee.total_cmp(&b.card.annual_fee))
        .then_with(|| a.catalog_index.cmp(&b.catalog_index))
}

/// Standalone valuations of every eligible card, best first.
///
/// Ties on net value go to the lower annual fee, then to catalog order.
pub fn rank_cards<'a>(
    catalog: &'a [Card],
    profile: &SpendingProfile,
    constraints: &Constraints,
) -> Result<Vec<RankedCard<'a>>, ValidationError> {
    constraints.validate()?;
    validate_catalog(catalog)?;

    let mut ranked: Vec<RankedCard<'a>> = catalog
        .iter()
        .enumerate()
        .filter(|(_, card)| is_eligible(card, constraints))
        .map(|(catalog_index, card)| RankedCard {
            card,
            valuation: value_card(card, profile),
            catalog_index,
        })
        .collect();

    ranked.sort_by(rank_order);
    Ok(ranked)
}

/// Credit each profile category to the selected card earning the most for it.
///
/// Ties keep the earlier card in selection order. Categories nobody earns
/// anything on are left out.
pub fn attribute(picks: &[&CardValuation], profile: &SpendingProfile) -> Attribution {
    let mut by_category = BTreeMap::new();
    for category in profile.categories() {
        let mut best: Option<CategoryAttribution> = None;
        for (pick, valuation) in picks.iter().enumerate() {
            let value = valuation
                .rewards_by_category
                .get(category)
                .map(|r| r.value)
                .unwrap_or(0.0);
            let better = match &best {
                Some(current) => value > current.value,
                None => value > 0.0,
            };
            if better {
                best = Some(CategoryAttribution { pick, value });
            }
        }
        if let Some(winner) = best {
            by_category.insert(category.to_string(), winner);
        }
    }
    Attribution { by_category }
}

/// Attributed category value + bonuses + credits - fees for a candidate set.
fn combination_net(picks: &[&CardValuation], profile: &SpendingProfile) -> f64 {
    let categories = attribute(picks, profile).category_total();
    let per_card: f64 = picks
        .iter()
        .map(|v| v.signup_bonus_value + v.credits_value - v.annual_fee)
        .sum();
    categories + per_card
}

fn pick_standalone<'a>(ranked: Vec<RankedCard<'a>>, constraints: &Constraints) -> Vec<RankedCard<'a>> {
    let mut picks = Vec::new();
    let mut fees = 0.0;
    for candidate in ranked {
        if picks.len() >= constraints.max_cards {
            break;
        }
        if !constraints.fee_fits(fees, candidate.card.annual_fee) {
            tracing::debug!(
                card_id = %candidate.card.id,
                annual_fee = candidate.card.annual_fee,
                fees_so_far = fees,
                "skipping card over fee ceiling"
            );
            continue;
        }
        fees += candidate.card.annual_fee;
        picks.push(candidate);
    }
    picks
}

fn pick_marginal<'a>(
    mut remaining: Vec<RankedCard<'a>>,
    profile: &SpendingProfile,
    constraints: &Constraints,
) -> Vec<RankedCard<'a>> {
    let mut picks: Vec<RankedCard<'a>> = Vec::new();
    while picks.len() < constraints.max_cards {
        let chosen: Vec<&CardValuation> = picks.iter().map(|p| &p.valuation).collect();
        let current = combination_net(&chosen, profile);
        let fees: f64 = chosen.iter().map(|v| v.annual_fee).sum();

        let mut best: Option<(usize, f64)> = None;
        for (i, candidate) in remaining.iter().enumerate() {
            if !constraints.fee_fits(fees, candidate.card.annual_fee) {
                continue;
            }
            let mut trial = chosen.clone();
            trial.push(&candidate.valuation);
            let gain = combination_net(&trial, profile) - current;
            if best.is_none_or(|(_, g)| gain > g) {
                best = Some((i, gain));
            }
        }

        match best {
            Some((i, gain)) if gain > 0.0 => {
                tracing::debug!(card_id = %remaining[i].card.id, gain, "adding card with best marginal gain");
                picks.push(remaining.remove(i));
            }
            _ => break,
        }
    }
    picks
}

/// Choose cards for `profile` under `constraints` and assemble the result.
///
/// Returns an empty recommendation, not an error, when no card qualifies.
pub fn select_combination(
    catalog: &[Card],
    profile: &SpendingProfile,
    constraints: &Constraints,
) -> Result<RecommendationResult, ValidationError> {
    let ranked = rank_cards(catalog, profile, constraints)?;
    let eligible = ranked.len();

    let picks = match constraints.strategy {
        Strategy::Standalone => pick_standalone(ranked, constraints),
        Strategy::Marginal => pick_marginal(ranked, profile, constraints),
    };

    let valuations: Vec<&CardValuation> = picks.iter().map(|p| &p.valuation).collect();
    let attribution = attribute(&valuations, profile);
    let result = assemble(&valuations, &attribution);

    tracing::info!(
        catalog = catalog.len(),
        eligible,
        selected = result.card_count,
        strategy = %constraints.strategy,
        total_value = result.total_value,
        total_annual_fees = result.total_annual_fees,
        "selected card combination"
    );

    Ok(result)
}
