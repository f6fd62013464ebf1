//! Load card catalogs into validated [`Card`]s.
//!
//! Reward rates and signup bonuses are parsed here once, including the
//! legacy exports that stored them as serialized JSON text.

use anyhow::{Context, Result, bail};
use cardwise_core::card::DEFAULT_BONUS_MONTHS;
use cardwise_core::{Card, CardCredit, RewardCategoryRate, RewardType, SignupBonus, ValidationError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::parsers::csv_catalog::parse_catalog_csv;
use crate::types::{RawBonusField, RawCard, RawCredit, RawRewards, RawSignupBonus};

/// Dollars per reward unit when an export leaves the multiplier out.
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// Load a `.json` or `.csv` catalog, picking the parser by extension.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Card>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let cards = match ext.as_deref() {
        Some("csv") => parse_catalog_csv(path)?,
        Some("json") | None => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_catalog_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        Some(other) => bail!("unsupported catalog format `.{other}` for {}", path.display()),
    };

    tracing::info!(path = %path.display(), cards = cards.len(), "loaded card catalog");
    Ok(cards)
}

/// Parse a JSON catalog: a bare array of cards or `{ "cards": [...] }`.
///
/// Errors name the zero-based index of the card that failed.
pub fn parse_catalog_json(text: &str) -> Result<Vec<Card>> {
    let file: Value = serde_json::from_str(text).context("catalog is not valid JSON")?;
    let entries = match file {
        Value::Array(entries) => entries,
        Value::Object(mut top) => match top.remove("cards") {
            Some(Value::Array(entries)) => entries,
            _ => bail!("catalog object has no `cards` list"),
        },
        _ => bail!("catalog is not a card list"),
    };

    let mut cards = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let raw = raw_card(entry).with_context(|| format!("card at index {i}"))?;
        if let Some(card) = build_card(raw, i).with_context(|| format!("card at index {i}"))? {
            cards.push(card);
        }
    }
    Ok(cards)
}

fn raw_card(entry: &Value) -> Result<RawCard> {
    RawCard::deserialize(entry).map_err(|err| match offending_field(entry) {
        Some(field) => anyhow::Error::new(err).context(format!("field `{field}`")),
        None => anyhow::Error::new(err),
    })
}

/// First key of `entry` that fails to deserialize on its own.
fn offending_field(entry: &Value) -> Option<&str> {
    entry.as_object()?.iter().find_map(|(key, value)| {
        let alone = Value::Object(Map::from_iter([(key.clone(), value.clone())]));
        RawCard::deserialize(&alone).is_err().then_some(key.as_str())
    })
}

/// Turn one raw record into a validated card; `Ok(None)` for inactive cards.
///
/// `position` is the zero-based index in the source; its one-based form
/// stands in for a missing id.
pub fn build_card(raw: RawCard, position: usize) -> Result<Option<Card>, ValidationError> {
    let id = raw
        .id
        .map(|id| id.into_string())
        .unwrap_or_else(|| (position + 1).to_string());

    if raw.is_active == Some(false) || raw.discontinued == Some(true) {
        tracing::debug!(card_id = %id, "skipping inactive card");
        return Ok(None);
    }

    let name = raw.name.unwrap_or_default().trim().to_string();
    let label = if name.is_empty() {
        format!("#{id}")
    } else {
        format!("#{id} ({name})")
    };

    let issuer_id = raw.issuer_id.map(|i| i.into_string()).unwrap_or_default();
    let annual_fee = raw.annual_fee.ok_or_else(|| ValidationError::MissingField {
        card: label.clone(),
        field: "annual_fee",
    })?;

    let reward_type = match raw.reward_type.as_deref() {
        Some(s) if !s.trim().is_empty() => s.parse::<RewardType>()?,
        _ => RewardType::default(),
    };
    let multiplier = raw.reward_value_multiplier.unwrap_or(DEFAULT_MULTIPLIER);

    let mut card = Card::new(id, name, issuer_id)
        .with_annual_fee(annual_fee)
        .with_reward_type(reward_type)
        .with_multiplier(multiplier);

    for rate in reward_rates(raw.reward_categories, &label)? {
        if card.rate_for(&rate.category).is_some() {
            return Err(ValidationError::DuplicateCategory {
                card: label,
                category: rate.category,
            });
        }
        card = card.with_rate(rate);
    }

    if let Some(bonus) = signup_bonus(raw.signup_bonus, reward_type, &label)? {
        card = card.with_signup_bonus(bonus);
    }
    for credit in credits(raw.credits, &label)? {
        card = card.with_credit(credit);
    }

    card.validate()?;
    Ok(Some(card))
}

fn reward_rates(raw: Option<RawRewards>, label: &str) -> Result<Vec<RewardCategoryRate>, ValidationError> {
    let list = match raw {
        None => return Ok(Vec::new()),
        Some(RawRewards::List(list)) => list,
        Some(RawRewards::Blob(text)) if text.trim().is_empty() => return Ok(Vec::new()),
        Some(RawRewards::Blob(text)) => {
            serde_json::from_str(&text).map_err(|_| ValidationError::MissingField {
                card: label.to_string(),
                field: "reward_categories",
            })?
        }
    };

    list.into_iter()
        .map(|entry| {
            let rate = entry.rate.ok_or_else(|| ValidationError::MissingField {
                card: label.to_string(),
                field: "reward_categories.rate",
            })?;
            let mut parsed = RewardCategoryRate::new(&entry.category, rate);
            parsed.cap = entry.cap;
            parsed.is_bonus = entry.is_bonus.unwrap_or(false);
            Ok(parsed)
        })
        .collect()
}

fn signup_bonus(
    raw: Option<RawBonusField>,
    reward_type: RewardType,
    label: &str,
) -> Result<Option<SignupBonus>, ValidationError> {
    let fields: RawSignupBonus = match raw {
        None => return Ok(None),
        Some(RawBonusField::Fields(f)) => f,
        Some(RawBonusField::Blob(text)) if text.trim().is_empty() => return Ok(None),
        Some(RawBonusField::Blob(text)) => {
            serde_json::from_str(&text).map_err(|_| ValidationError::MissingField {
                card: label.to_string(),
                field: "signup_bonus",
            })?
        }
    };

    let amounts = [fields.value, fields.cash_back, fields.points, fields.miles, fields.bonus_amount];
    if let Some(bad) = amounts.into_iter().flatten().find(|v| !is_non_negative(*v)) {
        return Err(ValidationError::NegativeAmount {
            card: label.to_string(),
            field: "signup_bonus.amount",
            value: bad,
        });
    }
    let min_spend = fields.min_spend.unwrap_or(0.0);
    if !is_non_negative(min_spend) {
        return Err(ValidationError::NegativeAmount {
            card: label.to_string(),
            field: "signup_bonus.min_spend",
            value: min_spend,
        });
    }

    let months = fields.max_months.unwrap_or(DEFAULT_BONUS_MONTHS);
    let positive = |v: Option<f64>| v.filter(|x| *x > 0.0);

    let bonus = if let Some(value) = positive(fields.value).or(positive(fields.cash_back)) {
        SignupBonus::dollars(value, min_spend, months)
    } else if let Some(units) = positive(fields.points)
        .or(positive(fields.miles))
        .or(positive(fields.bonus_amount))
    {
        if reward_type == RewardType::CashBack {
            SignupBonus::dollars(units, min_spend, months)
        } else {
            SignupBonus::reward_units(units, min_spend, months)
        }
    } else {
        return Ok(None);
    };
    Ok(Some(bonus))
}

fn is_non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// Active credits that name a spending category; a credit missing one is dropped.
fn credits(raw: Option<Vec<RawCredit>>, label: &str) -> Result<Vec<CardCredit>, ValidationError> {
    let mut out = Vec::new();
    for entry in raw.unwrap_or_default() {
        if entry.is_active == Some(false) {
            continue;
        }
        let Some(category) = entry.category.filter(|c| !c.trim().is_empty()) else {
            tracing::debug!(card = %label, "skipping credit without a spending category");
            continue;
        };
        let value = entry.value.ok_or_else(|| ValidationError::MissingField {
            card: label.to_string(),
            field: "credits.value",
        })?;
        out.push(CardCredit::new(&category, value, entry.times_per_year.unwrap_or(1)));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardwise_core::BonusAmount;
    use std::path::PathBuf;

    fn catalog_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("data")
            .join("catalog.json")
    }

    #[test]
    fn test_parse_wrapped_and_bare_lists() {
        let bare = r#"[{"id": 1, "name": "A", "issuer": "chase", "annual_fee": 0}]"#;
        let wrapped = r#"{"cards": [{"id": "x", "name": "B", "issuer_id": 4, "annual_fee": 95}]}"#;

        let a = parse_catalog_json(bare).unwrap();
        assert_eq!(a[0].id, "1");
        assert_eq!(a[0].issuer_id, "chase");

        let b = parse_catalog_json(wrapped).unwrap();
        assert_eq!(b[0].id, "x");
        assert_eq!(b[0].issuer_id, "4");
        assert_eq!(b[0].annual_fee, 95.0);
    }

    #[test]
    fn test_legacy_blob_rewards_are_parsed_once() {
        let text = r#"[{
            "id": 9, "name": "Limited", "issuer": "citi", "annual_fee": 0,
            "reward_value_multiplier": 1.0,
            "reward_categories": "[{\"category\": \"gas stations\", \"rate\": 5.0, \"limit\": 1000}, {\"category\": \"other\", \"rate\": 1.0}]"
        }]"#;
        let cards = parse_catalog_json(text).unwrap();
        let gas = cards[0].rate_for("gas").unwrap();
        assert_eq!(gas.rate, 5.0);
        assert_eq!(gas.cap, Some(1000.0));
        assert_eq!(cards[0].base_rate(), 1.0);
    }

    #[test]
    fn test_rate_field_aliases() {
        let text = r#"[{"id": 1, "name": "A", "issuer": "x", "annual_fee": 0,
            "reward_categories": [
                {"category": "dining", "percentage": 3},
                {"category": "travel", "reward_rate": 2, "is_bonus_category": true},
                {"category": "base rate", "reward_percent": 1.5}
            ]}]"#;
        let card = &parse_catalog_json(text).unwrap()[0];
        assert_eq!(card.rate_for("dining").unwrap().rate, 3.0);
        assert!(card.rate_for("travel").unwrap().is_bonus);
        assert_eq!(card.base_rate(), 1.5);
    }

    #[test]
    fn test_signup_bonus_shapes() {
        let text = r#"[
            {"id": 1, "name": "Cash", "issuer": "x", "annual_fee": 0, "reward_type": "cash_back",
             "signup_bonus": {"cash_back": 200, "min_spend": 1000, "max_months": 3}},
            {"id": 2, "name": "Points", "issuer": "x", "annual_fee": 95, "reward_type": "points",
             "reward_value_multiplier": 0.0125,
             "signup_bonus": {"bonus_amount": 60000, "spending_requirement": 4000, "time_limit_months": 3}},
            {"id": 3, "name": "Blob", "issuer": "x", "annual_fee": 0,
             "signup_bonus": "{\"value\": 750, \"min_spend\": 4000}"}
        ]"#;
        let cards = parse_catalog_json(text).unwrap();

        let cash = cards[0].signup_bonus.as_ref().unwrap();
        assert_eq!(cash.amount, BonusAmount::Dollars(200.0));

        let points = cards[1].signup_bonus.as_ref().unwrap();
        assert_eq!(points.amount, BonusAmount::RewardUnits(60000.0));
        assert_eq!(points.min_spend, 4000.0);

        let blob = cards[2].signup_bonus.as_ref().unwrap();
        assert_eq!(blob.amount, BonusAmount::Dollars(750.0));
        assert_eq!(blob.time_limit_months, DEFAULT_BONUS_MONTHS);
    }

    #[test]
    fn test_inactive_cards_are_skipped() {
        let text = r#"[
            {"id": 1, "name": "Old", "issuer": "x", "annual_fee": 0, "is_active": false},
            {"id": 2, "name": "Gone", "issuer": "x", "annual_fee": 0, "discontinued": true},
            {"id": 3, "name": "Live", "issuer": "x", "annual_fee": 0}
        ]"#;
        let cards = parse_catalog_json(text).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, "3");
    }

    #[test]
    fn test_missing_required_fields_fail_fast() {
        let no_fee = r#"[{"id": 1, "name": "A", "issuer": "x"}]"#;
        let err = format!("{:#}", parse_catalog_json(no_fee).unwrap_err());
        assert!(err.contains("annual_fee"), "{err}");

        let no_issuer = r#"[{"id": 1, "name": "A", "annual_fee": 0}]"#;
        let err = format!("{:#}", parse_catalog_json(no_issuer).unwrap_err());
        assert!(err.contains("issuer_id"), "{err}");

        let negative_rate = r#"[{"id": 1, "name": "A", "issuer": "x", "annual_fee": 0,
            "reward_categories": [{"category": "gas", "rate": -1}]}]"#;
        assert!(parse_catalog_json(negative_rate).is_err());
    }

    #[test]
    fn test_duplicate_category_after_alias_resolution() {
        let text = r#"[{"id": 1, "name": "A", "issuer": "x", "annual_fee": 0,
            "reward_categories": [{"category": "gas", "rate": 3}, {"category": "fuel", "rate": 2}]}]"#;
        let err = format!("{:#}", parse_catalog_json(text).unwrap_err());
        assert!(err.contains("more than one reward rate"), "{err}");
    }

    #[test]
    fn test_badly_typed_field_names_card_and_field() {
        let text = r#"{"cards": [
            {"id": 1, "name": "A", "issuer": "x", "annual_fee": 0},
            {"id": 2, "name": "B", "issuer": "x", "annual_fee": "95"}
        ]}"#;
        let err = format!("{:#}", parse_catalog_json(text).unwrap_err());
        assert!(err.contains("card at index 1"), "{err}");
        assert!(err.contains("annual_fee"), "{err}");

        let err = format!("{:#}", parse_catalog_json(r#"{"items": []}"#).unwrap_err());
        assert!(err.contains("`cards`"), "{err}");
    }

    #[test]
    fn test_negative_signup_bonus_is_rejected() {
        let text = r#"[{"id": 1, "name": "A", "issuer": "x", "annual_fee": 0,
            "signup_bonus": {"value": -200, "min_spend": 100}}]"#;
        let err = parse_catalog_json(text).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::NegativeAmount { field: "signup_bonus.amount", .. })
        ));

        let negative_min = r#"[{"id": 1, "name": "A", "issuer": "x", "annual_fee": 0,
            "signup_bonus": {"points": 0, "min_spend": -5}}]"#;
        let err = format!("{:#}", parse_catalog_json(negative_min).unwrap_err());
        assert!(err.contains("signup_bonus.min_spend"), "{err}");

        let zero = r#"[{"id": 1, "name": "A", "issuer": "x", "annual_fee": 0,
            "signup_bonus": {"value": 0, "min_spend": 100}}]"#;
        assert!(parse_catalog_json(zero).unwrap()[0].signup_bonus.is_none());
    }

    #[test]
    fn test_category_credits_are_parsed() {
        let text = r#"[{"id": 1, "name": "A", "issuer": "x", "annual_fee": 250,
            "credits": [
                {"category": "Restaurants", "value": 10, "times_per_year": 12},
                {"category": "travel", "amount": 300},
                {"value": 100, "times_per_year": 1},
                {"category": "gas", "value": 5, "is_active": false}
            ]}]"#;
        let card = &parse_catalog_json(text).unwrap()[0];
        assert_eq!(
            card.credits,
            vec![CardCredit::new("dining", 10.0, 12), CardCredit::new("travel", 300.0, 1)]
        );

        let negative = r#"[{"id": 1, "name": "A", "issuer": "x", "annual_fee": 0,
            "credits": [{"category": "dining", "value": -1}]}]"#;
        let err = format!("{:#}", parse_catalog_json(negative).unwrap_err());
        assert!(err.contains("credits.value"), "{err}");
    }

    #[test]
    fn test_load_repo_catalog() {
        let cards = load_catalog(catalog_path()).expect("should load data/catalog.json");
        assert!(cards.len() >= 8, "expected 8+ cards, got {}", cards.len());
        assert!(cards.iter().any(|c| c.annual_fee == 0.0));
        assert!(cards.iter().any(|c| c.signup_bonus.is_some()));
    }
}
