//! Flat CSV card catalogs, one card per row.
//!
//! Expected header:
//!   id,name,issuer,annual_fee,reward_type,multiplier,rewards,signup_bonus
//!
//! `rewards` is a `;`-separated list of `category:rate`, optionally capped
//! with `@cap` (`dining:3; gas:5@1000; other:1`). `signup_bonus` is a short
//! phrase such as `200 after 1000 in 3` or `60000 points after 4000 in 3`.

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::catalog::build_card;
use crate::types::{RawBonusField, RawCard, RawId, RawRewardCategory, RawRewards, RawSignupBonus};
use cardwise_core::Card;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "issuer_id")]
    issuer: Option<String>,
    #[serde(default)]
    annual_fee: Option<f64>,
    #[serde(default)]
    reward_type: Option<String>,
    #[serde(default, alias = "reward_value_multiplier")]
    multiplier: Option<f64>,
    #[serde(default)]
    rewards: Option<String>,
    #[serde(default)]
    signup_bonus: Option<String>,
}

fn blank_to_none(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_number(s: &str) -> Option<f64> {
    s.replace(',', "").parse().ok()
}

/// Parse `dining:3; gas:5@1000; other:1` into raw rate entries.
fn parse_rewards(text: &str) -> Result<Vec<RawRewardCategory>> {
    let entry_re = Regex::new(concat!(
        r"^(?P<cat>[^:]+?)\s*:\s*",
        r"(?P<rate>-?\d+(?:\.\d+)?)\s*(?:%|x)?",
        r"(?:\s*@\s*\$?(?P<cap>[\d,]+(?:\.\d+)?))?$"
    ))?;

    let mut out = Vec::new();
    for entry in text.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let Some(caps) = entry_re.captures(entry) else {
            bail!("malformed reward entry `{entry}` (expected category:rate[@cap])");
        };
        out.push(RawRewardCategory {
            category: caps["cat"].to_string(),
            rate: parse_number(&caps["rate"]),
            cap: caps.name("cap").and_then(|m| parse_number(m.as_str())),
            is_bonus: None,
        });
    }
    Ok(out)
}

/// Parse `200 after 1000 in 3` / `60000 points after 4000 in 3 months`.
///
/// A `$` prefix or `dollars`/`cash` unit means dollars, `points`/`miles`
/// mean reward units, and a bare number follows the card's reward type.
fn parse_bonus(text: &str) -> Result<RawSignupBonus> {
    let bonus_re = Regex::new(concat!(
        r"(?i)^(?P<dollar>\$)?(?P<amount>[\d,]+(?:\.\d+)?)\s*",
        r"(?P<unit>points|miles|dollars|cash)?\s+",
        r"after\s+\$?(?P<min>[\d,]+(?:\.\d+)?)",
        r"(?:\s+in\s+(?P<months>\d+)(?:\s+months?)?)?$"
    ))?;

    let Some(caps) = bonus_re.captures(text.trim()) else {
        bail!("malformed signup bonus `{text}` (expected `<amount> [unit] after <spend> in <months>`)");
    };

    let amount = parse_number(&caps["amount"]);
    let mut bonus = RawSignupBonus {
        min_spend: parse_number(&caps["min"]),
        max_months: caps.name("months").and_then(|m| m.as_str().parse().ok()),
        ..RawSignupBonus::default()
    };

    let unit = caps.name("unit").map(|m| m.as_str().to_ascii_lowercase());
    match unit.as_deref() {
        Some("points") => bonus.points = amount,
        Some("miles") => bonus.miles = amount,
        Some(_) => bonus.value = amount,
        None if caps.name("dollar").is_some() => bonus.value = amount,
        None => bonus.bonus_amount = amount,
    }
    Ok(bonus)
}

fn row_to_raw(row: CsvRow) -> Result<RawCard> {
    let rewards = match blank_to_none(row.rewards) {
        Some(text) => Some(RawRewards::List(parse_rewards(&text)?)),
        None => None,
    };
    let signup_bonus = match blank_to_none(row.signup_bonus) {
        Some(text) => Some(RawBonusField::Fields(parse_bonus(&text)?)),
        None => None,
    };

    Ok(RawCard {
        id: blank_to_none(row.id).map(RawId::Text),
        name: blank_to_none(row.name),
        issuer_id: blank_to_none(row.issuer).map(RawId::Text),
        annual_fee: row.annual_fee,
        reward_type: blank_to_none(row.reward_type),
        reward_value_multiplier: row.multiplier,
        reward_categories: rewards,
        signup_bonus,
        ..RawCard::default()
    })
}

/// Parse a CSV catalog from any reader.
pub fn parse_catalog_csv_reader<R: Read>(reader: R) -> Result<Vec<Card>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut cards = Vec::new();
    for (i, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        let line = i + 2;
        let row = result.with_context(|| format!("reading catalog row at line {line}"))?;
        let raw = row_to_raw(row).with_context(|| format!("catalog line {line}"))?;
        if let Some(card) = build_card(raw, i).with_context(|| format!("catalog line {line}"))? {
            cards.push(card);
        }
    }
    Ok(cards)
}

/// Parse a CSV catalog file.
pub fn parse_catalog_csv(path: impl AsRef<Path>) -> Result<Vec<Card>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_catalog_csv_reader(file).with_context(|| format!("parsing {}", path.display()))
}
