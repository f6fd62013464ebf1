//! Credit card definitions: reward rates, fees, and signup bonuses.

use crate::category::{self, OTHER};
use crate::error::{ValidationError, non_negative};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Base rate (percent) used when a card lists no `other` category.
pub const DEFAULT_BASE_RATE: f64 = 1.0;

/// Months allowed to reach a signup bonus minimum when the source omits it.
pub const DEFAULT_BONUS_MONTHS: u32 = 3;

/// What a card's reward units are called. Informational, also usable as a filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    CashBack,
    #[default]
    Points,
    Miles,
    Hotel,
}

impl RewardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardType::CashBack => "cash_back",
            RewardType::Points => "points",
            RewardType::Miles => "miles",
            RewardType::Hotel => "hotel",
        }
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "cash_back" | "cashback" | "cash" => Ok(RewardType::CashBack),
            "points" | "point" => Ok(RewardType::Points),
            "miles" | "mile" => Ok(RewardType::Miles),
            "hotel" | "hotel_points" => Ok(RewardType::Hotel),
            _ => Err(ValidationError::UnknownRewardType(s.to_string())),
        }
    }
}

fn canonical_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|name| category::normalize(&name))
}

/// Reward rate for one category on one card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RewardCategoryRate {
    /// Canonical category name
    #[serde(deserialize_with = "canonical_category")]
    pub category: String,
    /// Percent, e.g. 3.0 means 3%
    pub rate: f64,
    /// Annual spend after which the card's base rate applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<f64>,
    #[serde(default)]
    pub is_bonus: bool,
}

impl RewardCategoryRate {
    pub fn new(category: &str, rate: f64) -> Self {
        Self {
            category: category::normalize(category),
            rate,
            cap: None,
            is_bonus: false,
        }
    }

    pub fn with_cap(mut self, cap: f64) -> Self {
        self.cap = Some(cap);
        self
    }

    pub fn bonus(mut self) -> Self {
        self.is_bonus = true;
        self
    }
}

/// How a signup bonus amount is denominated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "unit", content = "amount", rename_all = "snake_case")]
pub enum BonusAmount {
    Dollars(f64),
    RewardUnits(f64),
}

impl BonusAmount {
    fn raw(&self) -> f64 {
        match self {
            BonusAmount::Dollars(v) | BonusAmount::RewardUnits(v) => *v,
        }
    }
}

/// One-time reward granted when `min_spend` is reached within `time_limit_months`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignupBonus {
    pub amount: BonusAmount,
    pub min_spend: f64,
    pub time_limit_months: u32,
}

impl SignupBonus {
    pub fn dollars(amount: f64, min_spend: f64, time_limit_months: u32) -> Self {
        Self {
            amount: BonusAmount::Dollars(amount),
            min_spend,
            time_limit_months,
        }
    }

    pub fn reward_units(units: f64, min_spend: f64, time_limit_months: u32) -> Self {
        Self {
            amount: BonusAmount::RewardUnits(units),
            min_spend,
            time_limit_months,
        }
    }

    /// Dollar value of the bonus for a card crediting `multiplier` dollars per unit.
    pub fn dollar_value(&self, multiplier: f64) -> f64 {
        match self.amount {
            BonusAmount::Dollars(d) => d,
            BonusAmount::RewardUnits(u) => u * multiplier,
        }
    }

    /// Whether `total_monthly` spend reaches the minimum inside the window.
    pub fn is_reachable(&self, total_monthly: f64) -> bool {
        total_monthly * f64::from(self.time_limit_months) >= self.min_spend
    }

    /// Zero-based month in which the minimum spend is first met.
    pub fn earned_month(&self, total_monthly: f64) -> usize {
        if self.min_spend <= 0.0 || total_monthly <= 0.0 {
            return 0;
        }
        let months_needed = (self.min_spend / total_monthly).ceil() as usize;
        months_needed.saturating_sub(1).min(11)
    }
}

/// Statement credit tied to a spending category, paid `times_per_year` times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardCredit {
    #[serde(deserialize_with = "canonical_category")]
    pub category: String,
    /// Dollars per occurrence
    pub value: f64,
    pub times_per_year: u32,
}

impl CardCredit {
    pub fn new(category: &str, value: f64, times_per_year: u32) -> Self {
        Self {
            category: category::normalize(category),
            value,
            times_per_year,
        }
    }

    pub fn annual_value(&self) -> f64 {
        self.value * f64::from(self.times_per_year)
    }
}

/// A credit card as seen by the valuation engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub issuer_id: String,
    pub annual_fee: f64,
    #[serde(default)]
    pub reward_type: RewardType,
    /// Dollars credited per reward unit earned
    pub reward_value_multiplier: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signup_bonus: Option<SignupBonus>,
    #[serde(default)]
    pub rewards: Vec<RewardCategoryRate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credits: Vec<CardCredit>,
}

impl Card {
    /// Create a fee-free cash-back card with no rates; refine with the `with_*` builders.
    pub fn new(id: impl Into<String>, name: impl Into<String>, issuer_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            issuer_id: issuer_id.into(),
            annual_fee: 0.0,
            reward_type: RewardType::CashBack,
            reward_value_multiplier: 1.0,
            signup_bonus: None,
            rewards: Vec::new(),
            credits: Vec::new(),
        }
    }

    pub fn with_annual_fee(mut self, fee: f64) -> Self {
        self.annual_fee = fee;
        self
    }

    pub fn with_reward_type(mut self, reward_type: RewardType) -> Self {
        self.reward_type = reward_type;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.reward_value_multiplier = multiplier;
        self
    }

    pub fn with_signup_bonus(mut self, bonus: SignupBonus) -> Self {
        self.signup_bonus = Some(bonus);
        self
    }

    /// Add a rate, replacing any existing entry for the same category.
    pub fn with_rate(mut self, rate: RewardCategoryRate) -> Self {
        self.rewards.retain(|r| r.category != rate.category);
        self.rewards.push(rate);
        self
    }

    pub fn with_credit(mut self, credit: CardCredit) -> Self {
        self.credits.push(credit);
        self
    }

    /// Explicit rate entry for a category, if the card lists one.
    pub fn rate_for(&self, category: &str) -> Option<&RewardCategoryRate> {
        self.rewards.iter().find(|r| r.category == category)
    }

    /// The card's `other` rate, or [`DEFAULT_BASE_RATE`].
    pub fn base_rate(&self) -> f64 {
        self.rate_for(OTHER)
            .map(|r| r.rate)
            .unwrap_or(DEFAULT_BASE_RATE)
    }

    /// Check required fields and numeric ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let card = self.label();
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField { card, field: "id" });
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField { card, field: "name" });
        }
        if self.issuer_id.trim().is_empty() {
            return Err(ValidationError::MissingField {
                card,
                field: "issuer_id",
            });
        }
        if !non_negative(self.annual_fee) {
            return Err(ValidationError::NegativeAmount {
                card,
                field: "annual_fee",
                value: self.annual_fee,
            });
        }
        if !non_negative(self.reward_value_multiplier) {
            return Err(ValidationError::NegativeAmount {
                card,
                field: "reward_value_multiplier",
                value: self.reward_value_multiplier,
            });
        }

        let mut seen = HashSet::new();
        for r in &self.rewards {
            if !seen.insert(r.category.as_str()) {
                return Err(ValidationError::DuplicateCategory {
                    card,
                    category: r.category.clone(),
                });
            }
            if !non_negative(r.rate) {
                return Err(ValidationError::InvalidRate {
                    card,
                    category: r.category.clone(),
                    rate: r.rate,
                });
            }
            if let Some(cap) = r.cap {
                if !non_negative(cap) {
                    return Err(ValidationError::InvalidCap {
                        card,
                        category: r.category.clone(),
                        cap,
                    });
                }
            }
        }

        if let Some(bonus) = &self.signup_bonus {
            if !non_negative(bonus.amount.raw()) {
                return Err(ValidationError::NegativeAmount {
                    card,
                    field: "signup_bonus.amount",
                    value: bonus.amount.raw(),
                });
            }
            if !non_negative(bonus.min_spend) {
                return Err(ValidationError::NegativeAmount {
                    card,
                    field: "signup_bonus.min_spend",
                    value: bonus.min_spend,
                });
            }
            if bonus.time_limit_months == 0 {
                return Err(ValidationError::InvalidBonusWindow { card });
            }
        }

        for credit in &self.credits {
            if !non_negative(credit.value) {
                return Err(ValidationError::NegativeAmount {
                    card,
                    field: "credits.value",
                    value: credit.value,
                });
            }
            if credit.times_per_year == 0 {
                return Err(ValidationError::InvalidCreditFrequency {
                    card,
                    category: credit.category.clone(),
                });
            }
        }
        Ok(())
    }

    fn label(&self) -> String {
        if self.name.trim().is_empty() {
            format!("#{}", self.id)
        } else {
            format!("#{} ({})", self.id, self.name)
        }
    }
}
