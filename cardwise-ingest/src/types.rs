use serde::Deserialize;

/// Identifier that may arrive as a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Num(i64),
    Text(String),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            RawId::Num(n) => n.to_string(),
            RawId::Text(s) => s.trim().to_string(),
        }
    }
}

/// A card as found in catalog exports, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCard {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "issuer")]
    pub issuer_id: Option<RawId>,
    #[serde(default)]
    pub annual_fee: Option<f64>,
    #[serde(default)]
    pub reward_type: Option<String>,
    #[serde(default, alias = "point_value")]
    pub reward_value_multiplier: Option<f64>,
    #[serde(default, alias = "rewards")]
    pub reward_categories: Option<RawRewards>,
    #[serde(default)]
    pub signup_bonus: Option<RawBonusField>,
    #[serde(default)]
    pub credits: Option<Vec<RawCredit>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub discontinued: Option<bool>,
}

/// Reward rates: a proper list, or the legacy serialized-JSON text column.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRewards {
    List(Vec<RawRewardCategory>),
    Blob(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRewardCategory {
    #[serde(alias = "name")]
    pub category: String,
    #[serde(
        default,
        alias = "percentage",
        alias = "reward_rate",
        alias = "reward_percent"
    )]
    pub rate: Option<f64>,
    #[serde(default, alias = "limit")]
    pub cap: Option<f64>,
    #[serde(default, alias = "is_bonus_category")]
    pub is_bonus: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawBonusField {
    Fields(RawSignupBonus),
    Blob(String),
}

/// Signup bonus in any of the shapes the catalog exports have used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSignupBonus {
    /// Precomputed dollar value
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub cash_back: Option<f64>,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub miles: Option<f64>,
    #[serde(default)]
    pub bonus_amount: Option<f64>,
    #[serde(default, alias = "spending_requirement")]
    pub min_spend: Option<f64>,
    #[serde(default, alias = "time_limit_months")]
    pub max_months: Option<u32>,
}

/// Statement credit. Credits without a spending category are benefit perks
/// the engine has no profile signal for.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCredit {
    #[serde(default, alias = "spending_category")]
    pub category: Option<String>,
    #[serde(default, alias = "amount")]
    pub value: Option<f64>,
    #[serde(default)]
    pub times_per_year: Option<u32>,
    #[serde(default)]
    pub is_active: Option<bool>,
}
