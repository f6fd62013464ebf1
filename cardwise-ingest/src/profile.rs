//! Spending-profile files, optionally carrying constraint overrides.

use anyhow::{Context, Result};
use cardwise_core::{Constraints, RewardType, SpendingProfile, Strategy};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::types::RawId;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ProfileFile {
    Detailed {
        category_spending: BTreeMap<String, f64>,
        #[serde(default)]
        max_cards: Option<usize>,
        #[serde(default)]
        max_annual_fees: Option<f64>,
        #[serde(default)]
        preferred_issuer_id: Option<RawId>,
        #[serde(default)]
        reward_type: Option<String>,
        #[serde(default)]
        strategy: Option<String>,
    },
    Flat(BTreeMap<String, f64>),
}

/// Constraint fields set by a profile file; unset fields keep the caller's value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintOverrides {
    pub max_cards: Option<usize>,
    pub max_annual_fees: Option<f64>,
    pub preferred_issuer_id: Option<String>,
    pub reward_type: Option<RewardType>,
    pub strategy: Option<Strategy>,
}

impl ConstraintOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, mut base: Constraints) -> Constraints {
        if let Some(n) = self.max_cards {
            base.max_cards = n;
        }
        if let Some(max) = self.max_annual_fees {
            base.max_annual_fees = Some(max);
        }
        if let Some(issuer) = &self.preferred_issuer_id {
            base.preferred_issuer_id = Some(issuer.clone());
        }
        if let Some(rt) = self.reward_type {
            base.reward_type = Some(rt);
        }
        if let Some(s) = self.strategy {
            base.strategy = s;
        }
        base
    }
}

#[derive(Debug, Clone)]
pub struct LoadedProfile {
    pub profile: SpendingProfile,
    pub overrides: ConstraintOverrides,
}

/// Parse a profile: a flat `{category: monthly}` map, or an object with
/// `category_spending` plus optional constraint fields.
pub fn parse_profile_json(text: &str) -> Result<LoadedProfile> {
    let file: ProfileFile =
        serde_json::from_str(text).context("profile must map categories to monthly amounts")?;

    match file {
        ProfileFile::Flat(spending) => Ok(LoadedProfile {
            profile: SpendingProfile::new(spending)?,
            overrides: ConstraintOverrides::default(),
        }),
        ProfileFile::Detailed {
            category_spending,
            max_cards,
            max_annual_fees,
            preferred_issuer_id,
            reward_type,
            strategy,
        } => {
            let reward_type = reward_type
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<RewardType>())
                .transpose()?;
            let strategy = strategy
                .map(|s| s.parse::<Strategy>())
                .transpose()
                .map_err(anyhow::Error::msg)?;

            Ok(LoadedProfile {
                profile: SpendingProfile::new(category_spending)?,
                overrides: ConstraintOverrides {
                    max_cards,
                    max_annual_fees,
                    preferred_issuer_id: preferred_issuer_id.map(RawId::into_string),
                    reward_type,
                    strategy,
                },
            })
        }
    }
}

pub fn load_profile(path: impl AsRef<Path>) -> Result<LoadedProfile> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let loaded = parse_profile_json(&text).with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        categories = loaded.profile.len(),
        total_monthly = loaded.profile.total_monthly(),
        "loaded spending profile"
    );
    Ok(loaded)
}
