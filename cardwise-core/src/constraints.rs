//! Caller-supplied limits on a recommendation.

use crate::card::RewardType;
use crate::error::{ValidationError, non_negative};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How cards are chosen from the ranked catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Walk cards by standalone net value, keep those that fit.
    #[default]
    Standalone,
    /// Repeatedly add the card with the largest gain to the combination.
    Marginal,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Standalone => f.write_str("standalone"),
            Strategy::Marginal => f.write_str("marginal"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standalone" | "greedy" => Ok(Strategy::Standalone),
            "marginal" => Ok(Strategy::Marginal),
            other => Err(format!("unknown strategy `{other}` (expected standalone or marginal)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Constraints {
    #[serde(default = "default_max_cards")]
    pub max_cards: usize,
    /// Inclusive cap on summed annual fees; `None` means unconstrained
    #[serde(default)]
    pub max_annual_fees: Option<f64>,
    #[serde(default)]
    pub preferred_issuer_id: Option<String>,
    #[serde(default)]
    pub reward_type: Option<RewardType>,
    #[serde(default)]
    pub strategy: Strategy,
}

fn default_max_cards() -> usize {
    1
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_cards: default_max_cards(),
            max_annual_fees: None,
            preferred_issuer_id: None,
            reward_type: None,
            strategy: Strategy::Standalone,
        }
    }
}

impl Constraints {
    pub fn new(max_cards: usize) -> Self {
        Self {
            max_cards,
            ..Self::default()
        }
    }

    pub fn with_max_annual_fees(mut self, max: f64) -> Self {
        self.max_annual_fees = Some(max);
        self
    }

    pub fn with_issuer(mut self, issuer_id: impl Into<String>) -> Self {
        self.preferred_issuer_id = Some(issuer_id.into());
        self
    }

    pub fn with_reward_type(mut self, reward_type: RewardType) -> Self {
        self.reward_type = Some(reward_type);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_cards == 0 {
            return Err(ValidationError::ZeroMaxCards);
        }
        if let Some(max) = self.max_annual_fees {
            if !non_negative(max) {
                return Err(ValidationError::InvalidFeeCeiling(max));
            }
        }
        Ok(())
    }

    /// True when `fees_so_far + fee` stays within the ceiling (always true if unset).
    pub fn fee_fits(&self, fees_so_far: f64, fee: f64) -> bool {
        match self.max_annual_fees {
            Some(max) => fees_so_far + fee <= max,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_single_card_unconstrained() {
        let c = Constraints::default();
        assert_eq!(c.max_cards, 1);
        assert!(c.max_annual_fees.is_none());
        assert!(c.validate().is_ok());
        assert!(c.fee_fits(10_000.0, 695.0));
    }

    #[test]
    fn test_fee_ceiling_is_inclusive() {
        let c = Constraints::new(2).with_max_annual_fees(95.0);
        assert!(c.fee_fits(0.0, 95.0));
        assert!(!c.fee_fits(0.01, 95.0));

        let free_only = Constraints::new(2).with_max_annual_fees(0.0);
        assert!(free_only.fee_fits(0.0, 0.0));
        assert!(!free_only.fee_fits(0.0, 1.0));
    }

    #[test]
    fn test_invalid_constraints() {
        assert_eq!(Constraints::new(0).validate(), Err(ValidationError::ZeroMaxCards));
        assert_eq!(
            Constraints::new(1).with_max_annual_fees(-5.0).validate(),
            Err(ValidationError::InvalidFeeCeiling(-5.0))
        );
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("Marginal".parse::<Strategy>(), Ok(Strategy::Marginal));
        assert_eq!("standalone".parse::<Strategy>(), Ok(Strategy::Standalone));
        assert!("random".parse::<Strategy>().is_err());
    }
}
