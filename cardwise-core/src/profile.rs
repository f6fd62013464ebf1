//! Monthly spending profile keyed by canonical category.

use crate::category::{self, CARD_CREDITS, SIGNUP_BONUS};
use crate::error::{ValidationError, non_negative};
use serde::Serialize;
use std::collections::BTreeMap;

/// Months per year used to annualize monthly spend.
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Read-only monthly spend per category.
///
/// Category names go through [`category::normalize`]; entries that land on
/// the same canonical name are summed. Iteration is ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SpendingProfile {
    monthly: BTreeMap<String, f64>,
}

impl SpendingProfile {
    pub fn new<I, S>(entries: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut monthly = BTreeMap::new();
        for (name, amount) in entries {
            let name = name.as_ref();
            let canonical = category::normalize(name);
            if !non_negative(amount) {
                return Err(ValidationError::InvalidSpend {
                    category: name.to_string(),
                    amount,
                });
            }
            if canonical.is_empty() || canonical == SIGNUP_BONUS || canonical == CARD_CREDITS {
                return Err(ValidationError::InvalidCategory(name.to_string()));
            }
            *monthly.entry(canonical).or_insert(0.0) += amount;
        }
        Ok(Self { monthly })
    }

    /// Monthly spend for a canonical category (zero when absent).
    pub fn monthly(&self, category: &str) -> f64 {
        self.monthly.get(category).copied().unwrap_or(0.0)
    }

    pub fn annual(&self, category: &str) -> f64 {
        self.monthly(category) * MONTHS_PER_YEAR
    }

    pub fn total_monthly(&self) -> f64 {
        self.monthly.values().sum()
    }

    /// (category, monthly spend) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.monthly.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.monthly.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.monthly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monthly.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_merge_into_one_category() {
        let profile =
            SpendingProfile::new([("dining", 300.0), ("Restaurants", 200.0), ("gas", 50.0)]).unwrap();
        assert_eq!(profile.len(), 2);
        assert_eq!(profile.monthly("dining"), 500.0);
        assert_eq!(profile.annual("dining"), 6000.0);
        assert_eq!(profile.total_monthly(), 550.0);
    }

    #[test]
    fn test_negative_spend_is_rejected() {
        let err = SpendingProfile::new([("gas", -5.0)]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidSpend {
                category: "gas".into(),
                amount: -5.0
            }
        );
        assert!(SpendingProfile::new([("gas", f64::NAN)]).is_err());
    }

    #[test]
    fn test_reserved_pseudo_category_is_rejected() {
        assert!(SpendingProfile::new([("signup_bonus", 10.0)]).is_err());
        assert!(SpendingProfile::new([("Card Credits", 10.0)]).is_err());
    }

    #[test]
    fn test_absent_category_reads_as_zero() {
        let profile = SpendingProfile::new([("travel", 100.0)]).unwrap();
        assert_eq!(profile.monthly("groceries"), 0.0);
        assert_eq!(profile.categories().collect::<Vec<_>>(), vec!["travel"]);
    }
}
