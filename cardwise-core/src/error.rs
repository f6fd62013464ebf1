//! Validation errors for malformed cards, profiles, and constraints.

/// Raised when input data cannot be valued meaningfully.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("card {card}: missing required field `{field}`")]
    MissingField { card: String, field: &'static str },

    #[error("card {card}: {field} must be a non-negative number, got {value}")]
    NegativeAmount {
        card: String,
        field: &'static str,
        value: f64,
    },

    #[error("card {card}: reward rate for `{category}` must be a non-negative number, got {rate}")]
    InvalidRate {
        card: String,
        category: String,
        rate: f64,
    },

    #[error("card {card}: spending cap for `{category}` must be a non-negative number, got {cap}")]
    InvalidCap {
        card: String,
        category: String,
        cap: f64,
    },

    #[error("card {card}: more than one reward rate for `{category}`")]
    DuplicateCategory { card: String, category: String },

    #[error("card {card}: signup bonus time limit must be at least one month")]
    InvalidBonusWindow { card: String },

    #[error("card {card}: credit for `{category}` must apply at least once a year")]
    InvalidCreditFrequency { card: String, category: String },

    #[error("card id `{0}` appears more than once in the catalog")]
    DuplicateCardId(String),

    #[error("spending for `{category}` must be a non-negative number, got {amount}")]
    InvalidSpend { category: String, amount: f64 },

    #[error("`{0}` is not a usable spending category name")]
    InvalidCategory(String),

    #[error("max_cards must be at least 1")]
    ZeroMaxCards,

    #[error("max_annual_fees must be a non-negative number, got {0}")]
    InvalidFeeCeiling(f64),

    #[error("unknown reward type `{0}`")]
    UnknownRewardType(String),
}

/// Returns true for finite values at or above zero.
pub(crate) fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
