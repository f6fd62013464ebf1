//! cardwise-engine: card valuation, combination selection, and result assembly

pub mod assembly;
pub mod projection;
pub mod selection;
pub mod valuation;

pub use assembly::{CardDetail, RecommendationResult, RewardEntry};
pub use projection::{PROJECTION_MONTHS, project_monthly};
pub use selection::{Attribution, RankedCard, attribute, rank_cards, select_combination};
pub use valuation::{CardValuation, CategoryReward, value_card, value_category};
