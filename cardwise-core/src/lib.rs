//! cardwise-core: category catalog and the data model shared by the engine, loaders, and CLI

pub mod card;
pub mod category;
pub mod constraints;
pub mod error;
pub mod profile;

pub use card::{BonusAmount, Card, CardCredit, RewardCategoryRate, RewardType, SignupBonus};
pub use category::{CARD_CREDITS, CategoryDef, OTHER, SIGNUP_BONUS};
pub use constraints::{Constraints, Strategy};
pub use error::ValidationError;
pub use profile::SpendingProfile;
