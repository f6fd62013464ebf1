//! Spending category catalog with alias resolution.
//!
//! Free-text category names coming from profiles and card data are folded
//! onto a fixed set of canonical names. Names that match nothing are kept
//! (normalized) and later fall back to a card's base rate.

use serde::Serialize;

/// Canonical name of the fallback ("base rate") category.
pub const OTHER: &str = "other";

/// Pseudo-category used in breakdowns for an earned signup bonus.
pub const SIGNUP_BONUS: &str = "signup_bonus";

/// Pseudo-category used in breakdowns for earned statement credits.
pub const CARD_CREDITS: &str = "card_credits";

/// One canonical spending category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryDef {
    pub name: &'static str,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
}

const CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        name: "dining",
        display_name: "Dining & Restaurants",
        aliases: &[
            "restaurants",
            "restaurant",
            "dining at restaurants",
            "takeout",
            "delivery service",
            "dining & restaurants",
            "food",
        ],
    },
    CategoryDef {
        name: "travel",
        display_name: "Travel",
        aliases: &[
            "travel purchases",
            "travel purchased",
            "other travel",
            "travel booked",
            "hotels",
            "hotel",
            "rental cars",
            "car rentals",
            "flights",
            "airfare",
            "attractions",
        ],
    },
    CategoryDef {
        name: "groceries",
        display_name: "Groceries",
        aliases: &["grocery", "grocery stores", "supermarkets", "wholesale clubs"],
    },
    CategoryDef {
        name: "gas",
        display_name: "Gas Stations",
        aliases: &["gas stations", "gasoline", "fuel"],
    },
    CategoryDef {
        name: "entertainment",
        display_name: "Entertainment",
        aliases: &[],
    },
    CategoryDef {
        name: "shopping",
        display_name: "Shopping",
        aliases: &["online retail", "online purchases"],
    },
    CategoryDef {
        name: "transportation",
        display_name: "Transportation",
        aliases: &[
            "transit",
            "rideshare",
            "parking",
            "tolls",
            "trains",
            "buses",
            "public transit",
            "subway",
            "bus",
            "metro",
        ],
    },
    CategoryDef {
        name: "streaming",
        display_name: "Streaming Services",
        aliases: &[
            "streaming services",
            "select streaming services",
            "streaming subscriptions",
        ],
    },
    CategoryDef {
        name: "drugstores",
        display_name: "Drugstores & Pharmacies",
        aliases: &["drugstore", "pharmacy"],
    },
    CategoryDef {
        name: "home_improvement",
        display_name: "Home Improvement",
        aliases: &[],
    },
    CategoryDef {
        name: "office_supplies",
        display_name: "Office Supplies",
        aliases: &[],
    },
    CategoryDef {
        name: "telecommunications",
        display_name: "Telecommunications",
        aliases: &["internet", "phone", "cable", "cell phone", "wireless"],
    },
    CategoryDef {
        name: "utilities",
        display_name: "Utilities",
        aliases: &[],
    },
    CategoryDef {
        name: "amazon",
        display_name: "Amazon",
        aliases: &[],
    },
    CategoryDef {
        name: OTHER,
        display_name: "Everything Else",
        aliases: &["base", "base rate", "everything else", "all other purchases"],
    },
];

/// All canonical categories, in display order.
pub fn all() -> &'static [CategoryDef] {
    CATEGORIES
}

/// Comparison key: lowercase, `_`/`-` treated as spaces, whitespace collapsed.
fn key(name: &str) -> String {
    name.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up a known category by canonical name or alias.
pub fn resolve(name: &str) -> Option<&'static CategoryDef> {
    let k = key(name);
    if k.is_empty() {
        return None;
    }
    CATEGORIES.iter().find(|def| {
        key(def.name) == k || def.aliases.iter().any(|alias| key(alias) == k)
    })
}

/// Canonical name for `name`; unknown names come back in snake_case form.
pub fn normalize(name: &str) -> String {
    match resolve(name) {
        Some(def) => def.name.to_string(),
        None => key(name).replace(' ', "_"),
    }
}
