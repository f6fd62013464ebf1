//! cardwise-ingest: card catalogs (JSON/CSV), spending profiles, and scenario files.

pub mod catalog;
pub mod parsers;
pub mod profile;
pub mod scenarios;
pub mod types;

pub use catalog::{load_catalog, parse_catalog_json};
pub use parsers::csv_catalog::{parse_catalog_csv, parse_catalog_csv_reader};
pub use profile::{ConstraintOverrides, LoadedProfile, load_profile, parse_profile_json};
pub use scenarios::{Expectation, Scenario, ScenarioSet, load_scenarios};
