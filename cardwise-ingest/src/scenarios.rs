//! Data-driven recommendation scenarios.
//!
//! A scenario file holds `{ description, category, scenarios: [...] }`. A
//! directory of such files is loaded in name order, skipping `index.json`.

use anyhow::{Context, Result, bail};
use cardwise_core::{Constraints, SpendingProfile, ValidationError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::RawId;

/// Absolute slack allowed when comparing dollar amounts.
pub const VALUE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Monthly spend per category
    pub profile: BTreeMap<String, f64>,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub expect: Expectation,
}

impl Scenario {
    pub fn spending_profile(&self) -> Result<SpendingProfile, ValidationError> {
        SpendingProfile::new(self.profile.iter().map(|(k, v)| (k.as_str(), *v)))
    }
}

/// What a scenario's recommendation must look like; unset fields are not checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Expectation {
    #[serde(default)]
    pub card_count: Option<usize>,
    #[serde(default)]
    pub recommended_sequence: Option<Vec<RawId>>,
    #[serde(default)]
    pub total_value: Option<f64>,
    #[serde(default)]
    pub max_total_fees: Option<f64>,
}

impl Expectation {
    /// Compare a recommendation's outcome against the expectation.
    ///
    /// Returns one message per mismatch; empty means the scenario passed.
    pub fn check(&self, sequence: &[String], total_value: f64, total_fees: f64) -> Vec<String> {
        let mut failures = Vec::new();

        if let Some(n) = self.card_count {
            if sequence.len() != n {
                failures.push(format!("expected {n} card(s), got {}", sequence.len()));
            }
        }
        if let Some(expected) = &self.recommended_sequence {
            let expected: Vec<String> = expected.iter().cloned().map(RawId::into_string).collect();
            if expected.as_slice() != sequence {
                failures.push(format!("expected sequence {expected:?}, got {sequence:?}"));
            }
        }
        if let Some(v) = self.total_value {
            if (v - total_value).abs() > VALUE_TOLERANCE {
                failures.push(format!("expected total value {v:.2}, got {total_value:.2}"));
            }
        }
        if let Some(max) = self.max_total_fees {
            if total_fees > max + VALUE_TOLERANCE {
                failures.push(format!("total fees {total_fees:.2} exceed {max:.2}"));
            }
        }
        failures
    }
}

/// Scenarios from one file, tagged with where they came from.
#[derive(Debug, Clone)]
pub struct ScenarioSet {
    pub source: PathBuf,
    pub description: String,
    pub category: String,
    pub scenarios: Vec<Scenario>,
}

fn load_file(path: &Path) -> Result<ScenarioSet> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file: ScenarioFile =
        serde_json::from_str(&text).with_context(|| format!("invalid scenario JSON in {}", path.display()))?;
    Ok(ScenarioSet {
        source: path.to_path_buf(),
        description: file.description,
        category: file.category,
        scenarios: file.scenarios,
    })
}

/// Load scenarios from a single file or from every `*.json` in a directory.
pub fn load_scenarios(path: impl AsRef<Path>) -> Result<Vec<ScenarioSet>> {
    let path = path.as_ref();
    if path.is_file() {
        return Ok(vec![load_file(path)?]);
    }
    if !path.is_dir() {
        bail!("scenario path not found: {}", path.display());
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)
        .with_context(|| format!("listing {}", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .filter(|p| p.file_name().and_then(|n| n.to_str()) != Some("index.json"))
        .collect();
    files.sort();

    if files.is_empty() {
        bail!("no scenario files found in {}", path.display());
    }

    let sets = files.iter().map(|f| load_file(f)).collect::<Result<Vec<_>>>()?;
    let total: usize = sets.iter().map(|s| s.scenarios.len()).sum();
    tracing::info!(dir = %path.display(), files = sets.len(), scenarios = total, "loaded scenarios");
    Ok(sets)
}
