use anyhow::{Context, Result};
use cardwise_core::{Constraints, SpendingProfile};
use cardwise_engine::RecommendationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// `$CARDWISE_HOME`, or `~/.cardwise`.
pub fn cardwise_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CARDWISE_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".cardwise"))
}

/// Saved recommendations directory; created on first save.
pub fn recommendations_dir() -> Result<PathBuf> {
    Ok(cardwise_home()?.join("recommendations"))
}

/// A recommendation as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedRecommendation {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub profile: BTreeMap<String, f64>,
    pub constraints: Constraints,
    pub result: RecommendationResult,
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    profile: &'a SpendingProfile,
    constraints: &'a Constraints,
    result: &'a RecommendationResult,
}

/// Stable SHA-256 over the inputs and outcome of a recommendation.
pub fn fingerprint(
    profile: &SpendingProfile,
    constraints: &Constraints,
    result: &RecommendationResult,
) -> Result<String> {
    let bytes = serde_json::to_vec(&FingerprintInput {
        profile,
        constraints,
        result,
    })
    .context("serialize recommendation for fingerprint")?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Write a recommendation under `dir`; returns its id and whether it was new.
///
/// An identical recommendation saved earlier keeps its file and timestamp.
pub fn save_recommendation(
    dir: &Path,
    profile: &SpendingProfile,
    constraints: &Constraints,
    result: &RecommendationResult,
) -> Result<(String, bool)> {
    let id = fingerprint(profile, constraints, result)?;
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(format!("{id}.json"));
    if path.exists() {
        tracing::debug!(%id, "recommendation already saved");
        return Ok((id, false));
    }

    let record = SavedRecommendation {
        id: id.clone(),
        generated_at: Utc::now(),
        profile: profile.iter().map(|(c, v)| (c.to_string(), v)).collect(),
        constraints: constraints.clone(),
        result: result.clone(),
    };
    let json = serde_json::to_string_pretty(&record)?;
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(%id, path = %path.display(), "saved recommendation");
    Ok((id, true))
}

/// Saved recommendations under `dir`, newest first. Unreadable files are skipped.
pub fn list_recommendations(dir: &Path) -> Result<Vec<SavedRecommendation>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let parsed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str::<SavedRecommendation>(&s).map_err(anyhow::Error::from));
        match parsed {
            Ok(rec) => out.push(rec),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable recommendation"),
        }
    }
    out.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
    Ok(out)
}
