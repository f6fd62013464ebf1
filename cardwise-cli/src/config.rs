use anyhow::{Context, Result};
use cardwise_core::{Constraints, Strategy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::cardwise_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub log: LogSection,
}

/// Constraint values used when neither the profile nor the command line sets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsSection {
    pub max_cards: usize,
    pub max_annual_fees: Option<f64>,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// JSON or CSV catalog, relative to the working directory
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// `EnvFilter` directive used when RUST_LOG is unset
    pub filter: String,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            max_cards: 1,
            max_annual_fees: None,
            strategy: Strategy::Standalone,
        }
    }
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/catalog.json"),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn base_constraints(&self) -> Constraints {
        Constraints {
            max_cards: self.defaults.max_cards,
            max_annual_fees: self.defaults.max_annual_fees,
            strategy: self.defaults.strategy,
            ..Constraints::default()
        }
    }
}

/// Where the config lives. Resolving it never creates anything.
pub fn config_path() -> Result<PathBuf> {
    Ok(cardwise_home()?.join("config.toml"))
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    save_config_to(&config_path()?, cfg)
}

pub fn save_config_to(p: &Path, cfg: &Config) -> Result<()> {
    if let Some(dir) = p.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config_from(&p)?;
    let source = if p.exists() { "file" } else { "defaults" };
    println!("# {} ({source})", p.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
