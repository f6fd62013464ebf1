use anyhow::{Context, Result, bail};
use cardwise_core::{Card, Constraints, RewardType, SpendingProfile, Strategy, category};
use cardwise_engine::{
    CardValuation, RecommendationResult, RewardEntry, rank_cards, select_combination, value_card,
};
use cardwise_ingest::{ConstraintOverrides, load_catalog, load_profile, load_scenarios};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "cardwise",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARDWISE_BUILD_SHA"), ")"),
    about = "Credit card recommendations from a monthly spending profile"
)]
struct Cli {
    /// Card catalog (.json or .csv); defaults to [catalog].path from config
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend a combination of cards for a spending profile
    Recommend {
        #[command(flatten)]
        input: ProfileArgs,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Store the result under ~/.cardwise/recommendations
        #[arg(long)]
        save: bool,
    },

    /// Show one card's standalone valuation
    Value {
        /// Card id from the catalog
        card: String,

        #[command(flatten)]
        input: ProfileArgs,

        #[arg(long)]
        json: bool,
    },

    /// Rank every eligible card by standalone net value
    Rank {
        #[command(flatten)]
        input: ProfileArgs,

        /// Limit number of cards printed (default: all)
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// List canonical spending categories and their aliases
    Categories {
        #[arg(long)]
        json: bool,
    },

    /// Run scenario files against the catalog
    Scenarios {
        /// Scenario file or directory
        #[arg(default_value = "data/scenarios")]
        path: PathBuf,
    },

    /// List saved recommendations
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Manage ~/.cardwise/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Args, Debug, Clone, Default)]
struct ProfileArgs {
    /// Spending profile JSON (flat map or with category_spending)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Monthly spend, e.g. --spend dining=500 (repeatable, added to --profile)
    #[arg(long = "spend", value_parser = parse_spend)]
    spend: Vec<(String, f64)>,

    #[arg(long)]
    max_cards: Option<usize>,

    /// Inclusive ceiling on summed annual fees
    #[arg(long)]
    max_fees: Option<f64>,

    #[arg(long)]
    issuer: Option<String>,

    #[arg(long)]
    reward_type: Option<RewardType>,

    /// standalone | marginal
    #[arg(long)]
    strategy: Option<Strategy>,
}

fn parse_spend(s: &str) -> Result<(String, f64), String> {
    let (name, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=AMOUNT, got `{s}`"))?;
    let amount: f64 = amount
        .trim()
        .trim_start_matches('$')
        .replace(',', "")
        .parse()
        .map_err(|_| format!("`{amount}` is not a number"))?;
    Ok((name.trim().to_string(), amount))
}

impl ProfileArgs {
    /// Spending profile and constraints: config defaults, then profile file, then flags.
    fn resolve(&self, cfg: &Config) -> Result<(SpendingProfile, Constraints)> {
        let mut entries: Vec<(String, f64)> = Vec::new();
        let mut overrides = ConstraintOverrides::default();

        if let Some(path) = &self.profile {
            let loaded = load_profile(path)?;
            entries.extend(loaded.profile.iter().map(|(c, v)| (c.to_string(), v)));
            overrides = loaded.overrides;
        }
        entries.extend(self.spend.iter().cloned());

        if entries.is_empty() {
            bail!("no spending given (pass --profile <file> or --spend category=amount)");
        }
        let profile = SpendingProfile::new(entries)?;

        let mut constraints = overrides.apply(cfg.base_constraints());
        let flags = ConstraintOverrides {
            max_cards: self.max_cards,
            max_annual_fees: self.max_fees,
            preferred_issuer_id: self.issuer.clone(),
            reward_type: self.reward_type,
            strategy: self.strategy,
        };
        constraints = flags.apply(constraints);
        constraints.validate()?;
        Ok((profile, constraints))
    }
}

fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_tracing(&cfg);

    let catalog_path = cli.catalog.clone().unwrap_or_else(|| cfg.catalog.path.clone());

    match cli.command {
        Command::Recommend { input, json, save } => {
            let catalog = load_catalog(&catalog_path)?;
            let (profile, constraints) = input.resolve(&cfg)?;
            let result = select_combination(&catalog, &profile, &constraints)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_recommendation(&result, &catalog);
            }

            if save {
                let dir = state::recommendations_dir()?;
                let (id, created) = state::save_recommendation(&dir, &profile, &constraints, &result)?;
                if created {
                    eprintln!("Saved recommendation {id}");
                } else {
                    eprintln!("Recommendation {id} already saved");
                }
            }
        }

        Command::Value { card, input, json } => {
            let catalog = load_catalog(&catalog_path)?;
            let (profile, _) = input.resolve(&cfg)?;
            let card = catalog
                .iter()
                .find(|c| c.id == card)
                .with_context(|| format!("card `{card}` not in {}", catalog_path.display()))?;
            let valuation = value_card(card, &profile);

            if json {
                println!("{}", serde_json::to_string_pretty(&valuation)?);
            } else {
                print_valuation(card, &valuation);
            }
        }

        Command::Rank { input, limit, json } => {
            let catalog = load_catalog(&catalog_path)?;
            let (profile, constraints) = input.resolve(&cfg)?;
            let ranked = rank_cards(&catalog, &profile, &constraints)?;
            let shown = limit.unwrap_or(ranked.len());

            if json {
                let vals: Vec<&CardValuation> = ranked.iter().take(shown).map(|r| &r.valuation).collect();
                println!("{}", serde_json::to_string_pretty(&vals)?);
            } else {
                println!("Ranked {} eligible card(s):\n", ranked.len());
                for (i, r) in ranked.iter().take(shown).enumerate() {
                    println!(
                        "{:>2}. [{}] {} | net=${:.2} | value=${:.2} | fee=${:.2}",
                        i + 1,
                        r.card.id,
                        r.card.name,
                        r.valuation.net_value,
                        r.valuation.annual_value,
                        r.card.annual_fee
                    );
                }
            }
        }

        Command::Categories { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(category::all())?);
                return Ok(());
            }
            for def in category::all() {
                if def.aliases.is_empty() {
                    println!("{:<20} {}", def.name, def.display_name);
                } else {
                    println!(
                        "{:<20} {} (also: {})",
                        def.name,
                        def.display_name,
                        def.aliases.join(", ")
                    );
                }
            }
        }

        Command::Scenarios { path } => {
            run_scenarios(&catalog_path, &path)?;
        }

        Command::History { limit } => {
            let dir = state::recommendations_dir()?;
            let saved = state::list_recommendations(&dir)?;
            if saved.is_empty() {
                println!("No saved recommendations in {}", dir.display());
            }
            for rec in saved.iter().take(limit) {
                println!(
                    "{} | {} | cards={} | net=${:.2}",
                    &rec.id[..12.min(rec.id.len())],
                    rec.generated_at.format("%Y-%m-%d %H:%M UTC"),
                    rec.result.recommended_sequence.join(","),
                    rec.result.net_value
                );
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn print_recommendation(result: &RecommendationResult, catalog: &[Card]) {
    if result.is_empty() {
        println!("No card fits these constraints.");
        return;
    }

    println!("# Recommended cards\n");
    for (i, id) in result.recommended_sequence.iter().enumerate() {
        let Some(detail) = result.card_details.get(id) else {
            continue;
        };
        let issuer = catalog
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.issuer_id.as_str())
            .unwrap_or("?");
        println!(
            "{}. [{}] {} ({}) | fee=${:.2} | credited=${:.2}",
            i + 1,
            id,
            detail.card_name,
            issuer,
            detail.annual_fee,
            detail.attributed_value
        );
        if !detail.attributed_categories.is_empty() {
            println!("   use for: {}", detail.attributed_categories.join(", "));
        }
        if let Some(RewardEntry::Amount(bonus)) = detail.rewards_by_category.get(category::SIGNUP_BONUS) {
            println!("   signup bonus: ${bonus:.2}");
        }
        if let Some(RewardEntry::Amount(credits)) = detail.rewards_by_category.get(category::CARD_CREDITS) {
            println!("   card credits: ${credits:.2}");
        }
    }

    println!();
    println!("Total value:  ${:.2}", result.total_value);
    println!("Annual fees:  ${:.2}", result.total_annual_fees);
    println!("Net value:    ${:.2}", result.net_value);
    let months: Vec<String> = result.per_month_value.iter().map(|v| format!("{v:.0}")).collect();
    println!("By month:     {}", months.join(" "));
}

fn print_valuation(card: &Card, v: &CardValuation) {
    println!("# {} [{}] ({})\n", card.name, card.id, card.reward_type);
    for (category, r) in &v.rewards_by_category {
        match r.limit {
            Some(cap) => println!(
                "{:<18} {:.2}% on ${:.0} (cap ${:.0}) + {:.2}% on ${:.0} = ${:.2}",
                category, r.main_rate, r.main_spend, cap, r.base_rate, r.base_spend, r.value
            ),
            None => println!(
                "{:<18} {:.2}% on ${:.0} = ${:.2}",
                category, r.main_rate, r.main_spend, r.value
            ),
        }
    }
    if let Some(month) = v.signup_bonus_month {
        println!("{:<18} ${:.2} (month {})", category::SIGNUP_BONUS, v.signup_bonus_value, month + 1);
    }
    if v.credits_value > 0.0 {
        println!("{:<18} ${:.2}", category::CARD_CREDITS, v.credits_value);
    }
    println!();
    println!("Annual value: ${:.2}", v.annual_value);
    println!("Annual fee:   ${:.2}", v.annual_fee);
    println!("Net value:    ${:.2}", v.net_value);
}

fn run_scenarios(catalog_path: &Path, path: &Path) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let sets = load_scenarios(path)?;

    let mut passed = 0;
    let mut failed = 0;
    for set in &sets {
        println!("## {} ({})", set.category, set.source.display());
        for scenario in &set.scenarios {
            let outcome = scenario
                .spending_profile()
                .and_then(|profile| select_combination(&catalog, &profile, &scenario.constraints));
            let failures = match outcome {
                Ok(result) => scenario.expect.check(
                    &result.recommended_sequence,
                    result.total_value,
                    result.total_annual_fees,
                ),
                Err(e) => vec![e.to_string()],
            };

            if failures.is_empty() {
                passed += 1;
                println!("  ok   {}", scenario.name);
            } else {
                failed += 1;
                println!("  FAIL {}", scenario.name);
                for f in failures {
                    println!("       {f}");
                }
            }
        }
    }

    println!("\n{passed} passed, {failed} failed");
    if failed > 0 {
        bail!("{failed} scenario(s) failed");
    }
    Ok(())
}
