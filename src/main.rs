//! AUGUR — color-outcome prediction ensemble
//!
//! Entry point. Loads configuration, initialises structured logging,
//! reads the game history, runs the engine once and prints the result
//! as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use std::path::Path;
use tracing::{info, warn};

use augur::config::AppConfig;
use augur::engine::{validate_bet_amount, EngineProfile, PredictionEngine};
use augur::storage;

const BANNER: &str = r#"
    _   _   _  ____ _   _ ____
   / \ | | | |/ ___| | | |  _ \
  / _ \| | | | |  _| | | | |_) |
 / ___ \ |_| | |_| | |_| |  _ <
/_/   \_\___/ \____|\___/|_| \_\

  Weighted strategy ensemble with hedged stake allocation
  v0.1.0
"#;

/// Predict the next outcome of a color game from its recent history.
#[derive(Parser, Debug)]
#[command(name = "augur", version, about)]
struct Args {
    /// JSON file of feed records (overrides input.history_path).
    #[arg(long)]
    history: Option<String>,

    /// Total wager, a positive multiple of the rounding unit.
    #[arg(long)]
    bet: Option<Decimal>,

    /// Run both engine profiles and compare them.
    #[arg(long)]
    compare: bool,

    /// Engine profile (overrides engine.profile).
    #[arg(long)]
    profile: Option<EngineProfile>,

    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Also write the JSON result to this file.
    #[arg(long)]
    output: Option<String>,
}

fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let args = Args::parse();
    init_logging();

    let mut cfg = if Path::new(&args.config).exists() {
        AppConfig::load(&args.config)?
    } else {
        warn!(path = %args.config, "Config file not found, using defaults");
        AppConfig::default()
    };
    if let Some(profile) = args.profile {
        cfg.select_profile(profile);
    }

    eprintln!("{BANNER}");
    info!(
        profile = %cfg.engine.profile,
        config = %args.config,
        "AUGUR starting up"
    );

    let engine_config = cfg.engine_config()?;
    let bet = args.bet.unwrap_or(cfg.input.default_bet);
    validate_bet_amount(bet, engine_config.stake.rounding_unit)?;

    let history_path = args.history.unwrap_or_else(|| cfg.input.history_path.clone());
    let history = storage::load_history(&history_path)?;

    let engine = PredictionEngine::new(engine_config)?;

    let json = if args.compare {
        let comparison = engine.compare_profiles(&history, bet)?;
        info!(
            basic = comparison.basic.confidence_percent,
            advanced = comparison.advanced.confidence_percent,
            recommendation = %comparison.recommendation,
            "Profiles compared"
        );
        if let Some(path) = args.output.as_ref().or(cfg.input.output_path.as_ref()) {
            storage::save_prediction(&comparison, path)?;
        }
        serde_json::to_string_pretty(&comparison).context("Failed to serialise comparison")?
    } else {
        let result = engine.predict(&history, bet)?;
        info!(
            predicted = %result.predicted_label,
            confidence = result.confidence_percent,
            primary = %result.stake_plan.primary_stake,
            hedge = %result.stake_plan.hedge_stake,
            risk = %result.stake_plan.risk_level,
            "Prediction complete"
        );
        if let Some(path) = args.output.as_ref().or(cfg.input.output_path.as_ref()) {
            storage::save_prediction(&result, path)?;
        }
        serde_json::to_string_pretty(&result).context("Failed to serialise prediction")?
    };

    println!("{json}");
    Ok(())
}

/// Initialise the `tracing` subscriber. Logs go to stderr so stdout stays
/// valid JSON.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("augur=info"));

    let json_logging = std::env::var("AUGUR_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
