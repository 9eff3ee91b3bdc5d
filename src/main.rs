//! Pythia Demo
//!
//! Runs one price-feed market end to end against a manual clock and an
//! in-memory oracle.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pythia::{
    market::{InMemoryPriceOracle, PriceReading},
    ManualClock, MarketFactory, PredictionSigner, PriceFeedsMarketRequest, PythiaConfig,
    ReputationLedger, SealedPrediction, VERSION,
};

const DAY: u64 = 24 * 60 * 60;

fn main() -> Result<()> {
    let config = PythiaConfig::from_env().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    info!("Pythia Markets v{}", VERSION);
    info!(
        "Reward denomination: {}, trial: {} days",
        config.reward_denomination, config.trial_period_days
    );

    demo_market(&config)
}

/// Create, fill, reveal and resolve one market.
fn demo_market(config: &PythiaConfig) -> Result<()> {
    info!("=== Starting Demo Market ===");

    let start = 1_700_000_000;
    let clock = Arc::new(ManualClock::new(start));
    let oracle = Arc::new(InMemoryPriceOracle::new());
    let mut factory = MarketFactory::new(config, clock.clone());

    let creator = PredictionSigner::from_secret_bytes(&[0x11; 32])?;
    factory.create_account(creator.address())?;

    let market_id = factory.create_price_feeds_market(
        creator.address(),
        PriceFeedsMarketRequest {
            question: "Where will ETH/USD close?".into(),
            thresholds: vec![200_000_000_000, 300_000_000_000, 400_000_000_000],
            number_of_outcomes: 3,
            wage_deadline: start + 7 * DAY,
            resolution_date: start + 14 * DAY,
            feed: "ETH/USD".into(),
        },
        oracle.clone(),
    )?;
    info!("Market ID: {}", market_id);

    // Commit phase
    let forecasts = [(0x21u8, 1u64, DAY), (0x22, 1, 5 * DAY), (0x23, 2, 2 * DAY)];
    let mut sealed = Vec::new();
    for (seed, value, offset) in forecasts {
        let signer = PredictionSigner::from_secret_bytes(&[seed; 32])?;
        let prediction = SealedPrediction::seal(&signer, value, market_id);

        clock.set(start + offset);
        factory.predict(&market_id, prediction.participant, prediction.commitment)?;
        info!(
            "{} committed {}",
            prediction.participant.short(),
            hex::encode(&prediction.commitment[..8])
        );
        sealed.push(prediction);
    }

    // Reveal phase
    clock.set(start + 8 * DAY);
    for prediction in &sealed {
        let verified = factory.verify_prediction(
            &market_id,
            prediction.participant,
            prediction.value,
            &prediction.signature,
        )?;
        info!("{} revealed {} (verified: {})", prediction.participant.short(), prediction.value, verified);
    }

    // Resolution
    clock.set(start + 14 * DAY);
    oracle.publish(
        "ETH/USD",
        PriceReading {
            value: 275_000_000_000,
            decimals: 8,
            timestamp: start + 14 * DAY,
        },
    )?;
    let resolution = factory.resolve(&market_id)?;
    info!("=== Market Resolved: outcome {} ===", resolution.answer);

    let token = factory.reputation_token();
    for prediction in &sealed {
        info!(
            "{}: {} {}",
            prediction.participant.short(),
            token.balance_of(&prediction.participant),
            token.symbol()
        );
    }
    info!("Total supply: {}", token.total_supply());

    let market = factory
        .market(&market_id)
        .context("market missing after resolution")?;
    let snapshot = serde_json::to_string_pretty(&market.snapshot())?;
    info!("Snapshot:\n{}", snapshot);

    Ok(())
}
