//! Main application orchestration.
//!
//! Builds the paper venues from configuration, wires them into the
//! strategy, and drives the clock loop: tick the strategy, drain venue
//! events back into it, report status on the configured interval, and
//! shut down cleanly on ctrl-c.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;
use xemm_core::{PairId, TradingPair};
use xemm_strategy::{LogOptions, MarketLeg, MarketPair, XemmStrategy};
use xemm_venue::{FixedRateOracle, FxOracle, PaperVenue};

/// Main application.
pub struct Application {
    config: AppConfig,
    strategy: XemmStrategy,
    venues: Vec<Arc<PaperVenue>>,
}

impl Application {
    /// Build the venue set and strategy from configuration.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let mut venues: HashMap<String, Arc<PaperVenue>> = HashMap::new();
        for venue_cfg in &config.venues {
            let venue = Arc::new(PaperVenue::new(venue_cfg.name.clone()));
            for (asset, amount) in &venue_cfg.balances {
                venue.set_balance(asset.clone(), *amount, *amount);
            }
            for book in &venue_cfg.books {
                let pair = parse_pair(&book.pair)?;
                venue.set_quantization(pair.clone(), book.price_quantum, book.size_step);
                venue.set_book(pair, book.bids.clone(), book.asks.clone());
            }
            venues.insert(venue_cfg.name.clone(), venue);
        }

        let mut pairs = Vec::new();
        for (idx, pair_cfg) in config.pairs.iter().enumerate() {
            let maker = venues.get(&pair_cfg.maker_venue).ok_or_else(|| {
                AppError::Config(format!("Unknown maker venue: {}", pair_cfg.maker_venue))
            })?;
            let taker = venues.get(&pair_cfg.taker_venue).ok_or_else(|| {
                AppError::Config(format!("Unknown taker venue: {}", pair_cfg.taker_venue))
            })?;
            pairs.push(MarketPair::new(
                PairId::new(idx as u32),
                MarketLeg::new(maker.clone(), parse_pair(&pair_cfg.maker_pair)?),
                MarketLeg::new(taker.clone(), parse_pair(&pair_cfg.taker_pair)?),
            ));
        }

        let mut fx = FixedRateOracle::new();
        for rate in &config.fx_rates {
            fx = fx.with_rate(rate.from.clone(), rate.to.clone(), rate.rate);
        }

        let strategy = XemmStrategy::new(
            config.strategy.clone(),
            pairs,
            Arc::new(fx) as Arc<dyn FxOracle>,
        )?;
        let venues = venues.into_values().collect();

        Ok(Self {
            config,
            strategy,
            venues,
        })
    }

    /// Run the clock loop until ctrl-c.
    pub async fn run(mut self) -> AppResult<()> {
        info!(
            tick_interval_ms = self.config.tick_interval_ms,
            pairs = self.config.pairs.len(),
            "Starting market making loop"
        );

        let mut tick_interval =
            tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut status_interval = tokio::time::interval(Duration::from_secs(
            self.config.strategy.status_report_interval_secs.max(1),
        ));
        // The first interval tick fires immediately; skip the initial
        // status report so it reflects a running engine.
        status_interval.tick().await;

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }

                _ = status_interval.tick() => {
                    if self.strategy.config().logs(LogOptions::STATUS_REPORT) {
                        info!("Status:\n{}", self.strategy.format_status());
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("Final status:\n{}", self.strategy.format_status());
        Ok(())
    }

    /// One clock tick: advance venue clocks, tick the strategy, then
    /// deliver any resulting venue events back into it.
    fn on_tick(&mut self) {
        let now_ms = chrono::Utc::now().timestamp_millis() as u64;
        for venue in &self.venues {
            venue.set_clock_ms(now_ms);
        }

        self.strategy.tick(now_ms);

        loop {
            let mut events = Vec::new();
            for venue in &self.venues {
                events.extend(venue.poll_events());
            }
            if events.is_empty() {
                break;
            }
            for event in &events {
                self.strategy.process_event(event);
            }
        }
    }
}

fn parse_pair(symbol: &str) -> AppResult<TradingPair> {
    symbol
        .parse::<TradingPair>()
        .map_err(|e| AppError::Config(e.to_string()))
}
