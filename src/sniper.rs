use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

use crate::alerts::{ConsoleNotifier, DiscordNotifier, Notifier};
use crate::config::Config;
use crate::leboncoin::{LeboncoinClient, ListingSource};
use crate::simulation::ReplaySource;
use crate::stats::ScanStats;
use crate::store::SeenStore;
use crate::strategies::{DealDetector, PriceModel, QualityFilter};

/// How one pipeline pass ended. Each early exit is informational, never an
/// error; the loop self-heals next cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    NoListings,
    NoQualityListings,
    InsufficientData,
    NoNewDeals,
    Alerted { notified: usize, failed: usize },
}

/// Owns the whole pipeline and the only state that crosses cycle boundaries:
/// the seen set and the interval timer.
pub struct Sniper {
    config: Config,
    source: Arc<dyn ListingSource>,
    notifier: Arc<dyn Notifier>,
    filter: QualityFilter,
    detector: DealDetector,
    store: SeenStore,
    seen: HashSet<String>,
    stats: ScanStats,
    persist: bool,
}

impl Sniper {
    /// Wire up the pipeline from config: replay fixture or live scraper on
    /// one side, Discord webhook or console on the other. `dry_run` forces
    /// console alerts and leaves the seen file untouched.
    pub fn new(config: Config, dry_run: bool) -> Result<Self> {
        let source: Arc<dyn ListingSource> = if config.agent.simulation_mode {
            info!("🎞️  Initializing replay source from {}", config.agent.simulation_file);
            Arc::new(ReplaySource::from_file(&config.agent.simulation_file)?)
        } else {
            info!("🌐 Initializing Leboncoin client");
            Arc::new(LeboncoinClient::new(&config.http))
        };

        let notifier: Arc<dyn Notifier> = if dry_run || config.agent.paper_alerts {
            info!("📝 Alerts go to the console (paper mode)");
            Arc::new(ConsoleNotifier)
        } else {
            match &config.discord_webhook_url {
                Some(url) => {
                    info!("🔔 Alerts go to the Discord webhook");
                    Arc::new(DiscordNotifier::new(url.clone(), config.http.timeout_secs))
                }
                None => {
                    warn!("⚠️ DISCORD_WEBHOOK_URL not set, falling back to console alerts");
                    Arc::new(ConsoleNotifier)
                }
            }
        };

        Self::with_parts(config, source, notifier, dry_run)
    }

    /// Assemble from explicit parts. Tests inject scripted sources and
    /// recording notifiers through this.
    pub fn with_parts(
        config: Config,
        source: Arc<dyn ListingSource>,
        notifier: Arc<dyn Notifier>,
        dry_run: bool,
    ) -> Result<Self> {
        let store = SeenStore::new(&config.seen_file);
        // A corrupted file is treated like a missing one: the cost is a
        // possible duplicate alert, the same as a failed save.
        let seen = match store.load() {
            Ok(seen) => {
                info!("📂 Loaded {} previously alerted listings", seen.len());
                seen
            }
            Err(e) => {
                error!("❌ Could not load the seen set, starting empty: {}", e);
                HashSet::new()
            }
        };

        Ok(Self {
            filter: QualityFilter::new(config.filter.clone()),
            detector: DealDetector::new(config.detector.clone()),
            store,
            seen,
            stats: ScanStats::new(),
            persist: !dry_run,
            config,
            source,
            notifier,
        })
    }

    /// Interval loop: one cycle per tick, forever. Ctrl-C is honored only
    /// between cycles so a notify/persist sequence is never cut in half.
    pub async fn run(&mut self) -> Result<()> {
        info!("🚀 Starting Leboncoin deal sniper");
        info!(
            "⏱️  Refresh interval: {} minutes",
            self.config.agent.refresh_interval_minutes
        );

        let (stop_tx, mut stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = stop_tx.send(true);
            }
        });

        let mut tick = interval(Duration::from_secs(
            self.config.agent.refresh_interval_minutes * 60,
        ));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let outcome = self.run_cycle().await;
                    self.stats.record(&outcome);
                    info!("📊 {}", self.stats.summary());
                }
                _ = stop_rx.changed() => {
                    info!("🛑 Stop signal received, exiting at cycle boundary");
                    break;
                }
            }
        }
        Ok(())
    }

    /// One cycle on explicit trigger (`--once`, `--dry-run`), then back to
    /// the caller.
    pub async fn run_once(&mut self) -> Result<CycleOutcome> {
        let outcome = self.run_cycle().await;
        self.stats.record(&outcome);
        info!("📊 {}", self.stats.summary());
        Ok(outcome)
    }

    /// Fetch → filter → fit → detect → seen diff → notify → persist, strictly
    /// in that order.
    async fn run_cycle(&mut self) -> CycleOutcome {
        info!(
            "🔎 Scanning Leboncoin for '{}' in '{}'...",
            self.config.search.query, self.config.search.location
        );

        let mut listings = match self
            .source
            .fetch_listings(
                &self.config.search.query,
                &self.config.search.location,
                self.config.search.max_listings,
            )
            .await
        {
            Ok(listings) => listings,
            Err(e) => {
                warn!("⚠️ Listing fetch failed: {}", e);
                Vec::new()
            }
        };
        if listings.is_empty() {
            info!("⚠️ No listings found");
            return CycleOutcome::NoListings;
        }

        let fetched = listings.len();
        self.filter.apply(&mut listings);
        if listings.is_empty() {
            info!("ℹ️ None of the {} listings passed the quality filter", fetched);
            return CycleOutcome::NoQualityListings;
        }
        info!("🧹 {} of {} listings passed the quality filter", listings.len(), fetched);

        // In-batch oracle: fit on this cycle's priced listings, then predict
        // the very same batch.
        let model = match PriceModel::fit(&listings, &self.config.model) {
            Ok(model) => model,
            Err(e) => {
                info!("ℹ️ Skipping estimation this cycle: {}", e);
                return CycleOutcome::InsufficientData;
            }
        };
        model.estimate(&mut listings);

        let deals = self.detector.detect(&listings);
        let new_deals: Vec<_> = deals
            .into_iter()
            .filter(|deal| !self.seen.contains(&deal.link))
            .collect();
        if new_deals.is_empty() {
            info!("ℹ️ No new deals this cycle");
            return CycleOutcome::NoNewDeals;
        }

        info!("✅ {} new deals found!", new_deals.len());
        let mut notified = 0;
        let mut failed = 0;
        for deal in &new_deals {
            info!(
                "💰 {} - {} € (estimated {:.0} €)",
                deal.title,
                deal.price.unwrap_or_default(),
                deal.estimated_price.unwrap_or_default()
            );
            match self.notifier.notify(deal).await {
                Ok(()) => notified += 1,
                Err(e) => {
                    warn!("⚠️ Notification failed for {}: {}", deal.link, e);
                    failed += 1;
                }
            }
            // At-most-once: the link is recorded even when delivery failed.
            self.seen.insert(deal.link.clone());
        }

        if self.persist {
            if let Err(e) = self.store.save(&self.seen) {
                error!(
                    "❌ Could not persist the seen set, duplicate alerts are possible: {}",
                    e
                );
            }
        }

        CycleOutcome::Alerted { notified, failed }
    }

    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }
}
