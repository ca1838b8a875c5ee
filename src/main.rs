use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lbc_sniper::config::Config;
use lbc_sniper::sniper::Sniper;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "lbc-sniper", about = "Leboncoin deal sniper")]
struct Cli {
    /// Run a single cycle and exit instead of looping.
    #[arg(long)]
    once: bool,
    /// Run a single cycle with console alerts and no seen-set write.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lbc_sniper=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    print_banner(&config);

    let mut sniper = Sniper::new(config, cli.dry_run)?;

    if cli.once || cli.dry_run {
        sniper.run_once().await?;
        return Ok(());
    }

    sniper.run().await
}

fn print_banner(config: &Config) {
    println!("\n╔═══════════════════════════════════════════════════════════╗");
    println!("║                 Leboncoin Deal Sniper                     ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();
    println!("🔎 Query: {}", config.search.query);
    println!("📍 Location: {}", config.search.location);
    println!("📦 Max listings per cycle: {}", config.search.max_listings);
    println!(
        "💸 Deal threshold: price < {:.0}% of estimate",
        config.detector.deal_threshold_ratio * 100.0
    );
    println!(
        "🔔 Alerts: {}",
        if config.agent.paper_alerts {
            "CONSOLE (paper mode)"
        } else if config.discord_webhook_url.is_some() {
            "Discord webhook"
        } else {
            "CONSOLE (no webhook configured)"
        }
    );
    if config.agent.simulation_mode {
        println!("🎞️  Source: replay fixture {}", config.agent.simulation_file);
    }
    println!(
        "⏱️  Refresh interval: {} minutes",
        config.agent.refresh_interval_minutes
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!("═══════════════════════════════════════════════════════════");
    println!();
}
