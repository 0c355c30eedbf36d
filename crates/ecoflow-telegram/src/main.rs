//! EcoFlow Telegram Bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx EF_ACCESS_KEY=xxx EF_SECRET_KEY=xxx cargo run -p ecoflow-telegram
//! ```

use std::process::ExitCode;

use clap::Parser;
use ecoflow_core::{render, Config, StatusReport};
use ecoflow_telegram::StationBot;
use tracing_subscriber::EnvFilter;

/// EcoFlow Telegram Bot - station status and grid outage alerts
#[derive(Parser, Debug)]
#[command(name = "ecoflow-telegram")]
#[command(about = "Telegram bot that watches an EcoFlow station for grid outages")]
struct Args {
    /// Query the station once, print the result and exit
    #[arg(long)]
    check: bool,

    /// Do not run the background grid monitor
    #[arg(long)]
    no_monitor: bool,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    // Initialize logging based on verbosity
    let filter = match args.verbose {
        0 => "ecoflow=info,teloxide=warn",
        1 => "ecoflow=debug,teloxide=info",
        2 => "ecoflow=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = Config::from_env()?;
    if args.no_monitor {
        config = config.with_monitoring(false);
    }

    if args.check {
        let report = ecoflow_telegram::check(&config).await?;
        println!("{}", render::console(&report));
        return Ok(match report {
            StatusReport::Ready { .. } => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        });
    }

    let bot = StationBot::new(config)?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[bolt] EcoFlow Telegram Bot");
            println!("   Bot: @{}", username);
            println!("   Host: {}", bot.config().host);
            println!(
                "   Monitor: {}",
                if bot.config().monitoring {
                    format!("every {}s", bot.config().check_interval.as_secs())
                } else {
                    "off".to_string()
                }
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n[phone] Open Telegram and send /start to check your station");
    println!("   Press Ctrl+C to stop\n");

    bot.start_polling().await?;

    Ok(ExitCode::SUCCESS)
}
