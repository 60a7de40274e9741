use chrono::Utc;
use clap::Parser;
use conn_nanny::{CommandLine, Config, Controller};
use log::{error, info};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .init();

    info!("Starting connection nanny...");

    let args = CommandLine::parse();

    let config = Config::load(&args).unwrap_or_else(|e| {
        error!("Unable to load configuration: {}", e);
        std::process::exit(1);
    });

    let mut controller = Controller::from_config(config).unwrap_or_else(|e| {
        error!("Unable to create the monitor: {}, exiting...", e);
        std::process::exit(1);
    });

    if args.once {
        let report = controller.run_cycle(Utc::now()).await;
        info!(
            "Single cycle done: {} tracked, {} evicted, {} failed terminations",
            report.tracked, report.evicted, report.failed_terminations
        );
        if report.enumerator_failed {
            std::process::exit(1);
        }
        return;
    }

    tokio::select! {
        _ = controller.run() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Unable to listen for the shutdown signal: {}", e);
            }
        }
    }

    let stats = controller.stats();
    info!(
        "Shutting down after {} cycles ({} failed), {} connections evicted",
        stats.cycles, stats.failed_cycles, stats.evictions
    );
}
