// Graxil Proxy - Free and Open Source Software Statement
//
// File: src/main.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Proxy daemon: one upstream pool session feeding the job registry.

use clap::Parser;
use graxil_proxy::{JobRegistry, RegistryConfig, Result, SharedRegistry, UpstreamSession, core::types::Args};
use log::{LevelFilter, info};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Validate arguments
    if let Err(err) = args.validate() {
        eprintln!("❌ Error: {}", err);
        std::process::exit(1);
    }

    init_logging(&args)?;

    info!("🚀 Starting Graxil Proxy");
    info!("📍 Pool: {}", args.pool);
    info!("👷 User: {}", args.user);
    info!("🧪 Algorithm: {:?}", args.algorithm());
    if let Some(ref cmd) = args.blocknotify_cmd {
        info!("🔔 Blocknotify: {}", cmd);
    }

    let registry = JobRegistry::new(RegistryConfig::from(&args)).into_shared();
    spawn_block_watcher(SharedRegistry::clone(&registry));

    let session = UpstreamSession::new(registry, args.pool.clone(), args.user.clone(), args.password.clone());
    session.run().await
}

fn init_logging(args: &Args) -> Result<()> {
    if let Some(ref path) = args.log_config {
        log4rs::init_file(path, Default::default()).map_err(|e| e.to_string())?;
        return Ok(());
    }

    let level: LevelFilter = args.log_level.parse()?;
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .map_err(|e| e.to_string())?;
    log4rs::init_config(config)?;
    Ok(())
}

/// Long-poll style consumer of the clean-job broadcast
fn spawn_block_watcher(registry: SharedRegistry) {
    tokio::spawn(async move {
        loop {
            let waiter = registry.read().await.subscribe_clean_jobs();
            match waiter.wait().await {
                Some(block) => info!(
                    "⛓️ New block #{}: prev hash {} (job {})",
                    block.generation, block.prev_hash, block.job_id
                ),
                None => break,
            }
        }
    });
}
