use partition_replica::config::service::ServiceConfig;
use partition_replica::membership::types::{Address, MemberEvent};
use partition_replica::service::map_service::MapService;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // .with_max_level(tracing::Level::DEBUG)
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} --bind <addr:port> [--config <path>]", args[0]);
        eprintln!("Example: {} --bind 127.0.0.1:5701", args[0]);
        eprintln!(
            "Example: {} --bind 127.0.0.1:5701 --config maps.json",
            args[0]
        );

        std::process::exit(1);
    }

    let mut bind_addr: Option<SocketAddr> = None;
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = Some(
                    args.get(i + 1)
                        .ok_or_else(|| anyhow::anyhow!("--bind needs a value"))?
                        .parse()?,
                );
                i += 2;
            }
            "--config" => {
                config_path = Some(
                    args.get(i + 1)
                        .ok_or_else(|| anyhow::anyhow!("--config needs a value"))?
                        .clone(),
                );
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let this_address = Address::new(bind_addr.ok_or_else(|| anyhow::anyhow!("--bind is required"))?);

    let config = match config_path {
        Some(path) => {
            tracing::info!("Loading config from {}", path);
            ServiceConfig::load(&path)?
        }
        None => {
            tracing::info!("No config given, using defaults");
            ServiceConfig::default()
        }
    };

    tracing::info!("Starting partition replicas on {}", this_address);

    // 1. Partition workers:
    let service = MapService::new(this_address, config);

    // 2. Membership events (published by the failure detector):
    let (member_events, member_rx) = broadcast::channel::<MemberEvent>(64);
    let listener = service.spawn_member_listener(member_rx);

    // 3. Stats reporter:
    let stats_service = service.clone();
    let reporter = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));

        loop {
            interval.tick().await;
            let stats = match stats_service.stats().await {
                Ok(stats) => stats,
                Err(e) => {
                    tracing::warn!("Stats unavailable: {}", e);
                    break;
                }
            };

            let records: usize = stats.iter().map(|s| s.records).sum();
            let transactions: usize = stats.iter().map(|s| s.transactions).sum();
            let catching_up = stats.iter().filter(|s| s.buffered_backups > 0).count();
            tracing::info!(
                "Node stats: {} records, {} open transactions, {} partitions catching up",
                records,
                transactions,
                catching_up
            );
            for partition in stats.iter().filter(|s| s.buffered_backups > 0) {
                tracing::info!(
                    "  - partition {} applied=v{} buffered={}",
                    partition.partition_id,
                    partition.applied_version,
                    partition.buffered_backups
                );
            }
        }
    });

    tracing::info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;

    reporter.abort();
    drop(member_events);
    let _ = listener.await;
    service.shutdown().await;

    Ok(())
}
