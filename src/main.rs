use anyhow::Context;
use clap::Parser;
use obj_accel::utils::{logger, validation::Validate};
use obj_accel::{CliConfig, Command, LogThreshold, ObjEngine, ObjectKey, TransferBuffer};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    let threshold = LogThreshold::global().clone();
    if config.json_logs {
        logger::init_json_logger(threshold);
    } else {
        logger::init_cli_logger(config.verbose, threshold);
    }

    tracing::info!("Starting obj-accel CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let params = config.client_params()?;
    if let Err(e) = params.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let engine = Arc::new(ObjEngine::new(&params, None).context("failed to initialize engine")?);

    match config.command {
        Command::Exists { key } => {
            let key = ObjectKey::new(key)?;
            let checker = engine.clone();
            let check_key = key.clone();
            // The existence check blocks; keep it off the runtime workers.
            let found = tokio::task::spawn_blocking(move || checker.exists(&check_key)).await?;
            println!("{}: {}", key, if found { "exists" } else { "not found" });
        }
        Command::Put { key, file } => {
            let key = ObjectKey::new(key)?;
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let buffer = TransferBuffer::from_vec(data, 0)?;
            if !engine.put(&key, &buffer).await {
                anyhow::bail!("put of {} failed", key);
            }
            println!("uploaded {} bytes to {}", buffer.len(), key);
        }
        Command::Get {
            key,
            file,
            offset,
            len,
        } => {
            let key = ObjectKey::new(key)?;
            let buffer = TransferBuffer::zeroed(len, offset)?;
            if !engine.get(&key, &buffer).await {
                anyhow::bail!("get of {} failed", key);
            }
            // A short read leaves the tail of the buffer unfilled; only write what arrived.
            tokio::fs::write(&file, buffer.filled_bytes())
                .await
                .with_context(|| format!("failed to write {}", file.display()))?;
            println!(
                "downloaded {} bytes of {} into {}",
                buffer.filled(),
                key,
                file.display()
            );
        }
    }

    Ok(())
}
