//! Bridge process entry point.
//!
//! Reads one JSON request per line from stdin and writes one JSON response per
//! line to stdout until stdin closes.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use shopdesk_desktop::{AppConfig, Bridge};
use shopdesk_infra::LedgerStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    shopdesk_observability::init(config.log_format);

    let store = LedgerStore::open(&config.store)
        .await
        .with_context(|| format!("failed to open ledger store at {:?}", config.store.location))?;
    let bridge = Bridge::new(store.clone());
    tracing::info!("bridge ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await.context("failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }
        let mut response = bridge.handle_line(&line).await;
        response.push('\n');
        stdout
            .write_all(response.as_bytes())
            .await
            .context("failed to write response")?;
        stdout.flush().await.context("failed to flush response")?;
    }

    tracing::info!("stdin closed, shutting down");
    store.close().await;
    Ok(())
}
