//! Ferrite-Chain node entry point.
//!
//! This build carries no peer networking; the process bootstraps the
//! chain state, reports its status, and exits. Batch delivery is wired
//! in by the network layer, which hands candidate chains to
//! [`node_runtime::Node::engine`].

use anyhow::{Context, Result};

use chain_telemetry::{init_telemetry, TelemetryConfig};
use node_runtime::{bootstrap, RuntimeConfig};

fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let _guard = init_telemetry(&telemetry).context("initializing telemetry")?;

    let config = RuntimeConfig::from_env();
    tracing::info!(data_dir = %config.data_dir.display(), "starting ferrite-chain node");

    let node = bootstrap(&config)?;
    tracing::info!(
        height = node.state.storage.view().chain_height(),
        score = %node.state.score.current(),
        "chain state ready; no networking layer in this build"
    );
    Ok(())
}
