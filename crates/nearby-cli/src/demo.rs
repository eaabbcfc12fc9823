//! Two-device demo over a simulated medium
//!
//! A publisher and a subscriber share one [`SimulatedMedium`]. The subscriber's
//! event stream is collected and returned in arrival order.

use std::sync::Arc;
use std::time::Duration;

use nearby_core::{CommandKind, NearbyEvent, NearbyResult};
use nearby_harness::{MockDiscoveryTransport, SimulatedMedium};
use nearby_runtime::{EventReceiver, RuntimeBuilder, RuntimeHandle};
use tracing::info;

use crate::config::AppConfig;
use crate::error::{CliError, Result};

/// Run the demo and return every event the subscriber saw
pub async fn run_demo(config: &AppConfig) -> Result<Vec<NearbyEvent>> {
    let medium = SimulatedMedium::new();
    let linger = Duration::from_millis(config.demo.linger_ms);

    let mut publisher = start_device(&medium, config).await?;
    let mut subscriber = start_device(&medium, config).await?;
    let mut events = subscriber
        .take_event_receiver()
        .ok_or_else(|| CliError::Config("subscriber event stream unavailable".to_string()))?;

    let mut seen = Vec::new();

    step(CommandKind::Connect, subscriber.gateway().connect(config.api_key.as_str()).await)?;
    step(CommandKind::Subscribe, subscriber.gateway().subscribe().await)?;
    step(CommandKind::Connect, publisher.gateway().connect(config.api_key.as_str()).await)?;

    info!("Publishing {:?}", config.demo.message);
    step(
        CommandKind::Publish,
        publisher.gateway().publish(config.demo.message.as_str()).await,
    )?;
    collect(&mut events, linger, &mut seen).await;

    info!("Unpublishing");
    step(CommandKind::Unpublish, publisher.gateway().unpublish().await)?;
    collect(&mut events, linger, &mut seen).await;

    step(CommandKind::Unsubscribe, subscriber.gateway().unsubscribe().await)?;
    step(CommandKind::Disconnect, subscriber.gateway().disconnect().await)?;
    step(CommandKind::Disconnect, publisher.gateway().disconnect().await)?;

    publisher.shutdown().await?;
    subscriber.shutdown().await?;

    info!(
        "Demo finished: {} events, {} sessions left on air",
        seen.len(),
        medium.session_count()
    );
    Ok(seen)
}

async fn start_device(medium: &SimulatedMedium, config: &AppConfig) -> Result<RuntimeHandle> {
    let transport = Arc::new(MockDiscoveryTransport::on_medium(medium.clone()));
    let runtime = RuntimeBuilder::new(transport)
        .with_config(config.runtime.clone())
        .build_and_start()
        .await?;
    Ok(runtime)
}

fn step(kind: CommandKind, result: NearbyResult<()>) -> Result<()> {
    result.map_err(|e| CliError::command(kind, e))
}

/// Drain events until the stream stays quiet for `linger`
async fn collect(events: &mut EventReceiver, linger: Duration, seen: &mut Vec<NearbyEvent>) {
    while let Ok(Some(event)) = tokio::time::timeout(linger, events.recv()).await {
        info!("Event {}", event);
        seen.push(event);
    }
}
