use anyhow::{bail, Result};
use pilot_node::{abort_pair, Pilot, PilotConfig};
use pilot_node::sdk::SdkBridge;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep, Instant};

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Hover height for the scripted session
const HOVER_HEIGHT_M: f32 = 3.0;
/// How long to hold the hover before landing
const HOVER_DURATION: Duration = Duration::from_secs(10);
/// Setpoint stream rate while hovering
const SETPOINT_PERIOD: Duration = Duration::from_millis(20);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = PilotConfig::from_env()?;
    info!("Pilot node starting");
    info!("  SDK bridge: {}", config.bridge.address);
    info!("  Final mode check: {:?}", config.mode_check);

    let (bridge, notifications) = SdkBridge::connect(config.bridge.clone());
    let bridge = Arc::new(bridge);
    let pilot = Pilot::new(bridge.clone(), notifications, &config);

    wait_for_bridge(&bridge, Duration::from_secs(30)).await?;

    if let Err(e) = pilot.query_version().await {
        warn!("Could not read autopilot version: {}", e);
    }

    pilot.obtain_control().await?;

    let result = fly_session(&pilot).await;
    if let Err(ref e) = result {
        error!("Session failed: {}", e);
    }

    if let Err(e) = pilot.release_control().await {
        warn!("Could not release control: {}", e);
    }

    result
}

async fn wait_for_bridge(bridge: &SdkBridge, limit: Duration) -> Result<()> {
    let deadline = Instant::now() + limit;
    while !bridge.is_connected().await {
        if Instant::now() >= deadline {
            bail!("SDK bridge not reachable after {:?}", limit);
        }
        sleep(Duration::from_millis(100)).await;
    }
    Ok(())
}

/// Take off, hold a hover while reporting telemetry, then land
async fn fly_session(pilot: &Pilot) -> Result<()> {
    let (abort_handle, abort_signal) = abort_pair();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, aborting takeoff");
            abort_handle.abort();
        }
    });

    let takeoff = pilot.takeoff_with_abort(abort_signal).await;
    ctrl_c.abort();
    takeoff?;

    info!("Holding {} m for {:?}", HOVER_HEIGHT_M, HOVER_DURATION);
    let hold = async {
        let mut ticker = interval(SETPOINT_PERIOD);
        let until = Instant::now() + HOVER_DURATION;
        while Instant::now() < until {
            ticker.tick().await;
            pilot.set_vertical_position(HOVER_HEIGHT_M).await;
        }
    };
    let report = async {
        let mut ticker = interval(Duration::from_secs(1));
        let until = Instant::now() + HOVER_DURATION;
        while Instant::now() < until {
            ticker.tick().await;
            let position = pilot.position().await;
            let attitude = pilot.attitude().await;
            info!(
                "pos=({:.2}, {:.2}, {:.2}) height={:.2} yaw={:.3} status={:?} mode={:?}",
                position.x,
                position.y,
                position.z,
                pilot.height().await,
                attitude.yaw,
                pilot.flight_status().await,
                pilot.display_mode().await
            );
        }
    };
    futures::future::join(hold, report).await;

    pilot.land().await?;
    info!("Landing requested");
    Ok(())
}
