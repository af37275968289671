//! Engine binary for the Ecosim simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ecosim-config.yaml` (or the path in
//!    `ECOSIM_CONFIG`, or the first argument)
//! 2. Initialize structured logging
//! 3. Build the world, population controller, and decision source
//! 4. Bind and start the Observer API server if enabled
//! 5. Map Ctrl-C to the operator stop flag
//! 6. Run the scheduler until stopped, then let the observer drain

mod error;
mod observer_callback;

use std::path::PathBuf;
use std::sync::Arc;

use ecosim_core::clock::IntervalClock;
use ecosim_core::config::SimulationConfig;
use ecosim_core::decision::build_decision_source;
use ecosim_core::operator::OperatorState;
use ecosim_core::scheduler::TickScheduler;
use ecosim_core::tick::SimulationState;
use ecosim_observer::AppState;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "ecosim-config.yaml";

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Configuration.
    let (config, config_path) = load_config()?;

    // 2. Logging. RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| EngineError::Logging {
            message: e.to_string(),
        })?;

    info!(
        config_path = ?config_path,
        world_name = %config.world.name,
        seed = config.world.seed,
        width = config.world.width,
        height = config.world.height,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        "ecosim-engine starting"
    );

    // 3. Simulation state and decision source.
    let state = SimulationState::from_config(&config, true)?;
    let mut decision_source = build_decision_source(config.decision.source, config.world.seed);
    info!(source = ?config.decision.source, "decision source ready");

    let operator = Arc::new(OperatorState::new(config.world.tick_interval_ms));

    // 4. Observer. Binding up front surfaces a port clash before any tick.
    let (app_state, server) = if config.observer.enabled {
        let listener = ecosim_observer::bind(&config.observer).await?;
        let app_state = Arc::new(AppState::with_operator(Arc::clone(&operator)));
        app_state.set_world_name(&config.world.name).await;
        let server = tokio::spawn(ecosim_observer::serve(listener, Arc::clone(&app_state)));
        (Some(app_state), Some(server))
    } else {
        info!("observer disabled");
        (None, None)
    };

    // 5. Ctrl-C requests a stop; the tick in progress completes.
    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("ctrl-c received, stopping after current tick");
                    operator.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
            }
        });
    }

    // 6. Run.
    let mut scheduler = TickScheduler::new(state, IntervalClock, Arc::clone(&operator));
    let mut callback = ObserverCallback::new(app_state);
    scheduler.start()?;
    callback.publish_initial(scheduler.state());

    let report = scheduler.run(decision_source.as_mut(), &mut callback).await;
    // The server only drains on a stop request; make sure it sees one.
    operator.request_stop();
    if let Some(server) = server {
        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "observer server failed"),
            Err(e) => error!(error = %e, "observer server task failed"),
        }
    }
    let report = report?;

    info!(
        run_id = %operator.run_id(),
        ticks_run = report.ticks_run,
        resets = operator.resets(),
        snapshot_skips = callback.skipped(),
        final_tick = scheduler.state().counter.tick(),
        "ecosim-engine shutdown complete"
    );
    Ok(())
}

/// Resolve and load the configuration file.
///
/// Falls back to defaults when no path was given and the default file is
/// absent.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let explicit = std::env::var_os("ECOSIM_CONFIG")
        .map(PathBuf::from)
        .or_else(|| std::env::args_os().nth(1).map(PathBuf::from));

    if let Some(path) = explicit {
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        let config = SimulationConfig::from_file(&default_path)?;
        Ok((config, Some(default_path)))
    } else {
        Ok((SimulationConfig::parse("{}")?, None))
    }
}
