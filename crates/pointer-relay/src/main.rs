//! pointer-relay binary entry point.
//!
//! Installs the OS mouse hook and prints every relayed event to stdout as one
//! JSON object per line until Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()            -- buffer capacity, log level
//!  └─ PointerRelay::start()
//!       ├─ WindowsMouseHook    (WH_MOUSE_LL hook thread)
//!       └─ consumer task       (Tokio: wake → dispatch → JsonLinesSink)
//!  └─ Ctrl-C → shutdown()
//! ```

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pointer_relay::application::dispatch::EventSink;
use pointer_relay::infrastructure::hook::HookService;
use pointer_relay::infrastructure::host::PointerRelay;
use pointer_relay::infrastructure::sink::JsonLinesSink;
use pointer_relay::infrastructure::storage::config::{load_config, RelayAppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config is read before logging exists; a failure is reported right after.
    let (config, config_error) = match load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (RelayAppConfig::default(), Some(e)),
    };

    // Initialise structured logging on stderr.  `RUST_LOG` overrides the config.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.log_level)),
        )
        .init();

    if let Some(e) = config_error {
        warn!("using default configuration: {e}");
    }

    info!(
        capacity = config.relay.buffer_capacity,
        "pointer-relay starting"
    );

    if let Err(e) = run_platform(&config).await {
        error!("pointer-relay failed: {e}");
        return Err(e);
    }

    info!("pointer-relay stopped");
    Ok(())
}

#[cfg(target_os = "windows")]
async fn run_platform(config: &RelayAppConfig) -> anyhow::Result<()> {
    use pointer_relay::infrastructure::hook::windows::WindowsMouseHook;

    run(WindowsMouseHook::new(), config).await
}

#[cfg(not(target_os = "windows"))]
async fn run_platform(_config: &RelayAppConfig) -> anyhow::Result<()> {
    use pointer_relay::infrastructure::hook::HookError;

    Err(HookError::UnsupportedPlatform(std::env::consts::OS.to_string()).into())
}

/// Runs the relay against `hook_service` until Ctrl-C.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
async fn run<H: HookService>(hook_service: H, config: &RelayAppConfig) -> anyhow::Result<()> {
    let sink: Arc<dyn EventSink> = Arc::new(JsonLinesSink::new(std::io::stdout()));
    let relay = PointerRelay::start(hook_service, sink, config.relay.buffer_capacity)?;

    info!("pointer-relay ready.  Press Ctrl-C to exit.");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    let overwritten = relay.relay().overwritten();
    let delivered = relay.shutdown().await;
    info!(delivered, overwritten, "relay shut down");
    Ok(())
}
