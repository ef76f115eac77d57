//! ZoneRS - Drag-and-Snap Window Zones for macOS
//!
//! Application entry point: initialization, permission checks, the single
//! event-loop task that serializes pointer events and commands, and
//! graceful shutdown.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::{
    signal,
    sync::{broadcast, mpsc},
    time::{interval, Duration},
};
use tracing::{debug, error, info, warn};
use zoners::{
    cli::{Commands, ZoneRSCli},
    config::{Preferences, SettingsStoreConfig, ZoneSettingsStore},
    logging::{init_logging, LogConfig},
    macos::{
        displays::SystemDisplayProvider,
        event_source::{PointerEvent, PointerEventSource, SystemPointerSource},
        permissions,
        windowing::SystemWindowingProvider,
    },
    services::zone_manager::{ZoneCommand, ZoneManager},
    ui::overlay::SystemOverlayProvider,
    Result,
};

/// Application state for the long-running engine
pub struct ZoneRSApp {
    manager: ZoneManager,
    /// Pointer stream from the input hook; absent when the hook could not
    /// be installed, in which case only the hotkey path is live.
    pointer_events: Option<mpsc::UnboundedReceiver<PointerEvent>>,
    /// Command stream fed by the menu / hotkey layer
    commands: mpsc::UnboundedReceiver<ZoneCommand>,
    _command_tx: mpsc::UnboundedSender<ZoneCommand>,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl ZoneRSApp {
    /// Initialize the engine: configuration, providers, permissions, and
    /// the input hook.
    pub async fn new(config_dir: Option<PathBuf>) -> Result<Self> {
        info!(
            "ZoneRS - Drag-and-Snap Window Zones v{}",
            env!("CARGO_PKG_VERSION")
        );

        let manager = bootstrap_manager(config_dir)?;

        check_permissions();

        // Install the global pointer hook. Losing it must not disable the
        // hotkey path; the engine degrades to hotkey-only operation.
        let (pointer_tx, pointer_rx) = mpsc::unbounded_channel();
        let pointer_events = match SystemPointerSource::new().start(pointer_tx) {
            Ok(()) => {
                debug!("Global pointer hook installed");
                Some(pointer_rx)
            }
            Err(err) => {
                warn!(error = %err, "Pointer hook unavailable; drag gesture disabled");
                None
            }
        };

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        Ok(Self {
            manager,
            pointer_events,
            commands: command_rx,
            _command_tx: command_tx,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Run the single-threaded event loop.
    ///
    /// Pointer events, commands, and the periodic topology refresh are all
    /// serialized here; engine state is never touched from anywhere else.
    pub async fn run(&mut self) -> Result<()> {
        let shutdown_tx = self.shutdown_tx.clone();
        tokio::spawn(async move {
            if let Err(err) = wait_for_shutdown_signal(shutdown_tx).await {
                error!(error = %err, "Failed to set up signal handlers");
            }
        });

        let mut topology_refresh = interval(Duration::from_secs(10));
        topology_refresh.tick().await; // the first tick fires immediately

        info!("ZoneRS is ready");

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }

                maybe_event = next_pointer_event(&mut self.pointer_events) => {
                    match maybe_event {
                        Some(event) => {
                            if let Some(notification) = self.manager.handle_pointer_event(event).await? {
                                info!(level = ?notification.level, "{}", notification.message);
                            }
                        }
                        None => {
                            warn!("Pointer event stream closed; drag gesture disabled");
                            self.pointer_events = None;
                        }
                    }
                }

                maybe_command = self.commands.recv() => {
                    if let Some(command) = maybe_command {
                        if let Some(notification) = self.manager.handle_command(command).await? {
                            info!(level = ?notification.level, "{}", notification.message);
                        }
                    }
                }

                _ = topology_refresh.tick() => {
                    self.manager.refresh_topology();
                }
            }
        }

        self.shutdown().await
    }

    async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down ZoneRS...");
        self.manager.handle_command(ZoneCommand::HideZones).await?;
        info!("ZoneRS shutdown complete");
        Ok(())
    }
}

/// Receive the next pointer event, or park forever when the hook is absent
/// so the select loop ignores this branch.
async fn next_pointer_event(
    events: &mut Option<mpsc::UnboundedReceiver<PointerEvent>>,
) -> Option<PointerEvent> {
    match events {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

fn bootstrap_manager(config_dir: Option<PathBuf>) -> Result<ZoneManager> {
    let store_config = match config_dir {
        Some(dir) => SettingsStoreConfig {
            config_dir: dir,
            ..Default::default()
        },
        None => SettingsStoreConfig::default(),
    };

    let preferences_path = store_config.config_dir.join("preferences.toml");
    let preferences = match Preferences::load_or_default(&preferences_path) {
        Ok(preferences) => preferences,
        Err(err) => {
            warn!(error = %err, "Could not read preferences; using defaults");
            Preferences::default()
        }
    };

    let store = ZoneSettingsStore::new(store_config);

    ZoneManager::bootstrap(
        Arc::new(SystemDisplayProvider::new()),
        Arc::new(SystemWindowingProvider::new()),
        Arc::new(SystemOverlayProvider::new()),
        store,
        &preferences,
    )
}

/// Warn about missing permissions without aborting; the engine degrades
/// instead of terminating.
fn check_permissions() {
    match permissions::is_accessibility_permission_granted() {
        Ok(true) => debug!("Accessibility permission granted"),
        Ok(false) => {
            warn!("Accessibility permission missing; window placement will be refused");
            let _ = permissions::prompt_accessibility_permission();
        }
        Err(err) => warn!(error = %err, "Could not query Accessibility permission"),
    }

    match permissions::is_input_monitoring_permission_granted() {
        Ok(true) => debug!("Input Monitoring permission granted"),
        Ok(false) => {
            warn!("Input Monitoring permission missing; drag gesture may be unavailable");
            let _ = permissions::prompt_input_monitoring_permission();
        }
        Err(err) => warn!(error = %err, "Could not query Input Monitoring permission"),
    }
}

async fn wait_for_shutdown_signal(shutdown_tx: broadcast::Sender<()>) -> Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = signal::ctrl_c() => {
                match res {
                    Ok(_) => info!("Received SIGINT (Ctrl+C)"),
                    Err(err) => warn!("Failed to listen for Ctrl+C: {}", err),
                }
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
        }
    }

    #[cfg(not(unix))]
    {
        match signal::ctrl_c().await {
            Ok(_) => info!("Received Ctrl+C"),
            Err(err) => warn!("Failed to listen for Ctrl+C: {}", err),
        }
    }

    if shutdown_tx.send(()).is_err() {
        warn!("Failed to send shutdown signal - no receivers");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ZoneRSCli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config.level = zoners::logging::LogLevel::Debug;
    }
    if let Err(err) = init_logging(&log_config) {
        eprintln!("Failed to initialize logging: {}", err);
    }

    let config_dir = cli.config_dir.as_ref().map(PathBuf::from);

    match &cli.command {
        None | Some(Commands::Run) => {
            let mut app = ZoneRSApp::new(config_dir).await?;
            if let Err(err) = app.run().await {
                error!("Application error: {}", err);
                std::process::exit(1);
            }
            Ok(())
        }
        Some(command) => {
            let mut manager = bootstrap_manager(config_dir)?;
            zoners::cli::execute(&cli, command, &mut manager).await
        }
    }
}
