//! Command-line interface for ZoneRS
//!
//! Provides commands for inspecting zone layouts, snapping windows,
//! managing configuration, and checking macOS permissions.

use crate::macos::permissions;
use crate::models::ZoneSettings;
use crate::services::zone_manager::{ZoneCommand, ZoneManager};
use crate::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

/// ZoneRS command-line interface
#[derive(Parser)]
#[command(name = "zoners")]
#[command(about = "Drag-and-snap window zones for macOS")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ZoneRS Team")]
pub struct ZoneRSCli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration directory override
    #[arg(short, long, global = true)]
    pub config_dir: Option<String>,

    /// Enable JSON output for machine-readable results
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the zone engine (default)
    Run,

    /// Zone layout inspection commands
    Zones(ZonesCommands),

    /// Snap the active window into zone N (1-9)
    Snap {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=9))]
        zone: u8,
    },

    /// Configuration management commands
    Config(ConfigCommands),

    /// Permission management commands
    Permissions(PermissionCommands),

    /// Print an engine diagnostics snapshot
    Diagnostics,
}

#[derive(Args)]
pub struct ZonesCommands {
    #[command(subcommand)]
    pub command: ZonesSubcommand,
}

#[derive(Subcommand)]
pub enum ZonesSubcommand {
    /// List the resolved zones for the current monitors
    List,
    /// Print the generated default layout for a monitor count
    ShowDefaults {
        #[arg(default_value_t = 1)]
        monitors: usize,
    },
}

#[derive(Args)]
pub struct ConfigCommands {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the configuration file location
    Path,
    /// Print the persisted zone record
    Show,
    /// Replace the layout with generated defaults and save
    Reset,
}

#[derive(Args)]
pub struct PermissionCommands {
    #[command(subcommand)]
    pub command: PermissionSubcommand,
}

#[derive(Subcommand)]
pub enum PermissionSubcommand {
    /// Report which permissions are granted
    Check,
    /// Prompt for any missing permissions
    Request,
}

/// Execute a non-run CLI command against a bootstrapped manager
pub async fn execute(cli: &ZoneRSCli, command: &Commands, manager: &mut ZoneManager) -> Result<()> {
    match command {
        Commands::Run => Ok(()),

        Commands::Zones(zones) => match &zones.command {
            ZonesSubcommand::List => {
                let resolved = manager.resolved_zones();
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(resolved)?);
                } else if resolved.is_empty() {
                    println!("No zones resolved for the current monitors.");
                } else {
                    for zone in resolved {
                        println!(
                            "{:>2}  {:<24} monitor {}  {}x{} at ({}, {})",
                            zone.number,
                            zone.name,
                            zone.monitor,
                            zone.rect.width,
                            zone.rect.height,
                            zone.rect.x,
                            zone.rect.y
                        );
                    }
                }
                Ok(())
            }
            ZonesSubcommand::ShowDefaults { monitors } => {
                let defaults = ZoneSettings::generate_defaults(*monitors);
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&defaults)?);
                } else {
                    for (index, zone) in defaults.zones.iter().enumerate() {
                        println!(
                            "{:>2}  {:<24} monitor {}  {}%x{}% at ({}%, {}%)",
                            index + 1,
                            zone.name,
                            zone.monitor,
                            zone.width,
                            zone.height,
                            zone.x,
                            zone.y
                        );
                    }
                }
                Ok(())
            }
        },

        Commands::Snap { zone } => {
            let notification = manager
                .handle_command(ZoneCommand::SnapActiveWindow(*zone))
                .await?;
            if let Some(notification) = notification {
                println!("{}", notification.message);
            }
            Ok(())
        }

        Commands::Config(config) => match &config.command {
            ConfigSubcommand::Path => {
                println!("{}", manager.settings_path().display());
                Ok(())
            }
            ConfigSubcommand::Show => {
                println!("{}", serde_json::to_string_pretty(manager.settings())?);
                Ok(())
            }
            ConfigSubcommand::Reset => {
                let notification = manager.handle_command(ZoneCommand::ResetToDefaults).await?;
                if let Some(notification) = notification {
                    println!("{}", notification.message);
                }
                Ok(())
            }
        },

        Commands::Permissions(permission) => match &permission.command {
            PermissionSubcommand::Check => {
                let accessibility = permissions::is_accessibility_permission_granted()?;
                let input_monitoring = permissions::is_input_monitoring_permission_granted()?;

                if cli.json {
                    let status = serde_json::json!({
                        "accessibility": accessibility,
                        "input_monitoring": input_monitoring,
                    });
                    println!("{}", serde_json::to_string_pretty(&status)?);
                } else {
                    println!("Accessibility:    {}", granted_label(accessibility));
                    println!("Input Monitoring: {}", granted_label(input_monitoring));
                }
                Ok(())
            }
            PermissionSubcommand::Request => {
                if !permissions::is_accessibility_permission_granted()? {
                    info!("Prompting for Accessibility permission");
                    permissions::prompt_accessibility_permission()?;
                }
                if !permissions::is_input_monitoring_permission_granted()? {
                    info!("Prompting for Input Monitoring permission");
                    permissions::prompt_input_monitoring_permission()?;
                }
                Ok(())
            }
        },

        Commands::Diagnostics => {
            let diagnostics = manager.diagnostics().await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&diagnostics)?);
            } else {
                println!("Monitors:       {}", diagnostics.monitor_count);
                println!("Fingerprint:    {}", diagnostics.fingerprint);
                println!("Saved at:       {}", diagnostics.saved_fingerprint);
                println!("Zones:          {}", diagnostics.zone_count);
                println!("Resolved:       {}", diagnostics.resolved_count);
                println!("Orphaned:       {}", diagnostics.orphan_count);
                println!("Zones visible:  {}", diagnostics.zones_visible);
                println!("Edit mode:      {}", diagnostics.edit_mode);
            }
            Ok(())
        }
    }
}

fn granted_label(granted: bool) -> &'static str {
    if granted {
        "granted"
    } else {
        "not granted"
    }
}
