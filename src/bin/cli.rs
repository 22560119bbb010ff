//! Envmon CLI
//!
//! Administrative commands that work on the record database directly:
//! - Generate and inspect config
//! - Register accounts
//! - List devices
//! - Fetch a readings snapshot

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use envmon::config::{generate_default_config, Config};
use envmon::readings::{ReadingsService, ReadingsSnapshot};
use envmon::store::{AccountStore, Database, DeviceStore, NewAccount};

#[derive(Parser)]
#[command(name = "envmon-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Administration tool for the Envmon backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a commented default config file
    InitConfig {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    ShowConfig,

    /// Register an account
    CreateAccount {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        phone: String,
    },

    /// List the devices owned by an account
    Devices {
        /// Owner account id
        user_id: String,
    },

    /// Fetch a readings snapshot for a device locator
    Readings {
        /// Apps Script id or feed URL
        locator: String,
        /// Chart window size
        #[arg(short, long)]
        window: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::from_env(),
    };

    let json = cli.format.eq_ignore_ascii_case("json");

    match cli.command {
        Commands::InitConfig { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }

        Commands::ShowConfig => {
            print!("{}", toml::to_string_pretty(&config)?);
        }

        Commands::CreateAccount {
            name,
            email,
            password,
            phone,
        } => {
            let accounts = AccountStore::new(open_db(&config)?);
            let account = accounts.create(NewAccount {
                name,
                email,
                password,
                phone,
            })?;

            if json {
                println!("{}", serde_json::to_string_pretty(&account.to_public())?);
            } else {
                println!("Created account {} <{}>", account.id, account.email);
            }
        }

        Commands::Devices { user_id } => {
            let devices = DeviceStore::new(open_db(&config)?).list_for_owner(&user_id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&devices)?);
            } else if devices.is_empty() {
                println!("No devices for {}", user_id);
            } else {
                println!("{:<38} {:<24} {:<16} {}", "ID", "Name", "Type", "Source");
                println!("{}", "-".repeat(100));
                for device in devices {
                    println!(
                        "{:<38} {:<24} {:<16} {}",
                        device.id, device.name, device.kind, device.script_url
                    );
                }
            }
        }

        Commands::Readings { locator, window } => {
            let readings = ReadingsService::http(config.readings.clone())?;
            let snapshot = readings.snapshot(&locator, window).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(&snapshot);
            }
        }
    }

    Ok(())
}

fn open_db(config: &Config) -> anyhow::Result<Database> {
    Database::open(&config.storage.database_path)
        .with_context(|| format!("opening {}", config.storage.database_path))
}

fn print_snapshot(snapshot: &ReadingsSnapshot) {
    println!("Source: {}", snapshot.source);
    println!("Samples: {}", snapshot.sample_count);

    let (Some(latest), Some(status)) = (&snapshot.latest, &snapshot.status) else {
        println!("No readings available");
        return;
    };

    println!();
    println!("Temperature: {:.1} °C", latest.temperature);
    println!("Humidity:    {:.1} %", latest.humidity);
    println!("Air quality: {:?}", status.air_quality);
    println!("TVOC:        {} ppb ({})", latest.tvoc, status.tvoc.label());
    println!("eCO2:        {} ppm ({})", latest.eco2, status.eco2.label());
    if let Some(ts) = latest.timestamp {
        println!("Taken at:    {}", ts.to_rfc3339());
    }

    println!();
    println!("{:<26} {:>8} {:>8}", "Time", "Temp", "Hum");
    println!("{}", "-".repeat(44));
    for point in &snapshot.chart {
        let time = point
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<26} {:>8.1} {:>8.1}", time, point.temperature, point.humidity);
    }
}
