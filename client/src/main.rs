use std::process::ExitCode;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use client::{
    APIClient, RequestConfig,
    settings::{Settings, validate_base_url},
    telemetry::{get_subscriber, init_subscriber},
    view,
};
use payloads::{Sensor, SensorId, requests};

/// Query the sensor backend
///
/// Environment variables can be set directly or loaded from a .env file in
/// the working directory:
/// - SENSOR_API_BASE_URL: backend address (default http://localhost:8000)
/// - SENSOR_LOG: log filter, overridden by RUST_LOG (default info)
///
/// Example:
/// sensor create --id 1 --name boiler --value 71.5
/// sensor get 1
/// sensor list
#[derive(Parser)]
#[command(name = "sensor", version)]
struct Cli {
    /// Override SENSOR_API_BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all sensors
    List,
    /// Show one sensor
    Get { id: i64 },
    /// Create a sensor
    Create {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        value: f64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    init_subscriber(get_subscriber(settings.log_filter.clone()))?;
    tracing::debug!(?settings, "loaded settings");

    let address = match cli.base_url {
        Some(base_url) => validate_base_url(&base_url)?,
        None => settings.base_url,
    };
    let api_client = Rc::new(APIClient::new(address));

    let (text, ok) = match cli.command {
        Command::List => {
            let config = RequestConfig::get();
            view::show::<Vec<Sensor>>(api_client, "/", config).await
        }
        Command::Get { id } => {
            let path = format!("/sensor/{}", SensorId(id));
            view::show::<Sensor>(api_client, &path, RequestConfig::get()).await
        }
        Command::Create { id, name, value } => {
            let details = requests::CreateSensor {
                id: SensorId(id),
                name,
                value,
            };
            let config = RequestConfig::post().json(&details)?;
            view::show::<Sensor>(api_client, "/sensor", config).await
        }
    };

    println!("{text}");
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
