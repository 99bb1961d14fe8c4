use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

use cityweather::api::ApiState;
use cityweather::cli::{Cli, Mode};
use cityweather::config::CityWeatherConfig;
use cityweather::console::{self, Command};
use cityweather::{
    Catalog, CityFetchCoordinator, Clock, Dashboard, DashboardView, Enrichment, EnrichmentCache,
    FjallSlotStorage, LlmClient, OpenWeatherClient, SystemClock, telemetry, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CityWeatherConfig::load_from_path(cli.config.clone())?;
    telemetry::init(&config.logging)?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("CityWeather/", env!("CARGO_PKG_VERSION")))
        .build()
        .with_context(|| "Failed to create HTTP client")?;

    let catalog = Arc::new(load_catalog(&config, &client).await?);
    let coordinator = Arc::new(build_coordinator(&config, client, catalog));

    match cli.mode() {
        Mode::Dashboard => run_dashboard(&config, coordinator).await,
        Mode::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            web::run(port, ApiState { coordinator }).await
        }
    }
}

async fn load_catalog(config: &CityWeatherConfig, client: &reqwest::Client) -> Result<Catalog> {
    match (&config.catalog.path, &config.catalog.url) {
        (Some(path), _) => Catalog::load_from_path(path),
        (None, Some(url)) => Catalog::fetch(client, url).await,
        (None, None) => {
            bail!("No city catalog configured; set catalog.path or catalog.url")
        }
    }
}

fn build_coordinator(
    config: &CityWeatherConfig,
    client: reqwest::Client,
    catalog: Arc<Catalog>,
) -> CityFetchCoordinator {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let api_key = config.weather.api_key.clone().unwrap_or_else(|| {
        tracing::warn!("No weather API key configured; lookups will likely fail");
        String::new()
    });
    let weather = Arc::new(OpenWeatherClient::new(
        client.clone(),
        config.weather.base_url.clone(),
        api_key,
    ));

    let enrichment = match (&config.enrichment.base_url, config.enrichment.enabled) {
        (Some(base_url), true) => Some(Enrichment {
            cache: Arc::new(EnrichmentCache::new(clock.clone())),
            generator: Arc::new(LlmClient::new(
                client,
                base_url.clone(),
                config.enrichment.max_tokens,
                config.enrichment.temperature,
            )),
            ttl: config.enrichment.ttl(),
        }),
        _ => None,
    };

    CityFetchCoordinator::new(catalog, weather, enrichment, clock)
}

async fn run_dashboard(
    config: &CityWeatherConfig,
    coordinator: Arc<CityFetchCoordinator>,
) -> Result<()> {
    let storage = FjallSlotStorage::open(&config.storage.location).with_context(|| {
        format!("Failed to open selection store at {}", config.storage.location)
    })?;
    let dashboard = Dashboard::start(
        coordinator,
        Box::new(storage),
        config.dashboard.highlight_delay(),
    );

    let initial = dashboard.view();
    let (view_tx, view_rx) = watch::channel(initial);
    let (input_tx, input_rx) = mpsc::channel(32);

    println!("{}", console::HELP);
    let reader = tokio::spawn(read_commands(input_tx, view_rx));

    dashboard
        .run(input_rx, |view: &DashboardView| {
            println!("{}", console::render(view));
            view_tx.send_replace(view.clone());
        })
        .await;

    reader.await.with_context(|| "Input reader panicked")?
}

async fn read_commands(
    inputs: mpsc::Sender<cityweather::Input>,
    view: watch::Receiver<DashboardView>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match console::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{}", console::HELP),
            command => {
                let resolved = command.resolve(&view.borrow());
                match resolved {
                    Some(input) => {
                        if inputs.send(input).await.is_err() {
                            break;
                        }
                    }
                    None => eprintln!("No card at that position"),
                }
            }
        }
    }
    Ok(())
}
