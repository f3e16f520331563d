use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::Command;
use location::{FixedPosition, Gated, Geolocation, IpApi};
use log::{debug, warn};
use map::MapSurface;
use places::GooglePlaces;
use search::SearchHandle;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::{wrappers::LinesStream, StreamExt};

mod app;
mod config;
mod console;
mod location;
mod map;
mod places;
mod search;
mod selection;
mod state;
#[cfg(test)]
mod testing;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session reading commands from stdin.
    Browse {
        #[arg(short, long)]
        keyword: Option<String>,
        #[command(flatten)]
        position: Position,
    },
    /// Search once and print the ranked places.
    Search {
        keyword: String,
        #[command(flatten)]
        position: Position,
    },
    Locate {
        #[command(flatten)]
        position: Position,
    },
}

#[derive(clap::Args)]
struct Position {
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,
}

fn geolocation(
    position: &Position,
    settings: &config::Settings,
) -> Result<Arc<dyn Geolocation>, Box<dyn std::error::Error>> {
    Ok(match (position.lat, position.lng) {
        (Some(lat), Some(lng)) => Arc::new(Gated::new(
            FixedPosition::new(lat, lng)?,
            settings.geolocation,
        )),
        _ => Arc::new(Gated::new(
            IpApi::new(&settings.geolocation_endpoint)?,
            settings.geolocation,
        )),
    })
}

fn init_logging() -> sentry::ClientInitGuard {
    let guard = sentry::init(sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
    });

    let dest = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .build();
    let level = dest.filter();
    let logger = sentry::integrations::log::SentryLogger::with_dest(dest);
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
    guard
}

async fn browse(app: app::App) -> Result<(), Box<dyn std::error::Error>> {
    let mut running: Option<SearchHandle> = app.on_surface_ready().await;
    println!("{}", console::HELP);

    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    while let Some(line) = lines.next().await {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        match command {
            Command::Keyword(keyword) => {
                running = app.set_keyword(&keyword).or(running);
            }
            Command::Preset(name) => match config::preset(&name) {
                Some(keyword) => running = app.set_keyword(keyword).or(running),
                None => println!("unknown preset {name:?}"),
            },
            Command::Locate => {
                running = app.relocate().await.or(running);
                match &app.snapshot().map {
                    Some(view) if view.is_attached() => {
                        println!("map centered at {}", view.center())
                    }
                    _ => println!("location unavailable"),
                }
            }
            Command::ToggleList => {
                app.toggle_list();
                print!("{}", console::render(&app.snapshot()));
            }
            Command::Select(index) => {
                app.select(index);
                print!("{}", console::render(&app.snapshot()));
            }
            Command::Click(marker) => {
                app.click_marker(marker);
                print!("{}", console::render(&app.snapshot()));
            }
            Command::Show => print!("{}", console::render(&app.snapshot())),
            Command::Wait => {
                if let Some(handle) = running.take() {
                    debug!("Waiting for search {:?}", handle.epoch());
                    handle.settled().await;
                }
                print!("{}", console::render(&app.snapshot()));
            }
            Command::Help => println!("{}", console::HELP),
            Command::Quit => break,
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = init_logging();
    let cli = Cli::parse();
    let mut settings = config::Settings::from_env()?;

    match &cli.command {
        Commands::Browse { keyword, position } => {
            if let Some(keyword) = keyword {
                settings.default_keyword = keyword.clone();
            }
            let places = Arc::new(GooglePlaces::new(&settings)?);
            let app = app::App::new(
                &settings,
                geolocation(position, &settings)?,
                places,
                MapSurface::new("map"),
            );
            browse(app).await?;
        }
        Commands::Search { keyword, position } => {
            settings.default_keyword = keyword.clone();
            let places = Arc::new(GooglePlaces::new(&settings)?);
            let app = app::App::new(
                &settings,
                geolocation(position, &settings)?,
                places,
                MapSurface::new("map"),
            );
            match app.on_surface_ready().await {
                Some(handle) => handle.settled().await,
                None => warn!("No location, nothing to search around"),
            }
            app.toggle_list();
            print!("{}", console::render(&app.snapshot()));
        }
        Commands::Locate { position } => {
            let coordinates = geolocation(position, &settings)?.current_position().await?;
            println!("{coordinates:#?}");
        }
    }

    Ok(())
}
