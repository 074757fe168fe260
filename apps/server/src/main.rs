#![warn(clippy::all, clippy::pedantic)]

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use webpulse_service::{Config, HttpChecker, MonitoringExecutor, open_storage};

mod error;
mod routes;

use error::AppError;
use logger::init_tracing;

/// WebPulse website performance monitor
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML config file, created with defaults when missing
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_config(cli.config.as_deref())?.apply_env_overrides()?;
    config.validate()?;

    if cli.print_config {
        println!("{config}");
        return Ok(());
    }

    let addr = SocketAddr::new(config.server.bind.parse::<IpAddr>()?, config.server.port);

    let storage = open_storage(&config.storage).await?;
    let checker = Arc::new(HttpChecker::new(&config.checker)?);
    let executor = MonitoringExecutor::new(checker, storage);

    run_server(addr, executor).await
}

async fn run_server(addr: SocketAddr, executor: MonitoringExecutor) -> Result<(), AppError> {
    let executor = web::Data::new(executor);

    info!("Listening on http://{addr}");
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(executor.clone())
            .configure(routes::routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
