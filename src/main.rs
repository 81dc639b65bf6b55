use std::time::Duration;

use crate::{
    configuration::Configuration, configuration_handler::ConfigurationHandler,
    database_interface::DatabaseInterface, http::create_app,
    local_consultations::LocalConsultations,
};
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod availability;
mod backend;
mod booking_validation;
mod configuration;
mod configuration_handler;
mod consultation_manager;
mod database_interface;
mod error;
mod graphql;
mod http;
mod local_consultations;
mod normalize;
mod schema;
#[cfg(test)]
mod testutils;
mod types;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("########################");
    println!("# Consultation Manager #");
    println!("########################");

    let configuration = ConfigurationHandler::parse_arguments();

    let address = format!("0.0.0.0:{}", configuration.port());
    println!(
        "GraphQL API accessable at:\n{}{}",
        address,
        configuration.graphql_path()
    );
    let listener = tokio::net::TcpListener::bind(address).await?;

    let app = if let Some(database_url) = configuration.database_url() {
        let backend = loop {
            match DatabaseInterface::new(&database_url) {
                Ok(backend) => {
                    info!("Successfully connected to database");
                    break backend;
                }
                Err(err) => {
                    error!(?err, "Failed to establish database connection. Retry in 1 sec. You may want to restart it without DATABASE_URL (impersistent consultations).");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        };
        create_app(backend, configuration)
    } else {
        warn!("No DATABASE_URL configured, consultations are kept in memory");
        create_app(LocalConsultations::default(), configuration)
    };

    axum::serve(listener, app).await
}
